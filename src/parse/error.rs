use crate::prelude::*;

/// An error caused while parsing an Ensight Gold case, geometry, or variable file
#[derive(Debug, thiserror::Error, From)]
pub enum ParseError {
    #[error("io error: {0}")]
    Io(std::io::Error),
    #[error("{0}")]
    UnsupportedFormat(UnsupportedFormat),
    #[error("{0}")]
    MalformedLine(MalformedLine),
    #[error("{0}")]
    MissingEntry(MissingEntry),
    #[error("{0}")]
    MissingTimeSet(MissingTimeSet),
    #[error("{0}")]
    MalformedTimeSet(MalformedTimeSet),
    #[error("{0}")]
    UnexpectedKeyword(UnexpectedKeyword),
    #[error("{0}")]
    UnknownElement(UnknownElement),
    #[error("{0}")]
    InvalidConnectivity(InvalidConnectivity),
    #[error("{0}")]
    InvalidCount(InvalidCount),
    #[error("{0}")]
    BlockMismatch(BlockMismatch),
    #[error("{0}")]
    UnknownPart(UnknownPart),
    #[error("{0}")]
    NodeCountMismatch(NodeCountMismatch),
}

#[derive(From, Display, Debug, Constructor)]
#[display(fmt = "unsupported {what}: `{found}`")]
pub struct UnsupportedFormat {
    what: &'static str,
    found: String,
}

#[derive(From, Display, Debug, Constructor)]
#[display(fmt = "malformed line {line_number} in {section} section: `{line}`")]
pub struct MalformedLine {
    section: &'static str,
    line_number: usize,
    line: String,
}

#[derive(From, Display, Debug, Constructor)]
#[display(fmt = "missing `{entry}` in {section} section")]
pub struct MissingEntry {
    section: &'static str,
    entry: &'static str,
}

#[derive(From, Display, Debug, Constructor)]
#[display(fmt = "`{file}` refers to time set {time_set}, which is not declared")]
pub struct MissingTimeSet {
    file: String,
    time_set: u32,
}

#[derive(From, Display, Debug, Constructor)]
#[display(fmt = "time set {time_set}: {reason}")]
pub struct MalformedTimeSet {
    time_set: u32,
    reason: String,
}

#[derive(From, Display, Debug, Constructor)]
#[display(fmt = "unexpected keyword. Expected `{expected}`, got `{actual}`")]
pub struct UnexpectedKeyword {
    expected: &'static str,
    actual: String,
}

#[derive(From, Display, Debug, Constructor)]
#[display(fmt = "unknown element type `{keyword}` in part {part}")]
pub struct UnknownElement {
    part: i32,
    keyword: String,
}

#[derive(From, Display, Debug, Constructor)]
#[display(
    fmt = "element {element} of part {part} references node {node}, but the part only has {nodes} nodes"
)]
pub struct InvalidConnectivity {
    part: i32,
    element: usize,
    node: i32,
    nodes: usize,
}

#[derive(From, Display, Debug, Constructor)]
#[display(fmt = "invalid {what} count {count}")]
pub struct InvalidCount {
    what: &'static str,
    count: i64,
}

#[derive(From, Display, Debug, Constructor)]
#[display(
    fmt = "variable block `{actual}` of part {part} does not match geometry block `{expected}`"
)]
pub struct BlockMismatch {
    part: i32,
    expected: String,
    actual: String,
}

#[derive(From, Display, Debug, Constructor)]
#[display(fmt = "part {part} is not present in the geometry")]
pub struct UnknownPart {
    part: i32,
}

#[derive(From, Display, Debug, Constructor)]
#[display(fmt = "part {part} has {expected} nodes, but {actual} coordinates were given")]
pub struct NodeCountMismatch {
    part: i32,
    expected: usize,
    actual: usize,
}
