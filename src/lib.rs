//! Extract a triangle mesh and a time varying per-cell scalar field from Ensight Gold cases.
//!
//! A [`CaseSession`] opens a `.case` file, picks its time set, freezes the triangle
//! coordinates of the primary part into a [`MeshSnapshot`] and then reads one
//! [`FieldSample`] per requested time. Every sample follows the cell order of the
//! snapshot.
//!
//! ```no_run
//! use ensight::{CaseSession, SessionConfig};
//!
//! # fn main() -> Result<(), ensight::Error> {
//! let mut session = CaseSession::open_case("solar/basic.case", SessionConfig::default())?;
//! let (timeset, steps) = session.timeset()?;
//! let cells = session.mesh()?.num_cells();
//!
//! for time in timeset.iter().take(steps) {
//!     let sample = session.read_timestep(time)?;
//!     assert_eq!(sample.len(), cells);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Reading the files is done by a [`Backend`]. The built-in one is the [`EnsightReader`],
//! which understands C Binary geometry and per-element variable files. Other backends can
//! be injected with [`CaseSession::from_backend`].
//!
//! With the default `fetch` feature, [`fetch::ArchiveFetcher`] downloads zipped cases from
//! a CKAN portal.

pub mod array;
pub mod case;
mod data;
#[cfg(feature = "fetch")]
pub mod fetch;
mod iter;
pub mod mesh;
pub mod parse;
pub mod prelude;
mod reader;
mod session;
pub mod time;
mod traits;
mod utils;
pub mod write_ensight;

pub use array::{CellArray, FieldSample};
pub use data::CaseData;
pub use iter::Timesteps;
pub use mesh::{MalformedPart, MeshSnapshot, UnsupportedCellShape};
pub use reader::EnsightReader;
pub use session::{CaseSession, SessionConfig, SessionState, DEFAULT_FIELD_NAME};
pub use time::TimeSet;
pub use traits::Backend;
pub use write_ensight::write_triangles;

pub use ndarray;

use derive_more::{Constructor, Display};
use std::fmt;
use std::path::PathBuf;

/// general purpose error enumeration for possible causes of failure.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("`{}` is not a readable Ensight Gold case: {source}", .path.display())]
    InvalidCaseFile {
        path: PathBuf,
        source: parse::ParseError,
    },
    #[error("the session is not open")]
    SessionNotOpen,
    #[error("the mesh has to be loaded before timesteps can be read")]
    MeshNotLoaded,
    #[error("{0}")]
    UnsupportedTimeSetCount(#[from] TimeSetCount),
    #[error("{0}")]
    UnsupportedCellShape(#[from] UnsupportedCellShape),
    #[error("{0}")]
    MalformedPart(#[from] MalformedPart),
    #[error("{0}")]
    FieldNotFound(#[from] FieldNotFound),
    #[error("{0}")]
    CellCountMismatch(#[from] CellCountMismatch),
    #[error("the session already has `{}` open", .0.display())]
    AlreadyOpen(PathBuf),
    #[error("{0}")]
    UnsupportedArchiveFormat(#[from] UnsupportedArchiveFormat),
    #[error("could not read `{}`: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: parse::ParseError,
    },
    #[error("An io error occured: `{0}`")]
    Io(#[from] std::io::Error),
    #[cfg(feature = "fetch")]
    #[error("http request failed: `{0}`")]
    Http(#[from] reqwest::Error),
    #[cfg(feature = "fetch")]
    #[error("could not extract archive: `{0}`")]
    Zip(#[from] zip::result::ZipError),
    #[cfg(feature = "fetch")]
    #[error("{0}")]
    ResourceNotFound(#[from] fetch::ResourceNotFound),
}

/// The case declares a number of time sets the session cannot choose from
#[derive(Debug, Clone, PartialEq, Eq, Constructor)]
pub struct TimeSetCount {
    /// number of time sets declared by the case
    pub found: usize,
    /// the configured time set index, if any
    pub requested: Option<usize>,
}

impl fmt::Display for TimeSetCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.requested {
            Some(index) => write!(
                f,
                "time set index {index} was requested, but the case only declares {} time sets",
                self.found
            ),
            None => write!(
                f,
                "expected exactly one time set, found {}. Configure a time set index to choose one",
                self.found
            ),
        }
    }
}

#[derive(Display, Debug, Clone, PartialEq, Eq, Constructor)]
#[display(
    fmt = "per-cell field `{}` not found, available per-cell fields: {:?}",
    field,
    available
)]
pub struct FieldNotFound {
    pub field: String,
    pub available: Vec<String>,
}

#[derive(Display, Debug, Clone, PartialEq, Constructor)]
#[display(
    fmt = "field has {actual} cells at time {time}, but the mesh snapshot has {expected} cells"
)]
pub struct CellCountMismatch {
    pub expected: usize,
    pub actual: usize,
    pub time: f64,
}

#[derive(Display, Debug, Clone, PartialEq, Eq, Constructor)]
#[display(fmt = "payload is not a zip archive: {reason}")]
pub struct UnsupportedArchiveFormat {
    pub reason: String,
}

impl Error {
    pub(crate) fn read(path: impl Into<PathBuf>, source: impl Into<parse::ParseError>) -> Self {
        Error::Read {
            path: path.into(),
            source: source.into(),
        }
    }

    pub(crate) fn invalid_case(
        path: impl Into<PathBuf>,
        source: impl Into<parse::ParseError>,
    ) -> Self {
        Error::InvalidCaseFile {
            path: path.into(),
            source: source.into(),
        }
    }
}

impl std::error::Error for TimeSetCount {}
impl std::error::Error for UnsupportedCellShape {}
impl std::error::Error for MalformedPart {}
impl std::error::Error for FieldNotFound {}
impl std::error::Error for CellCountMismatch {}
impl std::error::Error for UnsupportedArchiveFormat {}
