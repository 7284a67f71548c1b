use crate::mesh::{ElementBlock, ElementType, Faces, Geometry, IdMode, Part};
use crate::prelude::*;

use super::binary::{BinaryReader, Endian};
use super::error;

const FORMAT_LINE: &str = "C Binary";

/// Check that a geometry file starts with the `C Binary` marker without reading the rest
pub fn check_header<R: Read>(reader: R) -> Result<(), ParseError> {
    let mut reader = BinaryReader::new(reader, Endian::Little);
    read_format_line(&mut reader)
}

/// Read a complete Ensight Gold C Binary geometry file.
///
/// Returns the geometry and the byte order it was written in, which the variable
/// files of the same case share.
pub fn read_geometry<R: Read>(reader: R) -> Result<(Geometry, Endian), ParseError> {
    let mut reader = BinaryReader::new(reader, Endian::Little);

    read_format_line(&mut reader)?;

    let description = [reader.read_line()?, reader.read_line()?];
    let node_ids = read_id_mode(&mut reader, "node id")?;
    let element_ids = read_id_mode(&mut reader, "element id")?;

    let mut next = reader.read_line_or_eof()?;
    let mut extents = None;

    if let Some(line) = &next {
        if line.starts_with("extents") {
            let values = reader.read_f32_vec(6)?;
            let mut arr = [0.0; 6];
            arr.iter_mut()
                .zip(values)
                .for_each(|(slot, value)| *slot = value as f64);
            extents = Some(arr);
            next = reader.read_line_or_eof()?;
        }
    }

    let mut parts = Vec::new();

    while let Some(line) = next {
        if !line.starts_with("part") {
            return Err(error::UnexpectedKeyword::new("part", line).into());
        }

        let word = reader.read_word()?;
        if parts.is_empty() {
            reader.set_endian(Endian::detect(word));
        }
        let number = reader.decode_i32(word);

        tracing::trace!(part = number, endian = ?reader.endian(), "reading geometry part");

        let (part, following) = read_part(&mut reader, number, node_ids, element_ids)?;
        parts.push(part);
        next = following;
    }

    let geometry = Geometry {
        description,
        node_ids,
        element_ids,
        extents,
        parts,
    };

    Ok((geometry, reader.endian()))
}

/// Combine the element blocks of `connectivity` with the node coordinates of `coordinates`.
///
/// In `change_coords_only` cases a single step holds the element blocks, and the files of
/// the other steps only hold the coordinates of every part. Blocks found in `coordinates`
/// are ignored.
pub fn apply_coordinates(
    connectivity: &Geometry,
    coordinates: &Geometry,
) -> Result<Geometry, ParseError> {
    let mut geometry = connectivity.clone();

    for part in &mut geometry.parts {
        let moved = coordinates
            .part(part.number)
            .ok_or_else(|| error::UnknownPart::new(part.number))?;

        if moved.num_nodes() != part.num_nodes() {
            let err = error::NodeCountMismatch::new(part.number, part.num_nodes(), moved.num_nodes());
            return Err(err.into());
        }

        part.coordinates = moved.coordinates.clone();
    }

    if coordinates.extents.is_some() {
        geometry.extents = coordinates.extents;
    }

    Ok(geometry)
}

fn read_format_line<R: Read>(reader: &mut BinaryReader<R>) -> Result<(), ParseError> {
    let line = reader.read_line()?;
    if line == FORMAT_LINE {
        Ok(())
    } else {
        // ascii geometry starts with a free-form description, fortran binary with a
        // record length marker
        Err(error::UnsupportedFormat::new("geometry encoding", line).into())
    }
}

fn read_id_mode<R: Read>(
    reader: &mut BinaryReader<R>,
    keyword: &'static str,
) -> Result<IdMode, ParseError> {
    let line = reader.expect_keyword(keyword)?;
    IdMode::from_header(&line).ok_or_else(|| error::UnexpectedKeyword::new(keyword, line).into())
}

/// read a single part, returning the keyword line that follows it (if any)
fn read_part<R: Read>(
    reader: &mut BinaryReader<R>,
    number: i32,
    node_ids: IdMode,
    element_ids: IdMode,
) -> Result<(Part, Option<String>), ParseError> {
    let description = reader.read_line()?;

    let keyword = reader.read_line()?;
    if keyword.starts_with("block") {
        return Err(error::UnsupportedFormat::new("structured part", keyword).into());
    }
    if !keyword.starts_with("coordinates") {
        return Err(error::UnexpectedKeyword::new("coordinates", keyword).into());
    }

    let nodes = reader.read_count("node")?;
    if node_ids.is_stored() {
        reader.skip_words(nodes)?;
    }

    let mut coordinates = Array2::zeros((nodes, 3));
    for axis in 0..3 {
        let values = reader.read_f32_vec(nodes)?;
        coordinates
            .column_mut(axis)
            .iter_mut()
            .zip(values)
            .for_each(|(slot, value)| *slot = value as f64);
    }

    let mut part = Part::new(number, description, coordinates);

    loop {
        let line = match reader.read_line_or_eof()? {
            Some(line) => line,
            None => return Ok((part, None)),
        };

        if line.starts_with("part") {
            return Ok((part, Some(line)));
        }

        let element = ElementType::from_keyword(&line)
            .ok_or_else(|| error::UnknownElement::new(number, line.clone()))?;

        let count = reader.read_count("element")?;
        if element_ids.is_stored() {
            reader.skip_words(count)?;
        }

        let block = read_block(reader, &part, element, count)?;
        tracing::trace!(part = number, %element, count, "read element block");
        part.blocks.push(block);
    }
}

fn read_block<R: Read>(
    reader: &mut BinaryReader<R>,
    part: &Part,
    element: ElementType,
    count: usize,
) -> Result<ElementBlock, ParseError> {
    let nodes = part.num_nodes();

    let block = match element {
        ElementType::NSided => {
            let counts = read_sizes(reader, count, "nsided node")?;
            let raw = reader.read_i32_vec(counts.iter().sum())?;
            let indices = to_indices(&raw, nodes)
                .map_err(|(position, node)| bad_node(part, &counts, position, node))?;
            ElementBlock::nsided(&counts, indices)
        }
        ElementType::NFaced => {
            let per_element = read_sizes(reader, count, "nfaced face")?;
            let nodes_per_face = read_sizes(reader, per_element.iter().sum(), "nfaced node")?;
            let raw = reader.read_i32_vec(nodes_per_face.iter().sum())?;

            // report the element that owns the face holding the bad node
            let indices = to_indices(&raw, nodes).map_err(|(position, node)| {
                let face = element_of(&nodes_per_face, position);
                let element = element_of(&per_element, face);
                error::InvalidConnectivity::new(part.number, element, node, nodes)
            })?;

            ElementBlock::nfaced(Faces {
                per_element,
                nodes_per_face,
                nodes: indices,
            })
        }
        _ => {
            // fixed size elements are the only ones without a `None` here
            let per_element = element.nodes_per_element().unwrap_or(1);
            let raw = reader.read_i32_vec(count * per_element)?;
            let indices = to_indices(&raw, nodes).map_err(|(position, node)| {
                error::InvalidConnectivity::new(part.number, position / per_element, node, nodes)
            })?;
            ElementBlock::uniform(element, indices)
        }
    };

    block.ok_or_else(|| error::InvalidCount::new("connectivity", count as i64).into())
}

fn read_sizes<R: Read>(
    reader: &mut BinaryReader<R>,
    count: usize,
    what: &'static str,
) -> Result<Vec<usize>, ParseError> {
    reader
        .read_i32_vec(count)?
        .into_iter()
        .map(|size| {
            usize::try_from(size).map_err(|_| error::InvalidCount::new(what, size as i64).into())
        })
        .collect()
}

/// convert 1-based node numbers into 0-based indices, reporting the position and value
/// of the first one out of range
fn to_indices(raw: &[i32], nodes: usize) -> Result<Vec<usize>, (usize, i32)> {
    raw.iter()
        .enumerate()
        .map(|(position, node)| {
            if *node >= 1 && (*node as usize) <= nodes {
                Ok(*node as usize - 1)
            } else {
                Err((position, *node))
            }
        })
        .collect()
}

/// which group a flat position falls in, given the size of every group
fn element_of(sizes: &[usize], position: usize) -> usize {
    let mut end = 0;
    for (index, size) in sizes.iter().enumerate() {
        end += size;
        if position < end {
            return index;
        }
    }
    sizes.len()
}

fn bad_node(part: &Part, counts: &[usize], position: usize, node: i32) -> ParseError {
    let element = element_of(counts, position);
    error::InvalidConnectivity::new(part.number, element, node, part.num_nodes()).into()
}
