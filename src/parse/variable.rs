use crate::mesh::{ElementBlock, ElementType, Geometry, Part};
use crate::prelude::*;

use super::binary::{BinaryReader, Endian};
use super::error;

/// Read the values of a per-element variable file for a single part.
///
/// The geometry the file was written against must be supplied since the file only
/// stores values, not counts. The result has shape `(cells, components)` with cells in
/// the order of `part_number`'s element blocks. Elements without a value (`undef`
/// entries, or elements left out of a `partial` block) are `NaN`.
///
/// Returns `Ok(None)` if the file has no values for the part.
pub fn read_element_variable<R: Read>(
    reader: R,
    endian: Endian,
    geometry: &Geometry,
    part_number: i32,
    components: usize,
) -> Result<Option<CellArray>, ParseError> {
    let mut reader = BinaryReader::new(reader, endian);

    let _description = reader.read_line()?;
    let mut next = reader.read_line_or_eof()?;

    while let Some(line) = next {
        if !line.starts_with("part") {
            return Err(error::UnexpectedKeyword::new("part", line).into());
        }

        let number = reader.read_i32()?;
        let part = geometry
            .part(number)
            .ok_or(error::UnknownPart::new(number))?;

        let (values, following) = read_part_values(&mut reader, part, components)?;

        if number == part_number {
            return Ok(CellArray::new(values));
        }

        next = following;
    }

    Ok(None)
}

fn read_part_values<R: Read>(
    reader: &mut BinaryReader<R>,
    part: &Part,
    components: usize,
) -> Result<(Array2<f64>, Option<String>), ParseError> {
    let mut values = Array2::from_elem((part.num_cells(), components), f64::NAN);
    let mut offset = 0;

    for block in &part.blocks {
        let line = reader.read_line()?;
        let mut words = line.split_ascii_whitespace();
        let element = words.next().and_then(ElementType::from_keyword);

        if element != Some(block.element()) {
            let err = error::BlockMismatch::new(part.number, block.element().to_string(), line.clone());
            return Err(err.into());
        }

        let qualifier = words.next();
        let count = block.len();

        match qualifier {
            None => {
                let raw = reader.read_f32_vec(count * components)?;
                fill_dense(&mut values, offset, count, &raw, None);
            }
            Some("undef") => {
                let undefined = reader.read_f32()?;
                let raw = reader.read_f32_vec(count * components)?;
                fill_dense(&mut values, offset, count, &raw, Some(undefined));
            }
            Some("partial") => {
                read_partial(reader, &mut values, offset, block)?;
            }
            Some(_) => {
                let err = error::BlockMismatch::new(part.number, block.element().to_string(), line.clone());
                return Err(err.into());
            }
        }

        offset += count;
    }

    let following = reader.read_line_or_eof()?;
    Ok((values, following))
}

/// values are stored component by component: every `x`, then every `y`, ...
fn fill_dense(
    values: &mut Array2<f64>,
    offset: usize,
    count: usize,
    raw: &[f32],
    undefined: Option<f32>,
) {
    for (component, chunk) in raw.chunks(count.max(1)).enumerate() {
        for (cell, value) in chunk.iter().enumerate() {
            if Some(*value) != undefined {
                values[[offset + cell, component]] = *value as f64;
            }
        }
    }
}

fn read_partial<R: Read>(
    reader: &mut BinaryReader<R>,
    values: &mut Array2<f64>,
    offset: usize,
    block: &ElementBlock,
) -> Result<(), ParseError> {
    let components = values.ncols();
    let count = reader.read_count("partial element")?;
    let elements = reader.read_i32_vec(count)?;
    let raw = reader.read_f32_vec(count * components)?;

    for (index, element) in elements.iter().enumerate() {
        let cell = usize::try_from(element.saturating_sub(1))
            .ok()
            .filter(|cell| *cell < block.len())
            .ok_or_else(|| error::InvalidCount::new("partial element index", *element as i64))?;

        for component in 0..components {
            values[[offset + cell, component]] = raw[component * count + index] as f64;
        }
    }

    Ok(())
}
