//! Writing Ensight Gold C Binary case, geometry and variable files
//!
//! The writers are the mirror image of [`parse`](crate::parse): anything they write can be read
//! back by the [`EnsightReader`](crate::EnsightReader). [`write_triangles`] wraps them up to
//! export an extracted mesh and its field samples as a complete one-time-set case.

use crate::case::{CaseFile, GeometryEntry, VariableEntry, VariableShape, VariableSource};
use crate::mesh::{ElementBlock, ElementType, Geometry, IdMode, Part};
use crate::parse::LINE_LENGTH;
use crate::prelude::*;
use crate::CellCountMismatch;

use byteorder::{ByteOrder, WriteBytesExt};
use std::fs::File;
use std::io::BufWriter;

/// number of time values / filename numbers written per line of the case file
const VALUES_PER_LINE: usize = 6;

/// Write the text of a `.case` file
pub fn write_case<W: Write>(mut writer: W, case: &CaseFile) -> Result<(), Error> {
    writeln!(writer, "FORMAT")?;
    writeln!(writer, "type: ensight gold")?;
    writeln!(writer)?;

    writeln!(writer, "GEOMETRY")?;
    let geometry = &case.geometry;
    write!(writer, "model: ")?;
    if let Some(ts) = geometry.time_set {
        write!(writer, "{ts} ")?;
    }
    write!(writer, "{}", geometry.filename)?;
    if geometry.change_coords_only {
        write!(writer, " change_coords_only")?;
        if let Some(step) = geometry.connectivity_step {
            write!(writer, " {step}")?;
        }
    }
    writeln!(writer)?;

    if !case.variables.is_empty() {
        writeln!(writer)?;
        writeln!(writer, "VARIABLE")?;
        for variable in &case.variables {
            write_variable_entry(&mut writer, variable)?;
        }
    }

    if !case.time_sets.is_empty() {
        writeln!(writer)?;
        writeln!(writer, "TIME")?;
        for ts in &case.time_sets {
            write!(writer, "time set: {}", ts.id)?;
            if let Some(description) = &ts.description {
                write!(writer, " {description}")?;
            }
            writeln!(writer)?;
            writeln!(writer, "number of steps: {}", ts.len())?;

            let numbers: Vec<String> = ts.filename_numbers().iter().map(u32::to_string).collect();
            write_list(&mut writer, "filename numbers", &numbers)?;

            let values: Vec<String> = ts.iter().map(format_float).collect();
            write_list(&mut writer, "time values", &values)?;
        }
    }

    Ok(())
}

fn write_variable_entry<W: Write>(writer: &mut W, variable: &VariableEntry) -> Result<(), Error> {
    use crate::case::VariableLocation;

    let key = match (variable.location, &variable.source) {
        (VariableLocation::Case, VariableSource::Constants(_)) => "constant per case".to_string(),
        (VariableLocation::Case, VariableSource::File(_)) => "constant per case file".to_string(),
        (location, _) => format!("{} per {}", variable.shape.keyword(), location.keyword()),
    };

    write!(writer, "{key}: ")?;
    if let Some(ts) = variable.time_set {
        write!(writer, "{ts} ")?;
    }
    write!(writer, "{}", variable.description)?;

    match &variable.source {
        VariableSource::File(filename) => write!(writer, " {filename}")?,
        VariableSource::Constants(values) => {
            for value in values {
                write!(writer, " {}", format_float(*value))?;
            }
        }
    }

    writeln!(writer)?;
    Ok(())
}

fn write_list<W: Write>(writer: &mut W, key: &str, values: &[String]) -> Result<(), Error> {
    write!(writer, "{key}:")?;
    for (index, value) in values.iter().enumerate() {
        if index > 0 && index % VALUES_PER_LINE == 0 {
            writeln!(writer)?;
        }
        write!(writer, " {value}")?;
    }
    writeln!(writer)?;
    Ok(())
}

/// shortest representation that parses back to the same value
fn format_float(value: f64) -> String {
    let mut buffer = ryu::Buffer::new();
    buffer.format(value).to_string()
}

fn write_line<W: Write>(writer: &mut W, text: &str) -> Result<(), Error> {
    let mut record = [0u8; LINE_LENGTH];
    let bytes = text.as_bytes();
    let len = bytes.len().min(LINE_LENGTH);
    record[..len].copy_from_slice(&bytes[..len]);
    writer.write_all(&record)?;
    Ok(())
}

fn write_ints<E: ByteOrder, W: Write>(
    writer: &mut W,
    values: impl IntoIterator<Item = usize>,
) -> Result<(), Error> {
    for value in values {
        writer.write_i32::<E>(value as i32)?;
    }
    Ok(())
}

fn write_floats<E: ByteOrder, W: Write>(
    writer: &mut W,
    values: impl IntoIterator<Item = f64>,
) -> Result<(), Error> {
    for value in values {
        writer.write_f32::<E>(value as f32)?;
    }
    Ok(())
}

/// Write a C Binary geometry file in the byte order `E`
pub fn write_geometry<E: ByteOrder, W: Write>(
    mut writer: W,
    geometry: &Geometry,
) -> Result<(), Error> {
    write_line(&mut writer, "C Binary")?;
    write_line(&mut writer, &geometry.description[0])?;
    write_line(&mut writer, &geometry.description[1])?;
    write_line(&mut writer, &format!("node id {}", geometry.node_ids.keyword()))?;
    write_line(
        &mut writer,
        &format!("element id {}", geometry.element_ids.keyword()),
    )?;

    if let Some(extents) = geometry.extents {
        write_line(&mut writer, "extents")?;
        write_floats::<E, _>(&mut writer, extents)?;
    }

    for part in &geometry.parts {
        write_part::<E, _>(&mut writer, part, geometry.node_ids, geometry.element_ids)?;
    }

    Ok(())
}

fn write_part<E: ByteOrder, W: Write>(
    writer: &mut W,
    part: &Part,
    node_ids: IdMode,
    element_ids: IdMode,
) -> Result<(), Error> {
    write_line(writer, "part")?;
    writer.write_i32::<E>(part.number)?;
    write_line(writer, &part.description)?;
    write_line(writer, "coordinates")?;

    let nodes = part.num_nodes();
    writer.write_i32::<E>(nodes as i32)?;
    if node_ids.is_stored() {
        write_ints::<E, _>(writer, 1..=nodes)?;
    }

    for axis in 0..3 {
        write_floats::<E, _>(writer, part.coordinates.column(axis).iter().copied())?;
    }

    for block in &part.blocks {
        write_block::<E, _>(writer, block, element_ids)?;
    }

    Ok(())
}

fn write_block<E: ByteOrder, W: Write>(
    writer: &mut W,
    block: &ElementBlock,
    element_ids: IdMode,
) -> Result<(), Error> {
    write_line(writer, block.element().keyword())?;
    writer.write_i32::<E>(block.len() as i32)?;
    if element_ids.is_stored() {
        write_ints::<E, _>(writer, 1..=block.len())?;
    }

    let one_based = |nodes: &[usize]| nodes.iter().map(|node| node + 1).collect::<Vec<_>>();

    match (block.element(), block.faces()) {
        (ElementType::NSided, _) => {
            write_ints::<E, _>(writer, block.counts())?;
            write_ints::<E, _>(writer, one_based(block.connectivity()))?;
        }
        (ElementType::NFaced, Some(faces)) => {
            write_ints::<E, _>(writer, faces.per_element.iter().copied())?;
            write_ints::<E, _>(writer, faces.nodes_per_face.iter().copied())?;
            write_ints::<E, _>(writer, one_based(&faces.nodes))?;
        }
        _ => {
            write_ints::<E, _>(writer, one_based(block.connectivity()))?;
        }
    }

    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
enum Layout {
    Dense,
    Undefined(f64),
    /// 0-based indices of the elements that have values
    Partial(Vec<usize>),
}

/// The values of one element block in a per-element variable file
///
/// Values are component major: every `x` component first, then every `y`, and so on.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableBlock {
    element: ElementType,
    values: Vec<f64>,
    layout: Layout,
}

impl VariableBlock {
    /// a value for every element of the block
    pub fn dense(element: ElementType, values: Vec<f64>) -> Self {
        Self {
            element,
            values,
            layout: Layout::Dense,
        }
    }

    /// a value for every element, where `undefined` marks elements without data
    pub fn undefined(element: ElementType, undefined: f64, values: Vec<f64>) -> Self {
        Self {
            element,
            values,
            layout: Layout::Undefined(undefined),
        }
    }

    /// values for the listed (0-based) elements only
    pub fn partial(element: ElementType, elements: Vec<usize>, values: Vec<f64>) -> Self {
        Self {
            element,
            values,
            layout: Layout::Partial(elements),
        }
    }

    /// Split a per-cell array of a part into one dense block per element block.
    ///
    /// Returns `None` if the array does not have one row per cell of the part.
    pub fn from_part(part: &Part, values: &CellArray) -> Option<Vec<Self>> {
        if values.num_cells() != part.num_cells() {
            return None;
        }

        let mut offset = 0;
        let blocks = part
            .blocks
            .iter()
            .map(|block| {
                let rows = offset..offset + block.len();
                offset += block.len();

                let flat = (0..values.components())
                    .flat_map(|component| rows.clone().map(move |row| (row, component)))
                    .map(|index| values[[index.0, index.1]])
                    .collect();

                Self::dense(block.element(), flat)
            })
            .collect();

        Some(blocks)
    }
}

/// Write a per-element variable file in the byte order `E`.
///
/// `parts` pairs every part number with the blocks of values for that part, in the
/// order of the part's element blocks in the geometry.
pub fn write_element_variable<E: ByteOrder, W: Write>(
    mut writer: W,
    description: &str,
    parts: &[(i32, Vec<VariableBlock>)],
) -> Result<(), Error> {
    write_line(&mut writer, description)?;

    for (number, blocks) in parts {
        write_line(&mut writer, "part")?;
        writer.write_i32::<E>(*number)?;

        for block in blocks {
            let keyword = block.element.keyword();
            match &block.layout {
                Layout::Dense => {
                    write_line(&mut writer, keyword)?;
                }
                Layout::Undefined(undefined) => {
                    write_line(&mut writer, &format!("{keyword} undef"))?;
                    writer.write_f32::<E>(*undefined as f32)?;
                }
                Layout::Partial(elements) => {
                    write_line(&mut writer, &format!("{keyword} partial"))?;
                    writer.write_i32::<E>(elements.len() as i32)?;
                    write_ints::<E, _>(&mut writer, elements.iter().map(|e| e + 1))?;
                }
            }
            write_floats::<E, _>(&mut writer, block.values.iter().copied())?;
        }
    }

    Ok(())
}

/// Export a triangle mesh and one field sample per time value as a complete case.
///
/// Writes `<basename>.case`, `<basename>.geo` and one `<basename>.<field>.NNNN` file per
/// time value into `dir`, and returns the path of the `.case` file. Every triangle gets its
/// own three nodes, so the written part has `3 * cells` nodes.
///
/// `basename` and `field` end up as single tokens of the case file. Empty names, and names
/// holding whitespace, `*` wildcards or path separators, fail with an
/// [`InvalidInput`](std::io::ErrorKind::InvalidInput) io error.
pub fn write_triangles(
    dir: &Path,
    basename: &str,
    mesh: &MeshSnapshot,
    field: &str,
    times: &[f64],
    samples: &[FieldSample],
) -> Result<PathBuf, Error> {
    check_name("basename", basename)?;
    check_name("field name", field)?;

    if times.len() != samples.len() {
        let message = format!(
            "{} time values but {} field samples",
            times.len(),
            samples.len()
        );
        return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, message).into());
    }

    let cells = mesh.num_cells();
    for (time, sample) in times.iter().zip(samples) {
        if sample.len() != cells {
            return Err(CellCountMismatch::new(cells, sample.len(), *time).into());
        }
    }

    let coordinates = mesh.view().into_shape((cells * 3, 3)).map(|view| view.to_owned());
    let coordinates = match coordinates {
        Ok(coordinates) => coordinates,
        // non-standard layouts cannot be reshaped in place
        Err(_) => Array2::from_shape_fn((cells * 3, 3), |(node, axis)| {
            mesh[[node / 3, node % 3, axis]]
        }),
    };

    let block = ElementBlock::uniform(ElementType::Tria3, (0..cells * 3).collect())
        .ok_or_else(|| std::io::Error::from(std::io::ErrorKind::InvalidInput))?;
    let part = Part::new(1, "triangles", coordinates).with_block(block);

    let geometry = Geometry {
        description: [basename.to_string(), format!("{cells} triangles")],
        node_ids: IdMode::Off,
        element_ids: IdMode::Off,
        extents: None,
        parts: vec![part],
    };

    let geometry_name = format!("{basename}.geo");
    let mut file = BufWriter::new(File::create(dir.join(&geometry_name))?);
    write_geometry::<byteorder::LittleEndian, _>(&mut file, &geometry)?;
    file.flush()?;

    let mut case = CaseFile::new(GeometryEntry::new(geometry_name));

    if !times.is_empty() {
        let width = (times.len() - 1).to_string().len().max(4);
        let pattern = format!("{basename}.{field}.{}", "*".repeat(width));

        for (step, sample) in samples.iter().enumerate() {
            let name = crate::utils::expand_wildcards(&pattern, step as u32);
            let values = VariableBlock::dense(ElementType::Tria3, sample.to_vec());
            let mut file = BufWriter::new(File::create(dir.join(name))?);
            write_element_variable::<byteorder::LittleEndian, _>(
                &mut file,
                field,
                &[(1, vec![values])],
            )?;
            file.flush()?;
        }

        case.variables.push(
            VariableEntry::per_element(VariableShape::Scalar, field, pattern).with_time_set(1),
        );
        case.time_sets.push(TimeSet::new(1, times.to_vec()));
    }

    let case_path = dir.join(format!("{basename}.case"));
    let mut file = BufWriter::new(File::create(&case_path)?);
    write_case(&mut file, &case)?;
    file.flush()?;

    tracing::debug!(path = %case_path.display(), cells, steps = times.len(), "wrote case");

    Ok(case_path)
}

fn check_name(what: &str, name: &str) -> Result<(), Error> {
    let invalid = |c: char| c.is_whitespace() || matches!(c, '*' | '/' | '\\');
    if name.is_empty() || name.contains(invalid) {
        let message = format!("{what} `{name}` cannot be written to a case file");
        return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, message).into());
    }
    Ok(())
}
