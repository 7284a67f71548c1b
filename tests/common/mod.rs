#![allow(dead_code)]

use byteorder::LittleEndian;
use ensight::case::{CaseFile, GeometryEntry, VariableEntry, VariableShape};
use ensight::mesh::{ElementBlock, ElementType, Geometry, IdMode, Part};
use ensight::ndarray::Array2;
use ensight::write_ensight::{write_case, write_element_variable, write_geometry, VariableBlock};
use ensight::{FieldSample, MeshSnapshot, TimeSet};
use std::fs::File;
use std::path::{Path, PathBuf};

/// a row of `cells` triangles along the x axis, sharing edges
pub fn strip_part(cells: usize) -> Part {
    let coordinates = Array2::from_shape_fn((cells + 2, 3), |(node, axis)| match axis {
        0 => (node / 2) as f64,
        1 => (node % 2) as f64,
        _ => 0.5,
    });
    let connectivity = (0..cells).flat_map(|c| [c, c + 1, c + 2]).collect();
    Part::new(1, "roof", coordinates)
        .with_block(ElementBlock::uniform(ElementType::Tria3, connectivity).unwrap())
}

pub fn geometry(parts: Vec<Part>) -> Geometry {
    Geometry {
        description: ["fixture".into(), "written by tests".into()],
        node_ids: IdMode::Off,
        element_ids: IdMode::Off,
        extents: None,
        parts,
    }
}

pub fn write_geo(dir: &Path, name: &str, geometry: &Geometry) {
    let file = File::create(dir.join(name)).unwrap();
    write_geometry::<LittleEndian, _>(file, geometry).unwrap();
}

pub fn write_scalar(dir: &Path, name: &str, part: &Part, values: &[f64]) {
    let array = ensight::CellArray::scalar(values.to_vec());
    let blocks = VariableBlock::from_part(part, &array).unwrap();
    let file = File::create(dir.join(name)).unwrap();
    write_element_variable::<LittleEndian, _>(file, "scalar", &[(part.number, blocks)]).unwrap();
}

pub fn write_case_file(dir: &Path, name: &str, case: &CaseFile) -> PathBuf {
    let path = dir.join(name);
    write_case(File::create(&path).unwrap(), case).unwrap();
    path
}

/// A one time set case with a static strip of triangles and a `shading_coefficient`
/// field, written with the crate's own exporter. Returns the case path, the snapshot
/// and the samples that were written.
pub fn basic_case(
    dir: &Path,
    cells: usize,
    times: &[f64],
) -> (PathBuf, MeshSnapshot, Vec<FieldSample>) {
    let part = strip_part(cells);
    let mesh = MeshSnapshot::from_part(&part).unwrap();

    let samples: Vec<FieldSample> = times
        .iter()
        .enumerate()
        .map(|(step, _)| {
            let values: Vec<f64> = (0..cells)
                .map(|cell| (step * cells + cell) as f64 * 0.25)
                .collect();
            FieldSample::from(values)
        })
        .collect();

    let path = ensight::write_triangles(
        dir,
        "basic",
        &mesh,
        "shading_coefficient",
        times,
        &samples,
    )
    .unwrap();

    (path, mesh, samples)
}

/// a case with a static geometry and a single per-element scalar
pub fn static_case(dir: &Path, part: Part, time_sets: Vec<TimeSet>) -> PathBuf {
    let values: Vec<f64> = (0..part.num_cells()).map(|c| c as f64).collect();
    write_geo(dir, "static.geo", &geometry(vec![part.clone()]));
    write_scalar(dir, "static.shading", &part, &values);

    let mut case = CaseFile::new(GeometryEntry::new("static.geo"));
    case.variables.push(VariableEntry::per_element(
        VariableShape::Scalar,
        "shading_coefficient",
        "static.shading",
    ));
    case.time_sets = time_sets;

    write_case_file(dir, "static.case", &case)
}
