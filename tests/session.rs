mod common;

use byteorder::LittleEndian;
use ensight::case::{CaseFile, GeometryEntry, VariableEntry, VariableShape};
use ensight::mesh::{ElementBlock, ElementType, Part};
use ensight::ndarray::{arr2, Array2};
use ensight::{CaseSession, Error, SessionConfig, SessionState, TimeSet};

#[test]
fn basic_case_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let (path, written_mesh, samples) = common::basic_case(dir.path(), 4, &[3600.0]);

    let mut session = CaseSession::open_case(&path, SessionConfig::default()).unwrap();
    assert_eq!(session.state(), SessionState::Opened);

    let (timeset, steps) = session.timeset().unwrap();
    assert_eq!(steps, 1);
    assert_eq!(timeset.values(), &[3600.0]);

    let mesh = session.mesh().unwrap().clone();
    assert_eq!(mesh.shape(), &[4, 3, 3]);
    assert_eq!(mesh, written_mesh);
    assert_eq!(session.state(), SessionState::MeshLoaded);

    let sample = session.read_timestep(3600.0).unwrap();
    assert_eq!(sample.shape(), &[4]);
    assert_eq!(sample, samples[0]);
}

#[test]
fn mesh_is_stable_across_calls() {
    let dir = tempfile::tempdir().unwrap();
    let (path, _, _) = common::basic_case(dir.path(), 3, &[0.0, 1.0]);

    let mut session = CaseSession::open_case(&path, SessionConfig::default()).unwrap();
    let first = session.mesh().unwrap().clone();
    let second = session.mesh().unwrap().clone();
    assert_eq!(first, second);
}

#[test]
fn every_timestep_matches_the_mesh() {
    let dir = tempfile::tempdir().unwrap();
    let times = [0.0, 900.0, 1800.0, 2700.0];
    let (path, _, samples) = common::basic_case(dir.path(), 5, &times);

    let mut session = CaseSession::open_case(&path, SessionConfig::default()).unwrap();
    let (timeset, steps) = session.timeset().unwrap();
    assert_eq!(steps, times.len());

    let cells = session.mesh().unwrap().num_cells();

    for (step, time) in timeset.iter().enumerate() {
        let sample = session.read_timestep(time).unwrap();
        assert_eq!(sample.len(), cells);
        assert_eq!(sample, samples[step]);
    }
}

#[test]
fn times_between_steps_use_the_earlier_step() {
    let dir = tempfile::tempdir().unwrap();
    let (path, _, samples) = common::basic_case(dir.path(), 2, &[0.0, 10.0, 20.0]);

    let mut session = CaseSession::open_case(&path, SessionConfig::default()).unwrap();
    session.mesh().unwrap();

    assert_eq!(session.read_timestep(15.0).unwrap(), samples[1]);
    assert_eq!(session.read_timestep(-5.0).unwrap(), samples[0]);
    assert_eq!(session.read_timestep(100.0).unwrap(), samples[2]);
}

#[test]
fn operations_before_open() {
    let mut session = CaseSession::new(SessionConfig::default());
    assert_eq!(session.state(), SessionState::Unopened);

    assert!(matches!(session.timeset(), Err(Error::SessionNotOpen)));
    assert!(matches!(session.mesh(), Err(Error::SessionNotOpen)));
    assert!(matches!(session.read_timestep(0.0), Err(Error::SessionNotOpen)));
}

#[test]
fn read_before_mesh() {
    let dir = tempfile::tempdir().unwrap();
    let (path, _, _) = common::basic_case(dir.path(), 2, &[0.0]);

    let mut session = CaseSession::open_case(&path, SessionConfig::default()).unwrap();
    assert!(matches!(session.read_timestep(0.0), Err(Error::MeshNotLoaded)));
    assert!(matches!(session.timesteps(), Err(Error::MeshNotLoaded)));
}

#[test]
fn unknown_field() {
    let dir = tempfile::tempdir().unwrap();
    let (path, _, _) = common::basic_case(dir.path(), 2, &[0.0]);

    let config = SessionConfig::default().with_field_name("temperature");
    let mut session = CaseSession::open_case(&path, config).unwrap();
    session.mesh().unwrap();

    match session.read_timestep(0.0) {
        Err(Error::FieldNotFound(missing)) => {
            assert_eq!(missing.field, "temperature");
            assert_eq!(missing.available, vec!["shading_coefficient".to_string()]);
        }
        other => panic!("expected FieldNotFound, got {other:?}"),
    }
}

#[test]
fn second_open_keeps_the_first_case() {
    let dir = tempfile::tempdir().unwrap();
    let (path, _, _) = common::basic_case(dir.path(), 2, &[0.0]);

    let mut session = CaseSession::open_case(&path, SessionConfig::default()).unwrap();
    session.mesh().unwrap();

    match session.open(dir.path().join("other.case")) {
        Err(Error::AlreadyOpen(open)) => assert_eq!(open, path),
        other => panic!("expected AlreadyOpen, got {other:?}"),
    }

    assert_eq!(session.state(), SessionState::MeshLoaded);
    assert_eq!(session.path(), Some(path.as_path()));
    session.read_timestep(0.0).unwrap();
}

#[test]
fn close_and_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let (path, _, _) = common::basic_case(dir.path(), 2, &[0.0]);

    let mut session = CaseSession::open_case(&path, SessionConfig::default()).unwrap();
    session.mesh().unwrap();
    session.close();

    assert_eq!(session.state(), SessionState::Unopened);
    assert!(session.path().is_none());
    assert!(matches!(session.timeset(), Err(Error::SessionNotOpen)));

    session.open(&path).unwrap();
    assert_eq!(session.state(), SessionState::Opened);
}

#[test]
fn invalid_case_files() {
    let dir = tempfile::tempdir().unwrap();

    let missing = CaseSession::open_case(dir.path().join("missing.case"), SessionConfig::default());
    assert!(matches!(missing, Err(Error::InvalidCaseFile { .. })));

    let old_format = dir.path().join("old.case");
    std::fs::write(&old_format, "FORMAT\ntype: ensight\nGEOMETRY\nmodel: old.geo\n").unwrap();
    let err = CaseSession::open_case(&old_format, SessionConfig::default());
    assert!(matches!(err, Err(Error::InvalidCaseFile { .. })));

    let ascii = dir.path().join("ascii.case");
    std::fs::write(&ascii, "FORMAT\ntype: ensight gold\nGEOMETRY\nmodel: ascii.geo\n").unwrap();
    std::fs::write(dir.path().join("ascii.geo"), "an ascii geometry\n").unwrap();
    let err = CaseSession::open_case(&ascii, SessionConfig::default());
    assert!(matches!(err, Err(Error::InvalidCaseFile { .. })));
}

#[test]
fn several_timesets_need_an_index() {
    let dir = tempfile::tempdir().unwrap();
    let time_sets = vec![
        TimeSet::new(1, vec![0.0, 1.0]),
        TimeSet::new(2, vec![0.0, 5.0, 10.0]),
    ];
    let path = common::static_case(dir.path(), common::strip_part(2), time_sets);

    let session = CaseSession::open_case(&path, SessionConfig::default()).unwrap();
    match session.timeset() {
        Err(Error::UnsupportedTimeSetCount(count)) => {
            assert_eq!(count.found, 2);
            assert_eq!(count.requested, None);
        }
        other => panic!("expected UnsupportedTimeSetCount, got {other:?}"),
    }

    let config = SessionConfig::default().with_timeset_index(1);
    let session = CaseSession::open_case(&path, config).unwrap();
    let (timeset, steps) = session.timeset().unwrap();
    assert_eq!(timeset.id, 2);
    assert_eq!(steps, 3);
}

#[test]
fn static_case_without_timeset() {
    let dir = tempfile::tempdir().unwrap();
    let path = common::static_case(dir.path(), common::strip_part(3), Vec::new());

    let mut session = CaseSession::open_case(&path, SessionConfig::default()).unwrap();
    assert!(matches!(
        session.timeset(),
        Err(Error::UnsupportedTimeSetCount(_))
    ));

    // the mesh and field are still readable at any time
    session.mesh().unwrap();
    let sample = session.read_timestep(0.0).unwrap();
    assert_eq!(sample.to_vec(), vec![0.0, 1.0, 2.0]);
}

#[test]
fn quads_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let coordinates = arr2(&[
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [1.0, 1.0, 0.0],
        [0.0, 1.0, 0.0],
        [2.0, 0.0, 0.0],
    ]);
    let part = Part::new(1, "mixed", coordinates)
        .with_block(ElementBlock::uniform(ElementType::Tria3, vec![1, 4, 2]).unwrap())
        .with_block(ElementBlock::uniform(ElementType::Quad4, vec![0, 1, 2, 3]).unwrap());
    let path = common::static_case(dir.path(), part, vec![TimeSet::new(1, vec![0.0])]);

    let mut session = CaseSession::open_case(&path, SessionConfig::default()).unwrap();
    match session.mesh() {
        Err(Error::UnsupportedCellShape(shape)) => {
            assert_eq!(shape.cell, 1);
            assert_eq!(shape.element, ElementType::Quad4);
            assert_eq!(shape.points, 4);
        }
        other => panic!("expected UnsupportedCellShape, got {other:?}"),
    }
    assert_eq!(session.state(), SessionState::Opened);
}

#[test]
fn three_sided_polygons_are_triangles() {
    let dir = tempfile::tempdir().unwrap();
    let coordinates = Array2::from_shape_fn((4, 3), |(node, axis)| (node * 3 + axis) as f64);
    let block = ElementBlock::nsided(&[3, 3], vec![0, 1, 2, 1, 2, 3]).unwrap();
    let part = Part::new(1, "polygons", coordinates).with_block(block);
    let path = common::static_case(dir.path(), part, vec![TimeSet::new(1, vec![0.0])]);

    let mut session = CaseSession::open_case(&path, SessionConfig::default()).unwrap();
    let mesh = session.mesh().unwrap();
    assert_eq!(mesh.num_cells(), 2);
    assert_eq!(mesh.triangle(1)[2], [9.0, 10.0, 11.0]);
}

#[test]
fn changing_cell_count_is_a_mismatch() {
    let dir = tempfile::tempdir().unwrap();

    for (step, cells) in [2usize, 3].into_iter().enumerate() {
        let part = common::strip_part(cells);
        let values: Vec<f64> = (0..cells).map(|c| c as f64).collect();
        common::write_geo(dir.path(), &format!("moving{step}.geo"), &common::geometry(vec![part.clone()]));
        common::write_scalar(dir.path(), &format!("moving{step}.shading"), &part, &values);
    }

    let mut case = CaseFile::new(GeometryEntry::new("moving*.geo").with_time_set(1));
    case.variables.push(
        VariableEntry::per_element(VariableShape::Scalar, "shading_coefficient", "moving*.shading")
            .with_time_set(1),
    );
    case.time_sets.push(TimeSet::new(1, vec![0.0, 60.0]));
    let path = common::write_case_file(dir.path(), "moving.case", &case);

    let mut session = CaseSession::open_case(&path, SessionConfig::default()).unwrap();
    assert_eq!(session.mesh().unwrap().num_cells(), 2);
    assert_eq!(session.read_timestep(0.0).unwrap().len(), 2);

    match session.read_timestep(60.0) {
        Err(Error::CellCountMismatch(mismatch)) => {
            assert_eq!(mismatch.expected, 2);
            assert_eq!(mismatch.actual, 3);
            assert_eq!(mismatch.time, 60.0);
        }
        other => panic!("expected CellCountMismatch, got {other:?}"),
    }
}

#[test]
fn vector_fields_use_the_first_component() {
    let dir = tempfile::tempdir().unwrap();
    let part = common::strip_part(2);
    common::write_geo(dir.path(), "wind.geo", &common::geometry(vec![part.clone()]));

    let array = ensight::CellArray::new(arr2(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]])).unwrap();
    let blocks = ensight::write_ensight::VariableBlock::from_part(&part, &array).unwrap();
    let file = std::fs::File::create(dir.path().join("wind.vel")).unwrap();
    ensight::write_ensight::write_element_variable::<LittleEndian, _>(file, "wind", &[(1, blocks)])
        .unwrap();

    let mut case = CaseFile::new(GeometryEntry::new("wind.geo"));
    case.variables
        .push(VariableEntry::per_element(VariableShape::Vector, "wind", "wind.vel"));
    case.time_sets.push(TimeSet::new(1, vec![0.0]));
    let path = common::write_case_file(dir.path(), "wind.case", &case);

    let config = SessionConfig::default().with_field_name("wind");
    let mut session = CaseSession::open_case(&path, config).unwrap();
    session.mesh().unwrap();
    assert_eq!(session.read_timestep(0.0).unwrap().to_vec(), vec![1.0, 4.0]);
}

#[test]
fn read_all_collects_every_step() {
    let dir = tempfile::tempdir().unwrap();
    let times = [0.0, 1.0, 2.0];
    let (path, mesh, samples) = common::basic_case(dir.path(), 3, &times);

    let mut session = CaseSession::open_case(&path, SessionConfig::default()).unwrap();
    let data = session.read_all().unwrap();

    assert_eq!(data.mesh, mesh);
    assert_eq!(data.times, times.to_vec());
    assert_eq!(data.values.shape(), &[3, 3]);
    for (step, sample) in samples.iter().enumerate() {
        assert_eq!(data.sample(step).as_ref(), Some(sample));
    }
    assert!(data.sample(3).is_none());

    // export and read back through a fresh session
    let export = tempfile::tempdir().unwrap();
    let exported = data.write(export.path(), "export", "shading_coefficient").unwrap();
    let again = CaseSession::open_case(&exported, SessionConfig::default())
        .unwrap()
        .read_all()
        .unwrap();
    assert_eq!(again, data);
}

#[test]
fn timesteps_iterator() {
    let dir = tempfile::tempdir().unwrap();
    let (path, _, samples) = common::basic_case(dir.path(), 2, &[5.0, 6.0]);

    let mut session = CaseSession::open_case(&path, SessionConfig::default()).unwrap();
    session.mesh().unwrap();

    let steps = session.timesteps().unwrap();
    assert_eq!(steps.len(), 2);

    let read: Vec<_> = steps.map(|(time, sample)| (time, sample.unwrap())).collect();
    assert_eq!(read, vec![(5.0, samples[0].clone()), (6.0, samples[1].clone())]);
}

#[test]
fn moving_nodes_keep_the_connectivity() {
    let dir = tempfile::tempdir().unwrap();
    let part = common::strip_part(2);
    common::write_geo(dir.path(), "roof00.geo", &common::geometry(vec![part.clone()]));

    // the second step only stores the nodes, lifted by one
    let lifted = Part::new(1, "roof", &part.coordinates + 1.0);
    common::write_geo(dir.path(), "roof01.geo", &common::geometry(vec![lifted]));

    common::write_scalar(dir.path(), "roof.shade00", &part, &[1.0, 2.0]);
    common::write_scalar(dir.path(), "roof.shade01", &part, &[3.0, 4.0]);

    let mut geometry = GeometryEntry::new("roof**.geo").with_time_set(1);
    geometry.change_coords_only = true;
    let mut case = CaseFile::new(geometry);
    case.variables.push(
        VariableEntry::per_element(VariableShape::Scalar, "shading_coefficient", "roof.shade**")
            .with_time_set(1),
    );
    case.time_sets.push(TimeSet::new(1, vec![0.0, 1.0]));
    let path = common::write_case_file(dir.path(), "roof.case", &case);

    let mut session = CaseSession::open_case(&path, SessionConfig::default()).unwrap();
    let first = session.mesh().unwrap().clone();
    assert_eq!(first.num_cells(), 2);

    assert_eq!(session.read_timestep(0.0).unwrap().to_vec(), vec![1.0, 2.0]);
    assert_eq!(session.read_timestep(1.0).unwrap().to_vec(), vec![3.0, 4.0]);

    // a snapshot taken at the second step has the same cells on the moved nodes
    let second = session.mesh().unwrap();
    assert_eq!(second.num_cells(), 2);
    assert_eq!(second.triangle(0)[0][2], first.triangle(0)[0][2] + 1.0);
}
