#![cfg(feature = "fetch")]

mod common;

use ensight::fetch::extract_archive;
use ensight::{CaseSession, Error, SessionConfig};
use std::io::{Cursor, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;

fn zip_dir(dir: &Path, prefix: &str) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();

    let mut names: Vec<_> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().into_string().unwrap())
        .collect();
    // the case file is listed first
    names.sort_by_key(|name| (!name.ends_with(".case"), name.clone()));

    if !prefix.is_empty() {
        writer.add_directory(prefix, options).unwrap();
    }

    for name in names {
        writer.start_file(format!("{prefix}{name}"), options).unwrap();
        writer.write_all(&std::fs::read(dir.join(&name)).unwrap()).unwrap();
    }

    writer.finish().unwrap().into_inner()
}

#[test]
fn extracted_case_opens() {
    let source = tempfile::tempdir().unwrap();
    let (_, mesh, samples) = common::basic_case(source.path(), 3, &[0.0, 1.0]);
    let bytes = zip_dir(source.path(), "");

    let target = tempfile::tempdir().unwrap();
    let download = extract_archive(&bytes, target.path()).unwrap();
    assert_eq!(download.path(), target.path().join("basic.case"));
    assert_eq!(download.files().len(), 4);

    let mut session = CaseSession::open_case(download.path(), SessionConfig::default()).unwrap();
    assert_eq!(session.mesh().unwrap(), &mesh);
    assert_eq!(session.read_timestep(1.0).unwrap(), samples[1]);
}

#[test]
fn delete_is_idempotent() {
    let source = tempfile::tempdir().unwrap();
    common::basic_case(source.path(), 2, &[0.0]);
    let bytes = zip_dir(source.path(), "solar/");

    let target = tempfile::tempdir().unwrap();
    let mut download = extract_archive(&bytes, target.path()).unwrap();
    assert_eq!(download.path(), target.path().join("solar/"));
    assert!(target.path().join("solar/basic.case").exists());

    download.delete().unwrap();
    assert!(!target.path().join("solar").exists());
    assert!(download.files().is_empty());

    download.delete().unwrap();
}

#[test]
fn dropping_the_download_cleans_up() {
    let source = tempfile::tempdir().unwrap();
    common::basic_case(source.path(), 2, &[0.0]);
    let bytes = zip_dir(source.path(), "");

    let target = tempfile::tempdir().unwrap();
    let case_path = {
        let download = extract_archive(&bytes, target.path()).unwrap();
        download.path().to_path_buf()
    };

    assert!(!case_path.exists());
    assert_eq!(std::fs::read_dir(target.path()).unwrap().count(), 0);
}

#[test]
fn persisted_download_stays() {
    let source = tempfile::tempdir().unwrap();
    common::basic_case(source.path(), 2, &[0.0]);
    let bytes = zip_dir(source.path(), "");

    let target = tempfile::tempdir().unwrap();
    let case_path = extract_archive(&bytes, target.path()).unwrap().persist();

    assert!(case_path.exists());
    CaseSession::open_case(&case_path, SessionConfig::default()).unwrap();
}

#[test]
fn non_zip_payload_is_unsupported() {
    let target = tempfile::tempdir().unwrap();
    let err = extract_archive(b"<html>not found</html>", target.path()).unwrap_err();
    assert!(matches!(err, Error::UnsupportedArchiveFormat(_)));
    assert_eq!(std::fs::read_dir(target.path()).unwrap().count(), 0);
}

#[test]
fn empty_archive_is_unsupported() {
    let bytes = zip::ZipWriter::new(Cursor::new(Vec::new()))
        .finish()
        .unwrap()
        .into_inner();

    let target = tempfile::tempdir().unwrap();
    let err = extract_archive(&bytes, target.path()).unwrap_err();
    assert!(matches!(err, Error::UnsupportedArchiveFormat(_)));
}

#[test]
fn existing_files_are_left_alone() {
    let source = tempfile::tempdir().unwrap();
    common::basic_case(source.path(), 2, &[0.0]);
    let bytes = zip_dir(source.path(), "");

    let target = tempfile::tempdir().unwrap();
    let existing = target.path().join("basic.geo");
    std::fs::write(&existing, b"not a geometry").unwrap();

    let err = extract_archive(&bytes, target.path()).unwrap_err();
    match err {
        Error::Io(e) => assert_eq!(e.kind(), std::io::ErrorKind::AlreadyExists),
        other => panic!("expected an io error, got {other:?}"),
    }

    // the case file was extracted before the clash and removed again
    assert!(!target.path().join("basic.case").exists());
    assert_eq!(std::fs::read(&existing).unwrap(), b"not a geometry");
}
