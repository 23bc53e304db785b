#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

/// XML fixtures under `tests/documents/<format>/<category>`, sorted by name
pub fn documents(format: &str, category: &str) -> Vec<PathBuf> {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/documents")
        .join(format)
        .join(category);
    let mut files: Vec<PathBuf> = fs::read_dir(&dir)
        .unwrap_or_else(|err| panic!("cannot list {}: {err}", dir.display()))
        .map(|entry| entry.unwrap().path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "xml"))
        .collect();
    files.sort();
    assert!(!files.is_empty(), "no fixtures in {}", dir.display());
    files
}

pub fn document(format: &str, category: &str, name: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/documents")
        .join(format)
        .join(category)
        .join(name);
    read(&path)
}

pub fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap_or_else(|err| panic!("cannot read {}: {err}", path.display()))
}

/// The golden JSON stored next to a valid fixture
pub fn expected_json(path: &Path) -> serde_json::Value {
    let golden = path.with_extension("expected.json");
    serde_json::from_str(&read(&golden))
        .unwrap_or_else(|err| panic!("invalid golden file {}: {err}", golden.display()))
}

pub fn name(path: &Path) -> String {
    path.file_name().unwrap().to_string_lossy().into_owned()
}

pub fn violation_paths(err: &vast_vmap::Error) -> Vec<String> {
    match err {
        vast_vmap::Error::Validation(err) => err.details().iter().map(|v| v.path.clone()).collect(),
        other => panic!("expected a validation error, got {other:?}"),
    }
}
