#![allow(dead_code)]
use cancelamento::types::SourceFile;
use std::path::Path;

pub fn fixtures_dir() -> String {
    format!("{}/tests/fixtures", env!("CARGO_MANIFEST_DIR"))
}

pub fn load_fixture(filename: &str) -> Vec<u8> {
    let path = Path::new(&fixtures_dir()).join(filename);
    std::fs::read(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", path.display(), e))
}

/// A fixture uploaded under its own file name.
pub fn fixture_file(filename: &str) -> SourceFile {
    SourceFile::new(filename, load_fixture(filename))
}

pub fn inline_file(name: &str, xml: &str) -> SourceFile {
    SourceFile::new(name, xml.as_bytes().to_vec())
}
