use crate::types::SourceFile;
use std::io::{Cursor, Read};
use std::path::Path;

/// One input as read from disk: a document to parse, or the reason the path
/// (or archive) could not be read.
#[derive(Debug)]
pub enum InputEntry {
    File(SourceFile),
    Failed { label: String, message: String },
}

/// Reads every path in order. `.zip` archives expand in place into their
/// `.xml` entries, labeled `<archive>/<entry>`.
pub fn load_inputs<P: AsRef<Path>>(paths: &[P]) -> Vec<InputEntry> {
    let mut entries = Vec::new();
    for path in paths {
        let path = path.as_ref();
        let label = file_label(path);
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                entries.push(InputEntry::Failed {
                    label,
                    message: e.to_string(),
                });
                continue;
            }
        };

        if is_zip(&label) {
            match expand_zip(&label, bytes) {
                Ok(files) => entries.extend(files.into_iter().map(InputEntry::File)),
                Err(message) => entries.push(InputEntry::Failed { label, message }),
            }
        } else {
            entries.push(InputEntry::File(SourceFile::new(label, bytes)));
        }
    }
    entries
}

/// XML entries of an archive, in archive order.
pub fn expand_zip(label: &str, bytes: Vec<u8>) -> Result<Vec<SourceFile>, String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| format!("Failed to open ZIP archive: {e}"))?;

    let mut files = Vec::new();
    for index in 0..archive.len() {
        let mut entry = archive
            .by_index(index)
            .map_err(|e| format!("Failed to read ZIP entry {index}: {e}"))?;
        if entry.is_dir() || !entry.name().to_lowercase().ends_with(".xml") {
            continue;
        }
        let name = format!("{label}/{}", entry.name());
        // Declared entry sizes are not trusted.
        let mut content = Vec::new();
        entry
            .read_to_end(&mut content)
            .map_err(|e| format!("Failed to extract {name}: {e}"))?;
        files.push(SourceFile::new(name, content));
    }
    Ok(files)
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn is_zip(label: &str) -> bool {
    label.to_lowercase().ends_with(".zip")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn build_zip(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, content) in entries {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_expand_zip_keeps_xml_entries_in_order() {
        let bytes = build_zip(&[
            ("b.xml", "<titulo/>"),
            ("leiame.txt", "ignore"),
            ("lote/A.XML", "<titulo/>"),
        ]);
        let files = expand_zip("lote.zip", bytes).unwrap();
        let names: Vec<_> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["lote.zip/b.xml", "lote.zip/lote/A.XML"]);
        assert_eq!(files[0].content, b"<titulo/>");
    }

    #[test]
    fn test_expand_zip_rejects_garbage() {
        assert!(expand_zip("x.zip", b"not a zip".to_vec()).is_err());
    }

    #[test]
    fn test_load_inputs_keeps_failures_in_input_order() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("a.xml");
        std::fs::write(&first, "<titulo/>").unwrap();
        let missing = dir.path().join("missing.xml");
        let bundle = dir.path().join("lote.zip");
        std::fs::write(&bundle, build_zip(&[("b.xml", "<titulo/>")])).unwrap();
        let broken = dir.path().join("quebrado.zip");
        std::fs::write(&broken, "not a zip").unwrap();

        let loaded = load_inputs(&[first, missing, bundle, broken]);
        let labels: Vec<_> = loaded
            .iter()
            .map(|entry| match entry {
                InputEntry::File(file) => format!("ok {}", file.name),
                InputEntry::Failed { label, .. } => format!("err {label}"),
            })
            .collect();
        assert_eq!(
            labels,
            vec!["ok a.xml", "err missing.xml", "ok lote.zip/b.xml", "err quebrado.zip"]
        );
    }
}
