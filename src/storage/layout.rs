use std::fs;
use std::path::PathBuf;

use crate::core::error::Result;

/// Directory structure for snapshot files: one `<name>.index.<ext>` file per
/// collection under the data directory.
#[derive(Debug, Clone)]
pub struct StorageLayout {
    pub data_dir: PathBuf,
    pub extension: String,
}

impl StorageLayout {
    pub fn new(data_dir: PathBuf, extension: &str) -> Result<Self> {
        fs::create_dir_all(&data_dir)?;
        Ok(StorageLayout {
            data_dir,
            extension: extension.to_string(),
        })
    }

    pub fn snapshot_path(&self, collection: &str) -> PathBuf {
        self.data_dir
            .join(format!("{}.index.{}", collection, self.extension))
    }

    /// Collection names recovered from snapshot files on disk, sorted.
    pub fn collection_names(&self) -> Result<Vec<String>> {
        let suffix = format!(".index.{}", self.extension);
        let mut names = Vec::new();

        for entry in fs::read_dir(&self.data_dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                continue;
            };
            if let Some(name) = file_name.strip_suffix(&suffix) {
                if !name.is_empty() {
                    names.push(name.to_string());
                }
            }
        }

        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn snapshot_naming() {
        let dir = TempDir::new().unwrap();
        let layout = StorageLayout::new(dir.path().to_path_buf(), "bin").unwrap();
        assert!(layout
            .snapshot_path("products")
            .ends_with("products.index.bin"));
    }

    #[test]
    fn discovers_collections_from_files() {
        let dir = TempDir::new().unwrap();
        let layout = StorageLayout::new(dir.path().to_path_buf(), "bin").unwrap();
        fs::write(layout.snapshot_path("books"), b"x").unwrap();
        fs::write(layout.snapshot_path("articles"), b"x").unwrap();
        fs::write(dir.path().join("notes.txt"), b"x").unwrap();

        assert_eq!(layout.collection_names().unwrap(), ["articles", "books"]);
    }
}
