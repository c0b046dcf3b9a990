use std::path::PathBuf;

/// Deployment configuration consumed by the registry and the serving layer.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_dir: PathBuf,
    pub snapshot_extension: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: 3000,
            data_dir: PathBuf::from("./data"),
            snapshot_extension: "bin".to_string(),
        }
    }
}

impl Config {
    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }
}
