//! Plan loader
//!
//! Load execution plans from YAML files or directories.

use std::path::Path;

use super::ExecutionPlan;
use super::config::CONFIG_FILE_NAMES;

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error in {file}: {error}")]
    Yaml {
        file: String,
        error: serde_yaml::Error,
    },
}

pub struct PlanLoader;

impl PlanLoader {
    /// Load every plan in a directory, sorted by file name
    pub fn load_directory(dir: &Path) -> Result<Vec<ExecutionPlan>, LoadError> {
        let mut paths = Vec::new();

        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();

            if path.is_file() {
                let ext = path.extension().and_then(|e| e.to_str());
                let filename = path.file_name().and_then(|n| n.to_str()).unwrap_or("");

                // monitor.yaml configures the simulation, it is not a plan
                if CONFIG_FILE_NAMES.contains(&filename) {
                    continue;
                }

                if ext == Some("yaml") || ext == Some("yml") {
                    paths.push(path);
                }
            }
        }

        paths.sort();
        paths.iter().map(|p| Self::load_file(p)).collect()
    }

    pub fn load_file(path: &Path) -> Result<ExecutionPlan, LoadError> {
        let content = std::fs::read_to_string(path)?;
        serde_yaml::from_str(&content).map_err(|e| LoadError::Yaml {
            file: path.display().to_string(),
            error: e,
        })
    }

    pub fn from_str(content: &str) -> Result<ExecutionPlan, LoadError> {
        serde_yaml::from_str(content).map_err(|e| LoadError::Yaml {
            file: "<inline>".to_string(),
            error: e,
        })
    }
}
