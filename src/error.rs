use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid graph JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(
        "elkjs not found (install it, e.g. `npm install -g elkjs`); searched: {}",
        display_paths(.searched)
    )]
    LayoutUnavailable { searched: Vec<PathBuf> },

    #[error("layout failed: {0}")]
    Layout(String),

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("PNG conversion failed: {0}")]
    Conversion(String),

    #[error("invalid config: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    if paths.is_empty() {
        return "(nothing)".to_string();
    }
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
