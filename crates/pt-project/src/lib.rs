//! pt-project: topology description format and loader.

pub mod schema;
pub mod validate;

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::debug;

pub use schema::*;
pub use validate::{LATEST_VERSION, SyntaxError, check_syntax};

pub type ProjectResult<T> = Result<T, ProjectError>;

/// Where in a description file a problem was found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileContext {
    pub path: Option<PathBuf>,
    pub line: Option<usize>,
    pub column: Option<usize>,
    pub field: Option<String>,
}

impl fmt::Display for FileContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "{}", path.display())?,
            None => f.write_str("<input>")?,
        }
        if let Some(line) = self.line {
            write!(f, ":{line}")?;
            if let Some(column) = self.column {
                write!(f, ":{column}")?;
            }
        }
        if let Some(field) = &self.field {
            write!(f, " ({field})")?;
        }
        Ok(())
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ProjectError {
    #[error("Malformed topology file at {context}: {message}")]
    MalformedTopologyFile { context: FileContext, message: String },

    #[error("Unsupported topology version {version} (latest is {latest})")]
    UnsupportedVersion { version: u32, latest: u32 },

    #[error("Failed to read topology file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Load a YAML description from disk.
///
/// The file is read in full and released before parsing starts.
pub fn load_yaml(path: &Path) -> ProjectResult<TopologyDef> {
    let content = read(path)?;
    parse_yaml(&content, Some(path))
}

/// Load a JSON description from disk.
pub fn load_json(path: &Path) -> ProjectResult<TopologyDef> {
    let content = read(path)?;
    parse_json(&content, Some(path))
}

pub fn from_yaml_str(content: &str) -> ProjectResult<TopologyDef> {
    parse_yaml(content, None)
}

pub fn from_json_str(content: &str) -> ProjectResult<TopologyDef> {
    parse_json(content, None)
}

pub fn to_yaml_string(topology: &TopologyDef) -> ProjectResult<String> {
    serde_yaml::to_string(topology).map_err(|e| ProjectError::Serialization(e.to_string()))
}

fn read(path: &Path) -> ProjectResult<String> {
    std::fs::read_to_string(path).map_err(|source| ProjectError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_yaml(content: &str, path: Option<&Path>) -> ProjectResult<TopologyDef> {
    let topology: TopologyDef = serde_yaml::from_str(content).map_err(|e| {
        let location = e.location();
        ProjectError::MalformedTopologyFile {
            context: FileContext {
                path: path.map(Path::to_path_buf),
                line: location.as_ref().map(|l| l.line()),
                column: location.as_ref().map(|l| l.column()),
                field: None,
            },
            message: e.to_string(),
        }
    })?;
    finish(topology, path)
}

fn parse_json(content: &str, path: Option<&Path>) -> ProjectResult<TopologyDef> {
    let topology: TopologyDef = serde_json::from_str(content).map_err(|e| {
        ProjectError::MalformedTopologyFile {
            context: FileContext {
                path: path.map(Path::to_path_buf),
                line: Some(e.line()),
                column: Some(e.column()),
                field: None,
            },
            message: e.to_string(),
        }
    })?;
    finish(topology, path)
}

fn finish(topology: TopologyDef, path: Option<&Path>) -> ProjectResult<TopologyDef> {
    if topology.version == 0 || topology.version > LATEST_VERSION {
        return Err(ProjectError::UnsupportedVersion {
            version: topology.version,
            latest: LATEST_VERSION,
        });
    }

    check_syntax(&topology).map_err(|e| ProjectError::MalformedTopologyFile {
        context: FileContext {
            path: path.map(Path::to_path_buf),
            line: None,
            column: None,
            field: Some(e.field),
        },
        message: e.message,
    })?;

    debug!(
        name = %topology.name,
        components = topology.components.len(),
        connections = topology.connections.len(),
        "loaded topology description"
    );
    Ok(topology)
}
