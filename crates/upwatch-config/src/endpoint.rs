//! Endpoint records and the YAML loader.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::{ConfigError, ConfigResult};

/// One configured probe target.
#[derive(Debug, Clone, Deserialize)]
pub struct Endpoint {
    /// Identifier used in diagnostic log lines.
    pub name: String,
    /// Target address, as written in the file.
    pub url: String,
    /// HTTP method, applied verbatim.
    pub method: String,
    /// Request headers. Duplicate keys resolve to the later value.
    #[serde(default)]
    pub headers: HashMap<String, String>,
    /// Optional request body; probes send an empty body when absent.
    #[serde(default)]
    pub body: Option<String>,
}

/// Load the endpoint list from a YAML file.
///
/// An empty sequence is valid; a missing file or malformed content is not,
/// and the caller is expected to treat either as fatal.
pub fn load_endpoints(path: &Path) -> ConfigResult<Vec<Endpoint>> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.display().to_string(),
        source: e,
    })?;

    let endpoints: Vec<Endpoint> =
        serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            source: e,
        })?;

    Ok(endpoints)
}
