use crate::error::Result;
use crate::models::Execution;
use std::fs;
use std::path::Path;

/// Load an execution document. `.json` files are read as JSON, anything else
/// as YAML.
pub fn load_execution<P: AsRef<Path>>(path: P) -> Result<Execution> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let execution = if is_json {
        serde_json::from_str(&content)?
    } else {
        serde_yaml::from_str(&content)?
    };

    Ok(execution)
}
