//! JSON files as CommonJS modules.
use serde_json::Value;

use super::{TransformError, TransformOutput};

/// Validate the JSON and export it as the module value.
pub(super) fn transform(
    source: &str,
) -> Result<TransformOutput, TransformError> {
    let value: Value = serde_json::from_str(source).map_err(|e| {
        TransformError::new(format!("invalid JSON module: {}", e))
    })?;
    let json = serde_json::to_string(&value)
        .map_err(|e| TransformError::new(e.to_string()))?;
    Ok(TransformOutput {
        code: format!("module.exports = {};\n", json),
        dependencies: vec![],
    })
}
