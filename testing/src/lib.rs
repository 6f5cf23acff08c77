//! Helpers shared by the integration tests.
use std::path::Path;
use std::process::Command;

use anyhow::{bail, Result};

/// Read a file normalizing line endings.
pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
    let mut content = std::fs::read_to_string(path)?;
    if cfg!(target_os = "windows") {
        content = content.replace("\r\n", "\n");
    }
    Ok(content)
}

/// Determine if `node` can be executed.
pub fn has_node() -> bool {
    Command::new("node")
        .arg("--version")
        .output()
        .map(|out| out.status.success())
        .unwrap_or(false)
}

/// Execute a script file with `node` and return standard output.
pub fn run_node<P: AsRef<Path>>(script: P) -> Result<String> {
    let out = Command::new("node").arg(script.as_ref()).output()?;
    if !out.status.success() {
        bail!(
            "node exited with {}: {}",
            out.status,
            String::from_utf8_lossy(&out.stderr)
        );
    }
    Ok(String::from_utf8(out.stdout)?)
}
