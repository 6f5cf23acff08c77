//! Load bundle configuration files.
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::{
    bundler::{BundleOptions, EmitOptions},
    graph::GraphOptions,
    resolver::ResolveOptions,
};

/// Configuration for a bundle.
///
/// Every field is optional in the file; command line flags take
/// precedence over the file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct BundleConfig {
    /// Entry point module.
    pub entry: Option<PathBuf>,
    /// Destination for the artifact, standard output when absent.
    pub output: Option<PathBuf>,
    /// Variable that receives the exports of the entry module.
    pub global_name: Option<String>,
    /// Extensions appended to a specifier during resolution.
    pub extensions: Vec<String>,
    /// File names tried when a specifier names a directory.
    pub index_files: Vec<String>,
    /// Read and transform modules in parallel.
    pub parallel: bool,
}

impl Default for BundleConfig {
    fn default() -> Self {
        let resolve = ResolveOptions::default();
        Self {
            entry: None,
            output: None,
            global_name: None,
            extensions: resolve.extensions,
            index_files: resolve.index_files,
            parallel: true,
        }
    }
}

impl BundleConfig {
    /// Load a configuration file.
    ///
    /// Relative `entry` and `output` paths are resolved against the
    /// directory containing the file.
    pub fn load<P: AsRef<Path>>(file: P) -> Result<Self> {
        let file = file.as_ref();
        let f = File::open(file).context(format!(
            "Unable to open config file {}",
            file.display()
        ))?;
        let reader = BufReader::new(f);
        let mut config: BundleConfig = serde_json::from_reader(reader)
            .context(format!("Failed to parse JSON in {}", file.display()))?;

        if let Some(dir) = file.parent() {
            config.entry = config.entry.map(|p| dir.join(p));
            config.output = config.output.map(|p| dir.join(p));
        }
        log::debug!("Loaded config {}", file.display());
        Ok(config)
    }

    /// The entry point, which must be configured.
    pub fn entry(&self) -> Result<&Path> {
        match &self.entry {
            Some(entry) => Ok(entry),
            None => bail!(
                "No entry point given on the command line or in the config file"
            ),
        }
    }

    /// Check the configuration and convert it to bundle options.
    pub fn options(&self) -> Result<BundleOptions> {
        if let Some(name) = &self.global_name {
            if !is_identifier(name) {
                bail!("Global name {:?} is not a valid identifier", name);
            }
        }
        for ext in &self.extensions {
            if !ext.starts_with('.') {
                bail!("Extension {:?} must begin with a period", ext);
            }
        }
        Ok(BundleOptions {
            graph: GraphOptions {
                resolve: ResolveOptions {
                    extensions: self.extensions.clone(),
                    index_files: self.index_files.clone(),
                },
                parallel: self.parallel,
            },
            emit: EmitOptions {
                global_name: self.global_name.clone(),
            },
        })
    }
}

/// Words that cannot name a variable in strict or sloppy mode.
const RESERVED_WORDS: &[&str] = &[
    "await", "break", "case", "catch", "class", "const", "continue",
    "debugger", "default", "delete", "do", "else", "enum", "export",
    "extends", "false", "finally", "for", "function", "if", "implements",
    "import", "in", "instanceof", "interface", "let", "new", "null",
    "package", "private", "protected", "public", "return", "static",
    "super", "switch", "this", "throw", "true", "try", "typeof", "var",
    "void", "while", "with", "yield",
];

/// Determine if a name can be declared with `var`.
fn is_identifier(name: &str) -> bool {
    if RESERVED_WORDS.contains(&name) {
        return false;
    }
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c == '_' || c == '$' || c.is_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c == '$' || c.is_alphanumeric())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_config(json: &str) -> Result<(tempfile::TempDir, PathBuf)> {
        let dir = tempfile::tempdir()?;
        let file = dir.path().join("cinder.json");
        let mut f = File::create(&file)?;
        f.write_all(json.as_bytes())?;
        Ok((dir, file))
    }

    #[test]
    fn defaults() -> Result<()> {
        let config = BundleConfig::default();
        let options = config.options()?;
        assert_eq!(vec![".js", ".json"], options.graph.resolve.extensions);
        assert!(options.graph.parallel);
        assert!(options.emit.global_name.is_none());
        assert!(config.entry().is_err());
        Ok(())
    }

    #[test]
    fn load_partial_config() -> Result<()> {
        let (dir, file) =
            write_config(r#"{"entry": "src/main.js", "globalName": "App"}"#)?;
        let config = BundleConfig::load(&file)?;
        assert_eq!(dir.path().join("src/main.js"), config.entry()?);
        assert_eq!(Some("App"), config.global_name.as_deref());
        assert_eq!(vec![".js", ".json"], config.extensions);
        assert!(config.parallel);
        Ok(())
    }

    #[test]
    fn load_resolution_settings() -> Result<()> {
        let (_dir, file) = write_config(
            r#"{"extensions": [".mjs"], "indexFiles": ["main"], "parallel": false}"#,
        )?;
        let options = BundleConfig::load(&file)?.options()?;
        assert_eq!(vec![".mjs"], options.graph.resolve.extensions);
        assert_eq!(vec!["main"], options.graph.resolve.index_files);
        assert!(!options.graph.parallel);
        Ok(())
    }

    #[test]
    fn reject_unknown_field() -> Result<()> {
        let (_dir, file) = write_config(r#"{"entyr": "main.js"}"#)?;
        assert!(BundleConfig::load(&file).is_err());
        Ok(())
    }

    #[test]
    fn missing_config_file() {
        assert!(BundleConfig::load("/no/such/cinder.json").is_err());
    }

    #[test]
    fn reject_invalid_global_name() {
        let config = BundleConfig {
            global_name: Some(String::from("my-lib")),
            ..Default::default()
        };
        assert!(config.options().is_err());
        assert!(is_identifier("$lib_2"));
        assert!(!is_identifier("2lib"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("class"));
        assert!(!is_identifier("var"));
        assert!(is_identifier("classes"));

        let config = BundleConfig {
            global_name: Some(String::from("default")),
            ..Default::default()
        };
        assert!(config.options().is_err());
    }
}
