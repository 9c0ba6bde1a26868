//! Generator settings, read from an optional `genmethods.toml` in the target package.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::LoadError;

/// Name of the optional config file looked up in the package directory.
pub const CONFIG_FILE_NAME: &str = "genmethods.toml";

/// Default name of the generated artifact.
pub const DEFAULT_OUTPUT_FILE: &str = "method_gen.rs";

/// Order in which eligible structs are emitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StructOrder {
    /// Byte-wise lexicographic order of the struct names.
    #[default]
    Name,
    /// Order of declaration in the package entry file.
    Source,
}

/// The method emitted for every eligible struct.
///
/// The body is plain Rust statement text with `self` bound to `&Self`.
/// Items it references by bare name are imported by the canonicalizer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MethodTemplate {
    pub name: String,
    pub doc: String,
    pub body: String,
}

impl MethodTemplate {
    pub fn new(name: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            doc: String::new(),
            body: body.into(),
        }
    }

    /// Set the doc line placed above every generated method.
    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = doc.into();
        self
    }
}

impl Default for MethodTemplate {
    fn default() -> Self {
        Self {
            name: "print_type".to_string(),
            doc: "Prints the receiver's type name to standard output.".to_string(),
            body: r#"println!("{}", type_name_of_val(self));"#.to_string(),
        }
    }
}

/// Contents of `genmethods.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    pub output_file: String,
    pub order: StructOrder,
    pub method: MethodTemplate,
    /// Extra name → path mappings offered to import resolution.
    pub imports: BTreeMap<String, String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            output_file: DEFAULT_OUTPUT_FILE.to_string(),
            order: StructOrder::default(),
            method: MethodTemplate::default(),
            imports: BTreeMap::new(),
        }
    }
}

impl GeneratorConfig {
    /// Load `genmethods.toml` from the package directory, if present.
    pub fn load(package_dir: &Path) -> Result<Option<Self>, LoadError> {
        let path = package_dir.join(CONFIG_FILE_NAME);
        if !path.is_file() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&path).map_err(|source| LoadError::Read {
            path: path.clone(),
            source,
        })?;
        let config = Self::from_toml(&content).map_err(|message| LoadError::Config {
            path: path.clone(),
            message,
        })?;

        Ok(Some(config))
    }

    /// Parse and validate config text.
    pub fn from_toml(content: &str) -> Result<Self, String> {
        let config: Self = toml::from_str(content).map_err(|e| e.message().to_string())?;
        config.validate()?;
        Ok(config)
    }

    /// Check the settings that would otherwise surface as confusing failures later on.
    pub fn validate(&self) -> Result<(), String> {
        let output = Path::new(&self.output_file);
        let is_plain_name = output.file_name().is_some_and(|name| name == output.as_os_str());
        if !is_plain_name || output.extension().is_none_or(|ext| ext != "rs") {
            return Err(format!(
                "output_file must be a plain `.rs` file name, got `{}`",
                self.output_file
            ));
        }
        if syn::parse_str::<syn::Ident>(&self.method.name).is_err() {
            return Err(format!("method name `{}` is not a valid identifier", self.method.name));
        }
        Ok(())
    }

    /// Module name the package uses to include the artifact.
    pub fn output_module(&self) -> &str {
        Path::new(&self.output_file)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or(&self.output_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = GeneratorConfig::from_toml("").unwrap();
        assert_eq!(config, GeneratorConfig::default());
        assert_eq!(config.output_module(), "method_gen");
    }

    #[test]
    fn test_partial_method_table() {
        let config = GeneratorConfig::from_toml(
            r#"
            order = "source"

            [method]
            name = "describe"
            "#,
        )
        .unwrap();

        assert_eq!(config.order, StructOrder::Source);
        assert_eq!(config.method.name, "describe");
        assert_eq!(config.method.body, MethodTemplate::default().body);
    }

    #[test]
    fn test_rejects_nested_output_path() {
        let err = GeneratorConfig::from_toml(r#"output_file = "gen/out.rs""#).unwrap_err();
        assert!(err.contains("plain `.rs` file name"));
    }

    #[test]
    fn test_rejects_keyword_method_name() {
        let err = GeneratorConfig::from_toml("[method]\nname = \"fn\"").unwrap_err();
        assert!(err.contains("not a valid identifier"));
    }

    #[test]
    fn test_rejects_unknown_keys() {
        assert!(GeneratorConfig::from_toml("outputs = 1").is_err());
    }

    #[test]
    fn test_load_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(GeneratorConfig::load(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_load_invalid_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "order = \"random\"").unwrap();

        let err = GeneratorConfig::load(dir.path()).unwrap_err();
        assert!(matches!(err, LoadError::Config { .. }));
    }
}
