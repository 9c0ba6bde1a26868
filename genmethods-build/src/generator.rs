//! The generation pipeline: load → filter → render → canonicalize → write.

use log::{debug, info};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Component, Path, PathBuf};

use crate::canonicalize::{ImportScope, canonicalize};
use crate::catalog::{LoadOptions, PackageCatalog, load_package};
use crate::config::{CONFIG_FILE_NAME, GeneratorConfig, MethodTemplate, StructOrder};
use crate::error::{GenerateError, LoadError};
use crate::filter::{EligibleStruct, select_structs};
use crate::render::{RenderContext, render};
use crate::writer::write_artifact;

/// Pipeline states. A run moves forward one stage at a time and ends in
/// `Done` or, on the first error, `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Loading,
    Filtering,
    Rendering,
    Canonicalizing,
    Writing,
    Done,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Stage::Idle => "idle",
            Stage::Loading => "loading",
            Stage::Filtering => "filtering",
            Stage::Rendering => "rendering",
            Stage::Canonicalizing => "canonicalizing",
            Stage::Writing => "writing",
            Stage::Done => "done",
            Stage::Failed => "failed",
        };
        f.write_str(text)
    }
}

struct StageTracker {
    current: Stage,
}

impl StageTracker {
    fn enter(&mut self, next: Stage) {
        debug!("stage {} -> {}", self.current, next);
        self.current = next;
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone)]
pub struct Generated {
    /// Absolute path of the written artifact.
    pub output_path: PathBuf,
    pub catalog: PackageCatalog,
    /// Structs that received a method, in output order.
    pub structs: Vec<EligibleStruct>,
}

impl Generated {
    pub fn struct_names(&self) -> impl Iterator<Item = &str> {
        self.structs.iter().map(|s| s.name.as_str())
    }
}

/// Builder for configuring and running the method generator.
///
/// Settings made on the builder take precedence over `genmethods.toml`.
pub struct MethodGenerator {
    package_path: PathBuf,
    output_file: Option<String>,
    method: Option<MethodTemplate>,
    order: Option<StructOrder>,
    imports: BTreeMap<String, String>,
    read_config_file: bool,
}

impl MethodGenerator {
    /// Create a generator for the package at `package_path`.
    ///
    /// Relative paths are resolved against the current directory.
    pub fn new(package_path: impl Into<PathBuf>) -> Self {
        Self {
            package_path: package_path.into(),
            output_file: None,
            method: None,
            order: None,
            imports: BTreeMap::new(),
            read_config_file: true,
        }
    }

    /// Set the artifact file name.
    ///
    /// Default: `method_gen.rs`
    pub fn output_file(mut self, name: impl Into<String>) -> Self {
        self.output_file = Some(name.into());
        self
    }

    /// Set the method emitted for every struct.
    pub fn method(mut self, method: MethodTemplate) -> Self {
        self.method = Some(method);
        self
    }

    /// Set the order of the generated methods.
    ///
    /// Default: [`StructOrder::Name`]
    pub fn order(mut self, order: StructOrder) -> Self {
        self.order = Some(order);
        self
    }

    /// Make `name` resolvable in the method body by importing it from `path`.
    pub fn import(mut self, name: impl Into<String>, path: impl Into<String>) -> Self {
        self.imports.insert(name.into(), path.into());
        self
    }

    /// Whether to read `genmethods.toml` from the package directory.
    ///
    /// Default: `true`
    pub fn read_config_file(mut self, enabled: bool) -> Self {
        self.read_config_file = enabled;
        self
    }

    /// Run the pipeline and write the artifact.
    ///
    /// Every run regenerates the artifact from scratch and overwrites it.
    pub fn run(self) -> Result<Generated, GenerateError> {
        let mut tracker = StageTracker { current: Stage::Idle };
        match self.execute(&mut tracker) {
            Ok(generated) => {
                tracker.enter(Stage::Done);
                Ok(generated)
            }
            Err(err) => {
                debug!("{} failed: {err}", err.stage());
                tracker.enter(Stage::Failed);
                Err(err)
            }
        }
    }

    fn execute(self, tracker: &mut StageTracker) -> Result<Generated, GenerateError> {
        tracker.enter(Stage::Loading);
        let package_dir = std::path::absolute(&self.package_path)
            .map(|path| normalize_path(&path))
            .map_err(|source| LoadError::Read {
                path: self.package_path.clone(),
                source,
            })?;
        let config = self.resolve_config(&package_dir)?;
        let options = LoadOptions {
            order: config.order,
            output_module: config.output_module().to_string(),
        };
        let catalog = load_package(&package_dir, &options)?;

        tracker.enter(Stage::Filtering);
        let structs = select_structs(&catalog);
        info!(
            "{}: {} eligible struct(s) out of {} declaration(s)",
            catalog.name(),
            structs.len(),
            catalog.declarations().len()
        );

        tracker.enter(Stage::Rendering);
        let raw = render(&RenderContext {
            package_name: catalog.name().to_string(),
            structs: structs.clone(),
            method: config.method.clone(),
        });

        tracker.enter(Stage::Canonicalizing);
        let scope = ImportScope {
            catalog: &catalog,
            extra: &config.imports,
        };
        let content = canonicalize(&raw, &scope)?;

        tracker.enter(Stage::Writing);
        let output_path = write_artifact(catalog.dir(), &config.output_file, &content)?;
        info!("wrote {}", output_path.display());

        Ok(Generated {
            output_path,
            catalog,
            structs,
        })
    }

    /// Merge the config file (if any) with the builder settings.
    fn resolve_config(&self, package_dir: &Path) -> Result<GeneratorConfig, LoadError> {
        let mut config = if self.read_config_file {
            GeneratorConfig::load(package_dir)?.unwrap_or_default()
        } else {
            GeneratorConfig::default()
        };

        if let Some(output_file) = &self.output_file {
            config.output_file = output_file.clone();
        }
        if let Some(method) = &self.method {
            config.method = method.clone();
        }
        if let Some(order) = self.order {
            config.order = order;
        }
        config
            .imports
            .extend(self.imports.iter().map(|(name, path)| (name.clone(), path.clone())));

        config.validate().map_err(|message| LoadError::Config {
            path: package_dir.join(CONFIG_FILE_NAME),
            message,
        })?;

        Ok(config)
    }
}

/// Lexically drop `.` and resolve `..` so the last component names the package.
fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() && !normalized.has_root() {
                    normalized.push(component);
                }
            }
            other => normalized.push(other),
        }
    }
    normalized
}
