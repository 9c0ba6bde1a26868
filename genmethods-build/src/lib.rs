//! Build-time generator that adds one method to every struct of a Rust module.
//!
//! The target package is a module directory (`mod.rs`, `lib.rs` or
//! `main.rs` plus its submodule files). Its top-level declarations are
//! analyzed without compiling anything, every explicitly named struct
//! definition is selected, and `method_gen.rs` is written next to the entry
//! file with one `impl` block per struct. The package includes the result
//! with `mod method_gen;`.
//!
//! # Example
//!
//! In your `build.rs`:
//!
//! ```ignore
//! fn main() {
//!     genmethods_build::generate_methods("src/shapes")
//!         .run()
//!         .expect("Failed to generate methods");
//!
//!     println!("cargo:rerun-if-changed=src/shapes/mod.rs");
//! }
//! ```
//!
//! The generated method defaults to `print_type`, which prints
//! `std::any::type_name_of_val(self)`. Swap it with
//! [`MethodGenerator::method`] or a `[method]` table in `genmethods.toml`.

pub mod canonicalize;
pub mod catalog;
pub mod config;
pub mod error;
pub mod filter;
pub mod generator;
pub mod render;
pub mod writer;

pub use catalog::{DeclKind, Declaration, PackageCatalog, TypeForm, Underlying};
pub use config::{GeneratorConfig, MethodTemplate, StructOrder};
pub use error::{FormatError, GenerateError, LoadError, ResolveError, WriteError};
pub use filter::EligibleStruct;
pub use generator::{Generated, MethodGenerator, Stage};
pub use render::GENERATED_MARKER;

/// Create a generator for the package at `package_path` with default settings.
///
/// # Example
///
/// ```ignore
/// let generated = genmethods_build::generate_methods("src/shapes").run()?;
/// println!("wrote {}", generated.output_path.display());
/// ```
pub fn generate_methods(package_path: impl Into<std::path::PathBuf>) -> MethodGenerator {
    MethodGenerator::new(package_path)
}
