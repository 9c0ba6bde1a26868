//! Canonical formatting and import resolution of rendered text.
//!
//! The rendered text names items by bare identifier. Every such reference
//! is resolved to a path and turned into a `use` item, so the artifact
//! imports exactly what it uses. Layout is delegated to `prettyplease`.

use log::debug;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use syn::punctuated::Punctuated;
use syn::visit::{self, Visit};
use syn::{Expr, Item, Token};

use crate::catalog::{PackageCatalog, flatten_use, is_primitive};
use crate::error::{FormatError, GenerateError, ResolveError};

/// Names every module sees through the standard prelude.
const PRELUDE: &[&str] = &[
    "AsMut", "AsRef", "Box", "Clone", "Copy", "Default", "DoubleEndedIterator", "Drop", "Eq", "Err",
    "ExactSizeIterator", "Extend", "Fn", "FnMut", "FnOnce", "From", "FromIterator", "Into", "IntoIterator",
    "Iterator", "None", "Ok", "Option", "Ord", "PartialEq", "PartialOrd", "Result", "Send", "Sized", "Some",
    "String", "Sync", "ToOwned", "ToString", "TryFrom", "TryInto", "Unpin", "Vec", "align_of", "align_of_val",
    "drop", "size_of", "size_of_val",
];

/// Macros usable without an import.
const PRELUDE_MACROS: &[&str] = &[
    "assert", "assert_eq", "assert_ne", "cfg", "column", "compile_error", "concat", "dbg", "debug_assert",
    "debug_assert_eq", "debug_assert_ne", "env", "eprint", "eprintln", "file", "format", "format_args",
    "include", "include_bytes", "include_str", "line", "matches", "module_path", "option_env", "panic",
    "print", "println", "stringify", "todo", "unimplemented", "unreachable", "vec", "write", "writeln",
];

/// Path roots that never need an import.
const PATH_ROOTS: &[&str] = &["self", "Self", "super", "crate", "std", "core", "alloc"];

/// Standard library items resolvable by bare name.
const STD_ITEMS: &[(&str, &str)] = &[
    ("Any", "std::any::Any"),
    ("Arc", "std::sync::Arc"),
    ("BTreeMap", "std::collections::BTreeMap"),
    ("BTreeSet", "std::collections::BTreeSet"),
    ("Cell", "std::cell::Cell"),
    ("Cow", "std::borrow::Cow"),
    ("Debug", "std::fmt::Debug"),
    ("Display", "std::fmt::Display"),
    ("Duration", "std::time::Duration"),
    ("Formatter", "std::fmt::Formatter"),
    ("HashMap", "std::collections::HashMap"),
    ("HashSet", "std::collections::HashSet"),
    ("Hash", "std::hash::Hash"),
    ("Hasher", "std::hash::Hasher"),
    ("Mutex", "std::sync::Mutex"),
    ("Path", "std::path::Path"),
    ("PathBuf", "std::path::PathBuf"),
    ("PhantomData", "std::marker::PhantomData"),
    ("Rc", "std::rc::Rc"),
    ("RefCell", "std::cell::RefCell"),
    ("RwLock", "std::sync::RwLock"),
    ("TypeId", "std::any::TypeId"),
    ("VecDeque", "std::collections::VecDeque"),
    ("fmt", "std::fmt"),
    ("io", "std::io"),
    ("mem", "std::mem"),
    ("type_name", "std::any::type_name"),
    ("type_name_of_val", "std::any::type_name_of_val"),
];

/// Where references in the generated code may come from.
#[derive(Debug, Clone, Copy)]
pub struct ImportScope<'a> {
    /// The package the artifact is a child module of.
    pub catalog: &'a PackageCatalog,
    /// Extra name → path mappings from the configuration.
    pub extra: &'a BTreeMap<String, String>,
}

impl ImportScope<'_> {
    /// Path of a name that is not locally bound, or `None` if no import is needed.
    fn resolve(&self, name: &str, existing: &BTreeMap<String, String>) -> Result<Option<String>, ResolveError> {
        if let Some(path) = existing.get(name) {
            return Ok(Some(path.clone()));
        }
        if self.catalog.has_path_item(name) {
            return Ok(Some(format!("super::{name}")));
        }
        if PRELUDE.contains(&name) || is_primitive(name) {
            return Ok(None);
        }
        if let Some(path) = self.extra.get(name) {
            return Ok(Some(path.clone()));
        }
        if let Some((_, path)) = STD_ITEMS.iter().find(|(item, _)| *item == name) {
            return Ok(Some((*path).to_string()));
        }
        Err(ResolveError::Unresolved { name: name.to_string() })
    }

    fn resolve_macro(&self, name: &str, existing: &BTreeMap<String, String>) -> Result<Option<String>, ResolveError> {
        if let Some(path) = existing.get(name).or_else(|| self.extra.get(name)) {
            return Ok(Some(path.clone()));
        }
        // Package macros are textually in scope for child modules.
        if PRELUDE_MACROS.contains(&name) || self.catalog.has_macro(name) {
            return Ok(None);
        }
        Err(ResolveError::UnresolvedMacro { name: name.to_string() })
    }
}

/// Turn rendered text into the final artifact text.
pub fn canonicalize(raw: &str, scope: &ImportScope<'_>) -> Result<String, GenerateError> {
    let (header, body, header_lines) = split_header(raw);

    let file = syn::parse_file(body).map_err(|err| {
        let mut format_err = FormatError::from(err);
        format_err.line += header_lines;
        format_err
    })?;

    let mut existing: BTreeMap<String, String> = BTreeMap::new();
    let mut items = Vec::new();
    for item in file.items {
        match item {
            Item::Use(item_use) => {
                for (name, path) in flatten_use(&item_use.tree, item_use.leading_colon.is_some()) {
                    if let Some(first) = existing.get(&name)
                        && *first != path
                    {
                        return Err(ResolveError::Conflict {
                            name,
                            first: first.clone(),
                            second: path,
                        }
                        .into());
                    }
                    existing.insert(name, path);
                }
            }
            other => items.push(other),
        }
    }

    let mut collector = ReferenceCollector::default();
    for item in &items {
        if let Some(ident) = item_ident(item) {
            collector.bound.insert(ident);
        }
        collector.visit_item(item);
    }

    let mut imports = BTreeSet::new();
    for name in &collector.paths {
        if collector.bound.contains(name) || PATH_ROOTS.contains(&name.as_str()) {
            continue;
        }
        if let Some(path) = scope.resolve(name, &existing)? {
            imports.insert((path, name.clone()));
        }
    }
    for name in &collector.macros {
        if collector.bound.contains(name) {
            continue;
        }
        if let Some(path) = scope.resolve_macro(name, &existing)? {
            imports.insert((path, name.clone()));
        }
    }

    let mut output_items = Vec::with_capacity(imports.len() + items.len());
    for (path, name) in &imports {
        debug!("importing {name} from {path}");
        output_items.push(Item::Use(use_item(path, name)?));
    }
    output_items.extend(items);

    let formatted = prettyplease::unparse(&syn::File {
        shebang: None,
        attrs: file.attrs,
        items: output_items,
    });

    if header.is_empty() {
        return Ok(formatted);
    }
    Ok(format!("{}\n\n{formatted}", header.join("\n")))
}

/// Split off the leading plain `//` comment lines, which `syn` would drop.
///
/// Returns the header lines, the remaining text, and how many lines were split off.
fn split_header(raw: &str) -> (Vec<&str>, &str, usize) {
    let mut header = Vec::new();
    let mut offset = 0;
    let mut lines = 0;

    for line in raw.split_inclusive('\n') {
        let trimmed = line.trim();
        let is_plain_comment = trimmed.starts_with("//") && !trimmed.starts_with("//!") && !trimmed.starts_with("///");
        if is_plain_comment {
            header.push(trimmed);
        } else if !trimmed.is_empty() {
            break;
        }
        offset += line.len();
        lines += 1;
    }

    (header, &raw[offset..], lines)
}

fn use_item(path: &str, name: &str) -> Result<syn::ItemUse, ResolveError> {
    let last = path.rsplit("::").next().unwrap_or(path);
    let text = if last == name {
        format!("use {path};")
    } else {
        format!("use {path} as {name};")
    };
    syn::parse_str(&text).map_err(|_| ResolveError::InvalidPath {
        name: name.to_string(),
        path: path.to_string(),
    })
}

fn item_ident(item: &Item) -> Option<String> {
    let ident = match item {
        Item::Const(i) => &i.ident,
        Item::Enum(i) => &i.ident,
        Item::Fn(i) => &i.sig.ident,
        Item::Macro(i) => i.ident.as_ref()?,
        Item::Mod(i) => &i.ident,
        Item::Static(i) => &i.ident,
        Item::Struct(i) => &i.ident,
        Item::Trait(i) => &i.ident,
        Item::TraitAlias(i) => &i.ident,
        Item::Type(i) => &i.ident,
        Item::Union(i) => &i.ident,
        _ => return None,
    };
    Some(ident.to_string())
}

/// Collects the first segment of every relative path and every macro name.
///
/// Names introduced locally (bindings, generic parameters, nested items and
/// nested imports) go to `bound`. Scoping is flattened: a name bound
/// anywhere counts as bound everywhere.
#[derive(Default)]
struct ReferenceCollector {
    paths: BTreeSet<String>,
    macros: BTreeSet<String>,
    bound: HashSet<String>,
}

impl<'ast> Visit<'ast> for ReferenceCollector {
    fn visit_attribute(&mut self, _attr: &'ast syn::Attribute) {}

    fn visit_path(&mut self, path: &'ast syn::Path) {
        if path.leading_colon.is_none()
            && let Some(first) = path.segments.first()
        {
            self.paths.insert(first.ident.to_string());
        }
        visit::visit_path(self, path);
    }

    fn visit_macro(&mut self, mac: &'ast syn::Macro) {
        if mac.path.leading_colon.is_none() && mac.path.segments.len() == 1 {
            if let Some(segment) = mac.path.segments.first() {
                self.macros.insert(segment.ident.to_string());
            }
        } else {
            self.visit_path(&mac.path);
        }

        if let Ok(args) = mac.parse_body_with(Punctuated::<Expr, Token![,]>::parse_terminated) {
            for arg in &args {
                self.visit_expr(arg);
            }
        }
    }

    fn visit_pat_ident(&mut self, pat: &'ast syn::PatIdent) {
        self.bound.insert(pat.ident.to_string());
        visit::visit_pat_ident(self, pat);
    }

    fn visit_type_param(&mut self, param: &'ast syn::TypeParam) {
        self.bound.insert(param.ident.to_string());
        visit::visit_type_param(self, param);
    }

    fn visit_const_param(&mut self, param: &'ast syn::ConstParam) {
        self.bound.insert(param.ident.to_string());
        visit::visit_const_param(self, param);
    }

    fn visit_item_use(&mut self, item: &'ast syn::ItemUse) {
        for (name, _) in flatten_use(&item.tree, item.leading_colon.is_some()) {
            self.bound.insert(name);
        }
    }

    fn visit_stmt(&mut self, stmt: &'ast syn::Stmt) {
        if let syn::Stmt::Item(item) = stmt
            && let Some(ident) = item_ident(item)
        {
            self.bound.insert(ident);
        }
        visit::visit_stmt(self, stmt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{LoadOptions, load_package};
    use crate::config::StructOrder;
    use crate::render::GENERATED_MARKER;
    use tempfile::TempDir;

    fn catalog(source: &str) -> (TempDir, PackageCatalog) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("mod.rs"), source).unwrap();
        let options = LoadOptions {
            order: StructOrder::Name,
            output_module: "method_gen".to_string(),
        };
        let catalog = load_package(dir.path(), &options).unwrap();
        (dir, catalog)
    }

    fn run(raw: &str, package: &str) -> Result<String, GenerateError> {
        let (_dir, catalog) = catalog(package);
        let extra = BTreeMap::new();
        canonicalize(raw, &ImportScope { catalog: &catalog, extra: &extra })
    }

    const RAW: &str = "// Code generated by genmethods; DO NOT EDIT.

//! Methods generated for the `pkg` package.

impl StructA  {
    /// Prints the receiver's type name to standard output.
    pub fn print_type(&self) {
        println!(\"{}\", type_name_of_val(self));
    }
}
";

    #[test]
    fn test_adds_exactly_the_needed_imports() {
        let out = run(RAW, "pub struct StructA { x: i64 }").unwrap();

        assert!(out.starts_with(&format!("{GENERATED_MARKER}\n\n")));
        assert!(out.contains("//! Methods generated for the `pkg` package."));
        assert!(out.contains("use std::any::type_name_of_val;"));
        assert!(out.contains("use super::StructA;"));
        assert_eq!(out.matches("use ").count(), 2);
        assert!(out.contains("impl StructA {"));
        assert!(out.contains("/// Prints the receiver's type name to standard output."));
    }

    #[test]
    fn test_imports_are_sorted_by_path() {
        let out = run(RAW, "pub struct StructA;").unwrap();

        let std_import = out.find("use std::any::type_name_of_val;").unwrap();
        let package_import = out.find("use super::StructA;").unwrap();
        assert!(std_import < package_import);
    }

    #[test]
    fn test_header_only_input() {
        let raw = "// Code generated by genmethods; DO NOT EDIT.\n\n//! Methods generated for the `pkg` package.\n";
        let out = run(raw, "").unwrap();

        assert!(out.starts_with(GENERATED_MARKER));
        assert!(out.contains("//! Methods generated for the `pkg` package."));
        assert!(!out.contains("use "));
    }

    #[test]
    fn test_output_is_a_fixed_point() {
        let once = run(RAW, "pub struct StructA;").unwrap();
        let twice = run(&once, "pub struct StructA;").unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_malformed_text_is_format_error() {
        let raw = "// header\n\nimpl Broken {\n    pub fn (&self) {}\n}\n";
        let err = run(raw, "").unwrap_err();

        match err {
            GenerateError::Format(format_err) => assert_eq!(format_err.line, 4),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unknown_name_is_resolve_error() {
        let raw = "impl A { fn f(&self) { mystery(self); } }";
        let err = run(raw, "struct A;").unwrap_err();

        assert!(matches!(
            err,
            GenerateError::Resolve(ResolveError::Unresolved { ref name }) if name == "mystery"
        ));
    }

    #[test]
    fn test_unknown_macro_is_resolve_error() {
        let raw = "impl A { fn f(&self) { trace!(\"x\"); } }";
        let err = run(raw, "struct A;").unwrap_err();

        assert!(matches!(err, GenerateError::Resolve(ResolveError::UnresolvedMacro { .. })));
    }

    #[test]
    fn test_package_macro_needs_no_import() {
        let raw = "impl A { fn f(&self) { shout!(); } }";
        let out = run(raw, "macro_rules! shout { () => {}; }\nstruct A;").unwrap();

        assert!(!out.contains("use super::shout"));
    }

    #[test]
    fn test_locals_and_prelude_are_not_imported() {
        let raw = r#"
            impl<T: Clone> Wrapper<T> {
                fn f(&self) {
                    let count: Option<usize> = Some(1);
                    let double = |n: usize| n * 2;
                    fn helper() {}
                    helper();
                    println!("{:?}", count.map(double));
                }
            }
        "#;
        let out = run(raw, "struct Wrapper<T> { inner: T }").unwrap();

        let imports: Vec<_> = out.lines().filter(|l| l.starts_with("use ")).collect();
        assert_eq!(imports, vec!["use super::Wrapper;"]);
    }

    #[test]
    fn test_unused_and_glob_imports_are_dropped() {
        let raw = "use std::collections::HashMap;\nuse super::*;\nuse std::fmt::Debug;\nimpl A { fn f(&self) -> impl Debug { 1 } }";
        let out = run(raw, "struct A;").unwrap();

        assert!(!out.contains("HashMap"));
        assert!(!out.contains("super::*"));
        assert!(out.contains("use std::fmt::Debug;"));
        assert!(out.contains("use super::A;"));
    }

    #[test]
    fn test_existing_import_takes_precedence() {
        let raw = "use other::Thing as Stuff;\nimpl A { fn f(&self) { let _ = Stuff::new(); } }";
        let out = run(raw, "struct A;\nstruct Stuff;").unwrap();

        assert!(out.contains("use other::Thing as Stuff;"));
        assert!(!out.contains("use super::Stuff;"));
    }

    #[test]
    fn test_conflicting_imports_fail() {
        let raw = "use std::fmt::Result;\nuse std::io::Result;\n";
        let err = run(raw, "").unwrap_err();

        assert!(matches!(err, GenerateError::Resolve(ResolveError::Conflict { .. })));
    }

    #[test]
    fn test_repeated_identical_import_is_kept_once() {
        let raw = "use std::fmt::Debug;\nuse std::fmt::Debug;\nfn show<T: Debug>(_: T) {}\n";
        let out = run(raw, "").unwrap();

        assert_eq!(out.matches("use std::fmt::Debug;").count(), 1);
    }

    #[test]
    fn test_package_imports_are_reexported_from_super() {
        let raw = "impl A { fn f(&self) { let _ = Registry::default(); } }";
        let out = run(raw, "use crate::registry::Registry;\nstruct A;").unwrap();

        assert!(out.contains("use super::Registry;"));
    }

    #[test]
    fn test_configured_imports() {
        let (_dir, catalog) = catalog("struct A;");
        let mut extra = BTreeMap::new();
        extra.insert("info".to_string(), "log::info".to_string());
        extra.insert("Serialize".to_string(), "serde::Serialize".to_string());

        let raw = "impl A { fn f(&self) { info!(\"{}\", 1); } }";
        let out = canonicalize(raw, &ImportScope { catalog: &catalog, extra: &extra }).unwrap();

        assert!(out.contains("use log::info;"));
        assert!(!out.contains("Serialize"));
    }

    #[test]
    fn test_split_header() {
        let (header, body, lines) = split_header("// one\n// two\n\n//! doc\nstruct A;\n");

        assert_eq!(header, vec!["// one", "// two"]);
        assert_eq!(body, "//! doc\nstruct A;\n");
        assert_eq!(lines, 3);
    }
}
