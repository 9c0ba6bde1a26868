//! Type catalog loader: static analysis of a package's top-level declarations.
//!
//! A package is a module directory whose entry file (`mod.rs`, `lib.rs` or
//! `main.rs`) defines the package scope. Every file-backed submodule is
//! parsed as well so that a syntactically broken package fails to load,
//! but only the entry file's items are catalogued.

use log::debug;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};
use syn::{Attribute, ForeignItem, Item, Type, UseTree};

use crate::config::StructOrder;
use crate::error::LoadError;

/// Candidate entry files of a package directory, in lookup order.
pub const ENTRY_FILES: [&str; 3] = ["mod.rs", "lib.rs", "main.rs"];

/// Base shape of a type after following aliases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Underlying {
    Struct,
    Scalar,
    Enum,
    Union,
    Trait,
    Other,
}

impl fmt::Display for Underlying {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Underlying::Struct => "struct",
            Underlying::Scalar => "scalar",
            Underlying::Enum => "enum",
            Underlying::Union => "union",
            Underlying::Trait => "trait",
            Underlying::Other => "other",
        };
        f.write_str(text)
    }
}

/// Whether a type name introduces a new type or renames an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeForm {
    Definition,
    Alias,
}

/// A name bound to a type.
#[derive(Debug, Clone)]
pub struct TypeDef {
    pub form: TypeForm,
    pub underlying: Underlying,
    pub generics: syn::Generics,
}

#[derive(Debug, Clone)]
pub enum DeclKind {
    Type(TypeDef),
    /// `const` or `static`.
    Value,
    Function,
    Module,
    Macro,
    /// A name brought into scope by `use` or `extern crate`.
    Import { path: String },
}

/// One name bound at package scope.
#[derive(Debug, Clone)]
pub struct Declaration {
    pub name: String,
    pub kind: DeclKind,
}

impl Declaration {
    pub fn type_def(&self) -> Option<&TypeDef> {
        match &self.kind {
            DeclKind::Type(def) => Some(def),
            _ => None,
        }
    }

    /// Short human-readable classification, e.g. `alias of scalar`.
    pub fn describe(&self) -> String {
        match &self.kind {
            DeclKind::Type(def) => match def.form {
                TypeForm::Definition => format!("type ({})", def.underlying),
                TypeForm::Alias => format!("alias of {}", def.underlying),
            },
            DeclKind::Value => "value".to_string(),
            DeclKind::Function => "function".to_string(),
            DeclKind::Module => "module".to_string(),
            DeclKind::Macro => "macro".to_string(),
            DeclKind::Import { path } => format!("import of {path}"),
        }
    }
}

/// Settings that influence how a package is loaded.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub order: StructOrder,
    /// Module name of the generated artifact, which may not exist yet.
    pub output_module: String,
}

/// Declarations of one loaded package.
#[derive(Debug, Clone)]
pub struct PackageCatalog {
    dir: PathBuf,
    name: String,
    entry_file: PathBuf,
    declarations: Vec<Declaration>,
}

impl PackageCatalog {
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Package name: the last segment of the package directory.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entry_file(&self) -> &Path {
        &self.entry_file
    }

    /// All declarations, in catalog enumeration order.
    pub fn declarations(&self) -> &[Declaration] {
        &self.declarations
    }

    /// Whether `name` can be reached from a child module as `super::name`.
    pub fn has_path_item(&self, name: &str) -> bool {
        self.declarations
            .iter()
            .any(|d| d.name == name && !matches!(d.kind, DeclKind::Macro))
    }

    pub fn has_macro(&self, name: &str) -> bool {
        self.declarations
            .iter()
            .any(|d| d.name == name && matches!(d.kind, DeclKind::Macro))
    }
}

/// Load the package rooted at `dir`.
///
/// Nothing in the package is executed; its files are only read and parsed.
pub fn load_package(dir: &Path, options: &LoadOptions) -> Result<PackageCatalog, LoadError> {
    if !dir.exists() {
        return Err(LoadError::NotFound { path: dir.to_path_buf() });
    }
    if !dir.is_dir() {
        return Err(LoadError::NotADirectory { path: dir.to_path_buf() });
    }

    let entry_file = ENTRY_FILES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
        .ok_or_else(|| LoadError::NoEntryFile { path: dir.to_path_buf() })?;

    let syntax = parse_source(&entry_file)?;
    load_submodules(&syntax.items, &entry_file, dir, Some(&options.output_module))?;

    let mut declarations = collect_declarations(&syntax.items);
    check_duplicates(&declarations, &entry_file)?;
    check_self_imports(&declarations, &entry_file)?;
    resolve_aliases(&syntax.items, &mut declarations)?;

    if options.order == StructOrder::Name {
        declarations.sort_by(|a, b| a.name.cmp(&b.name));
    }

    let name = dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    for decl in &declarations {
        debug!("{name}: {} is {}", decl.name, decl.describe());
    }

    Ok(PackageCatalog {
        dir: dir.to_path_buf(),
        name,
        entry_file,
        declarations,
    })
}

/// Read and parse one Rust source file.
fn parse_source(path: &Path) -> Result<syn::File, LoadError> {
    let content = std::fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    syn::parse_file(&content).map_err(|err| {
        let start = err.span().start();
        LoadError::Syntax {
            path: path.to_path_buf(),
            line: start.line,
            column: start.column + 1,
            message: err.to_string(),
        }
    })
}

/// Parse every file-backed module declared in `items`.
///
/// `module_dir` is where the files of child modules live. `skip` names a
/// module whose file is allowed to be missing.
fn load_submodules(items: &[Item], file: &Path, module_dir: &Path, skip: Option<&str>) -> Result<(), LoadError> {
    for item in items {
        let Item::Mod(item_mod) = item else {
            continue;
        };
        if is_cfg_gated(&item_mod.attrs) {
            continue;
        }

        let module = item_mod.ident.to_string();

        if let Some((_, inline_items)) = &item_mod.content {
            load_submodules(inline_items, file, &module_dir.join(&module), None)?;
            continue;
        }

        if skip == Some(module.as_str()) {
            continue;
        }

        let candidates = match path_attr(&item_mod.attrs) {
            Some(explicit) => vec![file.parent().unwrap_or(module_dir).join(explicit)],
            None => vec![
                module_dir.join(format!("{module}.rs")),
                module_dir.join(&module).join("mod.rs"),
            ],
        };

        let Some(child) = candidates.into_iter().find(|path| path.is_file()) else {
            return Err(LoadError::ModuleNotFound {
                module,
                declared_in: file.to_path_buf(),
            });
        };

        let child_syntax = parse_source(&child)?;
        let child_dir = child_module_dir(&child);
        load_submodules(&child_syntax.items, &child, &child_dir, None)?;
    }

    Ok(())
}

/// Directory holding the children of the module stored in `file`.
fn child_module_dir(file: &Path) -> PathBuf {
    let parent = file.parent().map(Path::to_path_buf).unwrap_or_default();
    let is_mod_rs = file
        .file_name()
        .is_some_and(|name| ENTRY_FILES.iter().any(|entry| name == *entry));
    match file.file_stem() {
        Some(stem) if !is_mod_rs => parent.join(stem),
        _ => parent,
    }
}

fn path_attr(attrs: &[Attribute]) -> Option<String> {
    attrs.iter().find_map(|attr| {
        if !attr.path().is_ident("path") {
            return None;
        }
        let syn::Meta::NameValue(nv) = &attr.meta else {
            return None;
        };
        match &nv.value {
            syn::Expr::Lit(syn::ExprLit {
                lit: syn::Lit::Str(lit), ..
            }) => Some(lit.value()),
            _ => None,
        }
    })
}

fn is_cfg_gated(attrs: &[Attribute]) -> bool {
    attrs.iter().any(|attr| attr.path().is_ident("cfg"))
}

/// Catalogue the top-level items of the entry file, in source order.
///
/// Aliases start out as `Underlying::Other` and are resolved afterwards.
fn collect_declarations(items: &[Item]) -> Vec<Declaration> {
    let mut declarations = Vec::new();

    let mut push = |name: String, kind: DeclKind| declarations.push(Declaration { name, kind });
    let definition = |underlying: Underlying, generics: &syn::Generics| {
        DeclKind::Type(TypeDef {
            form: TypeForm::Definition,
            underlying,
            generics: generics.clone(),
        })
    };

    for item in items {
        match item {
            Item::Struct(s) if !is_cfg_gated(&s.attrs) => {
                push(s.ident.to_string(), definition(Underlying::Struct, &s.generics));
            }
            Item::Enum(e) if !is_cfg_gated(&e.attrs) => {
                push(e.ident.to_string(), definition(Underlying::Enum, &e.generics));
            }
            Item::Union(u) if !is_cfg_gated(&u.attrs) => {
                push(u.ident.to_string(), definition(Underlying::Union, &u.generics));
            }
            Item::Trait(t) if !is_cfg_gated(&t.attrs) => {
                push(t.ident.to_string(), definition(Underlying::Trait, &t.generics));
            }
            Item::TraitAlias(t) if !is_cfg_gated(&t.attrs) => {
                push(t.ident.to_string(), definition(Underlying::Trait, &t.generics));
            }
            Item::Type(t) if !is_cfg_gated(&t.attrs) => {
                let kind = DeclKind::Type(TypeDef {
                    form: TypeForm::Alias,
                    underlying: Underlying::Other,
                    generics: t.generics.clone(),
                });
                push(t.ident.to_string(), kind);
            }
            Item::Const(c) if !is_cfg_gated(&c.attrs) => push(c.ident.to_string(), DeclKind::Value),
            Item::Static(s) if !is_cfg_gated(&s.attrs) => push(s.ident.to_string(), DeclKind::Value),
            Item::Fn(f) if !is_cfg_gated(&f.attrs) => push(f.sig.ident.to_string(), DeclKind::Function),
            Item::Mod(m) if !is_cfg_gated(&m.attrs) => push(m.ident.to_string(), DeclKind::Module),
            Item::Macro(m) if !is_cfg_gated(&m.attrs) => {
                if let Some(ident) = &m.ident {
                    push(ident.to_string(), DeclKind::Macro);
                }
            }
            Item::Use(u) if !is_cfg_gated(&u.attrs) => {
                for (name, path) in flatten_use(&u.tree, u.leading_colon.is_some()) {
                    push(name, DeclKind::Import { path });
                }
            }
            Item::ExternCrate(c) if !is_cfg_gated(&c.attrs) => {
                let name = match &c.rename {
                    Some((_, rename)) => rename.to_string(),
                    None => c.ident.to_string(),
                };
                if name != "_" {
                    push(name, DeclKind::Import { path: c.ident.to_string() });
                }
            }
            Item::ForeignMod(f) if !is_cfg_gated(&f.attrs) => {
                for foreign in &f.items {
                    match foreign {
                        ForeignItem::Fn(func) => push(func.sig.ident.to_string(), DeclKind::Function),
                        ForeignItem::Static(s) => push(s.ident.to_string(), DeclKind::Value),
                        ForeignItem::Type(t) => {
                            push(t.ident.to_string(), definition(Underlying::Other, &t.generics));
                        }
                        _ => {}
                    }
                }
            }
            _ => {}
        }
    }

    declarations
}

/// Expand a `use` tree into `(bound name, full path)` pairs.
///
/// Globs and `as _` imports bind no name and are skipped.
pub(crate) fn flatten_use(tree: &UseTree, leading_colon: bool) -> Vec<(String, String)> {
    fn walk(tree: &UseTree, prefix: &mut Vec<String>, out: &mut Vec<(String, String)>, root: &str) {
        let join = |prefix: &[String], last: &str| {
            let mut segments = prefix.to_vec();
            segments.push(last.to_string());
            format!("{root}{}", segments.join("::"))
        };

        match tree {
            UseTree::Path(p) => {
                prefix.push(p.ident.to_string());
                walk(&p.tree, prefix, out, root);
                prefix.pop();
            }
            UseTree::Name(n) if n.ident == "self" => {
                if let Some(last) = prefix.last() {
                    out.push((last.clone(), format!("{root}{}", prefix.join("::"))));
                }
            }
            UseTree::Name(n) => {
                let name = n.ident.to_string();
                out.push((name.clone(), join(prefix, &name)));
            }
            UseTree::Rename(r) => {
                if r.rename != "_" {
                    let path = if r.ident == "self" {
                        format!("{root}{}", prefix.join("::"))
                    } else {
                        join(prefix, &r.ident.to_string())
                    };
                    out.push((r.rename.to_string(), path));
                }
            }
            UseTree::Glob(_) => {}
            UseTree::Group(g) => {
                for item in &g.items {
                    walk(item, prefix, out, root);
                }
            }
        }
    }

    let mut out = Vec::new();
    walk(tree, &mut Vec::new(), &mut out, if leading_colon { "::" } else { "" });
    out
}

/// Reject two type-namespace definitions sharing a name.
fn check_duplicates(declarations: &[Declaration], entry_file: &Path) -> Result<(), LoadError> {
    let mut seen = HashSet::new();
    for decl in declarations {
        if !matches!(decl.kind, DeclKind::Type(_) | DeclKind::Module) {
            continue;
        }
        if !seen.insert(decl.name.as_str()) {
            return Err(LoadError::DuplicateDefinition {
                name: decl.name.clone(),
                path: entry_file.to_path_buf(),
            });
        }
    }
    Ok(())
}

/// `use self::x::...` must name something defined in the package.
fn check_self_imports(declarations: &[Declaration], entry_file: &Path) -> Result<(), LoadError> {
    for decl in declarations {
        let DeclKind::Import { path } = &decl.kind else {
            continue;
        };
        let Some(rest) = path.strip_prefix("self::") else {
            continue;
        };
        let first = rest.split("::").next().unwrap_or(rest);
        let defined = declarations
            .iter()
            .any(|d| d.name == first && !matches!(d.kind, DeclKind::Import { .. }));
        if !defined {
            return Err(LoadError::UnresolvedImport {
                name: rest.to_string(),
                path: entry_file.to_path_buf(),
            });
        }
    }
    Ok(())
}

#[derive(Clone, Copy)]
enum TypeEntry<'a> {
    Known(Underlying),
    Alias(&'a Type),
}

/// Follows alias chains through the package scope.
struct AliasResolver<'a> {
    types: HashMap<String, TypeEntry<'a>>,
    resolved: HashMap<String, Underlying>,
}

impl<'a> AliasResolver<'a> {
    fn new(items: &'a [Item], declarations: &[Declaration]) -> Self {
        let mut types = HashMap::new();
        for decl in declarations {
            if let Some(def) = decl.type_def()
                && def.form == TypeForm::Definition
            {
                types.insert(decl.name.clone(), TypeEntry::Known(def.underlying));
            }
        }
        for item in items {
            if let Item::Type(alias) = item
                && !is_cfg_gated(&alias.attrs)
            {
                types.insert(alias.ident.to_string(), TypeEntry::Alias(&alias.ty));
            }
        }
        Self {
            types,
            resolved: HashMap::new(),
        }
    }

    fn resolve_name(&mut self, name: &str, stack: &mut Vec<String>) -> Result<Option<Underlying>, LoadError> {
        if let Some(underlying) = self.resolved.get(name) {
            return Ok(Some(*underlying));
        }

        match self.types.get(name).copied() {
            None => Ok(None),
            Some(TypeEntry::Known(underlying)) => Ok(Some(underlying)),
            Some(TypeEntry::Alias(ty)) => {
                if stack.iter().any(|n| n == name) {
                    return Err(LoadError::CyclicAlias { name: name.to_string() });
                }
                stack.push(name.to_string());
                let underlying = self.resolve_type(ty, stack)?;
                stack.pop();
                self.resolved.insert(name.to_string(), underlying);
                Ok(Some(underlying))
            }
        }
    }

    fn resolve_type(&mut self, ty: &Type, stack: &mut Vec<String>) -> Result<Underlying, LoadError> {
        match ty {
            Type::Paren(paren) => self.resolve_type(&paren.elem, stack),
            Type::Group(group) => self.resolve_type(&group.elem, stack),
            Type::Path(type_path) if type_path.qself.is_none() => self.resolve_path(&type_path.path, stack),
            _ => Ok(Underlying::Other),
        }
    }

    fn resolve_path(&mut self, path: &syn::Path, stack: &mut Vec<String>) -> Result<Underlying, LoadError> {
        let segments: Vec<String> = path.segments.iter().map(|s| s.ident.to_string()).collect();

        let local = match segments.as_slice() {
            [name] if path.leading_colon.is_none() => name,
            [first, name] if first == "self" && path.leading_colon.is_none() => name,
            [root, module, name] if (root == "std" || root == "core") && module == "primitive" => {
                return Ok(if is_primitive(name) {
                    Underlying::Scalar
                } else {
                    Underlying::Other
                });
            }
            _ => return Ok(Underlying::Other),
        };

        // Package types shadow primitive names.
        if let Some(underlying) = self.resolve_name(local, stack)? {
            return Ok(underlying);
        }
        Ok(if is_primitive(local) {
            Underlying::Scalar
        } else {
            Underlying::Other
        })
    }
}

fn resolve_aliases(items: &[Item], declarations: &mut [Declaration]) -> Result<(), LoadError> {
    let mut resolver = AliasResolver::new(items, declarations);

    for decl in declarations.iter_mut() {
        let DeclKind::Type(def) = &mut decl.kind else {
            continue;
        };
        if def.form != TypeForm::Alias {
            continue;
        }
        let mut stack = Vec::new();
        if let Some(underlying) = resolver.resolve_name(&decl.name, &mut stack)? {
            def.underlying = underlying;
        }
    }

    Ok(())
}

pub(crate) fn is_primitive(name: &str) -> bool {
    matches!(
        name,
        "bool"
            | "char"
            | "str"
            | "u8"
            | "u16"
            | "u32"
            | "u64"
            | "u128"
            | "usize"
            | "i8"
            | "i16"
            | "i32"
            | "i64"
            | "i128"
            | "isize"
            | "f32"
            | "f64"
    )
}
