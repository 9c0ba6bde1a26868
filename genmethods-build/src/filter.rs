//! Selection of the structs that receive a generated method.

use quote::ToTokens;

use crate::catalog::{PackageCatalog, TypeForm, Underlying};

/// A named struct definition eligible for a generated method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EligibleStruct {
    pub name: String,
    /// Generic parameters with bounds, e.g. `<T: Clone>`. Empty when not generic.
    pub impl_generics: String,
    /// Generic arguments, e.g. `<T>`. Empty when not generic.
    pub type_generics: String,
    /// Where clause including the `where` keyword. Empty when absent.
    pub where_clause: String,
}

impl EligibleStruct {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            impl_generics: String::new(),
            type_generics: String::new(),
            where_clause: String::new(),
        }
    }
}

/// Pick every explicitly named struct definition, in catalog order.
///
/// Values, functions, modules, macros and imports are skipped, as are type
/// definitions with any other underlying shape. Aliases are skipped even
/// when they resolve to a struct.
pub fn select_structs(catalog: &PackageCatalog) -> Vec<EligibleStruct> {
    catalog
        .declarations()
        .iter()
        .filter_map(|decl| {
            let def = decl.type_def()?;
            if def.form != TypeForm::Definition || def.underlying != Underlying::Struct {
                return None;
            }

            let (impl_generics, type_generics, where_clause) = def.generics.split_for_impl();
            Some(EligibleStruct {
                name: decl.name.clone(),
                impl_generics: impl_generics.to_token_stream().to_string(),
                type_generics: type_generics.to_token_stream().to_string(),
                where_clause: where_clause.map(|w| w.to_token_stream().to_string()).unwrap_or_default(),
            })
        })
        .collect()
}
