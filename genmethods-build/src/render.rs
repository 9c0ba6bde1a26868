//! Template rendering of the raw artifact text.

use crate::config::MethodTemplate;
use crate::filter::EligibleStruct;

/// First line of every artifact. Tools skip files starting with it.
pub const GENERATED_MARKER: &str = "// Code generated by genmethods; DO NOT EDIT.";

/// Everything the template is parameterized by.
#[derive(Debug, Clone)]
pub struct RenderContext {
    pub package_name: String,
    pub structs: Vec<EligibleStruct>,
    pub method: MethodTemplate,
}

/// Render the artifact text.
///
/// The output is well-formed but not canonically laid out, and the items
/// named by the method body are not imported yet.
pub fn render(context: &RenderContext) -> String {
    let mut content = format!(
        "{GENERATED_MARKER}\n\n//! Methods generated for the `{}` package.\n",
        context.package_name
    );

    for item in &context.structs {
        content.push_str(&format!(
            "\nimpl{} {}{} {} {{\n",
            item.impl_generics, item.name, item.type_generics, item.where_clause
        ));
        for line in context.method.doc.lines() {
            content.push_str(&format!("    /// {line}\n"));
        }
        content.push_str(&format!("    pub fn {}(&self) {{\n", context.method.name));
        for line in context.method.body.lines() {
            content.push_str(&format!("        {line}\n"));
        }
        content.push_str("    }\n}\n");
    }

    content
}
