//! ADL pretty printer
//!
//! Renders a definition back to ADL-like text. Used by `@DumpAST`, by
//! diagnostics that quote a definition, and by tests.

use super::annotation::{AnnotationNode, AnnotationValue, Annotations};
use super::definition::Definition;
use super::interface::{Cardinality, Contingency, Interface, Role};
use std::fmt::{self, Write};

const INDENT: &str = "  ";

impl fmt::Display for AnnotationValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnnotationValue::String(text) => write!(f, "{:?}", text),
            AnnotationValue::Number(n) => write!(f, "{}", n),
            AnnotationValue::Bool(b) => write!(f, "{}", b),
            AnnotationValue::Null => f.write_str("null"),
            AnnotationValue::Annotation(node) => write!(f, "{}", node),
            AnnotationValue::Array(values) => {
                f.write_str("{")?;
                for (idx, value) in values.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", value)?;
                }
                f.write_str("}")
            }
        }
    }
}

impl fmt::Display for AnnotationNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.type_name)?;
        if self.arguments.is_empty() {
            return Ok(());
        }
        f.write_str("(")?;
        for (idx, arg) in self.arguments.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}={}", arg.name, arg.value)?;
        }
        f.write_str(")")
    }
}

fn write_annotations(out: &mut String, annotations: &Annotations, indent: &str) -> fmt::Result {
    for node in &annotations.nodes {
        writeln!(out, "{}{}", indent, node)?;
    }
    Ok(())
}

fn write_interface(out: &mut String, keyword_prefix: &str, itf: &Interface) -> fmt::Result {
    write_annotations(out, &itf.annotations, INDENT)?;
    let keyword = match itf.role {
        Role::Server => "provides",
        Role::Client => "requires",
    };
    let optional = match itf.contingency {
        Contingency::Optional => "optional ",
        Contingency::Mandatory => "",
    };
    write!(
        out,
        "{}{}{} {}{} as {}",
        INDENT, keyword_prefix, keyword, optional, itf.signature, itf.name
    )?;
    match itf.cardinality {
        Cardinality::Singleton => {}
        Cardinality::Collection(Some(size)) => write!(out, "[{}]", size)?,
        Cardinality::Collection(None) => out.push_str("[]"),
    }
    out.push_str(";\n");
    Ok(())
}

fn render(def: &Definition, out: &mut String) -> fmt::Result {
    for import in &def.imports {
        writeln!(out, "import {}.{};", import.package, import.simple_name)?;
    }
    if !def.imports.is_empty() {
        out.push('\n');
    }
    write_annotations(out, &def.annotations, "")?;
    if def.is_abstract {
        out.push_str("abstract ");
    }
    write!(out, "{} {}", def.kind(), def.name)?;

    if !def.formal_type_parameters.is_empty() {
        out.push('<');
        for (idx, param) in def.formal_type_parameters.iter().enumerate() {
            if idx > 0 {
                out.push_str(", ");
            }
            out.push_str(&param.name);
            if let Some(conforms_to) = &param.conforms_to {
                write!(out, " conformsto {}", conforms_to)?;
            }
        }
        out.push('>');
    }
    if !def.formal_parameters.is_empty() {
        let names: Vec<_> = def.formal_parameters.iter().map(|p| p.name.as_str()).collect();
        write!(out, "({})", names.join(", "))?;
    }
    if !def.extends.is_empty() {
        let parents: Vec<_> = def.extends.iter().map(|p| p.to_string()).collect();
        write!(out, " extends {}", parents.join(", "))?;
    }
    out.push_str(" {\n");

    for itf in &def.interfaces {
        write_interface(out, "", itf)?;
    }
    for itf in &def.internal_interfaces {
        write_interface(out, "internal ", itf)?;
    }
    for attr in &def.attributes {
        write_annotations(out, &attr.annotations, INDENT)?;
        write!(out, "{}attribute {} {}", INDENT, attr.type_name, attr.name)?;
        if let Some(value) = &attr.value {
            write!(out, " = {}", value)?;
        }
        out.push_str(";\n");
    }
    for comp in &def.components {
        write_annotations(out, &comp.annotations, INDENT)?;
        match (&comp.definition, &comp.type_parameter) {
            (Some(reference), _) => {
                writeln!(out, "{}contains {} as {};", INDENT, reference, comp.name)?
            }
            (None, Some(param)) => writeln!(out, "{}contains {} as {};", INDENT, param, comp.name)?,
            (None, None) => writeln!(out, "{}contains ? as {};", INDENT, comp.name)?,
        }
    }
    for binding in &def.bindings {
        write_annotations(out, &binding.annotations, INDENT)?;
        writeln!(out, "{}binds {};", INDENT, binding)?;
    }
    for source in &def.sources {
        write_annotations(out, &source.annotations, INDENT)?;
        writeln!(out, "{}source {};", INDENT, source.path)?;
    }
    for ctrl in &def.controllers {
        let names: Vec<_> = ctrl.interfaces.iter().map(|i| i.name.as_str()).collect();
        let sources: Vec<_> = ctrl.sources.iter().map(|s| s.path.as_str()).collect();
        writeln!(
            out,
            "{}controller {{{}}} source {};",
            INDENT,
            names.join(", "),
            sources.join(", ")
        )?;
    }
    out.push_str("}\n");
    Ok(())
}

impl Definition {
    /// Render this definition as ADL text.
    pub fn pretty(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = render(self, &mut out);
        out
    }
}
