//! Soong (`Android.bp`) declaration rendering.
//!
//! Everything here is pure: the same module and canonicalizer always render
//! the same text, which is what keeps the generated file byte-stable.

use std::collections::BTreeSet;
use std::fmt::Write;

use crate::core::platform::is_excluded;
use crate::core::{Canonicalizer, FileType, Module, ModuleId};

/// Suffix of the import rule paired with every artifact-backed module.
pub const NODEPS_SUFFIX: &str = "-nodeps";

/// Name of the manifest extracted from `.aar` archives.
pub const MANIFEST_NAME: &str = "AndroidManifest.xml";

/// Header written at the top of the generated build file.
pub const GENERATED_HEADER: &str = "\
// This file is automatically generated by bpgen.
// It is not intended for manual editing; it is rewritten on every run.
//
// Each vendored Maven module is declared as an import rule holding the
// prebuilt archive (`<name>-nodeps`) plus a library rule that adds the
// module's dependencies.
";

const INDENT: &str = "    ";

/// A property value in a Soong module declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Str(String),
    Bool(bool),
    List(Vec<String>),
}

/// One Soong module declaration, e.g. `java_import { ... }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    rule: &'static str,
    properties: Vec<(&'static str, Value)>,
}

impl Declaration {
    pub fn new(rule: &'static str, name: impl Into<String>) -> Self {
        Declaration {
            rule,
            properties: vec![("name", Value::Str(name.into()))],
        }
    }

    pub fn rule(&self) -> &str {
        self.rule
    }

    pub fn string(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.properties.push((key, Value::Str(value.into())));
        self
    }

    pub fn boolean(mut self, key: &'static str, value: bool) -> Self {
        self.properties.push((key, Value::Bool(value)));
        self
    }

    pub fn list(mut self, key: &'static str, values: Vec<String>) -> Self {
        self.properties.push((key, Value::List(values)));
        self
    }

    /// Render in `bpfmt` style.
    pub fn render(&self) -> String {
        let mut out = format!("{} {{\n", self.rule);

        for (key, value) in &self.properties {
            let rendered = match value {
                Value::Str(s) => quote(s),
                Value::Bool(b) => b.to_string(),
                Value::List(items) => render_list(items, INDENT),
            };
            let _ = writeln!(out, "{}{}: {},", INDENT, key, rendered);
        }

        out.push_str("}\n");
        out
    }
}

pub(crate) fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Render a Soong list literal. `indent` is the indentation of the line the
/// list starts on.
pub fn render_list(items: &[String], indent: &str) -> String {
    match items {
        [] => "[]".to_string(),
        [single] => format!("[{}]", quote(single)),
        _ => {
            let mut out = String::from("[\n");
            for item in items {
                let _ = writeln!(out, "{}{}{},", indent, INDENT, quote(item));
            }
            out.push_str(indent);
            out.push(']');
            out
        }
    }
}

/// Canonical, sorted, deduplicated names for a set of dependencies.
///
/// Excluded bootstrap modules are dropped. When `self_ref` is given, its
/// `-nodeps` import rule is placed first.
pub fn format_dependency_names<'a>(
    deps: impl IntoIterator<Item = &'a ModuleId>,
    canonicalizer: &Canonicalizer,
    self_ref: Option<&str>,
) -> Vec<String> {
    let names: BTreeSet<String> = deps
        .into_iter()
        .filter(|id| !is_excluded(id))
        .map(|id| canonicalizer.name_of(id))
        .collect();

    self_ref
        .map(nodeps_name)
        .into_iter()
        .chain(names)
        .collect()
}

/// Name of a module's import rule.
pub fn nodeps_name(name: &str) -> String {
    format!("{}{}", name, NODEPS_SUFFIX)
}

/// Build the declaration group for one vendored module.
pub fn declarations(module: &Module, canonicalizer: &Canonicalizer) -> Vec<Declaration> {
    let name = module.canonical_name();
    let sdk = module.target_sdk().to_string();
    let dir = module.module_path();

    let Some(artifact) = module.artifact() else {
        let deps = format_dependency_names(module.dependencies(), canonicalizer, None);
        return vec![Declaration::new("android_library", name)
            .string("sdk_version", sdk)
            .list("static_libs", deps)];
    };

    let deps = format_dependency_names(module.dependencies(), canonicalizer, Some(name));
    let archive = format!("{}/{}", dir, artifact.file_name());

    match artifact.file_type {
        FileType::PlainArchive => vec![
            Declaration::new("java_import", nodeps_name(name))
                .list("jars", vec![archive])
                .string("sdk_version", sdk.clone()),
            Declaration::new("java_library_static", name)
                .string("sdk_version", sdk)
                .list("static_libs", deps),
        ],
        FileType::ArchiveWithManifest => {
            let mut import = Declaration::new("android_library_import", nodeps_name(name))
                .list("aars", vec![archive])
                .string("sdk_version", sdk.clone());
            let mut library =
                Declaration::new("android_library", name).string("sdk_version", sdk);

            if let Some(min_sdk) = artifact.min_sdk_version {
                import = import.string("min_sdk_version", min_sdk.to_string());
                library = library.string("min_sdk_version", min_sdk.to_string());
            }
            if artifact.extracts_native_code() {
                import = import.boolean("extract_jni", true);
            }

            library = library
                .string("manifest", format!("{}/{}", dir, MANIFEST_NAME))
                .list("static_libs", deps);

            vec![import, library]
        }
    }
}

/// Render a declaration group, one blank line between declarations.
pub fn render_group(declarations: &[Declaration]) -> String {
    declarations
        .iter()
        .map(Declaration::render)
        .collect::<Vec<_>>()
        .join("\n")
}
