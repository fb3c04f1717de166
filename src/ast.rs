//! AST types for structured library API descriptions.
//!
//! The tree is owned top-down from [`Root`] through the named collections.
//! Every tagged node also carries a [`Link`], filled in by the parent-link
//! phase of the transform pipeline, that points into a [`crate::fqn::ParentLinks`]
//! arena. Links are handles, never ownership.

use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::AstError;

/// The `kind` tag carried by every node of the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum NodeKind {
    Root,
    Namespace,
    Class,
    Interface,
    Enum,
    Variable,
    FunctionDesc,
    Parameter,
    SimpleType,
    UnionType,
}

/// Handle of a node in the parent-link arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

/// Position of a node in the parent-link arena.
///
/// Both fields stay `None` until the parent-link phase has run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Link {
    pub id: Option<NodeId>,
    pub parent: Option<NodeId>,
}

/// Declared exposure level of a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Restricted,
    Protected,
    Public,
}

/// Whether a node with this visibility may appear in the output.
///
/// Unset and `protected` are emitted like `public`.
pub fn is_emittable(visibility: Option<Visibility>) -> bool {
    !matches!(visibility, Some(Visibility::Restricted))
}

/// A deprecation or experimental notice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Notice {
    pub text: Option<String>,
    pub since: Option<String>,
}

/// Documentation metadata shared by every symbol-bearing node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Doc {
    pub description: Option<String>,
    pub since: Option<String>,
    pub deprecation: Option<Notice>,
    pub experimental: Option<Notice>,
    pub additional_notes: Vec<String>,
}

impl Doc {
    pub fn is_empty(&self) -> bool {
        self.description.is_none()
            && self.since.is_none()
            && self.deprecation.is_none()
            && self.experimental.is_none()
            && self.additional_notes.is_empty()
    }
}

/// The API description of one library.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Root {
    pub kind: NodeKind,
    #[serde(default)]
    pub version: String,
    pub top_level_namespace: Namespace,
    #[serde(skip)]
    pub link: Link,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Namespace {
    pub kind: NodeKind,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub visibility: Option<Visibility>,
    #[serde(flatten)]
    pub doc: Doc,
    #[serde(default)]
    pub namespaces: Vec<Namespace>,
    #[serde(default)]
    pub variables: Vec<Variable>,
    #[serde(default)]
    pub functions: Vec<FunctionDesc>,
    #[serde(default)]
    pub classes: Vec<Class>,
    #[serde(default)]
    pub interfaces: Vec<Interface>,
    #[serde(default)]
    pub enums: Vec<Enum>,
    #[serde(skip)]
    pub link: Link,
}

impl Namespace {
    /// True when none of the member collections holds anything.
    pub fn is_empty(&self) -> bool {
        self.namespaces.is_empty()
            && self.variables.is_empty()
            && self.functions.is_empty()
            && self.classes.is_empty()
            && self.interfaces.is_empty()
            && self.enums.is_empty()
    }

    /// True when the namespace declares classes, interfaces or enums, or nests
    /// further namespaces.
    pub fn has_aggregates(&self) -> bool {
        !self.namespaces.is_empty()
            || !self.classes.is_empty()
            || !self.interfaces.is_empty()
            || !self.enums.is_empty()
    }

    /// Walk down nested namespaces by a dotted path relative to `self`.
    pub fn find_namespace_mut(&mut self, dotted: &str) -> Option<&mut Namespace> {
        let mut current = self;
        for segment in dotted.split('.') {
            current = current
                .namespaces
                .iter_mut()
                .find(|ns| ns.name == segment)?;
        }
        Some(current)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Class {
    pub kind: NodeKind,
    #[serde(default)]
    pub name: String,
    /// Superclass FQN; resolved by name, never by pointer.
    #[serde(default)]
    pub extends: Option<String>,
    #[serde(default)]
    pub implements: Vec<String>,
    #[serde(default)]
    pub constructors: Vec<FunctionDesc>,
    #[serde(default)]
    pub fields: Vec<Variable>,
    #[serde(default)]
    pub methods: Vec<FunctionDesc>,
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,
    #[serde(default)]
    pub visibility: Option<Visibility>,
    /// Marks classes deriving from the framework's base object. Opaque here.
    #[serde(default)]
    pub implements_base_object: bool,
    #[serde(flatten)]
    pub doc: Doc,
    #[serde(skip)]
    pub link: Link,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Interface {
    pub kind: NodeKind,
    #[serde(default)]
    pub name: String,
    /// FQNs of extended interfaces.
    #[serde(default)]
    pub extends: Vec<String>,
    #[serde(default)]
    pub methods: Vec<FunctionDesc>,
    #[serde(default)]
    pub properties: Vec<Variable>,
    #[serde(default)]
    pub visibility: Option<Visibility>,
    #[serde(default)]
    pub stakeholders: Vec<String>,
    #[serde(flatten)]
    pub doc: Doc,
    #[serde(skip)]
    pub link: Link,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Enum {
    pub kind: NodeKind,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub visibility: Option<Visibility>,
    #[serde(default)]
    pub values: Vec<Variable>,
    #[serde(flatten)]
    pub doc: Doc,
    #[serde(skip)]
    pub link: Link,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Variable {
    pub kind: NodeKind,
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "static")]
    pub is_static: bool,
    #[serde(default, rename = "type")]
    pub ty: Option<Type>,
    #[serde(default)]
    pub visibility: Option<Visibility>,
    #[serde(flatten)]
    pub doc: Doc,
    #[serde(skip)]
    pub link: Link,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FunctionDesc {
    pub kind: NodeKind,
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "static")]
    pub is_static: bool,
    /// Overrides an inherited signature.
    #[serde(default)]
    pub overwrite: bool,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default)]
    pub returns: Option<ReturnValue>,
    #[serde(default)]
    pub throws: Vec<Throws>,
    #[serde(default)]
    pub visibility: Option<Visibility>,
    #[serde(flatten)]
    pub doc: Doc,
    #[serde(skip)]
    pub link: Link,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ReturnValue {
    #[serde(default, rename = "type")]
    pub ty: Option<Type>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Throws {
    #[serde(default, rename = "type")]
    pub ty: Option<Type>,
    #[serde(default)]
    pub description: Option<String>,
}

/// A function parameter.
///
/// Entries of a nested option-object shape may omit the `kind` tag; they are
/// values of a keyed mapping, not tagged nodes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    #[serde(default)]
    pub kind: Option<NodeKind>,
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "type")]
    pub ty: Option<ParamType>,
    #[serde(default)]
    pub default_value: Option<serde_json::Value>,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(skip)]
    pub link: Link,
}

/// The type of a parameter: a plain type, or an option object documented
/// field by field.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ParamType {
    Type(Type),
    Shape(IndexMap<String, Parameter>),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind")]
pub enum Type {
    SimpleType(SimpleType),
    UnionType(UnionType),
}

impl Type {
    /// Build a simple type from a raw type string.
    pub fn simple(name: impl Into<String>) -> Self {
        Type::SimpleType(SimpleType::new(name))
    }

    pub fn link(&self) -> Link {
        match self {
            Type::SimpleType(t) => t.link,
            Type::UnionType(t) => t.link,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimpleType {
    /// Raw type string as written in the API description.
    #[serde(rename = "type")]
    pub name: String,
    /// Suppress typo correction for this occurrence.
    #[serde(default)]
    pub skip_correction: bool,
    #[serde(skip)]
    pub link: Link,
}

impl SimpleType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            skip_correction: false,
            link: Link::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UnionType {
    #[serde(default)]
    pub types: Vec<SimpleType>,
    #[serde(skip)]
    pub link: Link,
}

/// Parse and validate the API description of one library.
pub fn parse_root(json: &str) -> Result<Root, AstError> {
    let root: Root = serde_json::from_str(json)?;
    validate(&root)?;
    Ok(root)
}

/// Read, parse and validate an API description file.
pub fn load_root(path: &Path) -> Result<Root, AstError> {
    let json = std::fs::read_to_string(path).map_err(|source| AstError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_root(&json)
}

/// Check that every node sits in a collection of its own kind and that every
/// symbol-bearing node below the top-level namespace is named.
pub fn validate(root: &Root) -> Result<(), AstError> {
    expect_kind("<root>", NodeKind::Root, root.kind)?;
    expect_kind("<root>", NodeKind::Namespace, root.top_level_namespace.kind)?;
    validate_namespace(&root.top_level_namespace, "")
}

fn validate_namespace(ns: &Namespace, path: &str) -> Result<(), AstError> {
    let parent = if path.is_empty() { "<top>" } else { path };

    for child in &ns.namespaces {
        expect_kind(parent, NodeKind::Namespace, child.kind)?;
        expect_name(parent, NodeKind::Namespace, &child.name)?;
        validate_namespace(child, &join(path, &child.name))?;
    }
    for var in &ns.variables {
        validate_variable(var, parent)?;
    }
    for func in &ns.functions {
        validate_function(func, parent)?;
    }
    for class in &ns.classes {
        expect_kind(parent, NodeKind::Class, class.kind)?;
        expect_name(parent, NodeKind::Class, &class.name)?;
        let here = join(path, &class.name);
        for ctor in &class.constructors {
            validate_parameters(&ctor.parameters, &here)?;
        }
        for field in &class.fields {
            validate_variable(field, &here)?;
        }
        for method in &class.methods {
            validate_function(method, &here)?;
        }
    }
    for iface in &ns.interfaces {
        expect_kind(parent, NodeKind::Interface, iface.kind)?;
        expect_name(parent, NodeKind::Interface, &iface.name)?;
        let here = join(path, &iface.name);
        for prop in &iface.properties {
            validate_variable(prop, &here)?;
        }
        for method in &iface.methods {
            validate_function(method, &here)?;
        }
    }
    for en in &ns.enums {
        expect_kind(parent, NodeKind::Enum, en.kind)?;
        expect_name(parent, NodeKind::Enum, &en.name)?;
        let here = join(path, &en.name);
        for value in &en.values {
            validate_variable(value, &here)?;
        }
    }
    Ok(())
}

fn validate_variable(var: &Variable, parent: &str) -> Result<(), AstError> {
    expect_kind(parent, NodeKind::Variable, var.kind)?;
    expect_name(parent, NodeKind::Variable, &var.name)
}

fn validate_function(func: &FunctionDesc, parent: &str) -> Result<(), AstError> {
    expect_kind(parent, NodeKind::FunctionDesc, func.kind)?;
    expect_name(parent, NodeKind::FunctionDesc, &func.name)?;
    validate_parameters(&func.parameters, &join(parent, &func.name))
}

fn validate_parameters<'a>(
    params: impl IntoIterator<Item = &'a Parameter>,
    parent: &str,
) -> Result<(), AstError> {
    for param in params {
        if let Some(kind) = param.kind {
            expect_kind(parent, NodeKind::Parameter, kind)?;
        }
        expect_name(parent, NodeKind::Parameter, &param.name)?;
        if let Some(ParamType::Shape(shape)) = &param.ty {
            validate_parameters(shape.values(), &join(parent, &param.name))?;
        }
    }
    Ok(())
}

fn expect_kind(parent: &str, expected: NodeKind, found: NodeKind) -> Result<(), AstError> {
    if expected == found {
        Ok(())
    } else {
        Err(AstError::UnexpectedKind {
            parent: parent.to_string(),
            expected,
            found,
        })
    }
}

fn expect_name(parent: &str, kind: NodeKind, name: &str) -> Result<(), AstError> {
    if name.is_empty() {
        Err(AstError::MissingName {
            parent: parent.to_string(),
            kind,
        })
    } else {
        Ok(())
    }
}

/// Dot-join a prefix and a name; an empty prefix contributes no segment.
pub fn join(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "kind": "Root",
        "version": "1.0",
        "topLevelNamespace": {
            "kind": "Namespace",
            "namespaces": [{
                "kind": "Namespace",
                "name": "sap",
                "visibility": "public",
                "description": "Root namespace",
                "since": "1.0",
                "classes": [{
                    "kind": "Class",
                    "name": "Button",
                    "extends": "sap.Control",
                    "implements": ["sap.IFocusable"],
                    "abstract": true,
                    "deprecation": { "text": "use Link", "since": "1.2" },
                    "methods": [{
                        "kind": "FunctionDesc",
                        "name": "press",
                        "static": true,
                        "parameters": [{
                            "kind": "Parameter",
                            "name": "options",
                            "optional": true,
                            "type": {
                                "delay": { "name": "delay", "type": { "kind": "SimpleType", "type": "int" } }
                            }
                        }],
                        "returns": { "type": { "kind": "UnionType", "types": [
                            { "kind": "SimpleType", "type": "string" },
                            { "kind": "SimpleType", "type": "int" }
                        ] } }
                    }]
                }]
            }]
        }
    }"#;

    #[test]
    fn parses_nested_description() {
        let root = parse_root(SAMPLE).unwrap();
        let sap = &root.top_level_namespace.namespaces[0];
        assert_eq!(sap.name, "sap");
        assert_eq!(sap.visibility, Some(Visibility::Public));
        assert_eq!(sap.doc.description.as_deref(), Some("Root namespace"));

        let button = &sap.classes[0];
        assert!(button.is_abstract);
        assert_eq!(button.extends.as_deref(), Some("sap.Control"));
        assert_eq!(
            button.doc.deprecation.as_ref().and_then(|d| d.since.as_deref()),
            Some("1.2")
        );

        let press = &button.methods[0];
        assert!(press.is_static);
        match &press.parameters[0].ty {
            Some(ParamType::Shape(shape)) => assert!(shape.contains_key("delay")),
            other => panic!("expected option shape, got {other:?}"),
        }
        match press.returns.as_ref().and_then(|r| r.ty.as_ref()) {
            Some(Type::UnionType(u)) => assert_eq!(u.types.len(), 2),
            other => panic!("expected union, got {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_kind() {
        let json = r#"{"kind": "Root", "topLevelNamespace": {"kind": "Module"}}"#;
        assert!(matches!(parse_root(json), Err(AstError::Json(_))));
    }

    #[test]
    fn rejects_misplaced_kind() {
        let json = r#"{"kind": "Root", "topLevelNamespace": {
            "kind": "Namespace",
            "classes": [{"kind": "Enum", "name": "E"}]
        }}"#;
        let err = parse_root(json).unwrap_err();
        assert!(matches!(
            err,
            AstError::UnexpectedKind {
                expected: NodeKind::Class,
                found: NodeKind::Enum,
                ..
            }
        ));
    }

    #[test]
    fn rejects_unnamed_nested_namespace() {
        let json = r#"{"kind": "Root", "topLevelNamespace": {
            "kind": "Namespace",
            "namespaces": [{"kind": "Namespace"}]
        }}"#;
        assert!(matches!(
            parse_root(json),
            Err(AstError::MissingName {
                kind: NodeKind::Namespace,
                ..
            })
        ));
    }

    #[test]
    fn visibility_rules() {
        assert!(is_emittable(None));
        assert!(is_emittable(Some(Visibility::Public)));
        assert!(is_emittable(Some(Visibility::Protected)));
        assert!(!is_emittable(Some(Visibility::Restricted)));
    }

    #[test]
    fn finds_nested_namespace_by_path() {
        let mut root = parse_root(SAMPLE).unwrap();
        assert!(root.top_level_namespace.find_namespace_mut("sap").is_some());
        assert!(root.top_level_namespace.find_namespace_mut("sap.ui").is_none());
    }
}
