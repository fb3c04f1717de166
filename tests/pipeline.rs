//! End-to-end tests over inline API descriptions.

use dtsgen::ast::{parse_root, Class, Namespace, Root, Visibility};
use dtsgen::transform;
use dtsgen::{prepare, Declarations, Directives, Flavor, Library, SymbolTable, WarningKind};

fn root(json: &str) -> Root {
    parse_root(json).expect("valid API description")
}

fn generate(library: &str, json: &str, directives: &str, flavor: Flavor) -> Declarations {
    let lib = Library::new(
        library,
        root(json),
        Directives::parse(directives).expect("valid directives"),
    );
    let prepared = prepare(lib, Vec::new(), false).expect("pipeline runs");
    prepared.emit(flavor).expect("emits")
}

/// Text of the first `{ ... }` block opened by a line containing `header`.
fn block<'a>(text: &'a str, header: &str) -> &'a str {
    let start = text
        .find(header)
        .unwrap_or_else(|| panic!("`{header}` not found in:\n{text}"));
    let rest = &text[start..];
    let mut depth = 0;
    for (i, c) in rest.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return &rest[..=i];
                }
            }
            _ => {}
        }
    }
    rest
}

#[test]
fn test_bad_interface_is_stripped_but_members_stay() {
    let json = r#"{
        "kind": "Root",
        "topLevelNamespace": {"kind": "Namespace", "namespaces": [{
            "kind": "Namespace",
            "name": "lib",
            "interfaces": [{"kind": "Interface", "name": "I"}],
            "classes": [{
                "kind": "Class",
                "name": "C",
                "implements": ["lib.I"],
                "fields": [{"kind": "Variable", "name": "size",
                            "type": {"kind": "SimpleType", "type": "int"}}],
                "methods": [{"kind": "FunctionDesc", "name": "open",
                             "returns": {"type": {"kind": "SimpleType", "type": "boolean"}}}]
            }]
        }]}
    }"#;
    let directives = r#"{"badInterfaces": ["lib.I"]}"#;

    for flavor in Flavor::ALL {
        let decls = generate("lib", json, directives, flavor);
        let class = block(&decls.text, "export class C");
        assert!(class.starts_with("export class C {"), "{flavor}: {class}");
        assert!(class.contains("size: number;"));
        assert!(class.contains("open(): boolean;"));
        // The interface itself is still declared.
        assert!(decls.text.contains("export interface I {"));
    }
}

#[test]
fn test_nested_empty_namespace_becomes_interface() {
    let json = r#"{
        "kind": "Root",
        "topLevelNamespace": {"kind": "Namespace", "namespaces": [{
            "kind": "Namespace",
            "name": "N",
            "namespaces": [{"kind": "Namespace", "name": "Empty"}]
        }]}
    }"#;

    let globals = generate("N", json, "{}", Flavor::Globals);
    assert!(globals.text.contains("declare namespace N {"), "{}", globals.text);
    assert!(globals.text.contains("export interface Empty {}"));
    assert!(!globals.text.contains("namespace Empty"));
    assert!(globals
        .warnings
        .iter()
        .any(|w| w.kind == WarningKind::Reclassified && w.message.contains("`N.Empty`")));

    let modules = generate("N", json, "{}", Flavor::Modules);
    assert!(modules.text.contains("declare module \"N\" {"), "{}", modules.text);
    assert!(modules.text.contains("export interface Empty {}"));
    assert!(!modules.text.contains("declare module \"N/Empty\""));
}

#[test]
fn test_namespace_emptied_by_filtering_becomes_interface() {
    let json = r#"{
        "kind": "Root",
        "topLevelNamespace": {"kind": "Namespace", "namespaces": [{
            "kind": "Namespace",
            "name": "lib",
            "namespaces": [{
                "kind": "Namespace",
                "name": "internal",
                "classes": [{"kind": "Class", "name": "Secret", "visibility": "restricted"}]
            }]
        }]}
    }"#;

    let globals = generate("lib", json, "{}", Flavor::Globals);
    assert!(globals.text.contains("export interface internal {}"), "{}", globals.text);
    assert!(!globals.text.contains("Secret"));
}

#[test]
fn test_bad_method_is_removed_by_name_everywhere() {
    let json = r#"{
        "kind": "Root",
        "topLevelNamespace": {"kind": "Namespace", "namespaces": [{
            "kind": "Namespace",
            "name": "app",
            "classes": [
                {"kind": "Class", "name": "Opa", "methods": [
                    {"kind": "FunctionDesc", "name": "createPageObjects"},
                    {"kind": "FunctionDesc", "name": "waitFor"}
                ]},
                {"kind": "Class", "name": "Journey", "methods": [
                    {"kind": "FunctionDesc", "name": "createPageObjects", "static": true}
                ]},
                {"kind": "Class", "name": "Factory", "methods": [
                    {"kind": "FunctionDesc", "name": "createPageObjects",
                     "parameters": [{"kind": "Parameter", "name": "pages",
                                     "type": {"kind": "SimpleType", "type": "object"}}]},
                    {"kind": "FunctionDesc", "name": "build"}
                ]}
            ]
        }]}
    }"#;
    let directives = r#"{"badMethods": ["createPageObjects"]}"#;

    for flavor in Flavor::ALL {
        let decls = generate("app", json, directives, flavor);
        assert!(!decls.text.contains("createPageObjects"), "{}", decls.text);
        assert!(decls.text.contains("waitFor(): void;"));
        assert!(decls.text.contains("build(): void;"));
        let excluded = decls
            .warnings
            .iter()
            .filter(|w| w.kind == WarningKind::Excluded && w.message.contains("createPageObjects"))
            .count();
        assert_eq!(excluded, 3);
    }
}

const LAYERED: &str = r#"{
    "kind": "Root",
    "topLevelNamespace": {"kind": "Namespace", "namespaces": [{
        "kind": "Namespace",
        "name": "lib",
        "visibility": "public",
        "namespaces": [{
            "kind": "Namespace",
            "name": "hidden",
            "visibility": "restricted",
            "classes": [{"kind": "Class", "name": "Public", "visibility": "public"}]
        }],
        "classes": [{
            "kind": "Class",
            "name": "Widget",
            "visibility": "public",
            "fields": [{"kind": "Variable", "name": "id", "visibility": "restricted"}],
            "methods": [
                {"kind": "FunctionDesc", "name": "render", "visibility": "public"},
                {"kind": "FunctionDesc", "name": "internal", "visibility": "restricted"}
            ]
        }, {
            "kind": "Class",
            "name": "Private",
            "visibility": "restricted",
            "methods": [{"kind": "FunctionDesc", "name": "run", "visibility": "public"}]
        }],
        "interfaces": [{
            "kind": "Interface",
            "name": "IThing",
            "methods": [{"kind": "FunctionDesc", "name": "peek", "visibility": "restricted"}]
        }],
        "enums": [{
            "kind": "Enum",
            "name": "Mode",
            "values": [
                {"kind": "Variable", "name": "On"},
                {"kind": "Variable", "name": "Off", "visibility": "restricted"}
            ]
        }]
    }]}
}"#;

fn assert_no_restricted(ns: &Namespace) {
    assert_ne!(ns.visibility, Some(Visibility::Restricted), "namespace {}", ns.name);
    for class in &ns.classes {
        assert_class_clean(class);
    }
    for iface in &ns.interfaces {
        assert_ne!(iface.visibility, Some(Visibility::Restricted));
        for method in &iface.methods {
            assert_ne!(method.visibility, Some(Visibility::Restricted));
        }
    }
    for en in &ns.enums {
        for value in &en.values {
            assert_ne!(value.visibility, Some(Visibility::Restricted));
        }
    }
    for child in &ns.namespaces {
        assert_no_restricted(child);
    }
}

fn assert_class_clean(class: &Class) {
    assert_ne!(class.visibility, Some(Visibility::Restricted), "class {}", class.name);
    for method in &class.methods {
        assert_ne!(method.visibility, Some(Visibility::Restricted));
    }
    for field in &class.fields {
        assert_ne!(field.visibility, Some(Visibility::Restricted));
    }
}

#[test]
fn test_visibility_filtering_is_transitive() {
    let source = root(LAYERED);
    let symbols = SymbolTable::build("lib", &source);
    let ast = transform::run("lib", source, &symbols).unwrap();

    assert_no_restricted(&ast.root.top_level_namespace);
    let fqns = ast.links.aggregate_fqns();
    assert!(!fqns.contains("lib.hidden"));
    assert!(!fqns.contains("lib.hidden.Public"));
    assert!(!fqns.contains("lib.Private"));
    assert!(fqns.contains("lib.Widget"));
    // hidden (with its class), id, internal, Private, peek, Off.
    assert_eq!(ast.report.removed, 6);
}

#[test]
fn test_fqn_round_trip_matches_symbol_table() {
    let source = root(LAYERED);
    let symbols = SymbolTable::build("lib", &source);
    let ast = transform::run("lib", source, &symbols).unwrap();

    let fqns = ast.links.aggregate_fqns();
    assert_eq!(fqns.len(), 5, "{fqns:?}");
    for fqn in &fqns {
        assert!(symbols.contains(fqn), "`{fqn}` not in the symbol table");
    }

    let lib = &ast.root.top_level_namespace.namespaces[0];
    let widget = &lib.classes[0];
    assert_eq!(ast.links.fqn(widget.link.id.unwrap()).unwrap(), "lib.Widget");
    let render = &widget.methods[0];
    assert_eq!(
        ast.links.fqn(render.link.id.unwrap()).unwrap(),
        "lib.Widget.render"
    );
    assert_eq!(render.link.parent, widget.link.id);
}

#[test]
fn test_correction_phase_is_idempotent() {
    let json = r#"{
        "kind": "Root",
        "topLevelNamespace": {"kind": "Namespace", "namespaces": [{
            "kind": "Namespace",
            "name": "sap",
            "namespaces": [{
                "kind": "Namespace",
                "name": "ui",
                "functions": [{
                    "kind": "FunctionDesc",
                    "name": "define",
                    "parameters": [{"kind": "Parameter", "name": "aDependencies",
                                    "type": {"kind": "SimpleType", "type": "string[]"}}]
                }],
                "classes": [{"kind": "Class", "name": "Gone", "visibility": "restricted"}]
            }]
        }]}
    }"#;
    let mut source = root(json);
    let symbols = SymbolTable::build("sap.ui.core", &source);

    let first = transform::correct("sap.ui.core", &mut source, &symbols);
    assert_eq!((first.removed, first.fixed), (1, 1));
    let once = source.clone();

    let second = transform::correct("sap.ui.core", &mut source, &symbols);
    assert_eq!((second.removed, second.fixed), (0, 0));
    assert_eq!(source, once);
}

#[test]
fn test_typo_correction_reaches_unions_and_shapes() {
    let json = r#"{
        "kind": "Root",
        "topLevelNamespace": {"kind": "Namespace", "namespaces": [{
            "kind": "Namespace",
            "name": "ui",
            "classes": [
                {"kind": "Class", "name": "Button"},
                {"kind": "Class", "name": "Toolbar", "methods": [{
                    "kind": "FunctionDesc",
                    "name": "add",
                    "parameters": [
                        {"kind": "Parameter", "name": "item", "type": {"kind": "UnionType", "types": [
                            {"kind": "SimpleType", "type": "ui.Buton"},
                            {"kind": "SimpleType", "type": "strng"}
                        ]}},
                        {"kind": "Parameter", "name": "options", "optional": true, "type": {
                            "after": {"name": "after", "type": {"kind": "SimpleType", "type": "ui.Buton"}}
                        }}
                    ],
                    "returns": {"type": {"kind": "SimpleType", "type": "ui.Buton[]"}}
                }]}
            ]
        }]}
    }"#;
    let directives = r#"{"typeTyposMap": {"ui.Buton": "ui.Button", "strng": "string"}}"#;

    let globals = generate("ui", json, directives, Flavor::Globals);
    assert!(
        globals.text.contains(
            "add(item: ui.Button | string, options?: { after: ui.Button; }): ui.Button[];"
        ),
        "{}",
        globals.text
    );
    assert!(!globals.text.contains("Buton"));
    assert!(globals.warnings.is_empty(), "{:?}", globals.warnings);

    let modules = generate("ui", json, directives, Flavor::Modules);
    assert!(
        modules
            .text
            .contains("add(item: Button | string, options?: { after: Button; }): Button[];"),
        "{}",
        modules.text
    );
}

#[test]
fn test_unknown_kind_is_fatal() {
    let json = r#"{
        "kind": "Root",
        "topLevelNamespace": {"kind": "Namespace", "namespaces": [{
            "kind": "Namespace",
            "name": "lib",
            "classes": [{"kind": "Widget", "name": "C"}]
        }]}
    }"#;
    assert!(parse_root(json).is_err());
}

#[test]
fn test_flavors_differ_only_in_reference_syntax() {
    let json = r#"{
        "kind": "Root",
        "topLevelNamespace": {"kind": "Namespace", "namespaces": [{
            "kind": "Namespace",
            "name": "lib",
            "classes": [{"kind": "Class", "name": "Base"}],
            "namespaces": [{
                "kind": "Namespace",
                "name": "ext",
                "classes": [{
                    "kind": "Class",
                    "name": "Derived",
                    "extends": "lib.Base",
                    "methods": [{"kind": "FunctionDesc", "name": "base",
                                 "returns": {"type": {"kind": "SimpleType", "type": "lib.Base"}}}]
                }]
            }]
        }]}
    }"#;

    let globals = generate("lib", json, "{}", Flavor::Globals);
    assert!(globals.text.contains("export class Derived extends lib.Base {"));
    assert!(globals.text.contains("base(): lib.Base;"));
    assert!(!globals.text.contains("import "));

    let modules = generate("lib", json, "{}", Flavor::Modules);
    assert!(modules.text.contains("import { Base } from \"lib\";"));
    assert!(modules.text.contains("export class Derived extends Base {"));
    assert!(modules.text.contains("base(): Base;"));

    assert_eq!(globals.modules, vec!["lib", "lib/ext"]);
    assert_eq!(globals.modules, modules.modules);
}

#[test]
fn test_restricted_dependency_symbols_do_not_resolve() {
    let core = r#"{
        "kind": "Root",
        "topLevelNamespace": {"kind": "Namespace", "namespaces": [{
            "kind": "Namespace",
            "name": "sap",
            "namespaces": [{
                "kind": "Namespace",
                "name": "core",
                "classes": [
                    {"kind": "Class", "name": "Secret", "visibility": "restricted"},
                    {"kind": "Class", "name": "Control"}
                ]
            }]
        }]}
    }"#;
    let mobile = r#"{
        "kind": "Root",
        "topLevelNamespace": {"kind": "Namespace", "namespaces": [{
            "kind": "Namespace",
            "name": "sap",
            "namespaces": [{
                "kind": "Namespace",
                "name": "m",
                "classes": [{
                    "kind": "Class",
                    "name": "Button",
                    "extends": "sap.core.Secret",
                    "methods": [
                        {"kind": "FunctionDesc", "name": "peek",
                         "returns": {"type": {"kind": "SimpleType", "type": "sap.core.Secret"}}},
                        {"kind": "FunctionDesc", "name": "owner",
                         "returns": {"type": {"kind": "SimpleType", "type": "sap.core.Control"}}}
                    ]
                }]
            }]
        }]}
    }"#;

    let dependency = Library::new("sap.core", root(core), Directives::default());
    let primary = Library::new("sap.m", root(mobile), Directives::default());
    let prepared = prepare(primary, vec![dependency], false).expect("pipeline runs");
    assert!(!prepared.symbols.contains("sap.core.Secret"));
    assert!(prepared.symbols.contains("sap.core.Control"));

    for flavor in Flavor::ALL {
        let decls = prepared.emit(flavor).expect("emits");
        assert!(!decls.text.contains("Secret"), "{flavor}: {}", decls.text);
        assert!(decls.text.contains("export class Button {"), "{}", decls.text);
        assert!(decls.text.contains("peek(): any;"));
        assert!(decls
            .warnings
            .iter()
            .any(|w| w.kind == WarningKind::UnresolvedType && w.message.contains("sap.core.Secret")));
    }

    let globals = prepared.emit(Flavor::Globals).expect("emits");
    assert!(globals.text.contains("owner(): sap.core.Control;"));
}
