//! Structural corrections that only apply to specific libraries.
//!
//! Each fix is registered with a predicate on the library name instead of
//! being inlined into the pipeline. A fix whose target namespace or function
//! is missing from the input does nothing.

use tracing::debug;

use crate::ast::{FunctionDesc, ParamType, Root, SimpleType, Type};
use crate::symbols::{SymbolKind, SymbolTable};

/// The library that ships the module loader.
pub const CORE_LIBRARY: &str = "sap.ui.core";

/// Interface whose keys are the module names known to the loader.
pub const MODULE_NAMES_INTERFACE: &str = "IUI5DefineDependencyNames";

pub struct LibraryFix {
    pub name: &'static str,
    pub applies_to: fn(&str) -> bool,
    /// Returns the number of type occurrences rewritten.
    pub apply: fn(&mut Root, &SymbolTable) -> usize,
}

static FIXES: &[LibraryFix] = &[LibraryFix {
    name: "loader-dependency-names",
    applies_to: is_core_library,
    apply: narrow_loader_dependencies,
}];

/// All registered fixes, in application order.
pub fn registry() -> &'static [LibraryFix] {
    FIXES
}

fn is_core_library(library: &str) -> bool {
    library == CORE_LIBRARY
}

/// Run every fix that applies to `library`. Returns the total number of
/// rewrites.
pub fn apply_all(library: &str, root: &mut Root, symbols: &SymbolTable) -> usize {
    let mut total = 0;
    for fix in registry().iter().filter(|f| (f.applies_to)(library)) {
        let changed = (fix.apply)(root, symbols);
        debug!(library, fix = fix.name, changed, "applied library fix");
        total += changed;
    }
    total
}

const LOADER_NAMESPACE: &str = "sap.ui";

/// Loader functions and the parameter that lists module dependencies.
const LOADER_FUNCTIONS: &[(&str, &str)] = &[
    ("define", "aDependencies"),
    ("require", "vDependencies"),
];

/// Restrict the dependency-list parameters of the loader functions to the
/// closed set of registered module names.
fn narrow_loader_dependencies(root: &mut Root, symbols: &SymbolTable) -> usize {
    let is_namespace = symbols
        .get(LOADER_NAMESPACE)
        .map(|s| s.kind == SymbolKind::Namespace)
        .unwrap_or(false);
    if !is_namespace {
        return 0;
    }
    let Some(ns) = root.top_level_namespace.find_namespace_mut(LOADER_NAMESPACE) else {
        return 0;
    };

    let mut changed = 0;
    for (function, param) in LOADER_FUNCTIONS {
        if let Some(func) = ns.functions.iter_mut().find(|f| f.name == *function) {
            changed += narrow_parameter(func, param);
        }
    }
    changed
}

fn narrow_parameter(func: &mut FunctionDesc, param: &str) -> usize {
    let Some(param) = func.parameters.iter_mut().find(|p| p.name == param) else {
        return 0;
    };
    match &mut param.ty {
        Some(ParamType::Type(Type::SimpleType(simple))) => narrow(simple),
        Some(ParamType::Type(Type::UnionType(union))) => {
            union.types.iter_mut().map(narrow).sum()
        }
        _ => 0,
    }
}

fn narrow(ty: &mut SimpleType) -> usize {
    let replacement = match ty.name.as_str() {
        "string" => format!("keyof {MODULE_NAMES_INTERFACE}"),
        "string[]" => format!("(keyof {MODULE_NAMES_INTERFACE})[]"),
        _ => return 0,
    };
    ty.name = replacement;
    ty.skip_correction = true;
    1
}
