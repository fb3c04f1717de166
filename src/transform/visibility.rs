//! Drop every node declared `restricted`, together with its subtree.

use crate::ast::{is_emittable, Class, Enum, FunctionDesc, Interface, Namespace, Variable};

/// Number of nodes removed by one filtering pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterStats {
    pub removed: usize,
}

/// Filter a namespace in place. Namespaces are filtered first so that
/// children of a removed namespace are never inspected.
pub fn filter_namespace(ns: &mut Namespace) -> FilterStats {
    let mut stats = FilterStats::default();

    stats.removed += retain(&mut ns.namespaces, |n| is_emittable(n.visibility));
    for child in &mut ns.namespaces {
        stats.removed += filter_namespace(child).removed;
    }

    stats.removed += retain(&mut ns.variables, |v| is_emittable(v.visibility));
    stats.removed += retain(&mut ns.functions, |f| is_emittable(f.visibility));

    stats.removed += retain(&mut ns.classes, |c| is_emittable(c.visibility));
    for class in &mut ns.classes {
        stats.removed += filter_class(class);
    }

    stats.removed += retain(&mut ns.interfaces, |i| is_emittable(i.visibility));
    for iface in &mut ns.interfaces {
        stats.removed += filter_interface(iface);
    }

    stats.removed += retain(&mut ns.enums, |e| is_emittable(e.visibility));
    for en in &mut ns.enums {
        stats.removed += filter_enum(en);
    }

    stats
}

fn filter_class(class: &mut Class) -> usize {
    retain(&mut class.constructors, visible_fn)
        + retain(&mut class.fields, visible_var)
        + retain(&mut class.methods, visible_fn)
}

fn filter_interface(iface: &mut Interface) -> usize {
    retain(&mut iface.properties, visible_var) + retain(&mut iface.methods, visible_fn)
}

fn filter_enum(en: &mut Enum) -> usize {
    retain(&mut en.values, visible_var)
}

fn visible_fn(f: &FunctionDesc) -> bool {
    is_emittable(f.visibility)
}

fn visible_var(v: &Variable) -> bool {
    is_emittable(v.visibility)
}

fn retain<T>(items: &mut Vec<T>, keep: impl Fn(&T) -> bool) -> usize {
    let before = items.len();
    items.retain(|item| keep(item));
    before - items.len()
}
