//! Attach parent links to every tagged node.
//!
//! Runs last among the phases that add or remove nodes. Each child is linked
//! into the arena (and its own descendants linked to it) before the child's
//! parent is assigned. Values of a keyed mapping, i.e. the entries of a nested
//! option-object parameter shape, are not tagged nodes and get no link.

use crate::ast::{
    Class, Enum, FunctionDesc, Interface, Link, Namespace, NodeId, NodeKind, ParamType,
    Parameter, Root, Type, Variable,
};
use crate::fqn::ParentLinks;

/// Rebuild the arena from scratch and write every node's link.
pub fn attach(root: &mut Root) -> ParentLinks {
    let mut links = ParentLinks::new();
    let root_id = links.alloc(NodeKind::Root, None);
    root.link = Link {
        id: Some(root_id),
        parent: None,
    };
    let top = link_namespace(&mut links, &mut root.top_level_namespace);
    adopt(&mut links, &mut root.top_level_namespace.link, top, root_id);
    links
}

fn adopt(links: &mut ParentLinks, link: &mut Link, child: NodeId, parent: NodeId) {
    links.set_parent(child, parent);
    link.parent = Some(parent);
}

fn link_namespace(links: &mut ParentLinks, ns: &mut Namespace) -> NodeId {
    let id = links.alloc(NodeKind::Namespace, Some(&ns.name));
    ns.link.id = Some(id);

    for child in &mut ns.namespaces {
        let child_id = link_namespace(links, child);
        adopt(links, &mut child.link, child_id, id);
    }
    for var in &mut ns.variables {
        let child_id = link_variable(links, var);
        adopt(links, &mut var.link, child_id, id);
    }
    for func in &mut ns.functions {
        let child_id = link_function(links, func);
        adopt(links, &mut func.link, child_id, id);
    }
    for class in &mut ns.classes {
        let child_id = link_class(links, class);
        adopt(links, &mut class.link, child_id, id);
    }
    for iface in &mut ns.interfaces {
        let child_id = link_interface(links, iface);
        adopt(links, &mut iface.link, child_id, id);
    }
    for en in &mut ns.enums {
        let child_id = link_enum(links, en);
        adopt(links, &mut en.link, child_id, id);
    }
    id
}

fn link_class(links: &mut ParentLinks, class: &mut Class) -> NodeId {
    let id = links.alloc(NodeKind::Class, Some(&class.name));
    class.link.id = Some(id);
    for ctor in &mut class.constructors {
        let child_id = link_function(links, ctor);
        adopt(links, &mut ctor.link, child_id, id);
    }
    for field in &mut class.fields {
        let child_id = link_variable(links, field);
        adopt(links, &mut field.link, child_id, id);
    }
    for method in &mut class.methods {
        let child_id = link_function(links, method);
        adopt(links, &mut method.link, child_id, id);
    }
    id
}

fn link_interface(links: &mut ParentLinks, iface: &mut Interface) -> NodeId {
    let id = links.alloc(NodeKind::Interface, Some(&iface.name));
    iface.link.id = Some(id);
    for prop in &mut iface.properties {
        let child_id = link_variable(links, prop);
        adopt(links, &mut prop.link, child_id, id);
    }
    for method in &mut iface.methods {
        let child_id = link_function(links, method);
        adopt(links, &mut method.link, child_id, id);
    }
    id
}

fn link_enum(links: &mut ParentLinks, en: &mut Enum) -> NodeId {
    let id = links.alloc(NodeKind::Enum, Some(&en.name));
    en.link.id = Some(id);
    for value in &mut en.values {
        let child_id = link_variable(links, value);
        adopt(links, &mut value.link, child_id, id);
    }
    id
}

fn link_variable(links: &mut ParentLinks, var: &mut Variable) -> NodeId {
    let id = links.alloc(NodeKind::Variable, Some(&var.name));
    var.link.id = Some(id);
    if let Some(ty) = &mut var.ty {
        link_type(links, ty, id);
    }
    id
}

fn link_function(links: &mut ParentLinks, func: &mut FunctionDesc) -> NodeId {
    let id = links.alloc(NodeKind::FunctionDesc, Some(&func.name));
    func.link.id = Some(id);
    for param in &mut func.parameters {
        let child_id = link_parameter(links, param);
        adopt(links, &mut param.link, child_id, id);
    }
    if let Some(ty) = func.returns.as_mut().and_then(|r| r.ty.as_mut()) {
        link_type(links, ty, id);
    }
    for throws in &mut func.throws {
        if let Some(ty) = &mut throws.ty {
            link_type(links, ty, id);
        }
    }
    id
}

fn link_parameter(links: &mut ParentLinks, param: &mut Parameter) -> NodeId {
    let id = links.alloc(NodeKind::Parameter, Some(&param.name));
    param.link.id = Some(id);
    if let Some(ParamType::Type(ty)) = &mut param.ty {
        link_type(links, ty, id);
    }
    id
}

fn link_type(links: &mut ParentLinks, ty: &mut Type, parent: NodeId) {
    match ty {
        Type::SimpleType(simple) => {
            let id = links.alloc(NodeKind::SimpleType, None);
            simple.link.id = Some(id);
            adopt(links, &mut simple.link, id, parent);
        }
        Type::UnionType(union) => {
            let id = links.alloc(NodeKind::UnionType, None);
            union.link.id = Some(id);
            for member in &mut union.types {
                let member_id = links.alloc(NodeKind::SimpleType, None);
                member.link.id = Some(member_id);
                adopt(links, &mut member.link, member_id, id);
            }
            adopt(links, &mut union.link, id, parent);
        }
    }
}
