//! Parent-link arena and fully-qualified-name resolution.
//!
//! The AST owns its children; parents are only reachable through this arena,
//! which stores one entry per tagged node with a non-owning parent handle.

use std::collections::HashSet;

use crate::ast::{NodeId, NodeKind};
use crate::error::EmitError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkEntry {
    pub kind: NodeKind,
    /// `None` for unnamed nodes (types, the root).
    pub name: Option<String>,
    pub parent: Option<NodeId>,
}

/// Arena of parent links, indexed by [`NodeId`].
#[derive(Debug, Clone, Default)]
pub struct ParentLinks {
    entries: Vec<LinkEntry>,
}

impl ParentLinks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node with no parent yet.
    pub fn alloc(&mut self, kind: NodeKind, name: Option<&str>) -> NodeId {
        let id = NodeId(self.entries.len() as u32);
        self.entries.push(LinkEntry {
            kind,
            name: name.map(str::to_string),
            parent: None,
        });
        id
    }

    pub fn set_parent(&mut self, child: NodeId, parent: NodeId) {
        if let Some(entry) = self.entries.get_mut(child.0 as usize) {
            entry.parent = Some(parent);
        }
    }

    pub fn get(&self, id: NodeId) -> Option<&LinkEntry> {
        self.entries.get(id.0 as usize)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?.parent
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &LinkEntry)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, e)| (NodeId(i as u32), e))
    }

    /// The chain from `id` up to the root, starting with `id` itself.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            links: self,
            next: Some(id),
            remaining: self.entries.len(),
        }
    }

    /// Dot-join the names along the parent chain, root excluded.
    ///
    /// Unnamed nodes (the root, the top-level namespace, types) contribute no
    /// segment.
    pub fn fqn(&self, id: NodeId) -> Result<String, EmitError> {
        let mut segments = Vec::new();
        let mut reached_root = false;
        for (_, entry) in self.ancestors(id) {
            if entry.kind == NodeKind::Root {
                reached_root = true;
                break;
            }
            if let Some(name) = entry.name.as_deref().filter(|n| !n.is_empty()) {
                segments.push(name);
            }
        }
        if !reached_root {
            return Err(EmitError::BrokenChain(id.0));
        }
        segments.reverse();
        Ok(segments.join("."))
    }

    /// FQNs of every namespace, class, interface and enum in the arena.
    pub fn aggregate_fqns(&self) -> HashSet<String> {
        self.iter()
            .filter(|(_, e)| {
                matches!(
                    e.kind,
                    NodeKind::Namespace | NodeKind::Class | NodeKind::Interface | NodeKind::Enum
                )
            })
            .filter_map(|(id, _)| self.fqn(id).ok())
            .collect()
    }
}

pub struct Ancestors<'a> {
    links: &'a ParentLinks,
    next: Option<NodeId>,
    // Bounds the walk so a corrupted arena cannot loop forever.
    remaining: usize,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = (NodeId, &'a LinkEntry);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let id = self.next?;
        let entry = self.links.get(id)?;
        self.next = entry.parent;
        Some((id, entry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> (ParentLinks, NodeId) {
        let mut links = ParentLinks::new();
        let root = links.alloc(NodeKind::Root, None);
        let top = links.alloc(NodeKind::Namespace, Some(""));
        let sap = links.alloc(NodeKind::Namespace, Some("sap"));
        let m = links.alloc(NodeKind::Namespace, Some("m"));
        let button = links.alloc(NodeKind::Class, Some("Button"));
        links.set_parent(top, root);
        links.set_parent(sap, top);
        links.set_parent(m, sap);
        links.set_parent(button, m);
        (links, button)
    }

    #[test]
    fn joins_names_up_to_root() {
        let (links, button) = chain();
        assert_eq!(links.fqn(button).unwrap(), "sap.m.Button");
        assert_eq!(links.fqn(NodeId(1)).unwrap(), "");
        assert_eq!(links.fqn(NodeId(0)).unwrap(), "");
    }

    #[test]
    fn detached_node_is_an_error() {
        let (mut links, _) = chain();
        let orphan = links.alloc(NodeKind::Class, Some("Orphan"));
        assert!(matches!(links.fqn(orphan), Err(EmitError::BrokenChain(_))));
    }

    #[test]
    fn cyclic_arena_terminates() {
        let mut links = ParentLinks::new();
        let a = links.alloc(NodeKind::Namespace, Some("a"));
        let b = links.alloc(NodeKind::Namespace, Some("b"));
        links.set_parent(a, b);
        links.set_parent(b, a);
        assert!(links.fqn(a).is_err());
    }

    #[test]
    fn collects_aggregate_names() {
        let (links, _) = chain();
        let fqns = links.aggregate_fqns();
        assert!(fqns.contains("sap.m.Button"));
        assert!(fqns.contains("sap.m"));
        assert!(fqns.contains(""));
    }
}
