//! Symbol table: fully-qualified name to defining namespace, class,
//! interface or enum.
//!
//! Built once per library from the unfiltered AST, before any transform runs.
//! Variables, functions and members are not indexed; only their owning
//! aggregate is.

use indexmap::IndexMap;
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::ast::{join, Namespace, Root};
use crate::error::SymbolError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Namespace,
    Class,
    Interface,
    Enum,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub fqn: String,
    pub name: String,
    pub kind: SymbolKind,
    /// Library whose API description defines the symbol.
    pub library: String,
}

impl Symbol {
    /// FQN of the namespace that declares this symbol; empty at top level.
    pub fn owner(&self) -> &str {
        self.fqn.rsplit_once('.').map(|(owner, _)| owner).unwrap_or("")
    }
}

/// Two definitions that resolved to the same FQN. The first one is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collision {
    pub fqn: String,
    pub kept: SymbolKind,
    pub dropped: SymbolKind,
    pub library: String,
}

#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    library: String,
    entries: IndexMap<String, Symbol>,
    collisions: Vec<Collision>,
}

impl SymbolTable {
    pub fn new(library: impl Into<String>) -> Self {
        Self {
            library: library.into(),
            ..Self::default()
        }
    }

    /// Index every namespace, class, interface and enum reachable from `root`.
    pub fn build(library: &str, root: &Root) -> Self {
        let table = collect_namespace(library, &root.top_level_namespace, "");
        debug!(
            library,
            symbols = table.len(),
            collisions = table.collisions.len(),
            "built symbol table"
        );
        table
    }

    pub fn library(&self) -> &str {
        &self.library
    }

    pub fn get(&self, fqn: &str) -> Option<&Symbol> {
        self.entries.get(fqn)
    }

    pub fn contains(&self, fqn: &str) -> bool {
        self.entries.contains_key(fqn)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.entries.values()
    }

    pub fn collisions(&self) -> &[Collision] {
        &self.collisions
    }

    /// Register one symbol. An existing entry wins and the clash is recorded.
    pub fn insert(&mut self, symbol: Symbol) {
        if let Some(existing) = self.entries.get(&symbol.fqn) {
            warn!(
                fqn = %symbol.fqn,
                kept = ?existing.kind,
                dropped = ?symbol.kind,
                "duplicate symbol definition"
            );
            self.collisions.push(Collision {
                fqn: symbol.fqn,
                kept: existing.kind,
                dropped: symbol.kind,
                library: symbol.library,
            });
            return;
        }
        self.entries.insert(symbol.fqn.clone(), symbol);
    }

    /// Merge a sibling sub-table of the same library. No entry is dropped
    /// silently.
    pub fn merge(&mut self, other: SymbolTable) {
        self.collisions.extend(other.collisions);
        for (_, symbol) in other.entries {
            self.insert(symbol);
        }
    }

    /// Add the symbols of dependency libraries.
    ///
    /// Entries of this table always win. Namespaces shared between libraries
    /// are expected and skipped quietly; any other overlap is recorded.
    pub fn with_dependencies(mut self, dependencies: Vec<SymbolTable>) -> Self {
        for dep in dependencies {
            for (fqn, symbol) in dep.entries {
                match self.entries.get(&fqn) {
                    None => {
                        self.entries.insert(fqn, symbol);
                    }
                    Some(existing)
                        if existing.kind == SymbolKind::Namespace
                            && symbol.kind == SymbolKind::Namespace => {}
                    Some(_) => self.insert(symbol),
                }
            }
        }
        self
    }

    /// Turn recorded collisions into an error, for strict runs.
    pub fn ensure_no_collisions(&self) -> Result<(), SymbolError> {
        match self.collisions.first() {
            None => Ok(()),
            Some(first) => Err(SymbolError::Collisions {
                library: self.library.clone(),
                count: self.collisions.len(),
                first: first.fqn.clone(),
            }),
        }
    }
}

fn collect_namespace(library: &str, ns: &Namespace, prefix: &str) -> SymbolTable {
    let mut table = SymbolTable::new(library);
    table.insert(Symbol {
        fqn: prefix.to_string(),
        name: ns.name.clone(),
        kind: SymbolKind::Namespace,
        library: library.to_string(),
    });

    for child in &ns.namespaces {
        let sub = collect_namespace(library, child, &join(prefix, &child.name));
        table.merge(sub);
    }

    let owned = ns
        .classes
        .iter()
        .map(|c| (&c.name, SymbolKind::Class))
        .chain(ns.interfaces.iter().map(|i| (&i.name, SymbolKind::Interface)))
        .chain(ns.enums.iter().map(|e| (&e.name, SymbolKind::Enum)));
    for (name, kind) in owned {
        table.insert(Symbol {
            fqn: join(prefix, name),
            name: name.clone(),
            kind,
            library: library.to_string(),
        });
    }
    table
}

/// Build the tables of several libraries at once. The libraries are
/// independent, so they are indexed in parallel.
pub fn build_tables(libraries: &[(String, Root)]) -> Vec<SymbolTable> {
    libraries
        .par_iter()
        .map(|(name, root)| SymbolTable::build(name, root))
        .collect()
}
