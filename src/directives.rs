//! Per-library directives: curated corrections for known defects in the API
//! descriptions.
//!
//! Directives are hints. A directive whose target does not exist in the
//! filtered AST is simply never consulted.
//!
//! `badMethods` is matched by simple method name across every class and
//! interface of the library, not by FQN. Listing `createPageObjects` removes
//! that method from every class that declares it, including classes that were
//! never meant to be affected. Use `badSymbols` with a member FQN for a
//! targeted exclusion.

use std::path::Path;

use indexmap::{IndexMap, IndexSet};
use serde::Deserialize;

use crate::ast::SimpleType;
use crate::error::DirectiveError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Directives {
    /// Method names excluded from every class and interface.
    pub bad_methods: IndexSet<String>,
    /// Interface FQNs stripped from every class's implements list.
    pub bad_interfaces: IndexSet<String>,
    /// Symbol or member FQNs excluded from emission.
    pub bad_symbols: IndexSet<String>,
    /// Raw type names mapped to names the target type system understands.
    pub type_typos_map: IndexMap<String, String>,
    /// Namespace FQNs emitted as interfaces.
    pub namespaces_to_interfaces: IndexMap<String, bool>,
    /// Symbol or member FQN to the reason for a compiler-suppression comment.
    pub fqn_to_ignore: IndexMap<String, String>,
}

impl Directives {
    /// Parse a directive file's JSON content.
    pub fn parse(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn load(path: &Path) -> Result<Self, DirectiveError> {
        let content = std::fs::read_to_string(path).map_err(|source| DirectiveError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content).map_err(|source| DirectiveError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load and merge several files of one library. Earlier files win on
    /// conflicting map keys.
    pub fn load_all<P: AsRef<Path>>(paths: &[P]) -> Result<Self, DirectiveError> {
        let mut merged = Directives::default();
        for path in paths {
            merged.absorb(Directives::load(path.as_ref())?);
        }
        Ok(merged)
    }

    /// Merge the primary library's directives with those of its dependencies.
    ///
    /// Sets are unioned. For map entries the primary library always wins,
    /// then dependencies in the order given.
    pub fn merge(primary: Directives, dependencies: impl IntoIterator<Item = Directives>) -> Self {
        let mut merged = primary;
        for dep in dependencies {
            merged.absorb(dep);
        }
        merged
    }

    fn absorb(&mut self, other: Directives) {
        self.bad_methods.extend(other.bad_methods);
        self.bad_interfaces.extend(other.bad_interfaces);
        self.bad_symbols.extend(other.bad_symbols);
        for (k, v) in other.type_typos_map {
            self.type_typos_map.entry(k).or_insert(v);
        }
        for (k, v) in other.namespaces_to_interfaces {
            self.namespaces_to_interfaces.entry(k).or_insert(v);
        }
        for (k, v) in other.fqn_to_ignore {
            self.fqn_to_ignore.entry(k).or_insert(v);
        }
    }

    pub fn is_bad_method(&self, name: &str) -> bool {
        self.bad_methods.contains(name)
    }

    pub fn is_bad_interface(&self, fqn: &str) -> bool {
        self.bad_interfaces.contains(fqn)
    }

    pub fn is_bad_symbol(&self, fqn: &str) -> bool {
        self.bad_symbols.contains(fqn)
    }

    pub fn reclassifies_namespace(&self, fqn: &str) -> bool {
        self.namespaces_to_interfaces.get(fqn).copied().unwrap_or(false)
    }

    pub fn ignore_reason(&self, fqn: &str) -> Option<&str> {
        self.fqn_to_ignore.get(fqn).map(String::as_str)
    }

    /// The type name to emit for one occurrence, after typo correction.
    pub fn correct<'a>(&'a self, ty: &'a SimpleType) -> &'a str {
        if ty.skip_correction {
            return &ty.name;
        }
        self.type_typos_map
            .get(&ty.name)
            .map(String::as_str)
            .unwrap_or(ty.name.as_str())
    }
}
