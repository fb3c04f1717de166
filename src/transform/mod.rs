//! The AST transform pipeline.
//!
//! Phases run in a fixed order over one library's tree:
//!
//! 1. visibility filtering
//! 2. library-specific structural fixes
//! 3. parent-link attachment
//!
//! Parent links must observe the final node set, so no phase that adds or
//! removes nodes may run after [`parents::attach`].

pub mod library_fixes;
pub mod parents;
pub mod visibility;

use tracing::debug;

use crate::ast::Root;
use crate::error::TransformError;
use crate::fqn::ParentLinks;
use crate::symbols::SymbolTable;

/// What each phase changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransformReport {
    pub removed: usize,
    pub fixed: usize,
    pub linked: usize,
}

/// One library's tree after the pipeline, ready for emission.
#[derive(Debug, Clone)]
pub struct TransformedAst {
    pub library: String,
    pub root: Root,
    pub links: ParentLinks,
    pub report: TransformReport,
}

/// Run every phase over `root`.
///
/// `symbols` must be the table built for `library` from the unfiltered tree.
pub fn run(
    library: &str,
    mut root: Root,
    symbols: &SymbolTable,
) -> Result<TransformedAst, TransformError> {
    if symbols.library() != library {
        return Err(TransformError::SymbolTableMismatch {
            library: library.to_string(),
            table: symbols.library().to_string(),
        });
    }

    let report = correct(library, &mut root, symbols);
    let links = parents::attach(&mut root);
    let report = TransformReport {
        linked: links.len(),
        ..report
    };
    debug!(
        library,
        removed = report.removed,
        fixed = report.fixed,
        linked = report.linked,
        "transformed AST"
    );

    Ok(TransformedAst {
        library: library.to_string(),
        root,
        links,
        report,
    })
}

/// The correction phases alone: filtering and library fixes.
///
/// Applying this to an already-corrected tree changes nothing.
pub fn correct(library: &str, root: &mut Root, symbols: &SymbolTable) -> TransformReport {
    let removed = visibility::filter_namespace(&mut root.top_level_namespace).removed;
    let fixed = library_fixes::apply_all(library, root, symbols);
    TransformReport {
        removed,
        fixed,
        linked: 0,
    }
}
