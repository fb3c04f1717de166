//! Error types for the generator.
//!
//! Only malformed input, precondition violations and compiler failures abort a
//! library's generation. Formatter failures are reported through
//! [`FormatError`] but the caller degrades to unformatted output.

use std::path::PathBuf;

use thiserror::Error;

use crate::ast::NodeKind;

/// The API description does not have the shape of the AST model.
#[derive(Debug, Error)]
pub enum AstError {
    /// Input is not valid JSON, or a node carries an unknown `kind` tag.
    #[error("malformed API description: {0}")]
    Json(#[from] serde_json::Error),

    /// A node appears in a collection that only holds another kind.
    #[error("expected a {expected:?} node under `{parent}`, found {found:?}")]
    UnexpectedKind {
        parent: String,
        expected: NodeKind,
        found: NodeKind,
    },

    /// A symbol-bearing node has an empty name.
    #[error("{kind:?} node under `{parent}` has no name")]
    MissingName { parent: String, kind: NodeKind },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// A directive file could not be loaded.
#[derive(Debug, Error)]
pub enum DirectiveError {
    #[error("failed to read directives from {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed directives in {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Two nodes resolved to the same fully-qualified name.
#[derive(Debug, Error)]
pub enum SymbolError {
    #[error("{count} symbol collision(s) in `{library}`, first: `{first}`")]
    Collisions {
        library: String,
        count: usize,
        first: String,
    },
}

/// A transform phase was invoked without its preconditions.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("symbol table was built for `{table}`, not for `{library}`")]
    SymbolTableMismatch { library: String, table: String },
}

/// The emitter was handed an AST that has not been through the pipeline.
#[derive(Debug, Error)]
pub enum EmitError {
    #[error("`{name}` has no parent link; run the transform pipeline before emitting")]
    Unlinked { name: String },

    #[error("broken parent chain at node {0}")]
    BrokenChain(u32),
}

/// The external formatter could not format the declarations.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("failed to run formatter `{program}`: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("formatter `{program}` exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("formatter output is not UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// The external compiler rejected the generated declarations.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("failed to run compiler `{program}`: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("compiler check failed with {status}:\n{output}")]
    Failed {
        status: std::process::ExitStatus,
        output: String,
    },
}

/// Errors from loading the generator configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Anything that aborts the generation of one library.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("no library to generate; add a [library] section to the config")]
    NoLibrary,
    #[error(transparent)]
    Ast(#[from] AstError),
    #[error(transparent)]
    Directive(#[from] DirectiveError),
    #[error(transparent)]
    Symbol(#[from] SymbolError),
    #[error(transparent)]
    Transform(#[from] TransformError),
    #[error(transparent)]
    Emit(#[from] EmitError),
    #[error(transparent)]
    Check(#[from] CheckError),
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}
