//! TypeScript declaration generator for library API descriptions.
//!
//! A library's API description (JSON) is parsed into an AST, indexed into a
//! symbol table, corrected by the transform pipeline with the help of
//! per-library directives, and emitted as declaration text in one or both
//! output flavors. The text is then patched, formatted and written next to a
//! hand-editable augmentation file.
//!
//! ```text
//! api.json ─► ast ─► symbols ─► transform ─► emit ─► postprocess ─► output ─► check
//! ```

pub mod ast;
pub mod check;
pub mod config;
pub mod directives;
pub mod emit;
pub mod error;
pub mod fqn;
pub mod output;
pub mod postprocess;
pub mod symbols;
pub mod transform;

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, info};

pub use config::GeneratorConfig;
pub use directives::Directives;
pub use emit::{Declarations, Flavor, Warning, WarningKind};
pub use error::GenerateError;
pub use symbols::SymbolTable;
pub use transform::{TransformReport, TransformedAst};

use ast::Root;
use emit::emit;
use output::OutputWriter;
use postprocess::{post_process, Formatter, NoFormatter};
use transform::visibility;

/// One library's parsed API description and directives.
#[derive(Debug, Clone)]
pub struct Library {
    pub name: String,
    pub root: Root,
    pub directives: Directives,
}

impl Library {
    pub fn new(name: impl Into<String>, root: Root, directives: Directives) -> Self {
        Self {
            name: name.into(),
            root,
            directives,
        }
    }

    /// Read the API description and directive files of one library.
    pub fn load(name: &str, api: &Path, directives: &[PathBuf]) -> Result<Self, GenerateError> {
        debug!(library = name, api = %api.display(), "loading library");
        let root = ast::load_root(api)?;
        let directives = Directives::load_all(directives)?;
        Ok(Self::new(name, root, directives))
    }
}

/// The primary library after the transform pipeline, with everything the
/// emitter needs.
#[derive(Debug)]
pub struct Prepared {
    pub ast: TransformedAst,
    /// Primary symbols merged with all dependency symbols.
    pub symbols: SymbolTable,
    /// Primary directives merged with all dependency directives.
    pub directives: Directives,
}

impl Prepared {
    pub fn emit(&self, flavor: Flavor) -> Result<Declarations, GenerateError> {
        Ok(emit(&self.ast, &self.symbols, &self.directives, flavor)?)
    }
}

/// Index every library, then run the transform pipeline over the primary one.
///
/// The primary symbol table is built from the unfiltered tree before any
/// transform phase. Dependencies lose their `restricted` nodes first, so only
/// symbols their own output declares can be referenced. Their tables are
/// built in parallel and only serve name resolution.
pub fn prepare(
    primary: Library,
    dependencies: Vec<Library>,
    fail_on_collision: bool,
) -> Result<Prepared, GenerateError> {
    let table = SymbolTable::build(&primary.name, &primary.root);
    if fail_on_collision {
        table.ensure_no_collisions()?;
    }

    let (roots, dep_directives): (Vec<_>, Vec<_>) = dependencies
        .into_iter()
        .map(|mut lib| {
            let removed = visibility::filter_namespace(&mut lib.root.top_level_namespace).removed;
            debug!(library = %lib.name, removed, "filtered dependency");
            ((lib.name, lib.root), lib.directives)
        })
        .unzip();
    let dep_tables = symbols::build_tables(&roots);

    let ast = transform::run(&primary.name, primary.root, &table)?;
    let symbols = table.with_dependencies(dep_tables);
    let directives = Directives::merge(primary.directives, dep_directives);
    debug!(
        library = %ast.library,
        symbols = symbols.len(),
        dependencies = roots.len(),
        "prepared library"
    );

    Ok(Prepared {
        ast,
        symbols,
        directives,
    })
}

/// One written declaration file.
#[derive(Debug)]
pub struct GeneratedFile {
    pub flavor: Flavor,
    pub path: PathBuf,
    pub modules: usize,
    pub warnings: Vec<Warning>,
    pub augment_created: bool,
}

/// Summary of a generator run.
#[derive(Debug)]
pub struct GenerateReport {
    pub library: String,
    pub transform: TransformReport,
    /// Duplicate definitions recorded while indexing.
    pub collisions: usize,
    pub files: Vec<GeneratedFile>,
    /// Whether the compiler check ran and passed.
    pub checked: bool,
}

/// Runs the whole pipeline for the library described by a config.
pub struct Generator {
    config: GeneratorConfig,
    flavors: Vec<Flavor>,
    check: bool,
}

impl Generator {
    pub fn new(config: GeneratorConfig) -> Self {
        let flavors = config.output.flavors();
        let check = config.check.enabled();
        Self {
            config,
            flavors,
            check,
        }
    }

    /// Emit only the given flavors instead of the configured ones.
    pub fn with_flavors(mut self, flavors: Vec<Flavor>) -> Self {
        self.flavors = flavors;
        self
    }

    /// Skip the compiler check even if the config enables it.
    pub fn without_check(mut self) -> Self {
        self.check = false;
        self
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn run(&self) -> Result<GenerateReport, GenerateError> {
        let config = &self.config;
        let library = config.library.as_ref().ok_or(GenerateError::NoLibrary)?;
        info!(library = %library.name, "generating declarations");

        let primary = Library::load(
            &library.name,
            &config.resolve(&library.api),
            &config.resolve_all(&library.directives),
        )?;
        let dependencies = config
            .dependency
            .par_iter()
            .map(|dep| {
                Library::load(
                    &dep.name,
                    &config.resolve(&dep.api),
                    &config.resolve_all(&dep.directives),
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        let prepared = prepare(
            primary,
            dependencies,
            config.symbols.fail_on_collision(),
        )?;
        let collisions = prepared.symbols.collisions().len();

        let formatter: Box<dyn Formatter> = match config.format.formatter() {
            Some(formatter) => Box::new(formatter),
            None => Box::new(NoFormatter),
        };
        let writer = OutputWriter::new(config.output_dir(), config.output.augmentation_stubs());

        let mut files = Vec::with_capacity(self.flavors.len());
        for &flavor in &self.flavors {
            let decls = post_process(prepared.emit(flavor)?, formatter.as_ref());
            let written = writer.write(&decls).map_err(|source| GenerateError::Write {
                path: writer.declaration_path(&decls),
                source,
            })?;
            info!(
                flavor = %flavor,
                path = %written.gen_path.display(),
                warnings = decls.warnings.len(),
                "wrote declarations"
            );
            files.push(GeneratedFile {
                flavor,
                path: written.gen_path,
                modules: decls.modules.len(),
                warnings: decls.warnings,
                augment_created: written.augment_created,
            });
        }

        let checked = self.check && self.run_check(&files)?;

        Ok(GenerateReport {
            library: library.name.clone(),
            transform: prepared.ast.report,
            collisions,
            files,
            checked,
        })
    }

    /// Check every written file together with the dependency declarations of
    /// the same flavor. Returns `false` when no compiler is configured.
    fn run_check(&self, files: &[GeneratedFile]) -> Result<bool, GenerateError> {
        let Some(compiler) = self.config.check.compiler() else {
            return Ok(false);
        };
        for file in files {
            let mut inputs: Vec<PathBuf> = self
                .config
                .dependency
                .iter()
                .filter_map(|dep| match file.flavor {
                    Flavor::Modules => dep.declarations.as_deref(),
                    Flavor::Globals => dep.globals_declarations.as_deref(),
                })
                .map(|path| self.config.resolve(path))
                .collect();
            inputs.push(file.path.clone());
            compiler.run(&inputs)?;
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::parse_root;
    use std::fs;
    use tempfile::tempdir;

    const CORE: &str = r#"{
        "kind": "Root",
        "topLevelNamespace": {
            "kind": "Namespace",
            "namespaces": [{
                "kind": "Namespace",
                "name": "sap",
                "namespaces": [{
                    "kind": "Namespace",
                    "name": "ui",
                    "namespaces": [{
                        "kind": "Namespace",
                        "name": "core",
                        "classes": [{"kind": "Class", "name": "Control"}]
                    }]
                }]
            }]
        }
    }"#;

    const MOBILE: &str = r#"{
        "kind": "Root",
        "topLevelNamespace": {
            "kind": "Namespace",
            "namespaces": [{
                "kind": "Namespace",
                "name": "sap",
                "namespaces": [{
                    "kind": "Namespace",
                    "name": "m",
                    "classes": [{
                        "kind": "Class",
                        "name": "Button",
                        "extends": "sap.ui.core.Control"
                    }]
                }]
            }]
        }
    }"#;

    #[test]
    fn dependency_symbols_resolve_in_primary_output() {
        let primary = Library::new("sap.m", parse_root(MOBILE).unwrap(), Directives::default());
        let core = Library::new(
            "sap.ui.core",
            parse_root(CORE).unwrap(),
            Directives::default(),
        );
        let prepared = prepare(primary, vec![core], true).unwrap();
        assert!(prepared.symbols.contains("sap.ui.core.Control"));
        assert!(prepared.symbols.collisions().is_empty());

        let globals = prepared.emit(Flavor::Globals).unwrap();
        assert!(globals.text.contains("extends sap.ui.core.Control"));
        let modules = prepared.emit(Flavor::Modules).unwrap();
        assert!(modules
            .text
            .contains("import { Control } from \"sap/ui/core\";"));
    }

    #[test]
    fn generator_writes_configured_flavors() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("sap.m.api.json"), MOBILE).unwrap();
        fs::write(dir.path().join("sap.ui.core.api.json"), CORE).unwrap();
        fs::write(
            dir.path().join("sap.m.dtsgenrc"),
            r#"{"badSymbols": ["sap.m.Nothing"]}"#,
        )
        .unwrap();
        let config = GeneratorConfig::parse(
            r#"
[library]
name = "sap.m"
api = "sap.m.api.json"
directives = ["sap.m.dtsgenrc"]

[[dependency]]
name = "sap.ui.core"
api = "sap.ui.core.api.json"

[output]
flavors = ["globals"]

[check]
enabled = true
command = "dtsgen-no-such-compiler"
"#,
        )
        .unwrap();
        let config = GeneratorConfig {
            base_dir: dir.path().to_path_buf(),
            ..config
        };

        let report = Generator::new(config).without_check().run().unwrap();
        assert_eq!(report.library, "sap.m");
        assert!(!report.checked);
        assert_eq!(report.files.len(), 1);
        let file = &report.files[0];
        assert_eq!(file.path, dir.path().join("out/sap.m.globals.d.ts"));
        assert!(file.augment_created);
        let text = fs::read_to_string(&file.path).unwrap();
        assert!(text.starts_with("// Generated declarations for sap.m (globals)"));
        assert!(text.contains("class Button extends sap.ui.core.Control"));
        assert!(dir.path().join("out/sap.m.augment.d.ts").exists());
    }

    #[test]
    fn missing_library_section_is_an_error() {
        let generator = Generator::new(GeneratorConfig::default());
        assert!(matches!(generator.run(), Err(GenerateError::NoLibrary)));
    }

    #[test]
    fn unreadable_api_is_reported() {
        let dir = tempdir().unwrap();
        let config = GeneratorConfig {
            base_dir: dir.path().to_path_buf(),
            ..GeneratorConfig::parse("[library]\nname = \"a\"\napi = \"missing.json\"\n").unwrap()
        };
        assert!(matches!(
            Generator::new(config).run(),
            Err(GenerateError::Ast(crate::error::AstError::Io { .. }))
        ));
    }
}
