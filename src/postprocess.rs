//! Textual patches and the formatter boundary.
//!
//! Patches run in two stages around the external formatter. A formatter
//! failure never aborts generation: the unformatted text is kept and the
//! failure is logged.

use std::io::Write;
use std::process::{Command, Stdio};
use std::thread;

use tracing::{debug, error};

use crate::emit::{Declarations, Flavor};
use crate::error::FormatError;
use crate::transform::library_fixes::CORE_LIBRARY;

/// Pretty-prints declaration text.
pub trait Formatter {
    fn format(&self, text: &str) -> Result<String, FormatError>;
}

/// Leaves the text as emitted.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFormatter;

impl Formatter for NoFormatter {
    fn format(&self, text: &str) -> Result<String, FormatError> {
        Ok(text.to_string())
    }
}

/// Pipes the text through an external program on stdin/stdout.
#[derive(Debug, Clone)]
pub struct CommandFormatter {
    program: String,
    args: Vec<String>,
}

impl CommandFormatter {
    /// Returns `None` for an empty command line.
    pub fn new(command: &[String]) -> Option<Self> {
        let (program, args) = command.split_first()?;
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl Formatter for CommandFormatter {
    fn format(&self, text: &str) -> Result<String, FormatError> {
        let spawn_error = |source| FormatError::Spawn {
            program: self.program.clone(),
            source,
        };

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(spawn_error)?;

        // Write on a separate thread so a formatter that streams output
        // while reading cannot deadlock on a full pipe.
        let writer = child.stdin.take().map(|mut stdin| {
            let input = text.to_string();
            thread::spawn(move || stdin.write_all(input.as_bytes()))
        });

        let output = child.wait_with_output().map_err(spawn_error)?;
        let written = writer.map(|w| w.join());

        if !output.status.success() {
            return Err(FormatError::Failed {
                program: self.program.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        if let Some(Ok(Err(e))) = written {
            return Err(spawn_error(e));
        }
        Ok(String::from_utf8(output.stdout)?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    BeforeFormat,
    AfterFormat,
}

pub struct Patch {
    pub name: &'static str,
    pub stage: Stage,
    pub applies_to: fn(&str, Flavor) -> bool,
    /// Receives the library name, the current text and the flavor.
    pub apply: fn(&str, &str, Flavor) -> String,
}

static PATCHES: &[Patch] = &[
    Patch {
        name: "core-preamble",
        stage: Stage::BeforeFormat,
        applies_to: is_core_library,
        apply: inject_core_preamble,
    },
    Patch {
        name: "export-namespace",
        stage: Stage::BeforeFormat,
        applies_to: is_globals,
        apply: rename_export_namespace,
    },
    Patch {
        name: "generated-header",
        stage: Stage::AfterFormat,
        applies_to: every_library,
        apply: prepend_header,
    },
];

/// All registered patches, in application order within each stage.
pub fn registry() -> &'static [Patch] {
    PATCHES
}

const CORE_PREAMBLE: &str = include_str!("preamble/core.d.ts");

/// Library whose last namespace segment is a reserved word.
const EXPORT_LIBRARY: &str = "sap.ui.export";

/// CYRILLIC SMALL LETTER IE, rendered the same as `e`.
const LOOKALIKE_E: char = '\u{0435}';

fn every_library(_library: &str, _flavor: Flavor) -> bool {
    true
}

fn is_core_library(library: &str, _flavor: Flavor) -> bool {
    library == CORE_LIBRARY
}

fn is_globals(_library: &str, flavor: Flavor) -> bool {
    flavor == Flavor::Globals
}

fn inject_core_preamble(_library: &str, text: &str, flavor: Flavor) -> String {
    let preamble = match flavor {
        Flavor::Modules => CORE_PREAMBLE.to_string(),
        Flavor::Globals => CORE_PREAMBLE.replace(
            "declare module \"sap/ui/core/loader\" {",
            "declare namespace sap.ui.core.loader {",
        ),
    };
    format!("{preamble}\n{text}")
}

/// Renames the declaration in the library's own output and every dotted
/// reference to it, including those from dependent libraries.
fn rename_export_namespace(_library: &str, text: &str, _flavor: Flavor) -> String {
    let lookalike = format!("{LOOKALIKE_E}xport");
    let renamed = EXPORT_LIBRARY.replace("export", &lookalike);
    text.replace("namespace export ", &format!("namespace {lookalike} "))
        .replace(&format!("{EXPORT_LIBRARY}."), &format!("{renamed}."))
}

fn prepend_header(library: &str, text: &str, flavor: Flavor) -> String {
    format!(
        "// Generated declarations for {library} ({flavor}). Do not edit.\n\
         // Hand-written additions belong in {library}.augment.d.ts.\n\n{text}"
    )
}

fn apply_stage(decls: &mut Declarations, stage: Stage) {
    for patch in registry()
        .iter()
        .filter(|p| p.stage == stage && (p.applies_to)(&decls.library, decls.flavor))
    {
        decls.text = (patch.apply)(&decls.library, &decls.text, decls.flavor);
        debug!(
            library = %decls.library,
            flavor = %decls.flavor,
            patch = patch.name,
            "applied patch"
        );
    }
}

/// Patch and format one library's declarations.
pub fn post_process(mut decls: Declarations, formatter: &dyn Formatter) -> Declarations {
    apply_stage(&mut decls, Stage::BeforeFormat);
    match formatter.format(&decls.text) {
        Ok(formatted) => decls.text = formatted,
        Err(e) => error!(
            library = %decls.library,
            flavor = %decls.flavor,
            "formatting failed, keeping unformatted output: {e}"
        ),
    }
    apply_stage(&mut decls, Stage::AfterFormat);
    decls
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Broken;

    impl Formatter for Broken {
        fn format(&self, _text: &str) -> Result<String, FormatError> {
            Err(FormatError::Spawn {
                program: "broken".to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
            })
        }
    }

    struct Upper;

    impl Formatter for Upper {
        fn format(&self, text: &str) -> Result<String, FormatError> {
            Ok(text.to_uppercase())
        }
    }

    fn decls(library: &str, flavor: Flavor, text: &str) -> Declarations {
        Declarations {
            library: library.to_string(),
            flavor,
            text: text.to_string(),
            modules: Vec::new(),
            warnings: Vec::new(),
        }
    }

    #[test]
    fn formatter_failure_keeps_raw_text() {
        let out = post_process(decls("sap.m", Flavor::Modules, "let  x ;\n"), &Broken);
        assert!(out.text.ends_with("let  x ;\n"));
        assert!(out.text.starts_with("// Generated declarations for sap.m (modules)"));
    }

    #[test]
    fn header_is_added_after_formatting() {
        let out = post_process(decls("sap.m", Flavor::Globals, "declare x;\n"), &Upper);
        assert!(out.text.starts_with("// Generated declarations for sap.m (globals)"));
        assert!(out.text.contains("sap.m.augment.d.ts"));
        assert!(out.text.ends_with("DECLARE X;\n"));
    }

    #[test]
    fn core_preamble_is_injected_per_flavor() {
        let modules = post_process(decls(CORE_LIBRARY, Flavor::Modules, ""), &NoFormatter);
        assert!(modules.text.contains("declare module \"sap/ui/core/loader\" {"));
        assert!(modules.text.contains("interface IUI5DefineDependencyNames {}"));

        let globals = post_process(decls(CORE_LIBRARY, Flavor::Globals, ""), &NoFormatter);
        assert!(globals.text.contains("declare namespace sap.ui.core.loader {"));
        assert!(!globals.text.contains("declare module"));

        let other = post_process(decls("sap.m", Flavor::Modules, ""), &NoFormatter);
        assert!(!other.text.contains("IUI5DefineDependencyNames"));
    }

    #[test]
    fn export_namespace_uses_lookalike_letter() {
        let text = "export namespace export {\n    let a: sap.ui.export.Spreadsheet;\n}\n";
        let out = post_process(decls(EXPORT_LIBRARY, Flavor::Globals, text), &NoFormatter);
        assert!(out.text.contains("namespace \u{0435}xport {"));
        assert!(out.text.contains("sap.ui.\u{0435}xport.Spreadsheet"));
        assert!(out.text.contains("export namespace"));

        let modules = post_process(decls(EXPORT_LIBRARY, Flavor::Modules, text), &NoFormatter);
        assert!(modules.text.contains("namespace export {"));
    }

    #[test]
    fn references_to_export_namespace_are_renamed_in_dependents() {
        let text = "class Table {\n    toSheet(): sap.ui.export.Spreadsheet;\n}\n";
        let globals = post_process(decls("sap.m", Flavor::Globals, text), &NoFormatter);
        assert!(globals.text.contains("toSheet(): sap.ui.\u{0435}xport.Spreadsheet;"));
        assert!(!globals.text.contains("sap.ui.export."));

        let modules = post_process(decls("sap.m", Flavor::Modules, text), &NoFormatter);
        assert!(modules.text.contains("sap.ui.export.Spreadsheet"));
    }

    #[test]
    fn empty_command_has_no_formatter() {
        assert!(CommandFormatter::new(&[]).is_none());
    }

    #[test]
    fn missing_program_is_a_spawn_error() {
        let formatter =
            CommandFormatter::new(&["dtsgen-no-such-formatter".to_string()]).unwrap();
        assert!(matches!(
            formatter.format("x"),
            Err(FormatError::Spawn { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn pipes_text_through_command() {
        let formatter = CommandFormatter::new(&["cat".to_string()]).unwrap();
        let text = "declare const a: number;\n";
        assert_eq!(formatter.format(text).unwrap(), text);
    }

    #[cfg(unix)]
    #[test]
    fn failing_command_is_reported() {
        let formatter = CommandFormatter::new(&["false".to_string()]).unwrap();
        assert!(matches!(
            formatter.format("x"),
            Err(FormatError::Failed { .. })
        ));
    }
}
