//! Command-line front end for the declaration generator.
//!
//! Set `DTSGEN_LOG` to control log output, e.g. `DTSGEN_LOG=dtsgen=debug`.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use dtsgen::config::{LibraryConfig, CONFIG_FILE};
use dtsgen::symbols::SymbolTable;
use dtsgen::{ast, Flavor, GenerateReport, Generator, GeneratorConfig};

#[derive(Parser, Debug)]
#[command(
    name = "dtsgen",
    version,
    about = "Generate TypeScript declarations from library API descriptions"
)]
struct Cli {
    /// Enable verbose debug logging (overrides DTSGEN_LOG)
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate declaration files for the configured library
    Generate {
        /// Config file (default: dtsgen.toml in the current directory, if present)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// API description of the library, instead of the config's [library]
        #[arg(long, requires = "library")]
        api: Option<PathBuf>,
        /// Library name, used with --api
        #[arg(long)]
        library: Option<String>,
        /// Directive files, used with --api
        #[arg(long = "directives")]
        directives: Vec<PathBuf>,
        /// Only emit this flavor
        #[arg(long, value_enum)]
        flavor: Option<FlavorArg>,
        /// Output directory (overrides the config)
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Skip the compiler check
        #[arg(long)]
        no_check: bool,
    },
    /// Print the symbol table of an API description
    Symbols {
        /// API description file
        api: PathBuf,
        /// Library name recorded on each symbol
        #[arg(long, default_value = "library")]
        library: String,
    },
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum FlavorArg {
    Modules,
    Globals,
}

impl From<FlavorArg> for Flavor {
    fn from(arg: FlavorArg) -> Self {
        match arg {
            FlavorArg::Modules => Flavor::Modules,
            FlavorArg::Globals => Flavor::Globals,
        }
    }
}

fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("DTSGEN_LOG").unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(atty::is(atty::Stream::Stderr))
                .with_target(false),
        )
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let result = match cli.command {
        Command::Generate {
            config,
            api,
            library,
            directives,
            flavor,
            out,
            no_check,
        } => run_generate(
            config.as_deref(),
            api.zip(library),
            directives,
            flavor,
            out,
            no_check,
        ),
        Command::Symbols { api, library } => run_symbols(&api, &library),
    };

    if let Err(err) = result {
        let _ = status(Color::Red, "error", &format!("{err:#}"));
        std::process::exit(1);
    }
}

fn run_generate(
    config_path: Option<&Path>,
    api: Option<(PathBuf, String)>,
    directives: Vec<PathBuf>,
    flavor: Option<FlavorArg>,
    out: Option<PathBuf>,
    no_check: bool,
) -> Result<()> {
    // An explicit config must exist; the default one is optional.
    let mut config = match config_path {
        Some(path) => GeneratorConfig::load(path)?,
        None => {
            let cwd = std::env::current_dir().context("failed to read current directory")?;
            GeneratorConfig::discover(&cwd)?.unwrap_or_default()
        }
    };

    if let Some((api, name)) = api {
        let cwd = std::env::current_dir().context("failed to read current directory")?;
        config.library = Some(LibraryConfig {
            name,
            api: absolute(&cwd, &api),
            directives: directives.iter().map(|d| absolute(&cwd, d)).collect(),
        });
    }
    if let Some(out) = out {
        let cwd = std::env::current_dir().context("failed to read current directory")?;
        config.output.dir = Some(absolute(&cwd, &out));
    }
    if config.library.is_none() {
        bail!("no library configured; pass --api and --library or create {CONFIG_FILE}");
    }

    let mut generator = Generator::new(config);
    if let Some(flavor) = flavor {
        generator = generator.with_flavors(vec![flavor.into()]);
    }
    if no_check {
        generator = generator.without_check();
    }

    let report = generator.run()?;
    print_report(&report)?;
    Ok(())
}

fn absolute(cwd: &Path, path: &Path) -> String {
    cwd.join(path).to_string_lossy().into_owned()
}

fn print_report(report: &GenerateReport) -> Result<()> {
    for file in &report.files {
        status(
            Color::Green,
            "Generated",
            &format!(
                "{} ({}, {} modules, {} warnings)",
                file.path.display(),
                file.flavor,
                file.modules,
                file.warnings.len()
            ),
        )?;
        if file.augment_created {
            status(Color::Cyan, "Created", "augmentation stub")?;
        }
    }
    if report.collisions > 0 {
        status(
            Color::Yellow,
            "Warning",
            &format!("{} duplicate symbol definition(s)", report.collisions),
        )?;
    }
    if report.checked {
        status(Color::Green, "Checked", "compiler accepted the declarations")?;
    }
    Ok(())
}

fn run_symbols(api: &Path, library: &str) -> Result<()> {
    let root = ast::load_root(api)?;
    let table = SymbolTable::build(library, &root);

    let mut stdout = std::io::stdout().lock();
    for symbol in table.iter() {
        let fqn = if symbol.fqn.is_empty() {
            "<top-level>"
        } else {
            symbol.fqn.as_str()
        };
        writeln!(stdout, "{:<10} {fqn}", format!("{:?}", symbol.kind))?;
    }
    for collision in table.collisions() {
        status(
            Color::Yellow,
            "Collision",
            &format!(
                "{} defined as {:?}, also as {:?}",
                collision.fqn, collision.kept, collision.dropped
            ),
        )?;
    }
    Ok(())
}

/// Print a status line to stderr, coloring the label when stderr is a
/// terminal.
fn status(color: Color, label: &str, message: &str) -> std::io::Result<()> {
    let choice = if atty::is(atty::Stream::Stderr) {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    let mut stderr = StandardStream::stderr(choice);
    stderr.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
    write!(stderr, "{label:>12}")?;
    stderr.reset()?;
    writeln!(stderr, " {message}")
}
