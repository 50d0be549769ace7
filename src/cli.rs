//! CLI surface (§2.1): a `clap`-derived parser with one subcommand per verb,
//! `main.rs` handing off to [`run`] after setting up logging.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use crate::config::{BuildType, Environment, GeneratorConfig, ProjectConfigFile};
use crate::diagnostics::DiagnosticCollection;
use crate::gir::loader;
use crate::inheritance_index::{self, InheritanceIndex};
use crate::namespace_emitter;
use crate::symbol_table::{self, SymbolTable};
use crate::template;

#[derive(Parser)]
#[command(name = "gir2ts")]
#[command(about = "Translates GObject Introspection Repository documents into declaration files", version, author)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate declaration files and runtime stubs for one or more GIR documents
    Generate(Box<GenerateArgs>),
}

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    /// GIR files to translate; directories are scanned (non-recursively) for `*.gir` files
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Target runtime: gjs or node (selects the primitive-type and signal-helper templates)
    #[arg(long, value_enum)]
    pub environment: Option<Environment>,

    /// Output mode: types (ambient `declare namespace` wrapper) or lib (plain modules)
    #[arg(long = "build-type", value_enum)]
    pub build_type: Option<BuildType>,

    /// Switch classes to the interface-plus-constructor decomposition
    #[arg(long)]
    pub inheritance: bool,

    /// Output directory for generated files
    #[arg(long, default_value = ".")]
    pub outdir: PathBuf,

    /// Additional search paths for `<include>` dependency resolution (repeatable)
    #[arg(long = "gir-directories", value_name = "DIR")]
    pub gir_directories: Vec<PathBuf>,

    /// Optional `gir2ts.toml` project config; explicit CLI flags override its values
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Print every recorded diagnostic, not just the end-of-run summary count
    #[arg(short, long)]
    pub verbose: bool,

    /// Write the run's diagnostics to this path as JSON instead of (or in
    /// addition to) the `log`-based warning stream
    #[arg(long = "report")]
    pub report: Option<PathBuf>,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Generate(args) => generate(*args),
    }
}

/// Scans `inputs` into a flat list of `.gir` file paths, expanding
/// directories (non-recursively, matching `girDirectories`' own shallow
/// lookup in `gir::loader`) into the `*.gir` files they directly contain.
fn collect_entry_paths(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let read = std::fs::read_dir(input)
                .with_context(|| format!("failed to read directory {}", input.display()))?;
            for entry in read {
                let entry = entry?;
                let path = entry.path();
                if path.extension().and_then(|e| e.to_str()) == Some("gir") {
                    out.push(path);
                }
            }
        } else {
            out.push(input.clone());
        }
    }
    out.sort();
    Ok(out)
}

/// Looks for a per-module template-override file (§4.7) named
/// `<Namespace>-<version>.template.ts` on the configured search path.
fn read_template_override(config: &GeneratorConfig, module: &crate::model::Module) -> Option<String> {
    let filename = format!("{}-{}.template.ts", module.namespace, module.version);
    config
        .gir_directories
        .iter()
        .chain(std::iter::once(&config.outdir))
        .find_map(|dir| std::fs::read_to_string(dir.join(&filename)).ok())
}

fn resolve_config(args: &GenerateArgs) -> Result<GeneratorConfig> {
    let mut config = GeneratorConfig::default();

    if let Some(cfg_path) = &args.config {
        let file = ProjectConfigFile::load(cfg_path)
            .with_context(|| format!("failed to read config file {}", cfg_path.display()))?;
        file.apply_defaults(&mut config);
    }

    if let Some(environment) = args.environment {
        config.environment = environment;
    }
    if let Some(build_type) = args.build_type {
        config.build_type = build_type;
    }
    if args.inheritance {
        config.inheritance = true;
    }
    if !args.gir_directories.is_empty() {
        config.gir_directories = args.gir_directories.clone();
    }
    config.outdir = args.outdir.clone();
    config.verbose = args.verbose;

    Ok(config)
}

fn generate(args: GenerateArgs) -> Result<()> {
    let config = resolve_config(&args)?;

    let entry_paths = collect_entry_paths(&args.inputs)?;
    if entry_paths.is_empty() {
        anyhow::bail!("no .gir files found among the given inputs");
    }

    let mut search_dirs = config.gir_directories.clone();
    for path in &entry_paths {
        if let Some(parent) = path.parent() {
            if !search_dirs.iter().any(|d| d == parent) {
                search_dirs.push(parent.to_path_buf());
            }
        }
    }

    let mut diagnostics = DiagnosticCollection::new();
    let run = loader::load_run(&entry_paths, &search_dirs, &mut diagnostics);

    let mut symbols = SymbolTable::new();
    for module in &run.modules {
        symbol_table::populate_from_module(&mut symbols, module, &mut diagnostics);
    }

    let mut inheritance = InheritanceIndex::new();
    inheritance_index::populate(&mut inheritance, &symbols);

    std::fs::create_dir_all(&config.outdir)
        .with_context(|| format!("failed to create output directory {}", config.outdir.display()))?;

    let mut succeeded = 0usize;
    for entry_id in &run.entry_ids {
        let module = match run.modules.iter().find(|m| &m.id == entry_id) {
            Some(m) => m,
            None => continue,
        };

        let template_override = read_template_override(&config, module);
        let emitted = namespace_emitter::emit_module(
            module,
            &run.modules,
            &symbols,
            &inheritance,
            &mut diagnostics,
            &config,
            template_override.as_deref(),
        );

        write_output(&config.outdir, module, &emitted)?;
        succeeded += 1;
    }

    if args.verbose {
        for d in diagnostics.iter() {
            log::warn!("{d}");
        }
    }
    log::info!(
        "{} module(s) emitted, {} diagnostic(s) recorded",
        succeeded,
        diagnostics.len()
    );

    if let Some(report_path) = &args.report {
        write_report(report_path, &diagnostics)?;
    }

    if succeeded == 0 {
        anyhow::bail!("every requested module failed to load");
    }
    Ok(())
}

/// Serializes the run's diagnostics to JSON instead of only logging them.
fn write_report(path: &Path, diagnostics: &DiagnosticCollection) -> Result<()> {
    let json = serde_json::to_string_pretty(&diagnostics.diagnostics)
        .context("failed to serialize diagnostics to JSON")?;
    std::fs::write(path, json).with_context(|| format!("failed to write report to {}", path.display()))?;
    Ok(())
}

fn write_output(outdir: &Path, module: &crate::model::Module, emitted: &namespace_emitter::EmittedModule) -> Result<()> {
    let decl_path = outdir.join(format!("{}.d.ts", module.namespace));
    let stub_path = outdir.join(format!("{}.js", module.namespace));
    template::write(&decl_path, &emitted.declarations)
        .with_context(|| format!("failed to write {}", decl_path.display()))?;
    template::write(&stub_path, &emitted.runtime_stub)
        .with_context(|| format!("failed to write {}", stub_path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collect_entry_paths_scans_directories_for_gir_files() {
        let dir = std::env::temp_dir().join(format!("gir2ts-cli-test-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("Gtk-4.0.gir"), "<repository/>").unwrap();
        std::fs::write(dir.join("notes.txt"), "ignored").unwrap();

        let found = collect_entry_paths(&[dir.clone()]).unwrap();
        assert_eq!(found, vec![dir.join("Gtk-4.0.gir")]);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn collect_entry_paths_passes_through_explicit_files() {
        let found = collect_entry_paths(&[PathBuf::from("Gtk-4.0.gir")]).unwrap();
        assert_eq!(found, vec![PathBuf::from("Gtk-4.0.gir")]);
    }

    #[test]
    fn write_report_serializes_diagnostics_as_json_array() {
        use crate::diagnostics::{Diagnostic, DiagnosticCode};

        let mut diags = DiagnosticCollection::new();
        diags.add(Diagnostic::new(DiagnosticCode::UnresolvedType, "Gtk-4.0", "could not resolve 'Frobnicator'"));

        let path = std::env::temp_dir().join(format!("gir2ts-report-test-{}.json", std::process::id()));
        write_report(&path, &diags).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed[0]["code"], "UnresolvedType");
        assert_eq!(parsed[0]["module"], "Gtk-4.0");

        std::fs::remove_file(&path).unwrap();
    }
}
