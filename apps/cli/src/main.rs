//! Type Crafter command line
//!
//! `type-crafter generate <language> <input> <output> [typesWriterMode] [groupedTypesWriterMode]`

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crafter_codegen::config::{presets, GroupedTypesWriterMode, TypesWriterMode, WriterMode};
use crafter_codegen::{Configuration, Error, ErrorKind};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[clap(
    name = "type-crafter",
    version,
    about = "Generate source types from a YAML type specification"
)]
struct Cli {
    /// Log resolution details
    #[clap(short, long, global = true)]
    verbose: bool,

    /// Only log warnings and errors
    #[clap(long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate types for a target language
    Generate(GenerateArgs),
}

#[derive(clap::Args, Debug)]
struct GenerateArgs {
    /// Target language (typescript, typescript-with-decoders)
    language: String,

    /// Spec file to read
    input: PathBuf,

    /// Directory to write into
    output: PathBuf,

    /// SingleFile | Files
    types_writer_mode: Option<String>,

    /// SingleFile | FolderWithFiles
    grouped_types_writer_mode: Option<String>,

    /// Use a custom configuration file instead of a bundled language preset
    #[clap(long)]
    config: Option<PathBuf>,

    /// Keep existing files in the output directory
    #[clap(long)]
    no_clean: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => report(&err),
    }
}

fn init_tracing(verbose: bool, quiet: bool) {
    let default_level = if verbose {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Generate(args) => generate(&args),
    }
}

fn generate(args: &GenerateArgs) -> Result<()> {
    let config = build_configuration(args)?;

    let summary = crafter_codegen::generate_to_disk(&config)
        .with_context(|| format!("generating types from {}", config.input.display()))?;

    tracing::info!(
        types = summary.types,
        groups = summary.groups,
        files = summary.files.len(),
        output = %config.output.directory.display(),
        "Done & Dusted!"
    );
    Ok(())
}

fn build_configuration(args: &GenerateArgs) -> Result<Configuration> {
    let types_mode = args
        .types_writer_mode
        .as_deref()
        .map(str::parse::<TypesWriterMode>)
        .transpose()?;
    let grouped_types_mode = args
        .grouped_types_writer_mode
        .as_deref()
        .map(str::parse::<GroupedTypesWriterMode>)
        .transpose()?;

    let mut config = match &args.config {
        Some(path) => {
            tracing::debug!(
                config = %path.display(),
                language = %args.language,
                "Using configuration file instead of language preset"
            );
            Configuration::from_file(path)
                .with_context(|| format!("loading configuration {}", path.display()))?
        }
        None => presets::for_language(
            &args.language,
            &args.input,
            &args.output,
            WriterMode::default(),
        )?,
    };

    config.input = args.input.clone();
    config.output.directory = args.output.clone();
    if let Some(mode) = types_mode {
        config.output.writer_mode.types = mode;
    }
    if let Some(mode) = grouped_types_mode {
        config.output.writer_mode.grouped_types = mode;
    }
    if args.no_clean {
        config.output.clean_write = false;
    }

    Ok(config)
}

fn report(err: &anyhow::Error) -> ExitCode {
    let (header, code) = classify(err);
    tracing::error!("{header}: {err:#}");
    ExitCode::from(code)
}

/// Message header and exit code for a failure.
fn classify(err: &anyhow::Error) -> (&'static str, u8) {
    let kind = err
        .chain()
        .find_map(|cause| cause.downcast_ref::<Error>())
        .map(Error::kind);

    match kind {
        Some(ErrorKind::InvalidSpec) => ("Invalid spec file", 1),
        Some(ErrorKind::Unsupported) => ("Unsupported feature", 1),
        Some(ErrorKind::Runtime) | None => ("Runtime error", 1),
        Some(ErrorKind::Usage) => ("Invalid usage", 2),
        Some(ErrorKind::Io) => ("File system error", 3),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn generate_args(argv: &[&str]) -> GenerateArgs {
        let cli = Cli::try_parse_from(argv).unwrap();
        match cli.command {
            Command::Generate(args) => args,
        }
    }

    #[test]
    fn test_preset_with_writer_modes() {
        let args = generate_args(&[
            "type-crafter",
            "generate",
            "typescript",
            "spec.yaml",
            "out",
            "Files",
            "FolderWithFiles",
            "--no-clean",
        ]);
        let config = build_configuration(&args).unwrap();

        assert_eq!(config.output.writer_mode.types, TypesWriterMode::Files);
        assert_eq!(
            config.output.writer_mode.grouped_types,
            GroupedTypesWriterMode::FolderWithFiles
        );
        assert!(!config.output.clean_write);
        assert_eq!(config.output.directory, PathBuf::from("out"));
    }

    #[test]
    fn test_invalid_writer_mode_is_usage_error() {
        let args = generate_args(&["type-crafter", "generate", "typescript", "a.yaml", "out", "Folders"]);
        let err = build_configuration(&args).unwrap_err();
        assert_eq!(classify(&err), ("Invalid usage", 2));
        assert!(err.to_string().contains("Types writer mode"));
    }

    #[test]
    fn test_classify_through_context() {
        let err = anyhow::Error::new(Error::unsupported("URL references"))
            .context("generating types from spec.yaml");
        assert_eq!(classify(&err), ("Unsupported feature", 1));

        let err = anyhow::anyhow!("something else");
        assert_eq!(classify(&err), ("Runtime error", 1));
    }

    #[test]
    fn test_unknown_language() {
        let args = generate_args(&["type-crafter", "generate", "kotlin", "a.yaml", "out"]);
        let err = build_configuration(&args).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::LanguageNotSupported(_))
        ));
    }

    #[test]
    fn test_config_file_overrides_paths() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
input: ignored.yaml
output:
  fileExtension: .py
  directory: ignored
  writerMode: {{ types: Files }}
template:
  objectSyntax: "class {{{{ typeName }}}}: ..."
  exporterModuleSyntax: ""
  typesFileSyntax: "{{{{ typesContent }}}}"
language:
  exporterModuleName: __init__
  typeMapper:
    string: str
    array: "list[~ItemType~]"
"#
        )
        .unwrap();

        let path = file.path().to_string_lossy().into_owned();
        let args = generate_args(&[
            "type-crafter",
            "generate",
            "python",
            "spec.yaml",
            "gen",
            "--config",
            &path,
        ]);
        let config = build_configuration(&args).unwrap();

        assert_eq!(config.input, PathBuf::from("spec.yaml"));
        assert_eq!(config.output.directory, PathBuf::from("gen"));
        assert_eq!(config.output.file_extension, ".py");
        assert_eq!(config.output.writer_mode.types, TypesWriterMode::Files);
        assert!(config.output.clean_write);
        assert_eq!(config.language.exporter_module_name, "__init__");
    }
}
