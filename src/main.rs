use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use thiserror::Error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use zsh2xonsh::{parse, translate_to_xonsh, ConfigError, Settings, TranslationError};

#[derive(Parser)]
#[command(name = "zsh2xonsh")]
#[command(about = "Translate a strict subset of zsh into xonsh")]
#[command(version)]
struct Cli {
    /// Translate this command string instead of a file
    #[arg(short = 'c', long = "cmd", conflicts_with = "input_file", required_unless_present = "input_file")]
    cmd: Option<String>,

    /// Extra builtin the generated code may call directly (repeatable)
    #[arg(short = 'b', long = "builtin")]
    builtins: Vec<String>,

    /// Only parse the input; print nothing on success
    #[arg(long = "validate")]
    validate: bool,

    /// Route every export through type-preserving assignment
    #[arg(long = "strict")]
    strict: bool,

    /// Treat this variable as a path list (repeatable)
    #[arg(long = "path-var")]
    path_vars: Vec<String>,

    /// TOML settings file
    #[arg(long = "config")]
    config: Option<PathBuf>,

    /// Emit a bootstrap that creates `ctx` instead of assuming it exists
    #[arg(long = "emit-preamble")]
    emit_preamble: bool,

    /// zsh file to translate
    #[arg()]
    input_file: Option<PathBuf>,
}

#[derive(Error, Debug)]
enum CliError {
    #[error("Cannot read input file {}: {source}", .path.display())]
    Input {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Translation(#[from] TranslationError),
}

fn main() -> ExitCode {
    // Logs go to stderr so they never mix with emitted code
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(Some(output)) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Ok(None) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn settings(cli: &Cli) -> Result<Settings, CliError> {
    let mut settings = match &cli.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    if cli.strict {
        settings.strict_env_types = true;
    }
    if cli.emit_preamble {
        settings.emit_preamble = true;
    }
    settings.other_path_like_vars.extend(cli.path_vars.iter().cloned());
    Ok(settings)
}

fn run(cli: &Cli) -> Result<Option<String>, CliError> {
    let source = match (&cli.cmd, &cli.input_file) {
        (Some(cmd), _) => cmd.clone(),
        (None, Some(path)) => std::fs::read_to_string(path).map_err(|source| CliError::Input {
            path: path.clone(),
            source,
        })?,
        // clap enforces one of the two
        (None, None) => String::new(),
    };
    let settings = settings(cli)?;

    if cli.validate {
        parse(&source, &cli.builtins)?;
        return Ok(None);
    }
    Ok(Some(translate_to_xonsh(&source, &settings, &cli.builtins)?))
}
