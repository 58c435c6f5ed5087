//! flatconf CLI - inspect flattened configuration files
//!
//! Usage:
//!   flatconf get application.yaml server.port
//!   flatconf values application.yaml servers --format json
//!   flatconf keys application.yaml database
//!   flatconf dump application.yaml
//!   flatconf check application.yaml other.yml

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use flatconf_core::{Configuration, Error, LoadOptions};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// flatconf - Flattened configuration with environment interpolation
#[derive(Parser)]
#[command(name = "flatconf")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Get the value stored at a path
    Get {
        /// Configuration file
        file: PathBuf,

        /// Path to the value, with or without the root (e.g., server.port)
        path: String,

        /// Printed instead when the path is not found
        #[arg(short, long)]
        default: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },

    /// List the elements of a sequence
    Values {
        /// Configuration file
        file: PathBuf,

        /// Path to the sequence
        path: String,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },

    /// List the paths directly below a path, or every path
    Keys {
        /// Configuration file
        file: PathBuf,

        /// Parent path; all keys are listed when omitted
        path: Option<String>,
    },

    /// Print the whole flattened configuration
    Dump {
        /// Configuration file
        file: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },

    /// Check that configuration files load
    Check {
        /// Configuration file(s) to check
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

/// Why a command did not succeed
#[derive(Debug)]
enum Failure {
    /// The file could not be loaded
    Load(PathBuf, Error),
    /// The file loaded but the lookup failed
    Lookup(Error),
    /// At least one checked file failed to load
    Invalid,
}

impl Failure {
    fn exit_code(&self) -> ExitCode {
        match self {
            Failure::Load(..) => ExitCode::from(2),
            Failure::Lookup(_) | Failure::Invalid => ExitCode::from(1),
        }
    }

    fn report(&self) {
        match self {
            Failure::Load(file, e) => {
                eprintln!("{} {}\n", "Failed to load".red(), file.display());
                eprintln!("{}", e);
            }
            Failure::Lookup(e) => eprintln!("{}: {}", "Error".red(), e),
            Failure::Invalid => {}
        }
    }
}

/// Run the CLI with the process arguments
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Get {
            file,
            path,
            default,
            format,
        } => cmd_get(&file, &path, default, format),
        Commands::Values { file, path, format } => cmd_values(&file, &path, format),
        Commands::Keys { file, path } => cmd_keys(&file, path.as_deref()),
        Commands::Dump { file, format } => cmd_dump(&file, format),
        Commands::Check { files } => cmd_check(&files),
    };

    match result {
        Ok(output) => {
            if !output.is_empty() {
                println!("{}", output);
            }
            ExitCode::SUCCESS
        }
        Err(failure) => {
            failure.report();
            failure.exit_code()
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    // A logger may already be installed when embedded
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .try_init();
}

fn load_config(file: &Path) -> Result<Configuration, Failure> {
    Configuration::load(&LoadOptions::new().with_file_path(file))
        .map_err(|e| Failure::Load(file.to_path_buf(), e))
}

fn cmd_get(
    file: &Path,
    path: &str,
    default: Option<String>,
    format: Format,
) -> Result<String, Failure> {
    let config = load_config(file)?;

    let value = match config.value(path) {
        Ok(value) => value,
        Err(e) => match default {
            Some(default) => {
                log::debug!("{} not found, using the default", path);
                default
            }
            None => return Err(Failure::Lookup(e)),
        },
    };

    Ok(match format {
        Format::Json => serde_json::Value::String(value).to_string(),
        Format::Text => value,
    })
}

fn cmd_values(file: &Path, path: &str, format: Format) -> Result<String, Failure> {
    let config = load_config(file)?;
    let values = config.values(path).map_err(Failure::Lookup)?;

    Ok(match format {
        Format::Json => format!("{:#}", serde_json::json!(values)),
        Format::Text => values.join("\n"),
    })
}

fn cmd_keys(file: &Path, path: Option<&str>) -> Result<String, Failure> {
    let config = load_config(file)?;

    let keys: Vec<String> = match path {
        Some(path) => config
            .sub(path)
            .map_err(Failure::Lookup)?
            .iter()
            .map(ToString::to_string)
            .collect(),
        None => config.snapshot().keys().map(ToString::to_string).collect(),
    };
    Ok(keys.join("\n"))
}

fn cmd_dump(file: &Path, format: Format) -> Result<String, Failure> {
    let config = load_config(file)?;

    Ok(match format {
        Format::Json => config.to_debug_string(),
        Format::Text => config
            .snapshot()
            .iter()
            .map(|(path, value)| format!("{} = {}", path, value))
            .collect::<Vec<_>>()
            .join("\n"),
    })
}

fn cmd_check(files: &[PathBuf]) -> Result<String, Failure> {
    let mut all_valid = true;

    for file in files {
        match load_config(file) {
            Ok(config) => {
                println!(
                    "{} {}: valid (root '{}', {} entries)",
                    "✓".green(),
                    file.display(),
                    config.root(),
                    config.size()
                );
            }
            Err(Failure::Load(_, e)) => {
                eprintln!("{} {}: {}", "✗".red(), file.display(), e.kind);
                all_valid = false;
            }
            Err(other) => return Err(other),
        }
    }

    if all_valid {
        Ok(String::new())
    } else {
        Err(Failure::Invalid)
    }
}
