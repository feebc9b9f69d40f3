use std::{
    path::{Path, PathBuf},
    process::ExitCode,
};

use clap::Parser;
use rolegate::{
    authz::{AuthzEngine, AuthzError},
    config::{ConfigError, RolegateConfig},
    models::{User, decode_key, encode_key, raw::RawUser},
    observability::{TracingError, init_tracing},
};

#[derive(Parser, Debug)]
#[command(version, about = "Scoped permission resolution engine", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Path to config file (defaults are used when omitted)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Decide whether a user may perform an action on a resource.
    ///
    /// Exits 0 when allowed and 1 when denied.
    Check {
        /// User snapshot (JSON)
        #[arg(short, long)]
        user: PathBuf,
        #[arg(short, long)]
        resource: String,
        #[arg(short, long)]
        action: String,
        /// Print which layer decided and why
        #[arg(long)]
        explain: bool,
    },
    /// Print the data access limit for a resource (0 unlimited, -1 unconfigured)
    Limit {
        /// User snapshot (JSON)
        #[arg(short, long)]
        user: PathBuf,
        #[arg(short, long)]
        resource: String,
    },
    /// Encode or decode permission keys
    Key {
        #[command(subcommand)]
        command: KeyCommand,
    },
    /// Export the JSON schema for the configuration file
    Schema {
        /// Output file path (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(clap::Subcommand, Debug)]
enum KeyCommand {
    /// Build a canonical key from a resource and an action
    Encode { resource: String, action: String },
    /// Split a canonical key into its resource and action
    Decode { key: String },
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Tracing(#[from] TracingError),

    #[error(transparent)]
    Authz(#[from] AuthzError),

    #[error("Failed to read user file {1}: {0}")]
    ReadUser(std::io::Error, PathBuf),

    #[error("Failed to parse user file {1}: {0}")]
    ParseUser(serde_json::Error, PathBuf),

    #[cfg_attr(not(feature = "json-schema"), allow(dead_code))]
    #[error("Failed to write {1}: {0}")]
    Write(std::io::Error, PathBuf),

    #[error("Schema export failed: {0}")]
    Schema(String),
}

/// Exit code for errors, distinct from a plain deny.
const EXIT_ERROR: u8 = 2;

fn main() -> ExitCode {
    let args = Args::parse();

    match run(args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(EXIT_ERROR)
        }
    }
}

fn run(args: Args) -> Result<ExitCode, CliError> {
    let config = match &args.config {
        Some(path) => RolegateConfig::from_file(path)?,
        None => RolegateConfig::default(),
    };
    init_tracing(&config.observability.logging)?;

    let engine = AuthzEngine::new(config.access.clone());

    match args.command {
        Command::Check {
            user,
            resource,
            action,
            explain,
        } => run_check(&engine, &user, &resource, &action, explain),
        Command::Limit { user, resource } => run_limit(&engine, &config, &user, &resource),
        Command::Key { command } => run_key(command),
        Command::Schema { output } => run_schema_export(output),
    }
}

fn load_user(engine: &AuthzEngine, path: &Path) -> Result<User, CliError> {
    let contents =
        std::fs::read_to_string(path).map_err(|e| CliError::ReadUser(e, path.to_path_buf()))?;
    let raw: RawUser =
        serde_json::from_str(&contents).map_err(|e| CliError::ParseUser(e, path.to_path_buf()))?;
    Ok(engine.load_user(raw)?)
}

fn run_check(
    engine: &AuthzEngine,
    user_path: &Path,
    resource: &str,
    action: &str,
    explain: bool,
) -> Result<ExitCode, CliError> {
    let user = load_user(engine, user_path)?;
    let result = engine.try_authorize(Some(&user), resource, action)?;

    println!("{}", if result.allowed { "allowed" } else { "denied" });
    if explain {
        println!("decision: {}", result.decision);
        if let Some(reason) = &result.reason {
            println!("reason: {reason}");
        }
    }

    Ok(if result.allowed {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn run_limit(
    engine: &AuthzEngine,
    config: &RolegateConfig,
    user_path: &Path,
    resource: &str,
) -> Result<ExitCode, CliError> {
    let user = load_user(engine, user_path)?;
    let limit = engine.resolve_limit(Some(&user), resource);

    println!("{}", limit.as_sentinel());
    if let Some(fallback) = config.limits.fallback_for(resource) {
        match limit.or_fallback(fallback) {
            Some(effective) => eprintln!("effective ceiling: {effective}"),
            None => eprintln!("effective ceiling: unlimited"),
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn run_key(command: KeyCommand) -> Result<ExitCode, CliError> {
    match command {
        KeyCommand::Encode { resource, action } => {
            println!("{}", encode_key(&resource, &action)?);
        }
        KeyCommand::Decode { key } => {
            let (resource, action) = decode_key(&key)?;
            println!("{resource}\t{action}");
        }
    }
    Ok(ExitCode::SUCCESS)
}

#[cfg(feature = "json-schema")]
fn run_schema_export(output: Option<PathBuf>) -> Result<ExitCode, CliError> {
    let content = RolegateConfig::json_schema_string()
        .map_err(|e| CliError::Schema(e.to_string()))?;

    match output {
        Some(path) => {
            std::fs::write(&path, &content).map_err(|e| CliError::Write(e, path.clone()))?;
            eprintln!("Config JSON schema written to {}", path.display());
        }
        None => println!("{content}"),
    }
    Ok(ExitCode::SUCCESS)
}

#[cfg(not(feature = "json-schema"))]
fn run_schema_export(output: Option<PathBuf>) -> Result<ExitCode, CliError> {
    let _ = output;
    Err(CliError::Schema(
        "requires the 'json-schema' feature".to_string(),
    ))
}
