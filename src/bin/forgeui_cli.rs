//! ForgeUI CLI - Bridge interface for the service layer
//!
//! Commands: registry, validate, heal
//! Outputs JSON to stdout, logs to stderr
//! Returns 2 on an invalid report or unhealed problems

use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use forgeui_core::{
    ArtifactSink, ComponentRegistry, DesignNode, DirectorySink, ForgeConfig, ForgePipeline, InferredInputs,
    ValidationProfile,
};

#[derive(Parser)]
#[command(name = "forgeui-cli")]
#[command(about = "ForgeUI CLI - Component Governance Compiler")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Registry JSON file or directory of registry files
    #[arg(short, long)]
    registry: Option<PathBuf>,

    /// Engine config (JSON)
    #[arg(short, long, default_value = "forgeui.json")]
    config: PathBuf,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered components
    Registry,

    /// Score a design tree against the registry
    Validate {
        /// Design tree: inline JSON or a file path
        #[arg(short, long)]
        tree: String,

        /// Override the configured profile
        #[arg(short, long, value_parser = parse_profile)]
        profile: Option<ValidationProfile>,
    },

    /// Heal raw generator output into an artifact bundle
    Heal {
        /// Component name, e.g. "PrimaryButton"
        #[arg(short, long)]
        name: String,

        /// Raw generator text file, "-" for stdin
        #[arg(short, long, default_value = "-")]
        input: PathBuf,

        /// Inferred inputs: inline JSON or a file path
        #[arg(long)]
        inputs: Option<String>,

        /// Source design node: inline JSON or a file path
        #[arg(long)]
        node: Option<String>,

        /// Write the healed bundle under this directory
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

fn parse_profile(s: &str) -> Result<ValidationProfile, String> {
    match s {
        "lenient" => Ok(ValidationProfile::Lenient),
        "strict" => Ok(ValidationProfile::Strict),
        other => Err(format!("unknown profile '{}', expected lenient or strict", other)),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let mut config = match ForgeConfig::load(&cli.config) {
        Ok(c) => c,
        Err(e) => return fail(&format!("Failed to load config: {}", e)),
    };

    let registry = match load_registry(cli.registry.as_deref()) {
        Ok(r) => r,
        Err(e) => return fail(&format!("Failed to load registry: {}", e)),
    };

    if let Commands::Validate { profile: Some(profile), .. } = &cli.command {
        config.profile = *profile;
    }

    let pipeline = match ForgePipeline::new(Arc::new(registry), &config) {
        Ok(p) => p,
        Err(e) => return fail(&e.to_string()),
    };

    match cli.command {
        Commands::Registry => {
            let components: Vec<_> = pipeline
                .registry()
                .list()
                .into_iter()
                .map(|(key, rule)| {
                    serde_json::json!({
                        "key": key,
                        "type": rule.component_type,
                        "tag": rule.tag,
                        "props": rule.props.keys().collect::<Vec<_>>(),
                        "canContain": rule.composition.can_contain,
                        "cannotContain": rule.composition.cannot_contain,
                    })
                })
                .collect();
            let output = serde_json::json!({
                "version": pipeline.registry().version(),
                "components": components,
            });
            emit(&output, true)
        }

        Commands::Validate { tree, .. } => {
            let tree: DesignNode = match read_json_arg(&tree) {
                Ok(t) => t,
                Err(e) => return fail(&format!("Invalid tree: {}", e)),
            };
            let report = pipeline.validate_tree(&tree);
            emit(&report, report.valid)
        }

        Commands::Heal { name, input, inputs, node, out } => {
            let raw = match read_raw(&input) {
                Ok(r) => r,
                Err(e) => return fail(&format!("Failed to read input: {}", e)),
            };
            let inputs: Option<InferredInputs> = match inputs.as_deref().map(read_json_arg::<InferredInputs>).transpose() {
                Ok(i) => i,
                Err(e) => return fail(&format!("Invalid inputs: {}", e)),
            };
            let node: Option<DesignNode> = match node.as_deref().map(read_json_arg::<DesignNode>).transpose() {
                Ok(n) => n,
                Err(e) => return fail(&format!("Invalid node: {}", e)),
            };

            let outcome = pipeline.heal(&raw, &name, inputs.as_ref(), node.as_ref());

            let mut written = vec![];
            if let Some(dir) = out {
                match DirectorySink::new(dir).persist(&name, &outcome.bundle) {
                    Ok(paths) => written = paths,
                    Err(e) => return fail(&format!("Failed to write bundle: {}", e)),
                }
            }

            let clean = outcome.is_clean();
            let output = serde_json::json!({
                "success": clean,
                "outcome": outcome,
                "written": written,
            });
            emit(&output, clean)
        }
    }
}

fn load_registry(path: Option<&Path>) -> Result<ComponentRegistry, forgeui_core::RegistryError> {
    match path {
        None => {
            tracing::warn!("no registry given, every namespaced component is unknown");
            Ok(ComponentRegistry::new())
        }
        Some(p) if p.is_dir() => ComponentRegistry::load_from_dir(p),
        Some(p) => ComponentRegistry::load_from_file(p),
    }
}

/// Inline JSON when it looks like an object, otherwise a file path
fn read_json_arg<T: DeserializeOwned>(arg: &str) -> Result<T, String> {
    let content = if arg.trim_start().starts_with('{') {
        arg.to_string()
    } else {
        fs::read_to_string(arg).map_err(|e| format!("{}: {}", arg, e))?
    };
    serde_json::from_str(&content).map_err(|e| e.to_string())
}

fn read_raw(path: &Path) -> std::io::Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        fs::read_to_string(path)
    }
}

fn emit<T: Serialize>(value: &T, ok: bool) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => return fail(&format!("Serialization error: {}", e)),
    }
    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2)
    }
}

fn fail(message: &str) -> ExitCode {
    tracing::error!("{}", message);
    println!("{}", serde_json::json!({ "success": false, "error": message }));
    ExitCode::FAILURE
}
