//! Finch launcher
//!
//! Runs a Finch application: reads `finch.toml` and the entry script from
//! the resource directory, bootstraps the host and drives its run loop
//! until the script terminates or goes idle.
//!
//! ```text
//! finch                         # ./main.finch
//! finch game/main.finch -- -v   # resources in game/, script sees ["-v"]
//! finch --resources app --log-level debug
//! ```

mod output;

use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::Context;
use clap::Parser;
use finch_runtime::{run_app, HostConfig, HostError, EXIT_SOFTWARE};
use finch_stdlib::HeadlessGui;
use log::LevelFilter;

#[derive(Parser, Debug)]
#[command(name = "finch")]
#[command(about = "Run a Finch script as an application", long_about = None)]
#[command(version)]
struct Cli {
    /// Entry script (default: main.finch in the resource directory)
    script: Option<PathBuf>,

    /// Resource directory (default: the script's directory, else the
    /// current directory)
    #[arg(short, long, value_name = "DIR")]
    resources: Option<PathBuf>,

    /// Configuration file used instead of <resources>/finch.toml
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Most verbose log level shown on stderr
    #[arg(
        long,
        value_name = "LEVEL",
        default_value = "warn",
        value_parser = ["off", "error", "warn", "info", "debug", "trace"]
    )]
    log_level: String,

    /// When to color diagnostics
    #[arg(long, value_name = "WHEN", value_parser = ["auto", "always", "never"])]
    color: Option<String>,

    /// Arguments passed to the script (Application.commandArguments)
    #[arg(last = true)]
    args: Vec<String>,
}

fn main() {
    let cli = Cli::parse();
    let choice = output::resolve_color_choice(cli.color.as_deref());
    if let Err(e) = output::init_logger(level_filter(&cli.log_level), choice) {
        output::print_error(choice, &format!("could not install logger: {}", e));
    }

    let code = match run(&cli) {
        Ok(code) => code,
        Err(error) => {
            output::print_error(choice, &format!("{:#}", error));
            exit_code(&error)
        }
    };
    std::process::exit(code);
}

fn run(cli: &Cli) -> anyhow::Result<i32> {
    let config = load_config(cli)?;
    let code = run_app(&config, cli.args.clone(), Rc::new(HeadlessGui::new()))?;
    Ok(code)
}

fn level_filter(name: &str) -> LevelFilter {
    name.parse().unwrap_or(LevelFilter::Warn)
}

/// Resource directory: `--resources`, else the script's directory, else `.`.
fn resource_dir(cli: &Cli) -> PathBuf {
    if let Some(dir) = &cli.resources {
        return dir.clone();
    }
    cli.script
        .as_deref()
        .and_then(Path::parent)
        .filter(|parent| !parent.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

fn load_config(cli: &Cli) -> anyhow::Result<HostConfig> {
    let resources = resource_dir(cli);
    let mut config = match &cli.config {
        Some(file) => {
            let mut config = HostConfig::from_file(file)
                .with_context(|| format!("Failed to load {}", file.display()))?;
            config.resource_dir = resources;
            config
        }
        None => HostConfig::load(&resources)
            .with_context(|| format!("Failed to load configuration from {}", resources.display()))?,
    };
    config.script = cli.script.clone();
    Ok(config)
}

fn exit_code(error: &anyhow::Error) -> i32 {
    error
        .downcast_ref::<HostError>()
        .map(HostError::exit_code)
        .unwrap_or(EXIT_SOFTWARE)
}
