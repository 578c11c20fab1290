//! Command-line surface
//!
//! Parses arguments, builds the loader configuration, loads the requested
//! module(s) and writes the report to the given writer.

use crate::logging::TracingFormat;
use anyhow::{bail, Context, Result};
use clap::{ArgAction, ArgGroup, Parser, ValueEnum};
use pluglens_host::{
    scan_directory, CapabilityContract, LibraryOpener, LoadReport, LoaderConfig,
    MetadataIntrospector, ModuleOpener, PluginLoader,
};
use std::io::Write;
use std::path::PathBuf;

/// Report format on stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Load a native plugin module and report its interface or declared structure
#[derive(Debug, Parser)]
#[command(name = "pluglens", version, about)]
#[command(group(ArgGroup::new("source").required(true).args(["path", "dir"])))]
pub struct Cli {
    /// Path to the plugin file (.so/.dylib/.dll)
    #[arg(short, long, value_name = "PLUGIN_PATH", env = "PLUGLENS_PLUGIN_PATH")]
    pub path: Option<PathBuf>,

    /// Inspect every plugin module in a directory
    #[arg(short, long, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Extra contract to probe, as IID or IID:method,method (before the built-in one)
    #[arg(long = "contract", value_name = "IID[:METHODS]")]
    pub contracts: Vec<String>,

    /// Report format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text, env = "PLUGLENS_FORMAT")]
    pub format: OutputFormat,

    /// Log format (logs go to stderr)
    #[arg(long, value_enum, default_value_t = TracingFormat::Compact, env = "PLUGLENS_LOG_FORMAT")]
    pub log_format: TracingFormat,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Parse `IID` or `IID:method,method`
pub fn parse_contract(arg: &str) -> Result<CapabilityContract> {
    let (id, methods) = match arg.split_once(':') {
        Some((id, methods)) => (id.trim(), methods),
        None => (arg.trim(), ""),
    };
    if id.is_empty() {
        bail!("Contract id must not be empty: '{}'", arg);
    }

    Ok(methods
        .split(',')
        .map(str::trim)
        .filter(|method| !method.is_empty())
        .fold(CapabilityContract::new(id), |contract, method| {
            contract.method(method)
        }))
}

impl Cli {
    /// Contracts from `--contract`, followed by `com.example.PluginInterface`
    pub fn loader_config(&self) -> Result<LoaderConfig> {
        let mut config = LoaderConfig::new();
        for arg in &self.contracts {
            config = config.contract(parse_contract(arg)?);
        }
        let has_builtin = config
            .contracts
            .ids()
            .any(|id| id == pluglens_host::PLUGIN_INTERFACE_IID);
        if !has_builtin {
            config = config.contract(CapabilityContract::plugin_interface());
        }
        Ok(config)
    }
}

/// Run the command and return the process exit code
pub fn run(cli: &Cli, out: &mut impl Write) -> Result<u8> {
    run_with(cli, LibraryOpener, out)
}

/// Run the command, opening modules through `opener`
pub fn run_with<O: ModuleOpener>(cli: &Cli, opener: O, out: &mut impl Write) -> Result<u8> {
    let loader = PluginLoader::with_parts(opener, cli.loader_config()?, MetadataIntrospector);

    if let Some(path) = &cli.path {
        let report = loader.load(path);
        write_single(cli.format, &report, out)?;
        return Ok(report.exit_code());
    }

    let Some(dir) = &cli.dir else {
        bail!("Plugin path must be specified with --path");
    };
    let modules = scan_directory(dir)?;
    if modules.is_empty() {
        tracing::warn!(dir = %dir.display(), "No plugin modules found");
    }

    let reports = loader.load_all(&modules);
    write_many(cli.format, &reports, out)?;

    let failed = reports.iter().any(|report| report.exit_code() != 0);
    Ok(u8::from(failed))
}

fn write_single(format: OutputFormat, report: &LoadReport, out: &mut impl Write) -> Result<()> {
    match format {
        OutputFormat::Text => writeln!(out, "{}", report.outcome)?,
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&report.outcome)
                .context("Failed to serialize report")?;
            writeln!(out, "{}", json)?;
        }
    }
    Ok(())
}

fn write_many(format: OutputFormat, reports: &[LoadReport], out: &mut impl Write) -> Result<()> {
    match format {
        OutputFormat::Text => {
            for report in reports {
                writeln!(out, "== {} ==", report.path.display())?;
                writeln!(out, "{}", report.outcome)?;
            }
        }
        OutputFormat::Json => {
            let json =
                serde_json::to_string_pretty(reports).context("Failed to serialize reports")?;
            writeln!(out, "{}", json)?;
        }
    }
    Ok(())
}
