use clap::Parser;
use colored::*;
use eyre::{Context, Result, eyre};
use log::{LevelFilter, info};
use std::path::{Path, PathBuf};

mod cli;
mod config;

use cli::Cli;
use cli::commands::Commands;
use config::Config;
use yaml_toolbox::error::ToolboxError;
use yaml_toolbox::factory::NameAllocator;
use yaml_toolbox::loader::{self, REGISTRY_FILE_NAME, ResolvedToolbox};
use yaml_toolbox::metadata::MetadataGenerator;
use yaml_toolbox::schema::{ParameterConfig, ParameterFilter, ToolboxConfig};

fn setup_logging(verbose: bool, level: Option<&str>) {
    let mut builder = env_logger::Builder::from_default_env();
    if verbose {
        builder.filter_level(LevelFilter::Debug);
    } else if let Some(level) = level.and_then(|l| l.parse::<LevelFilter>().ok()) {
        builder.filter_level(level);
    }
    builder.init();
}

/// A single toolbox when `path` is a registry or contains one, otherwise
/// every toolbox one level below it
fn toolbox_paths(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() || path.join(REGISTRY_FILE_NAME).is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    let found = loader::discover_toolboxes(path).context("Failed to search for toolboxes")?;
    if found.is_empty() {
        return Err(eyre!("No toolbox found at {}", path.display()));
    }
    Ok(found)
}

fn target_path(path: Option<&PathBuf>, config: &Config) -> PathBuf {
    path.cloned()
        .or_else(|| config.toolboxes.clone())
        .unwrap_or_else(|| PathBuf::from("."))
}

fn resolve(path: &Path) -> Result<ResolvedToolbox> {
    loader::resolve_toolbox(path).context(format!("Failed to resolve toolbox {}", path.display()))
}

fn run_application(cli: &Cli, config: &Config) -> Result<()> {
    info!("Starting application");

    match &cli.command {
        None => handle_validate_command(None, config),
        Some(Commands::Validate { path }) => handle_validate_command(path.as_ref(), config),
        Some(Commands::List { path }) => handle_list_command(path.as_ref(), config),
        Some(Commands::Describe { path, tool, json }) => handle_describe_command(path, tool, *json),
        Some(Commands::Metadata { path, out }) => handle_metadata_command(path, out.as_ref(), config),
        Some(Commands::Dump { file }) => handle_dump_command(file),
    }
}

fn print_resolved(resolved: &ResolvedToolbox) {
    let mut names = NameAllocator::new();
    for tool in &resolved.tools {
        if tool.reference.enabled {
            println!(
                "  {} {} -> {} ({} parameters)",
                "✓".green(),
                names.allocate(tool.config.name()),
                tool.config.label(),
                tool.config.parameters.len()
            );
        } else {
            println!("  {} {} {}", "○".dimmed(), tool.reference.name, "(disabled)".dimmed());
        }
    }
}

fn print_failure(error: &ToolboxError) {
    match error {
        ToolboxError::ToolLoad(errors) => {
            for failure in &errors.failures {
                println!("  {} {}: {}", "✗".red(), failure.tool.bold(), failure.error);
            }
        }
        ToolboxError::Consistency(errors) => {
            for problem in &errors.problems {
                println!("  {} {}", "✗".red(), problem);
            }
        }
        other => println!("  {} {}", "✗".red(), other),
    }
}

fn handle_validate_command(path: Option<&PathBuf>, config: &Config) -> Result<()> {
    let root = target_path(path, config);
    info!("Validating toolboxes at {}", root.display());

    let mut failed = 0;
    for toolbox_path in toolbox_paths(&root)? {
        println!("{} {}", "Toolbox:".cyan(), toolbox_path.display());
        match loader::resolve_toolbox(&toolbox_path) {
            Ok(resolved) => {
                println!(
                    "  {} ({}, v{})",
                    resolved.toolbox.label().bold(),
                    resolved.toolbox.alias(),
                    resolved.toolbox.config.toolbox.version
                );
                print_resolved(&resolved);
            }
            Err(e) => {
                failed += 1;
                print_failure(&e);
            }
        }
    }

    if failed > 0 {
        return Err(eyre!("{} toolbox(es) failed validation", failed));
    }
    println!("{}", "All toolboxes valid".green());
    Ok(())
}

fn handle_list_command(path: Option<&PathBuf>, config: &Config) -> Result<()> {
    let root = target_path(path, config);
    for toolbox_path in toolbox_paths(&root)? {
        let resolved = resolve(&toolbox_path)?;
        println!("{} ({})", resolved.toolbox.label().bold(), resolved.toolbox.alias());

        let mut names = NameAllocator::new();
        for tool in resolved.enabled_tools() {
            println!(
                "  {:<28} {:<28} {}",
                names.allocate(tool.config.name()).green(),
                tool.config.label(),
                tool.config.tool.category.dimmed()
            );
        }
    }
    Ok(())
}

fn describe_filter(filter: &ParameterFilter) -> String {
    match filter {
        ParameterFilter::Range { min, max } => format!("Range {}..{}", min, max),
        ParameterFilter::ValueList { values } => {
            let values: Vec<String> = values.iter().map(|v| v.to_string()).collect();
            format!("ValueList [{}]", values.join(", "))
        }
        ParameterFilter::File { file_filters } => format!("File [{}]", file_filters.join(", ")),
    }
}

fn print_parameter(param: &ParameterConfig) {
    println!(
        "  [{}] {} ({}) {} {} {}",
        param.index,
        param.name.bold(),
        param.display_name,
        param.datatype.cyan(),
        param.parameter_type,
        param.direction
    );
    if let Some(default) = &param.default_value {
        println!("      default: {}", default);
    }
    if let Some(filter) = &param.filter {
        println!("      filter: {}", describe_filter(filter));
    }
    if !param.validation.is_empty() {
        let checks: Vec<&str> = param.validation.iter().map(|c| c.kind.name()).collect();
        println!("      checks: {}", checks.join(", "));
    }
}

fn handle_describe_command(path: &Path, tool: &str, json: bool) -> Result<()> {
    let resolved = resolve(path)?;
    let loaded = resolved
        .find(tool)
        .ok_or_else(|| eyre!("Tool '{}' is not listed in {}", tool, resolved.toolbox.registry_path.display()))?;
    let parameters = loaded.config.sorted_parameters();

    if json {
        let output = serde_json::to_string_pretty(&parameters).context("Failed to serialize parameters")?;
        println!("{}", output);
        return Ok(());
    }

    println!("{} {}", loaded.config.label().bold(), format!("({})", loaded.path.display()).dimmed());
    println!("  {}", loaded.config.tool.description);
    for param in &parameters {
        print_parameter(param);
    }
    Ok(())
}

fn handle_metadata_command(path: &Path, out: Option<&PathBuf>, config: &Config) -> Result<()> {
    let resolved = resolve(path)?;
    let out_dir = out.cloned().unwrap_or_else(|| config.metadata.output_dir.clone());

    let generator = MetadataGenerator::new(config.metadata.toolbox_name.clone());
    let written = generator
        .write_all(&resolved, &out_dir)
        .context("Failed to write metadata")?;

    for file in &written {
        println!("{} {}", "Wrote:".green(), file.display());
    }
    Ok(())
}

fn handle_dump_command(file: &Path) -> Result<()> {
    let value = loader::read_document(file)?;
    let yaml = if value.get("toolbox").is_some() {
        let config = ToolboxConfig::from_value(&value).map_err(|e| e.in_file(file))?;
        loader::to_yaml(&config)?
    } else {
        let config = loader::load_tool(file)?;
        loader::to_yaml(&config)?
    };
    print!("{}", yaml);
    Ok(())
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    setup_logging(cli.is_verbose(), config.log_level.as_deref());
    info!("Starting with config from: {:?}", cli.config);

    // Run the main application logic
    run_application(&cli, &config).context("Application failed")?;

    Ok(())
}
