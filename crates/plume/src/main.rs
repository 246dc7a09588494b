mod cli;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use log::{debug, error, LevelFilter};
use plume_core::config::PlumeConfig;
use plume_core::kernel::constants::{APP_NAME, APP_VERSION};
use plume_core::kernel::{Error, Result};
use plume_core::plugin_system::parser::parse_plugin_list;
use plume_core::plugin_system::{
    compute_candidate_list, install_global_context, PluginRegistry, RegistryContext, SystemHost,
};

use crate::cli::{CliArgs, Commands};

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    // RUST_LOG, when set, takes precedence over -v.
    if let Err(e) = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .try_init()
    {
        eprintln!("Failed to initialize env_logger: {}", e);
    }
}

fn load_config(args: &CliArgs) -> Result<PlumeConfig> {
    let mut config = match &args.overrides.config {
        Some(path) => PlumeConfig::load(path)?,
        None => PlumeConfig::default(),
    };
    args.overrides.apply(&mut config);
    Ok(config)
}

fn json_error(e: serde_json::Error) -> Error {
    Error::Other(format!("Failed to render JSON: {}", e))
}

fn run(args: CliArgs) -> Result<ExitCode> {
    let config = load_config(&args)?;
    debug!("{} {} starting with {:?}", APP_NAME, APP_VERSION, config);
    let host = SystemHost::from_config(&config.host);

    match args.command {
        Commands::Parse { value, json } => {
            let plugins = parse_plugin_list(&value, config.registry.out_of_process);
            println!("{}", cli::render_descriptors(&plugins, json).map_err(json_error)?);
        }
        Commands::List { json } => {
            let plugins = compute_candidate_list(&config.registry, &host);
            println!("{}", cli::render_descriptors(&plugins, json).map_err(json_error)?);
        }
        Commands::Show { path } => {
            let plugins = compute_candidate_list(&config.registry, &host);
            match plugins.iter().find(|plugin| plugin.path == path) {
                Some(plugin) => println!("{}", cli::render_descriptor_details(plugin)),
                None => {
                    eprintln!("No plugin registered for '{}'", path.display());
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
        Commands::Preload => {
            let loaded = PluginRegistry::preload_all(&config.registry, &host);
            println!("Preloaded {} plugin librar{}", loaded, if loaded == 1 { "y" } else { "ies" });
        }
        Commands::Status => {
            install_global_context(RegistryContext::new(config.registry, Arc::new(host)))?;
            let registry = PluginRegistry::get_instance();
            if registry.plugins().is_empty() {
                println!("No plugins.");
            }
            for plugin in registry.plugins() {
                let state = match registry.find_live_module(&plugin.path) {
                    Some(module) => format!("live (module id {})", module.module_id()),
                    None => "not loaded".to_string(),
                };
                println!("{}\t{}", cli::render_descriptor_line(plugin), state);
            }
            println!("{} live module(s)", registry.live_module_count());
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    let args = CliArgs::parse();
    init_logging(args.verbose);

    match run(args) {
        Ok(code) => code,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
