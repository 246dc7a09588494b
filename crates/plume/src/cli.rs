use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use plume_core::config::PlumeConfig;
use plume_core::plugin_system::PluginDescriptor;

/// Plume: inspect and load the plugin modules a host would run
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    #[command(flatten)]
    pub overrides: ConfigOverrides,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Settings that override the configuration file
#[derive(Args, Debug, Default)]
pub struct ConfigOverrides {
    /// Configuration file (.json, .yaml, .yml or .toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// General plugin list, e.g. "/path/lib.so#Name#Desc#1.0;mime/type"
    #[arg(long, global = true)]
    pub register_plugins: Option<String>,

    /// Path of the extra runtime module
    #[arg(long, global = true)]
    pub extra_module_path: Option<String>,

    /// Version of the extra runtime module, e.g. "11.2"
    #[arg(long, global = true)]
    pub extra_module_version: Option<String>,

    /// Run configured modules out of process
    #[arg(long, global = true)]
    pub out_of_process: bool,

    /// Enable a host feature flag (repeatable)
    #[arg(long = "enable-feature", value_name = "NAME", global = true)]
    pub enabled_features: Vec<String>,

    /// Directory the built-in modules are installed in
    #[arg(long, global = true)]
    pub module_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Parse a plugin list and print the descriptors
    Parse {
        /// The plugin list to parse
        value: String,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Print the candidate module list
    List {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Print one candidate by path
    Show {
        /// Path identifying the module
        path: PathBuf,
    },
    /// Load the libraries of all in-process candidates
    Preload,
    /// Build the registry and report which candidates are live
    Status,
}

impl ConfigOverrides {
    /// Applies the command-line values on top of `config`.
    pub fn apply(&self, config: &mut PlumeConfig) {
        if let Some(value) = &self.register_plugins {
            config.registry.register_plugins = value.clone();
        }
        if let Some(path) = &self.extra_module_path {
            config.registry.extra_module_path = path.clone();
        }
        if let Some(version) = &self.extra_module_version {
            config.registry.extra_module_version = version.clone();
        }
        if self.out_of_process {
            config.registry.out_of_process = true;
        }
        if let Some(dir) = &self.module_dir {
            config.host.module_dir = Some(dir.clone());
        }
        for feature in &self.enabled_features {
            if !config.host.enabled_features.contains(feature) {
                config.host.enabled_features.push(feature.clone());
            }
        }
    }
}

fn kind_label(descriptor: &PluginDescriptor) -> &'static str {
    if descriptor.is_internal() {
        "internal"
    } else if descriptor.is_out_of_process() {
        "out-of-process"
    } else {
        "in-process"
    }
}

/// One line per descriptor: path, name, kind and mime types.
pub fn render_descriptor_line(descriptor: &PluginDescriptor) -> String {
    let mime_types: Vec<&str> = descriptor
        .mime_entries
        .iter()
        .map(|entry| entry.mime_type.as_str())
        .collect();
    let name = if descriptor.name.is_empty() { "-" } else { &descriptor.name };
    format!(
        "{}\t{}\t{}\t{}",
        descriptor.path.display(),
        name,
        kind_label(descriptor),
        mime_types.join(",")
    )
}

pub fn render_descriptors(descriptors: &[PluginDescriptor], json: bool) -> Result<String, serde_json::Error> {
    if json {
        let summaries: Vec<_> = descriptors.iter().map(PluginDescriptor::summary).collect();
        return serde_json::to_string_pretty(&summaries);
    }
    if descriptors.is_empty() {
        return Ok("No plugins.".to_string());
    }
    Ok(descriptors
        .iter()
        .map(render_descriptor_line)
        .collect::<Vec<_>>()
        .join("\n"))
}

/// Multi-line description of one descriptor
pub fn render_descriptor_details(descriptor: &PluginDescriptor) -> String {
    let mut out = vec![
        format!("Path:        {}", descriptor.path.display()),
        format!("Name:        {}", descriptor.name),
        format!("Description: {}", descriptor.description),
        format!("Version:     {}", descriptor.version),
        format!("Kind:        {}", kind_label(descriptor)),
        "Mime types:".to_string(),
    ];
    for entry in &descriptor.mime_entries {
        let extension = if entry.file_extension.is_empty() {
            String::new()
        } else {
            format!(" (.{})", entry.file_extension)
        };
        out.push(format!("  {}{} {}", entry.mime_type, extension, entry.description));
    }
    out.join("\n")
}
