//! Parsers for the two configuration strings that describe external modules.
//!
//! The general list registers any number of modules:
//!
//! ```text
//! config = entry *( LWS "," LWS entry )
//! entry  = header *( LWS ";" LWS mime-type )
//! header = path [ "#" name [ "#" description [ "#" version ] ] ]
//! ```
//!
//! The extra-module shorthand registers a single well-known runtime module
//! from a path and a `major.minor` version string.
use log::{debug, error};

use crate::kernel::constants::{
    EXTRA_MODULE_DEFAULT_VERSION, EXTRA_MODULE_NAME, EXTRA_MODULE_SPL_DESCRIPTION,
    EXTRA_MODULE_SPL_EXTENSION, EXTRA_MODULE_SPL_MIME_TYPE, EXTRA_MODULE_SWF_DESCRIPTION,
    EXTRA_MODULE_SWF_EXTENSION, EXTRA_MODULE_SWF_MIME_TYPE,
};
use crate::plugin_system::descriptor::{MimeEntry, PluginDescriptor};
use crate::plugin_system::error::PluginSystemError;

/// Splits `value` on `separator` and trims whitespace around every piece.
/// An empty input yields a single empty piece.
fn split_trimmed(value: &str, separator: char) -> Vec<&str> {
    value.split(separator).map(str::trim).collect()
}

/// Parses the general plugin list.
///
/// Malformed entries are logged and skipped; the remaining entries are
/// returned in input order.
pub fn parse_plugin_list(value: &str, out_of_process: bool) -> Vec<PluginDescriptor> {
    if value.is_empty() {
        return Vec::new();
    }

    split_trimmed(value, ',')
        .into_iter()
        .filter_map(|entry| match parse_plugin_entry(entry, out_of_process) {
            Ok(descriptor) => Some(descriptor),
            Err(e) => {
                error!("Skipping plugin entry: {}", e);
                None
            }
        })
        .collect()
}

/// Parses one `header;mime[;mime...]` entry.
pub fn parse_plugin_entry(entry: &str, out_of_process: bool) -> Result<PluginDescriptor, PluginSystemError> {
    let parts = split_trimmed(entry, ';');
    if parts.len() < 2 {
        return Err(PluginSystemError::DescriptorError {
            entry: entry.to_string(),
            message: "Required mime-type not found".to_string(),
        });
    }

    let name_parts = split_trimmed(parts[0], '#');
    let mut descriptor = PluginDescriptor::new(name_parts[0]).with_out_of_process(out_of_process);
    if let Some(name) = name_parts.get(1) {
        descriptor.name = name.to_string();
    }
    if let Some(description) = name_parts.get(2) {
        descriptor.description = description.to_string();
    }
    if let Some(version) = name_parts.get(3) {
        descriptor.version = version.to_string();
    }

    // Mime entries inherit the description as parsed from the header.
    for mime_type in &parts[1..] {
        descriptor
            .mime_entries
            .push(MimeEntry::new(mime_type, "", &descriptor.description));
    }

    debug!(
        "Parsed plugin entry '{}' with {} mime type(s)",
        descriptor.path.display(),
        descriptor.mime_entries.len()
    );
    Ok(descriptor)
}

/// Expands a configured version string into its four components
/// (major, minor, build, patch), filling in defaults.
pub fn extra_module_version_components(version: &str) -> Vec<String> {
    let mut components: Vec<String> = version.split('.').map(str::to_string).collect();

    // Splitting an empty string leaves one empty component.
    match components.first_mut() {
        None => components.push(EXTRA_MODULE_DEFAULT_VERSION[0].to_string()),
        Some(major) if major.is_empty() => *major = EXTRA_MODULE_DEFAULT_VERSION[0].to_string(),
        Some(_) => {}
    }
    for default in &EXTRA_MODULE_DEFAULT_VERSION[components.len().min(4)..] {
        components.push(default.to_string());
    }
    components
}

/// Builds the descriptor for the extra runtime module, or `None` when no
/// path is configured.
pub fn parse_extra_module(path: &str, version: &str, out_of_process: bool) -> Option<PluginDescriptor> {
    if path.is_empty() {
        return None;
    }

    let components = extra_module_version_components(version);
    let mut descriptor = PluginDescriptor::new(path)
        .with_name(EXTRA_MODULE_NAME)
        .with_out_of_process(out_of_process)
        .with_mime_entry(MimeEntry::new(
            EXTRA_MODULE_SWF_MIME_TYPE,
            EXTRA_MODULE_SWF_EXTENSION,
            EXTRA_MODULE_SWF_DESCRIPTION,
        ))
        .with_mime_entry(MimeEntry::new(
            EXTRA_MODULE_SPL_MIME_TYPE,
            EXTRA_MODULE_SPL_EXTENSION,
            EXTRA_MODULE_SPL_DESCRIPTION,
        ));

    // E.g. "Shockwave Flash 10.2 r154"
    descriptor.description = format!(
        "{} {}.{} r{}",
        descriptor.name, components[0], components[1], components[2]
    );
    descriptor.version = components.join(".");
    Some(descriptor)
}
