use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::plugin_system::traits::EntryPoints;

/// One mime type a module handles
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MimeEntry {
    /// Mime type, e.g. `application/pdf`
    pub mime_type: String,

    /// File extension without the dot (may be empty)
    pub file_extension: String,

    /// Human-readable description of the type
    pub description: String,
}

impl MimeEntry {
    pub fn new(mime_type: &str, file_extension: &str, description: &str) -> Self {
        Self {
            mime_type: mime_type.to_string(),
            file_extension: file_extension.to_string(),
            description: description.to_string(),
        }
    }
}

/// How a module's code reaches the process
#[derive(Debug, Clone, Copy)]
pub enum ModuleKind {
    /// Dynamic library loaded into this process
    InProcess,
    /// Hosted by another process; never loaded here
    OutOfProcess,
    /// Statically linked into the host, reached through fixed entry points
    Internal(EntryPoints),
}

/// Static metadata describing one candidate module
#[derive(Debug, Clone)]
pub struct PluginDescriptor {
    /// Module identity. For internal modules a synthetic token.
    pub path: PathBuf,

    /// Human-readable name
    pub name: String,

    /// Module description
    pub description: String,

    /// Module version
    pub version: String,

    /// Handled mime types, in declaration order
    pub mime_entries: Vec<MimeEntry>,

    /// Loading strategy
    pub kind: ModuleKind,
}

impl PluginDescriptor {
    /// Create a new in-process descriptor with empty metadata
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            name: String::new(),
            description: String::new(),
            version: String::new(),
            mime_entries: Vec::new(),
            kind: ModuleKind::InProcess,
        }
    }

    /// Create an internal descriptor bound to compiled-in entry points
    pub fn internal(path: impl Into<PathBuf>, entry_points: EntryPoints) -> Self {
        Self {
            kind: ModuleKind::Internal(entry_points),
            ..Self::new(path)
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn with_mime_entry(mut self, entry: MimeEntry) -> Self {
        self.mime_entries.push(entry);
        self
    }

    /// Marks the descriptor out-of-process. Internal modules stay in-process.
    pub fn with_out_of_process(mut self, out_of_process: bool) -> Self {
        match self.kind {
            ModuleKind::Internal(_) => {}
            _ if out_of_process => self.kind = ModuleKind::OutOfProcess,
            _ => self.kind = ModuleKind::InProcess,
        }
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_internal(&self) -> bool {
        matches!(self.kind, ModuleKind::Internal(_))
    }

    pub fn is_out_of_process(&self) -> bool {
        matches!(self.kind, ModuleKind::OutOfProcess)
    }

    /// Compiled-in entry points, present only for internal modules
    pub fn entry_points(&self) -> Option<EntryPoints> {
        match self.kind {
            ModuleKind::Internal(entry_points) => Some(entry_points),
            _ => None,
        }
    }

    /// Whether the module declares `mime_type`
    pub fn handles_mime_type(&self, mime_type: &str) -> bool {
        self.mime_entries.iter().any(|entry| entry.mime_type == mime_type)
    }

    /// Serializable view of the descriptor, without entry points
    pub fn summary(&self) -> DescriptorSummary<'_> {
        DescriptorSummary {
            path: self.path.to_string_lossy().into_owned(),
            name: &self.name,
            description: &self.description,
            version: &self.version,
            mime_entries: &self.mime_entries,
            is_internal: self.is_internal(),
            is_out_of_process: self.is_out_of_process(),
        }
    }
}

/// Borrowed, serializable view of a [`PluginDescriptor`]
#[derive(Debug, Serialize)]
pub struct DescriptorSummary<'a> {
    pub path: String,
    pub name: &'a str,
    pub description: &'a str,
    pub version: &'a str,
    pub mime_entries: &'a [MimeEntry],
    pub is_internal: bool,
    pub is_out_of_process: bool,
}
