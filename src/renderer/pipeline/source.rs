//! Shader source loading
//!
//! A program is named by a base name; each stage's source lives next to it
//! under a fixed suffix (`.vs` / `.fs` by default). A missing source is not
//! an error here: the loader logs a warning and hands back an empty string,
//! which then fails compilation with the driver's own diagnostic.

use std::borrow::Cow;
use std::fs;
use std::path::PathBuf;

use log::warn;
use rustc_hash::FxHashMap;

use crate::renderer::device::StageKind;
use crate::settings::RendererSettings;

/// Resolves stage sources for a program base name.
pub trait ShaderSourceLoader {
    /// Returns the stage source, or an empty string (after logging) when unavailable.
    fn load(&self, name: &str, stage: StageKind) -> String;
}

/// Loads `<root>/<name><suffix>` from disk.
#[derive(Debug, Clone)]
pub struct FileSystemLoader {
    root: PathBuf,
    vertex_extension: String,
    fragment_extension: String,
}

impl FileSystemLoader {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            vertex_extension: ".vs".to_string(),
            fragment_extension: ".fs".to_string(),
        }
    }

    #[must_use]
    pub fn from_settings(settings: &RendererSettings) -> Self {
        Self {
            root: settings.shader_dir.clone(),
            vertex_extension: settings.vertex_extension.clone(),
            fragment_extension: settings.fragment_extension.clone(),
        }
    }

    #[must_use]
    pub fn extension(&self, stage: StageKind) -> &str {
        match stage {
            StageKind::Vertex => &self.vertex_extension,
            StageKind::Fragment => &self.fragment_extension,
        }
    }

    #[must_use]
    pub fn path_for(&self, name: &str, stage: StageKind) -> PathBuf {
        self.root
            .join(format!("{name}{}", self.extension(stage)))
    }
}

impl ShaderSourceLoader for FileSystemLoader {
    fn load(&self, name: &str, stage: StageKind) -> String {
        let path = self.path_for(name, stage);

        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Unable to load shader: {} ({e})", path.display());
                return String::new();
            }
        };

        let text = String::from_utf8_lossy(&bytes);
        if let Cow::Owned(_) = text {
            warn!(
                "Shader {} is not valid UTF-8; invalid bytes replaced",
                path.display()
            );
        }

        // Line-concatenated, every line newline-terminated.
        let mut output = String::with_capacity(text.len() + 1);
        for line in text.lines() {
            output.push_str(line);
            output.push('\n');
        }
        output
    }
}

/// In-memory sources keyed by base name, for embedded shaders and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    sources: FxHashMap<(String, StageKind), String>,
}

impl MemoryLoader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers both stages of a program.
    #[must_use]
    pub fn with_program(mut self, name: &str, vertex: &str, fragment: &str) -> Self {
        self.insert(name, StageKind::Vertex, vertex);
        self.insert(name, StageKind::Fragment, fragment);
        self
    }

    pub fn insert(&mut self, name: &str, stage: StageKind, source: &str) {
        self.sources
            .insert((name.to_string(), stage), source.to_string());
    }
}

impl ShaderSourceLoader for MemoryLoader {
    fn load(&self, name: &str, stage: StageKind) -> String {
        if let Some(source) = self.sources.get(&(name.to_string(), stage)) {
            return source.clone();
        }
        warn!("Unable to load shader: {name} ({} stage not registered)", stage.label());
        String::new()
    }
}
