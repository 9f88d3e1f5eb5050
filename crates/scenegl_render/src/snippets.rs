//! Shader Snippet Loader
//!
//! Resolves named fragment-shader snippets either from the copies embedded
//! at build time or from an installation directory. A missing snippet is an
//! error: pass setup cannot continue without it.

use std::io;
use std::path::PathBuf;

use rust_embed::RustEmbed;

use scenegl_core::{Result, SceneGlError};

use crate::settings::SnippetSource;

/// Writes the fragment color only.
pub const EMIT_COLOR: &str = "emitColor.glsl";
/// Writes the fragment color and depth.
pub const EMIT_COLOR_DEPTH: &str = "emitColorDepth.glsl";

#[derive(RustEmbed)]
#[folder = "media/dpfx"]
struct EmbeddedSnippets;

#[derive(Debug, Clone, Default)]
pub struct SnippetLoader {
    source: SnippetSource,
}

impl SnippetLoader {
    #[must_use]
    pub fn new(source: SnippetSource) -> Self {
        Self { source }
    }

    #[inline]
    #[must_use]
    pub fn source(&self) -> &SnippetSource {
        &self.source
    }

    /// Returns the full text of snippet `name`.
    pub fn load_text(&self, name: &str) -> Result<String> {
        match &self.source {
            SnippetSource::Embedded => {
                let file = EmbeddedSnippets::get(name)
                    .ok_or_else(|| SceneGlError::SnippetNotFound(PathBuf::from(name)))?;
                String::from_utf8(file.data.into_owned())
                    .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e).into())
            }
            SnippetSource::Directory(root) => {
                let path = root.join(name);
                match std::fs::read_to_string(&path) {
                    Ok(text) => Ok(text),
                    Err(e) if e.kind() == io::ErrorKind::NotFound => {
                        Err(SceneGlError::SnippetNotFound(path))
                    }
                    Err(e) => Err(e.into()),
                }
            }
        }
    }
}
