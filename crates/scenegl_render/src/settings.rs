//! Transparency Settings
//!
//! Configuration consumed when a [`TransparencyManager`] is created.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use scenegl::render::{TransparencySettings, TransparencyMode, SnippetSource};
//!
//! // Default: sorted blending with the snippets compiled into the binary
//! let settings = TransparencySettings::default();
//!
//! // Load snippets from an installation directory instead
//! let settings = TransparencySettings {
//!     snippets: SnippetSource::install_dir("/opt/scenegl"),
//!     ..Default::default()
//! };
//! ```
//!
//! [`TransparencyManager`]: crate::transparency::TransparencyManager

use std::fmt;
use std::path::{Path, PathBuf};

/// Environment variable naming the installation root.
pub const HOME_ENV_VAR: &str = "SCENEGL_HOME";

/// Snippet directory below the installation root.
pub const SNIPPET_SUBDIR: &str = "media/dpfx";

// ---------------------------------------------------------------------------
// TransparencyMode
// ---------------------------------------------------------------------------

/// Compositing technique used for transparent geometry.
///
/// | Mode                          | Passes | Needs sorting |
/// |-------------------------------|--------|---------------|
/// | `SortedBlended`               | 1      | yes           |
/// | `OrderIndependentAll`         | 1      | no            |
/// | `OrderIndependentClosestArray`| 1      | no            |
/// | `OrderIndependentClosestList` | 1      | no            |
///
/// Only [`SortedBlended`](Self::SortedBlended) currently has a strategy; the
/// order-independent modes are reserved tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TransparencyMode {
    /// Transparent geometry is not treated specially.
    None,
    /// Back-to-front alpha blending with depth writes disabled.
    #[default]
    SortedBlended,
    OrderIndependentAll,
    OrderIndependentClosestArray,
    OrderIndependentClosestList,
}

impl fmt::Display for TransparencyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "none",
            Self::SortedBlended => "sorted-blended",
            Self::OrderIndependentAll => "order-independent (all)",
            Self::OrderIndependentClosestArray => "order-independent (closest, array)",
            Self::OrderIndependentClosestList => "order-independent (closest, list)",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// SnippetSource
// ---------------------------------------------------------------------------

/// Where shader snippets are read from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SnippetSource {
    /// The copies compiled into the binary.
    #[default]
    Embedded,
    /// A directory holding `emitColor.glsl` and friends.
    Directory(PathBuf),
}

impl SnippetSource {
    /// Snippet directory of an installation rooted at `home`.
    pub fn install_dir(home: impl AsRef<Path>) -> Self {
        Self::Directory(home.as_ref().join(SNIPPET_SUBDIR))
    }

    /// [`install_dir`](Self::install_dir) of `$SCENEGL_HOME`, or the
    /// embedded snippets when the variable is unset.
    #[must_use]
    pub fn from_env() -> Self {
        match std::env::var_os(HOME_ENV_VAR) {
            Some(home) => Self::install_dir(home),
            None => Self::Embedded,
        }
    }
}

// ---------------------------------------------------------------------------
// TransparencySettings
// ---------------------------------------------------------------------------

/// Transparency configuration.
///
/// | Field      | Description                     | Default         |
/// |------------|---------------------------------|-----------------|
/// | `mode`     | Compositing technique           | `SortedBlended` |
/// | `snippets` | Shader snippet source           | `Embedded`      |
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransparencySettings {
    pub mode: TransparencyMode,
    pub snippets: SnippetSource,
}
