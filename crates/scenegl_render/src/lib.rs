//! SceneGL render layer: transparency pass control and shader snippets.

pub mod renderer;
pub mod settings;
pub mod snippets;
pub mod transparency;

pub use renderer::{RenderGroupId, Renderer, RendererId};
pub use settings::{SnippetSource, TransparencyMode, TransparencySettings};
pub use snippets::SnippetLoader;
pub use transparency::{PassStats, SortedBlended, TransparencyManager, TransparencyStrategy};
