#![doc(html_root_url = "https://docs.rs/arbor-render/0.0.1")]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! Renders declarative node trees to HTML strings, lazily streamed HTML chunks or live DOM nodes.
//!
//! All backends share one tree walk ([`Engine`]), so they agree on ordering, attribute semantics,
//! depth limiting and failure containment.

#[cfg(doctest)]
pub mod readme {
	doc_comment::doctest!("../README.md");
}

pub mod actions;
pub mod cache;
pub mod config;
pub mod context;
pub mod dom;
pub mod engine;
pub mod error;
pub mod json;
pub mod markup;
pub mod node;
pub mod object;
pub mod presets;
pub mod stream;
pub mod string;

pub use actions::{ActionId, ActionRegistry};
pub use cache::ElementCache;
pub use config::{Encoding, RendererConfig};
pub use context::{Metrics, Scope};
pub use dom::{DomRenderer, Host};
pub use engine::{Backend, Engine};
pub use error::{ConfigError, ProducerError, RenderError};
pub use node::{Component, Element, Event, EventHandler, Node, PropValue, Props, TextContent, TextValue};
pub use stream::RenderStream;
pub use string::StringRenderer;

/// Renders `node` once with a throwaway [`StringRenderer`].
///
/// # Errors
///
/// [`RenderError::Config`] iff `config` is invalid, otherwise as [`StringRenderer::render`].
pub fn render_to_string(node: &Node, config: RendererConfig) -> Result<String, RenderError> {
	StringRenderer::new(config)?.render(node)
}
