//! Markup string backend.

use crate::{
	actions::ActionRegistry,
	config::RendererConfig,
	context::Metrics,
	engine::{Backend, Engine},
	error::{ConfigError, RenderError},
	markup::{self, escape},
	node::{Element, Node},
	object::{self, Attribute},
	stream::RenderStream,
};
use tracing::instrument;

/// Renders node trees to HTML.
///
/// The element cache and the [`ActionRegistry`] persist across renders with the same instance.
#[derive(Debug)]
pub struct StringRenderer {
	pub(crate) engine: Engine,
	pub(crate) actions: ActionRegistry,
}
impl StringRenderer {
	/// # Errors
	///
	/// Iff `config` is invalid.
	pub fn new(config: RendererConfig) -> Result<Self, ConfigError> {
		Ok(Self {
			engine: Engine::new(config)?,
			actions: ActionRegistry::new(),
		})
	}

	/// # Errors
	///
	/// [`RenderError::DepthExceeded`], and [`RenderError::Producer`] iff [`RendererConfig::throw_on_error`] is set.
	#[instrument(skip(self, node))]
	pub fn render(&mut self, node: &Node) -> Result<String, RenderError> {
		let mut backend = MarkupBackend {
			actions: &mut self.actions,
			hydrate: self.engine.config().enable_hydration,
		};
		let html = self.engine.render_root(&mut backend, node)?;
		Ok(if self.engine.config().minify { markup::minify(&html) } else { html })
	}

	/// Renders lazily, in chunks. See [`RenderStream`].
	pub fn render_stream<'a>(&'a mut self, node: &'a Node) -> RenderStream<'a> {
		RenderStream::new(self, node)
	}

	#[must_use]
	pub fn engine(&self) -> &Engine {
		&self.engine
	}

	pub fn clear_cache(&mut self) {
		self.engine.clear_cache();
	}

	#[must_use]
	pub fn config(&self) -> &RendererConfig {
		self.engine.config()
	}

	#[must_use]
	pub fn metrics(&self) -> &Metrics {
		self.engine.metrics()
	}

	#[must_use]
	pub fn actions(&self) -> &ActionRegistry {
		&self.actions
	}

	pub fn actions_mut(&mut self) -> &mut ActionRegistry {
		&mut self.actions
	}
}

pub(crate) struct MarkupBackend<'a> {
	pub(crate) actions: &'a mut ActionRegistry,
	pub(crate) hydrate: bool,
}
impl Backend for MarkupBackend<'_> {
	type Unit = String;

	const CACHES_FRAGMENTS: bool = true;

	fn empty(&mut self) -> String {
		String::new()
	}

	fn text(&mut self, text: &str) -> String {
		escape(text).into_owned()
	}

	fn fragment(&mut self, units: Vec<String>) -> String {
		units.concat()
	}

	fn element(&mut self, element: &Element, content: Vec<String>) -> String {
		let mut html = String::with_capacity(element.tag.len() * 2 + 5 + content.iter().map(String::len).sum::<usize>());
		write_open_tag(&mut html, element, self.actions, self.hydrate);
		if !markup::is_void_element(&element.tag) {
			for unit in content {
				html.push_str(&unit);
			}
			write_close_tag(&mut html, &element.tag);
		}
		html
	}

	fn fallback(&mut self, fallback: &str) -> String {
		fallback.to_owned()
	}

	fn from_cache(&mut self, fragment: &str) -> Option<String> {
		Some(fragment.to_owned())
	}

	fn to_cache(&self, unit: &String) -> Option<String> {
		Some(unit.clone())
	}
}

/// `<tag attributes>`. With `hydrate`, event handlers are published to `actions` and referenced through `data-action-*` attributes.
pub(crate) fn write_open_tag(out: &mut String, element: &Element, actions: &mut ActionRegistry, hydrate: bool) {
	out.push('<');
	out.push_str(&element.tag);
	for attribute in object::attributes(&element.props) {
		match attribute {
			Attribute::Listener { event, handler } if hydrate && markup::is_valid_name(&event) => {
				let id = actions.publish(&event, handler);
				out.push_str(" data-action-");
				out.push_str(&event);
				out.push_str("=\"");
				out.push_str(&id.to_string());
				out.push('"');
			}
			attribute => markup::write_attribute(out, &attribute),
		}
	}
	out.push('>');
}

pub(crate) fn write_close_tag(out: &mut String, tag: &str) {
	out.push_str("</");
	out.push_str(tag);
	out.push('>');
}
