//! Live node backend.
//!
//! Rendering always creates a fresh subtree. There is no diffing: replacing previously mounted nodes is up to the caller
//! (or [`enable_hydration`](`crate::RendererConfig::enable_hydration`), which clears the container first).

pub mod memory;
#[cfg(target_arch = "wasm32")]
pub mod web;

use crate::{
	config::RendererConfig,
	context::Metrics,
	engine::{Backend, Engine},
	error::{ConfigError, RenderError},
	node::{Element, EventHandler, Node},
	object::{self, Attribute},
};
use tracing::{instrument, trace, trace_span};

pub const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";
pub const MATHML_NAMESPACE: &str = "http://www.w3.org/1998/Math/MathML";

/// A document that can create and assemble live nodes.
pub trait Host {
	type Node: Clone;

	/// Returns [`None`] (after logging) if the element can't be created.
	fn create_element(&mut self, tag: &str, namespace: Option<&str>) -> Option<Self::Node>;
	fn create_text(&mut self, text: &str) -> Self::Node;
	fn set_attribute(&mut self, node: &Self::Node, name: &str, value: &str);
	/// Sets a boolean attribute, which carries no value.
	fn set_flag(&mut self, node: &Self::Node, name: &str) {
		self.set_attribute(node, name, "");
	}
	/// Registers `handler` for `event` on `node` and records the binding for later inspection or removal.
	fn add_listener(&mut self, node: &Self::Node, event: &str, handler: &EventHandler);
	fn append_child(&mut self, parent: &Self::Node, child: &Self::Node);
	fn clear_children(&mut self, parent: &Self::Node);
}

/// Renders node trees to live nodes of a [`Host`].
#[derive(Debug)]
pub struct DomRenderer<H: Host> {
	engine: Engine,
	host: H,
}
impl<H: Host> DomRenderer<H> {
	/// # Errors
	///
	/// Iff `config` is invalid.
	pub fn new(config: RendererConfig, host: H) -> Result<Self, ConfigError> {
		Ok(Self {
			engine: Engine::new(config)?,
			host,
		})
	}

	/// Creates live nodes for `node` and appends them to `container`, if given.
	///
	/// A collection at the top level produces several nodes, an empty node none at all.
	///
	/// # Errors
	///
	/// [`RenderError::DepthExceeded`], and [`RenderError::Producer`] iff [`RendererConfig::throw_on_error`] is set.
	/// The container is left untouched in that case.
	#[instrument(skip(self, node, container))]
	pub fn render(&mut self, node: &Node, container: Option<&H::Node>) -> Result<Vec<H::Node>, RenderError> {
		let mut backend = DomBackend {
			host: &mut self.host,
			namespaces: Vec::new(),
			namespace: self.engine.config().namespace.clone(),
		};
		let nodes = self.engine.render_root(&mut backend, node)?;

		if let Some(container) = container {
			if self.engine.config().enable_hydration {
				trace!("Clearing container for takeover.");
				self.host.clear_children(container);
			}
			for node in &nodes {
				self.host.append_child(container, node);
			}
		}
		Ok(nodes)
	}

	#[must_use]
	pub fn engine(&self) -> &Engine {
		&self.engine
	}

	#[must_use]
	pub fn metrics(&self) -> &Metrics {
		self.engine.metrics()
	}

	#[must_use]
	pub fn host(&self) -> &H {
		&self.host
	}

	pub fn host_mut(&mut self) -> &mut H {
		&mut self.host
	}
}

struct DomBackend<'a, H: Host> {
	host: &'a mut H,
	/// Namespace of each element currently being built.
	namespaces: Vec<Option<String>>,
	/// The configured default.
	namespace: Option<String>,
}
impl<H: Host> Backend for DomBackend<'_, H> {
	type Unit = Vec<H::Node>;

	fn empty(&mut self) -> Vec<H::Node> {
		Vec::new()
	}

	fn text(&mut self, text: &str) -> Vec<H::Node> {
		vec![self.host.create_text(text)]
	}

	fn fragment(&mut self, units: Vec<Vec<H::Node>>) -> Vec<H::Node> {
		units.into_iter().flatten().collect()
	}

	fn enter(&mut self, element: &Element) {
		let namespace = if element.tag.eq_ignore_ascii_case("svg") {
			Some(SVG_NAMESPACE.to_owned())
		} else if element.tag.eq_ignore_ascii_case("math") {
			Some(MATHML_NAMESPACE.to_owned())
		} else {
			match self.namespaces.last() {
				Some(parent) => parent.clone(),
				None => self.namespace.clone(),
			}
		};
		self.namespaces.push(namespace);
	}

	fn element(&mut self, element: &Element, content: Vec<Vec<H::Node>>) -> Vec<H::Node> {
		let namespace = self.namespaces.pop().flatten();
		let span = trace_span!("Creating element", tag = %element.tag, ?namespace);
		let _enter = span.enter();

		let node = match self.host.create_element(&element.tag, namespace.as_deref()) {
			Some(node) => node,
			None => return Vec::new(),
		};
		for attribute in object::attributes(&element.props) {
			match attribute {
				Attribute::Value { name, value } => self.host.set_attribute(&node, name, &value),
				Attribute::Present { name } => self.host.set_flag(&node, name),
				Attribute::Listener { event, handler } => self.host.add_listener(&node, &event, handler),
			}
		}
		for child in content.iter().flatten() {
			self.host.append_child(&node, child);
		}
		vec![node]
	}

	fn fallback(&mut self, fallback: &str) -> Vec<H::Node> {
		if fallback.is_empty() {
			Vec::new()
		} else {
			vec![self.host.create_text(fallback)]
		}
	}
}
