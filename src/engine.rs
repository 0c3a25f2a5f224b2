//! The tree walk shared by all backends.
//!
//! [`Engine::render_component`] classifies each node, consults the cache, evaluates components and recurses into children,
//! then asks the [`Backend`] to materialize the result.

use crate::{
	cache::{self, ElementCache},
	config::RendererConfig,
	context::{Metrics, RenderContext, Scope},
	error::{ConfigError, ProducerError, RenderError},
	markup,
	node::{Component, Element, Node, TextContent},
	object,
};
use core::any::Any;
use std::{
	borrow::Cow,
	panic::{self, AssertUnwindSafe},
};
use tracing::{error, instrument, trace, trace_span, warn};

/// Materializes output units for the engine's walk.
pub trait Backend {
	type Unit;

	/// Whether units can be stored in and restored from the engine's fragment cache.
	const CACHES_FRAGMENTS: bool = false;

	fn empty(&mut self) -> Self::Unit;
	fn text(&mut self, text: &str) -> Self::Unit;
	fn fragment(&mut self, units: Vec<Self::Unit>) -> Self::Unit;

	/// Called before the element's content is rendered.
	fn enter(&mut self, _element: &Element) {}

	/// Builds the element from its rendered content: the `text` directive (if any) followed by the children.
	/// Void elements always receive empty content.
	fn element(&mut self, element: &Element, content: Vec<Self::Unit>) -> Self::Unit;

	/// Stands in for a subtree whose producer failed.
	fn fallback(&mut self, fallback: &str) -> Self::Unit;

	fn from_cache(&mut self, _fragment: &str) -> Option<Self::Unit> {
		None
	}

	fn to_cache(&self, _unit: &Self::Unit) -> Option<String> {
		None
	}
}

/// Configuration, element cache and metrics of one renderer.
#[derive(Debug)]
pub struct Engine {
	config: RendererConfig,
	cache: ElementCache,
	metrics: Metrics,
}
impl Engine {
	/// # Errors
	///
	/// Iff `config` fails [validation](`RendererConfig::validate`).
	#[instrument(skip(config))]
	pub fn new(config: RendererConfig) -> Result<Self, ConfigError> {
		config.validate()?;
		Ok(Self {
			cache: ElementCache::new(config.cache_size, config.cache_ttl),
			config,
			metrics: Metrics::default(),
		})
	}

	#[must_use]
	pub fn config(&self) -> &RendererConfig {
		&self.config
	}

	#[must_use]
	pub fn cache(&self) -> &ElementCache {
		&self.cache
	}

	pub fn clear_cache(&mut self) {
		self.cache.clear();
	}

	/// Metrics of the last completed render.
	#[must_use]
	pub fn metrics(&self) -> &Metrics {
		&self.metrics
	}

	pub(crate) fn finish(&mut self, context: &RenderContext) {
		self.metrics = context.metrics();
		trace!(
			elements = self.metrics.elements_processed,
			cache_hits = self.metrics.cache_hits,
			producer_errors = self.metrics.producer_errors,
			"Render finished."
		);
	}

	/// # Errors
	///
	/// Iff `depth` exceeds [`RendererConfig::max_depth`].
	pub fn guard_depth(&self, depth: usize) -> Result<(), RenderError> {
		if depth > self.config.max_depth {
			error!("Depth limit reached");
			Err(RenderError::DepthExceeded {
				depth,
				max_depth: self.config.max_depth,
			})
		} else {
			Ok(())
		}
	}

	/// Caching is enabled, the element is not too complex and it contains no functions anywhere.
	#[must_use]
	pub fn is_cacheable(&self, element: &Element) -> bool {
		self.config.enable_cache
			&& self.config.cache_size > 0
			&& object::complexity(element, self.config.cache_complexity_limit) <= self.config.cache_complexity_limit
			&& !object::contains_function(element)
	}

	/// Renders `node` as a complete tree, starting at depth 1.
	///
	/// # Errors
	///
	/// [`RenderError::DepthExceeded`], and [`RenderError::Producer`] iff [`RendererConfig::throw_on_error`] is set.
	#[instrument(skip(self, backend, node))]
	pub fn render_root<B: Backend>(&mut self, backend: &mut B, node: &Node) -> Result<B::Unit, RenderError> {
		let context = RenderContext::new(self.config.enable_monitoring);
		let result = self.render_component(backend, &context, node, 1);
		self.finish(&context);
		result
	}

	/// # Errors
	///
	/// See [`Engine::render_root`].
	pub fn render_component<B: Backend>(&mut self, backend: &mut B, context: &RenderContext, node: &Node, depth: usize) -> Result<B::Unit, RenderError> {
		self.guard_depth(depth)?;

		match node {
			Node::Empty => Ok(backend.empty()),
			Node::Text(text) => {
				let text = text.to_string();
				if cfg!(feature = "dangerous-logging") {
					trace!(text = %text, "Rendering text node.");
				} else {
					trace!(len = text.len(), "Rendering text node.");
				}
				Ok(backend.text(&text))
			}
			Node::Component(component) => {
				let span = trace_span!("Rendering component", depth);
				let _enter = span.enter();
				match self.evaluate(context, component, depth) {
					Ok((node, depth)) => self.render_component(backend, context, &node, depth + 1),
					Err(RenderError::Producer(producer_error)) => self.recover(backend, producer_error),
					Err(error) => Err(error),
				}
			}
			Node::Collection(nodes) => {
				let span = trace_span!("Rendering collection", "nodes.len()" = nodes.len());
				let _enter = span.enter();
				let units = nodes
					.iter()
					.map(|node| self.render_component(backend, context, node, depth))
					.collect::<Result<Vec<_>, _>>()?;
				Ok(backend.fragment(units))
			}
			Node::Element(element) => self.render_element(backend, context, element, depth),
		}
	}

	fn render_element<B: Backend>(&mut self, backend: &mut B, context: &RenderContext, element: &Element, depth: usize) -> Result<B::Unit, RenderError> {
		let span = trace_span!("Rendering element", tag = %element.tag, depth);
		let _enter = span.enter();

		if !markup::is_valid_name(&element.tag) {
			error!("Invalid tag name {:?}. Rendering nothing instead.", element.tag);
			return Ok(backend.empty());
		}
		context.count_element();

		let key = if B::CACHES_FRAGMENTS && self.is_cacheable(element) {
			let key = cache::signature(element);
			// A fragment cached higher up the tree may not fit here. The fresh walk reports that.
			if depth + object::height(element) - 1 <= self.config.max_depth {
				if let Some(unit) = self.cache.get(&key).and_then(|fragment| backend.from_cache(fragment)) {
					trace!("Cache hit.");
					context.count_cache_hit();
					return Ok(unit);
				}
			}
			context.count_cache_miss();
			Some(key)
		} else {
			None
		};

		backend.enter(element);
		let content = if markup::is_void_element(&element.tag) {
			if object::has_content(&element.props) {
				warn!("Ignoring content of void element <{}>.", element.tag);
			}
			Vec::new()
		} else {
			let mut content = Vec::new();
			if let Some(text) = &element.props.text {
				match self.resolve_text(context, text) {
					Ok(text) => content.push(backend.text(&text)),
					Err(producer_error) => content.push(self.recover(backend, producer_error)?),
				}
			}
			for child in object::child_nodes(&element.props) {
				content.push(self.render_component(backend, context, child, depth + 1)?);
			}
			content
		};
		let unit = backend.element(element, content);

		if let Some(key) = key {
			if let Some(fragment) = backend.to_cache(&unit) {
				self.cache.insert(key, fragment);
			}
		}
		Ok(unit)
	}

	/// Applies the failure policy to an error already counted where it occurred.
	fn recover<B: Backend>(&self, backend: &mut B, producer_error: ProducerError) -> Result<B::Unit, RenderError> {
		if self.config.throw_on_error {
			return Err(producer_error.into());
		}
		error!("Component failed, substituting the fallback: {}", producer_error);
		Ok(backend.fallback(&self.config.error_fallback))
	}

	/// Calls `component` and any component it returns, until a non-function node comes out.
	///
	/// Returns that node together with the depth of the last evaluated component.
	///
	/// # Errors
	///
	/// [`RenderError::Producer`] if a producer fails or panics, [`RenderError::DepthExceeded`] if the chain is too long.
	pub fn evaluate(&self, context: &RenderContext, component: &Component, mut depth: usize) -> Result<(Node, usize), RenderError> {
		let mut node = self.invoke(context, component, depth)?;
		loop {
			match node {
				Node::Component(next) => {
					depth += 1;
					self.guard_depth(depth)?;
					node = self.invoke(context, &next, depth)?;
				}
				node => return Ok((node, depth)),
			}
		}
	}

	fn invoke(&self, context: &RenderContext, component: &Component, depth: usize) -> Result<Node, RenderError> {
		let result = match component {
			Component::Producer(producer) => panic::catch_unwind(AssertUnwindSafe(|| producer())),
			Component::Provider(provider) => {
				let scope = Scope::new(self, context, depth);
				panic::catch_unwind(AssertUnwindSafe(|| provider(&scope)))
			}
		};

		// Raised (and counted) inside a provider's scope.
		if let Some(failure) = context.take_failure() {
			return Err(failure);
		}
		let producer_error = match result {
			Ok(Ok(node)) => return Ok(node),
			Ok(Err(producer_error)) => producer_error,
			Err(payload) => ProducerError::new(panic_message(payload.as_ref())),
		};
		context.count_producer_error();
		Err(producer_error.into())
	}

	/// Computes an element's `text` directive, containing panics like [`Engine::evaluate`] does for producers.
	///
	/// # Errors
	///
	/// Iff a computed text panics. The failure is counted already.
	pub fn resolve_text<'t>(&self, context: &RenderContext, text: &'t TextContent) -> Result<Cow<'t, str>, ProducerError> {
		match text {
			TextContent::Literal(text) => Ok(Cow::Borrowed(text)),
			TextContent::Computed(compute) => panic::catch_unwind(AssertUnwindSafe(|| compute())).map(Cow::Owned).map_err(|payload| {
				context.count_producer_error();
				ProducerError::new(panic_message(payload.as_ref()))
			}),
		}
	}
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
	if let Some(message) = payload.downcast_ref::<&str>() {
		format!("panicked: {}", message)
	} else if let Some(message) = payload.downcast_ref::<String>() {
		format!("panicked: {}", message)
	} else {
		"panicked".to_owned()
	}
}
