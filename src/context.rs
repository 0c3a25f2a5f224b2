//! Per-render state: metrics and the [`Scope`] handed to context providers.

use crate::{
	config::RendererConfig,
	engine::Engine,
	error::RenderError,
	node::{Element, Node},
};
use core::{cell::Cell, time::Duration};
use std::{cell::RefCell, time::Instant};
use tracing::error;

/// `None` where there is no monotonic clock.
pub(crate) fn now() -> Option<Instant> {
	if cfg!(target_arch = "wasm32") {
		None
	} else {
		Some(Instant::now())
	}
}

/// Read-only snapshot of one render.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metrics {
	pub elements_processed: u64,
	pub cache_hits: u64,
	pub cache_misses: u64,
	pub producer_errors: u64,
	/// Only recorded with `enable_monitoring`.
	pub started_at: Option<Instant>,
	pub finished_at: Option<Instant>,
}
impl Metrics {
	#[must_use]
	pub fn elapsed(&self) -> Option<Duration> {
		Some(self.finished_at?.duration_since(self.started_at?))
	}

	/// Elements per second.
	#[must_use]
	#[allow(clippy::cast_precision_loss)]
	pub fn throughput(&self) -> Option<f64> {
		let seconds = self.elapsed()?.as_secs_f64();
		if seconds > 0.0 {
			Some(self.elements_processed as f64 / seconds)
		} else {
			None
		}
	}
}

/// Created fresh for each top-level render and discarded after it.
#[derive(Debug, Default)]
pub struct RenderContext {
	monitoring: bool,
	elements_processed: Cell<u64>,
	cache_hits: Cell<u64>,
	cache_misses: Cell<u64>,
	producer_errors: Cell<u64>,
	started_at: Option<Instant>,
	failure: RefCell<Option<RenderError>>,
}
impl RenderContext {
	#[must_use]
	pub fn new(monitoring: bool) -> Self {
		Self {
			monitoring,
			started_at: if monitoring { now() } else { None },
			..Self::default()
		}
	}

	pub(crate) fn count_element(&self) {
		self.elements_processed.set(self.elements_processed.get() + 1);
	}

	pub(crate) fn count_cache_hit(&self) {
		self.cache_hits.set(self.cache_hits.get() + 1);
	}

	pub(crate) fn count_cache_miss(&self) {
		self.cache_misses.set(self.cache_misses.get() + 1);
	}

	pub(crate) fn count_producer_error(&self) {
		self.producer_errors.set(self.producer_errors.get() + 1);
	}

	/// Records an error that has to abort the render but was raised where it can't propagate directly.
	/// The first one wins.
	pub(crate) fn fail(&self, error: RenderError) {
		let mut failure = self.failure.borrow_mut();
		if failure.is_none() {
			*failure = Some(error);
		}
	}

	pub(crate) fn has_failed(&self) -> bool {
		self.failure.borrow().is_some()
	}

	pub(crate) fn take_failure(&self) -> Option<RenderError> {
		self.failure.borrow_mut().take()
	}

	#[must_use]
	pub fn metrics(&self) -> Metrics {
		Metrics {
			elements_processed: self.elements_processed.get(),
			cache_hits: self.cache_hits.get(),
			cache_misses: self.cache_misses.get(),
			producer_errors: self.producer_errors.get(),
			started_at: self.started_at,
			finished_at: if self.monitoring { now() } else { None },
		}
	}
}

/// Handed to [context providers](`crate::Component::Provider`).
///
/// Nested content resolved through a scope is evaluated within the current render,
/// under the same depth guard and failure handling as the rest of the tree.
#[derive(Debug, Clone, Copy)]
pub struct Scope<'a> {
	engine: &'a Engine,
	context: &'a RenderContext,
	depth: usize,
}
impl<'a> Scope<'a> {
	pub(crate) fn new(engine: &'a Engine, context: &'a RenderContext, depth: usize) -> Self {
		Self { engine, context, depth }
	}

	/// Depth of the provider itself.
	#[must_use]
	pub fn depth(&self) -> usize {
		self.depth
	}

	#[must_use]
	pub fn config(&self) -> &'a RendererConfig {
		self.engine.config()
	}

	/// Evaluates every function node in `node`, returning a function-free tree.
	///
	/// Failed producers resolve to [`Node::Empty`]. Fatal errors abort the surrounding render once the provider returns.
	#[must_use]
	pub fn resolve(&self, node: Node) -> Node {
		self.resolve_at(node, self.depth + 1)
	}

	fn resolve_at(&self, node: Node, depth: usize) -> Node {
		if self.context.has_failed() {
			return Node::Empty;
		}
		if let Err(error) = self.engine.guard_depth(depth) {
			self.context.fail(error);
			return Node::Empty;
		}

		match node {
			Node::Empty | Node::Text(_) => node,
			Node::Component(component) => match self.engine.evaluate(self.context, &component, depth) {
				Ok((node, depth)) => self.resolve_at(node, depth + 1),
				Err(RenderError::Producer(producer_error)) => {
					if self.config().throw_on_error {
						self.context.fail(producer_error.into());
					} else {
						error!("Component failed while resolving scoped content: {}", producer_error);
					}
					Node::Empty
				}
				Err(error) => {
					self.context.fail(error);
					Node::Empty
				}
			},
			Node::Collection(nodes) => Node::Collection(nodes.into_iter().map(|node| self.resolve_at(node, depth)).collect()),
			Node::Element(Element { tag, mut props }) => {
				if let Some(children) = props.children.take() {
					props.children = Some(Box::new(self.resolve_at(*children, depth + 1)));
				}
				Node::Element(Element { tag, props })
			}
		}
	}
}
