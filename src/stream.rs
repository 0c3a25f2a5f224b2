//! Streaming markup backend.

use crate::{
	config::Encoding,
	context::RenderContext,
	error::{ProducerError, RenderError},
	markup::{self, escape, Minifier},
	node::{Component, Element, Node},
	object,
	string::{write_close_tag, write_open_tag, MarkupBackend, StringRenderer},
};
use core::{iter::FusedIterator, mem};
use std::borrow::Cow;
use tracing::{error, trace, trace_span, warn};

enum NodeRef<'a> {
	Borrowed(&'a Node),
	Owned(Node),
}

enum Frame<'a> {
	Node(NodeRef<'a>, usize),
	Close(Cow<'a, str>),
}

/// Lazily rendered markup chunks.
///
/// Each call to [`next`](`Iterator::next`) walks only as far as needed to fill one chunk, which is the point where the host regains control.
/// A chunk is cut once it reaches [`chunk_size`](`crate::RendererConfig::chunk_size`) bytes
/// or [`yield_threshold`](`crate::RendererConfig::yield_threshold`) elements were opened in it, but never inside a tag or text node.
///
/// With [`Encoding::Utf8`], the concatenated chunks equal the output of [`StringRenderer::render`].
/// The stream ends after the first error.
pub struct RenderStream<'a> {
	renderer: &'a mut StringRenderer,
	context: RenderContext,
	stack: Vec<Frame<'a>>,
	buffer: String,
	capacity: usize,
	opened: usize,
	minifier: Option<Minifier>,
	encoding: Encoding,
	finished: bool,
}
impl<'a> RenderStream<'a> {
	pub(crate) fn new(renderer: &'a mut StringRenderer, node: &'a Node) -> Self {
		let config = renderer.engine.config();
		let capacity = config.buffer_size.min(config.chunk_size.saturating_mul(2));
		Self {
			context: RenderContext::new(config.enable_monitoring),
			stack: vec![Frame::Node(NodeRef::Borrowed(node), 1)],
			buffer: String::with_capacity(capacity),
			capacity,
			opened: 0,
			minifier: if config.minify { Some(Minifier::new()) } else { None },
			encoding: config.encoding,
			finished: false,
			renderer,
		}
	}

	fn step(&mut self, node: NodeRef<'a>, depth: usize) -> Result<(), RenderError> {
		self.renderer.engine.guard_depth(depth)?;
		match node {
			NodeRef::Borrowed(node) => self.step_borrowed(node, depth),
			NodeRef::Owned(node) => self.step_owned(node, depth),
		}
	}

	fn step_borrowed(&mut self, node: &'a Node, depth: usize) -> Result<(), RenderError> {
		match node {
			Node::Empty => Ok(()),
			Node::Text(text) => {
				self.buffer.push_str(&escape(&text.to_string()));
				Ok(())
			}
			Node::Component(component) => self.evaluate(component, depth),
			Node::Collection(nodes) => {
				self.stack.extend(nodes.iter().rev().map(|node| Frame::Node(NodeRef::Borrowed(node), depth)));
				Ok(())
			}
			Node::Element(element) => {
				if self.renderer.engine.is_cacheable(element) {
					return self.render_whole(node, depth);
				}
				if self.open(element)? {
					self.stack.push(Frame::Close(Cow::Borrowed(&element.tag)));
					self.stack.extend(
						object::child_nodes(&element.props)
							.iter()
							.rev()
							.map(|child| Frame::Node(NodeRef::Borrowed(child), depth + 1)),
					);
				}
				Ok(())
			}
		}
	}

	fn step_owned(&mut self, node: Node, depth: usize) -> Result<(), RenderError> {
		match node {
			Node::Empty => Ok(()),
			Node::Text(text) => {
				self.buffer.push_str(&escape(&text.to_string()));
				Ok(())
			}
			Node::Component(component) => self.evaluate(&component, depth),
			Node::Collection(nodes) => {
				self.stack.extend(nodes.into_iter().rev().map(|node| Frame::Node(NodeRef::Owned(node), depth)));
				Ok(())
			}
			Node::Element(element) => {
				if self.renderer.engine.is_cacheable(&element) {
					return self.render_whole(&Node::Element(element), depth);
				}
				if self.open(&element)? {
					let Element { tag, mut props } = element;
					self.stack.push(Frame::Close(Cow::Owned(tag)));
					match props.children.take().map(|children| *children) {
						None => (),
						Some(Node::Collection(nodes)) => self
							.stack
							.extend(nodes.into_iter().rev().map(|child| Frame::Node(NodeRef::Owned(child), depth + 1))),
						Some(child) => self.stack.push(Frame::Node(NodeRef::Owned(child), depth + 1)),
					}
				}
				Ok(())
			}
		}
	}

	/// Writes the opening tag and `text` directive. Returns whether children and a closing tag follow.
	fn open(&mut self, element: &Element) -> Result<bool, RenderError> {
		let span = trace_span!("Opening element", tag = %element.tag);
		let _enter = span.enter();

		if !markup::is_valid_name(&element.tag) {
			error!("Invalid tag name {:?}. Rendering nothing instead.", element.tag);
			return Ok(false);
		}
		self.context.count_element();
		self.opened += 1;

		let hydrate = self.renderer.engine.config().enable_hydration;
		write_open_tag(&mut self.buffer, element, &mut self.renderer.actions, hydrate);
		if markup::is_void_element(&element.tag) {
			if object::has_content(&element.props) {
				warn!("Ignoring content of void element <{}>.", element.tag);
			}
			return Ok(false);
		}
		if let Some(text) = &element.props.text {
			match self.renderer.engine.resolve_text(&self.context, text) {
				Ok(text) => self.buffer.push_str(&escape(&text)),
				Err(producer_error) => self.recover(producer_error)?,
			}
		}
		Ok(true)
	}

	/// Renders a cacheable subtree in one go, through the element cache.
	fn render_whole(&mut self, node: &Node, depth: usize) -> Result<(), RenderError> {
		self.opened += 1;
		let StringRenderer { engine, actions } = &mut *self.renderer;
		let mut backend = MarkupBackend {
			actions,
			hydrate: engine.config().enable_hydration,
		};
		let html = engine.render_component(&mut backend, &self.context, node, depth)?;
		self.buffer.push_str(&html);
		Ok(())
	}

	fn evaluate(&mut self, component: &Component, depth: usize) -> Result<(), RenderError> {
		match self.renderer.engine.evaluate(&self.context, component, depth) {
			Ok((node, depth)) => {
				self.stack.push(Frame::Node(NodeRef::Owned(node), depth + 1));
				Ok(())
			}
			Err(RenderError::Producer(producer_error)) => self.recover(producer_error),
			Err(error) => Err(error),
		}
	}

	fn recover(&mut self, producer_error: ProducerError) -> Result<(), RenderError> {
		let config = self.renderer.engine.config();
		if config.throw_on_error {
			return Err(producer_error.into());
		}
		error!("Component failed, substituting the fallback: {}", producer_error);
		self.buffer.push_str(&config.error_fallback);
		Ok(())
	}

	fn take_chunk(&mut self, last: bool) -> Option<String> {
		self.opened = 0;
		let raw = mem::replace(&mut self.buffer, String::with_capacity(if last { 0 } else { self.capacity }));
		let chunk = match &mut self.minifier {
			None => raw,
			Some(minifier) => {
				let mut minified = String::with_capacity(raw.len());
				minifier.feed(&raw, &mut minified);
				if last {
					minifier.finish(&mut minified);
				}
				minified
			}
		};

		if chunk.is_empty() {
			None
		} else {
			trace!("Yielding chunk of {} bytes.", chunk.len());
			Some(self.encoding.encode(chunk))
		}
	}

	fn end(&mut self) {
		self.finished = true;
		self.stack.clear();
		self.renderer.engine.finish(&self.context);
	}
}

impl Iterator for RenderStream<'_> {
	type Item = Result<String, RenderError>;

	fn next(&mut self) -> Option<Self::Item> {
		if self.finished {
			return None;
		}

		let (chunk_size, yield_threshold) = {
			let config = self.renderer.engine.config();
			(config.chunk_size, config.yield_threshold)
		};
		while let Some(frame) = self.stack.pop() {
			let result = match frame {
				Frame::Node(node, depth) => self.step(node, depth),
				Frame::Close(tag) => {
					write_close_tag(&mut self.buffer, &tag);
					Ok(())
				}
			};
			if let Err(error) = result {
				self.end();
				return Some(Err(error));
			}

			if self.buffer.len() >= chunk_size || self.opened >= yield_threshold {
				if let Some(chunk) = self.take_chunk(false) {
					return Some(Ok(chunk));
				}
			}
		}

		self.end();
		self.take_chunk(true).map(Ok)
	}
}
impl FusedIterator for RenderStream<'_> {}
