//! A minimal in-memory document, for rendering live trees outside of a browser.

use super::Host;
use crate::{
	markup::{self, escape},
	node::{Event, EventHandler},
};
use core::fmt::{self, Debug, Formatter};
use std::{cell::RefCell, rc::Rc};
use tracing::{error, trace};

/// One listener binding as recorded on a [`LiveNode`].
#[derive(Debug, Clone)]
pub struct Listener {
	pub event_type: String,
	pub handler: EventHandler,
}

enum Data {
	Text(String),
	Element {
		tag: String,
		namespace: Option<String>,
		/// [`None`] for boolean attributes.
		attributes: Vec<(String, Option<String>)>,
		listeners: Vec<Listener>,
		children: Vec<LiveNode>,
	},
}

/// A shared handle to an element or text node. Clones refer to the same node.
#[derive(Clone)]
pub struct LiveNode(Rc<RefCell<Data>>);
impl LiveNode {
	fn new(data: Data) -> Self {
		Self(Rc::new(RefCell::new(data)))
	}

	/// A detached element, usable as a render container.
	pub fn element(tag: impl Into<String>) -> Self {
		Self::new(Data::Element {
			tag: tag.into(),
			namespace: None,
			attributes: Vec::new(),
			listeners: Vec::new(),
			children: Vec::new(),
		})
	}

	#[must_use]
	pub fn is_text(&self) -> bool {
		matches!(&*self.0.borrow(), Data::Text(_))
	}

	/// [`None`] for text nodes.
	#[must_use]
	pub fn tag(&self) -> Option<String> {
		match &*self.0.borrow() {
			Data::Text(_) => None,
			Data::Element { tag, .. } => Some(tag.clone()),
		}
	}

	#[must_use]
	pub fn namespace(&self) -> Option<String> {
		match &*self.0.borrow() {
			Data::Text(_) => None,
			Data::Element { namespace, .. } => namespace.clone(),
		}
	}

	/// The concatenated text of this node and all of its descendants.
	#[must_use]
	pub fn text_content(&self) -> String {
		match &*self.0.borrow() {
			Data::Text(text) => text.clone(),
			Data::Element { children, .. } => children.iter().map(Self::text_content).collect(),
		}
	}

	/// Boolean attributes read as the empty string, like in a browser.
	#[must_use]
	pub fn attribute(&self, name: &str) -> Option<String> {
		match &*self.0.borrow() {
			Data::Text(_) => None,
			Data::Element { attributes, .. } => attributes
				.iter()
				.find(|(n, _)| n == name)
				.map(|(_, value)| value.clone().unwrap_or_default()),
		}
	}

	#[must_use]
	pub fn has_attribute(&self, name: &str) -> bool {
		self.attribute(name).is_some()
	}

	/// In the order they were set.
	#[must_use]
	pub fn attributes(&self) -> Vec<(String, String)> {
		match &*self.0.borrow() {
			Data::Text(_) => Vec::new(),
			Data::Element { attributes, .. } => attributes
				.iter()
				.map(|(name, value)| (name.clone(), value.clone().unwrap_or_default()))
				.collect(),
		}
	}

	#[must_use]
	pub fn children(&self) -> Vec<LiveNode> {
		match &*self.0.borrow() {
			Data::Text(_) => Vec::new(),
			Data::Element { children, .. } => children.clone(),
		}
	}

	#[must_use]
	pub fn listeners(&self) -> Vec<Listener> {
		match &*self.0.borrow() {
			Data::Text(_) => Vec::new(),
			Data::Element { listeners, .. } => listeners.clone(),
		}
	}

	/// Calls every handler bound to `event`'s type on this node. Returns how many were called.
	pub fn dispatch(&self, event: &Event) -> usize {
		let handlers: Vec<_> = self
			.listeners()
			.into_iter()
			.filter(|listener| listener.event_type == event.kind())
			.map(|listener| listener.handler)
			.collect();
		trace!("Dispatching {:?} to {} handler(s).", event.kind(), handlers.len());
		for handler in &handlers {
			handler.call(event);
		}
		handlers.len()
	}

	/// Unbinds listeners of one event type, or all of them. Returns how many were removed.
	pub fn remove_listeners(&self, event_type: Option<&str>) -> usize {
		match &mut *self.0.borrow_mut() {
			Data::Text(_) => 0,
			Data::Element { listeners, .. } => {
				let before = listeners.len();
				listeners.retain(|listener| event_type.map_or(false, |event_type| listener.event_type != event_type));
				before - listeners.len()
			}
		}
	}

	/// Serializes this node and its subtree. Listeners don't appear in the output.
	#[must_use]
	pub fn outer_html(&self) -> String {
		let mut html = String::new();
		self.write_html(&mut html);
		html
	}

	fn write_html(&self, html: &mut String) {
		match &*self.0.borrow() {
			Data::Text(text) => html.push_str(&escape(text)),
			Data::Element {
				tag, attributes, children, ..
			} => {
				html.push('<');
				html.push_str(tag);
				for (name, value) in attributes {
					html.push(' ');
					html.push_str(name);
					if let Some(value) = value {
						html.push_str("=\"");
						html.push_str(&escape(value));
						html.push('"');
					}
				}
				html.push('>');
				if !markup::is_void_element(tag) {
					for child in children {
						child.write_html(html);
					}
					html.push_str("</");
					html.push_str(tag);
					html.push('>');
				}
			}
		}
	}

	fn store_attribute(&self, name: &str, value: Option<String>) {
		if !markup::is_valid_name(name) {
			return error!("Invalid attribute name {:?}. Skipping.", name);
		}
		match &mut *self.0.borrow_mut() {
			Data::Text(_) => error!("Tried to set attribute {:?} on a text node.", name),
			Data::Element { attributes, .. } => match attributes.iter_mut().find(|(n, _)| n == name) {
				Some((_, existing)) => *existing = value,
				None => attributes.push((name.to_owned(), value)),
			},
		}
	}

	#[must_use]
	pub fn ptr_eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.0, &other.0)
	}
}
impl Debug for LiveNode {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match &*self.0.borrow() {
			Data::Text(text) => f.debug_tuple("LiveNode::Text").field(text).finish(),
			Data::Element { tag, children, .. } => f
				.debug_struct("LiveNode::Element")
				.field("tag", tag)
				.field("children", &children.len())
				.finish_non_exhaustive(),
		}
	}
}

/// Creates [`LiveNode`]s.
#[derive(Debug, Default)]
pub struct Document {
	created: usize,
}
impl Document {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Number of nodes created through this document.
	#[must_use]
	pub fn created(&self) -> usize {
		self.created
	}
}

impl Host for Document {
	type Node = LiveNode;

	fn create_element(&mut self, tag: &str, namespace: Option<&str>) -> Option<LiveNode> {
		if !markup::is_valid_name(tag) {
			error!("Invalid tag name {:?}.", tag);
			return None;
		}
		self.created += 1;
		Some(LiveNode::new(Data::Element {
			tag: tag.to_owned(),
			namespace: namespace.map(ToOwned::to_owned),
			attributes: Vec::new(),
			listeners: Vec::new(),
			children: Vec::new(),
		}))
	}

	fn create_text(&mut self, text: &str) -> LiveNode {
		self.created += 1;
		LiveNode::new(Data::Text(text.to_owned()))
	}

	fn set_attribute(&mut self, node: &LiveNode, name: &str, value: &str) {
		node.store_attribute(name, Some(value.to_owned()));
	}

	fn set_flag(&mut self, node: &LiveNode, name: &str) {
		node.store_attribute(name, None);
	}

	fn add_listener(&mut self, node: &LiveNode, event: &str, handler: &EventHandler) {
		match &mut *node.0.borrow_mut() {
			Data::Text(_) => error!("Tried to add a {:?} listener to a text node.", event),
			Data::Element { listeners, .. } => listeners.push(Listener {
				event_type: event.to_owned(),
				handler: handler.clone(),
			}),
		}
	}

	fn append_child(&mut self, parent: &LiveNode, child: &LiveNode) {
		if parent.ptr_eq(child) {
			return error!("Tried to append a node to itself.");
		}
		match &mut *parent.0.borrow_mut() {
			Data::Text(_) => error!("Tried to append a child to a text node."),
			Data::Element { children, .. } => children.push(child.clone()),
		}
	}

	fn clear_children(&mut self, parent: &LiveNode) {
		if let Data::Element { children, .. } = &mut *parent.0.borrow_mut() {
			children.clear();
		}
	}
}
