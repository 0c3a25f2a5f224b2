//! [`Host`] implementation over the browser DOM.

use super::Host;
use crate::node::{Event, EventHandler};
use js_sys::Function;
use tracing::{error, trace, warn};
use wasm_bindgen::{closure::Closure, JsCast};

struct Binding {
	target: web_sys::EventTarget,
	event_type: String,
	closure: Closure<dyn Fn(web_sys::Event)>,
}

/// Creates nodes in a [`web_sys::Document`].
///
/// Listener closures are owned by the host and stay alive until they are [removed](`WebHost::remove_listeners`)
/// or the host is dropped, which unbinds them.
pub struct WebHost {
	document: web_sys::Document,
	bindings: Vec<Binding>,
}
impl WebHost {
	#[must_use]
	pub fn new(document: web_sys::Document) -> Self {
		Self {
			document,
			bindings: Vec::new(),
		}
	}

	/// Uses the current window's document, if there is one.
	#[must_use]
	pub fn from_window() -> Option<Self> {
		web_sys::window().and_then(|window| window.document()).map(Self::new)
	}

	#[must_use]
	pub fn document(&self) -> &web_sys::Document {
		&self.document
	}

	/// Number of listeners currently bound through this host.
	#[must_use]
	pub fn listener_count(&self) -> usize {
		self.bindings.len()
	}

	/// Unbinds this host's listeners from `node`, either of one event type or all of them. Returns how many were removed.
	pub fn remove_listeners(&mut self, node: &web_sys::Node, event_type: Option<&str>) -> usize {
		let target: &web_sys::EventTarget = node.as_ref();
		let before = self.bindings.len();
		self.bindings.retain(|binding| {
			let matches = binding.target == *target && event_type.map_or(true, |event_type| binding.event_type == event_type);
			if matches {
				unbind(binding);
			}
			!matches
		});
		before - self.bindings.len()
	}
}

impl core::fmt::Debug for WebHost {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		f.debug_struct("WebHost")
			.field("document", &self.document)
			.field("bindings", &self.bindings.len())
			.finish()
	}
}

fn unbind(binding: &Binding) {
	if let Err(error) = binding
		.target
		.remove_event_listener_with_callback(&binding.event_type, binding.closure.as_ref().unchecked_ref::<Function>())
	{
		warn!("Could not remove {:?} listener: {:?}", binding.event_type, error);
	}
}

impl Drop for WebHost {
	fn drop(&mut self) {
		for binding in self.bindings.drain(..) {
			unbind(&binding);
		}
	}
}

impl Host for WebHost {
	type Node = web_sys::Node;

	fn create_element(&mut self, tag: &str, namespace: Option<&str>) -> Option<web_sys::Node> {
		let element = match namespace {
			Some(namespace) => self.document.create_element_ns(Some(namespace), tag),
			None => self.document.create_element(tag),
		};
		match element {
			Ok(element) => Some(element.into()),
			Err(error) => {
				error!("Could not create element {:?}: {:?}", tag, error);
				None
			}
		}
	}

	fn create_text(&mut self, text: &str) -> web_sys::Node {
		self.document.create_text_node(text).into()
	}

	fn set_attribute(&mut self, node: &web_sys::Node, name: &str, value: &str) {
		let element = match node.dyn_ref::<web_sys::Element>() {
			Some(element) => element,
			None => return error!("Expected element to set attribute {:?} on, but found {:?}.", name, node),
		};
		if let Err(error) = element.set_attribute(name, value) {
			error!("Could not add attribute {:?}={:?}: {:?}", name, value, error);
		}
	}

	fn add_listener(&mut self, node: &web_sys::Node, event: &str, handler: &EventHandler) {
		let handler = handler.clone();
		let closure = Closure::wrap(Box::new(move |event: web_sys::Event| handler.call(&Event::new(event.type_()))) as Box<dyn Fn(web_sys::Event)>);
		let target: &web_sys::EventTarget = node.as_ref();
		if let Err(error) = target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref::<Function>()) {
			return error!("Could not add {:?} listener: {:?}", event, error);
		}
		trace!("Bound {:?} listener.", event);
		self.bindings.push(Binding {
			target: target.clone(),
			event_type: event.to_owned(),
			closure,
		});
	}

	fn append_child(&mut self, parent: &web_sys::Node, child: &web_sys::Node) {
		if let Err(error) = parent.append_child(child) {
			error!("Failed to append node: {:?}", error);
		}
	}

	fn clear_children(&mut self, parent: &web_sys::Node) {
		parent.set_text_content(None);
	}
}
