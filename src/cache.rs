//! Rendered fragments of function-free elements, keyed by a structural signature.

use crate::{
	context,
	node::{write_number, Element, Node, PropValue, TextContent},
};
use core::{fmt::Write as _, time::Duration};
use hashbrown::HashMap;
use std::time::Instant;
use tracing::trace;

#[derive(Debug)]
struct Entry {
	fragment: String,
	hits: u32,
	last_used: u64,
	inserted: Option<Instant>,
}

/// Bounded by entry count (least recently used goes first) and optionally by age.
#[derive(Debug)]
pub struct ElementCache {
	entries: HashMap<String, Entry>,
	capacity: usize,
	ttl: Option<Duration>,
	tick: u64,
}
impl ElementCache {
	#[must_use]
	pub fn new(capacity: usize, ttl: Option<Duration>) -> Self {
		Self {
			entries: HashMap::new(),
			capacity,
			ttl,
			tick: 0,
		}
	}

	pub fn get(&mut self, key: &str) -> Option<&str> {
		let ttl = self.ttl;
		if self.entries.get(key).map_or(false, |entry| is_expired(entry, ttl)) {
			self.entries.remove(key);
			trace!("Dropped expired cache entry.");
			return None;
		}

		self.tick += 1;
		let tick = self.tick;
		let entry = self.entries.get_mut(key)?;
		entry.hits = entry.hits.saturating_add(1);
		entry.last_used = tick;
		Some(&entry.fragment)
	}

	pub fn insert(&mut self, key: String, fragment: String) {
		if self.capacity == 0 {
			return;
		}
		if self.entries.len() >= self.capacity && !self.entries.contains_key(&key) {
			let lru = self.entries.iter().min_by_key(|(_, entry)| entry.last_used).map(|(key, _)| key.clone());
			if let Some(lru) = lru {
				trace!("Evicting least recently used cache entry.");
				self.entries.remove(&lru);
			}
		}

		self.tick += 1;
		self.entries.insert(
			key,
			Entry {
				fragment,
				hits: 0,
				last_used: self.tick,
				inserted: context::now(),
			},
		);
	}

	#[must_use]
	pub fn contains_key(&self, key: &str) -> bool {
		self.entries.contains_key(key)
	}

	/// How often the entry was served since it was inserted.
	#[must_use]
	pub fn hits(&self, key: &str) -> Option<u32> {
		self.entries.get(key).map(|entry| entry.hits)
	}

	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.entries.keys().map(String::as_str)
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn clear(&mut self) {
		self.entries.clear();
	}
}

fn is_expired(entry: &Entry, ttl: Option<Duration>) -> bool {
	match (ttl, entry.inserted, context::now()) {
		(Some(ttl), Some(inserted), Some(now)) => now.duration_since(inserted) > ttl,
		_ => false,
	}
}

/// The cache key of an element: tag, attributes in order, text and the full child structure.
///
/// Only meaningful for function-free elements. Functions are written as opaque markers.
#[must_use]
pub fn signature(element: &Element) -> String {
	let mut signature = String::with_capacity(64);
	write_element(&mut signature, element);
	signature
}

fn write_element(out: &mut String, element: &Element) {
	write_str(out, &element.tag);
	out.push('{');
	for (key, value) in element.props.attributes() {
		write_str(out, key);
		out.push('=');
		match value {
			PropValue::Null => out.push('n'),
			PropValue::Str(str) => {
				out.push('s');
				write_str(out, str);
			}
			PropValue::Number(number) => {
				out.push('#');
				write_number(out, *number).ok();
			}
			PropValue::Bool(bool) => out.push(if *bool { 't' } else { 'f' }),
			PropValue::Style(declarations) => {
				out.push('(');
				for (property, value) in declarations {
					write_str(out, property);
					write_str(out, value);
				}
				out.push(')');
			}
			PropValue::Handler(_) => out.push('!'),
		}
		out.push(',');
	}
	match &element.props.text {
		None => (),
		Some(TextContent::Literal(text)) => {
			out.push_str("text=");
			write_str(out, text);
		}
		Some(TextContent::Computed(_)) => out.push_str("text=!"),
	}
	out.push('}');
	if let Some(children) = element.props.children.as_deref() {
		write_node(out, children);
	}
}

fn write_node(out: &mut String, node: &Node) {
	match node {
		Node::Empty => out.push('_'),
		Node::Text(text) => {
			out.push('t');
			write_str(out, &text.to_string());
		}
		Node::Component(_) => out.push('!'),
		Node::Collection(nodes) => {
			out.push('[');
			for node in nodes {
				write_node(out, node);
			}
			out.push(']');
		}
		Node::Element(element) => {
			out.push('<');
			write_element(out, element);
			out.push('>');
		}
	}
}

/// Length-prefixed, so no separator can be forged by content.
fn write_str(out: &mut String, str: &str) {
	write!(out, "{}:{}", str.len(), str).ok();
}
