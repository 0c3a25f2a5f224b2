//! Structural queries over [`Node`]s and [`Props`], shared by all backends.

use crate::{
	markup,
	node::{Element, EventHandler, Node, PropValue, Props, TextContent},
};
use core::slice;
use std::borrow::Cow;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
	Empty,
	Text,
	Component,
	Collection,
	Element,
}

#[must_use]
pub fn kind_of(node: &Node) -> NodeKind {
	match node {
		Node::Empty => NodeKind::Empty,
		Node::Text(_) => NodeKind::Text,
		Node::Component(_) => NodeKind::Component,
		Node::Collection(_) => NodeKind::Collection,
		Node::Element(_) => NodeKind::Element,
	}
}

/// Whether an element with these props has anything to put between its tags.
#[must_use]
pub fn has_content(props: &Props) -> bool {
	props.text.is_some() || props.children.as_deref().map_or(false, |children| !children.is_empty())
}

/// The children of an element as a sequence, whether it has none, one or a collection.
#[must_use]
pub fn child_nodes(props: &Props) -> &[Node] {
	match props.children.as_deref() {
		None => &[],
		Some(Node::Collection(nodes)) => nodes,
		Some(node) => slice::from_ref(node),
	}
}

/// One attribute after applying the props-to-attribute mapping.
#[derive(Debug, Clone, PartialEq)]
pub enum Attribute<'a> {
	/// `name="value"`
	Value { name: &'a str, value: Cow<'a, str> },
	/// A boolean attribute that is set.
	Present { name: &'a str },
	Listener { event: String, handler: &'a EventHandler },
}

/// Maps props to the attributes both the markup and the DOM backends materialize, in declaration order.
///
/// `className` becomes `class`, `false` and `null` are skipped and handlers only survive under `on*` keys.
pub fn attributes(props: &Props) -> impl Iterator<Item = Attribute<'_>> {
	props.attributes().iter().filter_map(|(key, value)| {
		let name = if key == "className" { "class" } else { key.as_str() };
		match value {
			PropValue::Null | PropValue::Bool(false) => None,
			PropValue::Bool(true) => Some(Attribute::Present { name }),
			PropValue::Str(str) => Some(Attribute::Value { name, value: Cow::Borrowed(str) }),
			PropValue::Number(number) => {
				let mut value = String::new();
				crate::node::write_number(&mut value, *number).ok()?;
				Some(Attribute::Value { name, value: Cow::Owned(value) })
			}
			PropValue::Style(declarations) => Some(Attribute::Value {
				name,
				value: Cow::Owned(style_text(declarations)),
			}),
			PropValue::Handler(handler) => match event_type(key) {
				Some(event) => Some(Attribute::Listener { event, handler }),
				None => {
					trace!("Dropping handler bound to non-event key {:?}.", key);
					None
				}
			},
		}
	})
}

/// `onClick` → `click`.
#[must_use]
pub fn event_type(key: &str) -> Option<String> {
	match key.strip_prefix("on") {
		Some(event) if !event.is_empty() => Some(event.to_ascii_lowercase()),
		_ => None,
	}
}

fn style_text(declarations: &[(String, String)]) -> String {
	let mut text = String::new();
	for (property, value) in declarations {
		if !text.is_empty() {
			text.push(';');
		}
		for c in property.chars() {
			if c.is_ascii_uppercase() {
				text.push('-');
				text.push(c.to_ascii_lowercase());
			} else {
				text.push(c);
			}
		}
		text.push(':');
		text.push_str(value);
	}
	text
}

/// Whether a function value appears anywhere in the element's props or below it.
#[must_use]
pub fn contains_function(element: &Element) -> bool {
	matches!(element.props.text, Some(TextContent::Computed(_)))
		|| element.props.attributes().iter().any(|(_, value)| matches!(value, PropValue::Handler(_)))
		|| element.props.children.as_deref().map_or(false, node_contains_function)
}

fn node_contains_function(node: &Node) -> bool {
	match node {
		Node::Empty | Node::Text(_) => false,
		Node::Component(_) => true,
		Node::Collection(nodes) => nodes.iter().any(node_contains_function),
		Node::Element(element) => contains_function(element),
	}
}

/// How many depth levels rendering the element occupies, counting itself.
///
/// Matches the depth guard: element children add a level, collections don't,
/// and elements whose content is never walked (void or invalid tags) count as one.
#[must_use]
pub fn height(element: &Element) -> usize {
	if !markup::is_valid_name(&element.tag) || markup::is_void_element(&element.tag) {
		return 1;
	}
	1 + child_nodes(&element.props).iter().map(node_height).max().unwrap_or(0)
}

fn node_height(node: &Node) -> usize {
	match node {
		Node::Empty | Node::Text(_) | Node::Component(_) => 1,
		Node::Collection(nodes) => nodes.iter().map(node_height).max().unwrap_or(1),
		Node::Element(element) => height(element),
	}
}

/// Own keys plus the recursive complexity of the content.
///
/// Counting stops early once `limit` is exceeded, which also bounds the recursion.
#[must_use]
pub fn complexity(element: &Element, limit: usize) -> usize {
	let mut total = element.props.len();
	if let Some(children) = element.props.children.as_deref() {
		total = node_complexity(children, total, limit);
	}
	total
}

fn node_complexity(node: &Node, mut total: usize, limit: usize) -> usize {
	if total > limit {
		return total;
	}
	match node {
		Node::Empty | Node::Component(_) => total,
		Node::Text(_) => total + 1,
		Node::Collection(nodes) => {
			total += 1;
			for node in nodes {
				total = node_complexity(node, total, limit);
				if total > limit {
					break;
				}
			}
			total
		}
		Node::Element(element) => total + complexity(element, limit.saturating_sub(total)),
	}
}
