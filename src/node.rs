//! The node tree accepted by every renderer.
//!
//! A [`Node`] is a closed sum type. Function nodes are explicitly tagged as either plain [producers](`Component::Producer`)
//! or [context providers](`Component::Provider`) when they are constructed, so renderers never have to guess.

use crate::{context::Scope, error::ProducerError};
use core::fmt::{self, Debug, Display, Formatter};
use std::{borrow::Cow, rc::Rc};

#[derive(Debug, Clone, Default)]
pub enum Node {
	#[default]
	Empty,
	Text(TextValue),
	Component(Component),
	/// A fragment, rendered without an enclosing tag.
	Collection(Vec<Node>),
	Element(Element),
}
impl Node {
	pub fn text(text: impl Into<TextValue>) -> Self {
		Self::Text(text.into())
	}

	/// A plain producer that is evaluated when the renderer reaches it.
	pub fn component(producer: impl 'static + Fn() -> Node) -> Self {
		Self::Component(Component::Producer(Rc::new(move || Ok(producer()))))
	}

	/// A producer that may fail. Failures are contained to this subtree.
	pub fn try_component<E: Display>(producer: impl 'static + Fn() -> Result<Node, E>) -> Self {
		Self::Component(Component::Producer(Rc::new(move || producer().map_err(ProducerError::new))))
	}

	/// A context provider, which receives a [`Scope`] to resolve nested content with.
	pub fn provider(provider: impl 'static + Fn(&Scope<'_>) -> Node) -> Self {
		Self::Component(Component::Provider(Rc::new(move |scope| Ok(provider(scope)))))
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		match self {
			Self::Empty => true,
			Self::Collection(nodes) => nodes.iter().all(Self::is_empty),
			Self::Text(_) | Self::Component(_) | Self::Element(_) => false,
		}
	}
}

/// Scalar text content. Rendered escaped wherever it ends up in markup.
#[derive(Debug, Clone, PartialEq)]
pub enum TextValue {
	Str(String),
	Number(f64),
	Bool(bool),
}
impl Display for TextValue {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			Self::Str(str) => f.write_str(str),
			Self::Number(number) => write_number(f, *number),
			Self::Bool(bool) => write!(f, "{}", bool),
		}
	}
}

/// Writes numbers the way they appear in markup: integral values without a fractional part.
#[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
pub(crate) fn write_number(f: &mut impl fmt::Write, number: f64) -> fmt::Result {
	if number.is_nan() {
		f.write_str("NaN")
	} else if number.is_infinite() {
		f.write_str(if number > 0.0 { "Infinity" } else { "-Infinity" })
	} else if number.fract() == 0.0 && number.abs() < 1e15 {
		write!(f, "{}", number as i64)
	} else {
		write!(f, "{}", number)
	}
}

pub type ProducerFn = dyn Fn() -> Result<Node, ProducerError>;
pub type ProviderFn = dyn Fn(&Scope<'_>) -> Result<Node, ProducerError>;

#[derive(Clone)]
pub enum Component {
	Producer(Rc<ProducerFn>),
	Provider(Rc<ProviderFn>),
}
impl Debug for Component {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			Self::Producer(_) => f.write_str("Component::Producer(..)"),
			Self::Provider(_) => f.write_str("Component::Provider(..)"),
		}
	}
}

/// Passed to event handlers when their event fires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
	kind: String,
}
impl Event {
	pub fn new(kind: impl Into<String>) -> Self {
		Self { kind: kind.into() }
	}

	#[must_use]
	pub fn kind(&self) -> &str {
		&self.kind
	}
}

/// A shared event handler closure. Equality is identity.
#[derive(Clone)]
pub struct EventHandler(Rc<dyn Fn(&Event)>);
impl EventHandler {
	pub fn new(handler: impl 'static + Fn(&Event)) -> Self {
		Self(Rc::new(handler))
	}

	pub fn call(&self, event: &Event) {
		(self.0)(event);
	}

	#[must_use]
	pub fn ptr_eq(&self, other: &Self) -> bool {
		core::ptr::eq(Rc::as_ptr(&self.0).cast::<()>(), Rc::as_ptr(&other.0).cast::<()>())
	}
}
impl PartialEq for EventHandler {
	fn eq(&self, other: &Self) -> bool {
		self.ptr_eq(other)
	}
}
impl Debug for EventHandler {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_tuple("EventHandler").field(&Rc::as_ptr(&self.0).cast::<()>()).finish()
	}
}
impl<F: 'static + Fn(&Event)> From<F> for EventHandler {
	fn from(handler: F) -> Self {
		Self::new(handler)
	}
}

/// The `text` directive of an element.
#[derive(Clone)]
pub enum TextContent {
	Literal(String),
	Computed(Rc<dyn Fn() -> String>),
}
impl TextContent {
	#[must_use]
	pub fn resolve(&self) -> Cow<'_, str> {
		match self {
			Self::Literal(text) => Cow::Borrowed(text),
			Self::Computed(compute) => Cow::Owned(compute()),
		}
	}
}
impl Debug for TextContent {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			Self::Literal(text) => f.debug_tuple("Literal").field(text).finish(),
			Self::Computed(_) => f.write_str("Computed(..)"),
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub enum PropValue {
	Null,
	Str(String),
	Number(f64),
	/// Toggles a presence-only attribute.
	Bool(bool),
	/// Ordered style declarations. Keys may be camelCase.
	Style(Vec<(String, String)>),
	/// Bound as an event listener when the key starts with `on`, otherwise dropped.
	Handler(EventHandler),
}
impl From<&str> for PropValue {
	fn from(value: &str) -> Self {
		Self::Str(value.to_owned())
	}
}
impl From<String> for PropValue {
	fn from(value: String) -> Self {
		Self::Str(value)
	}
}
impl From<bool> for PropValue {
	fn from(value: bool) -> Self {
		Self::Bool(value)
	}
}
impl From<f64> for PropValue {
	fn from(value: f64) -> Self {
		Self::Number(value)
	}
}
impl From<i32> for PropValue {
	fn from(value: i32) -> Self {
		Self::Number(value.into())
	}
}
impl From<u32> for PropValue {
	fn from(value: u32) -> Self {
		Self::Number(value.into())
	}
}
impl From<EventHandler> for PropValue {
	fn from(value: EventHandler) -> Self {
		Self::Handler(value)
	}
}
impl<T: Into<PropValue>> From<Option<T>> for PropValue {
	fn from(value: Option<T>) -> Self {
		value.map_or(Self::Null, Into::into)
	}
}

/// Attributes plus rendering directives of one [`Element`].
///
/// Attributes keep their insertion order, which is also their serialization order.
#[derive(Debug, Clone, Default)]
pub struct Props {
	pub children: Option<Box<Node>>,
	pub text: Option<TextContent>,
	attributes: Vec<(String, PropValue)>,
}
impl Props {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets an attribute, replacing an existing value with the same key in place.
	pub fn set(&mut self, key: impl Into<String>, value: impl Into<PropValue>) {
		let key = key.into();
		let value = value.into();
		match self.attributes.iter_mut().find(|(k, _)| *k == key) {
			Some((_, existing)) => *existing = value,
			None => self.attributes.push((key, value)),
		}
	}

	#[must_use]
	pub fn get(&self, key: &str) -> Option<&PropValue> {
		self.attributes.iter().find(|(k, _)| k == key).map(|(_, v)| v)
	}

	#[must_use]
	pub fn attributes(&self) -> &[(String, PropValue)] {
		&self.attributes
	}

	/// Number of own keys, counting `children` and `text` when present.
	#[must_use]
	pub fn len(&self) -> usize {
		self.attributes.len() + usize::from(self.children.is_some()) + usize::from(self.text.is_some())
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

#[derive(Debug, Clone)]
pub struct Element {
	pub tag: String,
	pub props: Props,
}
impl Element {
	pub fn new(tag: impl Into<String>) -> Self {
		Self::with_props(tag, Props::new())
	}

	pub fn with_props(tag: impl Into<String>, props: Props) -> Self {
		Self { tag: tag.into(), props }
	}

	#[must_use]
	pub fn attr(mut self, key: impl Into<String>, value: impl Into<PropValue>) -> Self {
		self.props.set(key, value);
		self
	}

	#[must_use]
	pub fn class(self, class: impl Into<String>) -> Self {
		self.attr("className", class.into())
	}

	#[must_use]
	pub fn text(mut self, text: impl Into<String>) -> Self {
		self.props.text = Some(TextContent::Literal(text.into()));
		self
	}

	#[must_use]
	pub fn computed_text(mut self, compute: impl 'static + Fn() -> String) -> Self {
		self.props.text = Some(TextContent::Computed(Rc::new(compute)));
		self
	}

	/// Binds `handler` to `event`, stored under the `on<Event>` key.
	#[must_use]
	pub fn on(self, event: &str, handler: impl Into<EventHandler>) -> Self {
		let mut chars = event.chars();
		let key = match chars.next() {
			Some(first) => format!("on{}{}", first.to_ascii_uppercase(), chars.as_str()),
			None => "on".to_owned(),
		};
		self.attr(key, handler.into())
	}

	/// Appends one child, turning existing content into a collection as needed.
	#[must_use]
	pub fn child(mut self, node: impl Into<Node>) -> Self {
		let node = node.into();
		self.props.children = Some(Box::new(match self.props.children.take().map(|children| *children) {
			None => node,
			Some(Node::Collection(mut nodes)) => {
				nodes.push(node);
				Node::Collection(nodes)
			}
			Some(existing) => Node::Collection(vec![existing, node]),
		}));
		self
	}

	/// Replaces the children with a collection.
	#[must_use]
	pub fn children<N: Into<Node>>(mut self, nodes: impl IntoIterator<Item = N>) -> Self {
		self.props.children = Some(Box::new(Node::Collection(nodes.into_iter().map(Into::into).collect())));
		self
	}
}

impl From<Element> for Node {
	fn from(element: Element) -> Self {
		Self::Element(element)
	}
}
impl From<Vec<Node>> for Node {
	fn from(nodes: Vec<Node>) -> Self {
		Self::Collection(nodes)
	}
}
impl From<Component> for Node {
	fn from(component: Component) -> Self {
		Self::Component(component)
	}
}
impl From<TextValue> for Node {
	fn from(text: TextValue) -> Self {
		Self::Text(text)
	}
}
impl From<&str> for Node {
	fn from(text: &str) -> Self {
		Self::Text(text.into())
	}
}
impl From<String> for Node {
	fn from(text: String) -> Self {
		Self::Text(text.into())
	}
}
impl From<f64> for Node {
	fn from(text: f64) -> Self {
		Self::Text(text.into())
	}
}
impl From<i32> for Node {
	fn from(text: i32) -> Self {
		Self::Text(text.into())
	}
}
impl From<u32> for Node {
	fn from(text: u32) -> Self {
		Self::Text(text.into())
	}
}
impl From<bool> for Node {
	fn from(text: bool) -> Self {
		Self::Text(text.into())
	}
}
impl<T: Into<Node>> From<Option<T>> for Node {
	fn from(node: Option<T>) -> Self {
		node.map_or(Self::Empty, Into::into)
	}
}

impl From<&str> for TextValue {
	fn from(text: &str) -> Self {
		Self::Str(text.to_owned())
	}
}
impl From<String> for TextValue {
	fn from(text: String) -> Self {
		Self::Str(text)
	}
}
impl From<f64> for TextValue {
	fn from(number: f64) -> Self {
		Self::Number(number)
	}
}
impl From<i32> for TextValue {
	fn from(number: i32) -> Self {
		Self::Number(number.into())
	}
}
impl From<u32> for TextValue {
	fn from(number: u32) -> Self {
		Self::Number(number.into())
	}
}
impl From<bool> for TextValue {
	fn from(bool: bool) -> Self {
		Self::Bool(bool)
	}
}
