//! Ingestion of plain nested data as [`Node`]s.
//!
//! The accepted shape is the mapping notation: `null` is empty, scalars are text, arrays are collections
//! and an object is an element keyed by its tag, `{"div": {"className": "x", "children": [..]}}`.
//! Values that fit none of these are logged and rendered as nothing.

use crate::node::{Element, Node, PropValue, Props, TextContent, TextValue};
use serde_json::{Map, Number, Value};
use tracing::{error, warn};

#[must_use]
pub fn from_json(value: &Value) -> Node {
	match value {
		Value::Null => Node::Empty,
		Value::Bool(bool) => Node::Text(TextValue::Bool(*bool)),
		Value::Number(number) => Node::Text(TextValue::Number(to_f64(number))),
		Value::String(str) => Node::Text(TextValue::Str(str.clone())),
		Value::Array(values) => Node::Collection(values.iter().map(from_json).collect()),
		Value::Object(object) => element_from_json(object).map_or(Node::Empty, Node::Element),
	}
}

fn element_from_json(object: &Map<String, Value>) -> Option<Element> {
	let mut entries = object.iter();
	let (tag, props) = match entries.next() {
		Some(entry) => entry,
		None => {
			error!("Invalid node shape: empty object. Rendering nothing instead.");
			return None;
		}
	};
	let extra = entries.map(|(key, _)| key.as_str()).collect::<Vec<_>>();
	if !extra.is_empty() {
		warn!("Ignoring extra keys {:?} after element tag {:?}.", extra, tag);
	}

	let props = match props {
		Value::Null => Props::new(),
		Value::Object(props) => props_from_json(props),
		other => {
			error!("Invalid node shape: props of <{}> must be an object, found {}. Rendering nothing instead.", tag, other);
			return None;
		}
	};
	Some(Element::with_props(tag.as_str(), props))
}

/// Reads a props object. Keys that can't be represented are skipped with a warning.
#[must_use]
pub fn props_from_json(object: &Map<String, Value>) -> Props {
	let mut props = Props::new();
	for (key, value) in object {
		match key.as_str() {
			"children" => props.children = Some(Box::new(from_json(value))),
			"text" => match value {
				Value::Null => (),
				Value::String(text) => props.text = Some(TextContent::Literal(text.clone())),
				Value::Number(number) => props.text = Some(TextContent::Literal(TextValue::Number(to_f64(number)).to_string())),
				Value::Bool(bool) => props.text = Some(TextContent::Literal(bool.to_string())),
				Value::Array(_) | Value::Object(_) => warn!("Ignoring non-scalar `text` value."),
			},
			"style" => match value {
				Value::Object(declarations) => props.set(key.as_str(), PropValue::Style(style_from_json(declarations))),
				Value::String(style) => props.set(key.as_str(), style.as_str()),
				Value::Null => props.set(key.as_str(), PropValue::Null),
				_ => warn!("Ignoring `style` value that is neither an object nor a string."),
			},
			_ => match value {
				Value::Null => props.set(key.as_str(), PropValue::Null),
				Value::Bool(bool) => props.set(key.as_str(), *bool),
				Value::Number(number) => props.set(key.as_str(), to_f64(number)),
				Value::String(str) => props.set(key.as_str(), str.as_str()),
				Value::Array(_) | Value::Object(_) => warn!("Ignoring non-scalar value of attribute {:?}.", key),
			},
		}
	}
	props
}

fn style_from_json(declarations: &Map<String, Value>) -> Vec<(String, String)> {
	declarations
		.iter()
		.filter_map(|(property, value)| {
			let value = match value {
				Value::String(str) => str.clone(),
				Value::Number(number) => TextValue::Number(to_f64(number)).to_string(),
				Value::Null => return None,
				_ => {
					warn!("Ignoring unsupported value of style property {:?}.", property);
					return None;
				}
			};
			Some((property.clone(), value))
		})
		.collect()
}

#[allow(clippy::cast_precision_loss)]
fn to_f64(number: &Number) -> f64 {
	number
		.as_f64()
		.or_else(|| number.as_i64().map(|number| number as f64))
		.or_else(|| number.as_u64().map(|number| number as f64))
		.unwrap_or(f64::NAN)
}
