//! HTML text utilities: escaping, the void element set, attribute serialization and minification.

use crate::{
	node::Props,
	object::{self, Attribute},
};
use std::borrow::Cow;
use tracing::warn;

/// Elements that never have content and never get a closing tag.
pub const VOID_ELEMENTS: &[&str] = &[
	"area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source", "track", "wbr",
];

#[must_use]
pub fn is_void_element(tag: &str) -> bool {
	VOID_ELEMENTS.iter().any(|void| void.eq_ignore_ascii_case(tag))
}

/// Tag and attribute names are written verbatim, so anything outside this set is rejected.
#[must_use]
pub fn is_valid_name(name: &str) -> bool {
	!name.is_empty() && name.bytes().all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b':' | b'.'))
}

/// Escapes `& < > " '`. Borrows if there is nothing to escape.
#[must_use]
pub fn escape(text: &str) -> Cow<'_, str> {
	let first = match text.find(|c| matches!(c, '&' | '<' | '>' | '"' | '\'')) {
		Some(first) => first,
		None => return Cow::Borrowed(text),
	};

	let mut escaped = String::with_capacity(text.len() + 16);
	escaped.push_str(&text[..first]);
	for c in text[first..].chars() {
		match c {
			'&' => escaped.push_str("&amp;"),
			'<' => escaped.push_str("&lt;"),
			'>' => escaped.push_str("&gt;"),
			'"' => escaped.push_str("&quot;"),
			'\'' => escaped.push_str("&#39;"),
			c => escaped.push(c),
		}
	}
	Cow::Owned(escaped)
}

const ENTITIES: &[(&str, char)] = &[
	("&amp;", '&'),
	("&lt;", '<'),
	("&gt;", '>'),
	("&quot;", '"'),
	("&#39;", '\''),
	("&#x27;", '\''),
	("&apos;", '\''),
];

/// Reverses [`escape`]. Unknown entities are left as they are.
#[must_use]
pub fn unescape(text: &str) -> Cow<'_, str> {
	if !text.contains('&') {
		return Cow::Borrowed(text);
	}

	let mut unescaped = String::with_capacity(text.len());
	let mut rest = text;
	while let Some(i) = rest.find('&') {
		unescaped.push_str(&rest[..i]);
		rest = &rest[i..];
		match ENTITIES.iter().find(|(entity, _)| rest.starts_with(entity)) {
			Some((entity, c)) => {
				unescaped.push(*c);
				rest = &rest[entity.len()..];
			}
			None => {
				unescaped.push('&');
				rest = &rest[1..];
			}
		}
	}
	unescaped.push_str(rest);
	Cow::Owned(unescaped)
}

/// Appends one attribute with a leading space. Listeners produce no output here.
pub fn write_attribute(out: &mut String, attribute: &Attribute<'_>) {
	match attribute {
		Attribute::Value { name, value } => {
			if !is_valid_name(name) {
				return warn!("Skipping attribute with invalid name {:?}.", name);
			}
			out.push(' ');
			out.push_str(name);
			out.push_str("=\"");
			out.push_str(&escape(value));
			out.push('"');
		}
		Attribute::Present { name } => {
			if !is_valid_name(name) {
				return warn!("Skipping attribute with invalid name {:?}.", name);
			}
			out.push(' ');
			out.push_str(name);
		}
		Attribute::Listener { .. } => (),
	}
}

/// Serializes props to attribute text, e.g. ` class="a" disabled`.
#[must_use]
pub fn format_attributes(props: &Props) -> String {
	let mut out = String::new();
	for attribute in object::attributes(props) {
		write_attribute(&mut out, &attribute);
	}
	out
}

/// Minifies a complete markup string. See [`Minifier`].
#[must_use]
pub fn minify(html: &str) -> String {
	let mut minifier = Minifier::new();
	let mut out = String::with_capacity(html.len());
	minifier.feed(html, &mut out);
	minifier.finish(&mut out);
	out
}

/// Removes comments and inter-tag whitespace and collapses other whitespace runs to one space.
///
/// The content of `script` and `style` elements passes through untouched.
///
/// Input may arrive in pieces, as long as no piece boundary falls inside a tag or comment.
/// Text and raw-text state carries over between pieces.
#[derive(Debug, Default)]
pub struct Minifier {
	text: String,
	raw_until: Option<&'static str>,
}
impl Minifier {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	pub fn feed(&mut self, mut input: &str, out: &mut String) {
		loop {
			if let Some(close) = self.raw_until {
				match input.to_ascii_lowercase().find(close) {
					Some(i) => {
						out.push_str(&input[..i]);
						input = &input[i..];
						self.raw_until = None;
					}
					None => return out.push_str(input),
				}
			}

			let lt = match input.find('<') {
				Some(lt) => lt,
				None => return self.text.push_str(input),
			};
			self.text.push_str(&input[..lt]);
			self.flush_text(out);
			input = &input[lt..];

			if let Some(comment) = input.strip_prefix("<!--") {
				input = match comment.find("-->") {
					Some(end) => &comment[end + 3..],
					None => return,
				};
				continue;
			}

			let end = match tag_end(input) {
				Some(end) => end,
				None => return out.push_str(input),
			};
			let tag = &input[..=end];
			out.push_str(tag);
			self.raw_until = raw_text_close(tag);
			input = &input[end + 1..];
		}
	}

	/// Flushes pending text.
	pub fn finish(&mut self, out: &mut String) {
		self.flush_text(out);
	}

	fn flush_text(&mut self, out: &mut String) {
		if !self.text.trim().is_empty() {
			let mut in_whitespace = false;
			for c in self.text.chars() {
				if c.is_whitespace() {
					if !in_whitespace {
						out.push(' ');
					}
					in_whitespace = true;
				} else {
					out.push(c);
					in_whitespace = false;
				}
			}
		}
		self.text.clear();
	}
}

/// Index of the `>` closing the tag `input` starts with, skipping quoted attribute values.
fn tag_end(input: &str) -> Option<usize> {
	let mut quote = None;
	for (i, c) in input.char_indices() {
		match (quote, c) {
			(None, '"' | '\'') => quote = Some(c),
			(Some(q), c) if q == c => quote = None,
			(None, '>') => return Some(i),
			_ => (),
		}
	}
	None
}

fn raw_text_close(tag: &str) -> Option<&'static str> {
	let name: String = tag[1..].chars().take_while(char::is_ascii_alphanumeric).collect();
	if name.eq_ignore_ascii_case("script") {
		Some("</script")
	} else if name.eq_ignore_ascii_case("style") {
		Some("</style")
	} else {
		None
	}
}
