//! Error taxonomy.
//!
//! Only [`ConfigError`] and [`RenderError::DepthExceeded`] ever escape a render call by default.
//! Producer failures are contained unless [`RendererConfig::throw_on_error`](`crate::RendererConfig::throw_on_error`) is set.

use core::fmt::Display;
use thiserror::Error;

/// Invalid option values, reported when constructing a renderer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
	#[error("`{option}` must be positive")]
	NonPositive { option: &'static str },
}

/// A component failed to produce a node.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("producer failed: {message}")]
pub struct ProducerError {
	message: String,
}
impl ProducerError {
	pub fn new(message: impl Display) -> Self {
		Self { message: message.to_string() }
	}

	#[must_use]
	pub fn message(&self) -> &str {
		&self.message
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
	/// Structural recursion limit hit. This is also the only protection against cyclic producers.
	#[error("render depth {depth} exceeds the configured maximum of {max_depth}")]
	DepthExceeded { depth: usize, max_depth: usize },
	#[error(transparent)]
	Producer(#[from] ProducerError),
	#[error(transparent)]
	Config(#[from] ConfigError),
}
