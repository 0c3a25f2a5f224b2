use crate::error::ConfigError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use core::time::Duration;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Options shared by all renderers.
///
/// Deserializes from camelCase keys with every field optional, e.g. `{"maxDepth": 200, "cacheTTL": 60000}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RendererConfig {
	pub enable_cache: bool,
	/// Maximum number of cached element fragments. `0` stores nothing.
	pub cache_size: usize,
	/// Age after which cache entries are ignored, in milliseconds when (de)serialized.
	#[serde(rename = "cacheTTL", with = "millis")]
	pub cache_ttl: Option<Duration>,
	/// Elements above this complexity are never cached.
	pub cache_complexity_limit: usize,
	pub minify: bool,
	pub max_depth: usize,
	/// Streaming chunk threshold in bytes.
	pub chunk_size: usize,
	/// Initial output buffer capacity in bytes.
	pub buffer_size: usize,
	/// Streaming chunk threshold in opened elements.
	pub yield_threshold: usize,
	pub encoding: Encoding,
	pub enable_hydration: bool,
	/// Namespace for DOM elements outside of `svg` and `math` subtrees.
	pub namespace: Option<String>,
	pub throw_on_error: bool,
	/// Substituted for failed subtrees.
	pub error_fallback: String,
	pub enable_monitoring: bool,
}
impl Default for RendererConfig {
	fn default() -> Self {
		Self {
			enable_cache: true,
			cache_size: 1000,
			cache_ttl: Some(Duration::from_secs(5 * 60)),
			cache_complexity_limit: 100,
			minify: false,
			max_depth: 100,
			chunk_size: 16 * 1024,
			buffer_size: 64 * 1024,
			yield_threshold: 100,
			encoding: Encoding::Utf8,
			enable_hydration: false,
			namespace: None,
			throw_on_error: false,
			error_fallback: String::new(),
			enable_monitoring: false,
		}
	}
}
impl RendererConfig {
	/// Rejects non-positive limits and warns about values likely to cause trouble.
	///
	/// # Errors
	///
	/// Iff `max_depth`, `chunk_size` or `yield_threshold` is zero.
	pub fn validate(&self) -> Result<(), ConfigError> {
		for (option, value) in [
			("maxDepth", self.max_depth),
			("chunkSize", self.chunk_size),
			("yieldThreshold", self.yield_threshold),
		] {
			if value == 0 {
				return Err(ConfigError::NonPositive { option });
			}
		}

		if self.max_depth > 10_000 {
			warn!("maxDepth {} risks overflowing the stack before the depth guard trips.", self.max_depth);
		}
		if self.chunk_size < 64 {
			warn!("chunkSize {} produces very small chunks. Expect significant per-chunk overhead.", self.chunk_size);
		}
		if self.chunk_size > 16 * 1024 * 1024 {
			warn!("chunkSize {} effectively disables streaming.", self.chunk_size);
		}
		if self.buffer_size > 64 * 1024 * 1024 {
			warn!("bufferSize {} preallocates a lot of memory per render.", self.buffer_size);
		}
		if self.enable_cache && self.cache_size > 100_000 {
			warn!("cacheSize {} may hold a large amount of markup in memory.", self.cache_size);
		}
		if self.cache_complexity_limit > 10_000 {
			warn!("cacheComplexityLimit {} allows caching very large fragments.", self.cache_complexity_limit);
		}
		Ok(())
	}
}

/// Output encoding of streamed chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
	#[default]
	Utf8,
	/// Non-ASCII characters become numeric character references.
	Ascii,
	Base64,
	Hex,
}
impl Encoding {
	#[must_use]
	pub fn encode(self, chunk: String) -> String {
		match self {
			Self::Utf8 => chunk,
			Self::Ascii if chunk.is_ascii() => chunk,
			Self::Ascii => {
				let mut encoded = String::with_capacity(chunk.len() + 16);
				for c in chunk.chars() {
					if c.is_ascii() {
						encoded.push(c);
					} else {
						encoded.push_str("&#");
						encoded.push_str(&u32::from(c).to_string());
						encoded.push(';');
					}
				}
				encoded
			}
			Self::Base64 => STANDARD.encode(chunk.as_bytes()),
			Self::Hex => {
				let mut encoded = String::with_capacity(chunk.len() * 2);
				for byte in chunk.bytes() {
					encoded.push(char::from(HEX_DIGITS[usize::from(byte >> 4)]));
					encoded.push(char::from(HEX_DIGITS[usize::from(byte & 0xf)]));
				}
				encoded
			}
		}
	}
}

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

mod millis {
	use core::time::Duration;
	use serde::{Deserialize, Deserializer, Serialize, Serializer};

	pub fn serialize<S: Serializer>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error> {
		value.map(|ttl| u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX)).serialize(serializer)
	}

	pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Duration>, D::Error> {
		Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_millis))
	}
}
