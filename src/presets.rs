//! Named configuration bundles per backend and environment.

use crate::config::RendererConfig;
use core::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
	String,
	Stream,
	Dom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Environment {
	/// Uncached, unminified output. Failures surface as errors.
	Development,
	/// Cached and minified output. Failures degrade to the fallback.
	Production,
}

#[must_use]
pub fn preset(target: Target, environment: Environment) -> RendererConfig {
	let base = match environment {
		Environment::Development => RendererConfig {
			enable_cache: false,
			minify: false,
			throw_on_error: true,
			enable_monitoring: true,
			..RendererConfig::default()
		},
		Environment::Production => RendererConfig {
			enable_cache: true,
			cache_size: 5000,
			cache_ttl: Some(Duration::from_secs(60 * 60)),
			minify: true,
			throw_on_error: false,
			enable_monitoring: false,
			..RendererConfig::default()
		},
	};

	match target {
		Target::String => base,
		Target::Stream => RendererConfig {
			max_depth: 1000,
			chunk_size: match environment {
				Environment::Development => 4 * 1024,
				Environment::Production => 16 * 1024,
			},
			buffer_size: 32 * 1024,
			yield_threshold: 50,
			..base
		},
		Target::Dom => RendererConfig {
			enable_cache: false,
			minify: false,
			enable_hydration: environment == Environment::Production,
			..base
		},
	}
}
