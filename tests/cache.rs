use arbor_render::{cache, ElementCache, Element, Event, Node, RendererConfig, StringRenderer};
use core::time::Duration;
use std::{cell::Cell, rc::Rc, thread};

fn card(title: &str) -> Element {
	Element::new("div")
		.class("card")
		.child(Element::new("span").text(title))
		.child(Element::new("span").text("b"))
}

#[test]
fn second_render_is_served_from_cache() {
	let node = Node::from(card("a"));
	let mut renderer = StringRenderer::new(RendererConfig::default()).unwrap();

	let first = renderer.render(&node).unwrap();
	assert_eq!(renderer.metrics().cache_misses, 3);
	assert_eq!(renderer.metrics().cache_hits, 0);
	assert_eq!(renderer.engine().cache().len(), 3);

	let second = renderer.render(&node).unwrap();
	assert_eq!(first, second);
	assert_eq!(renderer.metrics().cache_hits, 1);
	assert_eq!(renderer.metrics().elements_processed, 1);

	let key = cache::signature(&card("a"));
	assert_eq!(renderer.engine().cache().hits(&key), Some(1));
	assert!(renderer.engine().cache().keys().any(|k| k == key));
}

#[test]
fn different_content_different_entries() {
	assert_eq!(cache::signature(&card("a")), cache::signature(&card("a")));
	assert_ne!(cache::signature(&card("a")), cache::signature(&card("c")));
	assert_ne!(
		cache::signature(&Element::new("p").attr("a", "1").attr("b", "2")),
		cache::signature(&Element::new("p").attr("b", "2").attr("a", "1")),
	);
	assert_ne!(
		cache::signature(&Element::new("p").attr("x", "1")),
		cache::signature(&Element::new("p").attr("x", 1)),
	);

	let mut renderer = StringRenderer::new(RendererConfig::default()).unwrap();
	assert_eq!(renderer.render(&card("a").into()).unwrap(), r#"<div class="card"><span>a</span><span>b</span></div>"#);
	assert_eq!(renderer.render(&card("c").into()).unwrap(), r#"<div class="card"><span>c</span><span>b</span></div>"#);
}

#[test]
fn functions_are_never_cached() {
	let calls = Rc::new(Cell::new(0));
	let with_producer = card("a").child(Node::component({
		let calls = Rc::clone(&calls);
		move || {
			calls.set(calls.get() + 1);
			Node::from(calls.get())
		}
	}));
	let with_handler = Element::new("button").on("click", |_: &Event| ());
	let with_computed_text = Element::new("p").computed_text(|| "now".to_owned());

	let mut renderer = StringRenderer::new(RendererConfig::default()).unwrap();
	for element in [&with_producer, &with_handler, &with_computed_text] {
		assert!(!renderer.engine().is_cacheable(element));
	}

	let node = Node::Collection(vec![with_producer.clone().into(), with_handler.clone().into(), with_computed_text.clone().into()]);
	let first = renderer.render(&node).unwrap();
	let second = renderer.render(&node).unwrap();
	assert_ne!(first, second);
	assert_eq!(calls.get(), 2);

	let cache = renderer.engine().cache();
	assert!(!cache.contains_key(&cache::signature(&with_producer)));
	assert!(!cache.contains_key(&cache::signature(&with_handler)));
	assert!(!cache.contains_key(&cache::signature(&with_computed_text)));
	// The function-free spans inside are still cached.
	assert_eq!(cache.len(), 2);
}

#[test]
fn complexity_limit() {
	let element = Element::new("p").attr("a", 1).attr("b", 2).attr("c", 3);
	let renderer = |limit| {
		StringRenderer::new(RendererConfig {
			cache_complexity_limit: limit,
			..RendererConfig::default()
		})
		.unwrap()
	};
	assert!(renderer(3).engine().is_cacheable(&element));
	assert!(!renderer(2).engine().is_cacheable(&element));

	let wide = Element::new("ul").children((0..200).map(|i| Element::new("li").text(i.to_string())));
	assert!(!renderer(100).engine().is_cacheable(&wide));
}

#[test]
fn disabled_cache() {
	let element = card("a");
	for config in [
		RendererConfig {
			enable_cache: false,
			..RendererConfig::default()
		},
		RendererConfig {
			cache_size: 0,
			..RendererConfig::default()
		},
	] {
		let mut renderer = StringRenderer::new(config).unwrap();
		assert!(!renderer.engine().is_cacheable(&element));
		renderer.render(&element.clone().into()).unwrap();
		renderer.render(&element.clone().into()).unwrap();
		assert!(renderer.engine().cache().is_empty());
		assert_eq!(renderer.metrics().cache_hits, 0);
	}
}

#[test]
fn clear_cache() {
	let mut renderer = StringRenderer::new(RendererConfig::default()).unwrap();
	renderer.render(&card("a").into()).unwrap();
	assert!(!renderer.engine().cache().is_empty());
	renderer.clear_cache();
	assert!(renderer.engine().cache().is_empty());
}

#[test]
fn least_recently_used_goes_first() {
	let mut cache = ElementCache::new(2, None);
	cache.insert("a".to_owned(), "A".to_owned());
	cache.insert("b".to_owned(), "B".to_owned());
	assert_eq!(cache.get("a"), Some("A"));

	cache.insert("c".to_owned(), "C".to_owned());
	assert_eq!(cache.len(), 2);
	assert!(cache.contains_key("a"));
	assert!(!cache.contains_key("b"));
	assert!(cache.contains_key("c"));

	// Replacing doesn't evict.
	cache.insert("c".to_owned(), "C2".to_owned());
	assert_eq!(cache.len(), 2);
	assert_eq!(cache.get("c"), Some("C2"));
}

#[test]
fn zero_capacity() {
	let mut cache = ElementCache::new(0, None);
	cache.insert("a".to_owned(), "A".to_owned());
	assert!(cache.is_empty());
	assert_eq!(cache.get("a"), None);
}

#[test]
fn time_to_live() {
	let mut cache = ElementCache::new(10, Some(Duration::from_millis(1)));
	cache.insert("a".to_owned(), "A".to_owned());
	thread::sleep(Duration::from_millis(20));
	assert_eq!(cache.get("a"), None);
	assert!(cache.is_empty());

	let mut cache = ElementCache::new(10, Some(Duration::from_secs(60 * 60)));
	cache.insert("a".to_owned(), "A".to_owned());
	assert_eq!(cache.get("a"), Some("A"));
	assert_eq!(cache.hits("a"), Some(1));
}
