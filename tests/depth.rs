use arbor_render::{dom::memory::Document, DomRenderer, Element, Node, RenderError, RendererConfig, StringRenderer};

/// `levels` nested `div`s. The innermost one sits at depth `levels`.
fn nested(levels: usize) -> Node {
	let mut node = Node::from(Element::new("div"));
	for _ in 1..levels {
		node = Element::new("div").child(node).into();
	}
	node
}

fn config(max_depth: usize) -> RendererConfig {
	RendererConfig {
		max_depth,
		enable_cache: false,
		..RendererConfig::default()
	}
}

fn string(node: &Node, max_depth: usize) -> Result<String, RenderError> {
	StringRenderer::new(config(max_depth)).unwrap().render(node)
}

fn streamed(node: &Node, max_depth: usize) -> Result<String, RenderError> {
	let mut renderer = StringRenderer::new(config(max_depth)).unwrap();
	let result = renderer.render_stream(node).collect();
	result
}

fn dom(node: &Node, max_depth: usize) -> Result<usize, RenderError> {
	DomRenderer::new(config(max_depth), Document::new()).unwrap().render(node, None).map(|nodes| nodes.len())
}

#[test]
fn at_limit() {
	let node = nested(25);
	assert!(string(&node, 25).is_ok());
	assert!(streamed(&node, 25).is_ok());
	assert_eq!(dom(&node, 25), Ok(1));
}

#[test]
fn past_limit() {
	let node = nested(26);
	let expected = Err(RenderError::DepthExceeded { depth: 26, max_depth: 25 });
	assert_eq!(string(&node, 25), expected);
	assert_eq!(streamed(&node, 25), expected);
	assert_eq!(dom(&node, 25).map(|_| String::new()), expected);
}

#[test]
fn depth_error_ignores_fallback() {
	let node = nested(4);
	let config = RendererConfig {
		error_fallback: "fallback".to_owned(),
		..config(3)
	};
	assert!(matches!(
		StringRenderer::new(config).unwrap().render(&node),
		Err(RenderError::DepthExceeded { .. })
	));
}

#[test]
fn collections_do_not_add_depth() {
	let node = Node::Collection(vec![Node::Collection(vec![Node::Collection(vec![Node::from("x")])])]);
	assert_eq!(string(&node, 1).unwrap(), "x");
	assert_eq!(streamed(&node, 1).unwrap(), "x");
}

#[test]
fn components_add_depth() {
	// Component at 1, its result at 2.
	let node = Node::component(|| "x".into());
	assert!(string(&node, 1).is_err());
	assert_eq!(string(&node, 2).unwrap(), "x");
	assert_eq!(streamed(&node, 2).unwrap(), "x");
}

#[test]
fn self_referential_producers_terminate() {
	fn recurse() -> Node {
		Node::component(recurse)
	}
	assert_eq!(
		string(&recurse(), 50),
		Err(RenderError::DepthExceeded { depth: 51, max_depth: 50 })
	);
	assert!(matches!(streamed(&recurse(), 50), Err(RenderError::DepthExceeded { .. })));
}

#[test]
fn scoped_resolution_is_guarded() {
	let node = Node::provider(|scope| scope.resolve(nested(10)));
	assert!(matches!(string(&node, 5), Err(RenderError::DepthExceeded { .. })));
	assert!(string(&node, 20).is_ok());
}

#[test]
fn cached_fragments_respect_the_limit() {
	let inner = || Node::from(Element::new("div").child(Element::new("span").child(Element::new("b"))));
	let node = Node::Collection(vec![inner(), Element::new("section").child(inner()).into()]);
	let cached = |max_depth| RendererConfig {
		enable_cache: true,
		..config(max_depth)
	};

	let expected = Err(RenderError::DepthExceeded { depth: 4, max_depth: 3 });
	assert_eq!(string(&node, 3), expected);
	let mut renderer = StringRenderer::new(cached(3)).unwrap();
	assert_eq!(renderer.render(&node), expected);
	assert_eq!(renderer.render(&node), expected);
	assert_eq!(renderer.render_stream(&node).collect::<Result<String, _>>(), expected);

	// Where the fragment fits, it is still served.
	let mut renderer = StringRenderer::new(cached(4)).unwrap();
	assert_eq!(
		renderer.render(&node).unwrap(),
		"<div><span><b></b></span></div><section><div><span><b></b></span></div></section>"
	);
	assert_eq!(renderer.metrics().cache_hits, 1);
}
