use arbor_render::{
	actions::ActionId, markup, render_to_string, Element, Event, EventHandler, Node, PropValue, RenderError, RendererConfig, StringRenderer,
};
use std::{cell::Cell, rc::Rc};

fn render(node: &Node) -> String {
	render_to_string(node, RendererConfig::default()).unwrap()
}

#[test]
fn hello_world() {
	let node = Node::from(Element::new("div").class("test").text("Hello, World!"));
	assert_eq!(render(&node), r#"<div class="test">Hello, World!</div>"#);
}

#[test]
fn card() {
	let node = Node::from(
		Element::new("div")
			.class("card")
			.child(Element::new("h2").text("Title"))
			.child(Element::new("p").text("Body")),
	);
	assert_eq!(render(&node), r#"<div class="card"><h2>Title</h2><p>Body</p></div>"#);
}

#[test]
fn scalars() {
	assert_eq!(render(&Node::Empty), "");
	assert_eq!(render(&Node::from("text")), "text");
	assert_eq!(render(&Node::from(3.0)), "3");
	assert_eq!(render(&Node::from(1.5)), "1.5");
	assert_eq!(render(&Node::from(-7)), "-7");
	assert_eq!(render(&Node::from(true)), "true");
	assert_eq!(render(&Node::from(f64::NAN)), "NaN");
	assert_eq!(render(&Node::from(None::<&str>)), "");
}

#[test]
fn collections_keep_order() {
	let node = Node::from(vec![
		Node::from("a"),
		Node::Empty,
		Element::new("b").into(),
		vec![Node::from("c"), Node::from("d")].into(),
		Node::component(|| "e".into()),
	]);
	assert_eq!(render(&node), "a<b></b>cde");
}

#[test]
fn attributes_keep_order() {
	let node = Node::from(
		Element::new("a")
			.attr("href", "/x")
			.class("link")
			.attr("id", "first")
			.attr("href", "/y"),
	);
	assert_eq!(render(&node), r#"<a href="/y" class="link" id="first"></a>"#);
}

#[test]
fn format_attributes() {
	let element = Element::new("x").class("a").attr("hidden", true).attr("gone", false).attr("n", 2);
	assert_eq!(markup::format_attributes(&element.props), r#" class="a" hidden n="2""#);
}

#[test]
fn class_and_class_name() {
	assert_eq!(render(&Element::new("i").attr("class", "x").into()), r#"<i class="x"></i>"#);
	assert_eq!(render(&Element::new("i").attr("className", "x").into()), r#"<i class="x"></i>"#);
}

#[test]
fn boolean_attributes() {
	let node = Node::from(
		Element::new("input")
			.attr("type", "checkbox")
			.attr("checked", true)
			.attr("disabled", false)
			.attr("title", PropValue::Null),
	);
	assert_eq!(render(&node), r#"<input type="checkbox" checked>"#);
}

#[test]
fn numbers_and_styles() {
	let node = Node::from(
		Element::new("div")
			.attr("tabindex", 3)
			.attr("data-ratio", 0.25)
			.attr(
				"style",
				PropValue::Style(vec![
					("backgroundColor".to_owned(), "red".to_owned()),
					("fontSize".to_owned(), "12px".to_owned()),
				]),
			),
	);
	assert_eq!(
		render(&node),
		r#"<div tabindex="3" data-ratio="0.25" style="background-color:red;font-size:12px"></div>"#
	);
}

#[test]
fn void_elements() {
	assert_eq!(render(&Element::new("br").into()), "<br>");
	assert_eq!(render(&Element::new("IMG").attr("src", "a.png").into()), r#"<IMG src="a.png">"#);
	assert_eq!(render(&Element::new("hr").text("ignored").child("also ignored").into()), "<hr>");
}

#[test]
fn escaping() {
	let text = r#"<script>alert("x")</script> & 'y'"#;
	let html = render(&Element::new("p").child(text).attr("title", text).into());
	let escaped = "&lt;script&gt;alert(&quot;x&quot;)&lt;/script&gt; &amp; &#39;y&#39;";
	assert_eq!(html, format!(r#"<p title="{0}">{0}</p>"#, escaped));
	assert_eq!(markup::unescape(escaped), text);
}

#[test]
fn text_directive() {
	let counter = Rc::new(Cell::new(0));
	let node = Node::from(Element::new("span").computed_text({
		let counter = Rc::clone(&counter);
		move || {
			counter.set(counter.get() + 1);
			format!("<{}>", counter.get())
		}
	}));

	let mut renderer = StringRenderer::new(RendererConfig::default()).unwrap();
	assert_eq!(renderer.render(&node).unwrap(), "<span>&lt;1&gt;</span>");
	assert_eq!(renderer.render(&node).unwrap(), "<span>&lt;2&gt;</span>");
}

#[test]
fn text_comes_before_children() {
	let node = Node::from(Element::new("label").text("Name").child(Element::new("input")));
	assert_eq!(render(&node), "<label>Name<input></label>");
}

#[test]
fn invalid_names_are_skipped() {
	assert_eq!(render(&Element::new("no tag").into()), "");
	assert_eq!(render(&Element::new("div").attr("a b", "x").attr("ok", "y").into()), r#"<div ok="y"></div>"#);
}

#[test]
fn handlers_without_hydration() {
	let node = Node::from(
		Element::new("button")
			.on("click", |_: &Event| ())
			.attr("callback", EventHandler::new(|_| ()))
			.text("Go"),
	);
	let mut renderer = StringRenderer::new(RendererConfig::default()).unwrap();
	assert_eq!(renderer.render(&node).unwrap(), "<button>Go</button>");
	assert!(renderer.actions().is_empty());
}

#[test]
fn hydration_actions() {
	let clicked = Rc::new(Cell::new(false));
	let handler = EventHandler::new({
		let clicked = Rc::clone(&clicked);
		move |_| clicked.set(true)
	});
	let node = Node::from(
		Element::new("button")
			.on("click", handler.clone())
			.attr("onBlur", PropValue::Null)
			.text("Go"),
	);

	let mut renderer = StringRenderer::new(RendererConfig {
		enable_hydration: true,
		..RendererConfig::default()
	})
	.unwrap();
	assert_eq!(renderer.render(&node).unwrap(), r#"<button data-action-click="a0">Go</button>"#);
	assert_eq!(renderer.render(&node).unwrap(), r#"<button data-action-click="a1">Go</button>"#);
	assert_eq!(renderer.actions().len(), 2);
	assert!(renderer.actions().iter().all(|(_, action)| action.event == "click"));

	let action = renderer.actions().get(ActionId::parse("a0").unwrap()).unwrap();
	assert_eq!(action.event, "click");
	assert!(action.handler.ptr_eq(&handler));
	action.handler.call(&Event::new("click"));
	assert!(clicked.get());

	assert_eq!(renderer.actions_mut().drain().count(), 2);
	assert!(renderer.actions().is_empty());
}

#[test]
fn producer_failure_uses_fallback() {
	let node = Node::from(
		Element::new("ul")
			.child(Element::new("li").text("ok"))
			.child(Node::try_component(|| Err::<Node, _>("boom")))
			.child(Element::new("li").text("still ok")),
	);
	let mut renderer = StringRenderer::new(RendererConfig {
		error_fallback: "<!-- failed -->".to_owned(),
		..RendererConfig::default()
	})
	.unwrap();
	assert_eq!(renderer.render(&node).unwrap(), "<ul><li>ok</li><!-- failed --><li>still ok</li></ul>");
	assert_eq!(renderer.metrics().producer_errors, 1);
}

#[test]
fn producer_panic_is_contained() {
	let node = Node::from(Element::new("div").child(Node::component(|| panic!("kaboom"))));
	assert_eq!(render(&node), "<div></div>");
}

#[test]
fn computed_text_panic_is_contained() {
	let node = Node::Collection(vec![
		Element::new("p").text("ok").into(),
		Element::new("p").computed_text(|| panic!("boom")).into(),
	]);
	let mut renderer = StringRenderer::new(RendererConfig {
		error_fallback: "?".to_owned(),
		..RendererConfig::default()
	})
	.unwrap();
	assert_eq!(renderer.render(&node).unwrap(), "<p>ok</p><p>?</p>");
	assert_eq!(renderer.metrics().producer_errors, 1);
	assert_eq!(renderer.render_stream(&node).collect::<Result<String, _>>().unwrap(), "<p>ok</p><p>?</p>");
	assert_eq!(renderer.metrics().producer_errors, 1);

	let config = RendererConfig {
		throw_on_error: true,
		..RendererConfig::default()
	};
	match render_to_string(&node, config) {
		Err(RenderError::Producer(error)) => assert_eq!(error.message(), "panicked: boom"),
		other => panic!("unexpected result: {:?}", other),
	}
}

#[test]
fn throw_on_error() {
	let node = Node::from(Element::new("div").child(Node::try_component(|| Err::<Node, _>("boom"))));
	let error = render_to_string(
		&node,
		RendererConfig {
			throw_on_error: true,
			..RendererConfig::default()
		},
	)
	.unwrap_err();
	match error {
		RenderError::Producer(error) => assert_eq!(error.message(), "boom"),
		other => panic!("unexpected error: {:?}", other),
	}
}

#[test]
fn nested_components() {
	let node = Node::component(|| Node::component(|| Node::component(|| Element::new("em").text("deep").into())));
	assert_eq!(render(&node), "<em>deep</em>");
}

#[test]
fn providers_resolve_nested_content() {
	let node = Node::provider(|scope| {
		assert_eq!(scope.depth(), 1);
		assert_eq!(scope.config().max_depth, 100);
		let resolved = scope.resolve(Node::from(vec![Node::component(|| "x".into()), Element::new("i").into()]));
		assert!(matches!(&resolved, Node::Collection(nodes) if matches!(nodes[0], Node::Text(_))));
		Element::new("b").child(resolved).into()
	});
	assert_eq!(render(&node), "<b>x<i></i></b>");
}

#[test]
fn provider_failures_escape_with_throw_on_error() {
	let node = Node::provider(|scope| scope.resolve(Node::try_component(|| Err::<Node, _>("inner"))));
	let config = RendererConfig {
		throw_on_error: true,
		..RendererConfig::default()
	};
	let mut renderer = StringRenderer::new(config).unwrap();
	assert!(matches!(renderer.render(&node), Err(RenderError::Producer(_))));
	assert_eq!(renderer.metrics().producer_errors, 1);
	assert_eq!(render(&node), "");

	let nested = Node::provider(|outer| outer.resolve(Node::provider(|inner| inner.resolve(Node::try_component(|| Err::<Node, _>("inner"))))));
	assert!(matches!(renderer.render(&nested), Err(RenderError::Producer(_))));
	assert_eq!(renderer.metrics().producer_errors, 1);
}

#[test]
fn minify() {
	let node = Node::from(
		Element::new("div")
			.child(Element::new("p").text("  hello   world  "))
			.child("   ")
			.child(Element::new("script").text("var  a = 1;"))
			.child(Element::new("p")),
	);
	let mut renderer = StringRenderer::new(RendererConfig {
		minify: true,
		..RendererConfig::default()
	})
	.unwrap();
	assert_eq!(
		renderer.render(&node).unwrap(),
		"<div><p> hello world </p><script>var  a = 1;</script><p></p></div>"
	);
	assert_eq!(markup::minify("<a> <!-- note --> <b>x</b>\n</a>"), "<a><b>x</b></a>");
}

#[test]
fn metrics() {
	let node = Node::from(Element::new("div").children([Element::new("a"), Element::new("b")]));
	let mut renderer = StringRenderer::new(RendererConfig {
		enable_cache: false,
		enable_monitoring: true,
		..RendererConfig::default()
	})
	.unwrap();
	renderer.render(&node).unwrap();
	let metrics = renderer.metrics();
	assert_eq!(metrics.elements_processed, 3);
	assert_eq!(metrics.cache_hits, 0);
	assert!(metrics.started_at.is_some());
	assert!(metrics.elapsed().is_some());
	if let Some(throughput) = metrics.throughput() {
		assert!(throughput > 0.0);
	}
}
