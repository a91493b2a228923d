use dom_morph::{arena::Document, morph, Dom, Error, Mode, Options, Reference};

use arena_::{init_tracing, mount, parse, Recorder};

#[test]
fn button_text() {
	init_tracing();
	let mut document = Document::new();
	let button = parse(&mut document, "<button>Foo</button>");
	let text = document.first_child(&button).unwrap();

	let live = morph(&mut document, &button, Reference::Markup("<button>Bar</button>"), Options::default()).unwrap();

	assert_eq!(live, button);
	assert_eq!(document.outer_html(button), "<button>Bar</button>");
	assert_eq!(document.first_child(&button), Some(text));
}

#[test]
fn remove_around_match() {
	init_tracing();
	let mut document = Document::new();
	let div = parse(&mut document, "<div><a>A</a><b>B</b><c>C</c></div>");
	let b = document.children(div)[1];

	let mut recorder = Recorder::new();
	morph(
		&mut document,
		&div,
		Reference::Markup("<div><b>B</b></div>"),
		Options::default().with_hooks(&mut recorder),
	)
	.unwrap();

	assert_eq!(document.outer_html(div), "<div><b>B</b></div>");
	assert_eq!(document.children(div), vec![b]);
	assert_eq!(
		recorder.events(),
		vec![
			"before morphed div",
			"before removed a",
			"after removed a",
			"before morphed b",
			"before morphed \"B\"",
			"after morphed \"B\"",
			"after morphed b",
			"before removed c",
			"after removed c",
			"after morphed div",
		]
	);
}

#[test]
fn root_type_mismatch_replaces() {
	init_tracing();
	let mut document = Document::new();
	let (body, button) = mount(&mut document, "<button>Hi</button>");
	let div = parse(&mut document, r#"<div class="new">New</div>"#);

	let mut recorder = Recorder::new();
	let live = morph(&mut document, &button, Reference::Node(div), Options::default().with_hooks(&mut recorder)).unwrap();

	assert_eq!(live, div);
	assert_eq!(document.inner_html(body), r#"<div class="new">New</div>"#);
	assert_eq!(document.parent(&button), None);
	assert_eq!(document.outer_html(button), "<button>Hi</button>");
	assert_eq!(recorder.events(), vec!["before removed button", "before added div", "after added div", "after removed button"]);
}

#[test]
fn detached_root_mismatch_returns_reference() {
	init_tracing();
	let mut document = Document::new();
	let button = parse(&mut document, "<button>Hi</button>");

	let live = morph(&mut document, &button, Reference::Markup("<div>New</div>"), Options::default()).unwrap();

	assert_ne!(live, button);
	assert_eq!(document.outer_html(live), "<div>New</div>");
	assert_eq!(document.outer_html(button), "<button>Hi</button>");
}

#[test]
fn identical_reference_is_a_no_op() {
	init_tracing();
	let markup = r#"<form id="f"><label for="name">Name</label><input id="name" value="x"><!--c--><p>Text <em>here</em></p></form>"#;
	let mut document = Document::new();
	let (_, form) = mount(&mut document, markup);
	let reference = parse(&mut document, markup);

	let before = document.mutation_count();
	morph(&mut document, &form, Reference::Node(reference), Options::default()).unwrap();

	assert_eq!(document.mutation_count(), before);
	assert_eq!(document.outer_html(form), markup);
}

#[test]
fn attribute_writes_before_removals() {
	init_tracing();
	let mut document = Document::new();
	let div = parse(&mut document, r#"<div a="1" b="2" d="x"></div>"#);

	let mut recorder = Recorder::new();
	morph(
		&mut document,
		&div,
		Reference::Markup(r#"<div b="3" c="4" d="x"></div>"#),
		Options::default().with_hooks(&mut recorder),
	)
	.unwrap();

	assert_eq!(document.outer_html(div), r#"<div b="3" d="x" c="4"></div>"#);
	let attribute_events: Vec<_> = recorder.events().into_iter().filter(|event| event.contains('[')).collect();
	assert_eq!(attribute_events, vec!["before update div[b]", "before update div[c]", "before remove div[a]"]);
}

#[test]
fn positional_reuse_without_ids() {
	init_tracing();
	let mut document = Document::new();
	let ul = parse(&mut document, "<ul><li>1</li><li>2</li><li>3</li></ul>");
	let items = document.children(ul);

	morph(&mut document, &ul, Reference::Markup("<ul><li>3</li><li>1</li></ul>"), Options::default()).unwrap();

	assert_eq!(document.outer_html(ul), "<ul><li>3</li><li>1</li></ul>");
	assert_eq!(document.children(ul), items[..2].to_vec());
}

#[test]
fn kind_changes_are_replaced() {
	init_tracing();
	let mut document = Document::new();
	let div = parse(&mut document, "<div>text<!--note--><p>p</p></div>");

	morph(&mut document, &div, Reference::Markup("<div><!--note-->text<span>s</span></div>"), Options::default()).unwrap();

	assert_eq!(document.outer_html(div), "<div><!--note-->text<span>s</span></div>");
}

#[test]
fn inner_mode_keeps_root_attributes() {
	init_tracing();
	let mut document = Document::new();
	let div = parse(&mut document, r#"<div class="keep"><p>a</p></div>"#);
	let p = document.first_child(&div).unwrap();

	let live = morph(
		&mut document,
		&div,
		Reference::Markup("<p>b</p><span>c</span>"),
		Options::default().with_mode(Mode::Inner),
	)
	.unwrap();

	assert_eq!(live, div);
	assert_eq!(document.outer_html(div), r#"<div class="keep"><p>b</p><span>c</span></div>"#);
	assert_eq!(document.first_child(&div), Some(p));
}

#[test]
fn inner_mode_with_nothing_clears() {
	init_tracing();
	let mut document = Document::new();
	let div = parse(&mut document, "<div><p>a</p>b</div>");

	morph(&mut document, &div, Reference::Nodes(Vec::new()), Options::default().with_mode(Mode::Inner)).unwrap();

	assert_eq!(document.outer_html(div), "<div></div>");
}

#[test]
fn outer_mode_places_siblings() {
	init_tracing();
	let mut document = Document::new();
	let (body, section) = mount(&mut document, r#"<section id="main"><p>old</p></section>"#);

	let live = morph(
		&mut document,
		&section,
		Reference::Markup(r#"<header>h</header><section id="main"><p>new</p></section><footer>f</footer>"#),
		Options::default(),
	)
	.unwrap();

	assert_eq!(live, section);
	assert_eq!(document.inner_html(body), r#"<header>h</header><section id="main"><p>new</p></section><footer>f</footer>"#);
}

#[test]
fn outer_mode_without_parent_drops_siblings() {
	init_tracing();
	let mut document = Document::new();
	let p = parse(&mut document, "<p>x</p>");

	let live = morph(&mut document, &p, Reference::Markup("<i>a</i><p>y</p>"), Options::default()).unwrap();

	assert_eq!(live, p);
	assert_eq!(document.outer_html(p), "<p>y</p>");
	assert_eq!(document.parent(&p), None);
}

#[test]
fn entangled_reference_is_rejected() {
	init_tracing();
	let mut document = Document::new();
	let div = parse(&mut document, "<div><p>a</p></div>");
	let p = document.first_child(&div).unwrap();
	let before = document.mutation_count();

	assert_eq!(morph(&mut document, &div, Reference::Node(p), Options::default()), Err(Error::Entangled));
	assert_eq!(morph(&mut document, &p, Reference::Node(div), Options::default()), Err(Error::Entangled));
	assert_eq!(document.mutation_count(), before);
}

#[test]
fn foreign_reference_is_rejected() {
	init_tracing();
	let mut document = Document::new();
	let mut other = Document::new();
	let div = parse(&mut document, "<div></div>");
	let foreign = parse(&mut other, "<div>x</div>");

	assert!(matches!(
		morph(&mut document, &div, Reference::Node(foreign), Options::default()),
		Err(Error::ForeignNode(_))
	));
	assert_eq!(document.outer_html(div), "<div></div>");
}

#[test]
fn empty_outer_reference_is_rejected() {
	init_tracing();
	let mut document = Document::new();
	let div = parse(&mut document, "<div>a</div>");

	assert_eq!(morph(&mut document, &div, Reference::Nodes(Vec::new()), Options::default()), Err(Error::EmptyReference));
	assert_eq!(morph(&mut document, &div, Reference::Markup(""), Options::default()), Err(Error::EmptyReference));
	assert_eq!(document.outer_html(div), "<div>a</div>");
}

#[test]
fn malformed_markup_is_rejected() {
	init_tracing();
	let mut document = Document::new();
	let div = parse(&mut document, "<div>a</div>");

	assert!(matches!(
		morph(&mut document, &div, Reference::Markup("<div class=\"x"), Options::default()),
		Err(Error::Markup { .. })
	));
	assert_eq!(document.outer_html(div), "<div>a</div>");
}
