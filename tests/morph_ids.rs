use dom_morph::{arena::Document, morph, Dom, Options, Reference};

use arena_::{by_id, init_tracing, parse, Recorder};

const INPUTS: &str = r#"<div><label>1</label><input id="first"><label>2</label><input id="second"><label>3</label><input id="third"></div>"#;
const ROTATED: &str = r#"<div><label>3</label><input id="third"><label>1</label><input id="first"><label>2</label><input id="second"></div>"#;

#[test]
fn budget_stops_forward_scan() {
	init_tracing();
	let mut document = Document::new();
	let div = parse(&mut document, INPUTS);
	let children = document.children(div);
	let (first_label, first, second, third) = (children[0], children[1], children[3], children[5]);

	morph(&mut document, &div, Reference::Markup(ROTATED), Options::default()).unwrap();

	assert_eq!(document.outer_html(div), ROTATED);
	assert_eq!(by_id(&document, div, "first"), first);
	assert_eq!(by_id(&document, div, "second"), second);
	assert_ne!(by_id(&document, div, "third"), third);
	assert_eq!(document.parent(&third), None);
	// The first label was reused for "3", in place.
	assert_eq!(document.children(div)[0], first_label);
}

#[test]
fn budget_scenario_two_pass_keeps_all_inputs() {
	init_tracing();
	let mut document = Document::new();
	let div = parse(&mut document, INPUTS);
	let children = document.children(div);
	let (first, second, third) = (children[1], children[3], children[5]);

	morph(&mut document, &div, Reference::Markup(ROTATED), Options::default().with_two_pass(true)).unwrap();

	assert_eq!(document.outer_html(div), ROTATED);
	assert_eq!(by_id(&document, div, "first"), first);
	assert_eq!(by_id(&document, div, "second"), second);
	assert_eq!(by_id(&document, div, "third"), third);
}

#[test]
fn rotation_single_pass() {
	init_tracing();
	let mut document = Document::new();
	let ul = parse(&mut document, r#"<ul><li id="a">A</li><li id="b">B</li><li id="c">C</li></ul>"#);
	let [a, b, c]: [_; 3] = document.children(ul).try_into().unwrap();

	let mut recorder = Recorder::new();
	morph(
		&mut document,
		&ul,
		Reference::Markup(r#"<ul><li id="c">C</li><li id="a">A</li><li id="b">B</li></ul>"#),
		Options::default().with_hooks(&mut recorder),
	)
	.unwrap();

	assert_eq!(document.outer_html(ul), r#"<ul><li id="c">C</li><li id="a">A</li><li id="b">B</li></ul>"#);
	let children = document.children(ul);
	assert_eq!(children[1..], [a, b]);
	assert_ne!(children[0], c);
	let events = recorder.events();
	assert!(events.contains(&"after added li#c".to_owned()));
	assert!(events.contains(&"after removed li#c".to_owned()));
}

#[test]
fn rotation_two_pass() {
	init_tracing();
	let mut document = Document::new();
	let ul = parse(&mut document, r#"<ul><li id="a">A</li><li id="b">B</li><li id="c">C</li></ul>"#);
	let [a, b, c]: [_; 3] = document.children(ul).try_into().unwrap();

	let mut recorder = Recorder::new();
	morph(
		&mut document,
		&ul,
		Reference::Markup(r#"<ul><li id="c">C</li><li id="a">A</li><li id="b">B</li></ul>"#),
		Options::default().with_two_pass(true).with_hooks(&mut recorder),
	)
	.unwrap();

	assert_eq!(document.outer_html(ul), r#"<ul><li id="c">C</li><li id="a">A</li><li id="b">B</li></ul>"#);
	assert_eq!(document.children(ul), vec![c, a, b]);
	let events = recorder.events();
	assert!(events.contains(&"before held li#c".to_owned()));
	assert!(!events.iter().any(|event| event.contains("added") || event.contains("removed")), "{:#?}", events);
}

#[test]
fn duplicate_ids_fall_back_to_position() {
	init_tracing();
	let mut document = Document::new();
	let div = parse(&mut document, r#"<div><p id="x">1</p><p id="x">2</p></div>"#);
	let first = document.first_child(&div).unwrap();

	morph(&mut document, &div, Reference::Markup(r#"<div><p id="x">3</p></div>"#), Options::default()).unwrap();

	assert_eq!(document.outer_html(div), r#"<div><p id="x">3</p></div>"#);
	assert_eq!(document.first_child(&div), Some(first));
}

#[test]
fn duplicate_ids_in_reference_fall_back_to_position() {
	init_tracing();
	let mut document = Document::new();
	let div = parse(&mut document, r#"<div><p>1</p><p id="x">2</p></div>"#);
	let children = document.children(div);

	morph(&mut document, &div, Reference::Markup(r#"<div><p id="x">3</p><p id="x">4</p></div>"#), Options::default()).unwrap();

	assert_eq!(document.outer_html(div), r#"<div><p id="x">3</p><p id="x">4</p></div>"#);
	assert_eq!(document.children(div), children);
}

#[test]
fn id_on_different_tags_is_not_persistent() {
	init_tracing();
	let mut document = Document::new();
	let div = parse(&mut document, r#"<div><span id="x">a</span><p>b</p></div>"#);
	let p = document.children(div)[1];

	morph(&mut document, &div, Reference::Markup(r#"<div><p id="x">c</p></div>"#), Options::default()).unwrap();

	assert_eq!(document.outer_html(div), r#"<div><p id="x">c</p></div>"#);
	assert_eq!(document.first_child(&div), Some(p));
}

#[test]
fn ids_protect_ancestors_from_soft_matching() {
	init_tracing();
	let mut document = Document::new();
	let div = parse(&mut document, r#"<div><section><p id="deep">x</p></section><aside>a</aside></div>"#);
	let [section, aside]: [_; 2] = document.children(div).try_into().unwrap();
	let deep = by_id(&document, div, "deep");

	morph(
		&mut document,
		&div,
		Reference::Markup(r#"<div><aside>b</aside><section><p id="deep">y</p></section></div>"#),
		Options::default(),
	)
	.unwrap();

	assert_eq!(document.outer_html(div), r#"<div><aside>b</aside><section><p id="deep">y</p></section></div>"#);
	let children = document.children(div);
	assert_eq!(children[1], section);
	assert_ne!(children[0], aside);
	assert_eq!(by_id(&document, div, "deep"), deep);
}

#[test]
fn nested_id_moves_across_parents_in_two_pass() {
	init_tracing();
	let mut document = Document::new();
	let div = parse(&mut document, r#"<div><div><span id="x">1</span></div><article><span>2</span></article></div>"#);
	let span = by_id(&document, div, "x");

	morph(
		&mut document,
		&div,
		Reference::Markup(r#"<div><article><span id="x">3</span></article></div>"#),
		Options::default().with_two_pass(true),
	)
	.unwrap();

	assert_eq!(document.outer_html(div), r#"<div><article><span id="x">3</span></article></div>"#);
	assert_eq!(by_id(&document, div, "x"), span);
}
