use dom_morph::{
	arena::{Document, NodeId},
	morph, ControlKind, Dom, Flag, Options, Reference,
};

use arena_::{by_id, init_tracing, mount, parse};

#[test]
fn control_kinds() {
	let mut document = Document::new();
	let nodes = document
		.parse_fragment(r#"<input><input type="FILE"><input type="checkbox"><option></option><textarea></textarea><select></select>"#)
		.unwrap();
	let kinds: Vec<_> = nodes.iter().map(|node| ControlKind::of(&document, node)).collect();
	assert_eq!(
		kinds,
		vec![
			ControlKind::TextEntry,
			ControlKind::Generic,
			ControlKind::TextEntry,
			ControlKind::Choice,
			ControlKind::MultiLineText,
			ControlKind::Generic,
		]
	);
}

#[test]
fn typed_value_is_overwritten() {
	init_tracing();
	let mut document = Document::new();
	let input = parse(&mut document, r#"<input value="a">"#);
	document.set_value(&input, "typed");

	morph(&mut document, &input, Reference::Markup(r#"<input value="b">"#), Options::default()).unwrap();

	assert_eq!(document.value(&input), "b");
	assert_eq!(document.attribute(&input, "value").as_deref(), Some("b"));
}

#[test]
fn missing_value_clears() {
	init_tracing();
	let mut document = Document::new();
	let input = parse(&mut document, r#"<input value="a">"#);
	document.set_value(&input, "typed");

	morph(&mut document, &input, Reference::Markup("<input>"), Options::default()).unwrap();

	assert_eq!(document.value(&input), "");
	assert_eq!(document.attribute(&input, "value"), None);
}

#[test]
fn checked_follows_reference() {
	init_tracing();
	let mut document = Document::new();
	let input = parse(&mut document, r#"<input type="checkbox">"#);
	document.set_flag(&input, Flag::Checked, true);

	morph(&mut document, &input, Reference::Markup(r#"<input type="checkbox">"#), Options::default()).unwrap();
	assert!(!document.flag(&input, Flag::Checked));

	morph(&mut document, &input, Reference::Markup(r#"<input type="checkbox" checked>"#), Options::default()).unwrap();
	assert!(document.flag(&input, Flag::Checked));
	assert_eq!(document.attribute(&input, "checked").as_deref(), Some(""));
}

#[test]
fn disabled_follows_reference() {
	init_tracing();
	let mut document = Document::new();
	let input = parse(&mut document, "<input disabled>");

	morph(&mut document, &input, Reference::Markup("<input>"), Options::default()).unwrap();
	assert!(!document.flag(&input, Flag::Disabled));

	morph(&mut document, &input, Reference::Markup("<input disabled>"), Options::default()).unwrap();
	assert!(document.flag(&input, Flag::Disabled));
}

#[test]
fn selected_follows_reference() {
	init_tracing();
	let mut document = Document::new();
	let select = parse(&mut document, "<select><option>a</option><option>b</option></select>");
	let [a, b]: [_; 2] = document.children(select).try_into().unwrap();
	document.set_flag(&a, Flag::Selected, true);

	morph(&mut document, &select, Reference::Markup("<select><option>a</option><option selected>b</option></select>"), Options::default()).unwrap();

	assert_eq!(document.children(select), vec![a, b]);
	assert!(!document.flag(&a, Flag::Selected));
	assert!(document.flag(&b, Flag::Selected));
}

#[test]
fn text_area_value_and_content() {
	init_tracing();
	let mut document = Document::new();
	let text_area = parse(&mut document, "<textarea>old</textarea>");
	let text = document.first_child(&text_area).unwrap();
	document.set_value(&text_area, "typed");

	morph(&mut document, &text_area, Reference::Markup("<textarea>new</textarea>"), Options::default()).unwrap();

	assert_eq!(document.value(&text_area), "new");
	assert_eq!(document.outer_html(text_area), "<textarea>new</textarea>");
	assert_eq!(document.first_child(&text_area), Some(text));
}

#[test]
fn file_inputs_keep_their_value() {
	init_tracing();
	let mut document = Document::new();
	let input = parse(&mut document, r#"<input type="file">"#);
	document.set_value(&input, "C:\\fakepath\\a.txt");

	morph(&mut document, &input, Reference::Markup(r#"<input type="file">"#), Options::default()).unwrap();

	assert_eq!(document.value(&input), "C:\\fakepath\\a.txt");
}

#[test]
fn ignore_active_leaves_focused_element_alone() {
	init_tracing();
	let mut document = Document::new();
	let (_, div) = mount(&mut document, r#"<div><input id="name" value="a"><p>x</p></div>"#);
	let input = by_id(&document, div, "name");
	document.focus(&input).unwrap();

	morph(
		&mut document,
		&div,
		Reference::Markup(r#"<div><input id="name" value="b" class="c"><p>y</p></div>"#),
		Options::default().with_ignore_active(true),
	)
	.unwrap();

	assert_eq!(document.outer_html(div), r#"<div><input id="name" value="a"><p>y</p></div>"#);
	assert_eq!(document.active_element(), Some(input));
}

#[test]
fn ignore_active_value_keeps_what_was_typed() {
	init_tracing();
	let mut document = Document::new();
	let (_, div) = mount(&mut document, r#"<div><input id="name" value="a"></div>"#);
	let input = by_id(&document, div, "name");
	document.focus(&input).unwrap();
	document.set_value(&input, "typed");

	morph(
		&mut document,
		&div,
		Reference::Markup(r#"<div><input id="name" value="b" class="c"></div>"#),
		Options::default().with_ignore_active_value(true),
	)
	.unwrap();

	assert_eq!(document.attribute(&input, "class").as_deref(), Some("c"));
	assert_eq!(document.attribute(&input, "value").as_deref(), Some("a"));
	assert_eq!(document.value(&input), "typed");
}

const ROTATED: &str = r#"<div><input id="c"><input id="a"><input id="b"></div>"#;

fn focus_last(document: &mut Document) -> (NodeId, NodeId) {
	let (_, div) = mount(document, r#"<div><input id="a"><input id="b"><input id="c"></div>"#);
	let c = by_id(document, div, "c");
	document.focus(&c).unwrap();
	document.set_selection_range(&c, 1, 2).unwrap();
	(div, c)
}

#[test]
fn focus_is_lost_without_restore() {
	init_tracing();
	let mut document = Document::new();
	let (div, _) = focus_last(&mut document);

	morph(&mut document, &div, Reference::Markup(ROTATED), Options::default()).unwrap();

	assert_eq!(document.active_element(), None);
}

#[test]
fn restore_focus_moves_to_successor() {
	init_tracing();
	let mut document = Document::new();
	let (div, c) = focus_last(&mut document);

	morph(&mut document, &div, Reference::Markup(ROTATED), Options::default().with_restore_focus(true)).unwrap();

	let successor = by_id(&document, div, "c");
	assert_ne!(successor, c);
	assert_eq!(document.active_element(), Some(successor));
	assert_eq!(document.selection_range(&successor), Some((1, 2)));
}

#[test]
fn restore_focus_after_two_pass_keeps_the_node() {
	init_tracing();
	let mut document = Document::new();
	let (div, c) = focus_last(&mut document);

	morph(
		&mut document,
		&div,
		Reference::Markup(ROTATED),
		Options::default().with_two_pass(true).with_restore_focus(true),
	)
	.unwrap();

	assert_eq!(document.outer_html(div), ROTATED);
	assert_eq!(by_id(&document, div, "c"), c);
	assert_eq!(document.active_element(), Some(c));
	assert_eq!(document.selection_range(&c), Some((1, 2)));
}

#[test]
fn unchecked_box_keeps_its_attribute_value() {
	init_tracing();
	let markup = r#"<div><input type="checkbox" checked="checked"></div>"#;
	let mut document = Document::new();
	let div = parse(&mut document, markup);
	let input = document.first_child(&div).unwrap();
	document.set_flag(&input, Flag::Checked, false);
	let before = document.mutation_count();

	morph(&mut document, &div, Reference::Markup(markup), Options::default()).unwrap();

	assert_eq!(document.outer_html(div), markup);
	assert!(document.flag(&input, Flag::Checked));
	assert_eq!(document.mutation_count(), before + 1);
}
