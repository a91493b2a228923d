//! Loads markup into detached nodes of any [`Dom`].
//!
//! This is a lenient fragment parser, not an HTML5 tree builder: there's no implicit closing of `<p>` or table fixups.
//! Unclosed elements are closed at the end of input and stray end tags are ignored.

use crate::{dom::Dom, Error};
use std::borrow::Cow;
use tracing::{instrument, trace};

pub(crate) const VOID_ELEMENTS: &[&str] = &["area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track", "wbr"];

/// Elements whose content is taken verbatim up to their end tag.
pub(crate) const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea"];

/// Parses `markup` into detached top-level nodes, in order.
///
/// # Errors
///
/// [`Error::Markup`] for unterminated tags and comments,
/// or whatever `dom` reports when it rejects a tag or attribute name.
#[instrument(skip(dom, markup), fields(markup.len = markup.len()))]
pub fn parse_fragment<D: Dom>(dom: &mut D, markup: &str) -> Result<Vec<D::Node>, Error> {
	let mut parser = Parser {
		markup,
		position: 0,
		roots: Vec::new(),
		open: Vec::new(),
	};
	parser.run(dom)?;
	trace!("Loaded {} top-level node(s).", parser.roots.len());
	Ok(parser.roots)
}

struct Parser<'m, N> {
	markup: &'m str,
	position: usize,
	roots: Vec<N>,
	open: Vec<(N, String)>,
}

impl<'m, N: Clone> Parser<'m, N> {
	fn rest(&self) -> &'m str {
		let markup: &'m str = self.markup;
		&markup[self.position..]
	}

	fn error(&self, reason: &'static str) -> Error {
		Error::Markup { offset: self.position, reason }
	}

	fn run<D: Dom<Node = N>>(&mut self, dom: &mut D) -> Result<(), Error> {
		while self.position < self.markup.len() {
			let rest = self.rest();
			if let Some(comment) = rest.strip_prefix("<!--") {
				let end = comment.find("-->").ok_or_else(|| self.error("unterminated comment"))?;
				let node = dom.create_comment(&comment[..end]);
				self.append(dom, node)?;
				self.position += 4 + end + 3;
			} else if rest.starts_with("</") {
				let end = rest.find('>').ok_or_else(|| self.error("unterminated end tag"))?;
				let name = rest[2..end].trim().to_ascii_lowercase();
				if let Some(depth) = self.open.iter().rposition(|(_, tag_name)| *tag_name == name) {
					self.open.truncate(depth);
				}
				self.position += end + 1;
			} else if rest.starts_with("<!") || rest.starts_with("<?") {
				let end = rest.find('>').ok_or_else(|| self.error("unterminated declaration"))?;
				self.position += end + 1;
			} else if rest.len() > 1 && rest.starts_with('<') && rest.as_bytes()[1].is_ascii_alphabetic() {
				self.start_tag(dom)?;
			} else {
				let first = rest.chars().next().map_or(1, char::len_utf8);
				let end = rest[first..].find('<').map_or(rest.len(), |end| end + first);
				let node = dom.create_text(&decode(&rest[..end]));
				self.append(dom, node)?;
				self.position += end;
			}
		}
		Ok(())
	}

	fn append<D: Dom<Node = N>>(&mut self, dom: &mut D, node: N) -> Result<(), Error> {
		match self.open.last() {
			Some((parent, _)) => dom.insert_before(parent, &node, None),
			None => {
				self.roots.push(node);
				Ok(())
			}
		}
	}

	fn start_tag<D: Dom<Node = N>>(&mut self, dom: &mut D) -> Result<(), Error> {
		let tag_start = self.position;
		self.position += 1;
		let name = self.take_while(|c| !c.is_ascii_whitespace() && c != '/' && c != '>').to_ascii_lowercase();
		let element = dom.create_element(&name)?;

		let self_closing = loop {
			self.take_while(|c| c.is_ascii_whitespace());
			let rest = self.rest();
			if rest.is_empty() {
				self.position = tag_start;
				return Err(self.error("unterminated start tag"));
			} else if rest.starts_with("/>") {
				self.position += 2;
				break true;
			} else if rest.starts_with('>') {
				self.position += 1;
				break false;
			} else if rest.starts_with('/') {
				self.position += 1;
				continue;
			}

			let attribute_name = self.take_while(|c| !c.is_ascii_whitespace() && c != '=' && c != '>' && c != '/').to_ascii_lowercase();
			if attribute_name.is_empty() {
				// Stray `=`.
				self.position += 1;
				continue;
			}
			self.take_while(|c| c.is_ascii_whitespace());
			let value = if self.rest().starts_with('=') {
				self.position += 1;
				self.take_while(|c| c.is_ascii_whitespace());
				self.attribute_value(tag_start)?
			} else {
				Cow::Borrowed("")
			};
			// The first occurrence of an attribute wins.
			if !dom.has_attribute(&element, &attribute_name) {
				dom.set_attribute(&element, &attribute_name, &value)?;
			}
		};

		self.append(dom, element.clone())?;
		if self_closing || VOID_ELEMENTS.contains(&name.as_str()) {
			return Ok(());
		}

		if RAW_TEXT_ELEMENTS.contains(&name.as_str()) {
			let rest = self.rest();
			let end = find_end_tag(rest, &name).unwrap_or(rest.len());
			if end > 0 {
				let text = if name == "textarea" { decode(&rest[..end]) } else { Cow::Borrowed(&rest[..end]) };
				let text = dom.create_text(&text);
				dom.insert_before(&element, &text, None)?;
			}
			self.position += end;
			if let Some(close) = self.rest().find('>') {
				self.position += close + 1;
			}
			return Ok(());
		}

		self.open.push((element, name));
		Ok(())
	}

	fn attribute_value(&mut self, tag_start: usize) -> Result<Cow<'m, str>, Error> {
		let rest = self.rest();
		match rest.chars().next() {
			Some(quote @ ('"' | '\'')) => {
				let end = rest[1..].find(quote).ok_or_else(|| Error::Markup {
					offset: tag_start,
					reason: "unterminated attribute value",
				})?;
				self.position += end + 2;
				Ok(decode(&rest[1..=end]))
			}
			_ => Ok(decode(self.take_while(|c| !c.is_ascii_whitespace() && c != '>'))),
		}
	}

	fn take_while(&mut self, predicate: impl Fn(char) -> bool) -> &'m str {
		let rest = self.rest();
		let end = rest.find(|c: char| !predicate(c)).unwrap_or(rest.len());
		self.position += end;
		&rest[..end]
	}
}

fn find_end_tag(rest: &str, name: &str) -> Option<usize> {
	let lowercase = rest.to_ascii_lowercase();
	let needle = format!("</{}", name);
	lowercase.find(&needle)
}

/// Resolves the common named and all numeric character references. Unknown ones are kept verbatim.
fn decode(text: &str) -> Cow<'_, str> {
	if !text.contains('&') {
		return Cow::Borrowed(text);
	}

	let mut decoded = String::with_capacity(text.len());
	let mut rest = text;
	while let Some(ampersand) = rest.find('&') {
		decoded.push_str(&rest[..ampersand]);
		rest = &rest[ampersand..];
		let reference = rest.find(';').filter(|&end| end <= 10).and_then(|end| Some((resolve(&rest[1..end])?, end)));
		match reference {
			Some((c, end)) => {
				decoded.push(c);
				rest = &rest[end + 1..];
			}
			None => {
				decoded.push('&');
				rest = &rest[1..];
			}
		}
	}
	decoded.push_str(rest);
	Cow::Owned(decoded)
}

fn resolve(name: &str) -> Option<char> {
	match name {
		"amp" => Some('&'),
		"lt" => Some('<'),
		"gt" => Some('>'),
		"quot" => Some('"'),
		"apos" => Some('\''),
		"nbsp" => Some('\u{a0}'),
		_ => {
			let number = name.strip_prefix('#')?;
			let code = match number.strip_prefix('x').or_else(|| number.strip_prefix('X')) {
				Some(hex) => u32::from_str_radix(hex, 16).ok()?,
				None => number.parse().ok()?,
			};
			char::from_u32(code)
		}
	}
}
