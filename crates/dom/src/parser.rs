//! Forgiving HTML parser feeding the arena.
//!
//! Byte-scanning, single pass. Mismatched end tags close open elements
//! implicitly; end tags with no matching open element are dropped. Form
//! controls created by a parse get their value property initialized from the
//! markup, the way a live tree would.

use crate::arena::DomArena;
use crate::error::{DomError, Result};
use crate::types::{is_raw_text_element, is_void_element, NodeId, NodeType};
use smallvec::SmallVec;

type AttrList = SmallVec<[(String, String); 4]>;

/// Parses a complete document into a fresh arena rooted at a `#document`
/// node.
pub fn parse_document(html: &str) -> Result<DomArena> {
    let mut arena = DomArena::new();
    let root = arena.alloc(NodeType::Document, "#document");
    arena.set_root(root)?;
    parse_into(&mut arena, html, root)?;
    tracing::debug!(nodes = arena.len(), "parsed document");
    Ok(arena)
}

/// Parses `html` and appends the resulting nodes as trailing children of
/// `parent`.
pub fn parse_into(arena: &mut DomArena, html: &str, parent: NodeId) -> Result<()> {
    let bytes = html.as_bytes();
    let mut stack = vec![parent];
    let mut created_elements: Vec<NodeId> = Vec::new();
    let mut i = 0usize;

    while i < bytes.len() {
        if starts_with_at(bytes, i, b"<!--") {
            let end = find_subslice(bytes, i + 4, b"-->")
                .ok_or_else(|| DomError::Markup("unclosed comment".into()))?;
            let top = top_of(&stack)?;
            let node = arena.alloc(NodeType::Comment, "#comment");
            arena.get_mut(node)?.value = html[i + 4..end].to_string();
            arena.append_child(top, node)?;
            i = end + 3;
            continue;
        }

        if starts_with_at(bytes, i, b"<!") {
            let end = find_byte(bytes, i, b'>')
                .ok_or_else(|| DomError::Markup("unclosed declaration".into()))?;
            let body = html[i + 2..end].trim();
            if body.len() >= 7 && body[..7].eq_ignore_ascii_case("doctype") {
                let top = top_of(&stack)?;
                let node = arena.alloc(NodeType::Doctype, "#doctype");
                arena.get_mut(node)?.value = body[7..].trim().to_string();
                arena.append_child(top, node)?;
            }
            i = end + 1;
            continue;
        }

        if starts_with_at(bytes, i, b"</") {
            let (tag, next) = parse_end_tag(html, i)?;
            i = next;
            // Pop to the matching open element; an end tag with no open
            // counterpart is dropped rather than closing unrelated elements.
            if stack.iter().skip(1).any(|&id| tag_matches(arena, id, &tag)) {
                while stack.len() > 1 {
                    let Some(top) = stack.pop() else { break };
                    if tag_matches(arena, top, &tag) {
                        break;
                    }
                }
            }
            continue;
        }

        if bytes[i] == b'<' && i + 1 < bytes.len() && bytes[i + 1].is_ascii_alphabetic() {
            let (tag, attributes, self_closing, next) = parse_start_tag(html, i)?;
            i = next;

            let top = top_of(&stack)?;
            let node = arena.alloc(NodeType::Element, tag.clone());
            arena.get_mut(node)?.attributes = attributes;
            arena.append_child(top, node)?;
            created_elements.push(node);

            if is_raw_text_element(&tag) {
                let close = find_raw_text_end(bytes, i, &tag);
                let end = close.unwrap_or(bytes.len());
                if end > i {
                    let text = arena.alloc(NodeType::Text, "#text");
                    arena.get_mut(text)?.value = html[i..end].to_string();
                    arena.append_child(node, text)?;
                }
                i = end;
                if close.is_some() {
                    let (_, after) = parse_end_tag(html, i)?;
                    i = after;
                }
                continue;
            }

            if !self_closing && !is_void_element(&tag) {
                stack.push(node);
            }
            continue;
        }

        // Text run up to the next tag open. A stray '<' stays literal text.
        let start = i;
        if bytes[i] == b'<' {
            i += 1;
        }
        while i < bytes.len() && bytes[i] != b'<' {
            i += 1;
        }
        let raw = &html[start..i];
        if !raw.is_empty() {
            let top = top_of(&stack)?;
            let text = arena.alloc(NodeType::Text, "#text");
            arena.get_mut(text)?.value = decode_entities(raw);
            arena.append_child(top, text)?;
        }
    }

    for id in created_elements {
        sync_control_value(arena, id)?;
    }
    Ok(())
}

/// Mirrors the live-tree rule that a control's value property starts out as
/// its markup value.
fn sync_control_value(arena: &mut DomArena, id: NodeId) -> Result<()> {
    let tag = match arena.get(id)?.tag_name() {
        Some(tag) => tag.to_string(),
        None => return Ok(()),
    };
    let value = match tag.as_str() {
        "input" => arena.get(id)?.attr("value").unwrap_or_default().to_string(),
        "option" => match arena.get(id)?.attr("value") {
            Some(value) => value.to_string(),
            None => arena.text_content(id)?,
        },
        "textarea" => arena.text_content(id)?,
        _ => return Ok(()),
    };
    arena.get_mut(id)?.value = value;
    Ok(())
}

fn top_of(stack: &[NodeId]) -> Result<NodeId> {
    stack
        .last()
        .copied()
        .ok_or_else(|| DomError::Markup("parser state corrupted".into()))
}

fn tag_matches(arena: &DomArena, id: NodeId, tag: &str) -> bool {
    arena.get(id).map(|node| node.name == tag).unwrap_or(false)
}

fn parse_start_tag(html: &str, at: usize) -> Result<(String, AttrList, bool, usize)> {
    let bytes = html.as_bytes();
    let mut i = at + 1;

    let tag_start = i;
    while i < bytes.len() && is_tag_char(bytes[i]) {
        i += 1;
    }
    let tag = html[tag_start..i].to_ascii_lowercase();
    if tag.is_empty() {
        return Err(DomError::Markup("empty tag name".into()));
    }

    let mut attributes: AttrList = SmallVec::new();
    let mut self_closing = false;

    loop {
        skip_ws(bytes, &mut i);
        if i >= bytes.len() {
            return Err(DomError::Markup(format!("unclosed start tag <{tag}>")));
        }
        if bytes[i] == b'>' {
            i += 1;
            break;
        }
        if bytes[i] == b'/' && bytes.get(i + 1) == Some(&b'>') {
            self_closing = true;
            i += 2;
            break;
        }

        let name_start = i;
        while i < bytes.len() && is_attr_name_char(bytes[i]) {
            i += 1;
        }
        if i == name_start {
            // Junk byte inside the tag, skip it.
            i += 1;
            continue;
        }
        let name = html[name_start..i].to_ascii_lowercase();

        skip_ws(bytes, &mut i);
        let value = if i < bytes.len() && bytes[i] == b'=' {
            i += 1;
            skip_ws(bytes, &mut i);
            parse_attr_value(html, &mut i)?
        } else {
            String::new()
        };

        // First occurrence wins, as in the platform tree.
        if !attributes.iter().any(|(existing, _)| *existing == name) {
            attributes.push((name, value));
        }
    }

    Ok((tag, attributes, self_closing, i))
}

fn parse_attr_value(html: &str, i: &mut usize) -> Result<String> {
    let bytes = html.as_bytes();
    match bytes.get(*i) {
        Some(&q) if q == b'"' || q == b'\'' => {
            *i += 1;
            let start = *i;
            while *i < bytes.len() && bytes[*i] != q {
                *i += 1;
            }
            if *i >= bytes.len() {
                return Err(DomError::Markup("unclosed attribute value".into()));
            }
            let raw = &html[start..*i];
            *i += 1;
            Ok(decode_entities(raw))
        }
        _ => {
            let start = *i;
            while *i < bytes.len() && !bytes[*i].is_ascii_whitespace() && bytes[*i] != b'>' {
                *i += 1;
            }
            Ok(decode_entities(&html[start..*i]))
        }
    }
}

fn parse_end_tag(html: &str, at: usize) -> Result<(String, usize)> {
    let bytes = html.as_bytes();
    let mut i = at + 2;
    skip_ws(bytes, &mut i);

    let tag_start = i;
    while i < bytes.len() && is_tag_char(bytes[i]) {
        i += 1;
    }
    let tag = html[tag_start..i].to_ascii_lowercase();
    if tag.is_empty() {
        return Err(DomError::Markup("empty end tag".into()));
    }

    while i < bytes.len() && bytes[i] != b'>' {
        i += 1;
    }
    if i >= bytes.len() {
        return Err(DomError::Markup("unclosed end tag".into()));
    }
    Ok((tag, i + 1))
}

fn find_raw_text_end(bytes: &[u8], from: usize, tag: &str) -> Option<usize> {
    let tag_bytes = tag.as_bytes();
    let mut i = from;
    while i + 1 < bytes.len() {
        if bytes[i] == b'<' && bytes[i + 1] == b'/' {
            let name_start = i + 2;
            let name_end = name_start + tag_bytes.len();
            if name_end <= bytes.len() && bytes[name_start..name_end].eq_ignore_ascii_case(tag_bytes)
            {
                match bytes.get(name_end) {
                    None | Some(b'>') => return Some(i),
                    Some(b) if b.is_ascii_whitespace() => return Some(i),
                    _ => {}
                }
            }
        }
        i += 1;
    }
    None
}

fn starts_with_at(bytes: &[u8], at: usize, pattern: &[u8]) -> bool {
    bytes[at..].starts_with(pattern)
}

fn find_subslice(bytes: &[u8], from: usize, pattern: &[u8]) -> Option<usize> {
    if from > bytes.len() {
        return None;
    }
    bytes[from..]
        .windows(pattern.len())
        .position(|window| window == pattern)
        .map(|pos| from + pos)
}

fn find_byte(bytes: &[u8], from: usize, byte: u8) -> Option<usize> {
    bytes[from..].iter().position(|&b| b == byte).map(|pos| from + pos)
}

fn skip_ws(bytes: &[u8], i: &mut usize) {
    while *i < bytes.len() && bytes[*i].is_ascii_whitespace() {
        *i += 1;
    }
}

fn is_tag_char(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' || byte == b':'
}

fn is_attr_name_char(byte: u8) -> bool {
    !byte.is_ascii_whitespace()
        && !matches!(byte, b'=' | b'>' | b'/' | b'"' | b'\'')
}

/// Named, decimal and hex character references. Unknown references stay
/// literal.
pub(crate) fn decode_entities(input: &str) -> String {
    if !input.contains('&') {
        return input.to_string();
    }
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        match rest[1..].find(';') {
            Some(end) if end > 0 && end <= 10 => {
                let name = &rest[1..1 + end];
                match decode_entity(name) {
                    Some(ch) => {
                        out.push(ch);
                        rest = &rest[end + 2..];
                    }
                    None => {
                        out.push('&');
                        rest = &rest[1..];
                    }
                }
            }
            _ => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let digits = name.strip_prefix('#')?;
            let hex = digits.strip_prefix('x').or_else(|| digits.strip_prefix('X'));
            let code = match hex {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => digits.parse::<u32>().ok()?,
            };
            char::from_u32(code)
        }
    }
}
