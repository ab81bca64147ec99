//! Markup serialization, the read side of the inner-markup duality.
//!
//! Output is canonical rather than byte-identical to the input: attributes
//! keep source order but are always double-quoted, text and attribute values
//! are re-escaped, void elements drop their closing tag.

use crate::arena::DomArena;
use crate::error::Result;
use crate::types::{is_raw_text_element, is_void_element, NodeId, NodeType};

/// Serialized markup of the node's children.
pub fn inner_html(arena: &DomArena, node_id: NodeId) -> Result<String> {
    let mut out = String::new();
    let node = arena.get(node_id)?;
    let raw = node.tag_name().map(is_raw_text_element).unwrap_or(false);
    for &child_id in &node.children_ids {
        write_node(arena, child_id, raw, &mut out)?;
    }
    Ok(out)
}

/// Serialized markup of the node itself, children included.
pub fn outer_html(arena: &DomArena, node_id: NodeId) -> Result<String> {
    let mut out = String::new();
    write_node(arena, node_id, false, &mut out)?;
    Ok(out)
}

fn write_node(arena: &DomArena, node_id: NodeId, raw: bool, out: &mut String) -> Result<()> {
    let node = arena.get(node_id)?;

    match node.node_type {
        NodeType::Document => {
            for &child_id in &node.children_ids {
                write_node(arena, child_id, false, out)?;
            }
        }
        NodeType::Doctype => {
            if node.value.is_empty() {
                out.push_str("<!DOCTYPE>");
            } else {
                out.push_str(&format!("<!DOCTYPE {}>", node.value));
            }
        }
        NodeType::Element => {
            out.push('<');
            out.push_str(&node.name);
            for (name, value) in &node.attributes {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                escape_attr(value, out);
                out.push('"');
            }
            out.push('>');

            if is_void_element(&node.name) {
                return Ok(());
            }

            let raw_children = is_raw_text_element(&node.name);
            for &child_id in &node.children_ids {
                write_node(arena, child_id, raw_children, out)?;
            }

            out.push_str("</");
            out.push_str(&node.name);
            out.push('>');
        }
        NodeType::Text => {
            if raw {
                out.push_str(&node.value);
            } else {
                escape_text(&node.value, out);
            }
        }
        NodeType::Comment => {
            out.push_str("<!--");
            out.push_str(&node.value);
            out.push_str("-->");
        }
    }

    Ok(())
}

fn escape_text(input: &str, out: &mut String) {
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
}

fn escape_attr(input: &str, out: &mut String) {
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
}
