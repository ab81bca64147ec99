//! CSS selector subset: parsing and matching against the arena.
//!
//! Supported: tag, `*`, `#id`, `.class`, attribute conditions
//! (`[a]` `[a=v]` `[a^=v]` `[a$=v]` `[a*=v]` `[a~=v]` `[a|=v]`), the
//! pseudo-classes `:first-child` `:last-child` `:only-child` `:empty`,
//! the four combinators and comma groups. Anything else is rejected as
//! `UnsupportedSelector`.
//!
//! Matching is right-to-left: a candidate node is tested against the
//! rightmost step and combinators walk outward from there.

use crate::arena::DomArena;
use crate::error::{DomError, Result};
use crate::types::{DomNode, NodeId};

#[derive(Debug, Clone, PartialEq, Eq)]
enum AttrCondition {
    Exists { key: String },
    Eq { key: String, value: String },
    StartsWith { key: String, value: String },
    EndsWith { key: String, value: String },
    Contains { key: String, value: String },
    Includes { key: String, value: String },
    DashMatch { key: String, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PseudoClass {
    FirstChild,
    LastChild,
    OnlyChild,
    Empty,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct SelectorStep {
    tag: Option<String>,
    universal: bool,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrCondition>,
    pseudo_classes: Vec<PseudoClass>,
}

impl SelectorStep {
    fn is_empty(&self) -> bool {
        *self == SelectorStep::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
    AdjacentSibling,
    GeneralSibling,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct SelectorPart {
    step: SelectorStep,
    // Relation to the previous (left) part; None only on the first part.
    combinator: Option<Combinator>,
}

/// A parsed selector: one or more comma-separated chains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    groups: Vec<Vec<SelectorPart>>,
}

impl Selector {
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(DomError::UnsupportedSelector(input.into()));
        }

        let mut groups = Vec::new();
        for group in split_groups(trimmed)? {
            groups.push(parse_chain(&group)?);
        }
        Ok(Self { groups })
    }
}

/// Every element below `scope` (in document order) matching the selector.
/// Ancestors above `scope` still participate in combinator matching, the
/// same way a scoped platform query behaves.
pub fn query_all(arena: &DomArena, scope: NodeId, selector: &Selector) -> Result<Vec<NodeId>> {
    let mut out = Vec::new();
    for node_id in arena.descendants(scope)? {
        if arena.get(node_id)?.is_element() && matches(arena, node_id, selector)? {
            out.push(node_id);
        }
    }
    Ok(out)
}

/// Whether a single node matches the selector.
pub fn matches(arena: &DomArena, node_id: NodeId, selector: &Selector) -> Result<bool> {
    for group in &selector.groups {
        if matches_from(arena, node_id, group, group.len() - 1)? {
            return Ok(true);
        }
    }
    Ok(false)
}

fn matches_from(arena: &DomArena, node_id: NodeId, parts: &[SelectorPart], idx: usize) -> Result<bool> {
    if !matches_step(arena, node_id, &parts[idx].step)? {
        return Ok(false);
    }
    let Some(combinator) = parts[idx].combinator else {
        return Ok(true);
    };
    let prev = idx - 1;

    match combinator {
        Combinator::Child => match arena.get(node_id)?.parent_id {
            Some(parent) => matches_from(arena, parent, parts, prev),
            None => Ok(false),
        },
        Combinator::Descendant => {
            for ancestor in arena.ancestors(node_id)? {
                if matches_from(arena, ancestor, parts, prev)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        Combinator::AdjacentSibling => match preceding_element_siblings(arena, node_id)?.last() {
            Some(&sibling) => matches_from(arena, sibling, parts, prev),
            None => Ok(false),
        },
        Combinator::GeneralSibling => {
            for sibling in preceding_element_siblings(arena, node_id)? {
                if matches_from(arena, sibling, parts, prev)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
    }
}

fn matches_step(arena: &DomArena, node_id: NodeId, step: &SelectorStep) -> Result<bool> {
    let node = arena.get(node_id)?;
    if !node.is_element() {
        return Ok(false);
    }
    if let Some(tag) = &step.tag {
        if node.name != *tag {
            return Ok(false);
        }
    }
    if let Some(id) = &step.id {
        if node.attr("id") != Some(id.as_str()) {
            return Ok(false);
        }
    }
    for class in &step.classes {
        if !node.has_class(class) {
            return Ok(false);
        }
    }
    for condition in &step.attrs {
        if !attr_condition_holds(node, condition) {
            return Ok(false);
        }
    }
    for pseudo in &step.pseudo_classes {
        if !pseudo_holds(arena, node_id, *pseudo)? {
            return Ok(false);
        }
    }
    Ok(true)
}

fn attr_condition_holds(node: &DomNode, condition: &AttrCondition) -> bool {
    match condition {
        AttrCondition::Exists { key } => node.attr(key).is_some(),
        AttrCondition::Eq { key, value } => node.attr(key) == Some(value.as_str()),
        AttrCondition::StartsWith { key, value } => {
            node.attr(key).map(|a| a.starts_with(value.as_str())).unwrap_or(false)
        }
        AttrCondition::EndsWith { key, value } => {
            node.attr(key).map(|a| a.ends_with(value.as_str())).unwrap_or(false)
        }
        AttrCondition::Contains { key, value } => {
            node.attr(key).map(|a| a.contains(value.as_str())).unwrap_or(false)
        }
        AttrCondition::Includes { key, value } => node
            .attr(key)
            .map(|a| a.split_whitespace().any(|token| token == value))
            .unwrap_or(false),
        AttrCondition::DashMatch { key, value } => node
            .attr(key)
            .map(|a| a == value || a.starts_with(&format!("{value}-")))
            .unwrap_or(false),
    }
}

fn pseudo_holds(arena: &DomArena, node_id: NodeId, pseudo: PseudoClass) -> Result<bool> {
    if pseudo == PseudoClass::Empty {
        return Ok(arena.get(node_id)?.children_ids.is_empty());
    }

    let Some(parent) = arena.get(node_id)?.parent_id else {
        // A parentless element is trivially its only sibling.
        return Ok(true);
    };
    let siblings: Vec<NodeId> = arena
        .get(parent)?
        .children_ids
        .iter()
        .copied()
        .filter(|&id| arena.get(id).map(|n| n.is_element()).unwrap_or(false))
        .collect();
    let position = siblings.iter().position(|&id| id == node_id);

    Ok(match pseudo {
        PseudoClass::FirstChild => position == Some(0),
        PseudoClass::LastChild => position == Some(siblings.len().saturating_sub(1)),
        PseudoClass::OnlyChild => siblings.len() == 1 && position == Some(0),
        PseudoClass::Empty => unreachable!("handled above"),
    })
}

fn preceding_element_siblings(arena: &DomArena, node_id: NodeId) -> Result<Vec<NodeId>> {
    let Some(parent) = arena.get(node_id)?.parent_id else {
        return Ok(Vec::new());
    };
    let mut out = Vec::new();
    for &sibling in &arena.get(parent)?.children_ids {
        if sibling == node_id {
            break;
        }
        if arena.get(sibling)?.is_element() {
            out.push(sibling);
        }
    }
    Ok(out)
}

fn split_groups(selector: &str) -> Result<Vec<String>> {
    let mut groups = Vec::new();
    let mut current = String::new();
    let mut bracket_depth = 0usize;

    for ch in selector.chars() {
        match ch {
            '[' => {
                bracket_depth += 1;
                current.push(ch);
            }
            ']' => {
                if bracket_depth == 0 {
                    return Err(DomError::UnsupportedSelector(selector.into()));
                }
                bracket_depth -= 1;
                current.push(ch);
            }
            ',' if bracket_depth == 0 => {
                let trimmed = current.trim();
                if trimmed.is_empty() {
                    return Err(DomError::UnsupportedSelector(selector.into()));
                }
                groups.push(trimmed.to_string());
                current.clear();
            }
            _ => current.push(ch),
        }
    }

    if bracket_depth != 0 {
        return Err(DomError::UnsupportedSelector(selector.into()));
    }
    let trimmed = current.trim();
    if trimmed.is_empty() {
        return Err(DomError::UnsupportedSelector(selector.into()));
    }
    groups.push(trimmed.to_string());
    Ok(groups)
}

fn parse_chain(selector: &str) -> Result<Vec<SelectorPart>> {
    let tokens = tokenize(selector)?;
    let mut parts = Vec::new();
    let mut pending_combinator: Option<Combinator> = None;

    for token in tokens {
        if let Some(combinator) = combinator_for(&token) {
            if pending_combinator.is_some() || parts.is_empty() {
                return Err(DomError::UnsupportedSelector(selector.into()));
            }
            pending_combinator = Some(combinator);
            continue;
        }

        let step = parse_step(&token)?;
        let combinator = if parts.is_empty() {
            None
        } else {
            Some(pending_combinator.take().unwrap_or(Combinator::Descendant))
        };
        parts.push(SelectorPart { step, combinator });
    }

    if parts.is_empty() || pending_combinator.is_some() {
        return Err(DomError::UnsupportedSelector(selector.into()));
    }
    Ok(parts)
}

fn combinator_for(token: &str) -> Option<Combinator> {
    match token {
        ">" => Some(Combinator::Child),
        "+" => Some(Combinator::AdjacentSibling),
        "~" => Some(Combinator::GeneralSibling),
        _ => None,
    }
}

fn tokenize(selector: &str) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut bracket_depth = 0usize;

    for ch in selector.chars() {
        match ch {
            '[' => {
                bracket_depth += 1;
                current.push(ch);
            }
            ']' => {
                bracket_depth = bracket_depth
                    .checked_sub(1)
                    .ok_or_else(|| DomError::UnsupportedSelector(selector.into()))?;
                current.push(ch);
            }
            c if bracket_depth == 0 && c.is_whitespace() => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            '>' | '+' | '~' if bracket_depth == 0 => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
                tokens.push(ch.to_string());
            }
            _ => current.push(ch),
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    Ok(tokens)
}

fn parse_step(token: &str) -> Result<SelectorStep> {
    let mut step = SelectorStep::default();
    let mut chars = token.chars().peekable();

    match chars.peek() {
        Some('*') => {
            step.universal = true;
            chars.next();
        }
        Some(c) if c.is_ascii_alphabetic() => {
            let mut tag = String::new();
            while let Some(&c) = chars.peek() {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    tag.push(c);
                    chars.next();
                } else {
                    break;
                }
            }
            step.tag = Some(tag.to_ascii_lowercase());
        }
        _ => {}
    }

    while let Some(ch) = chars.next() {
        match ch {
            '#' => {
                let name = read_name(&mut chars);
                if name.is_empty() {
                    return Err(DomError::UnsupportedSelector(token.into()));
                }
                step.id = Some(name);
            }
            '.' => {
                let name = read_name(&mut chars);
                if name.is_empty() {
                    return Err(DomError::UnsupportedSelector(token.into()));
                }
                step.classes.push(name);
            }
            '[' => {
                let mut body = String::new();
                let mut closed = false;
                for c in chars.by_ref() {
                    if c == ']' {
                        closed = true;
                        break;
                    }
                    body.push(c);
                }
                if !closed {
                    return Err(DomError::UnsupportedSelector(token.into()));
                }
                step.attrs.push(parse_attr_condition(&body, token)?);
            }
            ':' => {
                let name = read_name(&mut chars);
                let pseudo = match name.as_str() {
                    "first-child" => PseudoClass::FirstChild,
                    "last-child" => PseudoClass::LastChild,
                    "only-child" => PseudoClass::OnlyChild,
                    "empty" => PseudoClass::Empty,
                    _ => return Err(DomError::UnsupportedSelector(token.into())),
                };
                step.pseudo_classes.push(pseudo);
            }
            _ => return Err(DomError::UnsupportedSelector(token.into())),
        }
    }

    if step.is_empty() {
        return Err(DomError::UnsupportedSelector(token.into()));
    }
    Ok(step)
}

fn read_name(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut name = String::new();
    while let Some(&c) = chars.peek() {
        if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
            name.push(c);
            chars.next();
        } else {
            break;
        }
    }
    name
}

fn parse_attr_condition(body: &str, token: &str) -> Result<AttrCondition> {
    let body = body.trim();
    const OPS: &[&str] = &["^=", "$=", "*=", "~=", "|=", "="];

    for op in OPS {
        if let Some(pos) = body.find(op) {
            let key = body[..pos].trim().to_string();
            let value = unquote(body[pos + op.len()..].trim()).to_string();
            if key.is_empty() {
                return Err(DomError::UnsupportedSelector(token.into()));
            }
            return Ok(match *op {
                "^=" => AttrCondition::StartsWith { key, value },
                "$=" => AttrCondition::EndsWith { key, value },
                "*=" => AttrCondition::Contains { key, value },
                "~=" => AttrCondition::Includes { key, value },
                "|=" => AttrCondition::DashMatch { key, value },
                _ => AttrCondition::Eq { key, value },
            });
        }
    }

    if body.is_empty() {
        return Err(DomError::UnsupportedSelector(token.into()));
    }
    Ok(AttrCondition::Exists {
        key: body.to_string(),
    })
}

fn unquote(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2
        && (bytes[0] == b'"' || bytes[0] == b'\'')
        && bytes[bytes.len() - 1] == bytes[0]
    {
        &value[1..value.len() - 1]
    } else {
        value
    }
}
