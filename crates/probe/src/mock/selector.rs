//! CSS selector subset understood by the in-memory storefront.
//!
//! Supported: type (`button`), universal (`*`), `#id`, `.class`, `[attr]`,
//! `[attr=value]` (quoted or bare), descendant and child (`>`) combinators,
//! and comma-separated groups.

use super::dom::{Document, NodeId};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct SelectorStep {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrCondition>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttrCondition {
    name: String,
    value: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct SelectorPart {
    step: SelectorStep,
    // Relation to the part on the left; `None` for the leftmost part.
    combinator: Option<Combinator>,
}

/// Parsed selector: one chain per comma-separated group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList {
    groups: Vec<Vec<SelectorPart>>,
}

impl SelectorList {
    /// Parse a selector, returning the offending text on failure
    pub fn parse(selector: &str) -> Result<Self, String> {
        let groups = split_groups(selector)
            .into_iter()
            .map(|group| parse_chain(group).ok_or_else(|| selector.to_string()))
            .collect::<Result<Vec<_>, _>>()?;
        if groups.is_empty() {
            return Err(selector.to_string());
        }
        Ok(Self { groups })
    }

    /// Whether `node` matches any group
    #[must_use]
    pub fn matches(&self, doc: &Document, node: NodeId) -> bool {
        self.groups
            .iter()
            .any(|chain| matches_from(doc, node, chain, chain.len() - 1))
    }
}

fn split_groups(selector: &str) -> Vec<&str> {
    let mut groups = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (i, ch) in selector.char_indices() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(ch),
            (None, '[') => depth += 1,
            (None, ']') => depth = depth.saturating_sub(1),
            (None, ',') if depth == 0 => {
                groups.push(selector[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    groups.push(selector[start..].trim());
    groups
}

fn parse_chain(group: &str) -> Option<Vec<SelectorPart>> {
    let chars: Vec<char> = group.chars().collect();
    let mut parts: Vec<SelectorPart> = Vec::new();
    let mut pending: Option<Combinator> = None;
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        if ch.is_whitespace() {
            if !parts.is_empty() && pending.is_none() {
                pending = Some(Combinator::Descendant);
            }
            i += 1;
            continue;
        }
        if ch == '>' {
            if parts.is_empty() || pending == Some(Combinator::Child) {
                return None;
            }
            pending = Some(Combinator::Child);
            i += 1;
            continue;
        }

        let (step, next) = parse_step(&chars, i)?;
        let combinator = if parts.is_empty() {
            None
        } else {
            Some(pending.take()?)
        };
        parts.push(SelectorPart { step, combinator });
        i = next;
    }

    if parts.is_empty() || pending == Some(Combinator::Child) {
        return None;
    }
    Some(parts)
}

fn parse_step(chars: &[char], mut i: usize) -> Option<(SelectorStep, usize)> {
    let mut step = SelectorStep::default();
    let start = i;

    if chars.get(i) == Some(&'*') {
        i += 1;
    } else if let Some((tag, next)) = parse_ident(chars, i) {
        step.tag = Some(tag.to_ascii_lowercase());
        i = next;
    }

    loop {
        match chars.get(i) {
            Some('#') => {
                let (id, next) = parse_ident(chars, i + 1)?;
                step.id = Some(id);
                i = next;
            }
            Some('.') => {
                let (class, next) = parse_ident(chars, i + 1)?;
                step.classes.push(class);
                i = next;
            }
            Some('[') => {
                let (condition, next) = parse_attr(chars, i + 1)?;
                step.attrs.push(condition);
                i = next;
            }
            _ => break,
        }
    }

    (i > start).then_some((step, i))
}

fn is_ident_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '-' || ch == '_'
}

fn parse_ident(chars: &[char], start: usize) -> Option<(String, usize)> {
    let end = chars[start..]
        .iter()
        .position(|c| !is_ident_char(*c))
        .map_or(chars.len(), |offset| start + offset);
    (end > start).then(|| (chars[start..end].iter().collect(), end))
}

fn parse_attr(chars: &[char], start: usize) -> Option<(AttrCondition, usize)> {
    let (name, mut i) = parse_ident(chars, start)?;
    match chars.get(i)? {
        ']' => Some((AttrCondition { name, value: None }, i + 1)),
        '=' => {
            i += 1;
            let value = match chars.get(i)? {
                quote @ ('\'' | '"') => {
                    let close = chars[i + 1..].iter().position(|c| c == quote)? + i + 1;
                    let value = chars[i + 1..close].iter().collect();
                    i = close + 1;
                    value
                }
                _ => {
                    let (value, next) = parse_ident(chars, i)?;
                    i = next;
                    value
                }
            };
            (chars.get(i) == Some(&']')).then(|| {
                (
                    AttrCondition {
                        name,
                        value: Some(value),
                    },
                    i + 1,
                )
            })
        }
        _ => None,
    }
}

fn matches_step(doc: &Document, node: NodeId, step: &SelectorStep) -> bool {
    let element = doc.node(node);
    if step.tag.as_deref().is_some_and(|tag| tag != element.tag()) {
        return false;
    }
    if let Some(id) = &step.id {
        if element.attr("id") != Some(id.as_str()) {
            return false;
        }
    }
    if !step.classes.iter().all(|class| element.has_class(class)) {
        return false;
    }
    step.attrs.iter().all(|condition| {
        match (element.attr(&condition.name), &condition.value) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(actual), Some(expected)) => actual == expected,
        }
    })
}

// Right-to-left with backtracking over descendant ancestors.
fn matches_from(doc: &Document, node: NodeId, chain: &[SelectorPart], idx: usize) -> bool {
    if !matches_step(doc, node, &chain[idx].step) {
        return false;
    }
    if idx == 0 {
        return true;
    }
    match chain[idx].combinator {
        Some(Combinator::Child) => doc
            .parent(node)
            .is_some_and(|parent| matches_from(doc, parent, chain, idx - 1)),
        Some(Combinator::Descendant) | None => {
            let mut cursor = doc.parent(node);
            while let Some(ancestor) = cursor {
                if matches_from(doc, ancestor, chain, idx - 1) {
                    return true;
                }
                cursor = doc.parent(ancestor);
            }
            false
        }
    }
}
