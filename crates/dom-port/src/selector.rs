//! Minimal CSS selector engine.
//!
//! Supports selector lists, descendant and child combinators and compound
//! steps made of `*`, a tag, `#id`, `.class`, `[attr]` and `[attr=value]`.

use tracing::trace;

use crate::element::{descendants, has_class, tag_lower};
use crate::errors::{DomError, DomResult};
use crate::ports::{DocumentPort, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum AttrCondition {
    Exists { key: String },
    Eq { key: String, value: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Step {
    universal: bool,
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrCondition>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Part {
    step: Step,
    // Relation to the part on the left.
    combinator: Option<Combinator>,
}

/// A parsed, comma separated selector list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList {
    groups: Vec<Vec<Part>>,
}

impl SelectorList {
    pub fn parse(selector: &str) -> DomResult<Self> {
        let mut groups = Vec::new();
        for group in split_groups(selector)? {
            groups.push(parse_chain(&group)?);
        }
        trace!(target: "autotrack.dom", selector, groups = groups.len(), "selector parsed");
        Ok(Self { groups })
    }

    pub fn matches<D>(&self, doc: &D, node: NodeId) -> bool
    where
        D: DocumentPort + ?Sized,
    {
        doc.is_element(node) && self.groups.iter().any(|parts| matches_chain(doc, node, parts))
    }

    /// Matching elements under `root`, in tree order.
    pub fn select_all<D>(&self, doc: &D, root: NodeId) -> Vec<NodeId>
    where
        D: DocumentPort + ?Sized,
    {
        descendants(doc, root)
            .into_iter()
            .filter(|node| self.matches(doc, *node))
            .collect()
    }
}

fn matches_chain<D>(doc: &D, node: NodeId, parts: &[Part]) -> bool
where
    D: DocumentPort + ?Sized,
{
    let Some((last, rest)) = parts.split_last() else {
        return false;
    };
    if !matches_step(doc, node, &last.step) {
        return false;
    }
    if rest.is_empty() {
        return true;
    }

    match last.combinator.unwrap_or(Combinator::Descendant) {
        Combinator::Child => doc
            .parent(node)
            .is_some_and(|parent| matches_chain(doc, parent, rest)),
        // Every matching ancestor is a candidate; a failure further left
        // resumes the walk above it.
        Combinator::Descendant => {
            let mut cursor = doc.parent(node);
            while let Some(ancestor) = cursor {
                if matches_chain(doc, ancestor, rest) {
                    return true;
                }
                cursor = doc.parent(ancestor);
            }
            false
        }
    }
}

fn matches_step<D>(doc: &D, node: NodeId, step: &Step) -> bool
where
    D: DocumentPort + ?Sized,
{
    if !doc.is_element(node) {
        return false;
    }
    if let Some(tag) = &step.tag {
        if tag_lower(doc, node).as_deref() != Some(tag.as_str()) {
            return false;
        }
    }
    if let Some(id) = &step.id {
        if doc.attribute(node, "id").as_deref() != Some(id.as_str()) {
            return false;
        }
    }
    if step.classes.iter().any(|class| !has_class(doc, node, class)) {
        return false;
    }
    step.attrs.iter().all(|cond| match cond {
        AttrCondition::Exists { key } => doc.attribute(node, key).is_some(),
        AttrCondition::Eq { key, value } => doc.attribute(node, key).as_deref() == Some(value),
    })
}

fn unsupported(selector: &str) -> DomError {
    DomError::UnsupportedSelector(selector.to_string())
}

fn split_groups(selector: &str) -> DomResult<Vec<String>> {
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
                    return Err(unsupported(selector));
                }
                bracket_depth -= 1;
                current.push(ch);
            }
            ',' if bracket_depth == 0 => {
                let trimmed = current.trim();
                if trimmed.is_empty() {
                    return Err(unsupported(selector));
                }
                groups.push(trimmed.to_string());
                current.clear();
            }
            _ => current.push(ch),
        }
    }

    let trimmed = current.trim();
    if bracket_depth != 0 || trimmed.is_empty() {
        return Err(unsupported(selector));
    }
    groups.push(trimmed.to_string());
    Ok(groups)
}

fn tokenize(selector: &str) -> DomResult<Vec<String>> {
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
                if bracket_depth == 0 {
                    return Err(unsupported(selector));
                }
                bracket_depth -= 1;
                current.push(ch);
            }
            '>' if bracket_depth == 0 => {
                if !current.trim().is_empty() {
                    tokens.push(current.trim().to_string());
                }
                current.clear();
                tokens.push(">".to_string());
            }
            ch if ch.is_ascii_whitespace() && bracket_depth == 0 => {
                if !current.trim().is_empty() {
                    tokens.push(current.trim().to_string());
                }
                current.clear();
            }
            _ => current.push(ch),
        }
    }

    if bracket_depth != 0 {
        return Err(unsupported(selector));
    }
    if !current.trim().is_empty() {
        tokens.push(current.trim().to_string());
    }
    Ok(tokens)
}

fn parse_chain(selector: &str) -> DomResult<Vec<Part>> {
    let mut parts = Vec::new();
    let mut pending: Option<Combinator> = None;

    for token in tokenize(selector)? {
        if token == ">" {
            if pending.is_some() || parts.is_empty() {
                return Err(unsupported(selector));
            }
            pending = Some(Combinator::Child);
            continue;
        }
        let step = parse_step(&token)?;
        let combinator = if parts.is_empty() {
            None
        } else {
            Some(pending.take().unwrap_or(Combinator::Descendant))
        };
        parts.push(Part { step, combinator });
    }

    if parts.is_empty() || pending.is_some() {
        return Err(unsupported(selector));
    }
    Ok(parts)
}

fn parse_step(part: &str) -> DomResult<Step> {
    let chars: Vec<char> = part.chars().collect();
    let mut i = 0usize;
    let mut step = Step::default();

    while i < chars.len() {
        match chars[i] {
            '*' => {
                if step.universal || step.tag.is_some() {
                    return Err(unsupported(part));
                }
                step.universal = true;
                i += 1;
            }
            '#' => {
                let (id, next) = parse_ident(&chars, i + 1).ok_or_else(|| unsupported(part))?;
                if step.id.replace(id).is_some() {
                    return Err(unsupported(part));
                }
                i = next;
            }
            '.' => {
                let (class, next) = parse_ident(&chars, i + 1).ok_or_else(|| unsupported(part))?;
                step.classes.push(class);
                i = next;
            }
            '[' => {
                let (cond, next) = parse_attr(&chars, i).ok_or_else(|| unsupported(part))?;
                step.attrs.push(cond);
                i = next;
            }
            _ => {
                if i != 0 {
                    return Err(unsupported(part));
                }
                let (tag, next) = parse_ident(&chars, i).ok_or_else(|| unsupported(part))?;
                step.tag = Some(tag.to_ascii_lowercase());
                i = next;
            }
        }
    }

    Ok(step)
}

fn is_ident_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '-' || ch == '_'
}

fn parse_ident(chars: &[char], start: usize) -> Option<(String, usize)> {
    let mut end = start;
    while end < chars.len() && is_ident_char(chars[end]) {
        end += 1;
    }
    if end == start {
        return None;
    }
    Some((chars[start..end].iter().collect(), end))
}

fn parse_attr(chars: &[char], open: usize) -> Option<(AttrCondition, usize)> {
    let close = chars[open..].iter().position(|c| *c == ']')? + open;
    let body: String = chars[open + 1..close].iter().collect();
    let cond = match body.split_once('=') {
        None => {
            let key = body.trim();
            if key.is_empty() || !key.chars().all(is_ident_char) {
                return None;
            }
            AttrCondition::Exists {
                key: key.to_ascii_lowercase(),
            }
        }
        Some((key, value)) => {
            let key = key.trim();
            if key.is_empty() || !key.chars().all(is_ident_char) {
                return None;
            }
            let value = value.trim();
            let unquoted = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
                .unwrap_or(value);
            AttrCondition::Eq {
                key: key.to_ascii_lowercase(),
                value: unquoted.to_string(),
            }
        }
    };
    Some((cond, close + 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryDocument;
    use crate::ports::PageInfo;

    fn fixture() -> (MemoryDocument, NodeId, NodeId, NodeId) {
        let mut doc = MemoryDocument::new(PageInfo::default());
        let body = doc.body_id();
        let nav = doc.append_element(body, "nav");
        doc.set_attribute(nav, "id", "top");
        let link = doc.append_element(nav, "a");
        doc.set_attribute(link, "class", "cta primary");
        doc.set_attribute(link, "data-plan", "pro");
        let span = doc.append_element(link, "span");
        (doc, nav, link, span)
    }

    #[test]
    fn parses_lists_and_rejects_garbage() {
        assert!(SelectorList::parse("a.cta, #top > a[data-plan=\"pro\"]").is_ok());
        assert!(SelectorList::parse("").is_err());
        assert!(SelectorList::parse("a,,b").is_err());
        assert!(SelectorList::parse("a:hover").is_err());
        assert!(SelectorList::parse("> a").is_err());
        assert!(SelectorList::parse("a[href").is_err());
    }

    #[test]
    fn matches_compound_and_combinators() {
        let (doc, nav, link, span) = fixture();
        let root = doc.document();

        let child = SelectorList::parse("#top > a.cta").unwrap();
        assert_eq!(child.select_all(&doc, root), vec![link]);

        let descendant = SelectorList::parse("nav span").unwrap();
        assert_eq!(descendant.select_all(&doc, root), vec![span]);

        let not_child = SelectorList::parse("nav > span").unwrap();
        assert!(not_child.select_all(&doc, root).is_empty());

        let attr = SelectorList::parse("[data-plan=pro], [id]").unwrap();
        assert_eq!(attr.select_all(&doc, root), vec![nav, link]);

        let universal = SelectorList::parse("a *").unwrap();
        assert_eq!(universal.select_all(&doc, root), vec![span]);
    }

    #[test]
    fn descendant_retries_farther_ancestors() {
        let mut doc = MemoryDocument::new(PageInfo::default());
        let body = doc.body_id();
        let outer = doc.append_element(body, "div");
        doc.set_attribute(outer, "class", "a");
        let para = doc.append_element(outer, "p");
        doc.set_attribute(para, "class", "b");
        let inner = doc.append_element(para, "div");
        doc.set_attribute(inner, "class", "b");
        let leaf = doc.append_element(inner, "span");
        doc.set_attribute(leaf, "class", "c");
        let root = doc.document();

        let chain = SelectorList::parse(".a > .b .c").unwrap();
        assert_eq!(chain.select_all(&doc, root), vec![leaf]);
        assert!(chain.matches(&doc, leaf));

        let no_match = SelectorList::parse(".c > .b .a").unwrap();
        assert!(no_match.select_all(&doc, root).is_empty());
    }
}
