//! Markup selectors: path expressions that identify elements by their
//! position in the document.
//!
//! ```text
//! //form//div[0]/label      label children of the first div inside any form
//! /html/body                body child of a top-level html element
//! li.active                 any li with class "active" (same as //li.active)
//! input[type='text']        attribute value test
//! *#main                    any element with id "main"
//! ```
//!
//! Steps are joined by `/` (child) or `//` (descendant). A selector without a
//! leading slash matches anywhere in the document. `[n]` is the 0-based index
//! of the element among its preceding siblings that match the rest of the step.

mod selection;

pub use selection::{NodeSelection, PathNodeSelection};

use crate::error::MarkupError;
use crate::mode::TemplateMode;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    /// Direct child of the previous step (or a top-level element).
    Child,
    /// Any descendant of the previous step (or any element).
    Descendant,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Condition {
    Id(String),
    Class(String),
    HasAttribute(String),
    AttributeEquals(String, String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectorStep {
    pub axis: Axis,
    /// Element name; `None` matches any element.
    pub name: Option<String>,
    pub conditions: Vec<Condition>,
    pub index: Option<usize>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MarkupSelector {
    source: String,
    steps: Vec<SelectorStep>,
}

/// Element as seen by selectors: normalized name plus attributes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct SelectableElement {
    pub(crate) name: String,
    pub(crate) attributes: Vec<(String, String)>,
}

impl SelectableElement {
    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

impl SelectorStep {
    fn matches_ignoring_index(&self, element: &SelectableElement) -> bool {
        if self.name.as_deref().is_some_and(|name| name != element.name) {
            return false;
        }
        self.conditions.iter().all(|condition| match condition {
            Condition::Id(id) => element.attribute("id") == Some(id.as_str()),
            Condition::Class(class) => element
                .attribute("class")
                .is_some_and(|classes| classes.split_ascii_whitespace().any(|c| c == class)),
            Condition::HasAttribute(name) => element.attribute(name).is_some(),
            Condition::AttributeEquals(name, value) => {
                element.attribute(name) == Some(value.as_str())
            }
        })
    }

    pub(crate) fn matches(
        &self,
        element: &SelectableElement,
        preceding_siblings: &[SelectableElement],
    ) -> bool {
        if !self.matches_ignoring_index(element) {
            return false;
        }
        self.index.is_none_or(|index| {
            preceding_siblings
                .iter()
                .filter(|sibling| self.matches_ignoring_index(sibling))
                .count()
                == index
        })
    }
}

impl MarkupSelector {
    pub fn parse(source: &str, mode: TemplateMode) -> Result<Self, MarkupError> {
        let mut steps = Vec::new();
        let mut rest = source.trim();
        if rest.is_empty() {
            return Err(MarkupError::selector(source, "empty selector"));
        }
        let mut axis = Axis::Descendant;
        if let Some(stripped) = rest.strip_prefix("//") {
            rest = stripped;
        } else if let Some(stripped) = rest.strip_prefix('/') {
            axis = Axis::Child;
            rest = stripped;
        }
        loop {
            let step_end = step_end(rest);
            let step = parse_step(source, &rest[..step_end], axis, mode)?;
            steps.push(step);
            rest = &rest[step_end..];
            if rest.is_empty() {
                break;
            }
            if let Some(stripped) = rest.strip_prefix("//") {
                axis = Axis::Descendant;
                rest = stripped;
            } else if let Some(stripped) = rest.strip_prefix('/') {
                axis = Axis::Child;
                rest = stripped;
            }
            if rest.is_empty() {
                return Err(MarkupError::selector(source, "selector ends with a separator"));
            }
        }
        Ok(Self {
            source: source.to_string(),
            steps,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn steps(&self) -> &[SelectorStep] {
        &self.steps
    }
}

impl std::fmt::Display for MarkupSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.source)
    }
}

/// Length of the step at the start of `s`: up to the next `/` outside brackets
/// and quotes.
fn step_end(s: &str) -> usize {
    let mut in_brackets = false;
    let mut quote = None;
    for (i, c) in s.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') if in_brackets => quote = Some(c),
            (None, '[') => in_brackets = true,
            (None, ']') => in_brackets = false,
            (None, '/') if !in_brackets => return i,
            _ => {}
        }
    }
    s.len()
}

fn is_ident_char(c: char) -> bool {
    !matches!(c, '#' | '.' | '[' | ']' | '/' | '=' | '\'' | '"') && !c.is_whitespace()
}

fn take_ident(s: &str) -> (&str, &str) {
    let end = s.find(|c: char| !is_ident_char(c)).unwrap_or(s.len());
    s.split_at(end)
}

fn parse_step(
    source: &str,
    step: &str,
    axis: Axis,
    mode: TemplateMode,
) -> Result<SelectorStep, MarkupError> {
    if step.is_empty() {
        return Err(MarkupError::selector(source, "empty selector step"));
    }
    let (name, mut rest) = if let Some(rest) = step.strip_prefix('*') {
        (None, rest)
    } else {
        let (name, rest) = take_ident(step);
        ((!name.is_empty()).then(|| mode.normalize_name(name)), rest)
    };

    let mut conditions = Vec::new();
    let mut index = None;
    while let Some(marker) = rest.chars().next() {
        rest = &rest[marker.len_utf8()..];
        match marker {
            '#' | '.' => {
                let (ident, after) = take_ident(rest);
                if ident.is_empty() {
                    return Err(MarkupError::selector(
                        source,
                        format!("missing name after '{marker}'"),
                    ));
                }
                conditions.push(if marker == '#' {
                    Condition::Id(ident.to_string())
                } else {
                    Condition::Class(ident.to_string())
                });
                rest = after;
            }
            '[' => {
                let close = rest
                    .find(']')
                    .ok_or_else(|| MarkupError::selector(source, "unclosed '['"))?;
                let inner = rest[..close].trim();
                rest = &rest[close + 1..];
                if let Ok(n) = inner.parse::<usize>() {
                    if index.replace(n).is_some() {
                        return Err(MarkupError::selector(source, "more than one index in a step"));
                    }
                    continue;
                }
                conditions.push(parse_attribute_condition(source, inner, mode)?);
            }
            other => {
                return Err(MarkupError::selector(
                    source,
                    format!("unexpected '{other}' in step \"{step}\""),
                ));
            }
        }
    }
    Ok(SelectorStep {
        axis,
        name,
        conditions,
        index,
    })
}

fn parse_attribute_condition(
    source: &str,
    inner: &str,
    mode: TemplateMode,
) -> Result<Condition, MarkupError> {
    let Some((name, value)) = inner.split_once('=') else {
        if inner.is_empty() {
            return Err(MarkupError::selector(source, "empty attribute test"));
        }
        return Ok(Condition::HasAttribute(mode.normalize_name(inner)));
    };
    let name = name.trim();
    if name.is_empty() {
        return Err(MarkupError::selector(source, "attribute test without a name"));
    }
    let value = value.trim();
    let unquoted = ['\'', '"']
        .iter()
        .find_map(|&q| value.strip_prefix(q).and_then(|v| v.strip_suffix(q)))
        .unwrap_or(value);
    Ok(Condition::AttributeEquals(
        mode.normalize_name(name),
        unquoted.to_string(),
    ))
}
