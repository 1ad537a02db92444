use crate::handler::{AttributeSpans, HandlerResult, MarkupHandler};
use crate::span::{Position, Span};
use indexmap::IndexMap;
use std::fmt;

/// Attribute to be added to the elements matched by a selector.
///
/// Owns a copy of the attribute's source text (name, operator and quoted
/// value) so it outlives the decoupled logic resource it was read from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InjectedAttribute {
    buffer: Box<str>,
    spans: AttributeSpans,
}

impl InjectedAttribute {
    /// Copy an attribute out of `buffer`. `operator`, `value_content` and
    /// `value_outer` are empty for attributes without value.
    pub fn from_buffer(
        buffer: &str,
        name: Span,
        operator: Span,
        value_content: Span,
        value_outer: Span,
    ) -> Self {
        Self::from_attribute(
            buffer,
            &AttributeSpans {
                name,
                operator,
                value_content,
                value_outer,
                ..AttributeSpans::default()
            },
        )
    }

    pub fn from_attribute(buffer: &str, attribute: &AttributeSpans) -> Self {
        let full = attribute.full();
        let origin = full.start;
        let rebase = |span: Span| {
            if span.is_empty() {
                Span::empty_at(span.start.max(origin) - origin)
            } else {
                span.rebase(origin)
            }
        };
        Self {
            buffer: full.slice(buffer).into(),
            spans: AttributeSpans {
                name: rebase(attribute.name),
                operator: rebase(attribute.operator),
                value_content: rebase(attribute.value_content),
                value_outer: rebase(attribute.value_outer),
                ..AttributeSpans::default()
            },
        }
    }

    /// `name="value"`, or a bare `name` when `value` is `None`.
    pub fn new(name: &str, value: Option<&str>) -> Self {
        let Some(value) = value else {
            let end = name.len();
            return Self::from_buffer(
                name,
                Span::new(0, end),
                Span::empty_at(end),
                Span::empty_at(end),
                Span::empty_at(end),
            );
        };
        let buffer = format!("{name}=\"{value}\"");
        let op = name.len();
        Self::from_buffer(
            &buffer,
            Span::new(0, op),
            Span::new(op, op + 1),
            Span::new(op + 2, op + 2 + value.len()),
            Span::new(op + 1, buffer.len()),
        )
    }

    pub fn name(&self) -> &str {
        self.spans.name.slice(&self.buffer)
    }

    pub fn operator(&self) -> &str {
        self.spans.operator.slice(&self.buffer)
    }

    pub fn value_content(&self) -> &str {
        self.spans.value_content.slice(&self.buffer)
    }

    /// The value as written, quotes included.
    pub fn value_outer(&self) -> &str {
        self.spans.value_outer.slice(&self.buffer)
    }

    pub fn has_value(&self) -> bool {
        self.spans.has_value()
    }

    /// Emit this attribute to `handler` as an attribute event located at
    /// `pos`.
    pub fn replay<H: MarkupHandler + ?Sized>(&self, handler: &mut H, pos: Position) -> HandlerResult {
        let spans = AttributeSpans {
            name_pos: pos,
            operator_pos: pos,
            value_pos: pos,
            ..self.spans
        };
        handler.attribute(&self.buffer, &spans)
    }
}

impl fmt::Display for InjectedAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.buffer)
    }
}

/// Attributes to inject into a template, keyed by selector.
///
/// Selectors keep the order in which they were first added; attributes keep
/// their order within a selector. Both orders show in the output.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DecoupledTemplateLogic {
    injected_attributes: IndexMap<String, Vec<InjectedAttribute>>,
}

impl DecoupledTemplateLogic {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_injected_attribute(&mut self, selector: &str, attribute: InjectedAttribute) {
        match self.injected_attributes.get_mut(selector) {
            Some(attributes) => attributes.push(attribute),
            None => {
                self.injected_attributes
                    .insert(selector.to_string(), vec![attribute]);
            }
        }
    }

    pub fn injected_attributes_for(&self, selector: &str) -> Option<&[InjectedAttribute]> {
        self.injected_attributes.get(selector).map(Vec::as_slice)
    }

    /// Selector and attributes at position `index` of `selectors()`.
    pub fn injected_attributes_at(&self, index: usize) -> Option<(&str, &[InjectedAttribute])> {
        self.injected_attributes
            .get_index(index)
            .map(|(selector, attributes)| (selector.as_str(), attributes.as_slice()))
    }

    pub fn selectors(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
        self.injected_attributes.keys().map(String::as_str)
    }

    pub fn has_injected_attributes(&self) -> bool {
        !self.injected_attributes.is_empty()
    }
}

impl fmt::Display for DecoupledTemplateLogic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (selector, attributes)) in self.injected_attributes.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{selector}: [")?;
            for (j, attribute) in attributes.iter().enumerate() {
                if j > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{attribute}")?;
            }
            f.write_str("]")?;
        }
        f.write_str("}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::EventTrace;

    #[test]
    fn copies_attribute_out_of_larger_buffer() {
        let buffer = "<attr sel=\"//p\" data-x = 'a b'>";
        let name = Span::new(16, 22);
        let attribute = InjectedAttribute::from_buffer(
            buffer,
            name,
            Span::new(22, 25),
            Span::new(26, 29),
            Span::new(25, 30),
        );
        assert_eq!(attribute.name(), "data-x");
        assert_eq!(attribute.operator(), " = ");
        assert_eq!(attribute.value_content(), "a b");
        assert_eq!(attribute.value_outer(), "'a b'");
        assert_eq!(attribute.to_string(), "data-x = 'a b'");
    }

    #[test]
    fn valueless_attribute() {
        let attribute = InjectedAttribute::new("hidden", None);
        assert!(!attribute.has_value());
        assert_eq!(attribute.operator(), "");
        assert_eq!(attribute.to_string(), "hidden");
    }

    #[test]
    fn replay_emits_attribute_event() {
        let attribute = InjectedAttribute::new("class", Some("x"));
        let mut trace = EventTrace::default();
        attribute
            .replay(&mut trace, Position { line: 3, col: 7 })
            .expect("tracing never fails");
        assert_eq!(trace.events(), ["attr(class|\"=\"|x|\"x\")"]);
    }

    #[test]
    fn keeps_selector_and_attribute_order() {
        let mut logic = DecoupledTemplateLogic::new();
        assert!(!logic.has_injected_attributes());
        logic.add_injected_attribute("//form", InjectedAttribute::new("class", Some("x")));
        logic.add_injected_attribute("//a", InjectedAttribute::new("href", Some("#")));
        logic.add_injected_attribute("//form", InjectedAttribute::new("data-y", Some("1")));
        assert!(logic.has_injected_attributes());
        assert_eq!(logic.selectors().collect::<Vec<_>>(), ["//form", "//a"]);
        let names: Vec<&str> = logic
            .injected_attributes_for("//form")
            .unwrap_or_default()
            .iter()
            .map(InjectedAttribute::name)
            .collect();
        assert_eq!(names, ["class", "data-y"]);
        assert_eq!(logic.injected_attributes_at(1).map(|(s, _)| s), Some("//a"));
        assert!(logic.injected_attributes_for("//p").is_none());
        assert_eq!(
            logic.to_string(),
            "{//form: [class=\"x\", data-y=\"1\"], //a: [href=\"#\"]}"
        );
    }
}
