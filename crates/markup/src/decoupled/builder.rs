//! Reads a decoupled logic resource into a [`DecoupledTemplateLogic`].
//!
//! ```xml
//! <thlogic>
//!   <attr sel="#main" th:fragment="content">
//!     <attr sel="/ul/li" th:each="item : ${items}" th:text="${item}"/>
//!   </attr>
//! </thlogic>
//! ```
//!
//! Only content inside `<thlogic>` is considered. Every `<attr>` opens a
//! selector level: its `sel` attribute is appended to the selectors of the
//! enclosing `<attr>` elements, and every other attribute is injected into the
//! elements matched by the combined selector. `sel` may appear anywhere among
//! the attributes; the injected attributes are registered once the start tag
//! is complete.

use super::model::{DecoupledTemplateLogic, InjectedAttribute};
use crate::error::MarkupError;
use crate::handler::{AttributeSpans, HandlerResult, MarkupHandler};
use crate::mode::TemplateMode;
use crate::span::{Position, Span};

const TAG_NAME_LOGIC: &str = "thlogic";
const TAG_NAME_ATTR: &str = "attr";
const ATTRIBUTE_NAME_SEL: &str = "sel";

/// Selector fragments of the currently open `<attr>` levels.
#[derive(Debug, Default)]
struct SelectorLevels {
    /// One entry per open level; `None` until that level's `sel` is seen.
    levels: Vec<Option<String>>,
}

impl SelectorLevels {
    fn increase(&mut self) {
        self.levels.push(None);
    }

    fn decrease(&mut self) {
        self.levels.pop();
    }

    fn current_is_empty(&self) -> bool {
        !matches!(self.levels.last(), Some(Some(_)))
    }

    fn set_current(&mut self, selector: &str) {
        let fragment = if selector.starts_with('/') {
            selector.to_string()
        } else {
            format!("//{selector}")
        };
        if let Some(level) = self.levels.last_mut() {
            *level = Some(fragment);
        }
    }

    fn combined(&self) -> String {
        self.levels.iter().flatten().map(String::as_str).collect()
    }
}

/// Terminal handler that builds the decoupled logic of one resource.
#[derive(Debug)]
pub struct DecoupledLogicBuilder {
    resource: String,
    mode: TemplateMode,
    logic: DecoupledTemplateLogic,
    in_logic_body: bool,
    in_attr_tag: bool,
    selector: SelectorLevels,
    current_attributes: Vec<InjectedAttribute>,
}

impl DecoupledLogicBuilder {
    pub fn new(resource: impl Into<String>, mode: TemplateMode) -> Self {
        Self {
            resource: resource.into(),
            mode,
            logic: DecoupledTemplateLogic::new(),
            in_logic_body: false,
            in_attr_tag: false,
            selector: SelectorLevels::default(),
            current_attributes: Vec::with_capacity(8),
        }
    }

    pub fn logic(&self) -> &DecoupledTemplateLogic {
        &self.logic
    }

    pub fn into_logic(self) -> DecoupledTemplateLogic {
        self.logic
    }

    fn is(&self, buffer: &str, name: Span, expected: &str) -> bool {
        self.mode.names_equal(name.slice(buffer), expected)
    }

    fn attr_start(&mut self, buffer: &str, name: Span) {
        if !self.in_logic_body || !self.is(buffer, name, TAG_NAME_ATTR) {
            return;
        }
        self.selector.increase();
        self.in_attr_tag = true;
        self.current_attributes.clear();
    }

    /// The start tag of an `<attr>` (or any element) ended: register what was
    /// collected for the current selector.
    fn attr_start_complete(&mut self, pos: Position) -> HandlerResult {
        if !self.in_attr_tag {
            return Ok(());
        }
        if self.selector.current_is_empty() {
            return Err(MarkupError::decoupled_logic(
                &self.resource,
                pos,
                "<attr> injection tag does not contain any \"sel\" selector attributes",
            ));
        }
        let selector = self.selector.combined();
        for attribute in self.current_attributes.drain(..) {
            log::trace!(
                target: "markup.decoupled",
                "{}: {selector} <- {attribute}",
                self.resource
            );
            self.logic.add_injected_attribute(&selector, attribute);
        }
        self.in_attr_tag = false;
        Ok(())
    }

    fn element_closed(&mut self, buffer: &str, name: Span) {
        if !self.in_logic_body {
            return;
        }
        if self.is(buffer, name, TAG_NAME_LOGIC) {
            self.in_logic_body = false;
        } else if self.is(buffer, name, TAG_NAME_ATTR) {
            self.selector.decrease();
        }
    }
}

impl MarkupHandler for DecoupledLogicBuilder {
    fn standalone_element_start(
        &mut self,
        buffer: &str,
        name: Span,
        _minimized: bool,
        _pos: Position,
    ) -> HandlerResult {
        self.attr_start(buffer, name);
        Ok(())
    }

    fn standalone_element_end(
        &mut self,
        buffer: &str,
        name: Span,
        _minimized: bool,
        pos: Position,
    ) -> HandlerResult {
        if !self.in_logic_body {
            return Ok(());
        }
        let was_attr = self.in_attr_tag;
        self.attr_start_complete(pos)?;
        if was_attr && self.is(buffer, name, TAG_NAME_ATTR) {
            self.selector.decrease();
        }
        Ok(())
    }

    fn open_element_start(&mut self, buffer: &str, name: Span, _pos: Position) -> HandlerResult {
        if !self.in_logic_body {
            if self.is(buffer, name, TAG_NAME_LOGIC) {
                self.in_logic_body = true;
            }
            return Ok(());
        }
        self.attr_start(buffer, name);
        Ok(())
    }

    fn open_element_end(&mut self, _buffer: &str, _name: Span, pos: Position) -> HandlerResult {
        if !self.in_logic_body {
            return Ok(());
        }
        self.attr_start_complete(pos)
    }

    fn close_element_end(&mut self, buffer: &str, name: Span, _pos: Position) -> HandlerResult {
        self.element_closed(buffer, name);
        Ok(())
    }

    fn auto_close_element_end(
        &mut self,
        buffer: &str,
        name: Span,
        _pos: Position,
    ) -> HandlerResult {
        self.element_closed(buffer, name);
        Ok(())
    }

    fn attribute(&mut self, buffer: &str, attribute: &AttributeSpans) -> HandlerResult {
        if !self.in_attr_tag {
            return Ok(());
        }
        if self.is(buffer, attribute.name, ATTRIBUTE_NAME_SEL) {
            if !self.selector.current_is_empty() {
                return Err(MarkupError::decoupled_logic(
                    &self.resource,
                    attribute.name_pos,
                    "selector (\"sel\") attribute found more than once in attr injection tag",
                ));
            }
            self.selector
                .set_current(attribute.value_content.slice(buffer));
            return Ok(());
        }
        self.current_attributes
            .push(InjectedAttribute::from_attribute(buffer, attribute));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::MarkupParser;

    fn build(source: &str) -> Result<DecoupledTemplateLogic, MarkupError> {
        let mut builder = DecoupledLogicBuilder::new("home.th.xml", TemplateMode::Xml);
        MarkupParser::new(TemplateMode::Xml).parse(source, &mut builder)?;
        Ok(builder.into_logic())
    }

    fn injected(logic: &DecoupledTemplateLogic, selector: &str) -> Vec<String> {
        logic
            .injected_attributes_for(selector)
            .unwrap_or_default()
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    #[test]
    fn nested_levels_concatenate_selectors() {
        let logic = build(
            "<thlogic>\n\
             <attr sel=\"#main\" th:fragment=\"content\">\n\
               <attr sel=\"/ul/li\" th:each=\"i : ${items}\" th:text=\"${i}\"/>\n\
               <attr th:remove=\"all\" sel=\"p\"/>\n\
             </attr>\n\
             <attr sel=\"//form\" class=\"x\" data-y='1'></attr>\n\
             </thlogic>",
        )
        .expect("valid logic");
        assert_eq!(
            logic.selectors().collect::<Vec<_>>(),
            ["//#main", "//#main/ul/li", "//#main//p", "//form"]
        );
        assert_eq!(injected(&logic, "//#main"), ["th:fragment=\"content\""]);
        assert_eq!(
            injected(&logic, "//#main/ul/li"),
            ["th:each=\"i : ${items}\"", "th:text=\"${i}\""]
        );
        assert_eq!(injected(&logic, "//#main//p"), ["th:remove=\"all\""]);
        assert_eq!(injected(&logic, "//form"), ["class=\"x\"", "data-y='1'"]);
    }

    #[test]
    fn content_outside_thlogic_is_ignored() {
        let logic = build("<attr sel=\"p\" a=\"1\"/><thlogic></thlogic><attr sel=\"q\" b=\"2\"/>")
            .expect("valid logic");
        assert!(!logic.has_injected_attributes());
    }

    #[test]
    fn missing_sel_is_reported_with_location() {
        let err = build("<thlogic>\n  <attr>id=\"x\"</attr>\n</thlogic>")
            .expect_err("attr without sel");
        match err {
            MarkupError::DecoupledLogic {
                resource,
                line,
                col,
                message,
            } => {
                assert_eq!(resource, "home.th.xml");
                assert_eq!((line, col), (2, 8));
                assert!(message.contains("\"sel\""), "{message}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn duplicate_sel_is_rejected() {
        let err = build("<thlogic>\n<attr sel=\"a\" x=\"1\" sel=\"b\"/></thlogic>")
            .expect_err("two sel attributes");
        assert!(
            matches!(err, MarkupError::DecoupledLogic { line: 2, col: 21, .. }),
            "{err:?}"
        );
    }

    #[test]
    fn sibling_levels_do_not_leak() {
        let logic = build(
            "<thlogic><attr sel=\"a\"><attr sel=\"b\" x=\"1\"/></attr><attr sel=\"c\" y=\"2\"/></thlogic>",
        )
        .expect("valid logic");
        assert_eq!(logic.selectors().collect::<Vec<_>>(), ["//a//b", "//c"]);
    }
}
