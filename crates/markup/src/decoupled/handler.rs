use super::model::DecoupledTemplateLogic;
use crate::handler::{AttributeSpans, HandlerResult, MarkupHandler};
use crate::selector::NodeSelection;
use crate::span::{Position, Span};
use std::sync::Arc;

const INJECTED_WHITESPACE: &str = " ";

/// Injects the attributes of a [`DecoupledTemplateLogic`] into the event
/// stream, forwarding everything to `next`.
///
/// When an open or standalone start tag completes, the node selection reports
/// the matching selectors. For each of them, in selector order, every injected
/// attribute is emitted in order, preceded by a single-space inner whitespace
/// event unless whitespace was the previous event in the tag. The tag end event
/// follows.
///
/// The selector indices reported by `selection` must refer to
/// `logic.selectors()` order.
pub struct DecoupledLogicMarkupHandler<S, H> {
    logic: Arc<DecoupledTemplateLogic>,
    selection: S,
    next: H,
    inject: bool,
    last_was_whitespace: bool,
}

impl<S: NodeSelection, H: MarkupHandler> DecoupledLogicMarkupHandler<S, H> {
    pub fn new(logic: Arc<DecoupledTemplateLogic>, selection: S, next: H) -> Self {
        let inject = logic.has_injected_attributes();
        Self {
            logic,
            selection,
            next,
            inject,
            last_was_whitespace: false,
        }
    }

    pub fn next(&self) -> &H {
        &self.next
    }

    pub fn into_next(self) -> H {
        self.next
    }

    fn inject_matched(&mut self, standalone: bool, pos: Position) -> HandlerResult {
        for &index in self.selection.element_start_complete(standalone) {
            let Some((selector, attributes)) = self.logic.injected_attributes_at(index) else {
                continue;
            };
            log::trace!(
                target: "markup.decoupled",
                "{selector} matched at {pos}: injecting {} attribute(s)",
                attributes.len()
            );
            for attribute in attributes {
                if !self.last_was_whitespace {
                    self.next.inner_whitespace(
                        INJECTED_WHITESPACE,
                        Span::new(0, INJECTED_WHITESPACE.len()),
                        pos,
                    )?;
                }
                attribute.replay(&mut self.next, pos)?;
                self.last_was_whitespace = false;
            }
        }
        Ok(())
    }
}

impl<S: NodeSelection, H: MarkupHandler> MarkupHandler for DecoupledLogicMarkupHandler<S, H> {
    fn document_start(&mut self) -> HandlerResult {
        self.next.document_start()
    }

    fn document_end(&mut self, pos: Position) -> HandlerResult {
        self.next.document_end(pos)
    }

    fn xml_declaration(&mut self, buffer: &str, outer: Span, pos: Position) -> HandlerResult {
        self.next.xml_declaration(buffer, outer, pos)
    }

    fn doctype(&mut self, buffer: &str, outer: Span, pos: Position) -> HandlerResult {
        self.next.doctype(buffer, outer, pos)
    }

    fn cdata(&mut self, buffer: &str, content: Span, outer: Span, pos: Position) -> HandlerResult {
        self.next.cdata(buffer, content, outer, pos)
    }

    fn comment(
        &mut self,
        buffer: &str,
        content: Span,
        outer: Span,
        pos: Position,
    ) -> HandlerResult {
        self.next.comment(buffer, content, outer, pos)
    }

    fn text(&mut self, buffer: &str, span: Span, pos: Position) -> HandlerResult {
        self.next.text(buffer, span, pos)
    }

    fn standalone_element_start(
        &mut self,
        buffer: &str,
        name: Span,
        minimized: bool,
        pos: Position,
    ) -> HandlerResult {
        if self.inject {
            self.selection.element_start(buffer, name);
            self.last_was_whitespace = false;
        }
        self.next
            .standalone_element_start(buffer, name, minimized, pos)
    }

    fn standalone_element_end(
        &mut self,
        buffer: &str,
        name: Span,
        minimized: bool,
        pos: Position,
    ) -> HandlerResult {
        if self.inject {
            self.inject_matched(true, pos)?;
        }
        self.next.standalone_element_end(buffer, name, minimized, pos)
    }

    fn open_element_start(&mut self, buffer: &str, name: Span, pos: Position) -> HandlerResult {
        if self.inject {
            self.selection.element_start(buffer, name);
            self.last_was_whitespace = false;
        }
        self.next.open_element_start(buffer, name, pos)
    }

    fn open_element_end(&mut self, buffer: &str, name: Span, pos: Position) -> HandlerResult {
        if self.inject {
            self.inject_matched(false, pos)?;
        }
        self.next.open_element_end(buffer, name, pos)
    }

    fn close_element_start(&mut self, buffer: &str, name: Span, pos: Position) -> HandlerResult {
        self.next.close_element_start(buffer, name, pos)
    }

    fn close_element_end(&mut self, buffer: &str, name: Span, pos: Position) -> HandlerResult {
        if self.inject {
            self.selection.element_end();
        }
        self.next.close_element_end(buffer, name, pos)
    }

    fn auto_close_element_start(
        &mut self,
        buffer: &str,
        name: Span,
        pos: Position,
    ) -> HandlerResult {
        self.next.auto_close_element_start(buffer, name, pos)
    }

    fn auto_close_element_end(
        &mut self,
        buffer: &str,
        name: Span,
        pos: Position,
    ) -> HandlerResult {
        if self.inject {
            self.selection.element_end();
        }
        self.next.auto_close_element_end(buffer, name, pos)
    }

    fn unmatched_close_element_start(
        &mut self,
        buffer: &str,
        name: Span,
        pos: Position,
    ) -> HandlerResult {
        self.next.unmatched_close_element_start(buffer, name, pos)
    }

    fn unmatched_close_element_end(
        &mut self,
        buffer: &str,
        name: Span,
        pos: Position,
    ) -> HandlerResult {
        self.next.unmatched_close_element_end(buffer, name, pos)
    }

    fn attribute(&mut self, buffer: &str, attribute: &AttributeSpans) -> HandlerResult {
        if self.inject {
            self.selection.attribute(buffer, attribute);
            self.last_was_whitespace = false;
        }
        self.next.attribute(buffer, attribute)
    }

    fn inner_whitespace(&mut self, buffer: &str, span: Span, pos: Position) -> HandlerResult {
        self.last_was_whitespace = true;
        self.next.inner_whitespace(buffer, span, pos)
    }

    fn processing_instruction(
        &mut self,
        buffer: &str,
        target: Span,
        content: Option<Span>,
        outer: Span,
        pos: Position,
    ) -> HandlerResult {
        self.next
            .processing_instruction(buffer, target, content, outer, pos)
    }
}
