//! Markup event model.
//!
//! A parser drives a [`MarkupHandler`] with one call per structural piece of
//! the document. Events never carry owned strings: each one receives the
//! buffer it was produced from plus byte spans into it, so handlers can
//! compare, hash or intern slices without copying. Handlers are chained by
//! composition: a handler that transforms the stream owns the next handler
//! and forwards to it explicitly.
//!
//! Element events come in start/end pairs. Between an element's start and end
//! the handler sees its attributes and the whitespace runs separating them, in
//! source order.

use crate::error::MarkupError;
use crate::span::{Position, Span};

pub type HandlerResult = Result<(), MarkupError>;

/// Spans of one attribute inside its buffer.
///
/// `operator` covers the `=` with any whitespace around it and is empty for
/// attributes without value. `value_outer` keeps the quotes; `value_content`
/// excludes them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AttributeSpans {
    pub name: Span,
    pub name_pos: Position,
    pub operator: Span,
    pub operator_pos: Position,
    pub value_content: Span,
    pub value_outer: Span,
    pub value_pos: Position,
}

impl AttributeSpans {
    pub fn has_value(&self) -> bool {
        !self.operator.is_empty()
    }

    /// Span from the name start to the end of the value (or of the name).
    pub fn full(&self) -> Span {
        let end = if self.has_value() {
            self.value_outer.end.max(self.operator.end)
        } else {
            self.name.end
        };
        Span::new(self.name.start, end)
    }
}

#[allow(unused_variables)]
pub trait MarkupHandler {
    fn document_start(&mut self) -> HandlerResult {
        Ok(())
    }

    fn document_end(&mut self, pos: Position) -> HandlerResult {
        Ok(())
    }

    fn xml_declaration(&mut self, buffer: &str, outer: Span, pos: Position) -> HandlerResult {
        Ok(())
    }

    fn doctype(&mut self, buffer: &str, outer: Span, pos: Position) -> HandlerResult {
        Ok(())
    }

    fn cdata(&mut self, buffer: &str, content: Span, outer: Span, pos: Position) -> HandlerResult {
        Ok(())
    }

    fn comment(
        &mut self,
        buffer: &str,
        content: Span,
        outer: Span,
        pos: Position,
    ) -> HandlerResult {
        Ok(())
    }

    fn text(&mut self, buffer: &str, span: Span, pos: Position) -> HandlerResult {
        Ok(())
    }

    fn standalone_element_start(
        &mut self,
        buffer: &str,
        name: Span,
        minimized: bool,
        pos: Position,
    ) -> HandlerResult {
        Ok(())
    }

    fn standalone_element_end(
        &mut self,
        buffer: &str,
        name: Span,
        minimized: bool,
        pos: Position,
    ) -> HandlerResult {
        Ok(())
    }

    fn open_element_start(&mut self, buffer: &str, name: Span, pos: Position) -> HandlerResult {
        Ok(())
    }

    fn open_element_end(&mut self, buffer: &str, name: Span, pos: Position) -> HandlerResult {
        Ok(())
    }

    fn close_element_start(&mut self, buffer: &str, name: Span, pos: Position) -> HandlerResult {
        Ok(())
    }

    fn close_element_end(&mut self, buffer: &str, name: Span, pos: Position) -> HandlerResult {
        Ok(())
    }

    /// An open element closed implicitly, by an outer close tag or by the end
    /// of the document.
    fn auto_close_element_start(
        &mut self,
        buffer: &str,
        name: Span,
        pos: Position,
    ) -> HandlerResult {
        Ok(())
    }

    fn auto_close_element_end(
        &mut self,
        buffer: &str,
        name: Span,
        pos: Position,
    ) -> HandlerResult {
        Ok(())
    }

    /// A close tag with no matching open element.
    fn unmatched_close_element_start(
        &mut self,
        buffer: &str,
        name: Span,
        pos: Position,
    ) -> HandlerResult {
        Ok(())
    }

    fn unmatched_close_element_end(
        &mut self,
        buffer: &str,
        name: Span,
        pos: Position,
    ) -> HandlerResult {
        Ok(())
    }

    fn attribute(&mut self, buffer: &str, attribute: &AttributeSpans) -> HandlerResult {
        Ok(())
    }

    /// Whitespace inside a tag: between the name and the first attribute,
    /// between attributes, or before the closing `>` / `/>`.
    fn inner_whitespace(&mut self, buffer: &str, span: Span, pos: Position) -> HandlerResult {
        Ok(())
    }

    fn processing_instruction(
        &mut self,
        buffer: &str,
        target: Span,
        content: Option<Span>,
        outer: Span,
        pos: Position,
    ) -> HandlerResult {
        Ok(())
    }
}

impl<H: MarkupHandler + ?Sized> MarkupHandler for &mut H {
    fn document_start(&mut self) -> HandlerResult {
        (**self).document_start()
    }

    fn document_end(&mut self, pos: Position) -> HandlerResult {
        (**self).document_end(pos)
    }

    fn xml_declaration(&mut self, buffer: &str, outer: Span, pos: Position) -> HandlerResult {
        (**self).xml_declaration(buffer, outer, pos)
    }

    fn doctype(&mut self, buffer: &str, outer: Span, pos: Position) -> HandlerResult {
        (**self).doctype(buffer, outer, pos)
    }

    fn cdata(&mut self, buffer: &str, content: Span, outer: Span, pos: Position) -> HandlerResult {
        (**self).cdata(buffer, content, outer, pos)
    }

    fn comment(
        &mut self,
        buffer: &str,
        content: Span,
        outer: Span,
        pos: Position,
    ) -> HandlerResult {
        (**self).comment(buffer, content, outer, pos)
    }

    fn text(&mut self, buffer: &str, span: Span, pos: Position) -> HandlerResult {
        (**self).text(buffer, span, pos)
    }

    fn standalone_element_start(
        &mut self,
        buffer: &str,
        name: Span,
        minimized: bool,
        pos: Position,
    ) -> HandlerResult {
        (**self).standalone_element_start(buffer, name, minimized, pos)
    }

    fn standalone_element_end(
        &mut self,
        buffer: &str,
        name: Span,
        minimized: bool,
        pos: Position,
    ) -> HandlerResult {
        (**self).standalone_element_end(buffer, name, minimized, pos)
    }

    fn open_element_start(&mut self, buffer: &str, name: Span, pos: Position) -> HandlerResult {
        (**self).open_element_start(buffer, name, pos)
    }

    fn open_element_end(&mut self, buffer: &str, name: Span, pos: Position) -> HandlerResult {
        (**self).open_element_end(buffer, name, pos)
    }

    fn close_element_start(&mut self, buffer: &str, name: Span, pos: Position) -> HandlerResult {
        (**self).close_element_start(buffer, name, pos)
    }

    fn close_element_end(&mut self, buffer: &str, name: Span, pos: Position) -> HandlerResult {
        (**self).close_element_end(buffer, name, pos)
    }

    fn auto_close_element_start(
        &mut self,
        buffer: &str,
        name: Span,
        pos: Position,
    ) -> HandlerResult {
        (**self).auto_close_element_start(buffer, name, pos)
    }

    fn auto_close_element_end(
        &mut self,
        buffer: &str,
        name: Span,
        pos: Position,
    ) -> HandlerResult {
        (**self).auto_close_element_end(buffer, name, pos)
    }

    fn unmatched_close_element_start(
        &mut self,
        buffer: &str,
        name: Span,
        pos: Position,
    ) -> HandlerResult {
        (**self).unmatched_close_element_start(buffer, name, pos)
    }

    fn unmatched_close_element_end(
        &mut self,
        buffer: &str,
        name: Span,
        pos: Position,
    ) -> HandlerResult {
        (**self).unmatched_close_element_end(buffer, name, pos)
    }

    fn attribute(&mut self, buffer: &str, attribute: &AttributeSpans) -> HandlerResult {
        (**self).attribute(buffer, attribute)
    }

    fn inner_whitespace(&mut self, buffer: &str, span: Span, pos: Position) -> HandlerResult {
        (**self).inner_whitespace(buffer, span, pos)
    }

    fn processing_instruction(
        &mut self,
        buffer: &str,
        target: Span,
        content: Option<Span>,
        outer: Span,
        pos: Position,
    ) -> HandlerResult {
        (**self).processing_instruction(buffer, target, content, outer, pos)
    }
}
