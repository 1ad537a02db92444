//! Handler that records events as one line of text each. Used by the CLI's
//! event dump and by tests.

use crate::handler::{AttributeSpans, HandlerResult, MarkupHandler};
use crate::span::{Position, Span};

#[derive(Debug, Default)]
pub struct EventTrace {
    events: Vec<String>,
}

impl EventTrace {
    pub fn events(&self) -> &[String] {
        &self.events
    }

    pub fn into_events(self) -> Vec<String> {
        self.events
    }

    fn element(&mut self, kind: &str, buffer: &str, name: Span, pos: Position) -> HandlerResult {
        self.events
            .push(format!("{kind}({})@{pos}", name.slice(buffer)));
        Ok(())
    }
}

impl MarkupHandler for EventTrace {
    fn document_start(&mut self) -> HandlerResult {
        self.events.push("document_start".to_string());
        Ok(())
    }

    fn document_end(&mut self, pos: Position) -> HandlerResult {
        self.events.push(format!("document_end@{pos}"));
        Ok(())
    }

    fn xml_declaration(&mut self, buffer: &str, outer: Span, pos: Position) -> HandlerResult {
        self.events
            .push(format!("xml_decl({})@{pos}", outer.slice(buffer)));
        Ok(())
    }

    fn doctype(&mut self, buffer: &str, outer: Span, pos: Position) -> HandlerResult {
        self.events
            .push(format!("doctype({})@{pos}", outer.slice(buffer)));
        Ok(())
    }

    fn cdata(&mut self, buffer: &str, content: Span, _outer: Span, pos: Position) -> HandlerResult {
        self.events
            .push(format!("cdata({})@{pos}", content.slice(buffer)));
        Ok(())
    }

    fn comment(
        &mut self,
        buffer: &str,
        content: Span,
        _outer: Span,
        pos: Position,
    ) -> HandlerResult {
        self.events
            .push(format!("comment({})@{pos}", content.slice(buffer)));
        Ok(())
    }

    fn text(&mut self, buffer: &str, span: Span, pos: Position) -> HandlerResult {
        self.events
            .push(format!("text({:?})@{pos}", span.slice(buffer)));
        Ok(())
    }

    fn standalone_element_start(
        &mut self,
        buffer: &str,
        name: Span,
        minimized: bool,
        pos: Position,
    ) -> HandlerResult {
        self.events.push(format!(
            "standalone_start({},{minimized})@{pos}",
            name.slice(buffer)
        ));
        Ok(())
    }

    fn standalone_element_end(
        &mut self,
        buffer: &str,
        name: Span,
        minimized: bool,
        pos: Position,
    ) -> HandlerResult {
        self.events.push(format!(
            "standalone_end({},{minimized})@{pos}",
            name.slice(buffer)
        ));
        Ok(())
    }

    fn open_element_start(&mut self, buffer: &str, name: Span, pos: Position) -> HandlerResult {
        self.element("open_start", buffer, name, pos)
    }

    fn open_element_end(&mut self, buffer: &str, name: Span, pos: Position) -> HandlerResult {
        self.element("open_end", buffer, name, pos)
    }

    fn close_element_start(&mut self, buffer: &str, name: Span, pos: Position) -> HandlerResult {
        self.element("close_start", buffer, name, pos)
    }

    fn close_element_end(&mut self, buffer: &str, name: Span, pos: Position) -> HandlerResult {
        self.element("close_end", buffer, name, pos)
    }

    fn auto_close_element_start(
        &mut self,
        buffer: &str,
        name: Span,
        pos: Position,
    ) -> HandlerResult {
        self.element("auto_close_start", buffer, name, pos)
    }

    fn auto_close_element_end(
        &mut self,
        buffer: &str,
        name: Span,
        pos: Position,
    ) -> HandlerResult {
        self.element("auto_close_end", buffer, name, pos)
    }

    fn unmatched_close_element_start(
        &mut self,
        buffer: &str,
        name: Span,
        pos: Position,
    ) -> HandlerResult {
        self.element("unmatched_start", buffer, name, pos)
    }

    fn unmatched_close_element_end(
        &mut self,
        buffer: &str,
        name: Span,
        pos: Position,
    ) -> HandlerResult {
        self.element("unmatched_end", buffer, name, pos)
    }

    fn attribute(&mut self, buffer: &str, attribute: &AttributeSpans) -> HandlerResult {
        let name = attribute.name.slice(buffer);
        if attribute.has_value() {
            self.events.push(format!(
                "attr({name}|{:?}|{}|{})",
                attribute.operator.slice(buffer),
                attribute.value_content.slice(buffer),
                attribute.value_outer.slice(buffer)
            ));
        } else {
            self.events.push(format!("attr({name})"));
        }
        Ok(())
    }

    fn inner_whitespace(&mut self, buffer: &str, span: Span, _pos: Position) -> HandlerResult {
        self.events.push(format!("ws({:?})", span.slice(buffer)));
        Ok(())
    }

    fn processing_instruction(
        &mut self,
        buffer: &str,
        target: Span,
        content: Option<Span>,
        _outer: Span,
        pos: Position,
    ) -> HandlerResult {
        self.events.push(format!(
            "pi({},{:?})@{pos}",
            target.slice(buffer),
            content.map(|c| c.slice(buffer))
        ));
        Ok(())
    }
}
