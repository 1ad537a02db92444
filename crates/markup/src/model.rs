//! Parsed template model.
//!
//! [`TemplateModelHandler`] turns the event stream into a flat list of
//! [`TemplateEvent`]s. Element names, attribute names, operators and
//! whitespace go through a [`TextRepository`], so models built from many
//! templates share one allocation per recurring fragment.

use crate::handler::{AttributeSpans, HandlerResult, MarkupHandler};
use crate::span::{Position, Span};
use std::sync::Arc;
use text::TextRepository;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TagPart {
    Whitespace(Arc<str>),
    Attribute {
        name: Arc<str>,
        /// Empty for attributes without value.
        operator: Arc<str>,
        /// Value with its quotes, if any.
        value: Arc<str>,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElementTag {
    pub name: Arc<str>,
    pub parts: Vec<TagPart>,
    pub pos: Position,
}

impl ElementTag {
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.parts.iter().filter_map(|part| match part {
            TagPart::Attribute { name, value, .. } => Some((&**name, &**value)),
            TagPart::Whitespace(_) => None,
        })
    }

    fn write_parts(&self, out: &mut String) {
        for part in &self.parts {
            match part {
                TagPart::Whitespace(ws) => out.push_str(ws),
                TagPart::Attribute {
                    name,
                    operator,
                    value,
                } => {
                    out.push_str(name);
                    out.push_str(operator);
                    out.push_str(value);
                }
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TemplateEvent {
    XmlDeclaration(Arc<str>),
    DocType(Arc<str>),
    CData(Arc<str>),
    Comment(Arc<str>),
    Text(Arc<str>),
    ProcessingInstruction(Arc<str>),
    OpenElement(ElementTag),
    StandaloneElement { tag: ElementTag, minimized: bool },
    CloseElement(ElementTag),
    AutoCloseElement(Arc<str>),
    UnmatchedCloseElement(ElementTag),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TemplateModel {
    events: Vec<TemplateEvent>,
}

impl TemplateModel {
    pub fn events(&self) -> &[TemplateEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Serialize back to markup. Auto-closed elements produce no output, so a
    /// document parsed without modification is reproduced byte for byte.
    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        for event in &self.events {
            match event {
                TemplateEvent::XmlDeclaration(raw)
                | TemplateEvent::DocType(raw)
                | TemplateEvent::CData(raw)
                | TemplateEvent::Comment(raw)
                | TemplateEvent::Text(raw)
                | TemplateEvent::ProcessingInstruction(raw) => out.push_str(raw),
                TemplateEvent::OpenElement(tag) => {
                    out.push('<');
                    out.push_str(&tag.name);
                    tag.write_parts(&mut out);
                    out.push('>');
                }
                TemplateEvent::StandaloneElement { tag, minimized } => {
                    out.push('<');
                    out.push_str(&tag.name);
                    tag.write_parts(&mut out);
                    out.push_str(if *minimized { "/>" } else { ">" });
                }
                TemplateEvent::CloseElement(tag) | TemplateEvent::UnmatchedCloseElement(tag) => {
                    out.push_str("</");
                    out.push_str(&tag.name);
                    tag.write_parts(&mut out);
                    out.push('>');
                }
                TemplateEvent::AutoCloseElement(_) => {}
            }
        }
        out
    }
}

/// Terminal handler building a [`TemplateModel`].
pub struct TemplateModelHandler<R: TextRepository> {
    repository: R,
    events: Vec<TemplateEvent>,
    pending: Option<ElementTag>,
}

impl<R: TextRepository> TemplateModelHandler<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository,
            events: Vec::new(),
            pending: None,
        }
    }

    pub fn into_model(self) -> TemplateModel {
        TemplateModel {
            events: self.events,
        }
    }

    fn start_tag(&mut self, buffer: &str, name: Span, pos: Position) {
        self.pending = Some(ElementTag {
            name: self.repository.intern_slice(buffer, name.start..name.end),
            parts: Vec::new(),
            pos,
        });
    }

    fn finish_tag(&mut self, buffer: &str, name: Span, pos: Position) -> ElementTag {
        // End without a matching start only happens for a malformed event
        // stream; keep the name so the output stays usable.
        self.pending.take().unwrap_or_else(|| ElementTag {
            name: self.repository.intern_slice(buffer, name.start..name.end),
            parts: Vec::new(),
            pos,
        })
    }

    fn raw(&self, buffer: &str, span: Span) -> Arc<str> {
        Arc::from(span.slice(buffer))
    }
}

impl<R: TextRepository> MarkupHandler for TemplateModelHandler<R> {
    fn xml_declaration(&mut self, buffer: &str, outer: Span, _pos: Position) -> HandlerResult {
        let raw = self.raw(buffer, outer);
        self.events.push(TemplateEvent::XmlDeclaration(raw));
        Ok(())
    }

    fn doctype(&mut self, buffer: &str, outer: Span, _pos: Position) -> HandlerResult {
        let raw = self.raw(buffer, outer);
        self.events.push(TemplateEvent::DocType(raw));
        Ok(())
    }

    fn cdata(&mut self, buffer: &str, _content: Span, outer: Span, _pos: Position) -> HandlerResult {
        let raw = self.raw(buffer, outer);
        self.events.push(TemplateEvent::CData(raw));
        Ok(())
    }

    fn comment(
        &mut self,
        buffer: &str,
        _content: Span,
        outer: Span,
        _pos: Position,
    ) -> HandlerResult {
        let raw = self.raw(buffer, outer);
        self.events.push(TemplateEvent::Comment(raw));
        Ok(())
    }

    fn text(&mut self, buffer: &str, span: Span, _pos: Position) -> HandlerResult {
        let slice = span.slice(buffer);
        // Whitespace between tags recurs across every template.
        let text = if slice.bytes().all(|b| b.is_ascii_whitespace()) {
            self.repository.intern(slice)
        } else {
            Arc::from(slice)
        };
        self.events.push(TemplateEvent::Text(text));
        Ok(())
    }

    fn standalone_element_start(
        &mut self,
        buffer: &str,
        name: Span,
        _minimized: bool,
        pos: Position,
    ) -> HandlerResult {
        self.start_tag(buffer, name, pos);
        Ok(())
    }

    fn standalone_element_end(
        &mut self,
        buffer: &str,
        name: Span,
        minimized: bool,
        pos: Position,
    ) -> HandlerResult {
        let tag = self.finish_tag(buffer, name, pos);
        self.events
            .push(TemplateEvent::StandaloneElement { tag, minimized });
        Ok(())
    }

    fn open_element_start(&mut self, buffer: &str, name: Span, pos: Position) -> HandlerResult {
        self.start_tag(buffer, name, pos);
        Ok(())
    }

    fn open_element_end(&mut self, buffer: &str, name: Span, pos: Position) -> HandlerResult {
        let tag = self.finish_tag(buffer, name, pos);
        self.events.push(TemplateEvent::OpenElement(tag));
        Ok(())
    }

    fn close_element_start(&mut self, buffer: &str, name: Span, pos: Position) -> HandlerResult {
        self.start_tag(buffer, name, pos);
        Ok(())
    }

    fn close_element_end(&mut self, buffer: &str, name: Span, pos: Position) -> HandlerResult {
        let tag = self.finish_tag(buffer, name, pos);
        self.events.push(TemplateEvent::CloseElement(tag));
        Ok(())
    }

    fn auto_close_element_end(
        &mut self,
        buffer: &str,
        name: Span,
        _pos: Position,
    ) -> HandlerResult {
        let name = self.repository.intern_slice(buffer, name.start..name.end);
        self.events.push(TemplateEvent::AutoCloseElement(name));
        Ok(())
    }

    fn unmatched_close_element_start(
        &mut self,
        buffer: &str,
        name: Span,
        pos: Position,
    ) -> HandlerResult {
        self.start_tag(buffer, name, pos);
        Ok(())
    }

    fn unmatched_close_element_end(
        &mut self,
        buffer: &str,
        name: Span,
        pos: Position,
    ) -> HandlerResult {
        let tag = self.finish_tag(buffer, name, pos);
        self.events.push(TemplateEvent::UnmatchedCloseElement(tag));
        Ok(())
    }

    fn attribute(&mut self, buffer: &str, attribute: &AttributeSpans) -> HandlerResult {
        let part = TagPart::Attribute {
            name: self
                .repository
                .intern_slice(buffer, attribute.name.start..attribute.name.end),
            operator: self
                .repository
                .intern_slice(buffer, attribute.operator.start..attribute.operator.end),
            value: Arc::from(attribute.value_outer.slice(buffer)),
        };
        if let Some(tag) = self.pending.as_mut() {
            tag.parts.push(part);
        }
        Ok(())
    }

    fn inner_whitespace(&mut self, buffer: &str, span: Span, _pos: Position) -> HandlerResult {
        let ws = self.repository.intern_slice(buffer, span.start..span.end);
        if let Some(tag) = self.pending.as_mut() {
            tag.parts.push(TagPart::Whitespace(ws));
        }
        Ok(())
    }

    fn processing_instruction(
        &mut self,
        buffer: &str,
        _target: Span,
        _content: Option<Span>,
        outer: Span,
        _pos: Position,
    ) -> HandlerResult {
        let raw = self.raw(buffer, outer);
        self.events.push(TemplateEvent::ProcessingInstruction(raw));
        Ok(())
    }
}
