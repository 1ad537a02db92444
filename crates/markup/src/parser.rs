//! Streaming markup parser.
//!
//! Single forward pass over the input, emitting [`MarkupHandler`] events with
//! spans into the input buffer. The parser is lenient: a `<` that does not
//! start a complete structure (tag, comment, CDATA section, DOCTYPE, XML
//! declaration or processing instruction) is ordinary text, so concatenating
//! every emitted span reproduces the input byte for byte.
//!
//! Structure handled beyond the lexical level:
//! - HTML void elements are reported as non-minimized standalone elements.
//! - In HTML mode `script`/`style` content is raw text up to the matching
//!   close tag.
//! - A close tag closes the innermost open element with the same name; open
//!   elements above it are auto-closed. A close tag with no open counterpart
//!   is reported as unmatched.
//! - Elements still open at the end of the input are auto-closed.
//!
//! Not an HTML5 tree builder: there is no implied-end-tag or foster-parenting
//! recovery.

use crate::error::MarkupError;
use crate::handler::{AttributeSpans, HandlerResult, MarkupHandler};
use crate::mode::TemplateMode;
use crate::span::{LineCursor, Position, Span};
use memchr::{memchr, memmem};

const COMMENT_START: &[u8] = b"<!--";
const COMMENT_END: &[u8] = b"-->";
const CDATA_START: &[u8] = b"<![CDATA[";
const CDATA_END: &[u8] = b"]]>";
const DOCTYPE_START: &[u8] = b"<!doctype";
const PI_END: &[u8] = b"?>";
const XML_DECLARATION_START: &[u8] = b"<?xml";

#[derive(Clone, Copy, Debug, Default)]
pub struct MarkupParser {
    mode: TemplateMode,
}

impl MarkupParser {
    pub fn new(mode: TemplateMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> TemplateMode {
        self.mode
    }

    pub fn parse<H: MarkupHandler + ?Sized>(&self, input: &str, handler: &mut H) -> HandlerResult {
        let mut run = ParseRun {
            input,
            bytes: input.as_bytes(),
            mode: self.mode,
            cursor: LineCursor::new(),
            open: Vec::new(),
            parts: Vec::new(),
            searches: [None; Terminator::COUNT],
            handler,
        };
        run.run()
    }
}

#[derive(Clone, Copy, Debug)]
enum TagPart {
    Whitespace(Span),
    Attribute(AttributeSpans),
}

#[derive(Clone, Copy, Debug)]
struct TagScan {
    name: Span,
    /// Offset of the terminating `>` (or of the `/` in `/>`).
    terminator: usize,
    /// Offset just past the tag.
    end: usize,
    minimized: bool,
}

enum Structure {
    Comment { content: Span, outer: Span },
    CData { content: Span, outer: Span },
    Doctype { outer: Span },
    XmlDeclaration { outer: Span },
    ProcessingInstruction { target: Span, content: Option<Span>, outer: Span },
    CloseTag(TagScan),
    StartTag(TagScan),
}

/// Byte sequences that end a structure and may be searched for up to the end
/// of the input.
#[derive(Clone, Copy, Debug)]
enum Terminator {
    CommentEnd,
    CDataEnd,
    PiEnd,
    Gt,
    DoubleQuote,
    SingleQuote,
}

impl Terminator {
    const COUNT: usize = 6;

    fn needle(self) -> &'static [u8] {
        match self {
            Terminator::CommentEnd => COMMENT_END,
            Terminator::CDataEnd => CDATA_END,
            Terminator::PiEnd => PI_END,
            Terminator::Gt => b">",
            Terminator::DoubleQuote => b"\"",
            Terminator::SingleQuote => b"'",
        }
    }
}

struct ParseRun<'a, H: ?Sized> {
    input: &'a str,
    bytes: &'a [u8],
    mode: TemplateMode,
    cursor: LineCursor,
    /// Names of the currently open elements, innermost last.
    open: Vec<Span>,
    /// Scratch storage for the parts of the tag being scanned.
    parts: Vec<TagPart>,
    /// Last search per terminator: start offset and the first occurrence at
    /// or after it.
    searches: [Option<(usize, Option<usize>)>; Terminator::COUNT],
    handler: &'a mut H,
}

fn is_name_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b':' || b >= 0x80
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b':' | b'.') || b >= 0x80
}

fn starts_with_ignore_ascii_case_at(haystack: &[u8], start: usize, needle: &[u8]) -> bool {
    haystack.len() >= start + needle.len()
        && haystack[start..start + needle.len()].eq_ignore_ascii_case(needle)
}

// Matches only start at ASCII '<', which never occurs inside a UTF-8
// multi-byte sequence.
fn find_raw_text_close_tag(haystack: &[u8], close_tag: &[u8]) -> Option<usize> {
    debug_assert!(close_tag.len() >= 2 && close_tag.starts_with(b"</"));
    let len = haystack.len();
    let n = close_tag.len();
    let mut i = 0;
    while i + n <= len {
        i += memchr(b'<', &haystack[i..])?;
        if i + n > len {
            return None;
        }
        if haystack[i + 1] == b'/' && starts_with_ignore_ascii_case_at(haystack, i, close_tag) {
            let mut k = i + n;
            while k < len && haystack[k].is_ascii_whitespace() {
                k += 1;
            }
            if k < len && haystack[k] == b'>' {
                return Some(i);
            }
        }
        i += 1;
    }
    None
}

impl<H: MarkupHandler + ?Sized> ParseRun<'_, H> {
    fn run(&mut self) -> HandlerResult {
        self.handler.document_start()?;
        let len = self.bytes.len();
        let mut i = 0;
        let mut text_start = 0;
        while i < len {
            let Some(rel) = memchr(b'<', &self.bytes[i..]) else {
                break;
            };
            let lt = i + rel;
            match self.scan_structure(lt) {
                Some(structure) => {
                    self.flush_text(text_start, lt)?;
                    i = self.emit(lt, structure)?;
                    text_start = i;
                }
                None => i = lt + 1,
            }
        }
        self.flush_text(text_start, len)?;

        let eof = self.pos(len);
        while let Some(name) = self.open.pop() {
            log::trace!(
                target: "markup.parser",
                "auto-closing <{}> at end of input",
                name.slice(self.input)
            );
            self.handler.auto_close_element_start(self.input, name, eof)?;
            self.handler.auto_close_element_end(self.input, name, eof)?;
        }
        self.handler.document_end(eof)
    }

    fn pos(&mut self, offset: usize) -> Position {
        self.cursor.position(self.input, offset)
    }

    fn flush_text(&mut self, start: usize, end: usize) -> HandlerResult {
        if start >= end {
            return Ok(());
        }
        debug_assert!(self.input.is_char_boundary(start));
        debug_assert!(self.input.is_char_boundary(end));
        let pos = self.pos(start);
        self.handler.text(self.input, Span::new(start, end), pos)
    }

    /// First occurrence of `terminator` at or after `start`. Scanning never
    /// moves backwards, so a miss stays a miss for every later start and an
    /// earlier hit is reused until the scan passes it.
    fn find_terminator(&mut self, start: usize, terminator: Terminator) -> Option<usize> {
        let slot = &mut self.searches[terminator as usize];
        if let Some((from, found)) = *slot {
            if start >= from {
                match found {
                    None => return None,
                    Some(at) if at >= start => return Some(at),
                    Some(_) => {}
                }
            }
        }
        let found = memmem::find(&self.bytes[start..], terminator.needle()).map(|rel| start + rel);
        *slot = Some((start, found));
        found
    }

    fn scan_structure(&mut self, lt: usize) -> Option<Structure> {
        let bytes = self.bytes;
        let next = *bytes.get(lt + 1)?;
        match next {
            b'!' => {
                if bytes[lt..].starts_with(COMMENT_START) {
                    let content_start = lt + COMMENT_START.len();
                    let close = self.find_terminator(content_start, Terminator::CommentEnd)?;
                    return Some(Structure::Comment {
                        content: Span::new(content_start, close),
                        outer: Span::new(lt, close + COMMENT_END.len()),
                    });
                }
                if bytes[lt..].starts_with(CDATA_START) {
                    let content_start = lt + CDATA_START.len();
                    let close = self.find_terminator(content_start, Terminator::CDataEnd)?;
                    return Some(Structure::CData {
                        content: Span::new(content_start, close),
                        outer: Span::new(lt, close + CDATA_END.len()),
                    });
                }
                if starts_with_ignore_ascii_case_at(bytes, lt, DOCTYPE_START) {
                    let gt = self.find_terminator(lt, Terminator::Gt)?;
                    return Some(Structure::Doctype {
                        outer: Span::new(lt, gt + 1),
                    });
                }
                None
            }
            b'?' => self.scan_processing_instruction(lt),
            b'/' => {
                let name_start = lt + 2;
                if !bytes.get(name_start).copied().is_some_and(is_name_start) {
                    return None;
                }
                self.scan_tag(lt, name_start, true).map(Structure::CloseTag)
            }
            b if is_name_start(b) => self.scan_tag(lt, lt + 1, false).map(Structure::StartTag),
            _ => None,
        }
    }

    fn scan_processing_instruction(&mut self, lt: usize) -> Option<Structure> {
        let bytes = self.bytes;
        let close = self.find_terminator(lt + 2, Terminator::PiEnd)?;
        let outer = Span::new(lt, close + PI_END.len());
        if bytes[lt..].starts_with(XML_DECLARATION_START)
            && bytes
                .get(lt + XML_DECLARATION_START.len())
                .is_some_and(|b| b.is_ascii_whitespace())
        {
            return Some(Structure::XmlDeclaration { outer });
        }
        let target_start = lt + 2;
        let mut k = target_start;
        while k < close && is_name_byte(bytes[k]) {
            k += 1;
        }
        if k == target_start || !bytes.get(target_start).copied().is_some_and(is_name_start) {
            return None;
        }
        let target = Span::new(target_start, k);
        while k < close && bytes[k].is_ascii_whitespace() {
            k += 1;
        }
        let content = (k < close).then(|| Span::new(k, close));
        Some(Structure::ProcessingInstruction {
            target,
            content,
            outer,
        })
    }

    /// Scan a start or close tag whose name begins at `name_start`, filling
    /// `self.parts`. `None` when the tag is not terminated.
    fn scan_tag(&mut self, lt: usize, name_start: usize, close: bool) -> Option<TagScan> {
        let bytes = self.bytes;
        let len = bytes.len();
        self.parts.clear();

        let mut k = name_start;
        while k < len && is_name_byte(bytes[k]) {
            k += 1;
        }
        let name = Span::new(name_start, k);
        debug_assert!(lt < name_start);

        loop {
            let ws_start = k;
            while k < len && bytes[k].is_ascii_whitespace() {
                k += 1;
            }
            if k > ws_start {
                self.parts.push(TagPart::Whitespace(Span::new(ws_start, k)));
            }
            match bytes.get(k).copied()? {
                b'>' => {
                    return Some(TagScan {
                        name,
                        terminator: k,
                        end: k + 1,
                        minimized: false,
                    });
                }
                b'/' if !close && bytes.get(k + 1) == Some(&b'>') => {
                    return Some(TagScan {
                        name,
                        terminator: k,
                        end: k + 2,
                        minimized: true,
                    });
                }
                _ if close => return None,
                _ => {}
            }
            let attribute = self.scan_attribute(k)?;
            k = attribute.full().end;
            self.parts.push(TagPart::Attribute(attribute));
        }
    }

    fn scan_attribute(&mut self, start: usize) -> Option<AttributeSpans> {
        let bytes = self.bytes;
        let len = bytes.len();
        let mut k = start;
        while k < len {
            match bytes[k] {
                b'=' | b'>' | b'<' | b'"' | b'\'' => break,
                b'/' if bytes.get(k + 1) == Some(&b'>') => break,
                b if b.is_ascii_whitespace() => break,
                _ => k += 1,
            }
        }
        if k == start {
            return None;
        }
        let name = Span::new(start, k);

        let mut op_end = k;
        while op_end < len && bytes[op_end].is_ascii_whitespace() {
            op_end += 1;
        }
        if bytes.get(op_end) != Some(&b'=') {
            return Some(AttributeSpans {
                name,
                operator: Span::empty_at(k),
                value_content: Span::empty_at(k),
                value_outer: Span::empty_at(k),
                ..AttributeSpans::default()
            });
        }
        op_end += 1;
        while op_end < len && bytes[op_end].is_ascii_whitespace() {
            op_end += 1;
        }
        let operator = Span::new(k, op_end);

        let value_start = op_end;
        let (value_content, value_outer) = match bytes.get(value_start).copied() {
            Some(quote @ (b'"' | b'\'')) => {
                let content_start = value_start + 1;
                let terminator = if quote == b'"' {
                    Terminator::DoubleQuote
                } else {
                    Terminator::SingleQuote
                };
                let close = self.find_terminator(content_start, terminator)?;
                (
                    Span::new(content_start, close),
                    Span::new(value_start, close + 1),
                )
            }
            _ => {
                let mut v = value_start;
                while v < len {
                    match bytes[v] {
                        b'>' => break,
                        b'/' if bytes.get(v + 1) == Some(&b'>') => break,
                        b if b.is_ascii_whitespace() => break,
                        _ => v += 1,
                    }
                }
                let value = Span::new(value_start, v);
                (value, value)
            }
        };
        Some(AttributeSpans {
            name,
            operator,
            value_content,
            value_outer,
            ..AttributeSpans::default()
        })
    }

    /// Emit the events for `structure` starting at `lt`. Returns the offset
    /// where scanning resumes.
    fn emit(&mut self, lt: usize, structure: Structure) -> Result<usize, MarkupError> {
        let input = self.input;
        let pos = self.pos(lt);
        match structure {
            Structure::Comment { content, outer } => {
                self.handler.comment(input, content, outer, pos)?;
                Ok(outer.end)
            }
            Structure::CData { content, outer } => {
                self.handler.cdata(input, content, outer, pos)?;
                Ok(outer.end)
            }
            Structure::Doctype { outer } => {
                self.handler.doctype(input, outer, pos)?;
                Ok(outer.end)
            }
            Structure::XmlDeclaration { outer } => {
                self.handler.xml_declaration(input, outer, pos)?;
                Ok(outer.end)
            }
            Structure::ProcessingInstruction {
                target,
                content,
                outer,
            } => {
                self.handler
                    .processing_instruction(input, target, content, outer, pos)?;
                Ok(outer.end)
            }
            Structure::StartTag(scan) => self.emit_start_tag(scan, pos),
            Structure::CloseTag(scan) => self.emit_close_tag(scan, pos),
        }
    }

    fn emit_parts(&mut self) -> HandlerResult {
        let parts = std::mem::take(&mut self.parts);
        for part in &parts {
            match *part {
                TagPart::Whitespace(span) => {
                    let pos = self.pos(span.start);
                    self.handler.inner_whitespace(self.input, span, pos)?;
                }
                TagPart::Attribute(mut attribute) => {
                    attribute.name_pos = self.pos(attribute.name.start);
                    attribute.operator_pos = self.pos(attribute.operator.start);
                    attribute.value_pos = self.pos(attribute.value_outer.start);
                    self.handler.attribute(self.input, &attribute)?;
                }
            }
        }
        self.parts = parts;
        Ok(())
    }

    fn emit_start_tag(
        &mut self,
        scan: TagScan,
        pos: Position,
    ) -> Result<usize, MarkupError> {
        let input = self.input;
        let name = scan.name;
        let name_str = name.slice(input);
        let standalone = scan.minimized || self.mode.is_void_element(name_str);

        if standalone {
            self.handler
                .standalone_element_start(input, name, scan.minimized, pos)?;
        } else {
            self.handler.open_element_start(input, name, pos)?;
        }
        self.emit_parts()?;
        let end_pos = self.pos(scan.terminator);
        if standalone {
            self.handler
                .standalone_element_end(input, name, scan.minimized, end_pos)?;
            return Ok(scan.end);
        }
        self.handler.open_element_end(input, name, end_pos)?;
        self.open.push(name);

        let Some(close_tag) = self.mode.raw_text_close_tag(name_str) else {
            return Ok(scan.end);
        };
        let content_end = find_raw_text_close_tag(&self.bytes[scan.end..], close_tag)
            .map_or(self.bytes.len(), |rel| scan.end + rel);
        self.flush_text(scan.end, content_end)?;
        Ok(content_end)
    }

    fn emit_close_tag(
        &mut self,
        scan: TagScan,
        pos: Position,
    ) -> Result<usize, MarkupError> {
        let input = self.input;
        let name = scan.name;
        let name_str = name.slice(input);
        let mode = self.mode;
        let matching = self
            .open
            .iter()
            .rposition(|open| mode.names_equal(open.slice(input), name_str));

        let Some(depth) = matching else {
            log::trace!(target: "markup.parser", "unmatched close tag </{name_str}> at {pos}");
            self.handler
                .unmatched_close_element_start(input, name, pos)?;
            self.emit_parts()?;
            let end_pos = self.pos(scan.terminator);
            self.handler
                .unmatched_close_element_end(input, name, end_pos)?;
            return Ok(scan.end);
        };

        while self.open.len() > depth + 1 {
            if let Some(inner) = self.open.pop() {
                self.handler.auto_close_element_start(input, inner, pos)?;
                self.handler.auto_close_element_end(input, inner, pos)?;
            }
        }
        self.open.pop();
        self.handler.close_element_start(input, name, pos)?;
        self.emit_parts()?;
        let end_pos = self.pos(scan.terminator);
        self.handler.close_element_end(input, name, end_pos)?;
        Ok(scan.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::EventTrace;

    fn events(mode: TemplateMode, input: &str) -> Vec<String> {
        let mut trace = EventTrace::default();
        MarkupParser::new(mode)
            .parse(input, &mut trace)
            .expect("tracing never fails");
        trace.into_events()
    }

    fn html(input: &str) -> Vec<String> {
        events(TemplateMode::Html, input)
    }

    #[test]
    fn parses_element_with_attributes_and_whitespace() {
        let ev = html("<a href = 'x' id=y disabled>t</a>");
        assert_eq!(
            ev,
            [
                "document_start",
                "open_start(a)@1:1",
                "ws(\" \")",
                "attr(href|\" = \"|x|'x')",
                "ws(\" \")",
                "attr(id|\"=\"|y|y)",
                "ws(\" \")",
                "attr(disabled)",
                "open_end(a)@1:28",
                "text(\"t\")@1:29",
                "close_start(a)@1:30",
                "close_end(a)@1:33",
                "document_end@1:34",
            ]
        );
    }

    #[test]
    fn void_and_minimized_elements_are_standalone() {
        let ev = html("<br><img src=x/><hr />");
        assert!(ev.contains(&"standalone_start(br,false)@1:1".to_string()));
        assert!(ev.contains(&"standalone_end(br,false)@1:4".to_string()));
        assert!(ev.contains(&"standalone_start(img,true)@1:5".to_string()));
        assert!(ev.contains(&"attr(src|\"=\"|x|x)".to_string()));
        assert!(ev.contains(&"standalone_end(hr,true)@1:21".to_string()));
        assert!(!ev.iter().any(|e| e.starts_with("open_start")));
    }

    #[test]
    fn xml_mode_has_no_void_elements_and_is_case_sensitive() {
        let ev = events(TemplateMode::Xml, "<br><B></b></br>");
        assert_eq!(
            ev,
            [
                "document_start",
                "open_start(br)@1:1",
                "open_end(br)@1:4",
                "open_start(B)@1:5",
                "open_end(B)@1:7",
                "unmatched_start(b)@1:8",
                "unmatched_end(b)@1:11",
                "auto_close_start(B)@1:12",
                "auto_close_end(B)@1:12",
                "close_start(br)@1:12",
                "close_end(br)@1:16",
                "document_end@1:17",
            ]
        );
    }

    #[test]
    fn open_elements_are_auto_closed_at_end() {
        let ev = html("<div><P>x");
        let tail: Vec<&str> = ev.iter().rev().take(5).map(String::as_str).collect();
        assert_eq!(
            tail,
            [
                "document_end@1:10",
                "auto_close_end(div)@1:10",
                "auto_close_start(div)@1:10",
                "auto_close_end(P)@1:10",
                "auto_close_start(P)@1:10",
            ]
        );
    }

    #[test]
    fn script_content_is_raw_text() {
        let ev = html("<script>if (a < b) { x = '</div>'; }</SCRIPT >");
        assert_eq!(
            ev,
            [
                "document_start",
                "open_start(script)@1:1",
                "open_end(script)@1:8",
                "text(\"if (a < b) { x = '</div>'; }\")@1:9",
                "close_start(SCRIPT)@1:37",
                "ws(\" \")",
                "close_end(SCRIPT)@1:46",
                "document_end@1:47",
            ]
        );
    }

    #[test]
    fn lone_angle_brackets_stay_in_text() {
        let ev = html("a < b <> c <!-- open");
        assert_eq!(
            ev,
            [
                "document_start",
                "text(\"a < b <> c <!-- open\")@1:1",
                "document_end@1:21"
            ]
        );
    }

    #[test]
    fn unterminated_tag_is_text() {
        let ev = html("x<div class=\"a");
        assert_eq!(ev[1], "text(\"x<div class=\\\"a\")@1:1");
    }

    #[test]
    fn declarations_comments_and_instructions() {
        let input = "<?xml version=\"1.0\"?>\n<!DOCTYPE html>\n<!-- c --><![CDATA[<x>]]><?php echo 1 ?><?go?>";
        let ev = events(TemplateMode::Xml, input);
        assert_eq!(
            ev,
            [
                "document_start",
                "xml_decl(<?xml version=\"1.0\"?>)@1:1",
                "text(\"\\n\")@1:22",
                "doctype(<!DOCTYPE html>)@2:1",
                "text(\"\\n\")@2:16",
                "comment( c )@3:1",
                "cdata(<x>)@3:11",
                "pi(php,Some(\"echo 1 \"))@3:26",
                "pi(go,None)@3:41",
                "document_end@3:47",
            ]
        );
    }

    #[test]
    fn positions_follow_lines() {
        let ev = html("<ul>\n  <li\n    class=\"a\">x</li>\n</ul>");
        assert!(ev.contains(&"open_start(li)@2:3".to_string()));
        assert!(ev.contains(&"open_end(li)@3:14".to_string()));
        assert!(ev.contains(&"close_start(ul)@4:1".to_string()));
    }

    #[test]
    fn raw_text_close_tag_search() {
        assert_eq!(find_raw_text_close_tag(b"a</script >", b"</script"), Some(1));
        assert_eq!(find_raw_text_close_tag(b"a</scripts>", b"</script"), None);
        assert_eq!(find_raw_text_close_tag(b"</STYLE>", b"</style"), Some(0));
    }

    #[test]
    fn repeated_unterminated_openers_are_one_text_run() {
        for opener in ["<!--", "<![CDATA[", "<?x ", "<!doctype ", "<a b=\""] {
            let input = opener.repeat(40_000);
            let ev = html(&input);
            assert_eq!(ev.len(), 3, "{opener}");
            assert_eq!(ev[0], "document_start");
            assert!(ev[1].starts_with("text("), "{opener}: {}", ev[1]);
            assert!(ev[2].starts_with("document_end@1:"), "{opener}");
        }
    }

    #[test]
    fn terminator_found_for_a_rejected_structure_is_reused() {
        let ev = html("<? <?x y?>");
        assert_eq!(
            ev,
            [
                "document_start",
                "text(\"<? \")@1:1",
                "pi(x,Some(\"y\"))@1:4",
                "document_end@1:11",
            ]
        );
    }
}
