//! Well-known markup names and whitespace runs kept permanently in the
//! standard repository.

pub const STANDARD_HTML_ELEMENT_NAMES: &[&str] = &[
    "a", "abbr", "address", "area", "article", "aside", "audio", "b", "base", "bdi", "bdo",
    "blockquote", "body", "br", "button", "canvas", "caption", "cite", "code", "col",
    "colgroup", "data", "datalist", "dd", "del", "details", "dfn", "dialog", "div", "dl", "dt",
    "em", "embed", "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4",
    "h5", "h6", "head", "header", "hgroup", "hr", "html", "i", "iframe", "img", "input", "ins",
    "kbd", "keygen", "label", "legend", "li", "link", "main", "map", "mark", "menu", "menuitem",
    "meta", "meter", "nav", "noscript", "object", "ol", "optgroup", "option", "output", "p",
    "param", "picture", "pre", "progress", "q", "rb", "rp", "rt", "rtc", "ruby", "s", "samp",
    "script", "section", "select", "small", "source", "span", "strong", "style", "sub",
    "summary", "sup", "table", "tbody", "td", "template", "textarea", "tfoot", "th", "thead",
    "time", "title", "tr", "track", "u", "ul", "var", "video", "wbr",
];

pub const STANDARD_HTML_ATTRIBUTE_NAMES: &[&str] = &[
    "abbr", "accept", "accept-charset", "accesskey", "action", "align", "alink", "alt",
    "archive", "async", "autocomplete", "autofocus", "autoplay", "axis", "background",
    "bgcolor", "border", "cellpadding", "cellspacing", "char", "charoff", "charset", "checked",
    "cite", "class", "classid", "clear", "code", "codebase", "codetype", "color", "cols",
    "colspan", "compact", "content", "contenteditable", "contextmenu", "controls", "coords",
    "data", "datetime", "declare", "default", "defer", "dir", "dirname", "disabled", "download",
    "draggable", "dropzone", "enctype", "face", "for", "form", "formaction", "formenctype",
    "formmethod", "formnovalidate", "formtarget", "frame", "frameborder", "headers", "height",
    "hidden", "high", "href", "hreflang", "hspace", "http-equiv", "id", "ismap", "keytype",
    "kind", "label", "lang", "language", "list", "longdesc", "loop", "low", "marginheight",
    "marginwidth", "max", "maxlength", "media", "method", "min", "multiple", "muted", "name",
    "nohref", "noresize", "noshade", "novalidate", "nowrap", "object", "onabort", "onblur",
    "onchange", "onclick", "ondblclick", "onerror", "onfocus", "oninput", "onkeydown",
    "onkeypress", "onkeyup", "onload", "onmousedown", "onmousemove", "onmouseout",
    "onmouseover", "onmouseup", "onreset", "onresize", "onscroll", "onselect", "onsubmit",
    "onunload", "open", "optimum", "pattern", "placeholder", "poster", "preload", "profile",
    "readonly", "rel", "required", "rev", "reversed", "rows", "rowspan", "rules", "sandbox",
    "scheme", "scope", "scoped", "scrolling", "seamless", "selected", "shape", "size", "sizes",
    "span", "spellcheck", "src", "srcdoc", "srclang", "srcset", "standby", "start", "step",
    "style", "summary", "tabindex", "target", "text", "title", "translate", "type", "usemap",
    "valign", "value", "valuetype", "version", "vlink", "vspace", "width", "wrap",
];

const MAX_INDENT_SPACES: usize = 20;
const MAX_INDENT_TABS: usize = 10;

/// Whitespace runs that show up between tags in almost every document: a
/// single space, and a line break followed by up to 20 spaces or 10 tabs
/// (for both `\n` and `\r\n` line endings).
pub fn standard_whitespace_texts() -> Vec<String> {
    let mut out = Vec::with_capacity(1 + 2 * (MAX_INDENT_SPACES + MAX_INDENT_TABS + 1));
    out.push(" ".to_string());
    for newline in ["\n", "\r\n"] {
        for spaces in 0..=MAX_INDENT_SPACES {
            out.push(format!("{newline}{}", " ".repeat(spaces)));
        }
        for tabs in 1..=MAX_INDENT_TABS {
            out.push(format!("{newline}{}", "\t".repeat(tabs)));
        }
    }
    out
}

/// Every text the standard repository keeps permanently, without duplicates,
/// element names first.
pub fn standard_unremovable_texts() -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    STANDARD_HTML_ELEMENT_NAMES
        .iter()
        .chain(STANDARD_HTML_ATTRIBUTE_NAMES)
        .map(|s| s.to_string())
        .chain(standard_whitespace_texts())
        .filter(|s| seen.insert(s.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_runs_cover_both_line_endings() {
        let ws = standard_whitespace_texts();
        assert!(ws.contains(&" ".to_string()));
        assert!(ws.contains(&"\n".to_string()));
        assert!(ws.contains(&format!("\n{}", " ".repeat(20))));
        assert!(ws.contains(&"\r\n\t\t".to_string()));
        assert!(!ws.contains(&format!("\n{}", " ".repeat(21))));
    }

    #[test]
    fn unremovable_texts_are_unique() {
        let texts = standard_unremovable_texts();
        let unique: std::collections::HashSet<_> = texts.iter().collect();
        assert_eq!(unique.len(), texts.len());
        assert_eq!(texts[0], "a");
        assert!(texts.iter().any(|t| t == "class"));
    }
}
