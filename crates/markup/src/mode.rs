/// Markup dialect a template is parsed in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TemplateMode {
    /// Case-insensitive names, void elements, raw-text `script`/`style`.
    #[default]
    Html,
    /// Case-sensitive names; every element must be closed or minimized.
    Xml,
}

impl TemplateMode {
    pub fn is_case_sensitive(self) -> bool {
        matches!(self, TemplateMode::Xml)
    }

    pub fn names_equal(self, a: &str, b: &str) -> bool {
        if self.is_case_sensitive() {
            a == b
        } else {
            a.eq_ignore_ascii_case(b)
        }
    }

    /// Name in the form used for comparisons: lowercased in HTML mode.
    pub fn normalize_name(self, name: &str) -> String {
        if self.is_case_sensitive() {
            name.to_string()
        } else {
            name.to_ascii_lowercase()
        }
    }

    pub(crate) fn is_void_element(self, name: &str) -> bool {
        if self.is_case_sensitive() {
            return false;
        }
        VOID_ELEMENTS.iter().any(|void| name.eq_ignore_ascii_case(void))
    }

    pub(crate) fn raw_text_close_tag(self, name: &str) -> Option<&'static [u8]> {
        if self.is_case_sensitive() {
            return None;
        }
        if name.eq_ignore_ascii_case("script") {
            Some(SCRIPT_CLOSE_TAG)
        } else if name.eq_ignore_ascii_case("style") {
            Some(STYLE_CLOSE_TAG)
        } else {
            None
        }
    }
}

impl std::str::FromStr for TemplateMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "html" => Ok(TemplateMode::Html),
            "xml" => Ok(TemplateMode::Xml),
            other => Err(format!("unknown template mode: {other}")),
        }
    }
}

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "keygen", "link", "meta",
    "param", "source", "track", "wbr",
];

pub(crate) const SCRIPT_CLOSE_TAG: &[u8] = b"</script";
pub(crate) const STYLE_CLOSE_TAG: &[u8] = b"</style";
