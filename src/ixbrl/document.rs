use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html};
use unicode_normalization::UnicodeNormalization;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// A parsed Inline XBRL document tree.
///
/// Parsing is lenient HTML parsing, so element and attribute names arrive
/// lower-cased and prefixed names such as `ix:nonFraction` keep their prefix
/// inside the local name. Lookups here therefore compare the part after the
/// last `:` without regard to case.
pub struct IxbrlDocument {
    html: Html,
}

impl IxbrlDocument {
    pub fn parse(content: &str) -> Self {
        Self {
            html: Html::parse_document(content),
        }
    }

    /// Every element in document order.
    pub fn elements(&self) -> impl Iterator<Item = ElementRef<'_>> {
        self.html.tree.root().descendants().filter_map(ElementRef::wrap)
    }

    /// Elements whose unprefixed name is `name`, in document order.
    pub fn elements_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = ElementRef<'a>> {
        self.elements().filter(move |e| has_local_name(e, name))
    }

    /// Whether the document carries any `ix:` element at all.
    pub fn has_inline_markup(&self) -> bool {
        self.elements().any(|e| prefix(&e).eq_ignore_ascii_case("ix"))
    }
}

impl std::fmt::Debug for IxbrlDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IxbrlDocument")
            .field("elements", &self.elements().count())
            .finish()
    }
}

/// Part of a qualified name after the last `:`.
pub fn strip_prefix(qname: &str) -> &str {
    qname.rsplit(':').next().unwrap_or(qname)
}

fn prefix<'a>(element: &ElementRef<'a>) -> &'a str {
    let name = element.value().name();
    match name.rfind(':') {
        Some(idx) => &name[..idx],
        None => "",
    }
}

pub fn has_local_name(element: &ElementRef<'_>, name: &str) -> bool {
    strip_prefix(element.value().name()).eq_ignore_ascii_case(name)
}

/// Attribute lookup that ignores case, since HTML parsing lower-cases names.
pub fn attribute<'a>(element: &ElementRef<'a>, name: &str) -> Option<&'a str> {
    element
        .value()
        .attrs()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value)
}

/// Descendant elements with the given unprefixed name.
pub fn descendants_named<'a>(
    element: &ElementRef<'a>,
    name: &'a str,
) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    element
        .descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .filter(move |e| has_local_name(e, name))
}

/// Text content, NFKC normalized with runs of whitespace collapsed.
pub fn element_text(element: &ElementRef<'_>) -> String {
    let raw: String = element.text().collect();
    let normalized: String = raw.as_str().nfkc().collect();
    WHITESPACE.replace_all(normalized.trim(), " ").to_string()
}
