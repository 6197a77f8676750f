//! Render sinks: where projected rows end up
//!
//! - [`RenderSink`] - the capabilities a host renderer must offer
//! - [`XhtmlSink`] - writes wiki-style XHTML into a string
//! - [`RecordingSink`] - keeps calls as [`SinkEvent`]s (tests, debugging)
//! - [`PageMeta`] - page metadata gathered during the metadata pass

use html_escape::{encode_double_quoted_attribute, encode_text};
use url::Url;

/// Default cache refresh age in seconds for a tag without `refresh=`
pub const DEFAULT_REFRESH: u64 = 14_400;

/// Schemes a rendered link may point at
pub const LINK_SCHEMES: &[&str] = &["http", "https", "mailto", "ftp"];

/// Whether `href` may be written into an `href` attribute
///
/// Absolute URLs must use one of [`LINK_SCHEMES`]; relative references
/// (no scheme) are allowed. Anything else, `javascript:` and `data:`
/// included, is refused.
pub fn is_safe_href(href: &str) -> bool {
    match Url::parse(href) {
        Ok(url) => LINK_SCHEMES.contains(&url.scheme()),
        Err(url::ParseError::RelativeUrlWithoutBase) => true,
        Err(_) => false,
    }
}

/// Ordered-event consumer supplied by the host renderer
pub trait RenderSink {
    fn list_open(&mut self);
    fn list_close(&mut self);
    fn listitem_open(&mut self);
    fn listitem_close(&mut self);
    /// Paragraph-like block around one row's content
    fn block_open(&mut self);
    fn block_close(&mut self);
    /// Literal text (the sink escapes it)
    fn text(&mut self, text: &str);
    fn link(&mut self, href: &str, title: &str);
    /// Emphasized, user-visible error or notice
    fn error(&mut self, message: &str);
}

/// XHTML output in the shape of a wiki unordered list
#[derive(Debug, Default)]
pub struct XhtmlSink {
    doc: String,
}

impl XhtmlSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.doc
    }

    pub fn into_string(self) -> String {
        self.doc
    }
}

impl RenderSink for XhtmlSink {
    fn list_open(&mut self) {
        self.doc.push_str("<ul>\n");
    }

    fn list_close(&mut self) {
        self.doc.push_str("</ul>\n");
    }

    fn listitem_open(&mut self) {
        self.doc.push_str("<li class=\"level1\">");
    }

    fn listitem_close(&mut self) {
        self.doc.push_str("</li>\n");
    }

    fn block_open(&mut self) {
        self.doc.push_str("<div class=\"li\">");
    }

    fn block_close(&mut self) {
        self.doc.push_str("</div>");
    }

    fn text(&mut self, text: &str) {
        self.doc.push_str(&encode_text(text));
    }

    /// Refused targets (see [`is_safe_href`]) keep their title as plain text
    fn link(&mut self, href: &str, title: &str) {
        if !is_safe_href(href) {
            tracing::warn!(href = %href, "refusing link with unsafe target");
            self.doc.push_str(&encode_text(title));
            return;
        }
        self.doc.push_str("<a href=\"");
        self.doc.push_str(&encode_double_quoted_attribute(href));
        self.doc.push_str("\" class=\"urlextern\" rel=\"nofollow\">");
        self.doc.push_str(&encode_text(title));
        self.doc.push_str("</a>");
    }

    fn error(&mut self, message: &str) {
        self.doc.push_str("<p><em>");
        self.doc.push_str(&encode_text(message));
        self.doc.push_str("</em></p>\n");
    }
}

/// One recorded sink call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkEvent {
    ListOpen,
    ListClose,
    ListItemOpen,
    ListItemClose,
    BlockOpen,
    BlockClose,
    Text(String),
    Link { href: String, title: String },
    Error(String),
}

/// Sink that records every call in order
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub events: Vec<SinkEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages sent through [`RenderSink::error`]
    pub fn errors(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                SinkEvent::Error(m) => Some(m.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, event: &SinkEvent) -> usize {
        self.events.iter().filter(|e| *e == event).count()
    }
}

impl RenderSink for RecordingSink {
    fn list_open(&mut self) {
        self.events.push(SinkEvent::ListOpen);
    }

    fn list_close(&mut self) {
        self.events.push(SinkEvent::ListClose);
    }

    fn listitem_open(&mut self) {
        self.events.push(SinkEvent::ListItemOpen);
    }

    fn listitem_close(&mut self) {
        self.events.push(SinkEvent::ListItemClose);
    }

    fn block_open(&mut self) {
        self.events.push(SinkEvent::BlockOpen);
    }

    fn block_close(&mut self) {
        self.events.push(SinkEvent::BlockClose);
    }

    fn text(&mut self, text: &str) {
        self.events.push(SinkEvent::Text(text.to_string()));
    }

    fn link(&mut self, href: &str, title: &str) {
        self.events.push(SinkEvent::Link {
            href: href.to_string(),
            title: title.to_string(),
        });
    }

    fn error(&mut self, message: &str) {
        self.events.push(SinkEvent::Error(message.to_string()));
    }
}

/// Metadata collected for a page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageMeta {
    /// Smallest refresh age asked for by any tag, in seconds
    refresh: Option<u64>,
}

impl PageMeta {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a tag's refresh hint; the page keeps the minimum
    pub fn note_refresh(&mut self, seconds: u64) {
        self.refresh = Some(self.refresh.map_or(seconds, |current| current.min(seconds)));
    }

    /// Refresh age for the page, `None` when no tag contributed one
    pub fn refresh(&self) -> Option<u64> {
        self.refresh
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xhtml_list_shape() {
        let mut sink = XhtmlSink::new();
        sink.list_open();
        sink.listitem_open();
        sink.block_open();
        sink.text("web01 ");
        sink.link("https://chef/nodes/web01", "details");
        sink.block_close();
        sink.listitem_close();
        sink.list_close();

        assert_eq!(
            sink.as_str(),
            "<ul>\n<li class=\"level1\"><div class=\"li\">web01 \
             <a href=\"https://chef/nodes/web01\" class=\"urlextern\" rel=\"nofollow\">details</a>\
             </div></li>\n</ul>\n"
        );
    }

    #[test]
    fn xhtml_escapes_text_and_attributes() {
        let mut sink = XhtmlSink::new();
        sink.text("<b>&");
        sink.link("https://x/?a=1&b=\"2\"", "<t>");
        let out = sink.into_string();
        assert!(out.starts_with("&lt;b&gt;&amp;"));
        assert!(out.contains("href=\"https://x/?a=1&amp;b=&quot;2&quot;\""));
        assert!(out.contains(">&lt;t&gt;</a>"));
    }

    #[test]
    fn xhtml_script_link_becomes_plain_title() {
        let mut sink = XhtmlSink::new();
        sink.link("javascript:alert(document.cookie)", "web01");
        sink.link(" JavaScript:alert(1)", "web02");
        sink.link("data:text/html,<script>alert(1)</script>", "web03");
        assert_eq!(sink.as_str(), "web01web02web03");
    }

    #[test]
    fn href_scheme_allow_list() {
        assert!(is_safe_href("https://chef/nodes/web01"));
        assert!(is_safe_href("http://chef"));
        assert!(is_safe_href("mailto:ops@example.com"));
        assert!(is_safe_href("ftp://mirror/pub"));
        assert!(is_safe_href("/nodes/web01"));
        assert!(is_safe_href("nodes/web01"));
        assert!(is_safe_href(""));

        assert!(!is_safe_href("javascript:alert(1)"));
        assert!(!is_safe_href("java\tscript:alert(1)"));
        assert!(!is_safe_href("vbscript:msgbox(1)"));
        assert!(!is_safe_href("file:///etc/passwd"));
    }

    #[test]
    fn xhtml_relative_link_is_kept() {
        let mut sink = XhtmlSink::new();
        sink.link("/nodes/web01", "web01");
        assert!(sink.as_str().starts_with("<a href=\"/nodes/web01\""));
    }

    #[test]
    fn xhtml_error_is_emphasized_paragraph() {
        let mut sink = XhtmlSink::new();
        sink.error("No results");
        assert_eq!(sink.as_str(), "<p><em>No results</em></p>\n");
    }

    #[test]
    fn recording_sink_counts() {
        let mut sink = RecordingSink::new();
        sink.error("a");
        sink.text("b");
        sink.error("c");
        assert_eq!(sink.errors(), vec!["a", "c"]);
        assert_eq!(sink.count(&SinkEvent::Text("b".to_string())), 1);
    }

    #[test]
    fn refresh_keeps_minimum() {
        let mut meta = PageMeta::new();
        assert_eq!(meta.refresh(), None);

        meta.note_refresh(DEFAULT_REFRESH);
        meta.note_refresh(600);
        meta.note_refresh(3600);
        assert_eq!(meta.refresh(), Some(600));
    }
}
