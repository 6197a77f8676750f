//! Whole-page processing
//!
//! Stands in for the wiki host: runs the metadata pass over every tag, then
//! the XHTML pass, splicing each tag's output into the page text. Text
//! outside tags is copied through untouched.

use crate::plugin::{ChefPlugin, RenderMode, RenderOutcome};
use crate::sink::{PageMeta, XhtmlSink};
use crate::syntax::find_tags;

/// Result of processing one page
#[derive(Debug)]
pub struct RenderedPage {
    /// Page text with every tag replaced by its XHTML
    pub body: String,
    pub meta: PageMeta,
    /// One outcome per tag, in document order
    pub outcomes: Vec<RenderOutcome>,
}

impl RenderedPage {
    pub fn failed_tags(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.is_success()).count()
    }
}

/// Render every `{{chef>...}}` tag in `text`
///
/// Formats compiled for this page are dropped from the plugin's cache on
/// return.
pub async fn render_page(plugin: &ChefPlugin, text: &str) -> RenderedPage {
    let tags = find_tags(text);
    let mut meta = PageMeta::new();

    for tag in &tags {
        let mut unused = XhtmlSink::new();
        plugin
            .render(RenderMode::Metadata, &tag.call, &mut unused, &mut meta)
            .await;
    }

    let mut body = String::with_capacity(text.len());
    let mut outcomes = Vec::with_capacity(tags.len());
    let mut cursor = 0;

    for tag in &tags {
        body.push_str(&text[cursor..tag.range.start]);

        let mut sink = XhtmlSink::new();
        let outcome = plugin
            .render(RenderMode::Xhtml, &tag.call, &mut sink, &mut meta)
            .await;
        body.push_str(sink.as_str());
        outcomes.push(outcome);

        cursor = tag.range.end;
    }
    body.push_str(&text[cursor..]);
    plugin.clear_templates();

    tracing::debug!(
        tags = tags.len(),
        refresh = ?meta.refresh(),
        "page rendered"
    );

    RenderedPage {
        body,
        meta,
        outcomes,
    }
}
