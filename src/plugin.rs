//! One `{{chef>...}}` render invocation
//!
//! ```text
//! Metadata pass: note refresh hint ─────────────────────────────▶ done
//! XHTML pass:    search ─┬─ error ──▶ "chef: <error>"            ▶ Failed
//!                        ├─ no rows ▶ "No results"               ▶ NoResults
//!                        └─ rows ───▶ <ul> project each row </ul> ▶ Rendered
//! ```

use std::sync::Arc;

use crate::client::NodeSearch;
use crate::projector::{project, OutputEvent};
use crate::sink::{PageMeta, RenderSink, DEFAULT_REFRESH};
use crate::syntax::ChefCall;
use crate::template::{Template, TemplateCache};

/// Shown instead of a list when a search matches nothing
pub const NO_RESULTS: &str = "No results";

/// Prefix for invocation-fatal messages
const ERROR_PREFIX: &str = "chef: ";

/// Which pass the host is running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Produce page output
    Xhtml,
    /// Only collect page metadata; no query is made
    Metadata,
    /// Any other renderer; nothing is produced
    Other,
}

/// How one invocation ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    /// Rows were rendered; `diagnostics` counts per-field errors shown
    Rendered { rows: usize, diagnostics: usize },
    /// The search matched nothing; a notice was shown
    NoResults,
    /// The search failed; one error message was shown
    Failed,
    /// Metadata pass finished
    Metadata,
    /// Unsupported render mode
    Skipped,
}

impl RenderOutcome {
    /// Whether the host should treat the tag as handled
    pub fn is_success(&self) -> bool {
        !matches!(self, RenderOutcome::Failed | RenderOutcome::Skipped)
    }
}

/// Renders chef tags with a shared search client
///
/// Compiled formats are cached on the plugin; [`crate::page::render_page`]
/// drops them once a page is done, so a long-lived plugin does not keep
/// every format it has seen.
pub struct ChefPlugin {
    search: Arc<dyn NodeSearch>,
    templates: TemplateCache,
}

impl ChefPlugin {
    pub fn new(search: Arc<dyn NodeSearch>) -> Self {
        Self {
            search,
            templates: TemplateCache::new(),
        }
    }

    /// Compiled template for a call, falling back to one link per row
    pub fn template_for(&self, call: &ChefCall) -> Arc<Template> {
        match call.format.as_deref() {
            Some(format) => self.templates.get(format),
            None => Arc::new(Template::default_links()),
        }
    }

    /// Number of formats currently compiled and cached
    pub fn cached_templates(&self) -> usize {
        self.templates.len()
    }

    /// Drop every cached template
    pub fn clear_templates(&self) {
        self.templates.clear();
    }

    /// Render one tag into `sink`, or record its metadata into `meta`
    pub async fn render(
        &self,
        mode: RenderMode,
        call: &ChefCall,
        sink: &mut dyn RenderSink,
        meta: &mut PageMeta,
    ) -> RenderOutcome {
        match mode {
            RenderMode::Metadata => {
                meta.note_refresh(call.refresh.unwrap_or(DEFAULT_REFRESH));
                RenderOutcome::Metadata
            }
            RenderMode::Other => RenderOutcome::Skipped,
            RenderMode::Xhtml => self.render_xhtml(call, sink).await,
        }
    }

    async fn render_xhtml(&self, call: &ChefCall, sink: &mut dyn RenderSink) -> RenderOutcome {
        tracing::debug!(client = self.search.name(), query = %call.query, "searching nodes");

        let result = match self.search.search(&call.query).await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(query = %call.query, error = %e, "chef search failed");
                sink.error(&format!("{}{}", ERROR_PREFIX, e));
                return RenderOutcome::Failed;
            }
        };

        if result.is_empty() {
            sink.error(NO_RESULTS);
            return RenderOutcome::NoResults;
        }

        let template = self.template_for(call);
        let mut diagnostics = 0;

        sink.list_open();
        for row in &result.rows {
            let mut messages = Vec::new();
            let events = project(row, &template, |e| messages.push(e.to_string()));

            sink.listitem_open();
            sink.block_open();
            for event in &events {
                match event {
                    OutputEvent::Text(text) => sink.text(text),
                    OutputEvent::Link { href, title } => sink.link(href, title),
                }
            }
            sink.block_close();
            for message in &messages {
                sink.error(message);
            }
            sink.listitem_close();

            diagnostics += messages.len();
        }
        sink.list_close();

        RenderOutcome::Rendered {
            rows: result.rows.len(),
            diagnostics,
        }
    }
}
