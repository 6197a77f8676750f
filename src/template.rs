//! Format compiler for the `%field%` / `%link|title%` mini-language
//!
//! A format string is split on `%`. Fragments at even positions are literal
//! text, fragments at odd positions are placeholder bodies:
//!
//! - `%automatic.ipaddress%` → [`Segment::Field`]
//! - `%link|title%` → [`Segment::Link`] (split on the first `|` only)
//!
//! There is no balance check: with an odd number of `%` the last fragment is
//! classified by its position like any other.

use dashmap::DashMap;
use std::fmt;
use std::sync::Arc;

/// Delimiter around placeholders
const DELIMITER: char = '%';

/// Separator between link target and link title inside a placeholder
const LINK_SEPARATOR: char = '|';

/// One compiled fragment of a format string
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Text copied verbatim to the output
    Literal(String),
    /// Dotted attribute path: `%name%`, `%automatic.ipaddress%`
    Field(String),
    /// Hyperlink built from two dotted paths: `%link|title%`
    Link { link: String, title: String },
}

/// Compiled format, immutable once built
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    pub fn new(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    /// Format used when a tag has no `format=`: one link per row built
    /// from fields literally named `link` and `title`.
    pub fn default_links() -> Self {
        Self::new(vec![
            Segment::Literal(String::new()),
            Segment::Link {
                link: "link".to_string(),
                title: "title".to_string(),
            },
            Segment::Literal(String::new()),
        ])
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Number of placeholders (fields and links)
    pub fn placeholder_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| !matches!(s, Segment::Literal(_)))
            .count()
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Literal(text) => write!(f, "literal {:?}", text),
            Segment::Field(path) => write!(f, "field   {}", path),
            Segment::Link { link, title } => write!(f, "link    {} | {}", link, title),
        }
    }
}

/// Compile a format string into a [`Template`]
pub fn compile(format: &str) -> Template {
    let segments = format
        .split(DELIMITER)
        .enumerate()
        .map(|(i, fragment)| {
            if i % 2 == 0 {
                Segment::Literal(fragment.to_string())
            } else {
                compile_placeholder(fragment)
            }
        })
        .collect();

    Template::new(segments)
}

fn compile_placeholder(body: &str) -> Segment {
    match body.split_once(LINK_SEPARATOR) {
        Some((link, title)) => Segment::Link {
            link: link.to_string(),
            title: title.to_string(),
        },
        None => Segment::Field(body.to_string()),
    }
}

/// Memoizes compiled formats by their source text.
///
/// A page usually repeats the same format across several tags. Entries are
/// never evicted one by one; the owner calls [`TemplateCache::clear`] when a
/// unit of work (a page) is finished.
pub struct TemplateCache {
    cache: DashMap<String, Arc<Template>>,
}

impl Default for TemplateCache {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateCache {
    pub fn new() -> Self {
        Self {
            cache: DashMap::new(),
        }
    }

    /// Compile `format`, reusing an earlier compilation of the same text
    pub fn get(&self, format: &str) -> Arc<Template> {
        if let Some(cached) = self.cache.get(format) {
            return Arc::clone(&cached);
        }

        let template = Arc::new(compile(format));
        tracing::debug!(
            format = format,
            segments = template.len(),
            "compiled format"
        );
        self.cache.insert(format.to_string(), Arc::clone(&template));
        template
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn clear(&self) {
        self.cache.clear();
    }
}
