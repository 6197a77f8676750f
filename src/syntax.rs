//! `{{chef>...}}` tag recognition
//!
//! ```text
//! {{chef>QUERY}}
//! {{chef>QUERY|refresh=SECONDS}}
//! {{chef>QUERY|refresh=SECONDS|format=TEMPLATE}}
//! ```
//!
//! `format=` swallows the rest of the tag, `|` included, so link
//! placeholders (`%link|title%`) need no escaping. Any other `|`-field is
//! part of the query.

use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;

/// Lexer pattern for the tag (non-greedy, single line)
pub static TAG_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{\{chef>.+?\}\}").unwrap());

const TAG_PREFIX: &str = "{{chef>";
const TAG_SUFFIX: &str = "}}";
const REFRESH_OPTION: &str = "refresh=";
const FORMAT_OPTION: &str = "format=";

/// Data handed from the lexer to the renderer for one tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChefCall {
    /// Chef search query, e.g. `role:web AND chef_environment:prod`
    pub query: String,
    /// Row format; `None` means one `%link|title%` link per row
    pub format: Option<String>,
    /// Cache refresh hint in seconds
    pub refresh: Option<u64>,
}

impl ChefCall {
    /// Parse the text between `{{chef>` and `}}`
    pub fn parse(body: &str) -> Self {
        let (mut query, mut rest) = match body.split_once('|') {
            Some((query, rest)) => (query.to_string(), Some(rest)),
            None => (body.to_string(), None),
        };
        let mut format = None;
        let mut refresh = None;

        while let Some(remaining) = rest {
            if let Some(template) = remaining.strip_prefix(FORMAT_OPTION) {
                format = Some(template.to_string());
                break;
            }

            let (field, next) = match remaining.split_once('|') {
                Some((field, next)) => (field, Some(next)),
                None => (remaining, None),
            };

            if let Some(value) = field.strip_prefix(REFRESH_OPTION) {
                match value.trim().parse::<u64>() {
                    Ok(seconds) => refresh = Some(seconds),
                    Err(_) => tracing::warn!(value = value, "ignoring invalid refresh option"),
                }
            } else {
                query.push('|');
                query.push_str(field);
            }

            rest = next;
        }

        Self {
            query: query.trim().to_string(),
            format,
            refresh,
        }
    }
}

/// Turn one lexer match (`{{chef>...}}`) into a call
pub fn handle(matched: &str) -> Option<ChefCall> {
    let body = matched
        .strip_prefix(TAG_PREFIX)?
        .strip_suffix(TAG_SUFFIX)?;
    Some(ChefCall::parse(body))
}

/// A tag found in page text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagMatch {
    /// Byte range of the whole tag in the page
    pub range: Range<usize>,
    pub call: ChefCall,
}

/// All tags in `text`, in document order
pub fn find_tags(text: &str) -> Vec<TagMatch> {
    TAG_PATTERN
        .find_iter(text)
        .filter_map(|m| {
            handle(m.as_str()).map(|call| TagMatch {
                range: m.range(),
                call,
            })
        })
        .collect()
}
