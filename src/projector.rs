//! Projects one search row through a compiled [`Template`]
//!
//! Each segment produces at most one [`OutputEvent`]. Resolution errors are
//! handed to the `report` callback and the segment is dropped; the rest of
//! the template still renders.

use serde_json::Value;

use crate::error::PathError;
use crate::path::{self, Resolved};
use crate::template::{Segment, Template};

/// What a row turns into, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputEvent {
    Text(String),
    Link { href: String, title: String },
}

/// Render `item` through `template`, reporting per-field errors to `report`
pub fn project<F>(item: &Value, template: &Template, mut report: F) -> Vec<OutputEvent>
where
    F: FnMut(&PathError),
{
    let mut events = Vec::with_capacity(template.len());

    for segment in template.segments() {
        match segment {
            Segment::Literal(text) => events.push(OutputEvent::Text(text.clone())),
            Segment::Field(field) => match path::resolve(item, field) {
                Ok(resolved) => events.push(OutputEvent::Text(resolved.into_text())),
                Err(err) => report(&err),
            },
            Segment::Link { link, title } => match resolve_link(item, link, title) {
                Ok((href, title)) => events.push(OutputEvent::Link { href, title }),
                Err(err) => report(&err),
            },
        }
    }

    events
}

/// Both halves must resolve; a link is never rendered half-built
fn resolve_link(item: &Value, link: &str, title: &str) -> Result<(String, String), PathError> {
    let href = path::resolve(item, link).map(Resolved::into_text)?;
    let title = path::resolve(item, title).map(Resolved::into_text)?;
    Ok((href, title))
}
