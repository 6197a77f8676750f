//! chefwiki - render Chef Server node searches into wiki pages

pub mod client;
pub mod config;
pub mod error;
pub mod page;
pub mod path;
pub mod plugin;
pub mod projector;
pub mod sink;
pub mod syntax;
pub mod template;

pub use client::{ChefClient, MockSearch, NodeSearch, ResultSet};
pub use config::ApiConfig;
pub use error::{ChefError, FixSuggestion, PathError};
pub use page::{render_page, RenderedPage};
pub use plugin::{ChefPlugin, RenderMode, RenderOutcome};
pub use projector::{project, OutputEvent};
pub use sink::{PageMeta, RecordingSink, RenderSink, SinkEvent, XhtmlSink};
pub use syntax::ChefCall;
pub use template::{compile, Segment, Template, TemplateCache};
