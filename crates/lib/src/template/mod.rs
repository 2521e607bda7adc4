//! Outbound message templates: the named-value context and the renderer that fills it in.

mod context;
mod render;

pub use context::{build_context, TemplateContext};
pub use render::{Renderer, TemplateError, TemplateStore};

pub(crate) use render::BUNDLED_TEMPLATES;
