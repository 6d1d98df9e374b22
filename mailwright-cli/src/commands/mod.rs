//! CLI command implementations

pub mod markdown;
pub mod render;
pub mod send;

pub use markdown::MarkdownCommand;
pub use render::RenderCommand;
pub use send::SendCommand;
