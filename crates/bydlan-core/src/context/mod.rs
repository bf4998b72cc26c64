//! Reconstruction of the conversation that precedes an incoming message

mod builder;
mod pacing;

pub use builder::ContextBuilder;
pub use pacing::TraversalPacing;
