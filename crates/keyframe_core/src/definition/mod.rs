//! # Animation Definitions
//!
//! Read-only timeline data owned by the asset layer.
//!
//! The advance pass never reads a definition. Everything it needs is
//! flattened into the per-animator record at registration time; the apply
//! pass consults the definition when it has to turn an index into a visual,
//! a duration or a callback.

mod callbacks;
mod timeline;

pub use callbacks::{CallbackTable, EventCallback};
pub use timeline::{
    AnimationDefinition, AnimationEvent, AnimationStyle, DefinitionBuilder, Frame, VisualId,
};
