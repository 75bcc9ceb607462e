//! Core primitives shared across the njast crates: source positions, spans,
//! and the qualified-name conventions used to identify Java declarations.

pub mod name;
mod text;

pub use text::{Position, Span};
