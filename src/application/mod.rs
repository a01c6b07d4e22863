//! Application layer: composition engine, page model and render passes.

pub mod catalog;
pub mod compose;
pub mod engine;
pub mod error;
pub mod page;
