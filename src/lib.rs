// Exercise engine: tokenizer, comparator, scoring and the per-unit state
// machines, plus the session layer that sequences units. Nothing here renders
// or persists on its own; the binary in main.rs is one such caller.

pub mod config;
pub mod engine;
pub mod exercise;
pub mod session;
pub mod store;
