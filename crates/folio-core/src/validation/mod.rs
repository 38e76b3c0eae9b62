//! Validation modules

pub mod tags;

pub use tags::{join_tags, parse_tags};
