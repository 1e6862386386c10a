//! Graph engine for DAG ancestry queries.
//!
//! This module provides:
//! - Parsing of line-oriented graph descriptions
//! - Directed graph construction with cycle detection
//! - Leaf, ancestor-closure, and bisector queries

mod engine;
mod parser;

pub use engine::{GraphEngine, NodeId};
pub use parser::{ParsedGraph, parse_graph};
