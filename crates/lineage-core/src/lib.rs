//! Core engine for lineage DAG ancestry queries.
//!
//! This crate provides:
//! - Line-oriented graph description parsing
//! - DAG construction with cycle detection
//! - Leaf enumeration
//! - Memoized ancestor-closure computation
//! - Bisector scoring over ancestor-set sizes

pub mod error;
pub mod graph;

pub use error::{Error, Result};
pub use graph::{GraphEngine, NodeId, ParsedGraph, parse_graph};
