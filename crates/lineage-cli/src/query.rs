//! Subcommand implementations: load a graph description, run one query,
//! render the result.

use std::collections::BTreeMap;
use std::io::Read;

use anyhow::Context;
use lineage_core::GraphEngine;

use crate::Format;

/// Read the graph description from a file path, or stdin when the path
/// is `-`.
fn read_input(path: &str) -> anyhow::Result<String> {
    if path == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(path).with_context(|| format!("failed to read {path}"))
    }
}

fn load(path: &str) -> anyhow::Result<GraphEngine> {
    let text = read_input(path)?;
    let engine = GraphEngine::from_text(&text)?;
    tracing::debug!(nodes = engine.len(), edges = engine.edge_count(), "engine ready");
    Ok(engine)
}

pub fn leaves(path: &str, format: Format) -> anyhow::Result<()> {
    let engine = load(path)?;
    let mut leaves = engine.find_leaves();
    leaves.sort();

    match format {
        Format::Text => {
            for leaf in &leaves {
                println!("{leaf}");
            }
        }
        Format::Json => println!("{}", serde_json::to_string_pretty(&leaves)?),
    }
    Ok(())
}

pub fn ancestors(path: &str, node: Option<&str>, format: Format) -> anyhow::Result<()> {
    let engine = load(path)?;

    // Sorted map of sorted lists so output is stable across runs.
    let mut table: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (name, set) in engine.find_ancestors() {
        let mut ancestors: Vec<String> = set.into_iter().collect();
        ancestors.sort();
        table.insert(name, ancestors);
    }

    if let Some(name) = node {
        let ancestors = table
            .remove(name)
            .with_context(|| format!("unknown node {name:?}"))?;
        match format {
            Format::Text => println!("{name}: {}", ancestors.join(", ")),
            Format::Json => println!("{}", serde_json::to_string_pretty(&ancestors)?),
        }
        return Ok(());
    }

    match format {
        Format::Text => {
            for (name, ancestors) in &table {
                println!("{name}: {}", ancestors.join(", "));
            }
        }
        Format::Json => println!("{}", serde_json::to_string_pretty(&table)?),
    }
    Ok(())
}

pub fn bisect(path: &str, format: Format) -> anyhow::Result<()> {
    let engine = load(path)?;
    let ancestors = engine.find_ancestors();
    let mut bisectors = engine.find_bisectors();
    bisectors.sort();

    let n = engine.len();
    let score = bisectors
        .first()
        .map(|name| {
            let a = ancestors[name].len();
            a.min(n - a)
        })
        .unwrap_or(0);

    match format {
        Format::Text => {
            for name in &bisectors {
                println!("{name}");
            }
        }
        Format::Json => {
            let payload = serde_json::json!({
                "score": score,
                "bisectors": bisectors,
            });
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
    }
    Ok(())
}

pub fn check(path: &str, format: Format) -> anyhow::Result<()> {
    let engine = load(path)?;

    match format {
        Format::Text => println!(
            "ok: {} nodes, {} edges, {} leaves",
            engine.len(),
            engine.edge_count(),
            engine.find_leaves().len()
        ),
        Format::Json => {
            let payload = serde_json::json!({
                "nodes": engine.len(),
                "edges": engine.edge_count(),
                "leaves": engine.find_leaves().len(),
            });
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
    }
    Ok(())
}
