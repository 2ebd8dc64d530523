//! Rendering of query results for the command line.

use std::collections::{HashMap, HashSet};
use std::io::{self, Write};

use chrono::{DateTime, Utc};

use crate::models::{
    ColumnReference, FlatWorkItemsQueryResult, HierarchicalWorkItemsQueryResult,
    WorkItemsQueryResult,
};

/// Output format for query results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// The service's JSON response, pretty printed.
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Writes `result` to `writer` in the requested format.
pub fn write_result<W: Write>(
    writer: &mut W,
    result: &WorkItemsQueryResult,
    format: OutputFormat,
) -> io::Result<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *writer, result)?;
            writeln!(writer)
        }
        OutputFormat::Text => match result {
            WorkItemsQueryResult::Flat(flat) => write_flat(writer, flat),
            WorkItemsQueryResult::Hierarchical(tree) => write_tree(writer, tree),
        },
    }
}

fn write_header<W: Write>(
    writer: &mut W,
    as_of: DateTime<Utc>,
    columns: &[ColumnReference],
) -> io::Result<()> {
    writeln!(writer, "As of: {}", as_of.to_rfc3339())?;
    let columns: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
    if !columns.is_empty() {
        writeln!(writer, "Columns: {}", columns.join(", "))?;
    }
    Ok(())
}

fn write_flat<W: Write>(writer: &mut W, result: &FlatWorkItemsQueryResult) -> io::Result<()> {
    write_header(writer, result.as_of, &result.columns)?;
    for item in &result.work_items {
        writeln!(writer, "  {}", item.id)?;
    }
    writeln!(writer, "{} work item(s)", result.work_items.len())
}

/// Prints the link tree depth first, children indented under their parent.
fn write_tree<W: Write>(
    writer: &mut W,
    result: &HierarchicalWorkItemsQueryResult,
) -> io::Result<()> {
    write_header(writer, result.as_of, &result.columns)?;

    let mut roots = Vec::new();
    let mut children: HashMap<i32, Vec<i32>> = HashMap::new();
    for link in &result.work_item_relations {
        let Some(target) = &link.target else {
            continue;
        };
        match &link.source {
            Some(source) => children.entry(source.id).or_default().push(target.id),
            None => roots.push(target.id),
        }
    }

    let mut visited = HashSet::new();
    let mut stack: Vec<(i32, usize)> = roots.iter().rev().map(|&id| (id, 0)).collect();
    while let Some((id, depth)) = stack.pop() {
        // Link results can repeat an item under several parents; print it once.
        if !visited.insert(id) {
            continue;
        }
        writeln!(writer, "{}{}", "  ".repeat(depth + 1), id)?;
        if let Some(kids) = children.get(&id) {
            stack.extend(kids.iter().rev().map(|&child| (child, depth + 1)));
        }
    }

    writeln!(writer, "{} work item(s)", visited.len())
}
