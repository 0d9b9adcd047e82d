use crate::callgraph::{build_call_graph, callers_of};
use crate::cli::OutputFormat;
use crate::commands::{emit_json, is_json};
use anyhow::{bail, Result};
use colored::Colorize;
use std::path::Path;

pub fn handle_callgraph(path: &Path, format: OutputFormat, output: Option<&Path>) -> Result<()> {
    let build = build_call_graph(path)?;

    for error in &build.errors {
        eprintln!(
            "{} {}: {}",
            "warning:".yellow().bold(),
            error.file.display(),
            error.message
        );
    }

    if is_json(format) {
        return emit_json(&build.graph, output);
    }

    let graph = &build.graph;
    println!(
        "{} {} files, {} functions, {} edges",
        "call graph:".bold(),
        graph.files.len(),
        graph.function_count(),
        graph.edge_count()
    );
    for (qualified_name, _) in &graph.functions {
        let edges = graph.callees_of(qualified_name);
        if edges.is_empty() {
            continue;
        }
        println!("{}", qualified_name.cyan());
        for edge in edges {
            let target = match &edge.callee_location {
                Some(location) => location.qualified_name.clone(),
                None => format!("{} {}", edge.callee, "(dynamic)".dimmed()),
            };
            println!("  \u{2192} {target}");
        }
    }
    Ok(())
}

pub fn handle_impact(
    path: &Path,
    function: &str,
    depth: Option<usize>,
    format: OutputFormat,
) -> Result<()> {
    let depth = depth.unwrap_or_else(|| crate::config::config_for(path).impact_depth);
    let build = build_call_graph(path)?;
    if build.graph.function(function).is_none() {
        bail!("function '{function}' not found in the project graph");
    }
    let sites = callers_of(&build.graph, function, depth);

    if is_json(format) {
        return emit_json(&sites, None);
    }

    if sites.is_empty() {
        println!("no callers of {} within depth {depth}", function.cyan());
        return Ok(());
    }
    println!(
        "{} {} ({} call sites, depth \u{2264} {depth})",
        "callers of".bold(),
        function.cyan(),
        sites.len()
    );
    for site in &sites {
        println!(
            "  [{}] {} at {}:{}:{}",
            site.depth,
            site.caller.green(),
            site.file.display(),
            site.line,
            site.column
        );
    }
    Ok(())
}
