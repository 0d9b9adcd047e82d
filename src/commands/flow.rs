use crate::cli::OutputFormat;
use crate::commands::{emit_json, is_json};
use crate::core::errors::AnalysisError;
use crate::core::Language;
use crate::flow::pdg::slice::SliceResult;
use crate::flow::{backward_slice, build_cfg, build_dfg, build_pdg, forward_slice};
use crate::io::read_source;
use crate::parsers::{parse_source, ParsedFile};
use anyhow::{bail, Result};
use colored::Colorize;
use std::path::Path;

fn parse(file: &Path) -> Result<ParsedFile> {
    let language = Language::from_path(file);
    if !language.is_supported() {
        bail!(AnalysisError::UnsupportedFile {
            path: file.to_path_buf()
        });
    }
    let source = read_source(file)?;
    Ok(parse_source(&source, file, language)?)
}

pub fn handle_cfg(file: &Path, function: &str, format: OutputFormat) -> Result<()> {
    let parsed = parse(file)?;
    let Some(cfg) = build_cfg(&parsed, function)? else {
        bail!(AnalysisError::function_not_found(function, file));
    };

    if is_json(format) {
        return emit_json(&cfg, None);
    }
    println!(
        "{} {} \u{2014} {} blocks, {} edges, complexity {}, depth {}, {} decisions",
        "cfg".bold(),
        cfg.function_name.cyan(),
        cfg.blocks.len(),
        cfg.edges.len(),
        cfg.cyclomatic_complexity,
        cfg.max_nesting_depth,
        cfg.decision_points
    );
    for block in &cfg.blocks {
        println!(
            "  [{}] {:?} L{}-{} {}",
            block.id,
            block.block_type,
            block.start_line,
            block.end_line,
            block.statements.join("; ").dimmed()
        );
    }
    for edge in &cfg.edges {
        let marker = if edge.is_back_edge { " (back)" } else { "" };
        println!("  {} \u{2192} {} {:?}{}", edge.from, edge.to, edge.edge_type, marker);
    }
    Ok(())
}

pub fn handle_dfg(file: &Path, function: &str, format: OutputFormat) -> Result<()> {
    let parsed = parse(file)?;
    let Some(dfg) = build_dfg(&parsed, function)? else {
        bail!(AnalysisError::function_not_found(function, file));
    };

    if is_json(format) {
        return emit_json(&dfg, None);
    }
    println!(
        "{} {} \u{2014} {} refs, {} edges, variables: {}",
        "dfg".bold(),
        dfg.function_name.cyan(),
        dfg.refs.len(),
        dfg.edges.len(),
        dfg.variables.join(", ")
    );
    for edge in &dfg.edges {
        let marker = if edge.has_intervening_def {
            " (shadowed)"
        } else {
            ""
        };
        println!(
            "  {} L{} \u{2192} L{}{}",
            edge.variable.green(),
            edge.def.line,
            edge.use_ref.line,
            marker.dimmed()
        );
    }
    Ok(())
}

pub fn handle_pdg(file: &Path, function: &str, format: OutputFormat) -> Result<()> {
    let parsed = parse(file)?;
    let Some(pdg) = build_pdg(&parsed, function)? else {
        bail!(AnalysisError::function_not_found(function, file));
    };

    if is_json(format) {
        return emit_json(&pdg, None);
    }
    println!(
        "{} {} \u{2014} {} nodes, {} control + {} data edges",
        "pdg".bold(),
        pdg.function_name.cyan(),
        pdg.nodes.len(),
        pdg.control_edge_count,
        pdg.data_edge_count
    );
    for edge in &pdg.edges {
        println!(
            "  {} \u{2192} {} {:?} {}",
            edge.from,
            edge.to,
            edge.edge_type,
            edge.label.dimmed()
        );
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub fn handle_slice(
    file: &Path,
    function: &str,
    line: usize,
    variable: Option<&str>,
    forward: bool,
    format: OutputFormat,
) -> Result<()> {
    let parsed = parse(file)?;
    let Some(pdg) = build_pdg(&parsed, function)? else {
        bail!(AnalysisError::function_not_found(function, file));
    };

    let result = if forward {
        forward_slice(&pdg, line, variable)
    } else {
        backward_slice(&pdg, line, variable)
    };

    if result.out_of_range {
        eprintln!(
            "{} line {line} is outside function '{function}'",
            "warning:".yellow().bold()
        );
    }

    if is_json(format) {
        return emit_json(&result, None);
    }
    print_slice(&parsed, &result, forward);
    Ok(())
}

fn print_slice(parsed: &ParsedFile, result: &SliceResult, forward: bool) {
    let direction = if forward { "forward" } else { "backward" };
    let criterion = match &result.variable {
        Some(variable) => format!("line {}, variable '{variable}'", result.criterion_line),
        None => format!("line {}", result.criterion_line),
    };
    println!(
        "{} slice from {criterion}: {} lines",
        direction.bold(),
        result.lines.len()
    );
    let source_lines: Vec<&str> = parsed.source.lines().collect();
    for &line in &result.lines {
        let text = source_lines.get(line - 1).map(|l| l.trim()).unwrap_or("");
        let marker = if line == result.criterion_line {
            "\u{25B8}".cyan().to_string()
        } else {
            " ".to_string()
        };
        println!("  {marker} {line:>4} \u{2502} {text}");
    }
}
