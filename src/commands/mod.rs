//! Command handlers: thin shells over the library.

mod callgraph;
mod flow;
mod structure;

pub use callgraph::{handle_callgraph, handle_impact};
pub use flow::{handle_cfg, handle_dfg, handle_pdg, handle_slice};
pub use structure::handle_structure;

use crate::cli::OutputFormat;
use anyhow::Result;
use serde::Serialize;
use std::path::Path;

/// Write a record as pretty JSON to stdout or a file.
pub(crate) fn emit_json<T: Serialize>(value: &T, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => std::fs::write(path, json)?,
        None => println!("{json}"),
    }
    Ok(())
}

pub(crate) fn is_json(format: OutputFormat) -> bool {
    format == OutputFormat::Json
}
