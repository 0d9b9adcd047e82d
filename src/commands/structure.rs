use crate::cli::OutputFormat;
use crate::commands::{emit_json, is_json};
use crate::core::Language;
use crate::io::read_source;
use crate::output::compact_view;
use crate::structure::extract_module;
use anyhow::{bail, Result};
use colored::Colorize;
use std::path::Path;

pub fn handle_structure(file: &Path, compact: bool, format: OutputFormat) -> Result<()> {
    let language = Language::from_path(file);
    if !language.is_supported() {
        bail!("unsupported file: {}", file.display());
    }
    let source = read_source(file)?;
    let module = extract_module(&source, file, language)?;

    if is_json(format) {
        if compact {
            emit_json(&compact_view(&module), None)
        } else {
            emit_json(&module, None)
        }
    } else {
        print_terminal(&module);
        Ok(())
    }
}

fn print_terminal(module: &crate::structure::ModuleInfo) {
    println!(
        "{} {}",
        "module".bold(),
        module.file_path.display().to_string().cyan()
    );
    if let Some(docstring) = &module.docstring {
        println!("  {}", docstring.lines().next().unwrap_or("").dimmed());
    }
    if !module.imports.is_empty() {
        println!("{}", "imports:".bold());
        for import in &module.imports {
            let marker = if import.is_dynamic { " (dynamic)" } else { "" };
            println!("  {}{}", import.module, marker.dimmed());
        }
    }
    if !module.functions.is_empty() {
        println!("{}", "functions:".bold());
        for function in &module.functions {
            let exported = if function.is_exported { "export " } else { "" };
            println!("  {}{}", exported.green(), function.signature());
        }
    }
    for class in &module.classes {
        println!("{} {}", "class".bold(), class.name.yellow());
        for method in &class.methods {
            println!("  {}", method.signature());
        }
    }
    for interface in &module.interfaces {
        println!("{} {}", "interface".bold(), interface.name.yellow());
    }
    if !module.type_aliases.is_empty() {
        println!("{}", "types:".bold());
        for alias in &module.type_aliases {
            println!("  {}", alias.name);
        }
    }
    if !module.variables.is_empty() {
        println!("{}", "variables:".bold());
        for variable in &module.variables {
            println!("  {}", variable.name);
        }
    }
    if !module.exports.is_empty() {
        println!("{}", "exports:".bold());
        for export in &module.exports {
            let default = if export.is_default { " (default)" } else { "" };
            println!("  {}{}", export.name, default.dimmed());
        }
    }
}
