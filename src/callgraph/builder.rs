//! Project call-graph construction.
//!
//! Enumerates source files, extracts structure and call sites per file (in
//! parallel), then merges results in sorted file order under a single
//! writer so two builds over identical inputs serialise identically.

use crate::callgraph::graph::{CallEdge, CallSite, CallType, FunctionLocation, ProjectCallGraph};
use crate::callgraph::scan::{scan_calls, FileCallScan, ScannedCall};
use crate::config::config_for;
use crate::core::errors::{FileError, Result};
use crate::core::{module_name, Language};
use crate::io::walker::collect_with_ignores;
use crate::parsers;
use crate::structure::{extract_from_parsed, ModuleInfo};
use rayon::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, warn};

/// A finished build: the graph over every parsable file plus the per-file
/// failures that were skipped.
#[derive(Debug)]
pub struct CallGraphBuild {
    pub graph: ProjectCallGraph,
    pub errors: Vec<FileError>,
}

/// Per-file intermediate produced by the parallel phase.
struct FileAnalysis {
    file: PathBuf,
    module_name: String,
    functions: Vec<RegisteredFunction>,
    scan: FileCallScan,
}

struct RegisteredFunction {
    /// `name` or `Class.method`.
    short_name: String,
    /// Bare method name when this is a method.
    method_name: Option<String>,
    line: usize,
    is_exported: bool,
}

/// Build the project call graph for every supported source file under the
/// root. Per-file failures are collected, not fatal.
pub fn build_call_graph(project_root: &Path) -> Result<CallGraphBuild> {
    build_call_graph_cancellable(project_root, &AtomicBool::new(false))
}

/// As [`build_call_graph`], observing a cancellation flag between files.
/// On cancellation the graph covers the files merged so far.
pub fn build_call_graph_cancellable(
    project_root: &Path,
    cancel: &AtomicBool,
) -> Result<CallGraphBuild> {
    let config = config_for(project_root);
    let files = collect_with_ignores(project_root, config.ignore.clone())?;
    debug!(files = files.len(), root = %project_root.display(), "building call graph");

    let analyses: Vec<std::result::Result<FileAnalysis, FileError>> = files
        .par_iter()
        .map(|file| analyze_file(project_root, file))
        .collect();

    let mut graph = ProjectCallGraph::new(project_root.to_path_buf());
    let mut errors = Vec::new();
    let mut succeeded = Vec::new();
    for analysis in analyses {
        match analysis {
            Ok(analysis) => succeeded.push(analysis),
            Err(error) => {
                warn!(file = %error.file.display(), message = %error.message, "skipping file");
                errors.push(error);
            }
        }
    }

    // Registration pass: locations plus name/file indices.
    let mut name_index: HashMap<String, Vec<FunctionLocation>> = HashMap::new();
    let mut file_index: HashMap<PathBuf, HashMap<String, FunctionLocation>> = HashMap::new();

    for analysis in &succeeded {
        if cancel.load(Ordering::Relaxed) {
            break;
        }
        graph.files.push(analysis.file.clone());
        let per_file = file_index.entry(analysis.file.clone()).or_default();

        for function in &analysis.functions {
            let location = FunctionLocation {
                file: analysis.file.clone(),
                name: function.short_name.clone(),
                qualified_name: format!("{}.{}", analysis.module_name, function.short_name),
                line: function.line,
                is_exported: function.is_exported,
            };
            if !graph.add_function(location.clone()) {
                warn!(
                    qualified_name = %location.qualified_name,
                    "duplicate qualified name; keeping first"
                );
                continue;
            }

            let mut keys = vec![function.short_name.clone()];
            if let Some(method) = &function.method_name {
                keys.push(method.clone());
            }
            for key in keys {
                name_index.entry(key.clone()).or_default().push(location.clone());
                per_file.entry(key).or_insert_with(|| location.clone());
            }
        }
    }

    // Resolution pass: edges in sorted-file, source order.
    for analysis in &succeeded {
        if cancel.load(Ordering::Relaxed) {
            break;
        }
        let Some(local) = file_index.get(&analysis.file) else {
            continue;
        };
        for (caller_key, calls) in analysis.scan.iter() {
            let Some(caller) = local.get(caller_key) else {
                // Nested or anonymous callers are not registered functions.
                continue;
            };
            for call in calls {
                graph.add_edge(resolve_call(caller, call, local, &name_index));
            }
        }
    }

    debug_assert!(graph.verify().is_ok(), "call graph invariant violation");
    Ok(CallGraphBuild { graph, errors })
}

fn analyze_file(
    project_root: &Path,
    file: &Path,
) -> std::result::Result<FileAnalysis, FileError> {
    let language = Language::from_path(file);
    let source = std::fs::read_to_string(file).map_err(|e| FileError {
        file: file.to_path_buf(),
        message: e.to_string(),
    })?;
    let parsed = parsers::parse_source(&source, file, language).map_err(|e| FileError {
        file: file.to_path_buf(),
        message: e.to_string(),
    })?;

    let module = extract_from_parsed(&parsed);
    let scan = scan_calls(&parsed);

    Ok(FileAnalysis {
        file: file.to_path_buf(),
        module_name: module_name(project_root, file),
        functions: registered_functions(&module),
        scan,
    })
}

/// Every top-level function and every method, with its lookup keys.
fn registered_functions(module: &ModuleInfo) -> Vec<RegisteredFunction> {
    let mut functions = Vec::new();
    for function in &module.functions {
        functions.push(RegisteredFunction {
            short_name: function.name.clone(),
            method_name: None,
            line: function.line,
            is_exported: function.is_exported,
        });
    }
    for class in &module.classes {
        for method in &class.methods {
            functions.push(RegisteredFunction {
                short_name: format!("{}.{}", class.name, method.name),
                method_name: Some(method.name.clone()),
                line: method.line,
                is_exported: class.is_exported,
            });
        }
    }
    functions
}

/// Resolve one callee: the local file first, then a unique global match,
/// otherwise the edge is dynamic.
fn resolve_call(
    caller: &FunctionLocation,
    call: &ScannedCall,
    local: &HashMap<String, FunctionLocation>,
    name_index: &HashMap<String, Vec<FunctionLocation>>,
) -> CallEdge {
    let resolved = local.get(&call.callee).cloned().or_else(|| {
        match name_index.get(&call.callee).map(Vec::as_slice) {
            Some([only]) => Some(only.clone()),
            _ => None,
        }
    });

    let is_dynamic = resolved.is_none();
    let call_type = if is_dynamic {
        CallType::Dynamic
    } else if call.is_method_call {
        CallType::Method
    } else {
        CallType::Direct
    };

    CallEdge {
        caller: caller.clone(),
        callee: call.callee.clone(),
        callee_location: resolved,
        call_site: CallSite {
            file: caller.file.clone(),
            caller: caller.qualified_name.clone(),
            line: call.line,
            column: call.column,
            is_method_call: call.is_method_call,
            receiver: call.receiver.clone(),
            argument_count: call.argument_count,
        },
        is_dynamic,
        call_type,
    }
}
