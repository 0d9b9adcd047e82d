//! depthmap CLI entry point: parse arguments, initialise tracing, dispatch
//! to the command handlers.

use anyhow::Result;
use clap::Parser;
use depthmap::cli::{Cli, Commands};
use depthmap::commands::{
    handle_callgraph, handle_cfg, handle_dfg, handle_impact, handle_pdg, handle_slice,
    handle_structure,
};
use depthmap::observability::init_tracing;

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Structure {
            file,
            compact,
            format,
        } => handle_structure(&file, compact, format),
        Commands::Callgraph {
            path,
            format,
            output,
        } => handle_callgraph(&path, format, output.as_deref()),
        Commands::Impact {
            path,
            function,
            depth,
            format,
        } => handle_impact(&path, &function, depth, format),
        Commands::Cfg {
            file,
            function,
            format,
        } => handle_cfg(&file, &function, format),
        Commands::Dfg {
            file,
            function,
            format,
        } => handle_dfg(&file, &function, format),
        Commands::Pdg {
            file,
            function,
            format,
        } => handle_pdg(&file, &function, format),
        Commands::Slice {
            file,
            function,
            line,
            variable,
            forward,
            format,
        } => handle_slice(&file, &function, line, variable.as_deref(), forward, format),
    }
}
