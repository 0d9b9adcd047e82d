use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "depthmap")]
#[command(about = "Layered static analysis for TypeScript/JavaScript", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract module structure (L1) from one file
    Structure {
        /// Source file to analyze
        file: PathBuf,

        /// Emit the signature-only view
        #[arg(long)]
        compact: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value = "json")]
        format: OutputFormat,
    },

    /// Build the project call graph (L2)
    Callgraph {
        /// Project root to analyze
        path: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "json")]
        format: OutputFormat,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Who calls this function, transitively (L2 impact query)
    Impact {
        /// Project root to analyze
        path: PathBuf,

        /// Qualified function name (module.Class.method or module.name)
        #[arg(long)]
        function: String,

        /// Maximum traversal depth (defaults to the configured impact depth)
        #[arg(long)]
        depth: Option<usize>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "terminal")]
        format: OutputFormat,
    },

    /// Build the control-flow graph (L3) of one function
    Cfg {
        /// Source file containing the function
        file: PathBuf,

        /// Function name (or Class.method)
        #[arg(long)]
        function: String,

        /// Output format
        #[arg(short, long, value_enum, default_value = "json")]
        format: OutputFormat,
    },

    /// Build the data-flow graph (L4) of one function
    Dfg {
        /// Source file containing the function
        file: PathBuf,

        /// Function name (or Class.method)
        #[arg(long)]
        function: String,

        /// Output format
        #[arg(short, long, value_enum, default_value = "json")]
        format: OutputFormat,
    },

    /// Build the program-dependence graph (L5) of one function
    Pdg {
        /// Source file containing the function
        file: PathBuf,

        /// Function name (or Class.method)
        #[arg(long)]
        function: String,

        /// Output format
        #[arg(short, long, value_enum, default_value = "json")]
        format: OutputFormat,
    },

    /// Slice a function from a (line, variable?) criterion
    Slice {
        /// Source file containing the function
        file: PathBuf,

        /// Function name (or Class.method)
        #[arg(long)]
        function: String,

        /// Criterion line (1-based)
        #[arg(long)]
        line: usize,

        /// Criterion variable
        #[arg(long)]
        variable: Option<String>,

        /// Slice forward instead of backward
        #[arg(long)]
        forward: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value = "terminal")]
        format: OutputFormat,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Terminal,
}
