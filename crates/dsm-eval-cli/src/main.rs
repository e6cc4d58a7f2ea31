//! dsm-eval CLI - Surface model relative accuracy tool

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use dsm_eval::Denominator;

mod commands;

/// Relative accuracy of a test surface model against a reference.
#[derive(Parser)]
#[command(name = "dsm-eval")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute vertical and horizontal RMSE for a reference/test pair
    Run {
        /// Reference elevation grid (CSV or whitespace separated)
        #[arg(short, long)]
        reference: PathBuf,

        /// Test elevation grid
        #[arg(short, long)]
        test: PathBuf,

        /// Reference validity mask (default: finite, non-nodata cells)
        #[arg(long)]
        reference_mask: Option<PathBuf>,

        /// Test validity mask (default: finite, non-nodata cells)
        #[arg(long)]
        test_mask: Option<PathBuf>,

        /// Elevation value marking cells without data
        #[arg(long)]
        nodata: Option<f64>,

        /// Vertical RMSE denominator (grid, valid)
        #[arg(long, default_value = "grid")]
        denominator: Denominator,

        /// Treat cells beyond the grid border as invalid when extracting boundaries
        #[arg(long)]
        outside_invalid: bool,

        /// Fail instead of warning when the masks do not overlap
        #[arg(long)]
        strict_overlap: bool,

        /// Fail instead of warning when a footprint has no boundary
        #[arg(long)]
        require_boundary: bool,

        /// Clamp for the clipped height error diagnostic
        #[arg(long, default_value_t = dsm_eval::eval::session::DEFAULT_CLIP_LIMIT)]
        clip_limit: f64,

        /// Directory for diagnostic grids and point sets (CSV)
        #[arg(long)]
        diagnostics: Option<PathBuf>,

        /// Output report file (JSON)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Name recorded in the report (default: test file stem)
        #[arg(long)]
        name: Option<String>,
    },

    /// Extract the boundary of a validity mask
    Edges {
        /// Input mask
        #[arg(short, long)]
        mask: PathBuf,

        /// Output edge mask (CSV); printed when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Treat cells beyond the grid border as invalid
        #[arg(long)]
        outside_invalid: bool,
    },

    /// Combine JSON reports into a CSV summary
    Summary {
        /// Report files written by `run --output`
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output CSV file
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();

    match cli.command {
        Commands::Run {
            reference,
            test,
            reference_mask,
            test_mask,
            nodata,
            denominator,
            outside_invalid,
            strict_overlap,
            require_boundary,
            clip_limit,
            diagnostics,
            output,
            name,
        } => commands::run::run(
            commands::run::RunArgs {
                reference,
                test,
                reference_mask,
                test_mask,
                nodata,
                denominator,
                outside_invalid,
                strict_overlap,
                require_boundary,
                clip_limit,
                diagnostics,
                output,
                name,
            },
            cli.verbose,
        ),
        Commands::Edges {
            mask,
            output,
            outside_invalid,
        } => commands::edges::run(mask, output, outside_invalid, cli.verbose),
        Commands::Summary { inputs, output } => commands::summary::run(inputs, output, cli.verbose),
    }
}
