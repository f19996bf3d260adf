//! Binary entry point for the testdoc CLI.
//!
//! ## Usage
//!
//! ```bash
//! # Document the tests under ./ and merge results from go-junit-report
//! testdoc report --source . --junit junit.xml -o TESTS.md
//!
//! # Print the discovered test tree
//! testdoc list --source ./internal
//! ```

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use testdoc::cli::{format_tree, load_config, run_list, run_report, ReportFormat, ReportRequest};
use testdoc_core::error::{OutputErrorCode, TestDocError};
use testdoc_core::output::{emit_response, ErrorResponse, ListResponse};

// ============================================================================
// CLI Structure
// ============================================================================

/// Documentation reports for Go test suites.
///
/// Discovers test functions and `t.Run` sub-tests without running them,
/// attaches their doc comments and merges JUnit results.
#[derive(Parser, Debug)]
#[command(name = "testdoc", version, about = "Documentation reports for Go test suites")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

/// Global arguments shared by all subcommands.
#[derive(Parser, Debug)]
struct GlobalArgs {
    /// Log level for tracing output (overridden by RUST_LOG).
    #[arg(long, global = true, value_enum, default_value = "warn")]
    log_level: LogLevel,

    /// Configuration file (default: testdoc.toml in the source root).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

/// Log level for tracing output.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// Output format for the report command.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
enum ReportFormatArg {
    /// Markdown tables (default).
    #[default]
    Markdown,
    /// JSON document.
    Json,
}

/// Output format for the list command.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
enum ListFormat {
    /// Indented tree (default).
    #[default]
    Text,
    /// JSON document.
    Json,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Discover tests, merge JUnit results and write a report.
    Report {
        /// Root of the Go source tree.
        #[arg(long, default_value = ".")]
        source: PathBuf,

        /// JUnit XML results file.
        #[arg(long)]
        junit: PathBuf,

        /// Report output path.
        #[arg(short, long, default_value = "TESTS.md")]
        output: PathBuf,

        /// Report format.
        #[arg(long, value_enum, default_value_t = ReportFormatArg::Markdown)]
        format: ReportFormatArg,

        /// Maximum failure-message characters (0 hides failures).
        #[arg(long)]
        fail_snippet: Option<usize>,
    },

    /// Print the discovered test tree.
    List {
        /// Root of the Go source tree.
        #[arg(long, default_value = ".")]
        source: PathBuf,

        /// Output format.
        #[arg(long, value_enum, default_value_t = ListFormat::Text)]
        format: ListFormat,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.global.log_level);

    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let error_code = OutputErrorCode::from(&err);
            let response = ErrorResponse::from_error(&err);

            let _ = emit_response(&response, &mut io::stderr());
            let _ = io::stderr().flush();

            ExitCode::from(error_code.code())
        }
    }
}

/// Initialize tracing subscriber.
fn init_tracing(level: LogLevel) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_tracing_level().to_string()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Execute the CLI command.
fn execute(cli: Cli) -> Result<(), TestDocError> {
    match cli.command {
        Command::Report {
            source,
            junit,
            output,
            format,
            fail_snippet,
        } => {
            let config = load_config(&source, cli.global.config.as_deref())?;
            let request = ReportRequest {
                source,
                junit,
                output,
                format: match format {
                    ReportFormatArg::Markdown => ReportFormat::Markdown,
                    ReportFormatArg::Json => ReportFormat::Json,
                },
                fail_snippet,
            };
            let summary = run_report(&request, &config)?;

            let mut stdout = io::stdout();
            writeln!(
                stdout,
                "wrote {} ({} suites, {} tests, {} results)",
                summary.output.display(),
                summary.suites,
                summary.units,
                summary.results
            )
            .map_err(|e| TestDocError::internal(e.to_string()))?;
            Ok(())
        }
        Command::List { source, format } => {
            let config = load_config(&source, cli.global.config.as_deref())?;
            let suites = run_list(&source, &config)?;

            let mut stdout = io::stdout();
            match format {
                ListFormat::Text => stdout.write_all(format_tree(&suites).as_bytes()),
                ListFormat::Json => emit_response(&ListResponse::new(suites), &mut stdout),
            }
            .map_err(|e| TestDocError::internal(e.to_string()))?;
            let _ = stdout.flush();
            Ok(())
        }
    }
}
