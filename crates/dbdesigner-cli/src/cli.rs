//! Command-line interface for the dbdesigner utility
//!
//! Builds grids of linked tables and exports them as JSON, or prints port
//! anchors and summary counts for inspection.

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::{debug, info};

use dbdesigner::core::geometry;
use dbdesigner::core::logging::init_logging;
use dbdesigner::export;
use dbdesigner::grid::{GridBuilder, GridReport, DEFAULT_SPACING};
use dbdesigner::{Diagram, DiagramOptions, LinkOptions, PathStyle};

/// dbdesigner - build entity-relationship diagram grids
#[derive(Parser)]
#[command(name = "dbdesigner")]
#[command(about = "Build entity-relationship diagram grids and export them as JSON")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Set log level (trace|debug|info|warn|error); overrides DBDESIGNER_LOG_LEVEL
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Set log format (compact|pretty|json); overrides DBDESIGNER_LOG_FORMAT
    #[arg(long, value_enum)]
    pub log_format: Option<LogFormat>,
}

/// Log level options
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Log format options
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Compact => "compact",
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
        }
    }
}

/// Link path styles selectable from the command line
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq, Default)]
pub enum PathChoice {
    /// Cubic curves leaving each port horizontally
    #[default]
    Smooth,
    /// Straight segments
    Straight,
}

impl From<PathChoice> for PathStyle {
    fn from(value: PathChoice) -> Self {
        match value {
            PathChoice::Smooth => PathStyle::Smooth,
            PathChoice::Straight => PathStyle::Straight,
        }
    }
}

/// Grid dimensions shared by every subcommand
#[derive(clap::Args, Debug, Clone, Copy)]
pub struct GridArgs {
    /// Number of rows
    #[arg(short, long, default_value_t = 2)]
    pub rows: usize,

    /// Number of columns
    #[arg(short, long, default_value_t = 2)]
    pub columns: usize,

    /// Distance between neighbouring tables
    #[arg(long, default_value_t = DEFAULT_SPACING)]
    pub spacing: f64,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build a grid of linked tables and export it as JSON
    Grid {
        #[command(flatten)]
        grid: GridArgs,

        /// Fail if any cell could not be wired
        #[arg(long)]
        strict: bool,

        /// Path style for the exported links
        #[arg(long, value_enum, default_value_t = PathChoice::Smooth)]
        path_style: PathChoice,

        /// Output file for the JSON document (use - for stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Emit single-line JSON
        #[arg(long)]
        compact: bool,
    },

    /// Print the ports of one table in a grid with their anchors
    Ports {
        #[command(flatten)]
        grid: GridArgs,

        /// Table name, e.g. Table_0_1
        #[arg(short, long, default_value = "Table_0_0")]
        table: String,
    },

    /// Print table, link and port counts for a grid
    Stats {
        #[command(flatten)]
        grid: GridArgs,

        /// Show in JSON format
        #[arg(long)]
        json: bool,
    },
}

/// Main CLI application
pub struct DesignerApp {
    options: DiagramOptions,
}

impl Default for DesignerApp {
    fn default() -> Self {
        Self::new()
    }
}

impl DesignerApp {
    /// Create a new application instance with default diagram options
    pub fn new() -> Self {
        Self::with_options(DiagramOptions::default())
    }

    pub fn with_options(options: DiagramOptions) -> Self {
        Self { options }
    }

    /// Run the application with the given CLI arguments
    pub fn run(&mut self, cli: Cli) -> Result<()> {
        // Flags win; otherwise init_logging falls back to the environment
        let level = cli.log_level.map(|l| l.as_str());
        let format = cli.log_format.map(|f| f.as_str());
        if let Err(e) = init_logging(level, format) {
            eprintln!("Warning: Failed to initialize logging: {}", e);
        }

        if cli.verbose {
            eprintln!("dbdesigner v{}", env!("CARGO_PKG_VERSION"));
        }

        match cli.command {
            Commands::Grid {
                grid,
                strict,
                path_style,
                output,
                compact,
            } => self.grid_command(grid, strict, path_style, output, compact, cli.verbose),
            Commands::Ports { grid, table } => self.ports_command(grid, &table, cli.verbose),
            Commands::Stats { grid, json } => self.stats_command(grid, json, cli.verbose),
        }
    }

    fn build(&self, args: GridArgs, strict: bool) -> Result<(Diagram, GridReport)> {
        let mut diagram = Diagram::with_options(self.options);
        let report = GridBuilder::new(args.rows, args.columns)
            .spacing(args.spacing)
            .strict(strict)
            .build(&mut diagram)?;
        debug!(tables = report.table_count(), links = report.links.len(), "Grid ready");
        Ok((diagram, report))
    }

    /// Handle the grid command
    fn grid_command(
        &mut self,
        args: GridArgs,
        strict: bool,
        path_style: PathChoice,
        output: Option<PathBuf>,
        compact: bool,
        verbose: bool,
    ) -> Result<()> {
        self.options.links = LinkOptions {
            path_style: path_style.into(),
        };
        let (diagram, report) = self.build(args, strict)?;

        if verbose {
            eprintln!(
                "Built {} table(s) and {} link(s)",
                report.table_count(),
                report.links.len()
            );
            for cell in &report.skipped {
                eprintln!("Skipped cell {}", cell);
            }
        }

        let json = export::to_json(&diagram, !compact)?;
        self.write_output(output, &json)
    }

    /// Handle the ports command
    fn ports_command(&self, args: GridArgs, name: &str, verbose: bool) -> Result<()> {
        let (diagram, _) = self.build(args, false)?;
        let table = diagram.table_by_name(name).ok_or_else(|| {
            anyhow!(
                "No table named {:?} in a {}x{} grid",
                name,
                args.rows,
                args.columns
            )
        })?;

        if verbose {
            eprintln!("{} at {}", table.name, table.position);
        }

        for port in table.ports() {
            let column = table
                .column(port.column())
                .map(|c| c.name.as_str())
                .unwrap_or("?");
            let anchor = geometry::port_anchor(table, port.column(), port.side())
                .map(|p| p.to_string())
                .unwrap_or_else(|| "-".to_string());
            let links = diagram.links_at(port.id()).count();
            println!(
                "{:<12} {:<7} {:<16} {} link(s)",
                column,
                port.side().to_string(),
                anchor,
                links
            );
        }
        Ok(())
    }

    /// Handle the stats command
    fn stats_command(&self, args: GridArgs, json: bool, verbose: bool) -> Result<()> {
        let (diagram, report) = self.build(args, false)?;
        let ports: usize = diagram.tables().map(|t| t.ports().len()).sum();

        if verbose {
            eprintln!("Collecting statistics");
        }
        info!(tables = report.table_count(), ports, "Stats collected");

        if json {
            let stats = serde_json::json!({
                "rows": args.rows,
                "columns": args.columns,
                "tables": report.table_count(),
                "links": report.links.len(),
                "ports": ports,
                "skipped": report.skipped,
            });
            println!("{}", serde_json::to_string_pretty(&stats)?);
        } else {
            println!("Grid: {} x {}", args.rows, args.columns);
            println!("  tables   {}", report.table_count());
            println!("  links    {}", report.links.len());
            println!("  ports    {}", ports);
            println!("  skipped  {}", report.skipped.len());
        }
        Ok(())
    }

    /// Write output to file or stdout
    fn write_output(&self, output: Option<PathBuf>, content: &str) -> Result<()> {
        match output {
            Some(path) if path.to_str() != Some("-") => {
                fs::write(&path, content)?;
                debug!(path = %path.display(), bytes = content.len(), "Wrote document");
            }
            _ => {
                let mut stdout = io::stdout().lock();
                writeln!(stdout, "{}", content)?;
            }
        }
        Ok(())
    }
}
