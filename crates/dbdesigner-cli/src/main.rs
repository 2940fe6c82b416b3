//! dbdesigner CLI - build entity-relationship diagram grids

mod cli;

use clap::Parser;

fn main() {
    // Logging is initialized inside run() once the flags are known
    let cli_args = cli::Cli::parse();

    let mut app = cli::DesignerApp::new();

    if let Err(e) = app.run(cli_args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
