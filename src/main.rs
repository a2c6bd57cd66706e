//! Binary entry point: parse flags, set up file logging, and hand an empty
//! catalog to the terminal UI.
use clap::Parser;
use library_desk::{initialize_tracing, run_app, App, Catalog, Cli};
use tracing::info;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let log_path = initialize_tracing(&cli)?;
    info!(
        report = %cli.report_path.display(),
        log = %log_path.display(),
        "starting library desk"
    );

    let mut app = App::new(Catalog::new(), cli.report_path);
    run_app(&mut app)
}
