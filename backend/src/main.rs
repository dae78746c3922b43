// lakevend entrypoint
//!
//! Parses the command line, loads configuration and runs one vend-then-read
//! pass against the configured backend.

use clap::Parser;
use lakevend::args::Cli;
use lakevend::driver::{self, Backend};
use lakevend::logging;
use lakevend_configs::BackendKind;
use lakevend_sandbox::SandboxLake;
use log::info;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match cli.load_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("FATAL: Failed to load configuration: {:#}", e);
            std::process::exit(1);
        },
    };

    logging::init_logging(&config.logging)?;

    info!(
        "lakevend v{} backend={:?} table={}.{} grantee={}",
        env!("CARGO_PKG_VERSION"),
        config.backend.kind,
        config.table.database,
        config.table.name,
        config.grant.grantee
    );

    let backend = match config.backend.kind {
        BackendKind::Aws => Backend::aws(&config).await,
        BackendKind::Sandbox => Backend::sandbox(SandboxLake::with_sample_data()?.lake),
    };

    let report = match driver::run(&config, &backend, &cli.representation.representations()).await
    {
        Ok(report) => report,
        Err(e) => {
            log::error!("Run failed: {:#}", e);
            eprintln!("ERROR: {:#}", e);
            std::process::exit(2);
        },
    };

    println!(
        "Vended credentials for {} (key {}, expires {})",
        report.access.table,
        report.access.credentials.access_key_id(),
        report.access.credentials.expiration()
    );
    println!("Authorized columns: {}", report.access.authorized_columns.join(", "));
    for result in &report.results {
        println!(
            "\n{} ({} rows, {} partition(s))",
            result.representation(),
            result.num_rows(),
            result.num_partitions()
        );
        println!("{}", result.render()?);
    }
    if let Some(first) = report.results.first() {
        println!(
            "\nRow count check: {} rows in all {} representation(s)",
            first.num_rows(),
            report.results.len()
        );
    }

    Ok(())
}
