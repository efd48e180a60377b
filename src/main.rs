//! Tumblr Ripper - CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use tumblr_ripper::{
    cli::Args,
    config::{load_sites_file, validate_config, Config, ProxyConfig},
    download::Scheduler,
    error::{exit_codes, Error, Result},
    output::{print_banner, print_config_summary, print_error, print_info, print_run_stats, print_usage},
};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(e) => {
            print_error(&format!("{}", e));
            if matches!(e, Error::MissingConfig(_)) {
                print_usage();
            }
            if e.is_config_error() {
                ExitCode::from(exit_codes::CONFIG_ERROR as u8)
            } else {
                ExitCode::from(exit_codes::UNEXPECTED_ERROR as u8)
            }
        }
    }
}

async fn run() -> Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Set up logging
    let log_level = if args.debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    fmt().with_env_filter(filter).with_target(false).init();

    print_banner();

    // Load configuration
    let mut config = Config::load_or_default(&args.config)?;

    // The sites file replaces the configured accounts unless sites are given on the command line
    if args.site_list().is_none() && args.sites_file.exists() {
        let sites = load_sites_file(&args.sites_file)?;
        if !sites.is_empty() {
            print_info(&format!("Reading sites from {}", args.sites_file.display()));
            config.sites.accounts = sites;
        }
    }

    // Merge CLI arguments into config
    args.merge_into_config(&mut config);

    // Proxy problems are fatal before anything is scheduled
    config.proxies = ProxyConfig::load(&args.proxies)?;

    validate_config(&config)?;

    print_config_summary(
        &config.sites.accounts,
        &config.download_directory().display().to_string(),
        config.options.workers,
        config.proxies.is_some(),
    );

    let stats = Scheduler::new(config)?.run().await?;

    print_run_stats(&stats);

    Ok(())
}
