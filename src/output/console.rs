//! Console output utilities.

use console::style;

/// Print an info message.
pub fn print_info(message: &str) {
    println!("{} {}", style("INFO").cyan().bold(), message);
}

/// Print a warning message.
pub fn print_warning(message: &str) {
    println!("{} {}", style("WARN").yellow().bold(), message);
}

/// Print an error message.
pub fn print_error(message: &str) {
    eprintln!("{} {}", style("ERROR").red().bold(), message);
}

/// Print the application banner.
pub fn print_banner() {
    let banner = r#"
╔═══════════════════════════════════════════════════════╗
║     Tumblr Ripper                                     ║
║     Bulk photo and video downloader                   ║
╚═══════════════════════════════════════════════════════╝
"#;
    println!("{}", style(banner).cyan());
}

/// Print how to supply the account list.
pub fn print_usage() {
    println!(
        "{}",
        style("No sites to download from.").yellow().bold()
    );
    println!(
        "1. Create a file sites.txt in the current directory.\n\
         2. In sites.txt, list Tumblr sites separated by comma/space/tab/CR.\n   \
            Multiple lines are accepted.\n\
         3. Save the file and retry.\n\n\
         Sample file content:\n  site1,site2\n\n\
         Or pass the sites on the command line:\n  tumblr-ripper site1,site2\n"
    );
}

/// Print configuration summary.
pub fn print_config_summary(accounts: &[String], download_dir: &str, workers: usize, proxied: bool) {
    println!();
    println!("{}", style("Configuration:").bold());
    println!("  Sites: {}", accounts.join(", "));
    println!("  Directory: {}", download_dir);
    println!("  Workers: {}", workers);
    if proxied {
        println!("  Proxy: enabled");
    }
    println!();
}
