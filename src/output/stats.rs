//! Statistics reporting.

use console::style;

use crate::download::{AccountStats, RunStats};

/// Print what was queued for a single account.
pub fn print_account_stats(account: &AccountStats) {
    if !account.available && account.total_tasks() == 0 {
        println!(
            "  {}: {}",
            account.account,
            style("does not exist or has no media").yellow()
        );
        return;
    }

    println!(
        "  {}: {} videos, {} photos queued",
        account.account, account.video_tasks, account.photo_tasks
    );
}

/// Print statistics for the whole run.
pub fn print_run_stats(stats: &RunStats) {
    println!();
    println!("{}", style("═".repeat(50)).dim());
    println!("{}", style("Sites:").bold());
    for account in &stats.accounts {
        print_account_stats(account);
    }
    println!("{}", style("Run Statistics:").bold());
    println!("  Pictures:   {}", stats.pic_count);
    println!("  Videos:     {}", stats.vid_count);
    println!("  Skipped:    {} (already complete)", stats.skipped_count);
    if stats.incomplete_count > 0 {
        println!(
            "  Incomplete: {} (will resume next run)",
            style(stats.incomplete_count).yellow()
        );
    }
    if stats.failed_count > 0 {
        println!("  Failed:     {}", style(stats.failed_count).red());
    }
    if stats.unresolved_count > 0 {
        println!("  Unresolved: {}", style(stats.unresolved_count).red());
    }
    println!("  Total:      {} downloaded", stats.total_downloaded());
    println!("{}", style("═".repeat(50)).dim());
}
