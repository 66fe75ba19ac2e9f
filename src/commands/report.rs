use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use crate::clipboard::Clipboard;
use crate::export::to_text;
use crate::model::{CategoryBuckets, Provider, ScanProgress};
use crate::session::{Notice, NoticeLevel};
use crate::utils::plural;

pub(crate) fn progress_bar() -> ProgressBar {
    let bar = ProgressBar::with_draw_target(Some(100), ProgressDrawTarget::stderr());
    let style = ProgressStyle::with_template("{spinner} [{bar:30}] {pos:>3}% {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ");
    bar.set_style(style);
    bar
}

pub(crate) fn update_bar(bar: &ProgressBar, progress: &ScanProgress) {
    bar.set_position(u64::from(progress.percent));
    bar.set_message(format!("{} found", progress.found));
}

pub(crate) fn print_notices(notices: &[Notice]) {
    for notice in notices {
        let prefix = match notice.level {
            NoticeLevel::Success | NoticeLevel::Info => "",
            NoticeLevel::Warning => "Warning: ",
            NoticeLevel::Error => "Error: ",
        };
        eprintln!("{prefix}{}", notice.message);
    }
}

pub(crate) fn print_report(buckets: &CategoryBuckets, providers: &[Provider], verbose: bool) {
    println!("Scan results:");
    for provider in providers {
        let emails = buckets.get(*provider);
        println!(
            "- {:<8} {:>6} {}",
            provider.display_name(),
            emails.len(),
            plural(emails.len(), "email", "emails")
        );
        if verbose {
            for email in emails {
                println!("    • {email}");
            }
        }
    }
    println!("Total unique: {}", buckets.len());
}

/// Copy the combined list, degrading to a warning when the clipboard refuses.
pub(crate) fn copy_result(clipboard: &mut impl Clipboard, buckets: &CategoryBuckets) {
    if buckets.is_empty() {
        return;
    }
    let total = buckets.len();
    match clipboard.write_text(&to_text(&buckets.combined())) {
        Ok(()) => eprintln!("Copied {total} {} to clipboard.", plural(total, "email", "emails")),
        Err(err) => {
            tracing::warn!(error = %err, "Copy failed");
            eprintln!("Warning: could not copy to clipboard ({err})");
        }
    }
}
