use std::io::{self, BufRead};

use crate::clipboard::SystemClipboard;
use crate::config::Config;
use crate::error::AppError;
use crate::model::{CategoryBuckets, Provider};
use crate::session::{PastedInput, ScanOutcome, ScanSession, SessionEvent};
use crate::utils::plural;

use super::report::{print_notices, print_report};

pub struct PasteOptions {
    pub verbose: bool,
    /// Overrides `auto_copy` from the configuration when set.
    pub copy: Option<bool>,
    /// Read the whole input from the system clipboard instead of stdin.
    pub from_clipboard: bool,
}

/// Read stdin line by line. Each line is an input change that may trigger an
/// automatic scan; a full scan runs once input ends. With `from_clipboard`
/// the clipboard contents are pasted in one go instead.
pub fn execute_paste(options: PasteOptions) -> Result<CategoryBuckets, AppError> {
    let config = Config::load()?;
    let mut session = ScanSession::new(&config, SystemClipboard::new());
    let auto_copy = options.copy.unwrap_or(config.auto_copy);

    if options.from_clipboard {
        session.set_auto_copy(auto_copy);
        let pasted = session.paste_from_clipboard();
        let outcome = match pasted {
            Ok(PastedInput { route: Some(_), .. }) => {
                session.wait_for_outcome(|_| {}).unwrap_or(ScanOutcome::Cancelled)
            }
            Ok(PastedInput { text, route: None }) => session.run_to_end(text, |_| {})?,
            Err(err) => {
                print_notices(&session.take_notices());
                return Err(err);
            }
        };
        return finish(&mut session, outcome, options.verbose);
    }

    session.set_auto_copy(false);

    let mut buffer = String::new();
    let mut last_total = 0;
    for line in io::stdin().lock().lines() {
        buffer.push_str(&line?);
        buffer.push('\n');

        if session.input_changed(&buffer)?.is_none() {
            continue;
        }
        if let Some(total) = finish_interim(&mut session)
            && total != last_total
        {
            println!("{total} {} so far", plural(total, "email", "emails"));
            last_total = total;
        }
        // Interim notices would repeat on every line.
        session.take_notices();
    }

    session.set_auto_copy(auto_copy);
    let outcome = session.run_to_end(buffer, |_| {})?;
    finish(&mut session, outcome, options.verbose)
}

fn finish(
    session: &mut ScanSession<SystemClipboard>,
    outcome: ScanOutcome,
    verbose: bool,
) -> Result<CategoryBuckets, AppError> {
    print_notices(&session.take_notices());

    match outcome {
        ScanOutcome::Completed { buckets, .. } => {
            print_report(&buckets, &Provider::ALL, verbose);
            Ok(buckets)
        }
        ScanOutcome::Errored(error) => Err(AppError::Worker(error)),
        ScanOutcome::Cancelled => Err(AppError::Cancelled),
    }
}

fn finish_interim(session: &mut ScanSession<SystemClipboard>) -> Option<usize> {
    while let Some(event) = session.next_event() {
        if let SessionEvent::Finished(ScanOutcome::Completed { summary, .. }) = event {
            return Some(summary.total);
        }
    }
    None
}
