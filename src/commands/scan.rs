use std::fs;
use std::path::PathBuf;

use crate::clipboard::SystemClipboard;
use crate::config::Config;
use crate::error::AppError;
use crate::export::{ExportFormat, export_all, export_provider};
use crate::input::{load_file, load_known, read_stdin};
use crate::model::{CategoryBuckets, Provider};
use crate::session::{ScanOutcome, ScanSession};
use crate::utils::{display_path, plural};

use super::report::{copy_result, print_notices, print_report, progress_bar, update_bar};

pub struct ScanOptions {
    pub inputs: Vec<PathBuf>,
    pub text: Option<String>,
    pub providers: Vec<Provider>,
    pub verbose: bool,
    pub json: bool,
    pub export: Option<ExportFormat>,
    pub out_dir: PathBuf,
    /// Overrides `auto_copy` from the configuration when set.
    pub copy: Option<bool>,
    pub known: Option<PathBuf>,
}

pub fn execute_scan(options: ScanOptions) -> Result<CategoryBuckets, AppError> {
    let config = Config::load()?;
    let text = gather_input(&options, &config)?;

    // Copying happens after provider and known-list filtering below.
    let mut session = ScanSession::new(&config, SystemClipboard::new());
    session.set_auto_copy(false);

    let bar = progress_bar();
    let outcome = session.run_to_end(text, |progress| update_bar(&bar, progress));
    bar.finish_and_clear();
    print_notices(&session.take_notices());

    let mut buckets = match outcome? {
        ScanOutcome::Completed { buckets, .. } => buckets,
        ScanOutcome::Errored(error) => return Err(AppError::Worker(error)),
        ScanOutcome::Cancelled => return Err(AppError::Cancelled),
    };

    if let Some(path) = &options.known {
        let known = load_known(path, config.max_file_bytes)?;
        let removed = buckets.retain_unknown(&known);
        eprintln!(
            "Skipped {removed} already known {}.",
            plural(removed, "address", "addresses")
        );
    }

    let providers = if options.providers.is_empty() {
        Provider::ALL.to_vec()
    } else {
        options.providers.clone()
    };
    let result = buckets.subset(&providers);

    if options.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_report(&result, &providers, options.verbose);
    }

    if let Some(format) = options.export {
        fs::create_dir_all(&options.out_dir)?;
        let written = if options.providers.is_empty() {
            vec![export_all(&result, format, &options.out_dir)?]
        } else {
            providers
                .iter()
                .map(|provider| export_provider(&result, *provider, format, &options.out_dir))
                .collect::<Result<Vec<_>, _>>()?
        };
        for path in written {
            eprintln!("Saved {}", display_path(&path));
        }
    }

    if options.copy.unwrap_or(config.auto_copy) {
        copy_result(&mut SystemClipboard::new(), &result);
    }

    Ok(result)
}

fn gather_input(options: &ScanOptions, config: &Config) -> Result<String, AppError> {
    if let Some(text) = &options.text {
        return Ok(text.clone());
    }
    if options.inputs.is_empty() {
        return read_stdin();
    }

    let mut parts = Vec::with_capacity(options.inputs.len());
    for path in &options.inputs {
        parts.push(load_file(path, config.max_file_bytes)?);
    }
    Ok(parts.join("\n"))
}
