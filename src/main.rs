use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Args, Parser, Subcommand};
use mailsift::commands::{config_cmd::ConfigOptions, paste::PasteOptions, scan::ScanOptions};
use mailsift::clipboard::{LINUX_HOLD, hold_text};
use mailsift::commands::{execute_config, execute_paste, execute_scan};
use mailsift::error::AppError;
use mailsift::input::read_stdin;
use mailsift::export::ExportFormat;
use mailsift::model::Provider;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    if let Err(err) = run(cli) {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

fn init_tracing(debug: bool) {
    let fallback = if debug { "mailsift=debug" } else { "mailsift=warn" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| fallback.into()),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

fn run(cli: Cli) -> Result<(), AppError> {
    match cli.command {
        Commands::Scan(args) => {
            let options = ScanOptions {
                inputs: args.inputs,
                text: args.text,
                providers: if args.all { Vec::new() } else { args.providers },
                verbose: args.verbose,
                json: args.json,
                export: args.export,
                out_dir: args.out_dir,
                copy: resolve_copy(args.copy, args.no_copy),
                known: args.known,
            };
            execute_scan(options)?;
        }
        Commands::Paste(args) => {
            let options = PasteOptions {
                verbose: args.verbose,
                copy: resolve_copy(args.copy, args.no_copy),
                from_clipboard: args.from_clipboard,
            };
            execute_paste(options)?;
        }
        Commands::HoldClipboard(args) => {
            let text = read_stdin()?;
            hold_text(&text, Duration::from_secs(args.seconds))?;
        }
        Commands::Config(args) => {
            let options = ConfigOptions {
                show_path: args.path,
                edit: args.edit,
                auto_extract: args.auto_extract,
                auto_copy: args.auto_copy,
            };
            execute_config(options)?;
        }
    }

    Ok(())
}

#[derive(Parser)]
#[command(
    name = "mailsift",
    version,
    about = "Extract email addresses from text and sort them by provider."
)]
struct Cli {
    /// Emit debug logs on stderr (overridden by RUST_LOG).
    #[arg(long = "debug", global = true, action = ArgAction::SetTrue)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract and categorize addresses from files, --text or stdin.
    #[command(visible_alias = "sc")]
    Scan(ScanArgs),
    /// Read text from stdin line by line, extracting as it arrives.
    #[command(visible_alias = "pa")]
    Paste(PasteArgs),
    /// Manage mailsift configuration.
    #[command(visible_alias = "cfg")]
    Config(ConfigArgs),
    /// Keep a copied result on the clipboard after the copying run exits.
    #[command(name = "hold-clipboard", hide = true)]
    HoldClipboard(HoldClipboardArgs),
}

#[derive(Args)]
struct ScanArgs {
    /// Restrict output to specific providers (gmail, yahoo, hotmail, outlook, others).
    #[arg(
        short = 't',
        long = "type",
        value_name = "PROVIDER",
        action = ArgAction::Append,
        conflicts_with = "all"
    )]
    providers: Vec<Provider>,

    /// Report every provider (default when no type is provided).
    #[arg(long = "all", action = ArgAction::SetTrue)]
    all: bool,

    /// List every extracted address.
    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,

    /// Print the result as JSON instead of a summary.
    #[arg(long = "json", action = ArgAction::SetTrue)]
    json: bool,

    /// Save the result as txt or xlsx.
    #[arg(long = "export", value_name = "FORMAT")]
    export: Option<ExportFormat>,

    /// Directory for exported files.
    #[arg(long = "out-dir", value_name = "DIR", default_value = ".")]
    out_dir: PathBuf,

    /// Copy the result to the clipboard.
    #[arg(long = "copy", action = ArgAction::SetTrue, conflicts_with = "no_copy")]
    copy: bool,

    /// Never touch the clipboard.
    #[arg(long = "no-copy", action = ArgAction::SetTrue)]
    no_copy: bool,

    /// Drop addresses already present in this list.
    #[arg(long = "known", value_name = "FILE")]
    known: Option<PathBuf>,

    /// Scan this text instead of files or stdin.
    #[arg(long = "text", value_name = "TEXT", conflicts_with = "inputs")]
    text: Option<String>,

    /// Text or spreadsheet files to scan (stdin when omitted).
    #[arg(value_name = "FILE", num_args = 0..)]
    inputs: Vec<PathBuf>,
}

#[derive(Args)]
struct PasteArgs {
    /// List every extracted address.
    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,

    /// Copy the result to the clipboard.
    #[arg(long = "copy", action = ArgAction::SetTrue, conflicts_with = "no_copy")]
    copy: bool,

    /// Never touch the clipboard.
    #[arg(long = "no-copy", action = ArgAction::SetTrue)]
    no_copy: bool,

    /// Take the input from the system clipboard instead of stdin.
    #[arg(long = "from-clipboard", action = ArgAction::SetTrue)]
    from_clipboard: bool,
}

#[derive(Args)]
struct HoldClipboardArgs {
    #[arg(long, default_value_t = LINUX_HOLD.as_secs())]
    seconds: u64,
}

#[derive(Args)]
struct ConfigArgs {
    /// Show the configuration file path.
    #[arg(long = "path", action = ArgAction::SetTrue)]
    path: bool,

    /// Open the configuration file in $EDITOR.
    #[arg(long = "edit", action = ArgAction::SetTrue)]
    edit: bool,

    /// Turn automatic extraction on input change on or off.
    #[arg(long = "auto-extract", value_name = "BOOL")]
    auto_extract: Option<bool>,

    /// Turn copying results to the clipboard on or off.
    #[arg(long = "auto-copy", value_name = "BOOL")]
    auto_copy: Option<bool>,
}

fn resolve_copy(copy: bool, no_copy: bool) -> Option<bool> {
    match (copy, no_copy) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}
