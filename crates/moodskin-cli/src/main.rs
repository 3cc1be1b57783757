use std::io::{self, IsTerminal};
use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use moodskin_core::MoodskinError;

mod commands;
mod logging;

#[derive(Parser)]
#[command(name = "moodskin")]
#[command(about = "Detect your mood from text or a camera and re-skin the theme to match", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    json_logs: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Keep config and data under this directory instead of the platform defaults
    #[arg(long, global = true, value_name = "DIR")]
    home: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect the mood of a piece of text and apply its theme
    Detect {
        /// Text to analyze
        #[arg(required_unless_present = "stdin")]
        text: Option<String>,
        /// Read the text from stdin
        #[arg(long, conflicts_with = "text")]
        stdin: bool,
    },
    /// Detect the mood from camera frames
    Camera(CameraArgs),
    /// Go back to the welcome theme
    Reset,
    /// Show the current mood and theme
    Show,
    /// List every mood theme
    Themes,
    /// Manage saved themes
    Saved {
        #[command(subcommand)]
        action: SavedAction,
    },
    /// Sign in, or continue as a guest
    Login(LoginArgs),
    /// Sign out and forget local data
    Logout,
    /// Show the signed-in user
    Whoami,
}

#[derive(Args)]
struct CameraArgs {
    /// Directory of frames to replay (overrides [camera] frames_dir)
    #[arg(long, value_name = "DIR")]
    frames: Option<PathBuf>,
    /// Stop after this many samples
    #[arg(long, conflicts_with = "once")]
    ticks: Option<u64>,
    /// Take a single sample
    #[arg(long)]
    once: bool,
}

#[derive(Subcommand)]
enum SavedAction {
    /// List saved themes
    List,
    /// Save the current mood's theme
    Save,
    /// Remove the saved theme at INDEX
    Remove { index: usize },
    /// Remove every saved theme
    Clear,
    /// Apply the saved theme at INDEX
    Apply { index: usize },
    /// Export saved themes as JSON
    Export {
        #[arg(long, value_name = "PATH")]
        out: Option<PathBuf>,
    },
}

#[derive(Args)]
pub(crate) struct LoginArgs {
    /// Continue as a guest
    #[arg(long, conflicts_with_all = ["email", "provider"])]
    anonymous: bool,
    #[arg(long, requires = "password", conflicts_with = "provider")]
    email: Option<String>,
    #[arg(long, requires = "email")]
    password: Option<String>,
    /// Federated provider name (e.g. google)
    #[arg(long, requires = "token")]
    provider: Option<String>,
    /// Token obtained from the federated provider
    #[arg(long, requires = "provider")]
    token: Option<String>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if cli.no_color || !io::stdout().is_terminal() {
        colored::control::set_override(false);
    }
    logging::init_logging(cli.json_logs, cli.verbose, cli.quiet);

    if let Err(e) = run(cli).await {
        std::process::exit(report_error(&e));
    }
}

async fn run(cli: Cli) -> Result<()> {
    let frames = match &cli.command {
        Commands::Camera(args) => args.frames.clone(),
        _ => None,
    };
    let ctx = commands::context::build(cli.home.as_deref(), frames).await?;

    let result = match cli.command {
        Commands::Detect { text, stdin } => commands::mood::detect(&ctx, text, stdin).await,
        Commands::Camera(args) => commands::camera::run(&ctx, args.ticks, args.once).await,
        Commands::Reset => commands::mood::reset(&ctx).await,
        Commands::Show => commands::mood::show(&ctx).await,
        Commands::Themes => commands::mood::themes(),
        Commands::Saved { action } => match action {
            SavedAction::List => commands::saved::list(&ctx).await,
            SavedAction::Save => commands::saved::save(&ctx).await,
            SavedAction::Remove { index } => commands::saved::remove(&ctx, index).await,
            SavedAction::Clear => commands::saved::clear(&ctx).await,
            SavedAction::Apply { index } => commands::saved::apply(&ctx, index).await,
            SavedAction::Export { out } => commands::saved::export(&ctx, out).await,
        },
        Commands::Login(args) => commands::account::login(&ctx, &args).await,
        Commands::Logout => commands::account::logout(&ctx).await,
        Commands::Whoami => commands::account::whoami(&ctx).await,
    };

    // Remote writes are fire-and-forget; give queued ones a chance before exit.
    ctx.app.flush().await;
    result
}

/// Prints an error and returns the exit code. Notices are shown as the user
/// would see them in the app; informational ones exit successfully.
fn report_error(error: &anyhow::Error) -> i32 {
    let Some(err) = error.downcast_ref::<MoodskinError>() else {
        eprintln!("{}: {:#}", "Error".red().bold(), error);
        return 1;
    };

    if let Some(notice) = err.as_notice() {
        if notice.is_informational() {
            eprintln!("{}", notice.message().yellow());
            return 0;
        }
        eprintln!("{}", notice.message().red());
        return 1;
    }

    eprintln!("{}: {}", "Error".red().bold(), err);
    eprintln!("{}: {}", "Hint".yellow(), err.user_notice().message());
    1
}
