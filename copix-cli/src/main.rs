//! copix - keep a list of names, mark favorites, copy them to the clipboard
//!
//! Entry point for the `copix` binary:
//! - `copix` / `copix session`: interactive list screen
//! - `copix config`: inspect or initialise ~/.copix/config.toml
//! - `copix completions`: shell completion scripts

use std::sync::Arc;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand, ValueEnum};
use copix_core::NameListManager;
use tracing::info;

mod config;
mod platform;
mod session;
mod tracing_setup;
mod ui;

use config::CopixConfig;
use platform::{FsImageService, SystemClipboard};
use session::Session;

#[derive(Parser, Debug)]
#[command(
    name = "copix",
    author,
    version,
    about = "Keep a list of names, mark favorites and copy them to the clipboard",
    long_about = "Keep a personal list of names, each optionally paired with a picture. \
                  Favorites float to the top; any name can be copied to the clipboard \
                  with one keystroke. The list lives only for the current session."
)]
struct Cli {
    /// Enable debug logging on stderr
    #[arg(long, global = true, env = "COPIX_DEBUG")]
    debug: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Open the interactive name list (default)
    Session,
    /// Manage copix configuration (init, show, path)
    Config(config::ConfigArgs),
    /// Generate shell completion scripts
    Completions(CompletionsArgs),
}

#[derive(Parser, Debug)]
struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    shell: Shell,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)] // PowerShell is a proper noun, not a suffix
enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_setup::init(&tracing_setup::TracingConfig { debug: cli.debug }).ok();

    match cli.command.unwrap_or(Commands::Session) {
        Commands::Session => run_session().await?,
        Commands::Config(args) => config::run_config(args)?,
        Commands::Completions(args) => run_completions(args)?,
    }
    Ok(())
}

async fn run_session() -> Result<()> {
    if !session::can_run_interactive() {
        bail!("copix needs an interactive terminal (stdin and stdout must be a TTY)");
    }

    let config = CopixConfig::load();
    info!(
        photos = %config.photos_dir().display(),
        theme = ?config.general.theme,
        "starting session"
    );

    let manager = NameListManager::new(
        Arc::new(FsImageService::from_config(&config)),
        Arc::new(SystemClipboard),
    )
    .with_copy_ttl(config.notice_ttl());

    Session::new(manager, &config).run().await
}

fn run_completions(args: CompletionsArgs) -> Result<()> {
    use clap::CommandFactory;
    use clap_complete::{generate, Shell as CompletionShell};
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();

    let shell = match args.shell {
        Shell::Bash => CompletionShell::Bash,
        Shell::Zsh => CompletionShell::Zsh,
        Shell::Fish => CompletionShell::Fish,
        Shell::PowerShell => CompletionShell::PowerShell,
        Shell::Elvish => CompletionShell::Elvish,
    };

    generate(shell, &mut cmd, bin_name, &mut io::stdout());

    Ok(())
}
