use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use genrecli::{cli, config, warning};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  author=env!("CARGO_PKG_AUTHORS"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Authorize with Spotify API
    Auth,

    /// Rank the genres of the playlists you own
    Genres(ReportArgs),

    /// Rank the genres of another user's public playlists
    User(UserOptions),

    /// Show the genres of your liked songs and rank them
    Liked(ReportArgs),

    /// Print the user id owning a playlist link
    Owner(OwnerOptions),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct ReportArgs {
    /// Print the report as a table
    #[clap(long)]
    pub table: bool,

    /// Only show the N most frequent genres
    #[clap(long, value_name = "N")]
    pub limit: Option<usize>,
}

impl From<ReportArgs> for cli::ReportOptions {
    fn from(args: ReportArgs) -> Self {
        cli::ReportOptions {
            table: args.table,
            limit: args.limit,
        }
    }
}

#[derive(Parser, Debug, Clone)]
pub struct UserOptions {
    /// Playlist link of the user (defaults to SPOTIFY_PUBLIC_PLAYLIST_URI)
    pub link: Option<String>,

    #[command(flatten)]
    pub report: ReportArgs,
}

#[derive(Parser, Debug, Clone)]
pub struct OwnerOptions {
    /// Playlist link, spotify:playlist: URI or playlist id
    pub link: String,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        warning!("Cannot load environment. Err: {}", e);
    }

    let cli = Cli::parse();

    match cli.command {
        Command::Auth => cli::auth().await,
        Command::Genres(opt) => cli::genres(opt.into()).await,
        Command::User(opt) => cli::user_genres(opt.link, opt.report.into()).await,
        Command::Liked(opt) => cli::liked(opt.into()).await,
        Command::Owner(opt) => cli::owner(opt.link).await,
        Command::Completions(opt) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
