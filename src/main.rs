use std::path::PathBuf;

use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use genrify::{
    cli, config, error, logging,
    pipeline::{
        genres::{EXPORT_THRESHOLD, PLAYLIST_THRESHOLD},
        playlists::DEFAULT_PREFIX,
    },
};

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
    /// Show debug output
    #[clap(long, short, global = true)]
    verbose: bool,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Authorize with Spotify API
    Auth(AuthOptions),

    /// Recreate one playlist per genre of the saved tracks
    Playlists(PlaylistsOptions),

    /// Write the genre groups to a JSON file
    Export(ExportOptions),

    /// List genres with their number of saved tracks
    Genres(GenresOptions),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct AuthOptions {
    /// Run the browser authorization even if a stored token exists
    #[clap(long)]
    pub force: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct PlaylistsOptions {
    /// Minimum number of tracks a genre needs to get a playlist
    #[clap(long, default_value_t = PLAYLIST_THRESHOLD)]
    pub threshold: usize,

    /// Name prefix of generated playlists
    #[clap(long, default_value = DEFAULT_PREFIX)]
    pub prefix: String,

    /// Keep playlists generated by earlier runs
    #[clap(long)]
    pub keep_existing: bool,

    /// Ignore cached responses
    #[clap(long)]
    pub refresh: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct ExportOptions {
    /// Minimum number of tracks a genre needs to be exported
    #[clap(long, default_value_t = EXPORT_THRESHOLD)]
    pub threshold: usize,

    /// File the genre groups are written to
    #[clap(long, short, default_value = "genres.json")]
    pub output: PathBuf,

    /// Ignore cached responses
    #[clap(long)]
    pub refresh: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct GenresOptions {
    #[clap(long, default_value_t = PLAYLIST_THRESHOLD)]
    pub threshold: usize,

    /// Ignore cached responses
    #[clap(long)]
    pub refresh: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli.command {
        Command::Auth(opt) => cli::auth(opt.force).await,
        Command::Playlists(opt) => {
            cli::playlists(opt.threshold, opt.prefix, opt.keep_existing, opt.refresh).await
        }
        Command::Export(opt) => cli::export(opt.threshold, opt.output, opt.refresh).await,
        Command::Genres(opt) => cli::genres(opt.threshold, opt.refresh).await,
        Command::Completions(opt) => {
            let mut cmd = Cli::command_for_update();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
