use std::path::PathBuf;

use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use spotiply::{cli, config::Config, error};

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
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    #[clap(about = "Generate credentials.json")]
    Credentials,

    #[clap(about = "Authorize spotiply with your Spotify account")]
    Auth,

    #[clap(about = "Create a playlist from the mp3 files in a directory")]
    FromDir(FromDirOptions),

    #[clap(about = "Create a playlist from a matched track list")]
    FromJson(FromJsonOptions),

    #[clap(about = "Create a playlist from a rekordbox playlist export")]
    FromRekordbox(FromRekordboxOptions),

    #[clap(about = "Export your liked songs")]
    LikedSongs,

    #[clap(about = "Export the tracks of a playlist")]
    PlaylistTracks(PlaylistTracksOptions),

    #[clap(about = "Clean recording date, diacritics and genre of mp3 files")]
    CleanTags(CleanTagsOptions),

    #[clap(about = "Clean tags, deriving the genre from the artist")]
    CleanTagsByArtist(CleanTagsOptions),

    #[clap(about = "Scrape the genre list and rebuild the genre taxonomy")]
    UpdateGenres,

    #[clap(about = "Add the artists of a song archive to the artist genre table")]
    RefreshArtistGenres(RefreshArtistGenresOptions),

    #[clap(about = "Show the tags of an mp3 file")]
    ShowTags(ShowTagsOptions),

    #[clap(about = "Rename mp3 files to \"<artist> - <title>.mp3\"")]
    Rename(RenameOptions),

    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct FromDirOptions {
    /// Music directory, defaults to the current directory
    #[clap(default_value = ".")]
    dir: PathBuf,

    /// Playlist name, defaults to a random id
    #[clap(long)]
    name: Option<String>,

    /// Match tracks but do not create the playlist
    #[clap(long)]
    disable_playlist: bool,

    /// Keep matches of an existing track list with the same name
    #[clap(long)]
    resume: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct FromJsonOptions {
    file: PathBuf,
}

#[derive(Parser, Debug, Clone)]
pub struct FromRekordboxOptions {
    file: PathBuf,

    #[clap(long)]
    name: Option<String>,

    #[clap(long)]
    disable_playlist: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct PlaylistTracksOptions {
    /// Playlist URL, URI or id
    playlist: String,
}

#[derive(Parser, Debug, Clone)]
pub struct CleanTagsOptions {
    /// mp3 file or directory (searched recursively)
    path: PathBuf,

    /// Report changes without writing them
    #[clap(long)]
    dry_run: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct RefreshArtistGenresOptions {
    archive: PathBuf,
}

#[derive(Parser, Debug, Clone)]
pub struct ShowTagsOptions {
    file: PathBuf,
}

#[derive(Parser, Debug, Clone)]
pub struct RenameOptions {
    dir: PathBuf,

    #[clap(long)]
    dry_run: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Command::Completions(opt) = &cli.command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(opt.shell, &mut cmd, name, &mut std::io::stdout());
        return;
    }

    let config = match Config::load().await {
        Ok(config) => config,
        Err(e) => error!("Cannot load configuration. Err: {}", e),
    };

    match cli.command {
        Command::Credentials => cli::credentials(&config).await,
        Command::Auth => cli::auth(&config).await,
        Command::FromDir(opt) => {
            cli::from_dir(
                &config,
                &opt.dir,
                opt.name,
                opt.disable_playlist,
                opt.resume,
            )
            .await
        }
        Command::FromJson(opt) => cli::from_json(&config, &opt.file).await,
        Command::FromRekordbox(opt) => {
            cli::from_rekordbox(&config, &opt.file, opt.name, opt.disable_playlist).await
        }
        Command::LikedSongs => cli::liked_songs(&config).await,
        Command::PlaylistTracks(opt) => cli::playlist_tracks(&config, &opt.playlist).await,
        Command::CleanTags(opt) => cli::clean_tags(&config, &opt.path, false, opt.dry_run).await,
        Command::CleanTagsByArtist(opt) => {
            cli::clean_tags(&config, &opt.path, true, opt.dry_run).await
        }
        Command::UpdateGenres => cli::update_genres(&config).await,
        Command::RefreshArtistGenres(opt) => {
            cli::refresh_artist_genres(&config, &opt.archive).await
        }
        Command::ShowTags(opt) => cli::show_tags(&opt.file),
        Command::Rename(opt) => cli::rename(&opt.dir, opt.dry_run),
        Command::Completions(_) => {}
    }
}
