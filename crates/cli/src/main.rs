//! pianote entry point.
//!
//! Scrapes novel and episode metadata and writes one Markdown note per record.
//! Logging goes to stderr so `--print` can stream notes on stdout.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use pianote_client::{FetchClient, FetchConfig, NovelReport, Pipeline};
use pianote_core::{AppConfig, Episode, PageState, episode_body_to_markdown, episode_to_markdown, novel_to_markdown};

mod output;

use output::{Existing, NoteWriter};

#[derive(Parser)]
#[command(author, version, about = "Novelpia pages to Obsidian notes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Replace existing notes without asking
    #[arg(long, global = true, conflicts_with = "skip_existing")]
    overwrite: bool,

    /// Keep existing notes without asking
    #[arg(long, global = true)]
    skip_existing: bool,

    /// Print notes to stdout instead of writing files
    #[arg(long, global = true)]
    print: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the note for one novel
    Novel {
        /// Novel code, as in /novel/{code}
        code: String,
    },
    /// Write the note for one episode by its number (0 is the prologue)
    Episode { novel_code: String, ordinal: u32 },
    /// Download one episode's body into `EP.{ordinal} - {title}.md`
    Body { novel_code: String, ordinal: u32 },
    /// Write notes for every episode on one list page, oldest first
    Episodes {
        novel_code: String,
        #[arg(short, long, default_value_t = 1)]
        page: u32,
    },
    /// Write notes for every novel in the logged-in library
    Library,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load()?;

    let existing = match (cli.overwrite, cli.skip_existing) {
        (true, _) => Existing::Overwrite,
        (_, true) => Existing::Skip,
        _ => Existing::Ask,
    };
    let writer = NoteWriter { dir: config.markdown_dir.clone(), existing, print: cli.print };

    let client = FetchClient::new(FetchConfig::from(&config))?;
    let mut pipeline = Pipeline::new(client, &config)?;

    match cli.command {
        Commands::Novel { code } => {
            let report = pipeline.novel(&code).await?;
            write_novel(&writer, &code, &report)?;
        }
        Commands::Episode { novel_code, ordinal } => {
            let episode = pipeline.episode(&novel_code, ordinal).await?;
            write_episode(&writer, &episode)?;
        }
        Commands::Body { novel_code, ordinal } => {
            let body = pipeline.episode_body(&novel_code, ordinal).await?;
            let document = episode_body_to_markdown(&body.episode, &body.lines);
            writer.write_body(&novel_code, ordinal, body.episode.page.title(), &document)?;
        }
        Commands::Episodes { novel_code, page } => {
            for episode in pipeline.episode_page(&novel_code, page).await? {
                write_episode(&writer, &episode)?;
            }
        }
        Commands::Library => {
            let entries = pipeline.library().await?;
            tracing::info!("library lists {} novels", entries.len());

            let writer = NoteWriter { existing: Existing::Overwrite, ..writer };
            for entry in entries {
                match pipeline.novel(&entry.code).await {
                    Ok(report) => write_novel(&writer, &entry.code, &report)?,
                    Err(err) => tracing::error!(code = %entry.code, title = %entry.title, "{}", err),
                }
            }
        }
    }

    Ok(())
}

fn write_novel(writer: &NoteWriter, code: &str, report: &NovelReport) -> Result<()> {
    if report.state == PageState::InvalidCode {
        tracing::warn!(code, "no note for an invalid novel code");
        return Ok(());
    }

    let novel = &report.novel;
    writer.write(code, novel.page.title(), &novel_to_markdown(novel))?;
    Ok(())
}

fn write_episode(writer: &NoteWriter, episode: &Episode) -> Result<()> {
    if episode.is_content_less() {
        tracing::info!(code = episode.page.code(), "episode has no published content");
    }
    writer.write(episode.page.code(), episode.page.title(), &episode_to_markdown(episode))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_novel() {
        let cli = Cli::try_parse_from(["pianote", "novel", "15597", "--overwrite"]).unwrap();
        assert!(cli.overwrite);
        assert!(matches!(cli.command, Commands::Novel { code } if code == "15597"));
    }

    #[test]
    fn test_parse_episodes_page() {
        let cli = Cli::try_parse_from(["pianote", "episodes", "15597", "--page", "3"]).unwrap();
        assert!(matches!(cli.command, Commands::Episodes { page: 3, .. }));

        let cli = Cli::try_parse_from(["pianote", "episodes", "15597"]).unwrap();
        assert!(matches!(cli.command, Commands::Episodes { page: 1, .. }));
    }

    #[test]
    fn test_parse_episode_ordinal() {
        let cli = Cli::try_parse_from(["pianote", "episode", "15597", "0"]).unwrap();
        assert!(matches!(cli.command, Commands::Episode { ordinal: 0, .. }));
        assert!(Cli::try_parse_from(["pianote", "episode", "15597", "-1"]).is_err());
    }

    #[test]
    fn test_parse_body() {
        let cli = Cli::try_parse_from(["pianote", "body", "15597", "3", "--print"]).unwrap();
        assert!(cli.print);
        assert!(matches!(cli.command, Commands::Body { ordinal: 3, novel_code } if novel_code == "15597"));
    }

    #[test]
    fn test_overwrite_conflicts_with_skip() {
        assert!(Cli::try_parse_from(["pianote", "library", "--overwrite", "--skip-existing"]).is_err());
    }
}
