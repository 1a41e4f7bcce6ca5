use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Word and stanza level lyric timeline player
#[derive(Debug, Parser)]
#[command(name = "stanzaline", version, about)]
pub struct Cli {
    /// Config file (defaults to ~/.config/stanzaline/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Transcripts directory, overriding `transcripts.dir`
    #[arg(long, global = true)]
    pub transcripts: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List catalog tracks and their timing quality
    List,

    /// Show a track's stanzas and word timings
    Inspect {
        track: String,
        /// Print machine-readable JSON
        #[arg(long)]
        json: bool,
    },

    /// Resolve the active stanza and word states at a point in time
    At {
        track: String,
        /// Playback position in seconds
        seconds: f64,
        /// Print machine-readable JSON
        #[arg(long)]
        json: bool,
    },

    /// Play a track on a simulated clock, highlighting words as they are sung
    Play {
        track: String,
        /// Start position in seconds
        #[arg(long, default_value_t = 0.0)]
        from: f64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_at() {
        let cli = Cli::parse_from(["stanzaline", "at", "night-drive", "12.5", "--json"]);
        match cli.command {
            Command::At {
                track,
                seconds,
                json,
            } => {
                assert_eq!(track, "night-drive");
                assert!((seconds - 12.5).abs() < f64::EPSILON);
                assert!(json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_play_with_global_flags() {
        let cli = Cli::parse_from([
            "stanzaline",
            "play",
            "song",
            "--from",
            "30",
            "--transcripts",
            "/tmp/lyrics",
        ]);
        assert_eq!(cli.transcripts, Some(PathBuf::from("/tmp/lyrics")));
        assert!(matches!(cli.command, Command::Play { from, .. } if (from - 30.0).abs() < f64::EPSILON));
    }
}
