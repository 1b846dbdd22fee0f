//! Command-line interface.

use std::path::PathBuf;

use clap::Parser;

use crate::config::ArenaConfig;

/// 2D archer duel against a scripted bot
#[derive(Parser, Debug, Default)]
#[command(name = "archer-duel")]
#[command(about = "2D archer duel against a scripted bot")]
#[command(version)]
pub struct Args {
    /// RON file with arena tuning (defaults are used for missing fields)
    #[arg(long, value_name = "CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Match length in seconds, overrides the config file
    #[arg(long, value_name = "SECONDS")]
    pub duration: Option<f32>,

    /// Start fighting immediately without the 3-2-1 countdown
    #[arg(long)]
    pub no_countdown: bool,
}

impl Args {
    /// Applies command-line overrides on top of a loaded config.
    pub fn apply_overrides(&self, config: &mut ArenaConfig) {
        if let Some(duration) = self.duration {
            config.match_rules.duration_secs = duration;
        }
        if self.no_countdown {
            config.match_rules.countdown_secs = 0.0;
        }
    }
}

pub fn parse_args() -> Args {
    Args::parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_config_path_and_overrides() {
        let args = Args::parse_from([
            "archer-duel",
            "--config",
            "arena.ron",
            "--duration",
            "45",
            "--no-countdown",
        ]);

        assert_eq!(args.config, Some(PathBuf::from("arena.ron")));
        assert_eq!(args.duration, Some(45.0));
        assert!(args.no_countdown);
    }

    #[test]
    fn overrides_replace_match_rules() {
        let args = Args {
            config: None,
            duration: Some(30.0),
            no_countdown: true,
        };
        let mut config = ArenaConfig::default();
        args.apply_overrides(&mut config);

        assert_eq!(config.match_rules.duration_secs, 30.0);
        assert_eq!(config.match_rules.countdown_secs, 0.0);
    }

    #[test]
    fn no_flags_keep_defaults() {
        let args = Args::parse_from(["archer-duel"]);
        let mut config = ArenaConfig::default();
        args.apply_overrides(&mut config);

        assert_eq!(config, ArenaConfig::default());
    }
}
