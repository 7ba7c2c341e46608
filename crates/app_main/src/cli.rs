use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// iSlides gallery: browse and organize presentations from the terminal.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to the platform config directory)
    #[arg(long, env = "ISLIDES_CONFIG")]
    pub config: Option<PathBuf>,

    /// JSON snapshot to start from instead of the sample gallery
    #[arg(long, conflicts_with = "empty")]
    pub seed: Option<PathBuf>,

    /// Start with an empty gallery
    #[arg(long)]
    pub empty: bool,

    /// Keep a JSON snapshot of the gallery in sync at this path
    #[arg(long, env = "ISLIDES_STORE")]
    pub store: Option<PathBuf>,

    /// Answer yes to every confirmation
    #[arg(short, long)]
    pub yes: bool,

    /// Increase verbosity (use multiple times for more)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Log filter: the configured level unless raised with `-v`
    pub fn log_level(&self, configured: &str) -> String {
        match self.verbose {
            0 => configured.to_string(),
            1 => "debug".to_string(),
            _ => "trace".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_args() {
        let cli = Cli::try_parse_from(["islides_gallery", "--store", "g.json", "-vv", "-y"]).unwrap();
        assert_eq!(cli.store, Some(PathBuf::from("g.json")));
        assert!(cli.yes);
        assert_eq!(cli.log_level("info"), "trace");

        let cli = Cli::try_parse_from(["islides_gallery"]).unwrap();
        assert_eq!(cli.log_level("warn"), "warn");

        assert!(Cli::try_parse_from(["islides_gallery", "--seed", "s.json", "--empty"]).is_err());
    }
}
