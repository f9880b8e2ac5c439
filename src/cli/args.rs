//! CLI argument definitions using clap

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{ArgAction, Parser, Subcommand, ValueHint};

/// Inspect French hospital case-mix tables: classifier trees, GHS tariffs and version deltas
#[derive(Parser, Debug)]
#[command(name = "casemix")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Config file layered over the global one
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Data directory holding one subdirectory per version
    #[arg(long, global = true, env = "CASEMIX_DATA_DIR", value_hint = ValueHint::DirPath)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the classifier decision tree
    Tree {
        /// Version (YYYY-MM or YYYY-MM-DD, default: latest)
        #[arg(long, value_name = "VERSION", value_parser = parse_version, conflicts_with = "file")]
        at: Option<NaiveDate>,

        /// Read a classifier tree file instead of a version
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        file: Option<PathBuf>,

        /// Start node (default: from config)
        #[arg(short, long)]
        start: Option<usize>,

        /// Hide the children of these node ids
        #[arg(long, value_delimiter = ',')]
        collapse: Vec<String>,

        /// Expand every ancestor of this node id
        #[arg(long)]
        reveal: Option<String>,

        /// Print the tree as JSON
        #[arg(long)]
        json: bool,
    },

    /// Price one GHS for a stay duration
    Price {
        /// GHM root, e.g. 05C02
        root: String,
        /// GHS code
        ghs: u32,
        /// Stay duration in nights
        #[arg(allow_negative_numbers = true)]
        duration: i64,

        /// Version (default: latest)
        #[arg(long, value_name = "VERSION", value_parser = parse_version)]
        at: Option<NaiveDate>,

        #[command(flatten)]
        compare: CompareArgs,
    },

    /// Show the pricing grid of a GHM root
    Grid {
        /// GHM root, e.g. 05C02
        root: String,

        /// Version (default: latest)
        #[arg(long, value_name = "VERSION", value_parser = parse_version)]
        at: Option<NaiveDate>,

        #[command(flatten)]
        compare: CompareArgs,

        /// Number of duration rows (default: from config)
        #[arg(long)]
        max_duration: Option<u32>,

        /// Print the grid as JSON
        #[arg(long)]
        json: bool,
    },

    /// Describe a duration validity mask as ranges
    Ranges {
        /// 32-bit mask, decimal or 0x-prefixed
        #[arg(value_parser = parse_mask)]
        mask: u32,
    },

    /// Find cross-references in a text
    Links {
        /// Text to scan
        text: String,
        /// Print segments as JSON
        #[arg(long)]
        json: bool,
    },

    /// List available versions
    Versions,

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Version to compare against; both options are mutually exclusive.
#[derive(clap::Args, Debug, Default, Clone)]
pub struct CompareArgs {
    /// Show changes since this version
    #[arg(long, value_name = "VERSION", value_parser = parse_version, conflicts_with = "previous")]
    pub compare: Option<NaiveDate>,

    /// Show changes since the version before the selected one
    #[arg(long)]
    pub previous: bool,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective configuration
    Show,
    /// Print a commented configuration template
    Template,
    /// Show the global configuration file location
    Path,
}

/// Accepts `YYYY-MM-DD`, or `YYYY-MM` for the first day of the month.
pub fn parse_version(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d"))
        .map_err(|_| format!("invalid version '{s}', expected YYYY-MM or YYYY-MM-DD"))
}

fn parse_mask(s: &str) -> Result<u32, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid mask '{s}': {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_version() {
        let march = NaiveDate::from_ymd_opt(2019, 3, 1).unwrap();
        assert_eq!(parse_version("2019-03"), Ok(march));
        assert_eq!(parse_version("2019-03-01"), Ok(march));
        assert!(parse_version("2019").is_err());
    }

    #[test]
    fn test_parse_mask() {
        assert_eq!(parse_mask("0x80000000"), Ok(1 << 31));
        assert_eq!(parse_mask("14"), Ok(14));
        assert!(parse_mask("x").is_err());
    }

    #[test]
    fn test_price_accepts_negative_duration() {
        let cli = Cli::try_parse_from(["casemix", "price", "05C02", "1500", "-1"]).unwrap();
        assert!(matches!(cli.command, Commands::Price { duration: -1, .. }));
    }
}
