use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "podium", version, about = "Terminal portfolio for a public speaker")]
pub struct Args {
    /// Content file (TOML). Uses the built-in portfolio when omitted.
    #[arg(short, long)]
    pub content: Option<PathBuf>,

    /// Theme name (e.g., "Podium", "Catppuccin Mocha")
    #[arg(short, long)]
    pub theme: Option<String>,

    /// Append submitted inquiries to this JSON-lines file
    #[arg(short, long)]
    pub outbox: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_all_flags() {
        let args = Args::parse_from([
            "podium",
            "--content",
            "site/content.toml",
            "-t",
            "latte",
            "--outbox",
            "inquiries.jsonl",
        ]);
        assert_eq!(args.content, Some(PathBuf::from("site/content.toml")));
        assert_eq!(args.theme.as_deref(), Some("latte"));
        assert_eq!(args.outbox, Some(PathBuf::from("inquiries.jsonl")));
    }

    #[test]
    fn test_flags_are_optional() {
        let args = Args::parse_from(["podium"]);
        assert!(args.content.is_none());
        assert!(args.theme.is_none());
        assert!(args.outbox.is_none());
    }
}
