use clap::{Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "small-fdw")]
#[command(about = "Scan foreign tables through row adapters")]
pub struct CliConfig {
    /// Path to the TOML table configuration
    #[arg(short, long, default_value = "small-fdw.toml")]
    pub config: String,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,

    /// Abort a scan that takes longer than this many seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Clone, Subcommand)]
pub enum CliCommand {
    /// Scan a configured table and print its rows as CSV
    Scan {
        table: String,

        #[arg(long)]
        no_header: bool,

        /// Report failed pulls and keep scanning instead of aborting
        #[arg(long)]
        keep_going: bool,
    },

    /// Print CREATE FOREIGN TABLE statements
    ImportSchema {
        /// Configured table to declare (all tables when neither this nor --class is given)
        #[arg(long, conflicts_with = "class")]
        table: Option<String>,

        /// Adapter class to declare from --option values
        #[arg(long)]
        class: Option<String>,

        #[arg(long)]
        schema: Option<String>,

        #[arg(long)]
        prefix: Option<String>,

        #[arg(long)]
        server: Option<String>,

        /// Adapter option as key=value (repeatable)
        #[arg(short = 'o', long = "option", value_parser = parse_key_val)]
        options: Vec<(String, String)>,
    },

    /// List adapter classes and configured tables
    List,
}

fn parse_key_val(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.to_string()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("expected key=value, got '{}'", raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_val() {
        assert_eq!(
            parse_key_val("host=127.0.0.1").unwrap(),
            ("host".to_string(), "127.0.0.1".to_string())
        );
        assert_eq!(
            parse_key_val("url=http://x/?a=b").unwrap().1,
            "http://x/?a=b"
        );
        assert!(parse_key_val("novalue").is_err());
        assert!(parse_key_val("=x").is_err());
    }

    #[test]
    fn test_parse_scan_command() {
        let cli = CliConfig::parse_from(["small-fdw", "--timeout-secs", "5", "scan", "weather"]);
        assert_eq!(cli.timeout_secs, Some(5));
        match cli.command {
            CliCommand::Scan { table, keep_going, .. } => {
                assert_eq!(table, "weather");
                assert!(!keep_going);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_parse_import_schema_options() {
        let cli = CliConfig::parse_from([
            "small-fdw",
            "import-schema",
            "--class",
            "Redis",
            "--prefix",
            "rds_",
            "-o",
            "host=127.0.0.1",
            "-o",
            "port=6379",
        ]);
        match cli.command {
            CliCommand::ImportSchema { class, options, .. } => {
                assert_eq!(class.as_deref(), Some("Redis"));
                assert_eq!(options.len(), 2);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }
}
