mod commands;
mod output;

use clap::Parser;
use memquality::{Config, Error, MemoryStore};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// memquality - Confidence scoring, citations and conflict detection for agent memory
#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: commands::Commands,

    /// Print machine-readable JSON
    #[arg(long, global = true)]
    json: bool,

    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Store directory (overrides config and MEMQUALITY_STORAGE_DIR)
    #[arg(long, global = true)]
    storage_dir: Option<PathBuf>,
}

/// Install the stderr log subscriber; stdout is reserved for command output.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .try_init();
}

fn run(cli: &Cli) -> Result<ExitCode, Error> {
    if !cli.command.needs_store() {
        return commands::handle_version(cli.json);
    }

    let mut config = Config::load()?;
    if let Some(dir) = &cli.storage_dir {
        config.storage_dir = dir.clone();
    }

    let storage_dir = config.storage_dir.clone();
    let mut store = MemoryStore::open(&storage_dir, config)?;
    let code = commands::execute(&cli.command, &mut store, cli.json)?;
    store.close()?;
    Ok(code)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            if cli.json {
                output::print_json(&output::ErrorResponse {
                    error: e.to_string(),
                });
            } else {
                eprintln!("Error: {}", e);
            }
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use commands::Commands;
    use tempfile::TempDir;

    #[test]
    fn test_cli_parsing_add() {
        let cli = Cli::parse_from([
            "memquality",
            "--json",
            "add",
            "User likes tea",
            "--path",
            "/USER.md",
            "--source",
            "USER.md",
            "--line-start",
            "3",
            "--tag",
            "drinks",
            "--tag",
            "morning",
        ]);
        assert!(cli.json);
        match cli.command {
            Commands::Add {
                text,
                line_start,
                line_end,
                tags,
                ..
            } => {
                assert_eq!(text, "User likes tea");
                assert_eq!(line_start, Some(3));
                assert_eq!(line_end, None);
                assert_eq!(tags, vec!["drinks", "morning"]);
            }
            _ => panic!("expected add"),
        }
    }

    #[test]
    fn test_cli_line_end_requires_line_start() {
        let result = Cli::try_parse_from([
            "memquality",
            "add",
            "User likes tea",
            "--path",
            "/USER.md",
            "--source",
            "USER.md",
            "--line-end",
            "5",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_parsing_search_defaults() {
        let cli = Cli::parse_from(["memquality", "search", "tea"]);
        assert!(!cli.verbose);
        match cli.command {
            Commands::Search {
                min_confidence,
                limit,
                source,
                ..
            } => {
                assert_eq!(min_confidence, 0.0);
                assert_eq!(limit, None);
                assert_eq!(source, None);
            }
            _ => panic!("expected search"),
        }
    }

    #[test]
    fn test_cli_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["memquality", "conflicts", "--verbose", "--storage-dir", "/tmp/s"]);
        assert!(cli.verbose);
        assert_eq!(cli.storage_dir, Some(PathBuf::from("/tmp/s")));
        assert!(cli.command.needs_store());
    }

    #[test]
    fn test_version_skips_store() {
        let cli = Cli::parse_from(["memquality", "version"]);
        assert!(!cli.command.needs_store());
    }

    #[test]
    fn test_execute_get_unknown_is_not_found() {
        let dir = TempDir::new().unwrap();
        let config = Config {
            storage_dir: dir.path().to_path_buf(),
            ..Config::default()
        };
        let mut store = MemoryStore::open(dir.path(), config).unwrap();

        let command = Commands::Get {
            id: "missing".to_string(),
        };
        let result = commands::execute(&command, &mut store, true);
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_execute_add_then_conflicts() {
        let dir = TempDir::new().unwrap();
        let config = Config {
            storage_dir: dir.path().to_path_buf(),
            ..Config::default()
        };
        let mut store = MemoryStore::open(dir.path(), config).unwrap();

        let add = Commands::Add {
            text: "User likes coffee".to_string(),
            path: "/USER.md".to_string(),
            source: "USER.md".to_string(),
            line_start: Some(1),
            line_end: None,
            excerpt: None,
            tags: vec![],
        };
        assert!(commands::execute(&add, &mut store, true).is_ok());
        assert_eq!(store.len(), 1);

        assert!(commands::execute(&Commands::Conflicts, &mut store, false).is_ok());
    }
}
