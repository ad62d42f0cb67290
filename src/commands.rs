//! Command handlers for memquality CLI.

use crate::output::*;
use memquality::{Error, MemoryStore, NewMemory, SearchRequest};
use std::process::ExitCode;

struct AddContext<'a> {
    text: &'a str,
    path: &'a str,
    source: &'a str,
    line_start: Option<usize>,
    line_end: Option<usize>,
    excerpt: Option<&'a str>,
    tags: &'a [String],
}

struct SearchContext<'a> {
    query: &'a str,
    min_confidence: f64,
    limit: Option<usize>,
    source: Option<&'a str>,
}

/// Commands supported by memquality CLI.
#[derive(clap::Subcommand)]
pub enum Commands {
    Add {
        /// Memory text content
        text: String,

        /// Source file the memory was taken from
        #[arg(long)]
        path: String,

        /// Provenance channel (USER.md, MEMORY.md, AGENTS.md, session, ...)
        #[arg(short = 's', long)]
        source: String,

        /// First cited line; attaches a citation
        #[arg(long)]
        line_start: Option<usize>,

        /// Last cited line (default: same as --line-start)
        #[arg(long, requires = "line_start")]
        line_end: Option<usize>,

        /// Cited excerpt (default: first 200 characters of the text)
        #[arg(long)]
        excerpt: Option<String>,

        /// Tag to attach (repeatable)
        #[arg(short = 't', long = "tag")]
        tags: Vec<String>,
    },
    Search {
        /// Search query text
        query: String,

        /// Confidence floor (0.0 to 1.0); relaxed to 0 when nothing passes
        #[arg(long, default_value = "0.0")]
        min_confidence: f64,

        /// Maximum number of results (default: from config)
        #[arg(short = 'l', long)]
        limit: Option<usize>,

        /// Only return memories from this provenance channel
        #[arg(long)]
        source: Option<String>,
    },
    Get {
        /// Memory ID
        id: String,
    },
    /// Scan every stored pair for conflicts
    Conflicts,
    Version,
}

impl Commands {
    /// Whether the command touches the store.
    pub fn needs_store(&self) -> bool {
        !matches!(self, Commands::Version)
    }
}

/// Execute a CLI command.
pub fn execute(command: &Commands, store: &mut MemoryStore, json: bool) -> Result<ExitCode, Error> {
    match command {
        Commands::Add {
            text,
            path,
            source,
            line_start,
            line_end,
            excerpt,
            tags,
        } => handle_add(
            store,
            &AddContext {
                text,
                path,
                source,
                line_start: *line_start,
                line_end: *line_end,
                excerpt: excerpt.as_deref(),
                tags,
            },
            json,
        ),
        Commands::Search {
            query,
            min_confidence,
            limit,
            source,
        } => handle_search(
            store,
            &SearchContext {
                query,
                min_confidence: *min_confidence,
                limit: *limit,
                source: source.as_deref(),
            },
            json,
        ),
        Commands::Get { id } => handle_get(store, id, json),
        Commands::Conflicts => handle_conflicts(store, json),
        Commands::Version => handle_version(json),
    }
}

fn handle_add(store: &mut MemoryStore, opts: &AddContext, json: bool) -> Result<ExitCode, Error> {
    let mut new = NewMemory::new(opts.text, opts.path, opts.source).tags(opts.tags);
    if let Some(line_start) = opts.line_start {
        new = match opts.line_end {
            Some(line_end) => new.lines(line_start, line_end),
            None => new.line_start(line_start),
        };
    }
    if let Some(excerpt) = opts.excerpt {
        new = new.excerpt(excerpt);
    }

    let outcome = store.add(new)?;

    if json {
        print_json(&AddResponse {
            status: "added".to_string(),
            id: outcome.id,
            confidence: outcome.entry.confidence,
            citation: outcome.entry.citation,
            conflicts: outcome.conflicts.iter().map(ConflictItem::from).collect(),
        });
    } else {
        println!(
            "Added memory: {} (confidence: {:.4})",
            outcome.id, outcome.entry.confidence
        );
        if !outcome.conflicts.is_empty() {
            println!("Conflicts detected: {}", outcome.conflicts.len());
            for conflict in &outcome.conflicts {
                print_conflict(conflict);
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn handle_search(
    store: &mut MemoryStore,
    opts: &SearchContext,
    json: bool,
) -> Result<ExitCode, Error> {
    let limit = opts.limit.unwrap_or(store.config().max_results);
    let mut request = SearchRequest::new(opts.query)
        .min_confidence(opts.min_confidence)
        .max_results(limit);
    if let Some(source) = opts.source {
        request = request.source(source);
    }

    let response = store.search(&request)?;

    if json {
        print_json(&response);
    } else {
        if let Some(reason) = &response.fallback.reason {
            println!("Note: {}\n", reason);
        }
        for hit in &response.results {
            println!(
                "{} [score: {:.4}, confidence: {:.4}]\n  {}",
                hit.id, hit.combined_score, hit.entry.confidence, hit.entry.content
            );
            match &hit.entry.citation {
                Some(citation) => println!(
                    "  source: {}:{}-{}\n",
                    citation.path, citation.line_start, citation.line_end
                ),
                None => println!("  source: {}\n", hit.entry.path),
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn handle_get(store: &mut MemoryStore, id: &str, json: bool) -> Result<ExitCode, Error> {
    let entry = store
        .get(id)?
        .ok_or_else(|| Error::NotFound(id.to_string()))?;
    if json {
        print_json(&GetResponse {
            id: id.to_string(),
            entry,
        });
    } else {
        println!("ID: {}", id);
        println!("Content: {}", entry.content);
        println!("Source: {} ({})", entry.path, entry.source_type);
        println!("Confidence: {:.4}", entry.confidence);
        if let Some(citation) = &entry.citation {
            println!(
                "Citation: {}:{}-{} [{}]",
                citation.path, citation.line_start, citation.line_end, citation.version_hash
            );
        }
        if !entry.tags.is_empty() {
            println!("Tags: {}", entry.tags.join(", "));
        }
        println!("Created: {}", entry.created_at);
        println!("Accessed: {} ({} times)", entry.last_accessed, entry.access_count);
    }
    Ok(ExitCode::SUCCESS)
}

fn handle_conflicts(store: &MemoryStore, json: bool) -> Result<ExitCode, Error> {
    let conflicts = store.get_all_conflicts();
    if json {
        print_json(&ConflictsResponse {
            count: conflicts.len(),
            conflicts: conflicts.iter().map(ConflictItem::from).collect(),
        });
    } else if conflicts.is_empty() {
        println!("No conflicts found");
    } else {
        println!("Conflicts found: {}", conflicts.len());
        for conflict in &conflicts {
            print_conflict(conflict);
        }
    }
    Ok(ExitCode::SUCCESS)
}

pub fn handle_version(json: bool) -> Result<ExitCode, Error> {
    if json {
        print_json(&serde_json::json!({
            "version": env!("CARGO_PKG_VERSION"),
            "name": env!("CARGO_PKG_NAME")
        }));
    } else {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    }
    Ok(ExitCode::SUCCESS)
}
