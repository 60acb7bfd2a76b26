use clap::{Parser, Subcommand};
use nu_plugin_keyphrase::algo::dataset::{self, DatasetEntry};
use nu_plugin_keyphrase::algo::rerank::{AssignmentMode, ReRankingMode};
use nu_plugin_keyphrase::algo::tagger::TaggingType;
use nu_plugin_keyphrase::config::Config;
use nu_plugin_keyphrase::ops;
use serde_json::Value;
use std::io::{self, Read};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "keyphrase",
    version,
    about = "Controlled tagging and keyphrase extraction engine"
)]
struct Cli {
    /// Start as an MCP (Model Context Protocol) server on stdio.
    /// AI assistants (Claude Desktop, Cursor, etc.) connect via JSON-RPC.
    #[cfg(feature = "mcp")]
    #[arg(long, exclusive = true)]
    mcp: bool,

    /// Config file (default: $KEYPHRASE_CONFIG, then ~/.config/keyphrase/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Where training or evaluation data comes from.
#[derive(clap::Args)]
struct DataArgs {
    /// Dataset file with one `text#tag1#tag2` line per document.
    /// If omitted, JSON records are read from stdin
    #[arg(short, long)]
    dataset: Option<PathBuf>,
    /// JSON field containing text (stdin records)
    #[arg(short, long, default_value = "content")]
    field: String,
    /// JSON field containing the assigned tags (stdin records)
    #[arg(long, default_value = "tags")]
    tags_field: String,
    /// Maximum number of documents to read
    #[arg(long)]
    limit: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a controlled tagger from tagged documents
    #[command(name = "train-tagger")]
    TrainTagger {
        #[command(flatten)]
        data: DataArgs,
        /// Model file to write (or model name with --store)
        #[arg(short, long)]
        output: String,
        /// SQLite model store
        #[arg(long)]
        store: Option<String>,
        /// Tagging type: threshold, fixed-count
        #[arg(long)]
        tagging_type: Option<String>,
        /// Correlation re-ranking: none, shallow, deep
        #[arg(long)]
        correlation: Option<String>,
        /// Minimum tag weight (threshold tagging)
        #[arg(long)]
        threshold: Option<f64>,
        /// Tags per document (fixed-count tagging)
        #[arg(short = 'n', long)]
        count: Option<usize>,
        /// Popularity boost weight; negative disables
        #[arg(long, allow_negative_numbers = true)]
        prior_weight: Option<f64>,
        /// Longest word sequence matched against the vocabulary
        #[arg(long)]
        phrase_length: Option<usize>,
    },
    /// Train a keyphrase extractor from documents with assigned keyphrases
    #[command(name = "train-extractor")]
    TrainExtractor {
        #[command(flatten)]
        data: DataArgs,
        /// Model file to write (or model name with --store)
        #[arg(short, long)]
        output: String,
        /// SQLite model store
        #[arg(long)]
        store: Option<String>,
        /// Assignment mode: fixed-count, threshold, combined
        #[arg(long)]
        assignment: Option<String>,
        /// Correlation re-ranking: none, shallow, deep
        #[arg(long)]
        reranking: Option<String>,
        /// Keyphrases per document
        #[arg(short = 'n', long)]
        count: Option<usize>,
        /// Minimum keyphrase weight
        #[arg(long)]
        threshold: Option<f64>,
        /// Only assign keyphrases seen in training
        #[arg(long)]
        controlled: bool,
        /// Shortest candidate phrase in words
        #[arg(long)]
        min_length: Option<usize>,
        /// Longest candidate phrase in words
        #[arg(long)]
        max_length: Option<usize>,
    },
    /// Tag JSON records with a trained tagger
    Tag {
        /// Tagger model file (or model name with --store)
        #[arg(short, long)]
        model: String,
        /// SQLite model store
        #[arg(long)]
        store: Option<String>,
        /// JSON field containing text
        #[arg(short, long, default_value = "content")]
        field: String,
        /// Assign exactly this many tags
        #[arg(short = 'n', long)]
        count: Option<usize>,
    },
    /// Extract keyphrases from JSON records with a trained extractor
    Extract {
        /// Extractor model file (or model name with --store)
        #[arg(short, long)]
        model: String,
        /// SQLite model store
        #[arg(long)]
        store: Option<String>,
        /// JSON field containing text
        #[arg(short, long, default_value = "content")]
        field: String,
        /// Assign exactly this many keyphrases
        #[arg(short = 'n', long)]
        count: Option<usize>,
    },
    /// Train on part of a dataset and report precision and recall on the rest
    Evaluate {
        #[command(flatten)]
        data: DataArgs,
        /// Model kind: tagger, extractor
        #[arg(short, long, default_value = "tagger")]
        kind: String,
        /// Separate test dataset; if omitted, the data is split
        #[arg(long)]
        test: Option<PathBuf>,
        /// Train share when splitting
        #[arg(long)]
        ratio: Option<f64>,
        /// Random seed for the split
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Stem phrases (arguments, or one phrase per stdin line)
    Stem {
        phrases: Vec<String>,
    },
    /// Find collocations (frequent multi-word phrases) in JSON records
    Collocations {
        /// JSON field containing text
        #[arg(short, long, default_value = "content")]
        field: String,
        /// Shortest collocation in words
        #[arg(long, default_value_t = 2)]
        min: usize,
        /// Longest collocation in words
        #[arg(long, default_value_t = 5)]
        max: usize,
    },
    /// List or remove models in a model store
    Models {
        /// SQLite model store
        #[arg(long)]
        store: Option<String>,
        /// Remove the model with this name
        #[arg(long)]
        remove: Option<String>,
        /// Restrict removal to one kind: tagger, extractor
        #[arg(long)]
        kind: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    // ── MCP server mode ─────────────────────────────────────────────────
    #[cfg(feature = "mcp")]
    if cli.mcp {
        init_tracing("warn");
        let rt = tokio::runtime::Runtime::new().expect("failed to create tokio runtime");
        rt.block_on(async {
            if let Err(e) = nu_plugin_keyphrase::mcp::serve_stdio().await {
                eprintln!("MCP server error: {e}");
                std::process::exit(1);
            }
        });
        return;
    }

    let (config, config_path) = Config::load(cli.config.as_deref()).unwrap_or_else(|e| {
        eprintln!("{e}");
        std::process::exit(1);
    });
    init_tracing(&config.log_level);
    if let Some(path) = &config_path {
        tracing::debug!(path = %path.display(), "loaded config");
    }

    // ── Normal subcommand dispatch ──────────────────────────────────────
    let command = cli.command.unwrap_or_else(|| {
        eprintln!("No subcommand provided. Run `keyphrase --help` for usage.");
        std::process::exit(1);
    });

    match command {
        Commands::TrainTagger {
            data,
            output,
            store,
            tagging_type,
            correlation,
            threshold,
            count,
            prior_weight,
            phrase_length,
        } => {
            let mut settings = config.tagger.clone();
            if let Some(t) = tagging_type {
                settings.tagging_type = TaggingType::from_str(&t)
                    .unwrap_or_else(|| fail(format!("Unknown tagging type '{t}'. Use: threshold, fixed-count")));
            }
            if let Some(c) = correlation {
                settings.correlation = parse_reranking(&c);
            }
            if let Some(t) = threshold {
                settings.tfidf_threshold = t;
            }
            if let Some(n) = count {
                settings.tag_count = n;
            }
            if let Some(w) = prior_weight {
                settings.prior_weight = w;
            }
            if let Some(n) = phrase_length {
                settings.phrase_length = n;
            }
            let entries = read_entries(&data);
            let store = resolve_store(store, &config);
            print_json(ops::op_train_tagger(&entries, settings, &output, store.as_deref()));
        }
        Commands::TrainExtractor {
            data,
            output,
            store,
            assignment,
            reranking,
            count,
            threshold,
            controlled,
            min_length,
            max_length,
        } => {
            let mut settings = config.extractor.clone();
            if let Some(a) = assignment {
                settings.assignment_mode = AssignmentMode::from_str(&a).unwrap_or_else(|| {
                    fail(format!("Unknown assignment mode '{a}'. Use: fixed-count, threshold, combined"))
                });
            }
            if let Some(r) = reranking {
                settings.reranking_mode = parse_reranking(&r);
            }
            if let Some(n) = count {
                settings.keyphrase_count = n;
            }
            if let Some(t) = threshold {
                settings.threshold = t;
            }
            if controlled {
                settings.controlled_mode = true;
            }
            if let Some(n) = min_length {
                settings.min_phrase_length = n;
            }
            if let Some(n) = max_length {
                settings.max_phrase_length = n;
            }
            let entries = read_entries(&data);
            let store = resolve_store(store, &config);
            print_json(ops::op_train_extractor(&entries, settings, &output, store.as_deref()));
        }
        Commands::Tag {
            model,
            store,
            field,
            count,
        } => {
            let rows = read_stdin_json();
            let store = resolve_store(store, &config);
            print_json(ops::op_tag(&rows, &field, &model, store.as_deref(), count));
        }
        Commands::Extract {
            model,
            store,
            field,
            count,
        } => {
            let rows = read_stdin_json();
            let store = resolve_store(store, &config);
            print_json(ops::op_extract(&rows, &field, &model, store.as_deref(), count));
        }
        Commands::Evaluate {
            data,
            kind,
            test,
            ratio,
            seed,
        } => {
            let entries = read_entries(&data);
            let (train, test) = match test {
                Some(path) => {
                    let test = dataset::read_dataset(&path, data.limit).unwrap_or_else(|e| fail(e));
                    (entries, test)
                }
                None => dataset::split(
                    &entries,
                    ratio.unwrap_or(config.train_ratio),
                    seed.unwrap_or(config.seed),
                ),
            };
            print_json(ops::op_evaluate(
                &train,
                &test,
                &kind,
                config.tagger.clone(),
                config.extractor.clone(),
            ));
        }
        Commands::Stem { phrases } => {
            let phrases = if phrases.is_empty() {
                let mut buf = String::new();
                io::stdin()
                    .read_to_string(&mut buf)
                    .unwrap_or_else(|e| fail(format!("Failed to read stdin: {e}")));
                buf.lines()
                    .map(str::trim)
                    .filter(|l| !l.is_empty())
                    .map(str::to_string)
                    .collect()
            } else {
                phrases
            };
            print_json(Ok(ops::op_stem(&phrases)));
        }
        Commands::Collocations { field, min, max } => {
            let rows = read_stdin_json();
            print_json(ops::op_collocations(&rows, &field, min, max));
        }
        Commands::Models {
            store,
            remove,
            kind,
        } => {
            let store = resolve_store(store, &config)
                .unwrap_or_else(|| fail("No model store given. Use --store or set store_path in the config"));
            match remove {
                Some(name) => print_json(ops::op_model_remove(&store, &name, kind.as_deref())),
                None => print_json(ops::op_models(&store)),
            }
        }
    }
}

/// Log to stderr; `RUST_LOG` overrides the configured level.
fn init_tracing(default_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .init();
}

fn fail(msg: impl std::fmt::Display) -> ! {
    eprintln!("{msg}");
    std::process::exit(1);
}

fn print_json(result: Result<Value, String>) {
    match result {
        Ok(output) => match serde_json::to_string_pretty(&output) {
            Ok(json) => println!("{json}"),
            Err(e) => fail(format!("Failed to serialize output: {e}")),
        },
        Err(e) => fail(e),
    }
}

fn parse_reranking(s: &str) -> ReRankingMode {
    ReRankingMode::from_str(s)
        .unwrap_or_else(|| fail(format!("Unknown re-ranking mode '{s}'. Use: none, shallow, deep")))
}

fn resolve_store(flag: Option<String>, config: &Config) -> Option<String> {
    flag.or_else(|| {
        config
            .store_path
            .as_ref()
            .map(|p| p.to_string_lossy().into_owned())
    })
}

fn read_stdin_json() -> Vec<Value> {
    let mut buf = String::new();
    io::stdin()
        .read_to_string(&mut buf)
        .unwrap_or_else(|e| fail(format!("Failed to read stdin: {e}")));
    let parsed: Value =
        serde_json::from_str(&buf).unwrap_or_else(|e| fail(format!("Invalid JSON on stdin: {e}")));
    match parsed {
        Value::Array(arr) => arr,
        single => vec![single],
    }
}

fn read_entries(data: &DataArgs) -> Vec<DatasetEntry> {
    match &data.dataset {
        Some(path) => dataset::read_dataset(path, data.limit).unwrap_or_else(|e| fail(e)),
        None => {
            let rows = read_stdin_json();
            let mut entries = ops::entries_from_rows(&rows, &data.field, &data.tags_field);
            if let Some(limit) = data.limit {
                entries.truncate(limit);
            }
            entries
        }
    }
}
