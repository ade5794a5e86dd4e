//! Enki CLI
//!
//! CLI tool for compiling wildcard patterns into dynamic rules and running
//! the rule synchronizer against JSON files.

mod store;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use log::{info, warn};

use enki_compiler::{build_rule_set, parse_pattern_list};
use enki_core::{Matcher, PatternEdit, SettingsKey};
use enki_sync::{SettingsChange, SettingsStore, StorageArea, SyncReport, Synchronizer, Triggers};

use crate::store::{JsonFileRuleTable, JsonFileStore};

#[derive(Parser)]
#[command(name = "enki")]
#[command(about = "Enki URL blocklist compiler and rule synchronizer")]
struct Cli {
    /// Settings file (JSON object of storage keys)
    #[arg(short, long, global = true, default_value = "settings.json")]
    settings: PathBuf,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile stored patterns into dynamic rules
    Compile {
        /// Output rules file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check which URLs the content-side matcher would redirect
    Check {
        /// URLs to test
        #[arg(required = true)]
        urls: Vec<String>,
    },

    /// List stored patterns
    List,

    /// Add a pattern
    Add {
        pattern: String,

        /// Rule table to resynchronize after the change
        #[arg(short, long)]
        rules: Option<PathBuf>,
    },

    /// Remove the pattern at a list position
    Remove {
        index: usize,

        /// Rule table to resynchronize after the change
        #[arg(short, long)]
        rules: Option<PathBuf>,
    },

    /// Append patterns from a text file, one per line
    Import {
        #[arg(short, long)]
        input: PathBuf,

        /// Rule table to resynchronize after the change
        #[arg(short, long)]
        rules: Option<PathBuf>,
    },

    /// Run one synchronization cycle for a host event
    Sync {
        /// Rule table file (JSON array of dynamic rules)
        #[arg(short, long, default_value = "rules.json")]
        rules: PathBuf,

        #[arg(short, long, value_enum, default_value_t = TriggerArg::Startup)]
        trigger: TriggerArg,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum TriggerArg {
    Install,
    Startup,
    Changed,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = tokio::runtime::Runtime::new()
        .map_err(|e| format!("Failed to start tokio runtime: {}", e))
        .and_then(|runtime| runtime.block_on(run(cli)));

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

async fn run(cli: Cli) -> Result<(), String> {
    let store = Arc::new(JsonFileStore::new(&cli.settings));

    match cli.command {
        Commands::Compile { output } => cmd_compile(store.as_ref(), output).await,
        Commands::Check { urls } => cmd_check(store.as_ref(), &urls).await,
        Commands::List => cmd_list(store.as_ref()).await,
        Commands::Add { pattern, rules } => cmd_add(store, &pattern, rules).await,
        Commands::Remove { index, rules } => cmd_remove(store, index, rules).await,
        Commands::Import { input, rules } => cmd_import(store, &input, rules).await,
        Commands::Sync { rules, trigger } => cmd_sync(store, rules, trigger).await,
    }
}

async fn cmd_compile(store: &JsonFileStore, output: Option<PathBuf>) -> Result<(), String> {
    let settings = store.load().await.map_err(|e| e.to_string())?;
    let build = build_rule_set(&settings.patterns);

    let json = serde_json::to_string_pretty(&build.rules)
        .map_err(|e| format!("Failed to serialize rules: {}", e))?;

    match output {
        Some(path) => {
            tokio::fs::write(&path, json)
                .await
                .map_err(|e| format!("Failed to write '{}': {}", path.display(), e))?;
            println!("Compiled {} patterns to '{}'", settings.patterns.len(), path.display());
            println!(
                "  Rules:    {} -> {} (dedupe removed {}, id collisions {})",
                build.stats.before, build.stats.after, build.stats.deduped, build.stats.collisions
            );
        }
        None => println!("{}", json),
    }

    Ok(())
}

async fn cmd_check(store: &JsonFileStore, urls: &[String]) -> Result<(), String> {
    let settings = store.load().await.map_err(|e| e.to_string())?;
    let matcher = Matcher::from_settings(&settings);

    for url in urls {
        match matcher.matching_pattern(url) {
            Some(pattern) => println!("REDIRECT  {}  ({})", url, pattern),
            None => println!("ALLOW     {}", url),
        }
    }

    Ok(())
}

async fn cmd_list(store: &JsonFileStore) -> Result<(), String> {
    let settings = store.load().await.map_err(|e| e.to_string())?;
    if settings.patterns.is_empty() {
        println!("No patterns yet.");
    }
    for (index, pattern) in settings.patterns.iter().enumerate() {
        println!("  [{}] {}", index, pattern);
    }
    Ok(())
}

async fn cmd_add(store: Arc<JsonFileStore>, input: &str, rules: Option<PathBuf>) -> Result<(), String> {
    let mut settings = store.load().await.map_err(|e| e.to_string())?;
    match settings.add_pattern(input) {
        PatternEdit::Added(pattern) => {
            store
                .save_keys(&settings, &[SettingsKey::Patterns])
                .await
                .map_err(|e| e.to_string())?;
            println!("Added '{}'", pattern);
            patterns_changed(store, rules).await
        }
        PatternEdit::Duplicate(pattern) => {
            println!("'{}' is already in the list", pattern);
            Ok(())
        }
        PatternEdit::Ignored => Err("Pattern is empty".to_string()),
    }
}

async fn cmd_remove(store: Arc<JsonFileStore>, index: usize, rules: Option<PathBuf>) -> Result<(), String> {
    let mut settings = store.load().await.map_err(|e| e.to_string())?;
    let removed = settings.remove_pattern_at(index).ok_or_else(|| {
        format!("No pattern at index {} ({} stored)", index, settings.patterns.len())
    })?;
    store
        .save_keys(&settings, &[SettingsKey::Patterns])
        .await
        .map_err(|e| e.to_string())?;
    println!("Removed '{}'", removed);
    patterns_changed(store, rules).await
}

async fn cmd_import(store: Arc<JsonFileStore>, input: &Path, rules: Option<PathBuf>) -> Result<(), String> {
    let text = tokio::fs::read_to_string(input)
        .await
        .map_err(|e| format!("Failed to read '{}': {}", input.display(), e))?;

    let mut settings = store.load().await.map_err(|e| e.to_string())?;
    let mut added = 0usize;
    for pattern in parse_pattern_list(&text) {
        if let PatternEdit::Added(_) = settings.add_pattern(&pattern) {
            added += 1;
        }
    }

    if added == 0 {
        println!("Nothing new to import from '{}'", input.display());
        return Ok(());
    }

    store
        .save_keys(&settings, &[SettingsKey::Patterns])
        .await
        .map_err(|e| e.to_string())?;
    println!("Imported {} patterns from '{}'", added, input.display());
    patterns_changed(store, rules).await
}

/// Deliver the change notification the host would send after a write.
async fn patterns_changed(store: Arc<JsonFileStore>, rules: Option<PathBuf>) -> Result<(), String> {
    let Some(rules) = rules else {
        return Ok(());
    };

    let triggers = triggers_for(store, rules);
    let change = SettingsChange {
        area: StorageArea::Sync,
        keys: vec![SettingsKey::Patterns],
    };
    match triggers.on_settings_changed(&change).await {
        Some(result) => report(result),
        None => Ok(()),
    }
}

async fn cmd_sync(store: Arc<JsonFileStore>, rules: PathBuf, trigger: TriggerArg) -> Result<(), String> {
    let triggers = triggers_for(store, rules);
    let result = match trigger {
        TriggerArg::Install => triggers.on_installed().await,
        TriggerArg::Startup => triggers.on_startup().await,
        TriggerArg::Changed => {
            let change = SettingsChange {
                area: StorageArea::Sync,
                keys: vec![SettingsKey::Patterns],
            };
            match triggers.on_settings_changed(&change).await {
                Some(result) => result,
                None => return Ok(()),
            }
        }
    };
    report(result)
}

fn triggers_for(store: Arc<JsonFileStore>, rules: PathBuf) -> Triggers {
    let table = Arc::new(JsonFileRuleTable::new(rules));
    Triggers::new(Arc::new(Synchronizer::new(store, table)))
}

fn report(result: Result<SyncReport, enki_sync::SyncError>) -> Result<(), String> {
    match result {
        Ok(report) => {
            info!(
                "Synchronized {} patterns ({} rules removed, {} added)",
                report.patterns.len(),
                report.removed_rule_ids.len(),
                report.added_rule_ids.len()
            );
            if report.skipped_patterns > 0 {
                warn!("{} stored patterns were skipped", report.skipped_patterns);
            }
            Ok(())
        }
        Err(e) => Err(e.to_string()),
    }
}
