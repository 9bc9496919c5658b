//! Developer CLI for the completion engine.
//!
//! Drives the library the way an editor host would: parse and inspect a
//! single script, ask for completions at a cursor, scan a project, or keep
//! a project's cache warm while watching it.

use anyhow::{Context, Result, bail};
use ccassist::completion::{NoticeBroadcaster, Suggestion};
use ccassist::declaration::{ClassDeclaration, MemberKind, match_declaration};
use ccassist::parsing::{documentation_for, parse_source};
use ccassist::{CompletionEngine, CreatorProjectDetector, EngineError, ScriptWatcher, Settings};
use clap::{
    Parser, Subcommand,
    builder::styling::{AnsiColor, Effects, Styles},
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{Level, info, warn};

fn clap_cargo_style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Green.on_default())
}

/// Completion engine for Cocos Creator component scripts
#[derive(Parser)]
#[command(
    name = "ccassist",
    version = env!("CARGO_PKG_VERSION"),
    about = "Completion engine for Cocos Creator component scripts",
    next_line_help = true,
    styles = clap_cargo_style()
)]
struct Cli {
    /// Path to custom settings.toml file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Project root (overrides config)
    #[arg(short, long, global = true)]
    root: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the class declaration and comments found in a script
    Inspect {
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List completions for a cursor position in a script
    #[command(
        after_help = "Examples:\n  ccassist complete assets/Player.js --line 12 --column 13\n  ccassist complete assets/Player.js --prefix '        this.'"
    )]
    Complete {
        file: PathBuf,

        /// 1-based line of the cursor
        #[arg(long, requires = "column", conflicts_with = "prefix")]
        line: Option<usize>,

        /// Characters before the cursor on that line
        #[arg(long, requires = "line")]
        column: Option<usize>,

        /// Text of the line up to the cursor
        #[arg(long)]
        prefix: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Parse every script under the project's assets directory
    Scan,

    /// Scan, then re-parse scripts as they change until interrupted
    Watch,

    /// Display active settings
    Config,
}

#[derive(Serialize)]
struct InspectReport<'a> {
    file: &'a Path,
    degenerate: bool,
    comments: usize,
    declaration: Option<DeclarationReport>,
}

#[derive(Serialize)]
struct DeclarationReport {
    name: Option<String>,
    extends: Option<String>,
    members: Vec<MemberReport>,
}

#[derive(Serialize)]
struct MemberReport {
    name: String,
    kind: &'static str,
    line: u32,
    documentation: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = match &cli.config {
        Some(path) => Settings::load_from(path)
            .map_err(EngineError::from)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => Settings::load().unwrap_or_else(|e| {
            let err = EngineError::from(e);
            eprintln!("{err}");
            for suggestion in err.recovery_suggestions() {
                eprintln!("  - {suggestion}");
            }
            eprintln!("Using default settings");
            Settings::default()
        }),
    };
    if let Some(root) = &cli.root {
        settings.project.root = Some(root.clone());
    }
    settings.debug |= cli.debug;

    tracing_subscriber::fmt()
        .with_max_level(if settings.debug {
            Level::DEBUG
        } else {
            Level::INFO
        })
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Inspect { file, json } => inspect(&settings, &file, json),
        Commands::Complete {
            file,
            line,
            column,
            prefix,
            json,
        } => {
            let content = std::fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let prefix = match (prefix, line, column) {
                (Some(prefix), _, _) => prefix,
                (None, Some(line), Some(column)) => line_prefix(&content, line, column)?,
                _ => bail!("either --prefix or --line and --column is required"),
            };

            let engine = engine(settings)?;
            engine.cache().on_file_touched(&file, &content);
            print_suggestions(&engine.provide(&file, &prefix), json)
        }
        Commands::Scan => {
            let engine = engine(settings)?;
            let summary = engine.scan_assets().await?;
            println!(
                "Parsed {} scripts ({} failed)",
                summary.parsed, summary.failed
            );
            Ok(())
        }
        Commands::Watch => watch(settings).await,
        Commands::Config => {
            println!("Current Configuration:");
            println!("{}", "=".repeat(50));
            println!("{}", toml::to_string_pretty(&settings)?);
            Ok(())
        }
    }
}

fn engine(settings: Settings) -> Result<CompletionEngine> {
    let root = match &settings.project.root {
        Some(root) => root.clone(),
        None => std::env::current_dir()?,
    };
    let detector = Arc::new(CreatorProjectDetector::new(root, &settings.project));

    let notices = NoticeBroadcaster::new(16);
    let mut rx = notices.subscribe();
    tokio::spawn(async move {
        while let Ok(notice) = rx.recv().await {
            eprintln!("{:?}: {}", notice.level, notice.message);
        }
    });

    Ok(CompletionEngine::new(
        Arc::new(settings),
        detector,
        Arc::new(notices),
    )?)
}

async fn watch(settings: Settings) -> Result<()> {
    let debounce_ms = settings.file_watch.debounce_ms;
    let watch_enabled = settings.file_watch.enabled;
    let scan_enabled = settings.scan.enabled;
    let engine = engine(settings)?;

    if scan_enabled {
        match engine.scan_assets().await {
            Ok(summary) => info!(
                "initial scan: {} parsed, {} failed",
                summary.parsed, summary.failed
            ),
            Err(e) => warn!("initial scan skipped: {e}"),
        }
    }
    if !watch_enabled {
        bail!("file watching is disabled in settings");
    }

    let (tx, rx) = mpsc::channel(100);
    let watcher = ScriptWatcher::new(engine.detector(), debounce_ms, tx)?;
    let watching = tokio::spawn(watcher.watch());

    tokio::select! {
        _ = engine.run(rx) => {}
        _ = tokio::signal::ctrl_c() => info!("interrupted"),
    }
    watching.abort();

    println!("{} scripts cached", engine.cache().len());
    Ok(())
}

fn inspect(settings: &Settings, file: &Path, json: bool) -> Result<()> {
    let content =
        std::fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;
    let parsed = parse_source(&content);
    let pattern = settings.factory.pattern();

    let declaration = match_declaration(&parsed.tree, &pattern)?
        .map(|decl| declaration_report(&decl, &parsed.comments));
    let report = InspectReport {
        file,
        degenerate: parsed.degenerate,
        comments: parsed.comments.len(),
        declaration,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}", report.file.display());
    if report.degenerate {
        println!("  (could not be parsed, treated as empty)");
    }
    println!("  comments: {}", report.comments);
    match &report.declaration {
        None => println!("  no {} declaration", pattern.display_name()),
        Some(decl) => {
            println!(
                "  class: {} extends {}",
                decl.name.as_deref().unwrap_or("<anonymous>"),
                decl.extends.as_deref().unwrap_or("-")
            );
            for member in &decl.members {
                println!(
                    "  {:<9} {:<24} line {:<5} {}",
                    member.kind, member.name, member.line, member.documentation
                );
            }
        }
    }
    Ok(())
}

fn declaration_report(
    decl: &ClassDeclaration<'_>,
    comments: &[ccassist::parsing::Comment],
) -> DeclarationReport {
    let members = decl
        .methods
        .iter()
        .chain(decl.properties.iter())
        .map(|member| MemberReport {
            name: member.name.clone(),
            kind: match member.kind {
                MemberKind::Method => "method",
                MemberKind::Property => "property",
            },
            line: member.declaration_line,
            documentation: documentation_for(comments, member.declaration_line, &member.name),
        })
        .collect();

    DeclarationReport {
        name: decl.name.clone(),
        extends: decl.extends.clone(),
        members,
    }
}

/// Text of `line` (1-based) up to `column` characters
fn line_prefix(content: &str, line: usize, column: usize) -> Result<String> {
    let text = content
        .lines()
        .nth(line.saturating_sub(1))
        .with_context(|| format!("line {line} is past the end of the file"))?;
    Ok(text.chars().take(column).collect())
}

fn print_suggestions(suggestions: &[Suggestion], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(suggestions)?);
        return Ok(());
    }

    if suggestions.is_empty() {
        println!("No completions");
        return Ok(());
    }
    for s in suggestions {
        let marker = if s.is_callable { "()" } else { "" };
        println!("{:<4} {}{marker:<3} {}", s.sort_key, s.name, s.documentation);
    }
    Ok(())
}
