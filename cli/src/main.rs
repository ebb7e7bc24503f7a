//! outliner CLI - heading outlines and related sections

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use outliner::{
    Analyzer, HeadingLevel, JsonCorpus, Outliner, RelatedSectionMatch, Section, TierPreference,
};

#[derive(Parser)]
#[command(name = "outliner")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Extract heading outlines and find related sections across documents", long_about = None)]
struct Cli {
    #[command(flatten)]
    engine: EngineArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct EngineArgs {
    /// Similarity tier to start from
    #[arg(long, value_enum, default_value = "auto", global = true)]
    tier: Tier,

    /// Sentence encoder model id or directory
    #[arg(long, env = "OUTLINER_EMBEDDING_MODEL", global = true)]
    model: Option<String>,

    /// Relevance threshold for related sections
    #[arg(long, global = true)]
    threshold: Option<f32>,
}

#[derive(Args)]
struct CorpusArgs {
    /// Directory of processed document records
    #[arg(long, env = "OUTLINER_CORPUS_DIR", default_value = "processed", value_name = "DIR")]
    corpus: PathBuf,

    /// Output JSON instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the outline of a document
    Outline {
        /// Input document (.pdf or .json layout dump)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Skip section content
        #[arg(long)]
        titles_only: bool,

        /// Show every scored heading candidate instead of the outline
        #[arg(long)]
        candidates: bool,

        /// Output JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Extract documents and store them in the corpus
    Ingest {
        /// Input documents
        #[arg(value_name = "FILE", required = true)]
        inputs: Vec<PathBuf>,

        #[command(flatten)]
        corpus: CorpusArgs,
    },

    /// Find sections related to a stored document, or to an unsaved file
    Related {
        /// Stored document name (e.g. report.pdf)
        #[arg(value_name = "DOCUMENT", required_unless_present = "file")]
        document: Option<String>,

        /// Extract this file without storing it and rank its sections
        #[arg(long, value_name = "FILE", conflicts_with = "document")]
        file: Option<PathBuf>,

        #[command(flatten)]
        corpus: CorpusArgs,
    },

    /// Find sections related to a piece of text
    Query {
        /// Query text
        #[arg(value_name = "TEXT")]
        text: String,

        #[command(flatten)]
        corpus: CorpusArgs,
    },

    /// List stored documents
    Documents {
        #[command(flatten)]
        corpus: CorpusArgs,
    },

    /// Print the stored sections of a document
    Sections {
        /// Stored document name
        #[arg(value_name = "DOCUMENT")]
        document: String,

        #[command(flatten)]
        corpus: CorpusArgs,
    },

    /// Show version information
    Version,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Tier {
    /// Embeddings when available, otherwise TF-IDF
    Auto,
    /// Sentence embeddings
    Embedding,
    /// TF-IDF over unigrams and bigrams
    Tfidf,
    /// Word overlap
    Overlap,
}

impl From<Tier> for TierPreference {
    fn from(tier: Tier) -> Self {
        match tier {
            Tier::Auto => TierPreference::Auto,
            Tier::Embedding => TierPreference::Embedding,
            Tier::Tfidf => TierPreference::TfIdf,
            Tier::Overlap => TierPreference::Overlap,
        }
    }
}

type CliResult = Result<(), Box<dyn std::error::Error>>;

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Outline {
            input,
            titles_only,
            candidates,
            json,
        }) => {
            if candidates {
                cmd_candidates(&input, json)
            } else {
                cmd_outline(&input, titles_only, json)
            }
        }
        Some(Commands::Ingest { inputs, corpus }) => cmd_ingest(&inputs, &corpus),
        Some(Commands::Related {
            document,
            file,
            corpus,
        }) => match (document, file) {
            (_, Some(path)) => cmd_related_file(&cli.engine, &path, &corpus),
            (Some(document), None) => cmd_related(&cli.engine, &document, &corpus),
            (None, None) => Err("a stored document name or --file is required".into()),
        },
        Some(Commands::Query { text, corpus }) => cmd_query(&cli.engine, &text, &corpus),
        Some(Commands::Documents { corpus }) => cmd_documents(&corpus),
        Some(Commands::Sections { document, corpus }) => cmd_sections(&document, &corpus),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            println!("{}", "Usage: outliner <COMMAND>".yellow());
            println!("       outliner --help for more information");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn build_analyzer(engine: &EngineArgs) -> Analyzer {
    let mut builder = Outliner::new().with_tier(engine.tier.into());
    if let Some(model) = &engine.model {
        builder = builder.with_embedding_model(model.clone());
    }
    if let Some(threshold) = engine.threshold {
        builder = builder.with_threshold(threshold);
    }
    builder.build()
}

fn cmd_outline(input: &Path, titles_only: bool, json: bool) -> CliResult {
    // Overlap tier: no model is loaded just to print an outline
    let analyzer = Outliner::new().with_tier(TierPreference::Overlap);
    let analyzer = if titles_only { analyzer.titles_only() } else { analyzer }.build();

    let sections = analyzer.extractor().try_extract(input)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&sections)?);
        return Ok(());
    }

    println!("{} {}", "Outline of".cyan().bold(), input.display());
    println!("{}", "─".repeat(40).dimmed());
    print_sections(&sections, !titles_only);
    println!("\n{} {} sections", "Done!".green().bold(), sections.len());
    Ok(())
}

fn cmd_candidates(input: &Path, json: bool) -> CliResult {
    let extractor = outliner::SectionExtractor::new();
    let candidates = extractor.candidates(input)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&candidates)?);
        return Ok(());
    }

    for c in &candidates {
        let level = c.level.map(|l| l.to_string()).unwrap_or_else(|| "--".to_string());
        println!(
            "{} {:>4} {:>5.1}pt p{} {}",
            level.cyan(),
            c.score,
            c.font_size,
            c.page,
            c.text
        );
    }
    println!("\n{} {} candidates", "Done!".green().bold(), candidates.len());
    Ok(())
}

fn cmd_ingest(inputs: &[PathBuf], args: &CorpusArgs) -> CliResult {
    // Ingesting only extracts; skip loading an encoder
    let analyzer = Outliner::new().with_tier(TierPreference::Overlap).build();
    let corpus = JsonCorpus::create(&args.corpus)?;

    let pb = ProgressBar::new(inputs.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let mut records = Vec::new();
    let mut failures = 0;
    for input in inputs {
        pb.set_message(input.display().to_string());
        match analyzer.ingest(input, &corpus) {
            Ok(record) => records.push(record),
            Err(e) => {
                failures += 1;
                log::warn!("Ingest failed for {}: {}", input.display(), e);
                pb.println(format!("{} {}: {}", "Skipped".yellow(), input.display(), e));
            }
        }
        pb.inc(1);
    }
    pb.finish_with_message("Done!");
    log::info!("Stored {} of {} documents in {}", records.len(), inputs.len(), args.corpus.display());

    if args.json {
        let summary: Vec<_> = records
            .iter()
            .map(|r| {
                serde_json::json!({
                    "filename": r.filename,
                    "sections_count": r.sections.len(),
                    "status": "processed",
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("\n{}", "Stored documents:".green().bold());
        for (i, record) in records.iter().enumerate() {
            let branch = if i + 1 == records.len() { "└─" } else { "├─" };
            println!(
                "  {} {} ({} sections)",
                branch.dimmed(),
                record.filename,
                record.sections.len()
            );
        }
    }

    if failures > 0 {
        return Err(format!("{} of {} documents failed", failures, inputs.len()).into());
    }
    Ok(())
}

fn cmd_related(engine: &EngineArgs, document: &str, args: &CorpusArgs) -> CliResult {
    let corpus = JsonCorpus::new(&args.corpus);
    let analyzer = build_analyzer(engine);
    let matches = analyzer.related_document(document, &corpus)?;

    if args.json {
        let out = serde_json::json!({
            "current_document": document,
            "related_sections": matches,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("{} {}", "Related to".cyan().bold(), document);
        print_matches(&matches);
    }
    Ok(())
}

fn cmd_related_file(engine: &EngineArgs, input: &Path, args: &CorpusArgs) -> CliResult {
    let corpus = JsonCorpus::new(&args.corpus);
    let analyzer = build_analyzer(engine);
    let sections = analyzer.extractor().try_extract(input)?;
    log::debug!("Ranking {} sections of unsaved {}", sections.len(), input.display());
    let matches = analyzer.ranker().try_rank_sections(&sections, &corpus)?;

    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| input.display().to_string());

    if args.json {
        let out = serde_json::json!({
            "current_document": name,
            "sections": sections,
            "related_sections": matches,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("{} {}", "Related to".cyan().bold(), name);
        print_matches(&matches);
    }
    Ok(())
}

fn cmd_query(engine: &EngineArgs, text: &str, args: &CorpusArgs) -> CliResult {
    if text.trim().is_empty() {
        return Err("query text is empty".into());
    }
    let corpus = JsonCorpus::new(&args.corpus);
    let analyzer = build_analyzer(engine);
    let matches = analyzer.ranker().try_rank_text(text, &corpus)?;

    if args.json {
        let out = serde_json::json!({ "related_sections": matches });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("{} \"{}\"", "Related to".cyan().bold(), text);
        print_matches(&matches);
    }
    Ok(())
}

fn cmd_documents(args: &CorpusArgs) -> CliResult {
    let corpus = JsonCorpus::new(&args.corpus);
    let summaries = corpus.summaries()?;

    if args.json {
        let out = serde_json::json!({ "documents": summaries });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("{}", "Documents".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    for summary in &summaries {
        let uploaded = summary
            .uploaded_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        println!(
            "{}  {} sections  {}",
            summary.filename.bold(),
            summary.sections_count,
            uploaded.dimmed()
        );
    }
    Ok(())
}

fn cmd_sections(document: &str, args: &CorpusArgs) -> CliResult {
    let corpus = JsonCorpus::new(&args.corpus);
    let record = corpus.load(document)?;

    if args.json {
        let out = serde_json::json!({ "sections": record.sections });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        print_sections(&record.sections, false);
    }
    Ok(())
}

fn print_sections(sections: &[Section], with_content: bool) {
    for section in sections {
        let indent = "  ".repeat(section.level.number() as usize - 1);
        let label = match section.level {
            HeadingLevel::H1 => section.level.to_string().green().bold(),
            HeadingLevel::H2 => section.level.to_string().green(),
            _ => section.level.to_string().normal(),
        };
        println!(
            "{}{} {} {}",
            indent,
            label,
            section.title,
            format!("(p{})", section.page).dimmed()
        );
        if with_content && !section.content.is_empty() {
            let preview: String = section.content.chars().take(120).collect();
            println!("{}   {}", indent, preview.replace('\n', " ").dimmed());
        }
    }
}

fn print_matches(matches: &[RelatedSectionMatch]) {
    println!("{}", "─".repeat(40).dimmed());
    if matches.is_empty() {
        println!("{}", "No related sections found".yellow());
        return;
    }
    for m in matches {
        println!(
            "{} {} {} {}",
            format!("{:.2}", m.similarity_score).cyan(),
            m.section_title.bold(),
            "in".dimmed(),
            format!("{} (p{})", m.source_document, m.page)
        );
        println!("     {}", m.relevance_explanation.dimmed());
        if !m.snippet.is_empty() {
            println!("     {}", m.snippet);
        }
    }
}

fn cmd_version() {
    println!("{} {}", "outliner".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Heading outline extraction and related-section search");
    println!();
    println!("Repository: {}", "https://github.com/iyulab/outliner".dimmed());
    println!("License: MIT");
}
