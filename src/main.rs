use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use carx::config::Settings;
use carx::document::{id_from_path, Document};
use carx::records::CarReport;
use carx::{db, Pipeline};

#[derive(Parser)]
#[command(name = "carx", about = "Corrective Action Report extraction and clause mapping")]
struct Cli {
    /// SQLite database path (overrides CARX_DB_PATH)
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    /// Clause taxonomy JSON (overrides CARX_TAXONOMY_PATH)
    #[arg(long, global = true)]
    taxonomy: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database schema
    Init,
    /// Extract one page dump and print the report as JSON
    Extract {
        file: PathBuf,
        /// Document id (default: file stem)
        #[arg(long)]
        id: Option<String>,
        /// Also store the report in the database
        #[arg(long)]
        save: bool,
        /// Skip clause classification of Section C
        #[arg(long)]
        no_classify: bool,
    },
    /// Extract every *.json page dump in a directory and store the reports
    Batch {
        dir: PathBuf,
        /// Max files to process (default: all)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
        /// Skip clause classification of Section C
        #[arg(long)]
        no_classify: bool,
    },
    /// Map one statement to a clause
    Classify { text: String },
    /// Show stored report statistics
    Stats,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let mut settings = Settings::load().context("loading settings")?;
    if let Some(db) = cli.db {
        settings.db_path = db;
    }
    if let Some(taxonomy) = cli.taxonomy {
        settings.taxonomy_path = taxonomy;
    }

    let result = match cli.command {
        Commands::Init => {
            let conn = db::connect(&settings.db_path)?;
            db::init_schema(&conn)?;
            println!("Schema ready at {}", settings.db_path.display());
            Ok(())
        }
        Commands::Extract { file, id, save, no_classify } => {
            let pipeline = build_pipeline(&settings, !no_classify)?;
            let doc = Document::load(&file)?;
            let id = id.unwrap_or_else(|| id_from_path(&file));
            let report = pipeline.run(&doc, &id);
            println!("{}", serde_json::to_string_pretty(&report)?);
            if save {
                let conn = db::connect(&settings.db_path)?;
                db::init_schema(&conn)?;
                db::save_report(&conn, &report)?;
                info!(document_id = %id, "report saved");
            }
            Ok(())
        }
        Commands::Batch { dir, limit, no_classify } => {
            let files = list_dumps(&dir, limit)?;
            if files.is_empty() {
                println!("No *.json page dumps in {}.", dir.display());
                return Ok(());
            }
            let pipeline = build_pipeline(&settings, !no_classify)?;
            let conn = db::connect(&settings.db_path)?;
            db::init_schema(&conn)?;
            println!("Processing {} page dumps...", files.len());
            let counts = process_files(&conn, &pipeline, &files)?;
            counts.print();
            Ok(())
        }
        Commands::Classify { text } => {
            let classifier = settings.build_classifier()?;
            let result = classifier.classify(&text);
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
        Commands::Stats => {
            let conn = db::connect(&settings.db_path)?;
            db::init_schema(&conn)?;
            let s = db::get_stats(&conn)?;
            println!("Reports:    {}", s.reports);
            println!("Total cost: {:.2} MYR", s.total_cost);
            for (table, n) in &s.sections {
                println!("{:<11} {}", format!("{table}:"), n);
            }
            if !s.clauses.is_empty() {
                println!("\n--- Top clauses ---");
                for (clause, n) in &s.clauses {
                    println!("  {clause:<8} {n}");
                }
            }
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn build_pipeline(settings: &Settings, classify: bool) -> Result<Pipeline> {
    if !classify {
        return Ok(Pipeline::default());
    }
    let classifier = settings
        .build_classifier()
        .with_context(|| format!("loading taxonomy {}", settings.taxonomy_path.display()))?;
    Ok(Pipeline::new(Some(Arc::new(classifier))))
}

fn list_dumps(dir: &Path, limit: Option<usize>) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("reading {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();
    if let Some(n) = limit {
        files.truncate(n);
    }
    Ok(files)
}

struct ProcessCounts {
    reports: usize,
    failed: usize,
    answers: usize,
    total_cost: f64,
}

impl ProcessCounts {
    fn print(&self) {
        println!(
            "Saved {} reports ({} failed), {} causal answers, {:.2} MYR total cost.",
            self.reports, self.failed, self.answers, self.total_cost,
        );
    }
}

fn process_files(
    conn: &rusqlite::Connection,
    pipeline: &Pipeline,
    files: &[PathBuf],
) -> Result<ProcessCounts> {
    use indicatif::{ProgressBar, ProgressStyle};
    use rayon::prelude::*;

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")?
            .progress_chars("#>-"),
    );

    let mut counts = ProcessCounts {
        reports: 0,
        failed: 0,
        answers: 0,
        total_cost: 0.0,
    };

    for chunk in files.chunks(500) {
        let results: Vec<(&PathBuf, Result<CarReport>)> = chunk
            .par_iter()
            .map(|path| {
                let report = Document::load(path).map(|doc| pipeline.run(&doc, &id_from_path(path)));
                (path, report)
            })
            .collect();

        for (path, result) in results {
            match result {
                Ok(report) => {
                    db::save_report(conn, &report)?;
                    counts.reports += 1;
                    counts.answers += report.section_c.len();
                    counts.total_cost += report.summary().total_cost;
                }
                Err(e) => {
                    counts.failed += 1;
                    warn!(path = %path.display(), error = %e, "skipping page dump");
                }
            }
        }
        pb.inc(chunk.len() as u64);
    }

    pb.finish_and_clear();
    Ok(counts)
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
