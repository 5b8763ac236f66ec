//! tierlabel CLI
//!
//! Reads one document per line and prints the label table.
//!
//! ```text
//! tierlabel titles.txt --start 2 --end 8 --step 2 --format json
//! tierlabel - --config run.toml < titles.txt
//! ```

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tierlabel::cluster::DepthClusterer;
use tierlabel::collab::{HashingEmbedder, RegexCleaner};
use tierlabel::select::{LastWord, StaticTaxonomy};
use tierlabel::{Cascade, DepthSchedule, Refiner, RunConfig};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

/// Multi-resolution document labelling
#[derive(Parser)]
#[command(name = "tierlabel")]
#[command(version)]
#[command(about = "Cluster documents at increasing depth and label every cluster")]
struct Cli {
    /// Input file, one document per line (`-` for stdin)
    input: PathBuf,

    /// TOML run configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// First depth (overrides the configuration)
    #[arg(long)]
    start: Option<usize>,

    /// Last depth, inclusive (overrides the configuration)
    #[arg(long)]
    end: Option<usize>,

    /// Depth increment (overrides the configuration)
    #[arg(long)]
    step: Option<usize>,

    /// Taxonomy file for the hypernym stage (overrides the configuration)
    #[arg(long)]
    taxonomy: Option<PathBuf>,

    /// Reduce each cleaned document to its head word before the first depth
    #[arg(long)]
    head_word: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Tsv)]
    format: Format,

    /// Verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Tsv,
    Json,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut config = match &cli.config {
        Some(path) => RunConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => RunConfig::default(),
    };
    config.depths = DepthSchedule::new(
        cli.start.unwrap_or(config.depths.start),
        cli.end.unwrap_or(config.depths.end),
        cli.step.unwrap_or(config.depths.step),
    );
    if cli.taxonomy.is_some() {
        config.taxonomy = cli.taxonomy.clone();
    }
    if cli.head_word {
        config.cleaner.head_word = true;
    }
    config.validate()?;

    let documents = read_documents(&cli.input)?;
    info!(documents = documents.len(), "read input");

    let mut cascade = Cascade::new(config.thresholds)?.with_chargrams(config.chargrams)?;
    if let Some(path) = &config.taxonomy {
        let taxonomy = StaticTaxonomy::load(path)
            .with_context(|| format!("loading taxonomy {}", path.display()))?;
        info!(synsets = taxonomy.len(), "loaded taxonomy");
        cascade = cascade.with_taxonomy(Arc::new(taxonomy), Arc::new(LastWord));
    }

    let cleaner = RegexCleaner::from_config(&config.cleaner)?;
    let embedder = HashingEmbedder::from_config(&config.embedding)?;
    let clusterer = DepthClusterer::from_config(&config.cluster);

    let table = Refiner::new(cascade, config.depths, &embedder, &clusterer)?
        .with_normalizer(&cleaner)
        .run(&documents)?;

    match cli.format {
        Format::Tsv => print!("{}", table.to_tsv()),
        Format::Json => println!("{}", table.to_json()?),
    }
    Ok(())
}

/// One document per line. Blank lines are kept so row `i` of the table is
/// line `i` of the input.
fn read_documents(input: &Path) -> anyhow::Result<Vec<String>> {
    let text = if input.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        text
    } else {
        std::fs::read_to_string(input).with_context(|| format!("reading {}", input.display()))?
    };
    Ok(split_documents(&text))
}

fn split_documents(text: &str) -> Vec<String> {
    text.lines().map(|line| line.trim_end().to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_lines_keep_their_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docs.txt");
        std::fs::write(&path, "red shoes\n\nblue shoes  \n").unwrap();

        let docs = read_documents(&path).unwrap();
        assert_eq!(docs, vec!["red shoes", "", "blue shoes"]);
    }

    #[test]
    fn test_crlf_input() {
        assert_eq!(split_documents("a\r\n\r\nb"), vec!["a", "", "b"]);
    }

    #[test]
    fn test_head_word_flag() {
        let cli = Cli::try_parse_from(["tierlabel", "docs.txt", "--head-word"]).unwrap();
        assert!(cli.head_word);
        let cli = Cli::try_parse_from(["tierlabel", "docs.txt"]).unwrap();
        assert!(!cli.head_word);
    }
}
