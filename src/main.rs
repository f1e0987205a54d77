// src/main.rs

use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};
use gnb_rs::synthetic::GaussianBlobs;
use gnb_rs::{Backend, DatasetLoader, GaussianNaiveBayes, NaiveBayesConfig};
use log::info;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum BackendArg {
    Sequential,
    Parallel,
}

impl From<BackendArg> for Backend {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Sequential => Backend::Sequential,
            BackendArg::Parallel => Backend::Parallel,
        }
    }
}

/// Train a Gaussian Naive Bayes model and report its accuracy.
#[derive(Parser, Debug)]
#[command(name = "gnb", version, long_about = None)]
struct Args {
    /// Training examples, one `label f0 f1 ...` line each
    #[arg(long, conflicts_with = "synthetic")]
    train: Option<PathBuf>,

    /// Generate this many synthetic training examples instead of reading a file
    #[arg(long)]
    synthetic: Option<usize>,

    /// Examples to classify (defaults to the training set)
    #[arg(long)]
    test: Option<PathBuf>,

    /// Read at most this many examples from each file
    #[arg(long)]
    limit: Option<usize>,

    /// TOML configuration file; command-line flags override it
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    classes: Option<usize>,

    #[arg(long)]
    features: Option<usize>,

    /// Variance regularizer
    #[arg(long)]
    epsilon: Option<f64>,

    /// Worker threads for the parallel backend
    #[arg(long)]
    threads: Option<usize>,

    #[arg(long, value_enum)]
    backend: Option<BackendArg>,

    /// Enable verbose logging
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_default_env()
        .filter_level(if args.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .init();

    let mut config = match &args.config {
        Some(path) => NaiveBayesConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => NaiveBayesConfig::default(),
    };
    if let Some(classes) = args.classes {
        config.num_classes = classes;
    }
    if let Some(features) = args.features {
        config.num_features = features;
    }
    if let Some(epsilon) = args.epsilon {
        config.epsilon = epsilon;
    }
    if let Some(threads) = args.threads {
        config.threads = Some(threads);
    }
    if let Some(backend) = args.backend {
        config.backend = backend.into();
    }
    config.validate().context("invalid configuration")?;

    let mut loader = DatasetLoader::new(config.num_classes, config.num_features);
    if let Some(limit) = args.limit {
        loader = loader.limit(limit);
    }

    let train = match (&args.train, args.synthetic) {
        (Some(path), _) => loader
            .load_file(path)
            .with_context(|| format!("reading training set {}", path.display()))?,
        (None, Some(n)) => GaussianBlobs::new(config.num_classes, config.num_features)
            .seed(0)
            .generate(n)?,
        (None, None) => bail!("either --train or --synthetic is required"),
    };
    info!("Loaded {} training examples", train.len());

    let mut nb = GaussianNaiveBayes::new(config)?;
    nb.train(&train).context("training failed")?;

    let evaluation = match &args.test {
        Some(path) => {
            let test = loader
                .load_file(path)
                .with_context(|| format!("reading test set {}", path.display()))?;
            nb.evaluate(&test)?
        }
        None => nb.evaluate(&train)?,
    };

    println!("{}", evaluation);
    Ok(())
}
