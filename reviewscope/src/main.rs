mod analysis;
mod progress;
mod resources;
mod text_analysis;
mod utils;

use {
    std::path::PathBuf,
    clap::{Parser, Subcommand},
    tracing::info,
    anyhow::Result,
    reviewscope_core::{
        config::Config,
        pipeline::Pipeline,
        resources::LanguageResources,
    },
    crate::{
        analysis::{run_analysis_step, AnalysisOptions},
        text_analysis::run_text_analysis_step,
        resources::run_install_resources_step,
    },
};

#[derive(Parser)]
#[command(name = "reviewscope")]
#[command(about = "Sentiment, topic and keyword analysis for customer reviews", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file, defaults to ./config.toml or /config/config.toml
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a CSV file of reviews
    Analyze {
        /// CSV file with a header row
        #[arg(short, long)]
        input: PathBuf,

        /// Column holding the review text
        #[arg(long)]
        column: Option<String>,

        /// Number of topics (2-10)
        #[arg(short, long)]
        topics: Option<usize>,

        /// Number of keywords to report
        #[arg(short, long)]
        keywords: Option<usize>,

        /// Seed for a reproducible topic model
        #[arg(long)]
        seed: Option<u64>,

        /// Write the json report here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Analyze a single pasted review
    Text {
        text: String,

        #[arg(short, long)]
        keywords: Option<usize>,
    },

    /// Install the bundled language resources
    InstallResources {
        #[arg(short, long)]
        path: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    utils::init_logging();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    config.validate()?;

    if let Commands::InstallResources { path } = &cli.command {
        let path = path.clone().unwrap_or_else(|| config.resources().path());
        return run_install_resources_step(&path);
    }

    let resources_path = config.resources().path();
    let resources = LanguageResources::ensure_installed(&resources_path)?;
    info!(
        "loaded language resources from {} ({} stopwords, {} lemmas)",
        resources_path.display(),
        resources.total_stopwords(),
        resources.total_lemmas(),
    );
    let pipeline = Pipeline::with_resources(resources)?;

    match cli.command {
        Commands::Analyze { input, column, topics, keywords, seed, output } => {
            let options = AnalysisOptions::from_config(&config)
                .with_overrides(column, topics, keywords, seed, output)?;
            run_analysis_step(pipeline, &input, options).await
        },
        Commands::Text { text, keywords } => {
            run_text_analysis_step(&pipeline, &text, keywords.unwrap_or(config.analysis().keywords))
        },
        Commands::InstallResources { .. } => Ok(()),
    }
}
