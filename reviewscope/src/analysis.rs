use {
    std::{fs, path::{Path, PathBuf}, time::{Duration, Instant}},
    tracing::{info, warn},
    indicatif::ProgressBar,
    anyhow::{anyhow, Context, Result},
    reviewscope_core::{
        config::{validate_topics, Config},
        pipeline::{clean_texts, corpus_report, CorpusReport, Pipeline},
        records::read_records_from_path,
        sentiment::Sentiment,
        topic_model::{TopicModelConfig, TopicModeler},
    },
    crate::progress::Progress,
};

pub struct AnalysisOptions {
    text_column: String,
    topic_model: TopicModelConfig,
    keywords: usize,
    preview_records: usize,
    timeout: Duration,
    output: Option<PathBuf>,
}

impl AnalysisOptions {
    pub fn from_config(config: &Config) -> Self {
        let topic_model = config.topic_model();

        Self {
            text_column: config.input().text_column,
            topic_model: TopicModelConfig::from_settings(&topic_model),
            keywords: config.analysis().keywords,
            preview_records: config.analysis().preview_records,
            timeout: Duration::from_secs(topic_model.timeout_secs),
            output: None,
        }
    }

    pub fn with_overrides(
        mut self,
        column: Option<String>,
        topics: Option<usize>,
        keywords: Option<usize>,
        seed: Option<u64>,
        output: Option<PathBuf>,
    ) -> Result<Self> {
        if let Some(column) = column {
            self.text_column = column;
        }
        if let Some(topics) = topics {
            validate_topics(topics)?;
            self.topic_model = self.topic_model.with_num_topics(topics);
        }
        if let Some(keywords) = keywords {
            if keywords == 0 {
                return Err(anyhow!("number of keywords must be positive"));
            }
            self.keywords = keywords;
        }
        if let Some(seed) = seed {
            self.topic_model = self.topic_model.with_seed(seed);
        }
        self.output = output;
        Ok(self)
    }
}

pub async fn run_analysis_step(pipeline: Pipeline, input: &Path, options: AnalysisOptions) -> Result<()> {
    let records = read_records_from_path(input, &options.text_column)?;
    info!("loaded {} reviews from {}", records.len(), input.display());

    let pb = ProgressBar::new(records.len() as u64);
    let mut progress = Progress::new("analyzing reviews", records.len());
    let analyses = pipeline.analyze_records(&records, |_| {
        pb.inc(1);
        progress.update();
    });
    pb.finish_and_clear();
    progress.finish();

    let modeler = TopicModeler::new(options.topic_model.clone())?;
    let documents = clean_texts(&analyses);
    let empty_documents = documents.iter().filter(|v| v.is_empty()).count();
    if empty_documents > 0 {
        warn!("{} reviews have no content words left after cleaning", empty_documents);
    }

    info!("fitting {} topics", modeler.config().num_topics());
    let deadline = Instant::now() + options.timeout;
    let model = tokio::task::spawn_blocking(move || modeler.fit_with_deadline(&documents, Some(deadline)))
        .await
        .context("topic model task failed")?;

    let report = corpus_report(analyses, &model, options.keywords);
    log_summary(&report, options.preview_records);
    write_report(&report, options.output.as_deref())
}

fn log_summary(report: &CorpusReport, preview_records: usize) {
    info!("total reviews: {}", report.total_reviews);
    for sentiment in Sentiment::ALL {
        info!("{} reviews: {}", sentiment, report.count(sentiment));
    }

    match report.coherence {
        Some(coherence) => info!("coherence score: {:.4}", coherence),
        None => info!("coherence score: n/a (topics have too few terms)"),
    }
    for topic in &report.topics {
        info!("topic {}: {}", topic.id, topic);
    }

    let keywords: Vec<String> = report.keywords.iter()
        .map(|v| format!("{} ({})", v.term, v.count))
        .collect();
    info!("top keywords: {}", keywords.join(", "));

    for record in report.records.iter().take(preview_records) {
        info!("[{}] {}", record.sentiment, record.text);
    }
}

fn write_report(report: &CorpusReport, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;

    match output {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("failed to write report to {}", path.display()))?;
            info!("report written to {}", path.display());
        },
        None => println!("{}", json),
    }

    Ok(())
}
