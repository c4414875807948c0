use {
    tracing::info,
    anyhow::Result,
    reviewscope_core::pipeline::{Pipeline, TextAnalysis},
};

pub fn run_text_analysis_step(pipeline: &Pipeline, text: &str, keywords: usize) -> Result<()> {
    let analysis = analyze(pipeline, text, keywords);
    println!("{}", serde_json::to_string_pretty(&analysis)?);
    Ok(())
}

fn analyze(pipeline: &Pipeline, text: &str, keywords: usize) -> TextAnalysis {
    let analysis = pipeline.analyze_text(text, keywords);
    info!("sentiment: {} (compound score {:.3})", analysis.sentiment, analysis.score);
    if analysis.clean_text.is_empty() {
        info!("no content words left after cleaning");
    }
    analysis
}
