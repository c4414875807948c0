use {
    std::collections::BTreeMap,
    serde::{Serialize, Deserialize},
    anyhow::Result,
    crate::{
        resources::LanguageResources,
        normalizer::Normalizer,
        sentiment::{Sentiment, SentimentClassifier},
        topic_model::{Topic, TopicModel, TopicModeler},
        keywords::{top_keywords, KeywordCount},
        records::ReviewRecord,
    },
};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct RecordAnalysis {
    pub text: String,
    pub clean_text: String,
    pub sentiment: Sentiment,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct TextAnalysis {
    pub text: String,
    pub clean_text: String,
    pub sentiment: Sentiment,
    pub score: f64,
    pub keywords: Vec<KeywordCount>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct CorpusReport {
    pub total_reviews: usize,
    pub sentiment_counts: BTreeMap<Sentiment, usize>,
    pub topics: Vec<Topic>,
    pub coherence: Option<f64>,
    pub keywords: Vec<KeywordCount>,
    pub records: Vec<RecordAnalysis>,
    pub dominant_topics: Vec<Option<usize>>,
}

/// Normalizer and classifier bundled together. Every call depends only on
/// its arguments.
pub struct Pipeline {
    normalizer: Normalizer,
    classifier: SentimentClassifier,
}

impl Pipeline {
    pub fn new(normalizer: Normalizer, classifier: SentimentClassifier) -> Self {
        Self {
            normalizer,
            classifier,
        }
    }

    pub fn with_resources(resources: LanguageResources) -> Result<Self> {
        Ok(Self::new(Normalizer::new(resources), SentimentClassifier::bundled()?))
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    pub fn analyze_record(&self, text: &str) -> RecordAnalysis {
        self.analyze_field(Some(text))
    }

    /// A missing review field is analyzed as empty text.
    pub fn analyze_field(&self, text: Option<&str>) -> RecordAnalysis {
        RecordAnalysis {
            text: text.unwrap_or_default().to_owned(),
            clean_text: self.normalizer.normalize_field(text),
            // classified on the raw text
            sentiment: self.classifier.classify(text.unwrap_or_default()),
        }
    }

    pub fn analyze_text(&self, text: &str, keywords: usize) -> TextAnalysis {
        let clean_text = self.normalizer.normalize(text);
        let score = self.classifier.score(text);
        let keywords = top_keywords(&[clean_text.as_str()], keywords);

        TextAnalysis {
            text: text.to_owned(),
            keywords,
            clean_text,
            sentiment: self.classifier.label(score),
            score,
        }
    }

    pub fn analyze_records<F: FnMut(usize)>(&self, records: &[ReviewRecord], mut on_record: F) -> Vec<RecordAnalysis> {
        records.iter()
            .enumerate()
            .map(|(index, record)| {
                let analysis = self.analyze_field(record.text());
                on_record(index);
                analysis
            })
            .collect()
    }

    pub fn analyze_corpus(&self, records: &[ReviewRecord], modeler: &TopicModeler, keywords: usize) -> CorpusReport {
        let analyses = self.analyze_records(records, |_| {});
        let model = modeler.fit(&clean_texts(&analyses));
        corpus_report(analyses, &model, keywords)
    }
}

pub fn clean_texts(analyses: &[RecordAnalysis]) -> Vec<String> {
    analyses.iter().map(|v| v.clean_text.clone()).collect()
}

pub fn sentiment_counts(analyses: &[RecordAnalysis]) -> BTreeMap<Sentiment, usize> {
    let mut counts: BTreeMap<Sentiment, usize> = Sentiment::ALL.iter().map(|v| (*v, 0)).collect();
    for analysis in analyses {
        *counts.entry(analysis.sentiment).or_insert(0) += 1;
    }
    counts
}

pub fn corpus_report(analyses: Vec<RecordAnalysis>, model: &TopicModel, keywords: usize) -> CorpusReport {
    let documents = clean_texts(&analyses);

    CorpusReport {
        total_reviews: analyses.len(),
        sentiment_counts: sentiment_counts(&analyses),
        topics: model.topics.clone(),
        coherence: model.coherence,
        keywords: top_keywords(&documents, keywords),
        dominant_topics: (0..analyses.len()).map(|index| model.dominant_topic(index)).collect(),
        records: analyses,
    }
}

impl CorpusReport {
    pub fn count(&self, sentiment: Sentiment) -> usize {
        self.sentiment_counts.get(&sentiment).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::topic_model::TopicModelConfig,
    };

    fn pipeline() -> Pipeline {
        Pipeline::with_resources(LanguageResources::bundled().unwrap()).unwrap()
    }

    #[test]
    fn record_analysis_uses_raw_text_for_sentiment() {
        // "not" is a stopword, so the normalized text alone would read as positive
        let analysis = pipeline().analyze_record("Not good at all.");
        assert_eq!(analysis.clean_text, "good");
        assert_eq!(analysis.sentiment, Sentiment::Negative);
    }

    #[test]
    fn text_analysis_includes_keywords() {
        let analysis = pipeline().analyze_text("Great sound, great battery, poor case.", 2);
        assert_eq!(analysis.sentiment, Sentiment::Positive);
        assert_eq!(analysis.keywords[0].term, "great");
        assert_eq!(analysis.keywords[0].count, 2);
        assert_eq!(analysis.keywords.len(), 2);
    }

    #[test]
    fn sentiment_counts_include_zero_labels() {
        let pipeline = pipeline();
        let analyses = vec![pipeline.analyze_record("I love it"), pipeline.analyze_record("love love")];
        let counts = sentiment_counts(&analyses);
        assert_eq!(counts[&Sentiment::Positive], 2);
        assert_eq!(counts[&Sentiment::Negative], 0);
        assert_eq!(counts[&Sentiment::Neutral], 0);
    }

    #[test]
    fn corpus_with_empty_reviews() {
        let records = vec![
            ReviewRecord::new("".to_owned()),
            ReviewRecord::new("!!! 123".to_owned()),
            ReviewRecord::new("The screen is bright and the battery is excellent".to_owned()),
        ];
        let modeler = TopicModeler::new(TopicModelConfig::builder().num_topics(2).seed(1).build()).unwrap();

        let report = pipeline().analyze_corpus(&records, &modeler, 5);
        assert_eq!(report.total_reviews, 3);
        assert_eq!(report.records[0].clean_text, "");
        assert_eq!(report.count(Sentiment::Neutral), 2);
        assert_eq!(report.topics.len(), 2);
        assert_eq!(report.dominant_topics.len(), 3);
        assert!(report.keywords.iter().any(|v| v.term == "battery"));
    }

    #[test]
    fn missing_review_field_is_neutral_and_empty() {
        let analysis = pipeline().analyze_field(None);
        assert_eq!(analysis.text, "");
        assert_eq!(analysis.clean_text, "");
        assert_eq!(analysis.sentiment, Sentiment::Neutral);
    }

    #[test]
    fn short_csv_rows_flow_through_as_empty_reviews() {
        let records = crate::records::read_records("id,review\n1,Great phone\n2\n".as_bytes(), "review").unwrap();
        let analyses = pipeline().analyze_records(&records, |_| {});
        assert_eq!(analyses[0].sentiment, Sentiment::Positive);
        assert_eq!(analyses[1].clean_text, "");
        assert_eq!(analyses[1].sentiment, Sentiment::Neutral);
    }

    #[test]
    fn calls_do_not_depend_on_history() {
        let pipeline = pipeline();
        let first = pipeline.analyze_record("Terrible delivery");
        pipeline.analyze_record("Wonderful product, love it");
        assert_eq!(pipeline.analyze_record("Terrible delivery"), first);
    }
}
