use {
    std::{collections::HashMap, fmt, time::Instant},
    tracing::{debug, warn},
    serde::{Serialize, Deserialize},
    typed_builder::TypedBuilder,
    ndarray::{Array1, Array2},
    rand::{Rng, SeedableRng},
    rand_xoshiro::Xoshiro256PlusPlus,
    anyhow::{anyhow, Result},
    crate::{
        config::{validate_topics, TopicModelSettings},
        coherence::{topic_coherence, CoherenceMeasure, CooccurrenceIndex},
    },
};

#[derive(TypedBuilder, Clone, Debug)]
pub struct TopicModelConfig {
    #[builder(default = 5)]
    num_topics: usize,
    #[builder(default = 200)]
    iterations: usize,
    // defaults to 1/K
    #[builder(default, setter(strip_option))]
    alpha: Option<f64>,
    #[builder(default = 0.01)]
    beta: f64,
    #[builder(default = 10)]
    top_terms: usize,
    #[builder(default, setter(strip_option))]
    seed: Option<u64>,
    #[builder(default)]
    coherence: CoherenceMeasure,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TopicTerm {
    pub term: String,
    pub weight: f64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Topic {
    pub id: usize,
    pub terms: Vec<TopicTerm>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct TopicModel {
    pub topics: Vec<Topic>,
    /// `None` when no topic has at least two terms to compare.
    pub coherence: Option<f64>,
    pub coherence_measure: CoherenceMeasure,
    pub vocabulary_size: usize,
    /// Completed Gibbs sweeps, fewer than configured when a deadline cut the fit short.
    pub iterations: usize,
    pub document_topics: Vec<Vec<f64>>,
}

pub struct TopicModeler {
    config: TopicModelConfig,
}

impl TopicModelConfig {
    pub fn from_settings(settings: &TopicModelSettings) -> Self {
        Self {
            num_topics: settings.topics,
            iterations: settings.iterations,
            alpha: settings.alpha(),
            beta: settings.beta,
            top_terms: settings.top_terms,
            seed: settings.seed(),
            coherence: settings.coherence,
        }
    }

    pub fn num_topics(&self) -> usize {
        self.num_topics
    }

    pub fn with_num_topics(mut self, num_topics: usize) -> Self {
        self.num_topics = num_topics;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn alpha(&self) -> f64 {
        self.alpha.unwrap_or(1.0 / self.num_topics as f64)
    }
}

impl Default for TopicModelConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl TopicModeler {
    pub fn new(config: TopicModelConfig) -> Result<Self> {
        validate_topics(config.num_topics)?;
        if config.iterations == 0 {
            return Err(anyhow!("topic model needs at least one iteration"));
        }
        if !(config.beta > 0.0) || !(config.alpha() > 0.0) {
            return Err(anyhow!("topic model priors must be positive (alpha = {}, beta = {})", config.alpha(), config.beta));
        }
        if config.top_terms == 0 {
            return Err(anyhow!("topic model needs at least one term per topic"));
        }

        Ok(Self {
            config,
        })
    }

    pub fn config(&self) -> &TopicModelConfig {
        &self.config
    }

    /// Fits LDA with collapsed Gibbs sampling over whitespace separated
    /// normalized documents. Degenerate corpora (one document, only empty
    /// documents, fewer terms than topics) still yield `num_topics` topics.
    pub fn fit<S: AsRef<str>>(&self, documents: &[S]) -> TopicModel {
        self.fit_with_deadline(documents, None)
    }

    /// Same as `fit`, but stops sampling once `deadline` has passed and
    /// reports topics from the sweeps completed so far.
    pub fn fit_with_deadline<S: AsRef<str>>(&self, documents: &[S], deadline: Option<Instant>) -> TopicModel {
        let k = self.config.num_topics;
        let alpha = self.config.alpha();
        let beta = self.config.beta;

        let tokenized: Vec<Vec<&str>> = documents.iter()
            .map(|document| document.as_ref().split_whitespace().collect())
            .collect();

        let mut vocabulary: Vec<&str> = Vec::new();
        let mut term_ids: HashMap<&str, usize> = HashMap::new();
        let mut corpus: Vec<Vec<usize>> = Vec::with_capacity(tokenized.len());
        for document in &tokenized {
            let mut terms = Vec::with_capacity(document.len());
            for &term in document {
                let id = match term_ids.get(term) {
                    Some(id) => *id,
                    None => {
                        vocabulary.push(term);
                        term_ids.insert(term, vocabulary.len() - 1);
                        vocabulary.len() - 1
                    },
                };
                terms.push(id);
            }
            corpus.push(terms);
        }

        let v = vocabulary.len();
        let d = corpus.len();

        if v == 0 {
            debug!("topic model corpus has no terms, returning empty topics");
            return TopicModel {
                topics: (0..k).map(|id| Topic { id, terms: Vec::new() }).collect(),
                coherence: None,
                coherence_measure: self.config.coherence,
                vocabulary_size: 0,
                iterations: 0,
                document_topics: vec![vec![1.0 / k as f64; k]; d],
            };
        }

        let mut rng = match self.config.seed {
            Some(seed) => Xoshiro256PlusPlus::seed_from_u64(seed),
            None => Xoshiro256PlusPlus::from_entropy(),
        };

        let mut doc_topic: Array2<u32> = Array2::zeros((d, k));
        let mut topic_term: Array2<u32> = Array2::zeros((k, v));
        let mut topic_totals: Array1<u32> = Array1::zeros(k);

        let mut assignments: Vec<Vec<usize>> = Vec::with_capacity(d);
        for (doc, terms) in corpus.iter().enumerate() {
            let mut topics = Vec::with_capacity(terms.len());
            for &term in terms {
                let topic = rng.gen_range(0..k);
                doc_topic[[doc, topic]] += 1;
                topic_term[[topic, term]] += 1;
                topic_totals[topic] += 1;
                topics.push(topic);
            }
            assignments.push(topics);
        }

        let v_beta = v as f64 * beta;
        let mut weights = vec![0.0; k];

        let mut completed_iterations = 0;
        for _ in 0..self.config.iterations {
            if deadline.map(|v| Instant::now() >= v).unwrap_or(false) {
                warn!("topic model stopped after {} of {} iterations: deadline reached", completed_iterations, self.config.iterations);
                break;
            }

            for (doc, terms) in corpus.iter().enumerate() {
                for (position, &term) in terms.iter().enumerate() {
                    let old_topic = assignments[doc][position];
                    doc_topic[[doc, old_topic]] -= 1;
                    topic_term[[old_topic, term]] -= 1;
                    topic_totals[old_topic] -= 1;

                    let mut total = 0.0;
                    for topic in 0..k {
                        let weight = (doc_topic[[doc, topic]] as f64 + alpha)
                            * (topic_term[[topic, term]] as f64 + beta)
                            / (topic_totals[topic] as f64 + v_beta);
                        total += weight;
                        weights[topic] = total;
                    }

                    let target = rng.gen::<f64>() * total;
                    let new_topic = weights.iter().position(|&cumulative| target < cumulative).unwrap_or(k - 1);

                    doc_topic[[doc, new_topic]] += 1;
                    topic_term[[new_topic, term]] += 1;
                    topic_totals[new_topic] += 1;
                    assignments[doc][position] = new_topic;
                }
            }
            completed_iterations += 1;
        }

        let top_terms = self.config.top_terms.min(v);
        let topics: Vec<Topic> = (0..k)
            .map(|topic| {
                let denominator = topic_totals[topic] as f64 + v_beta;
                let mut ranked: Vec<(usize, f64)> = (0..v)
                    .map(|term| (term, (topic_term[[topic, term]] as f64 + beta) / denominator))
                    .collect();
                ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

                Topic {
                    id: topic,
                    terms: ranked.into_iter()
                        .take(top_terms)
                        .map(|(term, weight)| TopicTerm {
                            term: vocabulary[term].to_owned(),
                            weight,
                        })
                        .collect(),
                }
            })
            .collect();

        let document_topics: Vec<Vec<f64>> = corpus.iter()
            .enumerate()
            .map(|(doc, terms)| {
                let denominator = terms.len() as f64 + k as f64 * alpha;
                (0..k).map(|topic| (doc_topic[[doc, topic]] as f64 + alpha) / denominator).collect()
            })
            .collect();

        let index = CooccurrenceIndex::new(&tokenized);
        let topic_terms: Vec<Vec<&str>> = topics.iter()
            .map(|topic| topic.terms.iter().map(|v| v.term.as_str()).collect())
            .collect();
        let coherence = topic_coherence(self.config.coherence, &topic_terms, &index);

        TopicModel {
            topics,
            coherence,
            coherence_measure: self.config.coherence,
            vocabulary_size: v,
            iterations: completed_iterations,
            document_topics,
        }
    }
}

impl TopicModel {
    pub fn dominant_topic(&self, document: usize) -> Option<usize> {
        self.document_topics.get(document)?
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1).then(b.0.cmp(&a.0)))
            .map(|(topic, _)| topic)
    }
}

impl Topic {
    pub fn term_names(&self) -> Vec<&str> {
        self.terms.iter().map(|v| v.term.as_str()).collect()
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.terms.iter()
            .map(|v| format!("{:.3}*\"{}\"", v.weight, v.term))
            .collect();
        write!(f, "{}", rendered.join(" + "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn modeler(num_topics: usize) -> TopicModeler {
        TopicModeler::new(TopicModelConfig::builder().num_topics(num_topics).seed(7).build()).unwrap()
    }

    #[test]
    fn single_document_corpus() {
        let model = modeler(2).fit(&["good product"]);
        assert_eq!(model.topics.len(), 2);
        for topic in &model.topics {
            assert_eq!(topic.terms.len(), 2);
        }
        assert!(model.coherence.unwrap().is_finite());
        assert_eq!(model.document_topics.len(), 1);
    }

    #[test]
    fn empty_documents_give_empty_topics() {
        let model = modeler(3).fit(&["", "", ""]);
        assert_eq!(model.topics.len(), 3);
        assert!(model.topics.iter().all(|topic| topic.terms.is_empty()));
        assert_eq!(model.coherence, None);
        assert_eq!(model.vocabulary_size, 0);
        assert!((model.document_topics[0].iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn fewer_terms_than_topics() {
        let model = modeler(5).fit(&["good"]);
        assert_eq!(model.topics.len(), 5);
        assert!(model.topics.iter().all(|topic| topic.term_names() == vec!["good"]));
        assert_eq!(model.coherence, None);
    }

    #[test]
    fn topic_count_is_bounded() {
        assert!(TopicModeler::new(TopicModelConfig::builder().num_topics(1).build()).is_err());
        assert!(TopicModeler::new(TopicModelConfig::builder().num_topics(11).build()).is_err());
        assert!(TopicModeler::new(TopicModelConfig::builder().num_topics(10).build()).is_ok());
    }

    #[test]
    fn seeded_fit_is_reproducible() {
        let documents = vec![
            "battery charge phone",
            "screen bright phone",
            "delivery late courier",
            "courier box damage",
        ];
        let first = modeler(2).fit(&documents);
        let second = modeler(2).fit(&documents);
        assert_eq!(first.topics, second.topics);
        assert_eq!(first.document_topics, second.document_topics);
    }

    #[test]
    fn separates_distinct_themes() {
        let mut documents = Vec::new();
        for _ in 0..10 {
            documents.push("battery charge power battery charge");
            documents.push("delivery late courier delivery late");
        }

        let model = modeler(2).fit(&documents);
        let battery_topic = model.dominant_topic(0).unwrap();
        let delivery_topic = model.dominant_topic(1).unwrap();
        assert_ne!(battery_topic, delivery_topic);

        let battery_terms = model.topics[battery_topic].term_names();
        assert!(battery_terms[..3].contains(&"battery"));
        assert!(battery_terms[..3].contains(&"charge"));
        assert!(!battery_terms[..3].contains(&"delivery"));
    }

    #[test]
    fn expired_deadline_still_returns_topics() {
        let model = modeler(3).fit_with_deadline(&["price value", "screen price"], Some(Instant::now()));
        assert_eq!(model.iterations, 0);
        assert_eq!(model.topics.len(), 3);
        assert!(model.topics.iter().all(|topic| topic.terms.len() == 3));
    }

    #[test]
    fn runs_configured_iterations_without_deadline() {
        let modeler = TopicModeler::new(TopicModelConfig::builder().num_topics(2).iterations(15).seed(3).build()).unwrap();
        assert_eq!(modeler.fit(&["price value"]).iterations, 15);
    }

    #[test]
    fn terms_are_ranked_and_distributions_sum_to_one() {
        let model = modeler(3).fit(&["price value price", "screen price", "value screen screen"]);
        for topic in &model.topics {
            assert!(topic.terms.windows(2).all(|pair| pair[0].weight >= pair[1].weight));
        }
        for distribution in &model.document_topics {
            assert!((distribution.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn topic_renders_like_weighted_sum() {
        let topic = Topic {
            id: 0,
            terms: vec![
                TopicTerm { term: "price".to_owned(), weight: 0.5 },
                TopicTerm { term: "value".to_owned(), weight: 0.25 },
            ],
        };
        assert_eq!(topic.to_string(), "0.500*\"price\" + 0.250*\"value\"");
    }
}
