use {
    std::collections::{HashMap, HashSet},
    serde::{Serialize, Deserialize},
};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CoherenceMeasure {
    UMass,
    Npmi,
}

impl Default for CoherenceMeasure {
    fn default() -> Self {
        CoherenceMeasure::Npmi
    }
}

/// Document co-occurrence statistics over a tokenized corpus.
pub struct CooccurrenceIndex<'a> {
    total_documents: usize,
    documents_by_term: HashMap<&'a str, HashSet<usize>>,
}

impl<'a> CooccurrenceIndex<'a> {
    pub fn new(documents: &[Vec<&'a str>]) -> Self {
        let mut documents_by_term: HashMap<&'a str, HashSet<usize>> = HashMap::new();
        for (index, document) in documents.iter().enumerate() {
            for term in document {
                documents_by_term.entry(*term).or_default().insert(index);
            }
        }

        Self {
            total_documents: documents.len(),
            documents_by_term,
        }
    }

    pub fn document_frequency(&self, term: &str) -> usize {
        self.documents_by_term.get(term).map(|v| v.len()).unwrap_or(0)
    }

    pub fn joint_frequency(&self, a: &str, b: &str) -> usize {
        match (self.documents_by_term.get(a), self.documents_by_term.get(b)) {
            (Some(a), Some(b)) => a.intersection(b).count(),
            _ => 0,
        }
    }

    fn umass(&self, wi: &str, wj: &str) -> f64 {
        let dj = self.document_frequency(wj);
        if dj == 0 {
            return 0.0;
        }
        ((self.joint_frequency(wi, wj) as f64 + 1.0) / dj as f64).ln()
    }

    fn npmi(&self, wi: &str, wj: &str) -> f64 {
        if self.total_documents == 0 {
            return 0.0;
        }

        let n = self.total_documents as f64;
        let p_ij = self.joint_frequency(wi, wj) as f64 / n;
        if p_ij == 0.0 {
            return -1.0;
        }
        if p_ij >= 1.0 {
            return 1.0;
        }

        let p_i = self.document_frequency(wi) as f64 / n;
        let p_j = self.document_frequency(wj) as f64 / n;
        let pmi = (p_ij / (p_i * p_j)).ln();
        pmi / -p_ij.ln()
    }
}

/// Mean over topics of the average pairwise score of each topic's ranked terms.
/// Topics with fewer than two terms are skipped; `None` when none remain.
pub fn topic_coherence(measure: CoherenceMeasure, topics: &[Vec<&str>], index: &CooccurrenceIndex) -> Option<f64> {
    let scores: Vec<f64> = topics.iter()
        .filter(|terms| terms.len() >= 2)
        .map(|terms| {
            let mut total = 0.0;
            let mut pairs = 0;
            for i in 1..terms.len() {
                for j in 0..i {
                    total += match measure {
                        CoherenceMeasure::UMass => index.umass(terms[i], terms[j]),
                        CoherenceMeasure::Npmi => index.npmi(terms[i], terms[j]),
                    };
                    pairs += 1;
                }
            }
            total / pairs as f64
        })
        .collect();

    if scores.is_empty() {
        None
    } else {
        Some(scores.iter().sum::<f64>() / scores.len() as f64)
    }
}
