use {
    std::collections::HashMap,
    serde::{Serialize, Deserialize},
};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct KeywordCount {
    pub term: String,
    pub count: usize,
}

/// Top `limit` terms across normalized documents by descending count.
/// Ties keep the order in which terms first appear in the corpus.
pub fn top_keywords<S: AsRef<str>>(documents: &[S], limit: usize) -> Vec<KeywordCount> {
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    let mut seen = 0;

    for document in documents {
        for token in document.as_ref().split_whitespace() {
            let entry = counts.entry(token).or_insert_with(|| {
                seen += 1;
                (0, seen)
            });
            entry.0 += 1;
        }
    }

    let mut counts: Vec<(&str, usize, usize)> = counts.into_iter()
        .map(|(term, (count, first_seen))| (term, count, first_seen))
        .collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

    counts.into_iter()
        .take(limit)
        .map(|(term, count, _)| KeywordCount {
            term: term.to_owned(),
            count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(keywords: &[KeywordCount]) -> Vec<(&str, usize)> {
        keywords.iter().map(|v| (v.term.as_str(), v.count)).collect()
    }

    #[test]
    fn most_frequent_term_first() {
        let keywords = top_keywords(&["good good bad"], 1);
        assert_eq!(pairs(&keywords), vec![("good", 2)]);
    }

    #[test]
    fn ties_keep_first_occurrence_order() {
        let documents = vec!["price delivery", "", "battery price delivery battery"];
        let keywords = top_keywords(&documents, 10);
        assert_eq!(pairs(&keywords), vec![("price", 2), ("delivery", 2), ("battery", 2)]);
    }

    #[test]
    fn empty_documents_contribute_nothing() {
        assert!(top_keywords(&["", "  "], 5).is_empty());
        assert!(top_keywords::<&str>(&[], 5).is_empty());
    }

    #[test]
    fn limit_truncates() {
        let keywords = top_keywords(&["a b c d e a"], 3);
        assert_eq!(pairs(&keywords), vec![("a", 2), ("b", 1), ("c", 1)]);
    }

    #[test]
    fn output_is_deterministic() {
        let documents = vec!["zeta alpha mu", "mu alpha", "omega"];
        assert_eq!(top_keywords(&documents, 10), top_keywords(&documents, 10));
    }
}
