use {
    once_cell::sync::Lazy,
    regex::Regex,
    crate::resources::LanguageResources,
};

static NON_LETTERS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z\s]").expect("valid pattern"));

/// Turns raw review text into a space-joined sequence of lemmas.
pub struct Normalizer {
    resources: LanguageResources,
}

impl Normalizer {
    pub fn new(resources: LanguageResources) -> Self {
        Self {
            resources,
        }
    }

    pub fn normalize(&self, text: &str) -> String {
        self.tokens(text).join(" ")
    }

    /// Missing fields (empty CSV cells, absent values) normalize to an empty document.
    pub fn normalize_field(&self, text: Option<&str>) -> String {
        text.map(|v| self.normalize(v)).unwrap_or_default()
    }

    pub fn tokens(&self, text: &str) -> Vec<String> {
        let lowercase = text.to_lowercase();
        let letters_only = NON_LETTERS.replace_all(&lowercase, "");

        letters_only.split_whitespace()
            .filter(|token| !self.resources.is_stopword(token))
            .map(|token| self.lemmatize(token))
            .filter(|lemma| !self.resources.is_stopword(lemma))
            .collect()
    }

    pub fn lemmatize(&self, token: &str) -> String {
        if let Some(lemma) = self.resources.lemma_entry(token) {
            return lemma.to_owned();
        }

        match strip_plural(token) {
            Some(stem) => self.resources.lemma_entry(&stem).map(|v| v.to_owned()).unwrap_or(stem),
            None => token.to_owned(),
        }
    }
}

// tokens are ascii here, so byte slicing is safe
fn strip_plural(token: &str) -> Option<String> {
    let len = token.len();

    if len > 4 && token.ends_with("ies") {
        Some(format!("{}y", &token[..len - 3]))
    } else if token.ends_with("sses") {
        Some(token[..len - 2].to_owned())
    } else if len >= 4
        && token.ends_with('s')
        && !["ss", "us", "is"].iter().any(|suffix| token.ends_with(suffix)) {
        Some(token[..len - 1].to_owned())
    } else {
        None
    }
}
