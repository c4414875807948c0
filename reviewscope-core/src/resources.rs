use {
    std::{collections::{HashMap, HashSet}, fs, path::{Path, PathBuf}},
    tracing::{info, warn},
    anyhow::{anyhow, Context, Result},
    stop_words::{get, LANGUAGE},
};

pub const STOPWORDS_FILE: &str = "stopwords.txt";
pub const LEMMAS_FILE: &str = "lemmas.tsv";

const BACKUP_EXTENSION: &str = "bak";

// on the english stopword list, but they carry what a review is about
const REVIEW_TERMS: &[&str] = &[
    "good", "goods", "great", "greater", "greatest", "best", "better", "bad", "worse", "worst",
    "like", "liked", "love", "loved", "poor", "poorly", "nice", "fine", "awful", "terrible", "excellent",
    "amazing", "useful", "useless", "value", "quick", "quickly", "fast", "slow", "late", "early",
    "new", "old", "big", "small", "large", "long", "short", "high", "low", "clear", "full", "open",
    "broken", "problem", "problems", "work", "works", "worked", "working", "order", "ordered", "orders",
    "product", "quality", "price", "delivery", "battery", "charge", "box", "screen", "sound", "star",
    "thank", "thanks", "recommend", "return", "fit", "day", "life",
];

const BUNDLED_LEMMAS: &str = include_str!("../resources/en/lemmas.tsv");

/// Stopword list and lemma table for English. Built once at startup and
/// handed to the normalizer.
#[derive(Debug, Clone)]
pub struct LanguageResources {
    stopwords: HashSet<String>,
    lemmas: HashMap<String, String>,
}

impl LanguageResources {
    pub fn bundled() -> Result<Self> {
        Self::parse(&bundled_stopwords(), BUNDLED_LEMMAS).context("bundled language resources are malformed")
    }

    pub fn load(dir: &Path) -> Result<Self> {
        let stopwords = fs::read_to_string(dir.join(STOPWORDS_FILE))
            .with_context(|| format!("failed to read {}", dir.join(STOPWORDS_FILE).display()))?;
        let lemmas = fs::read_to_string(dir.join(LEMMAS_FILE))
            .with_context(|| format!("failed to read {}", dir.join(LEMMAS_FILE).display()))?;

        Self::parse(&stopwords, &lemmas)
    }

    /// Loads resources from `dir`, installing the bundled files there first
    /// if they are missing or unreadable. The load is retried exactly once.
    pub fn ensure_installed(dir: &Path) -> Result<Self> {
        match Self::load(dir) {
            Ok(v) => Ok(v),
            Err(err) => {
                let existing = existing_files(dir);
                if existing.is_empty() {
                    warn!("language resources unavailable in {}: {:#}, installing bundled copy", dir.display(), err);
                } else {
                    warn!(
                        "language resources in {} are unusable: {:#}, replacing them with the bundled copy (old files kept with .{} extension)",
                        dir.display(),
                        err,
                        BACKUP_EXTENSION,
                    );
                    for path in existing {
                        let backup = path.with_extension(format!("{}.{}", extension_of(&path), BACKUP_EXTENSION));
                        fs::rename(&path, &backup)
                            .with_context(|| format!("failed to back up {}", path.display()))?;
                    }
                }
                install(dir)?;
                Self::load(dir)
                    .with_context(|| format!("language resources still unavailable in {} after install", dir.display()))
            }
        }
    }

    pub fn parse(stopwords: &str, lemmas: &str) -> Result<Self> {
        let stopwords: HashSet<String> = data_lines(stopwords)
            .map(|line| line.to_lowercase())
            .collect();

        if stopwords.is_empty() {
            return Err(anyhow!("stopword list is empty"));
        }

        let mut table = HashMap::new();
        for (line_number, line) in data_lines(lemmas).enumerate() {
            let mut parts = line.split('\t');
            let (form, lemma) = match (parts.next(), parts.next(), parts.next()) {
                (Some(form), Some(lemma), None) if !form.is_empty() && !lemma.is_empty() => (form, lemma),
                _ => return Err(anyhow!("malformed lemma entry {}: {:?}", line_number + 1, line)),
            };
            table.insert(form.to_lowercase(), lemma.to_lowercase());
        }

        // lemmas are fixed points
        let lemma_values: Vec<String> = table.values().cloned().collect();
        for lemma in lemma_values {
            table.entry(lemma.clone()).or_insert(lemma);
        }

        Ok(Self {
            stopwords,
            lemmas: table,
        })
    }

    pub fn is_stopword(&self, word: &str) -> bool {
        self.stopwords.contains(word)
    }

    pub fn lemma_entry(&self, word: &str) -> Option<&str> {
        self.lemmas.get(word).map(|v| v.as_str())
    }

    pub fn total_stopwords(&self) -> usize {
        self.stopwords.len()
    }

    pub fn total_lemmas(&self) -> usize {
        self.lemmas.len()
    }
}

pub fn install(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create resource directory {}", dir.display()))?;
    fs::write(dir.join(STOPWORDS_FILE), bundled_stopwords())
        .with_context(|| format!("failed to write {}", dir.join(STOPWORDS_FILE).display()))?;
    fs::write(dir.join(LEMMAS_FILE), BUNDLED_LEMMAS)
        .with_context(|| format!("failed to write {}", dir.join(LEMMAS_FILE).display()))?;

    info!("installed language resources into {}", dir.display());
    Ok(())
}

/// English stopwords from the `stop-words` list, minus review vocabulary,
/// one per line in sorted order.
pub fn bundled_stopwords() -> String {
    let mut words: Vec<String> = get(LANGUAGE::English).iter()
        .map(|word| word.trim().to_lowercase())
        .filter(|word| !word.is_empty() && !REVIEW_TERMS.contains(&word.as_str()))
        .collect();
    words.sort();
    words.dedup();

    let mut content = words.join("\n");
    content.push('\n');
    content
}

fn existing_files(dir: &Path) -> Vec<PathBuf> {
    [STOPWORDS_FILE, LEMMAS_FILE].iter()
        .map(|file| dir.join(file))
        .filter(|path| path.is_file())
        .collect()
}

fn extension_of(path: &Path) -> &str {
    path.extension().and_then(|v| v.to_str()).unwrap_or_default()
}

fn data_lines(content: &str) -> impl Iterator<Item = &str> {
    content.lines()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_resources_parse() {
        let resources = LanguageResources::bundled().unwrap();
        assert!(resources.is_stopword("the"));
        assert!(resources.is_stopword("be"));
        assert!(!resources.is_stopword("product"));
        assert_eq!(resources.lemma_entry("was"), Some("be"));
        assert_eq!(resources.lemma_entry("running"), Some("run"));
    }

    #[test]
    fn lemma_values_are_fixed_points() {
        let resources = LanguageResources::bundled().unwrap();
        for form in ["children", "batteries", "best", "running", "bought"] {
            let lemma = resources.lemma_entry(form).unwrap();
            assert_eq!(resources.lemma_entry(lemma), Some(lemma));
        }
    }

    #[test]
    fn malformed_lemma_line_is_rejected() {
        assert!(LanguageResources::parse("the\n", "running\n").is_err());
        assert!(LanguageResources::parse("the\n", "a\tb\tc\n").is_err());
    }

    #[test]
    fn empty_stopword_list_is_rejected() {
        assert!(LanguageResources::parse("# nothing here\n", "").is_err());
    }

    #[test]
    fn ensure_installed_populates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("en");

        assert!(LanguageResources::load(&target).is_err());
        let resources = LanguageResources::ensure_installed(&target).unwrap();
        assert!(resources.is_stopword("and"));
        assert!(target.join(STOPWORDS_FILE).exists());
        assert!(target.join(LEMMAS_FILE).exists());

        // second call loads what is already there
        let again = LanguageResources::ensure_installed(&target).unwrap();
        assert_eq!(again.total_stopwords(), resources.total_stopwords());
    }

    #[test]
    fn ensure_installed_repairs_corrupt_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(STOPWORDS_FILE), "the\n").unwrap();
        fs::write(dir.path().join(LEMMAS_FILE), "broken line without tab\n").unwrap();

        let resources = LanguageResources::ensure_installed(dir.path()).unwrap();
        assert_eq!(resources.lemma_entry("was"), Some("be"));

        // the user's files survive next to the fresh copy
        assert_eq!(fs::read_to_string(dir.path().join("lemmas.tsv.bak")).unwrap(), "broken line without tab\n");
        assert_eq!(fs::read_to_string(dir.path().join("stopwords.txt.bak")).unwrap(), "the\n");
    }

    #[test]
    fn missing_files_are_installed_without_backups() {
        let dir = tempfile::tempdir().unwrap();
        LanguageResources::ensure_installed(dir.path()).unwrap();
        assert!(!dir.path().join("lemmas.tsv.bak").exists());
        assert!(!dir.path().join("stopwords.txt.bak").exists());
    }

    #[test]
    fn stopwords_come_from_the_english_list() {
        let installed = bundled_stopwords();
        let words: Vec<&str> = installed.lines().collect();

        assert!(words.len() > 100);
        assert!(words.windows(2).all(|pair| pair[0] < pair[1]));
        for word in ["the", "and", "was", "it"] {
            assert!(words.contains(&word), "missing: {}", word);
        }
        for word in ["good", "great", "problem", "order"] {
            assert!(!words.contains(&word), "review term listed: {}", word);
        }
    }

    #[test]
    fn ensure_installed_fails_when_install_is_impossible() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-directory");
        fs::write(&blocker, "file").unwrap();

        assert!(LanguageResources::ensure_installed(&blocker.join("en")).is_err());
    }
}
