use {
    std::{collections::HashMap, fmt},
    serde::{Serialize, Deserialize},
    anyhow::{anyhow, Result},
};

const BUNDLED_LEXICON: &str = include_str!("../resources/en/sentiment.tsv");

const NEGATION_SCALAR: f64 = -0.74;
const BOOSTER_INCREMENT: f64 = 0.293;
const EXCLAMATION_INCREMENT: f64 = 0.292;
const MAX_EXCLAMATIONS: usize = 4;
const BEFORE_BUT_SCALAR: f64 = 0.5;
const AFTER_BUT_SCALAR: f64 = 1.5;
const NORMALIZATION_ALPHA: f64 = 15.0;
const NEGATION_WINDOW: usize = 3;

const NEGATORS: &[&str] = &[
    "not", "no", "never", "nothing", "nobody", "none", "neither", "nor", "nowhere", "cannot", "without",
    "dont", "doesnt", "didnt", "isnt", "wasnt", "arent", "werent", "cant", "couldnt", "wont", "wouldnt",
    "shouldnt", "havent", "hasnt", "hadnt", "aint",
];

const BOOSTERS: &[&str] = &[
    "very", "extremely", "really", "so", "super", "incredibly", "absolutely", "totally", "completely",
    "highly", "truly", "especially", "particularly", "exceptionally", "utterly",
];

const DAMPENERS: &[&str] = &[
    "slightly", "somewhat", "barely", "hardly", "kinda", "sort", "little", "marginally", "partly", "occasionally",
];

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    pub const ALL: [Sentiment; 3] = [Sentiment::Positive, Sentiment::Negative, Sentiment::Neutral];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "Positive",
            Sentiment::Negative => "Negative",
            Sentiment::Neutral => "Neutral",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lexicon and rule based polarity scorer. Works on raw review text, so
/// negations and intensifiers that the normalizer would drop still count.
#[derive(Debug, Clone)]
pub struct SentimentClassifier {
    lexicon: HashMap<String, f64>,
    positive_threshold: f64,
    negative_threshold: f64,
}

impl SentimentClassifier {
    pub fn bundled() -> Result<Self> {
        Ok(Self::with_lexicon(parse_lexicon(BUNDLED_LEXICON)?))
    }

    pub fn with_lexicon(lexicon: HashMap<String, f64>) -> Self {
        Self {
            lexicon,
            positive_threshold: 0.05,
            negative_threshold: -0.05,
        }
    }

    pub fn with_thresholds(mut self, negative: f64, positive: f64) -> Self {
        self.negative_threshold = negative;
        self.positive_threshold = positive;
        self
    }

    /// Total: empty or unscorable text is `Neutral`.
    pub fn classify(&self, text: &str) -> Sentiment {
        self.label(self.score(text))
    }

    pub fn label(&self, compound: f64) -> Sentiment {
        if compound >= self.positive_threshold {
            Sentiment::Positive
        } else if compound <= self.negative_threshold {
            Sentiment::Negative
        } else {
            Sentiment::Neutral
        }
    }

    /// Compound polarity in (-1, 1).
    pub fn score(&self, text: &str) -> f64 {
        let tokens = tokenize(text);
        let but_position = tokens.iter().position(|token| token == "but");

        let mut sum = 0.0;
        for (i, token) in tokens.iter().enumerate() {
            let mut valence = match self.lexicon.get(token.as_str()) {
                Some(v) => *v,
                None => continue,
            };

            if i > 0 {
                let previous = tokens[i - 1].as_str();
                if BOOSTERS.contains(&previous) {
                    valence += BOOSTER_INCREMENT * valence.signum();
                } else if DAMPENERS.contains(&previous) {
                    valence -= BOOSTER_INCREMENT * valence.signum();
                }
            }

            if tokens[i.saturating_sub(NEGATION_WINDOW)..i].iter().any(|v| is_negator(v)) {
                valence *= NEGATION_SCALAR;
            }

            if let Some(but_position) = but_position {
                if i < but_position {
                    valence *= BEFORE_BUT_SCALAR;
                } else if i > but_position {
                    valence *= AFTER_BUT_SCALAR;
                }
            }

            sum += valence;
        }

        if sum != 0.0 {
            let exclamations = text.matches('!').count().min(MAX_EXCLAMATIONS);
            sum += exclamations as f64 * EXCLAMATION_INCREMENT * sum.signum();
        }

        sum / (sum * sum + NORMALIZATION_ALPHA).sqrt()
    }
}

fn is_negator(token: &str) -> bool {
    NEGATORS.contains(&token) || token.ends_with("n't")
}

fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .replace(&['\u{2019}', '\u{2018}'][..], "'")
        .split(|c: char| !(c.is_alphabetic() || c == '\''))
        .map(|token| token.trim_matches('\''))
        .filter(|token| !token.is_empty())
        .map(|token| token.to_owned())
        .collect()
}

pub fn parse_lexicon(content: &str) -> Result<HashMap<String, f64>> {
    let mut lexicon = HashMap::new();

    for (line_number, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let (word, valence) = line.split_once('\t')
            .ok_or_else(|| anyhow!("malformed lexicon line {}: {:?}", line_number + 1, line))?;
        let valence: f64 = valence.trim().parse()
            .map_err(|err| anyhow!("bad valence on lexicon line {}: {}", line_number + 1, err))?;

        lexicon.insert(word.to_lowercase(), valence);
    }

    Ok(lexicon)
}
