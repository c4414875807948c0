use {
    std::{fs::read_to_string, path::{Path, PathBuf}},
    tracing::warn,
    serde::Deserialize,
    anyhow::{anyhow, Result},
    crate::coherence::CoherenceMeasure,
};

pub const MIN_TOPICS: usize = 2;
pub const MAX_TOPICS: usize = 10;

#[derive(Deserialize, Debug)]
pub struct Config {
    input: Option<InputConfig>,
    analysis: Option<AnalysisConfig>,
    topic_model: Option<TopicModelSettings>,
    resources: Option<ResourcesConfig>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct InputConfig {
    #[serde(default = "default_text_column")]
    pub text_column: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct AnalysisConfig {
    #[serde(default = "default_keywords")]
    pub keywords: usize,
    #[serde(default = "default_preview_records")]
    pub preview_records: usize,
}

#[derive(Deserialize, Clone, Debug)]
pub struct TopicModelSettings {
    #[serde(default = "default_topics")]
    pub topics: usize,
    #[serde(default = "default_iterations")]
    pub iterations: usize,
    alpha: Option<f64>,
    #[serde(default = "default_beta")]
    pub beta: f64,
    #[serde(default = "default_top_terms")]
    pub top_terms: usize,
    seed: Option<u64>,
    #[serde(default)]
    pub coherence: CoherenceMeasure,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ResourcesConfig {
    path: Option<PathBuf>,
}

fn default_text_column() -> String {
    "review".to_owned()
}

fn default_keywords() -> usize {
    20
}

fn default_preview_records() -> usize {
    10
}

fn default_topics() -> usize {
    5
}

fn default_iterations() -> usize {
    200
}

fn default_beta() -> f64 {
    0.01
}

fn default_top_terms() -> usize {
    10
}

fn default_timeout_secs() -> u64 {
    120
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input: None,
            analysis: None,
            topic_model: None,
            resources: None,
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            text_column: default_text_column(),
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            keywords: default_keywords(),
            preview_records: default_preview_records(),
        }
    }
}

impl Default for TopicModelSettings {
    fn default() -> Self {
        Self {
            topics: default_topics(),
            iterations: default_iterations(),
            alpha: None,
            beta: default_beta(),
            top_terms: default_top_terms(),
            seed: None,
            coherence: CoherenceMeasure::default(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for ResourcesConfig {
    fn default() -> Self {
        Self {
            path: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_first_of(&[Path::new("./config.toml"), Path::new("/config/config.toml")])
    }

    /// Parses the first readable file. Only a missing or unreadable file
    /// falls back to defaults, a file that does not parse is an error.
    pub fn load_first_of(paths: &[&Path]) -> Result<Self> {
        for path in paths {
            if let Ok(content) = read_to_string(path) {
                return Self::parse(&content)
                    .map_err(|err| anyhow!("failed to parse config file {}: {}", path.display(), err));
            }
        }

        warn!("failed to read config, using defaults");
        Ok(Config::default())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = read_to_string(path)
            .map_err(|err| anyhow!("failed to read config file {}: {}", path.display(), err))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn validate(&self) -> Result<()> {
        let topic_model = self.topic_model();
        validate_topics(topic_model.topics)?;

        if topic_model.iterations == 0 {
            return Err(anyhow!("topic_model.iterations must be positive"));
        }
        if topic_model.top_terms == 0 {
            return Err(anyhow!("topic_model.top_terms must be positive"));
        }
        if !(topic_model.beta > 0.0) {
            return Err(anyhow!("topic_model.beta must be positive, got {}", topic_model.beta));
        }
        if let Some(alpha) = topic_model.alpha() {
            if !(alpha > 0.0) {
                return Err(anyhow!("topic_model.alpha must be positive, got {}", alpha));
            }
        }
        if self.analysis().keywords == 0 {
            return Err(anyhow!("analysis.keywords must be positive"));
        }
        if self.input().text_column.trim().is_empty() {
            return Err(anyhow!("input.text_column must not be empty"));
        }

        Ok(())
    }

    pub fn input(&self) -> InputConfig {
        self.input.as_ref().cloned().unwrap_or_default()
    }

    pub fn analysis(&self) -> AnalysisConfig {
        self.analysis.as_ref().cloned().unwrap_or_default()
    }

    pub fn topic_model(&self) -> TopicModelSettings {
        self.topic_model.as_ref().cloned().unwrap_or_default()
    }

    pub fn resources(&self) -> ResourcesConfig {
        self.resources.as_ref().cloned().unwrap_or_default()
    }
}

pub fn validate_topics(topics: usize) -> Result<()> {
    if topics < MIN_TOPICS || topics > MAX_TOPICS {
        return Err(anyhow!("number of topics must be between {} and {}, got {}", MIN_TOPICS, MAX_TOPICS, topics));
    }
    Ok(())
}

impl TopicModelSettings {
    pub fn alpha(&self) -> Option<f64> {
        self.alpha
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }
}

impl ResourcesConfig {
    pub fn path(&self) -> PathBuf {
        self.path.as_ref().cloned().unwrap_or_else(|| PathBuf::from("./resources"))
    }
}
