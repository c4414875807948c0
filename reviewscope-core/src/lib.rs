pub mod coherence;
pub mod config;
pub mod keywords;
pub mod normalizer;
pub mod pipeline;
pub mod records;
pub mod resources;
pub mod sentiment;
pub mod topic_model;
