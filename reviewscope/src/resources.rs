use {
    std::path::Path,
    tracing::info,
    anyhow::{Context, Result},
    reviewscope_core::resources::{install, LanguageResources},
};

pub fn run_install_resources_step(path: &Path) -> Result<()> {
    install(path)?;

    let resources = LanguageResources::load(path)
        .with_context(|| format!("installed resources in {} could not be loaded", path.display()))?;
    info!(
        "installed language resources to {} ({} stopwords, {} lemmas)",
        path.display(),
        resources.total_stopwords(),
        resources.total_lemmas(),
    );

    Ok(())
}
