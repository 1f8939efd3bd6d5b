use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use docqa_core::config::Config;
use docqa_embed::get_default_embedder;
use docqa_engine::{ChatCompletionsClient, QueryEngine};

/// Log filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info";

fn env_filter() -> tracing_subscriber::EnvFilter {
    tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into())
}

/// Installs the fmt subscriber on stderr; `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(env_filter())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

/// Document to answer from: the override when given, else `[document] path`.
pub fn document_path(config: &Config, overridden: Option<PathBuf>) -> Result<PathBuf> {
    match overridden {
        Some(path) => Ok(path),
        None => config.document_path(),
    }
}

/// Loads settings from `config_dir`, or the working directory when unset.
pub fn load_config(config_dir: Option<PathBuf>) -> Result<Config> {
    match config_dir {
        Some(dir) => Config::load_from(&dir),
        None => Config::load(),
    }
}

/// Builds the engine described by `config` over the document at `document`.
/// Credentials are checked before the model or document is loaded.
pub fn build_engine(config: &Config, document: &Path) -> Result<QueryEngine> {
    let settings = config.settings()?;
    let generator = ChatCompletionsClient::new(&settings.generation)?;
    let embedder = get_default_embedder(&settings.embedding, config.base_dir())?;
    let engine = QueryEngine::initialize(document, &settings.engine(), embedder, Box::new(generator))?;
    Ok(engine)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_is_info() {
        assert_eq!(DEFAULT_LOG_FILTER, "info");
        if std::env::var_os("RUST_LOG").is_none() {
            assert_eq!(env_filter().to_string(), "info");
        }
    }
}
