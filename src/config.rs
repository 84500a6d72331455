use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;

use crate::models::DEFAULT_PAGE_SIZE;
use crate::roster::DEFAULT_FETCH_DELAY;

/// Defaults taken from the environment; command-line flags override them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub page_size: usize,
    pub fetch_delay: Duration,
    pub data: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            page_size: DEFAULT_PAGE_SIZE,
            fetch_delay: DEFAULT_FETCH_DELAY,
            data: None,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(value) = lookup("ROSTER_PAGE_SIZE") {
            let page_size: usize = value
                .parse()
                .context("ROSTER_PAGE_SIZE must be a positive integer")?;
            anyhow::ensure!(page_size > 0, "ROSTER_PAGE_SIZE must be a positive integer");
            config.page_size = page_size;
        }
        if let Some(value) = lookup("ROSTER_FETCH_DELAY_MS") {
            let millis: u64 = value
                .parse()
                .context("ROSTER_FETCH_DELAY_MS must be a whole number of milliseconds")?;
            config.fetch_delay = Duration::from_millis(millis);
        }
        config.data = lookup("ROSTER_DATA")
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);

        Ok(config)
    }
}
