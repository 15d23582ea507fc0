//! Raw CSV snapshots, addressed by dataset identifier (e.g. `kyi6-dk5h`).

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use log::{debug, info};
use reqwest::blocking::Client;

use crate::error::{Error, Result};

pub const DEFAULT_BASE_URL: &str = "https://data.cdp.net/resource";

/// Where raw yearly CSV snapshots come from.
pub trait DataSource {
    /// Returns the full CSV text (header row included) of `dataset`.
    fn fetch_csv(&self, dataset: &str) -> Result<String>;
}

/// Plain HTTP GET of `{base_url}/{dataset}.csv`. No retries, no cache.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
    base_url: String,
    row_limit: Option<u32>,
}

impl HttpSource {
    pub fn new(base_url: impl Into<String>, row_limit: Option<u32>) -> Result<Self> {
        let base_url = base_url.into();
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|source| Error::Fetch {
                url: base_url.clone(),
                source,
            })?;
        Ok(HttpSource {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            row_limit,
        })
    }

    pub fn url_for(&self, dataset: &str) -> String {
        match self.row_limit {
            Some(limit) => format!("{}/{}.csv?$limit={}", self.base_url, dataset, limit),
            None => format!("{}/{}.csv", self.base_url, dataset),
        }
    }
}

impl DataSource for HttpSource {
    fn fetch_csv(&self, dataset: &str) -> Result<String> {
        let url = self.url_for(dataset);
        let start = Instant::now();
        debug!("Fetching dataset {} from {}", dataset, url);

        let fetch_err = |source| Error::Fetch {
            url: url.clone(),
            source,
        };
        let body = self
            .client
            .get(&url)
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.text())
            .map_err(fetch_err)?;

        info!(
            "Fetched dataset {} - bytes={}, duration={:.2}s",
            dataset,
            body.len(),
            start.elapsed().as_secs_f32()
        );
        Ok(body)
    }
}

/// Reads `<dir>/<dataset>.csv`, for offline snapshots.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    dir: PathBuf,
}

impl DirectorySource {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        DirectorySource {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn path_for(&self, dataset: &str) -> PathBuf {
        self.dir.join(format!("{dataset}.csv"))
    }
}

impl DataSource for DirectorySource {
    fn fetch_csv(&self, dataset: &str) -> Result<String> {
        let path = self.path_for(dataset);
        debug!("Reading dataset {} from {}", dataset, path.display());
        Ok(fs::read_to_string(path)?)
    }
}
