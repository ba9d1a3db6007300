use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tracing::debug;

use crate::config::PipelineSettings;
use crate::usecase::ports::source::{SalesSource, SourceError};
use crate::usecase::services::pipeline::{load_dataset, SalesDataset};

struct CachedDataset {
    loaded: Instant,
    dataset: Arc<SalesDataset>,
}

pub struct DashboardService {
    source: Arc<dyn SalesSource>,
    settings: PipelineSettings,
    include_ads: bool,
    ttl: Duration,
    cache: Mutex<Option<CachedDataset>>,
}

impl DashboardService {
    pub fn new(
        source: Arc<dyn SalesSource>,
        settings: PipelineSettings,
        include_ads: bool,
        ttl: Duration,
    ) -> Self {
        Self {
            source,
            settings,
            include_ads,
            ttl,
            cache: Mutex::new(None),
        }
    }

    pub fn describe_source(&self) -> String {
        self.source.describe()
    }

    /// Cached dataset while it is younger than the ttl, otherwise a fresh load.
    pub fn dataset(&self) -> Result<Arc<SalesDataset>, SourceError> {
        let mut cache = self
            .cache
            .lock()
            .map_err(|_| SourceError::Other(anyhow::anyhow!("dataset cache poisoned")))?;
        if let Some(cached) = cache.as_ref() {
            if cached.loaded.elapsed() < self.ttl {
                debug!("serving cached dataset");
                return Ok(cached.dataset.clone());
            }
        }

        let dataset = Arc::new(load_dataset(
            self.source.as_ref(),
            &self.settings,
            self.include_ads,
        )?);
        *cache = Some(CachedDataset {
            loaded: Instant::now(),
            dataset: dataset.clone(),
        });
        Ok(dataset)
    }

    pub fn refresh(&self) -> Result<Arc<SalesDataset>, SourceError> {
        self.invalidate();
        self.dataset()
    }

    pub fn invalidate(&self) {
        if let Ok(mut cache) = self.cache.lock() {
            *cache = None;
        }
    }
}
