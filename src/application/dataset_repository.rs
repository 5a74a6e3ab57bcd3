// Repository trait for sensor dataset access
use crate::domain::reading::{DataLoadError, Dataset};
use async_trait::async_trait;
use std::path::Path;

#[async_trait]
pub trait DatasetRepository: Send + Sync {
    /// Load the full table at `path`, rows in file order.
    /// Fails if the source is missing, unreadable or lacks the
    /// `timestamp`/`TC` columns.
    async fn load_dataset(&self, path: &Path) -> Result<Dataset, DataLoadError>;
}
