use marketplace_core::listings::{BlobError, ImageStore};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Image host used when no blob storage is wired in: deletions are recorded in the log only.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct LoggingImageStore;

impl ImageStore for LoggingImageStore {
    fn delete(&self, public_id: &str) -> Result<(), BlobError> {
        if public_id.trim().is_empty() {
            return Err(BlobError::NotFound(public_id.to_string()));
        }
        info!(public_id, "hosted image deletion requested");
        Ok(())
    }
}
