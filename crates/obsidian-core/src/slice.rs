//! Per-section load state shared by the feature slices.

use serde::Serialize;

use crate::api::{ApiError, ApiResult};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadStatus {
    #[default]
    Idle,
    Loading,
    Succeeded,
    Failed,
}

/// One fetched section: last payload, status and last error message.
///
/// A failed reload keeps the previous payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section<T> {
    pub status: LoadStatus,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> Default for Section<T> {
    fn default() -> Self {
        Self {
            status: LoadStatus::Idle,
            data: None,
            error: None,
        }
    }
}

impl<T: Clone> Section<T> {
    pub fn begin(&mut self) {
        self.status = LoadStatus::Loading;
        self.error = None;
    }

    /// Records the outcome of a fetch, replacing the error with `fallback`
    /// when the backend gave no message.
    ///
    /// # Errors
    /// Passes the (possibly relabelled) error through.
    pub fn finish(&mut self, result: ApiResult<T>, fallback: &str) -> ApiResult<T> {
        match result {
            Ok(data) => {
                self.status = LoadStatus::Succeeded;
                self.data = Some(data.clone());
                Ok(data)
            }
            Err(err) => {
                let err: ApiError = err.or_fallback(fallback);
                self.status = LoadStatus::Failed;
                self.error = Some(err.message.clone());
                Err(err)
            }
        }
    }

    pub fn is_loading(&self) -> bool {
        self.status == LoadStatus::Loading
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }
}
