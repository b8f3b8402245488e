use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{info, warn};

use detail_common::api::DetailApi;
use detail_common::model::{
    AdjacentElement, Exposure, HostElement, SuggestionContext, SuggestionResult,
};

use crate::error::AppError;

const SUGGEST_FAILED: &str = "Failed to get suggestion.";

#[derive(Debug, Clone, PartialEq)]
pub enum SuggestPhase {
    Idle,
    Submitting,
    Success(SuggestionResult),
    Failure(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SuggestForm {
    pub host_element: Option<HostElement>,
    pub adjacent_element: Option<AdjacentElement>,
    pub exposure: Option<Exposure>,
}

impl SuggestForm {
    pub fn context(&self) -> Result<SuggestionContext, AppError> {
        Ok(SuggestionContext {
            host_element: self
                .host_element
                .ok_or(AppError::MissingField("host_element"))?,
            adjacent_element: self
                .adjacent_element
                .ok_or(AppError::MissingField("adjacent_element"))?,
            exposure: self.exposure.ok_or(AppError::MissingField("exposure"))?,
        })
    }
}

struct SuggestState {
    form: SuggestForm,
    phase: SuggestPhase,
}

/// Drives the "get a suggestion" form: field state plus one request per submit.
#[derive(Clone)]
pub struct SuggestController {
    api: Arc<dyn DetailApi>,
    state: Arc<Mutex<SuggestState>>,
}

impl SuggestController {
    pub fn new(api: Arc<dyn DetailApi>) -> Self {
        Self {
            api,
            state: Arc::new(Mutex::new(SuggestState {
                form: SuggestForm::default(),
                phase: SuggestPhase::Idle,
            })),
        }
    }

    pub async fn set_host_element(&self, value: HostElement) {
        self.state.lock().await.form.host_element = Some(value);
    }

    pub async fn set_adjacent_element(&self, value: AdjacentElement) {
        self.state.lock().await.form.adjacent_element = Some(value);
    }

    pub async fn set_exposure(&self, value: Exposure) {
        self.state.lock().await.form.exposure = Some(value);
    }

    pub async fn form(&self) -> SuggestForm {
        self.state.lock().await.form
    }

    pub async fn phase(&self) -> SuggestPhase {
        self.state.lock().await.phase.clone()
    }

    /// Submit the form.
    ///
    /// Only an incomplete form is reported as an error here. Backend failures
    /// land in [`SuggestPhase::Failure`] and replace any earlier result.
    pub async fn submit(&self) -> Result<(), AppError> {
        let context = {
            let mut state = self.state.lock().await;
            let context = state.form.context()?;
            state.phase = SuggestPhase::Submitting;
            context
        };

        let result = self.api.suggest_detail(&context).await;

        let mut state = self.state.lock().await;
        state.phase = match result {
            Ok(result) => {
                info!(
                    host = %context.host_element,
                    adjacent = %context.adjacent_element,
                    exposure = %context.exposure,
                    empty = result.is_empty(),
                    "suggestion received"
                );
                SuggestPhase::Success(result)
            }
            Err(e) => {
                warn!(kind = %e.kind, status = e.status, error = %e, "suggestion request failed");
                SuggestPhase::Failure(e.display_message(SUGGEST_FAILED))
            }
        };
        Ok(())
    }

    pub async fn reset(&self) {
        let mut state = self.state.lock().await;
        state.form = SuggestForm::default();
        state.phase = SuggestPhase::Idle;
    }
}
