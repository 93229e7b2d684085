//! One submission cycle: collect, show loading, evaluate, render.

use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, warn};

use crate::client::Evaluator;
use crate::error::FormError;
use crate::form::{FormSource, SubmitEvent, collect};
use crate::render::{RenderState, ResultDisplay, ResultView};

/// How a submission cycle ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// This submission's result (or error) is now on display.
    Rendered(RenderState),
    /// A newer submission started while this one was in flight; its result was dropped.
    Superseded,
}

/// Drives submissions against an evaluator and renders into one display.
///
/// Overlapping submissions each send their own request. Only the most recent
/// one may render its outcome; earlier ones resolving later are discarded.
pub struct SubmissionController<E, D> {
    evaluator: E,
    display: D,
    latest: AtomicU64,
}

impl<E: Evaluator, D: ResultDisplay> SubmissionController<E, D> {
    pub fn new(evaluator: E, display: D) -> Self {
        Self {
            evaluator,
            display,
            latest: AtomicU64::new(0),
        }
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    /// Run one cycle. A missing form control aborts before anything is sent
    /// or shown.
    pub async fn submit<F: FormSource + ?Sized>(
        &self,
        event: &mut SubmitEvent,
        form: &F,
    ) -> Result<SubmissionOutcome, FormError> {
        let request = collect(event, form)?;

        let generation = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        self.display.show(RenderState::Loading);
        debug!(generation, "submission started");

        let outcome = match self.evaluator.evaluate(&request).await {
            Ok(response) => Ok(ResultView::from(&response)),
            Err(err) => {
                warn!(generation, "evaluation failed: {}", err);
                Err(err.to_string())
            }
        };

        if self.latest.load(Ordering::SeqCst) != generation {
            debug!(generation, "discarding result of superseded submission");
            return Ok(SubmissionOutcome::Superseded);
        }

        let state = RenderState::Resolved(outcome);
        self.display.show(state.clone());
        Ok(SubmissionOutcome::Rendered(state))
    }
}
