//! Per-browser submission state for the hosted form.
//!
//! Each browser session owns its own display region and generation counter,
//! so overlapping submissions only ever supersede submissions from the same
//! session. Sessions are identified by a cookie and dropped after sitting idle.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use axum::http::HeaderMap;
use axum::http::header::COOKIE;
use tracing::debug;
use uuid::Uuid;

use crate::client::EvaluationClient;
use crate::render::DisplayRegion;
use crate::submission::SubmissionController;

pub const SESSION_COOKIE: &str = "loan_eval_session";

/// The controller behind one browser session: remote evaluator, its own display.
pub type FormController = SubmissionController<EvaluationClient, DisplayRegion>;

struct Entry {
    controller: Arc<FormController>,
    last_seen: Instant,
}

/// A session's controller, and whether its id still has to be sent to the browser.
pub struct Checkout {
    pub id: String,
    pub controller: Arc<FormController>,
    pub issued: bool,
}

pub struct Sessions {
    client: EvaluationClient,
    idle_ttl: Duration,
    entries: Mutex<HashMap<String, Entry>>,
}

impl Sessions {
    pub fn new(client: EvaluationClient, idle_ttl: Duration) -> Self {
        Self {
            client,
            idle_ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn client(&self) -> &EvaluationClient {
        &self.client
    }

    /// Controller for a known session. Unknown or absent ids get a fresh
    /// session under a newly generated id, never the one the browser offered.
    pub fn checkout(&self, id: Option<&str>) -> Checkout {
        let now = Instant::now();
        let mut entries = self.lock();
        entries.retain(|_, entry| now.duration_since(entry.last_seen) < self.idle_ttl);

        if let Some(id) = id
            && let Some(entry) = entries.get_mut(id)
        {
            entry.last_seen = now;
            return Checkout {
                id: id.to_string(),
                controller: entry.controller.clone(),
                issued: false,
            };
        }

        let id = Uuid::new_v4().to_string();
        let controller = Arc::new(SubmissionController::new(
            self.client.clone(),
            DisplayRegion::new(),
        ));
        entries.insert(
            id.clone(),
            Entry {
                controller: controller.clone(),
                last_seen: now,
            },
        );
        debug!(sessions = entries.len(), "new form session");

        Checkout {
            id,
            controller,
            issued: true,
        }
    }

    /// Controller for a known, live session without creating one.
    pub fn get(&self, id: &str) -> Option<Arc<FormController>> {
        let entries = self.lock();
        entries
            .get(id)
            .filter(|entry| entry.last_seen.elapsed() < self.idle_ttl)
            .map(|entry| entry.controller.clone())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Entry>> {
        match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Session id carried in the request's cookies, if any.
pub fn session_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_string())
}

/// `Set-Cookie` value binding the browser to session `id`.
pub fn session_cookie(id: &str) -> String {
    format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, id)
}
