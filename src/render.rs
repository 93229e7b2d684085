//! The result display region and what can be shown in it.

use std::sync::{Arc, RwLock};

use crate::models::EvaluationResponse;

const LOADING_HTML: &str = r#"<div class="loader">Analyzing...</div>"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeKind {
    Approved,
    Rejected,
}

impl BadgeKind {
    pub fn css_class(self) -> &'static str {
        match self {
            BadgeKind::Approved => "badge-approved",
            BadgeKind::Rejected => "badge-rejected",
        }
    }
}

/// A successful evaluation, ready to display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultView {
    pub badge: BadgeKind,
    pub diagnosis: String,
    pub category: String,
    pub details: Vec<String>,
}

impl From<&EvaluationResponse> for ResultView {
    fn from(response: &EvaluationResponse) -> Self {
        let badge = if response.is_approved() {
            BadgeKind::Approved
        } else {
            BadgeKind::Rejected
        };
        Self {
            badge,
            diagnosis: response.diagnosis.clone(),
            category: response.category.clone(),
            details: response.details.clone(),
        }
    }
}

/// Either a result or the message of whatever went wrong.
pub type Outcome = Result<ResultView, String>;

/// Content of the result display.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RenderState {
    #[default]
    Idle,
    Loading,
    Resolved(Outcome),
}

impl RenderState {
    pub fn is_loading(&self) -> bool {
        matches!(self, RenderState::Loading)
    }

    pub fn to_html(&self) -> String {
        match self {
            RenderState::Idle => String::new(),
            RenderState::Loading => LOADING_HTML.to_string(),
            RenderState::Resolved(Ok(view)) => {
                let items: String = view
                    .details
                    .iter()
                    .map(|detail| format!("<li>{}</li>", escape_html(detail)))
                    .collect();
                format!(
                    r#"<div class="diagnosis-result"><span class="badge {}">{}</span><span class="category-name">{}</span><ul class="details-list">{}</ul></div>"#,
                    view.badge.css_class(),
                    escape_html(&view.diagnosis),
                    escape_html(&view.category),
                    items
                )
            }
            RenderState::Resolved(Err(message)) => format!(
                r#"<div class="error">Connection Error: {}</div>"#,
                escape_html(message)
            ),
        }
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// The single output region a submission renders into.
pub trait ResultDisplay: Send + Sync {
    /// Replace whatever is shown with `state`.
    fn show(&self, state: RenderState);
}

/// Shared in-memory display; clones see the same region.
#[derive(Debug, Clone, Default)]
pub struct DisplayRegion {
    state: Arc<RwLock<RenderState>>,
}

impl DisplayRegion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> RenderState {
        match self.state.read() {
            Ok(state) => state.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn html(&self) -> String {
        self.current().to_html()
    }
}

impl ResultDisplay for DisplayRegion {
    fn show(&self, state: RenderState) {
        let mut guard = match self.state.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = state;
    }
}
