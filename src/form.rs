//! Reading the evaluation form.
//!
//! The collector never looks up a global document: callers hand it a
//! [`FormSource`], either a parsed HTML document ([`HtmlForm`]) or the pairs a
//! browser posted ([`FieldMap`]).

use std::collections::HashMap;

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::error::FormError;
use crate::models::EvaluationRequest;

static ELEMENTS_WITH_ID: Lazy<Selector> =
    Lazy::new(|| Selector::parse("[id]").expect("static selector"));
static OPTIONS: Lazy<Selector> = Lazy::new(|| Selector::parse("option").expect("static selector"));

/// The seven controls of the evaluation form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldId {
    IsSriLankan,
    LoanType,
    Age,
    Income,
    Dti,
    CribScore,
    HasArrears,
}

impl FieldId {
    pub const ALL: [FieldId; 7] = [
        FieldId::IsSriLankan,
        FieldId::LoanType,
        FieldId::Age,
        FieldId::Income,
        FieldId::Dti,
        FieldId::CribScore,
        FieldId::HasArrears,
    ];

    /// Element id (and form field name) of the control.
    pub fn id(self) -> &'static str {
        match self {
            FieldId::IsSriLankan => "is-srilankan",
            FieldId::LoanType => "loan-type",
            FieldId::Age => "age",
            FieldId::Income => "income",
            FieldId::Dti => "dti",
            FieldId::CribScore => "crib-score",
            FieldId::HasArrears => "has-arrears",
        }
    }

    pub fn is_checkbox(self) -> bool {
        matches!(self, FieldId::IsSriLankan | FieldId::HasArrears)
    }

    fn missing(self) -> FormError {
        FormError::MissingControl { id: self.id() }
    }
}

/// Anything the collector can read control values from.
pub trait FormSource {
    /// Current value of a value control (text, number, select).
    fn value(&self, field: FieldId) -> Result<String, FormError>;

    /// Whether a checkbox control is checked.
    fn checked(&self, field: FieldId) -> Result<bool, FormError>;
}

/// A user-initiated submit action.
#[derive(Debug, Default)]
pub struct SubmitEvent {
    default_prevented: bool,
}

impl SubmitEvent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Suppress the native submission (page navigation).
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// Builds an [`EvaluationRequest`] from the form's current values.
///
/// Native submission is suppressed before anything is read, so it stays
/// suppressed even when a control turns out to be missing. Values are
/// forwarded verbatim.
pub fn collect<F: FormSource + ?Sized>(
    event: &mut SubmitEvent,
    form: &F,
) -> Result<EvaluationRequest, FormError> {
    event.prevent_default();

    let request = EvaluationRequest {
        is_sri_lankan: form.checked(FieldId::IsSriLankan)?,
        loan_type: form.value(FieldId::LoanType)?,
        age: form.value(FieldId::Age)?,
        income: form.value(FieldId::Income)?,
        dti: form.value(FieldId::Dti)?,
        crib_score: form.value(FieldId::CribScore)?,
        has_previous_arrears: form.checked(FieldId::HasArrears)?,
    };
    debug!("Collected evaluation request: {:?}", request);
    Ok(request)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Control {
    value: String,
    checked: bool,
}

/// Control state read out of an HTML document.
#[derive(Debug, Clone, Default)]
pub struct HtmlForm {
    controls: HashMap<String, Control>,
}

impl HtmlForm {
    /// Parse a full document (or fragment) and capture every element with an id.
    pub fn parse(html: &str) -> Self {
        let document = Html::parse_document(html);
        let mut controls = HashMap::new();

        for element in document.select(&ELEMENTS_WITH_ID) {
            let Some(id) = element.value().id() else {
                continue;
            };
            // First element wins for duplicate ids, like getElementById.
            controls
                .entry(id.to_string())
                .or_insert_with(|| read_control(element));
        }

        Self { controls }
    }

    fn control(&self, field: FieldId) -> Result<&Control, FormError> {
        self.controls.get(field.id()).ok_or_else(|| field.missing())
    }
}

fn read_control(element: ElementRef<'_>) -> Control {
    let el = element.value();
    let value = match el.name() {
        "select" => selected_option(element),
        "textarea" => element.text().collect(),
        _ => el.attr("value").unwrap_or_default().to_string(),
    };
    Control {
        value,
        checked: el.attr("checked").is_some(),
    }
}

fn selected_option(select: ElementRef<'_>) -> String {
    let mut options = select.select(&OPTIONS).peekable();
    let first = options.peek().copied();
    let chosen = options
        .find(|option| option.value().attr("selected").is_some())
        .or(first);

    match chosen {
        Some(option) => match option.value().attr("value") {
            Some(value) => value.to_string(),
            None => option.text().collect::<String>().trim().to_string(),
        },
        None => String::new(),
    }
}

impl FormSource for HtmlForm {
    fn value(&self, field: FieldId) -> Result<String, FormError> {
        self.control(field).map(|control| control.value.clone())
    }

    fn checked(&self, field: FieldId) -> Result<bool, FormError> {
        self.control(field).map(|control| control.checked)
    }
}

/// Field name/value pairs as posted by a browser form.
///
/// Browsers leave unchecked checkboxes out of the body entirely, so a missing
/// checkbox reads as unchecked while a missing value control is an error.
#[derive(Debug, Clone, Default)]
pub struct FieldMap {
    fields: HashMap<String, String>,
}

impl FieldMap {
    pub fn new(fields: HashMap<String, String>) -> Self {
        Self { fields }
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(name.into(), value.into());
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FieldMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl FormSource for FieldMap {
    fn value(&self, field: FieldId) -> Result<String, FormError> {
        self.fields
            .get(field.id())
            .cloned()
            .ok_or_else(|| field.missing())
    }

    fn checked(&self, field: FieldId) -> Result<bool, FormError> {
        Ok(self
            .fields
            .get(field.id())
            .is_some_and(|v| !matches!(v.as_str(), "" | "off" | "false")))
    }
}
