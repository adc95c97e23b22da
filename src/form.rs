// Form field model
// The controller mutates these; a host renders them

use chrono::NaiveDate;

pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

// Parses a raw date input value; anything that is not YYYY-MM-DD counts as empty
pub fn parse_input_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(raw, ISO_DATE_FORMAT).ok()
}

pub fn format_iso(date: NaiveDate) -> String {
    date.format(ISO_DATE_FORMAT).to_string()
}

/// A date input with a minimum selectable date.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateField {
    value: Option<NaiveDate>,
    min: Option<NaiveDate>,
}

impl DateField {
    pub fn with_min(min: NaiveDate) -> Self {
        Self {
            value: None,
            min: Some(min),
        }
    }

    pub fn value(&self) -> Option<NaiveDate> {
        self.value
    }

    // What the input would report as its value: "" when empty
    pub fn value_str(&self) -> String {
        self.value.map(format_iso).unwrap_or_default()
    }

    pub fn set(&mut self, value: Option<NaiveDate>) {
        self.value = value;
    }

    pub fn clear(&mut self) {
        self.value = None;
    }

    pub fn min(&self) -> Option<NaiveDate> {
        self.min
    }

    pub fn set_min(&mut self, min: NaiveDate) {
        self.min = Some(min);
    }

    pub fn is_selectable(&self, date: NaiveDate) -> bool {
        self.min.map_or(true, |min| date >= min)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelTone {
    Affirmative,
    Negative,
}

// The availability message box under the date fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessagePanel {
    visible: bool,
    tone: PanelTone,
    text: String,
}

impl Default for MessagePanel {
    fn default() -> Self {
        Self {
            visible: false,
            tone: PanelTone::Negative,
            text: String::new(),
        }
    }
}

impl MessagePanel {
    pub fn show(&mut self, tone: PanelTone, text: impl Into<String>) {
        self.visible = true;
        self.tone = tone;
        self.text = text.into();
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn tone(&self) -> PanelTone {
        self.tone
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn css_class(&self) -> &'static str {
        if !self.visible {
            return "hidden";
        }
        match self.tone {
            PanelTone::Affirmative => "p-4 mb-4 bg-green-100 text-green-700 rounded-md",
            PanelTone::Negative => "p-4 mb-4 bg-red-100 text-red-700 rounded-md",
        }
    }
}

/// Request token attached to every availability query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(pub u64);

/// Submit control state.
///
/// `Unknown -> Checking -> {Available, Unavailable}`, back to `Unknown`
/// whenever a date is cleared. Only `Available` enables submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmitState {
    #[default]
    Unknown,
    Checking(RequestToken),
    Available,
    Unavailable,
}

impl SubmitState {
    pub fn is_enabled(&self) -> bool {
        matches!(self, SubmitState::Available)
    }

    pub fn is_disabled(&self) -> bool {
        !self.is_enabled()
    }
}

// Full form state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    pub check_in: DateField,
    pub check_out: DateField,
    pub room: Option<String>,
    pub total_price: String,
    pub panel: MessagePanel,
    pub submit: SubmitState,
}

impl FormState {
    // Both date fields start with today as their minimum
    pub fn new(today: NaiveDate) -> Self {
        Self {
            check_in: DateField::with_min(today),
            check_out: DateField::with_min(today),
            ..Default::default()
        }
    }
}
