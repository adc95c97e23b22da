// Booking form controller
// Events are routed through an explicit (target, kind) -> handlers table

use crate::availability::{
    AvailabilityChecker, AvailabilityClient, AvailabilityError, AvailabilityQuery,
    AvailabilityResult, HttpAvailabilityClient,
};
use crate::config::{PageConfig, RoomOption};
use crate::dates::{DateRange, DateRangeValidator, RangeError, Rejection, BOOKED_DATE_ALERT};
use crate::form::{parse_input_date, DateField, FormState, RequestToken};
use crate::gallery::GalleryController;
use crate::pricing::PriceEstimator;
use chrono::NaiveDate;
use futures::future::join_all;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("Submission is disabled until the dates are confirmed available")]
    SubmitDisabled,

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Unknown room: {0}")]
    UnknownRoom(String),

    #[error("Invalid date range: {0}")]
    InvalidRange(#[from] RangeError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    CheckIn,
    CheckOut,
    Room,
    Thumbnail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Input,
    Change,
    Click,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    // Raw field value as the input reports it ("" when empty)
    Value(String),
    Index(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormEvent {
    pub target: Target,
    pub kind: EventKind,
    pub payload: Payload,
}

impl FormEvent {
    pub fn input(target: Target, value: impl Into<String>) -> Self {
        Self {
            target,
            kind: EventKind::Input,
            payload: Payload::Value(value.into()),
        }
    }

    pub fn change(target: Target, value: impl Into<String>) -> Self {
        Self {
            target,
            kind: EventKind::Change,
            payload: Payload::Value(value.into()),
        }
    }

    pub fn thumbnail_click(index: usize) -> Self {
        Self {
            target: Target::Thumbnail,
            kind: EventKind::Click,
            payload: Payload::Index(index),
        }
    }

    fn value(&self) -> Option<&str> {
        match &self.payload {
            Payload::Value(value) => Some(value),
            Payload::Index(_) => None,
        }
    }
}

// Work the host has to carry out after a dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Alert(String),
    QueryAvailability(AvailabilityQuery),
}

impl Effect {
    pub fn as_query(&self) -> Option<&AvailabilityQuery> {
        match self {
            Effect::QueryAvailability(query) => Some(query),
            Effect::Alert(_) => None,
        }
    }
}

pub type Handler = fn(&mut BookingFormController, &FormEvent, &mut Vec<Effect>);

#[derive(Clone, Default)]
pub struct EventTable {
    handlers: HashMap<(Target, EventKind), Vec<Handler>>,
}

impl EventTable {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The booking page wiring.
    pub fn standard() -> Self {
        let mut table = Self::empty();
        table
            .on(Target::CheckIn, EventKind::Input, set_date_value)
            .on(Target::CheckIn, EventKind::Input, reject_booked_date)
            .on(Target::CheckIn, EventKind::Input, invalidate_availability)
            .on(Target::CheckOut, EventKind::Input, set_date_value)
            .on(Target::CheckOut, EventKind::Input, reject_booked_date)
            .on(Target::CheckOut, EventKind::Input, invalidate_availability)
            .on(Target::CheckIn, EventKind::Change, set_date_value)
            .on(Target::CheckIn, EventKind::Change, reject_booked_date)
            .on(Target::CheckIn, EventKind::Change, reject_unselectable_date)
            .on(Target::CheckIn, EventKind::Change, update_check_out_minimum)
            .on(Target::CheckIn, EventKind::Change, estimate_price)
            .on(Target::CheckIn, EventKind::Change, refresh_availability)
            .on(Target::CheckOut, EventKind::Change, set_date_value)
            .on(Target::CheckOut, EventKind::Change, reject_booked_date)
            .on(Target::CheckOut, EventKind::Change, reject_unselectable_date)
            .on(Target::CheckOut, EventKind::Change, estimate_price)
            .on(Target::CheckOut, EventKind::Change, refresh_availability)
            .on(Target::Room, EventKind::Change, select_room)
            .on(Target::Room, EventKind::Change, estimate_price)
            .on(Target::Thumbnail, EventKind::Click, select_thumbnail);
        table
    }

    // Handlers run in registration order
    pub fn on(&mut self, target: Target, kind: EventKind, handler: Handler) -> &mut Self {
        self.handlers.entry((target, kind)).or_default().push(handler);
        self
    }

    pub fn handlers(&self, target: Target, kind: EventKind) -> &[Handler] {
        self.handlers
            .get(&(target, kind))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

impl std::fmt::Debug for EventTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut entries: Vec<_> = self
            .handlers
            .iter()
            .map(|(key, handlers)| (*key, handlers.len()))
            .collect();
        entries.sort_by_key(|((target, kind), _)| (*target as u8, *kind as u8));
        f.debug_map().entries(entries).finish()
    }
}

// What the form hands over once the guest submits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingSubmission {
    pub room_id: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub nights: i64,
    pub total_price: Decimal,
}

#[derive(Debug)]
pub struct BookingFormController {
    config: PageConfig,
    form: FormState,
    validator: DateRangeValidator,
    checker: AvailabilityChecker,
    gallery: GalleryController,
    table: EventTable,
}

impl BookingFormController {
    pub fn new(config: PageConfig) -> Self {
        Self::with_table(config, EventTable::standard())
    }

    pub fn with_table(config: PageConfig, table: EventTable) -> Self {
        let today = config.resolve_today();
        Self {
            form: FormState::new(today),
            validator: DateRangeValidator::new(config.booked_dates.clone(), today),
            checker: AvailabilityChecker::new(),
            gallery: GalleryController::new(config.thumbnails.clone(), config.main_image.clone()),
            table,
            config,
        }
    }

    pub fn config(&self) -> &PageConfig {
        &self.config
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn gallery(&self) -> &GalleryController {
        &self.gallery
    }

    pub fn table_mut(&mut self) -> &mut EventTable {
        &mut self.table
    }

    pub fn date_range(&self) -> DateRange {
        DateRange::new(self.form.check_in.value(), self.form.check_out.value())
    }

    // The explicitly selected room, or the page's only room
    pub fn selected_room(&self) -> Option<&RoomOption> {
        match &self.form.room {
            Some(id) => self.config.room(id),
            None if self.config.rooms.len() == 1 => self.config.rooms.first(),
            None => None,
        }
    }

    pub fn dispatch(&mut self, event: FormEvent) -> Vec<Effect> {
        let handlers = self.table.handlers(event.target, event.kind).to_vec();
        if handlers.is_empty() {
            debug!(field = ?event.target, kind = ?event.kind, "no handlers registered");
        }

        let mut effects = Vec::new();
        for handler in handlers {
            handler(self, &event, &mut effects);
        }
        effects
    }

    pub fn apply_availability(
        &mut self,
        token: RequestToken,
        outcome: Result<AvailabilityResult, AvailabilityError>,
    ) -> bool {
        self.checker.complete(token, outcome, &mut self.form)
    }

    pub fn submit(&self) -> Result<BookingSubmission, FormError> {
        if self.form.submit.is_disabled() {
            return Err(FormError::SubmitDisabled);
        }
        // An answer only vouches for the dates it was asked about
        if !self.checker.covers(&self.date_range()) {
            return Err(FormError::SubmitDisabled);
        }

        let (check_in, check_out) = self.date_range().validate(self.validator.today())?;
        let room = match (&self.form.room, self.selected_room()) {
            (_, Some(room)) => room,
            (Some(id), None) => return Err(FormError::UnknownRoom(id.clone())),
            (None, None) => return Err(FormError::MissingField("room")),
        };

        let nights = PriceEstimator::nights(check_in, check_out);
        let total_price = PriceEstimator::estimate(check_in, check_out, room.nightly_rate)
            .unwrap_or(Decimal::ZERO);

        Ok(BookingSubmission {
            room_id: room.id.clone(),
            check_in,
            check_out,
            nights,
            total_price,
        })
    }

    fn date_field_mut(&mut self, target: Target) -> Option<&mut DateField> {
        match target {
            Target::CheckIn => Some(&mut self.form.check_in),
            Target::CheckOut => Some(&mut self.form.check_out),
            Target::Room | Target::Thumbnail => None,
        }
    }

    fn screen_date(
        &mut self,
        target: Target,
        screen: fn(&DateRangeValidator, &mut DateField) -> Option<Rejection>,
    ) -> Option<Rejection> {
        let field = match target {
            Target::CheckIn => &mut self.form.check_in,
            Target::CheckOut => &mut self.form.check_out,
            Target::Room | Target::Thumbnail => return None,
        };
        screen(&self.validator, field)
    }
}

// -- Standard handlers --

pub fn set_date_value(ctrl: &mut BookingFormController, event: &FormEvent, _effects: &mut Vec<Effect>) {
    let value = event.value().and_then(parse_input_date);
    if let Some(field) = ctrl.date_field_mut(event.target) {
        field.set(value);
    }
}

pub fn reject_booked_date(ctrl: &mut BookingFormController, event: &FormEvent, effects: &mut Vec<Effect>) {
    if let Some(Rejection::Booked) = ctrl.screen_date(event.target, DateRangeValidator::reject_booked) {
        effects.push(Effect::Alert(BOOKED_DATE_ALERT.to_string()));
    }
}

pub fn reject_unselectable_date(ctrl: &mut BookingFormController, event: &FormEvent, _effects: &mut Vec<Effect>) {
    ctrl.screen_date(event.target, DateRangeValidator::reject_unselectable);
}

pub fn update_check_out_minimum(ctrl: &mut BookingFormController, _event: &FormEvent, _effects: &mut Vec<Effect>) {
    if let Some(check_in) = ctrl.form.check_in.value() {
        ctrl.validator.apply_check_in(check_in, &mut ctrl.form.check_out);
    }
}

// Leaves the total untouched when anything is missing
pub fn estimate_price(ctrl: &mut BookingFormController, _event: &FormEvent, _effects: &mut Vec<Effect>) {
    let (Some(check_in), Some(check_out)) = (ctrl.form.check_in.value(), ctrl.form.check_out.value()) else {
        return;
    };
    let Some(rate) = ctrl.selected_room().map(|room| room.nightly_rate) else {
        return;
    };

    if let Some(total) = PriceEstimator::estimate(check_in, check_out, rate) {
        let rendered = PriceEstimator::format_total(total);
        debug!(check_in = %check_in, check_out = %check_out, total = %rendered, "total price updated");
        ctrl.form.total_price = rendered;
    }
}

pub fn refresh_availability(ctrl: &mut BookingFormController, _event: &FormEvent, effects: &mut Vec<Effect>) {
    match ctrl.date_range().complete() {
        Some((check_in, check_out)) => {
            let query = ctrl.checker.begin(check_in, check_out, &mut ctrl.form);
            effects.push(Effect::QueryAvailability(query));
        }
        None => ctrl.checker.reset(&mut ctrl.form),
    }
}

// Drops an answer the current dates no longer match; the next change re-queries
pub fn invalidate_availability(ctrl: &mut BookingFormController, _event: &FormEvent, _effects: &mut Vec<Effect>) {
    let range = ctrl.date_range();
    if range.is_cleared() || !ctrl.checker.covers(&range) {
        ctrl.checker.reset(&mut ctrl.form);
    }
}

pub fn select_room(ctrl: &mut BookingFormController, event: &FormEvent, _effects: &mut Vec<Effect>) {
    ctrl.form.room = event
        .value()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(String::from);
}

pub fn select_thumbnail(ctrl: &mut BookingFormController, event: &FormEvent, _effects: &mut Vec<Effect>) {
    if let Payload::Index(index) = event.payload {
        if let Err(e) = ctrl.gallery.select(index) {
            warn!(error = %e, "thumbnail click ignored");
        }
    }
}

// Effects of a detached dispatch plus the spawned availability queries
pub struct Dispatched {
    pub effects: Vec<Effect>,
    pub pending: Vec<JoinHandle<bool>>,
}

/// A controller shared between the event source and in-flight availability
/// queries. The lock is never held across an await.
#[derive(Clone)]
pub struct SharedController {
    inner: Arc<Mutex<BookingFormController>>,
    client: Arc<dyn AvailabilityClient>,
}

impl SharedController {
    pub fn new(controller: BookingFormController, client: Arc<dyn AvailabilityClient>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(controller)),
            client,
        }
    }

    pub fn from_config(config: PageConfig) -> Result<Self, AvailabilityError> {
        let client = HttpAvailabilityClient::new(config.availability_url.clone(), &config.client)?;
        Ok(Self::new(BookingFormController::new(config), Arc::new(client)))
    }

    pub fn snapshot(&self) -> FormState {
        self.inner.lock().form().clone()
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut BookingFormController) -> R) -> R {
        let mut controller = self.inner.lock();
        f(&mut *controller)
    }

    /// Dispatches the event and waits for every availability query it
    /// started.
    pub async fn dispatch(&self, event: FormEvent) -> Vec<Effect> {
        let effects = self.inner.lock().dispatch(event);

        let queries: Vec<AvailabilityQuery> = effects.iter().filter_map(Effect::as_query).copied().collect();
        join_all(queries.into_iter().map(|query| self.run_query(query))).await;

        effects
    }

    /// Dispatches the event and leaves its availability queries running on
    /// the tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime, since the queries are
    /// spawned onto the current one.
    pub fn dispatch_detached(&self, event: FormEvent) -> Dispatched {
        let effects = self.inner.lock().dispatch(event);

        let pending = effects
            .iter()
            .filter_map(Effect::as_query)
            .copied()
            .map(|query| {
                let shared = self.clone();
                tokio::spawn(async move { shared.run_query(query).await })
            })
            .collect();

        Dispatched { effects, pending }
    }

    pub async fn run_query(&self, query: AvailabilityQuery) -> bool {
        let outcome = self.client.check(&query).await;
        self.inner.lock().apply_availability(query.token, outcome)
    }
}
