// Headless controller for a hotel room booking form

pub mod availability;
pub mod config;
pub mod controller;
pub mod dates;
pub mod form;
pub mod gallery;
pub mod pricing;

// Re-export key types for convenience
pub use availability::{
    AvailabilityChecker, AvailabilityClient, AvailabilityError, AvailabilityQuery,
    AvailabilityResult, HttpAvailabilityClient,
};
pub use config::{BookedDates, ClientConfig, ConfigError, PageConfig, RoomOption, Thumbnail};
pub use controller::{
    BookingFormController, BookingSubmission, Dispatched, Effect, EventKind, EventTable,
    FormError, FormEvent, Handler, Payload, SharedController, Target,
};
pub use dates::{DateRange, DateRangeValidator, RangeError, Rejection};
pub use form::{DateField, FormState, MessagePanel, PanelTone, RequestToken, SubmitState};
pub use gallery::{GalleryController, GalleryError};
pub use pricing::PriceEstimator;
