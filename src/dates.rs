// Date range validation for the check-in / check-out pair

use crate::config::BookedDates;
use crate::form::DateField;
use chrono::{Days, NaiveDate};
use thiserror::Error;
use tracing::debug;

pub const BOOKED_DATE_ALERT: &str = "This date is not available";

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeError {
    #[error("Check-in date is required")]
    MissingCheckIn,

    #[error("Check-out date is required")]
    MissingCheckOut,

    #[error("Check-out date must be after check-in date")]
    CheckOutNotAfterCheckIn,

    #[error("Check-in date cannot be in the past")]
    CheckInInPast,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub check_in: Option<NaiveDate>,
    pub check_out: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(check_in: Option<NaiveDate>, check_out: Option<NaiveDate>) -> Self {
        Self {
            check_in,
            check_out,
        }
    }

    // Both ends set and check-out strictly after check-in
    pub fn complete(&self) -> Option<(NaiveDate, NaiveDate)> {
        match (self.check_in, self.check_out) {
            (Some(check_in), Some(check_out)) if check_out > check_in => {
                Some((check_in, check_out))
            }
            _ => None,
        }
    }

    pub fn is_cleared(&self) -> bool {
        self.check_in.is_none() || self.check_out.is_none()
    }

    /// Submit-time validation: both dates present, check-in not before
    /// `today`, check-out after check-in.
    pub fn validate(&self, today: NaiveDate) -> Result<(NaiveDate, NaiveDate), RangeError> {
        let check_in = self.check_in.ok_or(RangeError::MissingCheckIn)?;
        let check_out = self.check_out.ok_or(RangeError::MissingCheckOut)?;

        if check_in >= check_out {
            return Err(RangeError::CheckOutNotAfterCheckIn);
        }
        if check_in < today {
            return Err(RangeError::CheckInInPast);
        }
        Ok((check_in, check_out))
    }
}

// Why a freshly entered date was thrown away
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    // Already reserved; the user is alerted
    Booked,
    // Disabled in the picker (past, or not after check-in); silently dropped
    BeforeMinimum,
}

#[derive(Debug, Clone)]
pub struct DateRangeValidator {
    booked: BookedDates,
    today: NaiveDate,
}

impl DateRangeValidator {
    pub fn new(booked: BookedDates, today: NaiveDate) -> Self {
        Self { booked, today }
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn is_booked(&self, date: &NaiveDate) -> bool {
        self.booked.contains(date)
    }

    /// Clears the field if it holds a booked date.
    pub fn reject_booked(&self, field: &mut DateField) -> Option<Rejection> {
        let date = field.value()?;
        if !self.is_booked(&date) {
            return None;
        }
        debug!(date = %date, "rejecting booked date");
        field.clear();
        Some(Rejection::Booked)
    }

    /// Clears the field if it holds a date below its current minimum.
    pub fn reject_unselectable(&self, field: &mut DateField) -> Option<Rejection> {
        let date = field.value()?;
        if field.is_selectable(date) {
            return None;
        }
        debug!(date = %date, min = ?field.min(), "rejecting date below minimum");
        field.clear();
        Some(Rejection::BeforeMinimum)
    }

    /// Runs both checks in order; booked dates win over disabled ones.
    pub fn screen(&self, field: &mut DateField) -> Option<Rejection> {
        self.reject_booked(field)
            .or_else(|| self.reject_unselectable(field))
    }

    /// Moves check-out's minimum to the day after `check_in` and drops a
    /// check-out that no longer lands after it. Returns true when check-out
    /// was cleared.
    pub fn apply_check_in(&self, check_in: NaiveDate, check_out: &mut DateField) -> bool {
        if let Some(next_day) = check_in.checked_add_days(Days::new(1)) {
            check_out.set_min(next_day);
        }

        match check_out.value() {
            Some(current) if current <= check_in => {
                debug!(check_in = %check_in, check_out = %current, "clearing check-out");
                check_out.clear();
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn validator() -> DateRangeValidator {
        DateRangeValidator::new(
            BookedDates::new([date("2024-06-01"), date("2024-06-20")]),
            date("2024-05-15"),
        )
    }

    #[test]
    fn test_booked_date_is_cleared() {
        let validator = validator();
        let mut field = DateField::with_min(validator.today());
        field.set(Some(date("2024-06-01")));

        assert_eq!(validator.reject_booked(&mut field), Some(Rejection::Booked));
        assert_eq!(field.value_str(), "");

        // Nothing left to reject on a second pass
        assert_eq!(validator.reject_booked(&mut field), None);
    }

    #[test]
    fn test_free_date_is_kept() {
        let validator = validator();
        let mut field = DateField::with_min(validator.today());
        field.set(Some(date("2024-06-02")));

        assert_eq!(validator.screen(&mut field), None);
        assert_eq!(field.value_str(), "2024-06-02");
    }

    #[test]
    fn test_past_date_is_dropped_silently() {
        let validator = validator();
        let mut field = DateField::with_min(validator.today());
        field.set(Some(date("2024-05-14")));

        assert_eq!(validator.screen(&mut field), Some(Rejection::BeforeMinimum));
        assert_eq!(field.value(), None);
    }

    #[test_case("2024-06-05", Some("2024-06-10"), Some("2024-06-10"); "#1 later check-out kept")]
    #[test_case("2024-06-05", Some("2024-06-05"), None; "#2 same day check-out cleared")]
    #[test_case("2024-06-05", Some("2024-06-03"), None; "#3 earlier check-out cleared")]
    #[test_case("2024-06-05", None, None; "#4 empty check-out stays empty")]
    fn test_apply_check_in(check_in: &str, check_out: Option<&str>, expected: Option<&str>) {
        let validator = validator();
        let mut out_field = DateField::with_min(validator.today());
        out_field.set(check_out.map(date));

        let cleared = validator.apply_check_in(date(check_in), &mut out_field);

        assert_eq!(out_field.min(), Some(date(check_in).succ_opt().unwrap()));
        assert_eq!(out_field.value(), expected.map(date));
        assert_eq!(cleared, check_out.is_some() && expected.is_none());
    }

    #[test]
    fn test_range_complete() {
        let range = DateRange::new(Some(date("2024-06-01")), Some(date("2024-06-04")));
        assert_eq!(
            range.complete(),
            Some((date("2024-06-01"), date("2024-06-04")))
        );

        let inverted = DateRange::new(Some(date("2024-06-04")), Some(date("2024-06-01")));
        assert_eq!(inverted.complete(), None);

        let half = DateRange::new(Some(date("2024-06-04")), None);
        assert_eq!(half.complete(), None);
        assert!(half.is_cleared());
    }

    #[test_case(Some("2024-06-01"), Some("2024-06-04"), Ok(()); "#1 valid range")]
    #[test_case(None, Some("2024-06-04"), Err(RangeError::MissingCheckIn); "#2 missing check-in")]
    #[test_case(Some("2024-06-01"), None, Err(RangeError::MissingCheckOut); "#3 missing check-out")]
    #[test_case(Some("2024-06-04"), Some("2024-06-04"), Err(RangeError::CheckOutNotAfterCheckIn); "#4 zero nights")]
    #[test_case(Some("2024-05-01"), Some("2024-05-04"), Err(RangeError::CheckInInPast); "#5 past check-in")]
    fn test_range_validate(
        check_in: Option<&str>,
        check_out: Option<&str>,
        expected: Result<(), RangeError>,
    ) {
        let range = DateRange::new(check_in.map(date), check_out.map(date));
        let result = range.validate(date("2024-05-15")).map(|_| ());
        assert_eq!(result, expected);
    }
}
