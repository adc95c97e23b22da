// Total price estimation: nights times nightly rate

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};

pub struct PriceEstimator;

impl PriceEstimator {
    /// Whole nights between the two dates, rounded up. Calendar dates carry
    /// no time of day, so this is the plain day difference.
    pub fn nights(check_in: NaiveDate, check_out: NaiveDate) -> i64 {
        (check_out - check_in).num_days()
    }

    /// `nights * rate` rounded to cents, or `None` when there is nothing to
    /// charge for (no nights or no positive rate) or the product overflows.
    pub fn estimate(check_in: NaiveDate, check_out: NaiveDate, nightly_rate: Decimal) -> Option<Decimal> {
        let nights = Self::nights(check_in, check_out);
        if nights <= 0 || nightly_rate <= Decimal::ZERO {
            return None;
        }

        // Page-supplied rates can be arbitrarily large; overflow means no estimate
        let mut total = nightly_rate
            .checked_mul(Decimal::from(nights))?
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        total.rescale(2);
        Some(total)
    }

    // Two-decimal rendering used for the total price field
    pub fn format_total(total: Decimal) -> String {
        let mut total = total.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        total.rescale(2);
        total.to_string()
    }
}
