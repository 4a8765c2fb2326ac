//! Booking lifecycle: status machine, payment states, and the server-side
//! cost computation. Statuses move `Pending -> Confirmed -> Ongoing ->
//! Completed`, with `Rejected` and `Cancelled` as the other terminal exits.

use std::fmt;
use std::str::FromStr;

pub const MIN_DURATION_HOURS: i64 = 1;
pub const MAX_DURATION_HOURS: i64 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Ongoing,
    Completed,
    Rejected,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "Pending",
            BookingStatus::Confirmed => "Confirmed",
            BookingStatus::Ongoing => "Ongoing",
            BookingStatus::Completed => "Completed",
            BookingStatus::Rejected => "Rejected",
            BookingStatus::Cancelled => "Cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BookingStatus::Completed | BookingStatus::Rejected | BookingStatus::Cancelled
        )
    }

    /// The admin console may set any status except `Pending`. There is no
    /// legality check on the source state; last write wins.
    pub fn admin_settable(&self) -> bool {
        !matches!(self, BookingStatus::Pending)
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "Pending" => Ok(BookingStatus::Pending),
            "Confirmed" => Ok(BookingStatus::Confirmed),
            "Ongoing" => Ok(BookingStatus::Ongoing),
            "Completed" => Ok(BookingStatus::Completed),
            "Rejected" => Ok(BookingStatus::Rejected),
            "Cancelled" => Ok(BookingStatus::Cancelled),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    Unpaid,
    Paid,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Unpaid => "Unpaid",
            PaymentStatus::Paid => "Paid",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentPreference {
    PayNow,
    PayLater,
}

impl PaymentPreference {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentPreference::PayNow => "pay-now",
            PaymentPreference::PayLater => "pay-later",
        }
    }
}

impl FromStr for PaymentPreference {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pay-now" => Ok(PaymentPreference::PayNow),
            "pay-later" => Ok(PaymentPreference::PayLater),
            _ => Err(()),
        }
    }
}

pub fn duration_in_bounds(duration: i64) -> bool {
    (MIN_DURATION_HOURS..=MAX_DURATION_HOURS).contains(&duration)
}

/// Computed once at booking creation from the offering's current hourly
/// price; frozen thereafter regardless of later price edits.
pub fn total_cost(duration: i64, price_per_hour: f64) -> f64 {
    duration as f64 * price_per_hour
}

/// Amount in the smallest currency unit, as the payment processor expects.
pub fn amount_minor(duration: i64, price_per_hour: f64) -> i64 {
    (total_cost(duration, price_per_hour) * 100.0).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cost_is_duration_times_price() {
        for duration in MIN_DURATION_HOURS..=MAX_DURATION_HOURS {
            assert_eq!(total_cost(duration, 500.0), duration as f64 * 500.0);
        }
        assert_eq!(total_cost(3, 500.0), 1500.0);
        assert_eq!(amount_minor(3, 500.0), 150_000);
    }

    #[test]
    fn duration_bounds() {
        assert!(!duration_in_bounds(0));
        assert!(duration_in_bounds(1));
        assert!(duration_in_bounds(24));
        assert!(!duration_in_bounds(25));
        assert!(!duration_in_bounds(-3));
    }

    #[test]
    fn status_round_trips() {
        for status in [
            BookingStatus::Pending,
            BookingStatus::Confirmed,
            BookingStatus::Ongoing,
            BookingStatus::Completed,
            BookingStatus::Rejected,
            BookingStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<BookingStatus>(), Ok(status));
        }
        assert!("pending".parse::<BookingStatus>().is_err());
        assert!("Done".parse::<BookingStatus>().is_err());
    }

    #[test]
    fn terminal_states() {
        assert!(!BookingStatus::Pending.is_terminal());
        assert!(!BookingStatus::Confirmed.is_terminal());
        assert!(!BookingStatus::Ongoing.is_terminal());
        assert!(BookingStatus::Completed.is_terminal());
        assert!(BookingStatus::Rejected.is_terminal());
        assert!(BookingStatus::Cancelled.is_terminal());
    }

    #[test]
    fn admin_may_set_everything_but_pending() {
        assert!(!BookingStatus::Pending.admin_settable());
        assert!(BookingStatus::Confirmed.admin_settable());
        assert!(BookingStatus::Ongoing.admin_settable());
        assert!(BookingStatus::Completed.admin_settable());
        assert!(BookingStatus::Rejected.admin_settable());
        assert!(BookingStatus::Cancelled.admin_settable());
    }

    #[test]
    fn payment_preference_parses() {
        assert_eq!("pay-now".parse(), Ok(PaymentPreference::PayNow));
        assert_eq!("pay-later".parse(), Ok(PaymentPreference::PayLater));
        assert!("cash".parse::<PaymentPreference>().is_err());
    }
}
