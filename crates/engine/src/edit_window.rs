//! Age limit for editing a transaction.

use chrono::{DateTime, Duration, Utc};

/// How long after creation a transaction may still be updated.
pub const EDIT_WINDOW: Duration = Duration::hours(12);

/// `true` while `now - created_at <= EDIT_WINDOW`. Exactly twelve hours is
/// still editable.
pub fn can_edit(created_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now.signed_duration_since(created_at) <= EDIT_WINDOW
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn created() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 14, 8, 0, 0).unwrap()
    }

    #[test]
    fn editable_just_before_the_limit() {
        let now = created() + Duration::hours(11) + Duration::minutes(59);
        assert!(can_edit(created(), now));
    }

    #[test]
    fn editable_at_exactly_twelve_hours() {
        assert!(can_edit(created(), created() + EDIT_WINDOW));
    }

    #[test]
    fn locked_just_after_the_limit() {
        let now = created() + Duration::hours(12) + Duration::minutes(1);
        assert!(!can_edit(created(), now));

        let now = created() + EDIT_WINDOW + Duration::milliseconds(1);
        assert!(!can_edit(created(), now));
    }

    #[test]
    fn clock_skew_does_not_lock_records() {
        assert!(can_edit(created(), created() - Duration::minutes(5)));
    }
}
