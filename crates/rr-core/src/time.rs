//! Model clock: maps routing step counts to wall/model timestamps.

use chrono::{Duration, NaiveDateTime};

use crate::{RrError, RrResult};

/// Fixed-step simulation clock.
///
/// `t0` is the model time of step 0; every routing step advances the
/// clock by `dt_s` seconds. All window-builder and parity bookkeeping
/// derives timestamps through this type so that step arithmetic lives in
/// exactly one place.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModelClock {
    pub t0: NaiveDateTime,
    pub dt_s: u32,
}

impl ModelClock {
    pub fn new(t0: NaiveDateTime, dt_s: u32) -> RrResult<Self> {
        if dt_s == 0 {
            return Err(RrError::InvalidArg {
                what: "dt_s must be positive",
            });
        }
        Ok(Self { t0, dt_s })
    }

    /// Model time after `steps` routing steps.
    pub fn timestamp_at(&self, steps: u64) -> NaiveDateTime {
        self.t0 + Duration::seconds(steps as i64 * self.dt_s as i64)
    }

    /// Number of whole routing steps covering `seconds` of model time.
    pub fn steps_in_seconds(&self, seconds: u64) -> u64 {
        seconds / self.dt_s as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn t(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, 0)
            .unwrap()
    }

    #[test]
    fn clock_advances_by_steps() {
        let clock = ModelClock::new(t(2021, 8, 23, 13, 0), 300).unwrap();
        // 12 five-minute steps per hour
        assert_eq!(clock.timestamp_at(12), t(2021, 8, 23, 14, 0));
        assert_eq!(clock.timestamp_at(288), t(2021, 8, 24, 13, 0));
    }

    #[test]
    fn clock_rejects_zero_dt() {
        assert!(ModelClock::new(t(2021, 8, 23, 13, 0), 0).is_err());
    }

    #[test]
    fn steps_in_seconds_truncates() {
        let clock = ModelClock::new(t(2021, 8, 23, 13, 0), 300).unwrap();
        assert_eq!(clock.steps_in_seconds(3600), 12);
        assert_eq!(clock.steps_in_seconds(3599), 11);
    }
}
