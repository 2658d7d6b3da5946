pub mod enums;

use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

pub use enums::{AppointmentStatus, AveragePeriod, InvalidEnumValue, SubjectKind};

/// Active-vs-blocked head count for one subject kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityBreakdown {
    pub activos: i64,
    pub bloqueados: i64,
}

impl ActivityBreakdown {
    pub fn total(&self) -> i64 {
        self.activos + self.bloqueados
    }
}

/// The instant aggregations are evaluated against.
///
/// Lookback windows are anchored on `today`; block expiry is compared
/// against `now`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceTime {
    pub today: NaiveDate,
    pub now: NaiveDateTime,
}

impl ReferenceTime {
    /// Current local date and time.
    pub fn current() -> Self {
        let now = Local::now().naive_local();
        Self {
            today: now.date(),
            now,
        }
    }

    /// Midday on `today`, for callers that only care about the date.
    pub fn on(today: NaiveDate) -> Self {
        Self {
            today,
            now: today.and_hms_opt(12, 0, 0).unwrap_or_default(),
        }
    }
}
