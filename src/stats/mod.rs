//! Aggregation catalog over the hospital records.
//!
//! Every function is an independent read-only query against the
//! `Database` handle: a fixed SQL template plus optional scalar
//! parameters (lookback window, row limit), returning a scalar, a
//! small fixed struct, or a `Table`. No function depends on another's
//! result, so they can be called in any order and concurrently.
//!
//! Rankings break ties on the entity identifier ascending so that equal
//! counts always come back in the same order.

pub mod appointments;
pub mod patients;
pub mod physicians;
pub mod sites;
pub mod snapshot;

use chrono::{Months, NaiveDate};
use rusqlite::named_params;

use crate::db::{Database, DatabaseError};
use crate::models::{ActivityBreakdown, ReferenceTime, SubjectKind};

/// Default lookback for "active patients" (months).
pub const DEFAULT_ACTIVE_WINDOW_MONTHS: u32 = 6;
/// Default lookback for the monthly appointment trend (months).
pub const DEFAULT_TREND_WINDOW_MONTHS: u32 = 12;
/// Default row limit for top-N rankings.
pub const DEFAULT_TOP_LIMIT: u32 = 10;

const BLOCKED_LABEL: &str = "Bloqueados";

/// First day included in a lookback window of `months` ending on `today`.
pub fn window_start(today: NaiveDate, months: u32) -> NaiveDate {
    today
        .checked_sub_months(Months::new(months))
        .unwrap_or(NaiveDate::MIN)
}

/// Round to two decimals, the precision every ratio is reported with.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Timestamp layout used by `user_blocks.blocked_until`.
pub(crate) fn format_timestamp(at: &ReferenceTime) -> String {
    at.now.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Classify every subject of `kind` as blocked or active.
///
/// A subject is blocked when at least one active block record exists for
/// it whose expiry is unset or still in the future. Counting subjects
/// rather than block rows keeps `activos + bloqueados` equal to the
/// number of registered subjects.
pub(crate) fn block_breakdown(
    db: &Database,
    kind: SubjectKind,
    at: &ReferenceTime,
) -> Result<ActivityBreakdown, DatabaseError> {
    let (subjects, identifier) = match kind {
        SubjectKind::Patient => ("users", "CAST(s.user_id AS TEXT)"),
        SubjectKind::Physician => ("medicos", "s.identificacion"),
    };

    let sql = format!(
        "SELECT
            CASE
                WHEN EXISTS (
                    SELECT 1 FROM user_blocks ub
                    WHERE ub.user_identifier = {identifier}
                      AND ub.user_type = :kind
                      AND ub.is_active = 1
                      AND (ub.blocked_until IS NULL OR ub.blocked_until > :now)
                )
                THEN 'Bloqueados'
                ELSE 'Activos'
            END AS estado,
            COUNT(*) AS cantidad
         FROM {subjects} s
         GROUP BY estado"
    );

    let now = format_timestamp(at);
    let table = db.execute_query(
        &sql,
        named_params! { ":kind": kind.as_str(), ":now": now },
    )?;

    let labels = table.texts("estado")?;
    let counts = table.numbers("cantidad")?;

    let mut breakdown = ActivityBreakdown::default();
    for (label, count) in labels.iter().zip(counts) {
        if label == BLOCKED_LABEL {
            breakdown.bloqueados = count as i64;
        } else {
            breakdown.activos = count as i64;
        }
    }
    Ok(breakdown)
}
