use chrono::{DateTime, Datelike, Days, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::config::{IterationConfig, OrgConfig};
use crate::error::{BootstrapError, BootstrapResult};

/// Monday of the ISO week containing `now` as seen in `timezone`, through
/// that Monday plus `length_days - 1`.
pub fn current_week_window(
    timezone: &str,
    length_days: u32,
    now: DateTime<Utc>,
) -> BootstrapResult<(NaiveDate, NaiveDate)> {
    let tz: Tz = timezone
        .parse()
        .map_err(|_| BootstrapError::Timezone(timezone.to_string()))?;
    let today = now.with_timezone(&tz).date_naive();
    let monday = today - Days::new(u64::from(today.weekday().num_days_from_monday()));
    let end = monday
        .checked_add_days(Days::new(u64::from(length_days.saturating_sub(1))))
        .ok_or_else(|| {
            BootstrapError::Config(format!(
                "iteration of {length_days} days starting {monday} ends past the last supported date"
            ))
        })?;
    Ok((monday, end))
}

/// Dates for the configured iteration. Both configured dates are used
/// verbatim; if either is missing, both are computed from the current week.
pub fn iteration_window(
    iteration: &IterationConfig,
    org: &OrgConfig,
    now: DateTime<Utc>,
) -> BootstrapResult<(NaiveDate, NaiveDate)> {
    match (iteration.start_date, iteration.end_date) {
        (Some(start), Some(end)) => Ok((start, end)),
        _ => current_week_window(&org.timezone, org.iteration_length_days, now),
    }
}
