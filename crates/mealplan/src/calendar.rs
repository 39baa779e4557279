use time::{Date, Duration};

use crate::Plan;

/// Resolves the calendar date of one plan day.
///
/// An explicit day date is authoritative, even when it disagrees with the
/// sequence implied by the plan's start date. Without one, the date is
/// implied as `start_date + day_index` days, computed on calendar
/// components so no timezone can shift it. A day with neither is
/// unaddressable: it stays reachable by direct plan/day navigation but
/// cannot be placed on the timeline.
pub fn resolve_date(plan: &Plan, day_index: usize) -> Option<Date> {
    let day = plan.days.get(day_index)?;

    if let Some(date) = day.date {
        return Some(date);
    }

    plan.start_date?.checked_add(Duration::days(day_index as i64))
}
