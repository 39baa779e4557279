use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use platewise_shared::date_key;
use serde::Serialize;
use time::Date;

use crate::{Meal, Plan, calendar};

/// One canonical day on the merged timeline, built fresh on every merge
/// from the winning (plan, day) pair for its date.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEntry {
    pub date_key: String,
    pub plan_id: String,
    pub day_index: usize,
    pub meals: Vec<Meal>,
    pub overlap: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Timeline {
    pub entries: Vec<TimelineEntry>,
    pub has_overlap: bool,
}

impl Timeline {
    pub fn index_of(&self, date_key: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.date_key == date_key)
    }

    /// Entry to present first for the given day. "Today" is threaded in by
    /// the caller; an absent key falls back to the first entry.
    pub fn focus(&self, today: Date) -> usize {
        self.index_of(&date_key(today)).unwrap_or(0)
    }
}

struct Candidate<'a> {
    plan: &'a Plan,
    day_index: usize,
}

/// Merges every active plan's addressable days into one date-ordered
/// timeline. When several (plan, day) pairs land on the same date, the pair
/// from the plan with the greatest `created_at` wins (ties broken by the
/// greater plan id, so output never depends on input order); the losers are
/// dropped but mark the surviving entry as overlapping.
pub fn merge(plans: &[Plan]) -> Timeline {
    let mut groups: BTreeMap<String, (Candidate<'_>, bool)> = BTreeMap::new();

    for plan in plans.iter().filter(|p| p.is_active()) {
        for day_index in 0..plan.days.len() {
            let Some(date) = calendar::resolve_date(plan, day_index) else {
                continue;
            };

            let candidate = Candidate { plan, day_index };
            match groups.entry(date_key(date)) {
                Entry::Vacant(slot) => {
                    slot.insert((candidate, false));
                }
                Entry::Occupied(mut slot) => {
                    if wins_over(candidate.plan, slot.get().0.plan) {
                        slot.insert((candidate, true));
                    } else {
                        slot.get_mut().1 = true;
                    }
                }
            }
        }
    }

    let mut has_overlap = false;
    let entries = groups
        .into_iter()
        .map(|(date_key, (winner, overlap))| {
            has_overlap |= overlap;
            TimelineEntry {
                date_key,
                plan_id: winner.plan.id.clone(),
                day_index: winner.day_index,
                meals: winner.plan.days[winner.day_index].meals.clone(),
                overlap,
            }
        })
        .collect();

    Timeline {
        entries,
        has_overlap,
    }
}

fn wins_over(challenger: &Plan, incumbent: &Plan) -> bool {
    (challenger.created_at, challenger.id.as_str())
        > (incumbent.created_at, incumbent.id.as_str())
}
