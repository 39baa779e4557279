use platewise_recipe::{Recipe, RecipeChoice};
use platewise_shared::{Error, Notice, Result};
use validator::Validate;

use crate::{Meal, PlanStore, Planner, PlannerEvent, SwapReply, SyncState};

/// Phases of a swap session on one meal slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SwapPhase {
    #[default]
    Idle,
    Loading,
    ChoicesShown,
    Applying,
}

/// The one live swap session. Opening a session on any slot makes every
/// earlier session stale: a stale response fails the generation check on
/// arrival and is discarded.
#[derive(Clone, Debug)]
pub struct SwapSession {
    pub generation: u64,
    pub plan_id: String,
    pub day_index: usize,
    pub meal_id: String,
    pub phase: SwapPhase,
    pub choices: Vec<Recipe>,
}

impl<S: PlanStore + Clone> Planner<S> {
    /// Opens a swap session for one meal slot and starts fetching candidate
    /// replacements. Returns the session generation, or `None` when the
    /// slot does not exist.
    pub fn open_swap(
        &mut self,
        plan_id: impl Into<String>,
        day_index: usize,
        meal_index: usize,
        limit: usize,
    ) -> Option<u64> {
        let plan_id = plan_id.into();
        let meal = self.plan(&plan_id)?.meal(day_index, meal_index)?;
        let meal_id = meal.meal_id.clone();

        self.generation += 1;
        let generation = self.generation;
        let limit = limit.min(self.options.alternatives_cap);

        self.swap = Some(SwapSession {
            generation,
            plan_id: plan_id.clone(),
            day_index,
            meal_id,
            phase: SwapPhase::Loading,
            choices: Vec::new(),
        });

        let store = self.store.clone();
        let events = self.events.clone();

        tokio::spawn(async move {
            let result = store
                .list_alternatives(&plan_id, day_index, meal_index, limit)
                .await;
            let _ = events.send(PlannerEvent::Swap {
                generation,
                result: result.map(SwapReply::Loaded),
            });
        });

        Some(generation)
    }

    pub fn swap_phase(&self) -> SwapPhase {
        self.swap.as_ref().map(|s| s.phase).unwrap_or_default()
    }

    /// Candidate list of the live session, in store order. Empty until the
    /// fetch lands, and empty is also a valid answer from the store.
    pub fn swap_choices(&self) -> &[Recipe] {
        self.swap
            .as_ref()
            .map(|s| s.choices.as_slice())
            .unwrap_or_default()
    }

    /// Drops the live session. Responses already in flight die on the
    /// generation check.
    pub fn close_swap(&mut self) {
        self.swap = None;
    }

    /// Sends the chosen candidate to the store. The local slot is not
    /// touched until the fully-populated replacement comes back: a swap is
    /// a destructive replace, so a failed or malformed response must leave
    /// the slot exactly as it was.
    pub fn choose_alternative(&mut self, choice: RecipeChoice) -> bool {
        let Some(session) = self.swap.as_ref() else {
            return false;
        };
        if session.phase != SwapPhase::ChoicesShown {
            return false;
        }

        let generation = session.generation;
        let plan_id = session.plan_id.clone();
        let day_index = session.day_index;
        let meal_id = session.meal_id.clone();

        // the slot may have shifted since the session opened; re-address by id
        let meal_index = self
            .plan(&plan_id)
            .and_then(|p| p.day(day_index))
            .and_then(|d| d.meal_position(&meal_id));
        let Some(meal_index) = meal_index else {
            self.swap = None;
            return false;
        };

        if let Some(session) = self.swap.as_mut() {
            session.phase = SwapPhase::Applying;
        }

        let store = self.store.clone();
        let events = self.events.clone();

        tokio::spawn(async move {
            let result = store
                .apply_alternative(&plan_id, day_index, meal_index, choice)
                .await;
            let _ = events.send(PlannerEvent::Swap {
                generation,
                result: result.map(SwapReply::Applied),
            });
        });

        true
    }

    pub(crate) fn absorb_swap(
        &mut self,
        generation: u64,
        result: Result<SwapReply>,
    ) -> Option<Notice> {
        let Some(session) = self.swap.as_mut() else {
            tracing::debug!(generation, "swap response without a live session, discarded");
            return None;
        };
        if session.generation != generation {
            tracing::debug!(
                stale = generation,
                live = session.generation,
                "stale swap response discarded"
            );
            return None;
        }

        match (session.phase, result) {
            (SwapPhase::Loading, Ok(SwapReply::Loaded(choices))) => {
                session.choices = choices;
                session.phase = SwapPhase::ChoicesShown;
                None
            }
            (SwapPhase::Loading, Err(err)) => {
                self.swap = None;
                tracing::error!(err = %err, "fetching alternatives failed");
                Some(Notice::error(format!("Could not load alternatives: {err}")))
            }
            (SwapPhase::Applying, Ok(SwapReply::Applied(meal))) => self.commit_swap(meal),
            (SwapPhase::Applying, Err(err)) => {
                session.phase = SwapPhase::ChoicesShown;
                tracing::error!(err = %err, "applying alternative failed, slot left unchanged");
                Some(Notice::error(format!("Could not swap the recipe: {err}")))
            }
            (phase, _) => {
                tracing::debug!(?phase, "swap response did not match the session phase, discarded");
                None
            }
        }
    }

    fn commit_swap(&mut self, incoming: Meal) -> Option<Notice> {
        let Some(session) = self.swap.as_mut() else {
            return None;
        };

        let checked = incoming.validate().map_err(Error::from).and_then(|()| {
            if incoming.meal_id != session.meal_id {
                platewise_shared::bail!(
                    "store answered for meal {} instead of {}",
                    incoming.meal_id,
                    session.meal_id
                );
            }
            Ok(())
        });

        if let Err(err) = checked {
            session.phase = SwapPhase::ChoicesShown;
            tracing::error!(err = %err, "store returned an invalid meal, slot left unchanged");
            return Some(Notice::error(format!("Could not swap the recipe: {err}")));
        }

        let plan_id = session.plan_id.clone();
        let day_index = session.day_index;
        let meal_id = session.meal_id.clone();
        self.swap = None;

        let slot = self
            .plan_mut(&plan_id)
            .and_then(|p| p.day_mut(day_index))
            .and_then(|d| d.meal_by_id_mut(&meal_id));

        match slot {
            Some(slot) => {
                *slot = Meal {
                    sync: SyncState::Synced,
                    ..incoming
                };
                None
            }
            None => {
                // the swap landed remotely but the slot was refetched away
                Some(Notice::warning(format!(
                    "Meal {meal_id} is no longer on this plan; refresh to see the applied swap"
                )))
            }
        }
    }
}
