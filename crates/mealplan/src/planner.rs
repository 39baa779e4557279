use std::future::Future;

use platewise_recipe::Recipe;
use platewise_shared::{Notice, Result};
use serde::Deserialize;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use ulid::Ulid;

use crate::{Meal, Plan, PlanStore, SwapSession, SyncState, Timeline, merge};

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineOptions {
    /// Upper bound on candidate recipes requested per swap session,
    /// whatever limit the caller asks for.
    pub alternatives_cap: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            alternatives_cap: 20,
        }
    }
}

#[derive(Clone, Debug)]
pub enum MutationOp {
    ToggleCompletion {
        plan_id: String,
        day_index: usize,
        meal_id: String,
    },
    DeleteMeal {
        plan_id: String,
        day_index: usize,
        meal_id: String,
    },
    SetPlanStatus {
        plan_id: String,
        status: crate::PlanStatus,
    },
}

impl MutationOp {
    pub(crate) fn label(&self) -> &'static str {
        match self {
            Self::ToggleCompletion { .. } => "save meal completion",
            Self::DeleteMeal { .. } => "delete meal",
            Self::SetPlanStatus { .. } => "update plan status",
        }
    }
}

#[derive(Debug)]
pub enum SwapReply {
    Loaded(Vec<Recipe>),
    Applied(Meal),
}

/// A completed remote call, delivered on the planner's event channel. The
/// host pumps the receiver and feeds every event back through
/// [`Planner::absorb`].
#[derive(Debug)]
pub enum PlannerEvent {
    Mutation {
        id: String,
        op: MutationOp,
        result: Result<()>,
    },
    Swap {
        generation: u64,
        result: Result<SwapReply>,
    },
}

/// Client engine over a remote plan store: a cached plan collection, the
/// optimistic mutation operations, the alternatives broker and the merged
/// timeline view.
///
/// Local applies happen synchronously on the caller's thread, in invocation
/// order. Remote calls are spawned onto the ambient tokio runtime and may
/// complete in any order; their outcomes come back as [`PlannerEvent`]s and
/// only touch local state once absorbed.
pub struct Planner<S: PlanStore + Clone> {
    pub(crate) store: S,
    pub(crate) options: EngineOptions,
    pub(crate) plans: Vec<Plan>,
    pub(crate) events: UnboundedSender<PlannerEvent>,
    pub(crate) swap: Option<SwapSession>,
    pub(crate) generation: u64,
}

impl<S: PlanStore + Clone> Planner<S> {
    pub fn new(store: S) -> (Self, UnboundedReceiver<PlannerEvent>) {
        Self::with_options(store, EngineOptions::default())
    }

    pub fn with_options(
        store: S,
        options: EngineOptions,
    ) -> (Self, UnboundedReceiver<PlannerEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();

        (
            Self {
                store,
                options,
                plans: Vec::new(),
                events,
                swap: None,
                generation: 0,
            },
            receiver,
        )
    }

    pub fn plans(&self) -> &[Plan] {
        &self.plans
    }

    pub fn plan(&self, plan_id: &str) -> Option<&Plan> {
        self.plans.iter().find(|p| p.id == plan_id)
    }

    pub(crate) fn plan_mut(&mut self, plan_id: &str) -> Option<&mut Plan> {
        self.plans.iter_mut().find(|p| p.id == plan_id)
    }

    /// Merged timeline over the current cache.
    pub fn timeline(&self) -> Timeline {
        merge(&self.plans)
    }

    /// Replaces the whole cached collection with the store's.
    pub async fn refresh(&mut self) -> Result<()> {
        self.plans = self.store.list_plans().await?;

        Ok(())
    }

    /// Refetches one plan and replaces the cached copy wholesale. Returns a
    /// notice when the discarded copy had diverged from the store, which is
    /// how a failed optimistic mutation eventually becomes visible.
    pub async fn refresh_plan(&mut self, plan_id: &str) -> Result<Option<Notice>> {
        let fresh = self.store.get_plan(plan_id).await?;

        // Sync flags are client-only and excluded from the comparison by
        // going through the serialized form.
        let diverged = self.plan(plan_id).is_some_and(|local| {
            serde_json::to_value(local).ok() != serde_json::to_value(&fresh).ok()
        });

        match self.plan_mut(plan_id) {
            Some(slot) => *slot = fresh,
            None => self.plans.push(fresh),
        }

        Ok(diverged.then(|| {
            Notice::warning(format!(
                "Plan {plan_id} was out of sync with the server and has been reloaded"
            ))
        }))
    }

    /// Applies one completed remote call to local state. Every asynchronous
    /// completion funnels through here on the caller's thread, so local
    /// applies stay sequential no matter how remote calls interleave. The
    /// returned notice, if any, is for the user.
    pub fn absorb(&mut self, event: PlannerEvent) -> Option<Notice> {
        match event {
            PlannerEvent::Mutation { id, op, result } => self.absorb_mutation(&id, op, result),
            PlannerEvent::Swap { generation, result } => self.absorb_swap(generation, result),
        }
    }

    fn absorb_mutation(&mut self, id: &str, op: MutationOp, result: Result<()>) -> Option<Notice> {
        // a target that is already gone remotely leaves nothing to sync
        let settled = match &result {
            Ok(()) => SyncState::Synced,
            Err(err) if err.is_not_found() => SyncState::Synced,
            Err(_) => SyncState::Failed,
        };

        match &op {
            MutationOp::ToggleCompletion {
                plan_id,
                day_index,
                meal_id,
            } => {
                let slot = self
                    .plan_mut(plan_id)
                    .and_then(|p| p.day_mut(*day_index))
                    .and_then(|d| d.meal_by_id_mut(meal_id));
                if let Some(meal) = slot {
                    meal.sync = settled;
                }
            }
            MutationOp::DeleteMeal {
                plan_id, day_index, ..
            } => {
                if let Some(day) = self.plan_mut(plan_id).and_then(|p| p.day_mut(*day_index)) {
                    day.sync = settled;
                }
            }
            MutationOp::SetPlanStatus { .. } => {}
        }

        match result {
            Ok(()) => None,
            Err(err) if err.is_not_found() => {
                tracing::debug!(mutation = %id, op = ?op, "target already gone remotely");
                None
            }
            Err(err) => {
                tracing::error!(
                    mutation = %id,
                    op = ?op,
                    err = %err,
                    "remote update failed, keeping local change"
                );

                Some(Notice::error(format!("Could not {}: {err}", op.label())))
            }
        }
    }

    pub(crate) fn spawn_mutation<F>(&self, op: MutationOp, call: F)
    where
        F: Future<Output = Result<()>> + Send + 'static,
    {
        let events = self.events.clone();
        let id = Ulid::new().to_string();

        tokio::spawn(async move {
            let result = call.await;
            // the host may already have dropped the receiver on shutdown
            let _ = events.send(PlannerEvent::Mutation { id, op, result });
        });
    }
}
