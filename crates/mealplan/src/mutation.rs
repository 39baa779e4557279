use crate::{MutationOp, PlanStatus, PlanStore, Planner, SyncState};

impl<S: PlanStore + Clone> Planner<S> {
    /// Flips a meal's completion locally and pushes the new value (not a
    /// toggle instruction) to the store. The flip is never rolled back: a
    /// failed push leaves the meal marked [`SyncState::Failed`] and
    /// surfaces a notice when absorbed. A vanished target is a no-op.
    pub fn toggle_completion(
        &mut self,
        plan_id: impl Into<String>,
        day_index: usize,
        meal_index: usize,
    ) -> Option<bool> {
        let plan_id = plan_id.into();

        let meal = self
            .plan_mut(&plan_id)
            .and_then(|p| p.meal_mut(day_index, meal_index))?;

        meal.is_completed = !meal.is_completed;
        meal.sync = SyncState::Pending;

        let is_completed = meal.is_completed;
        let meal_id = meal.meal_id.clone();
        let store = self.store.clone();

        self.spawn_mutation(
            MutationOp::ToggleCompletion {
                plan_id: plan_id.clone(),
                day_index,
                meal_id,
            },
            async move {
                store
                    .set_meal_completion(&plan_id, day_index, meal_index, is_completed)
                    .await
            },
        );

        Some(is_completed)
    }

    /// Removes the meal with that id locally, then overwrites the plan's
    /// whole days array remotely. No tombstone is kept; repeating the
    /// delete, or deleting from a vanished target, is a no-op.
    pub fn delete_meal(
        &mut self,
        plan_id: impl Into<String>,
        day_index: usize,
        meal_id: impl Into<String>,
    ) -> bool {
        let plan_id = plan_id.into();
        let meal_id = meal_id.into();

        let Some(plan) = self.plan_mut(&plan_id) else {
            return false;
        };
        let Some(day) = plan.days.get_mut(day_index) else {
            return false;
        };
        let Some(position) = day.meal_position(&meal_id) else {
            return false;
        };

        day.meals.remove(position);
        day.sync = SyncState::Pending;

        let days = plan.days.clone();
        let start_date = plan.start_date;
        let store = self.store.clone();

        self.spawn_mutation(
            MutationOp::DeleteMeal {
                plan_id: plan_id.clone(),
                day_index,
                meal_id,
            },
            async move { store.replace_plan_days(&plan_id, days, start_date).await },
        );

        true
    }

    /// Moves a plan to the given status, optimistically. Leaving
    /// [`PlanStatus::Active`] takes the plan out of the merge input set
    /// immediately, before the store confirms.
    pub fn set_plan_status(&mut self, plan_id: impl Into<String>, status: PlanStatus) -> bool {
        let plan_id = plan_id.into();

        let Some(plan) = self.plan_mut(&plan_id) else {
            return false;
        };

        plan.status = status;

        let store = self.store.clone();

        self.spawn_mutation(
            MutationOp::SetPlanStatus {
                plan_id: plan_id.clone(),
                status,
            },
            async move { store.set_plan_status(&plan_id, status).await },
        );

        true
    }
}
