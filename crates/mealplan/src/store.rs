use async_trait::async_trait;
use platewise_recipe::{Recipe, RecipeChoice};
use platewise_shared::Result;
use time::Date;

use crate::{Day, Meal, Plan, PlanStatus};

/// Narrow contract of the remote plan store. Shapes only: transport,
/// authentication and timeouts belong to the implementation behind it.
#[async_trait]
pub trait PlanStore: Send + Sync + 'static {
    async fn list_plans(&self) -> Result<Vec<Plan>>;

    async fn get_plan(&self, plan_id: &str) -> Result<Plan>;

    async fn set_plan_status(&self, plan_id: &str, status: PlanStatus) -> Result<()>;

    /// Whole-array overwrite of a plan's days. Callers always send the
    /// complete mutated array, never a delta.
    async fn replace_plan_days(
        &self,
        plan_id: &str,
        days: Vec<Day>,
        start_date: Option<Date>,
    ) -> Result<()>;

    /// Idempotent: carries the target value, not a toggle instruction.
    async fn set_meal_completion(
        &self,
        plan_id: &str,
        day_index: usize,
        meal_index: usize,
        is_completed: bool,
    ) -> Result<()>;

    /// Up to `limit` candidate replacements for the meal, in store order.
    /// An empty list is a valid answer, distinct from an error.
    async fn list_alternatives(
        &self,
        plan_id: &str,
        day_index: usize,
        meal_index: usize,
        limit: usize,
    ) -> Result<Vec<Recipe>>;

    /// Applies the chosen candidate remotely and returns the
    /// fully-populated updated meal.
    async fn apply_alternative(
        &self,
        plan_id: &str,
        day_index: usize,
        meal_index: usize,
        choice: RecipeChoice,
    ) -> Result<Meal>;
}
