use platewise_recipe::Recipe;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use time::Date;
use validator::Validate;

#[derive(
    EnumString,
    Display,
    AsRefStr,
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PlanStatus {
    #[default]
    Draft,
    Active,
    Completed,
}

/// Client-side persistence state of an optimistically mutated entity.
/// Never serialized: the remote store knows nothing about it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SyncState {
    #[default]
    Synced,
    Pending,
    Failed,
}

#[derive(Validate, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meal {
    #[validate(length(min = 1))]
    pub meal_id: String,
    #[serde(rename = "type")]
    pub meal_type: String,
    #[serde(default)]
    pub scheduled_time: Option<String>,
    #[serde(default)]
    pub is_completed: bool,
    #[validate(length(min = 1), nested)]
    pub recipes: Vec<Recipe>,
    #[serde(skip)]
    pub sync: SyncState,
}

impl Meal {
    /// The currently assigned recipe. A well-formed meal always has one.
    pub fn recipe(&self) -> Option<&Recipe> {
        self.recipes.first()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Day {
    /// Explicit calendar date, authoritative when present. Without it the
    /// date is implied from the plan's start date and the day's position.
    #[serde(default, with = "platewise_shared::flexible_date")]
    pub date: Option<Date>,
    #[serde(default)]
    pub meals: Vec<Meal>,
    #[serde(skip)]
    pub sync: SyncState,
}

impl Day {
    pub fn meal_position(&self, meal_id: &str) -> Option<usize> {
        self.meals.iter().position(|m| m.meal_id == meal_id)
    }

    pub fn meal_by_id(&self, meal_id: &str) -> Option<&Meal> {
        self.meals.iter().find(|m| m.meal_id == meal_id)
    }

    pub fn meal_by_id_mut(&mut self, meal_id: &str) -> Option<&mut Meal> {
        self.meals.iter_mut().find(|m| m.meal_id == meal_id)
    }
}

/// One cached remote plan document. The store owns it; the client copy is
/// mutated in place by the optimistic controllers and replaced wholesale on
/// refetch.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub status: PlanStatus,
    #[serde(default, with = "platewise_shared::flexible_date")]
    pub start_date: Option<Date>,
    /// Unix epoch milliseconds, minted by the store at creation.
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub days: Vec<Day>,
}

impl Plan {
    pub fn is_active(&self) -> bool {
        self.status == PlanStatus::Active
    }

    pub fn day(&self, day_index: usize) -> Option<&Day> {
        self.days.get(day_index)
    }

    pub fn day_mut(&mut self, day_index: usize) -> Option<&mut Day> {
        self.days.get_mut(day_index)
    }

    pub fn meal(&self, day_index: usize, meal_index: usize) -> Option<&Meal> {
        self.day(day_index).and_then(|d| d.meals.get(meal_index))
    }

    pub fn meal_mut(&mut self, day_index: usize, meal_index: usize) -> Option<&mut Meal> {
        self.day_mut(day_index).and_then(|d| d.meals.get_mut(meal_index))
    }
}
