use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use platewise_mealplan::{Day, Meal, Plan, PlanStatus, PlanStore};
use platewise_recipe::{Recipe, RecipeChoice};
use platewise_shared::{Error, Result};
use time::Date;

/// In-memory stand-in for the remote plan store: scriptable failures per
/// endpoint, a call log, and a riggable apply response.
#[derive(Clone, Default)]
pub struct TestStore {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Default)]
struct Inner {
    plans: Vec<Plan>,
    alternatives: Vec<(String, Recipe)>,
    failing: HashSet<String>,
    apply_override: Option<Meal>,
    calls: Vec<String>,
}

pub fn setup_store(plans: Vec<Plan>) -> TestStore {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    let store = TestStore::default();
    store.inner.lock().unwrap().plans = plans;
    store
}

impl TestStore {
    pub fn seed_alternatives(&self, recipes: Vec<(&str, Recipe)>) {
        let mut inner = self.inner.lock().unwrap();
        inner.alternatives = recipes
            .into_iter()
            .map(|(id, recipe)| (id.to_owned(), recipe))
            .collect();
    }

    pub fn fail(&self, endpoint: &str) {
        self.inner.lock().unwrap().failing.insert(endpoint.to_owned());
    }

    pub fn rig_apply_response(&self, meal: Meal) {
        self.inner.lock().unwrap().apply_override = Some(meal);
    }

    pub fn calls(&self) -> Vec<String> {
        self.inner.lock().unwrap().calls.clone()
    }

    pub fn plan(&self, plan_id: &str) -> Option<Plan> {
        self.inner
            .lock()
            .unwrap()
            .plans
            .iter()
            .find(|p| p.id == plan_id)
            .cloned()
    }

    pub fn remove_plan(&self, plan_id: &str) {
        self.inner.lock().unwrap().plans.retain(|p| p.id != plan_id);
    }

    pub fn put_plan(&self, plan: Plan) {
        let mut inner = self.inner.lock().unwrap();
        match inner.plans.iter_mut().find(|p| p.id == plan.id) {
            Some(slot) => *slot = plan,
            None => inner.plans.push(plan),
        }
    }

    fn guard(&self, endpoint: &str, call: String) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(call);

        if inner.failing.contains(endpoint) {
            return Err(Error::network(format!("{endpoint}: connection reset")));
        }

        Ok(())
    }
}

#[async_trait]
impl PlanStore for TestStore {
    async fn list_plans(&self) -> Result<Vec<Plan>> {
        self.guard("listPlans", "listPlans".to_owned())?;

        Ok(self.inner.lock().unwrap().plans.clone())
    }

    async fn get_plan(&self, plan_id: &str) -> Result<Plan> {
        self.guard("getPlan", format!("getPlan {plan_id}"))?;

        self.plan(plan_id)
            .ok_or_else(|| Error::not_found(format!("plan {plan_id}")))
    }

    async fn set_plan_status(&self, plan_id: &str, status: PlanStatus) -> Result<()> {
        self.guard("setPlanStatus", format!("setPlanStatus {plan_id} {status}"))?;

        let mut inner = self.inner.lock().unwrap();
        let plan = inner
            .plans
            .iter_mut()
            .find(|p| p.id == plan_id)
            .ok_or_else(|| Error::not_found(format!("plan {plan_id}")))?;
        plan.status = status;

        Ok(())
    }

    async fn replace_plan_days(
        &self,
        plan_id: &str,
        days: Vec<Day>,
        start_date: Option<Date>,
    ) -> Result<()> {
        self.guard(
            "replacePlanDays",
            format!("replacePlanDays {plan_id} days={}", days.len()),
        )?;

        let mut inner = self.inner.lock().unwrap();
        let plan = inner
            .plans
            .iter_mut()
            .find(|p| p.id == plan_id)
            .ok_or_else(|| Error::not_found(format!("plan {plan_id}")))?;
        plan.days = days;
        if start_date.is_some() {
            plan.start_date = start_date;
        }

        Ok(())
    }

    async fn set_meal_completion(
        &self,
        plan_id: &str,
        day_index: usize,
        meal_index: usize,
        is_completed: bool,
    ) -> Result<()> {
        self.guard(
            "setMealCompletion",
            format!("setMealCompletion {plan_id} {day_index} {meal_index} {is_completed}"),
        )?;

        let mut inner = self.inner.lock().unwrap();
        let meal = inner
            .plans
            .iter_mut()
            .find(|p| p.id == plan_id)
            .and_then(|p| p.days.get_mut(day_index))
            .and_then(|d| d.meals.get_mut(meal_index))
            .ok_or_else(|| Error::not_found("meal"))?;
        meal.is_completed = is_completed;

        Ok(())
    }

    async fn list_alternatives(
        &self,
        plan_id: &str,
        day_index: usize,
        meal_index: usize,
        limit: usize,
    ) -> Result<Vec<Recipe>> {
        self.guard(
            "listAlternatives",
            format!("listAlternatives {plan_id} {day_index} {meal_index} limit={limit}"),
        )?;

        let inner = self.inner.lock().unwrap();

        Ok(inner
            .alternatives
            .iter()
            .take(limit)
            .map(|(_, recipe)| recipe.clone())
            .collect())
    }

    async fn apply_alternative(
        &self,
        plan_id: &str,
        day_index: usize,
        meal_index: usize,
        choice: RecipeChoice,
    ) -> Result<Meal> {
        self.guard(
            "applyAlternative",
            format!("applyAlternative {plan_id} {day_index} {meal_index}"),
        )?;

        let mut inner = self.inner.lock().unwrap();

        if let Some(rigged) = inner.apply_override.clone() {
            return Ok(rigged);
        }

        let recipe = match choice {
            RecipeChoice::Reference(id) => inner
                .alternatives
                .iter()
                .find(|(known, _)| *known == id)
                .map(|(_, recipe)| recipe.clone())
                .ok_or_else(|| Error::not_found(format!("recipe {id}")))?,
            RecipeChoice::Inline(recipe) => recipe,
        };

        let meal = inner
            .plans
            .iter_mut()
            .find(|p| p.id == plan_id)
            .and_then(|p| p.days.get_mut(day_index))
            .and_then(|d| d.meals.get_mut(meal_index))
            .ok_or_else(|| Error::not_found("meal"))?;

        if meal.recipes.is_empty() {
            meal.recipes.push(recipe);
        } else {
            meal.recipes[0] = recipe;
        }

        Ok(meal.clone())
    }
}

pub fn recipe(name: &str) -> Recipe {
    Recipe {
        name: name.to_owned(),
        description: format!("{name}, as the store serves it"),
        ..Recipe::default()
    }
}

pub fn meal(meal_id: &str, recipe_name: &str) -> Meal {
    Meal {
        meal_id: meal_id.to_owned(),
        meal_type: "dinner".to_owned(),
        recipes: vec![recipe(recipe_name)],
        ..Meal::default()
    }
}

pub fn day(meals: Vec<Meal>) -> Day {
    Day {
        meals,
        ..Day::default()
    }
}

pub fn active_plan(id: &str, created_at: i64, start_date: Date, days: Vec<Day>) -> Plan {
    Plan {
        id: id.to_owned(),
        title: format!("plan {id}"),
        status: PlanStatus::Active,
        start_date: Some(start_date),
        created_at,
        days,
    }
}
