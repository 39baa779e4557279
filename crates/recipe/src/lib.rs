mod nutrition;

pub use nutrition::*;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString, VariantArray};
use validator::Validate;

#[derive(
    EnumString,
    Display,
    AsRefStr,
    VariantArray,
    Default,
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum IngredientUnit {
    #[default]
    G,
    Ml,
    Piece,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ingredient {
    pub name: String,
    pub quantity: f64,
    #[serde(default)]
    pub unit: Option<IngredientUnit>,
}

/// A recipe as held by a meal slot. `recipes[0]` of a meal is always its
/// currently assigned recipe; alternatives carry the same shape.
#[derive(Validate, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub nutrition: NutritionFacts,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    #[serde(default)]
    pub instructions: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// A chosen replacement recipe, either by remote-store id or as an inline
/// payload. Favorites imported client-side may not have a store id, so both
/// forms go over the wire.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecipeChoice {
    Reference(String),
    Inline(Recipe),
}

impl RecipeChoice {
    pub fn reference(id: impl Into<String>) -> Self {
        Self::Reference(id.into())
    }
}
