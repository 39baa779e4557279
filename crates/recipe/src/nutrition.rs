use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

/// Canonical per-serving nutrition shape. Remote producers disagree on
/// field names, so deserialization folds every known synonym into this one
/// form; the rest of the system never sees the variants.
#[derive(Serialize, Clone, Copy, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NutritionFacts {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

enum Field {
    Calories,
    Protein,
    Carbs,
    Fat,
}

fn canonical_field(key: &str) -> Option<Field> {
    match key {
        "calories" | "kcal" | "energy" | "energyKcal" => Some(Field::Calories),
        "protein" | "proteins" | "proteinG" => Some(Field::Protein),
        "carbs" | "carbohydrates" | "carbsG" | "carbohydrateG" => Some(Field::Carbs),
        "fat" | "fats" | "totalFat" | "fatG" => Some(Field::Fat),
        _ => None,
    }
}

fn amount_of(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(number) => number.as_f64(),
        serde_json::Value::String(raw) => raw.trim().parse().ok(),
        _ => None,
    }
}

impl<'de> Deserialize<'de> for NutritionFacts {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FactsVisitor;

        impl<'de> Visitor<'de> for FactsVisitor {
            type Value = NutritionFacts;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("a nutrition facts object")
            }

            fn visit_unit<E: serde::de::Error>(self) -> Result<Self::Value, E> {
                Ok(NutritionFacts::default())
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut facts = NutritionFacts::default();

                while let Some((key, value)) = map.next_entry::<String, serde_json::Value>()? {
                    let Some(amount) = amount_of(&value) else {
                        continue;
                    };

                    match canonical_field(&key) {
                        Some(Field::Calories) => facts.calories = amount,
                        Some(Field::Protein) => facts.protein = amount,
                        Some(Field::Carbs) => facts.carbs = amount,
                        Some(Field::Fat) => facts.fat = amount,
                        None => {}
                    }
                }

                Ok(facts)
            }
        }

        deserializer.deserialize_any(FactsVisitor)
    }
}
