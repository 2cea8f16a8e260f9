use serde::{Deserialize, Serialize};

use crate::domain::Ingredient;

/// Envelope shared by the filter and lookup endpoints. The backend sends
/// `"meals": null` when nothing matched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealsEnvelope<T> {
    pub meals: Option<Vec<T>>,
}

impl<T> MealsEnvelope<T> {
    pub fn into_records(self) -> Vec<T> {
        self.meals.unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealRecord {
    #[serde(rename = "idMeal")]
    pub id: String,
    #[serde(rename = "strMeal")]
    pub title: String,
    #[serde(rename = "strMealThumb")]
    pub thumbnail_url: String,
}

pub const MAX_INGREDIENT_SLOTS: usize = 9;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealDetailRecord {
    #[serde(rename = "idMeal")]
    pub id: String,
    #[serde(rename = "strMeal")]
    pub title: String,
    #[serde(rename = "strCategory")]
    pub category: String,
    #[serde(rename = "strArea")]
    pub area: String,
    #[serde(rename = "strInstructions")]
    pub instructions: String,
    #[serde(rename = "strMealThumb", default)]
    pub thumbnail_url: Option<String>,
    #[serde(rename = "strYoutube", default)]
    pub video_url: Option<String>,
    #[serde(rename = "strIngredient1", default)]
    pub ingredient1: Option<String>,
    #[serde(rename = "strIngredient2", default)]
    pub ingredient2: Option<String>,
    #[serde(rename = "strIngredient3", default)]
    pub ingredient3: Option<String>,
    #[serde(rename = "strIngredient4", default)]
    pub ingredient4: Option<String>,
    #[serde(rename = "strIngredient5", default)]
    pub ingredient5: Option<String>,
    #[serde(rename = "strIngredient6", default)]
    pub ingredient6: Option<String>,
    #[serde(rename = "strIngredient7", default)]
    pub ingredient7: Option<String>,
    #[serde(rename = "strIngredient8", default)]
    pub ingredient8: Option<String>,
    #[serde(rename = "strIngredient9", default)]
    pub ingredient9: Option<String>,
    #[serde(rename = "strMeasure1", default)]
    pub measure1: Option<String>,
    #[serde(rename = "strMeasure2", default)]
    pub measure2: Option<String>,
    #[serde(rename = "strMeasure3", default)]
    pub measure3: Option<String>,
    #[serde(rename = "strMeasure4", default)]
    pub measure4: Option<String>,
    #[serde(rename = "strMeasure5", default)]
    pub measure5: Option<String>,
    #[serde(rename = "strMeasure6", default)]
    pub measure6: Option<String>,
    #[serde(rename = "strMeasure7", default)]
    pub measure7: Option<String>,
    #[serde(rename = "strMeasure8", default)]
    pub measure8: Option<String>,
    #[serde(rename = "strMeasure9", default)]
    pub measure9: Option<String>,
}

impl MealDetailRecord {
    fn ingredient_slots(&self) -> [(&Option<String>, &Option<String>); MAX_INGREDIENT_SLOTS] {
        [
            (&self.ingredient1, &self.measure1),
            (&self.ingredient2, &self.measure2),
            (&self.ingredient3, &self.measure3),
            (&self.ingredient4, &self.measure4),
            (&self.ingredient5, &self.measure5),
            (&self.ingredient6, &self.measure6),
            (&self.ingredient7, &self.measure7),
            (&self.ingredient8, &self.measure8),
            (&self.ingredient9, &self.measure9),
        ]
    }

    /// Ingredient/measure pairs in slot order; slots with a blank ingredient
    /// name are skipped.
    pub fn ingredients(&self) -> Vec<Ingredient> {
        self.ingredient_slots()
            .into_iter()
            .filter_map(|(name, measure)| {
                let name = name.as_deref().map(str::trim).unwrap_or_default();
                if name.is_empty() {
                    return None;
                }
                Some(Ingredient {
                    name: name.to_string(),
                    measure: measure
                        .as_deref()
                        .map(str::trim)
                        .unwrap_or_default()
                        .to_string(),
                })
            })
            .collect()
    }
}
