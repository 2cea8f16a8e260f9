use serde::{Deserialize, Serialize};

use crate::protocol::{MealDetailRecord, MealRecord};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListItem {
    pub id: String,
    pub title: String,
    pub thumbnail_url: String,
}

impl From<MealRecord> for ListItem {
    fn from(record: MealRecord) -> Self {
        Self {
            id: record.id,
            title: record.title,
            thumbnail_url: record.thumbnail_url,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    pub measure: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailItem {
    pub id: String,
    pub title: String,
    pub category: String,
    pub area: String,
    pub instructions: String,
    pub thumbnail_url: Option<String>,
    pub video_url: Option<String>,
    pub ingredients: Vec<Ingredient>,
}

impl From<MealDetailRecord> for DetailItem {
    fn from(record: MealDetailRecord) -> Self {
        let ingredients = record.ingredients();
        Self {
            id: record.id,
            title: record.title,
            category: record.category,
            area: record.area,
            instructions: record.instructions,
            thumbnail_url: non_blank(record.thumbnail_url),
            video_url: non_blank(record.video_url),
            ingredients,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Sorts list items by title, byte-wise ascending. Equal titles keep their
/// response order.
pub fn sort_by_title(items: &mut [ListItem]) {
    items.sort_by(|a, b| a.title.cmp(&b.title));
}
