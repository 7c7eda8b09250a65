/*
 * Responsibility
 * - Drinks の request/response DTO
 * - short view (parts を伏せる) / long view (recipe そのまま)
 * - validate() で形式チェック
 */
use serde::{Deserialize, Serialize};

use crate::repos::drink_repo::{DrinkRow, Ingredient};

const TITLE_MAX_LEN: usize = 80;

/// Clients send either one ingredient object or a list of them.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RecipeInput {
    Many(Vec<Ingredient>),
    One(Ingredient),
}

impl RecipeInput {
    pub fn into_vec(self) -> Vec<Ingredient> {
        match self {
            RecipeInput::Many(v) => v,
            RecipeInput::One(i) => vec![i],
        }
    }
}

fn validate_title(title: &str) -> Result<(), &'static str> {
    if title.trim().is_empty() {
        return Err("title is required");
    }
    if title.chars().count() > TITLE_MAX_LEN {
        return Err("title must be <= 80 chars");
    }
    Ok(())
}

fn validate_recipe(recipe: &RecipeInput) -> Result<(), &'static str> {
    let ingredients: &[Ingredient] = match recipe {
        RecipeInput::Many(v) => v,
        RecipeInput::One(i) => std::slice::from_ref(i),
    };
    if ingredients.is_empty() {
        return Err("recipe needs at least one ingredient");
    }
    for i in ingredients {
        if i.name.trim().is_empty() || i.color.trim().is_empty() {
            return Err("ingredient name and color are required");
        }
        if i.parts == 0 {
            return Err("ingredient parts must be >= 1");
        }
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
pub struct CreateDrinkRequest {
    pub title: String,
    pub recipe: RecipeInput,
}

impl CreateDrinkRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        validate_title(&self.title)?;
        validate_recipe(&self.recipe)
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateDrinkRequest {
    pub title: Option<String>,
    pub recipe: Option<RecipeInput>,
}

impl UpdateDrinkRequest {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.recipe.is_none()
    }

    pub fn validate(&self) -> Result<(), &'static str> {
        if let Some(title) = &self.title {
            validate_title(title)?;
        }
        if let Some(recipe) = &self.recipe {
            validate_recipe(recipe)?;
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct ShortIngredient {
    pub name: String,
    pub color: String,
}

#[derive(Debug, Serialize)]
pub struct DrinkShort {
    pub id: i32,
    pub title: String,
    pub recipe: Vec<ShortIngredient>,
}

impl From<&DrinkRow> for DrinkShort {
    fn from(row: &DrinkRow) -> Self {
        Self {
            id: row.id,
            title: row.title.clone(),
            recipe: row
                .recipe
                .iter()
                .map(|i| ShortIngredient {
                    name: i.name.clone(),
                    color: i.color.clone(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DrinkLong {
    pub id: i32,
    pub title: String,
    pub recipe: Vec<Ingredient>,
}

impl From<DrinkRow> for DrinkLong {
    fn from(row: DrinkRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            recipe: row.recipe.0,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DrinksResponse<T> {
    pub success: bool,
    pub drinks: T,
}

impl<T> DrinksResponse<T> {
    pub fn new(drinks: T) -> Self {
        Self {
            success: true,
            drinks,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub delete: i32,
}
