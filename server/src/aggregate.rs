//! Loading and serializing recipe aggregates.
//!
//! A recipe is always returned with its ingredients, image filenames and
//! rating scores. Loading is done per relation for the whole batch and then
//! grouped in memory, so listing costs four queries however many recipes exist.

use diesel::prelude::*;
use serde::Serialize;
use utoipa::ToSchema;

use crate::models::{Ingredient, Rating, Recipe, RecipeImage, RecipeIngredient};
use crate::schema::{ingredients, ratings, recipe_images, recipe_ingredients, recipes};

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecipeResponse {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    /// Ingredient names in the order they were given
    pub ingredients: Vec<String>,
    /// Stored image filenames, servable under /uploads
    pub images: Vec<String>,
    /// Every submitted score, oldest first
    pub ratings: Vec<i32>,
}

pub fn find_recipe(conn: &mut SqliteConnection, id: i32) -> QueryResult<Option<Recipe>> {
    recipes::table
        .find(id)
        .select(Recipe::as_select())
        .first(conn)
        .optional()
}

pub fn recipe_exists(conn: &mut SqliteConnection, id: i32) -> QueryResult<bool> {
    diesel::select(diesel::dsl::exists(recipes::table.find(id))).get_result(conn)
}

pub fn load_one(conn: &mut SqliteConnection, id: i32) -> QueryResult<Option<RecipeResponse>> {
    match find_recipe(conn, id)? {
        Some(recipe) => Ok(load_aggregates(conn, vec![recipe])?.pop()),
        None => Ok(None),
    }
}

pub fn load_all(conn: &mut SqliteConnection) -> QueryResult<Vec<RecipeResponse>> {
    let all = recipes::table
        .order(recipes::id.asc())
        .select(Recipe::as_select())
        .load(conn)?;
    load_aggregates(conn, all)
}

fn load_aggregates(
    conn: &mut SqliteConnection,
    parents: Vec<Recipe>,
) -> QueryResult<Vec<RecipeResponse>> {
    let ingredient_groups = RecipeIngredient::belonging_to(&parents)
        .inner_join(ingredients::table)
        .order((recipe_ingredients::recipe_id, recipe_ingredients::position.asc()))
        .select((RecipeIngredient::as_select(), Ingredient::as_select()))
        .load::<(RecipeIngredient, Ingredient)>(conn)?
        .grouped_by(&parents);

    let image_groups = RecipeImage::belonging_to(&parents)
        .order(recipe_images::id.asc())
        .select(RecipeImage::as_select())
        .load(conn)?
        .grouped_by(&parents);

    let rating_groups = Rating::belonging_to(&parents)
        .order(ratings::id.asc())
        .select(Rating::as_select())
        .load(conn)?
        .grouped_by(&parents);

    let responses = parents
        .into_iter()
        .zip(ingredient_groups)
        .zip(image_groups)
        .zip(rating_groups)
        .map(|(((recipe, ingredients), images), ratings)| RecipeResponse {
            id: recipe.id,
            title: recipe.title,
            description: recipe.description,
            ingredients: ingredients
                .into_iter()
                .map(|(_, ingredient)| ingredient.name)
                .collect(),
            images: images.into_iter().map(|image| image.filename).collect(),
            ratings: ratings.into_iter().map(|rating| rating.score).collect(),
        })
        .collect();

    Ok(responses)
}
