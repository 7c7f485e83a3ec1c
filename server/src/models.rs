use diesel::prelude::*;

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::recipes)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Recipe {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::recipes)]
pub struct NewRecipe<'a> {
    pub title: &'a str,
    pub description: &'a str,
}

/// Partial update; `None` fields are left untouched.
#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::recipes)]
pub struct RecipeChanges<'a> {
    pub title: Option<&'a str>,
    pub description: Option<&'a str>,
}

impl RecipeChanges<'_> {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none()
    }
}

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::ingredients)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Ingredient {
    pub id: i32,
    pub name: String,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::ingredients)]
pub struct NewIngredient<'a> {
    pub name: &'a str,
}

/// Association row between a recipe and a shared ingredient.
#[derive(Queryable, Selectable, Identifiable, Associations, Insertable, Debug)]
#[diesel(table_name = crate::schema::recipe_ingredients)]
#[diesel(primary_key(recipe_id, ingredient_id))]
#[diesel(belongs_to(Recipe))]
#[diesel(belongs_to(Ingredient))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct RecipeIngredient {
    pub recipe_id: i32,
    pub ingredient_id: i32,
    pub position: i32,
}

#[derive(Queryable, Selectable, Identifiable, Associations, Debug)]
#[diesel(table_name = crate::schema::ratings)]
#[diesel(belongs_to(Recipe))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Rating {
    pub id: i32,
    pub recipe_id: i32,
    pub score: i32,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::ratings)]
pub struct NewRating {
    pub recipe_id: i32,
    pub score: i32,
}

#[derive(Queryable, Selectable, Identifiable, Associations, Debug)]
#[diesel(table_name = crate::schema::recipe_images)]
#[diesel(belongs_to(Recipe))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct RecipeImage {
    pub id: i32,
    pub recipe_id: i32,
    pub filename: String,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::recipe_images)]
pub struct NewRecipeImage<'a> {
    pub recipe_id: i32,
    pub filename: &'a str,
}
