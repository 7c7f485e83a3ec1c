//! Upsert-by-name for shared ingredients.
//!
//! Lookup and insert are two statements with no unique constraint behind
//! them, so two writers creating the same new name at once can both insert.
//! Lookups always pick the lowest id, which keeps later requests stable even
//! when such duplicates exist.

use std::collections::HashSet;

use diesel::prelude::*;

use crate::models::{Ingredient, NewIngredient, RecipeIngredient};
use crate::schema::{ingredients, recipe_ingredients};

pub const MAX_NAME_LEN: usize = 80;

/// Check every name before anything is written.
pub fn validate_names(names: &[String]) -> Result<(), String> {
    for name in names {
        if name.trim().is_empty() {
            return Err("Ingredient names cannot be empty".to_string());
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(format!(
                "Ingredient name exceeds {} characters: {}",
                MAX_NAME_LEN, name
            ));
        }
    }
    Ok(())
}

pub fn find_or_create(conn: &mut SqliteConnection, name: &str) -> QueryResult<Ingredient> {
    let existing = ingredients::table
        .filter(ingredients::name.eq(name))
        .order(ingredients::id.asc())
        .select(Ingredient::as_select())
        .first(conn)
        .optional()?;

    if let Some(ingredient) = existing {
        return Ok(ingredient);
    }

    diesel::insert_into(ingredients::table)
        .values(NewIngredient { name })
        .returning(Ingredient::as_returning())
        .get_result(conn)
}

/// Replace a recipe's ingredient set with `names`, in order.
/// Repeated names collapse into the first occurrence.
pub fn replace_for_recipe(
    conn: &mut SqliteConnection,
    recipe_id: i32,
    names: &[String],
) -> QueryResult<()> {
    diesel::delete(recipe_ingredients::table.filter(recipe_ingredients::recipe_id.eq(recipe_id)))
        .execute(conn)?;

    let mut seen = HashSet::new();
    let mut position = 0;

    for name in names {
        let ingredient = find_or_create(conn, name)?;
        if !seen.insert(ingredient.id) {
            continue;
        }

        diesel::insert_into(recipe_ingredients::table)
            .values(RecipeIngredient {
                recipe_id,
                ingredient_id: ingredient.id,
                position,
            })
            .execute(conn)?;
        position += 1;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_connection;
    use crate::models::NewRecipe;
    use crate::schema::recipes;

    fn insert_recipe(conn: &mut SqliteConnection) -> i32 {
        diesel::insert_into(recipes::table)
            .values(NewRecipe {
                title: "Soup",
                description: "",
            })
            .returning(recipes::id)
            .get_result(conn)
            .unwrap()
    }

    fn names_for(conn: &mut SqliteConnection, recipe_id: i32) -> Vec<String> {
        recipe_ingredients::table
            .inner_join(ingredients::table)
            .filter(recipe_ingredients::recipe_id.eq(recipe_id))
            .order(recipe_ingredients::position.asc())
            .select(ingredients::name)
            .load(conn)
            .unwrap()
    }

    fn count_named(conn: &mut SqliteConnection, name: &str) -> i64 {
        ingredients::table
            .filter(ingredients::name.eq(name))
            .count()
            .get_result(conn)
            .unwrap()
    }

    #[test]
    fn test_find_or_create_reuses_existing() {
        let mut conn = test_connection();
        let first = find_or_create(&mut conn, "salt").unwrap();
        let second = find_or_create(&mut conn, "salt").unwrap();
        assert_eq!(first, second);
        assert_eq!(count_named(&mut conn, "salt"), 1);
    }

    #[test]
    fn test_find_or_create_is_exact_match() {
        let mut conn = test_connection();
        let lower = find_or_create(&mut conn, "salt").unwrap();
        let upper = find_or_create(&mut conn, "Salt").unwrap();
        assert_ne!(lower.id, upper.id);
    }

    #[test]
    fn test_find_or_create_prefers_lowest_id() {
        let mut conn = test_connection();
        // Simulate the duplicate left behind by two racing writers
        for _ in 0..2 {
            diesel::insert_into(ingredients::table)
                .values(NewIngredient { name: "basil" })
                .execute(&mut conn)
                .unwrap();
        }
        let found = find_or_create(&mut conn, "basil").unwrap();
        assert_eq!(found.id, 1);
    }

    #[test]
    fn test_replace_keeps_input_order_and_collapses_duplicates() {
        let mut conn = test_connection();
        let recipe_id = insert_recipe(&mut conn);
        let names: Vec<String> = ["tomato", "lettuce", "tomato", "onion"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        replace_for_recipe(&mut conn, recipe_id, &names).unwrap();

        assert_eq!(names_for(&mut conn, recipe_id), ["tomato", "lettuce", "onion"]);
        assert_eq!(count_named(&mut conn, "tomato"), 1);
    }

    #[test]
    fn test_replace_is_full_replace() {
        let mut conn = test_connection();
        let recipe_id = insert_recipe(&mut conn);

        replace_for_recipe(&mut conn, recipe_id, &["egg".to_string()]).unwrap();
        replace_for_recipe(&mut conn, recipe_id, &["flour".to_string()]).unwrap();
        assert_eq!(names_for(&mut conn, recipe_id), ["flour"]);

        replace_for_recipe(&mut conn, recipe_id, &[]).unwrap();
        assert!(names_for(&mut conn, recipe_id).is_empty());

        // Orphaned ingredients stay behind
        assert_eq!(count_named(&mut conn, "egg"), 1);
    }

    #[test]
    fn test_ingredients_are_shared_between_recipes() {
        let mut conn = test_connection();
        let a = insert_recipe(&mut conn);
        let b = insert_recipe(&mut conn);

        replace_for_recipe(&mut conn, a, &["butter".to_string()]).unwrap();
        replace_for_recipe(&mut conn, b, &["butter".to_string()]).unwrap();

        assert_eq!(count_named(&mut conn, "butter"), 1);
        assert_eq!(names_for(&mut conn, b), ["butter"]);
    }

    #[test]
    fn test_validate_names() {
        assert!(validate_names(&["salt".to_string()]).is_ok());
        assert!(validate_names(&[]).is_ok());
        assert!(validate_names(&["  ".to_string()]).is_err());
        assert!(validate_names(&["x".repeat(81)]).is_err());
        assert!(validate_names(&["x".repeat(80)]).is_ok());
    }
}
