//! Markdown export of a cached recipe.

use crate::duration::format_duration;
use crate::types::Recipe;

/// Render a recipe as a standalone markdown document.
///
/// Sections appear in a fixed order and optional ones are left out entirely
/// when the recipe has nothing for them.
pub fn recipe_to_markdown(recipe: &Recipe) -> String {
    let mut sections: Vec<String> = Vec::new();

    sections.push(format!("# {}", recipe.name().unwrap_or("Recipe")));

    if let Some(author) = recipe.author_name() {
        sections.push(format!("*By {}*", author));
    }

    if let Some(description) = recipe.description() {
        sections.push(description.to_string());
    }

    let mut meta = Vec::new();
    if let Some(total) = recipe.total_time() {
        meta.push(format!("**Total Time:** {}", format_duration(total)));
    }
    if let Some(prep) = recipe.prep_time() {
        meta.push(format!("**Prep Time:** {}", format_duration(prep)));
    }
    if let Some(cook) = recipe.cook_time() {
        meta.push(format!("**Cook Time:** {}", format_duration(cook)));
    }
    if let Some(serves) = recipe.recipe_yield() {
        meta.push(format!("**Serves:** {}", serves));
    }
    if !meta.is_empty() {
        sections.push(meta.join(" | "));
    }

    let ingredients: Vec<String> = recipe
        .ingredients()
        .iter()
        .map(|i| format!("- {}", i))
        .collect();
    sections.push(format!("## Ingredients\n\n{}", ingredients.join("\n")));

    let instructions: Vec<String> = recipe
        .instructions()
        .iter()
        .enumerate()
        .map(|(i, step)| format!("{}. {}", i + 1, step))
        .collect();
    sections.push(format!("## Instructions\n\n{}", instructions.join("\n")));

    let tips = recipe.tips();
    if !tips.is_empty() {
        let tips: Vec<String> = tips.iter().map(|t| format!("- {}", t)).collect();
        sections.push(format!("## Tips\n\n{}", tips.join("\n")));
    }

    if let Some(notes) = recipe.notes() {
        sections.push(format!("## Notes\n\n{}", notes));
    }

    if let Some(rating) = recipe.rating() {
        let line = match rating.count {
            Some(count) => format!(
                "**Rating:** {}/5 stars (based on {} reviews)",
                rating.value, count
            ),
            None => format!("**Rating:** {}/5 stars", rating.value),
        };
        sections.push(line);
    }

    let mut markdown = sections.join("\n\n");
    markdown.push('\n');
    markdown
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn sample_recipe() -> Value {
        json!({
            "@type": "Recipe",
            "name": "Test Recipe",
            "description": "A delicious test recipe",
            "author": {"name": "Test Chef"},
            "image": "https://example.com/image.jpg",
            "recipeIngredient": ["1 cup flour", "2 eggs", "1 cup milk"],
            "recipeInstructions": [
                {"@type": "HowToStep", "text": "Mix ingredients"},
                {"@type": "HowToStep", "text": "Bake at 350F"}
            ],
            "prepTime": "PT15M",
            "cookTime": "PT30M",
            "totalTime": "PT45M",
            "recipeYield": "4 servings",
            "aggregateRating": {"ratingValue": 4.5, "reviewCount": 100}
        })
    }

    fn render(value: Value) -> String {
        recipe_to_markdown(&Recipe::from_value(value).unwrap())
    }

    #[test]
    fn test_full_document() {
        let md = render(sample_recipe());
        let expected = "# Test Recipe\n\n\
            *By Test Chef*\n\n\
            A delicious test recipe\n\n\
            **Total Time:** 45 minutes | **Prep Time:** 15 minutes | **Cook Time:** 30 minutes | **Serves:** 4 servings\n\n\
            ## Ingredients\n\n- 1 cup flour\n- 2 eggs\n- 1 cup milk\n\n\
            ## Instructions\n\n1. Mix ingredients\n2. Bake at 350F\n\n\
            **Rating:** 4.5/5 stars (based on 100 reviews)\n";
        assert_eq!(md, expected);
    }

    #[test]
    fn test_tips_and_notes() {
        let mut value = sample_recipe();
        value["tips"] = json!(["Tip 1", "Tip 2"]);
        value["notes"] = json!("Keeps for three days.");
        let md = render(value);

        assert!(md.contains("## Tips\n\n- Tip 1\n- Tip 2"));
        assert!(md.contains("## Notes\n\nKeeps for three days."));
        assert!(md.find("## Tips").unwrap() < md.find("## Notes").unwrap());
        assert!(md.find("## Notes").unwrap() < md.find("**Rating:**").unwrap());
    }

    #[test]
    fn test_author_list() {
        let md = render(json!({
            "name": "Test Recipe",
            "author": [{
                "@type": "Person",
                "name": "Sohui Kim",
                "sameAs": "https://www.bonappetit.com/contributor/sohui-kim"
            }],
            "recipeIngredient": ["flour"],
            "recipeInstructions": [{"text": "Mix it"}]
        }));
        assert!(md.contains("*By Sohui Kim*"));
    }

    #[test]
    fn test_minimal_recipe_omits_optional_sections() {
        let md = render(json!({
            "name": "Test Recipe",
            "recipeIngredient": ["flour"],
            "recipeInstructions": [{"text": "Mix it"}]
        }));
        assert!(md.starts_with("# Test Recipe\n\n## Ingredients"));
        assert!(!md.contains("*By"));
        assert!(!md.contains("Time:**"));
        assert!(!md.contains("## Tips"));
        assert!(!md.contains("Rating"));
    }

    #[test]
    fn test_rating_without_review_count() {
        let md = render(json!({
            "name": "Test Recipe",
            "aggregateRating": {"ratingValue": "4"}
        }));
        assert!(md.contains("**Rating:** 4/5 stars\n"));
        assert!(!md.contains("based on"));
    }
}
