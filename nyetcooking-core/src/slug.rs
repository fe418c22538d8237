use std::sync::LazyLock;

use regex::Regex;

use crate::types::Recipe;

/// NYT Cooking recipe URLs carry a stable numeric ID: /recipes/1234567-banana-bread
static NYT_RECIPE_ID_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"cooking\.nytimes\.com/recipes/(\d+)").expect("Invalid NYT recipe ID regex")
});

static DISALLOWED_CHARS_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9\s-]").expect("Invalid slug character regex"));

static WHITESPACE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("Invalid whitespace regex"));

/// Numeric recipe ID from an NYT Cooking recipe URL, if there is one.
pub fn extract_nyt_recipe_id(url: &str) -> Option<&str> {
    NYT_RECIPE_ID_REGEX
        .captures(url)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str())
}

/// Derive a URL- and filesystem-safe slug from the recipe title.
///
/// When the source URL carries a numeric recipe ID, the slug is prefixed
/// with it so the recipe can be addressed by ID alone.
/// e.g. "Mom's Best Pie!" -> "moms-best-pie"
pub fn recipe_slug(recipe: &Recipe, source_url: Option<&str>) -> String {
    let title = recipe.name().unwrap_or("recipe");
    let cleaned = DISALLOWED_CHARS_REGEX.replace_all(title, "");
    let slug = WHITESPACE_REGEX
        .replace_all(cleaned.trim(), "-")
        .to_lowercase();

    match source_url.and_then(extract_nyt_recipe_id) {
        Some(id) => format!("{}-{}", id, slug),
        None => slug,
    }
}
