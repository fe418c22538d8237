use std::sync::LazyLock;

use scraper::{Html, Selector};
use serde_json::Value;

use crate::error::ExtractError;
use crate::types::Recipe;

static JSONLD_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"script[type="application/ld+json"]"#).expect("Invalid JSON-LD selector")
});

static NEXT_DATA_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("script#__NEXT_DATA__").expect("Invalid __NEXT_DATA__ selector")
});

/// Fields every usable recipe should have; their absence is logged, never fatal.
const EXPECTED_FIELDS: &[&str] = &["name", "recipeIngredient", "recipeInstructions"];

/// Extract a Recipe from the JSON-LD blocks of a page.
///
/// The first Recipe found across all blocks, in document order, wins. Tips
/// and notes from a Next.js `__NEXT_DATA__` island are attached when present.
pub fn extract_recipe(html: &str) -> Result<Recipe, ExtractError> {
    let document = Html::parse_document(html);

    let blocks: Vec<String> = document
        .select(&JSONLD_SELECTOR)
        .map(|el| el.text().collect::<String>())
        .collect();

    if blocks.is_empty() {
        return Err(ExtractError::NoJsonLd);
    }

    let mut recipe = blocks
        .iter()
        .enumerate()
        .filter_map(|(index, text)| match parse_json_block(text) {
            Ok(json) => Some(json),
            Err(e) => {
                tracing::debug!(block = index, error = %e, "skipping unparsable JSON-LD block");
                None
            }
        })
        .find_map(|json| find_recipe(&json).cloned())
        .and_then(Recipe::from_value)
        .ok_or(ExtractError::NoRecipe)?;

    for field in EXPECTED_FIELDS {
        if !recipe.contains(field) {
            tracing::warn!(field, "recipe is missing an expected field");
        }
    }

    match find_supplement(&document) {
        Ok(Some(supplement)) => supplement.apply(&mut recipe),
        Ok(None) => {}
        Err(reason) => tracing::debug!(%reason, "skipping __NEXT_DATA__ supplement"),
    }

    Ok(recipe)
}

fn parse_json_block(text: &str) -> Result<Value, serde_json::Error> {
    serde_json::from_str(text).or_else(|_| serde_json::from_str(&sanitize_json(text)))
}

/// Escape raw control characters some sites leave inside JSON strings.
fn sanitize_json(json: &str) -> String {
    let mut result = String::with_capacity(json.len());
    let mut in_string = false;
    let mut escaped = false;

    for c in json.chars() {
        if in_string {
            match c {
                _ if escaped => {
                    escaped = false;
                    result.push(c);
                }
                '\\' => {
                    escaped = true;
                    result.push(c);
                }
                '"' => {
                    in_string = false;
                    result.push(c);
                }
                '\n' => result.push_str("\\n"),
                '\r' => result.push_str("\\r"),
                '\t' => result.push_str("\\t"),
                c if c.is_control() => {}
                _ => result.push(c),
            }
        } else {
            if c == '"' {
                in_string = true;
            }
            result.push(c);
        }
    }

    result
}

/// Items a JSON-LD block offers: the `@graph` list, the top-level array, or the value itself.
fn candidate_items(json: &Value) -> Vec<&Value> {
    if let Some(graph) = json.get("@graph") {
        return match graph {
            Value::Array(items) => items.iter().collect(),
            other => vec![other],
        };
    }
    match json {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    }
}

fn find_recipe(json: &Value) -> Option<&Value> {
    candidate_items(json).into_iter().find(|item| is_recipe(item))
}

/// `@type` is "Recipe" in any case, or a list with an entry mentioning "recipe".
fn is_recipe(item: &Value) -> bool {
    match item.get("@type") {
        Some(Value::String(t)) => t.eq_ignore_ascii_case("recipe"),
        Some(Value::Array(types)) => types
            .iter()
            .filter_map(Value::as_str)
            .any(|t| t.to_lowercase().contains("recipe")),
        _ => false,
    }
}

/// Extra fields from a Next.js data island that JSON-LD doesn't carry.
#[derive(Debug, Default, PartialEq)]
struct Supplement {
    tips: Option<Value>,
    notes: Option<Value>,
}

impl Supplement {
    fn apply(self, recipe: &mut Recipe) {
        if let Some(tips) = self.tips {
            recipe.insert("tips", tips);
        }
        if let Some(notes) = self.notes {
            recipe.insert("notes", notes);
        }
    }
}

/// Ok(None) means the page simply has nothing to add; Err carries why the
/// island was present but unusable. Neither affects the extracted recipe.
fn find_supplement(document: &Html) -> Result<Option<Supplement>, String> {
    let Some(script) = document.select(&NEXT_DATA_SELECTOR).next() else {
        return Ok(None);
    };

    let text = script.text().collect::<String>();
    let data: Value = serde_json::from_str(&text).map_err(|e| format!("invalid JSON: {}", e))?;

    let Some(recipe) = data.pointer("/props/pageProps/recipe") else {
        return Ok(None);
    };
    if !recipe.is_object() {
        return Err("props.pageProps.recipe is not an object".to_string());
    }

    let present = |key: &str| recipe.get(key).filter(|v| !v.is_null()).cloned();
    let supplement = Supplement {
        tips: present("tip_data").or_else(|| present("tips")),
        notes: present("notes"),
    };

    if supplement == Supplement::default() {
        Ok(None)
    } else {
        Ok(Some(supplement))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn page(blocks: &[&str]) -> String {
        let scripts: String = blocks
            .iter()
            .map(|b| format!(r#"<script type="application/ld+json">{}</script>"#, b))
            .collect();
        format!("<!DOCTYPE html><html><head>{}</head><body></body></html>", scripts)
    }

    #[test]
    fn test_no_jsonld_blocks() {
        let html = "<html><head><title>Nothing</title></head><body></body></html>";
        assert!(matches!(extract_recipe(html), Err(ExtractError::NoJsonLd)));
    }

    #[test]
    fn test_no_recipe_object() {
        let html = page(&[r#"{"@type": "WebSite", "name": "Food Blog"}"#]);
        assert!(matches!(extract_recipe(&html), Err(ExtractError::NoRecipe)));
    }

    #[test]
    fn test_plain_object() {
        let html = page(&[r#"{
            "@context": "https://schema.org",
            "@type": "Recipe",
            "name": "Test Recipe",
            "recipeIngredient": ["1 cup flour"],
            "recipeInstructions": "Mix and bake."
        }"#]);
        let recipe = extract_recipe(&html).unwrap();
        assert_eq!(recipe.name(), Some("Test Recipe"));
        assert_eq!(recipe.ingredients(), vec!["1 cup flour"]);
    }

    #[test]
    fn test_graph_recipe_after_other_items() {
        let html = page(&[r#"{
            "@context": "https://schema.org",
            "@graph": [
                {"@type": "WebPage", "name": "Page"},
                {"@type": "Recipe", "name": "Graph Recipe"}
            ]
        }"#]);
        assert_eq!(extract_recipe(&html).unwrap().name(), Some("Graph Recipe"));
    }

    #[test]
    fn test_graph_recipe_before_other_items() {
        let html = page(&[r#"{
            "@graph": [
                {"@type": "Recipe", "name": "Graph Recipe"},
                {"@type": "Organization", "name": "Publisher"}
            ]
        }"#]);
        assert_eq!(extract_recipe(&html).unwrap().name(), Some("Graph Recipe"));
    }

    #[test]
    fn test_top_level_array_and_type_list() {
        let html = page(&[r#"[
            {"@type": "BreadcrumbList"},
            {"@type": ["NewsArticle", "Recipe"], "name": "Listed Type"}
        ]"#]);
        assert_eq!(extract_recipe(&html).unwrap().name(), Some("Listed Type"));
    }

    #[test]
    fn test_type_match_is_case_insensitive() {
        let html = page(&[r#"{"@type": "RECIPE", "name": "Shouty"}"#]);
        assert_eq!(extract_recipe(&html).unwrap().name(), Some("Shouty"));

        let html = page(&[r#"{"@type": "RecipeCollection", "name": "Not A Recipe"}"#]);
        assert!(matches!(extract_recipe(&html), Err(ExtractError::NoRecipe)));
    }

    #[test]
    fn test_first_recipe_in_document_order_wins() {
        let html = page(&[
            r#"{"@type": "WebSite"}"#,
            r#"{"@type": "Recipe", "name": "First"}"#,
            r#"{"@type": "Recipe", "name": "Second"}"#,
        ]);
        assert_eq!(extract_recipe(&html).unwrap().name(), Some("First"));
    }

    #[test]
    fn test_unparsable_block_is_skipped() {
        let html = page(&[
            r#"{"@type": "Recipe", "name": "#,
            r#"{"@type": "Recipe", "name": "Valid"}"#,
        ]);
        assert_eq!(extract_recipe(&html).unwrap().name(), Some("Valid"));
    }

    #[test]
    fn test_literal_newlines_inside_strings() {
        let html = page(&["{\"@type\": \"Recipe\", \"name\": \"Two\nLines\"}"]);
        assert_eq!(extract_recipe(&html).unwrap().name(), Some("Two\nLines"));
    }

    #[test]
    fn test_sanitize_leaves_escapes_alone() {
        let raw = "{\"a\": \"quote \\\" then\ttab\"}";
        let parsed: Value = serde_json::from_str(&sanitize_json(raw)).unwrap();
        assert_eq!(parsed["a"], json!("quote \" then\ttab"));
    }

    #[test]
    fn test_missing_fields_are_not_fabricated() {
        let html = page(&[r#"{"@type": "Recipe"}"#]);
        let recipe = extract_recipe(&html).unwrap();
        assert_eq!(recipe.name(), None);
        assert!(!recipe.contains("recipeIngredient"));
    }

    #[test]
    fn test_next_data_tips_and_notes() {
        let next_data = json!({
            "props": {"pageProps": {"recipe": {
                "tip_data": ["Use ripe bananas", "Toast the walnuts"],
                "notes": "Freezes well."
            }}}
        });
        let html = format!(
            r#"<html><head>
                <script type="application/ld+json">{{"@type": "Recipe", "name": "Banana Bread"}}</script>
                <script id="__NEXT_DATA__" type="application/json">{}</script>
            </head><body></body></html>"#,
            next_data
        );

        let recipe = extract_recipe(&html).unwrap();
        assert_eq!(recipe.tips(), vec!["Use ripe bananas", "Toast the walnuts"]);
        assert_eq!(recipe.notes(), Some("Freezes well.".to_string()));
    }

    #[test]
    fn test_next_data_tips_fallback_field() {
        let html = r#"<html><head>
            <script type="application/ld+json">{"@type": "Recipe", "name": "Soup"}</script>
            <script id="__NEXT_DATA__">{"props": {"pageProps": {"recipe": {"tips": ["Salt late"]}}}}</script>
        </head></html>"#;
        assert_eq!(extract_recipe(html).unwrap().tips(), vec!["Salt late"]);
    }

    #[test]
    fn test_broken_next_data_never_fails_extraction() {
        for island in [
            "{not json",
            r#"{"props": {}}"#,
            r#"{"props": {"pageProps": {"recipe": "a string"}}}"#,
        ] {
            let html = format!(
                r#"<html><head>
                    <script type="application/ld+json">{{"@type": "Recipe", "name": "Soup"}}</script>
                    <script id="__NEXT_DATA__">{}</script>
                </head></html>"#,
                island
            );
            let recipe = extract_recipe(&html).unwrap();
            assert_eq!(recipe.name(), Some("Soup"));
            assert!(!recipe.contains("tips"));
        }
    }
}
