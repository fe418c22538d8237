use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::instructions::flatten_instructions;

/// A schema.org Recipe as found in the page's JSON-LD.
///
/// The object is kept as-is: publishers disagree on almost every field's
/// shape, so the accessors below do the interpretation and return `None` (or
/// an empty list) instead of failing when a field is missing or odd.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Recipe(Map<String, Value>);

/// Aggregate rating, rendered verbatim from whatever the publisher sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rating {
    pub value: String,
    pub count: Option<String>,
}

impl Recipe {
    /// Wrap a JSON value. Returns None unless the value is an object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field).filter(|v| !v.is_null())
    }

    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    pub fn insert(&mut self, field: &str, value: Value) {
        self.0.insert(field.to_string(), value);
    }

    fn str_field(&self, field: &str) -> Option<&str> {
        self.get(field)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn name(&self) -> Option<&str> {
        self.str_field("name")
    }

    pub fn description(&self) -> Option<&str> {
        self.str_field("description")
    }

    /// Author name from `{name}`, a list of such objects (first wins), or a bare string.
    pub fn author_name(&self) -> Option<&str> {
        fn name_of(value: &Value) -> Option<&str> {
            match value {
                Value::String(s) => Some(s.as_str()),
                Value::Object(obj) => obj.get("name").and_then(Value::as_str),
                Value::Array(arr) => arr.first().and_then(name_of),
                _ => None,
            }
        }
        self.get("author")
            .and_then(name_of)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// First usable image URL: a string, an ImageObject's `url`, or the first of a list.
    pub fn image_url(&self) -> Option<&str> {
        fn url_of(value: &Value) -> Option<&str> {
            match value {
                Value::String(s) => Some(s.as_str()),
                Value::Object(obj) => obj.get("url").and_then(url_of),
                Value::Array(arr) => arr.first().and_then(url_of),
                _ => None,
            }
        }
        self.get("image").and_then(url_of)
    }

    pub fn ingredients(&self) -> Vec<&str> {
        match self.get("recipeIngredient") {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect(),
            Some(Value::String(s)) if !s.trim().is_empty() => vec![s.trim()],
            _ => Vec::new(),
        }
    }

    /// Instructions flattened into ordered steps. Storage is left untouched.
    pub fn instructions(&self) -> Vec<String> {
        flatten_instructions(self.get("recipeInstructions"))
    }

    pub fn prep_time(&self) -> Option<&str> {
        self.str_field("prepTime")
    }

    pub fn cook_time(&self) -> Option<&str> {
        self.str_field("cookTime")
    }

    pub fn total_time(&self) -> Option<&str> {
        self.str_field("totalTime")
    }

    pub fn recipe_yield(&self) -> Option<String> {
        match self.get("recipeYield")? {
            Value::Array(arr) => arr.first().and_then(scalar_to_string),
            other => scalar_to_string(other),
        }
    }

    pub fn rating(&self) -> Option<Rating> {
        let rating = self.get("aggregateRating")?;
        let value = rating.get("ratingValue").and_then(scalar_to_string)?;
        let count = rating
            .get("reviewCount")
            .or_else(|| rating.get("ratingCount"))
            .and_then(scalar_to_string);
        Some(Rating { value, count })
    }

    /// Tips attached by supplementary extraction.
    pub fn tips(&self) -> Vec<String> {
        match self.get("tips") {
            Some(Value::String(s)) => vec![s.clone()],
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s.clone()),
                    Value::Object(obj) => obj
                        .get("text")
                        .or_else(|| obj.get("description"))
                        .and_then(Value::as_str)
                        .map(str::to_string),
                    _ => None,
                })
                .filter(|s| !s.trim().is_empty())
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Notes attached by supplementary extraction.
    pub fn notes(&self) -> Option<String> {
        match self.get("notes")? {
            Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            Value::Array(items) => {
                let parts: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
                if parts.is_empty() {
                    None
                } else {
                    Some(parts.join("\n\n"))
                }
            }
            _ => None,
        }
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// What the cache stores per key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub recipe: Recipe,
    /// The exact URL the recipe was extracted from, used to re-fetch on a miss.
    pub original_url: String,
}

impl CacheEntry {
    pub fn new(recipe: Recipe, original_url: impl Into<String>) -> Self {
        Self {
            recipe,
            original_url: original_url.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn recipe(value: Value) -> Recipe {
        Recipe::from_value(value).unwrap()
    }

    #[test]
    fn test_from_value_rejects_non_objects() {
        assert!(Recipe::from_value(json!(["Recipe"])).is_none());
        assert!(Recipe::from_value(json!("Recipe")).is_none());
    }

    #[test]
    fn test_author_shapes() {
        assert_eq!(
            recipe(json!({"author": {"name": "Sam Sifton"}})).author_name(),
            Some("Sam Sifton")
        );
        assert_eq!(
            recipe(json!({"author": [{"@type": "Person", "name": "Sohui Kim"}]})).author_name(),
            Some("Sohui Kim")
        );
        assert_eq!(recipe(json!({"author": []})).author_name(), None);
        assert_eq!(recipe(json!({})).author_name(), None);
    }

    #[test]
    fn test_image_shapes() {
        assert_eq!(
            recipe(json!({"image": "https://example.com/a.jpg"})).image_url(),
            Some("https://example.com/a.jpg")
        );
        assert_eq!(
            recipe(json!({"image": {"@type": "ImageObject", "url": "https://example.com/b.jpg"}}))
                .image_url(),
            Some("https://example.com/b.jpg")
        );
        assert_eq!(
            recipe(json!({"image": ["https://example.com/1.jpg", "https://example.com/2.jpg"]}))
                .image_url(),
            Some("https://example.com/1.jpg")
        );
    }

    #[test]
    fn test_yield_and_rating() {
        let r = recipe(json!({
            "recipeYield": ["8 slices", "4 servings"],
            "aggregateRating": {"ratingValue": 4.5, "reviewCount": "100"}
        }));
        assert_eq!(r.recipe_yield(), Some("8 slices".to_string()));
        assert_eq!(
            r.rating(),
            Some(Rating {
                value: "4.5".to_string(),
                count: Some("100".to_string())
            })
        );

        assert_eq!(recipe(json!({"recipeYield": 6})).recipe_yield(), Some("6".to_string()));
    }

    #[test]
    fn test_missing_fields_are_absent() {
        let r = recipe(json!({"name": null}));
        assert_eq!(r.name(), None);
        assert!(r.ingredients().is_empty());
        assert!(r.instructions().is_empty());
        assert!(r.tips().is_empty());
        assert_eq!(r.notes(), None);
        assert_eq!(r.rating(), None);
    }

    #[test]
    fn test_cache_entry_wire_format() {
        let entry = CacheEntry::new(recipe(json!({"name": "Pie"})), "https://example.com/pie");
        let wire = serde_json::to_value(&entry).unwrap();
        assert_eq!(
            wire,
            json!({"recipe": {"name": "Pie"}, "original_url": "https://example.com/pie"})
        );
    }
}
