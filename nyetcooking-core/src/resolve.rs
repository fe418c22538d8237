//! Turning a request key into a recipe: cache first, then the network.

use std::sync::Arc;

use crate::cache::RecipeCache;
use crate::error::{AcquireError, ResolveError};
use crate::extract::extract_recipe;
use crate::http::HttpClient;
use crate::retry::{retry, RetryPolicy, Sleeper, TokioSleeper};
use crate::slug::recipe_slug;
use crate::types::{CacheEntry, Recipe};
use crate::url_path::{candidate_urls, is_clean_path, normalize_url_for_path};

/// Keys a freshly processed recipe was cached under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Processed {
    /// Clean path, e.g. "example.com/recipes/pie".
    pub path: String,
    /// Empty when the title has no usable characters; nothing is cached under it then.
    pub slug: String,
}

pub struct Resolver {
    client: Arc<dyn HttpClient>,
    cache: Arc<RecipeCache>,
    retry: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl Resolver {
    pub fn new(client: Arc<dyn HttpClient>, cache: Arc<RecipeCache>) -> Self {
        Self {
            client,
            cache,
            retry: RetryPolicy::recipe_fetch(),
            sleeper: Arc::new(TokioSleeper),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn cache(&self) -> &RecipeCache {
        &self.cache
    }

    /// Fetch a page and extract its recipe, retrying the whole attempt.
    ///
    /// An extraction failure is retried like a network failure; the error of
    /// the last attempt is returned.
    pub async fn fetch_recipe(&self, url: &str) -> Result<Recipe, AcquireError> {
        retry(&self.retry, self.sleeper.as_ref(), url, |_| async move {
            let html = self.client.fetch_html(url).await?;
            Ok::<_, AcquireError>(extract_recipe(&html)?)
        })
        .await
    }

    /// Look up a clean path, trying each plausible source URL on a miss.
    pub async fn resolve(&self, path: &str) -> Result<Recipe, ResolveError> {
        if let Some(entry) = self.cache.get(path).await {
            tracing::debug!(path, "cache hit");
            return Ok(entry.recipe);
        }

        for url in candidate_urls(path) {
            match self.fetch_recipe(&url).await {
                Ok(recipe) => {
                    tracing::info!(path, url = %url, "resolved recipe");
                    self.cache
                        .set(path, &CacheEntry::new(recipe.clone(), url))
                        .await;
                    return Ok(recipe);
                }
                Err(e) => tracing::info!(path, url = %url, error = %e, "candidate failed"),
            }
        }

        Err(ResolveError::NotFound(path.to_string()))
    }

    /// Look up a bare slug, falling back to a fuzzy match on cached keys.
    ///
    /// The fallback takes the first cached key that contains the slug or is
    /// contained in it and whose entry records a source URL, and re-fetches
    /// that page. Short keys can match unrelated slugs.
    pub async fn resolve_slug(&self, slug: &str) -> Result<Recipe, ResolveError> {
        if slug.is_empty() {
            return Err(ResolveError::NotFound(slug.to_string()));
        }

        if let Some(entry) = self.cache.get(slug).await {
            tracing::debug!(slug, "cache hit");
            return Ok(entry.recipe);
        }

        // First similar key whose entry still knows where it came from.
        let mut similar = None;
        for key in self.cache.keys().await {
            let overlaps = key.contains(slug) || slug.contains(key.as_str());
            if key.is_empty() || key == slug || !overlaps {
                continue;
            }
            match self.cache.get(&key).await {
                Some(entry) if !entry.original_url.is_empty() => {
                    similar = Some((key, entry));
                    break;
                }
                _ => tracing::debug!(slug, key = %key, "similar entry has no source, skipping"),
            }
        }
        let Some((similar, entry)) = similar else {
            return Err(ResolveError::NotFound(slug.to_string()));
        };

        tracing::info!(
            slug,
            similar = %similar,
            url = %entry.original_url,
            "re-fetching similar entry"
        );
        match self.fetch_recipe(&entry.original_url).await {
            Ok(recipe) => {
                self.cache
                    .set(slug, &CacheEntry::new(recipe.clone(), entry.original_url))
                    .await;
                Ok(recipe)
            }
            Err(e) => {
                tracing::warn!(slug, error = %e, "re-fetch of similar entry failed");
                Err(ResolveError::NotFound(slug.to_string()))
            }
        }
    }

    /// Resolve a request key as a clean path or as a slug, whichever it looks like.
    ///
    /// A trailing `/` is part of the key: `process` caches paths exactly as
    /// the source URL spells them.
    pub async fn lookup(&self, key: &str) -> Result<Recipe, ResolveError> {
        let key = key.trim_start_matches('/');
        if is_clean_path(key) {
            self.resolve(key).await
        } else {
            self.resolve_slug(key).await
        }
    }

    /// Fetch a recipe from a user-supplied URL and cache it under its clean
    /// path and its slug.
    pub async fn process(&self, source_url: &str) -> Result<Processed, ResolveError> {
        let source_url = source_url.trim();
        validate_source_url(source_url)?;

        let recipe = self.fetch_recipe(source_url).await?;
        let entry = CacheEntry::new(recipe, source_url);

        let path = normalize_url_for_path(source_url);
        let slug = recipe_slug(&entry.recipe, Some(source_url));
        self.cache.set(&path, &entry).await;
        if slug.is_empty() {
            tracing::warn!(
                url = source_url,
                "recipe title yields no slug, cached by path only"
            );
        } else {
            self.cache.set(&slug, &entry).await;
        }

        tracing::info!(url = source_url, path = %path, slug = %slug, "processed recipe");
        Ok(Processed { path, slug })
    }
}

fn validate_source_url(raw: &str) -> Result<(), ResolveError> {
    let parsed =
        url::Url::parse(raw).map_err(|e| ResolveError::InvalidUrl(format!("{}: {}", raw, e)))?;
    match parsed.scheme() {
        "http" | "https" if parsed.host_str().is_some() => Ok(()),
        scheme => Err(ResolveError::InvalidUrl(format!(
            "{}: unsupported scheme {}",
            raw, scheme
        ))),
    }
}
