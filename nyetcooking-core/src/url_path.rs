//! Conversion between source URLs and the clean paths recipes are served under.
//!
//! A clean path is the URL with its scheme and any leading `www.` removed,
//! e.g. "https://www.bonappetit.com/recipe/pasta" -> "bonappetit.com/recipe/pasta".

/// Strip `http://`/`https://` and then a leading `www.`.
pub fn normalize_url_for_path(url: &str) -> String {
    let without_scheme = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);
    without_scheme
        .strip_prefix("www.")
        .unwrap_or(without_scheme)
        .to_string()
}

pub fn denormalize_path_to_url(path: &str) -> String {
    format!("https://{}", path)
}

/// Like `denormalize_path_to_url`, but with a `www.` subdomain unless the
/// path already carries one.
pub fn denormalize_path_to_url_with_www(path: &str) -> String {
    if path.starts_with("www.") {
        denormalize_path_to_url(path)
    } else {
        format!("https://www.{}", path)
    }
}

/// URLs worth trying for a clean path whose origin scheme and subdomain are unknown.
pub fn candidate_urls(path: &str) -> Vec<String> {
    let mut urls = vec![denormalize_path_to_url(path)];
    if !path.starts_with("www.") {
        urls.push(denormalize_path_to_url_with_www(path));
    }
    urls
}

/// Domain of a full URL or of a clean path ("/example.com/x" -> "example.com").
pub fn extract_domain(input: &str) -> Option<&str> {
    let rest = input
        .strip_prefix("https://")
        .or_else(|| input.strip_prefix("http://"))
        .unwrap_or(input)
        .trim_start_matches('/');
    rest.split('/').next().filter(|d| !d.is_empty())
}

/// Whether a request key looks like a clean path rather than a bare slug.
pub fn is_clean_path(key: &str) -> bool {
    extract_domain(key).is_some_and(|d| d.contains('.'))
}
