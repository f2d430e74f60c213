//! Askama template filters

// Include compile-time generated asset hashes
include!(concat!(env!("OUT_DIR"), "/asset_hashes.rs"));

/// Append cache-busting hash to static asset URLs.
///
/// Usage in templates:
/// ```html
/// <script src="{{ "/static/js/verse.js"|asset_url }}"></script>
/// ```
#[askama::filter_fn]
pub fn asset_url(path: impl std::fmt::Display, _: &dyn askama::Values) -> askama::Result<String> {
    let path_str = path.to_string();
    Ok(match path_str.as_str() {
        "/static/css/styles.css" => format!("{}?v={}", path_str, STYLES_CSS_HASH),
        "/static/js/verse.js" => format!("{}?v={}", path_str, VERSE_JS_HASH),
        _ => path_str,
    })
}

/// Format a 0-100 score with one decimal place.
#[askama::filter_fn]
pub fn score(value: impl std::fmt::Display, _: &dyn askama::Values) -> askama::Result<String> {
    let text = value.to_string();
    Ok(match text.parse::<f64>() {
        Ok(v) => format!("{:.1}", v),
        Err(_) => text,
    })
}
