//! Content-type lookup by file-name suffix.

/// Content type used when no suffix matches.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Ordered suffix table. The first matching entry wins.
pub const MIME_TABLE: &[(&str, &str)] = &[
    (".html", "text/html"),
    (".txt", "text/plain"),
    (".xml", "text/xml"),
    (".png", "image/png"),
    (".gif", "image/gif"),
];

/// Returns the content type for `name` by matching its trailing characters
/// against [`MIME_TABLE`]. Matching is case-sensitive.
///
/// # Example
///
/// ```
/// # use webdir::http::mime::content_type_for;
/// assert_eq!(content_type_for("/srv/www/index.html"), "text/html");
/// assert_eq!(content_type_for("/srv/www/INDEX.HTML"), "application/octet-stream");
/// ```
pub fn content_type_for(name: &str) -> &'static str {
    MIME_TABLE
        .iter()
        .find(|(suffix, _)| name.ends_with(suffix))
        .map(|(_, content_type)| *content_type)
        .unwrap_or(DEFAULT_CONTENT_TYPE)
}
