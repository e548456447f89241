//! Extension-based content types and the source upload allow-list.

use std::path::Path;

/// Extensions uploaded from an extracted source tree.
pub const UPLOAD_EXTENSIONS: &[&str] = &[
    "php", "js", "css", "html", "json", "xml", "txt", "md", "scss", "less", "woff", "woff2",
    "png", "jpg", "svg", "zip",
];

pub const OCTET_STREAM: &str = "application/octet-stream";

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

/// Whether a source file is published.
pub fn is_uploadable(path: &Path) -> bool {
    extension(path).is_some_and(|ext| UPLOAD_EXTENSIONS.contains(&ext.as_str()))
}

/// MIME type for a file, by extension.
pub fn content_type_for(path: &Path) -> &'static str {
    let Some(ext) = extension(path) else {
        return OCTET_STREAM;
    };

    match ext.as_str() {
        "php" => "application/x-httpd-php",
        "js" => "text/javascript",
        "css" => "text/css",
        "html" | "htm" => "text/html",
        "json" => "application/json",
        "xml" => "application/xml",
        "txt" => "text/plain",
        "md" => "text/markdown",
        "scss" => "text/x-scss",
        "less" => "text/less",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "svg" => "image/svg+xml",
        "zip" => "application/zip",
        _ => OCTET_STREAM,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allow_list() {
        assert!(is_uploadable(Path::new("inc/admin.PHP")));
        assert!(is_uploadable(Path::new("assets/fonts/icons.woff2")));
        assert!(!is_uploadable(Path::new("vendor/bin/phpunit")));
        assert!(!is_uploadable(Path::new("assets/logo.gif")));
        assert!(!is_uploadable(Path::new(".htaccess")));
    }

    #[test]
    fn test_content_types() {
        assert_eq!(content_type_for(Path::new("download.zip")), "application/zip");
        assert_eq!(content_type_for(Path::new("tree.json")), "application/json");
        assert_eq!(content_type_for(Path::new("banner.png")), "image/png");
        assert_eq!(content_type_for(Path::new("style.CSS")), "text/css");
        assert_eq!(content_type_for(Path::new("LICENSE")), OCTET_STREAM);
    }
}
