//! Header comment parsing.
//!
//! WordPress declares package metadata in a comment block of `key: value`
//! lines near the top of the entry file:
//!
//! ```text
//! /*
//!  * Plugin Name: Akismet Anti-spam
//!  * Version: 5.3
//!  * Text Domain: akismet
//!  */
//! ```
//!
//! Each key is matched case-insensitively at the start of a line, after any
//! run of comment decoration (whitespace, `*`, `#`, `@`, `/`). The first
//! match wins.

use regex::{Regex, RegexBuilder};
use std::sync::OnceLock;
use wpstage_core::{HeaderInfo, PackageKind};

/// Keys recognized for every package kind.
const VERSION_KEY: &str = "Version";
const TEXT_DOMAIN_KEY: &str = "Text Domain";
const AUTHOR_KEY: &str = "Author";
const AUTHOR_URI_KEY: &str = "Author URI";
const DESCRIPTION_KEY: &str = "Description";

/// Compiled matchers for one package kind.
#[derive(Debug)]
pub struct HeaderParser {
    kind: PackageKind,
    name: Regex,
    version: Regex,
    text_domain: Regex,
    author: Regex,
    /// Author URI, then this kind's URI, then the other kind's
    author_url: [Regex; 3],
    description: Regex,
}

fn key_pattern(key: &str) -> Regex {
    let pattern = format!(r"^[ \t*#@/]*{}:[ \t]*(.*)$", regex::escape(key));
    RegexBuilder::new(&pattern)
        .case_insensitive(true)
        .multi_line(true)
        .build()
        .expect("escaped header key is a valid pattern")
}

impl HeaderParser {
    pub fn new(kind: PackageKind) -> Self {
        let other = match kind {
            PackageKind::Plugin => PackageKind::Theme,
            PackageKind::Theme => PackageKind::Plugin,
        };
        Self {
            kind,
            name: key_pattern(kind.name_key()),
            version: key_pattern(VERSION_KEY),
            text_domain: key_pattern(TEXT_DOMAIN_KEY),
            author: key_pattern(AUTHOR_KEY),
            author_url: [
                key_pattern(AUTHOR_URI_KEY),
                key_pattern(kind.uri_key()),
                key_pattern(other.uri_key()),
            ],
            description: key_pattern(DESCRIPTION_KEY),
        }
    }

    /// Shared parser for `kind`, compiled on first use.
    pub fn for_kind(kind: PackageKind) -> &'static HeaderParser {
        static PLUGIN: OnceLock<HeaderParser> = OnceLock::new();
        static THEME: OnceLock<HeaderParser> = OnceLock::new();
        match kind {
            PackageKind::Plugin => PLUGIN.get_or_init(|| HeaderParser::new(PackageKind::Plugin)),
            PackageKind::Theme => THEME.get_or_init(|| HeaderParser::new(PackageKind::Theme)),
        }
    }

    pub fn kind(&self) -> PackageKind {
        self.kind
    }

    /// Parse a header block; `None` unless the name key has a value.
    pub fn parse(&self, text: &str) -> Option<HeaderInfo> {
        let name = first_value(&self.name, text)?;
        Some(HeaderInfo {
            name,
            version: first_value(&self.version, text),
            text_domain: first_value(&self.text_domain, text),
            author: first_value(&self.author, text),
            author_url: self
                .author_url
                .iter()
                .find_map(|pattern| first_value(pattern, text)),
            description: first_value(&self.description, text),
        })
    }
}

/// First non-empty trimmed capture of `pattern` in `text`.
fn first_value(pattern: &Regex, text: &str) -> Option<String> {
    let value = pattern.captures(text)?.get(1)?.as_str().trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Parse the header of a file of the given kind.
pub fn parse_header(text: &str, kind: PackageKind) -> Option<HeaderInfo> {
    HeaderParser::for_kind(kind).parse(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLUGIN_HEADER: &str = r#"<?php
/**
 * Plugin Name: Akismet Anti-spam: Spam Protection
 * Plugin URI: https://akismet.com/
 * Description: Used by millions, Akismet is quite possibly the best way in the world to protect your blog from spam.
 * Version: 5.3
 * Requires at least: 5.8
 * Author: Automattic - Anti-spam Team
 * Author URI: https://automattic.com/wordpress-plugins/
 * License: GPLv2 or later
 * Text Domain: akismet
 */
"#;

    #[test]
    fn test_parses_standard_plugin_header() {
        let header = parse_header(PLUGIN_HEADER, PackageKind::Plugin).unwrap();
        assert_eq!(header.name, "Akismet Anti-spam: Spam Protection");
        assert_eq!(header.version.as_deref(), Some("5.3"));
        assert_eq!(header.text_domain.as_deref(), Some("akismet"));
        assert_eq!(header.author.as_deref(), Some("Automattic - Anti-spam Team"));
        assert_eq!(
            header.author_url.as_deref(),
            Some("https://automattic.com/wordpress-plugins/")
        );
        assert!(header.description.unwrap().starts_with("Used by millions"));
    }

    #[test]
    fn test_name_key_is_required() {
        let text = "/*\n * Version: 1.0\n * Text Domain: orphan\n */";
        assert!(parse_header(text, PackageKind::Plugin).is_none());
    }

    #[test]
    fn test_empty_name_is_not_a_header() {
        let text = "/*\n * Plugin Name:   \n * Version: 1.0\n */";
        assert!(parse_header(text, PackageKind::Plugin).is_none());
    }

    #[test]
    fn test_plugin_header_in_style_css_is_ignored() {
        assert!(parse_header(PLUGIN_HEADER, PackageKind::Theme).is_none());
    }

    #[test]
    fn test_theme_header_with_theme_uri_fallback() {
        let css = "/*\nTheme Name: Twenty Twenty-Four\nTheme URI: https://wordpress.org/themes/twentytwentyfour/\nAuthor: the WordPress team\nVersion: 1.1\nText Domain: twentytwentyfour\n*/";
        let header = parse_header(css, PackageKind::Theme).unwrap();
        assert_eq!(header.name, "Twenty Twenty-Four");
        assert_eq!(header.author.as_deref(), Some("the WordPress team"));
        assert_eq!(
            header.author_url.as_deref(),
            Some("https://wordpress.org/themes/twentytwentyfour/")
        );
    }

    #[test]
    fn test_keys_match_case_insensitively_with_assorted_markers() {
        let text = "<?php\n# plugin name: Hash Style\n@version: 2.0\n// TEXT DOMAIN: hash-style\r\n";
        let header = parse_header(text, PackageKind::Plugin).unwrap();
        assert_eq!(header.name, "Hash Style");
        assert_eq!(header.version.as_deref(), Some("2.0"));
        assert_eq!(header.text_domain.as_deref(), Some("hash-style"));
    }

    #[test]
    fn test_key_must_start_the_line() {
        let text = "<?php\n$x = 'Plugin Name: not a header';\n";
        assert!(parse_header(text, PackageKind::Plugin).is_none());
    }

    #[test]
    fn test_first_match_wins() {
        let text = "/*\n * Plugin Name: First\n * Plugin Name: Second\n */";
        assert_eq!(parse_header(text, PackageKind::Plugin).unwrap().name, "First");
    }

    #[test]
    fn test_author_does_not_swallow_author_uri() {
        let text = "/*\n * Plugin Name: X\n * Author URI: https://example.com\n */";
        let header = parse_header(text, PackageKind::Plugin).unwrap();
        assert_eq!(header.author, None);
        assert_eq!(header.author_url.as_deref(), Some("https://example.com"));
    }
}
