//! Public URL construction.
//!
//! A base URL is stored without trailing slash; an empty base yields
//! root-relative URLs.

use ipa_core::types::settings::{ICON_EXTENSION, IMAGES_URL_PREFIX, PACKAGES_URL_PREFIX};

/// `<base>/repo/packages/<file name>`
pub fn download_url(base_url: &str, package_file_name: &str) -> String {
    format!("{}{}/{}", base_url, PACKAGES_URL_PREFIX, package_file_name)
}

/// Root-relative icon path stored in records: `/repo/images/<stem>.png`
pub fn icon_path(package_stem: &str) -> String {
    format!("{}/{}.{}", IMAGES_URL_PREFIX, package_stem, ICON_EXTENSION)
}

/// Public icon URL: `<base>/repo/images/<stem>.png`
pub fn icon_url(base_url: &str, package_stem: &str) -> String {
    format!("{}{}", base_url, icon_path(package_stem))
}

pub fn is_absolute(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Resolve a configured URL: absolute stays, root-relative gets the base prepended
pub fn resolve_static(base_url: &str, value: &str) -> String {
    let value = value.trim();
    if value.starts_with('/') && !is_absolute(value) {
        format!("{}{}", base_url, value)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_url() {
        assert_eq!(
            download_url("https://a.example", "Demo.ipa"),
            "https://a.example/repo/packages/Demo.ipa"
        );
        assert_eq!(download_url("", "Demo.ipa"), "/repo/packages/Demo.ipa");
    }

    #[test]
    fn test_icon_urls() {
        assert_eq!(icon_path("demo"), "/repo/images/demo.png");
        assert_eq!(icon_url("https://a.example", "demo"), "https://a.example/repo/images/demo.png");
    }

    #[test]
    fn test_resolve_static() {
        assert_eq!(resolve_static("https://b", "/logo.png"), "https://b/logo.png");
        assert_eq!(resolve_static("https://b", "https://c/logo.png"), "https://c/logo.png");
        assert_eq!(resolve_static("https://b", ""), "");
    }
}
