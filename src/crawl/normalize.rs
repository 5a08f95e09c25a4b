// src/crawl/normalize.rs
// =============================================================================
// URL canonicalization and crawl scope.
//
// Canonical form (one string per resource, used as the visited-set key):
// - relative references are resolved against the page URL
// - only http/https survive; mailto:, tel:, javascript: etc. are rejected
// - the fragment (#...) and the query string (?...) are dropped
// - scheme and host are lowercased and default ports removed (the url crate
//   does this while parsing)
// - trailing slashes are kept: "/a" and "/a/" resolve relative links
//   differently, so they are not assumed to be the same page
//
// Scope: same host and port as the seed, path under the seed's directory
// (or an extra allowed prefix), and not a downloadable archive or PDF.
// =============================================================================

use url::Url;

// Paths ending in these are downloads, not documentation pages
const SKIPPED_EXTENSIONS: &[&str] = &[".pdf", ".zip", ".tar", ".gz", ".tgz"];

/// Why a raw link was not turned into a crawlable URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// The href could not be parsed or joined onto the base URL
    Malformed,
    /// The href points at something other than http/https
    UnsupportedScheme,
}

// Resolves a (possibly relative) href against the page it was found on
// and returns its canonical form.
pub fn normalize(raw: &str, base: &Url) -> Result<Url, Rejection> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(Rejection::Malformed);
    }

    // A bare "#section" link points back at the page itself
    if raw.starts_with('#') {
        return Err(Rejection::Malformed);
    }

    let mut url = base.join(raw).map_err(|_| Rejection::Malformed)?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(Rejection::UnsupportedScheme);
    }
    if url.host_str().is_none() {
        return Err(Rejection::Malformed);
    }

    url.set_fragment(None);
    url.set_query(None);
    // Credentials never identify a different page
    let _ = url.set_username("");
    let _ = url.set_password(None);

    Ok(url)
}

// Parses a seed URL given on the command line into canonical form.
pub fn normalize_seed(raw: &str) -> Result<Url, String> {
    let parsed = Url::parse(raw.trim()).map_err(|e| e.to_string())?;
    normalize(parsed.as_str(), &parsed).map_err(|rejection| match rejection {
        Rejection::UnsupportedScheme => format!("scheme '{}' is not http or https", parsed.scheme()),
        Rejection::Malformed => "URL has no host".to_string(),
    })
}

/// The host/path admission policy derived from the seed URL
#[derive(Debug, Clone)]
pub struct Scope {
    host: String,
    port: Option<u16>,
    prefixes: Vec<String>,
}

impl Scope {
    // Builds the scope for a seed. The seed's own directory is always
    // allowed; `extra_prefixes` widen it (e.g. "/en-us/iaas/").
    pub fn from_seed(seed: &Url, extra_prefixes: &[String]) -> Self {
        let host = seed.host_str().unwrap_or_default().to_ascii_lowercase();

        let mut prefixes = vec![directory_of(seed.path())];
        for prefix in extra_prefixes {
            if !prefixes.contains(prefix) {
                prefixes.push(prefix.clone());
            }
        }

        Self {
            host,
            port: seed.port_or_known_default(),
            prefixes,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }

    /// True when the URL may become a crawl task
    pub fn contains(&self, url: &Url) -> bool {
        let same_host = url
            .host_str()
            .map(|host| host.eq_ignore_ascii_case(&self.host))
            .unwrap_or(false);
        if !same_host || url.port_or_known_default() != self.port {
            return false;
        }

        let path = url.path();
        if !self.prefixes.iter().any(|prefix| path.starts_with(prefix.as_str())) {
            return false;
        }

        let lower = path.to_ascii_lowercase();
        !SKIPPED_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
    }
}

// "/en-us/iaas/Content/services.htm" -> "/en-us/iaas/Content/"
// "/docs/a/" -> "/docs/a/"
fn directory_of(path: &str) -> String {
    match path.rfind('/') {
        Some(idx) => path[..=idx].to_string(),
        None => "/".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://docs.example.com/a/page.htm").unwrap()
    }

    #[test]
    fn test_resolve_relative_link() {
        let url = normalize("child.htm", &base()).unwrap();
        assert_eq!(url.as_str(), "https://docs.example.com/a/child.htm");

        let url = normalize("../b/other.htm", &base()).unwrap();
        assert_eq!(url.as_str(), "https://docs.example.com/b/other.htm");
    }

    #[test]
    fn test_strips_fragment_and_query() {
        let url = normalize("/a/child.htm?lang=en#install", &base()).unwrap();
        assert_eq!(url.as_str(), "https://docs.example.com/a/child.htm");
    }

    #[test]
    fn test_host_case_and_default_port_collapse() {
        let a = normalize("HTTPS://Docs.Example.COM:443/a/x.htm", &base()).unwrap();
        let b = normalize("/a/x.htm", &base()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_keeps_trailing_slash() {
        let url = normalize("/a/section/", &base()).unwrap();
        assert_eq!(url.path(), "/a/section/");
    }

    #[test]
    fn test_skip_anchor_and_special_schemes() {
        assert_eq!(normalize("#top", &base()), Err(Rejection::Malformed));
        assert_eq!(normalize("", &base()), Err(Rejection::Malformed));
        assert_eq!(
            normalize("mailto:docs@example.com", &base()),
            Err(Rejection::UnsupportedScheme)
        );
        assert_eq!(
            normalize("javascript:void(0)", &base()),
            Err(Rejection::UnsupportedScheme)
        );
    }

    #[test]
    fn test_seed_validation() {
        assert!(normalize_seed("https://docs.example.com/a/").is_ok());
        assert!(normalize_seed("not a url").is_err());
        assert!(normalize_seed("ftp://docs.example.com/a/").is_err());
    }

    #[test]
    fn test_scope_rejects_other_host() {
        let seed = Url::parse("https://docs.example.com/a/").unwrap();
        let scope = Scope::from_seed(&seed, &[]);

        assert!(scope.contains(&Url::parse("https://docs.example.com/a/x").unwrap()));
        assert!(!scope.contains(&Url::parse("https://other.example.com/x").unwrap()));
        assert!(!scope.contains(&Url::parse("https://other.example.com/a/x").unwrap()));
        assert!(!scope.contains(&Url::parse("https://docs.example.com:8443/a/x").unwrap()));
    }

    #[test]
    fn test_scope_path_prefix() {
        let seed = Url::parse("https://docs.oracle.com/en-us/iaas/Content/services.htm").unwrap();
        let scope = Scope::from_seed(&seed, &[]);
        assert_eq!(scope.prefixes(), ["/en-us/iaas/Content/".to_string()]);

        let inside = Url::parse("https://docs.oracle.com/en-us/iaas/Content/Compute/home.htm").unwrap();
        let outside = Url::parse("https://docs.oracle.com/en-us/iaas/api/").unwrap();
        assert!(scope.contains(&inside));
        assert!(!scope.contains(&outside));

        let widened = Scope::from_seed(&seed, &["/en-us/iaas/".to_string()]);
        assert!(widened.contains(&outside));
    }

    #[test]
    fn test_scope_skips_downloads() {
        let seed = Url::parse("https://docs.example.com/a/").unwrap();
        let scope = Scope::from_seed(&seed, &[]);
        assert!(!scope.contains(&Url::parse("https://docs.example.com/a/guide.PDF").unwrap()));
        assert!(!scope.contains(&Url::parse("https://docs.example.com/a/sdk.tar.gz").unwrap()));
    }
}
