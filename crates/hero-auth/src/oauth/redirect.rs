//! Redirect URI validation.
//!
//! A candidate redirect target is accepted when it has the scheme and host
//! of a registered URI and its path is either identical or a subpath that
//! does not climb out of the registered path with `..`.
//!
//! Paths are compared as written, and the traversal rule looks at each
//! segment the way a URL parser will see it: `%2e` counts as `.` and `\`
//! as a separator. The normalized path of an accepted target must also stay
//! under the normalized registered path. Hosts match with the port included,
//! an omitted port being the scheme default.

use url::Url;

/// Why a redirect target was rejected.
#[derive(Debug, thiserror::Error)]
pub enum RedirectError {
    #[error("urls can not be blank")]
    BlankUrl,

    #[error("unparsable url {url}: {source}")]
    Unparsable {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("url must not include fragment")]
    FragmentNotAllowed,

    #[error("scheme mismatch: {registered} / {candidate}")]
    SchemeMismatch { registered: String, candidate: String },

    #[error("host mismatch: {registered} / {candidate}")]
    HostMismatch { registered: String, candidate: String },

    #[error("path is not a subpath: {registered} / {candidate}")]
    NotSubpath { registered: String, candidate: String },

    #[error("subpath cannot contain path traversal: {registered} / {candidate}")]
    PathTraversal { registered: String, candidate: String },

    #[error("url does not match any registered uri: {registered} / {candidate}")]
    NoMatch { registered: String, candidate: String },
}

/// Validates `candidate` against a single registered URI.
///
/// # Errors
///
/// Returns the first rule the candidate violates.
pub fn validate_uri(registered: &str, candidate: &str) -> Result<(), RedirectError> {
    if registered.is_empty() || candidate.is_empty() {
        return Err(RedirectError::BlankUrl);
    }

    let base = parse(registered)?;
    let target = parse(candidate)?;

    if has_fragment(&base) || has_fragment(&target) {
        return Err(RedirectError::FragmentNotAllowed);
    }
    if base.scheme() != target.scheme() {
        return Err(RedirectError::SchemeMismatch {
            registered: registered.to_string(),
            candidate: candidate.to_string(),
        });
    }
    if base.host_str() != target.host_str()
        || base.port_or_known_default() != target.port_or_known_default()
    {
        return Err(RedirectError::HostMismatch {
            registered: registered.to_string(),
            candidate: candidate.to_string(),
        });
    }

    let base_path = raw_path(registered);
    let target_path = raw_path(candidate);
    if base_path == target_path {
        return Ok(());
    }

    let prefix = format!("{}/", base_path.trim_end_matches('/'));
    let Some(rest) = target_path.strip_prefix(prefix.as_str()) else {
        return Err(RedirectError::NotSubpath {
            registered: registered.to_string(),
            candidate: candidate.to_string(),
        });
    };

    if rest.split(['/', '\\']).any(is_parent_segment) || !stays_under(&base, &target) {
        return Err(RedirectError::PathTraversal {
            registered: registered.to_string(),
            candidate: candidate.to_string(),
        });
    }
    Ok(())
}

/// Validates `candidate` against a `separator`-joined list of registered
/// URIs, succeeding on the first member that accepts it.
///
/// # Errors
///
/// Returns `RedirectError::NoMatch` if no member accepts the candidate.
pub fn validate_uri_list(registered: &str, candidate: &str, separator: &str) -> Result<(), RedirectError> {
    let matched = split_uris(registered, separator).any(|uri| validate_uri(uri, candidate).is_ok());
    if matched {
        Ok(())
    } else {
        Err(RedirectError::NoMatch {
            registered: registered.to_string(),
            candidate: candidate.to_string(),
        })
    }
}

/// First member of a `separator`-joined URI list.
pub fn first_uri<'a>(registered: &'a str, separator: &str) -> &'a str {
    if separator.is_empty() {
        registered
    } else {
        registered.split(separator).next().unwrap_or(registered)
    }
}

/// Returns `true` if `registered` holds exactly one URI.
pub fn is_single_uri(registered: &str, separator: &str) -> bool {
    first_uri(registered, separator) == registered
}

/// Checks that every member of a redirect URI list about to be registered
/// is an absolute URI without a fragment.
///
/// # Errors
///
/// Returns the rule the first offending member violates.
pub fn validate_registration(registered: &str, separator: &str) -> Result<(), RedirectError> {
    split_uris(registered, separator)
        .map(str::trim)
        .try_for_each(|uri| validate_uri(uri, uri))
}

fn split_uris<'a>(registered: &'a str, separator: &'a str) -> Box<dyn Iterator<Item = &'a str> + 'a> {
    if separator.is_empty() {
        Box::new(std::iter::once(registered))
    } else {
        Box::new(registered.split(separator))
    }
}

fn parse(uri: &str) -> Result<Url, RedirectError> {
    Url::parse(uri).map_err(|source| RedirectError::Unparsable {
        url: uri.to_string(),
        source,
    })
}

fn has_fragment(url: &Url) -> bool {
    url.fragment().is_some_and(|f| !f.is_empty())
}

/// `..` in any of its percent-encoded spellings.
fn is_parent_segment(segment: &str) -> bool {
    segment.to_ascii_lowercase().replace("%2e", ".") == ".."
}

/// Normalized target path equals or lies below the normalized base path.
fn stays_under(base: &Url, target: &Url) -> bool {
    let base_path = base.path();
    let target_path = target.path();
    target_path == base_path
        || target_path.starts_with(&format!("{}/", base_path.trim_end_matches('/')))
}

/// Path component as written, without query or fragment.
fn raw_path(uri: &str) -> &str {
    let end = uri.find(['?', '#']).unwrap_or(uri.len());
    let uri = &uri[..end];
    match uri.find("://") {
        Some(i) => {
            let after_scheme = &uri[i + 3..];
            after_scheme.find('/').map_or("", |j| &after_scheme[j..])
        }
        None => uri.split_once(':').map_or(uri, |(_, rest)| rest),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINK: &str = "http://www.example.com";

    #[test]
    fn test_path_rules() {
        let cases = [
            ("exact match", "/hero", "/hero", true),
            ("trailing slash", "/hero", "/hero/", true),
            ("exact match with trailing slash", "/hero/", "/hero/", true),
            ("subpath", "/hero", "/hero/sub/path", true),
            ("subpath with trailing slash", "/hero/", "/hero/sub/path", true),
            ("subpath with traversal like", "/hero", "/hero/.../..sub../...", true),
            ("traversal in base", "/hero/../allow", "/hero/../allow/sub/path", true),
            ("base path mismatch", "/hero", "/heroine", false),
            ("base path mismatch slash", "/hero/", "/hero", false),
            ("traversal", "/hero", "/hero/..", false),
            ("embed traversal", "/hero", "/hero/../sub", false),
            ("not subpath", "/hero", "/hero../sub", false),
            ("encoded traversal", "/hero", "/hero/%2e%2e/evil", false),
            ("mixed encoded traversal", "/hero", "/hero/.%2E/evil", false),
            ("backslash traversal", "/hero", "/hero/..\\evil", false),
        ];

        for (info, base, redirect, valid) in cases {
            let result = validate_uri(&format!("{LINK}{base}"), &format!("{LINK}{redirect}"));
            assert_eq!(result.is_ok(), valid, "{info}: {result:?}");
        }
    }

    #[test]
    fn test_failure_reasons() {
        assert!(matches!(validate_uri("", "http://a.com"), Err(RedirectError::BlankUrl)));
        assert!(matches!(validate_uri("http://a.com", ""), Err(RedirectError::BlankUrl)));
        assert!(matches!(
            validate_uri("http://a.com", "not a url"),
            Err(RedirectError::Unparsable { .. })
        ));
        assert!(matches!(
            validate_uri("http://a.com/cb", "http://a.com/cb#frag"),
            Err(RedirectError::FragmentNotAllowed)
        ));
        assert!(matches!(
            validate_uri("http://a.com/cb", "https://a.com/cb"),
            Err(RedirectError::SchemeMismatch { .. })
        ));
        assert!(matches!(
            validate_uri("http://a.com/cb", "http://b.com/cb"),
            Err(RedirectError::HostMismatch { .. })
        ));
        assert!(matches!(
            validate_uri("http://a.com:8080/cb", "http://a.com/cb"),
            Err(RedirectError::HostMismatch { .. })
        ));
        assert!(matches!(
            validate_uri("http://a.com/hero", "http://a.com/heroine"),
            Err(RedirectError::NotSubpath { .. })
        ));
        assert!(matches!(
            validate_uri("http://a.com/hero", "http://a.com/hero/../x"),
            Err(RedirectError::PathTraversal { .. })
        ));
    }

    #[test]
    fn test_accepted_targets_resolve_under_registered_path() {
        let base = "http://a.com/hero";
        for candidate in [
            "http://a.com/hero/cb",
            "http://a.com/hero/.../x",
            "http://a.com/hero/%2e%2e/evil",
            "http://a.com/hero/.%2E/evil",
            "http://a.com/hero/..\\evil",
            "http://a.com/hero/sub/%2E%2E/%2e%2e/evil",
        ] {
            if validate_uri(base, candidate).is_ok() {
                let path = Url::parse(candidate).unwrap().path().to_string();
                assert!(path.starts_with("/hero"), "{candidate} resolved to {path}");
            }
        }
        assert!(validate_uri(base, "http://a.com/hero/%2e%2e/evil").is_err());
    }

    #[test]
    fn test_default_port_matches_omitted_port() {
        assert!(validate_uri("http://a.com/cb", "http://a.com:80/cb").is_ok());
        assert!(validate_uri("https://a.com:443/cb", "https://a.com/cb").is_ok());
        assert!(matches!(
            validate_uri("http://a.com/cb", "http://a.com:443/cb"),
            Err(RedirectError::HostMismatch { .. })
        ));
    }

    #[test]
    fn test_host_root_accepts_slash() {
        assert!(validate_uri("http://example.com", "http://example.com").is_ok());
        assert!(validate_uri("http://example.com", "http://example.com/").is_ok());
        assert!(validate_uri("http://example.com", "http://example.com/cb?x=1").is_ok());
    }

    #[test]
    fn test_uri_list() {
        let cases = [
            ("http://www.example.com/hero", "http://www.example.com/hero", "", true),
            ("http://www.example.com/hero", "http://www.example.com/app", "", false),
            (
                "http://xxx:14000/hero;http://www.example.com/hero",
                "http://www.example.com/hero",
                ";",
                true,
            ),
            (
                "http://xxx:14000/hero;http://www.example.com/hero",
                "http://www.example.com/app",
                ";",
                false,
            ),
        ];
        for (base, redirect, sep, valid) in cases {
            assert_eq!(
                validate_uri_list(base, redirect, sep).is_ok(),
                valid,
                "{base} / {redirect}"
            );
        }
    }

    #[test]
    fn test_first_uri() {
        assert_eq!(first_uri("http://a.com;http://b.com", ";"), "http://a.com");
        assert_eq!(first_uri("http://a.com;http://b.com", ""), "http://a.com;http://b.com");
        assert!(is_single_uri("http://a.com", ";"));
        assert!(!is_single_uri("http://a.com;http://b.com", ";"));
    }

    #[test]
    fn test_raw_path() {
        assert_eq!(raw_path("http://a.com"), "");
        assert_eq!(raw_path("http://a.com/hero/../x?y=1#z"), "/hero/../x");
        assert_eq!(raw_path("http://a.com?x=/y"), "");
    }

    #[test]
    fn test_validate_registration() {
        assert!(validate_registration("http://a.com/cb", "").is_ok());
        assert!(validate_registration("http://a.com/cb; https://b.com", ";").is_ok());
        assert!(matches!(
            validate_registration("", ""),
            Err(RedirectError::BlankUrl)
        ));
        assert!(matches!(
            validate_registration("/callback", ""),
            Err(RedirectError::Unparsable { .. })
        ));
        assert!(matches!(
            validate_registration("http://a.com;http://b.com/#x", ";"),
            Err(RedirectError::FragmentNotAllowed)
        ));
    }
}
