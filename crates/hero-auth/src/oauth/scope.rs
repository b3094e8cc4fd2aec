//! Comma separated scope strings.

/// Splits a scope string into its non-empty tokens.
pub fn split(scope: &str) -> impl Iterator<Item = &str> {
    scope.split(',').map(str::trim).filter(|s| !s.is_empty())
}

/// Returns `true` if at least one requested scope token appears in the
/// original scope.
///
/// This is an overlap test, not a subset test: `("one,two", "one,four")`
/// is accepted.
pub fn extra_scopes(original: &str, requested: &str) -> bool {
    split(requested).any(|want| split(original).any(|have| have == want))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extra_scopes() {
        assert!(extra_scopes("one,two,three", "one"));
        assert!(!extra_scopes("one,two,three", "none"));
        assert!(extra_scopes("one,two,three", "none,two"));
    }

    #[test]
    fn test_empty_scopes_never_overlap() {
        assert!(!extra_scopes("", ""));
        assert!(!extra_scopes("one", ""));
        assert!(!extra_scopes("", "one"));
        assert!(!extra_scopes(",,", ","));
    }

    #[test]
    fn test_split_trims() {
        assert_eq!(split(" user , repo,").collect::<Vec<_>>(), vec!["user", "repo"]);
    }
}
