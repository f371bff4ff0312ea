//! Cookie session extraction.

/// Name of the cookie carrying the identity token.
pub const TOKEN_COOKIE: &str = "token";

/// Find the value of cookie `name` in a raw `Cookie` header.
///
/// Returns `None` for a missing header, a missing key or an empty value.
/// Names match exactly, so `xtoken=...` is not `token`.
pub fn extract_cookie<'a>(raw_header: Option<&'a str>, name: &str) -> Option<&'a str> {
    raw_header?
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, value)| value.trim().trim_matches('"'))
        .filter(|value| !value.is_empty())
}

/// Find the identity token in a raw `Cookie` header.
pub fn extract_token(raw_header: Option<&str>) -> Option<&str> {
    extract_cookie(raw_header, TOKEN_COOKIE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_token_among_cookies() {
        assert_eq!(extract_token(Some("token=abc123; other=x")), Some("abc123"));
        assert_eq!(extract_token(Some("other=x; token=abc123")), Some("abc123"));
    }

    #[test]
    fn absent_when_key_missing() {
        assert_eq!(extract_token(Some("foo=bar; baz=qux")), None);
        assert_eq!(extract_cookie(Some("foo=bar; baz=qux"), "baz"), Some("qux"));
    }

    #[test]
    fn absent_when_header_missing_or_empty() {
        assert_eq!(extract_token(None), None);
        assert_eq!(extract_token(Some("")), None);
        assert_eq!(extract_token(Some(";;")), None);
    }

    #[test]
    fn tolerates_whitespace_around_separators() {
        assert_eq!(extract_token(Some("a=1 ;  token=t0k ; b=2")), Some("t0k"));
        assert_eq!(extract_token(Some("a=1;token=t0k")), Some("t0k"));
    }

    #[test]
    fn does_not_match_suffix_names() {
        assert_eq!(extract_token(Some("xtoken=bad; csrftoken=bad")), None);
        assert_eq!(extract_token(Some("xtoken=bad; token=good")), Some("good"));
    }

    #[test]
    fn empty_value_is_absent() {
        assert_eq!(extract_token(Some("token=; other=x")), None);
    }

    #[test]
    fn value_may_contain_equals_and_dots() {
        let jwt = "eyJ.eyJ.sig==";
        let header = format!("theme=dark; token={jwt}");
        assert_eq!(extract_token(Some(&header)), Some(jwt));
    }
}
