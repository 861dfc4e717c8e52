//! Query-string encoding.

use std::collections::BTreeMap;

/// Query parameters, kept sorted so the rendered string is stable.
pub type QueryParams = BTreeMap<String, String>;

/// Renders `params` as `k1=v1&k2=v2`.
///
/// Keys and values are percent-encoded; only RFC 3986 unreserved characters
/// (`A-Z a-z 0-9 - _ . ~`) are left as is. Spaces become `%20`.
pub fn encode_query(params: &QueryParams) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Appends `params` to `url`. An empty map adds nothing, not even `?`.
pub fn with_query(url: &str, params: &QueryParams) -> String {
    if params.is_empty() {
        url.to_string()
    } else {
        format!("{url}?{}", encode_query(params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> QueryParams {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_sorted_and_stable() {
        let query = params(&[("operation", "update"), ("minorversion", "75")]);
        assert_eq!(encode_query(&query), "minorversion=75&operation=update");
    }

    #[test]
    fn test_reserved_characters_encoded() {
        let query = params(&[("query", "select * from Customer where DisplayName = 'A&B'")]);
        assert_eq!(
            encode_query(&query),
            "query=select%20%2A%20from%20Customer%20where%20DisplayName%20%3D%20%27A%26B%27"
        );
    }

    #[test]
    fn test_empty_has_no_question_mark() {
        assert_eq!(with_query("https://h/batch", &QueryParams::new()), "https://h/batch");
        assert_eq!(
            with_query("https://h/x", &params(&[("state", "a b")])),
            "https://h/x?state=a%20b"
        );
    }
}
