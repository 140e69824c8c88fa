use thiserror::Error;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryParamError {
    #[error("failed to parse url {0:?}: {1}")]
    InvalidUrl(String, String),
    #[error("query parameter {0:?} is not present in the url")]
    KeyNotFound(String),
    #[error("query parameter {0:?} has an empty value")]
    EmptyValue(String),
}

/// Get the first value of `key` from the query string of `url`.
pub fn query_value(url: &str, key: &str) -> Result<String, QueryParamError> {
    let parsed =
        Url::parse(url).map_err(|e| QueryParamError::InvalidUrl(url.to_string(), e.to_string()))?;

    let value = parsed
        .query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
        .ok_or_else(|| QueryParamError::KeyNotFound(key.to_string()))?;

    if value.is_empty() {
        return Err(QueryParamError::EmptyValue(key.to_string()));
    }

    Ok(value)
}

/// Last non-empty path segment of a url, ignoring the query string and any
/// trailing slashes.
#[must_use]
pub fn last_path_segment(url: &str) -> Option<&str> {
    let without_query = url.split(['?', '#']).next().unwrap_or_default();

    without_query
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|x| !x.is_empty() && !x.ends_with(':'))
}

/// Turn a protocol-relative url (`//host/path`) into an https one.
#[must_use]
pub fn with_https_scheme(url: &str) -> String {
    if url.starts_with("//") {
        format!("https:{url}")
    } else {
        url.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_value_is_found() {
        assert_eq!(
            query_value("https://h5.example.com/v?vid=abc123", "vid"),
            Ok("abc123".to_string())
        );
    }

    #[test]
    fn missing_query_key_is_reported() {
        assert_eq!(
            query_value("https://h5.example.com/v?vid=abc123", "missing"),
            Err(QueryParamError::KeyNotFound("missing".to_string()))
        );
    }

    #[test]
    fn empty_query_value_is_reported() {
        assert_eq!(
            query_value("https://x.com/v?vid=", "vid"),
            Err(QueryParamError::EmptyValue("vid".to_string()))
        );
    }

    #[test]
    fn first_value_wins_for_repeated_keys() {
        assert_eq!(
            query_value("https://x.com/v?id=1&id=2", "id"),
            Ok("1".to_string())
        );
    }

    #[test]
    fn query_value_is_percent_decoded() {
        assert_eq!(
            query_value("https://x.com/v?s=a%2Bb", "s"),
            Ok("a+b".to_string())
        );
    }

    #[test]
    fn unparsable_url_is_reported() {
        assert!(matches!(
            query_value("not a url", "vid"),
            Err(QueryParamError::InvalidUrl(..))
        ));
    }

    #[test]
    fn last_path_segment_skips_query_and_trailing_slash() {
        assert_eq!(
            last_path_segment("https://www.iesdouyin.com/share/video/7301/?region=CN"),
            Some("7301")
        );
        assert_eq!(
            last_path_segment("https://h5.pipix.com/item/6871?app_id=1319"),
            Some("6871")
        );
    }

    #[test]
    fn last_path_segment_of_scheme_only_is_none() {
        assert_eq!(last_path_segment("https://"), None);
    }

    #[test]
    fn protocol_relative_urls_get_https() {
        assert_eq!(
            with_https_scheme("//f.video.weibocdn.com/a.mp4"),
            "https://f.video.weibocdn.com/a.mp4"
        );
        assert_eq!(with_https_scheme("http://a/b"), "http://a/b");
    }
}
