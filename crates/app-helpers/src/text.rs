use once_cell::sync::Lazy;
use regex::Regex;

static SHARE_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"https?://[0-9A-Za-z_.-]+[0-9A-Za-z_/-]*[0-9A-Za-z_.-]*\??[0-9A-Za-z_=&:+%-]*/*")
        .expect("Invalid regex")
});

/// First `http(s)://` link in free-form text, such as the blurb apps put
/// around a share link when copying it.
#[must_use]
pub fn extract_first_url(text: &str) -> Option<&str> {
    SHARE_URL.find(text).map(|x| x.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_is_cut_out_of_share_text() {
        let text = "7.43 复制打开抖音，看看【猫的作品】 https://v.douyin.com/iRNBho6u/ 01/08 pdN:/";

        assert_eq!(extract_first_url(text), Some("https://v.douyin.com/iRNBho6u/"));
    }

    #[test]
    fn link_stops_at_non_ascii_text() {
        let text = "http://xhslink.com/a/Ab1c2D3复制本条信息";

        assert_eq!(extract_first_url(text), Some("http://xhslink.com/a/Ab1c2D3"));
    }

    #[test]
    fn query_is_kept() {
        let text = "look: https://haokan.baidu.com/v?vid=123&tab=recommend now";

        assert_eq!(
            extract_first_url(text),
            Some("https://haokan.baidu.com/v?vid=123&tab=recommend")
        );
    }

    #[test]
    fn text_without_link_has_none() {
        assert_eq!(extract_first_url("no links here"), None);
        assert_eq!(extract_first_url("ftp://example.com/file"), None);
    }
}
