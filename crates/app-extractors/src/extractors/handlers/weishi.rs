use serde_json::Value;
use tracing::{debug, trace};

use super::Extractor;
use crate::common::{
    extractor_error::{ExtractorError, ExtractorResult},
    json::{required, str_or_empty},
    media_descriptor::{MediaAuthor, MediaDescriptor},
    platform::Platform,
    request::{default_headers, fetch_json, Client},
    url::query_value,
};

#[derive(Debug, Default, Clone, Copy)]
pub struct WeiShi;

#[async_trait::async_trait]
impl Extractor for WeiShi {
    fn platform(&self) -> Platform {
        Platform::WeiShi
    }

    fn description(&self) -> &'static str {
        "Weishi feeds"
    }

    async fn parse_share_url(&self, share_url: &str) -> ExtractorResult<MediaDescriptor> {
        let feed_id = query_value(share_url, "id")?;
        debug!(?feed_id, "Got weishi feed id from share url");

        self.parse_video_id(&feed_id).await
    }

    async fn parse_video_id(&self, video_id: &str) -> ExtractorResult<MediaDescriptor> {
        let resp = fetch_json::<Value>(
            Client::base()?
                .get("https://h5.weishi.qq.com/webapp/json/weishi/WSH5GetPlayPage")
                .query(&[("feedid", video_id)])
                .headers(default_headers()),
            "weishi play page",
        )
        .await?;
        trace!(?resp, "Got weishi play page");

        descriptor_from_response(&resp)
    }
}

fn descriptor_from_response(resp: &Value) -> ExtractorResult<MediaDescriptor> {
    if required(resp, "/ret")?.as_i64() != Some(0) {
        return Err(ExtractorError::reported(str_or_empty(resp, "/msg")));
    }

    let errmsg = str_or_empty(resp, "/data/errmsg");
    if !errmsg.is_empty() {
        return Err(ExtractorError::reported(errmsg));
    }

    let feed = required(resp, "/data/feeds/0")?;

    MediaDescriptor::new(
        str_or_empty(feed, "/video_url"),
        str_or_empty(feed, "/images/0/url"),
    )
    .with_title(str_or_empty(feed, "/feed_desc_withat"))
    .with_author(MediaAuthor::new(
        str_or_empty(feed, "/poster/id"),
        str_or_empty(feed, "/poster/nick"),
        str_or_empty(feed, "/poster/avatar"),
    ))
    .require_media("/data/feeds/0/video_url")
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn ret_failure_is_reported() {
        let err = descriptor_from_response(&json!({ "ret": -1, "msg": "bad feed" }))
            .expect_err("ret is set");

        assert_eq!(err.to_string(), "bad feed");
    }

    #[test]
    fn feed_errmsg_is_reported() {
        let err = descriptor_from_response(&json!({ "ret": 0, "data": { "errmsg": "作品已删除" } }))
            .expect_err("errmsg is set");

        assert!(matches!(err, ExtractorError::UpstreamReportedError(ref m) if m == "作品已删除"));
    }

    #[test]
    fn feed_without_video_is_a_shape_mismatch() {
        let err = descriptor_from_response(&json!({ "ret": 0, "data": { "feeds": [{}] } }))
            .expect_err("no video");

        assert!(matches!(err, ExtractorError::UpstreamShapeMismatch(ref m) if m.contains("video_url")));
    }

    #[test]
    fn feed_is_mapped() {
        let resp = json!({ "ret": 0, "data": { "errmsg": "", "feeds": [{
            "video_url": "https://v.weishi.qq.com/a.mp4",
            "images": [{ "url": "https://p.weishi.qq.com/c.jpg" }],
            "feed_desc_withat": "hello",
            "poster": { "id": "1559", "nick": "poster", "avatar": "https://a.jpg" }
        }]}});

        let descriptor = descriptor_from_response(&resp).expect("valid");

        assert_eq!(descriptor.video_url, "https://v.weishi.qq.com/a.mp4");
        assert_eq!(descriptor.author, MediaAuthor::new("1559", "poster", "https://a.jpg"));
    }
}
