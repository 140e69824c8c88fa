use serde_json::{json, Value};
use tracing::{debug, trace};

use super::Extractor;
use crate::common::{
    extractor_error::{ExtractorError, ExtractorResult},
    json::{required, required_str, str_or_empty},
    media_descriptor::{MediaAuthor, MediaDescriptor},
    platform::Platform,
    request::{default_headers, fetch_json, Client},
    url::query_value,
};

#[derive(Debug, Default, Clone, Copy)]
pub struct ZuiYou;

#[async_trait::async_trait]
impl Extractor for ZuiYou {
    fn platform(&self) -> Platform {
        Platform::ZuiYou
    }

    fn description(&self) -> &'static str {
        "Zuiyou posts"
    }

    async fn parse_share_url(&self, share_url: &str) -> ExtractorResult<MediaDescriptor> {
        let post_id = query_value(share_url, "pid")?;
        debug!(?post_id, "Got zuiyou post id from share url");

        self.parse_video_id(&post_id).await
    }

    async fn parse_video_id(&self, video_id: &str) -> ExtractorResult<MediaDescriptor> {
        let pid = video_id.parse::<u64>().map_err(|_| {
            ExtractorError::invalid_argument(format!("post id {video_id:?} is not numeric"))
        })?;

        let resp = fetch_json::<Value>(
            Client::base()?
                .post("https://share.xiaochuankeji.cn/planck/share/post/detail")
                .headers(default_headers())
                .json(&json!({ "h_av": "5.2.13.011", "pid": pid })),
            "zuiyou post detail",
        )
        .await?;
        trace!(?resp, "Got zuiyou post detail");

        descriptor_from_response(&resp)
    }
}

fn descriptor_from_response(resp: &Value) -> ExtractorResult<MediaDescriptor> {
    let post = required(resp, "/data/post")?;

    let video_key = required_str(post, "/imgs/0/id")?;
    let video = required(post, &format!("/videos/{video_key}"))?;

    Ok(MediaDescriptor::new(
        required_str(video, "/url")?,
        str_or_empty(video, "/cover_urls/0"),
    )
    .with_title(str_or_empty(post, "/content"))
    .with_author(MediaAuthor::new(
        str_or_empty(post, "/member/id"),
        str_or_empty(post, "/member/name"),
        str_or_empty(post, "/member/avatar_urls/origin/urls/0"),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn non_numeric_pid_is_rejected_before_fetching() {
        let err = ZuiYou.parse_video_id("abc").await.expect_err("not numeric");

        assert!(matches!(err, ExtractorError::InvalidArgument(_)));
    }

    #[test]
    fn video_is_keyed_by_first_image() {
        let resp = json!({ "data": { "post": {
            "content": "ha",
            "imgs": [{ "id": 1416 }],
            "videos": { "1416": { "url": "https://tbvideo.ixiaochuan.cn/a.mp4", "cover_urls": ["https://c.jpg"] } },
            "member": { "id": 3071, "name": "joker", "avatar_urls": { "origin": { "urls": ["https://a.jpg"] } } }
        }}});

        let descriptor = descriptor_from_response(&resp).expect("valid");

        assert_eq!(descriptor.video_url, "https://tbvideo.ixiaochuan.cn/a.mp4");
        assert_eq!(descriptor.cover_url, "https://c.jpg");
        assert_eq!(descriptor.author, MediaAuthor::new("3071", "joker", "https://a.jpg"));
    }

    #[test]
    fn same_payload_gives_same_descriptor() {
        let resp = json!({ "data": { "post": {
            "imgs": [{ "id": "9" }],
            "videos": { "9": { "url": "https://v.mp4" } }
        }}});

        assert_eq!(
            descriptor_from_response(&resp).expect("valid"),
            descriptor_from_response(&resp).expect("valid")
        );
    }
}
