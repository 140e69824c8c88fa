use serde_json::Value;
use tracing::{debug, trace};

use super::Extractor;
use crate::common::{
    extractor_error::{ExtractorError, ExtractorResult},
    json::{required_str, str_or_empty},
    media_descriptor::MediaDescriptor,
    platform::Platform,
    request::{fetch_json, header, headers_for, Client, HeaderMapExt, OsClass},
};

#[derive(Debug, Default, Clone, Copy)]
pub struct PiPiGaoXiao;

const FETCH_CONTENT_URL: &str = "https://share.ippzone.com/ppapi/share/fetch_content";

#[async_trait::async_trait]
impl Extractor for PiPiGaoXiao {
    fn platform(&self) -> Platform {
        Platform::PiPiGaoXiao
    }

    fn description(&self) -> &'static str {
        "Pipi Gaoxiao posts"
    }

    async fn parse_share_url(&self, share_url: &str) -> ExtractorResult<MediaDescriptor> {
        let post_id = post_id_from_url(share_url)?;
        debug!(?post_id, "Got pipigaoxiao post id from share url");

        self.parse_video_id(&post_id).await
    }

    async fn parse_video_id(&self, video_id: &str) -> ExtractorResult<MediaDescriptor> {
        let body = fetch_content_body(video_id)?;

        let headers = headers_for(OsClass::Windows)
            .with_header(header::REFERER, FETCH_CONTENT_URL)
            .with_header(header::CONTENT_TYPE, "text/plain;charset=UTF-8");

        let resp = fetch_json::<Value>(
            Client::base()?
                .post(FETCH_CONTENT_URL)
                .headers(headers)
                .body(body),
            "pipigaoxiao post content",
        )
        .await?;
        trace!(?resp, "Got pipigaoxiao post content");

        descriptor_from_response(&resp)
    }
}

fn post_id_from_url(share_url: &str) -> ExtractorResult<String> {
    let url = url::Url::parse(share_url)
        .map_err(|e| ExtractorError::invalid_argument(format!("invalid share url: {e}")))?;

    url.path()
        .strip_prefix("/pp/post/")
        .map(|x| x.trim_end_matches('/'))
        .filter(|x| !x.is_empty())
        .map(ToString::to_string)
        .ok_or_else(|| ExtractorError::invalid_argument("no post id in pipigaoxiao share url"))
}

/// The endpoint wants `pid` as a JSON number, so the id is validated first.
fn fetch_content_body(post_id: &str) -> ExtractorResult<String> {
    let pid = post_id
        .parse::<u64>()
        .map_err(|_| ExtractorError::invalid_argument(format!("post id {post_id:?} is not numeric")))?;

    Ok(format!(r#"{{"pid":{pid},"type":"post","mid":null}}"#))
}

fn descriptor_from_response(resp: &Value) -> ExtractorResult<MediaDescriptor> {
    if let Some(msg) = resp.get("msg") {
        let msg = msg.as_str().map_or_else(|| msg.to_string(), ToString::to_string);
        return Err(ExtractorError::reported(msg));
    }

    let post = resp
        .pointer("/data/post")
        .ok_or_else(|| ExtractorError::shape_mismatch("`/data/post` missing from payload"))?;

    let image_id = required_str(post, "/imgs/0/id")?;
    let video_url = required_str(post, &format!("/videos/{image_id}/url"))?;

    Ok(MediaDescriptor::new(
        video_url,
        format!("https://file.ippzone.com/img/view/id/{image_id}"),
    )
    .with_title(str_or_empty(post, "/content")))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn post_id_comes_from_path() {
        assert_eq!(
            post_id_from_url("https://h5.pipigx.com/pp/post/583847386815?zy_to=applink").expect("has id"),
            "583847386815"
        );
        assert!(post_id_from_url("https://h5.pipigx.com/topic/1").is_err());
    }

    #[test]
    fn body_is_raw_json_with_numeric_pid() {
        assert_eq!(
            fetch_content_body("42").expect("numeric"),
            r#"{"pid":42,"type":"post","mid":null}"#
        );
    }

    #[test]
    fn non_numeric_pid_is_invalid() {
        let err = fetch_content_body("42,\"x\":1").expect_err("not numeric");

        assert!(matches!(err, ExtractorError::InvalidArgument(_)));
    }

    #[test]
    fn msg_is_a_reported_error() {
        let err = descriptor_from_response(&json!({ "msg": "帖子不存在" })).expect_err("has msg");

        assert_eq!(err.to_string(), "帖子不存在");
    }

    #[test]
    fn video_is_keyed_by_first_image() {
        let resp = json!({ "data": { "post": {
            "content": "lol",
            "imgs": [{ "id": 2210 }],
            "videos": { "2210": { "url": "https://video.ippzone.com/zyvd/a.mp4" } }
        }}});

        let descriptor = descriptor_from_response(&resp).expect("valid");

        assert_eq!(descriptor.video_url, "https://video.ippzone.com/zyvd/a.mp4");
        assert_eq!(descriptor.cover_url, "https://file.ippzone.com/img/view/id/2210");
        assert_eq!(descriptor.title, "lol");
    }
}
