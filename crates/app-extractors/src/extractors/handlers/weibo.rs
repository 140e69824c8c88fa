use serde_json::{json, Value};
use tracing::{debug, trace};

use super::Extractor;
use crate::common::{
    extractor_error::{ExtractorError, ExtractorResult},
    json::{required, str_or_empty},
    media_descriptor::{MediaAuthor, MediaDescriptor},
    platform::Platform,
    request::{fetch_json, header, headers_for, Client, HeaderMapExt, OsClass},
    url::{last_path_segment, query_value, with_https_scheme},
};

#[derive(Debug, Default, Clone, Copy)]
pub struct WeiBo;

#[async_trait::async_trait]
impl Extractor for WeiBo {
    fn platform(&self) -> Platform {
        Platform::WeiBo
    }

    fn description(&self) -> &'static str {
        "Weibo videos"
    }

    async fn parse_share_url(&self, share_url: &str) -> ExtractorResult<MediaDescriptor> {
        let video_id = video_id_from_url(share_url)?;
        debug!(?video_id, "Got weibo video id from share url");

        self.parse_video_id(&video_id).await
    }

    async fn parse_video_id(&self, video_id: &str) -> ExtractorResult<MediaDescriptor> {
        let headers = headers_for(OsClass::Ios)
            .with_header(
                header::REFERER,
                &format!("https://h5.video.weibo.com/show/{video_id}"),
            )
            .with_header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");

        let resp = fetch_json::<Value>(
            Client::base()?
                .post("https://h5.video.weibo.com/api/component")
                .query(&[("page", format!("/show/{video_id}"))])
                .headers(headers)
                .body(play_info_body(video_id)),
            "weibo play info",
        )
        .await?;
        trace!(?resp, "Got weibo play info");

        descriptor_from_response(&resp)
    }
}

fn video_id_from_url(share_url: &str) -> ExtractorResult<String> {
    if share_url.contains("show?fid=") {
        return Ok(query_value(share_url, "fid")?);
    }

    last_path_segment(share_url)
        .map(ToString::to_string)
        .ok_or_else(|| ExtractorError::invalid_argument("no video id in weibo share url"))
}

fn play_info_body(video_id: &str) -> String {
    let data = json!({ "Component_Play_Playinfo": { "oid": video_id } });

    format!("data={data}")
}

fn descriptor_from_response(resp: &Value) -> ExtractorResult<MediaDescriptor> {
    let info = required(resp, "/data/Component_Play_Playinfo")?;

    // `urls` is ordered from the highest bitrate down, `stream_url` is the lowest
    let video_url = info
        .get("urls")
        .and_then(Value::as_object)
        .and_then(|x| x.values().find_map(Value::as_str))
        .filter(|x| !x.is_empty())
        .map_or_else(|| str_or_empty(info, "/stream_url"), ToString::to_string);

    if video_url.is_empty() {
        return Err(ExtractorError::shape_mismatch("weibo play info has no video address"));
    }

    Ok(MediaDescriptor::new(
        with_https_scheme(&video_url),
        with_https_scheme(&str_or_empty(info, "/cover_image")),
    )
    .with_title(str_or_empty(info, "/title"))
    .with_author(MediaAuthor::new(
        str_or_empty(info, "/user/id"),
        str_or_empty(info, "/author"),
        with_https_scheme(&str_or_empty(info, "/avatar")),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn video_id_from_fid_or_path() {
        assert_eq!(
            video_id_from_url("https://h5.video.weibo.com/show?fid=1034:4872").expect("has id"),
            "1034:4872"
        );
        assert_eq!(
            video_id_from_url("https://video.weibo.com/show/1034:4873/").expect("has id"),
            "1034:4873"
        );
    }

    #[test]
    fn body_embeds_the_oid() {
        assert_eq!(
            play_info_body("1034:4872"),
            r#"data={"Component_Play_Playinfo":{"oid":"1034:4872"}}"#
        );
    }

    #[test]
    fn highest_bitrate_url_wins() {
        let resp = json!({ "data": { "Component_Play_Playinfo": {
            "stream_url": "//f.video.weibocdn.com/low.mp4",
            "urls": { "高清 1080P": "//f.video.weibocdn.com/1080.mp4", "标清 480P": "//f.video.weibocdn.com/480.mp4" },
            "cover_image": "//wx1.sinaimg.cn/c.jpg",
            "title": "clip",
            "author": "poster",
            "avatar": "//tvax1.sinaimg.cn/a.jpg",
            "user": { "id": 1642591402 }
        }}});

        let descriptor = descriptor_from_response(&resp).expect("valid");

        assert_eq!(descriptor.video_url, "https://f.video.weibocdn.com/1080.mp4");
        assert_eq!(descriptor.cover_url, "https://wx1.sinaimg.cn/c.jpg");
        assert_eq!(
            descriptor.author,
            MediaAuthor::new("1642591402", "poster", "https://tvax1.sinaimg.cn/a.jpg")
        );
    }

    #[test]
    fn stream_url_is_the_fallback() {
        let resp = json!({ "data": { "Component_Play_Playinfo": {
            "stream_url": "https://f.video.weibocdn.com/low.mp4",
            "urls": {}
        }}});

        let descriptor = descriptor_from_response(&resp).expect("valid");

        assert_eq!(descriptor.video_url, "https://f.video.weibocdn.com/low.mp4");
    }
}
