use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::{debug, trace, warn};

use super::Extractor;
use crate::common::{
    extractor_error::{ExtractorError, ExtractorResult},
    html::capture,
    json::{parse_json, required, str_or_empty},
    media_descriptor::{ImageItem, MediaAuthor, MediaDescriptor},
    platform::Platform,
    request::{capture_redirect, default_headers, fetch_text, Client},
    url::{last_path_segment, query_value},
};

#[derive(Debug, Default, Clone, Copy)]
pub struct DouYin;

const ROUTER_DATA: &str = "window._ROUTER_DATA";

static ROUTER_DATA_JSON: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)window\._ROUTER_DATA\s*=\s*(.*?)</script>").expect("Invalid regex")
});

#[async_trait::async_trait]
impl Extractor for DouYin {
    fn platform(&self) -> Platform {
        Platform::DouYin
    }

    fn description(&self) -> &'static str {
        "Douyin videos and image posts"
    }

    async fn parse_share_url(&self, share_url: &str) -> ExtractorResult<MediaDescriptor> {
        let video_id = if share_url.contains("www.douyin.com/video/") {
            id_from_url(share_url)?
        } else {
            let redirect =
                capture_redirect(share_url, default_headers(), "douyin share link").await?;
            debug!(location = ?redirect.location, "Got douyin share link redirect");

            id_from_url(&redirect.location)?
        };
        debug!(?video_id, "Got douyin video id from share url");

        self.parse_video_id(&video_id).await
    }

    async fn parse_video_id(&self, video_id: &str) -> ExtractorResult<MediaDescriptor> {
        let page = fetch_text(
            Client::base()?
                .get(format!("https://www.iesdouyin.com/share/video/{video_id}/"))
                .headers(default_headers()),
            "douyin share page",
        )
        .await?;

        let router_data = parse_json(capture(&ROUTER_DATA_JSON, &page, ROUTER_DATA)?, ROUTER_DATA)?;
        trace!(?router_data, "Got douyin router data");

        let descriptor = descriptor_from_router_data(&router_data)?;
        if descriptor.is_gallery() {
            return Ok(descriptor);
        }

        let video_url = final_video_url(&descriptor.video_url).await?;

        Ok(MediaDescriptor {
            video_url,
            ..descriptor
        })
    }
}

/// The play address redirects to the actual mp4 on a CDN.
async fn final_video_url(play_url: &str) -> ExtractorResult<String> {
    match capture_redirect(play_url, default_headers(), "douyin play address").await {
        Ok(redirect) => Ok(redirect.location),
        Err(ExtractorError::UpstreamShapeMismatch(reason)) => {
            warn!(?reason, "Douyin play address did not redirect, using it as is");
            Ok(play_url.to_string())
        }
        Err(e) => Err(e),
    }
}

/// Video id from either `modal_id=...` or the last path segment.
fn id_from_url(url: &str) -> ExtractorResult<String> {
    if let Ok(id) = query_value(url, "modal_id") {
        return Ok(id);
    }

    last_path_segment(url)
        .map(ToString::to_string)
        .ok_or_else(|| ExtractorError::invalid_argument(format!("no douyin video id in {url:?}")))
}

fn descriptor_from_router_data(router_data: &Value) -> ExtractorResult<MediaDescriptor> {
    let loader_data = required(router_data, "/loaderData")?;

    let page = ["video_(id)/page", "note_(id)/page"]
        .iter()
        .find_map(|key| loader_data.get(*key))
        .ok_or_else(|| {
            ExtractorError::shape_mismatch("neither a video nor a note page in douyin loader data")
        })?;

    let Some(item) = page.pointer("/videoInfoRes/item_list/0") else {
        let reason = page
            .pointer("/videoInfoRes/filter_list/0/detail_msg")
            .and_then(Value::as_str)
            .filter(|x| !x.is_empty())
            .unwrap_or("failed to parse video info from HTML");

        return Err(ExtractorError::reported(reason));
    };

    let images = item
        .get("images")
        .and_then(Value::as_array)
        .map(|x| x.iter().filter_map(image_from_value).collect::<Vec<_>>())
        .unwrap_or_default();

    let video_url = str_or_empty(item, "/video/play_addr/url_list/0").replace("playwm", "play");

    let mut uid = str_or_empty(item, "/author/sec_uid");
    if uid.is_empty() {
        uid = str_or_empty(item, "/author/unique_id");
    }

    MediaDescriptor::new(video_url, str_or_empty(item, "/video/cover/url_list/0"))
        .with_title(str_or_empty(item, "/desc"))
        .with_author(MediaAuthor::new(
            uid,
            str_or_empty(item, "/author/nickname"),
            str_or_empty(item, "/author/avatar_thumb/url_list/0"),
        ))
        .with_images(images)
        .require_media("/video/play_addr/url_list/0")
}

fn image_from_value(image: &Value) -> Option<ImageItem> {
    let urls = image.get("url_list")?.as_array()?;

    let url = urls
        .iter()
        .filter_map(Value::as_str)
        .find(|x| !x.contains(".webp"))
        .or_else(|| urls.first().and_then(Value::as_str))?;

    Some(
        ImageItem::new(url)
            .with_live_photo(str_or_empty(image, "/video/play_addr/url_list/0")),
    )
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn router_data(page_key: &str, item: Value) -> Value {
        json!({ "loaderData": { page_key: { "videoInfoRes": { "item_list": [item] } } } })
    }

    #[test]
    fn id_prefers_modal_id() {
        assert_eq!(
            id_from_url("https://www.douyin.com/discover?modal_id=7301").expect("has id"),
            "7301"
        );
        assert_eq!(
            id_from_url("https://www.iesdouyin.com/share/video/7302/?region=CN").expect("has id"),
            "7302"
        );
    }

    #[test]
    fn missing_router_data_names_the_anchor() {
        let err = capture(&ROUTER_DATA_JSON, "<html><body></body></html>", ROUTER_DATA)
            .expect_err("no router data");

        assert!(matches!(err, ExtractorError::UpstreamShapeMismatch(_)));
        assert!(err.to_string().contains("window._ROUTER_DATA"));
    }

    #[test]
    fn router_data_is_found_in_page() {
        let page = r#"<script>window._ROUTER_DATA = {"loaderData":{}}</script>"#;

        let text = capture(&ROUTER_DATA_JSON, page, ROUTER_DATA).expect("present");

        assert_eq!(text, r#"{"loaderData":{}}"#);
    }

    #[test]
    fn video_page_is_mapped() {
        let data = router_data(
            "video_(id)/page",
            json!({
                "desc": "sunset",
                "video": {
                    "play_addr": { "url_list": ["https://aweme.snssdk.com/aweme/v1/playwm/?video_id=v1"] },
                    "cover": { "url_list": ["https://p3.douyinpic.com/c.jpeg"] }
                },
                "author": {
                    "sec_uid": "MS4w", "nickname": "sky", "avatar_thumb": { "url_list": ["https://a.jpeg"] }
                }
            }),
        );

        let descriptor = descriptor_from_router_data(&data).expect("valid");

        assert_eq!(
            descriptor.video_url,
            "https://aweme.snssdk.com/aweme/v1/play/?video_id=v1"
        );
        assert_eq!(descriptor.title, "sunset");
        assert_eq!(descriptor.author, MediaAuthor::new("MS4w", "sky", "https://a.jpeg"));
        assert!(descriptor.images.is_empty());
    }

    #[test]
    fn item_without_video_or_images_is_a_shape_mismatch() {
        let data = router_data("video_(id)/page", json!({ "desc": "x" }));

        let err = descriptor_from_router_data(&data).expect_err("no media");

        assert!(matches!(err, ExtractorError::UpstreamShapeMismatch(ref m) if m.contains("/video/play_addr/url_list/0")));
    }

    #[test]
    fn note_page_is_a_gallery_without_video() {
        let data = router_data(
            "note_(id)/page",
            json!({
                "desc": "album",
                "video": { "play_addr": { "url_list": ["https://placeholder.mp3"] } },
                "images": [
                    { "url_list": ["https://p.douyinpic.com/1.webp", "https://p.douyinpic.com/1.jpeg"] },
                    {
                        "url_list": ["https://p.douyinpic.com/2.webp"],
                        "video": { "play_addr": { "url_list": ["https://live.mp4"] } }
                    }
                ],
                "author": { "unique_id": "u1" }
            }),
        );

        let descriptor = descriptor_from_router_data(&data).expect("valid");

        assert!(descriptor.video_url.is_empty());
        assert_eq!(
            descriptor.images,
            vec![
                ImageItem::new("https://p.douyinpic.com/1.jpeg"),
                ImageItem::new("https://p.douyinpic.com/2.webp").with_live_photo("https://live.mp4"),
            ]
        );
        assert_eq!(descriptor.author.uid, "u1");
    }

    #[test]
    fn empty_item_list_surfaces_filter_reason() {
        let data = json!({ "loaderData": { "video_(id)/page": { "videoInfoRes": {
            "item_list": [],
            "filter_list": [{ "detail_msg": "因作品权限或已被删除，无法观看" }]
        }}}});

        let err = descriptor_from_router_data(&data).expect_err("nothing to show");

        assert_eq!(err.to_string(), "因作品权限或已被删除，无法观看");
    }

    #[test]
    fn empty_item_list_without_reason_is_generic() {
        let data = json!({ "loaderData": { "video_(id)/page": { "videoInfoRes": { "item_list": [] } } } });

        let err = descriptor_from_router_data(&data).expect_err("nothing to show");

        assert_eq!(err.to_string(), "failed to parse video info from HTML");
    }

    #[test]
    fn unknown_page_kind_is_a_shape_mismatch() {
        let err = descriptor_from_router_data(&json!({ "loaderData": { "live_(id)/page": {} } }))
            .expect_err("unknown page");

        assert!(matches!(err, ExtractorError::UpstreamShapeMismatch(_)));
    }
}
