use percent_encoding::percent_decode_str;
use serde_json::Value;
use tracing::{debug, trace};

use super::Extractor;
use crate::common::{
    extractor_error::{ExtractorError, ExtractorResult},
    html::element_text_by_id,
    json::{parse_json, required, str_or_empty},
    media_descriptor::{MediaAuthor, MediaDescriptor},
    platform::Platform,
    request::{capture_redirect, default_headers, fetch_text, headers_for, Client, OsClass},
    url::last_path_segment,
};

#[derive(Debug, Default, Clone, Copy)]
pub struct XiGua;

#[async_trait::async_trait]
impl Extractor for XiGua {
    fn platform(&self) -> Platform {
        Platform::XiGua
    }

    fn description(&self) -> &'static str {
        "Xigua videos"
    }

    async fn parse_share_url(&self, share_url: &str) -> ExtractorResult<MediaDescriptor> {
        let redirect =
            capture_redirect(share_url, headers_for(OsClass::Android), "xigua share link").await?;

        let video_id = last_path_segment(&redirect.location).ok_or_else(|| {
            ExtractorError::shape_mismatch("xigua redirect has no video id in its path")
        })?;
        debug!(?video_id, "Got xigua video id from share url");

        self.parse_video_id(video_id).await
    }

    async fn parse_video_id(&self, video_id: &str) -> ExtractorResult<MediaDescriptor> {
        // A trailing slash after the id changes the shape of the page
        let page = fetch_text(
            Client::base()?
                .get(format!("https://m.ixigua.com/douyin/share/video/{video_id}"))
                .query(&[
                    ("aweme_type", "107"),
                    ("schema_type", "1"),
                    ("utm_source", "copy"),
                    ("utm_campaign", "client_share"),
                    ("utm_medium", "android"),
                    ("app", "aweme"),
                ])
                .headers(default_headers()),
            "xigua share page",
        )
        .await?;

        let render_data = render_data_from_page(&page)?;
        trace!(?render_data, "Got xigua render data");

        descriptor_from_render_data(&render_data)
    }
}

fn render_data_from_page(page: &str) -> ExtractorResult<Value> {
    let encoded = element_text_by_id(page, "RENDER_DATA")?;
    let decoded = percent_decode_str(&encoded).decode_utf8().map_err(|e| {
        ExtractorError::shape_mismatch(format!("`RENDER_DATA` is not valid UTF-8: {e}"))
    })?;

    parse_json(&decoded, "RENDER_DATA")
}

fn descriptor_from_render_data(render_data: &Value) -> ExtractorResult<MediaDescriptor> {
    let item = required(render_data, "/app/videoInfoRes/item_list/0")?;

    let video_url = str_or_empty(item, "/video/play_addr/url_list/0").replace("playwm", "play");

    MediaDescriptor::new(video_url, str_or_empty(item, "/video/cover/url_list/0"))
        .with_title(str_or_empty(item, "/desc"))
        .with_author(MediaAuthor::new(
            str_or_empty(item, "/author/unique_id"),
            str_or_empty(item, "/author/nickname"),
            str_or_empty(item, "/author/avatar_thumb/url_list/0"),
        ))
        .require_media("/video/play_addr/url_list/0")
}
