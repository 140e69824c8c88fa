use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

use super::Extractor;
use crate::common::{
    extractor_error::{ExtractorError, ExtractorResult},
    html::HtmlDocument,
    media_descriptor::{MediaAuthor, MediaDescriptor},
    platform::Platform,
    request::{default_headers, fetch_text, Client},
};

#[derive(Debug, Default, Clone, Copy)]
pub struct LvZhou;

static BACKGROUND_IMAGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"background-image:url\((.*)\)").expect("Invalid regex"));

#[async_trait::async_trait]
impl Extractor for LvZhou {
    fn platform(&self) -> Platform {
        Platform::LvZhou
    }

    fn description(&self) -> &'static str {
        "Oasis (Lvzhou) videos"
    }

    async fn parse_share_url(&self, share_url: &str) -> ExtractorResult<MediaDescriptor> {
        let page = fetch_text(
            Client::base()?.get(share_url).headers(default_headers()),
            "lvzhou share page",
        )
        .await?;
        trace!(len = page.len(), "Got lvzhou share page");

        descriptor_from_page(&page)
    }

    async fn parse_video_id(&self, video_id: &str) -> ExtractorResult<MediaDescriptor> {
        self.parse_share_url(&format!("https://m.oasis.weibo.cn/v1/h5/share?sid={video_id}"))
            .await
    }
}

fn descriptor_from_page(page: &str) -> ExtractorResult<MediaDescriptor> {
    let doc = HtmlDocument::parse(page);

    let video_url = doc
        .attr("video", "src")
        .filter(|x| !x.is_empty())
        .ok_or_else(|| ExtractorError::shape_mismatch("`video[src]` not found in page"))?;

    let cover_url = doc
        .attr("div.video-cover", "style")
        .and_then(|style| {
            BACKGROUND_IMAGE
                .captures(&style)
                .and_then(|x| x.get(1))
                .map(|x| x.as_str().to_string())
        })
        .unwrap_or_default();

    Ok(MediaDescriptor::new(video_url, cover_url)
        .with_title(doc.text("div.status-title").unwrap_or_default())
        .with_author(MediaAuthor::new(
            "",
            doc.text("div.nickname").unwrap_or_default(),
            doc.attr("a.avatar img", "src").unwrap_or_default(),
        )))
}
