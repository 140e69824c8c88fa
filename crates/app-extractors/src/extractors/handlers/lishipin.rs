use std::time::{SystemTime, UNIX_EPOCH};

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
pub struct LiShiPin;

#[async_trait::async_trait]
impl Extractor for LiShiPin {
    fn platform(&self) -> Platform {
        Platform::LiShiPin
    }

    fn description(&self) -> &'static str {
        "Pear Video (Lishipin)"
    }

    async fn parse_share_url(&self, share_url: &str) -> ExtractorResult<MediaDescriptor> {
        let video_id = video_id_from_url(share_url)?;
        debug!(?video_id, "Got lishipin video id from share url");

        self.parse_video_id(&video_id).await
    }

    async fn parse_video_id(&self, video_id: &str) -> ExtractorResult<MediaDescriptor> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|x| x.as_secs())
            .unwrap_or_default()
            .to_string();

        let headers = headers_for(OsClass::Windows).with_header(
            header::REFERER,
            &format!("https://www.pearvideo.com/detail_{video_id}"),
        );

        let resp = fetch_json::<Value>(
            Client::base()?
                .get("https://www.pearvideo.com/videoStatus.jsp")
                .query(&[("contId", video_id), ("mrd", now.as_str())])
                .headers(headers),
            "lishipin video status",
        )
        .await?;
        trace!(?resp, "Got lishipin video status");

        descriptor_from_response(video_id, &resp)
    }
}

fn video_id_from_url(share_url: &str) -> ExtractorResult<String> {
    let url = url::Url::parse(share_url)
        .map_err(|e| ExtractorError::invalid_argument(format!("invalid share url: {e}")))?;

    url.path()
        .strip_prefix("/detail_")
        .filter(|x| !x.is_empty())
        .map(ToString::to_string)
        .ok_or_else(|| ExtractorError::invalid_argument("no video id in lishipin share url"))
}

/// The returned address has the server time in place of the content id,
/// which points to a dead file.
fn descriptor_from_response(video_id: &str, resp: &Value) -> ExtractorResult<MediaDescriptor> {
    let src_url = required_str(resp, "/videoInfo/videos/srcUrl")?;
    let system_time = required_str(resp, "/systemTime")?;
    if system_time.is_empty() {
        return Err(ExtractorError::shape_mismatch("`/systemTime` is empty"));
    }

    let video_url = src_url.replace(&system_time, &format!("cont-{video_id}"));

    Ok(MediaDescriptor::new(
        video_url,
        str_or_empty(resp, "/videoInfo/video_image"),
    ))
}
