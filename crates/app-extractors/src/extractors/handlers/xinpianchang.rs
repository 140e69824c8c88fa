use serde_json::Value;
use tracing::{debug, trace};

use super::{video_id_unsupported, Extractor};
use crate::common::{
    extractor_error::ExtractorResult,
    html::element_text_by_id,
    json::{parse_json, required, required_str, str_or_empty},
    media_descriptor::{MediaAuthor, MediaDescriptor},
    platform::Platform,
    request::{fetch_json, fetch_text, header, headers_for, Client, HeaderMap, HeaderMapExt, OsClass},
};

#[derive(Debug, Default, Clone, Copy)]
pub struct XinPianChang;

#[async_trait::async_trait]
impl Extractor for XinPianChang {
    fn platform(&self) -> Platform {
        Platform::XinPianChang
    }

    fn description(&self) -> &'static str {
        "Xinpianchang films"
    }

    async fn parse_share_url(&self, share_url: &str) -> ExtractorResult<MediaDescriptor> {
        let headers = request_headers();

        let page = fetch_text(
            Client::base()?.get(share_url).headers(headers.clone()),
            "xinpianchang film page",
        )
        .await?;

        let next_data = parse_json(&element_text_by_id(&page, "__NEXT_DATA__")?, "__NEXT_DATA__")?;
        let detail = required(&next_data, "/props/pageProps/detail")?;
        trace!(?detail, "Got xinpianchang film detail");

        let media_id = required_str(detail, "/media_id")?;
        let app_key = required_str(detail, "/video/appKey")?;
        debug!(?media_id, "Got xinpianchang media id");

        let media = fetch_json::<Value>(
            Client::base()?
                .get(format!(
                    "https://mod-api.xinpianchang.com/mod/api/v2/media/{media_id}"
                ))
                .query(&[("appKey", app_key.as_str()), ("extend", "userInfo,userStatus")])
                .headers(headers),
            "xinpianchang media",
        )
        .await?;
        trace!(?media, "Got xinpianchang media");

        descriptor_from_detail(detail, &media)
    }

    async fn parse_video_id(&self, _video_id: &str) -> ExtractorResult<MediaDescriptor> {
        Err(video_id_unsupported(self.platform()))
    }
}

fn request_headers() -> HeaderMap {
    headers_for(OsClass::Windows)
        .with_header(header::UPGRADE_INSECURE_REQUESTS, "1")
        .with_header(header::REFERER, "https://www.xinpianchang.com/")
}

fn descriptor_from_detail(detail: &Value, media: &Value) -> ExtractorResult<MediaDescriptor> {
    let video_url = required_str(media, "/data/resource/progressive/0/url")?;

    Ok(MediaDescriptor::new(video_url, str_or_empty(detail, "/cover"))
        .with_title(str_or_empty(detail, "/title"))
        .with_author(MediaAuthor::new(
            str_or_empty(detail, "/author/userinfo/id"),
            str_or_empty(detail, "/author/userinfo/username"),
            str_or_empty(detail, "/author/userinfo/avatar"),
        )))
}
