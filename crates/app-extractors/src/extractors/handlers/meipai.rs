use app_helpers::encoding::{base64_to_string, TextDecodeError};
use tracing::{debug, trace};

use super::Extractor;
use crate::common::{
    extractor_error::{ExtractorError, ExtractorResult},
    html::HtmlDocument,
    media_descriptor::{MediaAuthor, MediaDescriptor},
    platform::Platform,
    request::{fetch_text, headers_for, Client, OsClass},
    url::with_https_scheme,
};

#[derive(Debug, Default, Clone, Copy)]
pub struct MeiPai;

#[async_trait::async_trait]
impl Extractor for MeiPai {
    fn platform(&self) -> Platform {
        Platform::MeiPai
    }

    fn description(&self) -> &'static str {
        "Meipai videos"
    }

    async fn parse_share_url(&self, share_url: &str) -> ExtractorResult<MediaDescriptor> {
        let page = fetch_text(
            Client::base()?
                .get(share_url)
                .headers(headers_for(OsClass::Windows)),
            "meipai video page",
        )
        .await?;
        trace!(len = page.len(), "Got meipai video page");

        descriptor_from_page(&page)
    }

    async fn parse_video_id(&self, video_id: &str) -> ExtractorResult<MediaDescriptor> {
        self.parse_share_url(&format!("https://www.meipai.com/video/{video_id}"))
            .await
    }
}

fn descriptor_from_page(page: &str) -> ExtractorResult<MediaDescriptor> {
    let doc = HtmlDocument::parse(page);

    let encoded = doc
        .attr("#shareMediaBtn", "data-video")
        .filter(|x| !x.is_empty())
        .ok_or_else(|| ExtractorError::shape_mismatch("`#shareMediaBtn[data-video]` not found in page"))?;
    let video_url = decode_video_url(&encoded)
        .map_err(|e| ExtractorError::shape_mismatch(format!("meipai video address: {e}")))?;
    debug!(?video_url, "Decoded meipai video address");

    let uid = doc
        .attr(".detail-name a", "href")
        .and_then(|x| x.rsplit('/').next().map(ToString::to_string))
        .unwrap_or_default();
    let avatar = doc
        .attr(".detail-avatar", "src")
        .map(|x| with_https_scheme(&x))
        .unwrap_or_default();

    Ok(MediaDescriptor::new(
        video_url,
        doc.attr("#detailVideo img", "src").unwrap_or_default(),
    )
    .with_title(doc.text(".detail-cover-title").unwrap_or_default())
    .with_author(MediaAuthor::new(
        uid,
        doc.attr(".detail-avatar", "alt").unwrap_or_default(),
        avatar,
    )))
}

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("encoded address is too short")]
    TooShort,
    #[error("invalid hex prefix {0:?}")]
    InvalidPrefix(String),
    #[error("cut positions fall outside the encoded address")]
    OutOfRange,
    #[error(transparent)]
    Text(#[from] TextDecodeError),
}

/// Decode the obfuscated `data-video` attribute.
///
/// The first four characters are a reversed hex number whose decimal digits
/// describe two spans of junk characters mixed into a base64 string.
pub fn decode_video_url(encoded: &str) -> Result<String, DecodeError> {
    let prefix = encoded.get(..4).ok_or(DecodeError::TooShort)?;
    let rest = encoded.get(4..).ok_or(DecodeError::TooShort)?;

    let hex = prefix.chars().rev().collect::<String>();
    let digits = u64::from_str_radix(&hex, 16)
        .map_err(|_| DecodeError::InvalidPrefix(hex.clone()))?
        .to_string()
        .bytes()
        .map(|x| usize::from(x - b'0'))
        .collect::<Vec<_>>();

    let [lead_start, lead_len, .., tail_start, tail_len] = digits[..] else {
        return Err(DecodeError::InvalidPrefix(hex));
    };

    let without_lead = cut_span(rest, lead_start, lead_len)?;
    let cut_at = without_lead
        .len()
        .checked_sub(tail_start + tail_len)
        .ok_or(DecodeError::OutOfRange)?;
    let payload = cut_span(&without_lead, cut_at, tail_len)?;

    let decoded = base64_to_string(payload)?;

    Ok(format!("https:{decoded}"))
}

/// Remove `len` characters at `start`, along with any later repeat of them.
fn cut_span(s: &str, start: usize, len: usize) -> Result<String, DecodeError> {
    let head = s.get(..start).ok_or(DecodeError::OutOfRange)?;
    let span = s.get(start..start + len).ok_or(DecodeError::OutOfRange)?;
    let tail = s.get(start + len..).ok_or(DecodeError::OutOfRange)?;

    Ok(format!("{head}{}", tail.replace(span, "")))
}
