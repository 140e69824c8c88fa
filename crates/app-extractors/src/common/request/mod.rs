mod user_agent;

pub use reqwest::{
    header::{self, HeaderMap, HeaderValue, IntoHeaderName},
    redirect::Policy as RedirectPolicy,
    Client as RequestClient, ClientBuilder as RequestClientBuilder, RequestBuilder, Response,
};
use serde::de::DeserializeOwned;
use tracing::{trace, warn};
pub use user_agent::{random_user_agent, OsClass};

use super::extractor_error::{ExtractorError, ExtractorResult};

pub struct Client;

impl Client {
    /// Client that follows redirects and returns the final response.
    pub fn base() -> ExtractorResult<RequestClient> {
        Self::builder()
            .build()
            .map_err(|e| ExtractorError::fetch_failed(format!("Failed to create client: {e}")))
    }

    /// Client that stops at the first response, so `Location` can be captured.
    pub fn without_redirects() -> ExtractorResult<RequestClient> {
        Self::builder()
            .redirect(RedirectPolicy::none())
            .build()
            .map_err(|e| ExtractorError::fetch_failed(format!("Failed to create client: {e}")))
    }

    pub fn builder() -> RequestClientBuilder {
        RequestClient::builder().cookie_store(false)
    }
}

pub trait HeaderMapExt: Sized {
    #[must_use]
    fn with_header<K: IntoHeaderName>(self, key: K, value: &str) -> Self;
}

impl HeaderMapExt for HeaderMap {
    fn with_header<K: IntoHeaderName>(mut self, key: K, value: &str) -> Self {
        match HeaderValue::from_str(value) {
            Ok(value) => {
                self.insert(key, value);
            }
            Err(e) => warn!(?value, "Skipping invalid header value: {e}"),
        }
        self
    }
}

/// Headers with a fresh user agent for the given OS class.
#[must_use]
pub fn headers_for(os: OsClass) -> HeaderMap {
    HeaderMap::new().with_header(header::USER_AGENT, &random_user_agent(os))
}

/// Headers used by adapters that don't need anything platform specific.
#[must_use]
pub fn default_headers() -> HeaderMap {
    headers_for(OsClass::Ios)
}

/// Send the request and fail on transport errors or non-2xx statuses.
///
/// `step` names what is being fetched and ends up in the error message.
pub async fn send(builder: RequestBuilder, step: &str) -> ExtractorResult<Response> {
    let resp = builder
        .send()
        .await
        .map_err(|e| ExtractorError::fetch_failed(format!("{step}: {e}")))?;
    trace!(?resp, "Got response for {step}");

    let status = resp.status();
    if !status.is_success() {
        return Err(ExtractorError::fetch_failed(format!(
            "{step}: server responded with status {status}"
        )));
    }

    Ok(resp)
}

pub async fn fetch_text(builder: RequestBuilder, step: &str) -> ExtractorResult<String> {
    send(builder, step)
        .await?
        .text()
        .await
        .map_err(|e| ExtractorError::fetch_failed(format!("{step}: failed to read body: {e}")))
}

pub async fn fetch_json<T>(builder: RequestBuilder, step: &str) -> ExtractorResult<T>
where
    T: DeserializeOwned,
{
    let body = fetch_text(builder, step).await?;

    serde_json::from_str(&body)
        .map_err(|e| ExtractorError::shape_mismatch(format!("{step}: unexpected JSON: {e}")))
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Redirect {
    pub location: String,
    /// Cookies set on the redirect response, in `name=value` form
    pub cookies: Vec<String>,
}
impl Redirect {
    /// Cookies formatted as a `Cookie` request header value.
    #[must_use]
    pub fn cookie_header(&self) -> String {
        self.cookies.join("; ")
    }
}

/// Request `url` without following redirects and capture where it points to.
pub async fn capture_redirect(
    url: &str,
    headers: HeaderMap,
    step: &str,
) -> ExtractorResult<Redirect> {
    let resp = Client::without_redirects()?
        .get(url)
        .headers(headers)
        .send()
        .await
        .map_err(|e| ExtractorError::fetch_failed(format!("{step}: {e}")))?;
    trace!(?resp, "Got redirect response for {step}");

    let status = resp.status();
    if status.is_client_error() || status.is_server_error() {
        return Err(ExtractorError::fetch_failed(format!(
            "{step}: server responded with status {status}"
        )));
    }

    let location = resp
        .headers()
        .get(header::LOCATION)
        .and_then(|x| x.to_str().ok())
        .filter(|x| !x.is_empty())
        .ok_or_else(|| {
            ExtractorError::shape_mismatch(format!("{step}: no `Location` header in response"))
        })?;

    let location = resp
        .url()
        .join(location)
        .map_or_else(|_| location.to_string(), |x| x.to_string());

    let cookies = resp
        .cookies()
        .map(|x| format!("{}={}", x.name(), x.value()))
        .collect();

    Ok(Redirect { location, cookies })
}
