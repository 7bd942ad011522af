/// Typed HTTP exchange used by every outbound service client.
///
/// Requests carry a JSON body and a per-call [`RequestHeaders`]. Typed calls
/// absorb status and decode errors into an [`Envelope`]; a transport failure
/// (no response at all) is returned as [`ApiError::Transport`].
use reqwest::{
    header::{HeaderMap, HeaderValue, CONTENT_TYPE},
    Client, Response,
};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::{debug, error};

pub mod envelope;
pub mod headers;

pub use envelope::{ApiFailure, Envelope, FailureKind};
pub use headers::RequestHeaders;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("upstream returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("JSON serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("invalid header: {0}")]
    InvalidHeader(String),
}

/// Shared outbound client. Cloning is cheap; clones share one connection pool.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    default_headers: RequestHeaders,
}

impl ApiClient {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            default_headers: RequestHeaders::new(),
        }
    }

    /// Headers applied to every request made through this instance.
    pub fn with_default_headers(mut self, headers: RequestHeaders) -> Self {
        self.default_headers = headers;
        self
    }

    /// GET `url` and decode the body as `T`.
    pub async fn get<T: DeserializeOwned>(
        &self,
        url: &str,
        headers: &RequestHeaders,
    ) -> Result<Envelope<T>, ApiError> {
        let response = self
            .client
            .get(url)
            .headers(self.header_map(headers)?)
            .send()
            .await?;

        decode(response).await
    }

    /// POST `payload` as JSON without reading the response body.
    /// Any non-2xx status is an error.
    pub async fn post<T: Serialize + ?Sized>(
        &self,
        url: &str,
        headers: &RequestHeaders,
        payload: &T,
    ) -> Result<(), ApiError> {
        let response = self.send_json(url, headers, payload).await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }

    /// POST `payload` as JSON and decode the response as `TOut`.
    ///
    /// With `ignore_response` set the body is never read and `None` is
    /// returned, whatever the upstream answered.
    pub async fn post_json<TIn, TOut>(
        &self,
        url: &str,
        headers: &RequestHeaders,
        payload: &TIn,
        ignore_response: bool,
    ) -> Result<Option<Envelope<TOut>>, ApiError>
    where
        TIn: Serialize + ?Sized,
        TOut: DeserializeOwned,
    {
        let response = self.send_json(url, headers, payload).await?;

        if ignore_response {
            debug!("POST {url} answered {}; response ignored", response.status());
            return Ok(None);
        }

        decode(response).await.map(Some)
    }

    /// [`post_json`](Self::post_json) for callers that always want the body.
    pub async fn exchange<TIn, TOut>(
        &self,
        url: &str,
        headers: &RequestHeaders,
        payload: &TIn,
    ) -> Result<Envelope<TOut>, ApiError>
    where
        TIn: Serialize + ?Sized,
        TOut: DeserializeOwned,
    {
        match self.post_json(url, headers, payload, false).await? {
            Some(envelope) => Ok(envelope),
            None => unreachable!("post_json always decodes when the response is not ignored"),
        }
    }

    async fn send_json<T: Serialize + ?Sized>(
        &self,
        url: &str,
        headers: &RequestHeaders,
        payload: &T,
    ) -> Result<Response, ApiError> {
        let body = serde_json::to_vec(payload)?;

        // A configured content type wins over the JSON default.
        let mut map = self.header_map(headers)?;
        map.entry(CONTENT_TYPE)
            .or_insert(HeaderValue::from_static("application/json"));

        let response = self
            .client
            .post(url)
            .headers(map)
            .body(body)
            .send()
            .await?;

        Ok(response)
    }

    fn header_map(&self, per_call: &RequestHeaders) -> Result<HeaderMap, ApiError> {
        self.default_headers.merged(per_call).to_header_map()
    }
}

/// Buffers the body and decodes it. Status and decode errors are logged and
/// folded into `Envelope::Failure`; only a broken body stream is an `Err`.
async fn decode<T: DeserializeOwned>(response: Response) -> Result<Envelope<T>, ApiError> {
    let status = response.status();
    let url = response.url().to_string();
    let bytes = response.bytes().await?;

    if !status.is_success() {
        let body = String::from_utf8_lossy(&bytes).into_owned();
        error!("{url} returned {status}: {body}");
        return Ok(Envelope::Failure(ApiFailure {
            kind: FailureKind::Status,
            status: status.as_u16(),
            detail: status.to_string(),
            body,
        }));
    }

    match serde_json::from_slice::<T>(&bytes) {
        Ok(value) => Ok(Envelope::Success(value)),
        Err(e) => {
            let body = String::from_utf8_lossy(&bytes).into_owned();
            error!("Failed to decode response from {url}: {e}; body: {body}");
            Ok(Envelope::Failure(ApiFailure {
                kind: FailureKind::Decode,
                status: status.as_u16(),
                detail: e.to_string(),
                body,
            }))
        }
    }
}
