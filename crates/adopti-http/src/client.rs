//! HTTP client for the Adopti REST API.

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderValue};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, instrument, trace};

use adopti_core::error::{ApiError, Error, InvalidInputError, TransportError};
use adopti_core::{AccessToken, ApiUrl, Result};

use crate::request::{ApiRequest, RequestBody};

/// Map a reqwest failure onto the transport taxonomy.
pub(crate) fn transport_error(err: reqwest::Error) -> Error {
    let transport = if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_connect() {
        TransportError::Connection {
            message: err.to_string(),
        }
    } else if err.is_decode() {
        TransportError::Decode {
            message: err.to_string(),
        }
    } else {
        TransportError::Http {
            message: err.to_string(),
        }
    };
    Error::Transport(transport)
}

/// HTTP client bound to one API base URL.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    api: ApiUrl,
}

impl ApiClient {
    /// Create a new client for the given API base.
    pub fn new(api: ApiUrl) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("adopti/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(transport_error)?;

        Ok(Self { client, api })
    }

    /// Returns the API base this client is configured for.
    pub fn api(&self) -> &ApiUrl {
        &self.api
    }

    /// Unauthenticated JSON POST, decoding a success body.
    #[instrument(skip(self, body), fields(api = %self.api))]
    pub async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.api.endpoint(path);
        debug!(%url, "POST");

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;

        Self::handle_response(response).await
    }

    /// Send a request once, with the given bearer token if any.
    ///
    /// Any status is returned as a response; only transport failures
    /// are errors.
    #[instrument(skip(self, request, token), fields(method = %request.method, target = %request.target))]
    pub async fn execute(
        &self,
        request: &ApiRequest,
        token: Option<&AccessToken>,
    ) -> Result<reqwest::Response> {
        let url = self.api.resolve(&request.target);

        let mut headers = request.headers.clone();
        if headers.remove(AUTHORIZATION).is_some() {
            debug!("Dropping caller-supplied Authorization header");
        }
        if let Some(token) = token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token.as_str())).map_err(|_| {
                InvalidInputError::Token {
                    reason: "access token contains characters not allowed in a header".to_string(),
                }
            })?;
            headers.insert(AUTHORIZATION, value);
        }

        let mut builder = self.client.request(request.method.clone(), &url);
        match &request.body {
            RequestBody::Empty => {
                headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            }
            RequestBody::Json(value) => {
                headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                builder = builder.json(value);
            }
            RequestBody::Multipart(form) => {
                headers.remove(CONTENT_TYPE);
                builder = builder.multipart(form.to_form()?);
            }
        }

        let response = builder
            .headers(headers)
            .send()
            .await
            .map_err(transport_error)?;

        trace!(status = %response.status(), "Response");
        Ok(response)
    }

    /// Decode a success body, or normalize the error body.
    pub async fn handle_response<R: DeserializeOwned>(response: reqwest::Response) -> Result<R> {
        let status = response.status();
        trace!(status = %status, "Handling response");

        if status.is_success() {
            let body = response.json::<R>().await.map_err(transport_error)?;
            Ok(body)
        } else {
            Err(Error::Api(Self::api_error(response).await))
        }
    }

    /// Read a non-success response into an [`ApiError`].
    pub async fn api_error(response: reqwest::Response) -> ApiError {
        let status = response.status().as_u16();
        match response.bytes().await {
            Ok(body) => ApiError::from_body(status, &body),
            Err(_) => ApiError::from_body(status, &[]),
        }
    }
}
