use std::{borrow::Cow, fmt, io};

use async_trait::async_trait;
use bytes::Bytes;
use futures::{
    stream::{self, BoxStream},
    StreamExt, TryStreamExt,
};
use log::debug;
use reqwest::{header::CONTENT_TYPE, Client, StatusCode, Url};

use crate::{
    config::RetrieverConfig,
    error::{ConfigError, RetrievalError},
    urls::file_name,
};

/// Body of a [`Response`], read once front to back.
pub type Body = BoxStream<'static, io::Result<Bytes>>;

/// Fetches the resource a URI names.
#[async_trait]
pub trait Retrieve {
    async fn retrieve(&self, uri: &Url) -> Result<Response, RetrievalError>;
}

pub struct Response {
    url: Url,
    status: StatusCode,
    content_type: Option<String>,
    content_length: Option<u64>,
    /// `None` once the body has been handed out.
    body: Option<Body>,
}

impl Response {
    pub fn new(url: Url, body: Body) -> Self {
        Self {
            url,
            status: StatusCode::OK,
            content_type: None,
            content_length: None,
            body: Some(body),
        }
    }

    /// A response whose body is already in memory, yielded as a single chunk.
    pub fn from_bytes<B>(url: Url, bytes: B) -> Self
    where
        B: Into<Bytes>,
    {
        let bytes = bytes.into();
        let content_length = Some(bytes.len() as u64);
        Self {
            content_length,
            ..Self::new(url, stream::once(async { Ok::<_, io::Error>(bytes) }).boxed())
        }
    }

    pub fn from_reqwest(response: reqwest::Response) -> Self {
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        Self {
            url: response.url().to_owned(),
            status: response.status(),
            content_type,
            content_length: response.content_length(),
            body: Some(
                response
                    .bytes_stream()
                    .map_err(|err| io::Error::new(io::ErrorKind::Other, err))
                    .boxed(),
            ),
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn content_length(&self) -> Option<u64> {
        self.content_length
    }

    /// File name taken from the final URL's last path segment.
    pub fn file_name(&self) -> Option<Cow<'_, str>> {
        file_name(&self.url)
    }

    pub fn body_used(&self) -> bool {
        self.body.is_none()
    }

    /// The body stream, at most once.
    pub fn take_body(&mut self) -> Option<Body> {
        self.body.take()
    }
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Response")
            .field("url", &self.url.as_str())
            .field("status", &self.status)
            .field("content_type", &self.content_type)
            .field("content_length", &self.content_length)
            .field("body_used", &self.body_used())
            .finish_non_exhaustive()
    }
}

/// [`Retrieve`] over HTTP(S) with a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct WebRetriever {
    client: Client,
}

impl WebRetriever {
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    pub fn with_config(config: &RetrieverConfig) -> Result<Self, ConfigError> {
        Ok(Self::from_client(Self::client_with_config(config)?))
    }

    pub fn default_client() -> Result<Client, ConfigError> {
        Self::client_with_config(&RetrieverConfig::default())
    }

    pub fn client_with_config(config: &RetrieverConfig) -> Result<Client, ConfigError> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout_duration())
            .timeout(config.total_timeout()?)
            .user_agent(config.user_agent.as_str())
            .build()?;
        Ok(client)
    }
}

#[async_trait]
impl Retrieve for WebRetriever {
    async fn retrieve(&self, uri: &Url) -> Result<Response, RetrievalError> {
        debug!("GET {uri}.");
        let response = self.client.get(uri.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RetrievalError::Status {
                url: response.url().to_owned(),
                status,
            });
        }
        let response = Response::from_reqwest(response);
        debug!("{uri}: {response:?}.");
        Ok(response)
    }
}
