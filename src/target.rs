use std::fmt;

use log::{debug, info};
use reqwest::Url;

use crate::{
    error::TargetError,
    output::{copy_to_output, OutputResolver},
    retriever::{Response, Retrieve},
    urls::{is_web_scheme, normalize},
};

/// One fetch-and-emit request: a validated http(s) URI and where its body goes.
///
/// The URI and output mode are fixed at construction. The response is held
/// from [`Target::retrieve`] (or [`Target::set_response`]) on; its body is
/// read by the first [`Target::emit`].
#[derive(Debug)]
pub struct Target {
    original: String,
    uri: Url,
    output_to_file: bool,
    response: Option<Response>,
}

impl Target {
    /// Parse `original`, defaulting to `http://` when it has no scheme.
    ///
    /// Fails with [`TargetError::Malformed`] if the result is not a URI and
    /// with [`TargetError::InvalidScheme`] if it is neither http nor https.
    pub fn new(original: &str, output_to_file: bool) -> Result<Self, TargetError> {
        let uri = Url::parse(&normalize(original)).map_err(|source| TargetError::Malformed {
            original: original.to_owned(),
            source,
        })?;
        if !is_web_scheme(&uri) {
            return Err(TargetError::InvalidScheme {
                original: original.to_owned(),
                scheme: uri.scheme().to_owned(),
            });
        }
        Ok(Self {
            original: original.to_owned(),
            uri,
            output_to_file,
            response: None,
        })
    }

    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn uri(&self) -> &Url {
        &self.uri
    }

    pub fn output_to_file(&self) -> bool {
        self.output_to_file
    }

    pub fn response(&self) -> Option<&Response> {
        self.response.as_ref()
    }

    /// Replaces any response already held.
    pub fn set_response(&mut self, response: Response) {
        self.response = Some(response);
    }

    /// Fetch the URI through `retriever`, hold the response, and emit it.
    pub async fn retrieve<R, O>(&mut self, retriever: &R, resolver: &O) -> Result<u64, TargetError>
    where
        R: Retrieve + ?Sized,
        O: OutputResolver + ?Sized,
    {
        let response = retriever.retrieve(&self.uri).await?;
        self.set_response(response);
        self.emit(resolver).await
    }

    /// Copy the held response body to wherever `resolver` points,
    /// returning the number of bytes written.
    ///
    /// The destination is resolved before the body is touched, so a
    /// resolution failure writes nothing and leaves the body unread.
    /// The response stays held afterwards; emitting it again once its body
    /// has been read writes nothing and does not open a destination.
    ///
    /// # Panics
    /// If no response has been set.
    pub async fn emit<O>(&mut self, resolver: &O) -> Result<u64, TargetError>
    where
        O: OutputResolver + ?Sized,
    {
        let Some(response) = self.response.as_ref() else {
            panic!("emit called on {self} before a response was set");
        };
        if response.body_used() {
            debug!("{self}: body already emitted.");
            return Ok(0);
        }
        let mut output = resolver.resolve(self.output_to_file, &self.uri).await?;
        let Some(body) = self.response.as_mut().and_then(Response::take_body) else {
            return Ok(0);
        };
        debug!("{self}: emitting {:?}.", self.response);
        let written = copy_to_output(body, &mut output).await?;
        info!("{self}: {written} bytes.");
        Ok(written)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}
