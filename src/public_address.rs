use async_trait::async_trait;
use hyper::client::HttpConnector;
use hyper::{Body, Client, StatusCode, Uri};
use hyper_tls::HttpsConnector;
use lazy_static::lazy_static;
use std::net::{AddrParseError, IpAddr};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PublicAddressError {
    #[error(transparent)]
    Hyper(#[from] hyper::Error),
    #[error(transparent)]
    Http(#[from] hyper::http::Error),
    #[error("non-success status code: {0}")]
    NonSuccess(StatusCode),
    #[error("response body is not valid UTF-8")]
    Encoding(#[from] std::str::Utf8Error),
    #[error("response body is not an IP address: {0}")]
    Body(#[from] AddrParseError),
}

/// Source of the machine's current public IP address
#[async_trait]
pub trait PublicAddress: Send + Sync {
    async fn public_address(&self) -> Result<IpAddr, PublicAddressError>;
}

lazy_static! {
    static ref PUBLIC_ADDRESS_URI: Uri = "https://api.ipify.org/".parse().unwrap();
}

/// Queries a plain-text "what is my IP" endpoint over HTTPS
pub struct HttpPublicAddress {
    client: Client<HttpsConnector<HttpConnector>>,
    uri: Uri,
}

impl HttpPublicAddress {
    pub fn new(uri: Uri) -> Self {
        let https = HttpsConnector::new();
        let client = Client::builder().build::<_, Body>(https);
        Self { client, uri }
    }

    pub fn default_uri() -> Uri {
        PUBLIC_ADDRESS_URI.clone()
    }
}

impl Default for HttpPublicAddress {
    fn default() -> Self {
        Self::new(Self::default_uri())
    }
}

#[async_trait]
impl PublicAddress for HttpPublicAddress {
    async fn public_address(&self) -> Result<IpAddr, PublicAddressError> {
        let request = hyper::Request::builder()
            .uri(&self.uri)
            .body(Body::empty())?;
        let response = self.client.request(request).await?;
        if !response.status().is_success() {
            return Err(PublicAddressError::NonSuccess(response.status()));
        }
        let body = hyper::body::to_bytes(response.into_body()).await?;
        let text = std::str::from_utf8(&body)?;
        Ok(text.trim().parse()?)
    }
}
