//! Firebase Realtime Database [`Database`] implementation over its REST
//! interface.
//!
//! Every node is addressed as `{base}/{path}.json`. [`Authorized`] requests
//! carry the [`session::Token`] as the `auth` query parameter.
//!
//! [`Authorized`]: database::Authorized
//! [`Database`]: crate::infra::Database

mod impls;

use std::time::Duration;

use derive_more::{Display, Error as StdError, From};
use reqwest::{Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use smart_default::SmartDefault;
use tracerr::Traced;
use tracing as log;

#[cfg(doc)]
use crate::domain::session;
use crate::infra::database::{self, Anonymous, Credentials};

/// [`Firebase`] client configuration.
#[derive(Clone, Debug, SmartDefault)]
pub struct Config {
    /// Root URL of the database.
    #[default(
        "https://bde-ski-default-rtdb.europe-west1.firebasedatabase.app"
            .to_owned()
    )]
    pub url: String,

    /// Timeout of a single request.
    #[default(Duration::from_secs(30))]
    pub timeout: Duration,
}

/// Firebase Realtime Database client.
#[derive(Clone, Debug)]
pub struct Firebase<C = Anonymous> {
    /// HTTP client performing requests.
    client: reqwest::Client,

    /// Root [`Url`] of the database.
    base: Url,

    /// [`Credentials`] attached to requests.
    credentials: C,
}

impl Firebase {
    /// Creates a new [`Firebase`] client with the provided [`Config`].
    ///
    /// # Errors
    ///
    /// If the [`Config::url`] is not a valid base URL, or the HTTP client
    /// cannot be built.
    pub fn new(conf: &Config) -> Result<Self, Traced<database::Error>> {
        let base = Url::parse(&conf.url)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| {
                tracerr::new!(Error::InvalidUrl(conf.url.clone()))
            })
            .map_err(tracerr::map_from)?;

        let client = reqwest::Client::builder()
            .timeout(conf.timeout)
            .build()
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)?;

        Ok(Self {
            client,
            base,
            credentials: Anonymous,
        })
    }
}

impl<C: Credentials> Firebase<C> {
    /// Builds the [`Url`] of the node at the provided `path`.
    fn url(&self, path: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            _ = segments.pop_if_empty();
            if let Some((last, init)) = path.split_last() {
                _ = segments.extend(init).push(&format!("{last}.json"));
            }
        }
        if let Some(token) = self.credentials.token() {
            _ = url.query_pairs_mut().append_pair("auth", token.as_ref());
        }
        url
    }

    /// Reads the JSON value stored at the provided `path`.
    ///
    /// `null` is read as [`None`].
    async fn get<T: DeserializeOwned>(
        &self,
        path: &[&str],
    ) -> Result<Option<T>, Traced<Error>> {
        log::debug!(path = %path.join("/"), "GET");

        let resp = self.client.get(self.url(path)).send().await;
        check(resp)
            .await
            .map_err(tracerr::wrap!())?
            .json()
            .await
            .map_err(tracerr::from_and_wrap!(=> Error))
    }

    /// Replaces the value stored at the provided `path`.
    async fn put<T: serde::Serialize + ?Sized>(
        &self,
        path: &[&str],
        value: &T,
    ) -> Result<(), Traced<Error>> {
        log::debug!(path = %path.join("/"), "PUT");

        let resp = self.client.put(self.url(path)).json(value).send().await;
        check(resp).await.map(drop).map_err(tracerr::wrap!())
    }

    /// Pushes the value under a fresh key of the list at the provided
    /// `path`, returning the key.
    async fn post<T: serde::Serialize + ?Sized>(
        &self,
        path: &[&str],
        value: &T,
    ) -> Result<String, Traced<Error>> {
        /// Body of a push response.
        #[derive(serde::Deserialize)]
        struct Pushed {
            /// Generated key.
            name: String,
        }

        log::debug!(path = %path.join("/"), "POST");

        let resp = self.client.post(self.url(path)).json(value).send().await;
        let Pushed { name } = check(resp)
            .await
            .map_err(tracerr::wrap!())?
            .json()
            .await
            .map_err(tracerr::from_and_wrap!(=> Error))?;
        Ok(name)
    }

    /// Updates the provided children of the value stored at the provided
    /// `path`.
    async fn patch<T: serde::Serialize + ?Sized>(
        &self,
        path: &[&str],
        value: &T,
    ) -> Result<(), Traced<Error>> {
        log::debug!(path = %path.join("/"), "PATCH");

        let resp = self.client.patch(self.url(path)).json(value).send().await;
        check(resp).await.map(drop).map_err(tracerr::wrap!())
    }

    /// Removes the value stored at the provided `path`.
    async fn delete(&self, path: &[&str]) -> Result<(), Traced<Error>> {
        log::debug!(path = %path.join("/"), "DELETE");

        let resp = self.client.delete(self.url(path)).send().await;
        check(resp).await.map(drop).map_err(tracerr::wrap!())
    }
}

/// Checks the status of the provided [`Response`].
async fn check(
    resp: Result<Response, reqwest::Error>,
) -> Result<Response, Traced<Error>> {
    let resp = resp.map_err(tracerr::from_and_wrap!(=> Error))?;

    let status = resp.status();
    if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
        return Err(tracerr::new!(Error::PermissionDenied));
    }
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(tracerr::new!(Error::Status {
            status: status.as_u16(),
            body,
        }));
    }

    Ok(resp)
}

/// Firebase database [`Error`].
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    /// Configured URL cannot address database nodes.
    #[display("Invalid database URL: {_0}")]
    #[from(ignore)]
    InvalidUrl(#[error(not(source))] String),

    /// HTTP request failed or returned a malformed body.
    #[display("HTTP request failed: {_0}")]
    Request(reqwest::Error),

    /// Database rules rejected the request.
    #[display("Permission denied")]
    #[from(ignore)]
    PermissionDenied,

    /// Database answered with an unexpected HTTP status.
    #[display("Unexpected HTTP status {status}: {body}")]
    #[from(ignore)]
    Status {
        /// HTTP status code.
        status: u16,

        /// Response body.
        body: String,
    },

    /// Database answered with an unexpected value.
    #[display("Unexpected response: {_0}")]
    #[from(ignore)]
    Malformed(#[error(not(source))] String),
}
