use std::{
    future::Future,
    path::{Path, PathBuf},
};

use anyhow::Context;

/**
 * This module contains all logic for getting request templates and model documents from
 * outside the process and turning them into meshes.
 */
pub mod collada;
pub mod export;
pub mod mesh;
pub mod model;
pub mod ows;

/// How the body of a model service response is read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResponseFormat {
    Json,
    Xml,
}

impl ResponseFormat {
    pub fn accept(&self) -> &'static str {
        match self {
            ResponseFormat::Json => "application/json",
            ResponseFormat::Xml => "application/xml, text/xml, model/vnd.collada+xml",
        }
    }

    /// Check the body is well formed for this format.
    ///
    /// An OWS exception report is an error for either format, carrying the
    /// service's exception text.
    pub fn parse(&self, body: String) -> anyhow::Result<ParsedResponse> {
        if body.trim_start().starts_with('<') {
            if let Some(report) = ows::exception_report(&body) {
                anyhow::bail!("Service exception: {}", report);
            }
        }
        match self {
            ResponseFormat::Json => {
                let value = serde_json::from_str(&body).context("Response is not valid JSON")?;
                Ok(ParsedResponse::Json(value))
            }
            ResponseFormat::Xml => {
                if !body.trim_start().starts_with('<') {
                    anyhow::bail!("Response is not an XML document");
                }
                Ok(ParsedResponse::Xml(body))
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ParsedResponse {
    Json(serde_json::Value),
    Xml(String),
}

/// The network boundary: getting templates and posting requests.
///
/// Neither operation retries or times out on its own.
pub trait Fetcher {
    fn fetch_text(&self, url: &str) -> impl Future<Output = anyhow::Result<String>> + Send;

    fn submit(
        &self,
        url: &str,
        body: String,
        content_type: &str,
        format: ResponseFormat,
    ) -> impl Future<Output = anyhow::Result<ParsedResponse>> + Send;
}

/// Fetches over HTTP, and reads relative template paths from an assets directory.
#[derive(Clone, Debug)]
pub struct HttpFetcher {
    client: reqwest::Client,
    assets: PathBuf,
}

impl HttpFetcher {
    pub fn new(assets: impl Into<PathBuf>) -> Self {
        Self {
            client: reqwest::Client::new(),
            assets: assets.into(),
        }
    }

    pub fn assets(&self) -> &Path {
        &self.assets
    }
}

fn is_remote(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

impl Fetcher for HttpFetcher {
    async fn fetch_text(&self, url: &str) -> anyhow::Result<String> {
        let txt = if is_remote(url) {
            self.client
                .get(url)
                .send()
                .await?
                .error_for_status()?
                .text()
                .await?
        } else {
            let path = self.assets.join(url);
            tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("Could not read {}", path.display()))?
        };
        Ok(txt)
    }

    async fn submit(
        &self,
        url: &str,
        body: String,
        content_type: &str,
        format: ResponseFormat,
    ) -> anyhow::Result<ParsedResponse> {
        let response = self
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .header(reqwest::header::ACCEPT, format.accept())
            .body(body)
            .send()
            .await?
            .error_for_status()?;
        let body = response.text().await?;
        format.parse(body)
    }
}
