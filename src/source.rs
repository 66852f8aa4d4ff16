//! Text acquisition for the importer: local file, remote URL, or stdin.
//!
//! The importer's contract is identical for all three drivers; only the way
//! the raw text is obtained differs.

use std::path::PathBuf;

use anyhow::{Context, Result};
use reqwest::Url;
use tokio::io::AsyncReadExt;

use crate::provider::ApiError;

#[derive(Debug, Clone)]
pub enum TextSource {
    File(PathBuf),
    Remote(Url),
    Stdin,
}

impl TextSource {
    /// Classify a CLI input argument: `-` reads stdin, `http(s)://…`
    /// fetches, anything else is a local file path.
    pub fn from_arg(arg: &str) -> Result<Self> {
        if arg == "-" {
            return Ok(Self::Stdin);
        }
        if arg.starts_with("http://") || arg.starts_with("https://") {
            let url = Url::parse(arg).context("invalid roster URL")?;
            return Ok(Self::Remote(url));
        }
        Ok(Self::File(PathBuf::from(arg)))
    }

    pub async fn read(&self) -> Result<String> {
        match self {
            Self::File(path) => tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("failed to read {}", path.display())),
            Self::Remote(url) => fetch_text(url).await,
            Self::Stdin => {
                let mut text = String::new();
                tokio::io::stdin()
                    .read_to_string(&mut text)
                    .await
                    .context("failed to read stdin")?;
                Ok(text)
            }
        }
    }
}

async fn fetch_text(url: &Url) -> Result<String> {
    let res = reqwest::get(url.clone())
        .await
        .with_context(|| format!("failed to fetch {url}"))?;
    let status = res.status();
    let text = res.text().await.unwrap_or_default();
    if !status.is_success() {
        return Err(ApiError::from_status(status, &text).into());
    }
    Ok(text)
}
