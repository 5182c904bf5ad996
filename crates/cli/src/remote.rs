//! Thin HTTP client for the parcelscope server routes.

use anyhow::{Context, Result, anyhow, bail};
use reqwest::{Client, Response, Url};
use serde_json::{Value, json};

pub struct Remote {
    client: Client,
    base: Url,
}

impl Remote {
    pub fn new(server: &str) -> Result<Self> {
        let base = Url::parse(server).with_context(|| format!("invalid server URL: {server}"))?;
        if base.cannot_be_a_base() {
            bail!("invalid server URL: {server}");
        }
        Ok(Self { client: Client::new(), base })
    }

    /// `base` with `segments` appended as percent-encoded path segments.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| anyhow!("invalid server URL: {}", self.base))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub async fn track(&self, tracking_number: &str) -> Result<Value> {
        let url = self.endpoint(&["track"])?;
        let response = self
            .client
            .post(url)
            .json(&json!({ "trackingNumber": tracking_number }))
            .send()
            .await?;
        read(response).await
    }

    pub async fn tariff(&self, country: &str) -> Result<Value> {
        let url = self.endpoint(&["tariff", country])?;
        read(self.client.get(url).send().await?).await
    }

    pub async fn discounts(&self) -> Result<Value> {
        let url = self.endpoint(&["discounts"])?;
        read(self.client.get(url).send().await?).await
    }

    pub async fn kb(&self, question: &str) -> Result<Value> {
        let url = self.endpoint(&["kb"])?;
        let response = self
            .client
            .post(url)
            .json(&json!({ "question": question }))
            .send()
            .await?;
        read(response).await
    }
}

/// Decode the body, turning `{"error": ...}` responses into errors.
async fn read(response: Response) -> Result<Value> {
    let status = response.status();
    let body: Value = response
        .json()
        .await
        .with_context(|| format!("server returned {status} with a non-JSON body"))?;

    if !status.is_success() {
        let message = body["error"].as_str().unwrap_or("unknown error");
        bail!("server returned {status}: {message}");
    }

    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_appends_segments() {
        let remote = Remote::new("http://127.0.0.1:3000").unwrap();
        assert_eq!(remote.endpoint(&["track"]).unwrap().as_str(), "http://127.0.0.1:3000/track");
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let remote = Remote::new("https://gw.example.com/parcel/").unwrap();
        assert_eq!(
            remote.endpoint(&["tariff", "hk"]).unwrap().as_str(),
            "https://gw.example.com/parcel/tariff/hk"
        );
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let remote = Remote::new("http://127.0.0.1:3000").unwrap();
        assert_eq!(
            remote.endpoint(&["tariff", "hong kong/x"]).unwrap().as_str(),
            "http://127.0.0.1:3000/tariff/hong%20kong%2Fx"
        );
    }

    #[test]
    fn test_rejects_bad_server() {
        assert!(Remote::new("not a url").is_err());
        assert!(Remote::new("mailto:ops@example.com").is_err());
    }
}
