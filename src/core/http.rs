use std::time::Duration;

use reqwest::{
    header::{
        HeaderMap,
        HeaderValue,
        ACCEPT,
        USER_AGENT,
    },
    Client,
    Response,
    StatusCode,
};

use crate::core::GameError;

pub fn http_client(timeout: Duration) -> Result<Client, GameError> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static("kanji-memory/0.1 (+reqwest)"));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    Client::builder()
        .timeout(timeout)
        .default_headers(headers)
        .build()
        .map_err(|e| GameError::Custom(format!("HTTP client build failed: {e}")))
}

/// Outcome of a GET that distinguishes "not found" from other failures.
pub enum Fetched {
    Found(Response),
    NotFound,
}

pub async fn get(client: &Client, url: &str) -> Result<Fetched, String> {
    let resp = client.get(url).send().await.map_err(|e| format!("Failed HTTP GET {url}: {e}"))?;

    if resp.status() == StatusCode::NOT_FOUND {
        return Ok(Fetched::NotFound);
    }
    ensure_success(&resp)?;
    Ok(Fetched::Found(resp))
}

fn ensure_success(resp: &Response) -> Result<(), String> {
    if !resp.status().is_success() {
        return Err(format!("HTTP error {} from {}", resp.status(), resp.url()));
    }
    Ok(())
}
