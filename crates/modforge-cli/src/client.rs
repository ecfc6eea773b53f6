//! Thin blocking HTTP client over the daemon's control-plane routes.

use anyhow::{bail, Context, Result};
use modforge_core::run::Run;
use serde::Deserialize;
use serde_json::{json, Value};
use std::io::{BufRead, BufReader};
use std::time::Duration;
use uuid::Uuid;

/// Talks to a running `modforge-daemon` instance over HTTP.
pub struct DaemonClient {
    base_url: String,
    http: reqwest::blocking::Client,
}

#[derive(Debug, Deserialize)]
struct TriggerResponse {
    run_id: Uuid,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

impl DaemonClient {
    /// Build a client targeting `base_url` (e.g. `http://127.0.0.1:8787`).
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("building HTTP client")?;
        Ok(Self { base_url: base_url.into(), http })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    fn check(response: reqwest::blocking::Response) -> Result<reqwest::blocking::Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body: ApiErrorBody = response
                .json()
                .unwrap_or(ApiErrorBody { message: format!("daemon returned {status} with no error body") });
            bail!("{status}: {}", body.message)
        }
    }

    /// `POST /workspaces/{id}/generate`.
    pub fn trigger_generate(&self, workspace_id: &str, prompt: &str) -> Result<Uuid> {
        let response = self
            .http
            .post(self.url(&format!("/workspaces/{workspace_id}/generate")))
            .json(&json!({ "prompt": prompt }))
            .send()
            .context("sending generate request")?;
        let parsed: TriggerResponse = Self::check(response)?.json().context("parsing generate response")?;
        Ok(parsed.run_id)
    }

    /// `POST /workspaces/{id}/build`.
    pub fn trigger_build(&self, workspace_id: &str) -> Result<Uuid> {
        let response = self.http.post(self.url(&format!("/workspaces/{workspace_id}/build"))).send().context("sending build request")?;
        let parsed: TriggerResponse = Self::check(response)?.json().context("parsing build response")?;
        Ok(parsed.run_id)
    }

    /// `GET /runs/{id}`.
    pub fn snapshot(&self, run_id: Uuid) -> Result<Run> {
        let response = self.http.get(self.url(&format!("/runs/{run_id}"))).send().context("fetching run snapshot")?;
        Self::check(response)?.json().context("parsing run snapshot")
    }

    /// `POST /runs/{id}/approve`.
    pub fn approve(&self, run_id: Uuid, modified_deltas: Option<Value>) -> Result<()> {
        let body = modified_deltas.map(|d| json!({ "modified_deltas": d })).unwrap_or_else(|| json!({}));
        let response = self.http.post(self.url(&format!("/runs/{run_id}/approve"))).json(&body).send().context("sending approve request")?;
        Self::check(response)?;
        Ok(())
    }

    /// `POST /runs/{id}/reject`.
    pub fn reject(&self, run_id: Uuid, reason: Option<String>) -> Result<()> {
        let body = json!({ "reason": reason });
        let response = self.http.post(self.url(&format!("/runs/{run_id}/reject"))).json(&body).send().context("sending reject request")?;
        Self::check(response)?;
        Ok(())
    }

    /// `POST /runs/{id}/cancel`.
    pub fn cancel(&self, run_id: Uuid) -> Result<()> {
        let response = self.http.post(self.url(&format!("/runs/{run_id}/cancel"))).send().context("sending cancel request")?;
        Self::check(response)?;
        Ok(())
    }

    /// `POST /runs/{id}/reply`.
    pub fn reply(&self, run_id: Uuid, prompt: &str) -> Result<Uuid> {
        let response = self
            .http
            .post(self.url(&format!("/runs/{run_id}/reply")))
            .json(&json!({ "prompt": prompt }))
            .send()
            .context("sending reply request")?;
        let parsed: TriggerResponse = Self::check(response)?.json().context("parsing reply response")?;
        Ok(parsed.run_id)
    }

    /// `GET /runs/{id}/events?since=N`, invoking `on_line` for each raw SSE
    /// line received until the connection closes or `on_line` asks to stop
    /// by returning `false`.
    pub fn stream_events(&self, run_id: Uuid, since: u64, mut on_line: impl FnMut(&str) -> bool) -> Result<()> {
        let response = self
            .http
            .get(self.url(&format!("/runs/{run_id}/events?since={since}")))
            .send()
            .context("opening event stream")?;
        let response = Self::check(response)?;
        let mut reader = BufReader::new(response);
        let mut line = String::new();
        loop {
            line.clear();
            let read = reader.read_line(&mut line).context("reading event stream")?;
            if read == 0 {
                return Ok(());
            }
            let trimmed = line.trim_end();
            if !trimmed.is_empty() && !on_line(trimmed) {
                return Ok(());
            }
        }
    }
}
