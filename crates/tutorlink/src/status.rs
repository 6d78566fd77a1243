// SPDX-FileCopyrightText: 2026 Tutorlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `tutorlink status` command implementation.
//!
//! Probes the gateway's unauthenticated `/health` endpoint. An unreachable
//! gateway is reported, not treated as an error.

use std::io::IsTerminal;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tutorlink_config::model::TutorlinkConfig;
use tutorlink_core::TutorlinkError;

const PROBE_TIMEOUT: Duration = Duration::from_secs(3);

/// Body of `GET /health`.
#[derive(Debug, Deserialize)]
struct HealthResponse {
    status: String,
    version: String,
    uptime_secs: u64,
}

/// What `status` prints; also the `--json` output.
#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub running: bool,
    pub endpoint: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uptime_secs: Option<u64>,
    /// Why the probe failed, when it did.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Run the `tutorlink status` command.
pub async fn run_status(
    config: &TutorlinkConfig,
    json: bool,
    plain: bool,
) -> Result<(), TutorlinkError> {
    let endpoint = format!("http://{}:{}/health", config.gateway.host, config.gateway.port);
    let report = probe(&endpoint).await?;

    if json {
        let out = serde_json::to_string_pretty(&report)
            .map_err(|e| TutorlinkError::Internal(format!("failed to encode status: {e}")))?;
        println!("{out}");
    } else {
        let color = !plain && std::io::stdout().is_terminal();
        print!("{}", render(&report, color));
    }
    Ok(())
}

async fn probe(endpoint: &str) -> Result<StatusReport, TutorlinkError> {
    let client = reqwest::Client::builder()
        .timeout(PROBE_TIMEOUT)
        .build()
        .map_err(|e| TutorlinkError::Internal(format!("failed to create HTTP client: {e}")))?;

    let offline = |error: String| StatusReport {
        running: false,
        endpoint: endpoint.to_string(),
        version: None,
        uptime_secs: None,
        error: Some(error),
    };

    let response = match client.get(endpoint).send().await {
        Ok(response) => response,
        Err(e) => return Ok(offline(e.to_string())),
    };
    if !response.status().is_success() {
        return Ok(offline(format!("health endpoint returned {}", response.status())));
    }
    match response.json::<HealthResponse>().await {
        Ok(health) if health.status == "ok" => Ok(StatusReport {
            running: true,
            endpoint: endpoint.to_string(),
            version: Some(health.version),
            uptime_secs: Some(health.uptime_secs),
            error: None,
        }),
        Ok(health) => Ok(offline(format!("gateway reports status {}", health.status))),
        Err(e) => Ok(offline(format!("unreadable health response: {e}"))),
    }
}

fn render(report: &StatusReport, color: bool) -> String {
    use colored::Colorize;

    let state = match (report.running, color) {
        (true, true) => format!("{} {}", "✓".green(), "running".green()),
        (true, false) => "[OK] running".to_string(),
        (false, true) => format!("{} {}", "✗".red(), "not running".red()),
        (false, false) => "[FAIL] not running".to_string(),
    };

    let mut out = format!("\n  tutorlink status\n  {}\n", "-".repeat(35));
    out.push_str(&format!("    State:    {state}\n"));
    out.push_str(&format!("    Endpoint: {}\n", report.endpoint));
    if let Some(version) = &report.version {
        out.push_str(&format!("    Version:  {version}\n"));
    }
    if let Some(secs) = report.uptime_secs {
        out.push_str(&format!("    Uptime:   {}\n", format_uptime(secs)));
    }
    if let Some(error) = &report.error {
        out.push_str(&format!("    Reason:   {error}\n\n  Start with: tutorlink serve\n"));
    }
    out.push('\n');
    out
}

/// Format seconds as `1d 2h 3m`, dropping leading zero units.
fn format_uptime(secs: u64) -> String {
    let (days, hours, minutes) = (secs / 86_400, secs % 86_400 / 3_600, secs % 3_600 / 60);
    match (days, hours) {
        (0, 0) => format!("{minutes}m"),
        (0, _) => format!("{hours}h {minutes}m"),
        _ => format!("{days}d {hours}h {minutes}m"),
    }
}
