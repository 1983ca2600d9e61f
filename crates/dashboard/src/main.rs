//! `mbta-dashboard` -- headless MBTA delay dashboard.
//!
//! Fetches cities and trips from the backend, logs a summary, and for
//! Boston optionally runs the analysis notebooks, logging each job's
//! progress until every run has finished or Ctrl-C is pressed.
//!
//! # Environment variables
//!
//! | Variable               | Default                 | Description                            |
//! |------------------------|-------------------------|----------------------------------------|
//! | `BACKEND_URL`          | `http://127.0.0.1:5000` | Backend base URL                       |
//! | `POLL_INTERVAL_MS`     | `2000`                  | Milliseconds between status polls      |
//! | `REQUEST_TIMEOUT_SECS` | `30`                    | HTTP request timeout                   |
//! | `DASHBOARD_CITY`       | first listed city       | City to display                        |
//! | `RUN_NOTEBOOKS`        | --                      | Comma-separated notebook keys to run   |
//! | `RUST_LOG`             | `mbta_dashboard=info,mbta_jobs=info` | Log filter                |
//! | `LOG_FORMAT`           | `text`                  | `json` for JSON log lines              |

use mbta_dashboard::DashboardConfig;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mbta_dashboard=info,mbta_jobs=info".into()),
        )
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(tracing_subscriber::fmt::layer))
        .init();

    let config = DashboardConfig::from_env();

    tracing::info!(
        backend_url = %config.backend_url,
        poll_interval_ms = config.poll_interval.as_millis() as u64,
        notebooks = config.run_notebooks.len(),
        "Starting mbta-dashboard",
    );

    if let Err(e) = mbta_dashboard::run(config).await {
        tracing::error!(error = %e, "Dashboard failed");
        std::process::exit(1);
    }
}
