use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use reqwest::header::ACCEPT;
use serde::Deserialize;

use crate::error::SourceError;
use crate::mock;
use crate::models::{DailySummary, DashboardBundle, TrendBundle};

pub const DASHBOARD_PATH: &str = "/api/dashboard";

/// Anything that can produce a dashboard bundle once.
pub trait BundleSource {
    fn describe(&self) -> String;

    async fn fetch(&self) -> Result<DashboardBundle, SourceError>;
}

/// Payload as served by the backend; `notes` may be omitted.
#[derive(Debug, Deserialize)]
struct BackendBundle {
    summary: DailySummary,
    trend: TrendBundle,
    notes: Option<Vec<String>>,
}

impl From<BackendBundle> for DashboardBundle {
    fn from(payload: BackendBundle) -> Self {
        DashboardBundle {
            summary: payload.summary,
            trend: payload.trend,
            notes: payload.notes.unwrap_or_else(default_backend_notes),
        }
    }
}

fn default_backend_notes() -> Vec<String> {
    vec![
        "백엔드 번들 API에서 집계된 데이터를 불러왔습니다.".to_string(),
        "혈압/체중 변화, 칼로리 초과, 복약 누락을 기반으로 리스크를 계산합니다.".to_string(),
    ]
}

fn decode(bytes: &[u8]) -> Result<DashboardBundle, SourceError> {
    let payload: BackendBundle = serde_json::from_slice(bytes)?;
    Ok(payload.into())
}

pub struct HttpBundleSource {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpBundleSource {
    pub fn new(backend_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: format!("{}{DASHBOARD_PATH}", backend_url.trim_end_matches('/')),
        }
    }
}

impl BundleSource for HttpBundleSource {
    fn describe(&self) -> String {
        self.endpoint.clone()
    }

    async fn fetch(&self) -> Result<DashboardBundle, SourceError> {
        let response = self
            .client
            .get(&self.endpoint)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        decode(&body)
    }
}

pub struct FileBundleSource {
    path: PathBuf,
}

impl FileBundleSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl BundleSource for FileBundleSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn fetch(&self) -> Result<DashboardBundle, SourceError> {
        let bytes = tokio::fs::read(&self.path).await?;
        decode(&bytes)
    }
}

/// Loads a bundle from `source`, falling back to the mock bundle anchored on
/// `today` when the source fails. Never returns an error.
pub async fn load_bundle<S: BundleSource>(source: &S, today: NaiveDate) -> DashboardBundle {
    match source.fetch().await {
        Ok(bundle) => {
            for issue in bundle.trend.validate() {
                tracing::warn!(source = %source.describe(), %issue, "trend series out of shape");
            }
            tracing::info!(
                source = %source.describe(),
                seven_day = bundle.trend.seven_day.len(),
                thirty_day = bundle.trend.thirty_day.len(),
                "loaded dashboard bundle"
            );
            bundle
        }
        Err(error) => {
            tracing::warn!(
                source = %source.describe(),
                error = %error,
                "bundle unavailable, using mock data"
            );
            mock::mock_bundle(today)
        }
    }
}
