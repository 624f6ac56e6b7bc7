use crate::driver::DataSource;
use crate::error::Result;
use crate::schema::{DetailRow, RegionRecord, SummaryRow};
use crate::walker::to_iso;
use chrono::NaiveDate;
use log::debug;
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;

pub const DEFAULT_NAMES_URL: &str = "https://s3-st-graphics-json.s3-ap-southeast-1.amazonaws.com/17aJc-9u2H_NRBGKsdbYIzQ-K87X1P4riSew1MBoGcVo/687669852.json";
pub const DEFAULT_SUMMARY_URL: &str =
    "https://s3-st-graphics-json.s3-ap-southeast-1.amazonaws.com/2019-ncov/timeseries.json";
pub const DEFAULT_DETAIL_BASE_URL: &str =
    "https://s3-st-graphics-json.s3-ap-southeast-1.amazonaws.com/2019-ncov/cities-timeseries/";

/// Blocking [`DataSource`] over the published S3 feeds. Per-day detail lives
/// at `<base>/<YYYY-MM-DD>.json`.
pub struct HttpSource {
    client: Client,
    names_url: String,
    summary_url: String,
    detail_base_url: String,
}

impl HttpSource {
    pub fn new() -> Self {
        Self::with_urls(
            DEFAULT_NAMES_URL,
            DEFAULT_SUMMARY_URL,
            DEFAULT_DETAIL_BASE_URL,
        )
    }

    pub fn with_urls(
        names_url: impl Into<String>,
        summary_url: impl Into<String>,
        detail_base_url: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            names_url: names_url.into(),
            summary_url: summary_url.into(),
            detail_base_url: detail_base_url.into(),
        }
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!("fetching {}", url);
        let response = self.client.get(url).send()?.error_for_status()?;
        Ok(response.json()?)
    }
}

impl Default for HttpSource {
    fn default() -> Self {
        Self::new()
    }
}

impl DataSource for HttpSource {
    fn regions(&self) -> Result<Vec<RegionRecord>> {
        self.get_json(&self.names_url)
    }

    fn summary(&self) -> Result<Vec<SummaryRow>> {
        self.get_json(&self.summary_url)
    }

    fn detail(&self, date: NaiveDate) -> Result<Vec<DetailRow>> {
        let url = format!("{}{}.json", self.detail_base_url, to_iso(date));
        self.get_json(&url)
    }
}
