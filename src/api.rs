// Holiday API client: two stateless GET requests against the OpenHolidays
// API, plus an in-process mock implementation for tests.

use crate::dates::current_year_span;
use crate::model::{Country, Holiday};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::error;

pub const DEFAULT_BASE_URL: &str = "https://openholidaysapi.org";
pub const DEFAULT_LANGUAGE: &str = "EN";

const COUNTRIES_PATH: &str = "Countries";
const HOLIDAYS_PATH: &str = "PublicHolidays";

// Error types for API requests. Transport, HTTP status, and response-shape
// failures stay distinguishable even though the view renders them alike.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),

    #[error("unexpected HTTP status {0}")]
    Status(u16),

    #[error("response decode error: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            ApiError::Status(status.as_u16())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

// Client configuration. No timeout knobs: the transport defaults apply.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub language: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }
}

// Tagged fetch result. Success is always non-empty; an empty response and a
// failed request are separate variants so callers can tell them apart,
// even though the current view collapses both to an empty list.
#[derive(Debug)]
pub enum FetchOutcome<T> {
    Success(Vec<T>),
    Empty,
    Failed(ApiError),
}

impl<T> FetchOutcome<T> {
    pub fn from_items(items: Vec<T>) -> Self {
        if items.is_empty() {
            FetchOutcome::Empty
        } else {
            FetchOutcome::Success(items)
        }
    }

    pub fn items(&self) -> &[T] {
        match self {
            FetchOutcome::Success(items) => items,
            _ => &[],
        }
    }

    pub fn into_items(self) -> Vec<T> {
        match self {
            FetchOutcome::Success(items) => items,
            _ => Vec::new(),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, FetchOutcome::Failed(_))
    }

    pub fn error(&self) -> Option<&ApiError> {
        match self {
            FetchOutcome::Failed(err) => Some(err),
            _ => None,
        }
    }
}

// The API seam the view depends on. Failures never come back as `Err`; the
// outcome carries them so the caller decides how visible they are.
#[async_trait]
pub trait HolidayApi: Send + Sync + 'static {
    // GET {base}/Countries?languageIsoCode=EN
    async fn fetch_countries(&self) -> FetchOutcome<Country>;

    // GET {base}/PublicHolidays with the country code and the current
    // calendar year as the date range.
    async fn fetch_public_holidays(&self, country_iso_code: &str) -> FetchOutcome<Holiday>;
}

// Query parameters for the countries endpoint.
pub fn countries_query(language: &str) -> Vec<(&'static str, String)> {
    vec![("languageIsoCode", language.to_string())]
}

// Query parameters for the holidays endpoint, in wire order.
pub fn holidays_query(
    country_iso_code: &str,
    from: NaiveDate,
    to: NaiveDate,
    language: &str,
) -> Vec<(&'static str, String)> {
    vec![
        ("countryIsoCode", country_iso_code.to_string()),
        ("validFrom", from.format("%Y-%m-%d").to_string()),
        ("validTo", to.format("%Y-%m-%d").to_string()),
        ("languageIsoCode", language.to_string()),
    ]
}

// Reqwest-backed client for the OpenHolidays API.
pub struct OpenHolidaysClient {
    config: ApiConfig,
    http: reqwest::Client,
}

impl OpenHolidaysClient {
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&'static str, String)],
    ) -> Result<Vec<T>, ApiError> {
        let url = format!("{}/{}", self.config.base_url.trim_end_matches('/'), path);
        let response = self.http.get(&url).query(query).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status(status.as_u16()));
        }

        // Decode from the body text so shape errors are reported as such
        // rather than as generic transport errors.
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|err| ApiError::Decode(err.to_string()))
    }
}

#[async_trait]
impl HolidayApi for OpenHolidaysClient {
    async fn fetch_countries(&self) -> FetchOutcome<Country> {
        let query = countries_query(&self.config.language);
        match self.get_json::<Country>(COUNTRIES_PATH, &query).await {
            Ok(items) => FetchOutcome::from_items(items),
            Err(err) => {
                error!(error = %err, "countries request failed");
                FetchOutcome::Failed(err)
            }
        }
    }

    async fn fetch_public_holidays(&self, country_iso_code: &str) -> FetchOutcome<Holiday> {
        let (from, to) = current_year_span();
        let query = holidays_query(country_iso_code, from, to, &self.config.language);
        match self.get_json::<Holiday>(HOLIDAYS_PATH, &query).await {
            Ok(items) => FetchOutcome::from_items(items),
            Err(err) => {
                error!(country = country_iso_code, error = %err, "holidays request failed");
                FetchOutcome::Failed(err)
            }
        }
    }
}

// Mock API for testing (scripted fixtures, failure injection, call log).
pub mod mock {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[derive(Default)]
    pub struct MockHolidayApi {
        countries: Mutex<Vec<Country>>,
        holidays: Mutex<HashMap<String, Vec<Holiday>>>,
        fail_next_countries: AtomicUsize,
        fail_next_holidays: AtomicUsize,
        delay_ms: AtomicUsize,
        countries_calls: AtomicUsize,
        holidays_calls: AtomicUsize,
        requested_codes: Mutex<Vec<String>>,
    }

    impl MockHolidayApi {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_countries(self, countries: Vec<Country>) -> Self {
            *self.countries.lock() = countries;
            self
        }

        pub fn set_countries(&self, countries: Vec<Country>) {
            *self.countries.lock() = countries;
        }

        pub fn set_holidays(&self, country_iso_code: &str, holidays: Vec<Holiday>) {
            self.holidays
                .lock()
                .insert(country_iso_code.to_string(), holidays);
        }

        // Fail the next `count` countries requests with a transport error.
        pub fn fail_next_countries(&self, count: usize) {
            self.fail_next_countries.store(count, Ordering::SeqCst);
        }

        // Fail the next `count` holidays requests with a 500.
        pub fn fail_next_holidays(&self, count: usize) {
            self.fail_next_holidays.store(count, Ordering::SeqCst);
        }

        // Simulated latency applied to every request.
        pub fn set_delay(&self, delay_ms: u64) {
            self.delay_ms.store(delay_ms as usize, Ordering::SeqCst);
        }

        pub fn countries_calls(&self) -> usize {
            self.countries_calls.load(Ordering::SeqCst)
        }

        pub fn holidays_calls(&self) -> usize {
            self.holidays_calls.load(Ordering::SeqCst)
        }

        // ISO codes of every holidays request, in call order.
        pub fn requested_codes(&self) -> Vec<String> {
            self.requested_codes.lock().clone()
        }

        async fn simulate_latency(&self) {
            let delay = self.delay_ms.load(Ordering::SeqCst);
            if delay > 0 {
                tokio::time::sleep(Duration::from_millis(delay as u64)).await;
            }
        }

        fn take_failure(counter: &AtomicUsize) -> bool {
            let remaining = counter.load(Ordering::SeqCst);
            if remaining > 0 {
                counter.store(remaining - 1, Ordering::SeqCst);
                true
            } else {
                false
            }
        }
    }

    #[async_trait]
    impl HolidayApi for MockHolidayApi {
        async fn fetch_countries(&self) -> FetchOutcome<Country> {
            self.countries_calls.fetch_add(1, Ordering::SeqCst);
            self.simulate_latency().await;

            if Self::take_failure(&self.fail_next_countries) {
                return FetchOutcome::Failed(ApiError::Network("simulated outage".to_string()));
            }

            FetchOutcome::from_items(self.countries.lock().clone())
        }

        async fn fetch_public_holidays(&self, country_iso_code: &str) -> FetchOutcome<Holiday> {
            self.holidays_calls.fetch_add(1, Ordering::SeqCst);
            self.requested_codes
                .lock()
                .push(country_iso_code.to_string());
            self.simulate_latency().await;

            if Self::take_failure(&self.fail_next_holidays) {
                return FetchOutcome::Failed(ApiError::Status(500));
            }

            let holidays = self
                .holidays
                .lock()
                .get(country_iso_code)
                .cloned()
                .unwrap_or_default();
            FetchOutcome::from_items(holidays)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockHolidayApi;
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_default_config_targets_openholidays() {
        let config = ApiConfig::default();
        assert_eq!(config.base_url, "https://openholidaysapi.org");
        assert_eq!(config.language, "EN");
    }

    #[tokio::test]
    async fn test_client_exposes_its_config() {
        let client = OpenHolidaysClient::new(ApiConfig::default()).expect("client builds");
        assert_eq!(client.config().base_url, DEFAULT_BASE_URL);
        assert_eq!(client.config().language, DEFAULT_LANGUAGE);
    }

    #[test]
    fn test_outcome_tags_empty_and_success() {
        let empty = FetchOutcome::<Country>::from_items(Vec::new());
        assert!(matches!(empty, FetchOutcome::Empty));
        assert!(empty.items().is_empty());

        let success = FetchOutcome::from_items(vec![Country::new("NL", "Netherlands")]);
        assert!(matches!(success, FetchOutcome::Success(_)));
        assert_eq!(success.items().len(), 1);
    }

    #[test]
    fn test_failed_outcome_collapses_to_empty_items() {
        let failed = FetchOutcome::<Holiday>::Failed(ApiError::Status(503));
        assert!(failed.is_failed());
        assert!(matches!(failed.error(), Some(ApiError::Status(503))));
        assert!(failed.into_items().is_empty());
    }

    #[test]
    fn test_countries_query_parameters() {
        assert_eq!(
            countries_query("EN"),
            vec![("languageIsoCode", "EN".to_string())]
        );
    }

    #[test]
    fn test_holidays_query_parameters_span_full_year() {
        let from = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let to = NaiveDate::from_ymd_opt(2025, 12, 31).unwrap();
        let query = holidays_query("DE", from, to, "EN");

        assert_eq!(
            query,
            vec![
                ("countryIsoCode", "DE".to_string()),
                ("validFrom", "2025-01-01".to_string()),
                ("validTo", "2025-12-31".to_string()),
                ("languageIsoCode", "EN".to_string()),
            ]
        );
    }

    #[test]
    fn test_mock_scripts_countries_and_counts_calls() {
        let api = MockHolidayApi::new().with_countries(vec![
            Country::new("NL", "Netherlands"),
            Country::new("DE", "Germany"),
        ]);

        let outcome = tokio_test::block_on(api.fetch_countries());
        assert_eq!(outcome.items().len(), 2);
        assert_eq!(api.countries_calls(), 1);
    }

    #[tokio::test]
    async fn test_mock_failure_injection_is_consumed() {
        let api = MockHolidayApi::new().with_countries(vec![Country::new("NL", "Netherlands")]);
        api.fail_next_countries(1);

        let failed = api.fetch_countries().await;
        assert!(failed.is_failed());

        // The failure budget is spent; the next call succeeds.
        let ok = api.fetch_countries().await;
        assert_eq!(ok.items().len(), 1);
        assert_eq!(api.countries_calls(), 2);
    }

    #[tokio::test]
    async fn test_mock_records_requested_codes() {
        let api = MockHolidayApi::new();
        api.set_holidays("NL", vec![Holiday::new("h1", "2025-12-25", "Christmas Day")]);

        let nl = api.fetch_public_holidays("NL").await;
        assert_eq!(nl.items().len(), 1);

        // Unscripted countries come back empty, not failed.
        let se = api.fetch_public_holidays("SE").await;
        assert!(matches!(se, FetchOutcome::Empty));

        assert_eq!(api.requested_codes(), vec!["NL", "SE"]);
        assert_eq!(api.holidays_calls(), 2);
    }
}
