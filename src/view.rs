// View component: owns the selected country code, drives the countries and
// holidays queries through the shared cache, and projects cache state onto a
// renderable screen. Fetch-on-render: `refresh` is safe to call every pass
// because the cache deduplicates and serves cached successes.

use std::sync::Arc;

use crate::api::{FetchOutcome, HolidayApi};
use crate::dates::format_date;
use crate::model::{Country, Holiday};
use crate::query::{QueryCache, QueryStatus};

pub const DEFAULT_COUNTRY: &str = "NL";

// Cache key space for this view: one countries entry, one holidays entry per
// country code. A selection change moves the view to a different key; the
// old key's entry stays cached and is never displayed for the new selection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    Countries,
    Holidays { country: String },
}

// Payload stored per cache entry.
#[derive(Debug, Clone)]
pub enum QueryData {
    Countries(Vec<Country>),
    Holidays(Vec<Holiday>),
}

impl QueryData {
    pub fn as_countries(&self) -> &[Country] {
        match self {
            QueryData::Countries(countries) => countries,
            QueryData::Holidays(_) => &[],
        }
    }

    pub fn as_holidays(&self) -> &[Holiday] {
        match self {
            QueryData::Holidays(holidays) => holidays,
            QueryData::Countries(_) => &[],
        }
    }
}

pub type HolidayQueryCache = QueryCache<QueryKey, QueryData>;

// One dropdown entry: value is the ISO code, label the display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

// One holiday list entry, keyed by the holiday id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HolidayRow {
    pub id: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MainScreen {
    pub options: Vec<SelectOption>,
    pub selected: String,
    pub holidays_loading: bool,
    pub holidays: Vec<HolidayRow>,
}

// Render priority: countries loading wins, then countries error, then the
// main view with its own transient holidays-loading indicator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Loading,
    Error(String),
    Main(MainScreen),
}

pub struct HolidaysView {
    api: Arc<dyn HolidayApi>,
    cache: Arc<HolidayQueryCache>,
    selected: String,
}

impl HolidaysView {
    pub fn new(api: Arc<dyn HolidayApi>, cache: Arc<HolidayQueryCache>) -> Self {
        Self {
            api,
            cache,
            selected: DEFAULT_COUNTRY.to_string(),
        }
    }

    pub fn selected(&self) -> &str {
        &self.selected
    }

    // Update the selection. The holidays query key follows it on the next
    // refresh; nothing is fetched here.
    pub fn select(&mut self, country_iso_code: &str) {
        self.selected = country_iso_code.to_string();
    }

    fn holidays_key(&self) -> QueryKey {
        QueryKey::Holidays {
            country: self.selected.clone(),
        }
    }

    // Ensure the queries this view renders from. Countries always; holidays
    // only once the countries query has succeeded and a selection exists.
    pub fn refresh(&self) {
        let api = Arc::clone(&self.api);
        self.cache.fetch(QueryKey::Countries, move || async move {
            match api.fetch_countries().await {
                FetchOutcome::Failed(error) => Err(error.to_string()),
                outcome => Ok(QueryData::Countries(outcome.into_items())),
            }
        });

        if self.selected.is_empty() {
            return;
        }
        if !self.cache.state(&QueryKey::Countries).is_success() {
            return;
        }

        let api = Arc::clone(&self.api);
        let country = self.selected.clone();
        self.cache.fetch(self.holidays_key(), move || async move {
            match api.fetch_public_holidays(&country).await {
                FetchOutcome::Failed(error) => Err(error.to_string()),
                outcome => Ok(QueryData::Holidays(outcome.into_items())),
            }
        });
    }

    // Project the current cache state onto a screen. A failed holidays query
    // renders as an empty list; only a countries failure is surfaced.
    pub fn screen(&self) -> Screen {
        let countries = self.cache.state(&QueryKey::Countries);
        match countries.status {
            QueryStatus::Idle | QueryStatus::Loading => Screen::Loading,
            QueryStatus::Error => Screen::Error(
                countries
                    .error
                    .unwrap_or_else(|| "unknown error".to_string()),
            ),
            QueryStatus::Success => {
                let options = countries
                    .value
                    .as_ref()
                    .map(|data| data.as_countries())
                    .unwrap_or(&[])
                    .iter()
                    .map(|country| SelectOption {
                        value: country.iso_code.clone(),
                        label: country.display_name().to_string(),
                    })
                    .collect();

                let holidays_state = self.cache.state(&self.holidays_key());
                let holidays = if holidays_state.is_success() {
                    holidays_state
                        .value
                        .as_ref()
                        .map(|data| data.as_holidays())
                        .unwrap_or(&[])
                        .iter()
                        .map(|holiday| HolidayRow {
                            id: holiday.id.clone(),
                            label: format!(
                                "{} - {}",
                                format_date(&holiday.end_date),
                                holiday.display_name()
                            ),
                        })
                        .collect()
                } else {
                    Vec::new()
                };

                Screen::Main(MainScreen {
                    options,
                    selected: self.selected.clone(),
                    holidays_loading: holidays_state.is_loading(),
                    holidays,
                })
            }
        }
    }

    // True when no query this view depends on is loading or still unclaimed.
    pub fn is_settled(&self) -> bool {
        let countries = self.cache.state(&QueryKey::Countries);
        match countries.status {
            QueryStatus::Idle | QueryStatus::Loading => false,
            QueryStatus::Error => true,
            QueryStatus::Success => {
                if self.selected.is_empty() {
                    return true;
                }
                let holidays = self.cache.state(&self.holidays_key());
                holidays.is_success() || holidays.is_error()
            }
        }
    }

    // Wait for the next transition on any in-flight query this view renders
    // from. Returns immediately when nothing is in flight, so callers loop
    // refresh -> is_settled -> changed without risk of waiting on a query
    // that was never claimed.
    pub async fn changed(&self) {
        let mut loading = Vec::new();
        for key in [QueryKey::Countries, self.holidays_key()] {
            if let Some(mut receiver) = self.cache.subscribe(&key) {
                if receiver.borrow_and_update().is_loading() {
                    loading.push(receiver);
                }
            }
        }

        let mut receivers = loading.into_iter();
        match (receivers.next(), receivers.next()) {
            (Some(mut first), Some(mut second)) => {
                tokio::select! {
                    _ = first.changed() => {}
                    _ = second.changed() => {}
                }
            }
            (Some(mut only), None) => {
                let _ = only.changed().await;
            }
            _ => {}
        }
    }

    // Drive refreshes until both queries have settled for the current
    // selection.
    pub async fn settle(&self) {
        loop {
            self.refresh();
            if self.is_settled() {
                return;
            }
            self.changed().await;
        }
    }
}

// Case-insensitive match of user input against the dropdown option values.
pub fn parse_selection(input: &str, options: &[SelectOption]) -> Option<String> {
    let wanted = input.trim();
    options
        .iter()
        .find(|option| option.value.eq_ignore_ascii_case(wanted))
        .map(|option| option.value.clone())
}

// Plain-text rendering of a screen for the terminal front end.
pub fn render_text(screen: &Screen) -> String {
    match screen {
        Screen::Loading => "Public Holidays\n\nLoading...\n".to_string(),
        Screen::Error(_) => "Public Holidays\n\nError loading countries.\n".to_string(),
        Screen::Main(main) => {
            let mut out = String::from("Public Holidays\n\nCountries:\n");
            for option in &main.options {
                let marker = if option.value == main.selected { '>' } else { ' ' };
                out.push_str(&format!("{marker} [{}] {}\n", option.value, option.label));
            }
            out.push('\n');
            if main.holidays_loading {
                out.push_str("Loading holidays...\n");
            } else {
                for row in &main.holidays {
                    out.push_str(&format!("  {}\n", row.label));
                }
            }
            out
        }
    }
}
