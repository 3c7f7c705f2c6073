//! Offline preparation of raw survey responses into the dashboard's row schema.
//!
//! Amounts are normalized to monthly EUR, outliers are dropped and country
//! names are renamed to the names used by the world boundary geometry.

use std::collections::BTreeMap;

use serde::Deserialize;
use tracing::{debug, info};

use crate::csv::{self, CsvError, CsvTable};
use crate::dataset::{AGE_COLUMN, COUNTRY_COLUMN, PROFESSION_COLUMN, SALARY_COLUMN};

pub const FREQUENCY_COLUMN: &str = "CompFreq";
pub const CURRENCY_COLUMN: &str = "Currency";

pub const WEEKS_PER_MONTH: f64 = 4.3333;
pub const MONTHS_PER_YEAR: f64 = 12.0;
/// Monthly amounts at or above this are treated as outliers.
pub const OUTLIER_LIMIT: f64 = 30_000.0;
pub const TARGET_CURRENCY: &str = "EUR";

/// Reference year of the survey and of the exchange rates applied to it.
pub const RATES_YEAR: u16 = 2018;
/// Eurostat `statinfo` of the annual average rate.
pub const AVERAGE_STATINFO: &str = "AVG";

/// Survey spelling -> boundary geometry spelling.
pub const COUNTRY_ALIASES: &[(&str, &str)] = &[
    ("United States of America", "USA"),
    ("United Kingdom of Great Britain and Northern Ireland", "England"),
    ("Russian Federation", "Russia"),
    ("Congo", "Democratic Republic of the Congo"),
    ("Lao People's Democratic Republic", "Laos"),
    ("Iran, Islamic Republic of...", "Iran"),
    ("Republic of Moldova", "Moldova"),
    ("Venezuela, Bolivarian Republic of...", "Venezuela"),
    ("Libyan Arab Jamahiriya", "Libya"),
    ("Côte d'Ivoire", "Ivory Coast"),
    ("Mauritius", "Mauritania"),
    ("Viet Nam", "Vietnam"),
    ("Serbia", "Republic of Serbia"),
];

#[derive(Debug)]
pub enum PrepareError {
    Csv(CsvError),
    Rates(serde_json::Error),
    RatesTable(String),
}

impl std::fmt::Display for PrepareError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrepareError::Csv(e) => write!(f, "survey csv error: {e}"),
            PrepareError::Rates(e) => write!(f, "exchange rates error: {e}"),
            PrepareError::RatesTable(msg) => write!(f, "exchange rates table error: {msg}"),
        }
    }
}

impl std::error::Error for PrepareError {}

impl From<CsvError> for PrepareError {
    fn from(e: CsvError) -> Self {
        PrepareError::Csv(e)
    }
}

/// Average yearly units of a currency per 1 EUR.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct ExchangeRates {
    rates: BTreeMap<String, f64>,
}

impl ExchangeRates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(text: &str) -> Result<Self, PrepareError> {
        serde_json::from_str(text).map_err(PrepareError::Rates)
    }

    /// Reads the Eurostat `ert_bil_eur_a` TSV export.
    ///
    /// The first column is `statinfo,unit,currency`, the others are years.
    /// Only `AVG` rows of `year` are kept; the first row per currency wins. A
    /// missing value (`:`) is stored as NaN, so amounts in that currency end
    /// up invalid and are dropped.
    pub fn from_eurostat_tsv(text: &str, year: u16) -> Result<Self, PrepareError> {
        let mut lines = text.lines().filter(|l| !l.trim().is_empty());
        let header = lines
            .next()
            .ok_or_else(|| PrepareError::RatesTable("empty table".to_string()))?;
        let column = header
            .split('\t')
            .position(|cell| cell.trim().parse::<u16>().ok() == Some(year))
            .ok_or_else(|| PrepareError::RatesTable(format!("no {year} column")))?;

        let mut rates = Self::new();
        for line in lines {
            let cells: Vec<&str> = line.split('\t').collect();
            let key: Vec<&str> = cells[0].split(',').map(str::trim).collect();
            let &[statinfo, _unit, currency] = key.as_slice() else {
                return Err(PrepareError::RatesTable(format!(
                    "expected statinfo,unit,currency, got {:?}",
                    cells[0]
                )));
            };
            if statinfo != AVERAGE_STATINFO {
                continue;
            }
            let rate = cells.get(column).map_or(f64::NAN, |v| parse_rate(v));
            rates.rates.entry(currency.to_string()).or_insert(rate);
        }
        debug!(year, currencies = rates.rates.len(), "read eurostat rates");
        Ok(rates)
    }

    /// Currencies missing from the 2018 reference table, added by hand.
    pub fn with_supplements(mut self) -> Self {
        self.rates.entry("CUP".to_string()).or_insert(32.66749);
        self.rates.entry("IMP".to_string()).or_insert(0.87553);
        self
    }

    pub fn insert(&mut self, currency: impl Into<String>, rate: f64) {
        self.rates.insert(currency.into(), rate);
    }

    pub fn rate(&self, currency: &str) -> Option<f64> {
        self.rates.get(currency).copied()
    }
}

/// Eurostat cells read like `"1.1810 "`, `"1.18 p"` (flagged) or `": "`.
fn parse_rate(cell: &str) -> f64 {
    cell.split_whitespace()
        .next()
        .and_then(|v| v.parse::<f64>().ok())
        .unwrap_or(f64::NAN)
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Frequency {
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    pub fn from_survey(s: &str) -> Self {
        match s.trim() {
            "Yearly" => Frequency::Yearly,
            "Weekly" => Frequency::Weekly,
            _ => Frequency::Monthly,
        }
    }

    pub fn to_monthly(&self, amount: f64) -> f64 {
        match self {
            Frequency::Yearly => amount / MONTHS_PER_YEAR,
            Frequency::Weekly => amount * WEEKS_PER_MONTH,
            Frequency::Monthly => amount,
        }
    }
}

/// One raw survey response; `None` marks a blank field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurveyResponse {
    pub age: Option<String>,
    pub comp_total: Option<f64>,
    pub comp_freq: Option<String>,
    pub currency: Option<String>,
    pub country: Option<String>,
    pub dev_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRow {
    pub age: String,
    pub country: String,
    pub dev_type: String,
    pub monthly: f64,
    pub currency: String,
}

pub fn rename_country(name: &str) -> &str {
    COUNTRY_ALIASES
        .iter()
        .find(|(from, _)| *from == name)
        .map(|(_, to)| *to)
        .unwrap_or(name)
}

/// Survey currencies read like `"EUR European Euro"`; only the code is kept.
pub fn currency_code(label: &str) -> &str {
    label.split_whitespace().next().unwrap_or("")
}

/// Returns `None` when the response is incomplete or an outlier.
pub fn prepare_response(response: &SurveyResponse, rates: &ExchangeRates) -> Option<PreparedRow> {
    let amount = response.comp_total?;
    let freq = response.comp_freq.as_deref()?;
    let currency = response.currency.as_deref()?;
    let country = response.country.as_deref()?;
    let dev_type = response.dev_type.as_deref()?;

    let monthly = Frequency::from_survey(freq).to_monthly(amount);
    let code = currency_code(currency);
    let (monthly, currency) = match rates.rate(code) {
        Some(rate) => (monthly / rate, TARGET_CURRENCY.to_string()),
        None => (monthly, code.to_string()),
    };
    if monthly.is_nan() || monthly >= OUTLIER_LIMIT {
        return None;
    }

    Some(PreparedRow {
        age: response.age.clone().unwrap_or_default(),
        country: rename_country(country).to_string(),
        dev_type: dev_type.to_string(),
        monthly,
        currency,
    })
}

pub fn prepare_responses(responses: &[SurveyResponse], rates: &ExchangeRates) -> Vec<PreparedRow> {
    let out: Vec<PreparedRow> = responses
        .iter()
        .filter_map(|r| prepare_response(r, rates))
        .collect();
    info!(
        responses = responses.len(),
        kept = out.len(),
        "prepared survey responses"
    );
    out
}

pub fn read_survey_csv(text: &str) -> Result<Vec<SurveyResponse>, PrepareError> {
    let table = CsvTable::parse(text)?;
    let age = table.column(AGE_COLUMN);
    let comp_total = table.require_column(SALARY_COLUMN)?;
    let comp_freq = table.require_column(FREQUENCY_COLUMN)?;
    let currency = table.require_column(CURRENCY_COLUMN)?;
    let country = table.require_column(COUNTRY_COLUMN)?;
    let dev_type = table.require_column(PROFESSION_COLUMN)?;

    let text_field = |rec: &[String], col: usize| -> Option<String> {
        let v = CsvTable::field(rec, col).trim();
        (!v.is_empty() && v != "NA").then(|| v.to_string())
    };

    let responses: Vec<SurveyResponse> = table
        .records
        .iter()
        .map(|rec| SurveyResponse {
            age: age.and_then(|c| text_field(rec, c)),
            comp_total: text_field(rec, comp_total).and_then(|v| v.parse::<f64>().ok()),
            comp_freq: text_field(rec, comp_freq),
            currency: text_field(rec, currency),
            country: text_field(rec, country),
            dev_type: text_field(rec, dev_type),
        })
        .collect();
    debug!(responses = responses.len(), "read survey csv");
    Ok(responses)
}

/// Writes prepared rows as CSV readable by `Dataset::from_csv_str`.
pub fn write_prepared_csv(rows: &[PreparedRow]) -> String {
    let mut out = String::new();
    csv::write_record(
        &mut out,
        &[
            AGE_COLUMN,
            SALARY_COLUMN,
            CURRENCY_COLUMN,
            COUNTRY_COLUMN,
            PROFESSION_COLUMN,
        ],
    );
    for r in rows {
        let monthly = r.monthly.to_string();
        csv::write_record(
            &mut out,
            &[
                r.age.as_str(),
                monthly.as_str(),
                r.currency.as_str(),
                r.country.as_str(),
                r.dev_type.as_str(),
            ],
        );
    }
    out
}
