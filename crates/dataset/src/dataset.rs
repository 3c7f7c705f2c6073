use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::debug;

use crate::csv::{CsvError, CsvTable};
use crate::ids::CountryId;
use crate::row::{RawRow, Row, parse_salary, split_professions};

/// Option value that disables a filter.
pub const ALL: &str = "All";

pub const AGE_COLUMN: &str = "Age";
pub const COUNTRY_COLUMN: &str = "Country";
pub const PROFESSION_COLUMN: &str = "DevType";
pub const SALARY_COLUMN: &str = "CompTotal";

#[derive(Debug)]
pub enum DatasetError {
    Csv(CsvError),
    Json(serde_json::Error),
}

impl std::fmt::Display for DatasetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatasetError::Csv(e) => write!(f, "dataset csv error: {e}"),
            DatasetError::Json(e) => write!(f, "dataset json error: {e}"),
        }
    }
}

impl std::error::Error for DatasetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DatasetError::Csv(e) => Some(e),
            DatasetError::Json(e) => Some(e),
        }
    }
}

impl From<CsvError> for DatasetError {
    fn from(e: CsvError) -> Self {
        DatasetError::Csv(e)
    }
}

impl From<serde_json::Error> for DatasetError {
    fn from(e: serde_json::Error) -> Self {
        DatasetError::Json(e)
    }
}

/// Values offered by the age and profession filter controls, each led by `"All"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub ages: Vec<String>,
    pub professions: Vec<String>,
}

/// Immutable list of parsed rows.
///
/// Countries are interned once at construction: `CountryId(i)` names the i-th
/// country in ascending name order, so iteration over ids is deterministic.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    rows: Vec<Row>,
    row_countries: Vec<CountryId>,
    countries: Vec<String>,
    by_name: BTreeMap<String, CountryId>,
}

impl Dataset {
    pub fn from_rows(rows: Vec<Row>) -> Self {
        let names: BTreeSet<&str> = rows.iter().map(|r| r.country.as_str()).collect();
        let countries: Vec<String> = names.into_iter().map(str::to_string).collect();
        let by_name: BTreeMap<String, CountryId> = countries
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), CountryId::new(i as u32)))
            .collect();
        let row_countries = rows.iter().map(|r| by_name[r.country.as_str()]).collect();

        Self {
            rows,
            row_countries,
            countries,
            by_name,
        }
    }

    pub fn from_raw_rows<'a>(raw: impl IntoIterator<Item = &'a RawRow>) -> Self {
        Self::from_rows(raw.into_iter().map(RawRow::parse).collect())
    }

    /// Parses CSV text with a header row. Only `Age`, `Country`, `DevType` and
    /// `CompTotal` are read; other columns are ignored.
    pub fn from_csv_str(text: &str) -> Result<Self, DatasetError> {
        let table = CsvTable::parse(text)?;
        let age = table.require_column(AGE_COLUMN)?;
        let country = table.require_column(COUNTRY_COLUMN)?;
        let profession = table.require_column(PROFESSION_COLUMN)?;
        let salary = table.require_column(SALARY_COLUMN)?;

        let rows: Vec<Row> = table
            .records
            .iter()
            .map(|rec| Row {
                age: CsvTable::field(rec, age).to_string(),
                country: CsvTable::field(rec, country).to_string(),
                professions: split_professions(CsvTable::field(rec, profession)),
                salary: parse_salary(CsvTable::field(rec, salary)),
            })
            .collect();

        let dataset = Self::from_rows(rows);
        dataset.log_loaded("csv");
        Ok(dataset)
    }

    /// Parses a JSON array of records keyed like the CSV header.
    pub fn from_json_str(text: &str) -> Result<Self, DatasetError> {
        let raw: Vec<RawRow> = serde_json::from_str(text)?;
        let dataset = Self::from_raw_rows(&raw);
        dataset.log_loaded("json");
        Ok(dataset)
    }

    fn log_loaded(&self, source: &str) {
        let invalid = self.rows.iter().filter(|r| !r.has_valid_salary()).count();
        debug!(
            source,
            rows = self.rows.len(),
            countries = self.countries.len(),
            invalid_salaries = invalid,
            "dataset loaded"
        );
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterates rows together with their interned country.
    pub fn rows_with_country(&self) -> impl Iterator<Item = (CountryId, &Row)> + '_ {
        self.row_countries.iter().copied().zip(self.rows.iter())
    }

    /// Distinct countries in ascending order; position is the `CountryId` index.
    pub fn countries(&self) -> &[String] {
        &self.countries
    }

    pub fn country_count(&self) -> usize {
        self.countries.len()
    }

    pub fn country_id(&self, name: &str) -> Option<CountryId> {
        self.by_name.get(name).copied()
    }

    pub fn country_name(&self, id: CountryId) -> Option<&str> {
        self.countries.get(id.index() as usize).map(String::as_str)
    }

    pub fn country_ids(&self) -> impl Iterator<Item = CountryId> + '_ {
        (0..self.countries.len() as u32).map(CountryId::new)
    }

    pub fn filter_options(&self) -> FilterOptions {
        let ages: BTreeSet<&str> = self
            .rows
            .iter()
            .map(|r| r.age.as_str())
            .filter(|a| !a.is_empty())
            .collect();
        let professions: BTreeSet<&str> = self
            .rows
            .iter()
            .flat_map(|r| r.professions.iter().map(String::as_str))
            .collect();

        FilterOptions {
            ages: with_all(ages),
            professions: with_all(professions),
        }
    }
}

fn with_all(values: BTreeSet<&str>) -> Vec<String> {
    std::iter::once(ALL)
        .chain(values)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{ALL, Dataset, DatasetError};
    use crate::csv::CsvError;
    use crate::row::Row;
    use pretty_assertions::assert_eq;

    const CSV: &str = "\
,Age,CompTotal,CompFreq,Currency,Country,DevType
0,25-34 years old,3000,Monthly,EUR,Germany,\"Developer, back-end;QA\"
1,,5000,Monthly,EUR,France,Developer
2,18-24 years old,,Monthly,EUR,Germany,QA
";

    #[test]
    fn loads_csv_and_interns_countries_in_order() {
        let ds = Dataset::from_csv_str(CSV).unwrap();
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.countries(), &["France".to_string(), "Germany".to_string()]);

        let germany = ds.country_id("Germany").unwrap();
        assert_eq!(germany.index(), 1);
        assert_eq!(ds.country_name(germany), Some("Germany"));
        assert_eq!(ds.country_id("Atlantis"), None);

        let with_ids: Vec<(u32, &str)> = ds
            .rows_with_country()
            .map(|(id, r)| (id.index(), r.country.as_str()))
            .collect();
        assert_eq!(with_ids, vec![(1, "Germany"), (0, "France"), (1, "Germany")]);
        assert!(!ds.rows()[2].has_valid_salary());
    }

    #[test]
    fn filter_options_skip_blank_ages_and_split_professions() {
        let ds = Dataset::from_csv_str(CSV).unwrap();
        let opts = ds.filter_options();
        assert_eq!(opts.ages, vec![ALL, "18-24 years old", "25-34 years old"]);
        assert_eq!(
            opts.professions,
            vec![ALL, "Developer", "Developer, back-end", "QA"]
        );
    }

    #[test]
    fn missing_column_is_reported() {
        let err = Dataset::from_csv_str("Age,Country\n1,X\n").unwrap_err();
        assert!(matches!(
            err,
            DatasetError::Csv(CsvError::MissingColumn(ref c)) if c == "DevType"
        ));
    }

    #[test]
    fn loads_json_records_with_numeric_or_text_salaries() {
        let json = r#"[
            {"Age": "25-34", "Country": "X", "DevType": "Dev", "CompTotal": 3000},
            {"Age": "35-44", "Country": "X", "DevType": "Dev", "CompTotal": "5000"},
            {"Age": "25-34", "Country": "Y", "DevType": "Dev", "CompTotal": null},
            {"Country": "Z"}
        ]"#;
        let ds = Dataset::from_json_str(json).unwrap();
        let salaries: Vec<bool> = ds.rows().iter().map(Row::has_valid_salary).collect();
        assert_eq!(salaries, vec![true, true, false, false]);
        assert_eq!(ds.rows()[1].salary, 5000.0);
        assert_eq!(ds.country_count(), 3);

        assert!(Dataset::from_json_str("{").is_err());
    }

    #[test]
    fn json_nulls_and_odd_salaries_do_not_fail_the_load() {
        let json = r#"[
            {"Age": null, "Country": "X", "DevType": "Dev", "CompTotal": 3000},
            {"Age": "25-34", "Country": "Y", "DevType": null, "CompTotal": true}
        ]"#;
        let ds = Dataset::from_json_str(json).unwrap();
        assert_eq!(ds.len(), 2);
        assert!(ds.rows()[0].has_valid_salary());
        assert!(!ds.rows()[1].has_valid_salary());
        assert_eq!(ds.filter_options().ages, vec!["All", "25-34"]);
    }
}
