use std::collections::BTreeSet;

use serde::{Deserialize, Deserializer};

pub const PROFESSION_DELIMITER: char = ';';

/// One parsed survey response.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub age: String,
    pub country: String,
    pub professions: BTreeSet<String>,
    /// Monthly amount in EUR. NaN when the source value was missing or not a number.
    pub salary: f64,
}

impl Row {
    pub fn new(
        age: impl Into<String>,
        country: impl Into<String>,
        professions: impl IntoIterator<Item = impl Into<String>>,
        salary: f64,
    ) -> Self {
        Self {
            age: age.into(),
            country: country.into(),
            professions: professions.into_iter().map(Into::into).collect(),
            salary,
        }
    }

    pub fn has_valid_salary(&self) -> bool {
        self.salary.is_finite()
    }

    pub fn has_profession(&self, profession: &str) -> bool {
        self.professions.contains(profession)
    }
}

/// Row as supplied by the load collaborator, before parsing.
///
/// Keys follow the survey export: `Age`, `Country`, `DevType`, `CompTotal`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawRow {
    #[serde(rename = "Age", default, deserialize_with = "null_as_empty")]
    pub age: String,
    #[serde(rename = "Country", default, deserialize_with = "null_as_empty")]
    pub country: String,
    #[serde(rename = "DevType", default, deserialize_with = "null_as_empty")]
    pub profession: String,
    #[serde(rename = "CompTotal", default)]
    pub salary: RawNumber,
}

/// JSON sources may carry the salary as a number or as text; `null` and any
/// other JSON value read as an invalid salary.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawNumber {
    Number(f64),
    Text(String),
    #[default]
    Missing,
    Other(serde_json::Value),
}

impl RawNumber {
    pub fn to_f64(&self) -> f64 {
        match self {
            RawNumber::Number(v) => *v,
            RawNumber::Text(s) => parse_salary(s),
            RawNumber::Missing | RawNumber::Other(_) => f64::NAN,
        }
    }
}

impl RawRow {
    pub fn parse(&self) -> Row {
        Row {
            age: self.age.clone(),
            country: self.country.clone(),
            professions: split_professions(&self.profession),
            salary: self.salary.to_f64(),
        }
    }
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

pub fn split_professions(field: &str) -> BTreeSet<String> {
    field
        .split(PROFESSION_DELIMITER)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// Blank or non-numeric text is an invalid salary, not zero.
pub fn parse_salary(text: &str) -> f64 {
    let t = text.trim();
    if t.is_empty() {
        return f64::NAN;
    }
    t.parse::<f64>().unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::{RawNumber, RawRow, parse_salary, split_professions};
    use pretty_assertions::assert_eq;

    #[test]
    fn professions_split_on_semicolon() {
        let p = split_professions("Developer, back-end;Developer, front-end; ;");
        let got: Vec<&str> = p.iter().map(String::as_str).collect();
        assert_eq!(got, vec!["Developer, back-end", "Developer, front-end"]);
    }

    #[test]
    fn invalid_salaries_become_nan() {
        assert!(parse_salary("").is_nan());
        assert!(parse_salary("n/a").is_nan());
        assert_eq!(parse_salary(" 4200.5 "), 4200.5);
    }

    #[test]
    fn raw_row_parses_into_row() {
        let raw = RawRow {
            age: "25-34 years old".to_string(),
            country: "Germany".to_string(),
            profession: "Dev;QA".to_string(),
            salary: RawNumber::Text("3000".to_string()),
        };
        let row = raw.parse();
        assert_eq!(row.country, "Germany");
        assert!(row.has_profession("QA"));
        assert!(row.has_valid_salary());
        assert_eq!(row.salary, 3000.0);
    }

    #[test]
    fn null_text_fields_read_as_empty() {
        let raw: RawRow = serde_json::from_str(
            r#"{"Age": null, "Country": "Chile", "DevType": null, "CompTotal": 3000}"#,
        )
        .unwrap();
        let row = raw.parse();
        assert_eq!(row.age, "");
        assert!(row.professions.is_empty());
        assert_eq!(row.salary, 3000.0);
    }

    #[test]
    fn unexpected_salary_values_are_invalid() {
        for json in [
            r#"{"Country": "Chile", "CompTotal": true}"#,
            r#"{"Country": "Chile", "CompTotal": null}"#,
            r#"{"Country": "Chile", "CompTotal": [1, 2]}"#,
            r#"{"Country": "Chile"}"#,
        ] {
            let raw: RawRow = serde_json::from_str(json).unwrap();
            assert!(!raw.parse().has_valid_salary(), "{json}");
        }
    }
}
