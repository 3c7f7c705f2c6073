use dataset::{ALL, Row};

/// One filter control: either disabled (`"All"`) or restricted to a value.
///
/// Values are not checked against the dataset; an unknown value simply
/// matches no rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Filter {
    #[default]
    All,
    Only(String),
}

impl Filter {
    pub fn parse(value: &str) -> Self {
        if value == ALL {
            Filter::All
        } else {
            Filter::Only(value.to_string())
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Filter::All)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Filter::All => ALL,
            Filter::Only(v) => v,
        }
    }

    /// Exact match of a single-valued field.
    pub fn matches(&self, value: &str) -> bool {
        match self {
            Filter::All => true,
            Filter::Only(v) => v == value,
        }
    }
}

impl From<&str> for Filter {
    fn from(value: &str) -> Self {
        Filter::parse(value)
    }
}

impl From<String> for Filter {
    fn from(value: String) -> Self {
        if value == ALL {
            Filter::All
        } else {
            Filter::Only(value)
        }
    }
}

impl std::fmt::Display for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FilterState {
    pub age: Filter,
    pub profession: Filter,
}

impl FilterState {
    pub fn new(age: impl Into<Filter>, profession: impl Into<Filter>) -> Self {
        Self {
            age: age.into(),
            profession: profession.into(),
        }
    }

    /// Age is compared exactly; profession must be one of the row's professions.
    pub fn matches(&self, row: &Row) -> bool {
        let age_ok = self.age.matches(&row.age);
        let profession_ok = match &self.profession {
            Filter::All => true,
            Filter::Only(p) => row.has_profession(p),
        };
        age_ok && profession_ok
    }
}
