//! Minimal RFC 4180 style CSV reader/writer.
//!
//! Supports quoted fields (with `""` escapes and embedded separators/newlines),
//! LF and CRLF line endings. The first record is the header.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CsvError {
    Empty,
    UnterminatedQuote { line: usize },
    MissingColumn(String),
}

impl std::fmt::Display for CsvError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CsvError::Empty => write!(f, "csv input has no header row"),
            CsvError::UnterminatedQuote { line } => {
                write!(f, "unterminated quoted field starting on line {line}")
            }
            CsvError::MissingColumn(name) => write!(f, "missing csv column: {name}"),
        }
    }
}

impl std::error::Error for CsvError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub records: Vec<Vec<String>>,
}

impl CsvTable {
    pub fn parse(text: &str) -> Result<Self, CsvError> {
        let mut records = parse_records(text.strip_prefix('\u{feff}').unwrap_or(text))?;
        if records.is_empty() {
            return Err(CsvError::Empty);
        }
        let headers = records.remove(0);
        Ok(Self { headers, records })
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn require_column(&self, name: &str) -> Result<usize, CsvError> {
        self.column(name)
            .ok_or_else(|| CsvError::MissingColumn(name.to_string()))
    }

    /// Field `col` of `record`; short records read as empty.
    pub fn field<'a>(record: &'a [String], col: usize) -> &'a str {
        record.get(col).map(String::as_str).unwrap_or("")
    }
}

fn parse_records(text: &str) -> Result<Vec<Vec<String>>, CsvError> {
    let mut records: Vec<Vec<String>> = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut quote_line = 0usize;
    let mut line = 1usize;

    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    field.push(c);
                }
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' if field.is_empty() => {
                in_quotes = true;
                quote_line = line;
            }
            ',' => record.push(std::mem::take(&mut field)),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                line += 1;
                record.push(std::mem::take(&mut field));
                push_record(&mut records, std::mem::take(&mut record));
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(CsvError::UnterminatedQuote { line: quote_line });
    }
    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        push_record(&mut records, record);
    }
    Ok(records)
}

fn push_record(records: &mut Vec<Vec<String>>, record: Vec<String>) {
    // Blank lines carry a single empty field.
    if record.len() == 1 && record[0].is_empty() {
        return;
    }
    records.push(record);
}

/// Appends one CSV record (with trailing newline) to `out`.
pub fn write_record<S: AsRef<str>>(out: &mut String, fields: &[S]) {
    for (i, f) in fields.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        let f = f.as_ref();
        if f.contains([',', '"', '\n', '\r']) {
            out.push('"');
            out.push_str(&f.replace('"', "\"\""));
            out.push('"');
        } else {
            out.push_str(f);
        }
    }
    out.push('\n');
}
