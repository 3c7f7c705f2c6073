use std::fs;
use std::path::Path;

use dataset::Dataset;
use dataset::prepare::{self, ExchangeRates};
use explorer::{Explorer, FilterState, Toggle};
use layers::{Choropleth, PresentationConfig, distribution_for, legend, violin_plot};
use serde::Serialize;
use tracing::{info, warn};

/// Reads a dataset file; `.json` is a record array, anything else is CSV.
pub fn load_dataset(path: &Path) -> Result<Dataset, String> {
    let text = fs::read_to_string(path).map_err(|e| format!("read {path:?}: {e}"))?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let dataset = if is_json {
        Dataset::from_json_str(&text)
    } else {
        Dataset::from_csv_str(&text)
    };
    let dataset = dataset.map_err(|e| format!("{path:?}: {e}"))?;
    info!(rows = dataset.len(), countries = dataset.country_count(), "loaded dataset");
    Ok(dataset)
}

pub fn load_config(path: Option<&Path>) -> Result<PresentationConfig, String> {
    let Some(path) = path else {
        return Ok(PresentationConfig::default());
    };
    let text = fs::read_to_string(path).map_err(|e| format!("read {path:?}: {e}"))?;
    PresentationConfig::from_json_str(&text).map_err(|e| format!("{path:?}: {e}"))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DomainSummary {
    pub min: f64,
    pub max: f64,
    pub min_country: String,
    pub max_country: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountrySummary {
    pub country: String,
    pub responses: usize,
    pub mean: Option<f64>,
    pub color: String,
}

/// Derived state of one filter + selection, as printed by `summary`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub age: String,
    pub profession: String,
    pub domain: Option<DomainSummary>,
    pub countries: Vec<CountrySummary>,
    pub selection: Vec<String>,
    pub rejected: Vec<String>,
    pub legend: layers::Legend,
    pub violin: layers::ViolinPlot,
}

pub fn summarize(
    dataset: Dataset,
    config: &PresentationConfig,
    filter: FilterState,
    select: &[String],
) -> Summary {
    let mut ex = Explorer::new(dataset);
    ex.set_filter(filter);

    let mut rejected = Vec::new();
    for country in select {
        if ex.is_selected(country) {
            continue;
        }
        if ex.toggle(country) == Toggle::Rejected {
            warn!(country = country.as_str(), "cannot select country without data");
            rejected.push(country.clone());
        }
    }

    let domain = ex.color_scale().domain().map(|d| DomainSummary {
        min: d.min,
        max: d.max,
        min_country: ex.dataset().country_name(d.min_country).unwrap_or_default().to_string(),
        max_country: ex.dataset().country_name(d.max_country).unwrap_or_default().to_string(),
    });

    let map = Choropleth::new(&ex);
    let countries = map
        .colors()
        .into_iter()
        .map(|(name, color)| CountrySummary {
            country: name.to_string(),
            responses: ex.salaries_for(name).len(),
            mean: ex.mean_for(name),
            color: color.css(config),
        })
        .collect();

    Summary {
        age: ex.filter().age.to_string(),
        profession: ex.filter().profession.to_string(),
        domain,
        countries,
        selection: ex.selected_names().into_iter().map(str::to_string).collect(),
        rejected,
        legend: legend(ex.color_scale(), &config.legend),
        violin: violin_plot(&distribution_for(&ex, ex.selection()), config),
    }
}

pub fn cmd_summary(
    data: &Path,
    config: &PresentationConfig,
    filter: FilterState,
    select: &[String],
) -> Result<String, String> {
    let dataset = load_dataset(data)?;
    let summary = summarize(dataset, config, filter, select);
    serde_json::to_string_pretty(&summary).map_err(|e| format!("encode summary: {e}"))
}

pub fn cmd_options(data: &Path) -> Result<String, String> {
    let dataset = load_dataset(data)?;
    serde_json::to_string_pretty(&dataset.filter_options())
        .map_err(|e| format!("encode options: {e}"))
}

/// Exchange rates from a Eurostat `.tsv` export (average rates of
/// `year`), or from a JSON map of currency code to units per EUR.
pub fn load_rates(path: &Path, year: u16) -> Result<ExchangeRates, String> {
    let text = fs::read_to_string(path).map_err(|e| format!("read {path:?}: {e}"))?;
    let is_tsv = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("tsv"));
    let rates = if is_tsv {
        ExchangeRates::from_eurostat_tsv(&text, year)
    } else {
        ExchangeRates::from_json_str(&text)
    };
    rates.map_err(|e| format!("{path:?}: {e}"))
}

/// Returns the number of rows written.
pub fn cmd_prepare(
    survey: &Path,
    out: &Path,
    rates: Option<&Path>,
    rates_year: u16,
) -> Result<usize, String> {
    let text = fs::read_to_string(survey).map_err(|e| format!("read {survey:?}: {e}"))?;
    let responses = prepare::read_survey_csv(&text).map_err(|e| format!("{survey:?}: {e}"))?;

    let rates = match rates {
        Some(path) => load_rates(path, rates_year)?,
        None => ExchangeRates::new(),
    }
    .with_supplements();

    let rows = prepare::prepare_responses(&responses, &rates);
    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| format!("create {parent:?}: {e}"))?;
    }
    fs::write(out, prepare::write_prepared_csv(&rows)).map_err(|e| format!("write {out:?}: {e}"))?;
    info!(rows = rows.len(), out = ?out, "wrote prepared dataset");
    Ok(rows.len())
}

#[cfg(test)]
mod tests {
    use super::{
        cmd_options, cmd_prepare, cmd_summary, load_config, load_dataset, load_rates, summarize,
    };
    use dataset::Dataset;
    use dataset::prepare::RATES_YEAR;
    use explorer::FilterState;
    use layers::PresentationConfig;
    use serde_json::Value;
    use std::fs;

    const DATA: &str = "Age,Country,DevType,CompTotal\n\
25-34,X,Dev;QA,3000\n\
35-44,X,Dev,5000\n\
25-34,Y,Dev,1000\n";

    #[test]
    fn summary_reports_domain_colors_and_selection() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        fs::write(&path, DATA).unwrap();

        let select = vec!["Y".to_string(), "Z".to_string()];
        let out = cmd_summary(
            &path,
            &PresentationConfig::default(),
            FilterState::default(),
            &select,
        )
        .unwrap();
        let v: Value = serde_json::from_str(&out).unwrap();

        assert_eq!(v["domain"]["min"], 1000.0);
        assert_eq!(v["domain"]["max"], 4000.0);
        assert_eq!(v["domain"]["max_country"], "X");
        assert_eq!(v["countries"][0]["color"], "rgb(8, 29, 88)");
        assert_eq!(v["countries"][1]["color"], "red");
        assert_eq!(v["selection"], serde_json::json!(["Y"]));
        assert_eq!(v["rejected"], serde_json::json!(["Z"]));
        assert_eq!(v["violin"]["series"][0]["country"], "Y");
    }

    #[test]
    fn summary_applies_filters_before_selecting() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        fs::write(&path, DATA).unwrap();

        let out = cmd_summary(
            &path,
            &PresentationConfig::default(),
            FilterState::new("All", "QA"),
            &["Y".to_string()],
        )
        .unwrap();
        let v: Value = serde_json::from_str(&out).unwrap();

        assert_eq!(v["profession"], "QA");
        assert_eq!(v["domain"]["min"], 3000.0);
        assert_eq!(v["countries"][1]["color"], "grey");
        assert_eq!(v["rejected"], serde_json::json!(["Y"]));
    }

    #[test]
    fn options_lists_filter_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        fs::write(&path, DATA).unwrap();

        let v: Value = serde_json::from_str(&cmd_options(&path).unwrap()).unwrap();
        assert_eq!(v["ages"], serde_json::json!(["All", "25-34", "35-44"]));
        assert_eq!(v["professions"], serde_json::json!(["All", "Dev", "QA"]));
    }

    #[test]
    fn prepare_output_loads_as_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let survey = dir.path().join("survey.csv");
        let rates = dir.path().join("rates.json");
        let out = dir.path().join("out").join("prepared.csv");
        fs::write(
            &survey,
            "Age,CompTotal,CompFreq,Currency,Country,DevType\n\
25-34,24000,Yearly,ZZZ Test dollar,Viet Nam,Dev\n\
25-34,30000,Monthly,EUR European Euro,Germany,Dev\n\
35-44,NA,Yearly,EUR European Euro,Germany,Dev\n",
        )
        .unwrap();
        fs::write(&rates, r#"{"ZZZ": 2.0}"#).unwrap();

        assert_eq!(cmd_prepare(&survey, &out, Some(&rates), RATES_YEAR).unwrap(), 1);

        let dataset = load_dataset(&out).unwrap();
        assert_eq!(dataset.countries(), ["Vietnam".to_string()]);
        assert_eq!(dataset.rows()[0].salary, 1000.0);
    }

    #[test]
    fn config_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r##"{"no_data_color": "#ccc"}"##).unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.no_data_color, "#ccc");
        assert_eq!(config.selected_color, "red");
        assert_eq!(load_config(None).unwrap(), PresentationConfig::default());
    }

    #[test]
    fn missing_files_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_dataset(&dir.path().join("nope.csv")).unwrap_err();
        assert!(err.contains("nope.csv"));
    }

    #[test]
    fn repeated_select_keeps_the_country_selected() {
        let dataset = Dataset::from_csv_str(DATA).unwrap();
        let select = vec!["X".to_string(), "X".to_string()];
        let summary = summarize(
            dataset,
            &PresentationConfig::default(),
            FilterState::default(),
            &select,
        );
        assert_eq!(summary.selection, vec!["X"]);
        assert!(summary.rejected.is_empty());
    }

    #[test]
    fn prepare_reads_eurostat_rates_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let survey = dir.path().join("survey.csv");
        let rates = dir.path().join("ert_bil_eur_a.tsv");
        let out = dir.path().join("prepared.csv");
        fs::write(
            &survey,
            "Age,CompTotal,CompFreq,Currency,Country,DevType\n\
25-34,24000,Yearly,ZZZ Test dollar,Chile,Dev\n\
25-34,100,Monthly,QQQ Missing rate,Chile,Dev\n",
        )
        .unwrap();
        fs::write(
            &rates,
            "statinfo,unit,currency\\time\t2019 \t2018 \n\
AVG,NAC,ZZZ\t3.0 \t2.0 \n\
AVG,NAC,QQQ\t1.5 \t: \n",
        )
        .unwrap();

        let parsed = load_rates(&rates, RATES_YEAR).unwrap();
        assert_eq!(parsed.rate("ZZZ"), Some(2.0));

        assert_eq!(cmd_prepare(&survey, &out, Some(&rates), RATES_YEAR).unwrap(), 1);
        let dataset = load_dataset(&out).unwrap();
        assert_eq!(dataset.rows()[0].salary, 1000.0);
    }
}
