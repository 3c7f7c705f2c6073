use std::cell::RefCell;
use std::sync::OnceLock;

use dataset::Dataset;
use explorer::{Explorer, RecordedEvent, StateEvent, Toggle};
use layers::{Choropleth, PresentationConfig, distribution_for, legend, violin_plot};
use serde::Serialize;
use wasm_bindgen::prelude::*;

static PANIC_HOOK_SET: OnceLock<()> = OnceLock::new();

/// Page state: the loaded explorer (if any) and the presentation config.
#[derive(Debug, Default)]
struct PageState {
    explorer: Option<Explorer>,
    config: PresentationConfig,
}

thread_local! {
    static STATE: RefCell<PageState> = RefCell::new(PageState::default());
}

/// TLS access that reports teardown as an error instead of panicking.
/// Every export goes through here.
fn with_state<F, R>(f: F) -> Result<R, String>
where
    F: FnOnce(&mut PageState) -> R,
{
    STATE
        .try_with(|cell| f(&mut cell.borrow_mut()))
        .map_err(|e| format!("page state unavailable: {e}"))
}

/// `with_state` for operations that can fail themselves.
fn try_with_state<F, R>(f: F) -> Result<R, String>
where
    F: FnOnce(&mut PageState) -> Result<R, String>,
{
    with_state(f).and_then(|r| r)
}

fn init_panic_hook() {
    PANIC_HOOK_SET.get_or_init(|| {
        std::panic::set_hook(Box::new(|info| {
            let msg = info.to_string();
            web_sys::console::error_1(&JsValue::from_str(&msg));
        }));
    });
}

fn js_err(msg: String) -> JsValue {
    web_sys::console::error_1(&JsValue::from_str(&msg));
    JsValue::from_str(&msg)
}

fn to_js_array(values: Vec<String>) -> js_sys::Array {
    values.into_iter().map(JsValue::from).collect()
}

const NOT_LOADED: &str = "no dataset loaded";

impl PageState {
    fn explorer(&self) -> Result<&Explorer, String> {
        self.explorer.as_ref().ok_or_else(|| NOT_LOADED.to_string())
    }

    fn explorer_mut(&mut self) -> Result<&mut Explorer, String> {
        self.explorer.as_mut().ok_or_else(|| NOT_LOADED.to_string())
    }

    fn load(&mut self, dataset: Dataset) -> usize {
        let rows = dataset.len();
        self.explorer = Some(Explorer::new(dataset));
        rows
    }

    fn set_config_json(&mut self, text: &str) -> Result<(), String> {
        self.config = PresentationConfig::from_json_str(text).map_err(|e| e.to_string())?;
        Ok(())
    }

    fn age_options(&self) -> Vec<String> {
        self.explorer
            .as_ref()
            .map(|ex| ex.dataset().filter_options().ages)
            .unwrap_or_default()
    }

    fn profession_options(&self) -> Vec<String> {
        self.explorer
            .as_ref()
            .map(|ex| ex.dataset().filter_options().professions)
            .unwrap_or_default()
    }

    fn set_age_filter(&mut self, value: &str) -> Result<Vec<String>, String> {
        let ex = self.explorer_mut()?;
        let pruned = ex.set_age_filter(value);
        Ok(owned_names(ex, pruned))
    }

    fn set_profession_filter(&mut self, value: &str) -> Result<Vec<String>, String> {
        let ex = self.explorer_mut()?;
        let pruned = ex.set_profession_filter(value);
        Ok(owned_names(ex, pruned))
    }

    fn toggle_country(&mut self, name: &str) -> Result<&'static str, String> {
        Ok(match self.explorer_mut()?.toggle(name) {
            Toggle::Selected => "selected",
            Toggle::Deselected => "deselected",
            Toggle::Rejected => "rejected",
        })
    }

    /// No dataset yet reads as "no data" for every country.
    fn color_for(&self, name: &str) -> String {
        match &self.explorer {
            Some(ex) => Choropleth::new(ex).color_for(name).css(&self.config),
            None => self.config.no_data_color.clone(),
        }
    }

    fn distribution_json(&self) -> Result<String, String> {
        let ex = self.explorer()?;
        let plot = violin_plot(&distribution_for(ex, ex.selection()), &self.config);
        serde_json::to_string(&plot).map_err(|e| e.to_string())
    }

    fn legend_json(&self) -> Result<String, String> {
        let ex = self.explorer()?;
        serde_json::to_string(&legend(ex.color_scale(), &self.config.legend))
            .map_err(|e| e.to_string())
    }

    fn color_domain(&self) -> Option<Vec<f64>> {
        let (lo, hi) = self.explorer.as_ref()?.color_scale().bounds()?;
        Some(vec![lo, hi])
    }

    fn drain_events_json(&mut self) -> Result<String, String> {
        let ex = self.explorer_mut()?;
        let events: Vec<EventView> = ex
            .drain_events()
            .into_iter()
            .map(|e| EventView::new(ex, e))
            .collect();
        serde_json::to_string(&events).map_err(|e| e.to_string())
    }
}

fn owned_names(ex: &Explorer, ids: Vec<dataset::CountryId>) -> Vec<String> {
    ex.names(ids).into_iter().map(str::to_string).collect()
}

/// JS-facing shape of a recorded state change; country ids become names.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum EventView {
    FilterChanged {
        revision: u64,
        age: String,
        profession: String,
    },
    SelectionChanged {
        revision: u64,
        country: String,
        selected: bool,
    },
    Pruned {
        revision: u64,
        countries: Vec<String>,
    },
}

impl EventView {
    fn new(ex: &Explorer, recorded: RecordedEvent) -> Self {
        let revision = recorded.revision;
        match recorded.event {
            StateEvent::FilterChanged(filter) => EventView::FilterChanged {
                revision,
                age: filter.age.to_string(),
                profession: filter.profession.to_string(),
            },
            StateEvent::SelectionChanged { country, selected } => EventView::SelectionChanged {
                revision,
                country: ex.dataset().country_name(country).unwrap_or_default().to_string(),
                selected,
            },
            StateEvent::Pruned(ids) => EventView::Pruned {
                revision,
                countries: owned_names(ex, ids),
            },
        }
    }
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    init_panic_hook();
    Ok(())
}

/// Replaces the dataset with CSV text; filters and selection reset. Returns the row count.
#[wasm_bindgen]
pub fn load_dataset_csv(text: &str) -> Result<usize, JsValue> {
    let dataset = Dataset::from_csv_str(text).map_err(|e| js_err(format!("dataset csv: {e}")))?;
    with_state(|s| s.load(dataset)).map_err(js_err)
}

#[wasm_bindgen]
pub fn load_dataset_json(text: &str) -> Result<usize, JsValue> {
    let dataset =
        Dataset::from_json_str(text).map_err(|e| js_err(format!("dataset json: {e}")))?;
    with_state(|s| s.load(dataset)).map_err(js_err)
}

#[wasm_bindgen]
pub fn set_config_json(text: &str) -> Result<(), JsValue> {
    try_with_state(|s| s.set_config_json(text)).map_err(js_err)
}

#[wasm_bindgen]
pub fn age_options() -> js_sys::Array {
    to_js_array(with_state(|s| s.age_options()).unwrap_or_default())
}

#[wasm_bindgen]
pub fn profession_options() -> js_sys::Array {
    to_js_array(with_state(|s| s.profession_options()).unwrap_or_default())
}

/// Returns the names pruned from the comparison set.
#[wasm_bindgen]
pub fn set_age_filter(value: &str) -> Result<js_sys::Array, JsValue> {
    try_with_state(|s| s.set_age_filter(value))
        .map(to_js_array)
        .map_err(js_err)
}

/// Returns the names pruned from the comparison set.
#[wasm_bindgen]
pub fn set_profession_filter(value: &str) -> Result<js_sys::Array, JsValue> {
    try_with_state(|s| s.set_profession_filter(value))
        .map(to_js_array)
        .map_err(js_err)
}

/// `"selected"`, `"deselected"` or `"rejected"`.
#[wasm_bindgen]
pub fn toggle_country(name: &str) -> Result<String, JsValue> {
    try_with_state(|s| s.toggle_country(name))
        .map(str::to_string)
        .map_err(js_err)
}

#[wasm_bindgen]
pub fn color_for(name: &str) -> Result<String, JsValue> {
    with_state(|s| s.color_for(name)).map_err(js_err)
}

#[wasm_bindgen]
pub fn distribution_json() -> Result<String, JsValue> {
    try_with_state(|s| s.distribution_json()).map_err(js_err)
}

#[wasm_bindgen]
pub fn legend_json() -> Result<String, JsValue> {
    try_with_state(|s| s.legend_json()).map_err(js_err)
}

/// `[min, max]` of the country means, or `undefined` when nothing has data.
#[wasm_bindgen]
pub fn color_domain() -> Option<Vec<f64>> {
    with_state(|s| s.color_domain()).ok().flatten()
}

#[wasm_bindgen]
pub fn drain_events_json() -> Result<String, JsValue> {
    try_with_state(|s| s.drain_events_json()).map_err(js_err)
}

#[cfg(test)]
mod tests {
    use super::{PageState, try_with_state, with_state};
    use dataset::Dataset;
    use serde_json::{Value, json};

    const DATA: &str = "Age,Country,DevType,CompTotal\n\
25-34,X,Dev,3000\n\
35-44,X,Dev,5000\n\
25-34,Y,Dev,1000\n";

    fn loaded() -> PageState {
        let mut state = PageState::default();
        state.load(Dataset::from_csv_str(DATA).unwrap());
        state
    }

    #[test]
    fn calls_before_load_fail_softly() {
        let mut state = PageState::default();
        assert!(state.age_options().is_empty());
        assert_eq!(state.color_for("X"), "grey");
        assert_eq!(state.color_domain(), None);
        assert!(state.toggle_country("X").is_err());
        assert!(state.distribution_json().is_err());
    }

    #[test]
    fn filters_and_selection_flow_through() {
        let mut state = loaded();
        assert_eq!(state.age_options(), vec!["All", "25-34", "35-44"]);
        assert_eq!(state.color_domain(), Some(vec![1000.0, 4000.0]));

        assert_eq!(state.toggle_country("Y").unwrap(), "selected");
        assert_eq!(state.toggle_country("Z").unwrap(), "rejected");
        assert_eq!(state.color_for("Y"), "red");

        assert!(state.set_age_filter("25-34").unwrap().is_empty());
        assert_eq!(state.color_domain(), Some(vec![1000.0, 3000.0]));

        assert_eq!(state.set_profession_filter("QA").unwrap(), vec!["Y"]);
        assert_eq!(state.color_domain(), None);
        assert_eq!(state.color_for("X"), "grey");
    }

    #[test]
    fn events_drain_with_names() {
        let mut state = loaded();
        state.toggle_country("Y").unwrap();
        state.set_profession_filter("QA").unwrap();

        let events: Value = serde_json::from_str(&state.drain_events_json().unwrap()).unwrap();
        assert_eq!(events[0]["kind"], "selection_changed");
        assert_eq!(events[0]["country"], "Y");
        assert_eq!(events[1]["kind"], "filter_changed");
        assert_eq!(events[1]["profession"], "QA");
        assert_eq!(events[2], json!({"kind": "pruned", "revision": 2, "countries": ["Y"]}));

        assert_eq!(state.drain_events_json().unwrap(), "[]");
    }

    #[test]
    fn distribution_and_legend_serialize() {
        let mut state = loaded();
        state.toggle_country("X").unwrap();
        let plot: Value = serde_json::from_str(&state.distribution_json().unwrap()).unwrap();
        assert_eq!(plot["series"][0]["country"], "X");
        assert_eq!(plot["max_bin_count"], 1);

        let legend: Value = serde_json::from_str(&state.legend_json().unwrap()).unwrap();
        assert_eq!(legend["domain"], json!([1000.0, 4000.0]));
    }

    #[test]
    fn config_json_changes_colors() {
        let mut state = loaded();
        state.set_config_json(r#"{"selected_color": "orange"}"#).unwrap();
        state.toggle_country("X").unwrap();
        assert_eq!(state.color_for("X"), "orange");
        assert!(state.set_config_json("not json").is_err());
    }

    #[test]
    fn exports_share_one_guarded_state() {
        let rows = with_state(|s| s.load(Dataset::from_csv_str(DATA).unwrap())).unwrap();
        assert_eq!(rows, 3);
        assert_eq!(
            try_with_state(|s| s.toggle_country("X")).unwrap(),
            "selected"
        );
        assert_eq!(with_state(|s| s.color_for("X")).unwrap(), "red");
        assert_eq!(
            with_state(|s| s.color_domain()).unwrap(),
            Some(vec![1000.0, 4000.0])
        );
        assert!(try_with_state(|s| s.set_config_json("[]")).is_err());
    }
}
