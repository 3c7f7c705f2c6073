use dataset::{CountryId, Dataset};
use tracing::{debug, info};

use crate::aggregate::{ColorScaleState, PerCountrySalaries, recompute};
use crate::events::{EventLog, RecordedEvent, StateEvent};
use crate::filter::{Filter, FilterState};
use crate::selection::{SelectionSet, Toggle};

/// The dashboard's complete state: immutable dataset, the two user-mutable
/// pieces (filters and selection) and the views derived from them.
///
/// Every mutator recomputes synchronously and records events before it
/// returns, so readers always see a consistent bundle.
#[derive(Debug)]
pub struct Explorer {
    dataset: Dataset,
    filter: FilterState,
    selection: SelectionSet,
    salaries: PerCountrySalaries,
    scale: ColorScaleState,
    events: EventLog,
}

impl Explorer {
    /// Starts with both filters at `"All"` and an empty selection.
    pub fn new(dataset: Dataset) -> Self {
        let filter = FilterState::default();
        let (salaries, scale) = recompute(&dataset, &filter);
        info!(
            rows = dataset.len(),
            countries = dataset.country_count(),
            "explorer initialized"
        );
        Self {
            dataset,
            filter,
            selection: SelectionSet::new(),
            salaries,
            scale,
            events: EventLog::new(),
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn per_country(&self) -> &PerCountrySalaries {
        &self.salaries
    }

    pub fn color_scale(&self) -> &ColorScaleState {
        &self.scale
    }

    /// Empty for unknown countries as well as countries without matches.
    pub fn salaries_for(&self, country: &str) -> &[f64] {
        match self.dataset.country_id(country) {
            Some(id) => self.salaries.salaries(id),
            None => &[],
        }
    }

    pub fn mean_for(&self, country: &str) -> Option<f64> {
        self.salaries.mean(self.dataset.country_id(country)?)
    }

    pub fn is_selected(&self, country: &str) -> bool {
        self.dataset
            .country_id(country)
            .is_some_and(|id| self.selection.contains(id))
    }

    pub fn selected_names(&self) -> Vec<&str> {
        self.names(self.selection.iter())
    }

    pub fn names(&self, ids: impl IntoIterator<Item = CountryId>) -> Vec<&str> {
        ids.into_iter()
            .filter_map(|id| self.dataset.country_name(id))
            .collect()
    }

    /// Returns the countries pruned from the selection.
    pub fn set_age_filter(&mut self, value: impl Into<Filter>) -> Vec<CountryId> {
        self.filter.age = value.into();
        self.apply_filter()
    }

    /// Returns the countries pruned from the selection.
    pub fn set_profession_filter(&mut self, value: impl Into<Filter>) -> Vec<CountryId> {
        self.filter.profession = value.into();
        self.apply_filter()
    }

    pub fn set_filter(&mut self, filter: FilterState) -> Vec<CountryId> {
        self.filter = filter;
        self.apply_filter()
    }

    fn apply_filter(&mut self) -> Vec<CountryId> {
        let (salaries, scale) = recompute(&self.dataset, &self.filter);
        self.salaries = salaries;
        self.scale = scale;

        self.events.bump();
        self.events
            .emit(StateEvent::FilterChanged(self.filter.clone()));
        self.prune_after_recompute()
    }

    /// Drops selected countries that no longer have data.
    ///
    /// Runs after every recomputation; calling it again is a no-op.
    pub fn prune_after_recompute(&mut self) -> Vec<CountryId> {
        let salaries = &self.salaries;
        let pruned = self.selection.retain(|id| salaries.has_data(id));
        if !pruned.is_empty() {
            debug!(pruned = ?self.names(pruned.iter().copied()), "pruned selection");
            self.events.emit(StateEvent::Pruned(pruned.clone()));
        }
        pruned
    }

    /// Toggles a country in the comparison set.
    ///
    /// Adding requires matching rows under the current filter; unknown
    /// countries and countries without data are rejected without change.
    pub fn toggle(&mut self, country: &str) -> Toggle {
        let Some(id) = self.dataset.country_id(country) else {
            debug!(country, "toggle rejected: unknown country");
            return Toggle::Rejected;
        };
        let outcome = self.selection.toggle(id, self.salaries.has_data(id));
        match outcome {
            Toggle::Rejected => debug!(country, "toggle rejected: no data under filter"),
            Toggle::Selected | Toggle::Deselected => {
                self.events.bump();
                self.events.emit(StateEvent::SelectionChanged {
                    country: id,
                    selected: outcome == Toggle::Selected,
                });
            }
        }
        outcome
    }

    pub fn revision(&self) -> u64 {
        self.events.revision()
    }

    pub fn events(&self) -> &[RecordedEvent] {
        self.events.events()
    }

    pub fn drain_events(&mut self) -> Vec<RecordedEvent> {
        self.events.drain()
    }
}
