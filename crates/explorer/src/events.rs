use dataset::CountryId;

use crate::filter::FilterState;

#[derive(Debug, Clone, PartialEq)]
pub enum StateEvent {
    /// A filter setter ran and derived data was recomputed.
    FilterChanged(FilterState),
    SelectionChanged { country: CountryId, selected: bool },
    /// Members dropped because they lost all data under the new filter.
    Pruned(Vec<CountryId>),
}

/// Event recorded after a mutation, tagged with the state revision it produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedEvent {
    pub revision: u64,
    pub event: StateEvent,
}

/// Append-only log that views drain to learn they must redraw.
#[derive(Debug, Default)]
pub struct EventLog {
    revision: u64,
    events: Vec<RecordedEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Revision of the most recent mutation; 0 before any.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Starts a new revision for the events of one mutation.
    pub fn bump(&mut self) -> u64 {
        self.revision += 1;
        self.revision
    }

    pub fn emit(&mut self, event: StateEvent) {
        self.events.push(RecordedEvent {
            revision: self.revision,
            event,
        });
    }

    pub fn events(&self) -> &[RecordedEvent] {
        &self.events
    }

    pub fn drain(&mut self) -> Vec<RecordedEvent> {
        std::mem::take(&mut self.events)
    }
}
