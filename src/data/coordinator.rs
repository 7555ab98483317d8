use crate::data::extract::{extract_quote, extract_series};
use crate::data::{Quote, TimeSeries};
use tracing::{debug, info, warn};

/// Record type filled into one slot per symbol when its response arrives.
pub trait SlotRecord: Clone {
    fn pending(symbol: &str) -> Self;
    fn symbol(&self) -> &str;
    fn from_response(symbol: &str, status: u16, body: &[u8]) -> Self;
}

impl SlotRecord for TimeSeries {
    fn pending(symbol: &str) -> Self {
        TimeSeries::empty(symbol)
    }

    fn symbol(&self) -> &str {
        &self.symbol
    }

    fn from_response(symbol: &str, status: u16, body: &[u8]) -> Self {
        extract_series(symbol, status, body)
    }
}

impl SlotRecord for Quote {
    fn pending(symbol: &str) -> Self {
        Quote::empty(symbol)
    }

    fn symbol(&self) -> &str {
        &self.symbol
    }

    fn from_response(symbol: &str, status: u16, body: &[u8]) -> Self {
        extract_quote(symbol, status, body)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct GenerationId(pub u64);

/// Query parameters for one generation. `Summary` requests carry none.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    Chart {
        range: &'static str,
        interval: &'static str,
    },
    Summary,
}

/// One GET to issue, tagged with the context its completion must carry back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub generation: GenerationId,
    pub slot: usize,
    pub symbol: String,
    pub mode: FetchMode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Response { status: u16, body: Vec<u8> },
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub generation: GenerationId,
    pub slot: usize,
    pub outcome: FetchOutcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// Belongs to a superseded generation (or an unknown slot); nothing changed.
    Discarded,
    /// Stored; `remaining` requests are still outstanding.
    Stored { remaining: usize },
    /// Stored the last outstanding slot. Fires once per generation.
    Completed,
}

#[derive(Debug)]
struct Generation<T> {
    id: GenerationId,
    mode: FetchMode,
    slots: Vec<T>,
    filled: Vec<bool>,
    pending: usize,
}

/// Owns the slot collection of the current generation. Starting a new
/// generation drops the old collection; completions tagged with an older id
/// are ignored.
#[derive(Debug)]
pub struct Coordinator<T> {
    next_id: u64,
    current: Option<Generation<T>>,
}

impl<T: SlotRecord> Default for Coordinator<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: SlotRecord> Coordinator<T> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            current: None,
        }
    }

    pub fn start_generation(&mut self, symbols: &[String], mode: FetchMode) -> Vec<FetchRequest> {
        self.next_id += 1;
        let id = GenerationId(self.next_id);

        let requests = symbols
            .iter()
            .enumerate()
            .map(|(slot, symbol)| FetchRequest {
                generation: id,
                slot,
                symbol: symbol.clone(),
                mode,
            })
            .collect();

        info!(generation = id.0, symbols = symbols.len(), ?mode, "starting generation");

        self.current = Some(Generation {
            id,
            mode,
            slots: symbols.iter().map(|s| T::pending(s)).collect(),
            filled: vec![false; symbols.len()],
            pending: symbols.len(),
        });

        requests
    }

    pub fn apply(&mut self, completion: Completion) -> Applied {
        let Some(generation) = self.current.as_mut() else {
            return Applied::Discarded;
        };

        if completion.generation != generation.id {
            debug!(
                stale = completion.generation.0,
                current = generation.id.0,
                slot = completion.slot,
                "dropping completion from superseded generation"
            );
            return Applied::Discarded;
        }

        let slot = completion.slot;
        if generation.filled.get(slot).copied().unwrap_or(true) {
            warn!(generation = generation.id.0, slot, "unexpected completion for slot");
            return Applied::Discarded;
        }

        let symbol = generation.slots[slot].symbol().to_string();
        let record = match completion.outcome {
            FetchOutcome::Response { status, body } => T::from_response(&symbol, status, &body),
            FetchOutcome::Failed(reason) => {
                warn!(symbol = %symbol, %reason, "request failed");
                T::pending(&symbol)
            }
        };

        generation.slots[slot] = record;
        generation.filled[slot] = true;
        generation.pending -= 1;

        if generation.pending == 0 {
            info!(generation = generation.id.0, "generation complete");
            Applied::Completed
        } else {
            Applied::Stored {
                remaining: generation.pending,
            }
        }
    }

    pub fn current_id(&self) -> Option<GenerationId> {
        self.current.as_ref().map(|g| g.id)
    }

    pub fn mode(&self) -> Option<FetchMode> {
        self.current.as_ref().map(|g| g.mode)
    }

    /// Slots of the current generation; unfilled slots hold pending records.
    pub fn slots(&self) -> &[T] {
        self.current.as_ref().map(|g| g.slots.as_slice()).unwrap_or(&[])
    }

    pub fn pending(&self) -> usize {
        self.current.as_ref().map(|g| g.pending).unwrap_or(0)
    }

    pub fn is_complete(&self) -> bool {
        self.current.is_some() && self.pending() == 0
    }
}
