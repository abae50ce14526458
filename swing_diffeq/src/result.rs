use crate::Integrable;

/// A growable result container used for in-memory storage of ODE solver outputs.
/// Each entry stores the time and state value at that time.
#[derive(Clone, Debug)]
pub struct MemoryResult<State>
where
    State: Integrable,
{
    /// Recorded times.
    pub t: Vec<f64>,
    /// Recorded states.
    pub y: Vec<State>,
}

impl<State: Integrable> MemoryResult<State> {
    /// Constructs a new memory result buffer with an initial capacity `n`.
    pub fn new(n: usize) -> Self {
        Self {
            t: Vec::with_capacity(n),
            y: Vec::with_capacity(n),
        }
    }

    pub(crate) fn insert(&mut self, t: f64, x: &State) {
        self.t.push(t);
        self.y.push(x.clone());
    }

    /// Number of saved entries.
    pub fn len(&self) -> usize {
        self.t.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }

    /// The last saved `(time, state)` pair, if any.
    pub fn last(&self) -> Option<(f64, &State)> {
        Some((*self.t.last()?, self.y.last()?))
    }
}
