use indexmap::IndexMap;

/// Maps each parameter name to the positional slots it occupies.
///
/// Every occurrence of a name in the template gets its own slot, so a name
/// used three times owns three slots. Names iterate in order of first
/// appearance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PositionIndex {
    positions: IndexMap<String, Vec<usize>>,
    total_positions: usize,
}

impl PositionIndex {
    /// Appends `slot` to the slot list of `name`.
    pub(crate) fn insert(&mut self, name: impl Into<String>, slot: usize) {
        self.positions.entry(name.into()).or_default().push(slot);
        self.total_positions += 1;
    }

    /// Slots occupied by `name`, in scan order. `None` if the name never appeared.
    pub fn positions_of(&self, name: &str) -> Option<&[usize]> {
        self.positions.get(name).map(Vec::as_slice)
    }

    /// Total number of slots across all names.
    pub fn total_positions(&self) -> usize {
        self.total_positions
    }

    /// Distinct parameter names in order of first appearance.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.positions.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[usize])> {
        self.positions
            .iter()
            .map(|(name, slots)| (name.as_str(), slots.as_slice()))
    }

    /// Number of distinct names.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}
