//! Mapping between positional `<weights>` entries and weight ids
use std::collections::HashMap;

use crate::data::Init;

/// Weight ids by their position in a `<weights>` list
///
/// Positions are the declaration order of the `<weight>` tags over all
/// weight groups.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WeightIndex {
    ids: HashMap<usize, String>,
}

impl WeightIndex {
    pub fn new(init: &Init) -> Self {
        let ids = init
            .weight_groups
            .values()
            .flat_map(|group| group.weights.iter())
            .map(|(id, weight)| (weight.index, id.clone()))
            .collect();
        Self { ids }
    }

    /// Id of the weight at `index`, if one was declared
    pub fn id(&self, index: usize) -> Option<&str> {
        self.ids.get(&index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
