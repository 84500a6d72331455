use std::collections::BTreeSet;

use crate::models::TeacherId;

/// Teacher ids currently checked in the roster view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    ids: BTreeSet<TeacherId>,
}

impl SelectionSet {
    pub fn new() -> Self {
        SelectionSet::default()
    }

    pub fn toggle(&mut self, id: TeacherId, included: bool) {
        if included {
            self.ids.insert(id);
        } else {
            self.ids.remove(&id);
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn contains(&self, id: TeacherId) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> Vec<TeacherId> {
        self.ids.iter().copied().collect()
    }
}

impl FromIterator<TeacherId> for SelectionSet {
    fn from_iter<I: IntoIterator<Item = TeacherId>>(iter: I) -> Self {
        SelectionSet {
            ids: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn toggle_is_idempotent() {
        let mut selection = SelectionSet::new();
        selection.toggle(3, true);
        selection.toggle(3, true);
        assert_eq!(selection.len(), 1);
        assert!(selection.contains(3));

        selection.toggle(3, false);
        selection.toggle(3, false);
        assert!(selection.is_empty());
    }

    #[test]
    fn ids_are_ordered() {
        let selection: SelectionSet = [6, 2, 4].into_iter().collect();
        assert_eq!(selection.ids(), vec![2, 4, 6]);
    }

    proptest! {
        #[test]
        fn clear_always_empties(toggles in prop::collection::vec((0u32..20, any::<bool>()), 0..40)) {
            let mut selection = SelectionSet::new();
            for (id, included) in toggles {
                selection.toggle(id, included);
            }
            selection.clear();
            prop_assert!(selection.is_empty());
            prop_assert_eq!(selection, SelectionSet::new());
        }
    }
}
