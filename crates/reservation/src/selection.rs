use std::collections::BTreeSet;

use eventdesk_shared::Reservation;

/// Reservation ids picked for a bulk action.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection(BTreeSet<String>);

impl Selection {
    pub fn toggle(&mut self, id: &str) {
        if !self.0.remove(id) {
            self.0.insert(id.to_owned());
        }
    }

    /// Selects exactly the visible view, or clears the selection when the
    /// whole view is already selected.
    pub fn toggle_all(&mut self, view: &[&Reservation]) {
        let all_selected =
            !view.is_empty() && view.iter().all(|reservation| self.0.contains(&reservation.id));

        if all_selected {
            self.0.clear();
        } else {
            self.0 = view.iter().map(|reservation| reservation.id.to_owned()).collect();
        }
    }

    pub fn remove(&mut self, id: &str) -> bool {
        self.0.remove(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.contains(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

impl FromIterator<String> for Selection {
    fn from_iter<T: IntoIterator<Item = String>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
