use std::collections::BTreeSet;

/// True when every id in `universe` is checked. An empty universe counts as
/// all checked.
pub fn compute_select_all(current_checks: &BTreeSet<String>, universe: &BTreeSet<String>) -> bool {
    universe.iter().all(|id| current_checks.contains(id))
}

pub fn apply_select_all(checked: bool, universe: &BTreeSet<String>) -> BTreeSet<String> {
    if checked {
        universe.clone()
    } else {
        BTreeSet::new()
    }
}

/// The operator's checkboxes for one focused entity.
///
/// The select-all state is never stored; it is computed from the checks on
/// every read.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CheckSet {
    universe: BTreeSet<String>,
    checked: BTreeSet<String>,
}

impl CheckSet {
    /// Renders the checkboxes from current membership. Checked ids outside
    /// `universe` (dangling references) are kept so a full replace does not
    /// silently drop them.
    pub fn new(universe: BTreeSet<String>, checked: BTreeSet<String>) -> Self {
        Self { universe, checked }
    }

    pub fn universe(&self) -> &BTreeSet<String> {
        &self.universe
    }

    pub fn checked(&self) -> &BTreeSet<String> {
        &self.checked
    }

    pub fn into_checked(self) -> BTreeSet<String> {
        self.checked
    }

    pub fn is_checked(&self, id: &str) -> bool {
        self.checked.contains(id)
    }

    pub fn set(&mut self, id: &str, on: bool) {
        if on {
            self.checked.insert(id.to_string());
        } else {
            self.checked.remove(id);
        }
    }

    pub fn toggle(&mut self, id: &str) -> bool {
        let on = !self.is_checked(id);
        self.set(id, on);
        on
    }

    /// Overwrites every checkbox in scope in one step. Checking all keeps
    /// dangling ids; clearing all drops them too.
    pub fn set_all(&mut self, checked: bool) {
        let mut next = apply_select_all(checked, &self.universe);
        if checked {
            next.extend(self.checked.difference(&self.universe).cloned());
        }
        self.checked = next;
    }

    pub fn all_checked(&self) -> bool {
        compute_select_all(&self.checked, &self.universe)
    }
}
