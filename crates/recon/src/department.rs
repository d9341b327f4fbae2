use std::collections::{BTreeSet, HashMap};

use crate::model::Department;

/// Lookup form of a department name: trimmed and lowercased.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Read-only view of a department snapshot, keyed by normalized name.
#[derive(Debug, Clone, Default)]
pub struct DepartmentIndex {
    by_name: HashMap<String, i64>,
    ids: BTreeSet<i64>,
}

impl DepartmentIndex {
    /// Build the index. Two departments that normalize to the same name
    /// resolve to the lower id.
    pub fn new(departments: &[Department]) -> Self {
        let mut by_name: HashMap<String, i64> = HashMap::new();
        let mut ids = BTreeSet::new();

        for dept in departments {
            ids.insert(dept.id);
            let key = normalize_name(&dept.name);
            if key.is_empty() {
                continue;
            }
            by_name
                .entry(key)
                .and_modify(|id| *id = (*id).min(dept.id))
                .or_insert(dept.id);
        }

        Self { by_name, ids }
    }

    pub fn resolve(&self, name: &str) -> Option<i64> {
        let key = normalize_name(name);
        if key.is_empty() {
            return None;
        }
        self.by_name.get(&key).copied()
    }

    /// Department used when a row's name does not resolve: `preferred` if it
    /// exists, else the lowest id. `None` only for an empty snapshot.
    pub fn default_department(&self, preferred: &str) -> Option<i64> {
        self.resolve(preferred)
            .or_else(|| self.ids.iter().next().copied())
    }

    pub fn contains_id(&self, id: i64) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dept(id: i64, name: &str) -> Department {
        Department { id, name: name.into() }
    }

    #[test]
    fn resolve_ignores_case_and_whitespace() {
        let index = DepartmentIndex::new(&[dept(1, "Sales"), dept(2, "R.R.H.H")]);
        assert_eq!(index.resolve("  sALES "), Some(1));
        assert_eq!(index.resolve("r.r.h.h"), Some(2));
        assert_eq!(index.resolve("Marketing"), None);
        assert_eq!(index.resolve("   "), None);
    }

    #[test]
    fn duplicate_names_resolve_to_lowest_id() {
        let index = DepartmentIndex::new(&[dept(9, "Sales "), dept(4, "sales")]);
        assert_eq!(index.resolve("Sales"), Some(4));
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn default_prefers_named_department() {
        let index = DepartmentIndex::new(&[dept(3, "Sales"), dept(7, "General")]);
        assert_eq!(index.default_department("general"), Some(7));
    }

    #[test]
    fn default_falls_back_to_lowest_id() {
        let index = DepartmentIndex::new(&[dept(5, "Sales"), dept(2, "Marketing")]);
        assert_eq!(index.default_department("General"), Some(2));
    }

    #[test]
    fn empty_snapshot_has_no_default() {
        let index = DepartmentIndex::new(&[]);
        assert!(index.is_empty());
        assert_eq!(index.default_department("General"), None);
        assert!(!index.contains_id(1));
    }
}
