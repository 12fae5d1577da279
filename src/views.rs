use std::collections::BTreeMap;

use thiserror::Error;

use crate::data::filter::FilterSet;

#[derive(Debug, Error, PartialEq)]
pub enum ViewError {
    #[error("a saved view needs a name")]
    EmptyName,
    #[error("no saved view named '{0}'")]
    NotFound(String),
}

// ---------------------------------------------------------------------------
// Saved views – named filter snapshots for the running session
// ---------------------------------------------------------------------------

/// Session-scoped store of named [`FilterSet`] snapshots.
///
/// Names are trimmed; saving under an existing name overwrites it.
#[derive(Debug, Clone, Default)]
pub struct SavedViews {
    views: BTreeMap<String, FilterSet>,
}

impl SavedViews {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a snapshot of `filters` under `name`. Returns the stored name.
    pub fn save(&mut self, name: &str, filters: &FilterSet) -> Result<String, ViewError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ViewError::EmptyName);
        }
        let previous = self.views.insert(name.to_string(), filters.clone());
        if previous.is_some() {
            log::info!("Overwrote saved view '{name}'");
        } else {
            log::info!("Saved view '{name}'");
        }
        Ok(name.to_string())
    }

    pub fn get(&self, name: &str) -> Result<&FilterSet, ViewError> {
        self.views
            .get(name.trim())
            .ok_or_else(|| ViewError::NotFound(name.trim().to_string()))
    }

    pub fn delete(&mut self, name: &str) -> Result<FilterSet, ViewError> {
        self.views
            .remove(name.trim())
            .ok_or_else(|| ViewError::NotFound(name.trim().to_string()))
    }

    /// Saved names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.views.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::fixtures::small_dataset;
    use crate::data::resolve::defaults;

    #[test]
    fn test_save_and_get() {
        let ds = small_dataset();
        let filters = defaults(&ds);
        let mut views = SavedViews::new();

        assert_eq!(views.save("  Asia-2007 ", &filters).unwrap(), "Asia-2007");
        assert_eq!(views.get("Asia-2007").unwrap(), &filters);
        assert_eq!(views.names().collect::<Vec<_>>(), vec!["Asia-2007"]);
    }

    #[test]
    fn test_same_name_overwrites() {
        let ds = small_dataset();
        let mut first = defaults(&ds);
        let mut views = SavedViews::new();
        views.save("v", &first).unwrap();

        first.year = 2002;
        views.save("v", &first).unwrap();
        assert_eq!(views.len(), 1);
        assert_eq!(views.get("v").unwrap().year, 2002);
    }

    #[test]
    fn test_blank_name_rejected() {
        let ds = small_dataset();
        let mut views = SavedViews::new();
        assert_eq!(
            views.save("   ", &defaults(&ds)),
            Err(ViewError::EmptyName)
        );
        assert!(views.is_empty());
    }

    #[test]
    fn test_delete() {
        let ds = small_dataset();
        let mut views = SavedViews::new();
        views.save("v", &defaults(&ds)).unwrap();
        assert!(views.delete("v").is_ok());
        assert_eq!(views.get("v"), Err(ViewError::NotFound("v".to_string())));
        assert!(views.delete("v").is_err());
    }
}
