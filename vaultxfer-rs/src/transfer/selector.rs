//! Destination vault selection.

use crate::config::VaultRegistry;
use crate::error::{Result, TransferError};
use crate::vault::display_name;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Result of selecting a destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Transfer can proceed to this root.
    Chosen(PathBuf),
    /// Several roots are registered; the caller has to pick one.
    Choose(Vec<PathBuf>),
}

/// A registered destination as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DestinationEntry {
    /// 1-based display position.
    pub index: usize,
    pub name: String,
    pub path: PathBuf,
}

/// Picks the destination vault for a transfer.
#[derive(Debug, Clone, Copy)]
pub struct DestinationSelector<'a> {
    registry: &'a VaultRegistry,
}

impl<'a> DestinationSelector<'a> {
    pub fn new(registry: &'a VaultRegistry) -> Self {
        Self { registry }
    }

    /// Registered roots in display order.
    pub fn list_destinations(&self) -> Vec<DestinationEntry> {
        self.registry
            .iter()
            .enumerate()
            .map(|(i, path)| DestinationEntry {
                index: i + 1,
                name: display_name(path),
                path: path.clone(),
            })
            .collect()
    }

    /// Select a destination.
    ///
    /// An explicit choice wins. Without one, a single registered root is used
    /// implicitly and several roots ask the caller to choose. No registered
    /// root and no explicit choice is a configuration error.
    pub fn select(&self, explicit: Option<&str>) -> Result<Selection> {
        if let Some(choice) = explicit {
            return self.lookup(choice).map(Selection::Chosen);
        }

        match self.registry.as_slice() {
            [] => Err(TransferError::NoDestinations),
            [only] => Ok(Selection::Chosen(only.clone())),
            many => Ok(Selection::Choose(many.to_vec())),
        }
    }

    /// Like [`select`](Self::select), but a required choice is an error.
    pub fn require(&self, explicit: Option<&str>) -> Result<PathBuf> {
        match self.select(explicit)? {
            Selection::Chosen(root) => Ok(root),
            Selection::Choose(roots) => Err(TransferError::DestinationRequired(roots)),
        }
    }

    /// Resolve a user choice: a 1-based index, a registered path, a vault
    /// name, or an unregistered existing directory.
    pub fn lookup(&self, choice: &str) -> Result<PathBuf> {
        let choice = choice.trim();

        if let Ok(index) = choice.parse::<usize>() {
            if let Some(root) = self.registry.get(index) {
                return Ok(root.clone());
            }
        }

        let as_path = Path::new(choice);
        if self.registry.contains(as_path) {
            return Ok(as_path.to_path_buf());
        }

        let by_name: Vec<&PathBuf> = self
            .registry
            .iter()
            .filter(|root| display_name(root) == choice)
            .collect();
        if let [root] = by_name.as_slice() {
            return Ok((*root).clone());
        }

        if as_path.is_absolute() && as_path.is_dir() {
            return Ok(as_path.to_path_buf());
        }

        Err(TransferError::UnknownDestination(choice.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn registry(paths: &[&str]) -> VaultRegistry {
        VaultRegistry::from(paths.iter().map(PathBuf::from).collect::<Vec<_>>())
    }

    #[test]
    fn test_no_destinations_is_configuration_error() {
        let reg = registry(&[]);
        let result = DestinationSelector::new(&reg).select(None);
        assert!(matches!(result, Err(TransferError::NoDestinations)));
    }

    #[test]
    fn test_single_destination_is_implicit() {
        let reg = registry(&["/v/work"]);
        let selection = DestinationSelector::new(&reg).select(None).unwrap();
        assert_eq!(selection, Selection::Chosen(PathBuf::from("/v/work")));
    }

    #[test]
    fn test_several_destinations_defer() {
        let reg = registry(&["/v/work", "/v/home"]);
        let selector = DestinationSelector::new(&reg);
        assert_eq!(
            selector.select(None).unwrap(),
            Selection::Choose(vec![PathBuf::from("/v/work"), PathBuf::from("/v/home")])
        );
        assert!(matches!(
            selector.require(None),
            Err(TransferError::DestinationRequired(_))
        ));
    }

    #[test]
    fn test_explicit_choice_by_index_name_and_path() {
        let reg = registry(&["/v/work", "/v/home"]);
        let selector = DestinationSelector::new(&reg);

        assert_eq!(selector.require(Some("2")).unwrap(), PathBuf::from("/v/home"));
        assert_eq!(selector.require(Some("work")).unwrap(), PathBuf::from("/v/work"));
        assert_eq!(selector.require(Some("/v/home")).unwrap(), PathBuf::from("/v/home"));
        assert!(matches!(
            selector.require(Some("3")),
            Err(TransferError::UnknownDestination(_))
        ));
    }

    #[test]
    fn test_explicit_unregistered_directory() {
        let dir = TempDir::new().unwrap();
        let reg = registry(&[]);
        let selector = DestinationSelector::new(&reg);
        let choice = dir.path().to_string_lossy().to_string();
        assert_eq!(selector.require(Some(&choice)).unwrap(), dir.path());
    }

    #[test]
    fn test_list_destinations() {
        let reg = registry(&["/v/work", "/v/home"]);
        let entries = DestinationSelector::new(&reg).list_destinations();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].index, 1);
        assert_eq!(entries[0].name, "work");
        assert_eq!(entries[1].path, PathBuf::from("/v/home"));
    }
}
