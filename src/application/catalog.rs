use std::sync::Arc;

use dashmap::{DashMap, mapref::entry::Entry};

use crate::domain::{error::ComposeError, paths};

use super::page::Page;

/// Pages addressable by normalised virtual path. Safe to read from many
/// request tasks while pages are being registered or swapped.
#[derive(Default)]
pub struct PageCatalog {
    pages: DashMap<String, Arc<dyn Page>>,
}

impl PageCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, page: Arc<dyn Page>) -> Result<(), ComposeError> {
        let path = paths::normalize(page.path())?;
        match self.pages.entry(path) {
            Entry::Vacant(vacant) => {
                vacant.insert(page);
                Ok(())
            }
            Entry::Occupied(occupied) => Err(ComposeError::DuplicatePage {
                path: occupied.key().clone(),
            }),
        }
    }

    pub fn get(&self, path: &str) -> Result<Arc<dyn Page>, ComposeError> {
        let normalized = paths::normalize(path)?;
        self.pages
            .get(&normalized)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or(ComposeError::PageNotFound { path: normalized })
    }

    pub fn contains(&self, path: &str) -> bool {
        paths::normalize(path).is_ok_and(|normalized| self.pages.contains_key(&normalized))
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Registered paths, sorted.
    pub fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.pages.iter().map(|entry| entry.key().clone()).collect();
        paths.sort();
        paths
    }
}
