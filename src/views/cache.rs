//! Local list cache fed by the dispatcher.

use crate::command::Outcome;
use crate::entity::Entity;
use crate::error::Error;
use crate::feed::ViewFeed;

/// The records a list view shows plus the one it has open.
///
/// Only changes that come back from the service are applied, so the cache
/// never shows a record the store refused.
pub struct ViewCache<T: Entity> {
    items: Vec<T>,
    selected: Option<T>,
    last_error: Option<String>,
    loaded: bool,
}

impl<T: Entity> ViewCache<T> {
    pub fn new() -> Self {
        ViewCache {
            items: Vec::new(),
            selected: None,
            last_error: None,
            loaded: false,
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn selected(&self) -> Option<&T> {
        self.selected.as_ref()
    }

    /// Message of the last failed command, cleared by the next success.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// True once a full list has been applied.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn get(&self, id: &T::Key) -> Option<&T> {
        self.items.iter().find(|item| &item.entity_key() == id)
    }

    fn position(&self, id: &T::Key) -> Option<usize> {
        self.items.iter().position(|item| &item.entity_key() == id)
    }

    fn upsert(&mut self, entity: T) {
        match self.position(&entity.entity_key()) {
            Some(index) => self.items[index] = entity,
            None => self.items.push(entity),
        }
    }

    fn refresh_selected(&mut self, entity: &T) {
        if self
            .selected
            .as_ref()
            .is_some_and(|s| s.entity_key() == entity.entity_key())
        {
            self.selected = Some(entity.clone());
        }
    }
}

impl<T: Entity> Default for ViewCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Entity> ViewFeed<T> for ViewCache<T> {
    fn feed(&mut self, outcome: Outcome<T>) {
        self.last_error = None;
        match outcome {
            Outcome::Listed(items) => {
                self.items = items;
                self.loaded = true;
            }
            Outcome::Fetched(entity) => {
                if self.position(&entity.entity_key()).is_some() {
                    self.upsert(entity.clone());
                }
                self.selected = Some(entity);
            }
            Outcome::Created(entity) => self.items.push(entity),
            Outcome::Updated(entity) => {
                self.refresh_selected(&entity);
                self.upsert(entity);
            }
            Outcome::Deleted(id) => {
                self.items.retain(|item| item.entity_key().to_string() != id);
                if self
                    .selected
                    .as_ref()
                    .is_some_and(|s| s.entity_key().to_string() == id)
                {
                    self.selected = None;
                }
            }
        }
    }

    fn on_error(&mut self, error: &Error) {
        self.last_error = Some(error.to_string());
    }
}
