//! Database catalog
//!
//! Holds the containers of one database by name. Container creation goes
//! through the DashMap entry API, so the existence check and the insert
//! happen under the same shard lock: concurrent `create_container_if_absent`
//! calls for one name create exactly one container.
//!
//! Deleting a container (or the whole database) removes it from the map and
//! marks the store deleted, which drops its documents and makes every live
//! handle to it fail with `NotFound`.

use crate::container::{ContainerOptions, ContainerStore};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use docstore_core::{validate_name, Error, PartitionKeyPath, ResourceKind, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Containers of one database
#[derive(Debug)]
pub struct DatabaseCatalog {
    name: String,
    options: ContainerOptions,
    containers: DashMap<String, Arc<ContainerStore>>,
    deleted: AtomicBool,
}

impl DatabaseCatalog {
    /// Create an empty database
    ///
    /// # Errors
    ///
    /// `InvalidName` for an empty or reserved-character name.
    pub fn new(name: impl Into<String>, options: ContainerOptions) -> Result<Self> {
        let name = name.into();
        validate_name(ResourceKind::Database, &name)?;
        Ok(DatabaseCatalog {
            name,
            options,
            containers: DashMap::new(),
            deleted: AtomicBool::new(false),
        })
    }

    /// Database name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Options applied to new containers
    pub fn options(&self) -> ContainerOptions {
        self.options
    }

    /// True once the database has been deleted
    pub fn is_deleted(&self) -> bool {
        self.deleted.load(Ordering::SeqCst)
    }

    /// Get or create a container
    ///
    /// Returns the container and whether this call created it. An existing
    /// container is returned unchanged when its partition key path matches.
    ///
    /// # Errors
    ///
    /// - `ContainerConfigConflict` if it exists with a different path
    /// - `InvalidName` for a bad container name
    /// - `NotFound` if the database has been deleted
    pub fn create_container_if_absent(
        &self,
        name: &str,
        partition_key_path: PartitionKeyPath,
    ) -> Result<(Arc<ContainerStore>, bool)> {
        validate_name(ResourceKind::Container, name)?;
        self.ensure_live()?;

        match self.containers.entry(name.to_string()) {
            Entry::Occupied(entry) => {
                let existing = entry.get();
                if existing.partition_key_path() != &partition_key_path {
                    return Err(Error::ContainerConfigConflict {
                        container: name.to_string(),
                        existing: existing.partition_key_path().to_string(),
                        requested: partition_key_path.to_string(),
                    });
                }
                Ok((Arc::clone(existing), false))
            }
            Entry::Vacant(entry) => {
                // mark_deleted sweeps shards after setting the flag
                self.ensure_live()?;
                let store = Arc::new(ContainerStore::new(
                    name,
                    partition_key_path,
                    self.options,
                )?);
                entry.insert(Arc::clone(&store));
                Ok((store, true))
            }
        }
    }

    /// Create a container that must not exist yet
    ///
    /// # Errors
    ///
    /// `AlreadyExists` if a container with this name exists, whatever its path.
    pub fn create_container(
        &self,
        name: &str,
        partition_key_path: PartitionKeyPath,
    ) -> Result<Arc<ContainerStore>> {
        validate_name(ResourceKind::Container, name)?;
        self.ensure_live()?;

        match self.containers.entry(name.to_string()) {
            Entry::Occupied(_) => Err(Error::already_exists(ResourceKind::Container, name)),
            Entry::Vacant(entry) => {
                self.ensure_live()?;
                let store = Arc::new(ContainerStore::new(
                    name,
                    partition_key_path,
                    self.options,
                )?);
                entry.insert(Arc::clone(&store));
                Ok(store)
            }
        }
    }

    /// Look up a container
    pub fn container(&self, name: &str) -> Result<Arc<ContainerStore>> {
        self.ensure_live()?;
        self.containers
            .get(name)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| Error::not_found(ResourceKind::Container, name))
    }

    /// Delete a container and every document in it
    pub fn delete_container(&self, name: &str) -> Result<()> {
        self.ensure_live()?;
        let (_, store) = self
            .containers
            .remove(name)
            .ok_or_else(|| Error::not_found(ResourceKind::Container, name))?;
        store.mark_deleted();
        Ok(())
    }

    /// Delete `store` if it is still the container registered under its name
    ///
    /// A handle to a container that was deleted and recreated fails with
    /// `NotFound` instead of deleting the new container.
    pub fn delete_container_store(&self, store: &Arc<ContainerStore>) -> Result<()> {
        self.ensure_live()?;
        let (_, removed) = self
            .containers
            .remove_if(store.name(), |_, current| Arc::ptr_eq(current, store))
            .ok_or_else(|| Error::not_found(ResourceKind::Container, store.name()))?;
        removed.mark_deleted();
        Ok(())
    }

    /// Container names, sorted
    pub fn list_containers(&self) -> Vec<String> {
        if self.is_deleted() {
            return Vec::new();
        }
        let mut names: Vec<String> = self
            .containers
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        names.sort();
        names
    }

    /// Container stores, sorted by name
    pub fn containers(&self) -> Vec<Arc<ContainerStore>> {
        if self.is_deleted() {
            return Vec::new();
        }
        let mut stores: Vec<Arc<ContainerStore>> = self
            .containers
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        stores.sort_by(|a, b| a.name().cmp(b.name()));
        stores
    }

    /// Number of containers
    pub fn container_count(&self) -> usize {
        self.containers.len()
    }

    /// Flag the database deleted and cascade to every container
    pub fn mark_deleted(&self) {
        self.deleted.store(true, Ordering::SeqCst);
        self.containers.retain(|_, store| {
            store.mark_deleted();
            false
        });
    }

    fn ensure_live(&self) -> Result<()> {
        if self.is_deleted() {
            Err(Error::not_found(ResourceKind::Database, self.name.clone()))
        } else {
            Ok(())
        }
    }
}
