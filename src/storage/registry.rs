//! Location and bin registry
//!
//! Plain CRUD over the `locations` and `bins` tables. Deleting a location
//! removes its bins and, through them, their fill events.

use rusqlite::{params, OptionalExtension};

use crate::storage::database::Database;
use crate::storage::error::{StorageError, StorageResult};
use crate::storage::types::{Bin, BinId, Location, LocationId};

/// Registry of locations and the bins placed at them
#[derive(Debug, Clone)]
pub struct Registry {
    db: Database,
}

impl Registry {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    // ============================================
    // LOCATIONS
    // ============================================

    pub async fn create_location(
        &self,
        name: impl Into<String>,
        details: impl Into<String>,
    ) -> StorageResult<Location> {
        let name = name.into();
        let details = details.into();

        self.db
            .run(move |conn| {
                conn.execute(
                    "INSERT INTO locations (name, details) VALUES (?1, ?2)",
                    params![name, details],
                )?;
                Ok(Location {
                    id: conn.last_insert_rowid(),
                    name,
                    details,
                })
            })
            .await
    }

    pub async fn list_locations(&self) -> StorageResult<Vec<Location>> {
        self.db
            .run(|conn| {
                let mut stmt =
                    conn.prepare_cached("SELECT id, name, details FROM locations ORDER BY id")?;
                let locations = stmt
                    .query_map([], |row| {
                        Ok(Location {
                            id: row.get(0)?,
                            name: row.get(1)?,
                            details: row.get(2)?,
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(locations)
            })
            .await
    }

    pub async fn get_location(&self, id: LocationId) -> StorageResult<Location> {
        self.db
            .run(move |conn| {
                conn.query_row(
                    "SELECT id, name, details FROM locations WHERE id = ?1",
                    params![id],
                    |row| {
                        Ok(Location {
                            id: row.get(0)?,
                            name: row.get(1)?,
                            details: row.get(2)?,
                        })
                    },
                )
                .optional()?
                .ok_or_else(|| StorageError::location_not_found(id))
            })
            .await
    }

    pub async fn update_location(
        &self,
        id: LocationId,
        name: impl Into<String>,
        details: impl Into<String>,
    ) -> StorageResult<Location> {
        let name = name.into();
        let details = details.into();

        self.db
            .run(move |conn| {
                let changed = conn.execute(
                    "UPDATE locations SET name = ?1, details = ?2 WHERE id = ?3",
                    params![name, details, id],
                )?;
                if changed == 0 {
                    return Err(StorageError::location_not_found(id));
                }
                Ok(Location { id, name, details })
            })
            .await
    }

    /// Delete a location together with its bins and their events
    pub async fn delete_location(&self, id: LocationId) -> StorageResult<()> {
        self.db
            .run(move |conn| {
                let tx = conn.transaction()?;

                // Explicit so the cascade holds even with foreign keys off
                tx.execute(
                    "DELETE FROM fill_events WHERE bin_id IN (SELECT id FROM bins WHERE location_id = ?1)",
                    params![id],
                )?;
                tx.execute("DELETE FROM bins WHERE location_id = ?1", params![id])?;
                let changed = tx.execute("DELETE FROM locations WHERE id = ?1", params![id])?;

                if changed == 0 {
                    return Err(StorageError::location_not_found(id));
                }

                tx.commit()?;
                Ok(())
            })
            .await?;

        tracing::info!(location_id = id, "Deleted location");
        Ok(())
    }

    // ============================================
    // BINS
    // ============================================

    pub async fn create_bin(
        &self,
        location_id: LocationId,
        description: impl Into<String>,
    ) -> StorageResult<Bin> {
        let description = description.into();

        self.db
            .run(move |conn| {
                conn.execute(
                    "INSERT INTO bins (location_id, description) VALUES (?1, ?2)",
                    params![location_id, description],
                )?;
                Ok(Bin {
                    id: conn.last_insert_rowid(),
                    location_id,
                    description,
                })
            })
            .await
    }

    pub async fn list_bins(&self) -> StorageResult<Vec<Bin>> {
        self.select_bins(None).await
    }

    pub async fn list_bins_by_location(&self, location_id: LocationId) -> StorageResult<Vec<Bin>> {
        self.select_bins(Some(location_id)).await
    }

    async fn select_bins(&self, location_id: Option<LocationId>) -> StorageResult<Vec<Bin>> {
        self.db
            .run(move |conn| {
                let mut stmt = conn.prepare_cached(
                    "SELECT id, location_id, description FROM bins
                     WHERE (?1 IS NULL OR location_id = ?1)
                     ORDER BY id",
                )?;
                let bins = stmt
                    .query_map(params![location_id], |row| {
                        Ok(Bin {
                            id: row.get(0)?,
                            location_id: row.get(1)?,
                            description: row.get(2)?,
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(bins)
            })
            .await
    }

    pub async fn get_bin(&self, id: BinId) -> StorageResult<Bin> {
        self.db
            .run(move |conn| {
                conn.query_row(
                    "SELECT id, location_id, description FROM bins WHERE id = ?1",
                    params![id],
                    |row| {
                        Ok(Bin {
                            id: row.get(0)?,
                            location_id: row.get(1)?,
                            description: row.get(2)?,
                        })
                    },
                )
                .optional()?
                .ok_or_else(|| StorageError::bin_not_found(id))
            })
            .await
    }

    pub async fn update_bin(
        &self,
        id: BinId,
        location_id: LocationId,
        description: impl Into<String>,
    ) -> StorageResult<Bin> {
        let description = description.into();

        self.db
            .run(move |conn| {
                let changed = conn.execute(
                    "UPDATE bins SET location_id = ?1, description = ?2 WHERE id = ?3",
                    params![location_id, description, id],
                )?;
                if changed == 0 {
                    return Err(StorageError::bin_not_found(id));
                }
                Ok(Bin {
                    id,
                    location_id,
                    description,
                })
            })
            .await
    }

    /// Delete a bin together with its events
    pub async fn delete_bin(&self, id: BinId) -> StorageResult<()> {
        self.db
            .run(move |conn| {
                let tx = conn.transaction()?;
                tx.execute("DELETE FROM fill_events WHERE bin_id = ?1", params![id])?;
                let changed = tx.execute("DELETE FROM bins WHERE id = ?1", params![id])?;

                if changed == 0 {
                    return Err(StorageError::bin_not_found(id));
                }

                tx.commit()?;
                Ok(())
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::database::StorageConfig;
    use crate::storage::event_store::{EventStore, SqliteEventStore};
    use crate::storage::types::{Event, EventFilter};
    use tempfile::tempdir;

    async fn create_test_registry() -> (Registry, Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db = Database::open(StorageConfig::new(dir.path())).await.unwrap();
        (Registry::new(db.clone()), db, dir)
    }

    #[tokio::test]
    async fn test_location_crud() {
        let (registry, _db, _dir) = create_test_registry().await;

        let created = registry.create_location("Library", "2nd floor").await.unwrap();
        assert_eq!(registry.get_location(created.id).await.unwrap(), created);

        let updated = registry
            .update_location(created.id, "Library", "ground floor")
            .await
            .unwrap();
        assert_eq!(updated.details, "ground floor");

        assert_eq!(registry.list_locations().await.unwrap(), vec![updated]);

        registry.delete_location(created.id).await.unwrap();
        assert!(registry.list_locations().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_location() {
        let (registry, _db, _dir) = create_test_registry().await;

        let err = registry.get_location(99).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound { kind: "Location", id: 99 }));

        assert!(registry.update_location(99, "x", "").await.is_err());
        assert!(registry.delete_location(99).await.is_err());
    }

    #[tokio::test]
    async fn test_bins_by_location() {
        let (registry, _db, _dir) = create_test_registry().await;

        let north = registry.create_location("North", "").await.unwrap();
        let south = registry.create_location("South", "").await.unwrap();

        let a = registry.create_bin(north.id, "a").await.unwrap();
        let b = registry.create_bin(south.id, "b").await.unwrap();
        let c = registry.create_bin(north.id, "c").await.unwrap();

        assert_eq!(
            registry.list_bins_by_location(north.id).await.unwrap(),
            vec![a.clone(), c.clone()]
        );
        assert_eq!(registry.list_bins().await.unwrap(), vec![a, b, c]);
    }

    #[tokio::test]
    async fn test_bin_requires_location() {
        let (registry, _db, _dir) = create_test_registry().await;

        let err = registry.create_bin(7, "orphan").await.unwrap_err();
        assert!(matches!(err, StorageError::Constraint(_)));
    }

    #[tokio::test]
    async fn test_move_bin() {
        let (registry, _db, _dir) = create_test_registry().await;

        let north = registry.create_location("North", "").await.unwrap();
        let south = registry.create_location("South", "").await.unwrap();
        let bin = registry.create_bin(north.id, "caps").await.unwrap();

        let moved = registry.update_bin(bin.id, south.id, "caps").await.unwrap();
        assert_eq!(moved.location_id, south.id);
        assert_eq!(registry.get_bin(bin.id).await.unwrap(), moved);
    }

    #[tokio::test]
    async fn test_delete_location_cascades_to_events() {
        let (registry, db, _dir) = create_test_registry().await;
        let store = SqliteEventStore::new(db);

        let keep = registry.create_location("Keep", "").await.unwrap();
        let gone = registry.create_location("Gone", "").await.unwrap();
        let kept_bin = registry.create_bin(keep.id, "").await.unwrap();
        let dropped_bin = registry.create_bin(gone.id, "").await.unwrap();

        store.append(Event::new(kept_bin.id, 100.0, true)).await.unwrap();
        store.append(Event::new(dropped_bin.id, 200.0, true)).await.unwrap();

        registry.delete_location(gone.id).await.unwrap();

        assert!(registry.get_bin(dropped_bin.id).await.is_err());
        assert!(store
            .query(EventFilter::for_bin(dropped_bin.id))
            .await
            .unwrap()
            .is_empty());
        assert_eq!(
            store.query(EventFilter::for_bin(kept_bin.id)).await.unwrap().len(),
            1
        );
    }

    #[tokio::test]
    async fn test_delete_bin_removes_its_events() {
        let (registry, db, _dir) = create_test_registry().await;
        let store = SqliteEventStore::new(db);

        let location = registry.create_location("Gym", "").await.unwrap();
        let bin = registry.create_bin(location.id, "").await.unwrap();
        store.append(Event::new(bin.id, 300.0, false)).await.unwrap();

        registry.delete_bin(bin.id).await.unwrap();

        assert_eq!(store.count().await.unwrap(), 0);
    }
}
