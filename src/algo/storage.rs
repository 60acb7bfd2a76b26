//! SQLite-backed store for trained models.
//!
//! Each model is keyed by `(name, kind)` and stored as a JSON blob with its
//! metadata. The storage layer is opt-in via the `store` feature.

use rusqlite::{params, Connection, OptionalExtension};

use super::model::{ModelKind, ModelMeta};
use crate::error::{Error, Result};

pub struct ModelStore {
    conn: Connection,
}

impl ModelStore {
    /// Open (or create) a model database at the given path.
    pub fn open_or_create(path: &str) -> Result<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS models (
                name           TEXT NOT NULL,
                kind           TEXT NOT NULL,
                version        TEXT NOT NULL,
                settings_hash  INTEGER NOT NULL,
                documents      INTEGER NOT NULL,
                created_at     INTEGER NOT NULL,
                payload        BLOB NOT NULL,
                UNIQUE(name, kind)
            );",
        )?;

        tracing::debug!(path, "opened model store");
        Ok(Self { conn })
    }

    /// Retrieve a model. Returns `None` when no model has this name and kind.
    pub fn get(&self, name: &str, kind: ModelKind) -> Result<Option<(ModelMeta, Vec<u8>)>> {
        let mut stmt = self.conn.prepare(
            "SELECT version, settings_hash, documents, created_at, payload
             FROM models
             WHERE name = ?1 AND kind = ?2",
        )?;

        let result = stmt
            .query_row(params![name, kind.as_str()], |row| {
                let version: String = row.get(0)?;
                let settings_hash: i64 = row.get(1)?;
                let documents: i64 = row.get(2)?;
                let created_at: i64 = row.get(3)?;
                let payload: Vec<u8> = row.get(4)?;
                Ok((version, settings_hash, documents, created_at, payload))
            })
            .optional()?;

        Ok(result.map(|(version, settings_hash, documents, created_at, payload)| {
            let meta = ModelMeta {
                name: name.to_string(),
                kind,
                version,
                settings_hash: settings_hash as u64,
                documents: documents as usize,
                created_at: created_at as u64,
            };
            (meta, payload)
        }))
    }

    /// Store (upsert) a model.
    pub fn put(&self, meta: &ModelMeta, payload: &[u8]) -> Result<()> {
        self.conn.execute(
            "INSERT INTO models (name, kind, version, settings_hash, documents, created_at, payload)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(name, kind)
             DO UPDATE SET version = excluded.version,
                           settings_hash = excluded.settings_hash,
                           documents = excluded.documents,
                           created_at = excluded.created_at,
                           payload = excluded.payload",
            params![
                meta.name,
                meta.kind.as_str(),
                meta.version,
                meta.settings_hash as i64,
                meta.documents as i64,
                meta.created_at as i64,
                payload,
            ],
        )?;
        tracing::info!(name = %meta.name, kind = meta.kind.as_str(), bytes = payload.len(), "stored model");
        Ok(())
    }

    /// Remove one model, or every model with the name when `kind` is None.
    pub fn remove(&self, name: &str, kind: Option<ModelKind>) -> Result<usize> {
        let deleted = match kind {
            Some(k) => self.conn.execute(
                "DELETE FROM models WHERE name = ?1 AND kind = ?2",
                params![name, k.as_str()],
            )?,
            None => self
                .conn
                .execute("DELETE FROM models WHERE name = ?1", params![name])?,
        };
        Ok(deleted)
    }

    /// Metadata of all stored models, newest first.
    pub fn list(&self) -> Result<Vec<ModelInfo>> {
        let mut stmt = self.conn.prepare(
            "SELECT name, kind, version, settings_hash, documents, created_at, length(payload)
             FROM models
             ORDER BY created_at DESC, name ASC",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, i64>(3)?,
                row.get::<_, i64>(4)?,
                row.get::<_, i64>(5)?,
                row.get::<_, i64>(6)?,
            ))
        })?;

        let mut result = Vec::new();
        for row in rows {
            let (name, kind, version, settings_hash, documents, created_at, bytes) = row?;
            let kind = ModelKind::from_str(&kind)
                .ok_or_else(|| Error::Model(format!("unknown model kind '{kind}' for '{name}'")))?;
            result.push(ModelInfo {
                meta: ModelMeta {
                    name,
                    kind,
                    version,
                    settings_hash: settings_hash as u64,
                    documents: documents as usize,
                    created_at: created_at as u64,
                },
                payload_bytes: bytes as usize,
            });
        }
        Ok(result)
    }

    /// Total size of the database file in bytes (approximate).
    pub fn db_size_bytes(&self) -> Result<u64> {
        let page_count: i64 = self
            .conn
            .query_row("PRAGMA page_count", [], |row| row.get(0))?;
        let page_size: i64 = self
            .conn
            .query_row("PRAGMA page_size", [], |row| row.get(0))?;
        Ok((page_count * page_size) as u64)
    }
}

/// One row of `ModelStore::list()`.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ModelInfo {
    #[serde(flatten)]
    pub meta: ModelMeta,
    pub payload_bytes: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_store() -> ModelStore {
        ModelStore::open_or_create(":memory:").unwrap()
    }

    #[test]
    fn empty_store_lists_nothing() {
        assert!(test_store().list().unwrap().is_empty());
    }

    #[test]
    fn put_and_get_roundtrip() {
        let store = test_store();
        let meta = ModelMeta::new("news", ModelKind::Tagger, 222, 50);
        store.put(&meta, b"tagger payload").unwrap();

        let (got, payload) = store.get("news", ModelKind::Tagger).unwrap().unwrap();
        assert_eq!(got, meta);
        assert_eq!(payload, b"tagger payload");
    }

    #[test]
    fn get_miss_returns_none() {
        let store = test_store();
        assert!(store.get("missing", ModelKind::Extractor).unwrap().is_none());
    }

    #[test]
    fn put_upsert_overwrites() {
        let store = test_store();
        store.put(&ModelMeta::new("news", ModelKind::Tagger, 1, 10), b"first").unwrap();
        store.put(&ModelMeta::new("news", ModelKind::Tagger, 2, 20), b"second").unwrap();

        let (meta, payload) = store.get("news", ModelKind::Tagger).unwrap().unwrap();
        assert_eq!(meta.documents, 20);
        assert_eq!(meta.settings_hash, 2);
        assert_eq!(payload, b"second");
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn kinds_are_independent() {
        let store = test_store();
        store.put(&ModelMeta::new("docs", ModelKind::Tagger, 1, 1), b"tagger").unwrap();
        store.put(&ModelMeta::new("docs", ModelKind::Extractor, 1, 1), b"extractor").unwrap();

        assert_eq!(store.get("docs", ModelKind::Tagger).unwrap().unwrap().1, b"tagger");
        assert_eq!(store.get("docs", ModelKind::Extractor).unwrap().unwrap().1, b"extractor");
    }

    #[test]
    fn remove_by_kind_and_name() {
        let store = test_store();
        store.put(&ModelMeta::new("docs", ModelKind::Tagger, 1, 1), b"t").unwrap();
        store.put(&ModelMeta::new("docs", ModelKind::Extractor, 1, 1), b"e").unwrap();

        assert_eq!(store.remove("docs", Some(ModelKind::Tagger)).unwrap(), 1);
        assert!(store.get("docs", ModelKind::Tagger).unwrap().is_none());
        assert!(store.get("docs", ModelKind::Extractor).unwrap().is_some());

        assert_eq!(store.remove("docs", None).unwrap(), 1);
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn list_includes_payload_size() {
        let store = test_store();
        store.put(&ModelMeta::new("big", ModelKind::Extractor, 1, 1), &vec![0u8; 1024]).unwrap();
        let list = store.list().unwrap();
        assert_eq!(list[0].payload_bytes, 1024);
        assert_eq!(list[0].meta.kind, ModelKind::Extractor);
    }

    #[test]
    fn db_size_bytes_nonzero() {
        assert!(test_store().db_size_bytes().unwrap() > 0);
    }
}
