//! Model kinds, metadata and settings hashing for stored models.
//!
//! This module is always compiled (no feature gate). Only the storage backend
//! (`storage.rs`) requires the `store` feature with rusqlite.

use serde::{Deserialize, Serialize};
use siphasher::sip::SipHasher13;
use std::hash::{Hash, Hasher};
use std::time::{SystemTime, UNIX_EPOCH};

/// Trained model types that can be kept in the model store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    Tagger,
    Extractor,
}

impl ModelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tagger => "tagger",
            Self::Extractor => "extractor",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "tagger" => Some(Self::Tagger),
            "extractor" => Some(Self::Extractor),
            _ => None,
        }
    }
}

/// Metadata stored alongside a model payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMeta {
    pub name: String,
    pub kind: ModelKind,
    /// Crate version that trained the model.
    pub version: String,
    /// SipHash of the serialized training settings.
    pub settings_hash: u64,
    /// Number of training documents.
    pub documents: usize,
    /// Unix timestamp of creation.
    pub created_at: u64,
}

impl ModelMeta {
    /// Metadata with the current version and timestamp.
    pub fn new(name: &str, kind: ModelKind, settings_hash: u64, documents: usize) -> Self {
        let created_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        Self {
            name: name.to_string(),
            kind,
            version: env!("CARGO_PKG_VERSION").to_string(),
            settings_hash,
            documents,
            created_at,
        }
    }

    /// Whether the model was trained by this version with the given settings.
    pub fn is_current(&self, settings_hash: u64) -> bool {
        self.settings_hash == settings_hash && self.version == env!("CARGO_PKG_VERSION")
    }
}

/// Hash training settings: serialize to JSON, then SipHash the string.
pub fn settings_hash(settings: &impl Serialize) -> u64 {
    let json = serde_json::to_string(settings).unwrap_or_default();
    let mut hasher = SipHasher13::new();
    json.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::tagger::TaggerSettings;

    #[test]
    fn kind_roundtrip() {
        for kind in [ModelKind::Tagger, ModelKind::Extractor] {
            assert_eq!(ModelKind::from_str(kind.as_str()), Some(kind));
        }
        assert_eq!(ModelKind::from_str("unknown"), None);
    }

    #[test]
    fn settings_hash_changes_with_settings() {
        let a = TaggerSettings::default();
        let b = TaggerSettings {
            tag_count: 3,
            ..Default::default()
        };
        assert_eq!(settings_hash(&a), settings_hash(&a.clone()));
        assert_ne!(settings_hash(&a), settings_hash(&b));
    }

    #[test]
    fn meta_current_version() {
        let meta = ModelMeta::new("news", ModelKind::Tagger, 7, 100);
        assert_eq!(meta.version, env!("CARGO_PKG_VERSION"));
        assert!(meta.created_at > 0);
        assert!(meta.is_current(7));
        assert!(!meta.is_current(8));
    }

    #[test]
    fn old_version_is_not_current() {
        let mut meta = ModelMeta::new("news", ModelKind::Extractor, 7, 1);
        meta.version = "0.0.0".into();
        assert!(!meta.is_current(7));
    }

    #[test]
    fn meta_serde_roundtrip() {
        let meta = ModelMeta::new("docs", ModelKind::Extractor, 12345, 10);
        let json = serde_json::to_string(&meta).unwrap();
        assert!(json.contains("\"extractor\""));
        let parsed: ModelMeta = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, meta);
    }
}
