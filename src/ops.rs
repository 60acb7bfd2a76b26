//! Shared operation wrappers for all interfaces (CLI, MCP, plugin).
//!
//! Each `op_*` function is a synchronous wrapper around one or more `algo`
//! modules. Input and output are `serde_json::Value`, with no dependency on
//! rmcp, clap, or nu-plugin.
//!
//! Models are JSON files by default. When the `store` feature is enabled and
//! a `store` path is given, the model argument names a model in the SQLite
//! model store instead.

use std::collections::HashSet;

use rayon::prelude::*;
use serde_json::{json, Value};

use crate::algo::collocation::collocations;
use crate::algo::dataset::DatasetEntry;
use crate::algo::evaluation;
use crate::algo::extractor::{ExtractorSettings, KeyphraseExtractor};
use crate::algo::keyphrase::{Extractor, Keyphrase};
use crate::algo::model::{self, ModelKind, ModelMeta};
use crate::algo::rerank::AssignmentMode;
use crate::algo::stem::{canonical, PhraseStemmer};
use crate::algo::tagger::{ControlledTagger, TaggerSettings, TaggingType};
use crate::algo::tokenizer;

#[cfg(feature = "store")]
use crate::algo::storage;

// ── Helpers ──────────────────────────────────────────────────────────────────

/// Extract a text field from a JSON object, returning "" if missing.
pub fn get_text(row: &Value, field: &str) -> String {
    row.get(field)
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string()
}

/// Extract tags from a JSON object: a list of strings, or one string
/// separated by `#` or `,`.
pub fn get_tags(row: &Value, field: &str) -> HashSet<String> {
    match row.get(field) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        Some(Value::String(s)) => s
            .split(['#', ','])
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect(),
        _ => HashSet::new(),
    }
}

/// Turn JSON rows into dataset entries.
pub fn entries_from_rows(rows: &[Value], field: &str, tags_field: &str) -> Vec<DatasetEntry> {
    rows.iter()
        .map(|r| DatasetEntry {
            text: get_text(r, field),
            tags: get_tags(r, tags_field),
        })
        .collect()
}

fn insert_column(mut row: Value, name: &str, value: Value) -> Value {
    if let Some(obj) = row.as_object_mut() {
        obj.insert(name.into(), value);
    }
    row
}

fn keyphrases_value(keyphrases: &[Keyphrase]) -> Value {
    serde_json::to_value(keyphrases).unwrap_or_else(|_| Value::Array(vec![]))
}

fn save_model(
    payload: Vec<u8>,
    model: &str,
    #[cfg_attr(not(feature = "store"), allow(unused))] meta: ModelMeta,
    store: Option<&str>,
) -> Result<(), String> {
    if let Some(store_path) = store {
        #[cfg(feature = "store")]
        {
            let db = storage::ModelStore::open_or_create(store_path).map_err(|e| e.to_string())?;
            return db.put(&meta, &payload).map_err(|e| e.to_string());
        }

        #[cfg(not(feature = "store"))]
        {
            let _ = store_path;
            return Err("Store feature not enabled. Build with --features store".into());
        }
    }
    std::fs::write(model, payload).map_err(|e| format!("Failed to write model '{model}': {e}"))
}

/// Read a model payload, with its store metadata when it came from a store.
fn load_payload(
    model: &str,
    kind: ModelKind,
    store: Option<&str>,
) -> Result<(Vec<u8>, Option<ModelMeta>), String> {
    if let Some(store_path) = store {
        #[cfg(feature = "store")]
        {
            let db = storage::ModelStore::open_or_create(store_path).map_err(|e| e.to_string())?;
            let (meta, payload) = db
                .get(model, kind)
                .map_err(|e| e.to_string())?
                .ok_or_else(|| format!("No {} model named '{model}' in '{store_path}'", kind.as_str()))?;
            return Ok((payload, Some(meta)));
        }

        #[cfg(not(feature = "store"))]
        {
            let _ = (store_path, kind);
            return Err("Store feature not enabled. Build with --features store".into());
        }
    }
    let payload = std::fs::read(model)
        .map_err(|e| format!("Failed to read {} model '{model}': {e}", kind.as_str()))?;
    Ok((payload, None))
}

/// Warn when stored metadata does not match the loaded model. Returns true
/// when the model is stale.
fn warn_if_stale(model: &str, meta: Option<&ModelMeta>, settings_hash: u64) -> bool {
    match meta {
        Some(meta) if !meta.is_current(settings_hash) => {
            tracing::warn!(
                name = model,
                version = %meta.version,
                stored_hash = meta.settings_hash,
                settings_hash,
                "model metadata does not match this version or its settings; retrain to refresh"
            );
            true
        }
        _ => false,
    }
}

pub fn load_tagger(model: &str, store: Option<&str>) -> Result<ControlledTagger, String> {
    let (payload, meta) = load_payload(model, ModelKind::Tagger, store)?;
    let tagger = ControlledTagger::from_json(&payload).map_err(|e| e.to_string())?;
    warn_if_stale(model, meta.as_ref(), model::settings_hash(tagger.settings()));
    Ok(tagger)
}

pub fn load_extractor(model: &str, store: Option<&str>) -> Result<KeyphraseExtractor, String> {
    let (payload, meta) = load_payload(model, ModelKind::Extractor, store)?;
    let extractor = KeyphraseExtractor::from_json(&payload).map_err(|e| e.to_string())?;
    warn_if_stale(model, meta.as_ref(), model::settings_hash(extractor.settings()));
    Ok(extractor)
}

// ── Training ─────────────────────────────────────────────────────────────────

/// Train a controlled tagger and save it to `model` (a file, or a store name).
pub fn op_train_tagger(
    entries: &[DatasetEntry],
    settings: TaggerSettings,
    model: &str,
    store: Option<&str>,
) -> Result<Value, String> {
    let hash = model::settings_hash(&settings);
    let mut tagger = ControlledTagger::new(settings).map_err(|e| e.to_string())?;
    for entry in entries {
        tagger.train(&entry.text, &entry.tags);
    }
    tagger.update_index();

    let payload = tagger.to_json().map_err(|e| e.to_string())?;
    let bytes = payload.len();
    let meta = ModelMeta::new(model, ModelKind::Tagger, hash, entries.len());
    save_model(payload, model, meta, store)?;

    Ok(json!({
        "model": model,
        "kind": ModelKind::Tagger.as_str(),
        "documents": entries.len(),
        "tagged_documents": tagger.train_count(),
        "vocabulary": tagger.vocabulary_len(),
        "settings_hash": hash,
        "bytes": bytes,
    }))
}

/// Train a keyphrase extractor and save it to `model` (a file, or a store name).
pub fn op_train_extractor(
    entries: &[DatasetEntry],
    settings: ExtractorSettings,
    model: &str,
    store: Option<&str>,
) -> Result<Value, String> {
    let hash = model::settings_hash(&settings);
    let mut extractor = KeyphraseExtractor::new(settings).map_err(|e| e.to_string())?;
    extractor.start_training();
    for entry in entries {
        extractor
            .train(&entry.text, &entry.tags)
            .map_err(|e| e.to_string())?;
    }
    extractor.end_training().map_err(|e| e.to_string())?;

    let payload = extractor.to_json().map_err(|e| e.to_string())?;
    let bytes = payload.len();
    let meta = ModelMeta::new(model, ModelKind::Extractor, hash, entries.len());
    save_model(payload, model, meta, store)?;

    let top: Vec<Value> = extractor
        .corpus()
        .top_keyphrases(10)
        .into_iter()
        .map(|(k, n)| json!({ "keyphrase": k, "count": n }))
        .collect();

    Ok(json!({
        "model": model,
        "kind": ModelKind::Extractor.as_str(),
        "documents": entries.len(),
        "keyphrase_documents": extractor.corpus().keyphrase_docs(),
        "top_keyphrases": top,
        "settings_hash": hash,
        "bytes": bytes,
    }))
}

// ── Assignment ───────────────────────────────────────────────────────────────

/// Tag every row with a trained tagger, adding a `_tags` column.
///
/// `count` switches the tagger to fixed-count assignment.
pub fn op_tag(
    rows: &[Value],
    field: &str,
    model: &str,
    store: Option<&str>,
    count: Option<usize>,
) -> Result<Value, String> {
    let mut tagger = load_tagger(model, store)?;
    if let Some(n) = count {
        let settings = TaggerSettings {
            tagging_type: TaggingType::FixedCount,
            tag_count: n,
            ..tagger.settings().clone()
        };
        tagger.set_settings(settings).map_err(|e| e.to_string())?;
    }
    Ok(tag_rows(&mut tagger, rows, field))
}

/// Tag rows with an already loaded tagger.
pub fn tag_rows(tagger: &mut ControlledTagger, rows: &[Value], field: &str) -> Value {
    let texts: Vec<String> = rows.iter().map(|r| get_text(r, field)).collect();
    let tags = tagger.tag_all(&texts);

    let output: Vec<Value> = rows
        .iter()
        .cloned()
        .zip(tags)
        .map(|(row, tags)| insert_column(row, "_tags", keyphrases_value(&tags)))
        .collect();
    Value::Array(output)
}

/// Extract keyphrases for every row, adding a `_keyphrases` column.
///
/// `count` switches the extractor to fixed-count assignment.
pub fn op_extract(
    rows: &[Value],
    field: &str,
    model: &str,
    store: Option<&str>,
    count: Option<usize>,
) -> Result<Value, String> {
    let mut extractor = load_extractor(model, store)?;
    if let Some(n) = count {
        let settings = ExtractorSettings {
            assignment_mode: AssignmentMode::FixedCount,
            keyphrase_count: n,
            ..extractor.settings().clone()
        };
        extractor.set_settings(settings).map_err(|e| e.to_string())?;
    }
    extract_rows(&mut extractor, rows, field)
}

/// Extract keyphrases with an already loaded extractor.
pub fn extract_rows(
    extractor: &mut KeyphraseExtractor,
    rows: &[Value],
    field: &str,
) -> Result<Value, String> {
    let mut output = Vec::with_capacity(rows.len());
    for row in rows {
        let keyphrases = extractor
            .extract(&get_text(row, field))
            .map_err(|e| e.to_string())?;
        output.push(insert_column(
            row.clone(),
            "_keyphrases",
            keyphrases_value(&keyphrases),
        ));
    }
    Ok(Value::Array(output))
}

// ── Text utilities ───────────────────────────────────────────────────────────

/// Stem phrases: per phrase the stemmed words and the canonical key.
pub fn op_stem(phrases: &[String]) -> Value {
    let stemmer = PhraseStemmer::new();
    let output: Vec<Value> = phrases
        .iter()
        .map(|phrase| {
            let stems: Vec<String> = tokenizer::words(phrase)
                .iter()
                .map(|w| stemmer.stem(w))
                .collect();
            json!({
                "phrase": phrase,
                "stems": stems,
                "key": canonical(&stems.join(" ")),
            })
        })
        .collect();
    Value::Array(output)
}

/// Detect collocations in each row, adding a `_collocations` column of
/// distinct phrases with their occurrence count. `min_len` below 2 is
/// treated as 2.
pub fn op_collocations(rows: &[Value], field: &str, min_len: usize, max_len: usize) -> Result<Value, String> {
    let min_len = min_len.max(2);
    if max_len < min_len {
        return Err(format!(
            "Invalid collocation length range {min_len}..={max_len} (minimum is 2)"
        ));
    }

    let per_row: Vec<Value> = rows
        .par_iter()
        .map(|row| {
            let stemmer = PhraseStemmer::new();
            let tokens = tokenizer::tokenize(&get_text(row, field), &stemmer);
            let grams = collocations(&tokens, min_len, max_len);

            let mut seen: Vec<(String, String, usize)> = Vec::new();
            for gram in grams {
                let value = gram.value.to_lowercase();
                match seen.iter_mut().find(|(_, stem, _)| *stem == gram.stem) {
                    Some(entry) => entry.2 += 1,
                    None => seen.push((value, gram.stem, 1)),
                }
            }
            seen.sort_by(|a, b| b.2.cmp(&a.2).then_with(|| a.0.cmp(&b.0)));
            Value::Array(
                seen.into_iter()
                    .map(|(value, stem, count)| json!({ "value": value, "stem": stem, "count": count }))
                    .collect(),
            )
        })
        .collect();

    let output: Vec<Value> = rows
        .iter()
        .cloned()
        .zip(per_row)
        .map(|(row, colls)| insert_column(row, "_collocations", colls))
        .collect();
    Ok(Value::Array(output))
}

// ── Evaluation ───────────────────────────────────────────────────────────────

/// Train a fresh model of `kind` on `train` and score it on `test`.
pub fn op_evaluate(
    train: &[DatasetEntry],
    test: &[DatasetEntry],
    kind: &str,
    tagger_settings: TaggerSettings,
    extractor_settings: ExtractorSettings,
) -> Result<Value, String> {
    let kind = ModelKind::from_str(kind)
        .ok_or_else(|| format!("Unknown model kind '{kind}'. Use: tagger, extractor"))?;
    let result = match kind {
        ModelKind::Tagger => {
            let mut tagger = ControlledTagger::new(tagger_settings).map_err(|e| e.to_string())?;
            evaluation::evaluate(&mut tagger, train, test)
        }
        ModelKind::Extractor => {
            let mut extractor =
                KeyphraseExtractor::new(extractor_settings).map_err(|e| e.to_string())?;
            evaluation::evaluate(&mut extractor, train, test)
        }
    }
    .map_err(|e| e.to_string())?;
    serde_json::to_value(result).map_err(|e| e.to_string())
}

// ── Model store operations ───────────────────────────────────────────────────

/// List the models in a store.
pub fn op_models(#[cfg_attr(not(feature = "store"), allow(unused))] store: &str) -> Result<Value, String> {
    #[cfg(feature = "store")]
    {
        let db = storage::ModelStore::open_or_create(store).map_err(|e| e.to_string())?;
        let models = db.list().map_err(|e| e.to_string())?;
        let size = db.db_size_bytes().map_err(|e| e.to_string())?;
        return Ok(json!({
            "path": store,
            "size_bytes": size,
            "total": models.len(),
            "models": serde_json::to_value(&models).map_err(|e| e.to_string())?,
        }));
    }

    #[cfg(not(feature = "store"))]
    Err("Store feature not enabled. Build with --features store".into())
}

/// Remove a model (all kinds when `kind` is None) from a store.
pub fn op_model_remove(
    #[cfg_attr(not(feature = "store"), allow(unused))] store: &str,
    #[cfg_attr(not(feature = "store"), allow(unused))] name: &str,
    kind: Option<&str>,
) -> Result<Value, String> {
    let model_kind = match kind {
        Some(k) => Some(
            ModelKind::from_str(k)
                .ok_or_else(|| format!("Unknown model kind '{k}'. Use: tagger, extractor"))?,
        ),
        None => None,
    };

    #[cfg(feature = "store")]
    {
        let db = storage::ModelStore::open_or_create(store).map_err(|e| e.to_string())?;
        let deleted = db.remove(name, model_kind).map_err(|e| e.to_string())?;
        return Ok(json!({
            "path": store,
            "name": name,
            "deleted": deleted,
            "kind": kind.unwrap_or("all"),
        }));
    }

    #[cfg(not(feature = "store"))]
    {
        let _ = model_kind;
        Err("Store feature not enabled. Build with --features store".into())
    }
}
