//! Correlation based re-ranking and result limiting for weighted phrases.

use serde::{Deserialize, Serialize};

/// Anything with a correlation key and a mutable weight.
pub trait Weighted {
    /// Key used for correlation lookups (a canonical stem).
    fn key(&self) -> &str;
    fn weight(&self) -> f64;
    fn set_weight(&mut self, weight: f64);
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReRankingMode {
    /// Keep the ranking as scored.
    #[default]
    None,
    /// Boost every item by its correlation with the top item.
    Shallow,
    /// Boost every pair of items by their mutual correlation.
    Deep,
}

impl ReRankingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Shallow => "shallow",
            Self::Deep => "deep",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "none" | "no" => Some(Self::None),
            "shallow" => Some(Self::Shallow),
            "deep" => Some(Self::Deep),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentMode {
    /// Keep the top `count` items.
    FixedCount,
    /// Keep items weighted above the threshold.
    Threshold,
    /// Keep the top `count`, plus any further items above the threshold.
    #[default]
    Combined,
}

impl AssignmentMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FixedCount => "fixed_count",
            Self::Threshold => "threshold",
            Self::Combined => "combined",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "fixed_count" | "fixed" | "count" => Some(Self::FixedCount),
            "threshold" => Some(Self::Threshold),
            "combined" => Some(Self::Combined),
            _ => None,
        }
    }
}

/// Sort by descending weight; equal weights by key.
pub fn sort_by_weight<T: Weighted>(items: &mut [T]) {
    items.sort_by(|a, b| {
        b.weight()
            .partial_cmp(&a.weight())
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.key().cmp(b.key()))
    });
}

/// Re-rank items using pairwise correlations, then re-sort and rescale the
/// weights back into the range they had before re-ranking.
///
/// `correlation(a, b)` returns the relative correlation of two keys.
pub fn rerank<T, F>(items: &mut [T], mode: ReRankingMode, correlation_weight: f64, correlation: F)
where
    T: Weighted,
    F: Fn(&str, &str) -> f64,
{
    sort_by_weight(items);
    if mode == ReRankingMode::None || items.len() < 2 {
        return;
    }

    let old_max = items[0].weight();
    let old_min = items[items.len() - 1].weight();

    match mode {
        ReRankingMode::None => {}
        ReRankingMode::Shallow => {
            let (top, rest) = items.split_at_mut(1);
            let top_key = top[0].key();
            for item in rest.iter_mut() {
                let boost = correlation_weight * correlation(top_key, item.key());
                item.set_weight(item.weight() + boost);
            }
        }
        ReRankingMode::Deep => {
            let n = items.len() as f64;
            let factor = correlation_weight / (n * (n - 1.0) / 2.0);
            let mut boosts = vec![0.0; items.len()];
            for i in 0..items.len() {
                for j in (i + 1)..items.len() {
                    let boost = factor * correlation(items[i].key(), items[j].key());
                    boosts[i] += boost;
                    boosts[j] += boost;
                }
            }
            for (item, boost) in items.iter_mut().zip(boosts) {
                item.set_weight(item.weight() + boost);
            }
        }
    }

    sort_by_weight(items);
    rescale(items, old_min, old_max);
}

/// Linearly map the current weight range of a sorted list onto `[min, max]`.
pub fn rescale<T: Weighted>(items: &mut [T], min: f64, max: f64) {
    let (Some(first), Some(last)) = (items.first(), items.last()) else {
        return;
    };
    let new_max = first.weight();
    let new_min = last.weight();
    if new_max == new_min {
        return;
    }
    let scale = (max - min) / (new_max - new_min);
    for item in items.iter_mut() {
        item.set_weight(min + (item.weight() - new_min) * scale);
    }
}

/// Keep the first `count` items of a sorted list.
pub fn limit_to_count<T>(items: &mut Vec<T>, count: usize) {
    items.truncate(count);
}

/// Drop items weighted below `min_weight`.
pub fn limit_to_weight<T: Weighted>(items: &mut Vec<T>, min_weight: f64) {
    items.retain(|i| i.weight() >= min_weight);
}

/// Apply an assignment mode to a sorted list.
pub fn limit<T: Weighted>(items: &mut Vec<T>, mode: AssignmentMode, count: usize, threshold: f64) {
    match mode {
        AssignmentMode::FixedCount => limit_to_count(items, count),
        AssignmentMode::Threshold => items.retain(|i| i.weight() > threshold),
        AssignmentMode::Combined => {
            let mut index = 0;
            items.retain(|i| {
                let keep = index < count || i.weight() > threshold;
                index += 1;
                keep
            });
        }
    }
}
