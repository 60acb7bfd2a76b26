//! Candidate ranking model: bagged logistic regression.
//!
//! Each bag is fit on a bootstrap sample of the standardized training
//! features with L2-regularized batch gradient descent. The regression value
//! of a candidate is the mean predicted probability over all bags.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::sampling;
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierSettings {
    /// Number of bootstrap bags.
    pub bags: usize,
    /// Gradient descent iterations per bag.
    pub iterations: usize,
    pub learning_rate: f64,
    /// L2 penalty on the weights.
    pub l2: f64,
    pub seed: u64,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            bags: 10,
            iterations: 300,
            learning_rate: 0.5,
            l2: 1e-3,
            seed: 42,
        }
    }
}

/// Z-score scaling fitted on the training data.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Standardizer {
    mean: Vec<f64>,
    std: Vec<f64>,
}

impl Standardizer {
    fn fit(samples: &[Vec<f64>], dim: usize) -> Self {
        let n = samples.len().max(1) as f64;
        let mut mean = vec![0.0; dim];
        for s in samples {
            for (m, v) in mean.iter_mut().zip(s) {
                *m += v / n;
            }
        }
        let mut std = vec![0.0; dim];
        for s in samples {
            for ((sd, v), m) in std.iter_mut().zip(s).zip(&mean) {
                *sd += (v - m).powi(2) / n;
            }
        }
        for sd in std.iter_mut() {
            *sd = sd.sqrt();
            if *sd < 1e-12 {
                *sd = 1.0;
            }
        }
        Self { mean, std }
    }

    fn transform(&self, x: &[f64]) -> Vec<f64> {
        x.iter()
            .zip(&self.mean)
            .zip(&self.std)
            .map(|((v, m), s)| (v - m) / s)
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LogisticModel {
    weights: Vec<f64>,
    bias: f64,
}

impl LogisticModel {
    fn fit(x: &[Vec<f64>], y: &[f64], settings: &ClassifierSettings) -> Self {
        let dim = x.first().map(Vec::len).unwrap_or(0);
        let n = x.len().max(1) as f64;
        let mut weights = vec![0.0; dim];
        let mut bias = 0.0;

        for _ in 0..settings.iterations {
            let mut grad_w = vec![0.0; dim];
            let mut grad_b = 0.0;
            for (xi, &yi) in x.iter().zip(y) {
                let err = sigmoid(dot(&weights, xi) + bias) - yi;
                for (g, v) in grad_w.iter_mut().zip(xi) {
                    *g += err * v;
                }
                grad_b += err;
            }
            for (w, g) in weights.iter_mut().zip(&grad_w) {
                *w -= settings.learning_rate * (g / n + settings.l2 * *w);
            }
            bias -= settings.learning_rate * grad_b / n;
        }

        Self { weights, bias }
    }

    fn predict(&self, x: &[f64]) -> f64 {
        sigmoid(dot(&self.weights, x) + self.bias)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CandidateClassifier {
    settings: ClassifierSettings,
    scaler: Option<Standardizer>,
    models: Vec<LogisticModel>,
}

impl CandidateClassifier {
    pub fn new(settings: ClassifierSettings) -> Self {
        Self {
            settings,
            scaler: None,
            models: Vec::new(),
        }
    }

    /// Fit the model. Requires at least one positive and one negative sample.
    pub fn train(&mut self, samples: &[Vec<f64>], labels: &[bool]) -> Result<()> {
        if samples.is_empty() {
            return Err(Error::Training("no training samples".into()));
        }
        if samples.len() != labels.len() {
            return Err(Error::Training(format!(
                "{} samples but {} labels",
                samples.len(),
                labels.len()
            )));
        }
        let dim = samples[0].len();
        if samples.iter().any(|s| s.len() != dim) {
            return Err(Error::Training("inconsistent feature dimensions".into()));
        }
        let positives = labels.iter().filter(|&&l| l).count();
        if positives == 0 || positives == labels.len() {
            return Err(Error::Training(
                "training data needs positive and negative samples".into(),
            ));
        }

        let scaler = Standardizer::fit(samples, dim);
        let x: Vec<Vec<f64>> = samples.iter().map(|s| scaler.transform(s)).collect();
        let y: Vec<f64> = labels.iter().map(|&l| if l { 1.0 } else { 0.0 }).collect();

        let settings = &self.settings;
        let bags = settings.bags.max(1);
        let models: Vec<LogisticModel> = (0..bags)
            .into_par_iter()
            .map(|bag| {
                let indices =
                    sampling::bootstrap_sample(x.len(), settings.seed.wrapping_add(bag as u64));
                let bx: Vec<Vec<f64>> = indices.iter().map(|&i| x[i].clone()).collect();
                let by: Vec<f64> = indices.iter().map(|&i| y[i]).collect();
                LogisticModel::fit(&bx, &by, settings)
            })
            .collect();

        tracing::debug!(
            samples = samples.len(),
            positives,
            bags,
            "trained candidate classifier"
        );
        self.scaler = Some(scaler);
        self.models = models;
        Ok(())
    }

    /// Mean probability over all bags that the features describe a keyphrase.
    pub fn predict(&self, features: &[f64]) -> Result<f64> {
        let scaler = self
            .scaler
            .as_ref()
            .ok_or_else(|| Error::Model("classifier is not trained".into()))?;
        if features.len() != scaler.mean.len() {
            return Err(Error::Model(format!(
                "expected {} features, got {}",
                scaler.mean.len(),
                features.len()
            )));
        }
        let x = scaler.transform(features);
        let sum: f64 = self.models.iter().map(|m| m.predict(&x)).sum();
        Ok(sum / self.models.len().max(1) as f64)
    }

    pub fn is_trained(&self) -> bool {
        self.scaler.is_some() && !self.models.is_empty()
    }

    pub fn settings(&self) -> &ClassifierSettings {
        &self.settings
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
