//! Model bank: one regression oracle per spending category
//!
//! # Architecture
//!
//! - `RegressionOracle` trait: an opaque `predict(features) -> amount` capability
//! - `TreeEnsemble`: gradient-boosted trees loaded from JSON artifacts
//! - `ModelBank`: the eight oracles, immutable after load and shared across requests
//!
//! # Artifacts
//!
//! The artifact directory holds `model_{Category}.json` for every
//! `SpendingCategory`. A missing or malformed artifact fails the load.

mod tree;

pub use tree::TreeEnsemble;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::info;

use crate::error::{Error, Result};
use crate::features::FeatureRow;
use crate::models::SpendingCategory;

/// A learned function from a feature row to a savings amount
///
/// Implementations hold no per-call state and may be invoked concurrently.
pub trait RegressionOracle: Send + Sync {
    /// Raw prediction; sign and magnitude are unconstrained
    fn predict(&self, row: &FeatureRow) -> f64;
}

impl<F> RegressionOracle for F
where
    F: Fn(&FeatureRow) -> f64 + Send + Sync,
{
    fn predict(&self, row: &FeatureRow) -> f64 {
        self(row)
    }
}

/// Identity of a loaded artifact
#[derive(Debug, Clone, Serialize)]
pub struct ArtifactFingerprint {
    pub category: SpendingCategory,
    pub path: PathBuf,
    /// Hex SHA-256 of the artifact bytes
    pub sha256: String,
    pub size_bytes: usize,
    pub trees: usize,
}

/// Regression oracles for every spending category
#[derive(Clone)]
pub struct ModelBank {
    oracles: BTreeMap<SpendingCategory, Arc<dyn RegressionOracle>>,
    fingerprints: Vec<ArtifactFingerprint>,
}

impl ModelBank {
    /// Load every category's tree ensemble from an artifact directory
    pub fn load(artifact_dir: &Path) -> Result<Self> {
        let mut oracles: BTreeMap<SpendingCategory, Arc<dyn RegressionOracle>> = BTreeMap::new();
        let mut fingerprints = Vec::with_capacity(SpendingCategory::all().len());

        for category in SpendingCategory::all() {
            let path = artifact_dir.join(category.artifact_file_name());
            let bytes = fs::read(&path).map_err(|e| {
                Error::ModelLoad(format!(
                    "missing model artifact for {} ({}): {}",
                    category,
                    path.display(),
                    e
                ))
            })?;

            let ensemble = TreeEnsemble::from_slice(&bytes)
                .map_err(|e| Error::ModelLoad(format!("{}: {}", path.display(), e)))?;

            let fingerprint = ArtifactFingerprint {
                category: *category,
                path: path.clone(),
                sha256: hex::encode(Sha256::digest(&bytes)),
                size_bytes: bytes.len(),
                trees: ensemble.tree_count(),
            };

            info!(
                category = %category,
                trees = fingerprint.trees,
                sha256 = %&fingerprint.sha256[..12],
                "Loaded savings model"
            );

            oracles.insert(*category, Arc::new(ensemble));
            fingerprints.push(fingerprint);
        }

        Ok(Self {
            oracles,
            fingerprints,
        })
    }

    /// Build a bank from in-memory oracles; every category must be present
    pub fn from_oracles(
        oracles: BTreeMap<SpendingCategory, Arc<dyn RegressionOracle>>,
    ) -> Result<Self> {
        if let Some(missing) = SpendingCategory::all()
            .iter()
            .find(|c| !oracles.contains_key(*c))
        {
            return Err(Error::ModelLoad(format!("no oracle for {}", missing)));
        }

        Ok(Self {
            oracles,
            fingerprints: Vec::new(),
        })
    }

    /// Raw prediction of the category's oracle
    pub fn predict(&self, category: SpendingCategory, row: &FeatureRow) -> f64 {
        // Constructors guarantee an oracle for every category
        self.oracles[&category].predict(row)
    }

    /// Fingerprints of file-backed artifacts, in category order
    pub fn fingerprints(&self) -> &[ArtifactFingerprint] {
        &self.fingerprints
    }

    pub fn len(&self) -> usize {
        self.oracles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.oracles.is_empty()
    }
}

impl std::fmt::Debug for ModelBank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelBank")
            .field("categories", &self.oracles.keys().collect::<Vec<_>>())
            .field("fingerprints", &self.fingerprints)
            .finish()
    }
}
