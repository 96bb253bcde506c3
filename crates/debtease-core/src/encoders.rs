//! Encoder store for categorical profile fields
//!
//! Each categorical field has a closed vocabulary fixed when the models were
//! trained. A label's code is its position in the vocabulary, matching the
//! `classes_` ordering of the fitted label encoders.
//!
//! The bundle is stored as `label_encoders.json`:
//!
//! ```json
//! {
//!   "Occupation": ["Professional", "Retired", "Self_Employed", "Student"],
//!   "City_Tier": ["Tier_1", "Tier_2", "Tier_3"]
//! }
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use tracing::info;

use crate::error::{Error, Result};
use crate::models::CategoricalField;

/// File name of the encoder bundle inside the artifact directory
pub const ENCODER_BUNDLE_FILE: &str = "label_encoders.json";

/// A fitted label encoder for one field
#[derive(Debug, Clone)]
pub struct LabelEncoder {
    classes: Vec<String>,
    codes: HashMap<String, usize>,
}

impl LabelEncoder {
    /// Build an encoder from its ordered vocabulary
    pub fn new(classes: Vec<String>) -> Result<Self> {
        if classes.is_empty() {
            return Err(Error::ModelLoad("encoder vocabulary is empty".into()));
        }

        let mut codes = HashMap::with_capacity(classes.len());
        for (code, label) in classes.iter().enumerate() {
            if codes.insert(label.clone(), code).is_some() {
                return Err(Error::ModelLoad(format!(
                    "duplicate label '{}' in encoder vocabulary",
                    label
                )));
            }
        }

        Ok(Self { classes, codes })
    }

    pub fn encode(&self, label: &str) -> Option<usize> {
        self.codes.get(label).copied()
    }

    pub fn decode(&self, code: usize) -> Option<&str> {
        self.classes.get(code).map(String::as_str)
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }
}

/// Label encoders for every categorical field, immutable after load
#[derive(Debug, Clone)]
pub struct EncoderStore {
    encoders: HashMap<CategoricalField, LabelEncoder>,
}

impl EncoderStore {
    /// Load the encoder bundle from an artifact directory
    pub fn load(artifact_dir: &Path) -> Result<Self> {
        let path = artifact_dir.join(ENCODER_BUNDLE_FILE);
        let content = fs::read_to_string(&path).map_err(|e| {
            Error::ModelLoad(format!(
                "failed to read encoder bundle {}: {}",
                path.display(),
                e
            ))
        })?;

        let store = Self::from_json(&content)?;
        info!(
            path = %path.display(),
            occupations = store.classes_of(CategoricalField::Occupation).len(),
            city_tiers = store.classes_of(CategoricalField::CityTier).len(),
            "Loaded label encoders"
        );
        Ok(store)
    }

    /// Parse an encoder bundle
    pub fn from_json(content: &str) -> Result<Self> {
        let raw: BTreeMap<String, Vec<String>> = serde_json::from_str(content)
            .map_err(|e| Error::ModelLoad(format!("invalid encoder bundle: {}", e)))?;

        let mut encoders = HashMap::new();
        for field in CategoricalField::all() {
            let classes = raw.get(field.as_str()).cloned().ok_or_else(|| {
                Error::ModelLoad(format!("encoder bundle has no '{}' encoder", field))
            })?;
            let encoder = LabelEncoder::new(classes)
                .map_err(|e| Error::ModelLoad(format!("{} encoder: {}", field, e)))?;
            encoders.insert(*field, encoder);
        }

        Ok(Self { encoders })
    }

    /// Build a store from explicit vocabularies
    pub fn from_classes(
        occupations: Vec<String>,
        city_tiers: Vec<String>,
    ) -> Result<Self> {
        let mut encoders = HashMap::new();
        encoders.insert(CategoricalField::Occupation, LabelEncoder::new(occupations)?);
        encoders.insert(CategoricalField::CityTier, LabelEncoder::new(city_tiers)?);
        Ok(Self { encoders })
    }

    /// Encode a label, failing if it is outside the training vocabulary
    pub fn encode(&self, field: CategoricalField, label: &str) -> Result<usize> {
        self.encoder(field)
            .encode(label)
            .ok_or_else(|| Error::UnknownCategory {
                field: field.as_str().to_string(),
                label: label.to_string(),
            })
    }

    /// Decode a code back into its label
    pub fn decode(&self, field: CategoricalField, code: usize) -> Result<&str> {
        self.encoder(field).decode(code).ok_or_else(|| {
            Error::InvalidInput(format!("{} code {} is out of range", field, code))
        })
    }

    /// Valid labels for a field, in code order
    pub fn classes_of(&self, field: CategoricalField) -> &[String] {
        self.encoder(field).classes()
    }

    fn encoder(&self, field: CategoricalField) -> &LabelEncoder {
        // Both constructors insert every field
        &self.encoders[&field]
    }
}
