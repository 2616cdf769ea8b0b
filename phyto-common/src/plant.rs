//! Plant catalog model
//!
//! Field names follow the bundled catalog JSON (camelCase). Enumerated values
//! keep the wire spellings of the plant data source.

use serde::{Deserialize, Serialize};

/// One plant species in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    /// Stable identifier (also the classifier class name)
    pub id: String,
    pub scientific_name: String,
    pub common_names: CommonNames,
    pub family: String,
    pub genus: String,
    pub species: String,
    pub description: String,
    #[serde(default)]
    pub plant_type: PlantType,
    #[serde(default)]
    pub parts_used: Vec<String>,
    #[serde(default)]
    pub properties: Vec<MedicinalProperty>,
    #[serde(default)]
    pub traditional_uses: Vec<TraditionalUse>,
    #[serde(default)]
    pub safety: SafetyInfo,
    #[serde(default)]
    pub scientific_status: ScientificStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
}

/// French common name plus local vernacular names
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommonNames {
    #[serde(default)]
    pub fr: String,
    #[serde(default)]
    pub local: Vec<String>,
}

/// Growth habit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlantType {
    #[serde(rename = "arbre")]
    Tree,
    #[serde(rename = "arbuste")]
    Shrub,
    #[serde(rename = "herbe")]
    Herb,
    #[serde(rename = "liane")]
    Vine,
    /// Value not recognized (e.g. a newer remote vocabulary)
    #[default]
    #[serde(other)]
    Unknown,
}

impl PlantType {
    /// Parse a wire value, mapping anything unrecognized to `Unknown`
    pub fn from_wire(value: &str) -> Self {
        match value {
            "arbre" => Self::Tree,
            "arbuste" => Self::Shrub,
            "herbe" => Self::Herb,
            "liane" => Self::Vine,
            _ => Self::Unknown,
        }
    }
}

/// Medicinal property with its evidence level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicinalProperty {
    #[serde(default)]
    pub id: String,
    /// e.g. "antiseptique", "antipaludique"
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    #[serde(default)]
    pub evidence_level: EvidenceLevel,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EvidenceLevel {
    #[default]
    #[serde(rename = "traditionnel")]
    Traditional,
    #[serde(rename = "preliminaire")]
    Preliminary,
    #[serde(rename = "clinique")]
    Clinical,
}

/// Traditional preparation and indication
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraditionalUse {
    #[serde(default)]
    pub id: String,
    /// e.g. "tisane", "décoction", "cataplasme"
    pub preparation: String,
    pub indication: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipe: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafetyInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub toxicity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side_effects: Option<Vec<String>>,
    #[serde(default)]
    pub contraindications: Vec<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
}

/// Strength of the scientific backing for the plant's uses
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScientificStatus {
    #[default]
    #[serde(rename = "traditionnel")]
    Traditional,
    #[serde(rename = "etudes_preliminaires")]
    PreliminaryStudies,
    #[serde(rename = "etudes_cliniques")]
    ClinicalStudies,
}
