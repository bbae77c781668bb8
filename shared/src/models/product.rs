//! Product and supplier reference data

use serde::{Deserialize, Serialize};

use crate::ids::{ProductId, SpeciesId, SupplierId};

/// Species a product belongs to (e.g. hake, octopus)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct SpeciesRef {
    pub id: SpeciesId,
    pub name: String,
}

/// A sellable product, immutable reference data
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub species: Option<SpeciesRef>,
}

impl Product {
    pub fn new(id: ProductId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            species: None,
        }
    }

    pub fn with_species(mut self, species: SpeciesRef) -> Self {
        self.species = Some(species);
        self
    }

    /// Species name used for grouping; products without one are unclassified
    pub fn species_name(&self) -> &str {
        self.species
            .as_ref()
            .map(|s| s.name.as_str())
            .unwrap_or(UNCLASSIFIED_SPECIES)
    }
}

/// Grouping label for boxes whose product carries no species
pub const UNCLASSIFIED_SPECIES: &str = "Unclassified";

/// Raw-material supplier
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Supplier {
    pub id: SupplierId,
    pub name: String,
}
