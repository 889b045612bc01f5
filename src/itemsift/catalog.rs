//! The item catalog.
//!
//! A catalog is a single JSON document:
//!
//! ```text
//! {
//!   "items":                 [ { "id": 1, "name": "…", "patch": "3.05", … } ],
//!   "races":                 [ { "id": 1, "masculine": "Hyur", "feminine": "Hyur" } ],
//!   "equip_race_categories": [ { "id": 1, "races": [], "male": true, "female": true } ]
//! }
//! ```
//!
//! Besides holding the records, the catalog is the external data source the
//! race/sex filter is built from and checks against.

use crate::error::{Result, SiftError};
use crate::filters::{EquipRules, RaceDomain};
use crate::model::{EquipRaceCategory, Item, Race, RaceId, Sex};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Catalog {
    pub items: Vec<Item>,
    pub races: Vec<Race>,
    pub equip_race_categories: Vec<EquipRaceCategory>,
}

impl Catalog {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            SiftError::Catalog(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let catalog = Self::from_json(&content)?;
        log::debug!(
            "Loaded {} items, {} races from {}",
            catalog.items.len(),
            catalog.races.len(),
            path.display()
        );
        Ok(catalog)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let catalog: Catalog = serde_json::from_str(content).map_err(SiftError::Serialization)?;
        catalog.validate()?;
        Ok(catalog)
    }

    fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for item in &self.items {
            if !seen.insert(item.id) {
                return Err(SiftError::Catalog(format!("Duplicate item id {}", item.id)));
            }
        }
        Ok(())
    }

    pub fn item(&self, id: u32) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn equip_category(&self, id: u32) -> Option<&EquipRaceCategory> {
        self.equip_race_categories.iter().find(|c| c.id == id)
    }
}

impl RaceDomain for Catalog {
    fn races(&self) -> Vec<Race> {
        self.races.clone()
    }
}

impl EquipRules<Item> for Catalog {
    fn category(&self, record: &Item) -> Result<u32> {
        Ok(record.equip_restriction)
    }

    fn allows(&self, category: u32, race: RaceId, sex: Sex) -> Result<bool> {
        self.equip_category(category)
            .map(|c| c.allows(race, sex))
            .ok_or_else(|| SiftError::Lookup(format!("Unknown equip race category {}", category)))
    }
}
