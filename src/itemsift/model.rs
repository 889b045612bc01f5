use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type RaceId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sex::Male => write!(f, "male"),
            Sex::Female => write!(f, "female"),
        }
    }
}

impl FromStr for Sex {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" => Ok(Sex::Male),
            "female" | "f" => Ok(Sex::Female),
            other => Err(format!("Unknown sex: {}", other)),
        }
    }
}

/// A catalog record.
///
/// The boolean flags are only reachable by name through
/// [`crate::attributes::ITEM_ATTRIBUTES`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Item {
    pub id: u32,
    pub name: String,
    /// Item search category name (e.g. "Head", "Ingredients")
    pub category: String,
    /// Raw release version, e.g. "3.05"
    pub patch: String,
    /// Index into the catalog's equip race categories
    pub equip_restriction: u32,
    pub is_dyeable: bool,
    pub is_unique: bool,
    pub is_untradable: bool,
    pub is_collectable: bool,
    pub is_glamourous: bool,
    pub can_be_hq: bool,
    pub is_crest_worthy: bool,
    pub is_advanced_melding_permitted: bool,
}

impl Item {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            ..Default::default()
        }
    }

    /// Plain search term match: name substring, whole category, or exact id.
    /// Case-insensitive.
    pub fn matches_term(&self, term: &str) -> bool {
        contains_ignore_case(&self.name, term)
            || self.category.eq_ignore_ascii_case(term)
            || term.parse::<u32>().is_ok_and(|id| id == self.id)
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    haystack.char_indices().any(|(start, _)| {
        let mut rest = haystack[start..].chars().flat_map(char::to_lowercase);
        needle
            .chars()
            .flat_map(char::to_lowercase)
            .all(|c| rest.next() == Some(c))
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Race {
    pub id: RaceId,
    pub masculine: String,
    pub feminine: String,
    #[serde(default = "default_true")]
    pub has_male_body: bool,
    #[serde(default = "default_true")]
    pub has_female_body: bool,
}

/// Which race/sex combinations may equip an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipRaceCategory {
    pub id: u32,
    /// Allowed races; empty means every race
    #[serde(default)]
    pub races: Vec<RaceId>,
    #[serde(default = "default_true")]
    pub male: bool,
    #[serde(default = "default_true")]
    pub female: bool,
}

impl EquipRaceCategory {
    pub fn allows(&self, race: RaceId, sex: Sex) -> bool {
        let race_ok = self.races.is_empty() || self.races.contains(&race);
        let sex_ok = match sex {
            Sex::Male => self.male,
            Sex::Female => self.female,
        };
        race_ok && sex_ok
    }
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sex_parses_short_and_long_forms() {
        assert_eq!("M".parse::<Sex>().unwrap(), Sex::Male);
        assert_eq!("female".parse::<Sex>().unwrap(), Sex::Female);
        assert!("other".parse::<Sex>().is_err());
    }

    #[test]
    fn category_without_races_allows_every_race() {
        let erc = EquipRaceCategory {
            id: 1,
            races: vec![],
            male: true,
            female: false,
        };
        assert!(erc.allows(7, Sex::Male));
        assert!(!erc.allows(7, Sex::Female));
    }

    #[test]
    fn category_with_races_restricts_race() {
        let erc = EquipRaceCategory {
            id: 2,
            races: vec![3],
            male: true,
            female: true,
        };
        assert!(erc.allows(3, Sex::Female));
        assert!(!erc.allows(4, Sex::Female));
    }

    #[test]
    fn term_matches_name_category_or_id() {
        let mut item = Item::new(1609, "Weathered Hora");
        item.category = "Head".into();
        assert!(item.matches_term("hora"));
        assert!(item.matches_term("WEATHERED h"));
        assert!(item.matches_term("head"));
        assert!(item.matches_term("1609"));
        assert!(!item.matches_term("hea"));
        assert!(!item.matches_term("160"));
        assert!(!item.matches_term("sword"));
    }

    #[test]
    fn item_defaults_missing_fields() {
        let item: Item = serde_json::from_str(r#"{"id": 5, "name": "Potion"}"#).unwrap();
        assert_eq!(item.id, 5);
        assert_eq!(item.patch, "");
        assert!(!item.is_unique);
    }
}
