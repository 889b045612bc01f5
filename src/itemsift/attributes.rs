//! Attribute accessors and registry.
//!
//! Filters never reach into a record by reflection. Instead every boolean
//! attribute a filter may read is registered once, by name, with a typed
//! accessor function. Filters resolve their attribute name against the
//! registry at construction time; an unknown name is a configuration error
//! that the filter reports and then ignores (it matches everything).

use crate::model::Item;

/// Reads one boolean attribute from a record.
pub type BoolAccessor<R> = fn(&R) -> bool;

/// A named boolean attribute.
pub struct AttributeSpec<R> {
    /// The attribute name used by filter definitions (e.g. "IsUnique")
    pub name: &'static str,
    pub get: BoolAccessor<R>,
}

impl<R> Clone for AttributeSpec<R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for AttributeSpec<R> {}

impl<R> std::fmt::Debug for AttributeSpec<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttributeSpec")
            .field("name", &self.name)
            .finish()
    }
}

/// Name-indexed set of accessors for one record type.
pub struct AttributeRegistry<R> {
    specs: Vec<AttributeSpec<R>>,
}

impl<R> Default for AttributeRegistry<R> {
    fn default() -> Self {
        Self { specs: Vec::new() }
    }
}

impl<R> AttributeRegistry<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_specs(specs: &[AttributeSpec<R>]) -> Self {
        Self {
            specs: specs.to_vec(),
        }
    }

    /// Register an accessor. A later registration under the same name wins.
    pub fn register(&mut self, name: &'static str, get: BoolAccessor<R>) -> &mut Self {
        self.specs.retain(|spec| spec.name != name);
        self.specs.push(AttributeSpec { name, get });
        self
    }

    /// Look up an accessor by exact name.
    pub fn get(&self, name: &str) -> Option<BoolAccessor<R>> {
        self.specs
            .iter()
            .find(|spec| spec.name == name)
            .map(|spec| spec.get)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.specs.iter().map(|spec| spec.name)
    }
}

fn is_dyeable(item: &Item) -> bool {
    item.is_dyeable
}

fn is_unique(item: &Item) -> bool {
    item.is_unique
}

fn is_untradable(item: &Item) -> bool {
    item.is_untradable
}

fn is_collectable(item: &Item) -> bool {
    item.is_collectable
}

fn is_glamourous(item: &Item) -> bool {
    item.is_glamourous
}

fn can_be_hq(item: &Item) -> bool {
    item.can_be_hq
}

fn is_crest_worthy(item: &Item) -> bool {
    item.is_crest_worthy
}

fn is_advanced_melding_permitted(item: &Item) -> bool {
    item.is_advanced_melding_permitted
}

/// Registry of all boolean item attributes.
///
/// Adding a new attribute means adding an entry here.
pub const ITEM_ATTRIBUTES: &[AttributeSpec<Item>] = &[
    AttributeSpec {
        name: "IsDyeable",
        get: is_dyeable,
    },
    AttributeSpec {
        name: "IsUnique",
        get: is_unique,
    },
    AttributeSpec {
        name: "IsUntradable",
        get: is_untradable,
    },
    AttributeSpec {
        name: "IsCollectable",
        get: is_collectable,
    },
    AttributeSpec {
        name: "IsGlamourous",
        get: is_glamourous,
    },
    AttributeSpec {
        name: "CanBeHq",
        get: can_be_hq,
    },
    AttributeSpec {
        name: "IsCrestWorthy",
        get: is_crest_worthy,
    },
    AttributeSpec {
        name: "IsAdvancedMeldingPermitted",
        get: is_advanced_melding_permitted,
    },
];

/// The registry used for [`Item`] records.
pub fn item_registry() -> AttributeRegistry<Item> {
    AttributeRegistry::from_specs(ITEM_ATTRIBUTES)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_registry_has_expected_entries() {
        let registry = item_registry();
        assert!(registry.get("IsUnique").is_some());
        assert!(registry.get("IsUntradable").is_some());
        assert!(registry.get("CanBeHq").is_some());
        assert_eq!(registry.names().count(), ITEM_ATTRIBUTES.len());
    }

    #[test]
    fn unknown_attribute_returns_none() {
        assert!(item_registry().get("IsShiny").is_none());
        // lookups are exact
        assert!(item_registry().get("isunique").is_none());
    }

    #[test]
    fn accessor_reads_the_named_field() {
        let registry = item_registry();
        let mut item = Item::new(1, "Ring");
        item.is_collectable = true;

        assert!((registry.get("IsCollectable").unwrap())(&item));
        assert!(!(registry.get("IsUnique").unwrap())(&item));
    }

    #[test]
    fn register_replaces_existing_name() {
        let mut registry = item_registry();
        registry.register("IsUnique", |item: &Item| item.id == 7);

        let unique = registry.get("IsUnique").unwrap();
        assert!(unique(&Item::new(7, "Seven")));
        assert_eq!(registry.names().filter(|n| *n == "IsUnique").count(), 1);
    }
}
