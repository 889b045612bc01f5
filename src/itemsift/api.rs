//! # API Facade
//!
//! [`ItemSearch`] is the single entry point UIs use. It owns the catalog and
//! the standard filter set, and translates user-level requests ("only
//! unique", "patch 3.1", "race Female Viera") into filter edits.
//!
//! It returns structured data and never prints. The CLI in `main.rs` is the
//! only place that formats output.
//!
//! Two ways to search:
//! - [`ItemSearch::search`] parses, evaluates and returns owned results;
//! - [`ItemSearch::apply_query`] + [`ItemSearch::matching`] split the mutable
//!   parse pass from the read-only evaluation and return borrowed items,
//!   which is what a redraw loop wants.

use crate::attributes::item_registry;
use crate::catalog::Catalog;
use crate::config::SiftConfig;
use crate::error::{Result, SiftError};
use crate::filter_set::FilterSet;
use crate::filters::{AnyFilter, BooleanFilter, EquipRules, Filter, PatchFilter, RaceSexFilter};
use crate::model::{Item, RaceId, Sex};
use crate::query::{Delimiter, ParsedQuery};
use crate::viewer::{DataSite, Opening};
use std::rc::Rc;

/// The boolean filters, in registration order:
/// (name, true label, false label, attribute, inverted)
const BOOLEAN_FILTERS: &[(&str, &str, &str, &str, bool)] = &[
    ("Dyeable", "Dyeable", "Not Dyeable", "IsDyeable", false),
    ("Unique", "Unique", "Not Unique", "IsUnique", false),
    ("Tradable", "Tradable", "Not Tradable", "IsUntradable", true),
    ("Collectable", "Collectable", "Not Collectable", "IsCollectable", false),
    ("Glamourous", "Glamourous", "Not Glamourous", "IsGlamourous", false),
    ("Can Be HQ", "Can Be HQ", "NQ Only", "CanBeHq", false),
    ("Crest Worthy", "Crest Worthy", "Not Crest Worthy", "IsCrestWorthy", false),
    (
        "Advanced Melding",
        "Advanced Melding",
        "No Advanced Melding",
        "IsAdvancedMeldingPermitted",
        false,
    ),
];

/// Build the standard item filter set over `catalog`.
///
/// Order matters: on an ambiguous tag the earlier filter wins.
pub fn standard_filters(
    catalog: &Rc<Catalog>,
    delimiter: Delimiter,
    snapshot: Option<(RaceId, Sex)>,
) -> FilterSet<Item> {
    let registry = item_registry();
    let mut set = FilterSet::with_delimiter(delimiter);

    for &(name, true_label, false_label, attribute, inverted) in BOOLEAN_FILTERS {
        let filter = BooleanFilter::new(name, true_label, false_label, &registry, attribute);
        set.register(if inverted { filter.inverted() } else { filter });
    }

    let rules: Rc<dyn EquipRules<Item>> = catalog.clone();
    set.register(PatchFilter::new(|item: &Item| item.patch.as_str().into()))
        .register(RaceSexFilter::new(&**catalog, rules, move || snapshot));
    set
}

/// A filter's state, flattened for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterInfo {
    pub name: String,
    pub localization_key: String,
    pub summary: String,
    pub is_set: bool,
    pub from_tag: bool,
    pub tags: Vec<String>,
}

impl FilterInfo {
    fn of(filter: &AnyFilter<Item>) -> Self {
        Self {
            name: filter.name().to_string(),
            localization_key: filter.localization_key().to_string(),
            summary: filter.summary(),
            is_set: filter.is_set(),
            from_tag: filter.is_from_tag(),
            tags: filter.tag_hints(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchResult {
    pub items: Vec<Item>,
    pub query: ParsedQuery,
    /// Filters that narrowed this search
    pub active: Vec<FilterInfo>,
    /// Whether any filter changed since the previous poll
    pub changed: bool,
}

pub struct ItemSearch {
    catalog: Rc<Catalog>,
    filters: FilterSet<Item>,
}

impl ItemSearch {
    pub fn new(catalog: Catalog, config: &SiftConfig) -> Self {
        let catalog = Rc::new(catalog);
        let filters = standard_filters(&catalog, config.delimiter(), config.snapshot());
        Self { catalog, filters }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn filters(&self) -> &FilterSet<Item> {
        &self.filters
    }

    pub fn filters_mut(&mut self) -> &mut FilterSet<Item> {
        &mut self.filters
    }

    pub fn filter_info(&self) -> Vec<FilterInfo> {
        self.filters.filters().iter().map(FilterInfo::of).collect()
    }

    /// Look up a filter by name, case-insensitively.
    pub fn filter_mut(&mut self, name: &str) -> Result<&mut AnyFilter<Item>> {
        self.filters
            .get_mut(name)
            .ok_or_else(|| SiftError::Api(format!("Unknown filter: {}", name)))
    }

    pub fn item(&self, id: u32) -> Result<&Item> {
        self.catalog.item(id).ok_or(SiftError::ItemNotFound(id))
    }

    /// Run a parse pass: tags update filter state, the rest become terms.
    pub fn apply_query(&mut self, query: &str) -> ParsedQuery {
        self.filters.apply_query(query)
    }

    pub fn matching(&self, query: &ParsedQuery) -> Vec<&Item> {
        self.filters
            .evaluate(&self.catalog.items, query, &|item: &Item, term: &str| {
                item.matches_term(term)
            })
    }

    pub fn search(&mut self, query: &str) -> SearchResult {
        let parsed = self.apply_query(query);
        let changed = self.filters.take_changed();
        let items = self.matching(&parsed).into_iter().cloned().collect();
        let active = self.filters.active().map(FilterInfo::of).collect();
        SearchResult {
            items,
            query: parsed,
            active,
            changed,
        }
    }

    /// Keep only records where the named boolean filter's attribute is true.
    ///
    /// Fails while a tag from the last query overrides the filter.
    pub fn only(&mut self, name: &str) -> Result<()> {
        let filter = self.boolean_mut(name)?;
        if filter.set_show_true(true) && filter.set_show_false(false) {
            Ok(())
        } else {
            Err(overridden(name))
        }
    }

    /// Keep only records where the named boolean filter's attribute is false.
    pub fn exclude(&mut self, name: &str) -> Result<()> {
        let filter = self.boolean_mut(name)?;
        if filter.set_show_false(true) && filter.set_show_true(false) {
            Ok(())
        } else {
            Err(overridden(name))
        }
    }

    /// Add a version (or a whole expansion, by header) to the patch filter.
    /// Selecting something already selected is a no-op.
    pub fn select_patch(&mut self, text: &str) -> Result<()> {
        let patch = self
            .filter_mut("Patch")?
            .as_patch_mut()
            .ok_or_else(|| SiftError::Api("Patch filter missing".to_string()))?;
        let id = patch
            .find(text)
            .map(|entry| entry.id)
            .ok_or_else(|| SiftError::Api(format!("Unknown patch: {}", text)))?;
        patch.select(id);
        Ok(())
    }

    /// Select a race/sex option by label. `self` picks the configured
    /// character.
    pub fn select_race_sex(&mut self, label: &str) -> Result<()> {
        let filter = self
            .filter_mut("Race/Sex")?
            .as_race_sex_mut()
            .ok_or_else(|| SiftError::Api("Race/Sex filter missing".to_string()))?;
        if filter.is_from_tag() {
            return Err(overridden("Race/Sex"));
        }

        if label.trim().eq_ignore_ascii_case("self") {
            if filter.select_current() {
                return Ok(());
            }
            return Err(SiftError::Api(
                "No character configured; set self-race and self-sex".to_string(),
            ));
        }

        let index = filter
            .find(label)
            .ok_or_else(|| SiftError::Api(format!("Unknown race/sex: {}", label)))?;
        if filter.select(index) {
            Ok(())
        } else {
            Err(overridden("Race/Sex"))
        }
    }

    pub fn open_item(&self, id: u32, site: &dyn DataSite) -> Result<Opening> {
        let item = self.item(id)?;
        log::debug!("Opening {} on {}", item.name, site.name());
        site.open(item)
    }

    fn boolean_mut(&mut self, name: &str) -> Result<&mut BooleanFilter<Item>> {
        self.filter_mut(name)?
            .as_boolean_mut()
            .ok_or_else(|| SiftError::Api(format!("Not a yes/no filter: {}", name)))
    }
}

fn overridden(name: &str) -> SiftError {
    SiftError::Api(format!("{} is overridden by a tag", name))
}
