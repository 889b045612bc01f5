//! Single-select filter over race × sex.
//!
//! The option list is built once from a [`RaceDomain`]: one option per body a
//! race actually has, plus the "Not Selected" sentinel at index 0. Matching
//! asks [`EquipRules`] whether the record's equip category allows the selected
//! pair.

use super::{normalize_tag, Filter, TagClaim};
use crate::error::{Result, SiftError};
use crate::model::{Race, RaceId, Sex};
use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

/// Supplies the race domain the options are built from.
pub trait RaceDomain {
    fn races(&self) -> Vec<Race>;
}

/// Equip restriction lookups for a record type.
pub trait EquipRules<R> {
    /// The record's equip category.
    fn category(&self, record: &R) -> Result<u32>;

    /// Whether `category` may be worn by `race`/`sex`.
    fn allows(&self, category: u32, race: RaceId, sex: Sex) -> Result<bool>;
}

/// The acting character's race and sex, if known.
pub trait SnapshotSource {
    fn current(&self) -> Option<(RaceId, Sex)>;
}

impl<F> SnapshotSource for F
where
    F: Fn() -> Option<(RaceId, Sex)>,
{
    fn current(&self) -> Option<(RaceId, Sex)> {
        self()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaceSexOption {
    pub label: String,
    pub race: RaceId,
    pub sex: Sex,
}

pub struct RaceSexFilter<R> {
    options: Vec<RaceSexOption>,
    /// Normalized option labels, index-aligned with `options`
    tags: Vec<String>,
    rules: Rc<dyn EquipRules<R>>,
    snapshot: Box<dyn SnapshotSource>,
    selected: usize,
    last_seen: usize,
    using_tags: bool,
    pre_tag_selection: usize,
    /// Lookup failures already logged
    reported: RefCell<HashSet<String>>,
}

impl<R> RaceSexFilter<R> {
    pub fn new(
        domain: &dyn RaceDomain,
        rules: Rc<dyn EquipRules<R>>,
        snapshot: impl SnapshotSource + 'static,
    ) -> Self {
        let mut options = vec![RaceSexOption {
            label: "Not Selected".to_string(),
            race: 0,
            sex: Sex::Female,
        }];

        for race in domain.races() {
            match (race.has_male_body, race.has_female_body) {
                (true, true) => {
                    options.push(RaceSexOption {
                        label: format!("Male {}", race.masculine),
                        race: race.id,
                        sex: Sex::Male,
                    });
                    options.push(RaceSexOption {
                        label: format!("Female {}", race.feminine),
                        race: race.id,
                        sex: Sex::Female,
                    });
                }
                (true, false) => options.push(RaceSexOption {
                    label: race.masculine.clone(),
                    race: race.id,
                    sex: Sex::Male,
                }),
                (false, true) => options.push(RaceSexOption {
                    label: race.feminine.clone(),
                    race: race.id,
                    sex: Sex::Female,
                }),
                (false, false) => {
                    log::debug!("Race {} has no playable body, skipping", race.id);
                }
            }
        }

        let tags = options.iter().map(|o| normalize_tag(&o.label)).collect();
        Self {
            options,
            tags,
            rules,
            snapshot: Box::new(snapshot),
            selected: 0,
            last_seen: 0,
            using_tags: false,
            pre_tag_selection: 0,
            reported: RefCell::new(HashSet::new()),
        }
    }

    pub fn options(&self) -> &[RaceSexOption] {
        &self.options
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected_option(&self) -> &RaceSexOption {
        &self.options[self.selected]
    }

    /// Index of the option matching `label` (spaces, apostrophes and case ignored).
    pub fn find(&self, label: &str) -> Option<usize> {
        self.tag_index(&normalize_tag(label))
    }

    fn tag_index(&self, tag: &str) -> Option<usize> {
        self.tags
            .iter()
            .skip(1)
            .position(|t| t == tag)
            .map(|i| i + 1)
    }

    fn snapshot_index(&self) -> Option<usize> {
        let (race, sex) = self.snapshot.current()?;
        self.options
            .iter()
            .skip(1)
            .position(|o| o.race == race && o.sex == sex)
            .map(|i| i + 1)
    }

    /// Choose an option from the editor. Ignored while a tag is active.
    pub fn select(&mut self, index: usize) -> bool {
        if self.using_tags || index >= self.options.len() {
            return false;
        }
        self.selected = index;
        true
    }

    /// The editor's "current" button: select the acting character's option.
    pub fn select_current(&mut self) -> bool {
        match self.snapshot_index() {
            Some(index) => self.select(index),
            None => false,
        }
    }

    /// Secondary-click action: drop a tag override, or clear the selection
    /// when there is none.
    pub fn reset(&mut self) {
        if self.using_tags {
            self.clear_tags_inner();
        } else {
            self.selected = 0;
        }
    }

    fn clear_tags_inner(&mut self) {
        if self.using_tags {
            self.selected = self.pre_tag_selection;
            self.using_tags = false;
        }
    }

    fn lookup(&self, record: &R, option: &RaceSexOption) -> Result<bool> {
        let category = self.rules.category(record)?;
        self.rules.allows(category, option.race, option.sex)
    }
}

impl<R> Filter<R> for RaceSexFilter<R> {
    fn name(&self) -> &str {
        "Race/Sex"
    }

    fn localization_key(&self) -> &str {
        "RaceSexSearchFilter"
    }

    fn is_set(&self) -> bool {
        self.selected > 0
    }

    fn is_from_tag(&self) -> bool {
        self.using_tags
    }

    fn has_changed(&mut self) -> bool {
        if self.last_seen == self.selected {
            return false;
        }
        self.last_seen = self.selected;
        true
    }

    fn check(&self, record: &R) -> bool {
        if self.selected == 0 {
            return true;
        }
        let result = self
            .options
            .get(self.selected)
            .ok_or_else(|| SiftError::Lookup(format!("option {} out of range", self.selected)))
            .and_then(|option| self.lookup(record, option));

        match result {
            Ok(allowed) => allowed,
            Err(e) => {
                let message = e.to_string();
                if self.reported.borrow_mut().insert(message.clone()) {
                    log::error!("Race/Sex filter lookup failed: {}", message);
                }
                true
            }
        }
    }

    fn clear_tags(&mut self) {
        self.clear_tags_inner();
    }

    fn try_claim_tag(&mut self, token: &str) -> TagClaim {
        let wanted = normalize_tag(token);
        let self_tag = wanted == "self";

        let found = if self_tag {
            self.snapshot_index()
        } else {
            self.tag_index(&wanted)
        };
        let Some(index) = found else {
            return TagClaim::Rejected;
        };

        if !self.using_tags {
            self.pre_tag_selection = self.selected;
        }
        self.using_tags = true;
        self.selected = index;

        if self_tag {
            TagClaim::Resolved
        } else {
            TagClaim::Claimed
        }
    }

    fn summary(&self) -> String {
        self.selected_option().label.clone()
    }

    fn tag_hints(&self) -> Vec<String> {
        std::iter::once("self".to_string())
            .chain(self.tags.iter().skip(1).cloned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EquipRaceCategory, Item};

    struct Domain(Vec<Race>);

    impl RaceDomain for Domain {
        fn races(&self) -> Vec<Race> {
            self.0.clone()
        }
    }

    struct Rules(Vec<EquipRaceCategory>);

    impl EquipRules<Item> for Rules {
        fn category(&self, record: &Item) -> Result<u32> {
            Ok(record.equip_restriction)
        }

        fn allows(&self, category: u32, race: RaceId, sex: Sex) -> Result<bool> {
            self.0
                .iter()
                .find(|c| c.id == category)
                .map(|c| c.allows(race, sex))
                .ok_or_else(|| SiftError::Lookup(format!("unknown category {}", category)))
        }
    }

    fn race(id: RaceId, name: &str, male: bool, female: bool) -> Race {
        Race {
            id,
            masculine: name.to_string(),
            feminine: name.to_string(),
            has_male_body: male,
            has_female_body: female,
        }
    }

    fn rules() -> Rc<dyn EquipRules<Item>> {
        Rc::new(Rules(vec![
            EquipRaceCategory {
                id: 1,
                races: vec![],
                male: true,
                female: true,
            },
            EquipRaceCategory {
                id: 2,
                races: vec![],
                male: true,
                female: false,
            },
            EquipRaceCategory {
                id: 3,
                races: vec![],
                male: false,
                female: true,
            },
        ]))
    }

    fn no_snapshot() -> Option<(RaceId, Sex)> {
        None
    }

    fn filter() -> RaceSexFilter<Item> {
        let domain = Domain(vec![
            race(1, "Hyur", true, true),
            race(4, "Miqo'te", true, true),
            race(8, "Viera", false, true),
            race(7, "Hrothgar", true, false),
        ]);
        RaceSexFilter::new(&domain, rules(), || Some((4, Sex::Female)))
    }

    fn item(category: u32) -> Item {
        let mut item = Item::new(10, "Coat");
        item.equip_restriction = category;
        item
    }

    #[test]
    fn options_follow_available_bodies() {
        let filter = filter();
        let labels: Vec<&str> = filter.options().iter().map(|o| o.label.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                "Not Selected",
                "Male Hyur",
                "Female Hyur",
                "Male Miqo'te",
                "Female Miqo'te",
                "Viera",
                "Hrothgar",
            ]
        );
    }

    #[test]
    fn single_valid_combination_yields_one_option() {
        let domain = Domain(vec![race(9, "X", true, false)]);
        let filter: RaceSexFilter<Item> = RaceSexFilter::new(&domain, rules(), no_snapshot);
        assert_eq!(filter.options().len(), 2);
        assert_eq!(filter.options()[1].sex, Sex::Male);
    }

    #[test]
    fn check_uses_category_capability() {
        let domain = Domain(vec![race(9, "X", true, false)]);
        let mut filter: RaceSexFilter<Item> = RaceSexFilter::new(&domain, rules(), no_snapshot);
        filter.select(1);

        assert!(filter.check(&item(2)));
        assert!(!filter.check(&item(3)));
    }

    #[test]
    fn unselected_filter_matches_everything() {
        let filter = filter();
        assert!(!filter.is_set());
        assert!(filter.check(&item(3)));
    }

    #[test]
    fn lookup_failure_fails_open() {
        let mut filter = filter();
        filter.select(1);
        assert!(filter.check(&item(99)));
    }

    #[test]
    fn lookup_failure_is_reported_once_per_error() {
        let mut filter = filter();
        filter.select(1);
        for _ in 0..3 {
            assert!(filter.check(&item(99)));
            assert!(filter.check(&item(0)));
        }
        assert_eq!(filter.reported.borrow().len(), 2);
    }

    #[test]
    fn has_changed_is_edge_triggered() {
        let mut filter = filter();
        assert!(!filter.has_changed());
        filter.select(2);
        assert!(filter.has_changed());
        assert!(!filter.has_changed());
        filter.select(2);
        assert!(!filter.has_changed());
    }

    #[test]
    fn label_tag_ignores_spaces_apostrophes_and_case() {
        let mut filter = filter();
        assert_eq!(filter.try_claim_tag("femalemiqote"), TagClaim::Claimed);
        assert_eq!(filter.selected_option().label, "Female Miqo'te");
        assert!(filter.is_from_tag());
    }

    #[test]
    fn sentinel_label_is_not_a_tag() {
        let mut filter = filter();
        assert_eq!(filter.try_claim_tag("notselected"), TagClaim::Rejected);
        assert!(!filter.is_from_tag());
    }

    #[test]
    fn self_tag_resolves_snapshot_once() {
        let mut filter = filter();
        assert_eq!(filter.try_claim_tag("self"), TagClaim::Resolved);
        assert_eq!(filter.selected_option().label, "Female Miqo'te");
        assert!(filter.is_from_tag());
    }

    #[test]
    fn self_tag_without_snapshot_is_rejected() {
        let domain = Domain(vec![race(1, "Hyur", true, true)]);
        let mut filter: RaceSexFilter<Item> = RaceSexFilter::new(&domain, rules(), no_snapshot);
        assert_eq!(filter.try_claim_tag("self"), TagClaim::Rejected);
        assert!(!filter.is_from_tag());
    }

    #[test]
    fn clear_tags_restores_pre_tag_selection_once() {
        let mut filter = filter();
        filter.select(1);
        filter.try_claim_tag("viera");
        filter.try_claim_tag("hrothgar");
        assert_eq!(filter.selected_index(), 6);

        filter.clear_tags();
        assert_eq!(filter.selected_index(), 1);
        assert!(!filter.is_from_tag());

        filter.select(2);
        filter.clear_tags();
        assert_eq!(filter.selected_index(), 2);
    }

    #[test]
    fn editor_selection_is_locked_while_tagged() {
        let mut filter = filter();
        filter.try_claim_tag("viera");
        assert!(!filter.select(1));
        assert!(!filter.select_current());
        filter.reset();
        assert_eq!(filter.selected_index(), 0);
        assert!(!filter.is_from_tag());
    }

    #[test]
    fn select_current_uses_snapshot() {
        let mut filter = filter();
        assert!(filter.select_current());
        assert_eq!(filter.selected_option().label, "Female Miqo'te");
        assert!(!filter.is_from_tag());
        assert!(!filter.select(42));
    }

    #[test]
    fn find_matches_normalized_labels() {
        let filter = filter();
        assert_eq!(filter.find("Male Hyur"), Some(1));
        assert_eq!(filter.find("male miqo'te"), Some(3));
        assert_eq!(filter.find("Not Selected"), None);
    }
}
