//! Multi-select filter over release versions.
//!
//! The version table is fixed and ordered. Expansion headers stand for a whole
//! release group: picking one inserts every version of that group and the
//! header itself never stays selected. Group membership is the leading digit
//! of the entry's order key (`30` heads `31..=36`).
//!
//! Every edit rebuilds the selection from scratch: headers stripped, duplicate
//! display names dropped (first wins), then sorted by short name, descending.

use super::{Filter, TagClaim};
use once_cell::sync::Lazy;
use std::borrow::Cow;
use std::collections::HashSet;

/// Extracts a record's raw version string (e.g. "3.05").
pub type VersionFn<R> = Box<dyn for<'a> Fn(&'a R) -> Cow<'a, str>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchEntry {
    pub id: u32,
    /// Table order key; `0` is the "unselected" sentinel
    pub order: u32,
    pub name: String,
    pub short_name: String,
    /// Group header standing for a whole expansion
    pub expansion: bool,
}

impl PatchEntry {
    fn new(id: u32, order: u32, name: &str, short_name: &str) -> Self {
        Self {
            id,
            order,
            name: name.to_string(),
            short_name: short_name.to_string(),
            expansion: false,
        }
    }

    fn header(id: u32, order: u32, name: &str, short_name: &str) -> Self {
        Self {
            expansion: true,
            ..Self::new(id, order, name, short_name)
        }
    }

    pub fn is_sentinel(&self) -> bool {
        self.order == 0
    }

    /// Leading digit of the order key.
    fn group(&self) -> Option<char> {
        self.order.to_string().chars().next()
    }

    pub fn label(&self) -> String {
        if self.is_sentinel() {
            self.name.clone()
        } else {
            format!("{} ({})", self.name, self.short_name)
        }
    }
}

static PATCH_TABLE: Lazy<Vec<PatchEntry>> = Lazy::new(|| {
    let rows: &[(u32, &str, &str, bool)] = &[
        (0, "Select a patch...", "999", false),
        (10, "Final Fantasy XIV", "1.0", false),
        // A Realm Reborn
        (20, "A Realm Reborn", "ARR", true),
        (21, "A Realm Reborn", "2.0", false),
        (22, "A Realm Awoken", "2.1", false),
        (23, "Through the Maelstrom", "2.2", false),
        (24, "Defenders of Eorzea", "2.3", false),
        (25, "Dreams of Ice", "2.4", false),
        (26, "Before the Fall", "2.5", false),
        // Heavensward
        (30, "Heavensward", "HW", true),
        (31, "Heavensward", "3.0", false),
        (32, "As Goes Light, So Goes Darkness", "3.1", false),
        (33, "The Gears of Change", "3.2", false),
        (34, "Revenge of the Horde", "3.3", false),
        (35, "Soul Surrender", "3.4", false),
        (36, "The Far Edge of Fate", "3.5", false),
        // Stormblood
        (40, "Stormblood", "SB", true),
        (41, "Stormblood", "4.0", false),
        (42, "The Legend Returns", "4.1", false),
        (43, "Rise of a New Sun", "4.2", false),
        (44, "Under the Moonlight", "4.3", false),
        (45, "Prelude in Violet", "4.4", false),
        (46, "A Requiem for Heroes", "4.5", false),
        // Shadowbringers
        (50, "Shadowbringers", "ShB", true),
        (51, "Shadowbringers", "5.0", false),
        (52, "Vows of Virtue, Deeds of Cruelty", "5.1", false),
        (53, "Echoes of a Fallen Star", "5.2", false),
        (54, "Reflections in Crystal", "5.3", false),
        (55, "Futures Rewritten", "5.4", false),
        (56, "Death Unto Dawn", "5.5", false),
        // Endwalker
        (60, "Endwalker", "EW", true),
        (61, "Endwalker", "6.0", false),
        (62, "Newfound Adventure", "6.1", false),
        (63, "Buried Memory", "6.2", false),
        (64, "Gods Revel, Lands Tremble", "6.3", false),
        (65, "The Dark Throne", "6.4", false),
        (66, "Growing Light", "6.5", false),
        // Dawntrail
        (70, "Dawntrail", "DT", true),
        (71, "Dawntrail", "7.0", false),
        (72, "Crossroads", "7.1", false),
        (73, "Seekers of Eternity", "7.2", false),
        (74, "The Promise of Tomorrow", "7.3", false),
    ];

    rows.iter()
        .enumerate()
        .map(|(id, &(order, name, short, expansion))| {
            if expansion {
                PatchEntry::header(id as u32, order, name, short)
            } else {
                PatchEntry::new(id as u32, order, name, short)
            }
        })
        .collect()
});

/// The built-in 1.0 – 7.3 release table.
pub fn default_patch_table() -> &'static [PatchEntry] {
    &PATCH_TABLE
}

/// Truncate a raw version to table precision ("3.05" → "3.0").
pub fn short_version(raw: &str) -> &str {
    match raw.char_indices().nth(3) {
        Some((end, _)) => &raw[..end],
        None => raw,
    }
}

pub struct PatchFilter<R> {
    table: Vec<PatchEntry>,
    selected: Vec<PatchEntry>,
    version_of: VersionFn<R>,
    altered: bool,
}

impl<R> PatchFilter<R> {
    pub fn new(version_of: impl for<'a> Fn(&'a R) -> Cow<'a, str> + 'static) -> Self {
        Self::with_table(default_patch_table().to_vec(), version_of)
    }

    pub fn with_table(
        table: Vec<PatchEntry>,
        version_of: impl for<'a> Fn(&'a R) -> Cow<'a, str> + 'static,
    ) -> Self {
        Self {
            table,
            selected: Vec::new(),
            version_of: Box::new(version_of),
            altered: false,
        }
    }

    pub fn table(&self) -> &[PatchEntry] {
        &self.table
    }

    pub fn selected(&self) -> &[PatchEntry] {
        &self.selected
    }

    pub fn entry(&self, id: u32) -> Option<&PatchEntry> {
        self.table.iter().find(|p| p.id == id)
    }

    /// Find a table entry by short name (case-insensitive) or by id.
    pub fn find(&self, text: &str) -> Option<&PatchEntry> {
        let text = text.trim();
        self.table
            .iter()
            .filter(|p| !p.is_sentinel())
            .find(|p| p.short_name.eq_ignore_ascii_case(text))
            .or_else(|| {
                text.parse::<u32>()
                    .ok()
                    .and_then(|id| self.entry(id))
                    .filter(|p| !p.is_sentinel())
            })
    }

    fn sentinel(&self) -> PatchEntry {
        self.table
            .iter()
            .find(|p| p.is_sentinel())
            .cloned()
            .unwrap_or_else(|| PatchEntry::new(0, 0, "Select a patch...", "999"))
    }

    /// Append an empty slot (the editor's "+" button).
    pub fn add_slot(&mut self) {
        let mut next = self.selected.clone();
        next.push(self.sentinel());
        self.commit(next);
    }

    /// Pick table entry `entry_id` in slot `slot`.
    ///
    /// Returns whether the selection changed. Picking a version whose
    /// display name is already selected is discarded.
    pub fn pick(&mut self, slot: usize, entry_id: u32) -> bool {
        if slot >= self.selected.len() {
            return false;
        }
        let Some(entry) = self.entry(entry_id).cloned() else {
            return false;
        };

        if entry.expansion {
            let next = self.expand(&entry);
            return self.commit(next);
        }

        if self.contains_name(&entry.name) {
            return false;
        }
        let mut next = self.selected.clone();
        next[slot] = entry;
        self.commit(next)
    }

    /// Add table entry `entry_id` without going through a slot.
    pub fn select(&mut self, entry_id: u32) -> bool {
        let Some(entry) = self.entry(entry_id).cloned() else {
            return false;
        };

        if entry.expansion {
            let next = self.expand(&entry);
            return self.commit(next);
        }

        if self.contains_name(&entry.name) {
            return false;
        }
        let mut next = self.selected.clone();
        next.push(entry);
        self.commit(next)
    }

    /// Remove the entry in `slot` (the "-" button or a secondary click).
    pub fn remove(&mut self, slot: usize) -> bool {
        if slot >= self.selected.len() {
            return false;
        }
        let mut next = self.selected.clone();
        next.remove(slot);
        self.commit(next)
    }

    pub fn clear(&mut self) {
        self.commit(Vec::new());
    }

    fn contains_name(&self, name: &str) -> bool {
        self.selected.iter().any(|p| p.name == name)
    }

    /// Current selection minus empty slots, plus every member of `header`'s group.
    fn expand(&self, header: &PatchEntry) -> Vec<PatchEntry> {
        let group = header.group();
        let mut next: Vec<PatchEntry> = self
            .selected
            .iter()
            .filter(|p| !p.is_sentinel())
            .cloned()
            .collect();

        for member in self
            .table
            .iter()
            .filter(|p| !p.expansion && !p.is_sentinel() && p.group() == group)
        {
            if !next.iter().any(|p| p.name == member.name) {
                next.push(member.clone());
            }
        }
        next
    }

    /// Store the rebuilt selection. Returns false when it is unchanged.
    fn commit(&mut self, entries: Vec<PatchEntry>) -> bool {
        let next = normalized(entries);
        if next == self.selected {
            return false;
        }
        self.selected = next;
        self.altered = true;
        true
    }
}

fn normalized(entries: Vec<PatchEntry>) -> Vec<PatchEntry> {
    let mut seen = HashSet::new();
    let mut out: Vec<PatchEntry> = entries
        .into_iter()
        .filter(|p| !p.expansion)
        .filter(|p| seen.insert(p.name.clone()))
        .collect();
    out.sort_by(|a, b| b.short_name.cmp(&a.short_name));
    out
}

impl<R> Filter<R> for PatchFilter<R> {
    fn name(&self) -> &str {
        "Patch"
    }

    fn localization_key(&self) -> &str {
        "PatchSearchFilter"
    }

    fn is_set(&self) -> bool {
        self.selected.iter().any(|p| !p.is_sentinel())
    }

    fn is_from_tag(&self) -> bool {
        false
    }

    fn has_changed(&mut self) -> bool {
        std::mem::take(&mut self.altered)
    }

    fn check(&self, record: &R) -> bool {
        if !Filter::<R>::is_set(self) {
            return true;
        }
        let raw = (self.version_of)(record);
        let version = short_version(&raw);
        self.selected
            .iter()
            .any(|p| !p.is_sentinel() && p.short_name == version)
    }

    fn clear_tags(&mut self) {}

    fn try_claim_tag(&mut self, _token: &str) -> TagClaim {
        TagClaim::Rejected
    }

    fn summary(&self) -> String {
        let shorts: Vec<&str> = self
            .selected
            .iter()
            .filter(|p| !p.is_sentinel())
            .map(|p| p.short_name.as_str())
            .collect();
        if shorts.is_empty() {
            "Any".to_string()
        } else {
            shorts.join(", ")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Item;

    fn filter() -> PatchFilter<Item> {
        PatchFilter::new(|item: &Item| item.patch.as_str().into())
    }

    fn id_of(filter: &PatchFilter<Item>, short: &str) -> u32 {
        filter.find(short).unwrap().id
    }

    fn item(patch: &str) -> Item {
        let mut item = Item::new(1, "Thing");
        item.patch = patch.to_string();
        item
    }

    fn shorts(filter: &PatchFilter<Item>) -> Vec<&str> {
        filter
            .selected()
            .iter()
            .map(|p| p.short_name.as_str())
            .collect()
    }

    /// Header at order 30 with five members 31..=35.
    fn small_table() -> Vec<PatchEntry> {
        vec![
            PatchEntry::new(0, 0, "Select a patch...", "999"),
            PatchEntry::new(1, 10, "Launch", "1.0"),
            PatchEntry::header(2, 30, "Third", "T3"),
            PatchEntry::new(3, 31, "Third Dawn", "3.0"),
            PatchEntry::new(4, 32, "Third Light", "3.1"),
            PatchEntry::new(5, 33, "Third Gears", "3.2"),
            PatchEntry::new(6, 34, "Third Horde", "3.3"),
            PatchEntry::new(7, 35, "Third Soul", "3.4"),
            PatchEntry::header(8, 40, "Fourth", "T4"),
            PatchEntry::new(9, 41, "Fourth Dawn", "4.0"),
        ]
    }

    #[test]
    fn short_version_truncates_to_table_precision() {
        assert_eq!(short_version("3.05"), "3.0");
        assert_eq!(short_version("4.1"), "4.1");
        assert_eq!(short_version("2"), "2");
    }

    #[test]
    fn default_table_is_ordered_with_headers() {
        let table = default_patch_table();
        assert!(table[0].is_sentinel());
        assert!(table.windows(2).all(|w| w[0].order < w[1].order));
        assert_eq!(table.iter().filter(|p| p.expansion).count(), 6);
    }

    #[test]
    fn empty_selection_is_not_set_and_matches_everything() {
        let filter = filter();
        assert!(!filter.is_set());
        assert!(filter.check(&item("5.1")));
    }

    #[test]
    fn sentinel_only_selection_is_not_set() {
        let mut filter = filter();
        filter.add_slot();
        assert_eq!(filter.selected().len(), 1);
        assert!(!filter.is_set());
        assert!(filter.check(&item("5.1")));
    }

    #[test]
    fn header_expands_to_group_members_only() {
        let mut filter =
            PatchFilter::with_table(small_table(), |item: &Item| item.patch.as_str().into());
        filter.add_slot();
        assert!(filter.pick(0, 2));

        assert_eq!(shorts(&filter), vec!["3.4", "3.3", "3.2", "3.1", "3.0"]);
        assert!(filter.selected().iter().all(|p| !p.expansion));
        assert!(filter.is_set());
    }

    #[test]
    fn header_expansion_skips_names_already_selected() {
        let mut filter =
            PatchFilter::with_table(small_table(), |item: &Item| item.patch.as_str().into());
        filter.select(5);
        filter.select(2);

        assert_eq!(filter.selected().len(), 5);
        let names: HashSet<&str> = filter.selected().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names.len(), 5);
    }

    #[test]
    fn picking_existing_name_is_a_noop() {
        let mut filter = filter();
        filter.select(id_of(&filter, "4.2"));
        filter.add_slot();
        filter.has_changed();

        let sentinel_slot = filter
            .selected()
            .iter()
            .position(|p| p.is_sentinel())
            .unwrap();
        let before = filter.selected().len();
        assert!(!filter.pick(sentinel_slot, id_of(&filter, "4.2")));
        assert_eq!(filter.selected().len(), before);
        assert!(!filter.has_changed());
    }

    #[test]
    fn reselecting_a_full_expansion_changes_nothing() {
        let mut filter =
            PatchFilter::with_table(small_table(), |item: &Item| item.patch.as_str().into());
        assert!(filter.select(2));
        assert!(filter.has_changed());

        assert!(!filter.select(2));
        assert!(!filter.has_changed());

        filter.add_slot();
        filter.has_changed();
        let slot = filter.selected().len() - 1;
        assert!(filter.pick(slot, 2));
        assert!(filter.has_changed());
        assert_eq!(shorts(&filter), vec!["3.4", "3.3", "3.2", "3.1", "3.0"]);
        assert!(!filter.pick(0, 2));
    }

    #[test]
    fn pick_replaces_slot_in_place() {
        let mut filter = filter();
        filter.select(id_of(&filter, "5.0"));
        assert!(filter.pick(0, id_of(&filter, "6.1")));
        assert_eq!(shorts(&filter), vec!["6.1"]);
    }

    #[test]
    fn selection_is_sorted_descending() {
        let mut filter = filter();
        for short in ["2.1", "6.3", "4.0"] {
            let id = id_of(&filter, short);
            filter.select(id);
        }
        assert_eq!(shorts(&filter), vec!["6.3", "4.0", "2.1"]);
    }

    #[test]
    fn check_matches_any_selected_version() {
        let mut filter = filter();
        filter.select(id_of(&filter, "3.0"));
        filter.select(id_of(&filter, "5.2"));

        assert!(filter.check(&item("3.05")));
        assert!(filter.check(&item("5.2")));
        assert!(!filter.check(&item("5.3")));
        assert!(!filter.check(&item("")));
    }

    #[test]
    fn remove_deletes_slot_and_marks_change() {
        let mut filter = filter();
        filter.select(id_of(&filter, "HW"));
        filter.has_changed();

        assert!(filter.remove(0));
        assert_eq!(filter.selected().len(), 5);
        assert!(filter.has_changed());
        assert!(!filter.remove(99));
    }

    #[test]
    fn header_pick_drops_empty_slots() {
        let mut filter = filter();
        filter.add_slot();
        filter.add_slot();
        let slot = filter.selected().len() - 1;
        filter.pick(slot, id_of(&filter, "SB"));

        assert!(filter.selected().iter().all(|p| !p.is_sentinel()));
        assert_eq!(filter.selected().len(), 6);
    }

    #[test]
    fn never_claims_tags() {
        let mut filter = filter();
        assert_eq!(filter.try_claim_tag("3.0"), TagClaim::Rejected);
        assert_eq!(filter.try_claim_tag("patch"), TagClaim::Rejected);
        assert!(!filter.is_from_tag());
    }

    #[test]
    fn summary_lists_short_names() {
        let mut filter = filter();
        assert_eq!(filter.summary(), "Any");
        filter.select(id_of(&filter, "7.1"));
        filter.select(id_of(&filter, "7.0"));
        assert_eq!(filter.summary(), "7.1, 7.0");
    }
}
