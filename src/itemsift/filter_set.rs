//! The ordered filter collection and catalog evaluation.
//!
//! A record matches when every filter that is set accepts it and every plain
//! search term matches it. Unset filters are skipped, which keeps a neutral
//! filter from costing anything per record.

use crate::filters::{AnyFilter, Filter};
use crate::query::{Delimiter, ParsedQuery, TagQueryParser};

/// Matches one plain search term against a record.
pub trait TermMatcher<R> {
    fn matches(&self, record: &R, term: &str) -> bool;
}

impl<R, F> TermMatcher<R> for F
where
    F: Fn(&R, &str) -> bool,
{
    fn matches(&self, record: &R, term: &str) -> bool {
        self(record, term)
    }
}

pub struct FilterSet<R> {
    filters: Vec<AnyFilter<R>>,
    parser: TagQueryParser,
}

impl<R> Default for FilterSet<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> FilterSet<R> {
    pub fn new() -> Self {
        Self::with_delimiter(Delimiter::Whitespace)
    }

    pub fn with_delimiter(delimiter: Delimiter) -> Self {
        Self {
            filters: Vec::new(),
            parser: TagQueryParser::new(delimiter),
        }
    }

    /// Append a filter. Earlier filters win ambiguous tags.
    pub fn register(&mut self, filter: impl Into<AnyFilter<R>>) -> &mut Self {
        self.filters.push(filter.into());
        self
    }

    pub fn filters(&self) -> &[AnyFilter<R>] {
        &self.filters
    }

    /// Look up a filter by name, case-insensitively.
    pub fn get(&self, name: &str) -> Option<&AnyFilter<R>> {
        self.filters
            .iter()
            .find(|f| f.name().eq_ignore_ascii_case(name))
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut AnyFilter<R>> {
        self.filters
            .iter_mut()
            .find(|f| f.name().eq_ignore_ascii_case(name))
    }

    pub fn parser(&self) -> &TagQueryParser {
        &self.parser
    }

    /// Run a parse pass over `query`.
    pub fn apply_query(&mut self, query: &str) -> ParsedQuery {
        self.parser.parse(query, &mut self.filters)
    }

    pub fn clear_tags(&mut self) {
        for filter in &mut self.filters {
            filter.clear_tags();
        }
    }

    pub fn matches(&self, record: &R, query: &ParsedQuery, matcher: &impl TermMatcher<R>) -> bool {
        self.filters
            .iter()
            .filter(|f| f.is_set())
            .all(|f| f.check(record))
            && query.terms.iter().all(|term| matcher.matches(record, term))
    }

    /// Every record of `records` matching the current filter state and `query`.
    pub fn evaluate<'a>(
        &self,
        records: &'a [R],
        query: &ParsedQuery,
        matcher: &impl TermMatcher<R>,
    ) -> Vec<&'a R> {
        records
            .iter()
            .filter(|record| self.matches(record, query, matcher))
            .collect()
    }

    /// Poll every filter's change flag. True if any changed.
    pub fn take_changed(&mut self) -> bool {
        self.filters
            .iter_mut()
            .fold(false, |changed, f| f.has_changed() || changed)
    }

    /// Filters currently narrowing the results.
    pub fn active(&self) -> impl Iterator<Item = &AnyFilter<R>> {
        self.filters.iter().filter(|f| f.is_set())
    }

    pub fn any_set(&self) -> bool {
        self.filters.iter().any(|f| f.is_set())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::{BooleanFilter, PatchFilter};
    use crate::model::Item;

    fn name_matches(item: &Item, term: &str) -> bool {
        item.name.to_lowercase().contains(&term.to_lowercase())
    }

    fn set() -> FilterSet<Item> {
        let mut set = FilterSet::new();
        set.register(BooleanFilter::with_accessor(
            "Unique",
            "Unique",
            "Not Unique",
            |i: &Item| i.is_unique,
        ))
        .register(PatchFilter::new(|i: &Item| i.patch.as_str().into()));
        set
    }

    fn catalog() -> Vec<Item> {
        let mut sword = Item::new(1, "Iron Sword");
        sword.is_unique = true;
        sword.patch = "2.0".into();
        let mut shield = Item::new(2, "Iron Shield");
        shield.patch = "3.1".into();
        let mut ring = Item::new(3, "Gold Ring");
        ring.is_unique = true;
        ring.patch = "3.15".into();
        vec![sword, shield, ring]
    }

    fn names<'a>(items: &[&'a Item]) -> Vec<&'a str> {
        items.iter().map(|i| i.name.as_str()).collect()
    }

    #[test]
    fn neutral_set_matches_everything() {
        let mut set = set();
        let catalog = catalog();
        let query = set.apply_query("");
        assert_eq!(set.evaluate(&catalog, &query, &name_matches).len(), 3);
        assert!(!set.any_set());
    }

    #[test]
    fn terms_and_filters_combine_with_and() {
        let mut set = set();
        let catalog = catalog();
        let query = set.apply_query("iron unique");
        let found = set.evaluate(&catalog, &query, &name_matches);
        assert_eq!(names(&found), vec!["Iron Sword"]);
    }

    #[test]
    fn persistent_edits_apply_without_tags() {
        let mut set = set();
        let catalog = catalog();
        {
            let patch = set.get_mut("patch").unwrap().as_patch_mut().unwrap();
            let id = patch.find("3.1").unwrap().id;
            patch.select(id);
        }
        let query = set.apply_query("");
        let found = set.evaluate(&catalog, &query, &name_matches);
        assert_eq!(names(&found), vec!["Iron Shield", "Gold Ring"]);
        assert_eq!(set.active().count(), 1);
    }

    #[test]
    fn take_changed_polls_every_filter() {
        let mut set = set();
        set.get_mut("Unique")
            .and_then(|f| f.as_boolean_mut())
            .unwrap()
            .set_show_false(false);
        {
            let patch = set.get_mut("Patch").unwrap().as_patch_mut().unwrap();
            patch.add_slot();
        }

        assert!(set.take_changed());
        assert!(!set.take_changed());
    }

    #[test]
    fn clear_tags_reverts_every_filter() {
        let mut set = set();
        set.apply_query("unique");
        assert!(set.any_set());
        set.clear_tags();
        assert!(!set.any_set());
        set.clear_tags();
        assert!(set.filters().iter().all(|f| !f.is_from_tag()));
    }
}
