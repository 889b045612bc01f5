//! Tag query parsing.
//!
//! A query is split into tokens. Each token is offered to the filters in
//! registration order and the first filter that consumes it wins; whatever no
//! filter consumes is kept as a plain search term. Registration order is the
//! only tie-break between filters that would both accept a token.
//!
//! Every parse pass starts by clearing tags on all filters, so nothing from
//! the previous query survives.

use crate::filters::{AnyFilter, Filter, TagClaim};

/// How a query is split into tokens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Delimiter {
    #[default]
    Whitespace,
    Char(char),
}

/// A token consumed by a filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimedTag {
    pub filter: String,
    pub token: String,
}

/// Result of one parse pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedQuery {
    /// Tokens no filter consumed, in query order
    pub terms: Vec<String>,
    /// Literal tags, in query order
    pub claimed: Vec<ClaimedTag>,
    /// Shortcut tokens (e.g. `self`) that were consumed but are not literal tags
    pub resolved: Vec<ClaimedTag>,
}

impl ParsedQuery {
    pub fn has_terms(&self) -> bool {
        !self.terms.is_empty()
    }

    /// Whether `filter` consumed a token in this pass.
    pub fn was_claimed_by(&self, filter: &str) -> bool {
        self.claimed
            .iter()
            .chain(self.resolved.iter())
            .any(|c| c.filter == filter)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TagQueryParser {
    delimiter: Delimiter,
}

impl TagQueryParser {
    pub fn new(delimiter: Delimiter) -> Self {
        Self { delimiter }
    }

    pub fn delimiter(&self) -> Delimiter {
        self.delimiter
    }

    /// Split and trim, dropping empty tokens.
    pub fn tokenize<'a>(&self, query: &'a str) -> Vec<&'a str> {
        match self.delimiter {
            Delimiter::Whitespace => query.split_whitespace().collect(),
            Delimiter::Char(c) => query
                .split(c)
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }

    /// Clear all tags, then route every token of `query`.
    pub fn parse<R>(&self, query: &str, filters: &mut [AnyFilter<R>]) -> ParsedQuery {
        for filter in filters.iter_mut() {
            filter.clear_tags();
        }

        let mut parsed = ParsedQuery::default();
        for token in self.tokenize(query) {
            let mut consumed = false;
            for filter in filters.iter_mut() {
                let claim = filter.try_claim_tag(token);
                if !claim.is_consumed() {
                    continue;
                }
                let tag = ClaimedTag {
                    filter: filter.name().to_string(),
                    token: token.to_string(),
                };
                log::debug!("Tag '{}' consumed by {} ({:?})", token, tag.filter, claim);
                match claim {
                    TagClaim::Resolved => parsed.resolved.push(tag),
                    _ => parsed.claimed.push(tag),
                }
                consumed = true;
                break;
            }
            if !consumed {
                parsed.terms.push(token.to_string());
            }
        }
        parsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::BooleanFilter;
    use crate::model::Item;

    fn filters() -> Vec<AnyFilter<Item>> {
        vec![
            BooleanFilter::with_accessor("Unique", "Unique", "Not Unique", |i: &Item| i.is_unique)
                .into(),
            BooleanFilter::with_accessor(
                "Collectable",
                "Collectable",
                "Not Collectable",
                |i: &Item| i.is_collectable,
            )
            .into(),
        ]
    }

    #[test]
    fn tokenize_on_whitespace_trims_and_drops_empties() {
        let parser = TagQueryParser::default();
        assert_eq!(parser.tokenize("  iron   sword "), vec!["iron", "sword"]);
        assert!(parser.tokenize("   ").is_empty());
    }

    #[test]
    fn tokenize_on_custom_delimiter() {
        let parser = TagQueryParser::new(Delimiter::Char(','));
        assert_eq!(
            parser.tokenize("not unique, iron sword ,,"),
            vec!["not unique", "iron sword"]
        );
    }

    #[test]
    fn unclaimed_tokens_become_terms() {
        let mut filters = filters();
        let parsed = TagQueryParser::default().parse("iron unique sword", &mut filters);
        assert_eq!(parsed.terms, vec!["iron", "sword"]);
        assert_eq!(parsed.claimed.len(), 1);
        assert_eq!(parsed.claimed[0].filter, "Unique");
        assert!(parsed.was_claimed_by("Unique"));
        assert!(!parsed.was_claimed_by("Collectable"));
    }

    #[test]
    fn each_token_routes_to_its_filter() {
        let mut filters = filters();
        let parsed = TagQueryParser::default().parse("unique notcollectable", &mut filters);
        assert!(!parsed.has_terms());
        assert!(filters.iter().all(|f| f.is_from_tag()));
    }

    #[test]
    fn first_registered_filter_wins() {
        let mut filters: Vec<AnyFilter<Item>> = vec![
            BooleanFilter::with_accessor("Rare", "Rare", "Common", |i: &Item| i.is_unique).into(),
            BooleanFilter::with_accessor("Rare", "Rare", "Common", |i: &Item| i.can_be_hq).into(),
        ];
        TagQueryParser::default().parse("rare", &mut filters);
        assert!(filters[0].is_from_tag());
        assert!(!filters[1].is_from_tag());
    }

    #[test]
    fn new_pass_clears_previous_tags() {
        let mut filters = filters();
        let parser = TagQueryParser::default();
        parser.parse("unique", &mut filters);
        assert!(filters[0].is_from_tag());

        parser.parse("sword", &mut filters);
        assert!(!filters[0].is_from_tag());
        assert!(!filters[0].is_set());
    }

    #[test]
    fn spaced_not_tag_needs_a_custom_delimiter() {
        let mut filters = filters();
        let parsed = TagQueryParser::new(Delimiter::Char(','))
            .parse("not collectable, ore", &mut filters);
        assert_eq!(parsed.terms, vec!["ore"]);
        assert!(filters[1].is_from_tag());
    }
}
