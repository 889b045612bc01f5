//! # Search Filters
//!
//! A filter is a stateful predicate over catalog records. Its state comes
//! from two places:
//!
//! - **Persistent edits**: what the user set through an editor widget (or CLI
//!   flag). These survive across queries.
//! - **Tags**: tokens inside the free-text query that a filter claims. A tag
//!   overrides the persistent value until the next parse pass, which starts by
//!   calling [`Filter::clear_tags`] on every filter.
//!
//! ## State Machine
//!
//! ```text
//!   Untagged ──try_claim_tag (Claimed/Resolved)──▶ Tagged
//!      ▲                                             │
//!      └──────────────── clear_tags ─────────────────┘
//! ```
//!
//! `clear_tags` restores the exact persistent state that was active before the
//! first claim and is idempotent.
//!
//! ## Variants
//!
//! The set of variants is closed: [`AnyFilter`] is the tagged union the
//! [`crate::filter_set::FilterSet`] stores. A new kind of filter is a new
//! struct implementing [`Filter`] plus a new `AnyFilter` case.
//!
//! | Variant | Selection | Tags |
//! |---------|-----------|------|
//! | [`BooleanFilter`] | tri-state over one boolean attribute | `name`, `not name` |
//! | [`PatchFilter`] | multi-select over release versions | none |
//! | [`RaceSexFilter`] | single option of race × sex | option label, `self` |

mod boolean;
mod patch;
mod race_sex;

pub use boolean::BooleanFilter;
pub use patch::{default_patch_table, short_version, PatchEntry, PatchFilter, VersionFn};
pub use race_sex::{EquipRules, RaceDomain, RaceSexFilter, RaceSexOption, SnapshotSource};

/// Outcome of offering a query token to a filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagClaim {
    /// The token is this filter's tag; state now follows it.
    Claimed,
    /// The token was consumed and changed state, but it is a shortcut that
    /// resolved to another value (e.g. `self`) rather than a literal tag.
    Resolved,
    /// Not this filter's tag; state is unchanged.
    Rejected,
}

impl TagClaim {
    pub fn is_consumed(self) -> bool {
        !matches!(self, TagClaim::Rejected)
    }
}

/// The contract every filter variant implements.
pub trait Filter<R> {
    fn name(&self) -> &str;

    /// Key used by the localization layer for this filter's label.
    fn localization_key(&self) -> &str;

    /// Whether the filter currently narrows results beyond its neutral state.
    fn is_set(&self) -> bool;

    fn is_from_tag(&self) -> bool;

    /// Edge-triggered change flag. Reading it clears it.
    fn has_changed(&mut self) -> bool;

    /// Pure predicate over the current state.
    fn check(&self, record: &R) -> bool;

    fn clear_tags(&mut self);

    fn try_claim_tag(&mut self, token: &str) -> TagClaim;

    /// Short description of the active value.
    fn summary(&self) -> String;

    /// Tag spellings this filter accepts, for help output.
    fn tag_hints(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Closed set of filter variants.
pub enum AnyFilter<R> {
    Boolean(BooleanFilter<R>),
    Patch(PatchFilter<R>),
    RaceSex(RaceSexFilter<R>),
}

impl<R> AnyFilter<R> {
    fn inner(&self) -> &dyn Filter<R> {
        match self {
            AnyFilter::Boolean(f) => f,
            AnyFilter::Patch(f) => f,
            AnyFilter::RaceSex(f) => f,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Filter<R> {
        match self {
            AnyFilter::Boolean(f) => f,
            AnyFilter::Patch(f) => f,
            AnyFilter::RaceSex(f) => f,
        }
    }

    pub fn as_boolean(&self) -> Option<&BooleanFilter<R>> {
        match self {
            AnyFilter::Boolean(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_boolean_mut(&mut self) -> Option<&mut BooleanFilter<R>> {
        match self {
            AnyFilter::Boolean(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_patch(&self) -> Option<&PatchFilter<R>> {
        match self {
            AnyFilter::Patch(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_patch_mut(&mut self) -> Option<&mut PatchFilter<R>> {
        match self {
            AnyFilter::Patch(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_race_sex(&self) -> Option<&RaceSexFilter<R>> {
        match self {
            AnyFilter::RaceSex(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_race_sex_mut(&mut self) -> Option<&mut RaceSexFilter<R>> {
        match self {
            AnyFilter::RaceSex(f) => Some(f),
            _ => None,
        }
    }
}

impl<R> Filter<R> for AnyFilter<R> {
    fn name(&self) -> &str {
        self.inner().name()
    }

    fn localization_key(&self) -> &str {
        self.inner().localization_key()
    }

    fn is_set(&self) -> bool {
        self.inner().is_set()
    }

    fn is_from_tag(&self) -> bool {
        self.inner().is_from_tag()
    }

    fn has_changed(&mut self) -> bool {
        self.inner_mut().has_changed()
    }

    fn check(&self, record: &R) -> bool {
        self.inner().check(record)
    }

    fn clear_tags(&mut self) {
        self.inner_mut().clear_tags()
    }

    fn try_claim_tag(&mut self, token: &str) -> TagClaim {
        self.inner_mut().try_claim_tag(token)
    }

    fn summary(&self) -> String {
        self.inner().summary()
    }

    fn tag_hints(&self) -> Vec<String> {
        self.inner().tag_hints()
    }
}

impl<R> From<BooleanFilter<R>> for AnyFilter<R> {
    fn from(filter: BooleanFilter<R>) -> Self {
        AnyFilter::Boolean(filter)
    }
}

impl<R> From<PatchFilter<R>> for AnyFilter<R> {
    fn from(filter: PatchFilter<R>) -> Self {
        AnyFilter::Patch(filter)
    }
}

impl<R> From<RaceSexFilter<R>> for AnyFilter<R> {
    fn from(filter: RaceSexFilter<R>) -> Self {
        AnyFilter::RaceSex(filter)
    }
}

/// Canonical form used to compare tag tokens: lowercase, without whitespace
/// or apostrophes.
pub(crate) fn normalize_tag(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace() && *c != '\'' && *c != '’')
        .flat_map(char::to_lowercase)
        .collect()
}
