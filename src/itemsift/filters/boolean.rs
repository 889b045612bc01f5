//! Tri-state filter over one boolean attribute.
//!
//! Two checkboxes, "true" and "false". Both ticked (the default) means the
//! filter is neutral. Unticking one leg always re-ticks the other, so the
//! filter can never exclude every record.

use super::{normalize_tag, Filter, TagClaim};
use crate::attributes::{AttributeRegistry, BoolAccessor};

pub struct BooleanFilter<R> {
    name: String,
    localization_key: String,
    true_label: String,
    false_label: String,
    /// Normalized name and its "not" form, the two tags this filter claims
    tag: String,
    not_tag: String,
    /// `None` when the attribute name did not resolve; the filter is then inert.
    accessor: Option<BoolAccessor<R>>,
    invert: bool,
    show_true: bool,
    show_false: bool,
    using_tag: bool,
    tagged_true: bool,
    tagged_false: bool,
    modified: bool,
}

impl<R> BooleanFilter<R> {
    /// Build a filter reading `attribute` from `registry`.
    ///
    /// An unknown attribute is logged here, once, and the filter matches
    /// every record from then on.
    pub fn new(
        name: impl Into<String>,
        true_label: impl Into<String>,
        false_label: impl Into<String>,
        registry: &AttributeRegistry<R>,
        attribute: &str,
    ) -> Self {
        let name = name.into();
        let accessor = registry.get(attribute);
        if accessor.is_none() {
            log::error!(
                "Invalid check function for boolean filter '{}': unknown attribute '{}'",
                name,
                attribute
            );
        }
        Self::build(name, true_label.into(), false_label.into(), accessor)
    }

    /// Build a filter around an accessor directly.
    pub fn with_accessor(
        name: impl Into<String>,
        true_label: impl Into<String>,
        false_label: impl Into<String>,
        accessor: BoolAccessor<R>,
    ) -> Self {
        Self::build(
            name.into(),
            true_label.into(),
            false_label.into(),
            Some(accessor),
        )
    }

    fn build(
        name: String,
        true_label: String,
        false_label: String,
        accessor: Option<BoolAccessor<R>>,
    ) -> Self {
        let localization_key = format!("{}SearchFilter", name.replace(' ', ""));
        let tag = normalize_tag(&name);
        let not_tag = format!("not{}", tag);
        Self {
            name,
            localization_key,
            true_label,
            false_label,
            tag,
            not_tag,
            accessor,
            invert: false,
            show_true: true,
            show_false: true,
            using_tag: false,
            tagged_true: false,
            tagged_false: false,
            modified: false,
        }
    }

    /// Read the attribute negated (e.g. "Tradable" over `IsUntradable`).
    pub fn inverted(mut self) -> Self {
        self.invert = true;
        self
    }

    pub fn true_label(&self) -> &str {
        &self.true_label
    }

    pub fn false_label(&self) -> &str {
        &self.false_label
    }

    /// The persistent (widget) pair.
    pub fn persistent(&self) -> (bool, bool) {
        (self.show_true, self.show_false)
    }

    /// The pair `check` currently uses.
    pub fn active(&self) -> (bool, bool) {
        if self.using_tag {
            (self.tagged_true, self.tagged_false)
        } else {
            (self.show_true, self.show_false)
        }
    }

    /// Tick or untick the "true" leg. Ignored while a tag is active.
    pub fn set_show_true(&mut self, value: bool) -> bool {
        if self.using_tag {
            return false;
        }
        self.show_true = value;
        if !value {
            self.show_false = true;
        }
        self.modified = true;
        true
    }

    /// Tick or untick the "false" leg. Ignored while a tag is active.
    pub fn set_show_false(&mut self, value: bool) -> bool {
        if self.using_tag {
            return false;
        }
        self.show_false = value;
        if !value {
            self.show_true = true;
        }
        self.modified = true;
        true
    }

    /// Back to neutral. Ignored while a tag is active.
    pub fn reset(&mut self) -> bool {
        if self.using_tag {
            return false;
        }
        self.show_true = true;
        self.show_false = true;
        self.modified = true;
        true
    }
}

impl<R> Filter<R> for BooleanFilter<R> {
    fn name(&self) -> &str {
        &self.name
    }

    fn localization_key(&self) -> &str {
        &self.localization_key
    }

    fn is_set(&self) -> bool {
        self.using_tag || !self.show_true || !self.show_false
    }

    fn is_from_tag(&self) -> bool {
        self.using_tag
    }

    fn has_changed(&mut self) -> bool {
        std::mem::take(&mut self.modified)
    }

    fn check(&self, record: &R) -> bool {
        let Some(get) = self.accessor else {
            return true;
        };
        let value = get(record) != self.invert;
        let (want_true, want_false) = self.active();
        if value {
            want_true
        } else {
            want_false
        }
    }

    fn clear_tags(&mut self) {
        self.using_tag = false;
    }

    fn try_claim_tag(&mut self, token: &str) -> TagClaim {
        let t = normalize_tag(token);

        if t == self.not_tag {
            self.tagged_true = false;
            self.tagged_false = true;
        } else if t == self.tag {
            self.tagged_true = true;
            self.tagged_false = false;
        } else {
            return TagClaim::Rejected;
        }

        self.using_tag = true;
        TagClaim::Claimed
    }

    fn summary(&self) -> String {
        match self.active() {
            (true, false) => self.true_label.clone(),
            (false, true) => self.false_label.clone(),
            _ => "Any".to_string(),
        }
    }

    fn tag_hints(&self) -> Vec<String> {
        vec![self.tag.clone(), self.not_tag.clone()]
    }
}
