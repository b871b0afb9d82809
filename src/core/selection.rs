use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Filter groups offered next to the category bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterGroup {
    Amenities,
    Equipment,
    Services,
    Price,
}

impl FilterGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterGroup::Amenities => "amenities",
            FilterGroup::Equipment => "equipment",
            FilterGroup::Services => "services",
            FilterGroup::Price => "price",
        }
    }
}

impl fmt::Display for FilterGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Selected option ids per filter group
///
/// A group never maps to an empty set: the last removal purges the key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<FilterGroup, Vec<String>>",
    into = "BTreeMap<FilterGroup, Vec<String>>"
)]
pub struct FilterSelection {
    groups: BTreeMap<FilterGroup, BTreeSet<String>>,
}

impl FilterSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert of several options; blank ids are ignored
    pub fn with<I, S>(mut self, group: FilterGroup, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for option in options {
            self.insert(group, option.into());
        }
        self
    }

    fn insert(&mut self, group: FilterGroup, option: String) {
        let option = option.trim();
        if option.is_empty() {
            return;
        }
        self.groups
            .entry(group)
            .or_default()
            .insert(option.to_string());
    }

    /// Flip one option. Returns whether the option is selected afterwards.
    pub fn toggle(&mut self, group: FilterGroup, option: &str) -> bool {
        let option = option.trim();
        if option.is_empty() {
            return false;
        }

        let options = self.groups.entry(group).or_default();
        let selected = if options.remove(option) {
            false
        } else {
            options.insert(option.to_string());
            true
        };

        if options.is_empty() {
            self.groups.remove(&group);
        }

        selected
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn contains_group(&self, group: FilterGroup) -> bool {
        self.groups.contains_key(&group)
    }

    pub fn selected(&self, group: FilterGroup) -> Option<&BTreeSet<String>> {
        self.groups.get(&group)
    }

    pub fn is_selected(&self, group: FilterGroup, option: &str) -> bool {
        self.groups
            .get(&group)
            .is_some_and(|options| options.contains(option))
    }

    pub fn groups(&self) -> impl Iterator<Item = (FilterGroup, &BTreeSet<String>)> {
        self.groups.iter().map(|(group, options)| (*group, options))
    }
}

impl From<BTreeMap<FilterGroup, Vec<String>>> for FilterSelection {
    fn from(value: BTreeMap<FilterGroup, Vec<String>>) -> Self {
        value
            .into_iter()
            .fold(FilterSelection::new(), |selection, (group, options)| {
                selection.with(group, options)
            })
    }
}

impl From<FilterSelection> for BTreeMap<FilterGroup, Vec<String>> {
    fn from(value: FilterSelection) -> Self {
        value
            .groups
            .into_iter()
            .map(|(group, options)| (group, options.into_iter().collect()))
            .collect()
    }
}

/// Price tiers of the `price` filter group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PriceTier {
    Budget,
    Moderate,
    Premium,
    Luxury,
}

impl PriceTier {
    /// Option id used by the `price` filter group
    pub fn id(&self) -> &'static str {
        match self {
            PriceTier::Budget => "budget",
            PriceTier::Moderate => "moderate",
            PriceTier::Premium => "premium",
            PriceTier::Luxury => "luxury",
        }
    }

    /// Dollar-sign label stored on gyms
    pub fn label(&self) -> &'static str {
        match self {
            PriceTier::Budget => "$",
            PriceTier::Moderate => "$$",
            PriceTier::Premium => "$$$",
            PriceTier::Luxury => "$$$$",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "budget" => Some(PriceTier::Budget),
            "moderate" => Some(PriceTier::Moderate),
            "premium" => Some(PriceTier::Premium),
            "luxury" => Some(PriceTier::Luxury),
            _ => None,
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "$" => Some(PriceTier::Budget),
            "$$" => Some(PriceTier::Moderate),
            "$$$" => Some(PriceTier::Premium),
            "$$$$" => Some(PriceTier::Luxury),
            _ => None,
        }
    }

    /// Places price levels run 0 (free) to 4; free has no tier
    pub fn from_price_level(level: u8) -> Option<Self> {
        match level {
            1 => Some(PriceTier::Budget),
            2 => Some(PriceTier::Moderate),
            3 => Some(PriceTier::Premium),
            4 => Some(PriceTier::Luxury),
            _ => None,
        }
    }
}
