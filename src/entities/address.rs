//! Administrative address hierarchy
//!
//! The backend serves five flat lists (regions, districts, counties,
//! sub-counties, parishes) linked by `parentId`. The hierarchy is fetched once
//! and is read-only afterwards. Given a parish, the resolver walks the parent
//! links upward to fill in every level; a broken link degrades the missing
//! levels to empty strings.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A node in the administrative hierarchy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressItem {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

impl AddressItem {
    pub fn new(id: impl Into<String>, name: impl Into<String>, parent_id: Option<&str>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            parent_id: parent_id.map(String::from),
        }
    }
}

/// Level of the hierarchy, top to bottom
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressLevel {
    Region,
    District,
    County,
    SubCounty,
    Parish,
}

impl std::fmt::Display for AddressLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AddressLevel::Region => write!(f, "region"),
            AddressLevel::District => write!(f, "district"),
            AddressLevel::County => write!(f, "county"),
            AddressLevel::SubCounty => write!(f, "sub-county"),
            AddressLevel::Parish => write!(f, "parish"),
        }
    }
}

/// One resolved level: id and display name, both empty when unresolved
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedLevel {
    pub id: String,
    pub name: String,
}

impl ResolvedLevel {
    fn from_item(item: Option<&AddressItem>) -> Self {
        item.map(|i| ResolvedLevel {
            id: i.id.clone(),
            name: i.name.clone(),
        })
        .unwrap_or_default()
    }

    pub fn is_resolved(&self) -> bool {
        !self.id.is_empty()
    }
}

/// Full ancestor chain of a parish
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressChain {
    pub region: ResolvedLevel,
    pub district: ResolvedLevel,
    pub county: ResolvedLevel,
    pub sub_county: ResolvedLevel,
    pub parish: ResolvedLevel,
}

/// Outcome of typing into the parish field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParishSelection {
    /// Exact case-insensitive match against a known parish
    Matched(AddressChain),
    /// Anything else, kept verbatim as a free-form parish name
    FreeText(String),
}

/// The five reference lists with id indexes
#[derive(Debug, Clone, Default)]
pub struct AddressHierarchy {
    regions: Vec<AddressItem>,
    districts: Vec<AddressItem>,
    counties: Vec<AddressItem>,
    sub_counties: Vec<AddressItem>,
    parishes: Vec<AddressItem>,
    index: HashMap<AddressLevel, HashMap<String, usize>>,
}

impl AddressHierarchy {
    pub fn new(
        regions: Vec<AddressItem>,
        districts: Vec<AddressItem>,
        counties: Vec<AddressItem>,
        sub_counties: Vec<AddressItem>,
        parishes: Vec<AddressItem>,
    ) -> Self {
        let mut hierarchy = Self {
            regions,
            districts,
            counties,
            sub_counties,
            parishes,
            index: HashMap::new(),
        };
        for level in [
            AddressLevel::Region,
            AddressLevel::District,
            AddressLevel::County,
            AddressLevel::SubCounty,
            AddressLevel::Parish,
        ] {
            let by_id = hierarchy
                .items(level)
                .iter()
                .enumerate()
                .map(|(i, item)| (item.id.clone(), i))
                .collect();
            hierarchy.index.insert(level, by_id);
        }
        hierarchy
    }

    /// All items at a level
    pub fn items(&self, level: AddressLevel) -> &[AddressItem] {
        match level {
            AddressLevel::Region => &self.regions,
            AddressLevel::District => &self.districts,
            AddressLevel::County => &self.counties,
            AddressLevel::SubCounty => &self.sub_counties,
            AddressLevel::Parish => &self.parishes,
        }
    }

    /// Look up an item by id at a level
    pub fn get(&self, level: AddressLevel, id: &str) -> Option<&AddressItem> {
        self.index
            .get(&level)
            .and_then(|by_id| by_id.get(id))
            .map(|&i| &self.items(level)[i])
    }

    pub fn is_empty(&self) -> bool {
        self.parishes.is_empty()
    }

    /// Walk parish → sub-county → county → district → region
    pub fn fill_address_hierarchy(&self, parish_id: &str) -> AddressChain {
        let parish = self.get(AddressLevel::Parish, parish_id);
        let sub_county = self.parent(parish, AddressLevel::SubCounty);
        let county = self.parent(sub_county, AddressLevel::County);
        let district = self.parent(county, AddressLevel::District);
        let region = self.parent(district, AddressLevel::Region);

        AddressChain {
            region: ResolvedLevel::from_item(region),
            district: ResolvedLevel::from_item(district),
            county: ResolvedLevel::from_item(county),
            sub_county: ResolvedLevel::from_item(sub_county),
            parish: ResolvedLevel::from_item(parish),
        }
    }

    fn parent(&self, child: Option<&AddressItem>, level: AddressLevel) -> Option<&AddressItem> {
        child
            .and_then(|c| c.parent_id.as_deref())
            .and_then(|pid| self.get(level, pid))
    }

    /// Parishes whose name contains `query`, case-insensitively
    pub fn search_parishes(&self, query: &str) -> Vec<&AddressItem> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.parishes
            .iter()
            .filter(|p| p.name.to_lowercase().contains(&needle))
            .collect()
    }

    /// Resolve free text typed into the parish field
    pub fn match_parish_input(&self, text: &str) -> ParishSelection {
        let wanted = text.trim().to_lowercase();
        let exact = if wanted.is_empty() {
            None
        } else {
            self.parishes.iter().find(|p| p.name.to_lowercase() == wanted)
        };
        match exact {
            Some(parish) => ParishSelection::Matched(self.fill_address_hierarchy(&parish.id)),
            None => ParishSelection::FreeText(text.to_string()),
        }
    }
}
