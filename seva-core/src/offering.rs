use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Offering categories in the temple catalog
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Regular,
    Special,
    Festival,
    Premium,
    Parent,
    Subcategory,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Regular => "regular",
            Category::Special => "special",
            Category::Festival => "festival",
            Category::Premium => "premium",
            Category::Parent => "parent",
            Category::Subcategory => "subcategory",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "regular" => Some(Category::Regular),
            "special" => Some(Category::Special),
            "festival" => Some(Category::Festival),
            "premium" => Some(Category::Premium),
            "parent" => Some(Category::Parent),
            "subcategory" => Some(Category::Subcategory),
            _ => None,
        }
    }
}

/// Participant capacity of an offering. The catalog stores this as a
/// nullable integer; NULL (or zero) means no participant limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<u32>", into = "Option<u32>")]
pub enum Capacity {
    Unlimited,
    Limited(u32),
}

impl Capacity {
    pub fn is_unlimited(&self) -> bool {
        matches!(self, Capacity::Unlimited)
    }

    /// The participant limit, if any.
    pub fn limit(&self) -> Option<u32> {
        match self {
            Capacity::Unlimited => None,
            Capacity::Limited(n) => Some(*n),
        }
    }
}

impl From<Option<u32>> for Capacity {
    fn from(value: Option<u32>) -> Self {
        match value {
            Some(n) if n > 0 => Capacity::Limited(n),
            _ => Capacity::Unlimited,
        }
    }
}

impl From<Capacity> for Option<u32> {
    fn from(value: Capacity) -> Self {
        value.limit()
    }
}

/// A bookable ritual/event entry in the temple catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Offering {
    pub id: i32,
    /// English name
    pub name: String,
    pub name_malayalam: String,
    pub malayalam_date: String,
    pub day: String,
    /// Fixed calendar date; None means bookable any day
    pub bookable_date: Option<NaiveDate>,
    /// Price in INR; None means not directly bookable
    pub amount: Option<i32>,
    pub category: Category,
    /// Grouping key linking a subcategory to its parent offering
    pub parent_key: Option<String>,
    pub description: Option<String>,
    pub description_english: Option<String>,
    pub capacity: Capacity,
    pub online_booking_available: bool,
    pub requires_direct_visit: bool,
    pub requires_notification: bool,
    pub requires_advance_booking: bool,
    pub requires_booking: bool,
    pub is_comprehensive_ritual: bool,
}

impl Offering {
    /// Parent categories group subcategories and are never bookable
    /// themselves; un-priced entries are informational only.
    pub fn is_bookable(&self) -> bool {
        self.category != Category::Parent && self.amount.is_some()
    }

    /// Human-readable booking requirements for the presentation layer.
    pub fn booking_requirements(&self) -> Vec<&'static str> {
        let mut requirements = Vec::new();
        if self.requires_advance_booking {
            requirements.push("Advance booking required");
        }
        if self.requires_direct_visit {
            requirements.push("Direct visit to temple required");
        }
        if self.requires_notification {
            requirements.push("Prior notification to temple authorities required");
        }
        if self.requires_booking {
            requirements.push("Booking required for this ritual");
        }
        if self.online_booking_available {
            requirements.push("Online booking available");
        }
        if self.is_comprehensive_ritual {
            requirements.push("This is a comprehensive ritual with multiple components");
        }
        requirements
    }
}
