//! Fixed label sets the classifier reply is validated against.

use serde::{Serialize, Serializer};
use std::fmt;

/// Freshness of a food item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    SafeForConsumption,
    NeedsImmediateDistribution,
    Waste,
}

impl Condition {
    pub fn label(self) -> &'static str {
        match self {
            Condition::SafeForConsumption => "safe for consumption",
            Condition::NeedsImmediateDistribution => "needs immediate distribution",
            Condition::Waste => "waste",
        }
    }

    /// One-line definition shown to the model.
    pub(crate) fn definition(self) -> &'static str {
        match self {
            Condition::SafeForConsumption => {
                "The food looks fresh and suitable for eating."
            }
            Condition::NeedsImmediateDistribution => {
                "The food is slightly aged, bruised, or nearing spoilage but still edible. \
                 It should be distributed quickly."
            }
            Condition::Waste => {
                "The food shows clear signs of spoilage like mold, significant rot, or decay \
                 and is not suitable for consumption."
            }
        }
    }

    /// Status shown on the inventory dashboard.
    pub fn dashboard_status(self) -> &'static str {
        match self {
            Condition::SafeForConsumption => "Good",
            Condition::NeedsImmediateDistribution => "Critical",
            Condition::Waste => "Waste",
        }
    }
}

/// Inventory category of a food item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FoodType {
    FreshProduce,
    DairyAndEggs,
    Proteins,
    GrainsAndPantryStaples,
    CannedAndPackagedGoods,
}

impl FoodType {
    pub fn label(self) -> &'static str {
        match self {
            FoodType::FreshProduce => "Fresh Produce",
            FoodType::DairyAndEggs => "Dairy & Eggs",
            FoodType::Proteins => "Proteins",
            FoodType::GrainsAndPantryStaples => "Grains & Pantry Staples",
            FoodType::CannedAndPackagedGoods => "Canned & Packaged Goods",
        }
    }

    pub(crate) fn examples(self) -> &'static str {
        match self {
            FoodType::FreshProduce => "Fruits, vegetables, fresh herbs",
            FoodType::DairyAndEggs => "Milk, cheese, yogurt, eggs, butter",
            FoodType::Proteins => "Meat, poultry, fish, tofu, beans",
            FoodType::GrainsAndPantryStaples => "Bread, rice, pasta, flour, sugar",
            FoodType::CannedAndPackagedGoods => "Canned foods, boxed items, packaged snacks",
        }
    }
}

/// A label parsed out of a model reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classified<T> {
    /// One of the fixed labels
    Known(T),
    /// The model answered outside the label set and no fallback matched
    Unrecognized(String),
    /// The reply had no such line
    Unknown,
}

impl<T> Classified<T> {
    pub fn known(&self) -> Option<&T> {
        match self {
            Classified::Known(value) => Some(value),
            _ => None,
        }
    }
}

/// A fixed label set.
pub trait Labeled: Copy + 'static {
    /// Every variant, in prompt and fallback search order.
    const ALL: &'static [Self];

    fn label(self) -> &'static str;

    /// Exact label match.
    fn from_label(value: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|l| l.label() == value)
    }
}

impl Labeled for Condition {
    const ALL: &'static [Self] = &[
        Condition::SafeForConsumption,
        Condition::NeedsImmediateDistribution,
        Condition::Waste,
    ];

    fn label(self) -> &'static str {
        Condition::label(self)
    }
}

impl Labeled for FoodType {
    const ALL: &'static [Self] = &[
        FoodType::FreshProduce,
        FoodType::DairyAndEggs,
        FoodType::Proteins,
        FoodType::GrainsAndPantryStaples,
        FoodType::CannedAndPackagedGoods,
    ];

    fn label(self) -> &'static str {
        FoodType::label(self)
    }
}

impl<T: Labeled> Classified<T> {
    pub fn as_str(&self) -> &str {
        match self {
            Classified::Known(value) => value.label(),
            Classified::Unrecognized(raw) => raw,
            Classified::Unknown => "Unknown",
        }
    }
}

impl<T: Labeled> fmt::Display for Classified<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<T: Labeled> Serialize for Classified<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_label_lookup() {
        assert_eq!(
            Condition::from_label("needs immediate distribution"),
            Some(Condition::NeedsImmediateDistribution)
        );
        assert_eq!(Condition::from_label("Waste"), None);
        assert_eq!(
            FoodType::from_label("Dairy & Eggs"),
            Some(FoodType::DairyAndEggs)
        );
        assert_eq!(FoodType::from_label("dairy & eggs"), None);
    }

    #[test]
    fn test_dashboard_status() {
        assert_eq!(Condition::SafeForConsumption.dashboard_status(), "Good");
        assert_eq!(Condition::NeedsImmediateDistribution.dashboard_status(), "Critical");
        assert_eq!(Condition::Waste.dashboard_status(), "Waste");
    }

    #[test]
    fn test_classified_serializes_as_string() {
        let known = Classified::Known(FoodType::Proteins);
        let raw: Classified<FoodType> = Classified::Unrecognized("Snacks".to_string());
        let unknown: Classified<FoodType> = Classified::Unknown;
        assert_eq!(serde_json::to_string(&known).unwrap(), "\"Proteins\"");
        assert_eq!(serde_json::to_string(&raw).unwrap(), "\"Snacks\"");
        assert_eq!(serde_json::to_string(&unknown).unwrap(), "\"Unknown\"");
    }
}
