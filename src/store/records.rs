/// Record Types
///
/// Typed schema for both datasets. Records are validated once when the
/// dataset is deserialized; a record with a missing field, a wrong type or an
/// unknown enum value fails the whole load.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::matcher::FieldText;

/// Discipline a building code belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeCategory {
    Electrical,
    Plumbing,
    Structural,
    Mechanical,
    General,
}

impl CodeCategory {
    pub const ALL: [CodeCategory; 5] = [
        CodeCategory::Electrical,
        CodeCategory::Plumbing,
        CodeCategory::Structural,
        CodeCategory::Mechanical,
        CodeCategory::General,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CodeCategory::Electrical => "electrical",
            CodeCategory::Plumbing => "plumbing",
            CodeCategory::Structural => "structural",
            CodeCategory::Mechanical => "mechanical",
            CodeCategory::General => "general",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Jurisdiction {
    National,
    State,
    City,
}

impl Jurisdiction {
    pub const ALL: [Jurisdiction; 3] = [Jurisdiction::National, Jurisdiction::State, Jurisdiction::City];

    pub fn as_str(self) -> &'static str {
        match self {
            Jurisdiction::National => "National",
            Jurisdiction::State => "State",
            Jurisdiction::City => "City",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|j| j.as_str() == value)
    }
}

/// A single building code section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeRecord {
    pub id: String,
    pub code_ref: String,
    pub title: String,
    pub category: CodeCategory,
    pub jurisdiction: Jurisdiction,
    pub summary: String,
    pub source: String,
    pub common_questions: Vec<String>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub related_codes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_text: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductCategory {
    Electrical,
    Plumbing,
    Lumber,
    Flooring,
    Hardware,
}

impl ProductCategory {
    pub const ALL: [ProductCategory; 5] = [
        ProductCategory::Electrical,
        ProductCategory::Plumbing,
        ProductCategory::Lumber,
        ProductCategory::Flooring,
        ProductCategory::Hardware,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ProductCategory::Electrical => "electrical",
            ProductCategory::Plumbing => "plumbing",
            ProductCategory::Lumber => "lumber",
            ProductCategory::Flooring => "flooring",
            ProductCategory::Hardware => "hardware",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == value)
    }
}

/// Value of a product specification attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SpecValue {
    Flag(bool),
    Number(f64),
    Text(String),
    List(Vec<String>),
}

impl SpecValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            SpecValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for SpecValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpecValue::Flag(true) => f.write_str("Yes"),
            SpecValue::Flag(false) => f.write_str("No"),
            SpecValue::Number(n) => write!(f, "{}", n),
            SpecValue::Text(s) => f.write_str(s),
            SpecValue::List(items) => f.write_str(&items.join(", ")),
        }
    }
}

/// A product offered by a supplier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: String,
    pub name: String,
    pub category: ProductCategory,
    #[serde(default)]
    pub subcategory: String,
    pub price: Decimal,
    pub unit: String,
    pub supplier: String,
    #[serde(default)]
    pub manufacturer: String,
    #[serde(default)]
    pub specifications: BTreeMap<String, SpecValue>,
    #[serde(default)]
    pub alternatives: Vec<String>,
    #[serde(default = "default_in_stock")]
    pub in_stock: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity_available: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default)]
    pub review_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

fn default_in_stock() -> bool {
    true
}

/// Common view over the record types held by a store.
pub trait Record {
    fn id(&self) -> &str;

    /// Human-facing reference used for exact lookups (code reference, product id).
    fn reference(&self) -> &str;

    /// Fields free text is matched against, in a fixed order.
    fn searchable_fields(&self) -> Vec<FieldText<'_>>;
}

impl Record for CodeRecord {
    fn id(&self) -> &str {
        &self.id
    }

    fn reference(&self) -> &str {
        &self.code_ref
    }

    fn searchable_fields(&self) -> Vec<FieldText<'_>> {
        vec![
            FieldText::One(&self.title),
            FieldText::One(&self.summary),
            FieldText::Many(&self.common_questions),
            FieldText::One(&self.code_ref),
        ]
    }
}

impl Record for ProductRecord {
    fn id(&self) -> &str {
        &self.id
    }

    fn reference(&self) -> &str {
        &self.id
    }

    fn searchable_fields(&self) -> Vec<FieldText<'_>> {
        vec![
            FieldText::One(&self.name),
            FieldText::One(&self.subcategory),
            FieldText::One(&self.manufacturer),
            FieldText::One(self.category.as_str()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_record_rejects_unknown_category() {
        let raw = r#"{
            "id": "x", "code_ref": "NEC 1", "title": "t", "category": "roofing",
            "jurisdiction": "National", "summary": "s", "source": "src",
            "common_questions": []
        }"#;
        assert!(serde_json::from_str::<CodeRecord>(raw).is_err());
    }

    #[test]
    fn test_product_record_defaults() {
        let raw = r#"{
            "id": "HD-1", "name": "Wire", "category": "electrical",
            "price": "12.50", "unit": "each", "supplier": "Home Depot"
        }"#;
        let product: ProductRecord = serde_json::from_str(raw).unwrap();
        assert!(product.in_stock);
        assert!(product.alternatives.is_empty());
        assert_eq!(product.price, Decimal::new(1250, 2));
    }

    #[test]
    fn test_spec_value_display() {
        let list = SpecValue::List(vec!["PEX".to_string(), "Copper".to_string()]);
        assert_eq!(list.to_string(), "PEX, Copper");
        assert_eq!(SpecValue::Flag(true).to_string(), "Yes");
        assert_eq!(SpecValue::Number(10.0).to_string(), "10");
    }

    #[test]
    fn test_enum_parse_is_exact() {
        assert_eq!(Jurisdiction::parse("City"), Some(Jurisdiction::City));
        assert_eq!(Jurisdiction::parse("city"), None);
        assert_eq!(CodeCategory::parse("plumbing"), Some(CodeCategory::Plumbing));
        assert_eq!(ProductCategory::parse("tile"), None);
    }
}
