// 🏢 Organization Entity - Flattened point-in-time snapshot
//
// "CVR number is IDENTITY (never changes), everything else is a VALUE as of a date"
//
// An OrganizationRecord is derived once per (document, as_of) pair and never mutated.

use crate::tree;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

// ============================================================================
// ADDRESS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Municipality {
    pub code: Option<i64>,
    pub name: Option<String>,
}

/// Postal/registered address as the registry structures it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street_name: Option<String>,
    pub house_number_from: Option<i64>,
    pub house_number_to: Option<i64>,
    pub letter_from: Option<String>,
    pub letter_to: Option<String>,
    pub floor: Option<String>,
    pub door: Option<String>,
    pub co_name: Option<String>,
    pub post_box: Option<String>,
    pub postal_code: Option<i64>,
    pub postal_district: Option<String>,
    pub city_name: Option<String>,
    pub free_text: Option<String>,
    pub country_code: Option<String>,
    pub municipality: Option<Municipality>,
}

impl Address {
    /// Read an address node (`beliggenhedsadresse[]`, `postadresse[]`,
    /// `nyesteBeliggenhedsadresse`). Returns None if the node is not an object.
    pub fn from_tree(node: &Value) -> Option<Address> {
        if !node.is_object() {
            return None;
        }

        let municipality = tree::at(node, &["kommune"]).map(|k| Municipality {
            code: tree::i64_at(k, &["kommuneKode"]),
            name: tree::string_at(k, &["kommuneNavn"]),
        });

        Some(Address {
            street_name: tree::string_at(node, &["vejnavn"]),
            house_number_from: tree::i64_at(node, &["husnummerFra"]),
            house_number_to: tree::i64_at(node, &["husnummerTil"]),
            letter_from: tree::string_at(node, &["bogstavFra"]),
            letter_to: tree::string_at(node, &["bogstavTil"]),
            floor: tree::string_at(node, &["etage"]),
            door: tree::string_at(node, &["sidedoer"]),
            co_name: tree::string_at(node, &["conavn"]),
            post_box: tree::string_at(node, &["postboks"])
                .or_else(|| tree::i64_at(node, &["postboks"]).map(|n| n.to_string())),
            postal_code: tree::i64_at(node, &["postnummer"]),
            postal_district: tree::string_at(node, &["postdistrikt"]),
            city_name: tree::string_at(node, &["bynavn"]),
            free_text: tree::string_at(node, &["fritekst"]),
            country_code: tree::string_at(node, &["landekode"]),
            municipality,
        })
    }

    pub fn municipality_name(&self) -> Option<&str> {
        self.municipality.as_ref().and_then(|m| m.name.as_deref())
    }

    /// Single-line rendering: "Vejnavn 12B, 3. th, 1234 By"
    pub fn one_line(&self) -> String {
        let mut street = String::new();
        if let Some(name) = &self.street_name {
            street.push_str(name);
        }
        if let Some(from) = self.house_number_from {
            street.push_str(&format!(" {}", from));
            if let Some(letter) = &self.letter_from {
                street.push_str(letter);
            }
            if let Some(to) = self.house_number_to {
                street.push_str(&format!("-{}", to));
                if let Some(letter) = &self.letter_to {
                    street.push_str(letter);
                }
            }
        }

        let unit = match (&self.floor, &self.door) {
            (Some(floor), Some(door)) => format!("{}. {}", floor, door),
            (Some(floor), None) => format!("{}.", floor),
            (None, Some(door)) => door.clone(),
            (None, None) => String::new(),
        };

        let town = match (self.postal_code, &self.postal_district) {
            (Some(code), Some(district)) => format!("{} {}", code, district),
            (Some(code), None) => code.to_string(),
            (None, Some(district)) => district.clone(),
            (None, None) => String::new(),
        };

        [street.trim().to_string(), unit, town]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

// ============================================================================
// SNAPSHOT VALUE TYPES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyType {
    pub code: Option<i64>,
    pub short_name: Option<String>,
    pub long_name: Option<String>,
}

/// Industry classification (branchekode + text)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Industry {
    pub code: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Industries {
    pub main: Option<Industry>,
    pub other1: Option<Industry>,
    pub other2: Option<Industry>,
    pub other3: Option<Industry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditStatus {
    pub code: Option<String>,
    pub text: Option<String>,
}

/// Employee-count interval, both ends inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmploymentRange {
    pub from: u32,
    pub to: u32,
}

// ============================================================================
// ORGANIZATION RECORD
// ============================================================================

/// Organization record - one company as of one reference date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganizationRecord {
    // ========================================================================
    // IDENTITY
    // ========================================================================
    pub cvr_number: i64,
    pub name: String,

    /// Historical and secondary names, never containing `name` itself
    pub alternate_names: BTreeSet<String>,

    // ========================================================================
    // LIFECYCLE
    // ========================================================================
    pub status: Option<String>,
    pub founding_date: Option<NaiveDate>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,

    /// Reference date every versioned field was resolved against
    pub as_of: NaiveDate,

    // ========================================================================
    // CONTACT
    // ========================================================================
    pub email: Option<String>,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub fax: Option<String>,
    pub address: Option<Address>,
    pub postal_address: Option<Address>,
    pub municipality: Option<String>,
    pub opt_out_sales_and_advertising: bool,

    // ========================================================================
    // LEGAL FORM & FISCAL ATTRIBUTES
    // ========================================================================
    pub company_type: Option<CompanyType>,
    pub credit_status: Option<CreditStatus>,
    pub fiscal_year_start: Option<String>,
    pub fiscal_year_end: Option<String>,
    pub first_fiscal_year_start: Option<NaiveDate>,
    pub first_fiscal_year_end: Option<NaiveDate>,
    pub purpose: Option<String>,
    pub registered_capital: Option<String>,
    pub registered_capital_currency: Option<String>,
    pub statutes_last_changed: Option<String>,
    pub has_share_capital_classes: Option<String>,

    // ========================================================================
    // CLASSIFICATION
    // ========================================================================
    pub industries: Industries,
    pub employment_range: Option<EmploymentRange>,

    // ========================================================================
    // METADATA
    // ========================================================================
    /// Newest "last modified" marker found anywhere in the source document
    pub last_updated: Option<DateTime<Utc>>,
}

impl OrganizationRecord {
    /// Has the company ceased to exist (as far as the registry knows)?
    pub fn is_dissolved(&self) -> bool {
        self.end_date.is_some()
    }

    /// Primary name followed by alternates
    pub fn all_names(&self) -> Vec<String> {
        let mut names = vec![self.name.clone()];
        names.extend(self.alternate_names.iter().cloned());
        names
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_address_from_tree() {
        let node = json!({
            "vejnavn": "Vesterbrogade",
            "husnummerFra": 12,
            "bogstavFra": "B",
            "etage": "3",
            "sidedoer": "th",
            "postnummer": 1620,
            "postdistrikt": "København V",
            "landekode": "DK",
            "kommune": { "kommuneKode": 101, "kommuneNavn": "KØBENHAVN" }
        });

        let address = Address::from_tree(&node).unwrap();

        assert_eq!(address.street_name.as_deref(), Some("Vesterbrogade"));
        assert_eq!(address.house_number_from, Some(12));
        assert_eq!(address.postal_code, Some(1620));
        assert_eq!(address.municipality_name(), Some("KØBENHAVN"));
        assert_eq!(address.one_line(), "Vesterbrogade 12B, 3. th, 1620 København V");
    }

    #[test]
    fn test_address_without_municipality() {
        let address = Address::from_tree(&json!({ "vejnavn": "Torvet" })).unwrap();

        assert!(address.municipality.is_none());
        assert_eq!(address.municipality_name(), None);
        assert_eq!(address.one_line(), "Torvet");
    }

    #[test]
    fn test_address_requires_object() {
        assert!(Address::from_tree(&json!(null)).is_none());
        assert!(Address::from_tree(&json!("Vesterbrogade 12")).is_none());
    }

    #[test]
    fn test_house_number_range() {
        let address = Address::from_tree(&json!({
            "vejnavn": "Strandvejen",
            "husnummerFra": 10,
            "husnummerTil": 14,
            "postnummer": 2900
        }))
        .unwrap();

        assert_eq!(address.one_line(), "Strandvejen 10-14, 2900");
    }
}
