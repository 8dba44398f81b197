// 🏛️ Semantic Layer - Attribute Tags
// Free-form registry attributes ("attributter") are keyed by a type tag.
// The tag says WHAT the value means; the record field says WHERE it lands.

use serde::{Deserialize, Serialize};

// ============================================================================
// VALUE KINDS
// ============================================================================

/// How the raw string value of an attribute must be interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueKind {
    /// Kept verbatim
    Text,
    /// Must parse as a calendar date, otherwise the value is discarded
    Date,
}

// ============================================================================
// ATTRIBUTE TAG
// ============================================================================

/// Attribute-type tags the record builder knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttributeTag {
    FiscalYearStart,
    FiscalYearEnd,
    FirstFiscalPeriodStart,
    FirstFiscalPeriodEnd,
    Purpose,
    Capital,
    CapitalCurrency,
    StatutesLastChanged,
    ShareCapitalClasses,
    NameIdentity,
}

impl AttributeTag {
    /// Every known tag, in catalog order
    pub const ALL: [AttributeTag; 10] = [
        AttributeTag::FiscalYearStart,
        AttributeTag::FiscalYearEnd,
        AttributeTag::FirstFiscalPeriodStart,
        AttributeTag::FirstFiscalPeriodEnd,
        AttributeTag::Purpose,
        AttributeTag::Capital,
        AttributeTag::CapitalCurrency,
        AttributeTag::StatutesLastChanged,
        AttributeTag::ShareCapitalClasses,
        AttributeTag::NameIdentity,
    ];

    /// The tag exactly as the registry writes it in `attributter[].type`
    pub fn registry_code(&self) -> &'static str {
        match self {
            AttributeTag::FiscalYearStart => "REGNSKABSÅR_START",
            AttributeTag::FiscalYearEnd => "REGNSKABSÅR_SLUT",
            AttributeTag::FirstFiscalPeriodStart => "FØRSTE_REGNSKABSPERIODE_START",
            AttributeTag::FirstFiscalPeriodEnd => "FØRSTE_REGNSKABSPERIODE_SLUT",
            AttributeTag::Purpose => "FORMÅL",
            AttributeTag::Capital => "KAPITAL",
            AttributeTag::CapitalCurrency => "KAPITALVALUTA",
            AttributeTag::StatutesLastChanged => "VEDTÆGT_SENESTE",
            AttributeTag::ShareCapitalClasses => "KAPITALKLASSER",
            AttributeTag::NameIdentity => "NAVN_IDENTITET",
        }
    }

    /// Look up a tag by its registry code (exact match)
    pub fn from_registry_code(code: &str) -> Option<AttributeTag> {
        AttributeTag::ALL
            .iter()
            .copied()
            .find(|tag| tag.registry_code() == code)
    }

    pub fn value_kind(&self) -> ValueKind {
        match self {
            AttributeTag::FirstFiscalPeriodStart | AttributeTag::FirstFiscalPeriodEnd => {
                ValueKind::Date
            }
            _ => ValueKind::Text,
        }
    }

    /// Human-readable meaning, for debug output
    pub fn description(&self) -> &'static str {
        match self {
            AttributeTag::FiscalYearStart => "Start of the fiscal year (day and month)",
            AttributeTag::FiscalYearEnd => "End of the fiscal year (day and month)",
            AttributeTag::FirstFiscalPeriodStart => "Start date of the first fiscal period",
            AttributeTag::FirstFiscalPeriodEnd => "End date of the first fiscal period",
            AttributeTag::Purpose => "Stated purpose of the company",
            AttributeTag::Capital => "Registered capital amount",
            AttributeTag::CapitalCurrency => "Currency of the registered capital",
            AttributeTag::StatutesLastChanged => "Date the statutes were last changed",
            AttributeTag::ShareCapitalClasses => "Whether the share capital has classes",
            AttributeTag::NameIdentity => "Secondary names the company trades under",
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
