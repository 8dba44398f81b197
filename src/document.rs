// 📄 Raw Entity Document - One search hit, parsed leniently
//
// Built once from the registry's entity subtree ("Vrvirksomhed") and never mutated.
// Only the identity fields are mandatory; every other part that is missing or
// malformed becomes an empty history / None instead of failing the document.

use crate::attributes::AttributeTag;
use crate::employment::{EmploymentObservation, Granularity};
use crate::entities::{Address, CompanyType, CreditStatus, Industry};
use crate::error::MalformedDocumentError;
use crate::temporal::{ValidityPeriod, VersionedFact};
use crate::tree;
use chrono::NaiveDate;
use serde_json::Value;
use tracing::debug;

/// Key of the "last modified" marker the registry sprinkles through the tree
pub const LAST_UPDATED_KEY: &str = "sidstOpdateret";

// ============================================================================
// DOCUMENT PARTS
// ============================================================================

/// One span of the company's life (founding → dissolution)
#[derive(Debug, Clone, PartialEq)]
pub struct LifecycleSegment {
    pub period: ValidityPeriod,
    pub status: Option<String>,
}

/// All versioned values recorded under one attribute-type tag
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeGroup {
    /// Raw registry code, e.g. "KAPITAL"
    pub code: String,
    pub values: Vec<VersionedFact<String>>,
}

impl AttributeGroup {
    pub fn tag(&self) -> Option<AttributeTag> {
        AttributeTag::from_registry_code(&self.code)
    }
}

/// The registry's own "latest known" values (virksomhedMetadata)
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotMetadata {
    pub latest_name: String,
    pub status: Option<String>,
    pub founding_date: Option<NaiveDate>,
    pub company_type: Option<CompanyType>,
    pub main_industry: Option<Industry>,
    pub other_industries: [Option<Industry>; 3],
    pub latest_address: Option<Address>,
    pub credit_status: Option<CreditStatus>,
}

// ============================================================================
// RAW ENTITY DOCUMENT
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct RawEntityDocument {
    // Identity
    pub cvr_number: i64,
    pub names: Vec<VersionedFact<String>>,

    /// Every historical and identity name value, dated or not
    pub name_values: Vec<String>,

    // Contact channels
    pub email: Vec<VersionedFact<String>>,
    pub website: Vec<VersionedFact<String>>,
    pub phone: Vec<VersionedFact<String>>,
    pub fax: Vec<VersionedFact<String>>,

    // Addresses
    pub addresses: Vec<VersionedFact<Address>>,
    pub postal_addresses: Vec<VersionedFact<Address>>,

    pub lifecycle: Vec<LifecycleSegment>,
    pub attributes: Vec<AttributeGroup>,

    // Employment at three granularities
    pub yearly_employment: Option<EmploymentObservation>,
    pub quarterly_employment: Option<EmploymentObservation>,
    pub monthly_employment: Option<EmploymentObservation>,

    pub snapshot: SnapshotMetadata,
    pub advertising_protected: bool,

    /// The entity subtree exactly as received
    pub source: Value,
}

impl RawEntityDocument {
    /// Parse the entity subtree (the value of `Vrvirksomhed`)
    pub fn from_tree(node: &Value) -> Result<Self, MalformedDocumentError> {
        if !node.is_object() {
            return Err(MalformedDocumentError::NotAnObject);
        }

        let cvr_number = tree::i64_at(node, &["cvrNummer"])
            .ok_or(MalformedDocumentError::MissingField("cvrNummer"))?;

        let metadata = tree::at(node, &["virksomhedMetadata"])
            .ok_or(MalformedDocumentError::MissingField("virksomhedMetadata"))?;

        let latest_name = tree::string_at(metadata, &["nyesteNavn", "navn"])
            .ok_or(MalformedDocumentError::MissingField("virksomhedMetadata.nyesteNavn.navn"))?;

        Ok(RawEntityDocument {
            cvr_number,
            names: read_facts(tree::array_at(node, &["navne"]), |n| tree::string_at(n, &["navn"]), None),
            name_values: read_name_values(node),
            email: read_contact(node, "elektroniskPost"),
            website: read_contact(node, "hjemmeside"),
            phone: read_contact(node, "telefonNummer"),
            fax: read_contact(node, "telefaxNummer"),
            addresses: read_facts(tree::array_at(node, &["beliggenhedsadresse"]), Address::from_tree, None),
            postal_addresses: read_facts(tree::array_at(node, &["postadresse"]), Address::from_tree, None),
            lifecycle: read_lifecycle(tree::array_at(node, &["livsforloeb"])),
            attributes: read_attributes(tree::array_at(node, &["attributter"])),
            yearly_employment: tree::at(metadata, &["nyesteAarsbeskaeftigelse"])
                .and_then(|e| read_employment(e, Granularity::Yearly)),
            quarterly_employment: tree::at(metadata, &["nyesteKvartalsbeskaeftigelse"])
                .and_then(|e| read_employment(e, Granularity::Quarterly)),
            monthly_employment: tree::at(metadata, &["nyesteMaanedsbeskaeftigelse"])
                .and_then(|e| read_employment(e, Granularity::Monthly)),
            snapshot: read_snapshot(metadata, latest_name),
            advertising_protected: tree::bool_at(node, &["reklamebeskyttet"]).unwrap_or(false),
            source: node.clone(),
        })
    }

    /// Every attribute group carrying `tag`, in document order
    pub fn attribute_groups(&self, tag: AttributeTag) -> Vec<&[VersionedFact<String>]> {
        self.attributes
            .iter()
            .filter(|group| group.tag() == Some(tag))
            .map(|group| group.values.as_slice())
            .collect()
    }

    /// Employment observations in reconciliation order (yearly, quarterly, monthly)
    pub fn employment_observations(&self) -> Vec<&EmploymentObservation> {
        Granularity::ORDER
            .iter()
            .filter_map(|granularity| match granularity {
                Granularity::Yearly => self.yearly_employment.as_ref(),
                Granularity::Quarterly => self.quarterly_employment.as_ref(),
                Granularity::Monthly => self.monthly_employment.as_ref(),
            })
            .collect()
    }
}

// ============================================================================
// READERS
// ============================================================================

/// `{"gyldigFra": ..., "gyldigTil": ...}` under `periode`
fn read_period(item: &Value) -> Option<ValidityPeriod> {
    let period = tree::at(item, &["periode"])?;
    let from = tree::date_at(period, &["gyldigFra"])?;
    // An end date that is present but unreadable must not turn into "still valid"
    let to = match tree::at(period, &["gyldigTil"]) {
        None => None,
        Some(_) => Some(tree::date_at(period, &["gyldigTil"])?),
    };
    ValidityPeriod::new(from, to)
}

/// Turn an array of `{<value>, periode, [hidden_key]}` items into facts,
/// dropping items without a usable period or value
fn read_facts<T, F>(items: &[Value], read_value: F, hidden_key: Option<&str>) -> Vec<VersionedFact<T>>
where
    F: Fn(&Value) -> Option<T>,
{
    let mut facts = Vec::with_capacity(items.len());

    for item in items {
        let (Some(period), Some(value)) = (read_period(item), read_value(item)) else {
            debug!(item = %item, "dropping versioned value without usable period or value");
            continue;
        };

        let mut fact = VersionedFact::new(value, period);
        if let Some(key) = hidden_key {
            if tree::bool_at(item, &[key]).unwrap_or(false) {
                fact = fact.hidden();
            }
        }
        facts.push(fact);
    }

    facts
}

fn read_contact(node: &Value, key: &str) -> Vec<VersionedFact<String>> {
    read_facts(
        tree::array_at(node, &[key]),
        |item| tree::string_at(item, &["kontaktoplysning"]),
        Some("hemmelig"),
    )
}

fn read_lifecycle(items: &[Value]) -> Vec<LifecycleSegment> {
    items
        .iter()
        .filter_map(|item| {
            let period = read_period(item)?;
            Some(LifecycleSegment {
                period,
                status: tree::string_at(item, &["status"]),
            })
        })
        .collect()
}

fn read_attributes(items: &[Value]) -> Vec<AttributeGroup> {
    items
        .iter()
        .filter_map(|item| {
            let code = tree::string_at(item, &["type"])?;
            let values = read_facts(
                tree::array_at(item, &["vaerdier"]),
                |v| tree::string_at(v, &["vaerdi"]),
                None,
            );
            Some(AttributeGroup { code, values })
        })
        .collect()
}

/// Name strings from `navne[]` then `NAVN_IDENTITET` values, periods ignored
fn read_name_values(node: &Value) -> Vec<String> {
    let history = tree::array_at(node, &["navne"])
        .iter()
        .filter_map(|n| tree::string_at(n, &["navn"]));

    let identities = tree::array_at(node, &["attributter"])
        .iter()
        .filter(|item| tree::str_at(item, &["type"]) == Some(AttributeTag::NameIdentity.registry_code()))
        .flat_map(|item| tree::array_at(item, &["vaerdier"]))
        .filter_map(|v| tree::string_at(v, &["vaerdi"]));

    history.chain(identities).collect()
}

fn read_employment(node: &Value, granularity: Granularity) -> Option<EmploymentObservation> {
    let year = i32::try_from(tree::i64_at(node, &["aar"])?).ok()?;
    let code = tree::string_at(node, &["intervalKodeAntalAnsatte"]);
    let sub_period = |key: &str| tree::i64_at(node, &[key]).and_then(|n| u32::try_from(n).ok());

    match granularity {
        Granularity::Yearly => Some(EmploymentObservation::yearly(year, code)),
        Granularity::Quarterly => Some(EmploymentObservation::quarterly(year, sub_period("kvartal")?, code)),
        Granularity::Monthly => Some(EmploymentObservation::monthly(year, sub_period("maaned")?, code)),
    }
}

fn read_industry(metadata: &Value, key: &str) -> Option<Industry> {
    let node = tree::at(metadata, &[key])?;
    Some(Industry {
        code: tree::string_at(node, &["branchekode"])
            .or_else(|| tree::i64_at(node, &["branchekode"]).map(|n| n.to_string())),
        description: tree::string_at(node, &["branchetekst"]),
    })
}

fn read_snapshot(metadata: &Value, latest_name: String) -> SnapshotMetadata {
    let company_type = tree::at(metadata, &["nyesteVirksomhedsform"]).map(|form| CompanyType {
        code: tree::i64_at(form, &["virksomhedsformkode"]),
        short_name: tree::string_at(form, &["kortBeskrivelse"]),
        long_name: tree::string_at(form, &["langBeskrivelse"]),
    });

    let credit_status = tree::at(metadata, &["nyesteStatus"]).map(|status| CreditStatus {
        code: tree::string_at(status, &["kreditoplysningkode"]),
        text: tree::string_at(status, &["kreditoplysningtekst"]),
    });

    SnapshotMetadata {
        latest_name,
        status: tree::string_at(metadata, &["sammensatStatus"]),
        founding_date: tree::date_at(metadata, &["stiftelsesDato"]),
        company_type,
        main_industry: read_industry(metadata, "nyesteHovedbranche"),
        other_industries: [
            read_industry(metadata, "nyesteBibranche1"),
            read_industry(metadata, "nyesteBibranche2"),
            read_industry(metadata, "nyesteBibranche3"),
        ],
        latest_address: tree::at(metadata, &["nyesteBeliggenhedsadresse"]).and_then(Address::from_tree),
        credit_status,
    }
}

// ============================================================================
// TESTS
// ============================================================================
