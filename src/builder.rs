// 🏗️ Organization Record Builder
// Turns one raw entity document + a reference date into one flat record.
//
// Pipeline:
// 1. Lifecycle → start/end dates → reference date (as_of)
// 2. Every versioned field → its resolution policy → value as of that date
// 3. Field post-processing: name dedup, date parsing, employment reconciliation
// 4. Last-updated marker from a full walk of the source tree

use crate::attributes::{AttributeTag, ValueKind};
use crate::config::ResolverConfig;
use crate::document::{LifecycleSegment, RawEntityDocument, LAST_UPDATED_KEY};
use crate::employment::{self, RangeCodeParser};
use crate::entities::{Industries, OrganizationRecord};
use crate::error::MalformedDocumentError;
use crate::resolution::ResolutionPolicy;
use crate::temporal::VersionedFact;
use crate::tree;
use chrono::{NaiveDate, Utc};
use serde_json::Value;
use std::collections::BTreeSet;
use tracing::debug;

// ============================================================================
// LIFECYCLE
// ============================================================================

/// Segment with the latest start date; on ties the one listed first
pub fn current_life_segment(lifecycle: &[LifecycleSegment]) -> Option<&LifecycleSegment> {
    lifecycle.iter().fold(None, |best: Option<&LifecycleSegment>, segment| match best {
        Some(b) if b.period.valid_from() >= segment.period.valid_from() => Some(b),
        _ => Some(segment),
    })
}

// ============================================================================
// BUILDER
// ============================================================================

/// Stateless across calls; safe to share between threads
#[derive(Debug, Clone, Default)]
pub struct OrganizationRecordBuilder {
    range_parser: RangeCodeParser,
}

impl OrganizationRecordBuilder {
    /// Builder with the default employment range-code prefix
    pub fn new() -> Self {
        OrganizationRecordBuilder::default()
    }

    pub fn with_config(config: &ResolverConfig) -> Self {
        OrganizationRecordBuilder {
            range_parser: RangeCodeParser::new(&config.employment_code_prefix),
        }
    }

    /// Parse the entity subtree and build its record
    pub fn build_from_tree(
        &self,
        node: &Value,
        as_of: Option<NaiveDate>,
    ) -> Result<OrganizationRecord, MalformedDocumentError> {
        let document = RawEntityDocument::from_tree(node)?;
        Ok(self.build(&document, as_of))
    }

    /// Build the record as of `as_of`
    ///
    /// Without an explicit date, a dissolved company is resolved as of its
    /// dissolution date and a live one as of today (UTC).
    pub fn build(&self, doc: &RawEntityDocument, as_of: Option<NaiveDate>) -> OrganizationRecord {
        let snapshot = &doc.snapshot;

        // 1. Lifecycle
        let life = current_life_segment(&doc.lifecycle);
        let start_date = life
            .map(|segment| segment.period.valid_from())
            .or(snapshot.founding_date);
        let end_date = life.and_then(|segment| segment.period.valid_to());

        let as_of = as_of
            .or(end_date)
            .unwrap_or_else(|| Utc::now().date_naive());

        debug!(cvr = doc.cvr_number, %as_of, dissolved = end_date.is_some(), "resolving organization record");

        // 2. Names
        let name = snapshot.latest_name.clone();
        let mut alternate_names: BTreeSet<String> = doc.name_values.iter().cloned().collect();
        alternate_names.remove(&name);

        // 3. Contact channels (hidden values never leak)
        fn contact(history: &[VersionedFact<String>]) -> ResolutionPolicy<'_, String> {
            ResolutionPolicy::PeriodOnly {
                history,
                visible_only: true,
            }
        }

        // 4. Addresses
        let address = ResolutionPolicy::SnapshotThenPeriod {
            snapshot: snapshot.latest_address.as_ref(),
            history: doc.addresses.as_slice(),
        }
        .resolve(as_of);
        let postal_address = ResolutionPolicy::PeriodOnly {
            history: doc.postal_addresses.as_slice(),
            visible_only: false,
        }
        .resolve(as_of);
        let municipality = address
            .as_ref()
            .and_then(|a| a.municipality_name())
            .map(str::to_string);

        // 5. Free-form attributes
        let attribute = |tag| self.resolve_attribute(doc, tag, as_of);
        let date_attribute = |tag| attribute(tag).as_deref().and_then(tree::parse_date);

        // 6. Employment
        let employment_range = employment::reconcile(doc.employment_observations(), &self.range_parser);

        let [other1, other2, other3] = snapshot.other_industries.clone();

        OrganizationRecord {
            cvr_number: doc.cvr_number,
            name,
            alternate_names,
            status: snapshot.status.clone(),
            founding_date: snapshot.founding_date,
            start_date,
            end_date,
            as_of,
            email: contact(doc.email.as_slice()).resolve(as_of),
            website: contact(doc.website.as_slice()).resolve(as_of),
            phone: contact(doc.phone.as_slice()).resolve(as_of),
            fax: contact(doc.fax.as_slice()).resolve(as_of),
            address,
            postal_address,
            municipality,
            opt_out_sales_and_advertising: doc.advertising_protected,
            company_type: snapshot.company_type.clone(),
            credit_status: snapshot.credit_status.clone(),
            fiscal_year_start: attribute(AttributeTag::FiscalYearStart),
            fiscal_year_end: attribute(AttributeTag::FiscalYearEnd),
            first_fiscal_year_start: date_attribute(AttributeTag::FirstFiscalPeriodStart),
            first_fiscal_year_end: date_attribute(AttributeTag::FirstFiscalPeriodEnd),
            purpose: attribute(AttributeTag::Purpose),
            registered_capital: attribute(AttributeTag::Capital),
            registered_capital_currency: attribute(AttributeTag::CapitalCurrency),
            statutes_last_changed: attribute(AttributeTag::StatutesLastChanged),
            has_share_capital_classes: attribute(AttributeTag::ShareCapitalClasses),
            industries: Industries {
                main: snapshot.main_industry.clone(),
                other1,
                other2,
                other3,
            },
            employment_range,
            last_updated: tree::latest_timestamp(&doc.source, LAST_UPDATED_KEY),
        }
    }

    /// Current value of one attribute tag, merged across all its groups
    ///
    /// Date-kind values that do not parse resolve to None.
    fn resolve_attribute(&self, doc: &RawEntityDocument, tag: AttributeTag, as_of: NaiveDate) -> Option<String> {
        let policy = ResolutionPolicy::MergeTagsThenPeriod {
            groups: doc.attribute_groups(tag),
        };

        let value = match tag.value_kind() {
            ValueKind::Text => policy.resolve(as_of),
            ValueKind::Date => policy.resolve_where(as_of, |raw| tree::parse_date(raw).is_some()),
        };

        if value.is_none() {
            debug!(cvr = doc.cvr_number, attribute = tag.registry_code(), "{} not resolved", tag.description());
        }
        value
    }
}

// ============================================================================
// TESTS
// ============================================================================
