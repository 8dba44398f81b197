// 🔎 Search Surface - Registry query bodies and response interpretation
//
// Transport is the caller's business. This module only knows:
//   1. What to POST (query_string bodies for CVR-number or name lookups)
//   2. How to read what came back (status + body → hits → records)

use crate::builder::OrganizationRecordBuilder;
use crate::entities::OrganizationRecord;
use crate::error::SearchError;
use crate::tree;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

/// Field searched for exact CVR-number lookups
pub const CVR_NUMBER_FIELD: &str = "Vrvirksomhed.cvrNummer";

/// Field searched for name lookups
pub const NAME_FIELD: &str = "Vrvirksomhed.virksomhedMetadata.nyesteNavn.navn";

/// Path from a hit to the entity subtree
const ENTITY_PATH: [&str; 2] = ["_source", "Vrvirksomhed"];

// ============================================================================
// REQUEST BODIES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub from: u32,
    pub size: u32,
    pub query: QueryClause,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryClause {
    #[serde(rename = "query_string")]
    pub query_string: QueryString,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryString {
    pub query: String,
    pub fields: Vec<String>,
}

impl SearchQuery {
    fn query_string(query: String, field: &str, size: u32) -> Self {
        SearchQuery {
            from: 0,
            size,
            query: QueryClause {
                query_string: QueryString {
                    query,
                    fields: vec![field.to_string()],
                },
            },
        }
    }

    /// Exact lookup of one company
    pub fn by_cvr_number(cvr_number: i64) -> Self {
        SearchQuery::query_string(cvr_number.to_string(), CVR_NUMBER_FIELD, 1)
    }

    /// Phrase search on the current name
    pub fn by_name(name: &str, size: u32) -> Self {
        // A JSON string literal is also a valid quoted phrase for query_string
        let phrase = serde_json::to_string(name).unwrap_or_else(|_| format!("\"{}\"", name));
        SearchQuery::query_string(phrase, NAME_FIELD, size)
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

// ============================================================================
// RESPONSES
// ============================================================================

/// One resolved hit: its record plus the full response body it came from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub raw_content: Value,
    pub record: OrganizationRecord,
}

/// A response body that carried a hit list
#[derive(Debug, Clone)]
pub struct SearchResponse {
    body: Value,
    hits: Vec<Value>,
}

impl SearchResponse {
    /// Interpret a raw (status, body) pair
    ///
    /// - body with `hits.hits` → Ok(Some), whatever the status
    /// - 404 without hits → Ok(None)
    /// - 2xx body that is not JSON → SearchError::InvalidBody
    /// - anything else → SearchError::Fatal
    pub fn interpret(status: u16, body: &str) -> Result<Option<SearchResponse>, SearchError> {
        let parsed = match serde_json::from_str::<Value>(body) {
            Ok(parsed) => Some(parsed),
            Err(e) if (200..300).contains(&status) => return Err(SearchError::InvalidBody(e)),
            Err(_) => None,
        };

        if let Some(parsed) = parsed {
            if let Some(hits) = tree::at(&parsed, &["hits", "hits"]).and_then(Value::as_array) {
                debug!(status, hits = hits.len(), "Search response carries hits");
                let hits = hits.clone();
                return Ok(Some(SearchResponse { body: parsed, hits }));
            }
        }

        if status == 404 {
            return Ok(None);
        }

        Err(SearchError::Fatal {
            status,
            message: body.to_string(),
        })
    }

    /// Number of hits in the response
    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// The parsed response body
    pub fn body(&self) -> &Value {
        &self.body
    }

    /// Resolve the first hit (exact CVR lookups)
    ///
    /// A malformed first hit is an error here: the caller asked for this company.
    pub fn first_organization(
        &self,
        builder: &OrganizationRecordBuilder,
        as_of: Option<NaiveDate>,
    ) -> Result<Option<SearchResult>, SearchError> {
        match self.hits.first() {
            Some(hit) => Ok(Some(self.resolve_hit(hit, builder, as_of)?)),
            None => Ok(None),
        }
    }

    /// Resolve every hit, skipping malformed ones
    pub fn organizations(
        &self,
        builder: &OrganizationRecordBuilder,
        as_of: Option<NaiveDate>,
    ) -> Vec<SearchResult> {
        self.hits
            .iter()
            .enumerate()
            .filter_map(|(index, hit)| match self.resolve_hit(hit, builder, as_of) {
                Ok(result) => Some(result),
                Err(e) => {
                    warn!(index, error = %e, "Skipping malformed search hit");
                    None
                }
            })
            .collect()
    }

    fn resolve_hit(
        &self,
        hit: &Value,
        builder: &OrganizationRecordBuilder,
        as_of: Option<NaiveDate>,
    ) -> Result<SearchResult, SearchError> {
        let entity = tree::at(hit, &ENTITY_PATH).unwrap_or(&Value::Null);
        let record = builder.build_from_tree(entity, as_of)?;

        Ok(SearchResult {
            raw_content: self.body.clone(),
            record,
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn hit(cvr: i64, name: &str) -> Value {
        json!({
            "_source": {
                "Vrvirksomhed": {
                    "cvrNummer": cvr,
                    "virksomhedMetadata": {
                        "nyesteNavn": { "navn": name }
                    }
                }
            }
        })
    }

    fn body(hits: Vec<Value>) -> String {
        json!({ "hits": { "total": hits.len(), "hits": hits } }).to_string()
    }

    #[test]
    fn test_by_cvr_number_body() {
        let query = SearchQuery::by_cvr_number(12345678);

        assert_eq!(
            query.to_json(),
            json!({
                "from": 0,
                "size": 1,
                "query": {
                    "query_string": {
                        "query": "12345678",
                        "fields": ["Vrvirksomhed.cvrNummer"]
                    }
                }
            })
        );
    }

    #[test]
    fn test_by_name_quotes_phrase() {
        let query = SearchQuery::by_name("Smith \"Bros\" ApS", 50);

        assert_eq!(query.size, 50);
        assert_eq!(query.query.query_string.query, r#""Smith \"Bros\" ApS""#);
        assert_eq!(query.query.query_string.fields, vec![NAME_FIELD.to_string()]);
    }

    #[test]
    fn test_interpret_hits() {
        let response = SearchResponse::interpret(200, &body(vec![hit(1, "A ApS")]))
            .unwrap()
            .unwrap();
        assert_eq!(response.len(), 1);

        // Hits win even on a 404
        let response = SearchResponse::interpret(404, &body(vec![])).unwrap().unwrap();
        assert!(response.is_empty());
    }

    #[test]
    fn test_interpret_not_found() {
        let response = SearchResponse::interpret(404, r#"{"error":"index missing"}"#).unwrap();
        assert!(response.is_none());
    }

    #[test]
    fn test_interpret_fatal() {
        let err = SearchResponse::interpret(500, "upstream exploded").unwrap_err();

        match err {
            SearchError::Fatal { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "upstream exploded");
            }
            other => panic!("unexpected error: {:?}", other),
        }

        assert!(SearchResponse::interpret(200, r#"{"took":3}"#).is_err());
    }

    #[test]
    fn test_first_organization() {
        let response = SearchResponse::interpret(200, &body(vec![hit(10, "First"), hit(20, "Second")]))
            .unwrap()
            .unwrap();

        let result = response
            .first_organization(&OrganizationRecordBuilder::new(), Some(date(2020, 1, 1)))
            .unwrap()
            .unwrap();

        assert_eq!(result.record.cvr_number, 10);
        assert_eq!(result.record.name, "First");
    }

    #[test]
    fn test_results_carry_full_response_body() {
        let raw = json!({
            "took": 3,
            "hits": { "total": 2, "hits": [hit(10, "First"), hit(20, "Second")] }
        });
        let response = SearchResponse::interpret(200, &raw.to_string()).unwrap().unwrap();
        let builder = OrganizationRecordBuilder::new();

        let first = response
            .first_organization(&builder, Some(date(2020, 1, 1)))
            .unwrap()
            .unwrap();
        assert_eq!(first.raw_content, raw);

        let all = response.organizations(&builder, Some(date(2020, 1, 1)));
        assert_eq!(all.len(), 2);
        assert!(all.iter().all(|r| r.raw_content == raw));
        assert_eq!(response.body(), &raw);
    }

    #[test]
    fn test_interpret_invalid_json_body() {
        let err = SearchResponse::interpret(200, "<html>maintenance</html>").unwrap_err();
        assert!(matches!(err, SearchError::InvalidBody(_)));

        // Non-JSON error pages keep their status
        let err = SearchResponse::interpret(503, "<html>maintenance</html>").unwrap_err();
        assert!(matches!(err, SearchError::Fatal { status: 503, .. }));

        assert!(SearchResponse::interpret(404, "Not Found").unwrap().is_none());
    }

    #[test]
    fn test_first_organization_empty() {
        let response = SearchResponse::interpret(200, &body(vec![])).unwrap().unwrap();
        let result = response
            .first_organization(&OrganizationRecordBuilder::new(), None)
            .unwrap();

        assert!(result.is_none());
    }

    #[test]
    fn test_first_organization_malformed() {
        let response = SearchResponse::interpret(200, &body(vec![json!({ "_source": {} })]))
            .unwrap()
            .unwrap();

        let err = response
            .first_organization(&OrganizationRecordBuilder::new(), None)
            .unwrap_err();
        assert!(matches!(err, SearchError::Malformed(_)));
    }

    #[test]
    fn test_organizations_skip_malformed() {
        let broken = json!({ "_source": { "Vrvirksomhed": { "cvrNummer": 30 } } });
        let response = SearchResponse::interpret(200, &body(vec![hit(10, "One"), broken, hit(20, "Two")]))
            .unwrap()
            .unwrap();

        let results = response.organizations(&OrganizationRecordBuilder::new(), Some(date(2020, 1, 1)));
        let numbers: Vec<i64> = results.iter().map(|r| r.record.cvr_number).collect();

        assert_eq!(numbers, vec![10, 20]);
    }
}
