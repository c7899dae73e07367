/// Query Matching
///
/// Free-text and structured-filter matching over in-memory records.
///
/// A record matches a query when the normalized query text is a substring of
/// one of its searchable fields, or when at least one filter is supplied and
/// every supplied filter holds. Matches are ranked by the number of matched
/// fields (text fields plus filter fields), highest first; equal scores keep
/// the order the records were loaded in.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::core::error::LookupError;
use crate::store::records::{
    CodeCategory, CodeRecord, Jurisdiction, ProductCategory, ProductRecord, Record,
};

/// Text of one searchable field. A list field counts as a single field.
#[derive(Debug, Clone, Copy)]
pub enum FieldText<'a> {
    One(&'a str),
    Many(&'a [String]),
}

impl FieldText<'_> {
    /// `needle` must already be normalized.
    pub fn contains(&self, needle: &str) -> bool {
        match self {
            FieldText::One(text) => text.to_lowercase().contains(needle),
            FieldText::Many(items) => items.iter().any(|t| t.to_lowercase().contains(needle)),
        }
    }
}

/// Trim and case-fold query text.
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Structured filters for one record type.
pub trait Filters<R> {
    /// How many filters were supplied.
    fn supplied(&self) -> usize;

    /// True when every supplied filter holds for `record`.
    fn accepts(&self, record: &R) -> bool;
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CodeFilters {
    pub category: Option<CodeCategory>,
    pub jurisdiction: Option<Jurisdiction>,
}

impl Filters<CodeRecord> for CodeFilters {
    fn supplied(&self) -> usize {
        usize::from(self.category.is_some()) + usize::from(self.jurisdiction.is_some())
    }

    fn accepts(&self, record: &CodeRecord) -> bool {
        self.category.is_none_or(|c| c == record.category)
            && self.jurisdiction.is_none_or(|j| j == record.jurisdiction)
    }
}

/// Price bounds are inclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ProductFilters {
    pub category: Option<ProductCategory>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
}

impl ProductFilters {
    pub fn price_in_range(&self, price: Decimal) -> bool {
        self.min_price.is_none_or(|min| price >= min) && self.max_price.is_none_or(|max| price <= max)
    }
}

impl Filters<ProductRecord> for ProductFilters {
    fn supplied(&self) -> usize {
        usize::from(self.category.is_some())
            + usize::from(self.min_price.is_some())
            + usize::from(self.max_price.is_some())
    }

    fn accepts(&self, record: &ProductRecord) -> bool {
        self.category.is_none_or(|c| c == record.category) && self.price_in_range(record.price)
    }
}

/// Free text plus structured filters. Built per call.
#[derive(Debug, Clone, Default)]
pub struct Query<F> {
    pub text: String,
    pub filters: F,
}

impl<F> Query<F> {
    pub fn new(text: impl Into<String>, filters: F) -> Self {
        Self {
            text: text.into(),
            filters,
        }
    }
}

/// A matched record with its relevance score.
#[derive(Debug, Clone, Serialize)]
pub struct Match<'a, R> {
    #[serde(flatten)]
    pub record: &'a R,
    #[serde(rename = "relevance_score")]
    pub score: usize,
}

fn text_hits<R: Record>(record: &R, needle: &str) -> usize {
    record
        .searchable_fields()
        .iter()
        .filter(|field| field.contains(needle))
        .count()
}

/// Rank records against `query`. Returns an empty vector when nothing matches.
pub fn search<'a, R, F>(records: impl IntoIterator<Item = &'a R>, query: &Query<F>) -> Vec<Match<'a, R>>
where
    R: Record + 'a,
    F: Filters<R>,
{
    let needle = normalize(&query.text);
    let supplied = query.filters.supplied();

    let mut matches: Vec<Match<'a, R>> = records
        .into_iter()
        .filter_map(|record| {
            let filters_hold = supplied > 0 && query.filters.accepts(record);
            let filter_score = if filters_hold { supplied } else { 0 };

            if needle.is_empty() {
                return (supplied == 0 || filters_hold).then_some(Match {
                    record,
                    score: filter_score,
                });
            }

            let hits = text_hits(record, &needle);
            (hits > 0 || filters_hold).then_some(Match {
                record,
                score: hits + filter_score,
            })
        })
        .collect();

    // stable: equal scores stay in load order
    matches.sort_by(|a, b| b.score.cmp(&a.score));
    matches
}

const STOP_WORDS: &[&str] = &["the", "and", "for", "are", "with", "that", "this", "from", "into"];

/// Split free text into distinct lowercase words of at least three
/// characters, skipping common filler words.
pub fn terms(text: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for word in normalize(text).split(|c: char| !c.is_alphanumeric()) {
        if word.chars().count() >= 3 && !STOP_WORDS.contains(&word) && !out.iter().any(|w| w == word) {
            out.push(word.to_string());
        }
    }
    out
}

/// Rank records by how many (word, field) pairs of `text` hit.
///
/// Used for descriptive sentences, which rarely match any field as a whole.
pub fn search_terms<'a, R>(records: impl IntoIterator<Item = &'a R>, text: &str) -> Vec<Match<'a, R>>
where
    R: Record + 'a,
{
    let words = terms(text);
    let mut matches: Vec<Match<'a, R>> = records
        .into_iter()
        .filter_map(|record| {
            let fields = record.searchable_fields();
            let score: usize = words
                .iter()
                .map(|w| fields.iter().filter(|f| f.contains(w)).count())
                .sum();
            (score > 0).then_some(Match { record, score })
        })
        .collect();

    matches.sort_by(|a, b| b.score.cmp(&a.score));
    matches
}

/// Exact, case-insensitive lookup by id or reference. The first record in
/// load order wins.
pub fn get_by_reference<'a, R>(records: impl IntoIterator<Item = &'a R>, reference: &str) -> Result<&'a R, LookupError>
where
    R: Record + 'a,
{
    let wanted = normalize(reference);
    records
        .into_iter()
        .find(|r| r.id().to_lowercase() == wanted || r.reference().to_lowercase() == wanted)
        .ok_or_else(|| LookupError::NotFound {
            reference: reference.trim().to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn code(id: &str, code_ref: &str, title: &str, category: CodeCategory, jurisdiction: Jurisdiction) -> CodeRecord {
        CodeRecord {
            id: id.to_string(),
            code_ref: code_ref.to_string(),
            title: title.to_string(),
            category,
            jurisdiction,
            summary: format!("Summary of {}", title),
            source: "Test".to_string(),
            common_questions: vec![],
            notes: String::new(),
            related_codes: vec![],
            full_text: None,
        }
    }

    fn sample() -> Vec<CodeRecord> {
        vec![
            code("a", "NEC 210.52", "Receptacle Spacing", CodeCategory::Electrical, Jurisdiction::National),
            code("b", "IRC R311.7", "Stair Riser Height", CodeCategory::Structural, Jurisdiction::National),
            code("c", "NEC 210.8", "GFCI Protection", CodeCategory::Electrical, Jurisdiction::State),
            code("d", "IPC 1002.1", "Fixture Traps", CodeCategory::Plumbing, Jurisdiction::National),
        ]
    }

    fn ids<R: Record>(matches: &[Match<'_, R>]) -> Vec<String> {
        matches.iter().map(|m| m.record.id().to_string()).collect()
    }

    #[test]
    fn test_empty_query_returns_everything_in_load_order() {
        let records = sample();
        let found = search(&records, &Query::new("   ", CodeFilters::default()));
        assert_eq!(ids(&found), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_empty_query_with_filters_only_keeps_matching_records() {
        let records = sample();
        let filters = CodeFilters {
            category: Some(CodeCategory::Electrical),
            ..Default::default()
        };
        let found = search(&records, &Query::new("", filters));
        assert_eq!(ids(&found), vec!["a", "c"]);
    }

    #[test]
    fn test_filter_match_ranks_receptacle_spacing_first() {
        let records = sample();
        let filters = CodeFilters {
            category: Some(CodeCategory::Electrical),
            ..Default::default()
        };
        let found = search(&records, &Query::new("outlet spacing", filters));
        assert_eq!(found[0].record.title, "Receptacle Spacing");
    }

    #[test]
    fn test_text_match_is_case_insensitive_and_ranked_by_field_count() {
        let mut records = sample();
        records[3].summary = "Riser and stair trap rules".to_string();
        records[1].common_questions = vec!["How tall can a stair riser be?".to_string()];

        let found = search(&records, &Query::new("  STAIR ", CodeFilters::default()));
        // b: title, summary and questions; d: summary only
        assert_eq!(ids(&found), vec!["b", "d"]);
        assert_eq!(found[0].score, 3);
        assert_eq!(found[1].score, 1);
    }

    #[test]
    fn test_every_result_satisfies_predicate() {
        let records = sample();
        let filters = CodeFilters {
            jurisdiction: Some(Jurisdiction::State),
            ..Default::default()
        };
        let query = Query::new("spacing", filters);
        for m in search(&records, &query) {
            let text_hit = text_hits(m.record, "spacing") > 0;
            assert!(text_hit || filters.accepts(m.record));
        }
    }

    #[test]
    fn test_no_match_is_empty_not_error() {
        let records = sample();
        let filters = CodeFilters {
            jurisdiction: Some(Jurisdiction::City),
            ..Default::default()
        };
        assert!(search(&records, &Query::new("", filters)).is_empty());
        assert!(search(&records, &Query::new("zoning variance", CodeFilters::default())).is_empty());
    }

    #[test]
    fn test_get_by_reference_case_insensitive() {
        let records = sample();
        let found = get_by_reference(&records, "nec 210.52").unwrap();
        assert_eq!(found.id, "a");
        let by_id = get_by_reference(&records, "D").unwrap();
        assert_eq!(by_id.id, "d");
    }

    #[test]
    fn test_get_by_reference_first_in_load_order() {
        let mut records = sample();
        records[2].code_ref = "NEC 210.52".to_string();
        assert_eq!(get_by_reference(&records, "NEC 210.52").unwrap().id, "a");
    }

    #[test]
    fn test_get_by_reference_not_found() {
        let records = sample();
        assert_eq!(
            get_by_reference(&records, "NEC 999.9"),
            Err(LookupError::NotFound {
                reference: "NEC 999.9".to_string()
            })
        );
    }

    #[test]
    fn test_terms_skip_short_words_and_duplicates() {
        assert_eq!(terms("Outlets 18 in. apart, outlets!"), vec!["outlets", "apart"]);
        assert_eq!(terms("the stair and the guard"), vec!["stair", "guard"]);
    }

    #[test]
    fn test_search_terms_scores_each_word() {
        let records = sample();
        let found = search_terms(&records, "gfci protection near the stair");
        assert_eq!(ids(&found), vec!["c", "b"]);
    }

    #[test]
    fn test_product_price_range_is_inclusive() {
        let filters = ProductFilters {
            min_price: Some(Decimal::new(1000, 2)),
            max_price: Some(Decimal::new(2000, 2)),
            ..Default::default()
        };
        assert!(filters.price_in_range(Decimal::new(10, 0)));
        assert!(filters.price_in_range(Decimal::new(20, 0)));
        assert!(!filters.price_in_range(Decimal::new(2001, 2)));
        assert_eq!(filters.supplied(), 2);
    }
}
