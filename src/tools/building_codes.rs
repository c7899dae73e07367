/// Building Codes Tools
///
/// Search, exact lookup, compliance guidance and category listing over the
/// building code dataset.

use serde::Serialize;
use serde_json::json;

use super::schema::{ArgKind, ArgSpec, Arguments};
use super::{ToolOutput, ToolSpec, result_limit, to_data};
use crate::core::error::ToolError;
use crate::matcher::{self, CodeFilters, Match, Query};
use crate::store::RecordStore;
use crate::store::records::{CodeCategory, CodeRecord, Jurisdiction};

const JURISDICTIONS: &[&str] = &["National", "State", "City"];
const CODE_TYPES: &[&str] = &["electrical", "plumbing", "structural", "mechanical", "general"];

/// Default number of search results when no limit is given or configured.
pub const DEFAULT_SEARCH_LIMIT: usize = 5;
const COMPLIANCE_LIMIT: usize = 3;
const SAMPLE_QUESTIONS: usize = 3;

/// Building code tools, by tool name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeTool {
    Search,
    GetSection,
    CheckCompliance,
    ListCategories,
}

/// Tool catalog of the building codes server.
pub fn catalog() -> Vec<ToolSpec<CodeTool>> {
    vec![
        ToolSpec {
            name: "search_building_codes",
            description: "Search building codes by natural language query. Returns relevant code sections with citations.",
            args: vec![
                ArgSpec::required(
                    "query",
                    ArgKind::String,
                    "Question or phrase about building codes (e.g., 'outlet spacing'). May be empty when filtering only.",
                ),
                ArgSpec::optional("jurisdiction", ArgKind::Enum(JURISDICTIONS), "Jurisdiction level to match"),
                ArgSpec::optional("code_type", ArgKind::Enum(CODE_TYPES), "Type of code to match"),
                ArgSpec::optional("limit", ArgKind::Integer, "Maximum number of results"),
            ],
            handler: CodeTool::Search,
        },
        ToolSpec {
            name: "get_code_section",
            description: "Retrieve specific code section by exact reference (e.g., 'NEC 210.52(A)(1)', 'IRC R311.7.5.1')",
            args: vec![
                ArgSpec::required("section_reference", ArgKind::String, "Exact code section reference or record id"),
                ArgSpec::optional("jurisdiction", ArgKind::Enum(JURISDICTIONS), "Only return the section for this jurisdiction"),
            ],
            handler: CodeTool::GetSection,
        },
        ToolSpec {
            name: "check_code_compliance",
            description: "Check if a described scenario complies with building codes",
            args: vec![
                ArgSpec::required(
                    "scenario",
                    ArgKind::String,
                    "Description of the building scenario to check (e.g., 'outlets 18 feet apart in living room')",
                ),
                ArgSpec::optional("jurisdiction", ArgKind::Enum(JURISDICTIONS), "Jurisdiction to check against"),
            ],
            handler: CodeTool::CheckCompliance,
        },
        ToolSpec {
            name: "list_code_categories",
            description: "List all available code categories and common questions",
            args: vec![],
            handler: CodeTool::ListCategories,
        },
    ]
}

/// Per-category overview returned by `list_code_categories`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySummary {
    pub category: CodeCategory,
    pub count: usize,
    pub sample_questions: Vec<String>,
}

/// Building codes server state: a read-only store plus configured limits.
pub struct BuildingCodes<S> {
    store: S,
    search_limit: usize,
}

impl<S: RecordStore<CodeRecord>> BuildingCodes<S> {
    pub fn new(store: S, search_limit: usize) -> Self {
        Self {
            store,
            search_limit: search_limit.max(1),
        }
    }

    pub fn call(&self, tool: CodeTool, args: &Arguments) -> Result<ToolOutput, ToolError> {
        match tool {
            CodeTool::Search => self.search(args),
            CodeTool::GetSection => self.get_section(args),
            CodeTool::CheckCompliance => self.check_compliance(args),
            CodeTool::ListCategories => Ok(self.list_categories()),
        }
    }

    fn search(&self, args: &Arguments) -> Result<ToolOutput, ToolError> {
        let query = args.required_str("query")?;
        let filters = CodeFilters {
            category: args.str("code_type").and_then(CodeCategory::parse),
            jurisdiction: args.str("jurisdiction").and_then(Jurisdiction::parse),
        };
        let limit = result_limit(args, self.search_limit)?;

        let matches = self.store.search(&Query::new(query, filters));
        let total = matches.len();
        let shown = &matches[..total.min(limit)];
        tracing::debug!(query, total, shown = shown.len(), "searched building codes");

        Ok(ToolOutput {
            text: format_code_results(shown),
            data: json!({
                "results": to_data(shown),
                "total_matches": total,
            }),
        })
    }

    fn get_section(&self, args: &Arguments) -> Result<ToolOutput, ToolError> {
        let reference = args.required_str("section_reference")?;
        let section = match args.str("jurisdiction").and_then(Jurisdiction::parse) {
            Some(j) => matcher::get_by_reference(self.store.records().iter().filter(|c| c.jurisdiction == j), reference)?,
            None => self.store.get_by_reference(reference)?,
        };

        Ok(ToolOutput {
            text: format_code_section(section, self.store.records()),
            data: to_data(section),
        })
    }

    fn check_compliance(&self, args: &Arguments) -> Result<ToolOutput, ToolError> {
        let scenario = args.required_str("scenario")?;
        let jurisdiction = args.str("jurisdiction").and_then(Jurisdiction::parse);

        let candidates = self
            .store
            .records()
            .iter()
            .filter(|c| jurisdiction.is_none_or(|j| c.jurisdiction == j));
        let mut relevant = matcher::search_terms(candidates, scenario);
        relevant.truncate(COMPLIANCE_LIMIT);

        Ok(ToolOutput {
            text: format_compliance(scenario, &relevant),
            data: json!({
                "scenario": scenario,
                "determinable": !relevant.is_empty(),
                "applicable_codes": to_data(&relevant),
            }),
        })
    }

    fn list_categories(&self) -> ToolOutput {
        let summaries = category_summaries(self.store.records());
        ToolOutput {
            text: format_categories(&summaries),
            data: json!({ "categories": to_data(&summaries) }),
        }
    }
}

/// Record counts and up to three sample questions per category, in category order.
pub fn category_summaries(records: &[CodeRecord]) -> Vec<CategorySummary> {
    CodeCategory::ALL
        .into_iter()
        .filter_map(|category| {
            let in_category: Vec<&CodeRecord> = records.iter().filter(|c| c.category == category).collect();
            if in_category.is_empty() {
                return None;
            }
            let sample_questions = in_category
                .iter()
                .flat_map(|c| c.common_questions.iter().cloned())
                .take(SAMPLE_QUESTIONS)
                .collect();
            Some(CategorySummary {
                category,
                count: in_category.len(),
                sample_questions,
            })
        })
        .collect()
}

fn format_code_results(results: &[Match<'_, CodeRecord>]) -> String {
    if results.is_empty() {
        return "No relevant code sections found. This may be an uncommon scenario or outside typical residential codes. \
                Recommend consulting with a licensed professional."
            .to_string();
    }

    let mut output = String::from("**Relevant Building Codes:**\n\n");
    for (i, m) in results.iter().enumerate() {
        let code = m.record;
        output.push_str(&format!("**{}. {}** ({})\n", i + 1, code.title, code.code_ref));
        output.push_str(&format!("   - **Summary:** {}\n", code.summary));
        output.push_str(&format!("   - **Jurisdiction:** {}\n", code.jurisdiction.as_str()));
        output.push_str(&format!("   - **Source:** {}\n", code.source));
        if !code.notes.is_empty() {
            output.push_str(&format!("   - **Notes:** {}\n", code.notes));
        }
        output.push('\n');
    }
    output.push_str("\n*Note: Always verify with local building department as jurisdictions may have amendments.*");
    output
}

fn format_code_section(section: &CodeRecord, all: &[CodeRecord]) -> String {
    let mut output = format!("**{}**\n\n", section.title);
    output.push_str(&format!("**Reference:** {}\n", section.code_ref));
    output.push_str(&format!("**Category:** {}\n", section.category.as_str()));
    output.push_str(&format!("**Jurisdiction:** {}\n", section.jurisdiction.as_str()));
    output.push_str(&format!("**Summary:** {}\n", section.summary));

    if let Some(full_text) = &section.full_text {
        output.push_str(&format!("\n**Code Text:**\n{}\n", full_text));
    }
    if !section.notes.is_empty() {
        output.push_str(&format!("\n**Notes:** {}\n", section.notes));
    }
    if !section.related_codes.is_empty() {
        // related references are informational; only some resolve to loaded sections
        let related: Vec<String> = section
            .related_codes
            .iter()
            .map(|r| match all.iter().find(|c| c.code_ref.eq_ignore_ascii_case(r)) {
                Some(c) => format!("{} ({})", r, c.title),
                None => r.clone(),
            })
            .collect();
        output.push_str(&format!("\n**Related Codes:** {}\n", related.join(", ")));
    }

    output.push_str(&format!("\n**Source:** {}", section.source));
    output
}

fn format_compliance(scenario: &str, relevant: &[Match<'_, CodeRecord>]) -> String {
    let mut output = format!("**Compliance Check for:** {}\n\n", scenario);

    if relevant.is_empty() {
        output.push_str("⚠️ **Unable to determine compliance** - no relevant codes found in database.\n");
        output.push_str("Recommend consulting a licensed professional for this scenario.");
        return output;
    }

    output.push_str("**Applicable Codes:**\n\n");
    for m in relevant {
        output.push_str(&format!("- {} ({})\n", m.record.title, m.record.code_ref));
        output.push_str(&format!("  Requirement: {}\n\n", m.record.summary));
    }
    output.push_str("\n**Assessment:**\n");
    output.push_str("Based on the codes above, verify that your scenario meets these requirements. ");
    output.push_str("If uncertain, consult with a licensed professional before proceeding.\n\n");
    output.push_str("*This is guidance only and not a substitute for professional inspection or approval.*");
    output
}

fn format_categories(summaries: &[CategorySummary]) -> String {
    if summaries.is_empty() {
        return "No building codes are loaded.".to_string();
    }
    let mut output = String::from("**Building Code Categories:**\n\n");
    for s in summaries {
        output.push_str(&format!("**{}** ({} sections)\n", s.category.as_str(), s.count));
        for q in &s.sample_questions {
            output.push_str(&format!("  - {}\n", q));
        }
        output.push('\n');
    }
    output
}
