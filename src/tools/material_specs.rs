/// Material Specs Tools
///
/// Product search and lookup over the supplier catalog, alternative and
/// compatibility checks, shopping list totals, and the material quantity
/// calculators.

use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::Serialize;
use serde_json::json;

use super::schema::{ArgKind, ArgSpec, Arguments, as_integer};
use super::{ToolOutput, ToolSpec, result_limit, to_data};
use crate::calculators::{
    self, Calculation, DeckInput, OutletInput, PAINT_COVERAGE_SQ_FT, PEX_RUN_FEET, PaintInput, PexInput, RoomType,
    TileInput, WireInput,
};
use crate::core::error::ToolError;
use crate::matcher::{Match, ProductFilters, Query};
use crate::store::RecordStore;
use crate::store::records::{ProductCategory, ProductRecord, SpecValue};

const PRODUCT_CATEGORIES: &[&str] = &["electrical", "plumbing", "lumber", "flooring", "hardware"];

/// Default number of search results when no limit is given or configured.
pub const DEFAULT_SEARCH_LIMIT: usize = 10;
const ALTERNATIVES_SHOWN: usize = 5;
const SPECS_IN_SUMMARY: usize = 3;

/// Material specs tools, by tool name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterialTool {
    SearchMaterials,
    GetProductDetails,
    FindAlternatives,
    CheckCompatibility,
    CreateShoppingList,
    WireNeeded,
    OutletsNeeded,
    TileNeeded,
    PaintNeeded,
    DeckLumber,
    PexPipe,
}

/// Tool catalog of the material specs server.
pub fn catalog() -> Vec<ToolSpec<MaterialTool>> {
    vec![
        ToolSpec {
            name: "search_materials",
            description: "Search for building materials and get current pricing from suppliers.",
            args: vec![
                ArgSpec::required(
                    "query",
                    ArgKind::String,
                    "What to search for (e.g., '12/2 wire', 'GFCI', 'pressure-treated'). May be empty when filtering only.",
                ),
                ArgSpec::optional("category", ArgKind::Enum(PRODUCT_CATEGORIES), "Product category to match"),
                ArgSpec::optional("min_price", ArgKind::Number, "Minimum price filter"),
                ArgSpec::optional("max_price", ArgKind::Number, "Maximum price filter"),
                ArgSpec::optional("limit", ArgKind::Integer, "Maximum number of results"),
            ],
            handler: MaterialTool::SearchMaterials,
        },
        ToolSpec {
            name: "get_product_details",
            description: "Get detailed specifications for a specific product",
            args: vec![ArgSpec::required("product_id", ArgKind::String, "Product ID (e.g., 'HD-12345')")],
            handler: MaterialTool::GetProductDetails,
        },
        ToolSpec {
            name: "find_alternatives",
            description: "Find alternative products at different price points",
            args: vec![
                ArgSpec::required("product_id", ArgKind::String, "Original product ID"),
                ArgSpec::optional("min_price", ArgKind::Number, "Minimum price for alternatives"),
                ArgSpec::optional("max_price", ArgKind::Number, "Maximum price for alternatives"),
            ],
            handler: MaterialTool::FindAlternatives,
        },
        ToolSpec {
            name: "check_compatibility",
            description: "Check if two products are compatible with each other",
            args: vec![
                ArgSpec::required("product1_id", ArgKind::String, "First product ID"),
                ArgSpec::required("product2_id", ArgKind::String, "Second product ID"),
            ],
            handler: MaterialTool::CheckCompatibility,
        },
        ToolSpec {
            name: "create_shopping_list",
            description: "Create a complete shopping list with products, quantities and an estimated total",
            args: vec![ArgSpec::required("items", ArgKind::LineItems, "List of product IDs and quantities")],
            handler: MaterialTool::CreateShoppingList,
        },
        ToolSpec {
            name: "calculate_wire_needed",
            description: "Calculate how much electrical wire is needed for a circuit",
            args: vec![
                ArgSpec::required(
                    "circuit_length_feet",
                    ArgKind::Number,
                    "One-way distance in feet from panel to endpoint",
                ),
                ArgSpec::optional("num_circuits", ArgKind::Integer, "Number of circuits").with_default(json!(1)),
            ],
            handler: MaterialTool::WireNeeded,
        },
        ToolSpec {
            name: "calculate_outlets_needed",
            description: "Calculate number of outlets needed per NEC code",
            args: vec![
                ArgSpec::required("room_perimeter_feet", ArgKind::Number, "Total perimeter of room in feet"),
                ArgSpec::required("room_type", ArgKind::Enum(&RoomType::NAMES), "Type of room"),
            ],
            handler: MaterialTool::OutletsNeeded,
        },
        ToolSpec {
            name: "calculate_tile_needed",
            description: "Calculate how much tile is needed for a floor or wall",
            args: vec![
                ArgSpec::required("area_sq_ft", ArgKind::Number, "Total area to tile in square feet"),
                ArgSpec::optional("tile_width_inches", ArgKind::Number, "Tile width in inches").with_default(json!(12)),
                ArgSpec::optional("tile_height_inches", ArgKind::Number, "Tile height in inches").with_default(json!(12)),
            ],
            handler: MaterialTool::TileNeeded,
        },
        ToolSpec {
            name: "calculate_paint_needed",
            description: "Calculate how much paint is needed",
            args: vec![
                ArgSpec::required("area_sq_ft", ArgKind::Number, "Total wall/ceiling area in square feet"),
                ArgSpec::optional("num_coats", ArgKind::Integer, "Number of coats").with_default(json!(2)),
                ArgSpec::optional("coverage_per_gallon", ArgKind::Number, "Square feet covered per gallon")
                    .with_default(json!(PAINT_COVERAGE_SQ_FT)),
            ],
            handler: MaterialTool::PaintNeeded,
        },
        ToolSpec {
            name: "calculate_deck_lumber",
            description: "Calculate lumber needed for deck construction",
            args: vec![
                ArgSpec::required("deck_length_ft", ArgKind::Number, "Deck length in feet"),
                ArgSpec::required("deck_width_ft", ArgKind::Number, "Deck width in feet"),
                ArgSpec::optional("joist_spacing_inches", ArgKind::Number, "Joist spacing on center").with_default(json!(16)),
                ArgSpec::optional("board_width_inches", ArgKind::Number, "Deck board width").with_default(json!(5.5)),
            ],
            handler: MaterialTool::DeckLumber,
        },
        ToolSpec {
            name: "calculate_pex_pipe",
            description: "Calculate PEX piping needed for plumbing project",
            args: vec![
                ArgSpec::required(
                    "num_fixtures",
                    ArgKind::Integer,
                    "Number of plumbing fixtures (sinks, toilets, showers, etc.)",
                ),
                ArgSpec::optional(
                    "manifold_system",
                    ArgKind::Boolean,
                    "True for home-run manifold system, false for trunk-and-branch",
                )
                .with_default(json!(true)),
                ArgSpec::optional("avg_distance_per_fixture", ArgKind::Number, "Average run length in feet")
                    .with_default(json!(PEX_RUN_FEET)),
            ],
            handler: MaterialTool::PexPipe,
        },
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

/// Outcome of a compatibility check between two products.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Compatibility {
    pub compatible: bool,
    pub confidence: Confidence,
    pub notes: Vec<String>,
}

/// An alternative product with its price relative to the original.
#[derive(Debug, Clone, Serialize)]
pub struct Alternative<'a> {
    #[serde(flatten)]
    pub product: &'a ProductRecord,
    /// Listed explicitly by the original product rather than found by category.
    pub listed: bool,
    pub price_difference: Decimal,
}

#[derive(Debug, Clone, Serialize)]
struct ShoppingLine<'a> {
    product_id: &'a str,
    quantity: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    unit_price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    subtotal: Option<Decimal>,
    found: bool,
}

/// Material specs server state: a read-only product store plus configured limits.
pub struct MaterialSpecs<S> {
    store: S,
    search_limit: usize,
}

impl<S: RecordStore<ProductRecord>> MaterialSpecs<S> {
    pub fn new(store: S, search_limit: usize) -> Self {
        Self {
            store,
            search_limit: search_limit.max(1),
        }
    }

    pub fn call(&self, tool: MaterialTool, args: &Arguments) -> Result<ToolOutput, ToolError> {
        match tool {
            MaterialTool::SearchMaterials => self.search(args),
            MaterialTool::GetProductDetails => self.product_details(args),
            MaterialTool::FindAlternatives => self.alternatives(args),
            MaterialTool::CheckCompatibility => self.compatibility(args),
            MaterialTool::CreateShoppingList => self.shopping_list(args),
            MaterialTool::WireNeeded => calculation_output(calculators::wire_needed(WireInput {
                circuit_length_feet: args.required_f64("circuit_length_feet")?,
                num_circuits: args.required_i64("num_circuits")?,
            })?),
            MaterialTool::OutletsNeeded => {
                let room = args.required_str("room_type")?;
                let room_type = RoomType::parse(room)
                    .ok_or_else(|| ToolError::invalid_argument("room_type", format!("unknown room type '{}'", room)))?;
                calculation_output(calculators::outlets_needed(OutletInput {
                    room_perimeter_feet: args.required_f64("room_perimeter_feet")?,
                    room_type,
                })?)
            }
            MaterialTool::TileNeeded => calculation_output(calculators::tile_needed(TileInput {
                area_sq_ft: args.required_f64("area_sq_ft")?,
                tile_width_inches: args.required_f64("tile_width_inches")?,
                tile_height_inches: args.required_f64("tile_height_inches")?,
            })?),
            MaterialTool::PaintNeeded => calculation_output(calculators::paint_needed(PaintInput {
                area_sq_ft: args.required_f64("area_sq_ft")?,
                coats: args.required_i64("num_coats")?,
                coverage_per_gallon: args.required_f64("coverage_per_gallon")?,
            })?),
            MaterialTool::DeckLumber => calculation_output(calculators::deck_lumber(DeckInput {
                deck_length_ft: args.required_f64("deck_length_ft")?,
                deck_width_ft: args.required_f64("deck_width_ft")?,
                joist_spacing_inches: args.required_f64("joist_spacing_inches")?,
                board_width_inches: args.required_f64("board_width_inches")?,
            })?),
            MaterialTool::PexPipe => calculation_output(calculators::pex_pipe(PexInput {
                num_fixtures: args.required_i64("num_fixtures")?,
                avg_distance_per_fixture: args.required_f64("avg_distance_per_fixture")?,
                manifold_system: args.bool("manifold_system").unwrap_or(true),
            })?),
        }
    }

    fn search(&self, args: &Arguments) -> Result<ToolOutput, ToolError> {
        let query = args.required_str("query")?;
        let filters = ProductFilters {
            category: args.str("category").and_then(ProductCategory::parse),
            ..price_filters(args)?
        };
        let limit = result_limit(args, self.search_limit)?;

        let matches = self.store.search(&Query::new(query, filters));
        let total = matches.len();
        let shown = &matches[..total.min(limit)];
        tracing::debug!(query, total, shown = shown.len(), "searched materials");

        Ok(ToolOutput {
            text: format_product_results(shown, total),
            data: json!({
                "results": to_data(shown),
                "total_matches": total,
            }),
        })
    }

    fn product_details(&self, args: &Arguments) -> Result<ToolOutput, ToolError> {
        let product = self.store.get_by_reference(args.required_str("product_id")?)?;
        Ok(ToolOutput {
            text: format_product_details(product, self.store.records()),
            data: to_data(product),
        })
    }

    fn alternatives(&self, args: &Arguments) -> Result<ToolOutput, ToolError> {
        let original = self.store.get_by_reference(args.required_str("product_id")?)?;
        let filters = price_filters(args)?;
        let alternatives = find_alternatives(self.store.records(), original, &filters);

        // listed ids that are not in the catalog are reported, not treated as errors
        let unresolved: Vec<&str> = original
            .alternatives
            .iter()
            .filter(|id| !self.store.records().iter().any(|p| p.id.eq_ignore_ascii_case(id)))
            .map(String::as_str)
            .collect();

        Ok(ToolOutput {
            text: format_alternatives(original, &alternatives),
            data: json!({
                "original": to_data(original),
                "alternatives": to_data(&alternatives),
                "unresolved_alternatives": unresolved,
            }),
        })
    }

    fn compatibility(&self, args: &Arguments) -> Result<ToolOutput, ToolError> {
        let first = self.store.get_by_reference(args.required_str("product1_id")?)?;
        let second = self.store.get_by_reference(args.required_str("product2_id")?)?;
        let result = check_compatibility(first, second);

        Ok(ToolOutput {
            text: format_compatibility(first, second, &result),
            data: to_data(&result),
        })
    }

    fn shopping_list(&self, args: &Arguments) -> Result<ToolOutput, ToolError> {
        let items = args.get("items").and_then(|v| v.as_array()).cloned().unwrap_or_default();

        let mut lines = Vec::with_capacity(items.len());
        let mut total = Decimal::ZERO;
        for item in &items {
            let product_id = item.get("product_id").and_then(|v| v.as_str()).unwrap_or_default();
            let quantity = item.get("quantity").and_then(as_integer).unwrap_or(1);
            let line = match self.store.get_by_reference(product_id) {
                Ok(product) => {
                    let subtotal = product.price * Decimal::from(quantity);
                    total += subtotal;
                    (Some(product), subtotal)
                }
                Err(_) => (None, Decimal::ZERO),
            };
            lines.push((product_id.to_string(), quantity, line));
        }

        let text = format_shopping_list(&lines, total);
        let data_lines: Vec<ShoppingLine<'_>> = lines
            .iter()
            .map(|(id, quantity, (product, subtotal))| ShoppingLine {
                product_id: id,
                quantity: *quantity,
                name: product.map(|p| p.name.as_str()),
                unit_price: product.map(|p| p.price),
                subtotal: product.map(|_| *subtotal),
                found: product.is_some(),
            })
            .collect();

        Ok(ToolOutput {
            text,
            data: json!({
                "items": to_data(&data_lines),
                "total": total,
            }),
        })
    }
}

fn decimal_arg(args: &Arguments, name: &str) -> Result<Option<Decimal>, ToolError> {
    let Some(value) = args.f64(name) else {
        return Ok(None);
    };
    if value < 0.0 {
        return Err(ToolError::invalid_argument(name, format!("must not be negative, got {}", value)));
    }
    Decimal::from_f64(value)
        .map(Some)
        .ok_or_else(|| ToolError::invalid_argument(name, format!("not a representable price: {}", value)))
}

fn price_filters(args: &Arguments) -> Result<ProductFilters, ToolError> {
    let min_price = decimal_arg(args, "min_price")?;
    let max_price = decimal_arg(args, "max_price")?;
    if let (Some(min), Some(max)) = (min_price, max_price) {
        if min > max {
            return Err(ToolError::invalid_argument(
                "min_price",
                format!("must not exceed max_price ({} > {})", min, max),
            ));
        }
    }
    Ok(ProductFilters {
        category: None,
        min_price,
        max_price,
    })
}

/// Alternatives to `original`: products it lists explicitly plus products in
/// the same category, within the price filters, cheapest first.
pub fn find_alternatives<'a>(
    products: &'a [ProductRecord],
    original: &ProductRecord,
    filters: &ProductFilters,
) -> Vec<Alternative<'a>> {
    let mut found: Vec<Alternative<'a>> = products
        .iter()
        .filter(|p| p.id != original.id)
        .filter_map(|p| {
            let listed = original.alternatives.iter().any(|id| id.eq_ignore_ascii_case(&p.id));
            (listed || p.category == original.category).then_some(Alternative {
                product: p,
                listed,
                price_difference: p.price - original.price,
            })
        })
        .filter(|a| filters.price_in_range(a.product.price))
        .collect();
    found.sort_by(|a, b| a.product.price.cmp(&b.product.price));
    found
}

fn spec_text<'a>(product: &'a ProductRecord, key: &str) -> Option<&'a str> {
    product.specifications.get(key).and_then(SpecValue::as_text)
}

/// Rule-based compatibility between two catalog products.
pub fn check_compatibility(first: &ProductRecord, second: &ProductRecord) -> Compatibility {
    let mut compatible = false;
    let mut confidence = Confidence::Low;
    let mut notes = Vec::new();

    if first.alternatives.iter().any(|id| id.eq_ignore_ascii_case(&second.id))
        || second.alternatives.iter().any(|id| id.eq_ignore_ascii_case(&first.id))
    {
        compatible = true;
        confidence = confidence.max(Confidence::High);
        notes.push(format!("{} and {} are listed as interchangeable alternatives", first.id, second.id));
    }

    // `compatible_with`, `compatible_panels`, ... list what a product works with
    for (this, other) in [(first, second), (second, first)] {
        let haystack = format!(
            "{} {}",
            other.name.to_lowercase(),
            spec_text(other, "material").unwrap_or_default().to_lowercase()
        );
        let hit = this
            .specifications
            .iter()
            .filter(|(key, _)| key.starts_with("compatible"))
            .filter_map(|(_, value)| match value {
                SpecValue::List(items) => Some(items),
                _ => None,
            })
            .flatten()
            .find(|item| haystack.contains(&item.to_lowercase()));
        if let Some(item) = hit {
            compatible = true;
            confidence = confidence.max(Confidence::High);
            notes.push(format!("{} is rated for {}, which matches {}", this.name, item, other.name));
        }
    }

    if first.category == ProductCategory::Electrical && second.category == ProductCategory::Electrical {
        let ratings = (
            spec_text(first, "voltage"),
            spec_text(second, "voltage"),
            spec_text(first, "amperage"),
            spec_text(second, "amperage"),
        );
        match ratings {
            (Some(v1), Some(v2), Some(a1), Some(a2)) if v1 == v2 && a1 == a2 => {
                compatible = true;
                confidence = confidence.max(Confidence::Medium);
                notes.push(format!("Both rated for {} and {}", v1, a1));
            }
            (_, _, Some(a1), Some(a2)) if a1 != a2 => {
                notes.push(format!("Amperage ratings differ: {} vs {}", a1, a2));
            }
            _ => {}
        }
    }

    if let (Some(s1), Some(s2)) = (spec_text(first, "size"), spec_text(second, "size")) {
        if s1.eq_ignore_ascii_case(s2) {
            if compatible {
                notes.push(format!("Both are {}", s1));
            }
        } else {
            compatible = false;
            confidence = Confidence::High;
            notes.push(format!("Size mismatch: {} vs {}", s1, s2));
        }
    }

    Compatibility {
        compatible,
        confidence,
        notes,
    }
}

fn calculation_output(calc: Calculation) -> Result<ToolOutput, ToolError> {
    Ok(ToolOutput {
        text: format_calculation(&calc),
        data: to_data(&calc),
    })
}

fn format_calculation(calc: &Calculation) -> String {
    let mut output = format!("**{}:**\n\n", calc.title);
    output.push_str(&format!("**Quantity:** {} {}\n\n", calc.quantity, calc.unit));
    output.push_str("**How it was derived:**\n");
    for step in &calc.breakdown {
        output.push_str(&format!("  - {}\n", step));
    }
    if !calc.components.is_empty() {
        output.push_str("\n**Materials:**\n");
        for c in &calc.components {
            output.push_str(&format!(
                "  - **{}:** {} {} ({})\n",
                title_case(c.name),
                c.quantity,
                c.unit,
                c.size
            ));
        }
    }
    output.push_str(&format!("\n💡 **Note:** {}\n", calc.note));
    output
}

fn title_case(key: &str) -> String {
    key.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn stars(rating: f64) -> String {
    "⭐".repeat(rating.clamp(0.0, 5.0) as usize)
}

fn format_product_results(results: &[Match<'_, ProductRecord>], total: usize) -> String {
    if results.is_empty() {
        return "No products found matching your criteria. Try broadening your search or checking the category."
            .to_string();
    }

    let mut output = format!("**Found {} Products:**\n\n", total);
    for (i, m) in results.iter().enumerate() {
        let p = m.record;
        output.push_str(&format!("**{}. {}**\n", i + 1, p.name));
        output.push_str(&format!("   - **Price:** ${:.2} / {}\n", p.price, p.unit));
        output.push_str(&format!("   - **Supplier:** {}\n", p.supplier));
        if p.in_stock {
            output.push_str("   - **Availability:** ✅ In Stock");
            if let Some(qty) = p.quantity_available {
                output.push_str(&format!(" ({} available)", qty));
            }
            output.push('\n');
        } else {
            output.push_str("   - **Availability:** ❌ Out of Stock\n");
        }
        if let Some(rating) = p.rating {
            output.push_str(&format!(
                "   - **Rating:** {} {}/5.0 ({} reviews)\n",
                stars(rating),
                rating,
                p.review_count
            ));
        }
        if !p.specifications.is_empty() {
            let specs: Vec<String> = p
                .specifications
                .iter()
                .take(SPECS_IN_SUMMARY)
                .map(|(k, v)| format!("{}: {}", k, v))
                .collect();
            output.push_str(&format!("   - **Specs:** {}\n", specs.join(", ")));
        }
        if let Some(url) = &p.url {
            output.push_str(&format!("   - **Link:** {}\n", url));
        }
        output.push_str(&format!("   - **Product ID:** `{}` (use for alternatives/details)\n\n", p.id));
    }
    if total > results.len() {
        output.push_str(&format!("\n*Showing top {} of {} results*\n", results.len(), total));
    }
    output
}

fn format_product_details(product: &ProductRecord, catalog: &[ProductRecord]) -> String {
    let mut output = format!("**{}**\n\n", product.name);
    output.push_str(&format!("**Price:** ${:.2} / {}\n", product.price, product.unit));
    output.push_str(&format!("**Supplier:** {}\n", product.supplier));
    if product.subcategory.is_empty() {
        output.push_str(&format!("**Category:** {}\n", product.category.as_str()));
    } else {
        output.push_str(&format!(
            "**Category:** {} > {}\n",
            product.category.as_str(),
            product.subcategory
        ));
    }
    if !product.manufacturer.is_empty() {
        output.push_str(&format!("**Manufacturer:** {}\n", product.manufacturer));
    }
    output.push('\n');

    if let Some(rating) = product.rating {
        output.push_str(&format!(
            "**Rating:** {} {}/5.0 ({} reviews)\n\n",
            stars(rating),
            rating,
            product.review_count
        ));
    }

    output.push_str("**Specifications:**\n");
    for (key, value) in &product.specifications {
        output.push_str(&format!("  - **{}:** {}\n", title_case(key), value));
    }

    let availability = if product.in_stock { "✅ In Stock" } else { "❌ Out of Stock" };
    output.push_str(&format!("\n**Availability:** {}\n", availability));

    if !product.alternatives.is_empty() {
        output.push_str("\n**Alternatives:**\n");
        for id in &product.alternatives {
            match catalog.iter().find(|p| p.id.eq_ignore_ascii_case(id)) {
                Some(alt) => output.push_str(&format!("  - `{}` {} (${:.2})\n", alt.id, alt.name, alt.price)),
                None => output.push_str(&format!("  - `{}` (not in catalog)\n", id)),
            }
        }
    }

    if let Some(url) = &product.url {
        output.push_str(&format!("\n**Purchase:** {}\n", url));
    }
    output
}

fn format_alternatives(original: &ProductRecord, alternatives: &[Alternative<'_>]) -> String {
    let mut output = format!("**Alternatives to {}** (${:.2}):\n\n", original.name, original.price);

    if alternatives.is_empty() {
        output.push_str("No alternatives found in the specified price range.\n");
        return output;
    }

    for (i, alt) in alternatives.iter().take(ALTERNATIVES_SHOWN).enumerate() {
        let indicator = if alt.price_difference < Decimal::ZERO {
            "💰 Cheaper"
        } else {
            "💸 More expensive"
        };
        output.push_str(&format!("**{}. {}**\n", i + 1, alt.product.name));
        output.push_str(&format!(
            "   - **Price:** ${:.2} ({}: ${:.2})\n",
            alt.product.price,
            indicator,
            alt.price_difference.abs()
        ));
        output.push_str(&format!("   - **Supplier:** {}\n", alt.product.supplier));
        if let Some(rating) = alt.product.rating {
            output.push_str(&format!("   - **Rating:** {} {}/5.0\n", stars(rating), rating));
        }
        output.push_str(&format!("   - **Product ID:** `{}`\n\n", alt.product.id));
    }
    output
}

fn format_compatibility(first: &ProductRecord, second: &ProductRecord, result: &Compatibility) -> String {
    let mut output = format!("**Compatibility Check:** {} + {}\n\n", first.name, second.name);
    output.push_str(if result.compatible {
        "✅ **Compatible** "
    } else {
        "❌ **Not Compatible** "
    });
    let confidence = match result.confidence {
        Confidence::Low => "low",
        Confidence::Medium => "medium",
        Confidence::High => "high",
    };
    output.push_str(&format!("(Confidence: {})\n\n", confidence));

    if result.notes.is_empty() {
        output.push_str(
            "*No specific compatibility information available. Consult product specifications or manufacturer.*\n",
        );
    } else {
        output.push_str("**Notes:**\n");
        for note in &result.notes {
            output.push_str(&format!("  - {}\n", note));
        }
    }
    output
}

type ShoppingEntry<'a> = (String, i64, (Option<&'a ProductRecord>, Decimal));

fn format_shopping_list(lines: &[ShoppingEntry<'_>], total: Decimal) -> String {
    let mut output = String::from("**🛒 Shopping List:**\n\n");
    for (i, (id, quantity, (product, subtotal))) in lines.iter().enumerate() {
        match product {
            Some(p) => {
                output.push_str(&format!("**{}. {}**\n", i + 1, p.name));
                output.push_str(&format!("   - Quantity: {}\n", quantity));
                output.push_str(&format!("   - Unit Price: ${:.2}\n", p.price));
                output.push_str(&format!("   - Subtotal: ${:.2}\n", subtotal));
                output.push_str(&format!("   - Supplier: {}\n", p.supplier));
                if let Some(url) = &p.url {
                    output.push_str(&format!("   - Link: {}\n", url));
                }
                output.push('\n');
            }
            None => output.push_str(&format!("**{}. Product {}** - Not found\n\n", i + 1, id)),
        }
    }
    output.push_str(&format!("\n**Total Estimated Cost: ${:.2}**\n", total));
    output.push_str("\n*Prices and availability subject to change. Verify before purchasing.*");
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{BUNDLED_PRODUCTS, ProductStore};
    use serde_json::Value;

    fn server() -> MaterialSpecs<ProductStore> {
        MaterialSpecs::new(
            ProductStore::from_json(BUNDLED_PRODUCTS, "products").unwrap(),
            DEFAULT_SEARCH_LIMIT,
        )
    }

    fn call(server: &MaterialSpecs<ProductStore>, tool: MaterialTool, raw: Value) -> Result<ToolOutput, ToolError> {
        let spec = catalog().into_iter().find(|t| t.handler == tool).unwrap();
        let args = Arguments::validate(&spec.args, &raw)?;
        server.call(tool, &args)
    }

    fn product<'a>(store: &'a ProductStore, id: &str) -> &'a ProductRecord {
        store.get_by_reference(id).unwrap()
    }

    #[test]
    fn test_search_with_category_and_price() {
        let server = server();
        let out = call(
            &server,
            MaterialTool::SearchMaterials,
            json!({"query": "gfci", "category": "electrical", "max_price": 20}),
        )
        .unwrap();
        let results = out.data["results"].as_array().unwrap();
        // both GFCI outlets hit name + filters; the breaker only matches by name
        assert_eq!(results[0]["id"], "HD-20001");
        assert_eq!(results[1]["id"], "HD-20002");
        assert!(out.text.starts_with("**Found"));
    }

    #[test]
    fn test_search_rejects_inverted_price_range() {
        let server = server();
        let err = call(
            &server,
            MaterialTool::SearchMaterials,
            json!({"query": "", "min_price": 50, "max_price": 10}),
        )
        .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArgument { ref field, .. } if field == "min_price"));
    }

    #[test]
    fn test_product_details_and_not_found() {
        let server = server();
        let out = call(&server, MaterialTool::GetProductDetails, json!({"product_id": "hd-20001"})).unwrap();
        assert_eq!(out.data["id"], "HD-20001");
        assert!(out.text.contains("`LW-88812` (not in catalog)"));

        let err = call(&server, MaterialTool::GetProductDetails, json!({"product_id": "HD-00000"})).unwrap_err();
        assert_eq!(err.kind(), "not_found");
    }

    #[test]
    fn test_alternatives_sorted_by_price_with_unresolved_ids() {
        let server = server();
        let out = call(&server, MaterialTool::FindAlternatives, json!({"product_id": "HD-20001"})).unwrap();
        let alts = out.data["alternatives"].as_array().unwrap();
        let ids: Vec<&str> = alts.iter().map(|a| a["id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["HD-20002", "HD-30001", "HD-12346", "HD-12345"]);
        assert_eq!(alts[0]["listed"], true);
        assert_eq!(out.data["unresolved_alternatives"], json!(["LW-88812"]));
    }

    #[test]
    fn test_alternatives_price_range() {
        let store = ProductStore::from_json(BUNDLED_PRODUCTS, "products").unwrap();
        let original = product(&store, "HD-12345");
        let filters = ProductFilters {
            max_price: Some(Decimal::new(50, 0)),
            ..Default::default()
        };
        let found = find_alternatives(store.records(), original, &filters);
        assert!(found.iter().all(|a| a.product.price <= Decimal::new(50, 0)));
        assert!(found.iter().all(|a| a.product.id != "HD-12345"));
    }

    #[test]
    fn test_compatibility_rules() {
        let store = ProductStore::from_json(BUNDLED_PRODUCTS, "products").unwrap();

        let fitting_and_pipe = check_compatibility(product(&store, "HD-40001"), product(&store, "HD-40002"));
        assert!(fitting_and_pipe.compatible);
        assert_eq!(fitting_and_pipe.confidence, Confidence::High);

        let outlets = check_compatibility(product(&store, "HD-20001"), product(&store, "HD-20002"));
        assert!(outlets.compatible);
        assert!(outlets.notes.iter().any(|n| n == "Both rated for 125V and 15A"));

        let unrelated = check_compatibility(product(&store, "HD-50001"), product(&store, "HD-60001"));
        assert!(!unrelated.compatible);
        assert_eq!(unrelated.confidence, Confidence::Low);
        assert!(unrelated.notes.is_empty());
    }

    #[test]
    fn test_shopping_list_totals() {
        let server = server();
        let out = call(
            &server,
            MaterialTool::CreateShoppingList,
            json!({"items": [
                {"product_id": "HD-20002", "quantity": 4},
                {"product_id": "HD-40001"},
                {"product_id": "NOPE-1", "quantity": 2}
            ]}),
        )
        .unwrap();
        // 4 x 12.47 + 8.97
        assert_eq!(out.data["total"], json!("58.85"));
        assert_eq!(out.data["items"][2]["found"], false);
        assert!(out.text.contains("**Total Estimated Cost: $58.85**"));
        assert!(out.text.contains("Product NOPE-1** - Not found"));
    }

    #[test]
    fn test_calculator_tools_use_defaults() {
        let server = server();
        let tile = call(&server, MaterialTool::TileNeeded, json!({"area_sq_ft": 100})).unwrap();
        assert_eq!(tile.data["quantity"], json!(110.0));
        assert!(tile.text.contains("Raw area: 100 sq ft"));

        let wire = call(&server, MaterialTool::WireNeeded, json!({"circuit_length_feet": 50})).unwrap();
        assert_eq!(wire.data["quantity"], json!(125.0));

        let paint = call(&server, MaterialTool::PaintNeeded, json!({"area_sq_ft": 400})).unwrap();
        assert_eq!(paint.data["quantity"], json!(3.0));
    }

    #[test]
    fn test_calculator_invalid_input_kind() {
        let server = server();
        let err = call(&server, MaterialTool::DeckLumber, json!({"deck_length_ft": -4, "deck_width_ft": 10})).unwrap_err();
        assert_eq!(err.kind(), "invalid_input");

        let err = call(&server, MaterialTool::OutletsNeeded, json!({"room_perimeter_feet": 40, "room_type": "attic"}))
            .unwrap_err();
        assert_eq!(err.kind(), "invalid_argument");
    }
}
