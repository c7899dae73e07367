/// Material Quantity Calculators
///
/// Pure functions: identical inputs always give identical output. Every
/// dimension must be positive and finite and every count at least 1.
/// Waste margins are whole percentages so that the margin arithmetic does
/// not introduce floating-point noise before rounding.

use serde::Serialize;

use crate::core::error::CalcError;

/// Extra wire for slack, bends and mistakes.
pub const WIRE_SLACK_PERCENT: u32 = 15;
/// Wire is sold on spools in multiples of this length.
pub const WIRE_SPOOL_FEET: f64 = 25.0;
/// Extra tile for cuts and breakage.
pub const TILE_WASTE_PERCENT: u32 = 10;
pub const TILES_PER_CASE: u64 = 10;
pub const PAINT_COVERAGE_SQ_FT: f64 = 350.0;
pub const PEX_WASTE_PERCENT: u32 = 20;
pub const PEX_RUN_FEET: f64 = 30.0;

/// One item of a multi-part result (deck lumber, PEX lines, tile cases).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Component {
    pub name: &'static str,
    pub quantity: f64,
    pub unit: &'static str,
    pub size: String,
}

/// Result of a calculator: the headline quantity plus how it was derived.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Calculation {
    pub title: &'static str,
    pub quantity: f64,
    pub unit: &'static str,
    pub breakdown: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<Component>,
    pub note: String,
}

fn positive(field: &'static str, value: f64) -> Result<f64, CalcError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(CalcError::NonPositive { field, value })
    }
}

fn at_least_one(field: &'static str, value: i64) -> Result<u64, CalcError> {
    if value >= 1 {
        Ok(value as u64)
    } else {
        Err(CalcError::CountTooSmall { field, value })
    }
}

/// Valid inputs can still be large enough to overflow to infinity.
fn finite(field: &'static str, value: f64) -> Result<f64, CalcError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(CalcError::OutOfRange { field })
    }
}

/// Whole-valued `f64` count as an integer, if it fits.
fn whole(field: &'static str, value: f64) -> Result<u64, CalcError> {
    // u64::MAX as f64 rounds up to 2^64, so the bound is exclusive
    if value.is_finite() && value >= 0.0 && value < u64::MAX as f64 {
        Ok(value as u64)
    } else {
        Err(CalcError::OutOfRange { field })
    }
}

/// `ceil` that treats values within rounding error of an integer as that integer.
fn ceil_clean(x: f64) -> f64 {
    let nearest = x.round();
    if (x - nearest).abs() < 1e-9 { nearest } else { x.ceil() }
}

fn with_margin(x: f64, percent: u32) -> f64 {
    x * f64::from(100 + percent) / 100.0
}

fn round_to(x: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (x * factor).round() / factor
}

/// Compact number for breakdown lines: at most two decimals.
fn num(x: f64) -> String {
    format!("{}", round_to(x, 2))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WireInput {
    /// One-way distance from panel to endpoint.
    pub circuit_length_feet: f64,
    pub num_circuits: i64,
}

/// Wire runs out and back, plus slack, rounded up to a spool multiple.
pub fn wire_needed(input: WireInput) -> Result<Calculation, CalcError> {
    let run = positive("circuit_length_feet", input.circuit_length_feet)?;
    let circuits = at_least_one("num_circuits", input.num_circuits)?;

    let base = run * 2.0 * circuits as f64;
    let with_slack = with_margin(base, WIRE_SLACK_PERCENT);
    let recommended = finite("circuit_length_feet", ceil_clean(with_slack / WIRE_SPOOL_FEET) * WIRE_SPOOL_FEET)?;

    Ok(Calculation {
        title: "Wire Calculation",
        quantity: recommended,
        unit: "ft",
        breakdown: vec![
            format!("Base length: {} ft x 2 (out and back) x {} circuit(s) = {} ft", num(run), circuits, num(base)),
            format!("Slack allowance: +{}% = {} ft", WIRE_SLACK_PERCENT, num(with_slack)),
            format!("Rounded up to a {} ft spool multiple = {} ft", WIRE_SPOOL_FEET, num(recommended)),
        ],
        components: vec![],
        note: format!("Buying {} ft gives you buffer for mistakes and future repairs", num(recommended)),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomType {
    Living,
    Kitchen,
    Bathroom,
    Garage,
}

impl RoomType {
    pub const NAMES: [&'static str; 4] = ["living", "kitchen", "bathroom", "garage"];

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "living" => Some(RoomType::Living),
            "kitchen" => Some(RoomType::Kitchen),
            "bathroom" => Some(RoomType::Bathroom),
            "garage" => Some(RoomType::Garage),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RoomType::Living => "living",
            RoomType::Kitchen => "kitchen",
            RoomType::Bathroom => "bathroom",
            RoomType::Garage => "garage",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutletInput {
    pub room_perimeter_feet: f64,
    pub room_type: RoomType,
}

/// Minimum receptacle count for a room.
pub fn outlets_needed(input: OutletInput) -> Result<Calculation, CalcError> {
    let perimeter = positive("room_perimeter_feet", input.room_perimeter_feet)?;

    let (outlets, formula, code_ref, note) = match input.room_type {
        RoomType::Kitchen => {
            // countertop assumed to be half the perimeter
            let countertop = perimeter * 0.5;
            (
                ceil_clean(countertop / 4.0),
                format!("Countertop {} ft (50% of perimeter) / 4 ft, rounded up", num(countertop)),
                "NEC 210.52(C)(1)",
                "Kitchen countertops require outlets every 4 feet maximum",
            )
        }
        RoomType::Bathroom => (
            ceil_clean(perimeter / 12.0).max(1.0),
            format!("Perimeter {} ft / 12 ft, rounded up, minimum 1", num(perimeter)),
            "NEC 210.52(D)",
            "Bathroom requires at least one GFCI outlet, all must be GFCI protected",
        ),
        RoomType::Living | RoomType::Garage => (
            ceil_clean(perimeter / 12.0),
            format!("Perimeter {} ft / 12 ft, rounded up", num(perimeter)),
            "NEC 210.52(A)(1)",
            "Living spaces and garages require outlets every 12 feet of wall space",
        ),
    };

    Ok(Calculation {
        title: "Outlet Calculation",
        quantity: outlets,
        unit: "outlets",
        breakdown: vec![
            format!("Room type: {}", input.room_type.as_str()),
            formula,
            format!("Outlets needed: {}", num(outlets)),
            format!("Code reference: {}", code_ref),
        ],
        components: vec![],
        note: note.to_string(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileInput {
    pub area_sq_ft: f64,
    pub tile_width_inches: f64,
    pub tile_height_inches: f64,
}

/// Tiles for an area plus waste, bought in whole cases. The headline
/// quantity is the area the purchased cases cover.
pub fn tile_needed(input: TileInput) -> Result<Calculation, CalcError> {
    let area = positive("area_sq_ft", input.area_sq_ft)?;
    let width = positive("tile_width_inches", input.tile_width_inches)?;
    let height = positive("tile_height_inches", input.tile_height_inches)?;

    let tile_area = width * height / 144.0;
    let too_large = || CalcError::OutOfRange { field: "area_sq_ft" };
    let base_tiles = whole("area_sq_ft", ceil_clean(area / tile_area))?;
    let total_tiles = base_tiles
        .checked_mul(u64::from(100 + TILE_WASTE_PERCENT))
        .ok_or_else(too_large)?
        .div_ceil(100);
    let cases = total_tiles.div_ceil(TILES_PER_CASE);
    let purchased_tiles = cases.checked_mul(TILES_PER_CASE).ok_or_else(too_large)?;
    let coverage = round_to(purchased_tiles as f64 * tile_area, 1);

    Ok(Calculation {
        title: "Tile Calculation",
        quantity: coverage,
        unit: "sq ft",
        breakdown: vec![
            format!("Raw area: {} sq ft", num(area)),
            format!("Tile size: {}x{} in = {} sq ft per tile", num(width), num(height), round_to(tile_area, 4)),
            format!("Base tiles: {} sq ft / {} sq ft, rounded up = {}", num(area), round_to(tile_area, 4), base_tiles),
            format!("Waste margin: +{}% = {} tiles", TILE_WASTE_PERCENT, total_tiles),
            format!("Cases of {}: {} ({} tiles)", TILES_PER_CASE, cases, purchased_tiles),
            format!("Coverage purchased: {} sq ft", coverage),
        ],
        components: vec![
            Component {
                name: "tiles",
                quantity: purchased_tiles as f64,
                unit: "tiles",
                size: format!("{}x{} inches", num(width), num(height)),
            },
            Component {
                name: "cases",
                quantity: cases as f64,
                unit: "cases",
                size: format!("{} tiles per case", TILES_PER_CASE),
            },
        ],
        note: format!(
            "Ordering {} cases gives you {} extra tiles for cuts and repairs",
            cases,
            purchased_tiles - base_tiles
        ),
    })
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaintInput {
    pub area_sq_ft: f64,
    pub coats: i64,
    pub coverage_per_gallon: f64,
}

/// Gallons of paint, rounded up to whole gallons.
pub fn paint_needed(input: PaintInput) -> Result<Calculation, CalcError> {
    let area = positive("area_sq_ft", input.area_sq_ft)?;
    let coats = at_least_one("num_coats", input.coats)?;
    let coverage = positive("coverage_per_gallon", input.coverage_per_gallon)?;

    let total_area = area * coats as f64;
    let gallons = total_area / coverage;
    let to_buy = finite("area_sq_ft", ceil_clean(gallons))?;

    Ok(Calculation {
        title: "Paint Calculation",
        quantity: to_buy,
        unit: "gallons",
        breakdown: vec![
            format!("Area to cover: {} sq ft x {} coat(s) = {} sq ft", num(area), coats, num(total_area)),
            format!("Gallons needed: {} sq ft / {} sq ft per gallon = {}", num(total_area), num(coverage), num(gallons)),
            format!("Rounded up to whole gallons = {}", num(to_buy)),
        ],
        components: vec![],
        note: format!("Buy {} gallon(s) for {} coats", num(to_buy), coats),
    })
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeckInput {
    pub deck_length_ft: f64,
    pub deck_width_ft: f64,
    pub joist_spacing_inches: f64,
    pub board_width_inches: f64,
}

impl DeckInput {
    /// 16 in. joist spacing and 5.5 in. (2x6) deck boards.
    pub fn standard(deck_length_ft: f64, deck_width_ft: f64) -> Self {
        Self {
            deck_length_ft,
            deck_width_ft,
            joist_spacing_inches: 16.0,
            board_width_inches: 5.5,
        }
    }
}

/// Framing and decking pieces for a rectangular deck.
///
/// Joists are spaced across the width and deck boards are counted along the
/// length. Both are cut to the deck width.
pub fn deck_lumber(input: DeckInput) -> Result<Calculation, CalcError> {
    let length = positive("deck_length_ft", input.deck_length_ft)?;
    let width = positive("deck_width_ft", input.deck_width_ft)?;
    let spacing = positive("joist_spacing_inches", input.joist_spacing_inches)?;
    let board = positive("board_width_inches", input.board_width_inches)?;

    let area = finite("deck_length_ft", length * width)?;
    let joists = ceil_clean(width * 12.0 / spacing) + 1.0;
    let boards = ceil_clean(length * 12.0 / board);
    let posts = ceil_clean(length / 6.0) * ceil_clean(width / 6.0);
    let pieces = finite("deck_length_ft", joists + boards + posts)?;

    Ok(Calculation {
        title: "Deck Lumber Calculation",
        quantity: pieces,
        unit: "pieces",
        breakdown: vec![
            format!("Deck size: {}x{} ft = {} sq ft", num(length), num(width), num(area)),
            format!("Joists: {} ft x 12 / {} in spacing, rounded up, + 1 = {}", num(width), num(spacing), joists),
            format!("Deck boards: {} ft x 12 / {} in board width, rounded up = {}", num(length), num(board), boards),
            format!("Posts: ceil({} / 6) x ceil({} / 6) = {}", num(length), num(width), posts),
            format!("Total pieces: {}", pieces),
        ],
        components: vec![
            Component {
                name: "joists",
                quantity: joists,
                unit: "pieces",
                size: format!("2x8x{} (or 2x10 for larger spans), {} in on center", width.ceil(), num(spacing)),
            },
            Component {
                name: "decking_boards",
                quantity: boards,
                unit: "pieces",
                size: format!("2x6x{} or 5/4x6 composite, add 10% for cuts", width.ceil()),
            },
            Component {
                name: "posts",
                quantity: posts,
                unit: "pieces",
                size: "4x4x10 or 4x4x12 depending on height".to_string(),
            },
        ],
        note: "This is a basic estimate. Consult building codes for beam sizes and post spacing based on deck height."
            .to_string(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PexInput {
    pub num_fixtures: i64,
    pub avg_distance_per_fixture: f64,
    /// Home-run manifold when true, trunk-and-branch otherwise.
    pub manifold_system: bool,
}

/// PEX sold in 100 ft and 300 ft coils.
fn round_to_coil(feet: f64) -> f64 {
    if feet <= 100.0 {
        100.0
    } else if feet <= 300.0 {
        300.0
    } else {
        ceil_clean(feet / 300.0) * 300.0
    }
}

/// Hot and cold PEX supply lines, with waste, rounded to coil sizes.
pub fn pex_pipe(input: PexInput) -> Result<Calculation, CalcError> {
    let fixtures = at_least_one("num_fixtures", input.num_fixtures)?;
    let run = positive("avg_distance_per_fixture", input.avg_distance_per_fixture)?;

    // roughly 60% of fixtures need hot water
    let (system, hot_raw, cold_raw, formula) = if input.manifold_system {
        let hot_fixtures = fixtures
            .checked_mul(60)
            .ok_or(CalcError::OutOfRange { field: "num_fixtures" })?
            .div_ceil(100);
        (
            "Manifold (home-run)",
            hot_fixtures as f64 * run,
            fixtures as f64 * run,
            format!("Hot: {} fixtures needing hot x {} ft; cold: {} fixtures x {} ft", hot_fixtures, num(run), fixtures, num(run)),
        )
    } else {
        (
            "Trunk-and-branch",
            fixtures as f64 * 0.6 * run * 0.7,
            fixtures as f64 * run * 0.7,
            format!("Hot: {} x 0.6 x {} ft x 0.7; cold: {} x {} ft x 0.7", fixtures, num(run), fixtures, num(run)),
        )
    };

    let hot_needed = ceil_clean(with_margin(hot_raw, PEX_WASTE_PERCENT));
    let cold_needed = ceil_clean(with_margin(cold_raw, PEX_WASTE_PERCENT));
    let hot_buy = round_to_coil(hot_needed);
    let cold_buy = round_to_coil(cold_needed);
    let total = finite("avg_distance_per_fixture", hot_buy + cold_buy)?;

    Ok(Calculation {
        title: "PEX Pipe Calculation",
        quantity: total,
        unit: "ft",
        breakdown: vec![
            format!("System: {}", system),
            formula,
            format!("Raw runs: hot {} ft, cold {} ft", num(hot_raw), num(cold_raw)),
            format!("Waste margin: +{}% = hot {} ft, cold {} ft", PEX_WASTE_PERCENT, hot_needed, cold_needed),
            format!("Rounded to 100/300 ft coils: hot {} ft, cold {} ft", hot_buy, cold_buy),
        ],
        components: vec![
            Component {
                name: "hot_water_pipe",
                quantity: hot_buy,
                unit: "ft",
                size: "1/2 inch PEX, red".to_string(),
            },
            Component {
                name: "cold_water_pipe",
                quantity: cold_buy,
                unit: "ft",
                size: "1/2 inch PEX, blue".to_string(),
            },
        ],
        note: "Also budget for manifold, fittings, and crimp rings. Consider 3/4 inch for main lines.".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_wire_single_circuit_fifty_feet() {
        let calc = wire_needed(WireInput {
            circuit_length_feet: 50.0,
            num_circuits: 1,
        })
        .unwrap();
        assert_eq!(calc.quantity, 125.0);
        assert_eq!(calc.unit, "ft");
        assert!(calc.breakdown[0].contains("= 100 ft"));
        assert!(calc.breakdown[1].contains("+15% = 115 ft"));
    }

    #[test]
    fn test_wire_two_circuits() {
        let calc = wire_needed(WireInput {
            circuit_length_feet: 50.0,
            num_circuits: 2,
        })
        .unwrap();
        // 200 ft base, 230 ft with slack, 250 ft spool multiple
        assert_eq!(calc.quantity, 250.0);
    }

    #[test]
    fn test_wire_rejects_bad_input() {
        assert_eq!(
            wire_needed(WireInput {
                circuit_length_feet: 0.0,
                num_circuits: 1
            }),
            Err(CalcError::NonPositive {
                field: "circuit_length_feet",
                value: 0.0
            })
        );
        assert_eq!(
            wire_needed(WireInput {
                circuit_length_feet: 10.0,
                num_circuits: 0
            }),
            Err(CalcError::CountTooSmall {
                field: "num_circuits",
                value: 0
            })
        );
    }

    #[test]
    fn test_outlets_by_room() {
        let kitchen = outlets_needed(OutletInput {
            room_perimeter_feet: 48.0,
            room_type: RoomType::Kitchen,
        })
        .unwrap();
        assert_eq!(kitchen.quantity, 6.0);
        assert!(kitchen.breakdown.iter().any(|l| l.contains("NEC 210.52(C)(1)")));

        let living = outlets_needed(OutletInput {
            room_perimeter_feet: 60.0,
            room_type: RoomType::Living,
        })
        .unwrap();
        assert_eq!(living.quantity, 5.0);

        let bathroom = outlets_needed(OutletInput {
            room_perimeter_feet: 8.0,
            room_type: RoomType::Bathroom,
        })
        .unwrap();
        assert_eq!(bathroom.quantity, 1.0);

        let garage = outlets_needed(OutletInput {
            room_perimeter_feet: 60.0,
            room_type: RoomType::Garage,
        })
        .unwrap();
        assert_eq!(garage.quantity, 5.0);
        assert!(garage.breakdown.iter().any(|l| l.contains("NEC 210.52(A)(1)")));
    }

    #[test]
    fn test_tile_hundred_square_feet() {
        let calc = tile_needed(TileInput {
            area_sq_ft: 100.0,
            tile_width_inches: 12.0,
            tile_height_inches: 12.0,
        })
        .unwrap();
        assert!(calc.quantity >= 100.0);
        assert_eq!(calc.quantity, 110.0);
        assert_eq!(calc.unit, "sq ft");
        assert_eq!(calc.breakdown[0], "Raw area: 100 sq ft");
        assert!(calc.breakdown.iter().any(|l| l.contains("Waste margin: +10% = 110 tiles")));
        assert_eq!(calc.components[1].quantity, 11.0);
    }

    #[test]
    fn test_tile_rounds_up_to_full_cases() {
        let calc = tile_needed(TileInput {
            area_sq_ft: 120.0,
            tile_width_inches: 12.0,
            tile_height_inches: 12.0,
        })
        .unwrap();
        // 120 tiles + 10% = 132 -> 14 cases
        assert_eq!(calc.components[1].quantity, 14.0);
        assert_eq!(calc.quantity, 140.0);
    }

    #[test]
    fn test_paint_rounds_up_to_whole_gallons() {
        let calc = paint_needed(PaintInput {
            area_sq_ft: 400.0,
            coats: 2,
            coverage_per_gallon: PAINT_COVERAGE_SQ_FT,
        })
        .unwrap();
        assert_eq!(calc.quantity, 3.0);
        assert!(calc.breakdown[1].contains("2.29"));
    }

    #[test]
    fn test_deck_lumber_counts() {
        let calc = deck_lumber(DeckInput::standard(12.0, 16.0)).unwrap();
        let counts: Vec<f64> = calc.components.iter().map(|c| c.quantity).collect();
        assert_eq!(counts, vec![13.0, 27.0, 6.0]);
        assert_eq!(calc.quantity, 46.0);
    }

    #[test]
    fn test_deck_stock_is_cut_to_width() {
        let calc = deck_lumber(DeckInput::standard(12.0, 15.5)).unwrap();
        assert!(calc.components[0].size.starts_with("2x8x16 "));
        assert!(calc.components[1].size.starts_with("2x6x16 "));
    }

    #[test]
    fn test_pex_manifold_and_trunk() {
        let manifold = pex_pipe(PexInput {
            num_fixtures: 8,
            avg_distance_per_fixture: PEX_RUN_FEET,
            manifold_system: true,
        })
        .unwrap();
        // hot: 5 x 30 = 150 -> 180 -> 300; cold: 240 -> 288 -> 300
        assert_eq!(manifold.components[0].quantity, 300.0);
        assert_eq!(manifold.components[1].quantity, 300.0);
        assert_eq!(manifold.quantity, 600.0);

        let trunk = pex_pipe(PexInput {
            num_fixtures: 2,
            avg_distance_per_fixture: PEX_RUN_FEET,
            manifold_system: false,
        })
        .unwrap();
        assert_eq!(trunk.quantity, 200.0);
    }

    #[test]
    fn test_calculators_are_pure() {
        let input = TileInput {
            area_sq_ft: 87.3,
            tile_width_inches: 6.0,
            tile_height_inches: 24.0,
        };
        let first = tile_needed(input).unwrap();
        let second = tile_needed(input).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.quantity.to_bits(), second.quantity.to_bits());
    }

    #[test]
    fn test_negative_and_nan_dimensions_rejected() {
        assert!(tile_needed(TileInput {
            area_sq_ft: 10.0,
            tile_width_inches: -12.0,
            tile_height_inches: 12.0,
        })
        .is_err());
        assert!(paint_needed(PaintInput {
            area_sq_ft: f64::NAN,
            coats: 2,
            coverage_per_gallon: 350.0,
        })
        .is_err());
        assert!(deck_lumber(DeckInput::standard(12.0, 0.0)).is_err());
    }

    #[test]
    fn test_oversized_inputs_are_rejected_not_overflowed() {
        assert_eq!(
            pex_pipe(PexInput {
                num_fixtures: i64::MAX,
                avg_distance_per_fixture: PEX_RUN_FEET,
                manifold_system: true,
            }),
            Err(CalcError::OutOfRange { field: "num_fixtures" })
        );
        assert_eq!(
            tile_needed(TileInput {
                area_sq_ft: 1e16,
                tile_width_inches: 1.0,
                tile_height_inches: 1.0,
            }),
            Err(CalcError::OutOfRange { field: "area_sq_ft" })
        );
        assert_eq!(
            tile_needed(TileInput {
                area_sq_ft: 1e300,
                tile_width_inches: 1e-300,
                tile_height_inches: 1.0,
            }),
            Err(CalcError::OutOfRange { field: "area_sq_ft" })
        );
        assert_eq!(
            wire_needed(WireInput {
                circuit_length_feet: 1e308,
                num_circuits: 1,
            }),
            Err(CalcError::OutOfRange { field: "circuit_length_feet" })
        );
        assert_eq!(
            paint_needed(PaintInput {
                area_sq_ft: 1e308,
                coats: 2,
                coverage_per_gallon: PAINT_COVERAGE_SQ_FT,
            }),
            Err(CalcError::OutOfRange { field: "area_sq_ft" })
        );
        assert!(deck_lumber(DeckInput::standard(1e200, 1e200)).is_err());
        assert!(pex_pipe(PexInput {
            num_fixtures: 4,
            avg_distance_per_fixture: 1e308,
            manifold_system: false,
        })
        .is_err());
    }

    #[test]
    fn test_large_but_representable_tile_order() {
        let calc = tile_needed(TileInput {
            area_sq_ft: 1e6,
            tile_width_inches: 12.0,
            tile_height_inches: 12.0,
        })
        .unwrap();
        assert_eq!(calc.components[0].quantity, 1_100_000.0);
        assert!(calc.quantity.is_finite());
    }
}
