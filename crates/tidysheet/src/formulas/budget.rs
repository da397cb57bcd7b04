//! Segment sums for budget-style statements

use tidysheet_grid::{CellRange, Workbook, Worksheet};

use crate::args::Instruction;
use crate::cursor;
use crate::error::Result;
use crate::formulas::{FormulaGenerator, RowSegmentGenerator};
use crate::predicate;

/// Row-segment totals for budget layouts.
///
/// Budget statements interleave percentage columns with their dollar
/// columns, so the closing-row fill steps over percentage cells instead of
/// stopping there. These reports also sometimes render their year-to-date
/// header over a percentage column; after the segment pass the header is
/// moved right into the nearest column holding dollar values.
pub struct BudgetSegmentGenerator {
    segments: RowSegmentGenerator,
}

impl BudgetSegmentGenerator {
    pub fn new() -> Self {
        BudgetSegmentGenerator {
            segments: RowSegmentGenerator::new().with_pass_through(|ws, row, col| {
                predicate::is_percentage(&ws.display_text(row, col))
            }),
        }
    }
}

impl Default for BudgetSegmentGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl FormulaGenerator for BudgetSegmentGenerator {
    fn insert_formulas(
        &self,
        book: &mut Workbook,
        sheet: usize,
        args: &[Instruction],
    ) -> Result<()> {
        self.segments.insert_formulas(book, sheet, args)?;
        fix_ytd_header(book.worksheet_mut(sheet)?)
    }
}

/// Move a `YTD` header sitting over a percentage column into the nearest
/// dollar column to its right, style included
fn fix_ytd_header(ws: &mut Worksheet) -> Result<()> {
    let Some(bounds) = ws.dimension() else {
        return Ok(());
    };
    let source = cursor::first_matching(bounds, |c| ws.display_text(c.row, c.col) == "YTD");
    let Some(source) = source else {
        return Ok(());
    };
    if !column_has(ws, bounds, source.col, predicate::is_percentage) {
        return Ok(());
    }
    let dest = ((source.col + 1)..=bounds.end.col)
        .find(|&col| column_has(ws, bounds, col, predicate::is_dollar_value));
    match dest {
        Some(col) => ws.move_cell((source.row, source.col), (source.row, col))?,
        None => log::debug!("No dollar column right of the YTD header on sheet {}", ws.name()),
    }
    Ok(())
}

fn column_has(ws: &Worksheet, bounds: CellRange, col: u32, test: fn(&str) -> bool) -> bool {
    (bounds.start.row..=bounds.end.row).any(|row| test(&ws.display_text(row, col)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::parse_arguments;

    fn budget_sheet() -> Workbook {
        let mut book = Workbook::empty();
        let ws = book.add_worksheet("Budget").unwrap();
        ws.set_value(1, 1, "INCOME").unwrap();
        ws.set_value(2, 2, "$10.00").unwrap();
        ws.set_value(2, 3, "40.00%").unwrap();
        ws.set_value(2, 4, "$25.00").unwrap();
        ws.set_value(3, 1, "TOTAL INCOME").unwrap();
        ws.set_value(3, 2, "$10.00").unwrap();
        ws.set_value(3, 3, "40.00%").unwrap();
        ws.set_value(3, 4, "$25.00").unwrap();
        book
    }

    #[test]
    fn test_fill_steps_over_percentage_columns() {
        let mut book = budget_sheet();
        let args = parse_arguments(&["INCOME=TOTAL INCOME"]).unwrap();
        BudgetSegmentGenerator::new()
            .insert_formulas(&mut book, 0, &args)
            .unwrap();

        let ws = book.worksheet(0).unwrap();
        assert_eq!(ws.formula_text(3, 2), Some("SUM(B2:B2)"));
        assert_eq!(ws.formula_text(3, 4), Some("SUM(D2:D2)"));
        assert!(!ws.has_formula(3, 3));
    }

    #[test]
    fn test_ytd_header_moves_to_the_dollar_column() {
        let mut book = Workbook::empty();
        let ws = book.add_worksheet("Budget").unwrap();
        ws.set_value(1, 3, "YTD").unwrap();
        ws.modify_style(1, 3, |s| s.font.bold = true).unwrap();
        ws.set_value(2, 3, "12.00%").unwrap();
        ws.set_value(2, 4, "$10.00").unwrap();

        BudgetSegmentGenerator::new()
            .insert_formulas(&mut book, 0, &[])
            .unwrap();

        let ws = book.worksheet(0).unwrap();
        assert_eq!(ws.display_text(1, 4), "YTD");
        assert!(ws.style(1, 4).font.bold);
        assert!(!ws.is_populated(1, 3));
    }

    #[test]
    fn test_ytd_header_over_dollars_stays_put() {
        let mut book = Workbook::empty();
        let ws = book.add_worksheet("Budget").unwrap();
        ws.set_value(1, 4, "YTD").unwrap();
        ws.set_value(2, 4, "$10.00").unwrap();

        BudgetSegmentGenerator::new()
            .insert_formulas(&mut book, 0, &[])
            .unwrap();

        let ws = book.worksheet(0).unwrap();
        assert_eq!(ws.display_text(1, 4), "YTD");
    }

    #[test]
    fn test_missing_ytd_header_is_fine() {
        let mut book = budget_sheet();
        BudgetSegmentGenerator::new()
            .insert_formulas(&mut book, 0, &[])
            .unwrap();
        assert_eq!(book.worksheet(0).unwrap().display_text(1, 1), "INCOME");
    }
}
