//! Routing one argument list to several generators

use tidysheet_grid::Workbook;

use crate::args::Instruction;
use crate::error::{Error, Result};
use crate::formulas::FormulaGenerator;

/// Dispatches routed arguments to an ordered set of sub-generators.
///
/// Each argument carries a 1-based generator number; the inner instructions
/// are grouped per number and every sub-generator runs in order with its
/// own group, so one worksheet can receive formulas from several strategies
/// in a single pass.
pub struct MultiGenerator {
    generators: Vec<Box<dyn FormulaGenerator>>,
}

impl MultiGenerator {
    pub fn new() -> Self {
        MultiGenerator {
            generators: Vec::new(),
        }
    }

    /// Append a sub-generator; arguments numbered by its 1-based position
    /// are routed to it
    pub fn with(mut self, generator: impl FormulaGenerator + 'static) -> Self {
        self.generators.push(Box::new(generator));
        self
    }

    fn group_arguments(&self, args: &[Instruction]) -> Result<Vec<Vec<Instruction>>> {
        let mut groups: Vec<Vec<Instruction>> = vec![Vec::new(); self.generators.len()];
        for arg in args {
            // Unrouted arguments belong to a later pass, usually the
            // summary-row sweep over non-contiguous references.
            let Instruction::Routed { generator, inner } = arg else {
                log::debug!("Argument {arg:?} carries no generator number, leaving it alone");
                continue;
            };
            let slot = generator
                .checked_sub(1)
                .and_then(|i| groups.get_mut(i))
                .ok_or_else(|| {
                    Error::MalformedArgument(format!("no generator numbered {generator}"))
                })?;
            slot.push((**inner).clone());
        }
        Ok(groups)
    }
}

impl Default for MultiGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl FormulaGenerator for MultiGenerator {
    fn insert_formulas(
        &self,
        book: &mut Workbook,
        sheet: usize,
        args: &[Instruction],
    ) -> Result<()> {
        let groups = self.group_arguments(args)?;
        for (generator, group) in self.generators.iter().zip(&groups) {
            generator.insert_formulas(book, sheet, group)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::parse_routed_arguments;
    use crate::formulas::{FullTableGenerator, FullTableSummaryColumn};

    fn monthly_sheet() -> Workbook {
        let mut book = Workbook::empty();
        let ws = book.add_worksheet("Monthly").unwrap();
        ws.set_value(1, 2, "Jan").unwrap();
        ws.set_value(1, 3, "Total").unwrap();
        ws.set_value(2, 2, "$1.00").unwrap();
        ws.set_value(2, 3, "$1.00").unwrap();
        ws.set_value(3, 2, "$2.00").unwrap();
        ws.set_value(3, 3, "$2.00").unwrap();
        ws.set_value(4, 1, "Total Income").unwrap();
        ws.set_value(4, 2, "$3.00").unwrap();
        ws.set_value(4, 3, "$3.00").unwrap();
        book
    }

    #[test]
    fn test_each_group_reaches_its_own_generator() {
        let mut book = monthly_sheet();
        let args = parse_routed_arguments(&["1Total", "2Total Income"]).unwrap();
        MultiGenerator::new()
            .with(FullTableSummaryColumn::new())
            .with(FullTableGenerator::new())
            .insert_formulas(&mut book, 0, &args)
            .unwrap();

        let ws = book.worksheet(0).unwrap();
        // The summary column ran first across rows 2-4.
        assert_eq!(ws.formula_text(2, 3), Some("SUM(B2:B2)"));
        assert_eq!(ws.formula_text(3, 3), Some("SUM(B3:B3)"));
        // The full-table pass then claimed the total row, last writer wins.
        assert_eq!(ws.formula_text(4, 2), Some("SUM(B2:B3)"));
        assert_eq!(ws.formula_text(4, 3), Some("SUM(C2:C3)"));
    }

    #[test]
    fn test_out_of_range_generator_number_is_rejected() {
        let mut book = monthly_sheet();
        let args = parse_routed_arguments(&["3Total"]).unwrap();
        let outcome = MultiGenerator::new()
            .with(FullTableSummaryColumn::new())
            .with(FullTableGenerator::new())
            .insert_formulas(&mut book, 0, &args);
        assert!(matches!(outcome, Err(Error::MalformedArgument(_))));
    }

    #[test]
    fn test_unrouted_argument_is_left_for_other_passes() {
        let mut book = monthly_sheet();
        let args =
            crate::args::parse_mixed_arguments(&["2Total Income", "Net~Total Income"]).unwrap();
        MultiGenerator::new()
            .with(FullTableSummaryColumn::new())
            .with(FullTableGenerator::new())
            .insert_formulas(&mut book, 0, &args)
            .unwrap();

        let ws = book.worksheet(0).unwrap();
        // The routed anchor reached the full-table pass, the summary
        // reference reached nobody.
        assert_eq!(ws.formula_text(4, 2), Some("SUM(B2:B3)"));
        assert_eq!(ws.formula_text(2, 3), None);
    }
}
