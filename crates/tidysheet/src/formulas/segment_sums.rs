//! Segment totals for interiors that mix raw data with subtotal rows

use crate::formulas::{
    cell_ref, column_span_ref, sum_list, BuiltFormula, RowSegmentGenerator, SegmentFill,
};
use crate::predicate;

/// Segment totals that add only one side of the formula divide.
///
/// With `sum_non_formulas` set, totals cover the raw data cells and ignore
/// subtotals already carrying formulas; unset, they re-add only the
/// subtotal formulas. Array formulas express the choice as one conditional
/// SUM over the interior; otherwise each qualifying cell is listed.
pub fn sum_within_segment(use_array: bool, sum_non_formulas: bool) -> RowSegmentGenerator {
    RowSegmentGenerator::new().with_fill(conditional_sum(use_array, sum_non_formulas))
}

/// Totals for segments whose interiors hold one subtotal formula per period
pub fn sum_of_sums_periodic() -> RowSegmentGenerator {
    sum_within_segment(true, false)
}

fn conditional_sum(use_array: bool, sum_non_formulas: bool) -> SegmentFill {
    Box::new(move |ws, span, is_data| {
        if use_array {
            let range = column_span_ref(span.top, span.bottom, span.col);
            let formula = if sum_non_formulas {
                // ISFORMULA needs the _xlfn prefix in some spreadsheet builds.
                format!("SUM(IF(_xlfn.ISFORMULA({range}), 0, {range}))")
            } else {
                format!("SUM(IF(_xlfn.ISFORMULA({range}), {range}, 0))")
            };
            return BuiltFormula::Array(formula);
        }
        let refs: Vec<String> = (span.top..=span.bottom)
            .filter(|&row| {
                let has = predicate::has_formula(ws, row, span.col);
                if sum_non_formulas {
                    !has && is_data(ws, row, span.col)
                } else {
                    has
                }
            })
            .map(|row| cell_ref(row, span.col))
            .collect();
        BuiltFormula::Plain(sum_list(&refs))
    })
}
