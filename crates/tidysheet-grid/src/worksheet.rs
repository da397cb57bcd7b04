//! Worksheet: one named grid of cells plus styles and structure

use crate::cell::{CellData, CellRange, CellStorage, CellValue};
use crate::display;
use crate::error::{Error, Result};
use crate::style::{Style, StylePool};
use crate::{MAX_COLS, MAX_ROWS};

/// A single worksheet
///
/// Cells are addressed by 1-based (row, col). Empty, default-styled cells are
/// not stored; `dimension()` reports the rectangle covering everything that
/// is.
#[derive(Debug)]
pub struct Worksheet {
    name: String,
    storage: CellStorage,
    styles: StylePool,
    freeze_panes: Option<(u32, u32)>,
}

impl Worksheet {
    /// Create an empty worksheet
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            storage: CellStorage::new(),
            styles: StylePool::new(),
            freeze_panes: None,
        }
    }

    /// The worksheet's name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the worksheet (workbook-level uniqueness is the workbook's job)
    pub fn set_name<S: Into<String>>(&mut self, name: S) {
        self.name = name.into();
    }

    fn check_position(row: u32, col: u32) -> Result<()> {
        if row == 0 || row > MAX_ROWS {
            return Err(Error::RowOutOfBounds { row, max: MAX_ROWS });
        }
        if col == 0 || col > MAX_COLS {
            return Err(Error::ColumnOutOfBounds { col, max: MAX_COLS });
        }
        Ok(())
    }

    // ---- values ----

    /// The stored cell at (row, col), if any
    pub fn cell(&self, row: u32, col: u32) -> Option<&CellData> {
        self.storage.cell(row, col)
    }

    /// The cell's value, `Empty` when nothing is stored
    pub fn value(&self, row: u32, col: u32) -> CellValue {
        self.storage
            .cell(row, col)
            .map(|c| c.value.clone())
            .unwrap_or(CellValue::Empty)
    }

    /// Set a cell's value, keeping its style
    pub fn set_value<V: Into<CellValue>>(&mut self, row: u32, col: u32, value: V) -> Result<()> {
        Self::check_position(row, col)?;
        let style_index = self.storage.cell(row, col).map_or(0, |c| c.style_index);
        self.storage
            .set_cell(row, col, CellData::with_style(value.into(), style_index));
        self.storage.set_array_flag(row, col, false);
        Ok(())
    }

    /// Clear a cell's value, keeping its style
    pub fn clear_value(&mut self, row: u32, col: u32) {
        let style_index = self.storage.cell(row, col).map_or(0, |c| c.style_index);
        self.storage
            .set_cell(row, col, CellData::with_style(CellValue::Empty, style_index));
        self.storage.set_array_flag(row, col, false);
    }

    /// Remove a cell entirely (value and style)
    pub fn remove_cell(&mut self, row: u32, col: u32) {
        self.storage.remove_cell(row, col);
        self.storage.set_array_flag(row, col, false);
    }

    /// True when the cell holds a non-empty value
    pub fn is_populated(&self, row: u32, col: u32) -> bool {
        self.storage.is_populated(row, col)
    }

    /// Set a formula, preserving the displaced value as the cached result
    ///
    /// A leading `=` is accepted and stripped. The previous static value (or
    /// a previous formula's cached value) stays visible as display text, the
    /// way a spreadsheet shows the last computed value until recalculation.
    pub fn set_formula(&mut self, row: u32, col: u32, formula: &str) -> Result<()> {
        Self::check_position(row, col)?;
        let text = formula.strip_prefix('=').unwrap_or(formula).to_string();
        let prior = self.value(row, col);
        let cached = match prior {
            CellValue::Empty => None,
            CellValue::Formula { cached, .. } => cached,
            other => Some(Box::new(other)),
        };
        let style_index = self.storage.cell(row, col).map_or(0, |c| c.style_index);
        self.storage.set_cell(
            row,
            col,
            CellData::with_style(CellValue::Formula { text, cached }, style_index),
        );
        Ok(())
    }

    /// Set an array formula, replacing any existing value
    ///
    /// Array formulas are stored like plain formulas but flagged so writers
    /// can emit them correctly.
    pub fn set_array_formula(&mut self, row: u32, col: u32, formula: &str) -> Result<()> {
        self.set_formula(row, col, formula)?;
        self.storage.set_array_flag(row, col, true);
        Ok(())
    }

    /// True when the cell's formula was entered as an array formula
    pub fn is_array_formula(&self, row: u32, col: u32) -> bool {
        self.storage.is_array_formula(row, col)
    }

    /// Formula text of a cell, if it holds one
    pub fn formula_text(&self, row: u32, col: u32) -> Option<&str> {
        self.storage.cell(row, col)?.value.formula_text()
    }

    /// True when the cell holds a formula
    pub fn has_formula(&self, row: u32, col: u32) -> bool {
        self.formula_text(row, col).is_some()
    }

    /// The text a spreadsheet application would display for this cell
    pub fn display_text(&self, row: u32, col: u32) -> String {
        match self.storage.cell(row, col) {
            Some(cell) => {
                let format = &self.style(row, col).number_format;
                display::display_text(&cell.value, format)
            }
            None => String::new(),
        }
    }

    // ---- styles ----

    /// The cell's style (the default style when none is set)
    pub fn style(&self, row: u32, col: u32) -> &Style {
        let index = self.storage.cell(row, col).map_or(0, |c| c.style_index);
        match self.styles.get(index) {
            Some(style) => style,
            None => self.styles.default_style(),
        }
    }

    /// Replace the cell's style
    pub fn set_style(&mut self, row: u32, col: u32, style: Style) -> Result<()> {
        Self::check_position(row, col)?;
        let index = self.styles.get_or_insert(style);
        let value = self.value(row, col);
        self.storage
            .set_cell(row, col, CellData::with_style(value, index));
        Ok(())
    }

    /// Update the cell's style in place
    pub fn modify_style<F>(&mut self, row: u32, col: u32, f: F) -> Result<()>
    where
        F: FnOnce(&mut Style),
    {
        let mut style = self.style(row, col).clone();
        f(&mut style);
        self.set_style(row, col, style)
    }

    /// Copy one cell's style onto another cell
    pub fn copy_style(&mut self, from: (u32, u32), to: (u32, u32)) -> Result<()> {
        Self::check_position(to.0, to.1)?;
        let index = self.storage.cell(from.0, from.1).map_or(0, |c| c.style_index);
        let value = self.value(to.0, to.1);
        self.storage
            .set_cell(to.0, to.1, CellData::with_style(value, index));
        Ok(())
    }

    /// Move a cell's value and style, clearing the source
    pub fn move_cell(&mut self, from: (u32, u32), to: (u32, u32)) -> Result<()> {
        Self::check_position(to.0, to.1)?;
        let data = self
            .storage
            .cell(from.0, from.1)
            .cloned()
            .unwrap_or_default();
        self.storage.set_cell(to.0, to.1, data);
        self.storage.remove_cell(from.0, from.1);
        let array = self.storage.is_array_formula(from.0, from.1);
        self.storage.set_array_flag(to.0, to.1, array);
        self.storage.set_array_flag(from.0, from.1, false);
        Ok(())
    }

    // ---- extent ----

    /// Smallest rectangle covering every stored cell; `None` when empty
    pub fn dimension(&self) -> Option<CellRange> {
        self.storage.used_bounds()
    }

    /// Iterate stored cells in row-major order
    pub fn iter_cells(&self) -> impl Iterator<Item = (u32, u32, &CellData)> {
        self.storage.iter()
    }

    // ---- row / column structure ----

    /// Row height in points
    pub fn row_height(&self, row: u32) -> f64 {
        self.storage.row_height(row)
    }

    /// Set a row's height
    pub fn set_row_height(&mut self, row: u32, height: f64) {
        self.storage.set_row_height(row, height);
    }

    /// True when the row is hidden
    pub fn is_row_hidden(&self, row: u32) -> bool {
        self.storage.is_row_hidden(row)
    }

    /// Hide or show a row
    pub fn set_row_hidden(&mut self, row: u32, hidden: bool) {
        self.storage.set_row_hidden(row, hidden);
    }

    /// Outline (grouping) level of a row
    pub fn row_outline_level(&self, row: u32) -> u8 {
        self.storage.row_outline_level(row)
    }

    /// Set a row's outline level (0 = ungrouped)
    pub fn set_row_outline_level(&mut self, row: u32, level: u8) {
        self.storage.set_row_outline_level(row, level);
    }

    /// Rows with a non-zero outline level
    pub fn outlined_rows(&self) -> Vec<u32> {
        self.storage.outlined_rows()
    }

    /// Column width in characters
    pub fn column_width(&self, col: u32) -> f64 {
        self.storage.column_width(col)
    }

    /// Set a column's width
    pub fn set_column_width(&mut self, col: u32, width: f64) {
        self.storage.set_column_width(col, width);
    }

    /// True when the column is hidden
    pub fn is_column_hidden(&self, col: u32) -> bool {
        self.storage.is_column_hidden(col)
    }

    /// Hide or show a column
    pub fn set_column_hidden(&mut self, col: u32, hidden: bool) {
        self.storage.set_column_hidden(col, hidden);
    }

    /// Delete a row, shifting later rows up
    pub fn delete_row(&mut self, row: u32) -> Result<()> {
        if row == 0 {
            return Err(Error::RowOutOfBounds { row, max: MAX_ROWS });
        }
        self.storage.delete_row(row);
        Ok(())
    }

    /// Delete a column, shifting later columns left
    pub fn delete_column(&mut self, col: u32) -> Result<()> {
        if col == 0 {
            return Err(Error::ColumnOutOfBounds { col, max: MAX_COLS });
        }
        self.storage.delete_column(col);
        Ok(())
    }

    /// Insert an empty row before `row`
    pub fn insert_row(&mut self, row: u32) -> Result<()> {
        if row == 0 {
            return Err(Error::RowOutOfBounds { row, max: MAX_ROWS });
        }
        self.storage.insert_row(row);
        Ok(())
    }

    // ---- merged regions ----

    /// All merged regions
    pub fn merged_regions(&self) -> &[CellRange] {
        self.storage.merged_regions()
    }

    /// Merge a range; non-anchor values are cleared (merge shadows are empty)
    pub fn merge_cells(&mut self, range: CellRange) -> Result<()> {
        Self::check_position(range.end.row, range.end.col)?;
        if range.is_single_cell() {
            return Err(Error::InvalidRange(range.to_string()));
        }
        if let Some(existing) = self
            .storage
            .merged_regions()
            .iter()
            .find(|m| m.overlaps(&range))
        {
            return Err(Error::MergedCellConflict(format!(
                "{} overlaps {}",
                range, existing
            )));
        }
        for (row, col) in range.cells() {
            if (row, col) != (range.start.row, range.start.col) {
                self.clear_value(row, col);
            }
        }
        self.storage.add_merge(range);
        Ok(())
    }

    /// Remove a merged region, leaving cell contents as they are
    pub fn unmerge_cells(&mut self, range: &CellRange) -> bool {
        self.storage.remove_merge(range)
    }

    /// The merged region containing (row, col), if any
    pub fn merge_at(&self, row: u32, col: u32) -> Option<CellRange> {
        self.storage.merge_containing(row, col)
    }

    // ---- hyperlinks ----

    /// Hyperlink target of a cell
    pub fn hyperlink(&self, row: u32, col: u32) -> Option<&str> {
        self.storage.hyperlink(row, col)
    }

    /// Attach a hyperlink to a cell
    pub fn set_hyperlink<S: Into<String>>(&mut self, row: u32, col: u32, url: S) -> Result<()> {
        Self::check_position(row, col)?;
        self.storage.set_hyperlink(row, col, url.into());
        Ok(())
    }

    /// Remove a cell's hyperlink
    pub fn remove_hyperlink(&mut self, row: u32, col: u32) -> Option<String> {
        self.storage.remove_hyperlink(row, col)
    }

    /// Cells carrying hyperlinks
    pub fn hyperlink_cells(&self) -> Vec<(u32, u32)> {
        self.storage.hyperlink_cells()
    }

    // ---- ignored-error flags ----

    /// Flag a cell as intentionally holding a number as text
    pub fn flag_number_as_text(&mut self, row: u32, col: u32) {
        self.storage.flag_number_as_text(row, col);
    }

    /// True when the cell carries the number-as-text flag
    pub fn is_number_as_text(&self, row: u32, col: u32) -> bool {
        self.storage.is_number_as_text(row, col)
    }

    // ---- panes ----

    /// Frozen panes as (rows frozen above, cols frozen left), if set
    pub fn freeze_panes(&self) -> Option<(u32, u32)> {
        self.freeze_panes
    }

    /// Set or clear frozen panes
    pub fn set_freeze_panes(&mut self, panes: Option<(u32, u32)>) {
        self.freeze_panes = panes;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{HorizontalAlignment, FORMAT_CURRENCY_CENTS};

    #[test]
    fn test_set_and_get_value() {
        let mut sheet = Worksheet::new("Sheet1");
        sheet.set_value(1, 1, "Income").unwrap();
        sheet.set_value(2, 1, 100.0).unwrap();

        assert_eq!(sheet.value(1, 1).as_text(), Some("Income"));
        assert_eq!(sheet.value(2, 1).as_number(), Some(100.0));
        assert_eq!(sheet.value(3, 1), CellValue::Empty);
    }

    #[test]
    fn test_dimension_tracks_extent() {
        let mut sheet = Worksheet::new("Sheet1");
        assert!(sheet.dimension().is_none());

        sheet.set_value(2, 2, "x").unwrap();
        sheet.set_value(5, 4, "y").unwrap();
        assert_eq!(sheet.dimension(), Some(CellRange::from_coords(2, 2, 5, 4)));
    }

    #[test]
    fn test_formula_preserves_cached_value() {
        let mut sheet = Worksheet::new("Sheet1");
        sheet.set_value(4, 2, 300.0).unwrap();
        sheet
            .modify_style(4, 2, |s| {
                s.number_format = crate::style::NumberFormat::custom(FORMAT_CURRENCY_CENTS)
            })
            .unwrap();

        sheet.set_formula(4, 2, "=SUM(B2:B3)").unwrap();
        assert_eq!(sheet.formula_text(4, 2), Some("SUM(B2:B3)"));
        // the displaced static value still renders
        assert_eq!(sheet.display_text(4, 2), "$300.00");
    }

    #[test]
    fn test_array_formula_flag() {
        let mut sheet = Worksheet::new("Sheet1");
        sheet
            .set_array_formula(6, 2, "SUM(IF(_xlfn.ISFORMULA(B2:B5), 0, B2:B5))")
            .unwrap();
        assert!(sheet.is_array_formula(6, 2));
        assert!(sheet.has_formula(6, 2));

        sheet.set_value(6, 2, 10.0).unwrap();
        assert!(!sheet.is_array_formula(6, 2));
    }

    #[test]
    fn test_modify_style() {
        let mut sheet = Worksheet::new("Sheet1");
        sheet.set_value(1, 1, "Header").unwrap();
        sheet
            .modify_style(1, 1, |s| {
                s.font.bold = true;
                s.alignment.horizontal = HorizontalAlignment::Left;
            })
            .unwrap();

        let style = sheet.style(1, 1);
        assert!(style.font.bold);
        assert_eq!(style.alignment.horizontal, HorizontalAlignment::Left);
    }

    #[test]
    fn test_merge_clears_shadows_and_rejects_overlap() {
        let mut sheet = Worksheet::new("Sheet1");
        sheet.set_value(1, 1, "Title").unwrap();
        sheet.set_value(1, 2, "stray").unwrap();

        sheet.merge_cells(CellRange::from_coords(1, 1, 1, 3)).unwrap();
        assert_eq!(sheet.value(1, 1).as_text(), Some("Title"));
        assert!(!sheet.is_populated(1, 2));

        let overlap = sheet.merge_cells(CellRange::from_coords(1, 2, 2, 2));
        assert!(matches!(overlap, Err(Error::MergedCellConflict(_))));

        assert!(sheet.unmerge_cells(&CellRange::from_coords(1, 1, 1, 3)));
        assert!(sheet.merged_regions().is_empty());
    }

    #[test]
    fn test_move_cell() {
        let mut sheet = Worksheet::new("Sheet1");
        sheet.set_value(3, 3, "stray").unwrap();
        sheet.modify_style(3, 3, |s| s.font.bold = true).unwrap();

        sheet.move_cell((3, 3), (3, 1)).unwrap();
        assert_eq!(sheet.value(3, 1).as_text(), Some("stray"));
        assert!(sheet.style(3, 1).font.bold);
        assert!(!sheet.is_populated(3, 3));
    }

    #[test]
    fn test_delete_row_through_worksheet() {
        let mut sheet = Worksheet::new("Sheet1");
        sheet.set_value(1, 1, "a").unwrap();
        sheet.set_value(2, 1, "b").unwrap();
        sheet.set_value(3, 1, "c").unwrap();

        sheet.delete_row(2).unwrap();
        assert_eq!(sheet.value(2, 1).as_text(), Some("c"));
        assert_eq!(sheet.dimension(), Some(CellRange::from_coords(1, 1, 2, 1)));
    }

    #[test]
    fn test_out_of_bounds_rejected() {
        let mut sheet = Worksheet::new("Sheet1");
        assert!(sheet.set_value(0, 1, "x").is_err());
        assert!(sheet.set_value(1, 0, "x").is_err());
        assert!(sheet.set_value(1, MAX_COLS + 1, "x").is_err());
    }
}
