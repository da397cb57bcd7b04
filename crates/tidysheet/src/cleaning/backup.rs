//! The fallback cleaner for nonstandard layouts

use tidysheet_grid::{CellRange, Worksheet};

use super::{find_first_table_row, Finishing, MergeCleaner};
use crate::error::Result;

/// Cleans sheets whose layout the standard cleaner rejects
///
/// Makes no structural assumptions: merges are dissolved anchor first,
/// columns are never deleted, and sizing only ever grows. This cleaner
/// never reports [`InvalidLayout`](crate::error::Error::InvalidLayout), so
/// it is the safe last resort for any sheet.
pub struct BackupMergeCleaner {
    finishing: Finishing,
}

impl BackupMergeCleaner {
    pub fn new() -> Self {
        Self {
            finishing: Finishing::default(),
        }
    }

    /// Set whether major headers get moved into column 1
    pub fn move_major_headers(mut self, move_them: bool) -> Self {
        self.finishing.move_major_headers = move_them;
        self
    }

    /// Register an extra cleanup job to run after the structural work
    pub fn with_job<J>(mut self, job: J) -> Self
    where
        J: Fn(&mut Worksheet) -> Result<()> + Send + Sync + 'static,
    {
        self.finishing.jobs.push(Box::new(job));
        self
    }

    /// Unhide the columns each merge spanned and widen its anchor column
    /// enough to show the whole value the merge was displaying
    fn restore_space(&self, ws: &mut Worksheet, regions: &[CellRange]) {
        for range in regions {
            if range.col_count() < 2 {
                continue;
            }
            let mut spanned_width = 0.0;
            for col in range.start.col..=range.end.col {
                if ws.is_column_hidden(col) {
                    ws.set_column_hidden(col, false);
                }
                spanned_width += ws.column_width(col);
            }
            if ws.column_width(range.start.col) < spanned_width {
                ws.set_column_width(range.start.col, spanned_width);
            }
        }
    }
}

impl Default for BackupMergeCleaner {
    fn default() -> Self {
        Self::new()
    }
}

impl MergeCleaner for BackupMergeCleaner {
    fn unmerge(&self, ws: &mut Worksheet) -> Result<()> {
        let regions = ws.merged_regions().to_vec();
        for range in &regions {
            ws.unmerge_cells(range);
        }
        self.restore_space(ws, &regions);
        // Header and border passes only run when a table row is recognizable.
        let first_table_row = find_first_table_row(ws);
        self.finishing.run(ws, first_table_row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tidysheet_grid::Workbook;

    #[test]
    fn test_odd_layout_cleans_without_error() {
        let mut book = Workbook::empty();
        let ws = book.add_worksheet("Summary").unwrap();
        ws.set_value(1, 1, "Quarterly Summary").unwrap();
        ws.set_value(3, 1, "All figures preliminary").unwrap();
        ws.merge_cells(CellRange::from_coords(1, 1, 2, 1)).unwrap();

        BackupMergeCleaner::new().unmerge(ws).unwrap();

        assert!(ws.merged_regions().is_empty());
        assert_eq!(ws.display_text(1, 1), "Quarterly Summary");
    }

    #[test]
    fn test_wide_merge_leaves_room_for_its_text() {
        let mut book = Workbook::empty();
        let ws = book.add_worksheet("Report").unwrap();
        ws.set_value(1, 1, "A Very Long Property Name").unwrap();
        ws.merge_cells(CellRange::from_coords(1, 1, 1, 3)).unwrap();
        ws.set_column_width(1, 8.0);
        ws.set_column_width(2, 8.0);
        ws.set_column_width(3, 8.0);
        ws.set_column_hidden(2, true);

        BackupMergeCleaner::new().unmerge(ws).unwrap();

        assert!(!ws.is_column_hidden(2));
        assert!((ws.column_width(1) - 24.0).abs() < 1e-9);
    }

    #[test]
    fn test_columns_are_never_deleted() {
        let mut book = Workbook::empty();
        let ws = book.add_worksheet("Report").unwrap();
        ws.set_value(1, 1, "Account").unwrap();
        ws.set_value(1, 3, "Total").unwrap();
        ws.set_value(2, 1, "Rent").unwrap();
        ws.set_value(2, 3, "$75.00").unwrap();

        BackupMergeCleaner::new().unmerge(ws).unwrap();

        assert_eq!(ws.display_text(1, 3), "Total");
        assert_eq!(ws.dimension().unwrap().end.col, 3);
    }

    #[test]
    fn test_jobs_run_even_without_a_table() {
        let mut book = Workbook::empty();
        let ws = book.add_worksheet("Notes").unwrap();
        ws.set_value(1, 1, "Nothing tabular here").unwrap();

        BackupMergeCleaner::new()
            .with_job(|ws| {
                ws.set_value(5, 1, "ran")?;
                Ok(())
            })
            .unmerge(ws)
            .unwrap();

        assert_eq!(ws.display_text(5, 1), "ran");
    }

    #[test]
    fn test_backup_moves_major_headers() {
        let mut book = Workbook::empty();
        let ws = book.add_worksheet("Report").unwrap();
        ws.set_value(1, 2, "Company Name").unwrap();
        ws.set_value(3, 1, "Account").unwrap();
        ws.set_value(3, 2, "Total").unwrap();

        BackupMergeCleaner::new().unmerge(ws).unwrap();

        assert_eq!(ws.display_text(1, 1), "Company Name");
        assert!(!ws.is_populated(1, 2));
    }
}
