//! The standard-layout cleaner

use tidysheet_grid::{CellRange, Worksheet, DEFAULT_COLUMN_WIDTH, DEFAULT_ROW_HEIGHT};

use super::{
    classify_merge, dollar_or_formula, find_first_table_row, split_header_into_rows,
    BorderRemoval, Finishing, MergeCleaner, MergeType,
};
use crate::error::{Error, Result};
use crate::predicate::CellTest;

/// Cleans reports that follow the standard layout: major headers above a
/// single data table
///
/// The table is located by its first row holding two or more populated
/// cells; a sheet without one is rejected with [`Error::InvalidLayout`] so
/// the caller can fall back to [`BackupMergeCleaner`](super::BackupMergeCleaner).
pub struct PrimaryMergeCleaner {
    pub(crate) data_test: CellTest,
    pub(crate) finishing: Finishing,
}

impl PrimaryMergeCleaner {
    pub fn new() -> Self {
        Self {
            data_test: dollar_or_formula(),
            finishing: Finishing::default(),
        }
    }

    /// Replace the test deciding which merges hold data
    pub fn with_data_test(mut self, test: CellTest) -> Self {
        self.data_test = test;
        self
    }

    /// Set whether major headers get moved into column 1
    pub fn move_major_headers(mut self, move_them: bool) -> Self {
        self.finishing.move_major_headers = move_them;
        self
    }

    /// Change which borders the finishing pass strips
    pub fn border_removal(mut self, mode: BorderRemoval) -> Self {
        self.finishing.border_removal = mode;
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

    pub(crate) fn find_table(&self, ws: &Worksheet) -> Result<u32> {
        find_first_table_row(ws).ok_or_else(|| {
            Error::InvalidLayout(format!(
                "no row of sheet {} holds two or more populated cells",
                ws.name()
            ))
        })
    }

    /// Dissolve every merged region, classifying each before it goes
    ///
    /// The anchor keeps the merged value and style; shadow cells come back
    /// empty.
    pub(crate) fn unmerge_regions(
        &self,
        ws: &mut Worksheet,
        first_table_row: u32,
    ) -> Vec<(CellRange, MergeType)> {
        let regions = ws.merged_regions().to_vec();
        let mut records = Vec::with_capacity(regions.len());
        for range in regions {
            let kind = classify_merge(ws, &range, first_table_row, &self.data_test);
            ws.unmerge_cells(&range);
            records.push((range, kind));
        }
        records
    }

    /// Split main headers holding newlines into one row per line
    ///
    /// Works bottom up so an insert never shifts a split still to come, and
    /// keeps the recorded ranges and the table row in step with the moves.
    pub(crate) fn split_multiline_headers(
        &self,
        ws: &mut Worksheet,
        records: &mut [(CellRange, MergeType)],
        first_table_row: &mut u32,
    ) -> Result<()> {
        let mut anchors: Vec<(u32, u32)> = records
            .iter()
            .filter(|(_, kind)| *kind == MergeType::MainHeader)
            .map(|(range, _)| (range.start.row, range.start.col))
            .collect();
        anchors.sort_by(|a, b| b.cmp(a));
        for (row, col) in anchors {
            let inserted = split_header_into_rows(ws, row, col)?;
            if inserted == 0 {
                continue;
            }
            *first_table_row += inserted;
            for (range, _) in records.iter_mut() {
                if range.start.row > row {
                    range.start.row += inserted;
                    range.end.row += inserted;
                }
            }
        }
        Ok(())
    }

    /// Give squeezed rows and columns their space back
    ///
    /// Columns holding data are unhidden and widened to at least the
    /// default; rows a dissolved vertical merge spanned get at least the
    /// default height.
    pub(crate) fn resize_cells(
        &self,
        ws: &mut Worksheet,
        first_table_row: u32,
        records: &[(CellRange, MergeType)],
    ) {
        let Some(bounds) = ws.dimension() else {
            return;
        };
        for col in bounds.start.col..=bounds.end.col {
            let holds_data =
                (first_table_row..=bounds.end.row).any(|row| (self.data_test)(ws, row, col));
            if !holds_data {
                continue;
            }
            if ws.is_column_hidden(col) {
                ws.set_column_hidden(col, false);
            }
            if ws.column_width(col) < DEFAULT_COLUMN_WIDTH {
                ws.set_column_width(col, DEFAULT_COLUMN_WIDTH);
            }
        }
        for (range, kind) in records {
            if *kind == MergeType::MainHeader || range.row_count() < 2 {
                continue;
            }
            for row in range.start.row..=range.end.row {
                if ws.row_height(row) < DEFAULT_ROW_HEIGHT {
                    ws.set_row_height(row, DEFAULT_ROW_HEIGHT);
                }
            }
        }
    }

    /// Drop interior columns the unmerging left with no content at all
    pub(crate) fn delete_empty_columns(&self, ws: &mut Worksheet) -> Result<()> {
        let Some(bounds) = ws.dimension() else {
            return Ok(());
        };
        let populated: Vec<u32> = (bounds.start.col..=bounds.end.col)
            .filter(|&col| (bounds.start.row..=bounds.end.row).any(|row| ws.is_populated(row, col)))
            .collect();
        let (Some(&first), Some(&last)) = (populated.first(), populated.last()) else {
            return Ok(());
        };
        for col in (first + 1..last).rev() {
            if !populated.contains(&col) {
                log::debug!("Deleting empty column {col}");
                ws.delete_column(col)?;
            }
        }
        Ok(())
    }
}

impl Default for PrimaryMergeCleaner {
    fn default() -> Self {
        Self::new()
    }
}

impl MergeCleaner for PrimaryMergeCleaner {
    fn unmerge(&self, ws: &mut Worksheet) -> Result<()> {
        let mut first_table_row = self.find_table(ws)?;
        let mut records = self.unmerge_regions(ws, first_table_row);
        self.split_multiline_headers(ws, &mut records, &mut first_table_row)?;
        self.resize_cells(ws, first_table_row, &records);
        self.delete_empty_columns(ws)?;
        self.finishing.run(ws, Some(first_table_row))
    }
}
