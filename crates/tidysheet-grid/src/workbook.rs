//! Workbook: an ordered collection of worksheets

use crate::error::{Error, Result};
use crate::worksheet::Worksheet;
use crate::MAX_SHEET_NAME_LEN;

/// Characters a sheet name may not contain
const ILLEGAL_NAME_CHARS: &[char] = &['[', ']', ':', '*', '?', '/', '\\'];

/// An in-memory workbook
#[derive(Debug)]
pub struct Workbook {
    sheets: Vec<Worksheet>,
    active: usize,
}

impl Default for Workbook {
    fn default() -> Self {
        Self::new()
    }
}

impl Workbook {
    /// Create a workbook with a single empty "Sheet1"
    pub fn new() -> Self {
        Self {
            sheets: vec![Worksheet::new("Sheet1")],
            active: 0,
        }
    }

    /// Create a workbook with no worksheets
    pub fn empty() -> Self {
        Self {
            sheets: Vec::new(),
            active: 0,
        }
    }

    /// Number of worksheets
    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    /// True when the workbook has no worksheets
    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    /// Worksheet by position
    pub fn worksheet(&self, index: usize) -> Result<&Worksheet> {
        self.sheets
            .get(index)
            .ok_or(Error::SheetOutOfBounds(index))
    }

    /// Mutable worksheet by position
    pub fn worksheet_mut(&mut self, index: usize) -> Result<&mut Worksheet> {
        self.sheets
            .get_mut(index)
            .ok_or(Error::SheetOutOfBounds(index))
    }

    /// Worksheet by name
    pub fn worksheet_by_name(&self, name: &str) -> Result<&Worksheet> {
        self.sheets
            .iter()
            .find(|s| s.name() == name)
            .ok_or_else(|| Error::SheetNotFound(name.to_string()))
    }

    /// Mutable worksheet by name
    pub fn worksheet_by_name_mut(&mut self, name: &str) -> Result<&mut Worksheet> {
        self.sheets
            .iter_mut()
            .find(|s| s.name() == name)
            .ok_or_else(|| Error::SheetNotFound(name.to_string()))
    }

    /// Position of the named worksheet
    pub fn sheet_index(&self, name: &str) -> Option<usize> {
        self.sheets.iter().position(|s| s.name() == name)
    }

    fn validate_name(&self, name: &str) -> Result<()> {
        if name.is_empty() || name.chars().count() > MAX_SHEET_NAME_LEN {
            return Err(Error::InvalidSheetName(name.to_string()));
        }
        if name.contains(ILLEGAL_NAME_CHARS) {
            return Err(Error::InvalidSheetName(name.to_string()));
        }
        if self.sheets.iter().any(|s| s.name() == name) {
            return Err(Error::DuplicateSheetName(name.to_string()));
        }
        Ok(())
    }

    /// Append a new empty worksheet
    pub fn add_worksheet(&mut self, name: &str) -> Result<&mut Worksheet> {
        self.validate_name(name)?;
        self.sheets.push(Worksheet::new(name));
        let index = self.sheets.len() - 1;
        Ok(&mut self.sheets[index])
    }

    /// Remove a worksheet by position, returning it
    pub fn remove_worksheet(&mut self, index: usize) -> Result<Worksheet> {
        if index >= self.sheets.len() {
            return Err(Error::SheetOutOfBounds(index));
        }
        let sheet = self.sheets.remove(index);
        if self.active >= self.sheets.len() && self.active > 0 {
            self.active = self.sheets.len() - 1;
        }
        Ok(sheet)
    }

    /// Index of the active worksheet
    pub fn active_sheet(&self) -> usize {
        self.active
    }

    /// Set the active worksheet
    pub fn set_active_sheet(&mut self, index: usize) -> Result<()> {
        if index >= self.sheets.len() {
            return Err(Error::SheetOutOfBounds(index));
        }
        self.active = index;
        Ok(())
    }

    /// Iterate worksheets in order
    pub fn worksheets(&self) -> impl Iterator<Item = &Worksheet> {
        self.sheets.iter()
    }

    /// Iterate worksheets mutably
    pub fn worksheets_mut(&mut self) -> impl Iterator<Item = &mut Worksheet> {
        self.sheets.iter_mut()
    }
}
