//! Report configuration registry
//!
//! Maps a report name, and optionally one of its sheets, to the cleaner and
//! formula plan suited to its layout. Built once at startup; the pipeline
//! and formula entry points only read it. Reports nobody registered get a
//! default config: the primary cleaner, no formulas, no summary-cell move.

use ahash::AHashMap;
use tidysheet_grid::Workbook;

use crate::args::{self, Instruction};
use crate::cleaning::{MergeCleaner, PrimaryMergeCleaner};
use crate::error::Result;
use crate::formulas::FormulaGenerator;

/// Lookup key naming the report a workbook came from
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReportIdentity {
    pub name: String,
    pub version: Option<String>,
}

impl ReportIdentity {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }
}

/// Cleaner strategy slot
pub type CleanerChoice = Box<dyn MergeCleaner>;

/// Derives an argument list from the workbook right before formulas go in
pub type ArgumentFn = Box<dyn Fn(&Workbook, usize) -> Result<Vec<Instruction>> + Send + Sync>;

/// Argument list for a formula plan
pub enum Arguments {
    /// Fixed list, parsed at registration
    Static(Vec<Instruction>),
    /// Read off the workbook at dispatch time
    Derived(ArgumentFn),
}

/// A formula generator paired with the arguments it runs on
///
/// A plan with no generator still feeds its arguments to the summary-row
/// pass, for reports whose only formulas are non-contiguous summaries.
pub struct FormulaPlan {
    pub generator: Option<Box<dyn FormulaGenerator>>,
    pub args: Arguments,
}

impl FormulaPlan {
    /// The instructions to hand the generator for one sheet
    pub fn instructions(&self, book: &Workbook, sheet: usize) -> Result<Vec<Instruction>> {
        match &self.args {
            Arguments::Static(list) => Ok(list.clone()),
            Arguments::Derived(derive) => derive(book, sheet),
        }
    }
}

/// Everything the pipeline needs to know about one report (or one sheet)
pub struct ReportConfig {
    pub cleaner: CleanerChoice,
    pub plan: Option<FormulaPlan>,
    pub move_summary_cells: bool,
}

impl ReportConfig {
    /// Config with the given cleaner, no formula plan, no summary-cell move
    pub fn new(cleaner: impl MergeCleaner + 'static) -> Self {
        Self {
            cleaner: Box::new(cleaner),
            plan: None,
            move_summary_cells: false,
        }
    }

    /// Attach a generator with a fixed argument list
    ///
    /// Arguments are parsed here, so a malformed one surfaces as
    /// [`Error::MalformedArgument`](crate::error::Error::MalformedArgument)
    /// before any workbook is touched. A leading digit routes the argument
    /// to that member of a composite generator.
    pub fn with_plan<G, S>(mut self, generator: G, raw_args: &[S]) -> Result<Self>
    where
        G: FormulaGenerator + 'static,
        S: AsRef<str>,
    {
        let parsed = args::parse_mixed_arguments(raw_args)?;
        self.plan = Some(FormulaPlan {
            generator: Some(Box::new(generator)),
            args: Arguments::Static(parsed),
        });
        Ok(self)
    }

    /// Attach a generator whose arguments are read off the workbook itself
    pub fn with_derived_plan<G, F>(mut self, generator: G, derive: F) -> Self
    where
        G: FormulaGenerator + 'static,
        F: Fn(&Workbook, usize) -> Result<Vec<Instruction>> + Send + Sync + 'static,
    {
        self.plan = Some(FormulaPlan {
            generator: Some(Box::new(generator)),
            args: Arguments::Derived(Box::new(derive)),
        });
        self
    }

    /// Attach arguments for the summary-row pass with no main generator
    pub fn with_summary_args<S: AsRef<str>>(mut self, raw_args: &[S]) -> Result<Self> {
        let parsed = args::parse_mixed_arguments(raw_args)?;
        self.plan = Some(FormulaPlan {
            generator: None,
            args: Arguments::Static(parsed),
        });
        Ok(self)
    }

    /// Move lone summary values one column left after cleaning
    pub fn move_summary_cells(mut self, enabled: bool) -> Self {
        self.move_summary_cells = enabled;
        self
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self::new(PrimaryMergeCleaner::new())
    }
}

#[derive(Default)]
struct ReportEntry {
    base: Option<ReportConfig>,
    sheets: AHashMap<usize, ReportConfig>,
}

/// Report configuration registry
pub struct Registry {
    reports: AHashMap<String, ReportEntry>,
    fallback: ReportConfig,
}

impl Registry {
    /// Create an empty registry holding only the built-in default
    pub fn new() -> Self {
        Self {
            reports: AHashMap::new(),
            fallback: ReportConfig::default(),
        }
    }

    /// Register the config used by every sheet of `name`
    pub fn register(&mut self, name: impl Into<String>, config: ReportConfig) {
        self.reports.entry(name.into()).or_default().base = Some(config);
    }

    /// Register a config for one sheet of `name`, shadowing the per-report
    /// entry on that sheet
    pub fn register_sheet(&mut self, name: impl Into<String>, sheet: usize, config: ReportConfig) {
        self.reports
            .entry(name.into())
            .or_default()
            .sheets
            .insert(sheet, config);
    }

    /// Resolve the config for one sheet of a report
    pub fn lookup(&self, name: &str, sheet: usize) -> &ReportConfig {
        match self.reports.get(name) {
            Some(entry) => entry
                .sheets
                .get(&sheet)
                .or(entry.base.as_ref())
                .unwrap_or(&self.fallback),
            None => &self.fallback,
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
