//! Tests for building and dispatching a report configuration catalog

use tidysheet::args::{parse_arguments, parse_mixed_arguments};
use tidysheet::cleaning::{
    jobs, BackupMergeCleaner, MinimumWidthMergeCleaner, PrimaryMergeCleaner,
    RealigningMergeCleaner,
};
use tidysheet::formulas::{
    sum_only_bolds, sum_other_sums, sum_within_segment, BudgetSegmentGenerator,
    FullTableGenerator, FullTableSummaryColumn, MultiGenerator, PeriodicGenerator, PeriodicOnTop,
    RowSegmentGenerator,
};
use tidysheet::{
    add_formulas, metadata, Registry, ReportConfig, ReportIdentity, Workbook, Worksheet,
};

fn bold(ws: &mut Worksheet, row: u32, col: u32, text: &str) {
    ws.set_value(row, col, text).unwrap();
    ws.modify_style(row, col, |s| s.font.bold = true).unwrap();
}

/// A catalog covering one report of each kind: every cleaner variant, fixed
/// and derived argument lists, per-sheet overrides, and a summary-only plan
fn catalog() -> Registry {
    let mut registry = Registry::new();

    registry.register(
        "TrialBalance",
        ReportConfig::new(BackupMergeCleaner::new())
            .with_plan(sum_only_bolds().stop_at_non_data(), &["Total:"])
            .unwrap(),
    );
    registry.register(
        "TrialBalanceVariance",
        ReportConfig::new(BackupMergeCleaner::new())
            .with_summary_args(&[
                "Asset=Total Asset",
                "Current Assets=Total Current Assets",
                "Liability=Total Liability",
                "Current Liabilities=Total Current Liabilities",
                "Equity=Total Equity",
                "Income=Total Income",
                "Expense=Total Expense",
                "Total:~Total Expense,Total Income,Total Equity,Total Liability,Total Asset",
            ])
            .unwrap(),
    );
    registry.register(
        "ProfitAndLossBudget",
        ReportConfig::new(RealigningMergeCleaner::new())
            .with_plan(
                BudgetSegmentGenerator::new(),
                &[
                    "INCOME=Total Income",
                    "EXPENSE=Total Expense",
                    "Net Operating Income~Total Income,-Total Expense",
                    "Net Income~-Total Expense,Total Income,Net Operating Income",
                ],
            )
            .unwrap(),
    );
    registry.register(
        "BankReconcilliation",
        ReportConfig::new(MinimumWidthMergeCleaner::new()),
    );
    registry.register(
        "ProfitAndLossStatementByJob",
        ReportConfig::new(
            PrimaryMergeCleaner::new()
                .move_major_headers(false)
                .with_job(|ws| jobs::apply_column_max_width(ws, 18.0)),
        )
        .with_plan(
            RowSegmentGenerator::new().with_trim(false),
            &[
                "Income=Total Income",
                "Expense=Total Expense",
                "Other Cash Adjustments=Total Other Cash Adjustments",
                "Non-Operating Income=Total Non-Operating Income",
                "Net Income~Total Income,-Total Expense",
                "Net Operating Income~Total Income,-Total Expense",
                "Adjusted Net Income~Total Other Cash Adjustments,Total Non-Operating Income,Net Operating Income",
            ],
        )
        .unwrap(),
    );
    registry.register(
        "Budget",
        ReportConfig::new(PrimaryMergeCleaner::new())
            .with_plan(
                MultiGenerator::new()
                    .with(FullTableSummaryColumn::new())
                    .with(RowSegmentGenerator::new()),
                &["1Total", "2INCOME=TOTAL INCOME", "2EXPENSE=TOTAL EXPENSE"],
            )
            .unwrap(),
    );
    registry.register(
        "SecurityReport",
        ReportConfig::new(
            PrimaryMergeCleaner::new().with_job(|ws| jobs::set_last_row_height(ws, 16.0)),
        ),
    );
    registry.register(
        "VendorInvoiceReport",
        ReportConfig::new(
            PrimaryMergeCleaner::new()
                .with_job(|ws| jobs::set_column_to_wrap_text(ws, "Description")),
        )
        .with_plan(
            MultiGenerator::new()
                .with(PeriodicOnTop::new())
                .with(sum_other_sums()),
            &["1Amount Owed", "1Amount Paid", "1Balance", "2Total:"],
        )
        .unwrap(),
    );
    // The first worksheet is sectioned per unit, later ones are flat tables.
    registry.register(
        "ReportOutstandingBalance",
        ReportConfig::new(PrimaryMergeCleaner::new())
            .with_plan(FullTableGenerator::new(), &["Total"])
            .unwrap()
            .move_summary_cells(true),
    );
    registry.register_sheet(
        "ReportOutstandingBalance",
        0,
        ReportConfig::new(PrimaryMergeCleaner::new())
            .with_plan(
                MultiGenerator::new()
                    .with(PeriodicGenerator::new())
                    .with(sum_other_sums()),
                &[
                    "1r=[A-Z0-9]+",
                    "1Balance",
                    "2Total For ([A-Z][a-z]+)( [A-Z]?[a-z]+)+:",
                ],
            )
            .unwrap()
            .move_summary_cells(true),
    );
    registry.register_sheet(
        "ReportOutstandingBalance",
        1,
        ReportConfig::new(BackupMergeCleaner::new())
            .with_plan(FullTableGenerator::new(), &["Total"])
            .unwrap()
            .move_summary_cells(true),
    );
    registry.register(
        "LedgerReport",
        ReportConfig::new(PrimaryMergeCleaner::new()).with_derived_plan(
            FullTableGenerator::new(),
            |book, sheet| {
                let headers = metadata::ledger_report_headers(book.worksheet(sheet)?);
                parse_arguments(&headers)
            },
        ),
    );
    registry.register(
        "PayablesAccountReport",
        ReportConfig::new(PrimaryMergeCleaner::new()).with_derived_plan(
            MultiGenerator::new()
                .with(RowSegmentGenerator::new())
                .with(sum_within_segment(true, true)),
            |book, sheet| {
                let headers = metadata::payables_account_headers(book.worksheet(sheet)?);
                parse_mixed_arguments(&headers)
            },
        ),
    );

    registry
}

/// Test that lookups land on the registered entry, sheet overrides first,
/// with unknown names falling back to a bare standard clean
#[test]
fn test_catalog_lookup_routes_to_the_registered_config() {
    let catalog = catalog();

    assert!(catalog
        .lookup("TrialBalance", 0)
        .plan
        .as_ref()
        .unwrap()
        .generator
        .is_some());

    // The variance report runs only the summary-row pass.
    assert!(catalog
        .lookup("TrialBalanceVariance", 0)
        .plan
        .as_ref()
        .unwrap()
        .generator
        .is_none());

    // A cleaner-only report carries no plan at all.
    assert!(catalog.lookup("SecurityReport", 0).plan.is_none());

    // Sheet entries answer for their own index, the base entry for the rest.
    assert!(catalog.lookup("ReportOutstandingBalance", 0).move_summary_cells);
    assert!(catalog.lookup("ReportOutstandingBalance", 1).move_summary_cells);
    assert!(catalog.lookup("ReportOutstandingBalance", 7).move_summary_cells);

    let fallback = catalog.lookup("BrandNewReport", 0);
    assert!(fallback.plan.is_none());
    assert!(!fallback.move_summary_cells);
}

fn gapped_sheet() -> Workbook {
    let mut book = Workbook::empty();
    let ws = book.add_worksheet("Accounts").unwrap();
    ws.set_value(1, 1, "Account").unwrap();
    ws.set_value(1, 3, "Amount").unwrap();
    ws.set_value(2, 1, "Cash").unwrap();
    ws.set_value(2, 3, "$10.00").unwrap();
    book
}

/// Test that an unregistered report is cleaned by the fallback, which
/// deletes the empty interior column
#[test]
fn test_unknown_report_gets_the_standard_clean() {
    let catalog = catalog();
    let mut book = gapped_sheet();

    let cleaner = &catalog.lookup("BrandNewReport", 0).cleaner;
    cleaner.unmerge(book.worksheet_mut(0).unwrap()).unwrap();

    let ws = book.worksheet(0).unwrap();
    assert_eq!(ws.display_text(1, 2), "Amount");
    assert_eq!(ws.display_text(2, 2), "$10.00");
    assert_eq!(ws.dimension().unwrap().end.col, 2);
}

/// Test that the trial balance dispatches to the backup clean, which never
/// deletes columns
#[test]
fn test_trial_balance_keeps_every_column() {
    let catalog = catalog();
    let mut book = gapped_sheet();

    let cleaner = &catalog.lookup("TrialBalance", 0).cleaner;
    cleaner.unmerge(book.worksheet_mut(0).unwrap()).unwrap();

    let ws = book.worksheet(0).unwrap();
    assert_eq!(ws.display_text(1, 3), "Amount");
    assert_eq!(ws.dimension().unwrap().end.col, 3);
}

/// Test that the reconciliation report's cleaner floors the width of every
/// column its first table row uses
#[test]
fn test_reconciliation_columns_get_breathing_room() {
    let catalog = catalog();
    let mut book = Workbook::empty();
    let ws = book.add_worksheet("Reconciliation").unwrap();
    ws.set_value(1, 1, "Date").unwrap();
    ws.set_value(1, 2, "Amount").unwrap();
    ws.set_value(2, 2, "$12.00").unwrap();
    ws.set_column_width(1, 2.0);
    ws.set_column_width(2, 2.0);

    let cleaner = &catalog.lookup("BankReconcilliation", 0).cleaner;
    cleaner.unmerge(book.worksheet_mut(0).unwrap()).unwrap();

    let ws = book.worksheet(0).unwrap();
    assert!(ws.column_width(1) >= 11.0);
    assert!(ws.column_width(2) >= 11.0);
}

/// Test that the budget statement's cleaner drifts stranded values back
/// into their data column
#[test]
fn test_budget_statement_values_drift_home() {
    let catalog = catalog();
    let mut book = Workbook::empty();
    let ws = book.add_worksheet("Budget").unwrap();
    ws.set_value(1, 1, "Account").unwrap();
    ws.set_value(1, 2, "Budget").unwrap();
    for row in 2..=5 {
        ws.set_value(row, 1, "Item").unwrap();
    }
    ws.set_value(2, 2, "$10.00").unwrap();
    ws.set_value(3, 2, "$20.00").unwrap();
    ws.set_value(5, 2, "$40.00").unwrap();
    // Unmerging this report leaves values stranded right of their column.
    ws.set_value(4, 3, "$30.00").unwrap();

    let cleaner = &catalog.lookup("ProfitAndLossBudget", 0).cleaner;
    cleaner.unmerge(book.worksheet_mut(0).unwrap()).unwrap();

    let ws = book.worksheet(0).unwrap();
    assert_eq!(ws.display_text(4, 2), "$30.00");
    assert!(!ws.is_populated(4, 3));
}

/// Test that the by-job statement's plan sums segments without trimming
/// leading blank rows
#[test]
fn test_by_job_segments_keep_their_leading_blanks() {
    let catalog = catalog();
    let mut book = Workbook::empty();
    let ws = book.add_worksheet("By Job").unwrap();
    ws.set_value(1, 1, "Income").unwrap();
    ws.set_value(3, 2, "$5.00").unwrap();
    ws.set_value(4, 1, "Total Income").unwrap();
    ws.set_value(4, 2, "$5.00").unwrap();

    add_formulas(
        &mut book,
        &ReportIdentity::new("ProfitAndLossStatementByJob"),
        &catalog,
    )
    .unwrap();

    // Trimming is off for this report, so the blank B2 stays in range.
    assert_eq!(
        book.worksheet(0).unwrap().formula_text(4, 2),
        Some("SUM(B2:B3)")
    );
}

/// Test that each worksheet of the outstanding-balance report is filled by
/// its own registered plan
#[test]
fn test_outstanding_balance_sheets_use_their_own_plans() {
    let catalog = catalog();
    let mut book = Workbook::empty();

    let first = book.add_worksheet("Outstanding").unwrap();
    first.set_value(1, 1, "Unit").unwrap();
    first.set_value(1, 2, "Balance").unwrap();
    first.set_value(2, 1, "A101").unwrap();
    first.set_value(2, 2, "$10.00").unwrap();
    first.set_value(3, 2, "$20.00").unwrap();
    bold(first, 4, 2, "$30.00");
    first.set_value(5, 1, "Total For Prairie View:").unwrap();
    first.set_value(5, 2, "$30.00").unwrap();

    let second = book.add_worksheet("Summary").unwrap();
    second.set_value(1, 1, "Account").unwrap();
    second.set_value(1, 2, "Amount").unwrap();
    second.set_value(2, 2, "$1.00").unwrap();
    second.set_value(3, 2, "$2.00").unwrap();
    second.set_value(4, 1, "Total").unwrap();
    second.set_value(4, 2, "$3.00").unwrap();

    add_formulas(
        &mut book,
        &ReportIdentity::new("ReportOutstandingBalance"),
        &catalog,
    )
    .unwrap();

    // The first sheet's plan keys a section off the unit code.
    let ws = book.worksheet(0).unwrap();
    assert_eq!(ws.formula_text(4, 2), Some("SUM(B2:B3)"));
    assert_eq!(
        ws.formula_text(5, 2),
        Some("SUM(IF(_xlfn.ISFORMULA(B2:B4), B2:B4, 0))")
    );
    assert!(ws.is_array_formula(5, 2));

    // The second sheet's plan is a plain full-table total.
    let ws = book.worksheet(1).unwrap();
    assert_eq!(ws.formula_text(4, 2), Some("SUM(B2:B3)"));
    assert!(!ws.is_array_formula(4, 2));
}

/// Test the vendor invoice plan: section totals sit in the vendor rows and
/// the grand total re-adds them
#[test]
fn test_vendor_invoice_totals_sit_above_their_sections() {
    let catalog = catalog();
    let mut book = Workbook::empty();
    let ws = book.add_worksheet("Invoices").unwrap();
    ws.set_value(1, 1, "Vendor").unwrap();
    ws.set_value(1, 2, "Amount Owed").unwrap();
    ws.set_value(1, 3, "Amount Paid").unwrap();
    bold(ws, 2, 1, "Acme Supply");
    ws.set_value(2, 2, "$30.00").unwrap();
    ws.set_value(2, 3, "$20.00").unwrap();
    ws.set_value(3, 2, "$10.00").unwrap();
    ws.set_value(3, 3, "$5.00").unwrap();
    ws.set_value(4, 2, "$20.00").unwrap();
    ws.set_value(4, 3, "$15.00").unwrap();
    bold(ws, 5, 1, "Best Parts");
    ws.set_value(5, 2, "$30.00").unwrap();
    ws.set_value(5, 3, "$25.00").unwrap();
    ws.set_value(6, 2, "$30.00").unwrap();
    ws.set_value(6, 3, "$25.00").unwrap();
    ws.set_value(7, 1, "Total:").unwrap();
    bold(ws, 7, 2, "$60.00");
    bold(ws, 7, 3, "$45.00");

    add_formulas(
        &mut book,
        &ReportIdentity::new("VendorInvoiceReport"),
        &catalog,
    )
    .unwrap();

    let ws = book.worksheet(0).unwrap();
    // Each vendor row totals the charge rows below it, in both columns.
    assert_eq!(ws.formula_text(2, 2), Some("SUM(B3:B4)"));
    assert_eq!(ws.formula_text(2, 3), Some("SUM(C3:C4)"));
    assert_eq!(ws.formula_text(5, 2), Some("SUM(B6:B6)"));
    // The bottom row re-adds the vendor formulas and skips the raw charges.
    assert_eq!(
        ws.formula_text(7, 2),
        Some("SUM(IF(_xlfn.ISFORMULA(B2:B6), B2:B6, 0))")
    );
    assert!(ws.is_array_formula(7, 2));
    assert_eq!(
        ws.formula_text(7, 3),
        Some("SUM(IF(_xlfn.ISFORMULA(C2:C6), C2:C6, 0))")
    );
}

/// Test that the ledger plan derives its anchor from the sheet's last row
/// and derives nothing when the label is not bold
#[test]
fn test_ledger_total_is_read_off_the_sheet() {
    let catalog = catalog();
    let mut book = Workbook::empty();
    let ws = book.add_worksheet("Ledger").unwrap();
    ws.set_value(1, 1, "Account").unwrap();
    ws.set_value(1, 2, "Amount").unwrap();
    ws.set_value(2, 2, "$5.00").unwrap();
    ws.set_value(3, 2, "$10.00").unwrap();
    bold(ws, 4, 1, "Total");
    ws.set_value(4, 2, "$15.00").unwrap();

    add_formulas(&mut book, &ReportIdentity::new("LedgerReport"), &catalog).unwrap();
    assert_eq!(
        book.worksheet(0).unwrap().formula_text(4, 2),
        Some("SUM(B2:B3)")
    );

    // Without a bold label on the last row no arguments are derived.
    let mut book = Workbook::empty();
    let ws = book.add_worksheet("Ledger").unwrap();
    ws.set_value(1, 2, "Amount").unwrap();
    ws.set_value(2, 2, "$5.00").unwrap();
    ws.set_value(3, 1, "Total").unwrap();
    ws.set_value(3, 2, "$5.00").unwrap();

    add_formulas(&mut book, &ReportIdentity::new("LedgerReport"), &catalog).unwrap();
    assert!(!book.worksheet(0).unwrap().has_formula(3, 2));
}

/// Test the payables plan end to end: section pairs are discovered on the
/// sheet, inner sections get plain sums, outer ones conditional sums
#[test]
fn test_payables_sections_are_discovered_then_summed() {
    let catalog = catalog();
    let mut book = Workbook::empty();
    let ws = book.add_worksheet("Payables").unwrap();
    bold(ws, 1, 2, "Payables Account Report");
    bold(ws, 2, 2, "Operating");
    bold(ws, 3, 4, "Cleaning");
    ws.set_value(4, 5, "$10.00").unwrap();
    ws.set_value(5, 5, "$20.00").unwrap();
    bold(ws, 6, 4, "Total Cleaning");
    ws.set_value(6, 5, "$30.00").unwrap();
    bold(ws, 7, 2, "Total Operating");
    ws.set_value(7, 5, "$30.00").unwrap();

    add_formulas(
        &mut book,
        &ReportIdentity::new("PayablesAccountReport"),
        &catalog,
    )
    .unwrap();

    let ws = book.worksheet(0).unwrap();
    // The inner section sums its charge rows directly.
    assert_eq!(ws.formula_text(6, 5), Some("SUM(E4:E5)"));
    // The outer section counts raw charges and zeroes the nested subtotal.
    assert_eq!(
        ws.formula_text(7, 5),
        Some("SUM(IF(_xlfn.ISFORMULA(E4:E6), 0, E4:E6))")
    );
    assert!(ws.is_array_formula(7, 5));
}

/// Test that a summary-only plan writes its referenced-row total without
/// any segment pass running first
#[test]
fn test_variance_summary_runs_without_a_main_generator() {
    let catalog = catalog();
    let mut book = Workbook::empty();
    let ws = book.add_worksheet("Variance").unwrap();
    ws.set_value(1, 1, "Total Asset").unwrap();
    ws.set_value(1, 2, "$100.00").unwrap();
    ws.set_value(2, 1, "Total Liability").unwrap();
    ws.set_value(2, 2, "$40.00").unwrap();
    ws.set_value(3, 1, "Total Equity").unwrap();
    ws.set_value(3, 2, "$30.00").unwrap();
    ws.set_value(4, 1, "Total Income").unwrap();
    ws.set_value(4, 2, "$20.00").unwrap();
    ws.set_value(5, 1, "Total Expense").unwrap();
    ws.set_value(5, 2, "$10.00").unwrap();
    ws.set_value(6, 1, "Total:").unwrap();
    ws.set_value(6, 2, "$200.00").unwrap();

    add_formulas(
        &mut book,
        &ReportIdentity::new("TrialBalanceVariance"),
        &catalog,
    )
    .unwrap();

    let ws = book.worksheet(0).unwrap();
    // References appear in argument order.
    assert_eq!(ws.formula_text(6, 2), Some("SUM(B5,B4,B3,B2,B1)"));
    // No segment pass ran, so the section totals keep their plain values.
    assert!(!ws.has_formula(1, 2));
    assert!(!ws.has_formula(5, 2));
}
