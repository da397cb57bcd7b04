//! Tests for the end-to-end workbook cleaning pipeline

use tidysheet::cleaning::{jobs, BackupMergeCleaner, PrimaryMergeCleaner};
use tidysheet::formulas::FullTableGenerator;
use tidysheet::{
    add_formulas, clean_workbook, CellRange, CellValue, Registry, ReportConfig, ReportIdentity,
    Workbook,
};
use tidysheet_grid::{HorizontalAlignment, NumberFormat, FORMAT_CURRENCY_CENTS};

fn display_snapshot(book: &Workbook) -> Vec<String> {
    let ws = book.worksheet(0).unwrap();
    let bounds = ws.dimension().unwrap();
    let mut cells = Vec::new();
    for row in bounds.start.row..=bounds.end.row {
        for col in bounds.start.col..=bounds.end.col {
            cells.push(ws.display_text(row, col));
        }
    }
    cells
}

/// Test a whole report's journey: merged title, hidden row, hyperlink, and
/// text amounts in, plain grid with real numbers and formulas out
#[test]
fn test_report_journey_from_mess_to_formulas() {
    let mut book = Workbook::empty();
    let ws = book.add_worksheet("Balances").unwrap();
    ws.set_value(1, 1, "Prairie Management").unwrap();
    ws.merge_cells(CellRange::from_coords(1, 1, 1, 2)).unwrap();
    ws.set_value(2, 1, "Account").unwrap();
    ws.set_value(2, 2, "Balance").unwrap();
    ws.set_value(3, 1, "Cash").unwrap();
    ws.set_hyperlink(3, 1, "https://example.com/accounts/cash").unwrap();
    ws.set_value(3, 2, "$100.00").unwrap();
    ws.set_value(4, 1, "Receivables").unwrap();
    ws.set_value(4, 2, "$250.50").unwrap();
    ws.set_value(5, 1, "Total").unwrap();
    ws.set_value(5, 2, "$350.50").unwrap();
    ws.set_value(6, 1, "draft").unwrap();
    ws.set_row_hidden(6, true);

    let mut registry = Registry::new();
    registry.register(
        "AccountBalances",
        ReportConfig::new(PrimaryMergeCleaner::new())
            .with_plan(FullTableGenerator::new(), &["Total"])
            .unwrap(),
    );
    let report = ReportIdentity::new("AccountBalances");
    clean_workbook(&mut book, &report, &registry).unwrap();
    add_formulas(&mut book, &report, &registry).unwrap();

    let ws = book.worksheet(0).unwrap();
    // The hidden draft row is gone and the merge is dissolved.
    assert_eq!(ws.dimension().unwrap().end.row, 5);
    assert!(ws.merged_regions().is_empty());
    assert_eq!(ws.display_text(1, 1), "Prairie Management");
    // The hyperlink went away, its cell text did not.
    assert_eq!(ws.hyperlink(3, 1), None);
    assert_eq!(ws.display_text(3, 1), "Cash");
    // Text amounts became currency-formatted numbers that render the same.
    assert_eq!(ws.value(3, 2), CellValue::Number(100.0));
    assert!(matches!(
        &ws.style(3, 2).number_format,
        NumberFormat::Custom(f) if f == FORMAT_CURRENCY_CENTS
    ));
    assert_eq!(ws.display_text(3, 2), "$100.00");
    assert_eq!(ws.value(4, 2), CellValue::Number(250.5));
    // The registered plan put a total over the data run.
    assert_eq!(ws.formula_text(5, 2), Some("SUM(B3:B4)"));
}

/// Test that cleaning a merge-free grid preserves what every cell displays
#[test]
fn test_merge_free_grid_keeps_its_values() {
    let mut book = Workbook::empty();
    let ws = book.add_worksheet("Ledger").unwrap();
    ws.set_value(1, 1, "Ledger").unwrap();
    ws.set_value(2, 1, "Account").unwrap();
    ws.set_value(2, 2, "Amount").unwrap();
    ws.set_value(3, 1, "Cash").unwrap();
    ws.set_value(3, 2, "$10.00").unwrap();
    ws.set_value(4, 1, "Notes").unwrap();
    ws.set_value(4, 2, "pending").unwrap();
    let before = display_snapshot(&book);

    let registry = Registry::new();
    clean_workbook(&mut book, &ReportIdentity::new("Ledger"), &registry).unwrap();

    assert_eq!(display_snapshot(&book), before);
}

/// Test that an empty worksheet is removed from the workbook instead of
/// being processed
#[test]
fn test_empty_worksheet_is_dropped_not_cleaned() {
    let mut book = Workbook::empty();
    let ws = book.add_worksheet("Data").unwrap();
    ws.set_value(1, 1, "Account").unwrap();
    ws.set_value(1, 2, "Total").unwrap();
    book.add_worksheet("Blank").unwrap();

    let registry = Registry::new();
    clean_workbook(&mut book, &ReportIdentity::new("AnyReport"), &registry).unwrap();

    assert_eq!(book.sheet_count(), 1);
    assert_eq!(book.worksheet(0).unwrap().name(), "Data");
    assert_eq!(book.sheet_index("Blank"), None);
}

/// Test the stored-as-text repairs: amounts, identifiers, short years, and
/// percentages each get their own treatment
#[test]
fn test_text_amounts_become_real_numbers() {
    let mut book = Workbook::empty();
    let ws = book.add_worksheet("Charges").unwrap();
    ws.set_value(1, 1, "Charge").unwrap();
    ws.set_value(1, 2, "Amount").unwrap();
    ws.set_value(2, 1, "Rent").unwrap();
    ws.set_value(2, 2, "$1,234.50").unwrap();
    ws.set_value(3, 1, "Credit").unwrap();
    ws.set_value(3, 2, "($42)").unwrap();
    ws.set_value(4, 1, "Unit count").unwrap();
    ws.set_value(4, 2, "204").unwrap();
    ws.set_value(5, 1, "Due").unwrap();
    ws.set_value(5, 2, "06/15/21").unwrap();
    ws.set_value(6, 1, "Rate").unwrap();
    ws.set_value(6, 2, "45%").unwrap();

    let registry = Registry::new();
    clean_workbook(&mut book, &ReportIdentity::new("ChargeDetail"), &registry).unwrap();

    let ws = book.worksheet(0).unwrap();
    assert_eq!(ws.value(2, 2), CellValue::Number(1234.5));
    assert_eq!(ws.display_text(2, 2), "$1,234.50");
    assert_eq!(
        ws.style(2, 2).alignment.horizontal,
        HorizontalAlignment::Left
    );
    // Whole-dollar parentheses mean a negative amount.
    assert_eq!(ws.value(3, 2), CellValue::Number(-42.0));
    assert_eq!(ws.display_text(3, 2), "($42)");
    // A bare number is an identifier, kept as text but flagged.
    assert_eq!(ws.value(4, 2), CellValue::Text("204".to_string()));
    assert!(ws.is_number_as_text(4, 2));
    // Two-digit years get their century back.
    assert_eq!(ws.display_text(5, 2), "06/15/2021");
    // Percentages become plain numbers carrying a percent format.
    assert_eq!(ws.value(6, 2), CellValue::Number(45.0));
}

/// Test that a sheet with no recognizable table still cleans via the
/// fallback cleaner
#[test]
fn test_notes_sheet_falls_back_to_the_backup_cleaner() {
    let mut book = Workbook::empty();
    let ws = book.add_worksheet("Notes").unwrap();
    ws.set_value(1, 1, "Prepared by accounting").unwrap();
    ws.merge_cells(CellRange::from_coords(1, 1, 2, 1)).unwrap();
    ws.set_value(3, 1, "All figures preliminary").unwrap();

    let registry = Registry::new();
    clean_workbook(&mut book, &ReportIdentity::new("UnknownReport"), &registry).unwrap();

    let ws = book.worksheet(0).unwrap();
    assert!(ws.merged_regions().is_empty());
    assert_eq!(ws.display_text(1, 1), "Prepared by accounting");
    assert_eq!(ws.display_text(3, 1), "All figures preliminary");
}

/// Test that the summary-cell move runs only on the sheet registered for it
#[test]
fn test_summary_cells_move_only_where_registered() {
    let mut book = Workbook::empty();
    for name in ["Current", "Prior"] {
        let ws = book.add_worksheet(name).unwrap();
        ws.set_value(1, 1, "Tenant").unwrap();
        ws.set_value(1, 2, "Charges").unwrap();
        ws.set_value(1, 3, "Balance").unwrap();
        ws.set_value(2, 1, "Smith").unwrap();
        ws.set_value(2, 3, "$12.00").unwrap();
    }

    let mut registry = Registry::new();
    registry.register(
        "TenantBalances",
        ReportConfig::new(BackupMergeCleaner::new()),
    );
    registry.register_sheet(
        "TenantBalances",
        1,
        ReportConfig::new(BackupMergeCleaner::new()).move_summary_cells(true),
    );
    clean_workbook(&mut book, &ReportIdentity::new("TenantBalances"), &registry).unwrap();

    // Sheet 0 keeps its balance in the last column.
    let current = book.worksheet(0).unwrap();
    assert_eq!(current.display_text(2, 3), "$12.00");
    assert!(!current.is_populated(2, 2));
    // Sheet 1's balance slid left into the empty charges column.
    let prior = book.worksheet(1).unwrap();
    assert_eq!(prior.display_text(2, 2), "$12.00");
    assert!(!prior.is_populated(2, 3));
}

/// Test that cleanup jobs registered on a cleaner run as part of the
/// workbook clean
#[test]
fn test_cleanup_jobs_run_through_the_registry() {
    let mut book = Workbook::empty();
    let ws = book.add_worksheet("Vendors").unwrap();
    ws.set_value(1, 1, "Vendor").unwrap();
    ws.set_value(1, 2, "Paid").unwrap();
    ws.set_value(2, 1, "Acme Supply").unwrap();
    ws.set_value(2, 2, "$40.00").unwrap();
    ws.set_column_width(1, 2.0);

    let mut registry = Registry::new();
    registry.register(
        "VendorPropertyReport",
        ReportConfig::new(
            BackupMergeCleaner::new()
                .with_job(|ws| jobs::set_columns_to_minimum_width(ws, 12.0))
                .with_job(|ws| jobs::set_last_row_height(ws, 16.0)),
        ),
    );
    clean_workbook(
        &mut book,
        &ReportIdentity::new("VendorPropertyReport"),
        &registry,
    )
    .unwrap();

    let ws = book.worksheet(0).unwrap();
    assert!(ws.column_width(1) >= 12.0);
    assert!((ws.row_height(2) - 16.0).abs() < 1e-9);
}
