//! Number format types

/// Number format for a cell
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NumberFormat {
    /// General format (no explicit formatting)
    #[default]
    General,
    /// Built-in format referenced by its standard id
    BuiltIn(u32),
    /// Custom format string
    Custom(String),
}

/// Accounting currency without cents, negatives in parens
pub const FORMAT_CURRENCY_WHOLE: &str = "$#,##0;($#,##0)";

/// Accounting currency with cents, negatives in parens
pub const FORMAT_CURRENCY_CENTS: &str = "$#,##0.00;($#,##0.00)";

/// Thousands-separated integer
pub const FORMAT_THOUSANDS: &str = "#,##0";

/// Percentage with two decimals, negatives in parens
pub const FORMAT_PERCENT: &str = "#0.00%;(#0.00%)";

/// Month/day/year date
pub const FORMAT_DATE_MDY: &str = "mm/dd/yyyy";

impl NumberFormat {
    /// Custom format from a format string; "General" maps to `General`
    pub fn custom<S: Into<String>>(format: S) -> Self {
        let format = format.into();
        if format == "General" {
            NumberFormat::General
        } else {
            NumberFormat::Custom(format)
        }
    }

    /// The effective format string
    pub fn format_string(&self) -> &str {
        match self {
            NumberFormat::General => "General",
            NumberFormat::BuiltIn(id) => builtin_format_string(*id),
            NumberFormat::Custom(s) => s,
        }
    }

    /// True for General (no explicit format)
    pub fn is_general(&self) -> bool {
        self.format_string() == "General"
    }

    /// True when the format renders a currency symbol
    pub fn is_currency(&self) -> bool {
        self.format_string().contains('$')
    }

    /// True when the format renders a percent sign
    pub fn is_percent(&self) -> bool {
        self.format_string().contains('%')
    }

    /// True when the positive section renders two decimal places
    pub fn has_cents(&self) -> bool {
        let format = self.format_string();
        let positive = format.split(';').next().unwrap_or(format);
        positive.contains(".00")
    }

    /// True when negatives render in parentheses
    pub fn has_paren_negative(&self) -> bool {
        self.format_string().contains(";(")
    }

    /// True when the integer part renders thousands separators
    pub fn has_thousands(&self) -> bool {
        self.format_string().contains("#,##")
    }

    /// Heuristic date detection: date letters outside quoted/bracketed parts
    pub fn is_date(&self) -> bool {
        let format = self.format_string();
        if format == "General" || format.contains('%') || format.contains('$') {
            return false;
        }
        let mut in_quotes = false;
        let mut in_brackets = false;
        for c in format.chars() {
            match c {
                '"' => in_quotes = !in_quotes,
                '[' if !in_quotes => in_brackets = true,
                ']' if !in_quotes => in_brackets = false,
                'y' | 'm' | 'd' | 'h' | 's' if !in_quotes && !in_brackets => return true,
                _ => {}
            }
        }
        false
    }
}

/// Format strings for the standard built-in ids this model cares about
fn builtin_format_string(id: u32) -> &'static str {
    match id {
        0 => "General",
        1 => "0",
        2 => "0.00",
        3 => "#,##0",
        4 => "#,##0.00",
        9 => "0%",
        10 => "0.00%",
        14 => "mm/dd/yyyy",
        37 => "#,##0 ;(#,##0)",
        38 => "#,##0 ;[Red](#,##0)",
        39 => "#,##0.00;(#,##0.00)",
        40 => "#,##0.00;[Red](#,##0.00)",
        44 => r#"_("$"* #,##0.00_);_("$"* \(#,##0.00\);_("$"* "-"??_);_(@_)"#,
        _ => "General",
    }
}
