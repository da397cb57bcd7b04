//! Header-argument instructions
//!
//! Report configurations describe formula placement with compact strings:
//!
//! - `START=END` sums the rows between two matched headers
//! - `TARGET~ref1,-ref2,+ref3` sums non-adjacent rows named by each reference,
//!   with `-` negating a reference and `+` including duplicate matches
//! - `r=PATTERN` names the section-key pattern for periodic reports
//! - `sheetN` selects source sheet `N` (0-based) for cross-sheet sums
//! - a leading digit routes the rest of the argument to one generator in a
//!   multi-generator chain (`2Subtotals=Total:`)
//! - anything else is a plain anchor pattern
//!
//! Arguments are parsed once into [`Instruction`] values when a report is
//! registered, so malformed strings surface as configuration errors instead
//! of failing mid-scan. Pattern halves are regular expressions matched
//! against the whole trimmed display text.

use std::fmt;

use regex::Regex;

use crate::error::{Error, Result};

/// A compiled header pattern, matched against whole trimmed cell text
#[derive(Debug, Clone)]
pub struct TextPattern {
    source: String,
    regex: Regex,
}

impl TextPattern {
    /// Compile a pattern, anchoring it to the whole string
    pub fn new(pattern: &str) -> Result<Self> {
        if pattern.is_empty() {
            return Err(Error::MalformedArgument("empty pattern".into()));
        }
        let regex = Regex::new(&format!("^(?:{pattern})$"))
            .map_err(|e| Error::MalformedArgument(format!("bad pattern {pattern:?}: {e}")))?;
        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    /// True when the trimmed text matches the whole pattern
    pub fn matches(&self, text: &str) -> bool {
        self.regex.is_match(text.trim())
    }

    /// The pattern as written in the configuration
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl fmt::Display for TextPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// One reference of a non-contiguous summary argument
#[derive(Debug, Clone)]
pub struct SummaryRef {
    /// Pattern naming the referenced row's header
    pub pattern: TextPattern,
    /// Negate the referenced cell in the sum
    pub subtract: bool,
    /// Keep every match instead of the first
    pub include_duplicates: bool,
}

/// A parsed header argument
#[derive(Debug, Clone)]
pub enum Instruction {
    /// Plain header pattern
    Anchor(TextPattern),
    /// Start/end header pair (`START=END`)
    Range {
        /// Pattern opening a segment
        start: TextPattern,
        /// Pattern closing a segment
        end: TextPattern,
    },
    /// Non-contiguous summary (`TARGET~refs`)
    NonContiguous {
        /// Header naming the row that receives the formula
        target: TextPattern,
        /// Referenced rows, in argument order
        refs: Vec<SummaryRef>,
    },
    /// Section-key pattern for periodic reports (`r=PATTERN`)
    SectionKey(TextPattern),
    /// Source sheet index for cross-sheet sums (`sheetN`, 0-based)
    CrossSheet {
        /// Index of the source sheet
        sheet: usize,
    },
    /// Argument routed to one generator of a multi chain by leading digit
    Routed {
        /// Recipient generator, 1-based as written
        generator: usize,
        /// The argument the recipient sees
        inner: Box<Instruction>,
    },
}

impl Instruction {
    /// Parse an argument for a single generator
    pub fn parse(arg: &str) -> Result<Instruction> {
        if arg.is_empty() {
            return Err(Error::MalformedArgument("empty header argument".into()));
        }
        if let Some(digits) = arg.strip_prefix("sheet") {
            if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
                let sheet = digits
                    .parse()
                    .map_err(|_| Error::MalformedArgument(format!("bad sheet index {arg:?}")))?;
                return Ok(Instruction::CrossSheet { sheet });
            }
        }
        if let Some(pattern) = arg.strip_prefix("r=") {
            return Ok(Instruction::SectionKey(TextPattern::new(pattern)?));
        }
        if let Some((target, refs)) = arg.split_once('~') {
            return parse_non_contiguous(arg, target, refs);
        }
        if let Some((start, end)) = arg.split_once('=') {
            if start.is_empty() || end.is_empty() {
                return Err(Error::MalformedArgument(format!(
                    "range argument {arg:?} is missing a header"
                )));
            }
            return Ok(Instruction::Range {
                start: TextPattern::new(start)?,
                end: TextPattern::new(end)?,
            });
        }
        Ok(Instruction::Anchor(TextPattern::new(arg)?))
    }

    /// Parse an argument for a multi-generator chain
    ///
    /// The first character must be the digit naming the recipient.
    pub fn parse_routed(arg: &str) -> Result<Instruction> {
        let mut chars = arg.chars();
        let digit = chars
            .next()
            .and_then(|c| c.to_digit(10))
            .ok_or_else(|| Error::MalformedArgument(format!("{arg:?} has no routing digit")))?;
        let rest = chars.as_str();
        if rest.is_empty() {
            return Err(Error::MalformedArgument(format!(
                "routed argument {arg:?} has no instruction"
            )));
        }
        Ok(Instruction::Routed {
            generator: digit as usize,
            inner: Box::new(Instruction::parse(rest)?),
        })
    }
}

fn parse_non_contiguous(arg: &str, target: &str, refs: &str) -> Result<Instruction> {
    if target.is_empty() || refs.is_empty() {
        return Err(Error::MalformedArgument(format!(
            "summary argument {arg:?} is missing its target or references"
        )));
    }
    let refs = refs
        .split(',')
        .map(|raw| {
            let (subtract, include_duplicates, pattern) =
                if let Some(p) = raw.strip_prefix("+-").or_else(|| raw.strip_prefix("-+")) {
                    (true, true, p)
                } else if let Some(p) = raw.strip_prefix('-') {
                    (true, false, p)
                } else if let Some(p) = raw.strip_prefix('+') {
                    (false, true, p)
                } else {
                    (false, false, raw)
                };
            Ok(SummaryRef {
                pattern: TextPattern::new(pattern)?,
                subtract,
                include_duplicates,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Instruction::NonContiguous {
        target: TextPattern::new(target)?,
        refs,
    })
}

/// Parse a slice of plain arguments
pub fn parse_arguments<S: AsRef<str>>(args: &[S]) -> Result<Vec<Instruction>> {
    args.iter().map(|a| Instruction::parse(a.as_ref())).collect()
}

/// Parse a slice of digit-routed arguments
pub fn parse_routed_arguments<S: AsRef<str>>(args: &[S]) -> Result<Vec<Instruction>> {
    args.iter()
        .map(|a| Instruction::parse_routed(a.as_ref()))
        .collect()
}

/// Parse a slice where routed and plain arguments are mixed
///
/// A leading digit marks a routed argument; anything else parses plain.
pub fn parse_mixed_arguments<S: AsRef<str>>(args: &[S]) -> Result<Vec<Instruction>> {
    args.iter()
        .map(|a| {
            let arg = a.as_ref();
            if arg.chars().next().is_some_and(|c| c.is_ascii_digit()) {
                Instruction::parse_routed(arg)
            } else {
                Instruction::parse(arg)
            }
        })
        .collect()
}

/// The anchor patterns in `args`, in order
pub fn anchors(args: &[Instruction]) -> Vec<&TextPattern> {
    args.iter()
        .filter_map(|arg| match arg {
            Instruction::Anchor(p) => Some(p),
            _ => None,
        })
        .collect()
}

/// The start/end pairs in `args`, in order
pub fn ranges(args: &[Instruction]) -> Vec<(&TextPattern, &TextPattern)> {
    args.iter()
        .filter_map(|arg| match arg {
            Instruction::Range { start, end } => Some((start, end)),
            _ => None,
        })
        .collect()
}

/// The non-contiguous summaries in `args`, in order
pub fn summaries(args: &[Instruction]) -> Vec<(&TextPattern, &[SummaryRef])> {
    args.iter()
        .filter_map(|arg| match arg {
            Instruction::NonContiguous { target, refs } => Some((target, refs.as_slice())),
            _ => None,
        })
        .collect()
}

/// The first section-key pattern in `args`
pub fn section_key(args: &[Instruction]) -> Option<&TextPattern> {
    args.iter().find_map(|arg| match arg {
        Instruction::SectionKey(p) => Some(p),
        _ => None,
    })
}

/// The cross-sheet indices in `args`, in order
pub fn sheet_indices(args: &[Instruction]) -> Vec<usize> {
    args.iter()
        .filter_map(|arg| match arg {
            Instruction::CrossSheet { sheet } => Some(*sheet),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_range() {
        let arg = Instruction::parse("Income=Total Income").unwrap();
        match arg {
            Instruction::Range { start, end } => {
                assert!(start.matches("Income"));
                assert!(start.matches("  Income  "));
                assert!(!start.matches("Incomes"));
                assert!(end.matches("Total Income"));
            }
            other => panic!("expected range, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_non_contiguous() {
        let arg = Instruction::parse("Net~Total Income,-Total Expense,+Rent [0-9]+").unwrap();
        match arg {
            Instruction::NonContiguous { target, refs } => {
                assert!(target.matches("Net"));
                assert_eq!(refs.len(), 3);
                assert!(!refs[0].subtract);
                assert!(refs[1].subtract && !refs[1].include_duplicates);
                assert!(!refs[2].subtract && refs[2].include_duplicates);
                assert!(refs[2].pattern.matches("Rent 12"));
            }
            other => panic!("expected summary, got {other:?}"),
        }

        let arg = Instruction::parse("Variance~+-Total:").unwrap();
        match arg {
            Instruction::NonContiguous { refs, .. } => {
                assert!(refs[0].subtract && refs[0].include_duplicates);
            }
            other => panic!("expected summary, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_section_key_and_sheet() {
        assert!(matches!(
            Instruction::parse("r=[A-Z0-9]+").unwrap(),
            Instruction::SectionKey(_)
        ));
        assert!(matches!(
            Instruction::parse("sheet12").unwrap(),
            Instruction::CrossSheet { sheet: 12 }
        ));
        // Not a sheet selector without trailing digits.
        assert!(matches!(
            Instruction::parse("sheets").unwrap(),
            Instruction::Anchor(_)
        ));
    }

    #[test]
    fn test_parse_routed() {
        let arg = Instruction::parse_routed("2Subtotals=Total:").unwrap();
        match arg {
            Instruction::Routed { generator, inner } => {
                assert_eq!(generator, 2);
                assert!(matches!(*inner, Instruction::Range { .. }));
            }
            other => panic!("expected routed, got {other:?}"),
        }
        assert!(matches!(
            Instruction::parse_routed("3sheet0").unwrap(),
            Instruction::Routed { generator: 3, .. }
        ));
    }

    #[test]
    fn test_parse_mixed() {
        let args = parse_mixed_arguments(&["1Total", "Net~Total Income", "2r=[A-Z]+"]).unwrap();
        assert!(matches!(args[0], Instruction::Routed { generator: 1, .. }));
        assert!(matches!(args[1], Instruction::NonContiguous { .. }));
        assert!(matches!(args[2], Instruction::Routed { generator: 2, .. }));
    }

    #[test]
    fn test_malformed_arguments() {
        for bad in ["", "=Total", "Income=", "Net~", "~refs", "Net~a,", "(="] {
            assert!(
                matches!(Instruction::parse(bad), Err(Error::MalformedArgument(_))),
                "{bad:?} should be rejected"
            );
        }
        assert!(matches!(
            Instruction::parse_routed("2"),
            Err(Error::MalformedArgument(_))
        ));
        assert!(matches!(
            Instruction::parse_routed("Income=Total"),
            Err(Error::MalformedArgument(_))
        ));
    }

    #[test]
    fn test_selector_helpers() {
        let args =
            parse_arguments(&["Income=Total Income", "Cash", "r=[A-Z]+", "sheet1"]).unwrap();
        assert_eq!(anchors(&args).len(), 1);
        assert_eq!(ranges(&args).len(), 1);
        assert!(section_key(&args).is_some());
        assert_eq!(sheet_indices(&args), vec![1]);
        assert!(summaries(&args).is_empty());
    }
}
