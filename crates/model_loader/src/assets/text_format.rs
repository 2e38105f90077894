//! Line tokenization shared by the OBJ and MTL parsers
//!
//! Both formats are line oriented: a keyword, then whitespace separated
//! arguments. `#` starts a comment line and there are no continuation lines.

use thiserror::Error;

/// One non-empty, non-comment source line split into keyword and arguments
#[derive(Debug, Clone)]
pub struct Line<'a> {
    /// 1-based line number in the source text
    pub number: usize,
    /// First whitespace separated token
    pub keyword: &'a str,
    /// Remaining tokens
    pub args: Vec<&'a str>,
    /// Everything after the keyword, trimmed (names and paths may contain spaces)
    pub rest: &'a str,
}

/// Iterate the meaningful lines of an OBJ or MTL document
pub fn lines(text: &str) -> impl Iterator<Item = Line<'_>> {
    text.lines().enumerate().filter_map(|(index, raw)| {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }

        let mut tokens = line.split_whitespace();
        let keyword = tokens.next()?;
        let rest = line[keyword.len()..].trim_start();

        Some(Line {
            number: index + 1,
            keyword,
            args: tokens.collect(),
            rest,
        })
    })
}

/// Non-fatal problem found while parsing a line
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseWarning {
    /// Keyword the parser does not handle; the line was skipped
    #[error("line {line}: unhandled keyword '{keyword}'")]
    UnknownKeyword {
        /// Source line
        line: usize,
        /// The keyword as written
        keyword: String,
    },

    /// Token that is not a valid number; NaN was emitted in its place
    #[error("line {line}: invalid number '{token}'")]
    InvalidNumber {
        /// Source line
        line: usize,
        /// The offending token
        token: String,
    },

    /// Fewer arguments than the keyword needs; NaN was emitted for the gap
    #[error("line {line}: '{keyword}' expects {expected} values")]
    MissingArgument {
        /// Source line
        line: usize,
        /// Keyword missing arguments
        keyword: String,
        /// Number of values required
        expected: usize,
    },

    /// Face vertex reference that is unparsable or outside its pool
    #[error("line {line}: invalid vertex reference '{reference}'")]
    InvalidIndex {
        /// Source line
        line: usize,
        /// The reference component as written
        reference: String,
    },

    /// Material property declared before any `newmtl`
    #[error("line {line}: '{keyword}' outside of a material")]
    OutsideMaterial {
        /// Source line
        line: usize,
        /// The property keyword
        keyword: String,
    },
}

impl ParseWarning {
    /// Source line of the warning
    pub const fn line(&self) -> usize {
        match self {
            Self::UnknownKeyword { line, .. }
            | Self::InvalidNumber { line, .. }
            | Self::MissingArgument { line, .. }
            | Self::InvalidIndex { line, .. }
            | Self::OutsideMaterial { line, .. } => *line,
        }
    }

    /// Whether the warning reports malformed data (as opposed to skipped content)
    ///
    /// Strict parsing turns these into errors.
    pub const fn is_malformed(&self) -> bool {
        matches!(
            self,
            Self::InvalidNumber { .. } | Self::MissingArgument { .. } | Self::InvalidIndex { .. }
        )
    }
}

/// Parse `N` floats from the start of `args`
///
/// Bad tokens become NaN and missing ones are NaN-filled; each problem is
/// recorded in `warnings`. Extra arguments are ignored.
pub fn read_floats<const N: usize>(line: &Line<'_>, warnings: &mut Vec<ParseWarning>) -> [f32; N] {
    let mut values = [f32::NAN; N];

    if line.args.len() < N {
        warnings.push(ParseWarning::MissingArgument {
            line: line.number,
            keyword: line.keyword.to_string(),
            expected: N,
        });
    }

    for (value, token) in values.iter_mut().zip(&line.args) {
        *value = read_float(token, line.number, warnings);
    }

    values
}

/// Parse a single float token, NaN on failure
pub fn read_float(token: &str, line: usize, warnings: &mut Vec<ParseWarning>) -> f32 {
    token.parse::<f32>().unwrap_or_else(|_| {
        warnings.push(ParseWarning::InvalidNumber {
            line,
            token: token.to_string(),
        });
        f32::NAN
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_skip_comments_and_blanks() {
        let text = "# header\n\n   \nv 1 2 3\r\n  # indented comment\nnewmtl  Red Paint  \n";
        let parsed: Vec<Line<'_>> = lines(text).collect();

        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].number, 4);
        assert_eq!(parsed[0].keyword, "v");
        assert_eq!(parsed[0].args, vec!["1", "2", "3"]);
        assert_eq!(parsed[1].keyword, "newmtl");
        assert_eq!(parsed[1].rest, "Red Paint");
    }

    #[test]
    fn test_read_floats_reports_problems() {
        let line = lines("vt 0.5 abc").next().unwrap();
        let mut warnings = Vec::new();
        let values: [f32; 3] = read_floats(&line, &mut warnings);

        assert_eq!(values[0], 0.5);
        assert!(values[1].is_nan());
        assert!(values[2].is_nan());
        assert_eq!(warnings.len(), 2);
        assert!(warnings.iter().all(ParseWarning::is_malformed));
    }

    #[test]
    fn test_warning_line_and_severity() {
        let text = "# cube
v 1 2
usemap wood
";
        let mut warnings = Vec::new();
        for line in lines(text) {
            if line.keyword == "v" {
                let _: [f32; 3] = read_floats(&line, &mut warnings);
            } else {
                warnings.push(ParseWarning::UnknownKeyword {
                    line: line.number,
                    keyword: line.keyword.to_string(),
                });
            }
        }

        let numbers: Vec<usize> = warnings.iter().map(ParseWarning::line).collect();
        assert_eq!(numbers, vec![2, 3]);
        assert!(warnings[0].is_malformed());
        assert!(!warnings[1].is_malformed());
    }
}
