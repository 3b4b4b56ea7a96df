//! Query surface over a built [`ScriptDateIndex`].
//!
//! Date text is parsed as `dd-mm-yyyy`; script text is matched as a symbol.
//! The interactive loop answers a malformed date with a message and keeps going.

use chrono::NaiveDate;
use std::io::{self, BufRead, Write};

use crate::domain::calendar::{format_day_month_year, parse_day_month_year};
use crate::domain::date_index::ScriptDateIndex;
use crate::domain::error::SwingError;

pub const INVALID_DATE_MESSAGE: &str = "Invalid date format. Please use dd-mm-yyyy.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    Date,
    Script,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    Date(NaiveDate),
    Script(String),
}

impl Query {
    pub fn parse(kind: QueryKind, text: &str) -> Result<Self, SwingError> {
        match kind {
            QueryKind::Date => parse_day_month_year(text).map(Query::Date),
            QueryKind::Script => Ok(Query::Script(text.trim().to_string())),
        }
    }

    /// `date <dd-mm-yyyy>` or `script <name>`; `None` for anything else.
    pub fn parse_command(line: &str) -> Option<Result<Self, SwingError>> {
        let (command, rest) = line.trim().split_once(char::is_whitespace)?;
        let kind = match command.to_lowercase().as_str() {
            "date" => QueryKind::Date,
            "script" => QueryKind::Script,
            _ => return None,
        };
        Some(Query::parse(kind, rest))
    }
}

/// User-visible answer lines for `query`.
pub fn answer(index: &ScriptDateIndex, query: &Query) -> Vec<String> {
    match query {
        Query::Date(date) => {
            let label = format_day_month_year(*date);
            let entries = index.lookup(*date);
            if entries.is_empty() {
                return vec![format!("No scripts found for {label}.")];
            }
            std::iter::once(format!("Scripts and degrees on {label}:"))
                .chain(
                    entries
                        .iter()
                        .map(|e| format!("Script: {}, Degree: {}", e.symbol, e.key)),
                )
                .collect()
        }
        Query::Script(symbol) => {
            let hits = index.lookup_by_symbol(symbol);
            if hits.is_empty() {
                return vec![format!("No data found for script '{symbol}'.")];
            }
            std::iter::once(format!("Dates and degrees for script '{symbol}':"))
                .chain(
                    hits.iter()
                        .map(|(date, key)| format!("Date: {date}, Degree: {key}")),
                )
                .collect()
        }
    }
}

/// Read commands from `input` until EOF or `quit`, writing answers to `output`.
pub fn run_interactive<R: BufRead, W: Write>(
    index: &ScriptDateIndex,
    input: R,
    mut output: W,
) -> io::Result<()> {
    for line in input.lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed.eq_ignore_ascii_case("quit") || trimmed.eq_ignore_ascii_case("exit") {
            break;
        }
        let lines = match Query::parse_command(trimmed) {
            Some(Ok(query)) => answer(index, &query),
            Some(Err(_)) => vec![INVALID_DATE_MESSAGE.to_string()],
            None => vec!["Usage: date <dd-mm-yyyy> | script <name> | quit".to_string()],
        };
        for l in lines {
            writeln!(output, "{l}")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::pivot::PivotRow;
    use crate::domain::projection::DateProjector;

    fn sample_index() -> ScriptDateIndex {
        let rows = vec![Ok(PivotRow {
            line: 2,
            symbol: "INFY".into(),
            pivot: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        })];
        ScriptDateIndex::build(&DateProjector::default(), rows).index
    }

    fn ask(index: &ScriptDateIndex, kind: QueryKind, text: &str) -> Vec<String> {
        answer(index, &Query::parse(kind, text).unwrap())
    }

    #[test]
    fn date_answer_lists_entries() {
        let lines = ask(&sample_index(), QueryKind::Date, "31-01-2024");
        assert_eq!(
            lines,
            vec![
                "Scripts and degrees on 31-01-2024:".to_string(),
                "Script: INFY, Degree: 30".to_string(),
            ]
        );
    }

    #[test]
    fn empty_date_answer() {
        let lines = ask(&sample_index(), QueryKind::Date, "01-02-2024");
        assert_eq!(lines, vec!["No scripts found for 01-02-2024.".to_string()]);
    }

    #[test]
    fn malformed_date_is_a_parse_error() {
        assert!(matches!(
            Query::parse(QueryKind::Date, "2024-01-31"),
            Err(SwingError::DateParse { .. })
        ));
    }

    #[test]
    fn script_answer_includes_second_cycle_labels() {
        let lines = ask(&sample_index(), QueryKind::Script, " infy ");
        assert_eq!(lines[0], "Dates and degrees for script 'infy':");
        assert_eq!(lines.len(), 35);
        assert!(lines.contains(&"Date: 30-01-2025, Degree: Degree_30_Second_Cycle_Date".to_string()));
    }

    #[test]
    fn parse_command_routes() {
        assert!(matches!(Query::parse_command("date 31-01-2024"), Some(Ok(Query::Date(_)))));
        assert!(matches!(
            Query::parse_command("SCRIPT tcs"),
            Some(Ok(Query::Script(s))) if s == "tcs"
        ));
        assert!(matches!(Query::parse_command("date 31/01/2024"), Some(Err(_))));
        assert!(Query::parse_command("hello").is_none());
    }

    #[test]
    fn interactive_loop_recovers_and_stops_at_quit() {
        let input = b"date 99-99-2024\nscript nobody\nquit\ndate 31-01-2024\n";
        let mut out = Vec::new();
        run_interactive(&sample_index(), &input[..], &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            format!("{INVALID_DATE_MESSAGE}\nNo data found for script 'nobody'.\n")
        );
    }
}
