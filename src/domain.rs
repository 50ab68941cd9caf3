use std::io::Error;
use std::str::FromStr;

use derive_setters::Setters;
use ratatui::crossterm::event::KeyEvent;

use crate::engine::Record;

pub const HELP_TEXT: &str = "jtv key bindings

  /        edit the search text (Enter commits, Esc reverts)
  f        cycle the category filter (All -> categories -> All)
  n, Right next page
  p, Left  previous page
  1-9      jump to page
  ?        show this help
  Esc      close popup
  q        quit
";

// Custom error type used throughout jtv.
#[derive(Debug)]
pub enum JtvError {
    IoError(Error),
    HttpError(reqwest::Error),
    InvalidColumn(String),
}

impl From<Error> for JtvError {
    fn from(err: Error) -> Self {
        JtvError::IoError(err)
    }
}

impl From<reqwest::Error> for JtvError {
    fn from(err: reqwest::Error) -> Self {
        JtvError::HttpError(err)
    }
}

/// Maps a record field to a display header. Order of the column list is
/// display order; accessors missing on a record render as empty cells.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSpec {
    pub header: String,
    pub accessor: String,
}

impl ColumnSpec {
    pub fn new(header: impl Into<String>, accessor: impl Into<String>) -> Self {
        ColumnSpec {
            header: header.into(),
            accessor: accessor.into(),
        }
    }
}

impl FromStr for ColumnSpec {
    type Err = JtvError;

    // Accepts "HEADER:ACCESSOR" or a bare field name used for both.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (header, accessor) = match s.split_once(':') {
            Some((h, a)) => (h, a),
            None => (s, s),
        };
        if header.is_empty() || accessor.is_empty() {
            return Err(JtvError::InvalidColumn(s.to_string()));
        }
        Ok(ColumnSpec::new(header, accessor))
    }
}

#[derive(Debug, Clone, Setters)]
#[setters(into)]
pub struct ViewConfig {
    pub endpoint: String,
    pub columns: Vec<ColumnSpec>,
    pub page_size: usize,
    pub event_poll_time: u64,
    pub request_timeout: u64,
}

impl Default for ViewConfig {
    fn default() -> Self {
        ViewConfig {
            endpoint: String::new(),
            columns: Vec::new(),
            page_size: 5,
            event_poll_time: 100,
            request_timeout: 30,
        }
    }
}

#[derive(Debug)]
pub enum Message {
    Quit,
    NextPage,
    PrevPage,
    JumpPage(usize),
    CycleFilter,
    Search,
    Help,
    Exit,
    RawKey(KeyEvent),
    DataLoaded(Vec<Record>),
    LoadFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_spec_parses_header_accessor_pair() {
        let col: ColumnSpec = "Name:name".parse().unwrap();
        assert_eq!(col, ColumnSpec::new("Name", "name"));
    }

    #[test]
    fn column_spec_bare_field_is_both_header_and_accessor() {
        let col: ColumnSpec = "price".parse().unwrap();
        assert_eq!(col, ColumnSpec::new("price", "price"));
    }

    #[test]
    fn column_spec_rejects_empty_parts() {
        assert!(ColumnSpec::from_str(":name").is_err());
        assert!(ColumnSpec::from_str("Name:").is_err());
        assert!(ColumnSpec::from_str("").is_err());
    }
}
