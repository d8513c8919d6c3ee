//! The `fundData` array literal between the data markers

use crate::error::{EntryError, HoldingsLookupError};
use crate::model::MetricRecord;

use super::entry;

const DEFAULT_ENTRY_INDENT: &str = "            ";

/// One line of the array literal, separator stripped
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    pub indent: String,
    pub text: String,
}

impl Entry {
    pub fn record(&self) -> Result<MetricRecord, EntryError> {
        entry::parse_entry(&self.text)
    }
}

/// Parsed text between the data markers.
///
/// Everything outside the entry lines (`const fundData = [`, `];` and the
/// surrounding whitespace) is kept verbatim so an unchanged region renders
/// back to the same bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataRegion {
    /// Text up to and including `[`
    head: String,
    entries: Vec<Entry>,
    /// `]` directly follows the last entry on the same line
    close_inline: bool,
    /// Whitespace before `]` when it sits on its own line
    close_indent: String,
    /// Text from `]` to the end of the region
    tail: String,
    /// Line ending used inside the array
    newline: &'static str,
}

impl DataRegion {
    pub fn parse(body: &str) -> Result<Self, String> {
        let open = body
            .find('[')
            .ok_or_else(|| "no `[` opening the record array".to_string())?;
        let close = body
            .rfind(']')
            .filter(|&close| close > open)
            .ok_or_else(|| "no `]` closing the record array".to_string())?;

        let inner = &body[open + 1..close];
        let newline = if body.contains("\r\n") { "\r\n" } else { "\n" };
        let entries = inner
            .split('\n')
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                let text = line.trim();
                Entry {
                    indent: line[..line.len() - line.trim_start().len()].to_string(),
                    text: text.strip_suffix(',').unwrap_or(text).trim_end().to_string(),
                }
            })
            .collect();

        let last_line = inner.rsplit('\n').next().unwrap_or_default();
        let close_inline = !last_line.trim().is_empty();

        Ok(Self {
            head: body[..=open].to_string(),
            entries,
            close_inline,
            close_indent: if close_inline {
                String::new()
            } else {
                last_line.to_string()
            },
            tail: body[close..].to_string(),
            newline,
        })
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn last(&self) -> Option<&Entry> {
        self.entries.last()
    }

    /// Holdings of the last entry
    pub fn last_holdings(&self) -> Result<rust_decimal::Decimal, HoldingsLookupError> {
        let last = self.last().ok_or(HoldingsLookupError::EmptySequence)?;
        let raw = entry::field(&last.text, "holdings").ok_or(EntryError::MissingField("holdings"))?;
        Ok(entry::parse_number("holdings", raw)?)
    }

    /// Date of the last entry, when it can be read
    pub fn last_date(&self) -> Option<chrono::NaiveDate> {
        let last = self.last()?;
        entry::parse_date(entry::field(&last.text, "date")?).ok()
    }

    /// Append a record, reusing the last entry's indentation
    pub fn push(&mut self, record: &MetricRecord) {
        let indent = self
            .last()
            .map_or_else(|| DEFAULT_ENTRY_INDENT.to_string(), |e| e.indent.clone());
        self.entries.push(Entry {
            indent,
            text: entry::render_entry(record),
        });
    }

    pub fn render(&self) -> String {
        let mut out = self.head.clone();
        out.push_str(self.newline);

        let count = self.entries.len();
        for (i, e) in self.entries.iter().enumerate() {
            out.push_str(&e.indent);
            out.push_str(&e.text);
            if i + 1 < count {
                out.push(',');
                out.push_str(self.newline);
            } else if !self.close_inline {
                out.push_str(self.newline);
            }
        }

        if !self.close_inline || count == 0 {
            out.push_str(&self.close_indent);
        }
        out.push_str(&self.tail);
        out
    }
}
