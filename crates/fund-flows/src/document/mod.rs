//! Tracker Page
//!
//! The persisted state is a single HTML page with two regions the tracker
//! owns:
//!
//! ```text
//! <p id="aiContent" ...>            ◀─ narrative region (one paragraph)
//!     ...
//! </p>
//! ...
//! // <NEW_FUND_DATA_INJECTION>      ◀─ data region (record array literal)
//!     const fundData = [ {..}, {..} ];
//! // </NEW_FUND_DATA_INJECTION>
//! ```
//!
//! [`TrackerDocument::parse`] locates and validates both regions up front,
//! so an update either renders a complete new page or fails without output.

mod data_region;
pub mod entry;

pub use data_region::{DataRegion, Entry};

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::error::{EntryError, HoldingsLookupError, Result, TrackerError};
use crate::model::MetricRecord;

/// Literal strings delimiting the tracker-owned regions
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Markers {
    pub data_start: String,
    pub data_end: String,
    pub narrative_open: String,
    pub narrative_close: String,
    /// Replaced everywhere by the newest record's date
    pub date_placeholder: String,
}

impl Default for Markers {
    fn default() -> Self {
        Self {
            data_start: "// <NEW_FUND_DATA_INJECTION>".into(),
            data_end: "// </NEW_FUND_DATA_INJECTION>".into(),
            narrative_open: r#"<p id="aiContent" class="text-lg text-gray-700 leading-relaxed mb-8">"#
                .into(),
            narrative_close: "</p>".into(),
            date_placeholder: "DATE_PLACEHOLDER".into(),
        }
    }
}

/// Byte range of a region's content, markers excluded
fn locate(text: &str, open: &str, close: &str) -> Option<(usize, usize)> {
    let start = text.find(open)? + open.len();
    let end = start + text[start..].find(close)?;
    Some((start, end))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Segment {
    /// Untouched page text, by byte range into `source`
    Text(usize, usize),
    Data,
    Narrative,
}

/// Structured view of the tracker page
#[derive(Clone, Debug)]
pub struct TrackerDocument {
    source: String,
    segments: Vec<Segment>,
    data: DataRegion,
    narrative: String,
    date_placeholder: String,
    last_updated: Option<NaiveDate>,
}

impl TrackerDocument {
    pub fn parse(text: &str, markers: &Markers) -> Result<Self> {
        let data = locate(text, &markers.data_start, &markers.data_end).ok_or_else(|| {
            TrackerError::MarkersNotFound(format!(
                "data region `{}` .. `{}`",
                markers.data_start, markers.data_end
            ))
        })?;
        let narrative = locate(text, &markers.narrative_open, &markers.narrative_close)
            .ok_or_else(|| {
                TrackerError::MarkersNotFound(format!(
                    "narrative region `{}` .. `{}`",
                    markers.narrative_open, markers.narrative_close
                ))
            })?;

        let region = DataRegion::parse(&text[data.0..data.1])
            .map_err(TrackerError::MalformedDataRegion)?;

        let ((first, first_kind), (second, second_kind)) = if data.0 < narrative.0 {
            ((data, Segment::Data), (narrative, Segment::Narrative))
        } else {
            ((narrative, Segment::Narrative), (data, Segment::Data))
        };
        // Markers of one region must not sit inside the other
        if first.1 > second.0 {
            return Err(TrackerError::MarkersNotFound(
                "data and narrative regions overlap".into(),
            ));
        }

        Ok(Self {
            source: text.to_string(),
            segments: vec![
                Segment::Text(0, first.0),
                first_kind,
                Segment::Text(first.1, second.0),
                second_kind,
                Segment::Text(second.1, text.len()),
            ],
            data: region,
            narrative: text[narrative.0..narrative.1].to_string(),
            date_placeholder: markers.date_placeholder.clone(),
            last_updated: None,
        })
    }

    pub fn entries(&self) -> &[Entry] {
        self.data.entries()
    }

    /// Current narrative text, surrounding whitespace trimmed
    pub fn narrative(&self) -> &str {
        self.narrative.trim()
    }

    /// Append a record; its date must follow the last readable date
    pub fn append(&mut self, record: &MetricRecord) -> Result<()> {
        if let Some(last) = self.data.last_date() {
            if record.date <= last {
                return Err(TrackerError::DateNotAfterLast {
                    last,
                    new: record.date,
                });
            }
        }
        self.data.push(record);
        self.last_updated = Some(record.date);
        Ok(())
    }

    /// Replace the whole narrative, keeping the whitespace around it
    pub fn set_narrative(&mut self, text: &str) {
        let current = &self.narrative;
        let leading = &current[..current.len() - current.trim_start().len()];
        let trailing = if current.trim().is_empty() {
            ""
        } else {
            &current[current.trim_end().len()..]
        };
        self.narrative = format!("{leading}{}{trailing}", escape_html(text));
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match *segment {
                Segment::Text(start, end) => out.push_str(&self.source[start..end]),
                Segment::Data => out.push_str(&self.data.render()),
                Segment::Narrative => out.push_str(&self.narrative),
            }
        }

        match self.last_updated {
            Some(date) => out.replace(&self.date_placeholder, &date.format("%Y-%m-%d").to_string()),
            None => out,
        }
    }
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Append `record`, replace the narrative and stamp the date, all or nothing
pub fn inject(
    prior_state: &str,
    record: &MetricRecord,
    narrative: &str,
    markers: &Markers,
) -> Result<String> {
    let mut document = TrackerDocument::parse(prior_state, markers)?;
    document.append(record)?;
    document.set_narrative(narrative);
    Ok(document.render())
}

/// Data region only; the narrative region is not needed to read records
fn data_region(text: &str, markers: &Markers) -> std::result::Result<DataRegion, HoldingsLookupError> {
    let (start, end) = locate(text, &markers.data_start, &markers.data_end)
        .ok_or(HoldingsLookupError::MissingMarkers)?;
    DataRegion::parse(&text[start..end]).map_err(HoldingsLookupError::MalformedRegion)
}

/// Holdings of the last persisted record
pub fn last_holdings(text: &str, markers: &Markers) -> std::result::Result<Decimal, HoldingsLookupError> {
    data_region(text, markers)?.last_holdings()
}

/// Every persisted record in order, each parsed independently
pub fn read_records(
    text: &str,
    markers: &Markers,
) -> std::result::Result<Vec<std::result::Result<MetricRecord, EntryError>>, HoldingsLookupError> {
    Ok(data_region(text, markers)?
        .entries()
        .iter()
        .map(Entry::record)
        .collect())
}
