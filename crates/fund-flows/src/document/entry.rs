//! Record literals
//!
//! One entry per line inside the page's `fundData` array:
//!
//! ```text
//! { date: "2024-11-05", price: 65000, holdings: 306050.0, btcFlow: 436.5, aum: 19893250000.0, usdFlow: 28372500.0 }
//! ```

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::error::EntryError;
use crate::model::MetricRecord;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Serialize a record in the page's literal format, full precision
pub fn render_entry(record: &MetricRecord) -> String {
    format!(
        "{{ date: \"{}\", price: {}, holdings: {}, btcFlow: {}, aum: {}, usdFlow: {} }}",
        record.date.format(DATE_FORMAT),
        record.price,
        record.holdings,
        record.btc_flow,
        record.aum,
        record.usd_flow,
    )
}

/// Raw value of `key` inside a literal, quotes left in place
pub fn field<'a>(entry: &'a str, key: &str) -> Option<&'a str> {
    let body = entry.trim().strip_prefix('{')?.strip_suffix('}')?;
    body.split(',').find_map(|pair| {
        let (k, v) = pair.split_once(':')?;
        (k.trim() == key).then(|| v.trim())
    })
}

fn required<'a>(entry: &'a str, key: &'static str) -> Result<&'a str, EntryError> {
    field(entry, key).ok_or(EntryError::MissingField(key))
}

pub fn parse_number(field: &'static str, raw: &str) -> Result<Decimal, EntryError> {
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .map_err(|_| EntryError::InvalidNumber {
            field,
            value: raw.to_string(),
        })
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, EntryError> {
    let unquoted = raw.trim_matches(|c| c == '"' || c == '\'');
    NaiveDate::parse_from_str(unquoted, DATE_FORMAT)
        .map_err(|_| EntryError::InvalidDate(raw.to_string()))
}

/// Parse a full literal back into a record
pub fn parse_entry(entry: &str) -> Result<MetricRecord, EntryError> {
    let trimmed = entry.trim();
    if !(trimmed.starts_with('{') && trimmed.ends_with('}')) {
        return Err(EntryError::NotALiteral(trimmed.to_string()));
    }

    Ok(MetricRecord {
        date: parse_date(required(trimmed, "date")?)?,
        price: parse_number("price", required(trimmed, "price")?)?,
        holdings: parse_number("holdings", required(trimmed, "holdings")?)?,
        btc_flow: parse_number("btcFlow", required(trimmed, "btcFlow")?)?,
        aum: parse_number("aum", required(trimmed, "aum")?)?,
        usd_flow: parse_number("usdFlow", required(trimmed, "usdFlow")?)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn scenario() -> MetricRecord {
        MetricRecord::derive(
            NaiveDate::from_ymd_opt(2024, 11, 5).unwrap(),
            dec!(65000),
            dec!(306050.0),
            dec!(305613.5),
        )
        .unwrap()
    }

    #[test]
    fn test_render_scenario() {
        assert_eq!(
            render_entry(&scenario()),
            "{ date: \"2024-11-05\", price: 65000, holdings: 306050.0, btcFlow: 436.5, aum: 19893250000.0, usdFlow: 28372500.0 }"
        );
    }

    #[test]
    fn test_reparse_renders_identically() {
        let first = render_entry(&scenario());
        let reparsed = parse_entry(&first).unwrap();

        assert_eq!(reparsed, scenario());
        assert_eq!(render_entry(&reparsed), first);
    }

    #[test]
    fn test_field_lookup() {
        let entry = "{ date: \"2024-11-04\", price: 64000, holdings: 305613.5, btcFlow: 0, aum: 1, usdFlow: 0 }";
        assert_eq!(field(entry, "holdings"), Some("305613.5"));
        assert_eq!(field(entry, "date"), Some("\"2024-11-04\""));
        assert_eq!(field(entry, "volume"), None);
        assert_eq!(field("const fundData = [", "holdings"), None);
    }

    #[test]
    fn test_parse_scientific_notation() {
        let entry = "{ date: \"2024-11-04\", price: 6.4e4, holdings: 1, btcFlow: 1.5e-05, aum: 64000, usdFlow: 0.96 }";
        let record = parse_entry(entry).unwrap();
        assert_eq!(record.price, dec!(64000));
        assert_eq!(record.btc_flow, dec!(0.000015));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            parse_entry("date: 1"),
            Err(EntryError::NotALiteral("date: 1".into()))
        );
        assert_eq!(
            parse_entry("{ date: \"2024-11-04\", price: 1 }"),
            Err(EntryError::MissingField("holdings"))
        );
        assert!(matches!(
            parse_entry("{ date: \"2024-11-04\", price: abc, holdings: 1, btcFlow: 0, aum: 0, usdFlow: 0 }"),
            Err(EntryError::InvalidNumber { field: "price", .. })
        ));
        assert!(matches!(
            parse_entry("{ date: \"yesterday\", price: 1, holdings: 1, btcFlow: 0, aum: 0, usdFlow: 0 }"),
            Err(EntryError::InvalidDate(_))
        ));
    }
}
