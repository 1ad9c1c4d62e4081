//! Serialized form of the published dataset.

use crate::pricing::AggregatedRecord;
use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

/// Serializes records as a 4-space indented JSON array.
///
/// Non-ASCII text is written as-is. The output is deterministic for a
/// given record order, so an unchanged dataset produces identical bytes.
pub fn serialize_dataset(records: &[AggregatedRecord]) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let mut serializer =
        Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    records.serialize(&mut serializer).context("Failed to serialize dataset")?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::PlanCategory;

    fn record(
        country: &str,
        plan: PlanCategory,
        local: f64,
        currency: &str,
        reference: f64,
    ) -> AggregatedRecord {
        AggregatedRecord {
            country_code: country.to_string(),
            plan_category: plan,
            local_price: local,
            local_currency: currency.to_string(),
            reference_price: reference,
        }
    }

    #[test]
    fn test_dataset_shape() {
        let records = vec![record("US", PlanCategory::Individual, 11.99, "USD", 85.64)];
        let json = String::from_utf8(serialize_dataset(&records).unwrap()).unwrap();

        let expected = r#"[
    {
        "country_code": "US",
        "plan_name": "Individual",
        "local_price": 11.99,
        "local_currency": "USD",
        "price_cny": 85.64
    }
]"#;
        assert_eq!(json, expected);
    }

    #[test]
    fn test_dataset_round_trips_through_consumer_keys() {
        let records = vec![
            record("DE", PlanCategory::Duo, 14.99, "EUR", 116.18),
            record("KR", PlanCategory::Unknown, 10900.0, "KRW", 56.39),
        ];
        let bytes = serialize_dataset(&records).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        let first = &value[0];
        assert_eq!(first["plan_name"], "Duo");
        assert_eq!(first["price_cny"], 116.18);
        assert!(first.get("plan_category").is_none());
        assert!(first.get("reference_price").is_none());

        let parsed: Vec<AggregatedRecord> = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(parsed, records);
    }

    #[test]
    fn test_empty_dataset() {
        assert_eq!(serialize_dataset(&[]).unwrap(), b"[]");
    }

    #[test]
    fn test_serialization_is_deterministic() {
        let records = vec![record("JP", PlanCategory::Family, 1980.0, "JPY", 95.4)];
        assert_eq!(serialize_dataset(&records).unwrap(), serialize_dataset(&records).unwrap());
    }
}
