//! Reduction of priced observations to one record per (country, plan).

use super::models::{AggregatedRecord, PlanCategory, PricedObservation};
use std::collections::HashMap;
use tracing::trace;

/// Keeps the cheapest usable observation for every (country, plan) key.
///
/// Observations missing either price are dropped. Ties keep the first
/// observation seen, and records come out in order of each key's first
/// appearance, so equal input order always gives equal output.
pub fn reduce<I>(observations: I) -> Vec<AggregatedRecord>
where
    I: IntoIterator<Item = PricedObservation>,
{
    let mut records: Vec<AggregatedRecord> = Vec::new();
    let mut index: HashMap<(String, PlanCategory), usize> = HashMap::new();

    for obs in observations {
        let (Some(local_price), Some(reference_price)) = (obs.local_price, obs.reference_price)
        else {
            trace!("Dropping unusable observation for {} {}", obs.country_code, obs.plan_category);
            continue;
        };

        let key = (obs.country_code.clone(), obs.plan_category);
        match index.get(&key) {
            Some(&slot) => {
                let current = &mut records[slot];
                if reference_price < current.reference_price {
                    current.local_price = local_price;
                    current.local_currency = obs.local_currency;
                    current.reference_price = reference_price;
                }
            }
            None => {
                index.insert(key, records.len());
                records.push(AggregatedRecord {
                    country_code: obs.country_code,
                    plan_category: obs.plan_category,
                    local_price,
                    local_currency: obs.local_currency,
                    reference_price,
                });
            }
        }
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn obs(
        country: &str,
        plan: PlanCategory,
        local: Option<f64>,
        currency: &str,
        reference: Option<f64>,
    ) -> PricedObservation {
        PricedObservation {
            country_code: country.to_string(),
            plan_category: plan,
            local_price: local,
            local_currency: currency.to_string(),
            reference_price: reference,
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(reduce(Vec::new()).is_empty());
    }

    #[test]
    fn test_all_unusable() {
        let input = vec![
            obs("US", PlanCategory::Individual, Some(9.99), "USD", None),
            obs("US", PlanCategory::Duo, None, "USD", Some(1.0)),
        ];
        assert!(reduce(input).is_empty());
    }

    #[test]
    fn test_minimum_selection() {
        let input = vec![
            obs("US", PlanCategory::Individual, Some(10.99), "USD", Some(9.99)),
            obs("US", PlanCategory::Individual, Some(9.49), "USD", Some(8.99)),
        ];

        let output = reduce(input);
        assert_eq!(output.len(), 1);
        assert_eq!(output[0].reference_price, 8.99);
        assert_eq!(output[0].local_price, 9.49);
        assert_eq!(output[0].local_currency, "USD");
    }

    #[test]
    fn test_tie_keeps_first_seen() {
        let input = vec![
            obs("DE", PlanCategory::Family, Some(17.99), "EUR", Some(140.0)),
            obs("DE", PlanCategory::Family, Some(18.99), "EUR", Some(140.0)),
        ];

        let output = reduce(input);
        assert_eq!(output.len(), 1);
        assert_eq!(output[0].local_price, 17.99);
    }

    #[test]
    fn test_unusable_never_wins() {
        let input = vec![
            obs("JP", PlanCategory::Student, Some(480.0), "JPY", None),
            obs("JP", PlanCategory::Student, Some(580.0), "JPY", Some(27.55)),
        ];

        let output = reduce(input);
        assert_eq!(output.len(), 1);
        assert_eq!(output[0].local_price, 580.0);
    }

    #[test]
    fn test_output_order_is_first_appearance() {
        let input = vec![
            obs("NG", PlanCategory::Duo, Some(1500.0), "NGN", Some(7.0)),
            obs("SG", PlanCategory::Individual, Some(10.98), "SGD", Some(60.0)),
            obs("NG", PlanCategory::Individual, Some(1100.0), "NGN", Some(5.0)),
            obs("NG", PlanCategory::Duo, Some(1400.0), "NGN", Some(6.5)),
        ];

        let output = reduce(input);
        let keys: Vec<_> =
            output.iter().map(|r| (r.country_code.as_str(), r.plan_category)).collect();
        assert_eq!(
            keys,
            vec![
                ("NG", PlanCategory::Duo),
                ("SG", PlanCategory::Individual),
                ("NG", PlanCategory::Individual),
            ]
        );
        assert_eq!(output[0].reference_price, 6.5);
    }

    #[test]
    fn test_idempotent_for_same_input() {
        let input = vec![
            obs("US", PlanCategory::Individual, Some(11.99), "USD", Some(85.0)),
            obs("GB", PlanCategory::Duo, Some(16.99), "GBP", Some(156.0)),
            obs("US", PlanCategory::Individual, Some(10.99), "USD", Some(78.0)),
            obs("US", PlanCategory::Unknown, Some(5.99), "USD", Some(42.0)),
        ];

        assert_eq!(reduce(input.clone()), reduce(input));
    }

    #[test]
    fn test_keys_unique() {
        let mut input = Vec::new();
        for i in 0..20 {
            let plan = PlanCategory::all()[i % 5];
            let country = if i % 2 == 0 { "US" } else { "BR" };
            input.push(obs(country, plan, Some(i as f64), "USD", Some(i as f64)));
        }

        let output = reduce(input);
        let keys: HashSet<_> =
            output.iter().map(|r| (r.country_code.clone(), r.plan_category)).collect();
        assert_eq!(keys.len(), output.len());
        assert_eq!(output.len(), 10);
    }
}
