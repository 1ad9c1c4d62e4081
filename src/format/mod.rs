//! Output formatting for price records (table, JSON, markdown, CSV).

use crate::config::OutputFormat;
use crate::pricing::AggregatedRecord;
use crate::rates::ExchangeRateTable;
use crate::storefront::Country;

/// Formats records for output.
pub struct Formatter {
    format: OutputFormat,
    base_currency: String,
}

impl Formatter {
    /// Creates a new formatter. `base_currency` labels the reference column.
    pub fn new(format: OutputFormat, base_currency: impl Into<String>) -> Self {
        Self { format, base_currency: base_currency.into() }
    }

    /// Formats aggregated records.
    pub fn format_records(&self, records: &[AggregatedRecord]) -> String {
        if records.is_empty() {
            return match self.format {
                OutputFormat::Json => "[]".to_string(),
                OutputFormat::Csv => self.csv_header(),
                _ => "No prices collected.".to_string(),
            };
        }

        match self.format {
            OutputFormat::Json => self.json_records(records),
            OutputFormat::Table => self.table_records(records),
            OutputFormat::Markdown => self.markdown_records(records),
            OutputFormat::Csv => self.csv_records(records),
        }
    }

    /// Formats the rate of each configured currency.
    pub fn format_rates(&self, rates: &ExchangeRateTable, countries: &[Country]) -> String {
        let rows: Vec<(&Country, Option<f64>)> =
            countries.iter().map(|c| (c, rates.rate(&c.currency))).collect();

        match self.format {
            OutputFormat::Json => {
                let map: serde_json::Map<String, serde_json::Value> = rows
                    .iter()
                    .map(|(c, rate)| (c.currency.clone(), serde_json::json!(rate)))
                    .collect();
                serde_json::to_string_pretty(&map).unwrap_or_else(|_| "{}".to_string())
            }
            OutputFormat::Csv => {
                let mut lines = vec!["country,currency,rate".to_string()];
                for (country, rate) in &rows {
                    lines.push(format!(
                        "{},{},{}",
                        country.code,
                        country.currency,
                        rate.map(|r| r.to_string()).unwrap_or_default()
                    ));
                }
                lines.join("\n")
            }
            OutputFormat::Markdown => {
                let mut lines = vec![
                    format!("| Country | Currency | Per 1 {} |", rates.base),
                    "|---------|----------|-------|".to_string(),
                ];
                for (country, rate) in &rows {
                    lines.push(format!(
                        "| {} | {} | {} |",
                        country.code,
                        country.currency,
                        rate.map(|r| r.to_string()).unwrap_or_else(|| "N/A".to_string())
                    ));
                }
                lines.join("\n")
            }
            OutputFormat::Table => {
                let per_unit = format!("Per 1 {}", rates.base);
                let mut lines = vec![
                    format!("{:<8}  {:<8}  {:>14}", "Country", "Currency", per_unit),
                    format!("{:-<8}  {:-<8}  {:-<14}", "", "", ""),
                ];
                for (country, rate) in &rows {
                    let rate_str =
                        rate.map(|r| format!("{:.4}", r)).unwrap_or_else(|| "N/A".to_string());
                    lines.push(format!(
                        "{:<8}  {:<8}  {:>14}",
                        country.code, country.currency, rate_str
                    ));
                }
                lines.join("\n")
            }
        }
    }

    // JSON formatting

    fn json_records(&self, records: &[AggregatedRecord]) -> String {
        serde_json::to_string_pretty(records).unwrap_or_else(|_| "[]".to_string())
    }

    // Table formatting

    fn table_records(&self, records: &[AggregatedRecord]) -> String {
        let country_width = 7;
        let plan_width = 10;
        let local_width = 14;
        let currency_width = 8;
        let reference_width = 12;

        let mut lines = Vec::new();

        lines.push(format!(
            "{:<country_width$}  {:<plan_width$}  {:>local_width$}  {:<currency_width$}  {:>reference_width$}",
            "Country", "Plan", "Local price", "Currency", self.base_currency
        ));
        lines.push(format!(
            "{:-<country_width$}  {:-<plan_width$}  {:-<local_width$}  {:-<currency_width$}  {:-<reference_width$}",
            "", "", "", "", ""
        ));

        for record in records {
            lines.push(format!(
                "{:<country_width$}  {:<plan_width$}  {:>local_width$.2}  {:<currency_width$}  {:>reference_width$.2}",
                record.country_code,
                record.plan_category.as_str(),
                record.local_price,
                record.local_currency,
                record.reference_price
            ));
        }

        lines.push(String::new());
        lines.push(format!("Total: {} records", records.len()));

        lines.join("\n")
    }

    // Markdown formatting

    fn markdown_records(&self, records: &[AggregatedRecord]) -> String {
        let mut lines = Vec::new();

        lines.push(format!("| Country | Plan | Local price | {} |", self.base_currency));
        lines.push("|---------|------|-------------|-----|".to_string());

        for record in records {
            lines.push(format!(
                "| {} | {} | {} {:.2} | {:.2} |",
                record.country_code,
                record.plan_category,
                record.local_currency,
                record.local_price,
                record.reference_price
            ));
        }

        lines.push(String::new());
        lines.push(format!("*{} records*", records.len()));

        lines.join("\n")
    }

    // CSV formatting

    fn csv_header(&self) -> String {
        "country_code,plan_name,local_price,local_currency,price_cny".to_string()
    }

    fn csv_records(&self, records: &[AggregatedRecord]) -> String {
        let mut lines = Vec::new();
        lines.push(self.csv_header());

        for record in records {
            lines.push(format!(
                "{},{},{},{},{}",
                Self::csv_escape(&record.country_code),
                record.plan_category,
                record.local_price,
                Self::csv_escape(&record.local_currency),
                record.reference_price
            ));
        }

        lines.join("\n")
    }

    fn csv_escape(s: &str) -> String {
        if s.contains(',') || s.contains('"') || s.contains('\n') {
            format!("\"{}\"", s.replace('"', "\"\""))
        } else {
            s.to_string()
        }
    }
}
