use crate::payoff::{DebtInput, PlannerError};
use serde::{Deserialize, Deserializer};
use std::io::Read;

/// A CSV row lifted into the wire type, tagged with its 1-based file line.
#[derive(Debug)]
pub(crate) struct DebtRecord {
    pub(crate) line: usize,
    pub(crate) input: DebtInput,
}

pub(crate) fn parse_records<R: Read>(reader: R) -> Result<Vec<DebtRecord>, super::DebtImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut records = Vec::new();

    for (index, record) in csv_reader.deserialize::<DebtRow>().enumerate() {
        let row = record?;
        // header occupies line 1
        let line = index + 2;
        records.push(DebtRecord {
            line,
            input: row.into_input(line)?,
        });
    }

    Ok(records)
}

#[derive(Debug, Deserialize)]
struct DebtRow {
    #[serde(default, alias = "Name", deserialize_with = "empty_string_as_none")]
    name: Option<String>,
    #[serde(default, alias = "Balance", deserialize_with = "empty_string_as_none")]
    balance: Option<String>,
    #[serde(
        default,
        alias = "APR",
        alias = "Apr",
        deserialize_with = "empty_string_as_none"
    )]
    apr: Option<String>,
    #[serde(
        default,
        alias = "minPayment",
        alias = "min payment",
        alias = "Min Payment",
        deserialize_with = "empty_string_as_none"
    )]
    min_payment: Option<String>,
}

impl DebtRow {
    fn into_input(self, line: usize) -> Result<DebtInput, PlannerError> {
        Ok(DebtInput {
            name: self.name,
            balance: parse_field(line, "balance", self.balance.as_deref())?,
            apr: parse_field(line, "apr", self.apr.as_deref())?,
            min_payment: parse_field(line, "min_payment", self.min_payment.as_deref())?,
        })
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn parse_field(line: usize, field: &str, raw: Option<&str>) -> Result<Option<f64>, PlannerError> {
    raw.map(|value| {
        parse_amount(value).ok_or_else(|| {
            PlannerError::InvalidInput(format!(
                "line {line}: {field} '{value}' is not a number"
            ))
        })
    })
    .transpose()
}

/// Accepts spreadsheet-style figures such as `£1,250.00` or `19.9%`.
fn parse_amount(value: &str) -> Option<f64> {
    let cleaned: String = value
        .trim()
        .chars()
        .filter(|c| !matches!(c, ',' | '%' | '£' | '$' | '€' | ' '))
        .collect();
    cleaned.parse::<f64>().ok().filter(|amount| amount.is_finite())
}
