//! CSV import of debt lists for the command line and demos.
//!
//! Expected headers are `name,balance,apr,min_payment`; `minPayment` and
//! `min payment` are accepted too, and amounts may carry currency symbols or
//! thousands separators.

mod parser;

use crate::payoff::{Debt, PlannerError};
use std::io::Read;
use std::path::Path;
use tracing::debug;

#[derive(Debug)]
pub enum DebtImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    Invalid(PlannerError),
}

impl std::fmt::Display for DebtImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DebtImportError::Io(err) => write!(f, "failed to read debt file: {}", err),
            DebtImportError::Csv(err) => write!(f, "invalid debt CSV data: {}", err),
            DebtImportError::Invalid(err) => write!(f, "debt file rejected: {}", err),
        }
    }
}

impl std::error::Error for DebtImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DebtImportError::Io(err) => Some(err),
            DebtImportError::Csv(err) => Some(err),
            DebtImportError::Invalid(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for DebtImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for DebtImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

impl From<PlannerError> for DebtImportError {
    fn from(err: PlannerError) -> Self {
        Self::Invalid(err)
    }
}

pub struct DebtCsvImporter;

impl DebtCsvImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<Debt>, DebtImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<Debt>, DebtImportError> {
        let records = parser::parse_records(reader)?;
        if records.is_empty() {
            return Err(PlannerError::InvalidInput("at least one debt is required".into()).into());
        }

        let debts = records
            .into_iter()
            .map(|record| {
                Debt::try_from(record.input).map_err(|err| match err {
                    PlannerError::InvalidInput(message) => {
                        PlannerError::InvalidInput(format!("line {}: {message}", record.line))
                    }
                    other => other,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!(debts = debts.len(), "imported debts from csv");
        Ok(debts)
    }
}
