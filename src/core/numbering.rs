use chrono::{Datelike, NaiveDate};

use super::error::FatturaError;

/// Sequential invoice number generator.
///
/// Produces numbers in the fixed format `INV-YYYY-NNNNNN`, e.g.
/// "INV-2025-000001". The counter resets at year boundaries.
#[derive(Debug, Clone)]
pub struct InvoiceNumberSequence {
    year: i32,
    next_number: u64,
}

const PREFIX: &str = "INV";

impl InvoiceNumberSequence {
    /// Create a new sequence starting at 1.
    pub fn new(year: i32) -> Self {
        Self {
            year,
            next_number: 1,
        }
    }

    /// Create a sequence continuing from a given number.
    pub fn starting_at(year: i32, next_number: u64) -> Self {
        Self { year, next_number }
    }

    /// Continue after the highest persisted number for `year`.
    ///
    /// Numbers from other years or in a foreign format are ignored, so the
    /// sequence can be rebuilt from a raw store listing.
    pub fn resume_from<'a>(numbers: impl IntoIterator<Item = &'a str>, year: i32) -> Self {
        let max = numbers
            .into_iter()
            .filter_map(|n| parse_number(n, year))
            .max()
            .unwrap_or(0);
        Self {
            year,
            next_number: max + 1,
        }
    }

    /// Generate the next invoice number, consuming it.
    pub fn next_number(&mut self) -> String {
        let num = self.next_number;
        self.next_number += 1;
        format_number(self.year, num)
    }

    /// Preview the next number without consuming it.
    pub fn peek(&self) -> String {
        format_number(self.year, self.next_number)
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// Advance to a new year, resetting the counter to 1.
    pub fn advance_year(&mut self, new_year: i32) -> Result<(), FatturaError> {
        if new_year <= self.year {
            return Err(FatturaError::Numbering(format!(
                "new year {new_year} must be greater than current year {}",
                self.year
            )));
        }
        self.year = new_year;
        self.next_number = 1;
        Ok(())
    }

    /// Auto-advance year if the given date is in a later year.
    /// Returns true if the year was advanced.
    pub fn auto_advance(&mut self, date: NaiveDate) -> bool {
        if date.year() > self.year {
            self.year = date.year();
            self.next_number = 1;
            true
        } else {
            false
        }
    }
}

fn format_number(year: i32, num: u64) -> String {
    format!("{PREFIX}-{year}-{num:06}")
}

/// Parse `INV-YYYY-NNNNNN` for the given year; None for anything else.
fn parse_number(number: &str, year: i32) -> Option<u64> {
    let rest = number.strip_prefix(PREFIX)?.strip_prefix('-')?;
    let (y, seq) = rest.split_once('-')?;
    if y.parse::<i32>().ok()? != year {
        return None;
    }
    seq.parse().ok()
}
