//! Presentation of a score breakdown
//!
//! Turns a [`ScoreBreakdown`] into the pieces a front end shows: the headline
//! number, a progress indicator, and the labelled contributions.

use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use crate::error::Result;
use crate::models::ScoreBreakdown;

/// Shown alongside every score
pub const DISCLAIMER: &str = "Toy model for educational purposes - not medical advice.";

/// One labelled line of the breakdown
#[derive(Debug, Clone, PartialEq, Eq, Tabled)]
pub struct ContributionRow {
    #[tabled(rename = "Component")]
    pub label: &'static str,
    #[tabled(rename = "Value")]
    pub value: String,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    headline: String,
    progress_percent: u8,
    base: Decimal,
    #[serde(flatten)]
    breakdown: &'a ScoreBreakdown,
}

/// Display-ready view of a breakdown
#[derive(Debug, Clone, Copy)]
pub struct ScoreReport<'a> {
    breakdown: &'a ScoreBreakdown,
}

impl<'a> ScoreReport<'a> {
    pub fn new(breakdown: &'a ScoreBreakdown) -> Self {
        ScoreReport { breakdown }
    }

    /// e.g. `48.7 / 100`
    pub fn headline(&self) -> String {
        format!("{:.1} / 100", self.breakdown.clamped_score)
    }

    /// Whole-number fill level for a progress indicator (0-100)
    pub fn progress_percent(&self) -> u8 {
        self.breakdown
            .clamped_score
            .trunc()
            .to_u8()
            .unwrap_or(0)
            .min(100)
    }

    /// Text progress bar `width` cells wide, e.g. `[####------]`
    pub fn progress_bar(&self, width: usize) -> String {
        let filled = usize::from(self.progress_percent()) * width / 100;
        format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
    }

    /// Labelled contributions with explicit signs on the additive and
    /// subtractive terms
    pub fn contribution_rows(&self) -> Vec<ContributionRow> {
        let b = self.breakdown;
        vec![
            ContributionRow {
                label: "Sleep gain",
                value: signed(b.sleep_gain, '+'),
            },
            ContributionRow {
                label: "Activity load",
                value: signed(-b.activity_load, '-'),
            },
            ContributionRow {
                label: "HR stress",
                value: signed(-b.heart_rate_stress, '-'),
            },
            ContributionRow {
                label: "Base",
                value: signed(b.base(), '+'),
            },
            ContributionRow {
                label: "Unclamped total",
                value: format!("{:.1}", b.raw_total),
            },
            ContributionRow {
                label: "Final (clamped 0-100)",
                value: format!("{:.1}", b.clamped_score),
            },
        ]
    }

    /// `- Label: value` lines
    pub fn contribution_lines(&self) -> Vec<String> {
        self.contribution_rows()
            .into_iter()
            .map(|row| format!("- {}: {}", row.label, row.value))
            .collect()
    }

    pub fn to_table(&self) -> String {
        Table::new(self.contribution_rows())
            .with(Style::rounded())
            .to_string()
    }

    pub fn to_json(&self) -> Result<String> {
        let report = JsonReport {
            headline: self.headline(),
            progress_percent: self.progress_percent(),
            base: self.breakdown.base(),
            breakdown: self.breakdown,
        };
        Ok(serde_json::to_string_pretty(&report)?)
    }
}

/// One decimal with an explicit sign; zero takes `zero_sign`
fn signed(value: Decimal, zero_sign: char) -> String {
    let sign = if value.is_zero() {
        zero_sign
    } else if value.is_sign_negative() {
        '-'
    } else {
        '+'
    };
    format!("{}{:.1}", sign, value.abs())
}
