//! Text and JSON rendering of prediction results

use crate::config::DisplayConfig;
use crate::models::kind::Selection;
use crate::types::prediction::{ModelPrediction, PredictionResult};
use anyhow::Result;

const MODEL_HEADER: &str = "Model";

/// Renders result sets for the terminal
pub struct ResultRenderer {
    currency_symbol: String,
    thousands_separator: bool,
}

impl ResultRenderer {
    pub fn new(config: &DisplayConfig) -> Self {
        Self {
            currency_symbol: config.currency_symbol.clone(),
            thousands_separator: config.thousands_separator,
        }
    }

    /// `₹12,345.68` (grouping per config)
    pub fn currency(&self, value: f64) -> String {
        self.amount(value, self.thousands_separator)
    }

    // Never prints a sign for an amount that rounds to zero.
    fn amount(&self, value: f64, grouped: bool) -> String {
        let plain = format!("{:.2}", value.abs());
        let body = if grouped {
            group_thousands(&plain)
        } else {
            plain
        };
        let sign = if value < 0.0 && body.chars().any(|c| c.is_ascii_digit() && c != '0') {
            "-"
        } else {
            ""
        };
        format!("{}{}{}", sign, self.currency_symbol, body)
    }

    fn value_header(&self) -> String {
        format!("Predicted Charges ({})", self.currency_symbol)
    }

    /// One line for a single-model request
    pub fn render_single(&self, entry: &ModelPrediction) -> String {
        match &entry.outcome {
            Ok(value) => format!("{} Prediction: {}", entry.model, self.currency(*value)),
            Err(e) => format!("Prediction error with {}: {}", entry.model, e),
        }
    }

    /// Two-column table, one row per model, in result order
    pub fn render_table(&self, result: &PredictionResult) -> String {
        let header = self.value_header();
        let rows: Vec<(&str, String)> = result
            .entries()
            .iter()
            .map(|entry| {
                let cell = match &entry.outcome {
                    Ok(value) => self.amount(*value, false),
                    Err(e) => format!("Error: {}", e),
                };
                (entry.model.display_name(), cell)
            })
            .collect();

        let name_width = rows
            .iter()
            .map(|(name, _)| name.chars().count())
            .chain(std::iter::once(MODEL_HEADER.len()))
            .max()
            .unwrap_or(0);
        let value_width = rows
            .iter()
            .map(|(_, cell)| cell.chars().count())
            .chain(std::iter::once(header.chars().count()))
            .max()
            .unwrap_or(0);

        let mut out = String::new();
        out.push_str(&format!("{:<name_width$}  {}\n", MODEL_HEADER, header));
        out.push_str(&format!("{}  {}\n", "-".repeat(name_width), "-".repeat(value_width)));
        for (name, cell) in rows {
            out.push_str(&format!("{:<name_width$}  {}\n", name, cell));
        }
        out
    }

    /// Text output for a request
    pub fn render_text(&self, selection: Selection, result: &PredictionResult) -> String {
        match (selection, result.entries()) {
            (Selection::Model(_), [entry]) => self.render_single(entry),
            _ => self.render_table(result),
        }
    }

    /// JSON array of `{model, prediction}` / `{model, error}` objects
    pub fn render_json(&self, result: &PredictionResult) -> Result<String> {
        Ok(serde_json::to_string_pretty(result)?)
    }
}

impl Default for ResultRenderer {
    fn default() -> Self {
        Self::new(&DisplayConfig::default())
    }
}

fn group_thousands(plain: &str) -> String {
    let (int_part, frac_part) = plain.split_once('.').unwrap_or((plain, ""));
    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if frac_part.is_empty() {
        grouped
    } else {
        format!("{}.{}", grouped, frac_part)
    }
}
