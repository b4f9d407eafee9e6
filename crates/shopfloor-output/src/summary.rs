//! Plain-text and Markdown tables for terminal output.

use shopfloor_data::MissingValueReport;
use shopfloor_features::{DistributionComparison, HolidayCalendar, MonthlySeries};

/// Tabular rendering of a report.
pub trait TableView {
    /// Render as a fixed-width text table.
    fn to_ascii_table(&self) -> String;

    /// Render as a Markdown table.
    fn to_markdown(&self) -> String;
}

fn rule(output: &mut String, ch: &str, width: usize) {
    output.push_str(&ch.repeat(width));
    output.push('\n');
}

fn fmt_value(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"))
}

impl TableView for MissingValueReport {
    fn to_ascii_table(&self) -> String {
        self.to_string()
    }

    fn to_markdown(&self) -> String {
        let mut output = format!("{}\n\n", self.summary());
        output.push_str("| Column | Missing Values | % of Total Values | Dtype |\n");
        output.push_str("|--------|---------------:|------------------:|-------|\n");
        for entry in &self.entries {
            output.push_str(&format!(
                "| {} | {} | {:.1} | {} |\n",
                entry.column, entry.missing_count, entry.missing_percent, entry.dtype
            ));
        }
        output
    }
}

impl TableView for MonthlySeries {
    fn to_ascii_table(&self) -> String {
        let mut output = format!("\nMonthly {} of {}\n", self.aggregation, self.column);
        rule(&mut output, "=", 40);
        output.push_str(&format!("{:<10} {:>16} {:>10}\n", "Month", "Value", "Records"));
        rule(&mut output, "-", 40);
        for month in &self.values {
            output.push_str(&format!(
                "{:<10} {:>16} {:>10}\n",
                month.period(),
                fmt_value(month.value),
                month.count
            ));
        }
        rule(&mut output, "=", 40);
        output
    }

    fn to_markdown(&self) -> String {
        let mut output = format!("# Monthly {} of {}\n\n", self.aggregation, self.column);
        output.push_str("| Month | Value | Records |\n");
        output.push_str("|-------|------:|--------:|\n");
        for month in &self.values {
            output.push_str(&format!(
                "| {} | {} | {} |\n",
                month.period(),
                fmt_value(month.value),
                month.count
            ));
        }
        output
    }
}

impl TableView for DistributionComparison {
    fn to_ascii_table(&self) -> String {
        let mut output = format!("\nDistribution of {}\n", self.column);
        rule(&mut output, "=", 40);
        output.push_str(&format!(
            "{:<12} {:>12} {:>12}\n",
            "Value", self.left_label, self.right_label
        ));
        rule(&mut output, "-", 40);
        for row in &self.rows {
            output.push_str(&format!(
                "{:<12} {:>11.2}% {:>11.2}%\n",
                row.value,
                row.left * 100.0,
                row.right * 100.0
            ));
        }
        rule(&mut output, "=", 40);
        output
    }

    fn to_markdown(&self) -> String {
        let mut output = format!("# Distribution of {}\n\n", self.column);
        output.push_str(&format!(
            "| Value | {} | {} |\n|-------|---:|---:|\n",
            self.left_label, self.right_label
        ));
        for row in &self.rows {
            output.push_str(&format!(
                "| {} | {:.2}% | {:.2}% |\n",
                row.value,
                row.left * 100.0,
                row.right * 100.0
            ));
        }
        output
    }
}

impl TableView for HolidayCalendar {
    fn to_ascii_table(&self) -> String {
        let years: Vec<String> = self.years().map(|y| y.to_string()).collect();
        let mut output = format!("\nUS federal holidays: {}\n", years.join(", "));
        rule(&mut output, "=", 56);
        for (date, holiday) in self.iter() {
            let marker = if holiday.observed { " (observed)" } else { "" };
            output.push_str(&format!(
                "{:<12} {:<4} {}{}\n",
                date,
                date.format("%a"),
                holiday.name,
                marker
            ));
        }
        rule(&mut output, "=", 56);
        output
    }

    fn to_markdown(&self) -> String {
        let mut output = String::from("| Date | Holiday | Observed |\n|------|---------|----------|\n");
        for (date, holiday) in self.iter() {
            output.push_str(&format!(
                "| {} | {} | {} |\n",
                date,
                holiday.name,
                if holiday.observed { "yes" } else { "no" }
            ));
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shopfloor_features::{Aggregation, ComparedShare, MonthlyValue};

    #[test]
    fn test_monthly_ascii_table() {
        let series = MonthlySeries {
            column: "Sales".to_string(),
            aggregation: Aggregation::Sum,
            values: vec![MonthlyValue {
                year: 2014,
                month: 1,
                value: Some(12.0),
                count: 2,
            }],
        };
        let table = series.to_ascii_table();
        assert!(table.contains("Monthly sum of Sales"));
        assert!(table.contains("2014-01"));
        assert!(table.contains("12.00"));
        assert!(series.to_markdown().contains("| 2014-01 | 12.00 | 2 |"));
    }

    #[test]
    fn test_distribution_table() {
        let comparison = DistributionComparison {
            column: "Promo".to_string(),
            left_label: "train".to_string(),
            right_label: "test".to_string(),
            rows: vec![ComparedShare {
                value: "1".to_string(),
                left: 0.381,
                right: 0.396,
            }],
        };
        let table = comparison.to_ascii_table();
        assert!(table.contains("38.10%"));
        assert!(table.contains("39.60%"));
    }

    #[test]
    fn test_holiday_table() {
        let calendar = HolidayCalendar::us(&[2014]).unwrap();
        let table = calendar.to_ascii_table();
        assert!(table.contains("2014-01-01"));
        assert!(table.contains("Thanksgiving"));
        assert_eq!(calendar.to_markdown().lines().count(), 2 + calendar.len());
    }
}
