//! Plain-text tables for inspecting canonical programs.

use std::fmt;

use itertools::Itertools;
use nalgebra::DMatrix;

use crate::constraints::Sense;

/// Labelled coefficient table: one row per constraint, one column per
/// variable, followed by the row sense and constant.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub row_labels: Vec<String>,
    pub col_labels: Vec<String>,
    pub coefficients: DMatrix<f64>,
    pub senses: Vec<Sense>,
    pub constants: Vec<f64>,
}

impl Table {
    pub fn nrows(&self) -> usize {
        self.row_labels.len()
    }

    pub fn ncols(&self) -> usize {
        self.col_labels.len()
    }

    /// Labels `prefix1..prefixN`.
    pub(crate) fn labels(prefix: &str, count: usize) -> Vec<String> {
        (1..=count).map(|i| format!("{}{}", prefix, i)).collect()
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let precision = f.precision().unwrap_or(4);
        let cell = |v: f64| format!("{:.*}", precision, v);

        let header: Vec<String> = std::iter::once(String::new())
            .chain(self.col_labels.iter().cloned())
            .chain(["sense".to_string(), "constant".to_string()])
            .collect();
        let body: Vec<Vec<String>> = (0..self.nrows())
            .map(|r| {
                std::iter::once(self.row_labels[r].clone())
                    .chain((0..self.ncols()).map(|c| cell(self.coefficients[(r, c)])))
                    .chain([self.senses[r].to_string(), cell(self.constants[r])])
                    .collect()
            })
            .collect();

        let widths: Vec<usize> = (0..header.len())
            .map(|c| {
                body.iter()
                    .map(|row| row[c].len())
                    .chain([header[c].len()])
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        for row in std::iter::once(&header).chain(body.iter()) {
            writeln!(
                f,
                "{}",
                row.iter()
                    .zip(&widths)
                    .map(|(text, &w)| format!("{:>w$}", text, w = w))
                    .join("  ")
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> Table {
        Table {
            row_labels: Table::labels("C", 1),
            col_labels: Table::labels("x", 2),
            coefficients: DMatrix::from_row_slice(1, 2, &[1.0, -2.5]),
            senses: vec![Sense::Le],
            constants: vec![3.0],
        }
    }

    #[test]
    fn test_labels() {
        assert_eq!(Table::labels("q", 3), vec!["q1", "q2", "q3"]);
    }

    #[test]
    fn test_display_default_precision() {
        let text = small().to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("x1") && lines[0].contains("constant"));
        assert!(lines[1].contains("-2.5000"));
        assert!(lines[1].contains("<="));
    }

    #[test]
    fn test_display_precision() {
        let text = format!("{:.1}", small());
        assert!(text.contains("-2.5"));
        assert!(!text.contains("-2.50"));
    }
}
