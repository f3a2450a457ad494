//! Text rendering of table models for logs and test output.
//!
//! Use [`TableDebug`] to get a readable dump of any [`TableModel`]:
//!
//! ```
//! use horizon_table::model::{ArrayTableModel, CellValue, TableDebug, TableStyle, TableFormatOptions};
//!
//! let model = ArrayTableModel::new(["Name", "Age"]);
//! model.add_row([CellValue::from("Alice"), 30.into()]).unwrap();
//!
//! let debug = TableDebug::with_options(TableFormatOptions {
//!     style: TableStyle::Ascii,
//!     ..Default::default()
//! });
//! let text = debug.format(&model);
//! assert!(text.contains("| Alice | 30  |"));
//! ```

use std::fmt::Write as FmtWrite;

use super::traits::TableModel;

/// Style options for table rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TableStyle {
    /// ASCII characters for borders.
    Ascii,
    /// Unicode box-drawing characters.
    #[default]
    Unicode,
    /// No borders, one space between columns.
    Compact,
}

/// Configuration for table debug output.
#[derive(Debug, Clone)]
pub struct TableFormatOptions {
    /// The style of the borders.
    pub style: TableStyle,
    /// Maximum number of rows to render (None for unlimited).
    pub max_rows: Option<usize>,
    /// Whether to prefix each row with its index.
    pub show_row_numbers: bool,
}

impl Default for TableFormatOptions {
    fn default() -> Self {
        Self {
            style: TableStyle::default(),
            max_rows: None,
            show_row_numbers: false,
        }
    }
}

impl TableFormatOptions {
    /// Options for short log lines.
    pub fn minimal() -> Self {
        Self {
            style: TableStyle::Compact,
            max_rows: Some(10),
            show_row_numbers: false,
        }
    }

    /// Options for test failure output.
    pub fn detailed() -> Self {
        Self {
            show_row_numbers: true,
            ..Default::default()
        }
    }
}

struct Borders {
    left: &'static str,
    separator: &'static str,
    right: &'static str,
    rule: Option<(&'static str, &'static str, &'static str, char)>,
}

impl TableStyle {
    fn borders(self) -> Borders {
        match self {
            TableStyle::Ascii => Borders {
                left: "| ",
                separator: " | ",
                right: " |",
                rule: Some(("+-", "-+-", "-+", '-')),
            },
            TableStyle::Unicode => Borders {
                left: "\u{2502} ",
                separator: " \u{2502} ",
                right: " \u{2502}",
                rule: Some(("\u{251c}\u{2500}", "\u{2500}\u{253c}\u{2500}", "\u{2500}\u{2524}", '\u{2500}')),
            },
            TableStyle::Compact => Borders {
                left: "",
                separator: " ",
                right: "",
                rule: None,
            },
        }
    }
}

/// Renders table models as text.
#[derive(Debug, Clone, Default)]
pub struct TableDebug {
    options: TableFormatOptions,
}

impl TableDebug {
    /// Create a formatter with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a formatter with custom options.
    pub fn with_options(options: TableFormatOptions) -> Self {
        Self { options }
    }

    /// Render `model`: a header line, a rule, then one line per row.
    ///
    /// Cells that cannot be read render as `?`.
    pub fn format<M: TableModel + ?Sized>(&self, model: &M) -> String {
        let row_count = model.row_count();
        let shown = self.options.max_rows.map_or(row_count, |max| max.min(row_count));

        let mut header: Vec<String> = (0..model.column_count())
            .map(|column| model.column_name(column).unwrap_or("?").to_string())
            .collect();
        let mut lines: Vec<Vec<String>> = (0..shown)
            .map(|row| {
                (0..model.column_count())
                    .map(|column| {
                        model
                            .value(row, column)
                            .map_or_else(|_| "?".to_string(), |value| value.to_string())
                    })
                    .collect()
            })
            .collect();
        if self.options.show_row_numbers {
            header.insert(0, "#".to_string());
            for (row, line) in lines.iter_mut().enumerate() {
                line.insert(0, row.to_string());
            }
        }

        let widths: Vec<usize> = (0..header.len())
            .map(|column| {
                lines
                    .iter()
                    .map(|line| line[column].chars().count())
                    .chain(std::iter::once(header[column].chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let borders = self.options.style.borders();
        let mut output = String::new();
        Self::write_line(&mut output, &borders, &header, &widths);
        if let Some((left, separator, right, fill)) = borders.rule {
            let segments: Vec<String> = widths
                .iter()
                .map(|&width| std::iter::repeat_n(fill, width).collect())
                .collect();
            output.push_str(left);
            output.push_str(&segments.join(separator));
            output.push_str(right);
            output.push('\n');
        }
        for line in &lines {
            Self::write_line(&mut output, &borders, line, &widths);
        }
        if shown < row_count {
            let _ = writeln!(output, "... {} more rows", row_count - shown);
        }
        output
    }

    fn write_line(output: &mut String, borders: &Borders, cells: &[String], widths: &[usize]) {
        output.push_str(borders.left);
        for (column, (cell, &width)) in cells.iter().zip(widths).enumerate() {
            if column > 0 {
                output.push_str(borders.separator);
            }
            let _ = write!(output, "{cell:<width$}");
        }
        output.push_str(borders.right);
        let trimmed = output.trim_end_matches(' ').len();
        output.truncate(trimmed);
        output.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ArrayTableModel, CellValue};

    fn model() -> ArrayTableModel {
        let model = ArrayTableModel::new(["Name", "Score"]);
        model.add_row([CellValue::from("Alice"), 9.into()]).unwrap();
        model.add_row([CellValue::from("Bob"), 10.into()]).unwrap();
        model
    }

    #[test]
    fn test_ascii() {
        let debug = TableDebug::with_options(TableFormatOptions {
            style: TableStyle::Ascii,
            ..Default::default()
        });
        assert_eq!(
            debug.format(&model()),
            "| Name  | Score |\n+-------+-------+\n| Alice | 9     |\n| Bob   | 10    |\n"
        );
    }

    #[test]
    fn test_compact_with_limit() {
        let debug = TableDebug::with_options(TableFormatOptions {
            style: TableStyle::Compact,
            max_rows: Some(1),
            show_row_numbers: true,
        });
        assert_eq!(debug.format(&model()), "# Name  Score\n0 Alice 9\n... 1 more rows\n");
    }

    #[test]
    fn test_unicode_default() {
        let text = TableDebug::new().format(&model());
        assert!(text.starts_with("\u{2502} Name"));
        assert_eq!(text.lines().count(), 4);
    }

    #[test]
    fn test_trait_object() {
        let model: Box<dyn TableModel> = Box::new(model());
        let text = TableDebug::with_options(TableFormatOptions::minimal()).format(model.as_ref());
        assert!(text.contains("Bob"));
    }
}
