use tracing::info;

use crate::pipeline::ingestion::SourceTables;
use crate::table::{Record, Table};

/// Placeholder shown for a missing cell in previews.
const MISSING_DISPLAY: &str = "NaN";

/// Shape and missing-cell count of one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSummary {
    pub name: &'static str,
    pub rows: usize,
    pub columns: usize,
    pub missing: usize,
}

impl TableSummary {
    pub fn of<R: Record>(table: &Table<R>) -> Self {
        let (rows, columns) = table.shape();
        Self {
            name: table.name(),
            rows,
            columns,
            missing: table.missing_cells(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InspectionReport {
    pub tables: Vec<TableSummary>,
}

impl InspectionReport {
    pub fn get(&self, name: &str) -> Option<&TableSummary> {
        self.tables.iter().find(|t| t.name == name)
    }

    pub fn total_missing(&self) -> usize {
        self.tables.iter().map(|t| t.missing).sum()
    }
}

/// Non-null cells per column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnProfile {
    pub column: &'static str,
    pub non_null: usize,
}

pub fn column_profile<R: Record>(table: &Table<R>) -> Vec<ColumnProfile> {
    let columns = table.columns();
    let mut counts = vec![0usize; columns.len()];
    for row in table.rows() {
        for (count, cell) in counts.iter_mut().zip(table.present_cells(row)) {
            if cell.is_some() {
                *count += 1;
            }
        }
    }
    columns
        .into_iter()
        .zip(counts)
        .map(|(column, non_null)| ColumnProfile { column, non_null })
        .collect()
}

/// Render the first `n` rows as an aligned text grid with a row index.
pub fn preview<R: Record>(table: &Table<R>, n: usize) -> String {
    let mut grid: Vec<Vec<String>> = Vec::with_capacity(n + 1);
    let mut header = vec![String::new()];
    header.extend(table.columns().iter().map(|c| c.to_string()));
    grid.push(header);
    for (i, row) in table.head(n).iter().enumerate() {
        let mut line = vec![i.to_string()];
        line.extend(
            table
                .present_cells(row)
                .into_iter()
                .map(|c| c.unwrap_or_else(|| MISSING_DISPLAY.to_string())),
        );
        grid.push(line);
    }

    let widths: Vec<usize> = (0..grid[0].len())
        .map(|col| grid.iter().map(|line| line[col].chars().count()).max().unwrap_or(0))
        .collect();

    grid.iter()
        .map(|line| {
            line.iter()
                .zip(widths.iter().copied())
                .map(|(cell, width)| format!("{cell:>width$}"))
                .collect::<Vec<_>>()
                .join("  ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn print_table<R: Record>(label: &str, table: &Table<R>, preview_rows: usize) {
    println!("\n--- {} ---", label);
    println!("{}", preview(table, preview_rows));
}

/// Print shapes, previews, the orders column profile and missing counts.
/// Read-only; the tables are untouched.
pub fn inspect_sources(sources: &SourceTables, preview_rows: usize) -> InspectionReport {
    let report = InspectionReport {
        tables: vec![
            TableSummary::of(&sources.customers),
            TableSummary::of(&sources.products),
            TableSummary::of(&sources.stores),
            TableSummary::of(&sources.orders),
            TableSummary::of(&sources.order_items),
        ],
    };

    println!("✅ Data Loaded Successfully!\n");
    for summary in &report.tables {
        println!("{}: ({}, {})", summary.name, summary.rows, summary.columns);
    }

    print_table("Customers", &sources.customers, preview_rows);
    print_table("Products", &sources.products, preview_rows);
    print_table("Stores", &sources.stores, preview_rows);
    print_table("Orders", &sources.orders, preview_rows);
    print_table("Order Items", &sources.order_items, preview_rows);

    println!("\n📋 Orders column profile ({} rows):", sources.orders.len());
    for profile in column_profile(&sources.orders) {
        println!("   {:<22} {} non-null", profile.column, profile.non_null);
    }

    println!("\n🔍 Missing Values:");
    for summary in &report.tables {
        println!("{}: {} missing values", summary.name, summary.missing);
        info!(
            table = summary.name,
            rows = summary.rows,
            columns = summary.columns,
            missing = summary.missing,
            "Inspected table"
        );
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RawProduct;

    fn products() -> Table<RawProduct> {
        Table::new(
            "products",
            vec![
                RawProduct {
                    product_id: "P1".to_string(),
                    product_name: Some("Flat White".to_string()),
                    category: None,
                    unit_price: Some("4.2".to_string()),
                },
                RawProduct {
                    product_id: "P2".to_string(),
                    product_name: None,
                    category: None,
                    unit_price: Some("3".to_string()),
                },
            ],
        )
    }

    #[test]
    fn test_summary_and_profile() {
        let table = products();
        let summary = TableSummary::of(&table);
        assert_eq!(
            summary,
            TableSummary {
                name: "products",
                rows: 2,
                columns: 4,
                missing: 3,
            }
        );

        let profile = column_profile(&table);
        let non_null: Vec<(&str, usize)> =
            profile.iter().map(|p| (p.column, p.non_null)).collect();
        assert_eq!(
            non_null,
            vec![
                ("product_id", 2),
                ("product_name", 1),
                ("category", 0),
                ("unit_price", 2)
            ]
        );
    }

    #[test]
    fn test_preview_is_limited_and_aligned() {
        let table = products();
        let text = preview(&table, 1);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("product_name"));
        assert!(lines[1].contains("Flat White"));
        assert!(lines[1].contains("NaN"));
        assert_eq!(lines[0].chars().count(), lines[1].chars().count());
        assert!(!text.contains("P2"));
    }

    #[test]
    fn test_absent_columns_are_left_out() {
        let rows = products().into_rows();
        let table = Table::with_columns("products", rows, vec![true, true, false, true]);

        let summary = TableSummary::of(&table);
        assert_eq!((summary.columns, summary.missing), (3, 1));

        let profile: Vec<&str> = column_profile(&table).iter().map(|p| p.column).collect();
        assert_eq!(profile, vec!["product_id", "product_name", "unit_price"]);

        let text = preview(&table, 2);
        assert!(!text.contains("category"));
    }
}
