// Pipeline storage: writes finished tables as CSV snapshots

use csv::WriterBuilder;
use metrics::counter;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;
use tracing::info;

use crate::error::{EtlError, Result};
use crate::table::{Record, Table};

/// Write `table` to `path` with a header row and no index column, replacing
/// whatever was there. Missing cells are written empty.
pub fn write_table<R: Record>(path: &Path, table: &Table<R>) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|e| EtlError::io(dir, e))?;
    }

    let file = File::create(path).map_err(|e| EtlError::io(path, e))?;
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_writer(BufWriter::new(file));

    writer
        .write_record(R::COLUMNS)
        .map_err(|e| EtlError::csv(path, e))?;
    for row in table.rows() {
        let cells = row.cells();
        writer
            .write_record(cells.iter().map(|c| c.as_deref().unwrap_or("")))
            .map_err(|e| EtlError::csv(path, e))?;
    }
    writer.flush().map_err(|e| EtlError::io(path, e))?;

    info!(table = table.name(), rows = table.len(), path = %path.display(), "Wrote table");
    counter!("etl_rows_written_total", "table" => table.name()).increment(table.len() as u64);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Product;
    use tempfile::tempdir;

    fn products() -> Table<Product> {
        Table::new(
            "products",
            vec![
                Product {
                    product_id: "P1".to_string(),
                    product_name: Some("Mocha, large".to_string()),
                    category: None,
                    unit_price: Some(5.0),
                },
                Product {
                    product_id: "P2".to_string(),
                    product_name: Some("Tea".to_string()),
                    category: Some("Tea".to_string()),
                    unit_price: None,
                },
            ],
        )
    }

    #[test]
    fn test_writes_header_quotes_and_empty_missing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("products.csv");
        write_table(&path, &products()).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(
            written,
            "product_id,product_name,category,unit_price\n\
             P1,\"Mocha, large\",,5.0\n\
             P2,Tea,Tea,\n"
        );
    }

    #[test]
    fn test_overwrites_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("products.csv");
        fs::write(&path, "stale content that is longer than the new file\n".repeat(50)).unwrap();

        write_table(&path, &Table::new("products", Vec::<Product>::new())).unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "product_id,product_name,category,unit_price\n"
        );
    }
}
