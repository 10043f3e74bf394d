//! JSON Lines export of the dataset

use crate::dataset::{CrawlRecord, Dataset};
use crate::SpiderError;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes records as JSON Lines, one object per line
pub fn write_jsonl<W: Write>(records: &[CrawlRecord], mut writer: W) -> Result<(), SpiderError> {
    for record in records {
        serde_json::to_writer(&mut writer, record).map_err(std::io::Error::from)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

/// Exports the whole dataset to `path`
///
/// # Returns
///
/// * `Ok(usize)` - Number of records written
/// * `Err(SpiderError)` - The dataset could not be read or the file written
pub fn export_jsonl(dataset: &Dataset, path: &Path) -> Result<usize, SpiderError> {
    let records = dataset.read_all()?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let writer = BufWriter::new(File::create(path)?);
    write_jsonl(&records, writer)?;

    tracing::info!(count = records.len(), path = %path.display(), "Exported dataset");
    Ok(records.len())
}
