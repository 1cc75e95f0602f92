//! CSV and ZIP artifact writers.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::database::RowSink;
use crate::error::JobError;
use crate::models::ReportArtifact;

/// Streams result rows straight into a CSV file
pub struct CsvSink {
    writer: csv::Writer<BufWriter<File>>,
}

impl CsvSink {
    pub fn create(path: &Path) -> Result<Self, JobError> {
        let file = File::create(path)?;
        Ok(Self {
            writer: csv::Writer::from_writer(BufWriter::new(file)),
        })
    }

    /// Flush buffered rows to disk
    pub fn finish(mut self) -> Result<(), JobError> {
        self.writer.flush()?;
        Ok(())
    }
}

impl RowSink for CsvSink {
    fn header(&mut self, columns: &[String]) -> Result<(), JobError> {
        if !columns.is_empty() {
            self.writer.write_record(columns)?;
        }
        Ok(())
    }

    fn row(&mut self, values: Vec<String>) -> Result<(), JobError> {
        self.writer.write_record(&values)?;
        Ok(())
    }
}

/// Wrap the artifact's CSV into its ZIP as a single deflated entry
pub fn compress_to_zip(artifact: &ReportArtifact) -> Result<(), JobError> {
    let mut source = File::open(&artifact.csv_path)?;
    let target = File::create(&artifact.zip_path)?;

    let mut zip = ZipWriter::new(BufWriter::new(target));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    zip.start_file(artifact.entry_name(), options)?;
    std::io::copy(&mut source, &mut zip)?;

    let mut inner = zip.finish()?;
    inner.flush()?;
    Ok(())
}
