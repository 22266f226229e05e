pub mod preprocess;
pub mod reader;
pub mod record;

pub use reader::{CsvRosterReader, IngestReport};
pub use record::{EmploymentStatus, RosterRecord};

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::path::Path;

/// Generate a stable source id from a filename
pub fn generate_source_id(filename: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(filename.as_bytes());
    let result = hasher.finalize();
    hex::encode(&result[..16])
}

/// Parse an uploaded roster export held in memory.
pub fn ingest_bytes(data: &[u8], source_file: &str) -> Result<(Vec<RosterRecord>, IngestReport)> {
    CsvRosterReader::parse(data, source_file)
}

/// Parse a roster export from disk.
pub async fn ingest_file(path: &Path) -> Result<(Vec<RosterRecord>, IngestReport)> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    if extension != "csv" {
        anyhow::bail!("Unsupported file format: {}", extension);
    }

    let data = tokio::fs::read(path)
        .await
        .context(format!("Failed to read file: {:?}", path))?;

    let source_file = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload.csv")
        .to_string();

    CsvRosterReader::parse(&data, &source_file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_id_stable() {
        let a = generate_source_id("jan.csv");
        let b = generate_source_id("jan.csv");
        let c = generate_source_id("feb.csv");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 32);
    }
}
