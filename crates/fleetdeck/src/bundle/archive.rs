//! CSV export and ZIP packing for evidence bundles.

use std::io::{Cursor, Read, Write};

use tracing::debug;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use super::{EvidenceId, EvidenceMetadata};
use crate::error::{Error, Result};
use crate::record::{EventRecord, COLUMNS};

const CSV_EXT: &str = "csv";
const JSON_EXT: &str = "json";
const PDF_EXT: &str = "pdf";

/// Serialize rows as CSV. The header is always written, even for no rows.
pub(super) fn write_csv(rows: &[EventRecord]) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(COLUMNS)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer
        .into_inner()
        .map_err(|e| Error::Io(e.into_error()))
}

/// Pack the three artifacts into a DEFLATE-compressed ZIP.
pub(super) fn pack(id: &EvidenceId, csv: &[u8], json: &[u8], pdf: &[u8]) -> Result<Vec<u8>> {
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

    for (extension, bytes) in [(CSV_EXT, csv), (JSON_EXT, json), (PDF_EXT, pdf)] {
        writer.start_file(id.entry_name(extension), options)?;
        writer.write_all(bytes)?;
        debug!(entry = %id.entry_name(extension), bytes = bytes.len(), "Packed archive entry");
    }

    Ok(writer.finish()?.into_inner())
}

/// A bundle archive opened for inspection.
#[derive(Clone)]
pub struct EvidenceArchive {
    /// Bundle identifier, taken from the entry names.
    pub id: EvidenceId,
    /// Entry names in archive order.
    pub entries: Vec<String>,
    /// Parsed JSON descriptor.
    pub metadata: EvidenceMetadata,
    csv: Vec<u8>,
    json: Vec<u8>,
    pdf: Vec<u8>,
}

impl std::fmt::Debug for EvidenceArchive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvidenceArchive")
            .field("id", &self.id)
            .field("entries", &self.entries)
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

impl EvidenceArchive {
    /// Open bundle bytes and check the three-entry layout.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not a ZIP, the entries are not exactly
    /// `{id}.csv`, `{id}.json` and `{id}.pdf`, or the descriptor disagrees with
    /// the entry names.
    pub fn read(bytes: &[u8]) -> Result<Self> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))?;

        let mut entries = Vec::with_capacity(archive.len());
        for index in 0..archive.len() {
            entries.push(archive.by_index(index)?.name().to_string());
        }
        if entries.len() != 3 {
            return Err(Error::archive_layout(format!(
                "expected 3 entries, found {}",
                entries.len()
            )));
        }

        let stem = entries
            .iter()
            .find_map(|name| name.strip_suffix(".json"))
            .ok_or_else(|| Error::archive_layout("no JSON descriptor entry"))?;
        let id = EvidenceId::parse(stem)?;
        for extension in [CSV_EXT, JSON_EXT, PDF_EXT] {
            let expected = id.entry_name(extension);
            if !entries.contains(&expected) {
                return Err(Error::archive_layout(format!("missing entry {expected}")));
            }
        }

        let csv = read_entry(&mut archive, &id.entry_name(CSV_EXT))?;
        let json = read_entry(&mut archive, &id.entry_name(JSON_EXT))?;
        let pdf = read_entry(&mut archive, &id.entry_name(PDF_EXT))?;

        let metadata: EvidenceMetadata = serde_json::from_slice(&json)?;
        if metadata.evidence_id != id {
            return Err(Error::archive_layout(format!(
                "descriptor id {} does not match entries {id}",
                metadata.evidence_id
            )));
        }

        Ok(Self {
            id,
            entries,
            metadata,
            csv,
            json,
            pdf,
        })
    }

    /// Raw CSV entry.
    #[must_use]
    pub fn csv(&self) -> &[u8] {
        &self.csv
    }

    /// Raw JSON entry.
    #[must_use]
    pub fn json(&self) -> &[u8] {
        &self.json
    }

    /// Raw PDF entry.
    #[must_use]
    pub fn pdf(&self) -> &[u8] {
        &self.pdf
    }

    /// Parse the CSV entry back into records.
    ///
    /// # Errors
    ///
    /// Returns an error if the CSV entry does not parse.
    pub fn records(&self) -> Result<Vec<EventRecord>> {
        let mut reader = csv::Reader::from_reader(self.csv.as_slice());
        let records = reader
            .deserialize::<EventRecord>()
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(records)
    }
}

fn read_entry(archive: &mut ZipArchive<Cursor<&[u8]>>, name: &str) -> Result<Vec<u8>> {
    let mut file = archive.by_name(name)?;
    let mut buf = Vec::new();
    file.read_to_end(&mut buf)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::RecordStore;

    fn id() -> EvidenceId {
        EvidenceId::parse("EV-00C0FFEE").unwrap()
    }

    fn metadata(rows: usize) -> EvidenceMetadata {
        EvidenceMetadata {
            evidence_id: id(),
            title: "t".to_string(),
            created_by: "u".to_string(),
            priority: "Low".to_string(),
            created_on: "2025-11-14T00:00:00.000000Z".to_string(),
            rows,
        }
    }

    #[test]
    fn test_write_csv_header_only_for_empty() {
        let bytes = write_csv(&[]).unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            format!("{}\n", COLUMNS.join(","))
        );
    }

    #[test]
    fn test_write_csv_rows() {
        let store = RecordStore::sample().unwrap();
        let bytes = write_csv(&store.records()[..2]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("2025-10-16,N101,v1.9,0,FC100,"));
        assert!(lines[1].ends_with(",KATL"));
    }

    #[test]
    fn test_pack_and_read() {
        let json = serde_json::to_vec_pretty(&metadata(0)).unwrap();
        let bytes = pack(&id(), b"a,b\n", &json, b"%PDF-1.3").unwrap();
        let archive = EvidenceArchive::read(&bytes).unwrap();
        assert_eq!(archive.id, id());
        assert_eq!(archive.csv(), b"a,b\n");
        assert_eq!(archive.pdf(), b"%PDF-1.3");
        assert_eq!(archive.metadata.rows, 0);
    }

    #[test]
    fn test_pack_uses_deflate() {
        let json = serde_json::to_vec_pretty(&metadata(0)).unwrap();
        let bytes = pack(&id(), &[b'x'; 4096], &json, b"%PDF").unwrap();
        let mut archive = ZipArchive::new(Cursor::new(bytes.as_slice())).unwrap();
        let entry = archive.by_name("EV-00C0FFEE.csv").unwrap();
        assert_eq!(entry.compression(), CompressionMethod::Deflated);
        assert!(entry.compressed_size() < entry.size());
    }

    #[test]
    fn test_read_rejects_non_zip() {
        let err = EvidenceArchive::read(b"not a zip").unwrap_err();
        assert!(matches!(err, Error::Archive(_)));
    }

    #[test]
    fn test_read_rejects_mismatched_descriptor() {
        let mut other = metadata(0);
        other.evidence_id = EvidenceId::parse("EV-11111111").unwrap();
        let json = serde_json::to_vec_pretty(&other).unwrap();
        let bytes = pack(&id(), b"", &json, b"").unwrap();
        let err = EvidenceArchive::read(&bytes).unwrap_err();
        assert!(matches!(err, Error::ArchiveLayout { .. }));
    }

    #[test]
    fn test_read_rejects_extra_entries() {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for name in ["a.csv", "a.json", "a.pdf", "extra.txt"] {
            writer.start_file(name, FileOptions::default()).unwrap();
        }
        let bytes = writer.finish().unwrap().into_inner();
        let err = EvidenceArchive::read(&bytes).unwrap_err();
        assert!(err.to_string().contains("expected 3 entries"));
    }
}
