use crate::domain::model::Frame;
use crate::domain::ports::Storage;
use crate::utils::error::Result;
use serde::{Deserialize, Serialize};
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Tsv,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Tsv => "tsv",
            ExportFormat::Json => "json",
        }
    }
}

pub fn file_name(stem: &str, format: ExportFormat) -> String {
    format!("{}.{}", stem, format.extension())
}

/// UTF-8 bytes of `frame` in the requested format, header included.
pub fn encode(frame: &Frame, format: ExportFormat) -> Result<Vec<u8>> {
    match format {
        ExportFormat::Csv => frame.to_csv_bytes(b','),
        ExportFormat::Tsv => frame.to_csv_bytes(b'\t'),
        ExportFormat::Json => Ok(serde_json::to_vec_pretty(&frame.to_json_records())?),
    }
}

pub async fn export_frame<S: Storage>(
    storage: &S,
    stem: &str,
    frame: &Frame,
    format: ExportFormat,
) -> Result<String> {
    let name = file_name(stem, format);
    let data = encode(frame, format)?;
    tracing::debug!("Writing {} ({} rows, {} bytes)", name, frame.len(), data.len());
    storage.write_file(&name, &data).await?;
    tracing::info!("📁 Exported {}", name);
    Ok(name)
}

/// Zip archive with one CSV entry per frame.
pub fn bundle(entries: &[(String, Frame)]) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
    for (stem, frame) in entries {
        zip.start_file::<_, ()>(file_name(stem, ExportFormat::Csv), FileOptions::default())?;
        zip.write_all(&frame.to_csv_bytes(b',')?)?;
    }
    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

pub async fn export_bundle<S: Storage>(
    storage: &S,
    archive_name: &str,
    entries: &[(String, Frame)],
) -> Result<String> {
    let data = bundle(entries)?;
    tracing::debug!("Writing ZIP file ({} bytes) with {} entries", data.len(), entries.len());
    storage.write_file(archive_name, &data).await?;
    tracing::info!("📦 Exported {}", archive_name);
    Ok(archive_name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Cell;
    use crate::utils::error::DashboardError;
    use std::collections::HashMap;
    use std::io::Read;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone, Default)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                DashboardError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    fn frame() -> Frame {
        Frame::from_rows(
            ["Bairro", "Vendas", "ValorTotal"],
            vec![
                vec![Cell::from("Centro"), Cell::Int(2), Cell::Float(40.5)],
                vec![Cell::from("São José"), Cell::Int(1), Cell::Float(10.0)],
            ],
        )
    }

    #[tokio::test]
    async fn test_csv_export_round_trips() {
        let storage = MockStorage::default();
        let name = export_frame(&storage, "vendas_por_local", &frame(), ExportFormat::Csv)
            .await
            .unwrap();
        assert_eq!(name, "vendas_por_local.csv");

        let bytes = storage.read_file(&name).await.unwrap();
        let text = String::from_utf8(bytes.clone()).unwrap();
        assert!(text.starts_with("Bairro,Vendas,ValorTotal\n"));
        assert!(text.contains("São José"));

        let parsed = Frame::read_csv(bytes.as_slice(), b',').unwrap();
        assert_eq!(parsed, frame());
    }

    #[test]
    fn test_tsv_and_json_encoding() {
        let tsv = String::from_utf8(encode(&frame(), ExportFormat::Tsv).unwrap()).unwrap();
        assert!(tsv.starts_with("Bairro\tVendas\tValorTotal\n"));

        let json: serde_json::Value =
            serde_json::from_slice(&encode(&frame(), ExportFormat::Json).unwrap()).unwrap();
        assert_eq!(json[0]["Vendas"], 2);
        assert_eq!(json[1]["Bairro"], "São José");
    }

    #[tokio::test]
    async fn test_bundle_contains_every_entry() {
        let storage = MockStorage::default();
        let entries = vec![
            ("a".to_string(), frame()),
            ("b".to_string(), Frame::new(["x"])),
        ];
        export_bundle(&storage, "relatorios.zip", &entries).await.unwrap();

        let data = storage.read_file("relatorios.zip").await.unwrap();
        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(data)).unwrap();
        assert_eq!(archive.len(), 2);

        let mut content = String::new();
        archive
            .by_name("a.csv")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(Frame::read_csv(content.as_bytes(), b',').unwrap(), frame());
    }
}
