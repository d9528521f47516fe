//! Parser for the official WMO BUFR/CREX table distribution: quoted CSV with
//! a header row, one table file per table kind
//! (`BUFRCREX_TableB_en.txt`, `BUFRCREX_CodeFlag_en.txt`, `BUFR_TableD_en.txt`).

use super::{TableB, TableC, TableD};
use crate::descriptor::{DescriptorId, DescriptorMeta};
use crate::error::CoreError;
use std::path::Path;

fn descriptor_from_fxy_column(raw: &str) -> Option<DescriptorId> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    DescriptorId::from_str_padded(&digits)
}

/// Columns (by header name): `FXY`, `ElementName_en`, `BUFR_Unit`,
/// `BUFR_Scale`, `BUFR_ReferenceValue`, `BUFR_DataWidth_Bits`.
pub fn load_table_b(path: &Path) -> Result<TableB, CoreError> {
    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_path(path)?;
    let headers = reader.headers()?.clone();
    let idx = |name: &str| headers.iter().position(|h| h == name);
    let (fxy_i, name_i, unit_i, scale_i, ref_i, width_i) = (
        idx("FXY").ok_or_else(|| CoreError::TableFile("missing FXY column".into()))?,
        idx("ElementName_en").ok_or_else(|| CoreError::TableFile("missing ElementName_en column".into()))?,
        idx("BUFR_Unit").ok_or_else(|| CoreError::TableFile("missing BUFR_Unit column".into()))?,
        idx("BUFR_Scale").ok_or_else(|| CoreError::TableFile("missing BUFR_Scale column".into()))?,
        idx("BUFR_ReferenceValue").ok_or_else(|| CoreError::TableFile("missing BUFR_ReferenceValue column".into()))?,
        idx("BUFR_DataWidth_Bits").ok_or_else(|| CoreError::TableFile("missing BUFR_DataWidth_Bits column".into()))?,
    );

    let mut table = TableB::new();
    for record in reader.records() {
        let record = record?;
        let Some(id) = record.get(fxy_i).and_then(descriptor_from_fxy_column) else { continue };
        let name = record.get(name_i).unwrap_or_default();
        let unit = record.get(unit_i).unwrap_or_default();
        let scale: i32 = record.get(scale_i).unwrap_or("0").trim().parse().unwrap_or(0);
        let reference: i64 = record.get(ref_i).unwrap_or("0").trim().parse().unwrap_or(0);
        let width: u32 = record.get(width_i).unwrap_or("0").trim().parse().unwrap_or(0);
        table.insert(id, DescriptorMeta::new(name, unit, scale, reference, width));
    }
    Ok(table)
}

/// Columns: `FXY`, `CodeFigure`, `EntryName_en`.
pub fn load_table_c(path: &Path) -> Result<TableC, CoreError> {
    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_path(path)?;
    let headers = reader.headers()?.clone();
    let idx = |name: &str| headers.iter().position(|h| h == name);
    let (fxy_i, code_i, name_i) = (
        idx("FXY").ok_or_else(|| CoreError::TableFile("missing FXY column".into()))?,
        idx("CodeFigure").ok_or_else(|| CoreError::TableFile("missing CodeFigure column".into()))?,
        idx("EntryName_en").ok_or_else(|| CoreError::TableFile("missing EntryName_en column".into()))?,
    );

    let mut table = TableC::new();
    for record in reader.records() {
        let record = record?;
        let Some(id) = record.get(fxy_i).and_then(descriptor_from_fxy_column) else { continue };
        let Some(code) = record.get(code_i).and_then(|s| s.trim().parse::<u64>().ok()) else { continue };
        let text = record.get(name_i).unwrap_or_default();
        table.insert(id, code, text);
    }
    Ok(table)
}

/// Columns: `FXY` (the sequence being defined), `ElementFXY` (one member of
/// its expansion, one row per member, grouped by consecutive `FXY`).
pub fn load_table_d(path: &Path) -> Result<TableD, CoreError> {
    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_path(path)?;
    let headers = reader.headers()?.clone();
    let idx = |name: &str| headers.iter().position(|h| h == name);
    let (fxy_i, elem_i) = (
        idx("FXY").ok_or_else(|| CoreError::TableFile("missing FXY column".into()))?,
        idx("ElementFXY").ok_or_else(|| CoreError::TableFile("missing ElementFXY column".into()))?,
    );

    let mut table = TableD::new();
    let mut current: Option<DescriptorId> = None;
    let mut expansion: Vec<DescriptorId> = Vec::new();
    for record in reader.records() {
        let record = record?;
        let Some(seq_id) = record.get(fxy_i).and_then(descriptor_from_fxy_column) else { continue };
        let Some(member_id) = record.get(elem_i).and_then(descriptor_from_fxy_column) else { continue };
        if current != Some(seq_id) {
            if let Some(prev) = current.take() {
                table.insert(prev, std::mem::take(&mut expansion));
            }
            current = Some(seq_id);
        }
        expansion.push(member_id);
    }
    if let Some(prev) = current {
        table.insert(prev, expansion);
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_table_b_row() {
        let file = tempfile_with_contents(
            "FXY,ElementName_en,BUFR_Unit,BUFR_Scale,BUFR_ReferenceValue,BUFR_DataWidth_Bits\n\
             \"012101\",\"TEMPERATURE/DRY-BULB TEMPERATURE\",\"K\",\"2\",\"0\",\"16\"\n",
        );
        let table = load_table_b(file.path()).unwrap();
        let meta = table.get(DescriptorId::new(0, 12, 101), true).unwrap();
        assert_eq!(meta.unit, "K");
        assert_eq!(meta.scale, 2);
        assert_eq!(meta.datawidth_bits, 16);
        file.flush().ok();
    }

    fn tempfile_with_contents(contents: &str) -> NamedTempFileLike {
        let path = std::env::temp_dir().join(format!("norbufr-test-{}.csv", std::process::id()));
        std::fs::write(&path, contents).unwrap();
        NamedTempFileLike { path }
    }

    struct NamedTempFileLike {
        path: std::path::PathBuf,
    }

    impl NamedTempFileLike {
        fn path(&self) -> &Path {
            &self.path
        }
        fn flush(&self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl Drop for NamedTempFileLike {
        fn drop(&mut self) {
            let _ = std::fs::remove_file(&self.path);
        }
    }
}
