//! Parser for ecCodes-style text table definitions: pipe-delimited element
//! table, whitespace-delimited code tables, paren-bracketed sequence
//! definitions. Hand-rolled string splitting, matching the source's and the
//! teacher's own preference for direct parsing over a grammar crate for
//! these small fixed-layout formats.

use super::{TableB, TableC, TableD};
use crate::descriptor::{DescriptorId, DescriptorMeta};
use crate::error::CoreError;
use std::path::Path;

fn descriptor_from_token(token: &str) -> Option<DescriptorId> {
    let digits: String = token.chars().filter(|c| c.is_ascii_digit()).collect();
    DescriptorId::from_str_padded(&digits)
}

/// `element.table` rows: `key|name|unit|scale|reference|width`.
pub fn load_table_b(path: &Path) -> Result<TableB, CoreError> {
    let contents = std::fs::read_to_string(path)?;
    let mut table = TableB::new();
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = line.split('|').map(str::trim).collect();
        if fields.len() < 6 {
            continue;
        }
        let Some(id) = descriptor_from_token(fields[0]) else { continue };
        let scale: i32 = fields[3].parse().unwrap_or(0);
        let reference: i64 = fields[4].parse().unwrap_or(0);
        let width: u32 = fields[5].parse().unwrap_or(0);
        table.insert(id, DescriptorMeta::new(fields[1], fields[2], scale, reference, width));
    }
    Ok(table)
}

/// `codetables/<fxy>` rows: `code value  text...` whitespace-separated, the
/// FXY itself taken from the file name.
pub fn load_table_c(path: &Path) -> Result<TableC, CoreError> {
    let id = path
        .file_stem()
        .and_then(|s| s.to_str())
        .and_then(descriptor_from_token)
        .ok_or_else(|| CoreError::TableFile(format!("cannot derive FXY from ecCodes code table path: {}", path.display())))?;
    let contents = std::fs::read_to_string(path)?;
    let mut table = TableC::new();
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut parts = line.splitn(2, char::is_whitespace);
        let Some(code_str) = parts.next() else { continue };
        let Some(code) = code_str.trim().parse::<u64>().ok() else { continue };
        let text = parts.next().unwrap_or_default().trim();
        table.insert(id, code, text);
    }
    Ok(table)
}

/// `sequence.def` rows: `seq_fxy = ( member_fxy member_fxy ... )`.
pub fn load_table_d(path: &Path) -> Result<TableD, CoreError> {
    let contents = std::fs::read_to_string(path)?;
    let mut table = TableD::new();
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((head, rest)) = line.split_once('=') else { continue };
        let Some(seq_id) = descriptor_from_token(head.trim()) else { continue };
        let inner = rest.trim().trim_start_matches('(').trim_end_matches(')');
        let members: Vec<DescriptorId> = inner.split_whitespace().filter_map(descriptor_from_token).collect();
        table.insert(seq_id, members);
    }
    Ok(table)
}
