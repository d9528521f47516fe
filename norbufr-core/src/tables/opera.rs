//! Parser for the OPERA radar community's semicolon-delimited table
//! variants. Same row layout as the ecCodes element table, but
//! semicolon-separated, matching the observed OPERA BUFR table exports.

use super::{TableB, TableC, TableD};
use crate::descriptor::{DescriptorId, DescriptorMeta};
use crate::error::CoreError;
use std::path::Path;

fn descriptor_from_token(token: &str) -> Option<DescriptorId> {
    let digits: String = token.chars().filter(|c| c.is_ascii_digit()).collect();
    DescriptorId::from_str_padded(&digits)
}

/// Rows: `fxy;name;unit;scale;reference;width`.
pub fn load_table_b(path: &Path) -> Result<TableB, CoreError> {
    let contents = std::fs::read_to_string(path)?;
    let mut table = TableB::new();
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = line.split(';').map(str::trim).collect();
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

/// Rows: `fxy;code;text`.
pub fn load_table_c(path: &Path) -> Result<TableC, CoreError> {
    let contents = std::fs::read_to_string(path)?;
    let mut table = TableC::new();
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = line.split(';').map(str::trim).collect();
        if fields.len() < 3 {
            continue;
        }
        let Some(id) = descriptor_from_token(fields[0]) else { continue };
        let Some(code) = fields[1].parse::<u64>().ok() else { continue };
        table.insert(id, code, fields[2]);
    }
    Ok(table)
}

/// Rows: `seq_fxy;member_fxy;member_fxy;...`.
pub fn load_table_d(path: &Path) -> Result<TableD, CoreError> {
    let contents = std::fs::read_to_string(path)?;
    let mut table = TableD::new();
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut fields = line.split(';').map(str::trim);
        let Some(seq_tok) = fields.next() else { continue };
        let Some(seq_id) = descriptor_from_token(seq_tok) else { continue };
        let members: Vec<DescriptorId> = fields.filter_map(descriptor_from_token).collect();
        table.insert(seq_id, members);
    }
    Ok(table)
}
