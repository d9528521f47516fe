use crate::bitbuffer::{BitBuffer, MISSING};
use crate::descriptor::Descriptor;
use crate::tables::TableC;

/// Integer-typed missing sentinel, distinct from the bit-level [`MISSING`]
/// (`u64::MAX`): a signed getter that encounters a missing bit pattern
/// cannot represent `u64::MAX`, so it reports `i64::MIN` instead. See the
/// open question recorded in the grounding ledger about the source's
/// inconsistent `int::MAX`-vs-`u64::MAX` comparisons.
pub const MISSING_INT: i64 = i64::MIN;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Real(f64),
    Integer(i64),
    Text(String),
    Missing,
}

fn missing_mask_for(descriptor: &Descriptor) -> bool {
    // Replication counters (0 31 Y) are never treated as missing.
    !(descriptor.id.f == 0 && descriptor.id.x == 31)
}

/// Reads a descriptor's value as a string. String-typed descriptors (F=2,
/// X=5, or unit CCITTIA5) read byte-wise; if every byte read back as the
/// bit-level missing sentinel, the result is the literal text `"MISSING"`.
/// Numeric descriptors are formatted via [`extract_real`]/[`extract_int`],
/// with zero decimal places when `X == 1` (platform/station identity
/// fields), matching the source's string-form convention.
pub fn extract_string(descriptor: &Descriptor, bits: &BitBuffer) -> String {
    if descriptor.id.f == 2 && descriptor.id.x == 5 || descriptor.meta.is_ccittia5() {
        let width = descriptor.meta.datawidth_bits as usize;
        let nbytes = width / 8;
        let mut out = String::with_capacity(nbytes);
        let mut all_missing = true;
        for i in 0..nbytes {
            let byte = bits.get_uint(descriptor.start_bit + i * 8, 8, true);
            if byte != MISSING {
                all_missing = false;
                if byte != 0 {
                    out.push(byte as u8 as char);
                }
            }
        }
        return if all_missing { "MISSING".to_string() } else { out };
    }
    match extract_real(descriptor, bits) {
        Value::Missing => "MISSING".to_string(),
        Value::Real(v) => {
            if descriptor.id.x == 1 {
                format!("{v:.0}")
            } else {
                format!("{v}")
            }
        }
        Value::Integer(v) => v.to_string(),
        Value::Text(s) => s,
    }
}

/// Reads a descriptor as a real (floating-point) value: `(raw + reference) /
/// 10^scale`. Returns [`Value::Missing`] if the raw bit pattern is the
/// bit-level missing sentinel.
pub fn extract_real(descriptor: &Descriptor, bits: &BitBuffer) -> Value {
    let width = descriptor.meta.datawidth_bits as usize;
    let raw = bits.get_uint(descriptor.start_bit, width, missing_mask_for(descriptor));
    if raw == MISSING {
        return Value::Missing;
    }
    let real = (raw as f64 + descriptor.meta.reference as f64) / 10f64.powi(descriptor.meta.scale);
    Value::Real(real)
}

/// Reads a descriptor as a truncating integer, dividing by `10^scale` the
/// same way [`extract_real`] does but truncating toward zero instead of
/// keeping fractional precision.
pub fn extract_int(descriptor: &Descriptor, bits: &BitBuffer) -> Value {
    let width = descriptor.meta.datawidth_bits as usize;
    let raw = bits.get_uint(descriptor.start_bit, width, missing_mask_for(descriptor));
    if raw == MISSING {
        return Value::Integer(MISSING_INT);
    }
    let biased = raw as i64 + descriptor.meta.reference;
    let scale = descriptor.meta.scale;
    let divisor = 10f64.powi(scale);
    Value::Integer((biased as f64 / divisor) as i64)
}

/// Reads a code/flag-table descriptor: looks up the raw code value in
/// `table_c` and returns its text, or an empty string if the table has no
/// entry for this code. Only meaningful when `descriptor.meta` has no
/// reference offset, per §4.5.
pub fn extract_coded(descriptor: &Descriptor, bits: &BitBuffer, table_c: &TableC) -> Value {
    let width = descriptor.meta.datawidth_bits as usize;
    let raw = bits.get_uint(descriptor.start_bit, width, missing_mask_for(descriptor));
    if raw == MISSING {
        return Value::Missing;
    }
    match table_c.get(descriptor.id, raw) {
        Some(text) => Value::Text(text.to_string()),
        None => Value::Text(String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{DescriptorId, DescriptorMeta};
    use std::rc::Rc;

    fn descriptor_with(f: u8, x: u8, y: u8, scale: i32, reference: i64, width: u32) -> Descriptor {
        let meta = Rc::new(DescriptorMeta::new("TEST", "K", scale, reference, width));
        Descriptor::new(DescriptorId::new(f, x, y), 0, meta)
    }

    #[test]
    fn real_applies_scale_and_reference() {
        let d = descriptor_with(0, 12, 101, 2, 0, 16);
        let bits = BitBuffer::value_to_bits(28315, 16);
        assert_eq!(extract_real(&d, &bits), Value::Real(283.15));
    }

    #[test]
    fn missing_sentinel_propagates() {
        let d = descriptor_with(0, 5, 1, 5, 0, 25);
        let bits = BitBuffer::value_to_bits((1u64 << 25) - 1, 25);
        assert_eq!(extract_real(&d, &bits), Value::Missing);
    }

    #[test]
    fn replication_counter_disables_missing_mask() {
        let d = descriptor_with(0, 31, 1, 0, 0, 8);
        let bits = BitBuffer::value_to_bits(0xff, 8);
        assert_eq!(extract_real(&d, &bits), Value::Real(255.0));
    }

    #[test]
    fn string_form_zero_decimals_for_x1() {
        let d = descriptor_with(0, 1, 2, 0, 0, 16);
        let bits = BitBuffer::value_to_bits(345, 16);
        assert_eq!(extract_string(&d, &bits), "345");
    }
}
