use crate::bitbuffer::BitBuffer;
use crate::descriptor::{Descriptor, DescriptorId, MetaPool};
use crate::error::CoreError;
use crate::framing::RawEnvelope;
use crate::log::{LogBuffer, LogLevel};
use crate::sections::{Section1, Section2, Section3, Section4};
use crate::tables::{TableB, TableD};
use chrono::Utc;
use std::collections::VecDeque;

/// A fully parsed and expanded BUFR envelope: the four sections, the shared
/// bit buffer(s), and the per-subset expanded descriptor lists the projector
/// consumes.
///
/// Composition, not inheritance: the source models Sections 1-4 via multiple
/// inheritance into one concrete type. Here a `DecodedMessage` simply holds
/// each section as a field (Section2 optional), matching the redesign note
/// in the grounding ledger.
pub struct DecodedMessage {
    pub edition: u8,
    pub section1: Section1,
    pub section2: Option<Section2>,
    pub section3: Section3,
    pub bits: BitBuffer,
    pub subset_start_bits: Vec<usize>,
    pub expanded_per_subset: Vec<Vec<Descriptor>>,
    pub extra_metas: MetaPool,
    pub uncompressed_bits: Option<BitBuffer>,
}

impl DecodedMessage {
    /// The bit buffer value extraction should read from for this message:
    /// the synthesized uncompressed buffer for compressed messages, the raw
    /// Section 4 payload otherwise.
    pub fn value_bits(&self) -> &BitBuffer {
        self.uncompressed_bits.as_ref().unwrap_or(&self.bits)
    }
}

/// Per-traversal operator-descriptor state: the mutable locals the
/// expansion engine threads through a single descriptor-list walk. Reset at
/// the start of every subset for uncompressed messages; held for the
/// duration of the single shared walk for compressed ones.
#[derive(Default)]
struct OperatorState {
    mod_datawidth: i32,
    mod_scale: i32,
    mod_refvalue: i64,
    mod_str_datawidth: u32,
    local_datawidth: u32,
    assoc_field: Vec<u32>,
}

fn derive_meta(base: &crate::descriptor::DescriptorMeta, state: &OperatorState) -> crate::descriptor::DescriptorMeta {
    let assoc = state.assoc_field.last().copied().unwrap_or(0);
    let datawidth = (base.datawidth_bits as i32 + state.mod_datawidth).max(0) as u32 + assoc;
    crate::descriptor::DescriptorMeta {
        scale: base.scale + state.mod_scale,
        reference: base.reference + state.mod_refvalue,
        datawidth_bits: datawidth,
        ..base.clone()
    }
}

/// Applies one `2 X Y` operator descriptor's effect to `state`, per §4.3.
/// Operators other than `2 01`..`2 08` are logged at Warn and otherwise
/// ignored, matching the source's fallback behavior for operators it
/// doesn't implement.
fn apply_operator_descriptor(x: u8, y: u8, state: &mut OperatorState, bits: &BitBuffer, sb: &mut usize, log: &mut LogBuffer, bufr_id: Option<&str>) {
    match x {
        1 => state.mod_datawidth = if y == 0 { 0 } else { y as i32 - 128 },
        2 => state.mod_scale = if y == 0 { 0 } else { y as i32 - 128 },
        3 => {
            if y != 255 {
                state.mod_refvalue = bits.get_uint(*sb, y as usize, false) as i64;
                *sb += y as usize;
            } else {
                state.mod_refvalue = 0;
            }
        }
        4 => {
            if y != 0 {
                let top = state.assoc_field.last().copied().unwrap_or(0);
                state.assoc_field.push(y as u32 + top);
            } else {
                state.assoc_field.pop();
            }
        }
        5 => *sb += y as usize * 8,
        6 => state.local_datawidth = y as u32,
        7 => {
            if y == 0 {
                state.mod_scale = 0;
                state.mod_refvalue = 0;
                state.mod_datawidth = 0;
            } else {
                state.mod_scale = y as i32;
                state.mod_refvalue = 10i64.pow(y as u32);
                state.mod_datawidth = ((10 * y as i32) + 2) / 3;
            }
        }
        8 => state.mod_str_datawidth = y as u32 * 8,
        other => log.add(Utc::now(), LogLevel::Warn, "decoder", bufr_id.map(str::to_string), format!("unhandled operator descriptor 2 {other:02} {y:03}")),
    }
}

/// Expands `declared` once against the raw (uncompressed) bit buffer
/// starting at `start_bit`, producing one subset's list of resolved
/// descriptors. Returns the list and the bit position just past its last
/// value, which becomes the next subset's `start_bit` for multi-subset
/// uncompressed messages.
pub fn expand_subset_uncompressed(
    declared: &[DescriptorId],
    table_b: &TableB,
    table_d: &TableD,
    bits: &BitBuffer,
    start_bit: usize,
    meta_pool: &mut MetaPool,
    log: &mut LogBuffer,
    bufr_id: Option<&str>,
) -> Result<(Vec<Descriptor>, usize), CoreError> {
    let mut dl: VecDeque<DescriptorId> = declared.iter().copied().collect();
    let mut sb = start_bit;
    let mut out = Vec::new();
    let mut state = OperatorState::default();

    while let Some(d) = dl.pop_front() {
        match d.f {
            0 => {
                if !state.assoc_field.is_empty() && d != DescriptorId::new(0, 31, 21) {
                    sb += *state.assoc_field.last().unwrap() as usize;
                }
                let base = table_b.get(d, false)?;
                out.push(Descriptor::new(d, sb, std::rc::Rc::new(base.clone())));
                if state.local_datawidth > 0 {
                    let derived = base.with_datawidth(state.local_datawidth);
                    sb += state.local_datawidth as usize;
                    out.last_mut().unwrap().meta = meta_pool.intern(derived);
                } else if base.is_ccittia5() && state.mod_str_datawidth > 0 {
                    let derived = base.with_datawidth(state.mod_str_datawidth);
                    sb += state.mod_str_datawidth as usize;
                    out.last_mut().unwrap().meta = meta_pool.intern(derived);
                } else if base.is_code_or_flag_table() {
                    sb += base.datawidth_bits as usize;
                } else {
                    let derived = derive_meta(&base, &state);
                    sb += derived.datawidth_bits as usize;
                    out.last_mut().unwrap().meta = meta_pool.intern(derived);
                }
            }
            1 => {
                out.push(Descriptor::new(d, sb, meta_pool.intern(crate::descriptor::DescriptorMeta::new("REPLICATION", "", 0, 0, 0))));
                let descnum = d.x as usize;
                let repeatnum = if d.y > 0 {
                    d.y as u32
                } else {
                    let counter_id = dl.pop_front().ok_or(CoreError::MissingDelayedCounter)?;
                    if counter_id.f != 0 || counter_id.x != 31 {
                        return Err(CoreError::MissingDelayedCounter);
                    }
                    let meta = table_b.get(counter_id, false)?;
                    let width = meta.datawidth_bits as usize;
                    let count = bits.get_uint(sb, width, false);
                    out.push(Descriptor::new(counter_id, sb, meta_pool.intern(meta)));
                    sb += width;
                    count as u32
                };
                if repeatnum > 0 {
                    let block: Vec<DescriptorId> = dl.iter().take(descnum).copied().collect();
                    for _ in 1..repeatnum {
                        for id in &block {
                            dl.push_back(*id);
                        }
                    }
                } else {
                    for _ in 0..descnum {
                        dl.pop_front();
                    }
                }
            }
            2 => {
                out.push(Descriptor::new(d, sb, meta_pool.intern(crate::descriptor::DescriptorMeta::new("OPERATOR", "", 0, 0, 0))));
                apply_operator_descriptor(d.x, d.y, &mut state, bits, &mut sb, log, bufr_id);
            }
            3 => {
                out.push(Descriptor::new(d, sb, meta_pool.intern(crate::descriptor::DescriptorMeta::new("SEQUENCE", "", 0, 0, 0))));
                let expansion = table_d.expand(d, false)?;
                for id in expansion.into_iter().rev() {
                    dl.push_front(id);
                }
            }
            _ => unreachable!("DescriptorId::f is constrained to 0..=3"),
        }
    }
    Ok((out, sb))
}

/// Compressed-subset expansion per §4.4: a single walk over `declared`
/// synthesizes an `uncompressed_bits` vector and one expanded descriptor
/// list per subset. `subsetsb` is a single shared cursor that advances
/// monotonically across the whole uncompressed buffer: for each descriptor
/// it writes every subset's value in turn before moving to the next
/// descriptor, so the layout is contiguous per-descriptor-then-per-subset
/// (see the invariant in spec §8).
pub fn expand_compressed(
    declared: &[DescriptorId],
    table_b: &TableB,
    table_d: &TableD,
    bits: &BitBuffer,
    subset_count: u16,
    meta_pool: &mut MetaPool,
    log: &mut LogBuffer,
    bufr_id: Option<&str>,
) -> Result<(Vec<Vec<Descriptor>>, BitBuffer), CoreError> {
    let mut dl: VecDeque<DescriptorId> = declared.iter().copied().collect();
    let mut sb = 0usize;
    let mut ucbits = BitBuffer::new();
    let mut subsetsb = 0usize;
    let mut per_subset: Vec<Vec<Descriptor>> = (0..subset_count).map(|_| Vec::new()).collect();
    let mut state = OperatorState::default();

    while let Some(d) = dl.pop_front() {
        match d.f {
            0 => {
                let base = table_b.get(d, false)?;
                let meta = if state.local_datawidth > 0 {
                    base.with_datawidth(state.local_datawidth)
                } else if base.is_ccittia5() && state.mod_str_datawidth > 0 {
                    base.with_datawidth(state.mod_str_datawidth)
                } else if base.is_code_or_flag_table() {
                    base.clone()
                } else {
                    derive_meta(&base, &state)
                };
                let handle = meta_pool.intern(meta.clone());
                let is_delayed_counter = d.f == 0 && d.x == 31;
                uncompress_descriptor(&meta, bits, subset_count, &mut sb, &mut subsetsb, &mut ucbits, &mut per_subset, &handle, d, is_delayed_counter, log, bufr_id, None)?;
            }
            1 => {
                let descnum = d.x as usize;
                let repeatnum = if d.y > 0 {
                    d.y as u32
                } else {
                    let counter_id = dl.pop_front().ok_or(CoreError::MissingDelayedCounter)?;
                    let meta = table_b.get(counter_id, false)?;
                    let handle = meta_pool.intern(meta.clone());
                    let mut decoded_values = Vec::new();
                    uncompress_descriptor(&meta, bits, subset_count, &mut sb, &mut subsetsb, &mut ucbits, &mut per_subset, &handle, counter_id, true, log, bufr_id, Some(&mut decoded_values))?;
                    // All subsets must agree on a delayed counter's value under compression.
                    let mut agreed: Option<u64> = None;
                    for v in &decoded_values {
                        match agreed {
                            None => agreed = Some(*v),
                            Some(prev) if prev != *v => return Err(CoreError::CompressedCounterMismatch),
                            _ => {}
                        }
                    }
                    agreed.unwrap_or(0) as u32
                };
                if repeatnum > 0 {
                    let block: Vec<DescriptorId> = dl.iter().take(descnum).copied().collect();
                    for _ in 1..repeatnum {
                        for id in &block {
                            dl.push_back(*id);
                        }
                    }
                } else {
                    for _ in 0..descnum {
                        dl.pop_front();
                    }
                }
            }
            2 => {
                // Operators are no-ops in the compressed walk beyond their
                // identity bookkeeping, per §4.3: "If compressed, do
                // nothing else."
                apply_operator_width_only(d.x, d.y, &mut state);
            }
            3 => {
                let expansion = table_d.expand(d, false)?;
                for id in expansion.into_iter().rev() {
                    dl.push_front(id);
                }
            }
            _ => unreachable!("DescriptorId::f is constrained to 0..=3"),
        }
    }
    Ok((per_subset, ucbits))
}

/// The width/scale/reference side effects of operator descriptors still
/// apply under compression (so later elements in the same walk derive the
/// right meta) even though `uncompress_descriptor` itself does not branch
/// on them further, per §4.3's "If compressed, do nothing else."
fn apply_operator_width_only(x: u8, y: u8, state: &mut OperatorState) {
    match x {
        1 => state.mod_datawidth = if y == 0 { 0 } else { y as i32 - 128 },
        2 => state.mod_scale = if y == 0 { 0 } else { y as i32 - 128 },
        6 => state.local_datawidth = y as u32,
        7 => {
            if y == 0 {
                state.mod_scale = 0;
                state.mod_refvalue = 0;
                state.mod_datawidth = 0;
            } else {
                state.mod_scale = y as i32;
                state.mod_refvalue = 10i64.pow(y as u32);
                state.mod_datawidth = ((10 * y as i32) + 2) / 3;
            }
        }
        8 => state.mod_str_datawidth = y as u32 * 8,
        _ => {}
    }
}

#[allow(clippy::too_many_arguments)]
fn uncompress_descriptor(
    meta: &crate::descriptor::DescriptorMeta,
    bits: &BitBuffer,
    subset_count: u16,
    sb: &mut usize,
    subsetsb: &mut usize,
    ucbits: &mut BitBuffer,
    per_subset: &mut [Vec<Descriptor>],
    meta_handle: &std::rc::Rc<crate::descriptor::DescriptorMeta>,
    id: DescriptorId,
    is_delayed_counter: bool,
    log: &mut LogBuffer,
    bufr_id: Option<&str>,
    mut decoded_values: Option<&mut Vec<u64>>,
) -> Result<(), CoreError> {
    let dw = meta.datawidth_bits as usize;
    let r0 = bits.get_uint(*sb, dw, false);
    *sb += dw;
    let nbinc = bits.get_uint(*sb, 6, false) as usize;
    *sb += 6;

    for s in 0..subset_count as usize {
        let inc = bits.get_uint(*sb, nbinc, true);
        let push_descriptor = !(is_delayed_counter && s == 0);
        if push_descriptor {
            per_subset[s].push(Descriptor::new(id, *subsetsb, std::rc::Rc::clone(meta_handle)));
        }
        if meta.is_ccittia5() {
            let chunk = bits.get_sub_bits(*sb, nbinc * 8);
            ucbits.push_bits(&chunk);
            *sb += nbinc * 8;
            *subsetsb += nbinc * 8;
        } else {
            let val = if inc == crate::bitbuffer::MISSING { crate::bitbuffer::MISSING } else { r0 + inc };
            if is_delayed_counter && val == crate::bitbuffer::MISSING {
                log.add(Utc::now(), LogLevel::Fatal, "decoder", bufr_id.map(str::to_string), "delayed replication counter missing under compression");
                return Err(CoreError::CompressedCounterMismatch);
            }
            if let Some(values) = decoded_values.as_deref_mut() {
                values.push(val);
            }
            ucbits.push_bits(&BitBuffer::value_to_bits(val, dw));
            *sb += nbinc;
            *subsetsb += dw;
        }
    }
    Ok(())
}

/// Parses all four sections out of a raw envelope and runs the expansion
/// engine, producing a fully decoded message ready for projection.
pub fn decode_message(envelope: &RawEnvelope, table_b: &TableB, table_d: &TableD, log: &mut LogBuffer, bufr_id: Option<&str>) -> Result<DecodedMessage, CoreError> {
    let buf = &envelope.bytes;
    if buf.len() < 8 {
        return Err(CoreError::ShortRead { wanted: 8, have: buf.len() });
    }
    let mut offset = 8usize; // past Section 0

    let section1 = Section1::parse(envelope.edition, &buf[offset..])?;
    let s1_len = u32::from_be_bytes([0, buf[offset], buf[offset + 1], buf[offset + 2]]) as usize;
    offset += s1_len;

    let section2 = if section1.has_section2() {
        let s2 = Section2::parse(&buf[offset..])?;
        let s2_len = u32::from_be_bytes([0, buf[offset], buf[offset + 1], buf[offset + 2]]) as usize;
        offset += s2_len;
        Some(s2)
    } else {
        None
    };

    let section3 = Section3::parse(&buf[offset..])?;
    let s3_len = u32::from_be_bytes([0, buf[offset], buf[offset + 1], buf[offset + 2]]) as usize;
    offset += s3_len;

    let section4 = Section4::parse(&buf[offset..])?;

    let mut meta_pool = MetaPool::new();
    let mut subset_start_bits = Vec::new();
    let mut expanded_per_subset;
    let mut uncompressed_bits = None;

    if section3.compressed_flag {
        let (per_subset, ucbits) = expand_compressed(&section3.declared_descriptors, table_b, table_d, &section4.bits, section3.subset_count, &mut meta_pool, log, bufr_id)?;
        expanded_per_subset = per_subset;
        uncompressed_bits = Some(ucbits);
        subset_start_bits = vec![0; section3.subset_count as usize];
    } else {
        expanded_per_subset = Vec::with_capacity(section3.subset_count as usize);
        let mut sb = 0usize;
        for _ in 0..section3.subset_count {
            subset_start_bits.push(sb);
            let (subset, end_sb) = expand_subset_uncompressed(&section3.declared_descriptors, table_b, table_d, &section4.bits, sb, &mut meta_pool, log, bufr_id)?;
            expanded_per_subset.push(subset);
            sb = end_sb;
        }
    }

    Ok(DecodedMessage {
        edition: envelope.edition,
        section1,
        section2,
        section3,
        bits: section4.bits,
        subset_start_bits,
        expanded_per_subset,
        extra_metas: meta_pool,
        uncompressed_bits,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::DescriptorMeta;

    fn table_with_temperature() -> TableB {
        let mut t = TableB::new();
        t.insert(DescriptorId::new(0, 12, 101), DescriptorMeta::new("TEMPERATURE", "K", 2, 0, 16));
        t.insert(DescriptorId::new(0, 31, 1), DescriptorMeta::new("DELAYED REPL COUNT", "NUMERIC", 0, 0, 8));
        t
    }

    #[test]
    fn expands_single_element_uncompressed() {
        let table_b = table_with_temperature();
        let table_d = TableD::new();
        let mut log = LogBuffer::new(100, LogLevel::Trace);
        let mut pool = MetaPool::new();
        let bits = BitBuffer::value_to_bits(28315, 16);
        let (descriptors, end) = expand_subset_uncompressed(&[DescriptorId::new(0, 12, 101)], &table_b, &table_d, &bits, 0, &mut pool, &mut log, None).unwrap();
        assert_eq!(descriptors.len(), 1);
        assert_eq!(end, 16);
        assert_eq!(descriptors[0].start_bit, 0);
    }

    #[test]
    fn delayed_replication_reads_counter_and_repeats_block() {
        let table_b = table_with_temperature();
        let table_d = TableD::new();
        let mut log = LogBuffer::new(100, LogLevel::Trace);
        let mut pool = MetaPool::new();

        let mut bits = BitBuffer::new();
        bits.push_bits(&BitBuffer::value_to_bits(3, 8)); // delayed count = 3
        for v in [28315u64, 28320, 28325] {
            bits.push_bits(&BitBuffer::value_to_bits(v, 16));
        }

        let declared = [DescriptorId::new(1, 1, 0), DescriptorId::new(0, 31, 1), DescriptorId::new(0, 12, 101)];
        let (descriptors, _end) = expand_subset_uncompressed(&declared, &table_b, &table_d, &bits, 0, &mut pool, &mut log, None).unwrap();
        // replication marker + counter + 3 temperature occurrences
        let temp_count = descriptors.iter().filter(|d| d.id == DescriptorId::new(0, 12, 101)).count();
        assert_eq!(temp_count, 3);
    }
}
