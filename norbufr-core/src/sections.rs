use crate::error::CoreError;
use chrono::NaiveDateTime;

/// Section 1: message metadata. Field layout differs between edition 3 and
/// edition ≥4 (edition 3 lacks `subcentre` and seconds, and uses a 2-digit
/// year); [`Section1::parse`] branches explicitly on edition rather than
/// reusing the source's single shifted-offset layout, per the redesign note
/// on composing sections instead of inheriting a monolithic byte layout.
#[derive(Debug, Clone)]
pub struct Section1 {
    pub master_table: u8,
    pub centre: u16,
    pub subcentre: u16,
    pub update_seq_num: u8,
    pub optional_section_flag: u8,
    pub data_category: u8,
    pub intl_data_subcategory: u8,
    pub local_data_subcategory: u8,
    pub version_master: u8,
    pub version_local: u8,
    pub bufr_time: NaiveDateTime,
    pub local_data: Vec<u8>,
}

impl Section1 {
    pub fn has_section2(&self) -> bool {
        self.optional_section_flag & 0x80 != 0
    }

    pub fn parse(edition: u8, buf: &[u8]) -> Result<Section1, CoreError> {
        if buf.len() < 4 {
            return Err(CoreError::ShortRead { wanted: 4, have: buf.len() });
        }
        let length = u32::from_be_bytes([0, buf[0], buf[1], buf[2]]) as usize;
        if buf.len() < length {
            return Err(CoreError::ShortRead { wanted: length, have: buf.len() });
        }
        if edition >= 4 {
            Self::parse_edition4(buf, length)
        } else {
            Self::parse_edition3(buf, length)
        }
    }

    fn parse_edition4(buf: &[u8], length: usize) -> Result<Section1, CoreError> {
        if length < 22 {
            return Err(CoreError::MalformedSection { section: 1, detail: "edition 4 section 1 shorter than 22 bytes".into() });
        }
        let master_table = buf[3];
        let centre = u16::from_be_bytes([buf[4], buf[5]]);
        let subcentre = u16::from_be_bytes([buf[6], buf[7]]);
        let update_seq_num = buf[8];
        let optional_section_flag = buf[9];
        let data_category = buf[10];
        let intl_data_subcategory = buf[11];
        let local_data_subcategory = buf[12];
        let version_master = buf[13];
        let version_local = buf[14];
        let year = u16::from_be_bytes([buf[15], buf[16]]) as i32;
        let (month, day, hour, minute, second) = (buf[17], buf[18], buf[19], buf[20], buf[21]);
        let bufr_time = make_datetime(year, month, day, hour, minute, second)?;
        let local_data = buf.get(22..length).unwrap_or_default().to_vec();
        Ok(Section1 {
            master_table,
            centre,
            subcentre,
            update_seq_num,
            optional_section_flag,
            data_category,
            intl_data_subcategory,
            local_data_subcategory,
            version_master,
            version_local,
            bufr_time,
            local_data,
        })
    }

    fn parse_edition3(buf: &[u8], length: usize) -> Result<Section1, CoreError> {
        if length < 17 {
            return Err(CoreError::MalformedSection { section: 1, detail: "edition 3 section 1 shorter than 17 bytes".into() });
        }
        let master_table = buf[3];
        // Edition 3 stores subcentre before centre, one byte each.
        let subcentre = buf[4] as u16;
        let centre = buf[5] as u16;
        let update_seq_num = buf[6];
        let optional_section_flag = buf[7];
        let data_category = buf[8];
        let local_data_subcategory = buf[9];
        let version_master = buf[10];
        let version_local = buf[11];
        let year = 2000 + buf[12] as i32;
        let (month, day, hour, minute) = (buf[13], buf[14], buf[15], buf[16]);
        let bufr_time = make_datetime(year, month, day, hour, minute, 0)?;
        let local_data = buf.get(17..length).unwrap_or_default().to_vec();
        Ok(Section1 {
            master_table,
            centre,
            subcentre,
            update_seq_num,
            optional_section_flag,
            data_category,
            intl_data_subcategory: 0,
            local_data_subcategory,
            version_master,
            version_local,
            bufr_time,
            local_data,
        })
    }
}

fn make_datetime(year: i32, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Result<NaiveDateTime, CoreError> {
    chrono::NaiveDate::from_ymd_opt(year, month as u32, day as u32)
        .and_then(|d| d.and_hms_opt(hour as u32, minute as u32, second as u32))
        .ok_or_else(|| CoreError::MalformedSection {
            section: 1,
            detail: format!("invalid datetime {year:04}-{month:02}-{day:02}T{hour:02}:{minute:02}:{second:02}"),
        })
}

/// Section 2: optional, centre-local data. Present iff Section 1's
/// `optional_section_flag` has bit 7 set. Opaque to the decoder.
#[derive(Debug, Clone)]
pub struct Section2 {
    pub data: Vec<u8>,
}

impl Section2 {
    pub fn parse(buf: &[u8]) -> Result<Section2, CoreError> {
        if buf.len() < 4 {
            return Err(CoreError::ShortRead { wanted: 4, have: buf.len() });
        }
        let length = u32::from_be_bytes([0, buf[0], buf[1], buf[2]]) as usize;
        if buf.len() < length {
            return Err(CoreError::ShortRead { wanted: length, have: buf.len() });
        }
        Ok(Section2 { data: buf.get(4..length).unwrap_or_default().to_vec() })
    }
}

/// Section 3: subset count, observed/compressed flags, and the declared
/// descriptor list.
#[derive(Debug, Clone)]
pub struct Section3 {
    pub subset_count: u16,
    pub obs_flag: bool,
    pub compressed_flag: bool,
    pub declared_descriptors: Vec<crate::descriptor::DescriptorId>,
}

impl Section3 {
    pub fn parse(buf: &[u8]) -> Result<Section3, CoreError> {
        if buf.len() < 7 {
            return Err(CoreError::ShortRead { wanted: 7, have: buf.len() });
        }
        let length = u32::from_be_bytes([0, buf[0], buf[1], buf[2]]) as usize;
        if buf.len() < length {
            return Err(CoreError::ShortRead { wanted: length, have: buf.len() });
        }
        let subset_count = u16::from_be_bytes([buf[4], buf[5]]);
        if subset_count == 0 {
            return Err(CoreError::MalformedSection { section: 3, detail: "subset count is zero".into() });
        }
        let flags = buf[6];
        let obs_flag = flags & 0x80 != 0;
        let compressed_flag = flags & 0x40 != 0;
        let mut declared_descriptors = Vec::new();
        let mut i = 7;
        while i + 1 < length {
            let packed = u16::from_be_bytes([buf[i], buf[i + 1]]);
            declared_descriptors.push(crate::descriptor::DescriptorId::from_packed16(packed));
            i += 2;
        }
        Ok(Section3 { subset_count, obs_flag, compressed_flag, declared_descriptors })
    }
}

/// Section 4: the payload bit stream, MSB-first.
#[derive(Debug, Clone)]
pub struct Section4 {
    pub bits: crate::bitbuffer::BitBuffer,
}

impl Section4 {
    pub fn parse(buf: &[u8]) -> Result<Section4, CoreError> {
        if buf.len() < 4 {
            return Err(CoreError::ShortRead { wanted: 4, have: buf.len() });
        }
        let length = u32::from_be_bytes([0, buf[0], buf[1], buf[2]]) as usize;
        if buf.len() < length {
            return Err(CoreError::ShortRead { wanted: length, have: buf.len() });
        }
        let payload = buf.get(4..length).unwrap_or_default().to_vec();
        Ok(Section4 { bits: crate::bitbuffer::BitBuffer::from_bytes(payload) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edition4_section1_bytes() -> Vec<u8> {
        let mut buf = vec![0u8; 22];
        let len = 22u32.to_be_bytes();
        buf[0..3].copy_from_slice(&len[1..4]);
        buf[3] = 0; // master_table
        buf[4..6].copy_from_slice(&98u16.to_be_bytes()); // centre
        buf[6..8].copy_from_slice(&0u16.to_be_bytes()); // subcentre
        buf[8] = 0; // update_seq
        buf[9] = 0; // optional flag
        buf[10] = 0; // data category
        buf[11] = 0;
        buf[12] = 0;
        buf[13] = 0;
        buf[14] = 0;
        buf[15..17].copy_from_slice(&2024u16.to_be_bytes());
        buf[17] = 6; // month
        buf[18] = 1; // day
        buf[19] = 0;
        buf[20] = 0;
        buf[21] = 0;
        buf
    }

    #[test]
    fn parses_edition4_datetime() {
        let buf = edition4_section1_bytes();
        let s1 = Section1::parse(4, &buf).unwrap();
        assert_eq!(s1.bufr_time.to_string(), "2024-06-01 00:00:00");
        assert_eq!(s1.centre, 98);
        assert!(!s1.has_section2());
    }

    #[test]
    fn section3_rejects_zero_subsets() {
        let mut buf = vec![0u8; 8];
        let len = 8u32.to_be_bytes();
        buf[0..3].copy_from_slice(&len[1..4]);
        buf[4..6].copy_from_slice(&0u16.to_be_bytes());
        assert!(Section3::parse(&buf).is_err());
    }
}
