use crate::cf_names;
use crate::country_codes;
use crate::oscar::Oscar;
use crate::time_window::TimeWindowConfig;
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use geojson::{JsonObject, JsonValue};
use norbufr_core::value_extractor::{extract_coded, extract_real, extract_string, Value};
use norbufr_core::{DecodedMessage, Descriptor, LogBuffer, LogLevel, Wsi};
use norbufr_core::tables::TableC;

/// Caller-configurable knobs for message assembly, all left as setters in
/// the source rather than hard constants.
pub struct ProjectorConfig {
    /// Prefix used when synthesizing a shadow WIGOS id, e.g. `"0-578-2024-"`.
    pub default_shadow_wigos: String,
    /// Character substitutions applied to `platform_name` before emission,
    /// e.g. `('-', '_')`.
    pub char_replacements: Vec<(char, char)>,
    /// Base message template; the projector overwrites known paths and
    /// leaves the rest untouched.
    pub template: JsonValue,
}

impl Default for ProjectorConfig {
    fn default() -> Self {
        ProjectorConfig {
            default_shadow_wigos: "0-578-2024-".to_string(),
            char_replacements: vec![('-', '_')],
            template: default_template(),
        }
    }
}

fn default_template() -> JsonValue {
    serde_json::json!({
        "id": "",
        "version": "v4",
        "type": "Feature",
        "geometry": { "type": "Point", "coordinates": [] },
        "properties": {
            "datetime": "",
            "platform": "",
            "platform_name": "",
            "content": {
                "encoding": "utf-8",
                "standard_name": "",
                "unit": "",
                "size": 0,
                "value": ""
            }
        },
        "links": []
    })
}

/// Per-subset spatiotemporal and identity context the dispatch loop
/// accumulates as it walks a subset's expanded descriptors.
struct Context {
    lat: f64,
    lon: f64,
    height: f64,
    sensor_level: i64,
    sensor_level_active: i32,
    wigos_id: Wsi,
    platform_checked: bool,
    platform_accepted: bool,
    platform_name: Option<String>,
    meas_datetime: NaiveDateTime,
    /// Accumulated seconds displacement from long/short time-period
    /// descriptors (`0-04-021`..`86`), applied on top of `meas_datetime`
    /// when rendering the emitted `datetime` string.
    time_disp: i64,
    /// Rendered `"<begin><magnitude><end>"` period label, reused by every
    /// emission until the next datetime descriptor updates it, mirroring
    /// the source's single shared template field.
    period_str: Option<String>,
    /// Set on the first of a start/end period descriptor pair (same `(X,Y)`
    /// appearing twice back to back), consumed by the second.
    start_end_period: bool,
    last_dt_id: Option<(u8, u8)>,
    last_dt_raw: Option<i64>,
    /// Set while walking the fixed sub-sequence of a `3 02 034/040/045`
    /// sum macro; the next successful emission is tagged `function="sum"`
    /// instead of `"point"` and the flag clears.
    pending_sum: bool,
    seen_x1_strings: Vec<String>,
    data_category: u8,
    data_subcategory: u8,
}

impl Context {
    fn new(data_category: u8, data_subcategory: u8) -> Self {
        Context {
            lat: f64::NAN,
            lon: f64::NAN,
            height: f64::NAN,
            sensor_level: 0,
            sensor_level_active: 0,
            wigos_id: Wsi::default(),
            platform_checked: false,
            platform_accepted: false,
            platform_name: None,
            meas_datetime: NaiveDate::from_ymd_opt(0, 1, 1).unwrap().and_time(NaiveTime::MIN),
            time_disp: 0,
            period_str: None,
            start_end_period: false,
            last_dt_id: None,
            last_dt_raw: None,
            pending_sum: false,
            seen_x1_strings: Vec::new(),
            data_category,
            data_subcategory,
        }
    }

    fn has_datetime(&self) -> bool {
        self.meas_datetime.year() > 0
    }
}

/// Excluded from triggering the platform-check gate: descriptors that
/// themselves govern platform/time/sensor identity rather than an
/// observation.
fn excluded_from_platform_gate(d: &Descriptor) -> bool {
    let (x, y) = (d.id.x, d.id.y);
    matches!((x, y), (10, 55) | (10, 56) | (10, 67) | (22, 55) | (22, 56) | (22, 67)) || x == 25 || x == 31 || x == 35
}

/// Synthesizes a shadow WIGOS local id when a subset has no real station
/// identifier: either the underscore-joined, 16-char-capped concatenation of
/// the X=1 descriptor strings seen so far, or — if none were seen — a
/// lat/lon-encoded string truncated to 7 characters per component, per §4.6.
fn synthesize_shadow_local_id(ctx: &Context) -> String {
    if !ctx.seen_x1_strings.is_empty() {
        let joined = ctx.seen_x1_strings.join("_");
        let capped: String = joined.chars().take(16).collect();
        capped.trim_end_matches('_').to_string()
    } else {
        let lat_sign = if ctx.lat >= 0.0 { 'N' } else { 'S' };
        let lon_sign = if ctx.lon >= 0.0 { 'E' } else { 'W' };
        let lat_str: String = format!("{:.4}", ctx.lat.abs()).chars().take(7).collect();
        let lon_str: String = format!("{:.4}", ctx.lon.abs()).chars().take(7).collect();
        format!("{lat_sign}{lat_str}{lon_sign}{lon_str}")
    }
}

fn apply_char_replacements(s: &str, replacements: &[(char, char)]) -> String {
    let mut out = s.to_string();
    for (from, to) in replacements {
        out = out.replace(*from, &to.to_string());
    }
    out
}

/// Runs the platform-check gate the first time it's triggered in a subset.
/// Returns `false` if the subset should be skipped (missing or out-of-window
/// datetime, or no resolvable geolocation).
fn run_platform_check(ctx: &mut Context, oscar: &Oscar, time_window: &TimeWindowConfig, config: &ProjectorConfig, log: &mut LogBuffer) -> bool {
    ctx.platform_checked = true;
    if !ctx.has_datetime() {
        log.add(chrono::Utc::now(), LogLevel::Warn, "projector", None, "Missing datetime; skipping subset");
        return false;
    }
    if !time_window.accepts(ctx.meas_datetime) {
        log.add(chrono::Utc::now(), LogLevel::Warn, "projector", None, "Datetime out of acceptance window; skipping subset");
        return false;
    }
    if let Some(station) = oscar.find(&ctx.wigos_id) {
        if station.wigos_id != ctx.wigos_id {
            ctx.wigos_id = station.wigos_id.clone();
        }
        if !station.name.is_empty() {
            ctx.platform_name = Some(station.name.clone());
        }
        if ctx.lat.is_nan() {
            if let Some(lat) = station.latitude {
                ctx.lat = lat;
            }
        }
        if ctx.lon.is_nan() {
            if let Some(lon) = station.longitude {
                ctx.lon = lon;
            }
        }
    }
    if ctx.lat.is_nan() || ctx.lon.is_nan() {
        log.add(chrono::Utc::now(), LogLevel::Warn, "projector", None, "Missing geolocation; skipping subset");
        return false;
    }
    if ctx.wigos_id.is_empty() {
        let local_id = synthesize_shadow_local_id(ctx);
        if let Ok(mut synthesized) = Wsi::parse(&format!("{}{}", config.default_shadow_wigos, local_id)) {
            std::mem::swap(&mut ctx.wigos_id, &mut synthesized);
        }
    }
    ctx.platform_accepted = true;
    true
}

fn handle_platform(ctx: &mut Context, d: &Descriptor, bits: &norbufr_core::BitBuffer, table_c: &TableC, log: &mut LogBuffer) {
    match d.id.y {
        1 | 2 => {
            let s = extract_string(d, bits);
            if s != "MISSING" {
                ctx.seen_x1_strings.push(s);
            }
        }
        15 | 18 | 19 => {
            let s = extract_string(d, bits);
            if s != "MISSING" {
                ctx.platform_name = Some(s);
            }
        }
        101 => {
            if let Value::Integer(code) = norbufr_core::value_extractor::extract_int(d, bits) {
                if code == norbufr_core::value_extractor::MISSING_INT {
                    return;
                }
                match country_codes::bufr_state_to_iso_numeric(code as u32) {
                    Some(iso) => ctx.wigos_id.issuer = iso,
                    None => {
                        ctx.wigos_id.issuer = 0;
                        log.add(chrono::Utc::now(), LogLevel::Warn, "projector", None, format!("unknown BUFR state identifier {code}"));
                    }
                }
            }
        }
        102 => {
            let s = extract_string(d, bits);
            if s != "MISSING" {
                ctx.wigos_id.local_id = s;
            }
        }
        125 => {
            if let Value::Integer(v) = norbufr_core::value_extractor::extract_int(d, bits) {
                ctx.wigos_id.series = v as i32;
            }
        }
        126 => {
            if let Value::Integer(v) = norbufr_core::value_extractor::extract_int(d, bits) {
                ctx.wigos_id.issuer = v as u16;
            }
        }
        127 => {
            if let Value::Integer(v) = norbufr_core::value_extractor::extract_int(d, bits) {
                ctx.wigos_id.issue_num = v as u16;
            }
        }
        128 => {
            let s = extract_string(d, bits);
            if s != "MISSING" {
                ctx.wigos_id.local_id = s;
            }
        }
        _ => {
            let _ = extract_coded(d, bits, table_c);
        }
    }
}

/// Sets year/month/day/hour/min/sec directly, or — for the time-period and
/// displacement descriptors (`0-04-021`..`86`) — folds a signed duration
/// into `ctx.time_disp` and renders `ctx.period_str`, per the sign and
/// start/end-pairing rules the source's datetime branch implements.
fn handle_datetime(ctx: &mut Context, d: &Descriptor, bits: &norbufr_core::BitBuffer, log: &mut LogBuffer) {
    let Value::Integer(v) = norbufr_core::value_extractor::extract_int(d, bits) else { return };
    if v == norbufr_core::value_extractor::MISSING_INT {
        return;
    }
    let (x, y) = (d.id.x, d.id.y);
    let mut date = ctx.meas_datetime.date();
    let mut time = ctx.meas_datetime.time();

    if y == 86 {
        ctx.time_disp += v;
        ctx.period_str = Some(format!("PT{v}S"));
        ctx.last_dt_id = Some((x, y));
        ctx.last_dt_raw = Some(v);
        return;
    }

    let period_tags: Option<(&str, &str)> = match y {
        21 => Some(("P", "YT")),
        22 => Some(("P", "MT")),
        73 | 23 => Some(("P", "DT")),
        74 | 24 => Some(("PT", "H")),
        75 | 25 => Some(("PT", "M")),
        16 | 26 => Some(("PT", "S")),
        1 => {
            date = NaiveDate::from_ymd_opt(v as i32, date.month(), date.day()).unwrap_or(date);
            None
        }
        2 => {
            date = NaiveDate::from_ymd_opt(date.year(), v as u32, date.day()).unwrap_or(date);
            None
        }
        3 => {
            date = NaiveDate::from_ymd_opt(date.year(), date.month(), v as u32).unwrap_or(date);
            None
        }
        4 => {
            time = NaiveTime::from_hms_opt(v as u32, time.minute(), time.second()).unwrap_or(time);
            None
        }
        5 => {
            time = NaiveTime::from_hms_opt(time.hour(), v as u32, time.second()).unwrap_or(time);
            None
        }
        6 => {
            time = NaiveTime::from_hms_opt(time.hour(), time.minute(), v as u32).unwrap_or(time);
            None
        }
        _ => None,
    };

    if let Some((period_beg, period_end)) = period_tags {
        if (y == 75 || y == 25) && ctx.last_dt_id == Some((x, y)) {
            ctx.start_end_period = true;
        }
        let subcat_exempt = ctx.data_category == 2 && (4..=7).contains(&ctx.data_subcategory);
        if !subcat_exempt {
            let mut time_period = v;
            let special = (ctx.data_category == 2 && ctx.data_subcategory == 1) || ctx.start_end_period;
            if special {
                if !ctx.start_end_period {
                    time_period = -time_period;
                }
                if period_beg == "PT" {
                    let add = match period_end {
                        "S" => time_period,
                        "M" => time_period * 60,
                        "H" => time_period * 3600,
                        _ => 0,
                    };
                    ctx.time_disp += add;
                }
                if ctx.start_end_period {
                    if let Some(prev) = ctx.last_dt_raw {
                        time_period = -(time_period - prev);
                    }
                    ctx.start_end_period = false;
                }
            } else if time_period > 0 {
                time_period = -time_period;
                log.add(chrono::Utc::now(), LogLevel::Warn, "projector", None, format!("positive BUFR time period at {x:02}{y:03}"));
            }
            ctx.period_str = Some(format!("{period_beg}{}{period_end}", -time_period));
        }
    }

    ctx.last_dt_id = Some((x, y));
    ctx.last_dt_raw = Some(v);
    ctx.meas_datetime = NaiveDateTime::new(date, time);
}

fn handle_lat(ctx: &mut Context, d: &Descriptor, bits: &norbufr_core::BitBuffer) {
    let Value::Real(v) = extract_real(d, bits) else { return };
    match d.id.y {
        1 | 2 => ctx.lat = v,
        12 | 15 | 16 => {
            if !ctx.lat.is_nan() {
                ctx.lat += v;
            }
        }
        _ => {}
    }
}

fn handle_lon(ctx: &mut Context, d: &Descriptor, bits: &norbufr_core::BitBuffer) {
    let Value::Real(v) = extract_real(d, bits) else { return };
    match d.id.y {
        1 | 2 => ctx.lon = v,
        12 | 15 | 16 => {
            if !ctx.lon.is_nan() {
                ctx.lon += v;
            }
        }
        _ => {}
    }
}

fn handle_height(ctx: &mut Context, d: &Descriptor, bits: &norbufr_core::BitBuffer) {
    let Value::Real(v) = extract_real(d, bits) else { return };
    match d.id.y {
        1 | 2 | 7 | 30 => ctx.height = v,
        10 => ctx.height = v, // flight level: raw numeric, no unit conversion (open question)
        62 => ctx.height = -v,
        31 | 32 | 33 => {
            ctx.sensor_level = v as i64;
            if ctx.data_category <= 1 {
                ctx.sensor_level_active = 2;
            }
        }
        _ => {}
    }
}

/// One emitted observation, before final JSON assembly.
struct Emission {
    standard_name: String,
    unit: String,
    value: String,
    code: Option<i64>,
    sensor_level: i64,
    function: &'static str,
}

fn build_emission(descriptor_id: norbufr_core::DescriptorId, value: Value, sensor_level: i64, function: &'static str) -> Option<Emission> {
    let cf = cf_names::lookup(descriptor_id)?;
    let (value_str, code) = match value {
        Value::Real(v) => (format!("{v}"), None),
        Value::Integer(v) if v != norbufr_core::value_extractor::MISSING_INT => (v.to_string(), Some(v)),
        Value::Text(s) => (s, None),
        _ => return None,
    };
    Some(Emission {
        standard_name: cf.standard_name.to_string(),
        unit: cf.unit.to_string(),
        value: value_str,
        code,
        sensor_level,
        function,
    })
}

fn assemble_message(ctx: &Context, emission: &Emission, config: &ProjectorConfig) -> JsonValue {
    let mut msg = config.template.clone();
    let rendered_time = ctx.meas_datetime + chrono::Duration::seconds(ctx.time_disp);
    let datetime_str = rendered_time.and_utc().to_rfc3339_opts(chrono::SecondsFormat::Secs, true).replace('Z', "+00:00");

    if let Some(props) = msg.get_mut("properties").and_then(|p| p.as_object_mut()) {
        props.insert("datetime".to_string(), JsonValue::String(datetime_str));
        if let Some(period) = &ctx.period_str {
            props.insert("period".to_string(), JsonValue::String(period.clone()));
        }
        props.insert("platform".to_string(), JsonValue::String(ctx.wigos_id.to_string()));
        if let Some(name) = &ctx.platform_name {
            props.insert("platform_name".to_string(), JsonValue::String(apply_char_replacements(name, &config.char_replacements)));
        }
        let mut content = JsonObject::new();
        content.insert("encoding".to_string(), JsonValue::String("utf-8".to_string()));
        content.insert("standard_name".to_string(), JsonValue::String(emission.standard_name.clone()));
        content.insert("unit".to_string(), JsonValue::String(emission.unit.clone()));
        content.insert("size".to_string(), JsonValue::Number(emission.value.len().into()));
        content.insert("value".to_string(), JsonValue::String(emission.value.clone()));
        content.insert("function".to_string(), JsonValue::String(emission.function.to_string()));
        content.insert("sensor_level".to_string(), JsonValue::Number(emission.sensor_level.into()));
        if emission.unit == "CODE TABLE" || emission.unit == "FLAG TABLE" {
            if let Some(code) = emission.code {
                content.insert("code".to_string(), JsonValue::Number(code.into()));
            }
        }
        props.insert("content".to_string(), JsonValue::Object(content));
    }
    if let Some(geometry) = msg.get_mut("geometry") {
        *geometry = serde_json::json!({
            "type": "Point",
            "coordinates": { "lat": ctx.lat, "lon": ctx.lon, "hei": ctx.height },
        });
    }
    msg
}

/// Walks one subset's expanded descriptors and emits zero or more
/// observation JSON strings, per §4.6.
#[allow(clippy::too_many_arguments)]
fn project_subset(
    descriptors: &[Descriptor],
    bits: &norbufr_core::BitBuffer,
    table_c: &TableC,
    data_category: u8,
    data_subcategory: u8,
    oscar: &Oscar,
    time_window: &TimeWindowConfig,
    config: &ProjectorConfig,
    log: &mut LogBuffer,
) -> Vec<String> {
    let mut ctx = Context::new(data_category, data_subcategory);
    let mut out: Vec<String> = Vec::new();

    for d in descriptors {
        if d.id.is_sequence() && matches!((d.id.x, d.id.y), (2, 34) | (2, 40) | (2, 45)) {
            ctx.pending_sum = true;
        }
        if !d.id.is_element() {
            continue;
        }
        if ctx.sensor_level_active > 0 {
            ctx.sensor_level_active -= 1;
        } else {
            ctx.sensor_level = 0;
        }

        let string_form = extract_string(d, bits);
        if string_form == "MISSING" {
            continue;
        }

        if !ctx.platform_checked && d.id.x >= 10 && !excluded_from_platform_gate(d) {
            if !run_platform_check(&mut ctx, oscar, time_window, config, log) {
                return out;
            }
        }

        let emission = match d.id.x {
            1 => {
                handle_platform(&mut ctx, d, bits, table_c, log);
                None
            }
            4 => {
                handle_datetime(&mut ctx, d, bits, log);
                None
            }
            5 => {
                handle_lat(&mut ctx, d, bits);
                None
            }
            6 => {
                handle_lon(&mut ctx, d, bits);
                None
            }
            7 => {
                handle_height(&mut ctx, d, bits);
                None
            }
            10 => match d.id.y {
                4 | 51 => build_emission(d.id, extract_real(d, bits), 0, "point"),
                9 => {
                    if let Value::Real(v) = extract_real(d, bits) {
                        ctx.height = v;
                    }
                    None
                }
                _ => None,
            },
            11 => match d.id.y {
                1 | 2 => build_emission(d.id, extract_real(d, bits), if ctx.sensor_level != 0 { ctx.sensor_level } else { 10 }, "point"),
                _ => None,
            },
            12 => match d.id.y {
                1 | 3 | 101 | 103 => build_emission(d.id, extract_real(d, bits), if ctx.sensor_level != 0 { ctx.sensor_level } else { 2 }, "point"),
                _ => None,
            },
            13 => match d.id.y {
                3 => build_emission(d.id, extract_real(d, bits), if ctx.sensor_level != 0 { ctx.sensor_level } else { 10 }, "point"),
                _ => None,
            },
            22 => match d.id.y {
                42 | 43 | 45 => build_emission(d.id, extract_real(d, bits), 0, "point"),
                _ => None,
            },
            _ => None,
        };

        if !ctx.platform_accepted {
            continue;
        }

        if let Some(mut emission) = emission {
            if ctx.pending_sum {
                emission.function = "sum";
                ctx.pending_sum = false;
            }
            let rendered = assemble_message(&ctx, &emission, config);
            let pretty = serde_json::to_string_pretty(&rendered).unwrap_or_default();
            if d.id.x == 10 {
                // Duplicate suppression: pressure emissions are compared
                // textually against everything already emitted this
                // subset. O(n) scan, preserved verbatim per the grounding
                // ledger's documented open question.
                if out.contains(&pretty) {
                    log.add(chrono::Utc::now(), LogLevel::Warn, "projector", None, "duplicate pressure emission suppressed");
                    continue;
                }
            }
            out.push(pretty);
        }
    }
    out
}

/// Projects every subset of a decoded message into its observation JSON
/// strings, in descriptor-walk order.
pub fn project_message(decoded: &DecodedMessage, table_c: &TableC, oscar: &Oscar, time_window: &TimeWindowConfig, config: &ProjectorConfig, log: &mut LogBuffer) -> Vec<String> {
    let bits = decoded.value_bits();
    let mut out = Vec::new();
    for subset in &decoded.expanded_per_subset {
        let emitted = project_subset(
            subset,
            bits,
            table_c,
            decoded.section1.data_category,
            decoded.section1.intl_data_subcategory,
            oscar,
            time_window,
            config,
            log,
        );
        out.extend(emitted);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use norbufr_core::descriptor::{DescriptorId, DescriptorMeta};
    use norbufr_core::BitBuffer;

    fn descriptor(f: u8, x: u8, y: u8, start_bit: usize, scale: i32, reference: i64, width: u32, name: &str, unit: &str) -> Descriptor {
        Descriptor::new(DescriptorId::new(f, x, y), start_bit, Rc::new(DescriptorMeta::new(name, unit, scale, reference, width)))
    }

    #[test]
    fn shadow_wigos_uses_lat_lon_when_no_platform_strings() {
        let mut ctx = Context::new(0, 0);
        ctx.lat = -34.5;
        ctx.lon = 138.6;
        let local = synthesize_shadow_local_id(&ctx);
        assert!(local.starts_with("S34.500"));
        assert!(local.contains('E'));
    }

    #[test]
    fn minimal_synop_emits_one_temperature_observation() {
        // Layout: block(0-01-001)=12 @16b, station(0-01-002)=345 @16b,
        // year..sec (0-04-001..006), lat(0-05-001)=59.933, lon(0-06-001)=10.720,
        // height(0-07-030)=94, temperature(0-12-101)=283.15K.
        let mut bits = BitBuffer::new();
        let push = |bits: &mut BitBuffer, v: u64, w: usize| bits.push_bits(&BitBuffer::value_to_bits(v, w));
        push(&mut bits, 12, 16);
        push(&mut bits, 345, 16);
        push(&mut bits, 2024, 16);
        push(&mut bits, 6, 8);
        push(&mut bits, 1, 8);
        push(&mut bits, 0, 8);
        push(&mut bits, 0, 8);
        push(&mut bits, 0, 8);
        push(&mut bits, 599330, 25); // 59.933 * 10^4, scale 4 handled via descriptor meta below
        push(&mut bits, 1072000, 26);
        push(&mut bits, 94, 17);
        push(&mut bits, 28315, 16);

        let mut pos = 0usize;
        let mut start = |w: usize| {
            let s = pos;
            pos += w;
            s
        };

        let descriptors = vec![
            descriptor(0, 1, 1, start(16), 0, 0, 16, "WMO BLOCK NUMBER", ""),
            descriptor(0, 1, 2, start(16), 0, 0, 16, "WMO STATION NUMBER", ""),
            descriptor(0, 4, 1, start(16), 0, 0, 16, "YEAR", ""),
            descriptor(0, 4, 2, start(8), 0, 0, 8, "MONTH", ""),
            descriptor(0, 4, 3, start(8), 0, 0, 8, "DAY", ""),
            descriptor(0, 4, 4, start(8), 0, 0, 8, "HOUR", ""),
            descriptor(0, 4, 5, start(8), 0, 0, 8, "MINUTE", ""),
            descriptor(0, 4, 6, start(8), 0, 0, 8, "SECOND", ""),
            descriptor(0, 5, 1, start(25), 4, 0, 25, "LATITUDE", "deg"),
            descriptor(0, 6, 1, start(26), 4, 0, 26, "LONGITUDE", "deg"),
            descriptor(0, 7, 30, start(17), 0, 0, 17, "HEIGHT", "m"),
            descriptor(0, 12, 101, start(16), 2, 0, 16, "TEMPERATURE", "K"),
        ];

        let table_c = TableC::new();
        let oscar = Oscar::default();
        let time_window = TimeWindowConfig::default();
        let config = ProjectorConfig::default();
        let mut log = LogBuffer::new(100, LogLevel::Trace);

        let emitted = project_subset(&descriptors, &bits, &table_c, 0, 0, &oscar, &time_window, &config, &mut log);
        assert_eq!(emitted.len(), 1);
        assert!(emitted[0].contains("\"air_temperature\""));
        assert!(emitted[0].contains("283.15"));
    }
}
