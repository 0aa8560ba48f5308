//! How the brokenhub daemon will interpret the stored record.
//!
//! The daemon refuses to start when any of the five fields is missing, reads
//! percentages as floats, byte counts as integers, and turns a bandwidth in
//! KiB/s into a per-byte delay in nanoseconds (0 = unlimited). Its JSON
//! reader only accepts JSON numbers: a string such as `"50"` (which is how
//! form submissions are stored) silently reads as 0. The panel never blocks a
//! save on this; it only shows the result next to the form.

use serde::Serialize;
use serde_json::Value;

use crate::record::{Field, Record};

/// Interpretation of one field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Reading<T> {
    Ok(T),
    Missing,
    /// Present but not a JSON number; the daemon falls back to 0.
    Defaulted { raw: String, effective: T },
}

impl<T> Reading<T> {
    pub fn problem(&self) -> Option<String> {
        match self {
            Reading::Ok(_) => None,
            Reading::Missing => Some("missing; the daemon will refuse to load".into()),
            Reading::Defaulted { raw, .. } => Some(format!(
                "{raw} is not a JSON number; the daemon reads it as 0"
            )),
        }
    }

    /// Value the daemon runs with, if it loads at all.
    pub fn effective(&self) -> Option<&T> {
        match self {
            Reading::Ok(v) | Reading::Defaulted { effective: v, .. } => Some(v),
            Reading::Missing => None,
        }
    }

    fn map<U>(self, f: impl FnOnce(T) -> U) -> Reading<U> {
        match self {
            Reading::Ok(v) => Reading::Ok(f(v)),
            Reading::Missing => Reading::Missing,
            Reading::Defaulted { raw, effective } => Reading::Defaulted {
                raw,
                effective: f(effective),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Bandwidth {
    Unlimited,
    Limited { kib_per_sec: f64, ns_per_byte: u64 },
}

impl Bandwidth {
    fn from_kib_per_sec(kib_per_sec: f64) -> Self {
        // Integer part zero disables shaping, same as the daemon.
        if kib_per_sec.trunc() == 0.0 {
            return Bandwidth::Unlimited;
        }
        let ns_per_byte = (1.0 / (kib_per_sec * 1024.0)) * 1_000_000_000.0;
        Bandwidth::Limited {
            kib_per_sec,
            ns_per_byte: ns_per_byte as u64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DaemonView {
    pub drop_percent: Reading<f64>,
    pub corrupt_packet_percent: Reading<f64>,
    pub corrupt_packet_bytes: Reading<i64>,
    pub truncate_len: Reading<i64>,
    pub bandwidth: Reading<Bandwidth>,
}

impl DaemonView {
    pub fn from_record(record: &Record) -> Self {
        Self {
            drop_percent: read_number(record, Field::DropPercent),
            corrupt_packet_percent: read_number(record, Field::CorruptPacketPercent),
            corrupt_packet_bytes: read_number(record, Field::CorruptPacketBytes)
                .map(|v| v as i64),
            truncate_len: read_number(record, Field::TruncateLen).map(|v| v as i64),
            bandwidth: read_number(record, Field::Bandwidth).map(Bandwidth::from_kib_per_sec),
        }
    }

    /// Fields the daemon will not use as written, with a description of each
    /// problem.
    pub fn problems(&self) -> Vec<(Field, String)> {
        [
            (Field::DropPercent, self.drop_percent.problem()),
            (
                Field::CorruptPacketPercent,
                self.corrupt_packet_percent.problem(),
            ),
            (Field::CorruptPacketBytes, self.corrupt_packet_bytes.problem()),
            (Field::TruncateLen, self.truncate_len.problem()),
            (Field::Bandwidth, self.bandwidth.problem()),
        ]
        .into_iter()
        .filter_map(|(field, problem)| problem.map(|p| (field, p)))
        .collect()
    }

    /// The daemon starts: every field is present, whatever its type.
    pub fn is_loadable(&self) -> bool {
        !matches!(self.drop_percent, Reading::Missing)
            && !matches!(self.corrupt_packet_percent, Reading::Missing)
            && !matches!(self.corrupt_packet_bytes, Reading::Missing)
            && !matches!(self.truncate_len, Reading::Missing)
            && !matches!(self.bandwidth, Reading::Missing)
    }

    /// Every field is present and read as written.
    pub fn is_exact(&self) -> bool {
        self.problems().is_empty()
    }
}

fn read_number(record: &Record, field: Field) -> Reading<f64> {
    match record.get(field.name()) {
        None => Reading::Missing,
        Some(Value::Number(n)) => match n.as_f64() {
            Some(v) => Reading::Ok(v),
            None => Reading::Defaulted {
                raw: n.to_string(),
                effective: 0.0,
            },
        },
        Some(other) => Reading::Defaulted {
            raw: other.to_string(),
            effective: 0.0,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn view(value: Value) -> DaemonView {
        match value {
            Value::Object(map) => DaemonView::from_record(&map),
            other => panic!("not an object: {other}"),
        }
    }

    #[test]
    fn complete_numeric_record_is_exact() {
        let v = view(json!({
            "drop_percent": 5,
            "corrupt_packet_percent": 0.5,
            "corrupt_packet_bytes": 4,
            "truncate_len": 0,
            "bandwidth": 0
        }));

        assert!(v.is_loadable());
        assert!(v.is_exact());
        assert_eq!(v.drop_percent, Reading::Ok(5.0));
        assert_eq!(v.corrupt_packet_percent, Reading::Ok(0.5));
        assert_eq!(v.corrupt_packet_bytes, Reading::Ok(4));
        assert_eq!(v.truncate_len, Reading::Ok(0));
        assert_eq!(v.bandwidth, Reading::Ok(Bandwidth::Unlimited));
    }

    #[test]
    fn submitted_strings_read_as_zero() {
        let v = view(json!({
            "drop_percent": "50",
            "corrupt_packet_percent": "1",
            "corrupt_packet_bytes": "4",
            "truncate_len": "64",
            "bandwidth": "1000"
        }));

        // The daemon starts, but with every value zeroed.
        assert!(v.is_loadable());
        assert!(!v.is_exact());
        assert_eq!(
            v.drop_percent,
            Reading::Defaulted {
                raw: "\"50\"".into(),
                effective: 0.0
            }
        );
        assert_eq!(v.truncate_len.effective(), Some(&0));
        assert_eq!(v.bandwidth.effective(), Some(&Bandwidth::Unlimited));

        let problems = v.problems();
        assert_eq!(problems.len(), 5);
        assert!(problems[0].1.contains("reads it as 0"), "{}", problems[0].1);
    }

    #[test]
    fn missing_and_non_numeric_fields_are_problems() {
        let v = view(json!({"drop_percent": true, "bandwidth": 1000}));

        let problems = v.problems();
        let fields: Vec<Field> = problems.iter().map(|(f, _)| *f).collect();
        assert_eq!(
            fields,
            [
                Field::DropPercent,
                Field::CorruptPacketPercent,
                Field::CorruptPacketBytes,
                Field::TruncateLen,
            ]
        );
        assert!(problems[0].1.contains("true"));
        assert!(problems[1].1.contains("missing"));
        assert!(!v.is_loadable());
        assert_eq!(v.corrupt_packet_percent.effective(), None);
    }

    #[test]
    fn bandwidth_becomes_nanoseconds_per_byte() {
        // 1 / (1000 * 1024) s = 976.5625 ns, truncated.
        let v = view(json!({"bandwidth": 1000}));
        assert_eq!(
            v.bandwidth,
            Reading::Ok(Bandwidth::Limited {
                kib_per_sec: 1000.0,
                ns_per_byte: 976
            })
        );

        let v = view(json!({"bandwidth": 1}));
        assert_eq!(
            v.bandwidth,
            Reading::Ok(Bandwidth::Limited {
                kib_per_sec: 1.0,
                ns_per_byte: 976_562
            })
        );
    }

    #[test]
    fn fractional_bandwidth_below_one_is_unlimited() {
        let v = view(json!({"bandwidth": 0.5}));
        assert_eq!(v.bandwidth, Reading::Ok(Bandwidth::Unlimited));
    }

    #[test]
    fn integer_fields_truncate() {
        let v = view(json!({"truncate_len": 64.9, "corrupt_packet_bytes": 2.2}));
        assert_eq!(v.truncate_len, Reading::Ok(64));
        assert_eq!(v.corrupt_packet_bytes, Reading::Ok(2));
    }

    #[test]
    fn serializes_with_status_tags() {
        let v = view(json!({"drop_percent": 1, "bandwidth": "2048"}));
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["drop_percent"], json!({"status": "ok", "value": 1.0}));
        assert_eq!(json["truncate_len"], json!({"status": "missing"}));
        assert_eq!(
            json["bandwidth"],
            json!({
                "status": "defaulted",
                "value": {"raw": "\"2048\"", "effective": {"mode": "unlimited"}}
            })
        );
    }
}
