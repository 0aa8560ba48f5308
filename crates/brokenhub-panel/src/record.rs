//! The impairment configuration record and its recognized fields.

use serde_json::{Map, Value};

/// Flat key-value document as stored in the daemon's config file.
///
/// Values stay untyped JSON so numbers loaded from disk round-trip
/// unchanged. Keys keep their on-disk order.
pub type Record = Map<String, Value>;

/// The fields the update path accepts from a form submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    DropPercent,
    CorruptPacketPercent,
    CorruptPacketBytes,
    TruncateLen,
    Bandwidth,
}

impl Field {
    /// Every recognized field, in display order.
    pub const ALL: [Field; 5] = [
        Field::DropPercent,
        Field::CorruptPacketPercent,
        Field::CorruptPacketBytes,
        Field::TruncateLen,
        Field::Bandwidth,
    ];

    /// Key used in the config file and in form submissions.
    pub fn name(self) -> &'static str {
        match self {
            Field::DropPercent => "drop_percent",
            Field::CorruptPacketPercent => "corrupt_packet_percent",
            Field::CorruptPacketBytes => "corrupt_packet_bytes",
            Field::TruncateLen => "truncate_len",
            Field::Bandwidth => "bandwidth",
        }
    }

    /// Human-readable label for the form.
    pub fn label(self) -> &'static str {
        match self {
            Field::DropPercent => "Drop (%)",
            Field::CorruptPacketPercent => "Corrupt packets (%)",
            Field::CorruptPacketBytes => "Corrupt bytes per packet",
            Field::TruncateLen => "Truncate length (bytes, 0 = off)",
            Field::Bandwidth => "Bandwidth (KiB/s, 0 = unlimited)",
        }
    }

    pub fn from_name(name: &str) -> Option<Field> {
        Field::ALL.into_iter().find(|field| field.name() == name)
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Render a stored value the way it should appear in a text input.
///
/// Strings are shown without quotes; anything else uses its JSON form.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
