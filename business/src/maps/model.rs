//! Map-version rows as returned by `/management/maps`.
//!
//! The listing endpoint is loosely typed: ids and sizes arrive either as
//! strings or as numbers, timestamps as RFC 3339 strings, plain
//! `YYYY-MM-DD HH:MM:SS` strings or epoch milliseconds. Everything is
//! normalized here so the rest of the crate works with one shape.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Release state of a map version (`mapStatus` on the wire).
///
/// Rows decode it leniently: numeric strings are accepted and unknown codes
/// leave the status unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(into = "u8")]
pub enum MapStatus {
    Online,
    GrayRelease,
    Offline,
}

impl MapStatus {
    pub const ALL: [Self; 3] = [Self::Online, Self::GrayRelease, Self::Offline];

    pub fn code(self) -> u8 {
        match self {
            Self::Online => 0,
            Self::GrayRelease => 1,
            Self::Offline => 2,
        }
    }

    /// Label shown in the status column.
    pub fn label(self) -> &'static str {
        match self {
            Self::Online => "已上线",
            Self::GrayRelease => "灰度发布中",
            Self::Offline => "已下线",
        }
    }
}

impl TryFrom<u8> for MapStatus {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Online),
            1 => Ok(Self::GrayRelease),
            2 => Ok(Self::Offline),
            other => Err(format!("unknown mapStatus {other}")),
        }
    }
}

impl From<MapStatus> for u8 {
    fn from(status: MapStatus) -> Self {
        status.code()
    }
}

/// Every column of a map-version row, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    MapVersionId,
    MapFilePath,
    MapFileName,
    MapFileSize,
    ManifestFilePath,
    ManifestFileName,
    ManifestFileSize,
    CreatedAt,
    UpdatedAt,
    MapStatus,
}

impl Field {
    pub const ALL: [Self; 10] = [
        Self::MapVersionId,
        Self::MapFilePath,
        Self::MapFileName,
        Self::MapFileSize,
        Self::ManifestFilePath,
        Self::ManifestFileName,
        Self::ManifestFileSize,
        Self::CreatedAt,
        Self::UpdatedAt,
        Self::MapStatus,
    ];

    /// Plain string fields, the ones inline editing can change.
    pub const TEXT: [Self; 7] = [
        Self::MapVersionId,
        Self::MapFilePath,
        Self::MapFileName,
        Self::MapFileSize,
        Self::ManifestFilePath,
        Self::ManifestFileName,
        Self::ManifestFileSize,
    ];

    pub fn wire_name(self) -> &'static str {
        match self {
            Self::MapVersionId => "mapVersionId",
            Self::MapFilePath => "mapFilePath",
            Self::MapFileName => "mapFileName",
            Self::MapFileSize => "mapFileSize",
            Self::ManifestFilePath => "manifestFilePath",
            Self::ManifestFileName => "manifestFileName",
            Self::ManifestFileSize => "manifestFileSize",
            Self::CreatedAt => "createdAt",
            Self::UpdatedAt => "updatedAt",
            Self::MapStatus => "mapStatus",
        }
    }

    pub fn is_text(self) -> bool {
        Self::TEXT.contains(&self)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// One map-version record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapVersion {
    #[serde(default, deserialize_with = "de::string_or_number")]
    pub map_version_id: String,
    #[serde(default, deserialize_with = "de::opt_string_or_number")]
    pub map_file_path: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string_or_number")]
    pub map_file_name: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string_or_number")]
    pub map_file_size: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string_or_number")]
    pub manifest_file_path: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string_or_number")]
    pub manifest_file_name: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string_or_number")]
    pub manifest_file_size: Option<String>,
    #[serde(default, deserialize_with = "de::opt_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "de::opt_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "de::opt_status")]
    pub map_status: Option<MapStatus>,
}

impl MapVersion {
    /// Empty row created by add-row, identified only by `key`.
    pub fn placeholder(key: impl Into<String>) -> Self {
        Self {
            map_version_id: key.into(),
            ..Self::default()
        }
    }

    /// Current value of a text field. `None` for unset and non-text fields.
    pub fn text(&self, field: Field) -> Option<&str> {
        match field {
            Field::MapVersionId => Some(self.map_version_id.as_str()),
            Field::MapFilePath => self.map_file_path.as_deref(),
            Field::MapFileName => self.map_file_name.as_deref(),
            Field::MapFileSize => self.map_file_size.as_deref(),
            Field::ManifestFilePath => self.manifest_file_path.as_deref(),
            Field::ManifestFileName => self.manifest_file_name.as_deref(),
            Field::ManifestFileSize => self.manifest_file_size.as_deref(),
            Field::CreatedAt | Field::UpdatedAt | Field::MapStatus => None,
        }
    }

    /// Overwrite a text field. Empty values clear optional fields.
    ///
    /// Returns `false` for non-text fields, which are left untouched.
    pub fn set_text(&mut self, field: Field, value: String) -> bool {
        let slot = match field {
            Field::MapVersionId => {
                self.map_version_id = value;
                return true;
            }
            Field::MapFilePath => &mut self.map_file_path,
            Field::MapFileName => &mut self.map_file_name,
            Field::MapFileSize => &mut self.map_file_size,
            Field::ManifestFilePath => &mut self.manifest_file_path,
            Field::ManifestFileName => &mut self.manifest_file_name,
            Field::ManifestFileSize => &mut self.manifest_file_size,
            Field::CreatedAt | Field::UpdatedAt | Field::MapStatus => return false,
        };
        *slot = (!value.is_empty()).then_some(value);
        true
    }

    /// Apply the fields present in `patch`; everything else stays as is.
    pub fn merge(&mut self, patch: &RowPatch) {
        for (field, value) in patch.iter() {
            self.set_text(field, value.to_owned());
        }
    }
}

/// A partial set of text-field values.
///
/// Used both as the draft of a row under edit and as the change set applied
/// on commit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowPatch {
    values: BTreeMap<Field, String>,
}

impl RowPatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draft holding every text field of `row`.
    pub fn seeded_from(row: &MapVersion) -> Self {
        let values = Field::TEXT
            .iter()
            .map(|&field| (field, row.text(field).unwrap_or_default().to_owned()))
            .collect();
        Self { values }
    }

    pub fn with(mut self, field: Field, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    /// Non-text fields are ignored.
    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        if field.is_text() {
            self.values.insert(field, value.into());
        }
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.values.get(&field).map(String::as_str)
    }

    pub fn get_mut(&mut self, field: Field) -> Option<&mut String> {
        self.values.get_mut(&field)
    }

    /// Copy every value of `other` over `self`.
    pub fn overlay(&mut self, other: &Self) {
        for (field, value) in other.iter() {
            self.values.insert(field, value.to_owned());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.values.iter().map(|(field, value)| (*field, value.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Parse the timestamp formats the listing endpoint is known to emit.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
}

mod de {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer};

    use super::MapStatus;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Int(i64),
        Float(f64),
        Text(String),
    }

    impl Scalar {
        fn into_string(self) -> String {
            match self {
                Self::Int(value) => value.to_string(),
                Self::Float(value) => value.to_string(),
                Self::Text(value) => value,
            }
        }
    }

    pub(super) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<Scalar>::deserialize(deserializer)?
            .map(Scalar::into_string)
            .unwrap_or_default())
    }

    pub(super) fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<Scalar>::deserialize(deserializer)?.map(Scalar::into_string))
    }

    pub(super) fn opt_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let parsed = match Option::<Scalar>::deserialize(deserializer)? {
            None => None,
            Some(Scalar::Int(millis)) => DateTime::from_timestamp_millis(millis),
            Some(Scalar::Float(millis)) => DateTime::from_timestamp_millis(millis as i64),
            Some(Scalar::Text(text)) => {
                let parsed = super::parse_timestamp(&text);
                if parsed.is_none() {
                    log::warn!("ignoring unparseable timestamp {text:?}");
                }
                parsed
            }
        };
        Ok(parsed)
    }

    pub(super) fn opt_status<'de, D>(deserializer: D) -> Result<Option<MapStatus>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let Some(raw) = Option::<Scalar>::deserialize(deserializer)? else {
            return Ok(None);
        };
        let code = match &raw {
            Scalar::Int(code) => u8::try_from(*code).ok(),
            Scalar::Float(code) if code.fract() == 0.0 => u8::try_from(*code as i64).ok(),
            Scalar::Float(_) => None,
            Scalar::Text(text) => text.trim().parse::<u8>().ok(),
        };
        let status = code.and_then(|code| MapStatus::try_from(code).ok());
        if status.is_none() {
            log::warn!("ignoring unknown mapStatus {:?}", raw.into_string());
        }
        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn decodes_mixed_scalar_types() {
        let row: MapVersion = serde_json::from_value(serde_json::json!({
            "mapVersionId": 20200312,
            "mapFileName": "a.map",
            "mapFileSize": 1024,
            "manifestFileSize": "2048",
            "createdAt": "2020-03-12 08:30:00",
            "updatedAt": 1584002400000_i64,
            "mapStatus": 1
        }))
        .unwrap();

        assert_eq!(row.map_version_id, "20200312");
        assert_eq!(row.map_file_name.as_deref(), Some("a.map"));
        assert_eq!(row.map_file_size.as_deref(), Some("1024"));
        assert_eq!(row.manifest_file_size.as_deref(), Some("2048"));
        assert_eq!(
            row.created_at,
            Some(Utc.with_ymd_and_hms(2020, 3, 12, 8, 30, 0).unwrap())
        );
        assert_eq!(
            row.updated_at,
            Some(Utc.with_ymd_and_hms(2020, 3, 12, 8, 40, 0).unwrap())
        );
        assert_eq!(row.map_status, Some(MapStatus::GrayRelease));
        assert_eq!(row.map_file_path, None);
    }

    #[test]
    fn null_and_missing_fields_are_empty() {
        let row: MapVersion = serde_json::from_value(serde_json::json!({
            "mapVersionId": null,
            "mapFilePath": null,
            "createdAt": "not a date"
        }))
        .unwrap();

        assert_eq!(row, MapVersion::default());
    }

    #[test]
    fn unknown_status_leaves_row_without_status() {
        let rows: Vec<MapVersion> = serde_json::from_value(serde_json::json!([
            { "mapVersionId": "v1", "mapStatus": 0 },
            { "mapVersionId": "v2", "mapStatus": 3 },
            { "mapVersionId": "v3", "mapStatus": "2" },
            { "mapVersionId": "v4", "mapStatus": "gray" },
            { "mapVersionId": "v5", "mapStatus": -1 }
        ]))
        .unwrap();

        let statuses: Vec<_> = rows.iter().map(|row| row.map_status).collect();
        assert_eq!(
            statuses,
            [Some(MapStatus::Online), None, Some(MapStatus::Offline), None, None]
        );
    }

    #[test]
    fn status_labels() {
        assert_eq!(MapStatus::Online.label(), "已上线");
        assert_eq!(MapStatus::GrayRelease.label(), "灰度发布中");
        assert_eq!(MapStatus::Offline.label(), "已下线");
        assert_eq!(u8::from(MapStatus::Offline), 2);
    }

    #[test]
    fn merge_touches_only_patched_fields() {
        let mut row = MapVersion {
            map_version_id: "v1".to_owned(),
            map_file_path: Some("/maps".to_owned()),
            map_file_name: Some("a.map".to_owned()),
            map_status: Some(MapStatus::Online),
            ..MapVersion::default()
        };

        row.merge(&RowPatch::new().with(Field::MapFileName, "b.map"));

        assert_eq!(row.map_file_name.as_deref(), Some("b.map"));
        assert_eq!(row.map_file_path.as_deref(), Some("/maps"));
        assert_eq!(row.map_status, Some(MapStatus::Online));
    }

    #[test]
    fn empty_value_clears_optional_field() {
        let mut row = MapVersion {
            map_file_size: Some("10".to_owned()),
            ..MapVersion::placeholder("v1")
        };

        row.merge(&RowPatch::new().with(Field::MapFileSize, ""));

        assert_eq!(row.map_file_size, None);
    }

    #[test]
    fn patch_ignores_non_text_fields() {
        let patch = RowPatch::new()
            .with(Field::CreatedAt, "2020-01-01 00:00:00")
            .with(Field::MapStatus, "0");

        assert!(patch.is_empty());
    }

    #[test]
    fn seeded_draft_covers_every_text_field() {
        let row = MapVersion {
            map_file_name: Some("a.map".to_owned()),
            ..MapVersion::placeholder("v1")
        };

        let draft = RowPatch::seeded_from(&row);

        assert_eq!(draft.iter().count(), Field::TEXT.len());
        assert_eq!(draft.get(Field::MapVersionId), Some("v1"));
        assert_eq!(draft.get(Field::MapFileName), Some("a.map"));
        assert_eq!(draft.get(Field::MapFilePath), Some(""));
    }

    #[test]
    fn parses_rfc3339_with_offset() {
        assert_eq!(
            parse_timestamp("2020-03-12T16:30:00+08:00"),
            Some(Utc.with_ymd_and_hms(2020, 3, 12, 8, 30, 0).unwrap())
        );
        assert_eq!(parse_timestamp("yesterday"), None);
    }
}
