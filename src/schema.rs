use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};

/// One row of the canonical region-list feed. Rows whose `id` equals
/// `level_1` are provinces; all other rows are children of the province
/// named by `province_name`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct RegionRecord {
    #[schemars(description = "Stable opaque identifier, unique across the list")]
    #[serde(deserialize_with = "opaque_id")]
    pub id: String,

    #[schemars(description = "Localized name of the province this row belongs to")]
    pub province_name: String,

    #[schemars(description = "Localized name of this region itself")]
    pub name_chi: String,

    #[schemars(description = "Administrative level (1 = province)")]
    pub level: u32,

    #[schemars(description = "Identifier of this row's top-level ancestor")]
    #[serde(deserialize_with = "opaque_id")]
    pub level_1: String,
}

/// One row of the aggregate timeseries feed. Country-level rows carry
/// `country: true` and no province; province-level rows carry the raw
/// English-style province name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct SummaryRow {
    pub date: NaiveDate,

    #[serde(default)]
    #[schemars(description = "Raw English-style province name, absent on country rows")]
    pub province: Option<String>,

    #[serde(default)]
    pub country: bool,

    pub cases: u64,
}

/// One row of a per-day detail feed, at city/county granularity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DetailRow {
    #[schemars(description = "Localized province name")]
    pub province_name: String,

    #[schemars(description = "Raw child-area name, possibly abbreviated or historical")]
    pub city_name: String,

    pub confirmed_count: u64,

    #[serde(default)]
    #[schemars(description = "Upstream modification timestamp, sortable as a string")]
    pub modify_time: String,
}

impl RegionRecord {
    pub fn schema_as_json() -> Result<String, serde_json::Error> {
        schema_as_json::<Self>()
    }
}

impl SummaryRow {
    pub fn schema_as_json() -> Result<String, serde_json::Error> {
        schema_as_json::<Self>()
    }
}

impl DetailRow {
    pub fn schema_as_json() -> Result<String, serde_json::Error> {
        schema_as_json::<Self>()
    }
}

fn schema_as_json<T: JsonSchema>() -> Result<String, serde_json::Error> {
    let schema = schemars::schema_for!(T);
    serde_json::to_string_pretty(&schema)
}

// Feeds are loosely typed: identifiers arrive as JSON strings or numbers
// depending on the publishing pipeline's mood.
fn opaque_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(i64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    })
}
