use serde::Deserialize;
use serde::Serialize;

/// Category key used when a record carries no `categoria` field.
pub const UNDEFINED_CATEGORY: &str = "undefined";

/// One certificate entry as published in the data document.
///
/// Field names follow the document (`titulo`, `institucion`, ...). Every field
/// is lenient: a missing or `null` value deserializes to `None` or an empty
/// string so a single malformed entry never aborts the whole load.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct CertificateRecord {
    #[serde(rename = "titulo", default, deserialize_with = "string_or_empty")]
    pub title: String,
    #[serde(rename = "institucion", default, deserialize_with = "string_or_empty")]
    pub institution: String,
    #[serde(
        rename = "fecha",
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub date: Option<String>,
    #[serde(
        rename = "categoria",
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub category: Option<String>,
    #[serde(
        rename = "imagen",
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub image_url: Option<String>,
    #[serde(rename = "url", default, deserialize_with = "string_or_empty")]
    pub link_url: String,
}

impl CertificateRecord {
    /// Grouping key; absent categories share the `undefined` bucket.
    pub fn category_key(&self) -> &str {
        self.category.as_deref().unwrap_or(UNDEFINED_CATEGORY)
    }

    /// Image reference if one is set and not blank.
    pub fn image(&self) -> Option<&str> {
        self.image_url
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Raw date text if one is set and not blank.
    pub fn date_text(&self) -> Option<&str> {
        self.date.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

fn string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(lenient_string(deserializer)?.unwrap_or_default())
}
