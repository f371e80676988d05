//! Tag list codec.
//!
//! Payloads carry tags either as a JSON array of strings or as a single
//! comma-separated string. Storage is a comma-joined text column, null when
//! empty.

use serde::{Deserialize, Deserializer, Serialize};

/// An ordered tag list with a comma-separated storage encoding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Tags(pub Vec<String>);

impl Tags {
    /// Encodes for storage; empty lists map to null.
    pub fn to_column(&self) -> Option<String> {
        if self.0.is_empty() {
            None
        } else {
            Some(self.0.join(","))
        }
    }

    /// Decodes a stored column value.
    pub fn from_column(column: Option<&str>) -> Self {
        let tags = column
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        Self(tags)
    }
}

impl<'de> Deserialize<'de> for Tags {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            List(Vec<String>),
            Joined(String),
        }

        match Option::<Raw>::deserialize(deserializer)? {
            Some(Raw::List(tags)) => Ok(Self(tags)),
            Some(Raw::Joined(joined)) => Ok(Self::from_column(Some(&joined))),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let tags = Tags(vec!["vip".to_string(), "wholesale".to_string()]);
        let column = tags.to_column();
        assert_eq!(column.as_deref(), Some("vip,wholesale"));
        assert_eq!(Tags::from_column(column.as_deref()), tags);
    }

    #[test]
    fn test_empty_is_null() {
        assert_eq!(Tags::default().to_column(), None);
        assert_eq!(Tags::from_column(None), Tags::default());
    }

    #[test]
    fn test_deserialize_array_and_string() {
        let from_array: Tags = serde_json::from_str(r#"["a","b"]"#).unwrap();
        let from_string: Tags = serde_json::from_str(r#""a, b""#).unwrap();
        assert_eq!(from_array, Tags(vec!["a".to_string(), "b".to_string()]));
        assert_eq!(from_array, from_string);
    }
}
