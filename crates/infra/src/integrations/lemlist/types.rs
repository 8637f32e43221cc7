//! Lemlist list endpoint payloads

use mes_core::SourcePage;
use serde::Deserialize;
use serde_json::Value;

/// A list page: either a bare array or an envelope around one.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ListResponse {
    Records(Vec<Value>),
    Envelope {
        #[serde(alias = "items", alias = "results")]
        data: Vec<Value>,
    },
}

impl ListResponse {
    /// Object entries of the page; `received` counts every entry.
    pub fn into_page(self) -> SourcePage {
        let values = match self {
            Self::Records(values) | Self::Envelope { data: values } => values,
        };
        let received = values.len();
        let records = values
            .into_iter()
            .filter_map(|value| match value {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .collect();
        SourcePage { records, received }
    }
}
