use serde::{Deserialize, Serialize};

/// Position of one page inside a larger result set, as reported in
/// `meta.pagination`. Absent or `null` fields decode to 0.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiResponseMetadataPagination {
    #[serde(deserialize_with = "null_as_default")]
    pub total_items: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub total_pages: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub current_page: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub per_page: u32,
}

impl ApiResponseMetadataPagination {
    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }
}

/// The `meta` object of an envelope.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiResponseMetadata {
    #[serde(deserialize_with = "null_as_default")]
    pub pagination: ApiResponseMetadataPagination,
    #[serde(deserialize_with = "null_as_default")]
    pub warnings: Vec<String>,
}

/// Decoded `{"data": <T>, "meta": {...}}` envelope.
///
/// `T` is either one record or a `Vec` of records. A missing or `null` `data`
/// field yields `T::default()`, which is what delete-style endpoints return.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de> + Default"))]
pub struct ApiResponseBodyData<T> {
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: T,
    #[serde(default, rename = "meta", deserialize_with = "null_as_default")]
    pub metadata: ApiResponseMetadata,
}

impl<T> ApiResponseBodyData<T> {
    pub fn new(data: T, metadata: ApiResponseMetadata) -> Self {
        Self { data, metadata }
    }

    pub fn pagination(&self) -> &ApiResponseMetadataPagination {
        &self.metadata.pagination
    }

    pub fn into_data(self) -> T {
        self.data
    }

    /// Map the payload while keeping the metadata.
    pub fn map_data<U>(self, f: impl FnOnce(T) -> U) -> ApiResponseBodyData<U> {
        ApiResponseBodyData {
            data: f(self.data),
            metadata: self.metadata,
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}
