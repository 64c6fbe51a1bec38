use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyRecord {
    pub name: String,
    pub description: String,
    pub field_type: String,
    /// The page's own wording ("Yes", "No", "Conditional"), not a boolean.
    pub required: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_policy: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributeRecord {
    #[serde(rename = "attributeName")]
    pub name: String,
    #[serde(rename = "attributeDescription")]
    pub description: String,
}

/// One extracted resource page.
///
/// Fields that only template-resource pages carry are `Option` and dropped
/// from the JSON when the page kind does not collect them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceRecord {
    pub name: String,
    pub description: String,
    #[serde(rename = "sourceURL", skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json_sample: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaml_sample: Option<String>,
    pub properties: Vec<PropertyRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_values: Option<Vec<AttributeRecord>>,
}

/// Serialized form of a page that produced no record.
#[derive(Debug, Clone, Serialize)]
pub struct FailureRow {
    pub index: usize,
    pub reference: String,
    pub error: String,
}
