use serde::{Deserialize, Serialize};

/// A community as the metadata service describes it: one per organizing
/// creator. Read-only to the engine; re-fetched on demand, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Community {
    pub id: String,
    pub display_name: String,
    #[serde(default)]
    pub image_ref: Option<String>,
}
