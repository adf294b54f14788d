use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Soil {
    pub id: i64,
    pub name: String,
    pub composition: String,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSoilInput {
    pub name: String,
    pub composition: String,
}

/// Partial update. Setting `active` back to true restores a deleted soil.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateSoilInput {
    pub name: Option<String>,
    pub composition: Option<String>,
    pub active: Option<bool>,
}
