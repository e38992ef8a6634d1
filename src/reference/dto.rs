use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct TherapeuticAreaCreate {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct RegionCreate {
    pub name: String,
}
