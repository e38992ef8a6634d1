use serde::{Deserialize, Serialize};
use time::Date;

use crate::auth::dto::PublicUser;
use crate::reference::repo::{Region, TherapeuticArea};

/// Request body for product creation.
#[derive(Debug, Deserialize)]
pub struct ProductCreate {
    pub name: String,
    pub ingredient: String,
    pub description: String,
    pub therapeutic_area_id: i32,
    #[serde(default)]
    pub region_ids: Vec<i32>,
}

/// Partial update: absent fields are left unchanged. A present `region_ids`
/// replaces the whole region set.
#[derive(Debug, Default, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub ingredient: Option<String>,
    pub description: Option<String>,
    pub therapeutic_area_id: Option<i32>,
    pub region_ids: Option<Vec<i32>>,
}

/// Product as returned to clients, with the creator, therapeutic area and
/// region set nested in. `region_ids` is derived from `regions`.
#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub id: i32,
    pub name: String,
    pub ingredient: String,
    pub description: String,
    pub therapeutic_area_id: i32,
    pub creator_id: i32,
    pub creation_date: Date,
    pub creator: PublicUser,
    pub therapeutic_area: TherapeuticArea,
    pub regions: Vec<Region>,
    pub region_ids: Vec<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn partial_update_defaults_to_no_changes() {
        let patch: ProductUpdate = serde_json::from_str("{}").unwrap();
        assert!(patch.name.is_none());
        assert!(patch.ingredient.is_none());
        assert!(patch.description.is_none());
        assert!(patch.therapeutic_area_id.is_none());
        assert!(patch.region_ids.is_none());
    }

    #[test]
    fn partial_update_distinguishes_empty_regions_from_absent() {
        let patch: ProductUpdate = serde_json::from_str(r#"{"region_ids": []}"#).unwrap();
        assert_eq!(patch.region_ids, Some(vec![]));
    }

    #[test]
    fn response_carries_nested_relations_and_derived_ids() {
        let response = ProductResponse {
            id: 1,
            name: "Adalimab".to_string(),
            ingredient: "adalimumab".to_string(),
            description: "monoclonal antibody".to_string(),
            therapeutic_area_id: 2,
            creator_id: 3,
            creation_date: date!(2024 - 05 - 17),
            creator: PublicUser {
                id: 3,
                email: "dev@example.com".to_string(),
                name: "Dev".to_string(),
                is_active: true,
            },
            therapeutic_area: TherapeuticArea {
                id: 2,
                name: "Oncology".to_string(),
            },
            regions: vec![
                Region {
                    id: 4,
                    name: "Europe".to_string(),
                },
                Region {
                    id: 9,
                    name: "Turkey".to_string(),
                },
            ],
            region_ids: vec![4, 9],
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["creator"]["id"], 3);
        assert_eq!(json["therapeutic_area"]["name"], "Oncology");
        assert_eq!(json["regions"][1]["name"], "Turkey");
        assert_eq!(json["region_ids"], serde_json::json!([4, 9]));
    }
}
