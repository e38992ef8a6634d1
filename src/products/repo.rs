use std::collections::HashMap;

use sqlx::{FromRow, PgPool, Postgres, Transaction};
use time::Date;

use crate::auth::dto::PublicUser;
use crate::error::{is_foreign_key_violation, ApiError};
use crate::products::dto::{ProductCreate, ProductResponse, ProductUpdate};
use crate::products::query::{build_list_query, ProductListParams, PRODUCT_SELECT};
use crate::reference::repo::{Region, TherapeuticArea};

/// Flat row produced by the joined listing/detail select.
#[derive(Debug, FromRow)]
pub struct ProductRow {
    pub id: i32,
    pub name: String,
    pub ingredient: String,
    pub description: String,
    pub creation_date: Date,
    pub creator_id: i32,
    pub therapeutic_area_id: i32,
    pub creator_email: String,
    pub creator_name: String,
    pub creator_is_active: bool,
    pub therapeutic_area_name: String,
}

#[derive(Debug, FromRow)]
struct ProductCore {
    creator_id: i32,
    name: String,
    ingredient: String,
    description: String,
    therapeutic_area_id: i32,
}

pub async fn list(
    db: &PgPool,
    params: &ProductListParams,
) -> Result<Vec<ProductResponse>, ApiError> {
    let mut qb = build_list_query(params);
    let rows: Vec<ProductRow> = qb.build_query_as().fetch_all(db).await?;
    let ids: Vec<i32> = rows.iter().map(|r| r.id).collect();
    let mut regions = regions_by_product(db, &ids).await?;
    Ok(rows
        .into_iter()
        .map(|row| {
            let regions = regions.remove(&row.id).unwrap_or_default();
            assemble(row, regions)
        })
        .collect())
}

pub async fn get(db: &PgPool, id: i32) -> Result<ProductResponse, ApiError> {
    let sql = format!("{PRODUCT_SELECT} WHERE p.id = $1");
    let row: Option<ProductRow> = sqlx::query_as(&sql).bind(id).fetch_optional(db).await?;
    let row = row.ok_or_else(|| ApiError::NotFound("Product not found".to_string()))?;
    let mut regions = regions_by_product(db, &[row.id]).await?;
    let product_regions = regions.remove(&row.id).unwrap_or_default();
    Ok(assemble(row, product_regions))
}

/// Creates the product and its region associations in one transaction. Any
/// unknown region id aborts the whole insert.
pub async fn create(db: &PgPool, data: &ProductCreate, creator_id: i32) -> Result<i32, ApiError> {
    let mut tx = db.begin().await?;
    let (product_id,): (i32,) = sqlx::query_as(
        r#"
        INSERT INTO products (name, ingredient, description, creator_id, therapeutic_area_id)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id
        "#,
    )
    .bind(&data.name)
    .bind(&data.ingredient)
    .bind(&data.description)
    .bind(creator_id)
    .bind(data.therapeutic_area_id)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| area_not_found(e, data.therapeutic_area_id))?;

    attach_regions(&mut tx, product_id, &data.region_ids).await?;
    tx.commit().await?;
    Ok(product_id)
}

/// Applies a partial update. Provided fields overwrite, absent fields stay;
/// a provided region list replaces the association set atomically.
pub async fn update(
    db: &PgPool,
    id: i32,
    patch: &ProductUpdate,
    user_id: i32,
) -> Result<(), ApiError> {
    let mut tx = db.begin().await?;

    let core: Option<ProductCore> = sqlx::query_as(
        "SELECT creator_id, name, ingredient, description, therapeutic_area_id \
         FROM products WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?;
    let core = core.ok_or_else(|| ApiError::NotFound("Product not found".to_string()))?;

    if core.creator_id != user_id {
        return Err(ApiError::Forbidden(
            "Not authorized to update this product".to_string(),
        ));
    }

    let name = patch.name.as_ref().unwrap_or(&core.name);
    let ingredient = patch.ingredient.as_ref().unwrap_or(&core.ingredient);
    let description = patch.description.as_ref().unwrap_or(&core.description);
    let therapeutic_area_id = patch
        .therapeutic_area_id
        .unwrap_or(core.therapeutic_area_id);

    sqlx::query(
        "UPDATE products SET name = $1, ingredient = $2, description = $3, \
         therapeutic_area_id = $4 WHERE id = $5",
    )
    .bind(name)
    .bind(ingredient)
    .bind(description)
    .bind(therapeutic_area_id)
    .bind(id)
    .execute(&mut *tx)
    .await
    .map_err(|e| area_not_found(e, therapeutic_area_id))?;

    if let Some(region_ids) = &patch.region_ids {
        sqlx::query("DELETE FROM product_regions WHERE product_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        attach_regions(&mut tx, id, region_ids).await?;
    }

    tx.commit().await?;
    Ok(())
}

pub async fn delete(db: &PgPool, id: i32, user_id: i32) -> Result<(), ApiError> {
    let creator_id: Option<i32> = sqlx::query_scalar("SELECT creator_id FROM products WHERE id = $1")
        .bind(id)
        .fetch_optional(db)
        .await?;
    let creator_id = creator_id.ok_or_else(|| ApiError::NotFound("Product not found".to_string()))?;

    if creator_id != user_id {
        return Err(ApiError::Forbidden(
            "Not authorized to delete this product".to_string(),
        ));
    }

    // Junction rows go with the product (ON DELETE CASCADE).
    sqlx::query("DELETE FROM products WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(())
}

/// Validates every region id, then inserts the junction rows. The first
/// missing id (in request order) fails the enclosing transaction.
async fn attach_regions(
    tx: &mut Transaction<'_, Postgres>,
    product_id: i32,
    region_ids: &[i32],
) -> Result<(), ApiError> {
    if region_ids.is_empty() {
        return Ok(());
    }

    let found: Vec<i32> = sqlx::query_scalar("SELECT id FROM regions WHERE id = ANY($1)")
        .bind(region_ids)
        .fetch_all(&mut **tx)
        .await?;
    if let Some(missing) = region_ids.iter().find(|id| !found.contains(id)) {
        return Err(ApiError::NotFound(format!(
            "Region with id {missing} not found"
        )));
    }

    for region_id in region_ids {
        sqlx::query(
            "INSERT INTO product_regions (product_id, region_id) VALUES ($1, $2) \
             ON CONFLICT DO NOTHING",
        )
        .bind(product_id)
        .bind(region_id)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

async fn regions_by_product(
    db: &PgPool,
    product_ids: &[i32],
) -> Result<HashMap<i32, Vec<Region>>, ApiError> {
    if product_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows: Vec<(i32, i32, String)> = sqlx::query_as(
        r#"
        SELECT pr.product_id, r.id, r.name
        FROM product_regions pr
        JOIN regions r ON r.id = pr.region_id
        WHERE pr.product_id = ANY($1)
        ORDER BY r.id
        "#,
    )
    .bind(product_ids)
    .fetch_all(db)
    .await?;

    let mut map: HashMap<i32, Vec<Region>> = HashMap::new();
    for (product_id, id, name) in rows {
        map.entry(product_id)
            .or_default()
            .push(Region { id, name });
    }
    Ok(map)
}

fn assemble(row: ProductRow, regions: Vec<Region>) -> ProductResponse {
    let region_ids = regions.iter().map(|r| r.id).collect();
    ProductResponse {
        id: row.id,
        name: row.name,
        ingredient: row.ingredient,
        description: row.description,
        therapeutic_area_id: row.therapeutic_area_id,
        creator_id: row.creator_id,
        creation_date: row.creation_date,
        creator: PublicUser {
            id: row.creator_id,
            email: row.creator_email,
            name: row.creator_name,
            is_active: row.creator_is_active,
        },
        therapeutic_area: TherapeuticArea {
            id: row.therapeutic_area_id,
            name: row.therapeutic_area_name,
        },
        regions,
        region_ids,
    }
}

/// The products table has a foreign key on therapeutic_area_id; a violation
/// means the referenced area does not exist.
fn area_not_found(e: sqlx::Error, therapeutic_area_id: i32) -> ApiError {
    if is_foreign_key_violation(&e) {
        ApiError::NotFound(format!(
            "Therapeutic area with id {therapeutic_area_id} not found"
        ))
    } else {
        ApiError::from(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn row() -> ProductRow {
        ProductRow {
            id: 11,
            name: "Cardiol".to_string(),
            ingredient: "bisoprolol".to_string(),
            description: "beta blocker".to_string(),
            creation_date: date!(2023 - 11 - 02),
            creator_id: 5,
            therapeutic_area_id: 4,
            creator_email: "owner@example.com".to_string(),
            creator_name: "Owner".to_string(),
            creator_is_active: true,
            therapeutic_area_name: "Cardiology".to_string(),
        }
    }

    #[test]
    fn assemble_nests_relations_and_derives_region_ids() {
        let regions = vec![
            Region {
                id: 1,
                name: "Europe".to_string(),
            },
            Region {
                id: 6,
                name: "Turkey".to_string(),
            },
        ];
        let product = assemble(row(), regions);
        assert_eq!(product.creator.id, product.creator_id);
        assert_eq!(product.creator.email, "owner@example.com");
        assert_eq!(product.therapeutic_area.id, product.therapeutic_area_id);
        assert_eq!(product.therapeutic_area.name, "Cardiology");
        assert_eq!(product.region_ids, vec![1, 6]);
    }

    #[test]
    fn assemble_with_no_regions() {
        let product = assemble(row(), Vec::new());
        assert!(product.regions.is_empty());
        assert!(product.region_ids.is_empty());
    }
}
