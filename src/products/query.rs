use serde::Deserialize;
use sqlx::{Postgres, QueryBuilder};

/// Base SELECT shared by the listing and detail queries. The creator and
/// therapeutic area are joined in so one row carries everything but the
/// region set.
pub(crate) const PRODUCT_SELECT: &str = "SELECT p.id, p.name, p.ingredient, p.description, \
     p.creation_date, p.creator_id, p.therapeutic_area_id, \
     u.email AS creator_email, u.name AS creator_name, u.is_active AS creator_is_active, \
     ta.name AS therapeutic_area_name \
     FROM products p \
     JOIN users u ON u.id = p.creator_id \
     JOIN therapeutic_areas ta ON ta.id = p.therapeutic_area_id";

/// Query parameters accepted by the product listing endpoint.
#[derive(Debug, Deserialize)]
pub struct ProductListParams {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
    pub creator_id: Option<i32>,
    pub therapeutic_area_id: Option<i32>,
    pub region_id: Option<i32>,
    pub search: Option<String>,
    pub sort_by: Option<SortBy>,
    #[serde(default)]
    pub sort_order: SortOrder,
}

fn default_limit() -> i64 {
    10
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    Name,
    Ingredient,
    Date,
    TherapeuticArea,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortBy {
    fn column(self) -> &'static str {
        match self {
            SortBy::Name => "p.name",
            SortBy::Ingredient => "p.ingredient",
            SortBy::Date => "p.creation_date",
            SortBy::TherapeuticArea => "ta.name",
        }
    }
}

impl SortOrder {
    fn keyword(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Builds the filtered, sorted, paginated listing statement. Filters are
/// AND-combined; every client-supplied value is a bound parameter, never
/// spliced into the SQL text. Without `sort_by` no ORDER BY is emitted and
/// rows come back in insertion order.
pub fn build_list_query(params: &ProductListParams) -> QueryBuilder<'static, Postgres> {
    let mut qb: QueryBuilder<'static, Postgres> = QueryBuilder::new(PRODUCT_SELECT);
    let mut has_where = false;

    if let Some(creator_id) = params.creator_id {
        push_clause(&mut qb, &mut has_where);
        qb.push("p.creator_id = ").push_bind(creator_id);
    }
    if let Some(therapeutic_area_id) = params.therapeutic_area_id {
        push_clause(&mut qb, &mut has_where);
        qb.push("p.therapeutic_area_id = ").push_bind(therapeutic_area_id);
    }
    if let Some(region_id) = params.region_id {
        push_clause(&mut qb, &mut has_where);
        qb.push("EXISTS (SELECT 1 FROM product_regions pr WHERE pr.product_id = p.id AND pr.region_id = ")
            .push_bind(region_id)
            .push(")");
    }
    if let Some(tsquery) = params.search.as_deref().and_then(prefix_tsquery) {
        push_clause(&mut qb, &mut has_where);
        qb.push("p.search_vector @@ to_tsquery('simple', ")
            .push_bind(tsquery)
            .push(")");
    }

    if let Some(sort_by) = params.sort_by {
        qb.push(" ORDER BY ")
            .push(sort_by.column())
            .push(" ")
            .push(params.sort_order.keyword());
    }

    qb.push(" LIMIT ").push_bind(params.limit.max(0));
    qb.push(" OFFSET ").push_bind(params.skip.max(0));
    qb
}

fn push_clause(qb: &mut QueryBuilder<'static, Postgres>, has_where: &mut bool) {
    if *has_where {
        qb.push(" AND ");
    } else {
        qb.push(" WHERE ");
        *has_where = true;
    }
}

/// Turns raw search input into a prefix-match tsquery, e.g. "pain relief"
/// becomes "pain:* & relief:*". Tokenizes on non-alphanumerics so tsquery
/// operators in the input carry no meaning. None when nothing is indexable.
pub fn prefix_tsquery(input: &str) -> Option<String> {
    let terms: Vec<String> = input
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| format!("{t}:*"))
        .collect();
    if terms.is_empty() {
        None
    } else {
        Some(terms.join(" & "))
    }
}
