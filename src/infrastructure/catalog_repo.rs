use diesel::prelude::*;

use crate::db::DbPool;
use crate::domain::checkout::VariantDetail;
use crate::domain::errors::DomainError;
use crate::domain::ports::CatalogRepository;
use crate::schema::{product_variants, products};

use super::models::VariantDetailRow;

pub struct DieselCatalogRepository {
    pool: DbPool,
}

impl DieselCatalogRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl CatalogRepository for DieselCatalogRepository {
    fn find_variants(&self, ids: &[i32]) -> Result<Vec<VariantDetail>, DomainError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get()?;

        let rows = product_variants::table
            .inner_join(products::table)
            .filter(product_variants::id.eq_any(ids.to_vec()))
            .select((
                product_variants::id,
                product_variants::product_id,
                products::name,
                product_variants::color,
                product_variants::size,
                product_variants::price,
            ))
            .load::<VariantDetailRow>(&mut conn)?;

        Ok(rows.into_iter().map(VariantDetail::from).collect())
    }
}
