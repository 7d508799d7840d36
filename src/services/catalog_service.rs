// src/services/catalog_service.rs

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::ProductRepository,
    models::catalog::{Product, ProductChanges},
};

#[derive(Clone)]
pub struct CatalogService {
    product_repo: ProductRepository,
}

impl CatalogService {
    pub fn new(product_repo: ProductRepository) -> Self {
        Self { product_repo }
    }

    pub async fn list_products(&self) -> Result<Vec<Product>, AppError> {
        self.product_repo.list().await
    }

    pub async fn get_product(&self, id: Uuid) -> Result<Product, AppError> {
        self.product_repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound("Product"))
    }

    pub async fn create_product(
        &self,
        name: &str,
        description: Option<&str>,
        price: Decimal,
        stock: i32,
    ) -> Result<Product, AppError> {
        let product = self.product_repo.create(name, description, price, stock).await?;
        tracing::info!(product_id = %product.id, "Produto criado: {}", product.name);
        Ok(product)
    }

    pub async fn update_product(
        &self,
        id: Uuid,
        changes: ProductChanges,
    ) -> Result<Product, AppError> {
        if changes.is_empty() {
            return Err(AppError::InvalidInput("No fields to update".into()));
        }

        self.product_repo
            .update(id, &changes)
            .await?
            .ok_or(AppError::NotFound("Product"))
    }

    pub async fn delete_product(&self, id: Uuid) -> Result<(), AppError> {
        match self.product_repo.delete(id).await? {
            0 => Err(AppError::NotFound("Product")),
            _ => {
                tracing::info!(product_id = %id, "Produto removido");
                Ok(())
            }
        }
    }
}
