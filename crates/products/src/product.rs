use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shopgate_core::{DomainError, DomainResult, Entity, ProductId};

/// Input for adding a product to the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Price in smallest currency unit (e.g. cents).
    pub price: u64,
    pub categories: Vec<String>,
    pub stock: u32,
}

/// Partial update; absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<u64>,
    pub categories: Option<Vec<String>>,
    pub stock: Option<u32>,
}

/// Catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    id: ProductId,
    name: String,
    description: Option<String>,
    price: u64,
    categories: Vec<String>,
    stock: u32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Product {
    pub fn create(new: NewProduct, now: DateTime<Utc>) -> DomainResult<Self> {
        let name = validated_name(&new.name)?;
        Ok(Self {
            id: ProductId::new(),
            name,
            description: new.description,
            price: new.price,
            categories: new.categories,
            stock: new.stock,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price(&self) -> u64 {
        self.price
    }

    pub fn stock(&self) -> u32 {
        self.stock
    }

    pub fn in_category(&self, category: &str) -> bool {
        self.categories.iter().any(|c| c == category)
    }

    pub fn apply(&mut self, patch: ProductPatch, now: DateTime<Utc>) -> DomainResult<()> {
        if let Some(name) = patch.name {
            self.name = validated_name(&name)?;
        }
        if let Some(description) = patch.description {
            self.description = Some(description);
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(categories) = patch.categories {
            self.categories = categories;
        }
        if let Some(stock) = patch.stock {
            self.stock = stock;
        }
        self.updated_at = now;
        Ok(())
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> ProductId {
        self.id
    }
}

fn validated_name(name: &str) -> DomainResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation("product name must not be blank"));
    }
    Ok(trimmed.to_string())
}
