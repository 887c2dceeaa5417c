use std::sync::Arc;

use chrono::{DateTime, Utc};

use shopgate_core::{ProductId, StoreResult};
use shopgate_products::{NewProduct, Product, ProductPatch};

use crate::RecordError;
use crate::store::{InMemoryRecordStore, RecordStore};

/// Product catalog storage.
#[derive(Debug, Clone)]
pub struct ProductStore<S = Arc<InMemoryRecordStore<Product>>> {
    records: S,
}

impl ProductStore {
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryRecordStore::new()))
    }
}

impl<S> ProductStore<S>
where
    S: RecordStore<Product>,
{
    pub fn new(records: S) -> Self {
        Self { records }
    }

    pub fn create(&self, new: NewProduct, now: DateTime<Utc>) -> Result<Product, RecordError> {
        let product = Product::create(new, now)?;
        self.records.insert(product.clone())?;
        Ok(product)
    }

    pub fn get(&self, id: ProductId) -> StoreResult<Option<Product>> {
        self.records.get(id)
    }

    pub fn list(&self, category: Option<&str>) -> StoreResult<Vec<Product>> {
        match category {
            Some(category) => self.records.filter(|p| p.in_category(category)),
            None => self.records.list(),
        }
    }

    pub fn update(
        &self,
        id: ProductId,
        patch: ProductPatch,
        now: DateTime<Utc>,
    ) -> Result<Product, RecordError> {
        self.records.update(id, |product| product.apply(patch, now))
    }

    pub fn delete(&self, id: ProductId) -> StoreResult<Product> {
        self.records.remove(id)
    }
}
