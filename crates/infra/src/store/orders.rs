use std::sync::Arc;

use chrono::{DateTime, Utc};

use shopgate_core::{Owned, OrderId, StoreResult, SubjectId};
use shopgate_sales::{NewOrder, Order, OrderPatch, OrderStatus};

use crate::RecordError;
use crate::store::{InMemoryRecordStore, RecordStore};

/// Order persistence plus the owner lookup used for ownership checks.
#[derive(Debug, Clone)]
pub struct OrderStore<S = Arc<InMemoryRecordStore<Order>>> {
    records: S,
}

impl OrderStore {
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryRecordStore::new()))
    }
}

impl<S> OrderStore<S>
where
    S: RecordStore<Order>,
{
    pub fn new(records: S) -> Self {
        Self { records }
    }

    pub fn create(
        &self,
        owner: SubjectId,
        new: NewOrder,
        now: DateTime<Utc>,
    ) -> Result<Order, RecordError> {
        let order = Order::place(owner, new, now)?;
        self.records.insert(order.clone())?;
        Ok(order)
    }

    pub fn get(&self, id: OrderId) -> StoreResult<Option<Order>> {
        self.records.get(id)
    }

    /// Owner of an order, `None` when the order does not exist.
    pub fn owner_of(&self, id: OrderId) -> StoreResult<Option<SubjectId>> {
        Ok(self.records.get(id)?.map(|o| o.owner()))
    }

    pub fn list(&self, status: Option<OrderStatus>) -> StoreResult<Vec<Order>> {
        match status {
            Some(status) => self.records.filter(|o| o.status() == status),
            None => self.records.list(),
        }
    }

    pub fn list_for_owner(&self, owner: SubjectId) -> StoreResult<Vec<Order>> {
        self.records.filter(|o| o.owner() == owner)
    }

    pub fn update(
        &self,
        id: OrderId,
        patch: OrderPatch,
        now: DateTime<Utc>,
    ) -> Result<Order, RecordError> {
        self.records.update(id, |order| order.apply(patch, now))
    }

    pub fn delete(&self, id: OrderId) -> StoreResult<Order> {
        self.records.remove(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shopgate_core::{Entity, ProductId, StoreError};
    use shopgate_sales::OrderLine;

    fn new_order() -> NewOrder {
        NewOrder {
            lines: vec![OrderLine {
                product_id: ProductId::new(),
                quantity: 1,
            }],
            amount: 1_999,
            address: "221B Baker Street".to_string(),
        }
    }

    #[test]
    fn owner_of_reports_creator() {
        let store = OrderStore::in_memory();
        let alice = SubjectId::new();
        let order = store.create(alice, new_order(), Utc::now()).unwrap();

        assert_eq!(store.owner_of(order.id()).unwrap(), Some(alice));
        assert_eq!(store.owner_of(OrderId::new()).unwrap(), None);
    }

    #[test]
    fn listings_filter_by_owner_and_status() {
        let store = OrderStore::in_memory();
        let alice = SubjectId::new();
        let bob = SubjectId::new();
        let a = store.create(alice, new_order(), Utc::now()).unwrap();
        store.create(bob, new_order(), Utc::now()).unwrap();

        let mine = store.list_for_owner(alice).unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].id(), a.id());

        store
            .update(
                a.id(),
                OrderPatch {
                    status: Some(OrderStatus::Shipped),
                    ..OrderPatch::default()
                },
                Utc::now(),
            )
            .unwrap();

        assert_eq!(store.list(None).unwrap().len(), 2);
        let shipped = store.list(Some(OrderStatus::Shipped)).unwrap();
        assert_eq!(shipped.len(), 1);
        assert_eq!(shipped[0].owner(), alice);
    }

    #[test]
    fn invalid_order_is_not_stored() {
        let store = OrderStore::in_memory();
        let err = store
            .create(
                SubjectId::new(),
                NewOrder {
                    lines: vec![],
                    ..new_order()
                },
                Utc::now(),
            )
            .unwrap_err();
        assert!(matches!(err, RecordError::Domain(_)));
        assert!(store.list(None).unwrap().is_empty());
    }

    #[test]
    fn delete_unknown_order_is_not_found() {
        let store = OrderStore::in_memory();
        assert_eq!(store.delete(OrderId::new()).unwrap_err(), StoreError::NotFound);
    }
}
