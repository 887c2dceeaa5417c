use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shopgate_core::{DomainError, DomainResult, Entity, OrderId, Owned, ProductId, SubjectId};

/// Order fulfilment status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Shipped,
    Delivered,
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "shipped" => Ok(Self::Shipped),
            "delivered" => Ok(Self::Delivered),
            other => Err(DomainError::validation(format!("invalid order status '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Input for placing an order. The owner is never part of it: it is the
/// authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewOrder {
    #[serde(rename = "products")]
    pub lines: Vec<OrderLine>,
    /// Total in smallest currency unit.
    pub amount: u64,
    pub address: String,
}

/// Admin-side partial update. Has no owner field; the owner is fixed at placement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct OrderPatch {
    pub status: Option<OrderStatus>,
    #[serde(rename = "products")]
    pub lines: Option<Vec<OrderLine>>,
    pub amount: Option<u64>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    id: OrderId,
    owner: SubjectId,
    #[serde(rename = "products")]
    lines: Vec<OrderLine>,
    amount: u64,
    address: String,
    status: OrderStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Order {
    /// Place a new order on behalf of `owner`.
    ///
    /// # Invariants
    /// - At least one line.
    /// - Non-blank delivery address.
    /// - `owner` is fixed for the life of the order.
    pub fn place(owner: SubjectId, new: NewOrder, now: DateTime<Utc>) -> DomainResult<Self> {
        ensure_lines(&new.lines)?;
        let address = validated_address(&new.address)?;
        Ok(Self {
            id: OrderId::new(),
            owner,
            lines: new.lines,
            amount: new.amount,
            address,
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn apply(&mut self, patch: OrderPatch, now: DateTime<Utc>) -> DomainResult<()> {
        if let Some(lines) = &patch.lines {
            ensure_lines(lines)?;
        }
        let address = patch.address.as_deref().map(validated_address).transpose()?;

        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(lines) = patch.lines {
            self.lines = lines;
        }
        if let Some(amount) = patch.amount {
            self.amount = amount;
        }
        if let Some(address) = address {
            self.address = address;
        }
        self.updated_at = now;
        Ok(())
    }
}

impl Entity for Order {
    type Id = OrderId;

    fn id(&self) -> OrderId {
        self.id
    }
}

impl Owned for Order {
    fn owner(&self) -> SubjectId {
        self.owner
    }
}

fn ensure_lines(lines: &[OrderLine]) -> DomainResult<()> {
    if lines.is_empty() {
        return Err(DomainError::validation("an order needs at least one product"));
    }
    Ok(())
}

fn validated_address(address: &str) -> DomainResult<String> {
    let trimmed = address.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation("delivery address must not be blank"));
    }
    Ok(trimmed.to_string())
}
