use actix_web::{web, Scope};
use chrono::NaiveDate;
use finance_repo::transaction_repo::{
    InvalidTransactionType, NewTransaction, TransactionType, TransactionUpdate,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

mod handlers;
pub mod service;

pub fn transaction_service() -> Scope {
    web::scope("/transactions")
        .service(handlers::get_stats_by_period)
        .service(handlers::get_transactions_by_period)
        .service(handlers::get_transaction)
        .service(handlers::update_transaction)
        .service(handlers::delete_transaction)
        .service(handlers::get_all_transactions)
        .service(handlers::create_transaction)
}

/// Request body for creating a transaction.
///
/// `type` is kept as a string so that an unknown type is reported by the service, after the
/// user has been looked up, instead of failing body extraction.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct TransactionPayload {
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: String,
    pub category: String,
    pub place: String,
    pub amount: Decimal,
    #[serde(default)]
    pub description: Option<String>,
}

impl TransactionPayload {
    pub fn into_new_transaction(self) -> Result<NewTransaction, InvalidTransactionType> {
        Ok(NewTransaction::new(
            self.date,
            self.kind.parse::<TransactionType>()?,
            self.category,
            self.place,
            self.amount,
            self.description,
        ))
    }
}

/// Request body for a partial update. Omitted fields are left unchanged, while
/// `"description": null` clears the description.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct TransactionPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,
}

impl TransactionPatch {
    pub fn into_update(self) -> Result<TransactionUpdate, InvalidTransactionType> {
        let kind = self
            .kind
            .map(|kind| kind.parse::<TransactionType>())
            .transpose()?;
        Ok(TransactionUpdate {
            date: self.date,
            kind,
            category: self.category,
            place: self.place,
            amount: self.amount,
            description: self.description,
        })
    }
}

/// Marks a field as present even when its value is `null`
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}
