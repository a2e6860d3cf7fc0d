use chrono::NaiveDate;
use fake::faker::address::en::CityName;
use fake::faker::lorem::en::{Sentence, Word};
use fake::Fake;
use finance_repo::transaction_repo::{NewTransaction, TransactionType};
use rust_decimal::Decimal;

#[allow(dead_code)]
pub fn generate_new_transaction() -> NewTransaction {
    let date = NaiveDate::from_ymd_opt(2024, (1..=12).fake(), (1..=28).fake()).unwrap();
    generate_new_transaction_with_date(date)
}

#[allow(dead_code)]
pub fn generate_new_transaction_with_date(date: NaiveDate) -> NewTransaction {
    let kind = if (0..2).fake::<u8>() == 0 {
        TransactionType::Income
    } else {
        TransactionType::Expense
    };
    NewTransaction::new(
        date,
        kind,
        Word().fake(),
        CityName().fake(),
        Decimal::new((1..1_000_000).fake(), 2),
        Some(Sentence(3..6).fake()),
    )
}

#[allow(dead_code)]
pub fn generate_new_transaction_with_category(
    category: &str,
    kind: TransactionType,
    amount: Decimal,
    date: NaiveDate,
) -> NewTransaction {
    NewTransaction {
        category: category.to_string(),
        kind,
        amount,
        ..generate_new_transaction_with_date(date)
    }
}
