use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Student {
    pub id: String,
    pub card_id: String,
    pub first_name: String,
    pub last_name: String,
}
