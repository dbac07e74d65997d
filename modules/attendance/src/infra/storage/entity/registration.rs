use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use uuid::Uuid;

use crate::contract::model::Registration;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "registrations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub municipality: String,
    pub party_size: i32,
    pub fingerprint: String,
    pub date_key: NaiveDate,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Registration {
    fn from(m: Model) -> Self {
        Self {
            id: m.id,
            municipality: m.municipality,
            party_size: m.party_size,
            fingerprint: m.fingerprint,
            date_key: m.date_key,
            created_at: m.created_at,
        }
    }
}
