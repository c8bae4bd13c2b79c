//! Session database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::Session;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "sessions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: i32,
    pub created_at: DateTimeUtc,
    pub expires_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Session {
    fn from(model: Model) -> Self {
        Session {
            id: model.id,
            user_id: model.user_id,
            created_at: model.created_at,
            expires_at: model.expires_at,
        }
    }
}
