//! User profile entity for SeaORM.

use sea_orm::entity::prelude::*;

use quill_core::domain::UserProfile;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "user_profiles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: i64,
    pub full_name: String,
    pub gender: Option<String>,
    pub birth_date: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for UserProfile {
    fn from(model: Model) -> Self {
        Self {
            user_id: model.user_id,
            full_name: model.full_name,
            gender: model.gender,
            birth_date: model.birth_date,
            phone_number: model.phone_number,
            address: model.address,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}
