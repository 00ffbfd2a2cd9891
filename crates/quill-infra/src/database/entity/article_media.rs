//! Article media entity for SeaORM.

use sea_orm::entity::prelude::*;

use quill_core::domain::ArticleMedia;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "article_medias")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub article_id: i64,
    pub media_type: String,
    pub path: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::article::Entity",
        from = "Column::ArticleId",
        to = "super::article::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Article,
}

impl Related<super::article::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Article.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for ArticleMedia {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            article_id: model.article_id,
            media_type: model.media_type,
            path: model.path,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}
