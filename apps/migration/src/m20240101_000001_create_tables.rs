use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

fn id<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .big_integer()
        .not_null()
        .auto_increment()
        .primary_key()
        .to_owned()
}

fn user_key<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col).big_integer().not_null().primary_key().to_owned()
}

fn reference<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col).big_integer().not_null().to_owned()
}

fn timestamp<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .timestamp_with_time_zone()
        .not_null()
        .default(Expr::current_timestamp())
        .to_owned()
}

fn cascade<FT, FC, TT, TC>(name: &str, from: (FT, FC), to: (TT, TC)) -> ForeignKeyCreateStatement
where
    FT: IntoIden + 'static,
    FC: IntoIden + 'static,
    TT: IntoIden + 'static,
    TC: IntoIden + 'static,
{
    ForeignKey::create()
        .name(name)
        .from(from.0, from.1)
        .to(to.0, to.1)
        .on_delete(ForeignKeyAction::Cascade)
        .on_update(ForeignKeyAction::Cascade)
        .to_owned()
}

/// A user likes an article at most once.
fn likes_pair_index() -> IndexCreateStatement {
    Index::create()
        .name("idx_likes_user_article")
        .table(Likes::Table)
        .col(Likes::UserId)
        .col(Likes::ArticleId)
        .unique()
        .if_not_exists()
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(id(Users::Id))
                    .col(ColumnDef::new(Users::Username).string_len(16).not_null().unique_key())
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(
                        ColumnDef::new(Users::Role)
                            .string_len(16)
                            .not_null()
                            .default("user"),
                    )
                    .col(timestamp(Users::CreatedAt))
                    .col(timestamp(Users::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(UserProfiles::Table)
                    .if_not_exists()
                    .col(user_key(UserProfiles::UserId))
                    .col(ColumnDef::new(UserProfiles::FullName).string().not_null())
                    .col(ColumnDef::new(UserProfiles::Gender).string_len(32).null())
                    .col(ColumnDef::new(UserProfiles::BirthDate).string_len(10).null())
                    .col(ColumnDef::new(UserProfiles::PhoneNumber).string_len(16).null())
                    .col(ColumnDef::new(UserProfiles::Address).text().null())
                    .col(timestamp(UserProfiles::CreatedAt))
                    .col(timestamp(UserProfiles::UpdatedAt))
                    .foreign_key(&mut cascade(
                        "fk_user_profiles_user_id",
                        (UserProfiles::Table, UserProfiles::UserId),
                        (Users::Table, Users::Id),
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(UserProfilePhotos::Table)
                    .if_not_exists()
                    .col(user_key(UserProfilePhotos::UserId))
                    .col(ColumnDef::new(UserProfilePhotos::Path).string().not_null())
                    .col(timestamp(UserProfilePhotos::CreatedAt))
                    .col(timestamp(UserProfilePhotos::UpdatedAt))
                    .foreign_key(&mut cascade(
                        "fk_user_profile_photos_user_id",
                        (UserProfilePhotos::Table, UserProfilePhotos::UserId),
                        (Users::Table, Users::Id),
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Articles::Table)
                    .if_not_exists()
                    .col(id(Articles::Id))
                    .col(reference(Articles::UserId))
                    .col(ColumnDef::new(Articles::Title).string_len(255).not_null())
                    .col(ColumnDef::new(Articles::Description).text().not_null().default(""))
                    .col(ColumnDef::new(Articles::Content).text().not_null())
                    .col(
                        ColumnDef::new(Articles::IsPublished)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(timestamp(Articles::CreatedAt))
                    .col(timestamp(Articles::UpdatedAt))
                    .foreign_key(&mut cascade(
                        "fk_articles_user_id",
                        (Articles::Table, Articles::UserId),
                        (Users::Table, Users::Id),
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ArticleMedias::Table)
                    .if_not_exists()
                    .col(id(ArticleMedias::Id))
                    .col(reference(ArticleMedias::ArticleId))
                    .col(ColumnDef::new(ArticleMedias::MediaType).string_len(100).not_null())
                    .col(ColumnDef::new(ArticleMedias::Path).string().not_null())
                    .col(timestamp(ArticleMedias::CreatedAt))
                    .col(timestamp(ArticleMedias::UpdatedAt))
                    .foreign_key(&mut cascade(
                        "fk_article_medias_article_id",
                        (ArticleMedias::Table, ArticleMedias::ArticleId),
                        (Articles::Table, Articles::Id),
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Likes::Table)
                    .if_not_exists()
                    .col(id(Likes::Id))
                    .col(reference(Likes::UserId))
                    .col(reference(Likes::ArticleId))
                    .col(timestamp(Likes::CreatedAt))
                    .col(timestamp(Likes::UpdatedAt))
                    .foreign_key(&mut cascade(
                        "fk_likes_user_id",
                        (Likes::Table, Likes::UserId),
                        (Users::Table, Users::Id),
                    ))
                    .foreign_key(&mut cascade(
                        "fk_likes_article_id",
                        (Likes::Table, Likes::ArticleId),
                        (Articles::Table, Articles::Id),
                    ))
                    .to_owned(),
            )
            .await?;

        manager.create_index(likes_pair_index()).await?;

        manager
            .create_table(
                Table::create()
                    .table(Comments::Table)
                    .if_not_exists()
                    .col(id(Comments::Id))
                    .col(reference(Comments::UserId))
                    .col(reference(Comments::ArticleId))
                    .col(ColumnDef::new(Comments::Body).text().not_null())
                    .col(timestamp(Comments::CreatedAt))
                    .col(timestamp(Comments::UpdatedAt))
                    .foreign_key(&mut cascade(
                        "fk_comments_user_id",
                        (Comments::Table, Comments::UserId),
                        (Users::Table, Users::Id),
                    ))
                    .foreign_key(&mut cascade(
                        "fk_comments_article_id",
                        (Comments::Table, Comments::ArticleId),
                        (Articles::Table, Articles::Id),
                    ))
                    .to_owned(),
            )
            .await?;

        // Listings filter on these.
        manager
            .create_index(
                Index::create()
                    .name("idx_articles_user_published")
                    .table(Articles::Table)
                    .col(Articles::UserId)
                    .col(Articles::IsPublished)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_comments_article_id")
                    .table(Comments::Table)
                    .col(Comments::ArticleId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        drop_table(manager, Comments::Table).await?;
        drop_table(manager, Likes::Table).await?;
        drop_table(manager, ArticleMedias::Table).await?;
        drop_table(manager, Articles::Table).await?;
        drop_table(manager, UserProfilePhotos::Table).await?;
        drop_table(manager, UserProfiles::Table).await?;
        drop_table(manager, Users::Table).await
    }
}

async fn drop_table(manager: &SchemaManager<'_>, table: impl IntoTableRef) -> Result<(), DbErr> {
    manager
        .drop_table(Table::drop().table(table).if_exists().to_owned())
        .await
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Username,
    PasswordHash,
    Role,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum UserProfiles {
    Table,
    UserId,
    FullName,
    Gender,
    BirthDate,
    PhoneNumber,
    Address,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum UserProfilePhotos {
    Table,
    UserId,
    Path,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Articles {
    Table,
    Id,
    UserId,
    Title,
    Description,
    Content,
    IsPublished,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ArticleMedias {
    Table,
    Id,
    ArticleId,
    MediaType,
    Path,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Likes {
    Table,
    Id,
    UserId,
    ArticleId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Comments {
    Table,
    Id,
    UserId,
    ArticleId,
    Body,
    CreatedAt,
    UpdatedAt,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn foreign_keys_cascade_both_ways() {
        let sql = cascade(
            "fk_likes_article_id",
            (Likes::Table, Likes::ArticleId),
            (Articles::Table, Articles::Id),
        )
        .to_string(PostgresQueryBuilder);

        assert!(sql.contains(r#"FOREIGN KEY ("article_id") REFERENCES "articles" ("id")"#));
        assert!(sql.contains("ON DELETE CASCADE"));
        assert!(sql.contains("ON UPDATE CASCADE"));
    }

    #[test]
    fn like_pairs_are_unique() {
        let sql = likes_pair_index().to_string(PostgresQueryBuilder);

        assert!(sql.starts_with("CREATE UNIQUE INDEX"));
        assert!(sql.contains(r#"ON "likes" ("user_id", "article_id")"#));
    }
}
