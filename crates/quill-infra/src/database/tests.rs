#[cfg(test)]
mod tests {
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, DbErr, MockDatabase, MockExecResult};

    use crate::database::SeaOrmTransactionManager;
    use crate::database::entity::{article, article_media, user, user_profile};
    use crate::database::postgres_base::map_db_err;
    use quill_core::domain::{ArticleFilter, Role, Visibility};
    use quill_core::error::RepoError;
    use quill_core::ports::TransactionManager;

    fn article_row(id: i64, user_id: i64, published: bool) -> article::Model {
        let now = Utc::now().fixed_offset();
        article::Model {
            id,
            user_id,
            title: format!("Article {id}"),
            description: "Description".to_owned(),
            content: "Content".to_owned(),
            is_published: published,
            created_at: now,
            updated_at: now,
        }
    }

    fn profile_row(user_id: i64, full_name: &str) -> user_profile::Model {
        let now = Utc::now().fixed_offset();
        user_profile::Model {
            user_id,
            full_name: full_name.to_owned(),
            gender: None,
            birth_date: None,
            phone_number: None,
            address: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_find_article_composes_author_and_media() {
        let now = Utc::now().fixed_offset();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![article_row(1, 3, true)]])
            .append_query_results([vec![article_media::Model {
                id: 10,
                article_id: 1,
                media_type: "image/png".to_owned(),
                path: "cover.png".to_owned(),
                created_at: now,
                updated_at: now,
            }]])
            .append_query_results([vec![profile_row(3, "Grace Hopper")]])
            .into_connection();

        let manager = SeaOrmTransactionManager::new(db);
        let tx = manager.begin().await.unwrap();

        let article = tx.articles().find_by_id(1).await.unwrap().unwrap();

        assert_eq!(article.author, "Grace Hopper");
        assert_eq!(article.media.len(), 1);
        assert_eq!(article.media[0].path, "cover.png");
        assert!(article.is_published);
    }

    #[tokio::test]
    async fn test_missing_article_skips_composition() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<article::Model>::new()])
            .into_connection();

        let manager = SeaOrmTransactionManager::new(db);
        let tx = manager.begin().await.unwrap();

        assert!(tx.articles().find_by_id(42).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_keeps_row_order() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![article_row(2, 3, false), article_row(1, 4, false)]])
            .append_query_results([Vec::<article_media::Model>::new()])
            .append_query_results([vec![profile_row(3, "Grace"), profile_row(4, "Alan")]])
            .into_connection();

        let manager = SeaOrmTransactionManager::new(db);
        let tx = manager.begin().await.unwrap();

        let articles = tx
            .articles()
            .find_all(ArticleFilter::with_visibility(Visibility::Draft))
            .await
            .unwrap();

        let ids: Vec<i64> = articles.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![2, 1]);
        assert_eq!(articles[1].author, "Alan");
    }

    #[tokio::test]
    async fn test_find_user_maps_role() {
        let now = Utc::now().fixed_offset();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user::Model {
                id: 1,
                username: "admin001".to_owned(),
                password_hash: "$argon2id$hash".to_owned(),
                role: user::UserRole::Admin,
                created_at: now,
                updated_at: now,
            }]])
            .into_connection();

        let manager = SeaOrmTransactionManager::new(db);
        let tx = manager.begin().await.unwrap();

        let user = tx.users().find_by_username("admin001").await.unwrap().unwrap();
        assert_eq!(user.role, Role::Admin);
    }

    #[tokio::test]
    async fn test_delete_of_missing_row_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();

        let manager = SeaOrmTransactionManager::new(db);
        let tx = manager.begin().await.unwrap();

        let err = tx.comments().delete(5).await.unwrap_err();
        assert!(matches!(err, RepoError::NotFound));
    }

    #[test]
    fn test_db_error_mapping() {
        assert!(matches!(
            map_db_err(DbErr::RecordNotUpdated),
            RepoError::NotFound
        ));
        assert!(matches!(
            map_db_err(DbErr::Custom("boom".to_owned())),
            RepoError::Query(_)
        ));
    }
}
