//! SeaORM transaction plumbing shared by the PostgreSQL repositories.

use async_trait::async_trait;
use sea_orm::{DatabaseTransaction, DbConn, DbErr, SqlErr, TransactionTrait};

use quill_core::error::RepoError;
use quill_core::ports::{
    ArticleRepository, CommentRepository, LikeRepository, Transaction, TransactionManager,
    UserProfilePhotoRepository, UserProfileRepository, UserRepository,
};

/// Opens one `DatabaseTransaction` per service call.
pub struct SeaOrmTransactionManager {
    db: DbConn,
}

impl SeaOrmTransactionManager {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TransactionManager for SeaOrmTransactionManager {
    async fn begin(&self) -> Result<Box<dyn Transaction>, RepoError> {
        let txn = TransactionTrait::begin(&self.db).await.map_err(map_db_err)?;
        Ok(Box::new(PostgresTransaction { txn }))
    }
}

/// An open PostgreSQL transaction. Every repository it hands out is itself,
/// so all statements share the one connection.
///
/// Dropping it uncommitted rolls back (SeaORM issues the rollback on drop).
pub struct PostgresTransaction {
    pub(crate) txn: DatabaseTransaction,
}

#[async_trait]
impl Transaction for PostgresTransaction {
    fn users(&self) -> &dyn UserRepository {
        self
    }

    fn profiles(&self) -> &dyn UserProfileRepository {
        self
    }

    fn photos(&self) -> &dyn UserProfilePhotoRepository {
        self
    }

    fn articles(&self) -> &dyn ArticleRepository {
        self
    }

    fn likes(&self) -> &dyn LikeRepository {
        self
    }

    fn comments(&self) -> &dyn CommentRepository {
        self
    }

    async fn commit(self: Box<Self>) -> Result<(), RepoError> {
        self.txn.commit().await.map_err(map_db_err)
    }

    async fn rollback(self: Box<Self>) -> Result<(), RepoError> {
        self.txn.rollback().await.map_err(map_db_err)
    }
}

/// Classify a SeaORM error by the constraint it violated, if any.
pub(crate) fn map_db_err(err: DbErr) -> RepoError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => RepoError::Constraint(detail),
        Some(SqlErr::ForeignKeyConstraintViolation(detail)) => RepoError::ForeignKey(detail),
        _ => match err {
            DbErr::RecordNotFound(_) | DbErr::RecordNotUpdated => RepoError::NotFound,
            DbErr::Conn(e) => RepoError::Connection(e.to_string()),
            DbErr::ConnectionAcquire(e) => RepoError::Connection(e.to_string()),
            other => RepoError::Query(other.to_string()),
        },
    }
}
