use uuid::Uuid;

use crate::{
    api::error,
    modules::user::{model::InsertUser, repository::UserRepository, schema::UserEntity},
};

#[derive(Clone)]
pub struct UserRepositoryPg {
    pool: sqlx::PgPool,
    table: String,
}

impl UserRepositoryPg {
    pub fn new(pool: sqlx::PgPool, table: impl Into<String>) -> Self {
        Self { pool, table: table.into() }
    }
}

#[async_trait::async_trait]
impl UserRepository for UserRepositoryPg {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<UserEntity>, error::SystemError> {
        let sql = format!("SELECT * FROM {} WHERE id = $1", self.table);
        let user = sqlx::query_as::<_, UserEntity>(&sql).bind(id).fetch_optional(&self.pool).await?;
        Ok(user)
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserEntity>, error::SystemError> {
        let sql = format!("SELECT * FROM {} WHERE lower(username) = lower($1)", self.table);
        let user = sqlx::query_as::<_, UserEntity>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn create(&self, user: &InsertUser) -> Result<Uuid, error::SystemError> {
        let id = Uuid::new_v7(uuid::Timestamp::now(uuid::NoContext));
        let sql = format!(
            "INSERT INTO {} (id, username, email, hash_password, name) VALUES ($1, $2, $3, $4, $5)",
            self.table
        );
        sqlx::query(&sql)
            .bind(id)
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.hash_password)
            .bind(&user.name)
            .execute(&self.pool)
            .await?;
        Ok(id)
    }
}
