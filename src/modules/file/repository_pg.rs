use chrono::{DateTime, Utc};

use crate::{
    api::error,
    constants::BATCH_SIZE,
    modules::file::{
        repository::{DownloadRepository, FileRepository},
        schema::{download_id_prefix, DownloadRecord, FileRecord},
    },
};

const FILE_COLUMNS: &str = "file_id, recipient_email, owner_id, owner_email, owner_name, filename, \
     size, content_type, date_added, expiry_date, download_limit, notify, date_shared";

#[derive(Clone)]
pub struct FilePgRepository {
    pool: sqlx::PgPool,
    table: String,
}

impl FilePgRepository {
    pub fn new(pool: sqlx::PgPool, table: impl Into<String>) -> Self {
        Self { pool, table: table.into() }
    }
}

#[async_trait::async_trait]
impl FileRepository for FilePgRepository {
    async fn find(
        &self,
        file_id: &str,
        recipient_email: &str,
    ) -> Result<Option<FileRecord>, error::SystemError> {
        let sql = format!(
            "SELECT {FILE_COLUMNS} FROM {} WHERE file_id = $1 AND recipient_email = $2",
            self.table
        );
        let record = sqlx::query_as::<_, FileRecord>(&sql)
            .bind(file_id)
            .bind(recipient_email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(record)
    }

    async fn find_by_file(&self, file_id: &str) -> Result<Vec<FileRecord>, error::SystemError> {
        let sql = format!("SELECT {FILE_COLUMNS} FROM {} WHERE file_id = $1", self.table);
        let records =
            sqlx::query_as::<_, FileRecord>(&sql).bind(file_id).fetch_all(&self.pool).await?;

        Ok(records)
    }

    async fn find_by_owner(&self, owner_id: &str) -> Result<Vec<FileRecord>, error::SystemError> {
        let sql = format!(
            "SELECT {FILE_COLUMNS} FROM {} WHERE owner_id = $1 ORDER BY date_added DESC",
            self.table
        );
        let records =
            sqlx::query_as::<_, FileRecord>(&sql).bind(owner_id).fetch_all(&self.pool).await?;

        Ok(records)
    }

    async fn find_by_recipient(
        &self,
        recipient_email: &str,
    ) -> Result<Vec<FileRecord>, error::SystemError> {
        let sql = format!(
            "SELECT {FILE_COLUMNS} FROM {} WHERE recipient_email = $1 ORDER BY date_shared DESC",
            self.table
        );
        let records = sqlx::query_as::<_, FileRecord>(&sql)
            .bind(recipient_email)
            .fetch_all(&self.pool)
            .await?;

        Ok(records)
    }

    async fn put_many(&self, records: &[FileRecord]) -> Result<(), error::SystemError> {
        for batch in records.chunks(BATCH_SIZE) {
            let mut builder = sqlx::QueryBuilder::<sqlx::Postgres>::new(format!(
                "INSERT INTO {} ({FILE_COLUMNS}) ",
                self.table
            ));
            builder.push_values(batch, |mut row, record| {
                row.push_bind(&record.file_id)
                    .push_bind(&record.recipient_email)
                    .push_bind(&record.owner_id)
                    .push_bind(&record.owner_email)
                    .push_bind(&record.owner_name)
                    .push_bind(&record.filename)
                    .push_bind(record.size)
                    .push_bind(&record.content_type)
                    .push_bind(record.date_added)
                    .push_bind(record.expiry_date)
                    .push_bind(record.download_limit)
                    .push_bind(record.notify)
                    .push_bind(record.date_shared);
            });
            builder.push(
                r#"
                ON CONFLICT (file_id, recipient_email) DO UPDATE SET
                    owner_id       = EXCLUDED.owner_id,
                    owner_email    = EXCLUDED.owner_email,
                    owner_name     = EXCLUDED.owner_name,
                    filename       = EXCLUDED.filename,
                    size           = EXCLUDED.size,
                    content_type   = EXCLUDED.content_type,
                    date_added     = EXCLUDED.date_added,
                    expiry_date    = EXCLUDED.expiry_date,
                    download_limit = EXCLUDED.download_limit,
                    notify         = EXCLUDED.notify,
                    date_shared    = EXCLUDED.date_shared
                "#,
            );
            builder.build().execute(&self.pool).await?;
        }

        Ok(())
    }

    async fn delete_many(
        &self,
        file_id: &str,
        recipient_emails: &[String],
    ) -> Result<u64, error::SystemError> {
        let sql = format!(
            "DELETE FROM {} WHERE file_id = $1 AND recipient_email = ANY($2)",
            self.table
        );
        let rows = sqlx::query(&sql)
            .bind(file_id)
            .bind(recipient_emails)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(rows)
    }
}

#[derive(Clone)]
pub struct DownloadPgRepository {
    pool: sqlx::PgPool,
    table: String,
}

impl DownloadPgRepository {
    pub fn new(pool: sqlx::PgPool, table: impl Into<String>) -> Self {
        Self { pool, table: table.into() }
    }
}

/// Two downloads in the same millisecond share a key; the second write is a no-op.
fn insert_download_sql(table: &str) -> String {
    format!(
        "INSERT INTO {table} (file_id, download_id, user_id, date_time_stamp, expires_at) \
         VALUES ($1, $2, $3, $4, $5) \
         ON CONFLICT (file_id, download_id) DO NOTHING"
    )
}

fn escape_like(value: &str) -> String {
    value.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

#[async_trait::async_trait]
impl DownloadRepository for DownloadPgRepository {
    async fn create(&self, record: &DownloadRecord) -> Result<(), error::SystemError> {
        let sql = insert_download_sql(&self.table);
        sqlx::query(&sql)
            .bind(&record.file_id)
            .bind(&record.download_id)
            .bind(&record.user_id)
            .bind(record.date_time_stamp)
            .bind(record.expires_at)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn count(&self, file_id: &str, user_id: &str) -> Result<i64, error::SystemError> {
        let sql = format!(
            "SELECT COUNT(*) FROM {} WHERE file_id = $1 AND download_id LIKE $2",
            self.table
        );
        let pattern = format!("{}%", escape_like(&download_id_prefix(user_id)));
        let count: i64 = sqlx::query_scalar(&sql)
            .bind(file_id)
            .bind(pattern)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, error::SystemError> {
        let sql = format!("DELETE FROM {} WHERE expires_at <= $1", self.table);
        let rows = sqlx::query(&sql).bind(now).execute(&self.pool).await?.rows_affected();

        Ok(rows)
    }
}
