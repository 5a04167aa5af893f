//! Statistics repository: chats, users, counters, API usage and message history.
//!
//! Every write runs in a single transaction. Counters only ever change through `+ 1` upserts,
//! so concurrent calls for the same chat never lose increments.

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, instrument};

use crate::error::StorageError;
use crate::models::{
    ApiProvider, ChatInfo, ChatStats, GlobalStats, MemberStats, MessageRecord, ProviderUsage,
    SenderCount, Stats, StatsTarget, UserInfo, UserStats,
};
use crate::sqlite_pool::SqlitePoolManager;

type Result<T> = std::result::Result<T, StorageError>;

#[derive(Clone)]
pub struct StatsRepository {
    pool_manager: SqlitePoolManager,
}

impl StatsRepository {
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool_manager = SqlitePoolManager::new(database_url).await?;
        let repo = Self { pool_manager };
        repo.init().await?;
        Ok(repo)
    }

    async fn init(&self) -> Result<()> {
        info!("Creating database tables if not exist");

        let pool = self.pool_manager.pool();

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS chats (
                chat_id INTEGER PRIMARY KEY,
                title TEXT,
                message_count INTEGER NOT NULL DEFAULT 0,
                api_call_count INTEGER NOT NULL DEFAULT 0,
                reset_id INTEGER NOT NULL DEFAULT 0,
                first_seen TEXT NOT NULL,
                last_seen TEXT NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                user_id INTEGER PRIMARY KEY,
                display_name TEXT NOT NULL,
                username TEXT,
                first_seen TEXT NOT NULL,
                last_seen TEXT NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS chat_users (
                chat_id INTEGER NOT NULL REFERENCES chats(chat_id),
                user_id INTEGER NOT NULL REFERENCES users(user_id),
                message_count INTEGER NOT NULL DEFAULT 0,
                api_call_count INTEGER NOT NULL DEFAULT 0,
                PRIMARY KEY (chat_id, user_id)
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS api_usage (
                chat_id INTEGER NOT NULL REFERENCES chats(chat_id),
                user_id INTEGER NOT NULL REFERENCES users(user_id),
                provider TEXT NOT NULL,
                call_count INTEGER NOT NULL DEFAULT 0,
                last_called TEXT NOT NULL,
                PRIMARY KEY (chat_id, user_id, provider)
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS messages (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                chat_id INTEGER NOT NULL REFERENCES chats(chat_id),
                user_id INTEGER NOT NULL REFERENCES users(user_id),
                message_id TEXT NOT NULL,
                text TEXT NOT NULL,
                reply TEXT,
                reset_id INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_messages_chat_reset ON messages(chat_id, reset_id);
            CREATE INDEX IF NOT EXISTS idx_messages_created_at ON messages(created_at);
            CREATE INDEX IF NOT EXISTS idx_messages_user_id ON messages(user_id);
            "#,
        )
        .execute(pool)
        .await?;

        info!("Database tables created successfully");
        Ok(())
    }

    /// Upserts chat and user, increments the chat and chat-user message counters and appends a
    /// MessageRecord in the chat's current context generation. Returns the record id.
    #[instrument(skip(self, chat, user, text, reply), fields(chat_id = chat.chat_id, user_id = user.user_id))]
    pub async fn record_message(
        &self,
        chat: &ChatInfo,
        user: &UserInfo,
        message_id: &str,
        text: &str,
        reply: Option<&str>,
    ) -> Result<i64> {
        let now = Utc::now();
        let mut tx = self.pool_manager.pool().begin().await?;

        sqlx::query(
            r#"
            INSERT INTO chats (chat_id, title, message_count, api_call_count, reset_id, first_seen, last_seen)
            VALUES (?, ?, 1, 0, 0, ?, ?)
            ON CONFLICT(chat_id) DO UPDATE SET
                message_count = chats.message_count + 1,
                title = COALESCE(excluded.title, chats.title),
                last_seen = excluded.last_seen
            "#,
        )
        .bind(chat.chat_id)
        .bind(&chat.title)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        upsert_user(&mut tx, user, now).await?;

        sqlx::query(
            r#"
            INSERT INTO chat_users (chat_id, user_id, message_count, api_call_count)
            VALUES (?, ?, 1, 0)
            ON CONFLICT(chat_id, user_id) DO UPDATE SET
                message_count = chat_users.message_count + 1
            "#,
        )
        .bind(chat.chat_id)
        .bind(user.user_id)
        .execute(&mut *tx)
        .await?;

        let (reset_id,): (i64,) = sqlx::query_as("SELECT reset_id FROM chats WHERE chat_id = ?")
            .bind(chat.chat_id)
            .fetch_one(&mut *tx)
            .await?;

        let result = sqlx::query(
            r#"
            INSERT INTO messages (chat_id, user_id, message_id, text, reply, reset_id, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(chat.chat_id)
        .bind(user.user_id)
        .bind(message_id)
        .bind(text)
        .bind(reply)
        .bind(reset_id)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        let id = result.last_insert_rowid();
        debug!(record_id = id, reset_id = reset_id, "Recorded message");
        Ok(id)
    }

    /// Attaches the bot's reply to an already recorded message.
    pub async fn attach_reply(&self, record_id: i64, reply: &str) -> Result<()> {
        let result = sqlx::query("UPDATE messages SET reply = ? WHERE id = ?")
            .bind(reply)
            .bind(record_id)
            .execute(self.pool_manager.pool())
            .await?;
        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(format!("message record {}", record_id)));
        }
        Ok(())
    }

    /// Counts one call to `provider` on behalf of `user` in `chat` (chat, chat-user and per-provider counters).
    #[instrument(skip(self, chat, user), fields(chat_id = chat.chat_id, user_id = user.user_id))]
    pub async fn increment_api_usage(
        &self,
        chat: &ChatInfo,
        user: &UserInfo,
        provider: ApiProvider,
    ) -> Result<()> {
        let now = Utc::now();
        let mut tx = self.pool_manager.pool().begin().await?;

        sqlx::query(
            r#"
            INSERT INTO chats (chat_id, title, message_count, api_call_count, reset_id, first_seen, last_seen)
            VALUES (?, ?, 0, 1, 0, ?, ?)
            ON CONFLICT(chat_id) DO UPDATE SET
                api_call_count = chats.api_call_count + 1,
                title = COALESCE(excluded.title, chats.title),
                last_seen = excluded.last_seen
            "#,
        )
        .bind(chat.chat_id)
        .bind(&chat.title)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        upsert_user(&mut tx, user, now).await?;

        sqlx::query(
            r#"
            INSERT INTO chat_users (chat_id, user_id, message_count, api_call_count)
            VALUES (?, ?, 0, 1)
            ON CONFLICT(chat_id, user_id) DO UPDATE SET
                api_call_count = chat_users.api_call_count + 1
            "#,
        )
        .bind(chat.chat_id)
        .bind(user.user_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO api_usage (chat_id, user_id, provider, call_count, last_called)
            VALUES (?, ?, ?, 1, ?)
            ON CONFLICT(chat_id, user_id, provider) DO UPDATE SET
                call_count = api_usage.call_count + 1,
                last_called = excluded.last_called
            "#,
        )
        .bind(chat.chat_id)
        .bind(user.user_id)
        .bind(provider.as_str())
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        debug!(provider = %provider, "API usage incremented");
        Ok(())
    }

    /// Most recent `limit` records of the chat's current context generation, oldest first.
    pub async fn get_recent(&self, chat_id: i64, limit: i64) -> Result<Vec<MessageRecord>> {
        let mut records: Vec<MessageRecord> = sqlx::query_as::<_, MessageRecord>(
            r#"
            SELECT m.id, m.chat_id, m.user_id, m.message_id, m.text, m.reply, m.reset_id, m.created_at
            FROM messages m
            JOIN chats c ON c.chat_id = m.chat_id
            WHERE m.chat_id = ? AND m.reset_id = c.reset_id
            ORDER BY m.id DESC
            LIMIT ?
            "#,
        )
        .bind(chat_id)
        .bind(limit)
        .fetch_all(self.pool_manager.pool())
        .await?;

        records.reverse();
        debug!(chat_id = chat_id, count = records.len(), "Retrieved recent messages");
        Ok(records)
    }

    /// Counters for a chat or for one user within a chat. `None` if the chat/user was never seen.
    pub async fn get_stats(&self, target: StatsTarget) -> Result<Option<Stats>> {
        let mut tx = self.pool_manager.pool().begin().await?;

        let stats = match target {
            StatsTarget::Chat(chat_id) => sqlx::query_as::<_, ChatStats>(
                r#"
                SELECT c.chat_id, c.title, c.message_count, c.api_call_count,
                    (SELECT COUNT(*) FROM chat_users cu WHERE cu.chat_id = c.chat_id) AS user_count,
                    c.reset_id, c.first_seen, c.last_seen
                FROM chats c
                WHERE c.chat_id = ?
                "#,
            )
            .bind(chat_id)
            .fetch_optional(&mut *tx)
            .await?
            .map(Stats::Chat),
            StatsTarget::User { chat_id, user_id } => {
                let row: Option<(String, i64, i64)> = sqlx::query_as(
                    r#"
                    SELECT u.display_name, cu.message_count, cu.api_call_count
                    FROM chat_users cu
                    JOIN users u ON u.user_id = cu.user_id
                    WHERE cu.chat_id = ? AND cu.user_id = ?
                    "#,
                )
                .bind(chat_id)
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await?;

                match row {
                    Some((display_name, message_count, api_call_count)) => {
                        let providers = sqlx::query_as::<_, ProviderUsage>(
                            r#"
                            SELECT provider, call_count FROM api_usage
                            WHERE chat_id = ? AND user_id = ?
                            ORDER BY provider
                            "#,
                        )
                        .bind(chat_id)
                        .bind(user_id)
                        .fetch_all(&mut *tx)
                        .await?;
                        Some(Stats::User(UserStats {
                            chat_id,
                            user_id,
                            display_name,
                            message_count,
                            api_call_count,
                            providers,
                        }))
                    }
                    None => None,
                }
            }
        };

        tx.commit().await?;
        Ok(stats)
    }

    /// Starts a new context generation for the chat; older records no longer feed the AI.
    pub async fn reset_context(&self, chat_id: i64) -> Result<i64> {
        let row: Option<(i64,)> = sqlx::query_as(
            "UPDATE chats SET reset_id = reset_id + 1 WHERE chat_id = ? RETURNING reset_id",
        )
        .bind(chat_id)
        .fetch_optional(self.pool_manager.pool())
        .await?;

        match row {
            Some((reset_id,)) => {
                info!(chat_id = chat_id, reset_id = reset_id, "Chat context reset");
                Ok(reset_id)
            }
            None => Err(StorageError::NotFound(format!("chat {}", chat_id))),
        }
    }

    /// Number of stored messages in the chat since `since` (all stored messages when `None`).
    pub async fn message_count_since(
        &self,
        chat_id: i64,
        since: Option<DateTime<Utc>>,
    ) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM messages WHERE chat_id = ? AND (? IS NULL OR created_at >= ?)",
        )
        .bind(chat_id)
        .bind(since)
        .bind(since)
        .fetch_one(self.pool_manager.pool())
        .await?;
        Ok(count)
    }

    /// Top senders of the chat by stored messages since `since`.
    pub async fn sender_counts(
        &self,
        chat_id: i64,
        since: Option<DateTime<Utc>>,
        limit: i64,
    ) -> Result<Vec<SenderCount>> {
        let rows = sqlx::query_as::<_, SenderCount>(
            r#"
            SELECT m.user_id, u.display_name, COUNT(*) AS message_count
            FROM messages m
            JOIN users u ON u.user_id = m.user_id
            WHERE m.chat_id = ? AND (? IS NULL OR m.created_at >= ?)
            GROUP BY m.user_id, u.display_name
            ORDER BY message_count DESC, m.user_id ASC
            LIMIT ?
            "#,
        )
        .bind(chat_id)
        .bind(since)
        .bind(since)
        .bind(limit)
        .fetch_all(self.pool_manager.pool())
        .await?;
        Ok(rows)
    }

    /// All-time counters of chat members, most active first.
    pub async fn chat_members(&self, chat_id: i64, limit: i64) -> Result<Vec<MemberStats>> {
        let rows = sqlx::query_as::<_, MemberStats>(
            r#"
            SELECT cu.user_id, u.display_name, cu.message_count, cu.api_call_count
            FROM chat_users cu
            JOIN users u ON u.user_id = cu.user_id
            WHERE cu.chat_id = ?
            ORDER BY cu.message_count DESC, cu.user_id ASC
            LIMIT ?
            "#,
        )
        .bind(chat_id)
        .bind(limit)
        .fetch_all(self.pool_manager.pool())
        .await?;
        Ok(rows)
    }

    pub async fn global_stats(&self) -> Result<GlobalStats> {
        let (chats, users, messages, api_calls, stored_messages): (i64, i64, i64, i64, i64) =
            sqlx::query_as(
                r#"
                SELECT
                    (SELECT COUNT(*) FROM chats),
                    (SELECT COUNT(*) FROM users),
                    (SELECT COALESCE(SUM(message_count), 0) FROM chats),
                    (SELECT COALESCE(SUM(api_call_count), 0) FROM chats),
                    (SELECT COUNT(*) FROM messages)
                "#,
            )
            .fetch_one(self.pool_manager.pool())
            .await?;
        Ok(GlobalStats {
            chats,
            users,
            messages,
            api_calls,
            stored_messages,
        })
    }

    /// Records created at or after `since`, in insertion order (used by the export job).
    pub async fn messages_since(&self, since: DateTime<Utc>) -> Result<Vec<MessageRecord>> {
        let records = sqlx::query_as::<_, MessageRecord>(
            r#"
            SELECT id, chat_id, user_id, message_id, text, reply, reset_id, created_at
            FROM messages
            WHERE created_at >= ?
            ORDER BY id ASC
            "#,
        )
        .bind(since)
        .fetch_all(self.pool_manager.pool())
        .await?;
        info!(count = records.len(), "Retrieved messages for export");
        Ok(records)
    }

    /// Deletes message records older than `days`. Counters are untouched.
    pub async fn cleanup_older_than(&self, days: i64) -> Result<u64> {
        let cutoff = Utc::now() - Duration::days(days);

        let result = sqlx::query("DELETE FROM messages WHERE created_at < ?")
            .bind(cutoff)
            .execute(self.pool_manager.pool())
            .await?;

        info!(
            deleted = result.rows_affected(),
            days = days,
            "Deleted old messages"
        );
        Ok(result.rows_affected())
    }

    /// Round-trip query used by the health check job and `/test`.
    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(self.pool_manager.pool()).await?;
        Ok(())
    }
}

async fn upsert_user(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    user: &UserInfo,
    now: DateTime<Utc>,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO users (user_id, display_name, username, first_seen, last_seen)
        VALUES (?, ?, ?, ?, ?)
        ON CONFLICT(user_id) DO UPDATE SET
            display_name = excluded.display_name,
            username = excluded.username,
            last_seen = excluded.last_seen
        "#,
    )
    .bind(user.user_id)
    .bind(&user.display_name)
    .bind(&user.username)
    .bind(now)
    .bind(now)
    .execute(&mut **tx)
    .await?;
    Ok(())
}
