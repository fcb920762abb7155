use crate::db::models::{DbContactMessage, DbGalleryItem, DbReference, DbUser};
use crate::db::patch::{
    ContactMessageCreate, GalleryItemCreate, RecordPatch, ReferenceCreate, UserCreate,
};
use crate::db::schema::SQLITE_INIT;
use crate::db::traits::DbPatchable;
use crate::error::CmsError;
use chrono::Utc;
use ractor::{Actor, ActorProcessingErr, ActorRef, RpcReplyPort};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use std::{str::FromStr, time::Duration};
use tracing::info;
use uuid::Uuid;

#[derive(Debug)]
pub enum DbActorMessage {
    /// Create a client reference and return the stored row.
    CreateReference(ReferenceCreate, RpcReplyPort<Result<DbReference, CmsError>>),

    /// List references, optionally filtered by industry tag.
    ListReferences(
        Option<String>,
        RpcReplyPort<Result<Vec<DbReference>, CmsError>>,
    ),

    /// Get a reference by id.
    GetReference(Uuid, RpcReplyPort<Result<DbReference, CmsError>>),

    /// Delete a reference row by id.
    DeleteReference(Uuid, RpcReplyPort<Result<(), CmsError>>),

    /// Create a gallery item and return the stored row.
    CreateGalleryItem(
        GalleryItemCreate,
        RpcReplyPort<Result<DbGalleryItem, CmsError>>,
    ),

    /// List gallery items, optionally filtered by category tag.
    ListGalleryItems(
        Option<String>,
        RpcReplyPort<Result<Vec<DbGalleryItem>, CmsError>>,
    ),

    /// Get a gallery item by id.
    GetGalleryItem(Uuid, RpcReplyPort<Result<DbGalleryItem, CmsError>>),

    /// Delete a gallery item row by id.
    DeleteGalleryItem(Uuid, RpcReplyPort<Result<(), CmsError>>),

    /// Patch a reference or gallery item by id.
    Patch(RecordPatch, RpcReplyPort<Result<(), CmsError>>),

    /// Store an inbound contact message and return the stored row.
    CreateContactMessage(
        ContactMessageCreate,
        RpcReplyPort<Result<DbContactMessage, CmsError>>,
    ),

    /// List contact messages, optionally only unread ones.
    ListContactMessages(bool, RpcReplyPort<Result<Vec<DbContactMessage>, CmsError>>),

    /// Get a contact message by id.
    GetContactMessage(Uuid, RpcReplyPort<Result<DbContactMessage, CmsError>>),

    /// Flip a contact message to read.
    MarkMessageRead(Uuid, RpcReplyPort<Result<(), CmsError>>),

    /// Delete a contact message row by id.
    DeleteContactMessage(Uuid, RpcReplyPort<Result<(), CmsError>>),

    /// Count unread contact messages.
    CountUnreadMessages(RpcReplyPort<Result<i64, CmsError>>),

    /// Create a user account and return the stored row.
    CreateUser(UserCreate, RpcReplyPort<Result<DbUser, CmsError>>),

    /// Look up a user by username.
    FindUserByUsername(String, RpcReplyPort<Result<Option<DbUser>, CmsError>>),

    /// Whether a username is already taken.
    UsernameExists(String, RpcReplyPort<Result<bool, CmsError>>),

    /// Whether an email is already in use.
    EmailExists(String, RpcReplyPort<Result<bool, CmsError>>),
}

#[derive(Clone)]
pub struct DbHandle {
    actor: ActorRef<DbActorMessage>,
}

impl DbHandle {
    pub async fn create_reference(&self, create: ReferenceCreate) -> Result<DbReference, CmsError> {
        ractor::call!(self.actor, DbActorMessage::CreateReference, create)
            .map_err(|e| CmsError::Actor(format!("DbActor CreateReference RPC failed: {e}")))?
    }

    pub async fn list_references(
        &self,
        industry: Option<String>,
    ) -> Result<Vec<DbReference>, CmsError> {
        ractor::call!(self.actor, DbActorMessage::ListReferences, industry)
            .map_err(|e| CmsError::Actor(format!("DbActor ListReferences RPC failed: {e}")))?
    }

    pub async fn get_reference(&self, id: Uuid) -> Result<DbReference, CmsError> {
        ractor::call!(self.actor, DbActorMessage::GetReference, id)
            .map_err(|e| CmsError::Actor(format!("DbActor GetReference RPC failed: {e}")))?
    }

    pub async fn delete_reference(&self, id: Uuid) -> Result<(), CmsError> {
        ractor::call!(self.actor, DbActorMessage::DeleteReference, id)
            .map_err(|e| CmsError::Actor(format!("DbActor DeleteReference RPC failed: {e}")))?
    }

    pub async fn create_gallery_item(
        &self,
        create: GalleryItemCreate,
    ) -> Result<DbGalleryItem, CmsError> {
        ractor::call!(self.actor, DbActorMessage::CreateGalleryItem, create)
            .map_err(|e| CmsError::Actor(format!("DbActor CreateGalleryItem RPC failed: {e}")))?
    }

    pub async fn list_gallery_items(
        &self,
        category: Option<String>,
    ) -> Result<Vec<DbGalleryItem>, CmsError> {
        ractor::call!(self.actor, DbActorMessage::ListGalleryItems, category)
            .map_err(|e| CmsError::Actor(format!("DbActor ListGalleryItems RPC failed: {e}")))?
    }

    pub async fn get_gallery_item(&self, id: Uuid) -> Result<DbGalleryItem, CmsError> {
        ractor::call!(self.actor, DbActorMessage::GetGalleryItem, id)
            .map_err(|e| CmsError::Actor(format!("DbActor GetGalleryItem RPC failed: {e}")))?
    }

    pub async fn delete_gallery_item(&self, id: Uuid) -> Result<(), CmsError> {
        ractor::call!(self.actor, DbActorMessage::DeleteGalleryItem, id)
            .map_err(|e| CmsError::Actor(format!("DbActor DeleteGalleryItem RPC failed: {e}")))?
    }

    pub async fn patch(&self, patch: RecordPatch) -> Result<(), CmsError> {
        ractor::call!(self.actor, DbActorMessage::Patch, patch)
            .map_err(|e| CmsError::Actor(format!("DbActor Patch RPC failed: {e}")))?
    }

    pub async fn create_contact_message(
        &self,
        create: ContactMessageCreate,
    ) -> Result<DbContactMessage, CmsError> {
        ractor::call!(self.actor, DbActorMessage::CreateContactMessage, create)
            .map_err(|e| CmsError::Actor(format!("DbActor CreateContactMessage RPC failed: {e}")))?
    }

    pub async fn list_contact_messages(
        &self,
        unread_only: bool,
    ) -> Result<Vec<DbContactMessage>, CmsError> {
        ractor::call!(self.actor, DbActorMessage::ListContactMessages, unread_only)
            .map_err(|e| CmsError::Actor(format!("DbActor ListContactMessages RPC failed: {e}")))?
    }

    pub async fn get_contact_message(&self, id: Uuid) -> Result<DbContactMessage, CmsError> {
        ractor::call!(self.actor, DbActorMessage::GetContactMessage, id)
            .map_err(|e| CmsError::Actor(format!("DbActor GetContactMessage RPC failed: {e}")))?
    }

    pub async fn mark_message_read(&self, id: Uuid) -> Result<(), CmsError> {
        ractor::call!(self.actor, DbActorMessage::MarkMessageRead, id)
            .map_err(|e| CmsError::Actor(format!("DbActor MarkMessageRead RPC failed: {e}")))?
    }

    pub async fn delete_contact_message(&self, id: Uuid) -> Result<(), CmsError> {
        ractor::call!(self.actor, DbActorMessage::DeleteContactMessage, id)
            .map_err(|e| CmsError::Actor(format!("DbActor DeleteContactMessage RPC failed: {e}")))?
    }

    pub async fn count_unread_messages(&self) -> Result<i64, CmsError> {
        ractor::call!(self.actor, DbActorMessage::CountUnreadMessages)
            .map_err(|e| CmsError::Actor(format!("DbActor CountUnreadMessages RPC failed: {e}")))?
    }

    pub async fn create_user(&self, create: UserCreate) -> Result<DbUser, CmsError> {
        ractor::call!(self.actor, DbActorMessage::CreateUser, create)
            .map_err(|e| CmsError::Actor(format!("DbActor CreateUser RPC failed: {e}")))?
    }

    pub async fn find_user_by_username(&self, username: &str) -> Result<Option<DbUser>, CmsError> {
        ractor::call!(
            self.actor,
            DbActorMessage::FindUserByUsername,
            username.to_string()
        )
        .map_err(|e| CmsError::Actor(format!("DbActor FindUserByUsername RPC failed: {e}")))?
    }

    pub async fn username_exists(&self, username: &str) -> Result<bool, CmsError> {
        ractor::call!(
            self.actor,
            DbActorMessage::UsernameExists,
            username.to_string()
        )
        .map_err(|e| CmsError::Actor(format!("DbActor UsernameExists RPC failed: {e}")))?
    }

    pub async fn email_exists(&self, email: &str) -> Result<bool, CmsError> {
        ractor::call!(self.actor, DbActorMessage::EmailExists, email.to_string())
            .map_err(|e| CmsError::Actor(format!("DbActor EmailExists RPC failed: {e}")))?
    }
}

struct DbActorState {
    pool: SqlitePool,
}

struct DbActor;

#[ractor::async_trait]
impl Actor for DbActor {
    type Msg = DbActorMessage;
    type State = DbActorState;
    type Arguments = String;

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        database_url: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        let connect_opts = SqliteConnectOptions::from_str(database_url.as_str())
            .map_err(|e| ActorProcessingErr::from(format!("invalid database url: {e}")))?
            .create_if_missing(true)
            .busy_timeout(Duration::from_secs(5))
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .connect_with(connect_opts)
            .await
            .map_err(|e| ActorProcessingErr::from(format!("db connect failed: {e}")))?;

        apply_schema(&pool)
            .await
            .map_err(|e| ActorProcessingErr::from(format!("db schema init failed: {e}")))?;

        info!("DbActor initialized");
        Ok(DbActorState { pool })
    }

    async fn handle(
        &self,
        _myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            DbActorMessage::CreateReference(create, reply) => {
                let res = self.create_reference(&state.pool, create).await;
                let _ = reply.send(res);
            }
            DbActorMessage::ListReferences(industry, reply) => {
                let res = self.list_references(&state.pool, industry).await;
                let _ = reply.send(res);
            }
            DbActorMessage::GetReference(id, reply) => {
                let res = self.get_reference(&state.pool, id).await;
                let _ = reply.send(res);
            }
            DbActorMessage::DeleteReference(id, reply) => {
                let res = delete_by_id(&state.pool, "client_references", id).await;
                let _ = reply.send(res);
            }
            DbActorMessage::CreateGalleryItem(create, reply) => {
                let res = self.create_gallery_item(&state.pool, create).await;
                let _ = reply.send(res);
            }
            DbActorMessage::ListGalleryItems(category, reply) => {
                let res = self.list_gallery_items(&state.pool, category).await;
                let _ = reply.send(res);
            }
            DbActorMessage::GetGalleryItem(id, reply) => {
                let res = self.get_gallery_item(&state.pool, id).await;
                let _ = reply.send(res);
            }
            DbActorMessage::DeleteGalleryItem(id, reply) => {
                let res = delete_by_id(&state.pool, "gallery_items", id).await;
                let _ = reply.send(res);
            }
            DbActorMessage::Patch(patch, reply) => {
                let res = patch.apply_patch(&state.pool).await;
                let _ = reply.send(res);
            }
            DbActorMessage::CreateContactMessage(create, reply) => {
                let res = self.create_contact_message(&state.pool, create).await;
                let _ = reply.send(res);
            }
            DbActorMessage::ListContactMessages(unread_only, reply) => {
                let res = self.list_contact_messages(&state.pool, unread_only).await;
                let _ = reply.send(res);
            }
            DbActorMessage::GetContactMessage(id, reply) => {
                let res = self.get_contact_message(&state.pool, id).await;
                let _ = reply.send(res);
            }
            DbActorMessage::MarkMessageRead(id, reply) => {
                let res = self.mark_message_read(&state.pool, id).await;
                let _ = reply.send(res);
            }
            DbActorMessage::DeleteContactMessage(id, reply) => {
                let res = delete_by_id(&state.pool, "contact_messages", id).await;
                let _ = reply.send(res);
            }
            DbActorMessage::CountUnreadMessages(reply) => {
                let res = self.count_unread_messages(&state.pool).await;
                let _ = reply.send(res);
            }
            DbActorMessage::CreateUser(create, reply) => {
                let res = self.create_user(&state.pool, create).await;
                let _ = reply.send(res);
            }
            DbActorMessage::FindUserByUsername(username, reply) => {
                let res = self.find_user_by_username(&state.pool, &username).await;
                let _ = reply.send(res);
            }
            DbActorMessage::UsernameExists(username, reply) => {
                let res = exists(&state.pool, "SELECT COUNT(*) FROM users WHERE username = ?", &username).await;
                let _ = reply.send(res);
            }
            DbActorMessage::EmailExists(email, reply) => {
                let res = exists(&state.pool, "SELECT COUNT(*) FROM users WHERE email = ?", &email).await;
                let _ = reply.send(res);
            }
        }
        Ok(())
    }
}

impl DbActor {
    async fn create_reference(
        &self,
        pool: &SqlitePool,
        create: ReferenceCreate,
    ) -> Result<DbReference, CmsError> {
        let row = DbReference {
            id: Uuid::new_v4(),
            name: create.name,
            website_url: create.website_url,
            logo_url: create.logo_url,
            industry: create.industry,
            description: create.description,
            display_order: create.display_order.unwrap_or(0),
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
        INSERT INTO client_references (
            id, name, website_url, logo_url, industry, description, display_order, created_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
        )
        .bind(row.id)
        .bind(&row.name)
        .bind(&row.website_url)
        .bind(&row.logo_url)
        .bind(&row.industry)
        .bind(&row.description)
        .bind(row.display_order)
        .bind(row.created_at)
        .execute(pool)
        .await?;

        Ok(row)
    }

    async fn list_references(
        &self,
        pool: &SqlitePool,
        industry: Option<String>,
    ) -> Result<Vec<DbReference>, CmsError> {
        let rows = match industry {
            Some(tag) => {
                sqlx::query_as::<_, DbReference>(
                    r#"
                SELECT id, name, website_url, logo_url, industry, description, display_order, created_at
                FROM client_references
                WHERE industry = ?
                ORDER BY display_order ASC, created_at DESC
                "#,
                )
                .bind(tag)
                .fetch_all(pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, DbReference>(
                    r#"
                SELECT id, name, website_url, logo_url, industry, description, display_order, created_at
                FROM client_references
                ORDER BY display_order ASC, created_at DESC
                "#,
                )
                .fetch_all(pool)
                .await?
            }
        };

        Ok(rows)
    }

    async fn get_reference(&self, pool: &SqlitePool, id: Uuid) -> Result<DbReference, CmsError> {
        sqlx::query_as::<_, DbReference>(
            r#"
        SELECT id, name, website_url, logo_url, industry, description, display_order, created_at
        FROM client_references
        WHERE id = ?
        "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| CmsError::NotFound(format!("Reference not found with id: {id}")))
    }

    async fn create_gallery_item(
        &self,
        pool: &SqlitePool,
        create: GalleryItemCreate,
    ) -> Result<DbGalleryItem, CmsError> {
        let row = DbGalleryItem {
            id: Uuid::new_v4(),
            title: create.title,
            image_url: create.image_url,
            thumbnail_url: create.thumbnail_url,
            category: create.category,
            description: create.description,
            display_order: create.display_order.unwrap_or(0),
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
        INSERT INTO gallery_items (
            id, title, image_url, thumbnail_url, category, description, display_order, created_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
        )
        .bind(row.id)
        .bind(&row.title)
        .bind(&row.image_url)
        .bind(&row.thumbnail_url)
        .bind(&row.category)
        .bind(&row.description)
        .bind(row.display_order)
        .bind(row.created_at)
        .execute(pool)
        .await?;

        Ok(row)
    }

    async fn list_gallery_items(
        &self,
        pool: &SqlitePool,
        category: Option<String>,
    ) -> Result<Vec<DbGalleryItem>, CmsError> {
        let rows = match category {
            Some(tag) => {
                sqlx::query_as::<_, DbGalleryItem>(
                    r#"
                SELECT id, title, image_url, thumbnail_url, category, description, display_order, created_at
                FROM gallery_items
                WHERE category = ?
                ORDER BY display_order ASC, created_at DESC
                "#,
                )
                .bind(tag)
                .fetch_all(pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, DbGalleryItem>(
                    r#"
                SELECT id, title, image_url, thumbnail_url, category, description, display_order, created_at
                FROM gallery_items
                ORDER BY display_order ASC, created_at DESC
                "#,
                )
                .fetch_all(pool)
                .await?
            }
        };

        Ok(rows)
    }

    async fn get_gallery_item(
        &self,
        pool: &SqlitePool,
        id: Uuid,
    ) -> Result<DbGalleryItem, CmsError> {
        sqlx::query_as::<_, DbGalleryItem>(
            r#"
        SELECT id, title, image_url, thumbnail_url, category, description, display_order, created_at
        FROM gallery_items
        WHERE id = ?
        "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| CmsError::NotFound(format!("Gallery item not found with id: {id}")))
    }

    async fn create_contact_message(
        &self,
        pool: &SqlitePool,
        create: ContactMessageCreate,
    ) -> Result<DbContactMessage, CmsError> {
        let row = DbContactMessage {
            id: Uuid::new_v4(),
            name: create.name,
            company: create.company,
            email: create.email,
            phone: create.phone,
            message: create.message,
            attachment_url: create.attachment_url,
            attachment_filename: create.attachment_filename,
            is_read: false,
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
        INSERT INTO contact_messages (
            id, name, company, email, phone, message, attachment_url, attachment_filename, is_read, created_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, 0, ?)
        "#,
        )
        .bind(row.id)
        .bind(&row.name)
        .bind(&row.company)
        .bind(&row.email)
        .bind(&row.phone)
        .bind(&row.message)
        .bind(&row.attachment_url)
        .bind(&row.attachment_filename)
        .bind(row.created_at)
        .execute(pool)
        .await?;

        Ok(row)
    }

    async fn list_contact_messages(
        &self,
        pool: &SqlitePool,
        unread_only: bool,
    ) -> Result<Vec<DbContactMessage>, CmsError> {
        let rows = if unread_only {
            sqlx::query_as::<_, DbContactMessage>(
                r#"
            SELECT id, name, company, email, phone, message, attachment_url, attachment_filename, is_read, created_at
            FROM contact_messages
            WHERE is_read = 0
            ORDER BY created_at DESC
            "#,
            )
            .fetch_all(pool)
            .await?
        } else {
            sqlx::query_as::<_, DbContactMessage>(
                r#"
            SELECT id, name, company, email, phone, message, attachment_url, attachment_filename, is_read, created_at
            FROM contact_messages
            ORDER BY created_at DESC
            "#,
            )
            .fetch_all(pool)
            .await?
        };

        Ok(rows)
    }

    async fn get_contact_message(
        &self,
        pool: &SqlitePool,
        id: Uuid,
    ) -> Result<DbContactMessage, CmsError> {
        sqlx::query_as::<_, DbContactMessage>(
            r#"
        SELECT id, name, company, email, phone, message, attachment_url, attachment_filename, is_read, created_at
        FROM contact_messages
        WHERE id = ?
        "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| CmsError::NotFound(format!("Message not found with id: {id}")))
    }

    async fn mark_message_read(&self, pool: &SqlitePool, id: Uuid) -> Result<(), CmsError> {
        let res = sqlx::query("UPDATE contact_messages SET is_read = 1 WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        if res.rows_affected() == 0 {
            return Err(CmsError::NotFound(format!(
                "Message not found with id: {id}"
            )));
        }

        Ok(())
    }

    async fn count_unread_messages(&self, pool: &SqlitePool) -> Result<i64, CmsError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM contact_messages WHERE is_read = 0")
                .fetch_one(pool)
                .await?;

        Ok(count)
    }

    async fn create_user(&self, pool: &SqlitePool, create: UserCreate) -> Result<DbUser, CmsError> {
        let row = DbUser {
            id: Uuid::new_v4(),
            username: create.username,
            email: create.email,
            password_hash: create.password_hash,
            role: create.role,
            enabled: true,
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
        INSERT INTO users (id, username, email, password_hash, role, enabled, created_at)
        VALUES (?, ?, ?, ?, ?, 1, ?)
        "#,
        )
        .bind(row.id)
        .bind(&row.username)
        .bind(&row.email)
        .bind(&row.password_hash)
        .bind(row.role)
        .bind(row.created_at)
        .execute(pool)
        .await?;

        Ok(row)
    }

    async fn find_user_by_username(
        &self,
        pool: &SqlitePool,
        username: &str,
    ) -> Result<Option<DbUser>, CmsError> {
        let row = sqlx::query_as::<_, DbUser>(
            r#"
        SELECT id, username, email, password_hash, role, enabled, created_at
        FROM users
        WHERE username = ?
        "#,
        )
        .bind(username)
        .fetch_optional(pool)
        .await?;

        Ok(row)
    }
}

async fn delete_by_id(pool: &SqlitePool, table: &str, id: Uuid) -> Result<(), CmsError> {
    // `table` is a compile-time constant at every call site, never user input.
    let res = sqlx::query(&format!("DELETE FROM {table} WHERE id = ?"))
        .bind(id)
        .execute(pool)
        .await?;

    tracing::debug!(table, %id, affected = res.rows_affected(), "db row deleted");
    Ok(())
}

async fn exists(pool: &SqlitePool, sql: &str, value: &str) -> Result<bool, CmsError> {
    let count: i64 = sqlx::query_scalar(sql).bind(value).fetch_one(pool).await?;
    Ok(count > 0)
}

async fn apply_schema(pool: &SqlitePool) -> Result<(), CmsError> {
    for stmt in SQLITE_INIT.split(';') {
        let s = stmt.trim();
        if s.is_empty() {
            continue;
        }
        sqlx::query(s).execute(pool).await?;
    }
    Ok(())
}

/// Spawn the database actor and return a cloneable handle.
pub async fn spawn(database_url: &str) -> DbHandle {
    let (actor, _jh) = ractor::Actor::spawn(
        Some("DbActor".to_string()),
        DbActor,
        database_url.to_string(),
    )
    .await
    .expect("failed to spawn DbActor");

    DbHandle { actor }
}
