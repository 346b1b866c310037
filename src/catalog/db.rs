use chrono::Utc;
use diesel::prelude::*;
use diesel::sql_query;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use log::*;

use crate::error::{Result, StageError};
use crate::models::{ContentTag, MediaContent, NewContentTag, NewMediaContent, NewUser, TagTarget, User};
use crate::schema::{
    collections_tags, content_tags, episodes_tags, media_contents, movies_tags, shows_tags, users,
};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Owns the catalog connection; every write in the stager goes through here.
pub struct Catalog {
    pub(crate) ctx: SqliteConnection,
}

impl Catalog {
    /// Open (or create) the database and bring its schema up to date.
    pub fn connect(database_url: &str) -> Result<Catalog> {
        let mut ctx = SqliteConnection::establish(database_url)?;
        sql_query("PRAGMA foreign_keys = ON").execute(&mut ctx)?;

        let applied = ctx
            .run_pending_migrations(MIGRATIONS)
            .map_err(|err| StageError::Migration(err.to_string()))?;
        if !applied.is_empty() {
            info!("Applied {} migration(s) to {}", applied.len(), database_url);
        }

        Ok(Catalog { ctx })
    }

    #[cfg(test)]
    pub fn in_memory() -> Catalog {
        Catalog::connect(":memory:").expect("in-memory catalog")
    }

    pub fn create_user(
        &mut self,
        email: &str,
        name: Option<&str>,
        phone_number: Option<&str>,
    ) -> Result<User> {
        let now = Utc::now().naive_utc();
        let user = diesel::insert_into(users::table)
            .values(NewUser {
                email,
                name,
                phone_number,
                created_at: now,
                updated_at: now,
            })
            .returning(User::as_returning())
            .get_result(&mut self.ctx)?;
        Ok(user)
    }

    pub fn first_user(&mut self) -> Result<Option<User>> {
        Ok(users::table
            .order(users::id)
            .select(User::as_select())
            .first(&mut self.ctx)
            .optional()?)
    }

    pub fn find_user_by_email(&mut self, email: &str) -> Result<Option<User>> {
        Ok(users::table
            .filter(users::email.eq(email))
            .select(User::as_select())
            .first(&mut self.ctx)
            .optional()?)
    }

    pub fn find_tag(&mut self, name: &str) -> Result<Option<ContentTag>> {
        find_tag(&mut self.ctx, name)
    }

    pub fn find_or_create_tag(&mut self, name: &str, guidebox_id: Option<i32>) -> Result<ContentTag> {
        find_or_create_tag(&mut self.ctx, name, guidebox_id)
    }

    pub fn attach_tag(&mut self, target: TagTarget, tag: &ContentTag) -> Result<()> {
        attach_tag(&mut self.ctx, target, tag.id)
    }

    /// Tags on a record, oldest association first.
    pub fn tags_for(&mut self, target: TagTarget) -> Result<Vec<ContentTag>> {
        let tags = match target {
            TagTarget::Movie(id) => movies_tags::table
                .inner_join(content_tags::table)
                .filter(movies_tags::movie_id.eq(id))
                .order(movies_tags::id)
                .select(ContentTag::as_select())
                .load(&mut self.ctx)?,
            TagTarget::Show(id) => shows_tags::table
                .inner_join(content_tags::table)
                .filter(shows_tags::show_id.eq(id))
                .order(shows_tags::id)
                .select(ContentTag::as_select())
                .load(&mut self.ctx)?,
            TagTarget::Episode(id) => episodes_tags::table
                .inner_join(content_tags::table)
                .filter(episodes_tags::episode_id.eq(id))
                .order(episodes_tags::id)
                .select(ContentTag::as_select())
                .load(&mut self.ctx)?,
            TagTarget::Collection(id) => collections_tags::table
                .inner_join(content_tags::table)
                .filter(collections_tags::collection_id.eq(id))
                .order(collections_tags::id)
                .select(ContentTag::as_select())
                .load(&mut self.ctx)?,
        };
        Ok(tags)
    }

    #[cfg(test)]
    pub fn count_tags(&mut self) -> i64 {
        content_tags::table.count().get_result(&mut self.ctx).unwrap()
    }

    #[cfg(test)]
    pub fn count_users(&mut self) -> i64 {
        users::table.count().get_result(&mut self.ctx).unwrap()
    }
}

pub fn find_tag(ctx: &mut SqliteConnection, name: &str) -> Result<Option<ContentTag>> {
    Ok(content_tags::table
        .filter(content_tags::tag.eq(name))
        .select(ContentTag::as_select())
        .first(ctx)
        .optional()?)
}

/// Tags are shared by exact name; a new row is only made for an unseen name.
pub fn find_or_create_tag(
    ctx: &mut SqliteConnection,
    name: &str,
    guidebox_id: Option<i32>,
) -> Result<ContentTag> {
    if let Some(existing) = find_tag(ctx, name)? {
        return Ok(existing);
    }

    let tag = diesel::insert_into(content_tags::table)
        .values(NewContentTag {
            tag: name,
            guidebox_id,
            created_at: Utc::now().naive_utc(),
        })
        .returning(ContentTag::as_returning())
        .get_result(ctx)?;
    debug!("Created content tag {:?}", tag.tag);
    Ok(tag)
}

pub fn attach_tag(ctx: &mut SqliteConnection, target: TagTarget, tag_id: i32) -> Result<()> {
    match target {
        TagTarget::Movie(id) => diesel::insert_or_ignore_into(movies_tags::table)
            .values((
                movies_tags::movie_id.eq(id),
                movies_tags::content_tag_id.eq(tag_id),
            ))
            .execute(ctx)?,
        TagTarget::Show(id) => diesel::insert_or_ignore_into(shows_tags::table)
            .values((
                shows_tags::show_id.eq(id),
                shows_tags::content_tag_id.eq(tag_id),
            ))
            .execute(ctx)?,
        TagTarget::Episode(id) => diesel::insert_or_ignore_into(episodes_tags::table)
            .values((
                episodes_tags::episode_id.eq(id),
                episodes_tags::content_tag_id.eq(tag_id),
            ))
            .execute(ctx)?,
        TagTarget::Collection(id) => diesel::insert_or_ignore_into(collections_tags::table)
            .values((
                collections_tags::collection_id.eq(id),
                collections_tags::content_tag_id.eq(tag_id),
            ))
            .execute(ctx)?,
    };
    Ok(())
}

/// Media content is keyed by guidebox id within a kind; an existing row wins.
pub fn find_or_create_media_content(
    ctx: &mut SqliteConnection,
    content: NewMediaContent,
) -> Result<MediaContent> {
    let existing = media_contents::table
        .filter(media_contents::content_kind.eq(&content.content_kind))
        .filter(media_contents::guidebox_id.eq(content.guidebox_id))
        .select(MediaContent::as_select())
        .first(ctx)
        .optional()?;
    if let Some(existing) = existing {
        return Ok(existing);
    }

    Ok(diesel::insert_into(media_contents::table)
        .values(&content)
        .returning(MediaContent::as_returning())
        .get_result(ctx)?)
}
