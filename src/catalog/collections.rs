use std::collections::HashSet;

use chrono::Utc;
use diesel::prelude::*;
use log::*;
use thiserror::Error;

use super::db::Catalog;
use crate::error::Result;
use crate::models::{Collection, NewCollection};
use crate::schema::{
    collections, collections_collections, collections_episodes, collections_movies,
    collections_shows,
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Mixed content types are currently not supported; a collection holds only one of movies, shows, episodes or collections")]
    MixedContentTypes,

    #[error("A collection cannot contain itself")]
    SelfContainment,

    #[error("{0} is required")]
    MissingName(&'static str),
}

/// One entry of a collection; the variant is the content type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CollectionMember {
    Movie(i32),
    Show(i32),
    Episode(i32),
    Collection(i32),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ContentType {
    Movies,
    Shows,
    Episodes,
    Collections,
}

impl CollectionMember {
    fn content_type(&self) -> ContentType {
        match self {
            CollectionMember::Movie(_) => ContentType::Movies,
            CollectionMember::Show(_) => ContentType::Shows,
            CollectionMember::Episode(_) => ContentType::Episodes,
            CollectionMember::Collection(_) => ContentType::Collections,
        }
    }
}

/// A collection as submitted for saving: its attributes plus the full,
/// ordered membership for each content type.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CollectionDraft {
    /// Set when editing an existing collection.
    pub id: Option<i32>,
    pub display_name: String,
    pub internal_name: String,
    pub created_by: Option<String>,
    pub published: bool,
    pub movies: Vec<i32>,
    pub shows: Vec<i32>,
    pub episodes: Vec<i32>,
    pub collections: Vec<i32>,
}

impl CollectionDraft {
    pub fn new(display_name: &str, internal_name: &str) -> Self {
        CollectionDraft {
            display_name: display_name.to_string(),
            internal_name: internal_name.to_string(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        if self.display_name.trim().is_empty() {
            return Err(ValidationError::MissingName("display_name"));
        }
        if self.internal_name.trim().is_empty() {
            return Err(ValidationError::MissingName("internal_name"));
        }

        let populated = [
            self.movies.is_empty(),
            self.shows.is_empty(),
            self.episodes.is_empty(),
            self.collections.is_empty(),
        ]
        .iter()
        .filter(|empty| !**empty)
        .count();
        if populated > 1 {
            return Err(ValidationError::MixedContentTypes);
        }

        if let Some(id) = self.id {
            if self.collections.contains(&id) {
                return Err(ValidationError::SelfContainment);
            }
        }
        Ok(())
    }

    /// Membership in save order.
    pub fn members(&self) -> Vec<CollectionMember> {
        self.movies
            .iter()
            .map(|id| CollectionMember::Movie(*id))
            .chain(self.shows.iter().map(|id| CollectionMember::Show(*id)))
            .chain(self.episodes.iter().map(|id| CollectionMember::Episode(*id)))
            .chain(self.collections.iter().map(|id| CollectionMember::Collection(*id)))
            .collect()
    }
}

impl Catalog {
    /// Create or update a collection from a draft, replacing its membership.
    pub fn save_collection(&mut self, draft: &CollectionDraft) -> Result<Collection> {
        draft.validate()?;

        self.ctx.transaction(|ctx| {
            let now = Utc::now().naive_utc();
            let collection = match draft.id {
                Some(id) => diesel::update(collections::table.find(id))
                    .set((
                        collections::display_name.eq(&draft.display_name),
                        collections::internal_name.eq(&draft.internal_name),
                        collections::created_by.eq(draft.created_by.as_deref()),
                        collections::published.eq(draft.published),
                        collections::updated_at.eq(now),
                    ))
                    .returning(Collection::as_returning())
                    .get_result(ctx)?,
                None => diesel::insert_into(collections::table)
                    .values(NewCollection {
                        display_name: &draft.display_name,
                        internal_name: &draft.internal_name,
                        created_by: draft.created_by.as_deref(),
                        published: draft.published,
                        created_at: now,
                        updated_at: now,
                    })
                    .returning(Collection::as_returning())
                    .get_result(ctx)?,
            };

            clear_members(ctx, collection.id)?;
            for member in draft.members() {
                add_member(ctx, collection.id, member)?;
            }
            Ok(collection)
        })
    }

    /// Append a member after the existing ones.
    pub fn add_collection_member(&mut self, collection_id: i32, member: CollectionMember) -> Result<()> {
        self.ctx
            .transaction(|ctx| add_member(ctx, collection_id, member))
    }

    /// Members ordered by their `sort_order`.
    pub fn collection_members(&mut self, collection_id: i32) -> Result<Vec<CollectionMember>> {
        members(&mut self.ctx, collection_id)
    }
}

fn clear_members(ctx: &mut SqliteConnection, collection_id: i32) -> Result<()> {
    diesel::delete(collections_movies::table.filter(collections_movies::collection_id.eq(collection_id)))
        .execute(ctx)?;
    diesel::delete(collections_shows::table.filter(collections_shows::collection_id.eq(collection_id)))
        .execute(ctx)?;
    diesel::delete(
        collections_episodes::table.filter(collections_episodes::collection_id.eq(collection_id)),
    )
    .execute(ctx)?;
    diesel::delete(
        collections_collections::table
            .filter(collections_collections::collection_id.eq(collection_id)),
    )
    .execute(ctx)?;
    Ok(())
}

fn members(ctx: &mut SqliteConnection, collection_id: i32) -> Result<Vec<CollectionMember>> {
    let mut members: Vec<(i32, CollectionMember)> = Vec::new();

    members.extend(
        collections_movies::table
            .filter(collections_movies::collection_id.eq(collection_id))
            .select((collections_movies::sort_order, collections_movies::movie_id))
            .load::<(i32, i32)>(ctx)?
            .into_iter()
            .map(|(order, id)| (order, CollectionMember::Movie(id))),
    );
    members.extend(
        collections_shows::table
            .filter(collections_shows::collection_id.eq(collection_id))
            .select((collections_shows::sort_order, collections_shows::show_id))
            .load::<(i32, i32)>(ctx)?
            .into_iter()
            .map(|(order, id)| (order, CollectionMember::Show(id))),
    );
    members.extend(
        collections_episodes::table
            .filter(collections_episodes::collection_id.eq(collection_id))
            .select((collections_episodes::sort_order, collections_episodes::episode_id))
            .load::<(i32, i32)>(ctx)?
            .into_iter()
            .map(|(order, id)| (order, CollectionMember::Episode(id))),
    );
    members.extend(
        collections_collections::table
            .filter(collections_collections::collection_id.eq(collection_id))
            .select((
                collections_collections::sort_order,
                collections_collections::member_collection_id,
            ))
            .load::<(i32, i32)>(ctx)?
            .into_iter()
            .map(|(order, id)| (order, CollectionMember::Collection(id))),
    );

    members.sort_by_key(|(order, _)| *order);
    Ok(members.into_iter().map(|(_, member)| member).collect())
}

/// Whether `target` is reachable from `outer` through nested collections.
fn contains_collection(ctx: &mut SqliteConnection, outer: i32, target: i32) -> Result<bool> {
    let mut seen = HashSet::new();
    let mut pending = vec![outer];

    while let Some(current) = pending.pop() {
        if current == target {
            return Ok(true);
        }
        if !seen.insert(current) {
            continue;
        }
        let children: Vec<i32> = collections_collections::table
            .filter(collections_collections::collection_id.eq(current))
            .select(collections_collections::member_collection_id)
            .load(ctx)?;
        pending.extend(children);
    }
    Ok(false)
}

fn add_member(ctx: &mut SqliteConnection, collection_id: i32, member: CollectionMember) -> Result<()> {
    let existing = members(ctx, collection_id)?;
    if existing
        .iter()
        .any(|current| current.content_type() != member.content_type())
    {
        return Err(ValidationError::MixedContentTypes.into());
    }

    if let CollectionMember::Collection(child) = member {
        if child == collection_id || contains_collection(ctx, child, collection_id)? {
            return Err(ValidationError::SelfContainment.into());
        }
    }

    let sort_order = i32::try_from(existing.len()).unwrap_or(i32::MAX);
    match member {
        CollectionMember::Movie(id) => diesel::insert_into(collections_movies::table)
            .values((
                collections_movies::collection_id.eq(collection_id),
                collections_movies::movie_id.eq(id),
                collections_movies::sort_order.eq(sort_order),
            ))
            .execute(ctx)?,
        CollectionMember::Show(id) => diesel::insert_into(collections_shows::table)
            .values((
                collections_shows::collection_id.eq(collection_id),
                collections_shows::show_id.eq(id),
                collections_shows::sort_order.eq(sort_order),
            ))
            .execute(ctx)?,
        CollectionMember::Episode(id) => diesel::insert_into(collections_episodes::table)
            .values((
                collections_episodes::collection_id.eq(collection_id),
                collections_episodes::episode_id.eq(id),
                collections_episodes::sort_order.eq(sort_order),
            ))
            .execute(ctx)?,
        CollectionMember::Collection(id) => diesel::insert_into(collections_collections::table)
            .values((
                collections_collections::collection_id.eq(collection_id),
                collections_collections::member_collection_id.eq(id),
                collections_collections::sort_order.eq(sort_order),
            ))
            .execute(ctx)?,
    };
    debug!("Added {:?} to collection {} at {}", member, collection_id, sort_order);
    Ok(())
}
