use super::schema::{
    collections, content_tags, episodes, genres, media_contents, movies, people, shows, users,
    watch_lists, watched_at,
};

use chrono::NaiveDateTime;
use diesel::prelude::*;

/// Shared descriptive metadata for a guidebox record, referenced by catalog items.
#[derive(Clone, Debug, Queryable, Selectable, Identifiable, PartialEq)]
#[diesel(table_name = media_contents)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct MediaContent {
    pub id: i32,
    pub content_kind: String,
    pub guidebox_id: i32,
    pub overview: Option<String>,
    pub release_date: Option<String>,
    pub imdb: Option<String>,
    pub themoviedb: Option<i32>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = media_contents)]
pub struct NewMediaContent {
    pub content_kind: String,
    pub guidebox_id: i32,
    pub overview: Option<String>,
    pub release_date: Option<String>,
    pub imdb: Option<String>,
    pub themoviedb: Option<i32>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Clone, Debug, Queryable, Selectable, Identifiable, PartialEq)]
#[diesel(table_name = movies)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Movie {
    pub id: i32,
    pub guidebox_id: Option<i32>,
    pub media_content_id: Option<i32>,
    pub title: Option<String>,
    pub original_title: Option<String>,
    pub alternative_titles: Option<String>,
    pub release_year: Option<i32>,
    pub release_date: Option<String>,
    pub rating: Option<String>,
    pub imdb: Option<String>,
    pub themoviedb: Option<i32>,
    pub freebase: Option<String>,
    pub rottentomatoes: Option<i32>,
    pub metacritic: Option<String>,
    pub common_sense_media: Option<String>,
    pub pre_order: Option<bool>,
    pub in_theaters: Option<bool>,
    pub poster_120x171: Option<String>,
    pub poster_240x342: Option<String>,
    pub poster_400x570: Option<String>,
    pub published_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = movies)]
pub struct NewMovie {
    pub guidebox_id: Option<i32>,
    pub media_content_id: Option<i32>,
    pub title: Option<String>,
    pub original_title: Option<String>,
    pub alternative_titles: Option<String>,
    pub release_year: Option<i32>,
    pub release_date: Option<String>,
    pub rating: Option<String>,
    pub imdb: Option<String>,
    pub themoviedb: Option<i32>,
    pub freebase: Option<String>,
    pub rottentomatoes: Option<i32>,
    pub metacritic: Option<String>,
    pub common_sense_media: Option<String>,
    pub pre_order: Option<bool>,
    pub in_theaters: Option<bool>,
    pub poster_120x171: Option<String>,
    pub poster_240x342: Option<String>,
    pub poster_400x570: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Clone, Debug, Queryable, Selectable, Identifiable, PartialEq)]
#[diesel(table_name = shows)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Show {
    pub id: i32,
    pub guidebox_id: Option<i32>,
    pub media_content_id: Option<i32>,
    pub title: Option<String>,
    pub alternative_titles: Option<String>,
    pub container_show: Option<bool>,
    pub first_aired: Option<String>,
    pub air_day_of_week: Option<String>,
    pub air_time: Option<String>,
    pub network: Option<String>,
    pub status: Option<String>,
    pub runtime: Option<i32>,
    pub rating: Option<String>,
    pub imdb: Option<String>,
    pub themoviedb: Option<i32>,
    pub tvdb: Option<i32>,
    pub tvrage: Option<i32>,
    pub freebase: Option<String>,
    pub artwork_304x171: Option<String>,
    pub artwork_608x342: Option<String>,
    pub poster: Option<String>,
    pub banner: Option<String>,
    pub fanart: Option<String>,
    pub url: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = shows)]
pub struct NewShow {
    pub guidebox_id: Option<i32>,
    pub media_content_id: Option<i32>,
    pub title: Option<String>,
    pub alternative_titles: Option<String>,
    pub container_show: Option<bool>,
    pub first_aired: Option<String>,
    pub air_day_of_week: Option<String>,
    pub air_time: Option<String>,
    pub network: Option<String>,
    pub status: Option<String>,
    pub runtime: Option<i32>,
    pub rating: Option<String>,
    pub imdb: Option<String>,
    pub themoviedb: Option<i32>,
    pub tvdb: Option<i32>,
    pub tvrage: Option<i32>,
    pub freebase: Option<String>,
    pub artwork_304x171: Option<String>,
    pub artwork_608x342: Option<String>,
    pub poster: Option<String>,
    pub banner: Option<String>,
    pub fanart: Option<String>,
    pub url: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Clone, Debug, Queryable, Selectable, Identifiable, Associations, PartialEq)]
#[diesel(belongs_to(Show))]
#[diesel(table_name = episodes)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Episode {
    pub id: i32,
    pub guidebox_id: Option<i32>,
    pub media_content_id: Option<i32>,
    pub show_id: i32,
    pub title: Option<String>,
    pub original_title: Option<String>,
    pub alternate_title: Option<String>,
    pub season_number: Option<i32>,
    pub episode_number: Option<i32>,
    pub special: Option<bool>,
    pub first_aired: Option<String>,
    pub duration: Option<i32>,
    pub imdb: Option<String>,
    pub themoviedb: Option<i32>,
    pub tvdb: Option<i32>,
    pub thumbnail_304x171: Option<String>,
    pub thumbnail_608x342: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = episodes)]
pub struct NewEpisode {
    pub guidebox_id: Option<i32>,
    pub media_content_id: Option<i32>,
    pub show_id: i32,
    pub title: Option<String>,
    pub original_title: Option<String>,
    pub alternate_title: Option<String>,
    pub season_number: Option<i32>,
    pub episode_number: Option<i32>,
    pub special: Option<bool>,
    pub first_aired: Option<String>,
    pub duration: Option<i32>,
    pub imdb: Option<String>,
    pub themoviedb: Option<i32>,
    pub tvdb: Option<i32>,
    pub thumbnail_304x171: Option<String>,
    pub thumbnail_608x342: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// A reusable label, unique by `tag`.
#[derive(Clone, Debug, Queryable, Selectable, Identifiable, PartialEq)]
#[diesel(table_name = content_tags)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ContentTag {
    pub id: i32,
    pub tag: String,
    pub guidebox_id: Option<i32>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = content_tags)]
pub struct NewContentTag<'a> {
    pub tag: &'a str,
    pub guidebox_id: Option<i32>,
    pub created_at: NaiveDateTime,
}

/// Movie genre, unique by name.
#[derive(Clone, Debug, Queryable, Selectable, Identifiable, PartialEq)]
#[diesel(table_name = genres)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Genre {
    pub id: i32,
    pub genre: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = genres)]
pub struct NewGenre<'a> {
    pub genre: &'a str,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Cast or crew member credited on a movie.
#[derive(Clone, Debug, Queryable, Selectable, Identifiable, PartialEq)]
#[diesel(table_name = people)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Person {
    pub id: i32,
    pub guidebox_id: Option<i32>,
    pub name: String,
    pub description: Option<String>,
    pub freebase: Option<String>,
    pub themoviedb: Option<i32>,
    pub tvrage: Option<i32>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = people)]
pub struct NewPerson<'a> {
    pub guidebox_id: Option<i32>,
    pub name: &'a str,
    pub description: Option<String>,
    pub freebase: Option<String>,
    pub themoviedb: Option<i32>,
    pub tvrage: Option<i32>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Clone, Debug, Queryable, Selectable, Identifiable, PartialEq)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct User {
    pub id: i32,
    pub email: String,
    pub name: Option<String>,
    pub phone_number: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUser<'a> {
    pub email: &'a str,
    pub name: Option<&'a str>,
    pub phone_number: Option<&'a str>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Clone, Debug, Queryable, Selectable, Identifiable, Associations, PartialEq)]
#[diesel(belongs_to(User))]
#[diesel(table_name = watch_lists)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct WatchList {
    pub id: i32,
    pub user_id: i32,
    pub created_at: NaiveDateTime,
}

#[derive(Clone, Debug, Queryable, Selectable, Identifiable, PartialEq)]
#[diesel(table_name = collections)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Collection {
    pub id: i32,
    pub display_name: String,
    pub internal_name: String,
    pub created_by: Option<String>,
    pub published: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = collections)]
pub struct NewCollection<'a> {
    pub display_name: &'a str,
    pub internal_name: &'a str,
    pub created_by: Option<&'a str>,
    pub published: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// The kinds of row a watch event may point at, stored by type name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, diesel_derive_enum::DbEnum)]
pub enum WatchableType {
    #[db_rename = "Movie"]
    Movie,
    #[db_rename = "Episode"]
    Episode,
}

impl WatchableType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WatchableType::Movie => "Movie",
            WatchableType::Episode => "Episode",
        }
    }
}

/// Typed target of a watch event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Watchable {
    Movie(i32),
    Episode(i32),
}

impl Watchable {
    pub fn watchable_type(&self) -> WatchableType {
        match self {
            Watchable::Movie(_) => WatchableType::Movie,
            Watchable::Episode(_) => WatchableType::Episode,
        }
    }

    pub fn id(&self) -> i32 {
        match self {
            Watchable::Movie(id) | Watchable::Episode(id) => *id,
        }
    }
}

impl From<&WatchedAt> for Watchable {
    fn from(row: &WatchedAt) -> Self {
        match row.watchable_type {
            WatchableType::Movie => Watchable::Movie(row.watchable_id),
            WatchableType::Episode => Watchable::Episode(row.watchable_id),
        }
    }
}

/// The loaded row behind a watch event.
#[derive(Clone, Debug, PartialEq)]
pub enum WatchedItem {
    Movie(Movie),
    Episode(Episode),
}

#[derive(Clone, Debug, Queryable, Selectable, Identifiable, Associations, PartialEq)]
#[diesel(belongs_to(User))]
#[diesel(table_name = watched_at)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct WatchedAt {
    pub id: i32,
    pub user_id: i32,
    pub watchable_type: WatchableType,
    pub watchable_id: i32,
    pub occurred_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = watched_at)]
pub struct NewWatchedAt {
    pub user_id: i32,
    pub watchable_type: WatchableType,
    pub watchable_id: i32,
    pub occurred_at: NaiveDateTime,
}

/// Anything a content tag can be attached to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TagTarget {
    Movie(i32),
    Show(i32),
    Episode(i32),
    Collection(i32),
}

/// Watch lists hold movies and shows only.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WatchListEntry {
    Movie(i32),
    Show(i32),
}
