use chrono::Utc;
use diesel::prelude::*;
use log::*;
use serde_json::{Map, Value};

use super::credits;
use super::db::{self, Catalog};
use crate::error::{Result, StageError};
use crate::guidebox::map_keys;
use crate::models::{
    Episode, Movie, NewEpisode, NewMediaContent, NewMovie, NewShow, Show, TagTarget,
};
use crate::schema::{episodes, movies, shows};

pub type Fields = Map<String, Value>;

/// Fields feeding the shared media content row rather than the item itself.
const MEDIA_CONTENT_FIELDS: &[&str] = &[
    "guidebox_id",
    "overview",
    "release_date",
    "first_aired",
    "imdb",
    "themoviedb",
];

/// Raw record lists that become links rather than columns.
const LINKED_FIELDS: &[&str] = &["tags", "genres", "cast", "directors", "writers"];

/// A catalog row that can be built from a (key-mapped) guidebox record.
///
/// `KNOWN_FIELDS` is the full allow-list of mapped keys the row understands;
/// anything else in the record is dropped before `insert` sees it.
pub trait CatalogRecord: Sized {
    const KIND: &'static str;
    const KNOWN_FIELDS: &'static [&'static str];

    fn insert(
        ctx: &mut SqliteConnection,
        fields: &Fields,
        media_content_id: Option<i32>,
    ) -> Result<Self>;

    fn tag_target(&self) -> TagTarget;

    /// Links beyond tags, read from the raw record. Nothing by default.
    fn link_related(&self, _ctx: &mut SqliteConnection, _record: &Fields) -> Result<()> {
        Ok(())
    }
}

impl CatalogRecord for Movie {
    const KIND: &'static str = "Movie";
    const KNOWN_FIELDS: &'static [&'static str] = &[
        "guidebox_id",
        "title",
        "original_title",
        "alternative_titles",
        "release_year",
        "release_date",
        "rating",
        "imdb",
        "themoviedb",
        "freebase",
        "rottentomatoes",
        "metacritic",
        "common_sense_media",
        "pre_order",
        "in_theaters",
        "poster_120x171",
        "poster_240x342",
        "poster_400x570",
    ];

    fn insert(ctx: &mut SqliteConnection, f: &Fields, media_content_id: Option<i32>) -> Result<Self> {
        let now = Utc::now().naive_utc();
        let new_movie = NewMovie {
            guidebox_id: int(f, "guidebox_id"),
            media_content_id,
            title: text(f, "title"),
            original_title: text(f, "original_title"),
            alternative_titles: text(f, "alternative_titles"),
            release_year: int(f, "release_year"),
            release_date: text(f, "release_date"),
            rating: text(f, "rating"),
            imdb: text(f, "imdb"),
            themoviedb: int(f, "themoviedb"),
            freebase: text(f, "freebase"),
            rottentomatoes: int(f, "rottentomatoes"),
            metacritic: text(f, "metacritic"),
            common_sense_media: text(f, "common_sense_media"),
            pre_order: flag(f, "pre_order"),
            in_theaters: flag(f, "in_theaters"),
            poster_120x171: text(f, "poster_120x171"),
            poster_240x342: text(f, "poster_240x342"),
            poster_400x570: text(f, "poster_400x570"),
            created_at: now,
            updated_at: now,
        };

        Ok(diesel::insert_into(movies::table)
            .values(&new_movie)
            .returning(Movie::as_returning())
            .get_result(ctx)?)
    }

    fn tag_target(&self) -> TagTarget {
        TagTarget::Movie(self.id)
    }

    fn link_related(&self, ctx: &mut SqliteConnection, record: &Fields) -> Result<()> {
        credits::link_movie_credits(ctx, self.id, record)
    }
}

impl CatalogRecord for Show {
    const KIND: &'static str = "Show";
    const KNOWN_FIELDS: &'static [&'static str] = &[
        "guidebox_id",
        "title",
        "alternative_titles",
        "container_show",
        "first_aired",
        "air_day_of_week",
        "air_time",
        "network",
        "status",
        "runtime",
        "rating",
        "imdb",
        "themoviedb",
        "tvdb",
        "tvrage",
        "freebase",
        "artwork_304x171",
        "artwork_608x342",
        "poster",
        "banner",
        "fanart",
        "url",
    ];

    fn insert(ctx: &mut SqliteConnection, f: &Fields, media_content_id: Option<i32>) -> Result<Self> {
        let now = Utc::now().naive_utc();
        let new_show = NewShow {
            guidebox_id: int(f, "guidebox_id"),
            media_content_id,
            title: text(f, "title"),
            alternative_titles: text(f, "alternative_titles"),
            container_show: flag(f, "container_show"),
            first_aired: text(f, "first_aired"),
            air_day_of_week: text(f, "air_day_of_week"),
            air_time: text(f, "air_time"),
            network: text(f, "network"),
            status: text(f, "status"),
            runtime: int(f, "runtime"),
            rating: text(f, "rating"),
            imdb: text(f, "imdb"),
            themoviedb: int(f, "themoviedb"),
            tvdb: int(f, "tvdb"),
            tvrage: int(f, "tvrage"),
            freebase: text(f, "freebase"),
            artwork_304x171: text(f, "artwork_304x171"),
            artwork_608x342: text(f, "artwork_608x342"),
            poster: text(f, "poster"),
            banner: text(f, "banner"),
            fanart: text(f, "fanart"),
            url: text(f, "url"),
            created_at: now,
            updated_at: now,
        };

        Ok(diesel::insert_into(shows::table)
            .values(&new_show)
            .returning(Show::as_returning())
            .get_result(ctx)?)
    }

    fn tag_target(&self) -> TagTarget {
        TagTarget::Show(self.id)
    }
}

impl CatalogRecord for Episode {
    const KIND: &'static str = "Episode";
    // `show` is the local id of the parent show, set by the caller
    const KNOWN_FIELDS: &'static [&'static str] = &[
        "guidebox_id",
        "show",
        "title",
        "original_title",
        "alternate_title",
        "season_number",
        "episode_number",
        "special",
        "first_aired",
        "duration",
        "imdb",
        "themoviedb",
        "tvdb",
        "thumbnail_304x171",
        "thumbnail_608x342",
    ];

    fn insert(ctx: &mut SqliteConnection, f: &Fields, media_content_id: Option<i32>) -> Result<Self> {
        let show_id = int(f, "show")
            .ok_or_else(|| StageError::InvalidRecord("episode has no parent show".to_string()))?;

        let now = Utc::now().naive_utc();
        let new_episode = NewEpisode {
            guidebox_id: int(f, "guidebox_id"),
            media_content_id,
            show_id,
            title: text(f, "title"),
            original_title: text(f, "original_title"),
            alternate_title: text(f, "alternate_title"),
            season_number: int(f, "season_number"),
            episode_number: int(f, "episode_number"),
            special: flag(f, "special"),
            first_aired: text(f, "first_aired"),
            duration: int(f, "duration"),
            imdb: text(f, "imdb"),
            themoviedb: int(f, "themoviedb"),
            tvdb: int(f, "tvdb"),
            thumbnail_304x171: text(f, "thumbnail_304x171"),
            thumbnail_608x342: text(f, "thumbnail_608x342"),
            created_at: now,
            updated_at: now,
        };

        Ok(diesel::insert_into(episodes::table)
            .values(&new_episode)
            .returning(Episode::as_returning())
            .get_result(ctx)?)
    }

    fn tag_target(&self) -> TagTarget {
        TagTarget::Episode(self.id)
    }
}

/// Split mapped fields into those in `known` and everything else.
pub fn partition(mapped: Fields, known: &[&str]) -> (Fields, Fields) {
    mapped
        .into_iter()
        .partition(|(key, _)| known.contains(&key.as_str()))
}

impl Catalog {
    /// Persist a guidebox record as a new `R`, with its media content and tags.
    ///
    /// Unknown fields are dropped, never an error. Tags are read from the
    /// record's own `tags` list and shared by name across the catalog.
    pub fn create_from_guidebox<R: CatalogRecord>(&mut self, raw: &Value) -> Result<R> {
        let record = raw.as_object().ok_or_else(|| {
            StageError::InvalidRecord(format!("expected a {} object, got {}", R::KIND, raw))
        })?;

        let mapped = map_keys(record);
        let content = media_content(R::KIND, &mapped);
        let (known, other) = partition(mapped, R::KNOWN_FIELDS);
        let dropped: Vec<&String> = other
            .keys()
            .filter(|key| {
                !MEDIA_CONTENT_FIELDS.contains(&key.as_str()) && !LINKED_FIELDS.contains(&key.as_str())
            })
            .collect();
        if !dropped.is_empty() {
            debug!("Dropping {} unknown {} field(s): {:?}", dropped.len(), R::KIND, dropped);
        }

        self.ctx.transaction(|ctx| {
            let media_content_id = match content {
                Some(content) => Some(db::find_or_create_media_content(ctx, content)?.id),
                None => None,
            };
            let created = R::insert(ctx, &known, media_content_id)?;

            if let Some(tags) = record.get("tags").and_then(Value::as_array) {
                for entry in tags {
                    let Some(tag) = entry.as_object().map(map_keys) else {
                        warn!("Skipping malformed tag entry {}", entry);
                        continue;
                    };
                    let Some(name) = tag.get("tag").and_then(Value::as_str) else {
                        warn!("Skipping tag entry without a name: {}", entry);
                        continue;
                    };
                    let tag_row = db::find_or_create_tag(ctx, name, int(&tag, "guidebox_id"))?;
                    db::attach_tag(ctx, created.tag_target(), tag_row.id)?;
                }
            }
            created.link_related(ctx, record)?;

            Ok(created)
        })
    }
}

fn media_content(kind: &str, mapped: &Fields) -> Option<NewMediaContent> {
    let guidebox_id = int(mapped, "guidebox_id")?;
    let now = Utc::now().naive_utc();
    Some(NewMediaContent {
        content_kind: kind.to_string(),
        guidebox_id,
        overview: text(mapped, "overview"),
        release_date: text(mapped, "release_date").or_else(|| text(mapped, "first_aired")),
        imdb: text(mapped, "imdb"),
        themoviedb: int(mapped, "themoviedb"),
        created_at: now,
        updated_at: now,
    })
}

// guidebox is loose with types: lists land in text columns as json, numbers
// sometimes arrive as strings
pub(super) fn text(fields: &Fields, key: &str) -> Option<String> {
    match fields.get(key)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

pub(super) fn int(fields: &Fields, key: &str) -> Option<i32> {
    match fields.get(key)? {
        Value::Number(n) => n.as_i64().and_then(|n| i32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn flag(fields: &Fields, key: &str) -> Option<bool> {
    match fields.get(key)? {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_i64().map(|n| n != 0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Some(true),
            "false" | "0" | "no" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MediaContent;
    use crate::schema::media_contents;
    use serde_json::json;

    fn show_record() -> Value {
        json!({
            "id": 1404,
            "title": "Veep",
            "alternate_titles": ["Veep (2012)"],
            "imdb_id": "tt1759761",
            "themoviedb": 1404,
            "network": "HBO",
            "air_day_of_week": "Sunday",
            "air_time": "22:30",
            "runtime": "30",
            "overview": "Selina Meyer finds that being Vice President is nothing like she hoped.",
            "first_aired": "2012-04-22",
            "some_new_guidebox_field": {"nested": true},
            "tags": [
                {"id": 1, "tag": "Comedy"},
                {"id": 2, "tag": "Politics"}
            ]
        })
    }

    #[test]
    fn partition_splits_on_allow_list() {
        let mapped = map_keys(show_record().as_object().unwrap());
        let (known, other) = partition(mapped, Show::KNOWN_FIELDS);

        assert!(known.contains_key("guidebox_id"));
        assert!(known.contains_key("alternative_titles"));
        assert!(!known.contains_key("overview"));
        assert!(other.contains_key("some_new_guidebox_field"));
        assert!(other.contains_key("tags"));
        assert!(known.keys().all(|key| Show::KNOWN_FIELDS.contains(&key.as_str())));
    }

    #[test]
    fn creates_show_with_content_and_tags() {
        let mut catalog = Catalog::in_memory();
        let show: Show = catalog.create_from_guidebox(&show_record()).unwrap();

        assert_eq!(show.guidebox_id, Some(1404));
        assert_eq!(show.title.as_deref(), Some("Veep"));
        assert_eq!(show.alternative_titles.as_deref(), Some(r#"["Veep (2012)"]"#));
        assert_eq!(show.runtime, Some(30));
        assert_eq!(show.network.as_deref(), Some("HBO"));

        let content: MediaContent = media_contents::table
            .find(show.media_content_id.unwrap())
            .select(MediaContent::as_select())
            .first(&mut catalog.ctx)
            .unwrap();
        assert_eq!(content.content_kind, "Show");
        assert_eq!(content.guidebox_id, 1404);
        assert_eq!(content.release_date.as_deref(), Some("2012-04-22"));
        assert!(content.overview.unwrap().starts_with("Selina Meyer"));

        let tags: Vec<String> = catalog
            .tags_for(TagTarget::Show(show.id))
            .unwrap()
            .into_iter()
            .map(|tag| tag.tag)
            .collect();
        assert_eq!(tags, vec!["Comedy", "Politics"]);
    }

    #[test]
    fn tag_rows_are_shared_between_records() {
        let mut catalog = Catalog::in_memory();
        let first: Movie = catalog
            .create_from_guidebox(&json!({"id": 1, "title": "Hook", "tags": [{"id": 7, "tag": "Family"}]}))
            .unwrap();
        let second: Movie = catalog
            .create_from_guidebox(&json!({"id": 2, "title": "My Girl", "tags": [{"id": 7, "tag": "Family"}]}))
            .unwrap();

        assert_eq!(catalog.count_tags(), 1);
        let first_tags = catalog.tags_for(first.tag_target()).unwrap();
        let second_tags = catalog.tags_for(second.tag_target()).unwrap();
        assert_eq!(first_tags.len(), 1);
        assert_eq!(first_tags, second_tags);
    }

    #[test]
    fn record_without_id_has_no_media_content() {
        let mut catalog = Catalog::in_memory();
        let movie: Movie = catalog
            .create_from_guidebox(&json!({"title": "Batman", "release_year": 1989, "in_theaters": false}))
            .unwrap();

        assert_eq!(movie.media_content_id, None);
        assert_eq!(movie.guidebox_id, None);
        assert_eq!(movie.release_year, Some(1989));
        assert_eq!(movie.in_theaters, Some(false));
    }

    #[test]
    fn episode_needs_a_parent_show() {
        let mut catalog = Catalog::in_memory();
        let err = catalog
            .create_from_guidebox::<Episode>(&json!({"id": 5, "title": "Pilot"}))
            .unwrap_err();
        assert!(matches!(err, StageError::InvalidRecord(_)));

        let show: Show = catalog.create_from_guidebox(&json!({"id": 9, "title": "Suits"})).unwrap();
        let episode: Episode = catalog
            .create_from_guidebox(&json!({
                "id": 5,
                "show": show.id,
                "show_id": 9,
                "title": "Pilot",
                "season_number": 1,
                "episode_number": 1
            }))
            .unwrap();
        assert_eq!(episode.show_id, show.id);
        assert_eq!(episode.season_number, Some(1));
    }

    #[test]
    fn non_object_record_is_rejected() {
        let mut catalog = Catalog::in_memory();
        let err = catalog.create_from_guidebox::<Movie>(&json!([1, 2])).unwrap_err();
        assert!(matches!(err, StageError::InvalidRecord(_)));
    }

    #[test]
    fn coercions() {
        let fields = map_keys(
            json!({"a": "12", "b": 3.5, "c": 1, "d": "yes", "e": null, "f": [1]})
                .as_object()
                .unwrap(),
        );
        assert_eq!(int(&fields, "a"), Some(12));
        assert_eq!(int(&fields, "b"), None);
        assert_eq!(flag(&fields, "c"), Some(true));
        assert_eq!(flag(&fields, "d"), Some(true));
        assert_eq!(text(&fields, "e"), None);
        assert_eq!(text(&fields, "f").as_deref(), Some("[1]"));
        assert_eq!(text(&fields, "missing"), None);
    }
}
