use chrono::Utc;
use diesel::prelude::*;
use log::*;
use serde_json::Value;

use super::db::Catalog;
use super::factory::{int, text, Fields};
use crate::error::Result;
use crate::guidebox::map_keys;
use crate::models::{Genre, NewGenre, NewPerson, Person};
use crate::schema::{genres, genres_movies, movies_people, people};

/// Record lists naming the people credited on a movie.
const CREDIT_LISTS: &[&str] = &["cast", "directors", "writers"];

impl Catalog {
    pub fn find_or_create_genre(&mut self, name: &str) -> Result<Genre> {
        find_or_create_genre(&mut self.ctx, name)
    }

    /// Genres of a movie, oldest link first.
    pub fn genres_for(&mut self, movie_id: i32) -> Result<Vec<Genre>> {
        Ok(genres_movies::table
            .inner_join(genres::table)
            .filter(genres_movies::movie_id.eq(movie_id))
            .order(genres_movies::id)
            .select(Genre::as_select())
            .load(&mut self.ctx)?)
    }

    /// People credited on a movie, in credit order.
    pub fn people_for(&mut self, movie_id: i32) -> Result<Vec<Person>> {
        Ok(movies_people::table
            .inner_join(people::table)
            .filter(movies_people::movie_id.eq(movie_id))
            .order(movies_people::id)
            .select(Person::as_select())
            .load(&mut self.ctx)?)
    }
}

/// Genres are shared by exact name, like content tags.
pub fn find_or_create_genre(ctx: &mut SqliteConnection, name: &str) -> Result<Genre> {
    let existing = genres::table
        .filter(genres::genre.eq(name))
        .select(Genre::as_select())
        .first(ctx)
        .optional()?;
    if let Some(existing) = existing {
        return Ok(existing);
    }

    let now = Utc::now().naive_utc();
    let genre = diesel::insert_into(genres::table)
        .values(NewGenre {
            genre: name,
            created_at: now,
            updated_at: now,
        })
        .returning(Genre::as_returning())
        .get_result(ctx)?;
    debug!("Created genre {:?}", genre.genre);
    Ok(genre)
}

/// Find a person by guidebox id, or by name when the entry has none.
/// Entries without a name are not stored.
pub fn find_or_create_person(ctx: &mut SqliteConnection, entry: &Fields) -> Result<Option<Person>> {
    let Some(name) = text(entry, "name") else {
        return Ok(None);
    };
    let guidebox_id = int(entry, "guidebox_id");

    let existing = match guidebox_id {
        Some(id) => people::table
            .filter(people::guidebox_id.eq(id))
            .select(Person::as_select())
            .first(ctx)
            .optional()?,
        None => people::table
            .filter(people::name.eq(&name))
            .order(people::id)
            .select(Person::as_select())
            .first(ctx)
            .optional()?,
    };
    if existing.is_some() {
        return Ok(existing);
    }

    let now = Utc::now().naive_utc();
    let person = diesel::insert_into(people::table)
        .values(NewPerson {
            guidebox_id,
            name: &name,
            description: text(entry, "description"),
            freebase: text(entry, "freebase"),
            themoviedb: int(entry, "themoviedb"),
            tvrage: int(entry, "tvrage"),
            created_at: now,
            updated_at: now,
        })
        .returning(Person::as_returning())
        .get_result(ctx)?;
    Ok(Some(person))
}

/// Link a movie to the genres and people listed in its raw guidebox record.
pub fn link_movie_credits(ctx: &mut SqliteConnection, movie_id: i32, record: &Fields) -> Result<()> {
    for entry in entries(record, "genres") {
        let Some(name) = text(&entry, "title").or_else(|| text(&entry, "genre")) else {
            warn!("Skipping genre entry without a name on movie {}", movie_id);
            continue;
        };
        let genre = find_or_create_genre(ctx, &name)?;
        diesel::insert_or_ignore_into(genres_movies::table)
            .values((
                genres_movies::genre_id.eq(genre.id),
                genres_movies::movie_id.eq(movie_id),
            ))
            .execute(ctx)?;
    }

    for list in CREDIT_LISTS {
        for entry in entries(record, list) {
            let Some(person) = find_or_create_person(ctx, &entry)? else {
                warn!("Skipping {} entry without a name on movie {}", list, movie_id);
                continue;
            };
            diesel::insert_or_ignore_into(movies_people::table)
                .values((
                    movies_people::person_id.eq(person.id),
                    movies_people::movie_id.eq(movie_id),
                ))
                .execute(ctx)?;
        }
    }
    Ok(())
}

fn entries(record: &Fields, key: &str) -> Vec<Fields> {
    record
        .get(key)
        .and_then(Value::as_array)
        .map(|list| list.iter().filter_map(Value::as_object).map(map_keys).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Movie, Show};
    use serde_json::json;

    fn names(people: Vec<Person>) -> Vec<String> {
        people.into_iter().map(|person| person.name).collect()
    }

    #[test]
    fn movie_gets_genres_and_people() {
        let mut catalog = Catalog::in_memory();
        let movie: Movie = catalog
            .create_from_guidebox(&json!({
                "id": 135934,
                "title": "The Big Short",
                "genres": [{"id": 6, "title": "Comedy"}, {"id": 9, "title": "Drama"}],
                "cast": [
                    {"id": 200, "name": "Christian Bale", "character_name": "Michael Burry"},
                    {"id": 201, "name": "Steve Carell"}
                ],
                "directors": [{"id": 300, "name": "Adam McKay"}],
                "writers": [{"id": 300, "name": "Adam McKay"}, {"id": 301}]
            }))
            .unwrap();

        let genres: Vec<String> = catalog
            .genres_for(movie.id)
            .unwrap()
            .into_iter()
            .map(|genre| genre.genre)
            .collect();
        assert_eq!(genres, vec!["Comedy", "Drama"]);

        let credited = catalog.people_for(movie.id).unwrap();
        assert_eq!(credited[0].guidebox_id, Some(200));
        // the director/writer is one person, linked once
        assert_eq!(
            names(credited),
            vec!["Christian Bale", "Steve Carell", "Adam McKay"]
        );
    }

    #[test]
    fn genres_and_people_are_shared_between_movies() {
        let mut catalog = Catalog::in_memory();
        let first: Movie = catalog
            .create_from_guidebox(&json!({
                "title": "Home Alone",
                "genres": [{"title": "Family"}],
                "cast": [{"id": 10, "name": "Macaulay Culkin"}]
            }))
            .unwrap();
        let second: Movie = catalog
            .create_from_guidebox(&json!({
                "title": "My Girl",
                "genres": [{"genre": "Family"}],
                "cast": [{"id": 10, "name": "Macaulay Culkin"}, {"name": "Anna Chlumsky"}]
            }))
            .unwrap();

        let family = catalog.find_or_create_genre("Family").unwrap();
        assert_eq!(catalog.genres_for(first.id).unwrap(), vec![family.clone()]);
        assert_eq!(catalog.genres_for(second.id).unwrap(), vec![family]);

        let first_people = catalog.people_for(first.id).unwrap();
        let second_people = catalog.people_for(second.id).unwrap();
        assert_eq!(first_people[0], second_people[0]);
        assert_eq!(second_people[1].guidebox_id, None);
    }

    #[test]
    fn person_without_guidebox_id_matches_by_name() {
        let mut catalog = Catalog::in_memory();
        let entry = map_keys(json!({"name": "Steven Spielberg"}).as_object().unwrap());

        let first = find_or_create_person(&mut catalog.ctx, &entry).unwrap().unwrap();
        let again = find_or_create_person(&mut catalog.ctx, &entry).unwrap().unwrap();
        assert_eq!(first, again);

        let nameless = map_keys(json!({"id": 4}).as_object().unwrap());
        assert_eq!(find_or_create_person(&mut catalog.ctx, &nameless).unwrap(), None);
    }

    #[test]
    fn shows_do_not_take_movie_credits() {
        let mut catalog = Catalog::in_memory();
        let _: Show = catalog
            .create_from_guidebox(&json!({"title": "Veep", "genres": [{"title": "Comedy"}]}))
            .unwrap();

        let genre_rows: i64 = genres::table.count().get_result(&mut catalog.ctx).unwrap();
        assert_eq!(genre_rows, 0);
    }
}
