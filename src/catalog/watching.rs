use chrono::{NaiveDateTime, Utc};
use diesel::dsl::sql;
use diesel::prelude::*;
use diesel::sql_types::Integer;

use super::db::Catalog;
use crate::error::{Result, StageError};
use crate::models::{
    Episode, Movie, NewWatchedAt, Show, User, WatchList, WatchListEntry, Watchable, WatchedAt,
    WatchedItem,
};
use crate::schema::{episodes, movies, shows, watch_lists, watch_lists_movies, watch_lists_shows, watched_at};

impl Catalog {
    pub fn find_watch_list(&mut self, user: &User) -> Result<Option<WatchList>> {
        Ok(WatchList::belonging_to(user)
            .select(WatchList::as_select())
            .first(&mut self.ctx)
            .optional()?)
    }

    /// A user has exactly one watch list; an existing one is returned as is.
    pub fn create_watch_list(&mut self, user: &User) -> Result<WatchList> {
        if let Some(existing) = self.find_watch_list(user)? {
            return Ok(existing);
        }

        Ok(diesel::insert_into(watch_lists::table)
            .values((
                watch_lists::user_id.eq(user.id),
                watch_lists::created_at.eq(Utc::now().naive_utc()),
            ))
            .returning(WatchList::as_returning())
            .get_result(&mut self.ctx)?)
    }

    /// Adding an entry twice keeps the original position.
    pub fn add_to_watch_list(&mut self, list: &WatchList, entry: WatchListEntry) -> Result<()> {
        match entry {
            WatchListEntry::Movie(id) => diesel::insert_or_ignore_into(watch_lists_movies::table)
                .values((
                    watch_lists_movies::watch_list_id.eq(list.id),
                    watch_lists_movies::movie_id.eq(id),
                ))
                .execute(&mut self.ctx)?,
            WatchListEntry::Show(id) => diesel::insert_or_ignore_into(watch_lists_shows::table)
                .values((
                    watch_lists_shows::watch_list_id.eq(list.id),
                    watch_lists_shows::show_id.eq(id),
                ))
                .execute(&mut self.ctx)?,
        };
        Ok(())
    }

    /// Movies on the list in the order they were added.
    pub fn watch_list_movies(&mut self, list: &WatchList) -> Result<Vec<Movie>> {
        Ok(watch_lists_movies::table
            .inner_join(movies::table)
            .filter(watch_lists_movies::watch_list_id.eq(list.id))
            .order(watch_lists_movies::id)
            .select(Movie::as_select())
            .load(&mut self.ctx)?)
    }

    pub fn watch_list_shows(&mut self, list: &WatchList) -> Result<Vec<Show>> {
        Ok(watch_lists_shows::table
            .inner_join(shows::table)
            .filter(watch_lists_shows::watch_list_id.eq(list.id))
            .order(watch_lists_shows::id)
            .select(Show::as_select())
            .load(&mut self.ctx)?)
    }

    /// Up to `limit` movies in random order.
    pub fn sample_movies(&mut self, limit: i64) -> Result<Vec<Movie>> {
        Ok(movies::table
            .order(sql::<Integer>("RANDOM()"))
            .limit(limit)
            .select(Movie::as_select())
            .load(&mut self.ctx)?)
    }

    /// Up to `limit` episodes in random order.
    pub fn sample_episodes(&mut self, limit: i64) -> Result<Vec<Episode>> {
        Ok(episodes::table
            .order(sql::<Integer>("RANDOM()"))
            .limit(limit)
            .select(Episode::as_select())
            .load(&mut self.ctx)?)
    }

    pub fn record_watch(
        &mut self,
        user: &User,
        watchable: Watchable,
        at: NaiveDateTime,
    ) -> Result<WatchedAt> {
        Ok(diesel::insert_into(watched_at::table)
            .values(NewWatchedAt {
                user_id: user.id,
                watchable_type: watchable.watchable_type(),
                watchable_id: watchable.id(),
                occurred_at: at,
            })
            .returning(WatchedAt::as_returning())
            .get_result(&mut self.ctx)?)
    }

    /// Most recent first.
    pub fn watch_history(&mut self, user: &User) -> Result<Vec<WatchedAt>> {
        Ok(WatchedAt::belonging_to(user)
            .order((watched_at::occurred_at.desc(), watched_at::id.desc()))
            .select(WatchedAt::as_select())
            .load(&mut self.ctx)?)
    }

    /// Load the movie or episode a watch event points at. The reference is not
    /// a foreign key, so the row may be gone.
    pub fn resolve_watch(&mut self, event: &WatchedAt) -> Result<WatchedItem> {
        let watchable = Watchable::from(event);
        let missing = || StageError::MissingRow {
            kind: watchable.watchable_type().as_str(),
            id: watchable.id(),
        };

        match watchable {
            Watchable::Movie(id) => movies::table
                .find(id)
                .select(Movie::as_select())
                .first(&mut self.ctx)
                .optional()?
                .map(WatchedItem::Movie)
                .ok_or_else(missing),
            Watchable::Episode(id) => episodes::table
                .find(id)
                .select(Episode::as_select())
                .first(&mut self.ctx)
                .optional()?
                .map(WatchedItem::Episode)
                .ok_or_else(missing),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WatchableType;
    use chrono::Duration;
    use serde_json::json;

    fn user(catalog: &mut Catalog) -> User {
        catalog.create_user("viewer@test.com", Some("Viewer"), None).unwrap()
    }

    #[test]
    fn one_watch_list_per_user() {
        let mut catalog = Catalog::in_memory();
        let user = user(&mut catalog);

        let list = catalog.create_watch_list(&user).unwrap();
        let again = catalog.create_watch_list(&user).unwrap();
        assert_eq!(list, again);
        assert_eq!(catalog.find_watch_list(&user).unwrap(), Some(list));
    }

    #[test]
    fn watch_list_keeps_insertion_order() {
        let mut catalog = Catalog::in_memory();
        let user = user(&mut catalog);
        let list = catalog.create_watch_list(&user).unwrap();

        let titles = ["The Revenant", "Deadpool", "The Big Short"];
        let mut added = Vec::new();
        for title in titles {
            let movie: Movie = catalog.create_from_guidebox(&json!({ "title": title })).unwrap();
            added.push(movie.id);
        }
        // reverse insertion of ids, to make sure order is not by movie id
        for id in added.iter().rev() {
            catalog.add_to_watch_list(&list, WatchListEntry::Movie(*id)).unwrap();
        }
        catalog.add_to_watch_list(&list, WatchListEntry::Movie(added[2])).unwrap();

        let listed: Vec<i32> = catalog
            .watch_list_movies(&list)
            .unwrap()
            .into_iter()
            .map(|movie| movie.id)
            .collect();
        assert_eq!(listed, added.iter().rev().copied().collect::<Vec<_>>());

        let show: Show = catalog.create_from_guidebox(&json!({"title": "Atlanta"})).unwrap();
        catalog.add_to_watch_list(&list, WatchListEntry::Show(show.id)).unwrap();
        assert_eq!(catalog.watch_list_shows(&list).unwrap(), vec![show]);
    }

    #[test]
    fn samples_respect_limit() {
        let mut catalog = Catalog::in_memory();
        assert!(catalog.sample_movies(10).unwrap().is_empty());

        for n in 0..12 {
            let _: Movie = catalog
                .create_from_guidebox(&json!({ "title": format!("Movie {n}") }))
                .unwrap();
        }
        assert_eq!(catalog.sample_movies(10).unwrap().len(), 10);
        assert_eq!(catalog.sample_movies(20).unwrap().len(), 12);
        assert!(catalog.sample_episodes(10).unwrap().is_empty());
    }

    #[test]
    fn watch_events_resolve_to_their_rows() {
        let mut catalog = Catalog::in_memory();
        let user = user(&mut catalog);
        let movie: Movie = catalog.create_from_guidebox(&json!({"title": "Hook"})).unwrap();
        let show: Show = catalog.create_from_guidebox(&json!({"title": "Billions"})).unwrap();
        let episode: Episode = catalog
            .create_from_guidebox(&json!({"title": "Pilot", "show": show.id}))
            .unwrap();

        let now = Utc::now().naive_utc();
        let watched_movie = catalog
            .record_watch(&user, Watchable::Movie(movie.id), now - Duration::hours(1))
            .unwrap();
        let watched_episode = catalog
            .record_watch(&user, Watchable::Episode(episode.id), now)
            .unwrap();

        assert_eq!(watched_movie.watchable_type, WatchableType::Movie);
        assert_eq!(
            catalog.resolve_watch(&watched_movie).unwrap(),
            WatchedItem::Movie(movie)
        );
        assert_eq!(
            catalog.resolve_watch(&watched_episode).unwrap(),
            WatchedItem::Episode(episode)
        );

        let history = catalog.watch_history(&user).unwrap();
        assert_eq!(history, vec![watched_episode, watched_movie]);
    }

    #[test]
    fn dangling_watch_event_is_missing() {
        let mut catalog = Catalog::in_memory();
        let user = user(&mut catalog);
        let event = catalog
            .record_watch(&user, Watchable::Episode(404), Utc::now().naive_utc())
            .unwrap();

        let err = catalog.resolve_watch(&event).unwrap_err();
        assert!(matches!(
            err,
            StageError::MissingRow {
                kind: "Episode",
                id: 404
            }
        ));
    }
}
