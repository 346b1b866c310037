/// Staging run: pull a fixed set of guidebox titles into the catalog and build
/// sample user data (watch list, recent watch events, a collection) on top.
use std::fmt;

use chrono::Utc;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use log::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::catalog::{Catalog, CollectionDraft, CollectionMember};
use crate::error::{Result, StageError};
use crate::guidebox::{GuideboxClient, Transport};
use crate::models::{Episode, Movie, Show, User, WatchListEntry, Watchable};

const RECENTLY_WATCHED_SAMPLE: i64 = 10;

/// What to do when a title search comes back empty.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MissingResultPolicy {
    /// Log it, record it in the report and move on to the next title.
    Skip,
    /// Stop the run with `StageError::NotFound`.
    Abort,
}

/// The part of a search hit needed to fetch the full record.
#[derive(Debug, Deserialize)]
struct SearchHit {
    id: i64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SearchKind {
    Movie,
    Show,
}

impl SearchKind {
    fn as_str(&self) -> &'static str {
        match self {
            SearchKind::Movie => "movie",
            SearchKind::Show => "show",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TestUser {
    pub email: String,
    pub name: String,
    pub phone_number: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SampleCollection {
    pub display_name: String,
    pub internal_name: String,
    pub created_by: String,
    pub movies: Vec<String>,
}

/// Everything the stager will fetch and create.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StagePlan {
    pub user: TestUser,
    pub primary_shows: Vec<String>,
    pub watch_list_movies: Vec<String>,
    pub watch_list_shows: Vec<String>,
    pub collection: SampleCollection,
    pub episode_limit: usize,
    pub missing_result: MissingResultPolicy,
    /// Primary show staging stops after the first show unless this is set.
    pub stage_all_primary_shows: bool,
}

fn titles(list: &[&str]) -> Vec<String> {
    list.iter().map(|title| title.to_string()).collect()
}

impl Default for StagePlan {
    fn default() -> Self {
        StagePlan {
            user: TestUser {
                email: "testuser@test.com".to_string(),
                name: "Test User".to_string(),
                phone_number: "415-321-1234".to_string(),
            },
            primary_shows: titles(&[
                "Billions",
                "Mr.Robot",
                "Silicon Valley",
                "House of Cards",
                "Veep",
                "Suits",
                "The Good Wife",
            ]),
            watch_list_movies: titles(&[
                "The Revenant",
                "Captain America: Civil War",
                "Deadpool",
                "The Big Short",
                "XMen: Apocalypse",
            ]),
            watch_list_shows: titles(&[
                "Vikings",
                "The Night Of",
                "Vice Principals",
                "Stranger Things",
                "Atlanta",
                "Narcos",
            ]),
            collection: SampleCollection {
                display_name: "80's classics".to_string(),
                internal_name: "a test".to_string(),
                created_by: "testuser".to_string(),
                movies: titles(&[
                    "Home Alone",
                    "Batman",
                    "Hook",
                    "Gremlins",
                    "My Girl",
                    "The Karate Kid",
                    "Cool Runnings",
                    "The NeverEnding Story",
                ]),
            },
            episode_limit: 50,
            missing_result: MissingResultPolicy::Abort,
            stage_all_primary_shows: false,
        }
    }
}

/// Counts of what a run created.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StageReport {
    pub shows: usize,
    pub episodes: usize,
    pub watch_list_movies: usize,
    pub watch_list_shows: usize,
    pub watch_events: usize,
    pub collection_members: usize,
    pub skipped: Vec<String>,
}

impl fmt::Display for StageReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} show(s), {} episode(s), watch list {} movie(s) / {} show(s), {} watch event(s), {} collection member(s)",
            self.shows,
            self.episodes,
            self.watch_list_movies,
            self.watch_list_shows,
            self.watch_events,
            self.collection_members
        )?;
        if !self.skipped.is_empty() {
            write!(f, "; skipped {:?}", self.skipped)?;
        }
        Ok(())
    }
}

/// Runs the stages strictly in order, one request at a time.
pub struct Stager<'a, T> {
    client: &'a GuideboxClient<T>,
    catalog: &'a mut Catalog,
    plan: StagePlan,
    report: StageReport,
}

impl<'a, T: Transport> Stager<'a, T> {
    pub fn new(client: &'a GuideboxClient<T>, catalog: &'a mut Catalog, plan: StagePlan) -> Self {
        Stager {
            client,
            catalog,
            plan,
            report: StageReport::default(),
        }
    }

    pub fn report(&self) -> &StageReport {
        &self.report
    }

    pub async fn run(mut self) -> Result<StageReport> {
        let user = self.ensure_user()?;
        info!("Staging data for {}", user.email);

        self.stage_primary_shows().await?;
        self.stage_watch_list(&user).await?;
        self.stage_recently_watched(&user)?;
        self.stage_sample_collection().await?;

        Ok(self.report)
    }

    /// Create the test user, or reuse it when a previous run already did.
    pub fn ensure_user(&mut self) -> Result<User> {
        let wanted = &self.plan.user;
        match self
            .catalog
            .create_user(
                &wanted.email,
                Some(wanted.name.as_str()),
                Some(wanted.phone_number.as_str()),
            )
        {
            Ok(user) => Ok(user),
            Err(StageError::Database(DieselError::DatabaseError(
                DatabaseErrorKind::UniqueViolation,
                _,
            ))) => {
                info!("Test user {} already exists", wanted.email);
                let existing = match self.catalog.find_user_by_email(&wanted.email)? {
                    Some(user) => Some(user),
                    None => self.catalog.first_user()?,
                };
                existing.ok_or(StageError::Database(DieselError::NotFound))
            }
            Err(err) => Err(err),
        }
    }

    /// Search guidebox by title and keep the first hit. Duplicate titles on the
    /// guidebox side are not disambiguated.
    async fn search_first(&mut self, kind: SearchKind, title: &str) -> Result<Option<Value>> {
        let params = [("type", kind.as_str()), ("field", "title"), ("query", title)];
        let response = self.client.fetch("search", &params).await?;

        match results(&response).first() {
            Some(record) => Ok(Some(record.clone())),
            None => match self.plan.missing_result {
                MissingResultPolicy::Skip => {
                    warn!("No {} found for {:?}, skipping", kind.as_str(), title);
                    self.report.skipped.push(title.to_string());
                    Ok(None)
                }
                MissingResultPolicy::Abort => Err(StageError::NotFound {
                    kind: kind.as_str(),
                    title: title.to_string(),
                }),
            },
        }
    }

    /// Fetch the full record for each primary show plus a page of its episodes.
    ///
    /// Only the first show is staged unless the plan asks for all of them.
    pub async fn stage_primary_shows(&mut self) -> Result<Option<Show>> {
        info!("Staging primary shows");
        let mut first_show = None;

        for title in self.plan.primary_shows.clone() {
            let Some(found) = self.search_first(SearchKind::Show, &title).await? else {
                continue;
            };
            let SearchHit { id: guidebox_id } = serde_json::from_value(found).map_err(|e| {
                StageError::InvalidRecord(format!("search result for {title:?}: {e}"))
            })?;

            let record = self.client.fetch(&format!("shows/{guidebox_id}"), &[]).await?;
            let show: Show = self.catalog.create_from_guidebox(&record)?;
            self.report.shows += 1;

            let limit = self.plan.episode_limit.to_string();
            let episodes = self
                .client
                .fetch(&format!("shows/{guidebox_id}/episodes"), &[("limit", limit.as_str())])
                .await?;
            for episode in results(&episodes) {
                let mut episode = episode.clone();
                if let Some(fields) = episode.as_object_mut() {
                    fields.insert("show".to_string(), Value::from(show.id));
                }
                let _: Episode = self.catalog.create_from_guidebox(&episode)?;
                self.report.episodes += 1;
            }
            info!("Staged {} with {} episode(s)", title, results(&episodes).len());

            if first_show.is_none() {
                first_show = Some(show);
            }
            if !self.plan.stage_all_primary_shows {
                break;
            }
        }

        Ok(first_show)
    }

    /// Give the user a watch list of the plan's movies and shows.
    pub async fn stage_watch_list(&mut self, user: &User) -> Result<()> {
        info!("Staging watch list for {}", user.email);
        let list = self.catalog.create_watch_list(user)?;

        for title in self.plan.watch_list_movies.clone() {
            let Some(found) = self.search_first(SearchKind::Movie, &title).await? else {
                continue;
            };
            let movie: Movie = self.catalog.create_from_guidebox(&found)?;
            self.catalog
                .add_to_watch_list(&list, WatchListEntry::Movie(movie.id))?;
            self.report.watch_list_movies += 1;
        }

        for title in self.plan.watch_list_shows.clone() {
            let Some(found) = self.search_first(SearchKind::Show, &title).await? else {
                continue;
            };
            let show: Show = self.catalog.create_from_guidebox(&found)?;
            self.catalog
                .add_to_watch_list(&list, WatchListEntry::Show(show.id))?;
            self.report.watch_list_shows += 1;
        }
        Ok(())
    }

    /// Mark a random handful of catalog episodes and movies as watched now.
    pub fn stage_recently_watched(&mut self, user: &User) -> Result<()> {
        info!("Staging recently watched items for {}", user.email);
        let now = Utc::now().naive_utc();

        for episode in self.catalog.sample_episodes(RECENTLY_WATCHED_SAMPLE)? {
            self.catalog
                .record_watch(user, Watchable::Episode(episode.id), now)?;
            self.report.watch_events += 1;
        }
        for movie in self.catalog.sample_movies(RECENTLY_WATCHED_SAMPLE)? {
            self.catalog
                .record_watch(user, Watchable::Movie(movie.id), now)?;
            self.report.watch_events += 1;
        }
        Ok(())
    }

    /// Publish one collection and fill it with the plan's movies, in plan order.
    pub async fn stage_sample_collection(&mut self) -> Result<()> {
        let sample = self.plan.collection.clone();
        info!("Staging collection {:?}", sample.display_name);

        let collection = self.catalog.save_collection(&CollectionDraft {
            created_by: Some(sample.created_by.clone()),
            published: true,
            ..CollectionDraft::new(&sample.display_name, &sample.internal_name)
        })?;

        for title in &sample.movies {
            let Some(found) = self.search_first(SearchKind::Movie, title).await? else {
                continue;
            };
            let movie: Movie = self.catalog.create_from_guidebox(&found)?;
            self.catalog
                .add_collection_member(collection.id, CollectionMember::Movie(movie.id))?;
            self.report.collection_members += 1;
        }
        Ok(())
    }
}

fn results(response: &Value) -> &[Value] {
    response
        .get("results")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}
