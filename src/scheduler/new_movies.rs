//! Announcements of new 2160p movies on YTS.

use chrono::{Datelike, Utc};
use chrono_tz::Tz;
use sea_orm::DatabaseConnection;
use serenity::all::{ChannelId, CreateEmbed, CreateEmbedFooter, UserId};
use serenity::async_trait;
use std::collections::HashSet;
use std::sync::Arc;

use crate::{
    discord::{MessageSink, OutgoingMessage},
    error::AppError,
    model::movie::{Movie, YtsMovie},
    scheduler::{schedule::CronSchedule, Task},
    service::{seen::SeenItems, yts::YtsClient},
};

const QUALITY: &str = "2160p";
const TOP_MOVIES: usize = 30;
const SEEN_KEY: &str = "yts_seen_movies";
const SEEN_MAX_LEN: usize = 1000;

pub fn schedule(timezone: Tz) -> CronSchedule {
    CronSchedule::new("0 * * * *", timezone).run_on_start()
}

/// The `limit` most-seeded movies that have a torrent of `quality`.
///
/// Movies listed more than once are kept once.
pub fn top_movies(listings: Vec<YtsMovie>, quality: &str, limit: usize) -> Vec<Movie> {
    let mut imdb_ids = HashSet::new();
    let mut movies: Vec<Movie> = listings
        .into_iter()
        .filter_map(|listing| {
            let imdb_id = listing.imdb_code.clone();
            let movie = Movie::from_yts(listing, quality);
            if movie.is_none() {
                tracing::error!("Movie {} doesn't have a {} torrent", imdb_id, quality);
            }
            movie
        })
        .filter(|movie| imdb_ids.insert(movie.imdb_id.clone()))
        .collect();

    movies.sort_by(|a, b| b.seeds.cmp(&a.seeds));
    movies.truncate(limit);
    movies
}

/// Message announcing `movie`, mentioning `owner` if set.
pub fn movie_message(movie: &Movie, owner: Option<UserId>) -> OutgoingMessage {
    let embed = CreateEmbed::new()
        .title(&movie.title)
        .url(movie.imdb_url())
        .image(&movie.image)
        .field("Rating", format!("{}/10", movie.rating), true)
        .field("Year", movie.year.to_string(), true)
        .field("Genres", movie.genres.join(", "), false)
        .footer(CreateEmbedFooter::new(format!(
            "{} • {} • P/S: {} / {}",
            movie.quality, movie.size, movie.peers, movie.seeds
        )));

    let content = match owner {
        Some(owner) => format!("<@{}> new movie:", owner),
        None => "New movie:".to_string(),
    };

    OutgoingMessage::text(content).embed(embed)
}

pub struct NewMoviesTask {
    db: DatabaseConnection,
    yts: YtsClient,
    sink: Arc<dyn MessageSink>,
    channel_id: ChannelId,
    owner: Option<UserId>,
}

impl NewMoviesTask {
    pub fn new(
        db: DatabaseConnection,
        yts: YtsClient,
        sink: Arc<dyn MessageSink>,
        channel_id: ChannelId,
        owner: Option<UserId>,
    ) -> Self {
        Self {
            db,
            yts,
            sink,
            channel_id,
            owner,
        }
    }

    async fn list_recent_movies(&self) -> Result<Vec<Movie>, AppError> {
        let year = Utc::now().year();
        let mut listings = self.yts.list_all_movies(&year.to_string(), QUALITY).await?;
        listings.extend(
            self.yts
                .list_all_movies(&(year - 1).to_string(), QUALITY)
                .await?,
        );

        Ok(top_movies(listings, QUALITY, TOP_MOVIES))
    }
}

#[async_trait]
impl Task for NewMoviesTask {
    fn name(&self) -> &str {
        "new_movies"
    }

    async fn work(&self) -> Result<(), AppError> {
        let movies = self.list_recent_movies().await?;
        let seen = SeenItems::new(&self.db, SEEN_KEY, SEEN_MAX_LEN);
        let new_movies = seen
            .filter_unseen(movies, |movie| movie.imdb_id.clone())
            .await?;

        tracing::info!("Got {} new movies", new_movies.len());

        for movie in new_movies {
            tracing::info!("Handling movie {}", movie.imdb_id);

            self.sink
                .send(self.channel_id, movie_message(&movie, self.owner))
                .await?;
            seen.mark_seen([movie.imdb_id]).await?;
        }

        Ok(())
    }
}
