use serde::Deserialize;

/// Torrent variant of a YTS movie.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Torrent {
    pub quality: String,
    #[serde(default)]
    pub size: String,
    #[serde(default)]
    pub peers: u32,
    #[serde(default)]
    pub seeds: u32,
}

/// Movie entry of the YTS list API.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct YtsMovie {
    pub imdb_code: String,
    pub title_english: String,
    pub year: u32,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub large_cover_image: String,
    #[serde(default)]
    pub rating: f32,
    #[serde(default)]
    pub torrents: Vec<Torrent>,
}

#[derive(Debug, Deserialize)]
pub struct YtsListData {
    #[serde(default)]
    pub movies: Vec<YtsMovie>,
}

#[derive(Debug, Deserialize)]
pub struct YtsListResponse {
    pub data: YtsListData,
}

/// A movie worth announcing: one specific torrent quality of a YTS movie.
#[derive(Debug, Clone, PartialEq)]
pub struct Movie {
    pub imdb_id: String,
    pub title: String,
    pub year: u32,
    pub genres: Vec<String>,
    pub image: String,
    pub rating: f32,
    pub quality: String,
    pub size: String,
    pub peers: u32,
    pub seeds: u32,
}

impl Movie {
    /// Builds a movie from its torrent of the given quality, if it has one.
    pub fn from_yts(movie: YtsMovie, quality: &str) -> Option<Self> {
        let torrent = movie
            .torrents
            .into_iter()
            .find(|torrent| torrent.quality == quality)?;

        Some(Self {
            imdb_id: movie.imdb_code,
            title: movie.title_english,
            year: movie.year,
            genres: movie.genres,
            image: movie.large_cover_image,
            rating: movie.rating,
            quality: torrent.quality,
            size: torrent.size,
            peers: torrent.peers,
            seeds: torrent.seeds,
        })
    }

    pub fn imdb_url(&self) -> String {
        format!("https://www.imdb.com/title/{}/", self.imdb_id)
    }
}
