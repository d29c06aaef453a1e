//! Collection statistics computed from catalog listings.

use serde::Serialize;

use super::{Episode, Movie, Music, Season, Show, Song};

/// Summary of the movie collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MovieStats {
    pub movies: usize,
    pub media: usize,
    /// Minutes.
    pub total_length: i64,
}

impl MovieStats {
    pub fn compute(movies: &[Movie]) -> Self {
        Self {
            movies: movies.len(),
            media: movies.iter().map(|m| m.media.len()).sum(),
            total_length: movies.iter().map(Movie::total_length).sum(),
        }
    }
}

/// Summary of the TV show collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ShowStats {
    pub shows: usize,
    pub seasons: usize,
    pub episodes: usize,
    /// Minutes.
    pub total_length: i64,
}

impl ShowStats {
    pub fn compute(shows: &[Show], seasons: &[Season], episodes: &[Episode]) -> Self {
        Self {
            shows: shows.len(),
            seasons: seasons.len(),
            episodes: episodes.len(),
            total_length: episodes.iter().map(|e| i64::from(e.length)).sum(),
        }
    }
}

/// Summary of the music collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MusicStats {
    pub music: usize,
    pub media: i64,
    pub songs: usize,
    /// Seconds.
    pub total_length: i64,
}

impl MusicStats {
    pub fn compute(music: &[Music], songs: &[Song]) -> Self {
        Self {
            music: music.len(),
            media: music.iter().map(|m| i64::from(m.media_count)).sum(),
            songs: songs.len(),
            total_length: songs.iter().map(|s| i64::from(s.length)).sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use mediashelf_core::entity::RowMeta;

    use super::*;
    use crate::models::Medium;

    fn movie(lengths: &[i32]) -> Movie {
        Movie {
            meta: RowMeta::unsaved(),
            czech_name: "Film".into(),
            original_name: "Film".into(),
            year: 2000,
            languages: vec!["cs".into()],
            subtitles: vec![],
            media: (1..)
                .zip(lengths)
                .map(|(number, &length)| Medium {
                    id: None,
                    number,
                    length,
                })
                .collect(),
            csfd: None,
            imdb_code: None,
            wiki_en: None,
            wiki_cz: None,
            picture: None,
            note: None,
            genres: vec![],
        }
    }

    fn song(length: i32) -> Song {
        Song {
            meta: RowMeta::unsaved(),
            music_id: 1,
            name: "Track".into(),
            length,
            note: None,
        }
    }

    #[test]
    fn empty_collections_are_zero() {
        assert_eq!(MovieStats::compute(&[]), MovieStats::default());
        assert_eq!(ShowStats::compute(&[], &[], &[]), ShowStats::default());
        assert_eq!(MusicStats::compute(&[], &[]), MusicStats::default());
    }

    #[test]
    fn movie_stats_sum_media() {
        let stats = MovieStats::compute(&[movie(&[90, 30]), movie(&[120])]);
        assert_eq!(
            stats,
            MovieStats {
                movies: 2,
                media: 3,
                total_length: 240,
            }
        );
    }

    #[test]
    fn music_stats_sum_songs() {
        let album = Music {
            meta: RowMeta::unsaved(),
            name: "Album".into(),
            wiki_en: None,
            wiki_cz: None,
            media_count: 2,
            note: None,
        };
        let stats = MusicStats::compute(&[album], &[song(200), song(100)]);
        assert_eq!(stats.media, 2);
        assert_eq!(stats.songs, 2);
        assert_eq!(stats.total_length, 300);
    }
}
