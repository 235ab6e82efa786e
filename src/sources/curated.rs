//! Curated popular releases.
//!
//! A small built-in table of well-known recent releases, used to keep the
//! catalog populated even when every external feed is down. Entries carry a
//! pre-localized title and a fixed quality label.

use filmradar_common::MediaKind;

use crate::quality::score_quality;
use crate::sources::MovieRecord;

/// (title, year, quality, rating)
const CURATED_RELEASES: &[(&str, i32, &str, f64)] = &[
    ("Дюна: Часть вторая", 2024, "2160p.BluRay", 8.5),
    ("Оппенгеймер", 2023, "1080p.BluRay", 8.4),
    ("Джон Уик 4", 2023, "2160p.WEB-DL", 7.7),
    ("Человек-паук: Через вселенные", 2023, "1080p.WEB-DL", 8.7),
    ("Барби", 2023, "1080p.WEBRip", 6.9),
    ("Форсаж 10", 2023, "720p.WEBRip", 5.8),
];

/// Build records for the curated table.
pub fn releases() -> Vec<MovieRecord> {
    CURATED_RELEASES
        .iter()
        .map(|&(title, year, quality, rating)| {
            let mut record = MovieRecord::new(title, MediaKind::Movie);
            record.year = Some(year);
            record.imdb_rating = Some(rating);
            record.description = Some(format!(
                "Популярный релиз {year} года в качестве {quality}"
            ));
            record.quality = Some(quality.to_string());
            record.source_quality_score = score_quality(quality);
            record
        })
        .collect()
}
