//! Torrent title parsing and Russian localization.
//!
//! Raw release names arrive as strings like "The Bear S03E05 1080p WEB-DL".
//! [`parse_series_title`] strips season/episode markers, and
//! [`localize_title`] maps known English titles to their Russian catalog
//! names.

use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};

/// A release name split into the series title and optional episode marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTitle {
    pub title: String,
    pub season: Option<i32>,
    pub episode: Option<i32>,
}

/// Season/episode marker patterns, tried in order. The first capture is the
/// title, the second the season, the third the episode.
static SERIES_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)^(.+?)\s+S(\d{1,2})E(\d{1,2})",
        r"(?i)^(.+?)\s+(\d{1,2})x(\d{2})",
        r"(?i)^(.+?)\s+Season\s+(\d{1,2})\s+Episode\s+(\d{1,2})",
        r"(?i)^(.+?)\s+S(\d{1,2})\s+E(\d{1,2})",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("series pattern must compile"))
    .collect()
});

/// Split a raw release name into title and season/episode numbers.
///
/// Recognizes "S01E05", "1x05", "Season 1 Episode 5" and "S01 E05" markers.
/// When no marker matches, the whole (trimmed) input becomes the title and
/// season/episode stay `None`.
pub fn parse_series_title(raw: &str) -> ParsedTitle {
    for pattern in SERIES_PATTERNS.iter() {
        if let Some(captures) = pattern.captures(raw) {
            let season = captures[2].parse().ok();
            let episode = captures[3].parse().ok();
            if let (Some(season), Some(episode)) = (season, episode) {
                return ParsedTitle {
                    title: captures[1].trim().to_string(),
                    season: Some(season),
                    episode: Some(episode),
                };
            }
        }
    }
    ParsedTitle {
        title: raw.trim().to_string(),
        season: None,
        episode: None,
    }
}

/// English-to-Russian title table. Ordered: franchise entries with subtitles
/// come before their bare franchise name so containment matching picks the
/// most specific key.
const TRANSLATIONS: &[(&str, &str)] = &[
    // Movies
    ("Dune: Part Two", "Дюна: Часть вторая"),
    ("Dune", "Дюна"),
    ("Oppenheimer", "Оппенгеймер"),
    ("Barbie", "Барби"),
    ("John Wick: Chapter 4", "Джон Уик 4"),
    ("John Wick", "Джон Уик"),
    ("Spider-Man: Across the Spider-Verse", "Человек-паук: Через вселенные"),
    ("Spider-Man", "Человек-паук"),
    ("Fast X", "Форсаж 10"),
    ("The Flash", "Флэш"),
    ("Indiana Jones", "Индиана Джонс"),
    ("Mission: Impossible", "Миссия невыполнима"),
    ("Transformers", "Трансформеры"),
    ("Napoleon", "Наполеон"),
    ("Avatar", "Аватар"),
    ("Top Gun", "Лучший стрелок"),
    ("The Matrix", "Матрица"),
    ("Inception", "Начало"),
    ("Interstellar", "Интерстеллар"),
    ("The Dark Knight", "Темный рыцарь"),
    ("Avengers", "Мстители"),
    ("Iron Man", "Железный человек"),
    ("Thor", "Тор"),
    ("Captain America", "Капитан Америка"),
    ("Black Widow", "Черная вдова"),
    // Series
    ("The Bear", "Медведь"),
    ("House of the Dragon", "Дом дракона"),
    ("The Last of Us", "Одни из нас"),
    ("Wednesday", "Среда"),
    ("Stranger Things", "Очень странные дела"),
    ("Game of Thrones", "Игра престолов"),
    ("Breaking Bad", "Во все тяжкие"),
    ("Better Call Saul", "Лучше звоните Солу"),
    ("The Crown", "Корона"),
    ("Squid Game", "Игра в кальмара"),
    ("Money Heist", "Бумажный дом"),
    ("Ozark", "Озарк"),
    ("The Witcher", "Ведьмак"),
    ("Succession", "Наследники"),
    ("The Office", "Офис"),
    ("Friends", "Друзья"),
    ("Sherlock", "Шерлок"),
    ("The Walking Dead", "Ходячие мертвецы"),
    ("Lost", "Остаться в живых"),
    ("Prison Break", "Побег"),
    ("Dexter", "Декстер"),
    // Reality and panel shows
    ("Antiques Roadshow", "Дорога антиквариата"),
    ("Naked and Afraid Apocalypse", "Голые и напуганные: Апокалипсис"),
    ("Naked and Afraid", "Голые и напуганные"),
    ("60 Minutes", "60 минут"),
    ("Signs of a Psychopath", "Признаки психопата"),
    ("The Great Food Truck Race", "Гонка фургонов с едой"),
    ("Big Brother US", "Большой брат США"),
    ("Big Brother", "Большой брат"),
    ("Love Is Blind UK", "Любовь слепа: Великобритания"),
    ("Love Is Blind", "Любовь слепа"),
    ("Evil Lives Here", "Зло живет здесь"),
    ("In the Eye of the Storm", "В эпицентре бури"),
    ("The Twelve AU", "Двенадцать (Австралия)"),
    ("Twelve", "Двенадцать"),
    ("Women Wearing Shoulder Pads", "Женщины в плечевых накладках"),
    (
        "90 Day Fiance Happily Ever After Pillow Talk",
        "Жених за 90 дней: Обсуждение",
    ),
    (
        "90 Day Fiance Happily Ever After",
        "Жених за 90 дней: И жили они долго",
    ),
    ("90 Day Fiance", "Жених за 90 дней"),
    ("The Runarounds", "Беготня"),
    ("Taskmaster NZ", "Главный по заданиям: Новая Зеландия"),
    ("Taskmaster", "Главный по заданиям"),
    ("The Block AU", "Квартал (Австралия)"),
    ("Survivor AU Drop Your Buffs", "Выживший: Австралия - Сбрось баф"),
    ("Survivor AU", "Выживший: Австралия"),
    ("Survivor", "Выживший"),
    ("The Traitors Ireland Uncloaked", "Предатели: Ирландия разоблачена"),
    ("The Traitors", "Предатели"),
    ("Countryfile", "Сельская жизнь"),
    ("Moonlit Reunion", "Лунное воссоединение"),
    ("My Troublesome Star", "Моя проблемная звезда"),
    // Anime
    ("Demon Slayer", "Клинок, рассекающий демонов"),
    ("Attack on Titan", "Атака титанов"),
    ("My Hero Academia", "Моя геройская академия"),
    ("Jujutsu Kaisen", "Магическая битва"),
    ("One Piece", "Ван Пис"),
    ("Naruto", "Наруто"),
    ("Dragon Ball", "Драконий жемчуг"),
    ("Death Note", "Тетрадь смерти"),
    ("Spy x Family", "Шпион х Семья"),
    ("SAKAMOTO DAYS", "Дни Сакамото"),
    ("Summer Pockets", "Летние карманы"),
    ("Sword of the Demon Hunter", "Меч охотника на демонов"),
    ("Grand Blue Dreaming", "Великая голубая мечта"),
];

/// Localize a title to its Russian catalog name.
///
/// An exact table match returns the Russian title outright. Otherwise the
/// first key contained (case-insensitively) in the input is replaced in
/// place, preserving the surrounding text. Unknown titles pass through
/// unchanged.
pub fn localize_title(title: &str) -> String {
    for (english, russian) in TRANSLATIONS {
        if title == *english {
            return (*russian).to_string();
        }
    }

    let lowered = title.to_lowercase();
    for (english, russian) in TRANSLATIONS {
        if lowered.contains(&english.to_lowercase()) {
            let pattern = RegexBuilder::new(&regex::escape(english))
                .case_insensitive(true)
                .build()
                .expect("escaped translation key must compile");
            return pattern.replace_all(title, *russian).into_owned();
        }
    }

    title.to_string()
}
