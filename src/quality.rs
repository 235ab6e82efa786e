//! Encode-quality scoring and extraction.
//!
//! Quality labels are free text ("1080p.WEB-DL", "CAMRip"). Scoring walks an
//! ordered rule table from highest fidelity down; the first rule whose
//! needles all appear in the uppercased input wins. The table order is the
//! contract, which is why this is a slice and not a map.

use std::sync::LazyLock;

use regex::Regex;

/// Score assigned when no rule matches (including the empty string).
pub const DEFAULT_SCORE: i32 = 50;

/// Ordered (needles, score) rules, first match wins. All needles of a rule
/// must be present as substrings of the uppercased quality label.
const SCORE_RULES: &[(&[&str], i32)] = &[
    (&["2160P", "BLURAY"], 100),
    (&["2160P", "WEB-DL"], 95),
    (&["2160P"], 90),
    (&["1080P", "BLURAY"], 85),
    (&["1080P", "WEB-DL"], 80),
    (&["1080P"], 75),
    (&["720P", "BLURAY"], 70),
    (&["720P", "WEB-DL"], 65),
    (&["720P"], 60),
    (&["480P"], 40),
    (&["CAMRIP"], 10),
];

/// Map a free-text quality label to an integer score in [0, 100].
///
/// Total and deterministic: every input maps to exactly one score.
pub fn score_quality(quality: &str) -> i32 {
    let q = quality.to_uppercase();
    for (needles, score) in SCORE_RULES {
        if needles.iter().all(|needle| q.contains(needle)) {
            return *score;
        }
    }
    DEFAULT_SCORE
}

/// Ordered patterns for pulling a quality label out of a raw torrent title.
/// Resolution tokens are tried before source tokens.
static EXTRACT_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)2160p|4K|UHD",
        r"(?i)1080p",
        r"(?i)720p",
        r"(?i)480p",
        r"(?i)BluRay|BDRip|Blu-Ray",
        r"(?i)WEB-DL|WEBDL",
        r"(?i)WEBRip",
        r"(?i)HDRip",
        r"(?i)DVDRip|DVD-Rip",
        r"(?i)CAMRip|CAM",
        r"(?i)TS|TELESYNC",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("quality pattern must compile"))
    .collect()
});

/// Extract a quality label from a raw torrent title.
///
/// Patterns are tried in order; the first match is returned with a trailing
/// "rip" standardized to "Rip". Returns "Unknown" when nothing matches.
pub fn extract_quality(title: &str) -> String {
    for pattern in EXTRACT_PATTERNS.iter() {
        if let Some(found) = pattern.find(title) {
            return standardize_rip(found.as_str());
        }
    }
    "Unknown".to_string()
}

fn standardize_rip(label: &str) -> String {
    let lower = label.to_lowercase();
    if let Some(stem_len) = lower.strip_suffix("rip").map(str::len) {
        format!("{}Rip", &label[..stem_len])
    } else {
        label.to_string()
    }
}
