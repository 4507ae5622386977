//! Category taxonomy used by the public site.
//!
//! Groups are the top-level navigation sections; every leaf category slug
//! belongs to at most one group.

/// Display order of the category groups.
pub static GROUP_ORDER: [&str; 13] = [
    "world",
    "counties",
    "politics",
    "business",
    "sports",
    "entertainment",
    "tech",
    "health",
    "education",
    "crime-security",
    "opinion",
    "lifestyle",
    "other",
];

pub const DEFAULT_ICON: &str = "📰";
pub const DEFAULT_COLOR: &str = "#34495e";

/// Leaf categories of each group.
pub static CATEGORY_GROUPS: [(&str, &[&str]); 13] = [
    ("world", &["national", "east-africa", "africa", "international", "live", "world-reports"]),
    (
        "counties",
        &["nairobi", "coast", "mountain", "lake-region", "rift-valley", "northern", "eastern", "western", "county-reports"],
    ),
    (
        "politics",
        &["politics", "governance", "legal", "elections", "parliament", "political-reports", "politics-others"],
    ),
    (
        "business",
        &[
            "business", "companies", "finance-markets", "investment", "enterprise", "economy", "banking",
            "jobs-careers", "real-estate", "agriculture", "business-reports",
        ],
    ),
    (
        "opinion",
        &["opinion", "editorials", "columnists", "bloggers", "letters", "trail-blazing", "ai-graphics", "analysis"],
    ),
    (
        "sports",
        &[
            "sports", "sport", "football", "athletics", "rugby", "motorsport", "sports-vybe", "cricket", "team-news",
            "football-transfers", "other-sports", "sports-others",
        ],
    ),
    (
        "lifestyle",
        &[
            "lifestyle", "motoring", "culture", "family", "relationships", "travel", "wellness", "fashion", "food",
            "religion-faith", "lifestyle-others",
        ],
    ),
    (
        "entertainment",
        &[
            "entertainment", "buzz", "trending", "trending-pics", "gossip", "life-stories", "music", "movies",
            "celebrity", "entertainment-others",
        ],
    ),
    (
        "tech",
        &[
            "tech", "technology", "innovations", "gadgets", "startups", "digital-life", "ai", "mobile", "gaming",
            "tech-reports", "tech-others",
        ],
    ),
    (
        "health",
        &["health", "medical-news", "wellness-fitness", "mental-health", "chronic-illnesses", "traditional-medicine"],
    ),
    (
        "education",
        &["education", "primary-secondary", "universities", "exams-results", "scholarships", "teachers-tsc"],
    ),
    ("crime-security", &["crime-security", "crime-news", "court-cases", "police-news", "road-accidents"]),
    (
        "other",
        &[
            "other", "others", "human-rights", "climate-crisis", "investigations", "interactives", "features",
            "in-pictures", "special-reports",
        ],
    ),
];

/// Navigation labels that do not slugify to their group's slug.
const DISPLAY_NAMES: [(&str, &str); 12] = [
    ("Home", "home"),
    ("Live & World", "world"),
    ("World", "world"),
    ("Counties", "counties"),
    ("Politics", "politics"),
    ("Business", "business"),
    ("Opinion", "opinion"),
    ("Sports", "sports"),
    ("Life & Style", "lifestyle"),
    ("Lifestyle", "lifestyle"),
    ("Entertainment", "entertainment"),
    ("Technology", "tech"),
];

/// Turn a display name or loose slug into a canonical slug.
///
/// `"Life & Style"` → `lifestyle`, `" Crime  Security "` → `crime-security`.
pub fn normalize_category_slug(input: &str) -> String {
    let trimmed = input.trim();
    if let Some((_, slug)) = DISPLAY_NAMES.iter().find(|(name, _)| *name == trimmed) {
        return slug.to_string();
    }

    let mut slug = String::with_capacity(trimmed.len());
    for ch in trimmed.to_lowercase().chars() {
        let ch = if ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-' { ch } else { '-' };
        if ch == '-' && slug.ends_with('-') {
            continue;
        }
        slug.push(ch);
    }
    slug.trim_matches('-').to_string()
}

pub fn is_main_category_group(slug: &str) -> bool {
    GROUP_ORDER.contains(&slug)
}

/// Position of `slug` in [`GROUP_ORDER`], or `-1`.
pub fn display_order(slug: &str) -> i64 {
    GROUP_ORDER
        .iter()
        .position(|s| *s == slug)
        .map(|i| i as i64)
        .unwrap_or(-1)
}

/// The group a leaf category belongs to.
pub fn parent_group(slug: &str) -> Option<&'static str> {
    CATEGORY_GROUPS
        .iter()
        .find(|(_, leaves)| leaves.contains(&slug))
        .map(|(group, _)| *group)
}

pub fn sub_categories(group: &str) -> &'static [&'static str] {
    CATEGORY_GROUPS
        .iter()
        .find(|(g, _)| *g == group)
        .map(|(_, leaves)| *leaves)
        .unwrap_or(&[])
}

pub fn category_icon(slug: &str) -> &'static str {
    match slug {
        "world" => "🌍",
        "counties" => "🏢",
        "politics" => "🏛️",
        "business" => "💼",
        "opinion" => "💭",
        "sports" => "⚽",
        "lifestyle" => "🎭",
        "entertainment" => "🎉",
        "tech" => "💻",
        "health" => "🏥",
        "education" => "📚",
        "crime-security" => "🚔",
        "other" => "📌",
        _ => DEFAULT_ICON,
    }
}

pub fn category_color(slug: &str) -> &'static str {
    match slug {
        "world" => "#2563eb",
        "counties" | "education" => "#3498db",
        "politics" => "#e74c3c",
        "business" => "#2ecc71",
        "opinion" => "#9b59b6",
        "sports" => "#f39c12",
        "lifestyle" => "#e91e63",
        "entertainment" => "#ff6b6b",
        "tech" => "#1abc9c",
        "health" => "#16a085",
        "crime-security" => "#c0392b",
        _ => DEFAULT_COLOR,
    }
}
