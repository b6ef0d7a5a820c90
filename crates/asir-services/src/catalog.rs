//! Curated place names used by the mock maps importer.
//!
//! Keyed by governorate display name and category. Combinations not listed
//! here fall back to generic placeholders in the importer.

use crate::model::Category;

/// Known place names for a region/category pair. Empty when nothing is curated.
pub fn catalog_names(region: &str, category: Category) -> &'static [&'static str] {
    use Category::*;

    match (region, category) {
        ("Abha", TouristSite) => &[
            "Green Mountain (Jebel Zaraah)",
            "Art Street",
            "Al Soudah Park",
            "Abha Dam Lake",
            "Shamsan Ottoman Castle",
            "Abu Kheyal Park",
        ],
        ("Abha", Hotel) => &[
            "Abha Palace Hotel",
            "Sarawat Park Hotel",
            "Boudl Abha",
            "Citadines Abha",
        ],
        ("Abha", Restaurant) => &[
            "The Revolving Restaurant",
            "Nakhil Restaurant",
            "Jorry Elite",
            "Hashi Basha",
        ],
        ("Abha", Shopping) => &["Al Rashid Mall", "Aseer Mall", "Oasis Center"],
        ("Abha", Cafe) => &["Rain Cafe", "Boon Cafe", "Overdose Specialty Coffee"],
        ("Abha", Sports) => &["Prince Sultan Sport City", "Abha Club"],

        ("Khamis Mushait", TouristSite) => &["Bin Hamsan Heritage Village", "Al Hayat Park"],
        ("Khamis Mushait", Shopping) => &[
            "Khamis Avenue",
            "Boulevard Khamis Mushait",
            "Asir Mall",
        ],
        ("Khamis Mushait", Restaurant) => &["Herfy", "Al Tazaj", "Kudu"],
        ("Khamis Mushait", Hotel) => &["Bayat Hotel", "Mercure Khamis Mushait"],

        ("Rijal Alma", TouristSite) => &[
            "Rijal Alma Heritage Village",
            "Museum of the Tribe",
            "Honey Market",
        ],
        ("Rijal Alma", Restaurant) => &["Heritage Village Restaurant"],

        ("Tanomah", TouristSite) => &[
            "Al-Sharaf Park",
            "Tanomah Waterfall",
            "Athrub Mountain",
            "Al-Mahfar Park",
        ],
        ("Tanomah", Hotel) => &["Tanomah Aram Hotel"],

        _ => &[],
    }
}
