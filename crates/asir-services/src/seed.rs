//! First-run dataset written when the store is empty.

use crate::model::{Category, Governorate, Place};

fn seed_place(
    id: &str,
    name: &str,
    category: Category,
    rating: f64,
    short_title: &str,
    description: Option<&str>,
    image: u32,
    query: &str,
) -> Place {
    Place {
        id: id.to_string(),
        name: name.to_string(),
        category,
        rating,
        short_title: short_title.to_string(),
        description: description.map(str::to_string),
        image_url: format!("https://picsum.photos/400/300?random={}", image),
        google_maps_url: format!("https://www.google.com/maps/search/?api=1&query={}", query),
        is_manual: true,
    }
}

fn seed_governorate(
    id: &str,
    name: &str,
    arabic_name: &str,
    image: u32,
    description: &str,
    places: Vec<Place>,
) -> Governorate {
    Governorate {
        id: id.to_string(),
        name: name.to_string(),
        arabic_name: arabic_name.to_string(),
        image_url: format!("https://picsum.photos/800/600?random={}", image),
        description: description.to_string(),
        places,
    }
}

/// The fixed seed list. Always returns the same content.
pub fn seed_governorates() -> Vec<Governorate> {
    vec![
        seed_governorate(
            "abha",
            "Abha",
            "أبها",
            1,
            "The capital of Asir province, known for its mild climate and foggy mountains.",
            vec![
                seed_place(
                    "p1",
                    "High City (Al Madinah Al Aliya)",
                    Category::TouristSite,
                    4.7,
                    "Scenic Viewpoint",
                    Some("A beautiful misty viewpoint overlooking the city."),
                    10,
                    "High+City+Abha+Saudi+Arabia",
                ),
                seed_place(
                    "p2",
                    "Blue Inn Hotel",
                    Category::Hotel,
                    4.5,
                    "5-Star Hotel",
                    None,
                    11,
                    "Blue+Inn+Hotel+Abha+Saudi+Arabia",
                ),
            ],
        ),
        seed_governorate(
            "khamis",
            "Khamis Mushait",
            "خميس مشيط",
            2,
            "A major commercial and industrial center in the region.",
            Vec::new(),
        ),
        seed_governorate(
            "rijal-alma",
            "Rijal Alma",
            "رجال ألمع",
            3,
            "A heritage village famous for its stone and quartz architecture.",
            Vec::new(),
        ),
        seed_governorate(
            "tanomah",
            "Tanomah",
            "تنومة",
            4,
            "Known for its cascading waterfalls and lush green mountains.",
            Vec::new(),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_seed_shape() {
        let seed = seed_governorates();
        let ids: Vec<_> = seed.iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, vec!["abha", "khamis", "rijal-alma", "tanomah"]);
        assert_eq!(seed[0].places.len(), 2);
        assert!(seed[1..].iter().all(|g| g.places.is_empty()));
    }

    #[test]
    fn test_seed_ids_unique() {
        let seed = seed_governorates();
        let ids: HashSet<_> = seed.iter().map(|g| &g.id).collect();
        assert_eq!(ids.len(), seed.len());
    }

    #[test]
    fn test_seed_places_are_manual() {
        let seed = seed_governorates();
        assert!(seed.iter().flat_map(|g| &g.places).all(|p| p.is_manual));
        assert!(seed[0].place("p2").is_some_and(|p| p.description.is_none()));
    }

    #[test]
    fn test_seed_is_stable() {
        assert_eq!(seed_governorates(), seed_governorates());
    }
}
