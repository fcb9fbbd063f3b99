//! Favorite-genre matching for the episode XP bonus.

use std::collections::{HashMap, HashSet};

use rand::Rng;
use rand::seq::IndexedRandom;

/// Pool a new companion's favorite genre is drawn from.
pub const GENRE_POOL: &[&str] = &[
    "Action",
    "Adventure",
    "Animation",
    "Comedy",
    "Crime",
    "Documentary",
    "Drama",
    "Fantasy",
    "Horror",
    "Mystery",
    "Romance",
    "Science Fiction",
    "Thriller",
];

pub fn pick_favorite_genre<R: Rng + ?Sized>(rng: &mut R) -> String {
    GENRE_POOL.choose(rng).copied().unwrap_or("Drama").to_string()
}

/// Decides whether an episode's genre tags count as the favorite genre.
pub trait GenreMatcher: Send + Sync {
    fn matches(&self, favorite: &str, tags: &[String]) -> bool;
}

/// Alias table with whole-name matching.
///
/// Each canonical genre lists the names providers use for it. Compound tags
/// such as "Action & Adventure" are also split on `&`, `,` and `/`. A tag
/// matches when it, or one of its parts, equals the favorite genre or one
/// of its aliases. "Action" matches "Action & Adventure" but not
/// "Adventure", and "Romance" never matches a bare "Comedy".
#[derive(Debug, Clone)]
pub struct AliasTableMatcher {
    aliases: HashMap<String, Vec<String>>,
}

impl AliasTableMatcher {
    pub fn new<I, K, V>(table: I) -> Self
    where
        I: IntoIterator<Item = (K, Vec<V>)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let aliases = table
            .into_iter()
            .map(|(canonical, names)| {
                (
                    normalize(canonical.as_ref()),
                    names.iter().map(|n| normalize(n.as_ref())).collect(),
                )
            })
            .collect();
        Self { aliases }
    }

    /// Every name the favorite genre goes by, itself and its parts included.
    fn names_for(&self, favorite: &str) -> HashSet<String> {
        let own: HashSet<String> = std::iter::once(normalize(favorite))
            .chain(parts(favorite))
            .filter(|n| !n.is_empty())
            .collect();
        let mut names = own.clone();
        for (canonical, aliases) in &self.aliases {
            if own.contains(canonical) || aliases.iter().any(|a| own.contains(a)) {
                names.insert(canonical.clone());
                names.extend(aliases.iter().cloned());
            }
        }
        names
    }
}

impl Default for AliasTableMatcher {
    fn default() -> Self {
        Self::new([
            ("science fiction", vec!["sci-fi", "scifi", "sci-fi & fantasy", "sf"]),
            ("fantasy", vec!["sci-fi & fantasy"]),
            ("action", vec!["action & adventure"]),
            ("adventure", vec!["action & adventure"]),
            ("animation", vec!["anime", "animated", "cartoon"]),
            ("documentary", vec!["docuseries", "docu"]),
            ("thriller", vec!["suspense"]),
            ("war", vec!["war & politics"]),
            ("crime", vec!["true crime"]),
            ("romance", vec!["romantic comedy", "rom-com"]),
        ])
    }
}

impl GenreMatcher for AliasTableMatcher {
    fn matches(&self, favorite: &str, tags: &[String]) -> bool {
        let names = self.names_for(favorite);
        if names.is_empty() {
            return false;
        }

        tags.iter().any(|tag| {
            let whole = normalize(tag);
            (!whole.is_empty() && names.contains(&whole)) || parts(tag).any(|p| names.contains(&p))
        })
    }
}

fn normalize(genre: &str) -> String {
    genre.trim().to_lowercase()
}

/// The genres a compound tag lists, normalized.
fn parts(genre: &str) -> impl Iterator<Item = String> + '_ {
    genre.split(['&', ',', '/']).map(normalize).filter(|p| !p.is_empty())
}
