//! Development catalog loaded into an empty store.
//!
//! Seeding goes through [`Storage`] operations only, so it works the
//! same against either backend. Seeded games start with zero plays and
//! no ratings; aggregates only ever come from real rating records.

use crave_types::{
    Badge, DEFAULT_CATEGORY_ICON, GameType, ItemType, NewCategory, NewGame, NewStoreItem,
};

use crate::error::StoreError;
use crate::storage::Storage;

/// Seed category names, in creation order.
pub const SEED_CATEGORIES: [&str; 5] = ["Action", "Puzzle", "Racing", "Sports", "Adventure"];

/// Placeholder content URL for seeded games.
const PLACEHOLDER_GAME_URL: &str = "https://www.example.com/game-placeholder";

struct SeedGame {
    name: &'static str,
    description: &'static str,
    instructions: &'static str,
    category: usize,
    trending: bool,
    badge: Option<Badge>,
}

const SEED_GAMES: [SeedGame; 15] = [
    SeedGame {
        name: "Space Shooter",
        description: "Blast through waves of enemies in this exciting space shooter!",
        instructions: "Use arrow keys to move, space to shoot",
        category: 0,
        trending: true,
        badge: Some(Badge::Hot),
    },
    SeedGame {
        name: "Block Puzzle",
        description: "Solve challenging block puzzles to advance through levels",
        instructions: "Drag and drop blocks to complete the puzzle",
        category: 1,
        trending: true,
        badge: Some(Badge::New),
    },
    SeedGame {
        name: "Street Racer",
        description: "Race through city streets at high speed",
        instructions: "Arrow keys to steer, avoid obstacles",
        category: 2,
        trending: true,
        badge: None,
    },
    SeedGame {
        name: "Basketball Pro",
        description: "Shoot hoops and become a basketball champion",
        instructions: "Click and drag to aim, release to shoot",
        category: 3,
        trending: true,
        badge: Some(Badge::Hot),
    },
    SeedGame {
        name: "Dungeon Quest",
        description: "Explore dungeons and defeat monsters",
        instructions: "WASD to move, click to attack",
        category: 4,
        trending: true,
        badge: None,
    },
    SeedGame {
        name: "Ninja Jump",
        description: "Jump and climb through ninja training courses",
        instructions: "Space to jump, arrows to move",
        category: 0,
        trending: false,
        badge: Some(Badge::New),
    },
    SeedGame {
        name: "Match Master",
        description: "Match 3 or more gems to score points",
        instructions: "Swap adjacent gems to make matches",
        category: 1,
        trending: false,
        badge: None,
    },
    SeedGame {
        name: "Drift King",
        description: "Master the art of drifting on various tracks",
        instructions: "Hold space to drift, arrows to steer",
        category: 2,
        trending: false,
        badge: Some(Badge::Hot),
    },
    SeedGame {
        name: "Soccer Stars",
        description: "Score goals in fast-paced soccer matches",
        instructions: "Click to kick, aim for the goal",
        category: 3,
        trending: false,
        badge: None,
    },
    SeedGame {
        name: "Treasure Hunter",
        description: "Search for hidden treasures across mysterious islands",
        instructions: "Click to dig, collect treasures",
        category: 4,
        trending: false,
        badge: Some(Badge::New),
    },
    SeedGame {
        name: "Zombie Defense",
        description: "Defend your base against zombie waves",
        instructions: "Click to place turrets, upgrade for more power",
        category: 0,
        trending: false,
        badge: None,
    },
    SeedGame {
        name: "Word Search",
        description: "Find hidden words in the letter grid",
        instructions: "Click and drag to select words",
        category: 1,
        trending: false,
        badge: None,
    },
    SeedGame {
        name: "Motorcycle Rush",
        description: "Race motorcycles through challenging terrain",
        instructions: "Up to accelerate, balance with left/right",
        category: 2,
        trending: false,
        badge: None,
    },
    SeedGame {
        name: "Golf Master",
        description: "Play through 18 holes of challenging golf",
        instructions: "Click and drag to aim, release to swing",
        category: 3,
        trending: false,
        badge: None,
    },
    SeedGame {
        name: "Mystery Island",
        description: "Solve mysteries on a tropical island",
        instructions: "Click to interact with objects",
        category: 4,
        trending: false,
        badge: None,
    },
];

/// Seed avatars as `(name, price)`, cheapest first.
const SEED_AVATARS: [(&str, i64); 6] = [
    ("Cool Cat", 500),
    ("Robot Head", 750),
    ("Ninja Mask", 1000),
    ("Space Helmet", 1500),
    ("Crown", 2500),
    ("Dragon Avatar", 5000),
];

/// What [`seed_catalog`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedReport {
    /// The catalog already had categories; nothing was written.
    Skipped,
    /// The seed catalog was loaded.
    Seeded {
        /// Categories created.
        categories: usize,
        /// Games created.
        games: usize,
        /// Store items created.
        store_items: usize,
    },
}

fn compact(name: &str) -> String {
    name.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Load the development catalog if the store has no categories yet.
///
/// # Errors
///
/// Returns the first [`StoreError`] raised by the backend.
pub async fn seed_catalog(store: &dyn Storage) -> Result<SeedReport, StoreError> {
    if !store.list_categories().await?.is_empty() {
        tracing::debug!("Catalog already populated, skipping seed data");
        return Ok(SeedReport::Skipped);
    }

    let mut category_ids = Vec::with_capacity(SEED_CATEGORIES.len());
    for name in SEED_CATEGORIES {
        let category = store
            .create_category(NewCategory {
                name: name.to_owned(),
                icon: DEFAULT_CATEGORY_ICON.to_owned(),
            })
            .await?;
        category_ids.push(category.id);
    }

    let mut games = 0_usize;
    for seed in &SEED_GAMES {
        let Some(&category_id) = category_ids.get(seed.category) else {
            continue;
        };
        store
            .create_game(NewGame {
                name: seed.name.to_owned(),
                description: Some(seed.description.to_owned()),
                instructions: Some(seed.instructions.to_owned()),
                category_id,
                thumbnail_url: format!("https://picsum.photos/seed/{}/400/300", compact(seed.name)),
                iframe_url: Some(PLACEHOLDER_GAME_URL.to_owned()),
                html_content: None,
                kind: GameType::Iframe,
                badge: seed.badge,
                trending: seed.trending,
            })
            .await?;
        games = games.saturating_add(1);
    }

    for (name, price) in SEED_AVATARS {
        store
            .create_store_item(NewStoreItem {
                name: name.to_owned(),
                image_url: format!(
                    "https://api.dicebear.com/7.x/bottts/svg?seed={}",
                    compact(name)
                ),
                price,
                item_type: ItemType::Avatar,
            })
            .await?;
    }

    let report = SeedReport::Seeded {
        categories: category_ids.len(),
        games,
        store_items: SEED_AVATARS.len(),
    };
    tracing::info!(
        categories = category_ids.len(),
        games,
        store_items = SEED_AVATARS.len(),
        "Seed catalog loaded"
    );
    Ok(report)
}
