//! Lineage naming and colouring for generation-0 families.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

static ADJECTIVES: &[&str] = &[
    "Thunder", "Mighty", "Electric", "Fierce", "Swift", "Savage", "Golden", "Brave", "Daring",
    "Radiant", "Vibrant", "Glorious", "Noble", "Fearless", "Epic", "Valiant", "Legendary",
    "Majestic", "Renegade", "Furious", "Unstoppable", "Victorious", "Supreme", "Mystic", "Ethereal",
    "Triumphant", "Divine", "Intrepid", "Invincible", "Spectacular", "Gallant", "Robust",
    "Wondrous", "Resolute", "Dazzling", "Indomitable", "Tenacious", "Dauntless", "Exalted",
    "Grand", "Mightiest", "Unbeatable", "Boundless", "Stellar", "Everlasting", "Unyielding",
    "Unforgettable", "Infinite", "Vivid", "Unwavering", "Magnificent", "Energetic", "Stalwart", "Titanic", "Heroic",
    "Vigilant", "Imperial", "Fantastic", "Courageous", "Luminous", "Mysterious", "Enigmatic",
    "Dynamic", "Valorous", "Stunning", "Brilliant", "Empowered", "Breathtaking", "Bold", "Limitless", "Commanding",
    "Harmonious", "Inspiring", "Exquisite", "Regal", "Resplendent", "Unbreakable", "Visionary",
    "Dominant", "Peerless", "Astounding", "Sensational", "Unassailable",
];

static NOUNS: &[&str] = &[
    "Snapper", "Hunks", "Slam", "Dunkers", "Warriors", "Titans", "Dragons", "Champions", "Lions",
    "Pirates", "Tigers", "Juggernauts", "Spartans", "Gladiators", "Hurricanes", "Legends",
    "Cobras", "Phantoms", "Ravens", "Wolves", "Samurais", "Guardians", "Knights", "Sirens",
    "Rebels", "Mavericks", "Vikings", "Hawks", "Panthers", "Saviors", "Reapers", "Avengers",
    "Storm", "Ninjas", "Bandits", "Outlaws", "Raiders", "Centurions", "Legion", "Emperors",
    "Warlords", "Conquerors", "Monarchs", "Sentinels", "Challengers", "Crusaders", "Barbarians",
    "Destroyers", "Warlocks", "Enforcers", "Commanders", "Executors", "Vipers", "Pharaohs", "Raptors",
    "Colossus", "Heroes", "Phenoms", "Chargers", "Blitz", "Assassins", "Dominators", "Rangers",
    "Crushers", "Bombers", "Demons", "Rockets", "Explorers", "Aces", "Devils", "Screamers",
    "Wildcats", "Highlanders", "Stallions", "Bulldogs", "Chiefs", "Dynasty", "Hornets", "Sharks",
    "Patriots", "Havoc", "Nemesis", "Phoenix", "Wizards", "Fury", "Steel", "Pioneers",
    "Samurai", "Defenders", "Saber", "Sultans", "Steelers", "Commandos",
];

static ARTICLES: &[&str] = &["The"];

/// Largest lineage colour value
pub const MAX_COLOR: u32 = 0xFF_FFFF;

/// Identity of a family: all descendants of one generation-0 agent share it
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineageKey {
    pub name: String,
    /// 24-bit RGB colour
    pub color: u32,
}

impl LineageKey {
    pub fn new(name: impl Into<String>, color: u32) -> Self {
        Self {
            name: name.into(),
            color: color & MAX_COLOR,
        }
    }

    /// Random name and colour for a fresh lineage
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            name: generate_name(rng),
            color: rng.gen_range(0..MAX_COLOR),
        }
    }

    /// Colour as `#rrggbb`
    pub fn color_hex(&self) -> String {
        format!("#{:06x}", self.color)
    }

    /// Red, green and blue components
    pub fn rgb(&self) -> (u8, u8, u8) {
        (
            ((self.color >> 16) & 0xff) as u8,
            ((self.color >> 8) & 0xff) as u8,
            (self.color & 0xff) as u8,
        )
    }
}

impl fmt::Display for LineageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.color_hex())
    }
}

fn pick<R: Rng + ?Sized>(rng: &mut R, words: &'static [&'static str]) -> &'static str {
    words.choose(rng).copied().unwrap_or("Nameless")
}

/// Either "The <word>" or "<Adjective><Noun>", with equal odds
pub fn generate_name<R: Rng + ?Sized>(rng: &mut R) -> String {
    if rng.gen_bool(0.5) {
        let pool = if rng.gen_bool(0.5) { ADJECTIVES } else { NOUNS };
        format!("{} {}", pick(rng, ARTICLES), pick(rng, pool))
    } else {
        format!("{}{}", pick(rng, ADJECTIVES), pick(rng, NOUNS))
    }
}
