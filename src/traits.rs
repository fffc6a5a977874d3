//! Heritable traits: the 100-point allocation and its conversion into
//! physical quantities.

use crate::random::normal_in_range;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Points shared among the four traits of a generation-0 agent
pub const TRAIT_BUDGET: f64 = 100.0;

/// Pixels per second at 100 speed points
pub const MAX_SPEED: f64 = 250.0;
/// Size multiplier at 100 size points
pub const MAX_SIZE: f64 = 3.0;
/// Size used below `MIN_SIZE_POINTS`, so tiny agents stay visible
pub const TINY_SIZE: f64 = 0.3;
pub const MIN_SIZE_POINTS: f64 = 10.0;
/// Sensing radius in pixels at 100 vision points
pub const MAX_VISION: f64 = 500.0;
/// Simulated milliseconds of life at 100 stamina points
pub const MAX_STAMINA: f64 = 20_000.0;

/// The four heritable traits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Trait {
    Speed,
    Size,
    Vision,
    Stamina,
}

impl Trait {
    pub const ALL: [Trait; 4] = [Trait::Speed, Trait::Size, Trait::Vision, Trait::Stamina];
}

/// Raw trait points as allocated at birth or inherited with mutation
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TraitPoints {
    pub speed: f64,
    pub size: f64,
    pub vision: f64,
    pub stamina: f64,
}

impl TraitPoints {
    pub fn new(speed: f64, size: f64, vision: f64, stamina: f64) -> Self {
        Self {
            speed,
            size,
            vision,
            stamina,
        }
    }

    #[inline]
    pub fn get(&self, t: Trait) -> f64 {
        match t {
            Trait::Speed => self.speed,
            Trait::Size => self.size,
            Trait::Vision => self.vision,
            Trait::Stamina => self.stamina,
        }
    }

    #[inline]
    pub fn set(&mut self, t: Trait, value: f64) {
        match t {
            Trait::Speed => self.speed = value,
            Trait::Size => self.size = value,
            Trait::Vision => self.vision = value,
            Trait::Stamina => self.stamina = value,
        }
    }

    pub fn sum(&self) -> f64 {
        self.speed + self.size + self.vision + self.stamina
    }

    /// Apply `f` to every trait
    pub fn map(&self, mut f: impl FnMut(Trait, f64) -> f64) -> TraitPoints {
        let mut out = *self;
        for t in Trait::ALL {
            out.set(t, f(t, self.get(t)));
        }
        out
    }

    /// Convert points into physical quantities
    pub fn derive(&self) -> DerivedTraits {
        DerivedTraits::from_points(self)
    }
}

/// Physical quantities derived once at birth
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedTraits {
    /// Movement speed in pixels per second
    pub speed: f64,
    /// Visual and collision scale multiplier
    pub size: f64,
    /// Sensing radius in pixels
    pub vision: f64,
    /// Time-alive budget in simulated milliseconds
    pub stamina: f64,
}

impl DerivedTraits {
    pub fn from_points(points: &TraitPoints) -> Self {
        let size = if points.size < MIN_SIZE_POINTS {
            TINY_SIZE
        } else {
            points.size / TRAIT_BUDGET * MAX_SIZE
        };
        Self {
            speed: points.speed / TRAIT_BUDGET * MAX_SPEED,
            size,
            vision: points.vision / TRAIT_BUDGET * MAX_VISION,
            stamina: points.stamina / TRAIT_BUDGET * MAX_STAMINA,
        }
    }
}

/// Distributes the trait budget for generation-0 agents.
///
/// Traits are visited in a random order; each but the last draws
/// `floor(normal(0, remaining))` points and the last takes whatever is left,
/// so the total is always exactly the budget.
#[derive(Debug, Clone)]
pub struct TraitAllocator {
    budget: f64,
}

impl Default for TraitAllocator {
    fn default() -> Self {
        Self {
            budget: TRAIT_BUDGET,
        }
    }
}

impl TraitAllocator {
    pub fn new(budget: f64) -> Self {
        Self { budget }
    }

    pub fn budget(&self) -> f64 {
        self.budget
    }

    pub fn allocate<R: Rng + ?Sized>(&self, rng: &mut R) -> TraitPoints {
        let mut order = Trait::ALL;
        order.shuffle(rng);

        let mut remaining = self.budget;
        let mut points = TraitPoints::default();
        let (rest, last) = order.split_at(order.len() - 1);

        for &t in rest {
            let v = normal_in_range(rng, 0.0, remaining).floor();
            points.set(t, v);
            remaining -= v;
        }
        points.set(last[0], remaining);

        points
    }
}
