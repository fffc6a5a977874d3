//! The finite food supply agents compete for.

use crate::error::{Result, SimError};
use crate::geometry::{Bounds, Vec2};
use crate::random::random_heading;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Unique food identifier within a generation
pub type FoodId = u32;

/// A drifting food item, bouncing elastically off the world edges
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodItem {
    pub id: FoodId,
    pub position: Vec2,
    pub velocity: Vec2,
}

impl FoodItem {
    pub fn new(id: FoodId, position: Vec2, velocity: Vec2) -> Self {
        Self {
            id,
            position,
            velocity,
        }
    }

    /// Advance by `dt` seconds, reflecting off any edge crossed
    pub fn step(&mut self, dt: f64, bounds: &Bounds) {
        let mut p = self.position + self.velocity * dt;

        if p.x < 0.0 {
            p.x = -p.x;
            self.velocity.x = self.velocity.x.abs();
        } else if p.x > bounds.width {
            p.x = 2.0 * bounds.width - p.x;
            self.velocity.x = -self.velocity.x.abs();
        }
        if p.y < 0.0 {
            p.y = -p.y;
            self.velocity.y = self.velocity.y.abs();
        } else if p.y > bounds.height {
            p.y = 2.0 * bounds.height - p.y;
            self.velocity.y = -self.velocity.y.abs();
        }

        self.position = bounds.clamp(p);
    }
}

/// Ordered collection of live food items.
///
/// An item present in the pool has never been consumed; consumption removes
/// it immediately so a second consumer can never see it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FoodPool {
    items: Vec<FoodItem>,
    spawned: usize,
    consumed: Vec<FoodId>,
}

impl FoodPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a pool from explicit items
    pub fn from_items(items: Vec<FoodItem>) -> Self {
        let spawned = items.len();
        Self {
            items,
            spawned,
            consumed: Vec::new(),
        }
    }

    /// Spawn `count` items at uniformly random integer positions, each with a
    /// random heading at `speed`
    pub fn spawn<R: Rng + ?Sized>(count: usize, speed: f64, bounds: &Bounds, rng: &mut R) -> Self {
        let items = (0..count)
            .map(|i| {
                let x = rng.gen_range(0..=bounds.width as u32) as f64;
                let y = rng.gen_range(0..=bounds.height as u32) as f64;
                let (hx, hy) = random_heading(rng);
                FoodItem::new(i as FoodId, Vec2::new(x, y), Vec2::new(hx, hy) * speed)
            })
            .collect();
        Self::from_items(items)
    }

    /// Move every live item
    pub fn step(&mut self, dt: f64, bounds: &Bounds) {
        for item in &mut self.items {
            item.step(dt, bounds);
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Number of items the pool started with
    pub fn spawned(&self) -> usize {
        self.spawned
    }

    /// Items consumed so far, in consumption order
    pub fn consumed(&self) -> &[FoodId] {
        &self.consumed
    }

    pub fn items(&self) -> &[FoodItem] {
        &self.items
    }

    pub fn get(&self, id: FoodId) -> Option<&FoodItem> {
        self.items.iter().find(|f| f.id == id)
    }

    /// Nearest live item by Euclidean distance, with its distance
    pub fn nearest(&self, from: Vec2) -> Option<(&FoodItem, f64)> {
        self.items
            .iter()
            .map(|f| (f, from.distance(f.position)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }

    /// Remove an item on behalf of its consumer
    pub fn consume(&mut self, id: FoodId) -> Result<FoodItem> {
        match self.items.iter().position(|f| f.id == id) {
            Some(idx) => {
                self.consumed.push(id);
                Ok(self.items.remove(idx))
            }
            None if self.consumed.contains(&id) => Err(SimError::FoodAlreadyConsumed { food: id }),
            None => Err(SimError::UnknownFood { food: id }),
        }
    }
}
