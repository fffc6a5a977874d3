//! Agent structure and behavior.
//!
//! An agent lives through one generation: it searches for food until it
//! eats, runs out of stamina, or the food runs out. Every resolution path ends
//! in `Removed`, possibly after a scheduled delay:
//!
//! ```text
//! Searching ──► Fed ─────────────(feed delay)──────────────► Removed
//!     │
//!     ├──────► StarvedImmediate ─(next tick)───────────────► Removed
//!     │
//!     └──────► StarvedTimedOut ─(death anim)─► Decaying ─(fade)─► Removed
//! ```

use crate::config::TimingConfig;
use crate::error::Result;
use crate::food::{FoodId, FoodPool};
use crate::geometry::{Blocked, Bounds, Vec2};
use crate::naming::LineageKey;
use crate::random::random_heading;
use crate::traits::{DerivedTraits, TraitPoints};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Unique agent identifier
pub type AgentId = u64;

/// Width of an unscaled agent sprite frame, in pixels
pub const SPRITE_FRAME_WIDTH: f64 = 100.0;
/// Sprite scale per unit of derived size
pub const VISUAL_SCALE: f64 = 0.35;

/// Lifecycle of an agent within its generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LifecycleState {
    Searching,
    Fed,
    StarvedImmediate,
    StarvedTimedOut,
    Decaying,
    Removed,
}

impl LifecycleState {
    /// Still looking for food
    #[inline]
    pub fn is_searching(self) -> bool {
        self == LifecycleState::Searching
    }

    #[inline]
    pub fn is_removed(self) -> bool {
        self == LifecycleState::Removed
    }

    /// Animation the presentation layer should play in this state
    pub fn animation_cue(self) -> Option<AnimationCue> {
        match self {
            LifecycleState::Searching => Some(AnimationCue::Move),
            LifecycleState::Fed => Some(AnimationCue::Eat),
            LifecycleState::StarvedTimedOut => Some(AnimationCue::Die),
            LifecycleState::Decaying => Some(AnimationCue::Decay),
            LifecycleState::StarvedImmediate | LifecycleState::Removed => None,
        }
    }
}

/// Discrete animation cue for renderers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnimationCue {
    Move,
    Eat,
    Die,
    Decay,
}

/// How an agent's search ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Fed,
    StarvedImmediate,
    StarvedTimedOut,
}

/// State change produced by one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentEvent {
    Fed(FoodId),
    StarvedImmediate,
    StarvedTimedOut,
    Decaying,
    Removed,
}

/// Per-tick inputs shared by every agent
#[derive(Debug, Clone, Copy)]
pub struct TickContext<'a> {
    /// Generation clock after this tick, in simulated milliseconds
    pub now: u64,
    /// Simulated milliseconds covered by this tick
    pub dt_millis: u64,
    pub bounds: &'a Bounds,
    pub timing: &'a TimingConfig,
    /// Contact radius of food items
    pub food_radius: f64,
}

impl TickContext<'_> {
    #[inline]
    fn dt_secs(&self) -> f64 {
        self.dt_millis as f64 / 1000.0
    }
}

/// A simulated forager
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Agent {
    // Identity
    pub id: AgentId,
    pub lineage: LineageKey,
    pub generation: u32,
    pub parent_id: Option<AgentId>,

    // Heredity
    pub traits: TraitPoints,
    pub derived: DerivedTraits,

    // Physical state
    pub spawn_position: Vec2,
    pub position: Vec2,
    pub velocity: Vec2,

    /// Simulated milliseconds alive
    pub age: u64,

    // Lifecycle
    state: LifecycleState,
    outcome: Option<Outcome>,
    state_since: u64,
    deadline: Option<u64>,
    next_heading_at: Option<u64>,
    eaten: Option<FoodId>,
}

impl Agent {
    /// Create a new searching agent; derived traits are fixed from here on
    pub fn new(
        id: AgentId,
        lineage: LineageKey,
        traits: TraitPoints,
        position: Vec2,
        generation: u32,
    ) -> Self {
        Self {
            id,
            lineage,
            generation,
            parent_id: None,
            traits,
            derived: traits.derive(),
            spawn_position: position,
            position,
            velocity: Vec2::ZERO,
            age: 0,
            state: LifecycleState::Searching,
            outcome: None,
            state_since: 0,
            deadline: None,
            next_heading_at: None,
            eaten: None,
        }
    }

    /// Fresh copy of this agent for the next generation: same lineage, same
    /// raw traits, back at the original spawn position
    pub fn reborn(&self, id: AgentId) -> Agent {
        let mut agent = Agent::new(
            id,
            self.lineage.clone(),
            self.traits,
            self.spawn_position,
            self.generation + 1,
        );
        agent.parent_id = Some(self.id);
        agent
    }

    #[inline]
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// How the search ended, once it has
    #[inline]
    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// Survivors are agents that fed, whether or not they have since been removed
    #[inline]
    pub fn is_survivor(&self) -> bool {
        self.outcome == Some(Outcome::Fed)
    }

    /// Food item this agent consumed
    pub fn eaten(&self) -> Option<FoodId> {
        self.eaten
    }

    /// Time budget before starving, in simulated milliseconds
    #[inline]
    pub fn stamina_threshold(&self) -> f64 {
        self.derived.stamina
    }

    /// Sprite scale factor for renderers
    #[inline]
    pub fn visual_scale(&self) -> f64 {
        VISUAL_SCALE * self.derived.size
    }

    /// On-screen width in pixels
    #[inline]
    pub fn visual_width(&self) -> f64 {
        SPRITE_FRAME_WIDTH * self.visual_scale()
    }

    /// Collision radius
    #[inline]
    pub fn radius(&self) -> f64 {
        self.visual_width() / 2.0
    }

    /// Remaining opacity while decaying, 1.0 otherwise
    pub fn opacity(&self, now: u64, timing: &TimingConfig) -> f64 {
        match self.state {
            LifecycleState::Decaying if timing.fade_millis > 0 => {
                let elapsed = now.saturating_sub(self.state_since) as f64;
                (1.0 - elapsed / timing.fade_millis as f64).clamp(0.0, 1.0)
            }
            LifecycleState::Removed => 0.0,
            _ => 1.0,
        }
    }

    fn enter(&mut self, state: LifecycleState, now: u64, deadline: Option<u64>) {
        self.state = state;
        self.state_since = now;
        self.deadline = deadline;
    }

    #[inline]
    fn due(&self, now: u64) -> bool {
        self.deadline.map_or(true, |d| now >= d)
    }

    /// Advance this agent by one tick.
    ///
    /// Scheduled transitions fire first; a searching agent then runs its
    /// starvation checks, steers, moves and tries to eat the nearest item.
    pub fn tick<R: Rng + ?Sized>(
        &mut self,
        ctx: &TickContext<'_>,
        food: &mut FoodPool,
        rng: &mut R,
    ) -> Result<Option<AgentEvent>> {
        if self.state.is_removed() {
            return Ok(None);
        }
        self.age += ctx.dt_millis;

        match self.state {
            LifecycleState::Searching => self.search(ctx, food, rng),
            LifecycleState::Fed | LifecycleState::StarvedImmediate => {
                if self.due(ctx.now) {
                    self.enter(LifecycleState::Removed, ctx.now, None);
                    return Ok(Some(AgentEvent::Removed));
                }
                Ok(None)
            }
            LifecycleState::StarvedTimedOut => {
                if self.due(ctx.now) {
                    // The ghost floats upward while it fades
                    self.velocity = Vec2::new(0.0, -ctx.timing.ghost_float_speed);
                    let deadline = ctx.now + ctx.timing.fade_millis;
                    self.enter(LifecycleState::Decaying, ctx.now, Some(deadline));
                    return Ok(Some(AgentEvent::Decaying));
                }
                Ok(None)
            }
            LifecycleState::Decaying => {
                let (p, _) = ctx.bounds.confine(self.position + self.velocity * ctx.dt_secs());
                self.position = p;
                if self.due(ctx.now) {
                    self.velocity = Vec2::ZERO;
                    self.enter(LifecycleState::Removed, ctx.now, None);
                    return Ok(Some(AgentEvent::Removed));
                }
                Ok(None)
            }
            LifecycleState::Removed => Ok(None),
        }
    }

    fn search<R: Rng + ?Sized>(
        &mut self,
        ctx: &TickContext<'_>,
        food: &mut FoodPool,
        rng: &mut R,
    ) -> Result<Option<AgentEvent>> {
        if self.age as f64 > self.stamina_threshold() {
            self.velocity = Vec2::ZERO;
            self.outcome = Some(Outcome::StarvedTimedOut);
            let deadline = ctx.now + ctx.timing.death_animation_millis;
            self.enter(LifecycleState::StarvedTimedOut, ctx.now, Some(deadline));
            log::trace!("agent {} starved after {} ms", self.id, self.age);
            return Ok(Some(AgentEvent::StarvedTimedOut));
        }

        let (target_id, target_pos, distance) = match food.nearest(self.position) {
            Some((item, d)) => (item.id, item.position, d),
            None => {
                // No animation on this path: removal follows on the next tick
                self.velocity = Vec2::ZERO;
                self.outcome = Some(Outcome::StarvedImmediate);
                self.enter(LifecycleState::StarvedImmediate, ctx.now, Some(ctx.now));
                log::trace!("agent {} found the food gone", self.id);
                return Ok(Some(AgentEvent::StarvedImmediate));
            }
        };

        let chasing = distance < self.derived.vision;
        if chasing {
            self.velocity = (target_pos - self.position).normalized() * self.derived.speed;
        } else if self.next_heading_at.map_or(true, |t| ctx.now >= t) {
            let (hx, hy) = random_heading(rng);
            self.velocity = Vec2::new(hx, hy) * self.derived.speed;
            let interval =
                rng.gen_range(ctx.timing.wander_min_millis..=ctx.timing.wander_max_millis);
            self.next_heading_at = Some(ctx.now + interval);
        }

        let (p, blocked) = ctx.bounds.confine(self.position + self.velocity * ctx.dt_secs());
        self.position = p;
        if !chasing && blocked.any() {
            self.turn_from_wall(blocked);
        }

        // Vision only steers; touching the nearest item is enough to eat it
        if self.position.distance(target_pos) <= self.radius() + ctx.food_radius {
            food.consume(target_id)?;
            self.eaten = Some(target_id);
            self.velocity = Vec2::ZERO;
            self.outcome = Some(Outcome::Fed);
            let deadline = ctx.now + ctx.timing.feed_delay_millis;
            self.enter(LifecycleState::Fed, ctx.now, Some(deadline));
            log::trace!("agent {} ate food {}", self.id, target_id);
            return Ok(Some(AgentEvent::Fed(target_id)));
        }

        Ok(None)
    }

    /// Head straight away from the wall that stopped us
    fn turn_from_wall(&mut self, blocked: Blocked) {
        let speed = self.derived.speed;
        self.velocity = if blocked.left {
            Vec2::new(speed, 0.0)
        } else if blocked.up {
            Vec2::new(0.0, speed)
        } else if blocked.right {
            Vec2::new(-speed, 0.0)
        } else {
            Vec2::new(0.0, -speed)
        };
    }
}
