//! Family rankings: lineages ordered by how many members they fielded in a
//! generation.

use crate::agent::{Agent, AgentId};
use crate::naming::LineageKey;
use crate::traits::TraitPoints;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Families exposed to the presentation layer
pub const MAX_RANKED: usize = 10;

/// Floored per-trait averages of a family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TraitAverages {
    pub speed: u32,
    pub size: u32,
    pub vision: u32,
    pub stamina: u32,
}

impl TraitAverages {
    fn from_members(members: &[MemberSnapshot]) -> Self {
        if members.is_empty() {
            return Self::default();
        }
        let n = members.len() as f64;
        let mut total = TraitPoints::default();
        for m in members {
            total.speed += m.traits.speed;
            total.size += m.traits.size;
            total.vision += m.traits.vision;
            total.stamina += m.traits.stamina;
        }
        let avg = |v: f64| (v / n).floor() as u32;
        Self {
            speed: avg(total.speed),
            size: avg(total.size),
            vision: avg(total.vision),
            stamina: avg(total.stamina),
        }
    }
}

/// Immutable copy of a family member at ranking time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberSnapshot {
    pub id: AgentId,
    pub traits: TraitPoints,
}

/// One ranked family
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FamilyRankEntry {
    /// 1-based position
    pub rank: usize,
    pub lineage: LineageKey,
    pub population: usize,
    pub average: TraitAverages,
    pub members: Vec<MemberSnapshot>,
}

/// Group agents by exact lineage key, in order of first appearance
pub fn partition_families(agents: &[Agent]) -> Vec<(LineageKey, Vec<MemberSnapshot>)> {
    let mut index: HashMap<&LineageKey, usize> = HashMap::new();
    let mut families: Vec<(LineageKey, Vec<MemberSnapshot>)> = Vec::new();

    for agent in agents {
        let snapshot = MemberSnapshot {
            id: agent.id,
            traits: agent.traits,
        };
        match index.get(&agent.lineage) {
            Some(&i) => families[i].1.push(snapshot),
            None => {
                index.insert(&agent.lineage, families.len());
                families.push((agent.lineage.clone(), vec![snapshot]));
            }
        }
    }

    families
}

/// Rank every family in `agents` by population, largest first, keeping the
/// top [`MAX_RANKED`]. Equal populations keep first-appearance order.
pub fn rank_families(agents: &[Agent]) -> Vec<FamilyRankEntry> {
    let mut families = partition_families(agents);
    families.sort_by(|a, b| b.1.len().cmp(&a.1.len()));

    families
        .into_iter()
        .take(MAX_RANKED)
        .enumerate()
        .map(|(i, (lineage, members))| FamilyRankEntry {
            rank: i + 1,
            lineage,
            population: members.len(),
            average: TraitAverages::from_members(&members),
            members,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Vec2;

    fn agent(id: AgentId, name: &str, color: u32, traits: TraitPoints) -> Agent {
        Agent::new(id, LineageKey::new(name, color), traits, Vec2::ZERO, 1)
    }

    fn even() -> TraitPoints {
        TraitPoints::new(25.0, 25.0, 25.0, 25.0)
    }

    #[test]
    fn test_largest_family_ranks_first() {
        let agents = vec![
            agent(1, "The Lions", 1, even()),
            agent(2, "The Tigers", 2, even()),
            agent(3, "The Tigers", 2, even()),
            agent(4, "The Tigers", 2, even()),
            agent(5, "The Lions", 1, even()),
        ];
        let ranks = rank_families(&agents);

        assert_eq!(ranks.len(), 2);
        assert_eq!(ranks[0].rank, 1);
        assert_eq!(ranks[0].lineage.name, "The Tigers");
        assert_eq!(ranks[0].population, 3);
        assert_eq!(ranks[1].rank, 2);
        assert_eq!(ranks[1].population, 2);
        let total: usize = ranks.iter().map(|r| r.population).sum();
        assert!(total <= agents.len());
    }

    #[test]
    fn test_same_name_different_color_is_different_family() {
        let agents = vec![agent(1, "The Lions", 1, even()), agent(2, "The Lions", 2, even())];
        assert_eq!(rank_families(&agents).len(), 2);
    }

    #[test]
    fn test_ties_keep_first_appearance() {
        let agents = vec![
            agent(1, "B", 2, even()),
            agent(2, "A", 1, even()),
            agent(3, "C", 3, even()),
        ];
        let names: Vec<_> = rank_families(&agents)
            .into_iter()
            .map(|r| r.lineage.name)
            .collect();
        assert_eq!(names, vec!["B", "A", "C"]);
    }

    #[test]
    fn test_top_ten_only() {
        let agents: Vec<Agent> = (0..15)
            .map(|i| agent(i, &format!("F{i}"), i as u32, even()))
            .collect();
        let ranks = rank_families(&agents);
        assert_eq!(ranks.len(), MAX_RANKED);
        assert_eq!(ranks.last().map(|r| r.rank), Some(10));
    }

    #[test]
    fn test_averages_are_floored() {
        let agents = vec![
            agent(1, "X", 1, TraitPoints::new(10.0, 21.0, 30.5, 38.5)),
            agent(2, "X", 1, TraitPoints::new(11.0, 20.0, 30.0, 39.0)),
        ];
        let ranks = rank_families(&agents);
        assert_eq!(
            ranks[0].average,
            TraitAverages {
                speed: 10,
                size: 20,
                vision: 30,
                stamina: 38
            }
        );
        assert_eq!(ranks[0].members.len(), 2);
    }

    #[test]
    fn test_empty_population() {
        assert!(rank_families(&[]).is_empty());
    }
}
