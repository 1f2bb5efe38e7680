//! Match metrics collection.
//!
//! [`MetricsCollector`] folds the events of every tick into a
//! [`MatchMetrics`] record; [`BatchSummary`] aggregates many of them.

use std::collections::BTreeMap;

use arena_core::events::{CoinReason, SimEvent, TickEvents};
use arena_core::prelude::EntityId;
use serde::{Deserialize, Serialize};

/// How a match ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchOutcome {
    /// Every bot was defeated.
    Victory,
    /// The player died.
    Defeat,
    /// The tick limit ran out first.
    #[default]
    Timeout,
}

/// Metrics for a single match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchMetrics {
    /// Seed the match ran with.
    pub seed: u64,
    /// Scripted player strategy.
    pub strategy: String,
    /// How the match ended.
    pub outcome: MatchOutcome,
    /// Ticks simulated.
    pub duration_ticks: u64,
    /// Kills credited to the player.
    pub player_kills: u32,
    /// Kills between bots.
    pub bot_kills: u32,
    /// Bots despawned after dying.
    pub bots_defeated: u32,
    /// Coins awarded, victory bonus included.
    pub coins: u32,
    /// Projectiles thrown by anyone.
    pub projectiles_launched: u32,
    /// Despawned projectiles, by reason.
    pub projectiles_despawned: BTreeMap<String, u32>,
    /// Tick of the player's first kill.
    pub first_kill_tick: Option<u64>,
    /// Final simulation state hash.
    pub final_state_hash: u64,
}

/// Accumulates [`MatchMetrics`] from tick events.
#[derive(Debug, Clone)]
pub struct MetricsCollector {
    player: Option<EntityId>,
    metrics: MatchMetrics,
}

impl MetricsCollector {
    /// Start collecting for a match.
    #[must_use]
    pub fn new(seed: u64, strategy: &str, player: Option<EntityId>) -> Self {
        Self {
            player,
            metrics: MatchMetrics {
                seed,
                strategy: strategy.to_string(),
                ..MatchMetrics::default()
            },
        }
    }

    /// Fold one tick's events in.
    pub fn observe(&mut self, tick: &TickEvents) {
        let m = &mut self.metrics;
        m.duration_ticks = tick.tick + 1;

        for event in &tick.events {
            match event {
                SimEvent::CombatantKilled {
                    killer: Some(killer),
                    victim,
                } => {
                    if Some(*killer) == self.player {
                        m.player_kills += 1;
                        m.first_kill_tick.get_or_insert(tick.tick);
                    } else if Some(*victim) != self.player {
                        m.bot_kills += 1;
                    }
                }
                SimEvent::CoinsAwarded { amount, reason } => {
                    m.coins += amount;
                    if *reason == CoinReason::BotDefeated {
                        m.bots_defeated += 1;
                    }
                }
                SimEvent::ProjectileLaunched { .. } => m.projectiles_launched += 1,
                SimEvent::ProjectileDespawned { reason, .. } => {
                    *m.projectiles_despawned
                        .entry(format!("{reason:?}").to_lowercase())
                        .or_default() += 1;
                }
                SimEvent::LevelWon => m.outcome = MatchOutcome::Victory,
                SimEvent::PlayerDefeated => m.outcome = MatchOutcome::Defeat,
                _ => {}
            }
        }
    }

    /// Whether the match has ended.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.metrics.outcome != MatchOutcome::Timeout
    }

    /// Close the record with the final state hash.
    #[must_use]
    pub fn finish(mut self, final_state_hash: u64) -> MatchMetrics {
        self.metrics.final_state_hash = final_state_hash;
        self.metrics
    }
}

/// Aggregate over many matches.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Matches played.
    pub total_games: u32,
    /// Matches per outcome.
    pub outcomes: BTreeMap<MatchOutcome, u32>,
    /// Fraction of matches won.
    pub win_rate: f64,
    /// Mean match length in ticks.
    pub avg_duration_ticks: f64,
    /// Mean player kills per match.
    pub avg_player_kills: f64,
    /// Mean coins per match.
    pub avg_coins: f64,
}

impl BatchSummary {
    /// Summarize a set of matches.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_games(games: &[MatchMetrics]) -> Self {
        if games.is_empty() {
            return Self::default();
        }

        let n = games.len() as f64;
        let mut outcomes = BTreeMap::new();
        for game in games {
            *outcomes.entry(game.outcome).or_default() += 1;
        }
        let wins = outcomes.get(&MatchOutcome::Victory).copied().unwrap_or(0);

        Self {
            total_games: games.len() as u32,
            win_rate: f64::from(wins) / n,
            outcomes,
            avg_duration_ticks: games.iter().map(|g| g.duration_ticks as f64).sum::<f64>() / n,
            avg_player_kills: games.iter().map(|g| f64::from(g.player_kills)).sum::<f64>() / n,
            avg_coins: games.iter().map(|g| f64::from(g.coins)).sum::<f64>() / n,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_core::events::DespawnReason;

    const PLAYER: EntityId = EntityId::new(0, 0);
    const BOT: EntityId = EntityId::new(1, 0);
    const OTHER: EntityId = EntityId::new(2, 0);

    fn tick(n: u64, events: Vec<SimEvent>) -> TickEvents {
        TickEvents { tick: n, events }
    }

    #[test]
    fn test_collector_counts_kills_by_side() {
        let mut c = MetricsCollector::new(1, "hunter", Some(PLAYER));
        c.observe(&tick(
            4,
            vec![
                SimEvent::CombatantKilled {
                    killer: Some(PLAYER),
                    victim: BOT,
                },
                SimEvent::CombatantKilled {
                    killer: Some(OTHER),
                    victim: BOT,
                },
                SimEvent::CombatantKilled {
                    killer: None,
                    victim: OTHER,
                },
            ],
        ));
        let m = c.finish(0);
        assert_eq!(m.player_kills, 1);
        assert_eq!(m.bot_kills, 1);
        assert_eq!(m.first_kill_tick, Some(4));
        assert_eq!(m.duration_ticks, 5);
    }

    #[test]
    fn test_collector_tracks_outcome_and_coins() {
        let mut c = MetricsCollector::new(1, "hunter", Some(PLAYER));
        c.observe(&tick(
            0,
            vec![SimEvent::CoinsAwarded {
                amount: 1,
                reason: CoinReason::BotDefeated,
            }],
        ));
        assert!(!c.is_finished());
        c.observe(&tick(
            1,
            vec![
                SimEvent::CoinsAwarded {
                    amount: 5,
                    reason: CoinReason::Victory,
                },
                SimEvent::LevelWon,
            ],
        ));
        assert!(c.is_finished());
        let m = c.finish(99);
        assert_eq!(m.outcome, MatchOutcome::Victory);
        assert_eq!(m.coins, 6);
        assert_eq!(m.bots_defeated, 1);
        assert_eq!(m.final_state_hash, 99);
    }

    #[test]
    fn test_collector_groups_despawn_reasons() {
        let mut c = MetricsCollector::new(1, "idle", None);
        c.observe(&tick(
            0,
            vec![
                SimEvent::ProjectileDespawned {
                    projectile: OTHER,
                    reason: DespawnReason::Hit,
                },
                SimEvent::ProjectileDespawned {
                    projectile: BOT,
                    reason: DespawnReason::Hit,
                },
                SimEvent::ProjectileDespawned {
                    projectile: PLAYER,
                    reason: DespawnReason::Expired,
                },
            ],
        ));
        let m = c.finish(0);
        assert_eq!(m.projectiles_despawned["hit"], 2);
        assert_eq!(m.projectiles_despawned["expired"], 1);
    }

    #[test]
    fn test_summary_rates() {
        let won = MatchMetrics {
            outcome: MatchOutcome::Victory,
            duration_ticks: 100,
            player_kills: 4,
            coins: 15,
            ..MatchMetrics::default()
        };
        let lost = MatchMetrics {
            outcome: MatchOutcome::Defeat,
            duration_ticks: 300,
            ..MatchMetrics::default()
        };
        let summary = BatchSummary::from_games(&[won, lost]);
        assert_eq!(summary.total_games, 2);
        assert!((summary.win_rate - 0.5).abs() < f64::EPSILON);
        assert!((summary.avg_duration_ticks - 200.0).abs() < f64::EPSILON);
        assert!((summary.avg_player_kills - 2.0).abs() < f64::EPSILON);
        assert_eq!(summary.outcomes[&MatchOutcome::Defeat], 1);
    }

    #[test]
    fn test_summary_of_nothing() {
        assert_eq!(BatchSummary::from_games(&[]).total_games, 0);
    }
}
