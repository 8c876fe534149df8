//! Synthetic per-channel performance.
//!
//! Only the base draws are random; multipliers and ranges are fixed policy.

use chrono::{Datelike, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use uuid::Uuid;
use vgate_core::{clamp_unit, Channel, SimulatedMetrics};

/// Revenue per engaged view.
pub const MONETIZATION_RATE: f64 = 0.01;

/// Draw ranges for one channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelProfile {
    pub min_views: u64,
    pub max_views: u64,
    pub min_engagement: f64,
    pub max_engagement: f64,
}

impl ChannelProfile {
    #[must_use]
    pub fn for_channel(channel: Channel) -> Self {
        let (min_views, max_views, min_engagement, max_engagement) = match channel {
            Channel::YouTube => (1_000, 50_000, 0.02, 0.08),
            Channel::TikTok => (5_000, 100_000, 0.05, 0.15),
            Channel::Instagram => (2_000, 30_000, 0.03, 0.10),
            Channel::LinkedIn => (500, 10_000, 0.01, 0.05),
            Channel::Twitter => (1_000, 20_000, 0.01, 0.04),
        };
        Self {
            min_views,
            max_views,
            min_engagement,
            max_engagement,
        }
    }
}

/// The simulation formulas with the random draws supplied by the caller.
#[must_use]
pub fn simulate_with_draws(
    viral_potential: f64,
    quality_score: f64,
    base_views: u64,
    base_engagement: f64,
) -> SimulatedMetrics {
    let viral_multiplier = 1.0 + (clamp_unit(viral_potential) - 0.5) * 2.0;
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let views = (base_views as f64 * viral_multiplier).round().max(0.0) as u64;

    let quality_multiplier = 1.0 + (clamp_unit(quality_score) - 0.5) * 0.5;
    let engagement_rate = (base_engagement * quality_multiplier).clamp(0.0, 1.0);

    #[allow(clippy::cast_precision_loss)]
    let revenue = views as f64 * engagement_rate * MONETIZATION_RATE;

    SimulatedMetrics {
        views,
        engagement_rate,
        revenue,
    }
}

/// Draw the base numbers for `channel` from `rng` and apply the formulas.
pub fn simulate<R: Rng + ?Sized>(
    channel: Channel,
    viral_potential: f64,
    quality_score: f64,
    rng: &mut R,
) -> SimulatedMetrics {
    let profile = ChannelProfile::for_channel(channel);
    let base_views = rng.random_range(profile.min_views..=profile.max_views);
    let base_engagement = rng.random_range(profile.min_engagement..=profile.max_engagement);
    simulate_with_draws(viral_potential, quality_score, base_views, base_engagement)
}

/// Source of per-channel random generators.
///
/// With a seed, the generator for a given (content, channel) pair is fixed,
/// so a rerun reproduces the same numbers. Without one, OS entropy is used.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PerformanceSimulator {
    seed: Option<u64>,
}

impl PerformanceSimulator {
    #[must_use]
    pub fn new(seed: Option<u64>) -> Self {
        Self { seed }
    }

    #[must_use]
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    #[must_use]
    pub fn rng_for(&self, content_id: Uuid, channel: Channel) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(derive_seed(seed, content_id, channel)),
            None => StdRng::from_os_rng(),
        }
    }

    #[must_use]
    pub fn simulate(
        &self,
        content_id: Uuid,
        channel: Channel,
        viral_potential: f64,
        quality_score: f64,
    ) -> SimulatedMetrics {
        let mut rng = self.rng_for(content_id, channel);
        simulate(channel, viral_potential, quality_score, &mut rng)
    }

    /// Draw for a tracking pass on `day`.
    ///
    /// With a seed, the draw is fixed per (content, channel, day) and differs
    /// from the generation draw, so each daily refresh records new numbers.
    #[must_use]
    pub fn resimulate(
        &self,
        content_id: Uuid,
        channel: Channel,
        viral_potential: f64,
        quality_score: f64,
        day: NaiveDate,
    ) -> SimulatedMetrics {
        let mut rng = match self.seed {
            Some(seed) => {
                StdRng::seed_from_u64(derive_seed(seed, content_id, channel) ^ day_salt(day))
            }
            None => StdRng::from_os_rng(),
        };
        simulate(channel, viral_potential, quality_score, &mut rng)
    }
}

fn day_salt(day: NaiveDate) -> u64 {
    u64::from(day.num_days_from_ce().unsigned_abs()).wrapping_mul(0x2545_f491_4f6c_dd1d) | 1
}

fn derive_seed(seed: u64, content_id: Uuid, channel: Channel) -> u64 {
    let (hi, lo) = content_id.as_u64_pair();
    let salt = match channel {
        Channel::YouTube => 0x9e37_79b9_7f4a_7c15,
        Channel::TikTok => 0xbf58_476d_1ce4_e5b9,
        Channel::Instagram => 0x94d0_49bb_1331_11eb,
        Channel::LinkedIn => 0xd6e8_feb8_6659_fd93,
        Channel::Twitter => 0xa076_1d64_78bd_642f,
    };
    seed ^ salt ^ hi.rotate_left(17) ^ lo
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instagram_reference_case() {
        let metrics = simulate_with_draws(1.0, 1.0, 20_000, 0.10);
        assert_eq!(metrics.views, 40_000);
        assert_eq!(metrics.engagement_rate, 0.125);
        assert_eq!(metrics.revenue, 50.0);
    }

    #[test]
    fn zero_potential_shrinks_views_to_zero() {
        let metrics = simulate_with_draws(0.0, 0.5, 30_000, 0.05);
        assert_eq!(metrics.views, 0);
        assert_eq!(metrics.revenue, 0.0);
    }

    #[test]
    fn mid_potential_keeps_base_views() {
        let metrics = simulate_with_draws(0.5, 0.5, 12_345, 0.05);
        assert_eq!(metrics.views, 12_345);
        assert_eq!(metrics.engagement_rate, 0.05);
    }

    #[test]
    fn engagement_is_capped_at_one() {
        let metrics = simulate_with_draws(1.0, 1.0, 100, 0.95);
        assert_eq!(metrics.engagement_rate, 1.0);
    }

    #[test]
    fn revenue_identity_holds_for_random_draws() {
        let simulator = PerformanceSimulator::new(Some(7));
        for channel in Channel::ALL {
            for i in 0..20u128 {
                let m = simulator.simulate(Uuid::from_u128(i), channel, 0.9, 0.8);
                #[allow(clippy::cast_precision_loss)]
                let expected = m.views as f64 * m.engagement_rate * MONETIZATION_RATE;
                assert_eq!(m.revenue, expected);
                assert!(m.engagement_rate <= 1.0);
            }
        }
    }

    #[test]
    fn draws_stay_within_channel_profile() {
        let simulator = PerformanceSimulator::new(Some(11));
        for channel in Channel::ALL {
            let profile = ChannelProfile::for_channel(channel);
            for i in 0..50u128 {
                // Neutral multipliers expose the raw draws.
                let m = simulator.simulate(Uuid::from_u128(i), channel, 0.5, 0.5);
                assert!((profile.min_views..=profile.max_views).contains(&m.views));
                assert!(m.engagement_rate >= profile.min_engagement);
                assert!(m.engagement_rate <= profile.max_engagement);
            }
        }
    }

    #[test]
    fn seeded_simulation_is_deterministic() {
        let id = Uuid::from_u128(42);
        let a = PerformanceSimulator::new(Some(99)).simulate(id, Channel::TikTok, 0.8, 0.9);
        let b = PerformanceSimulator::new(Some(99)).simulate(id, Channel::TikTok, 0.8, 0.9);
        assert_eq!(a, b);
    }

    #[test]
    fn channels_draw_independently() {
        let id = Uuid::from_u128(42);
        assert_ne!(
            derive_seed(99, id, Channel::YouTube),
            derive_seed(99, id, Channel::Twitter)
        );
    }

    #[test]
    fn refresh_draws_are_fixed_per_day() {
        let sim = PerformanceSimulator::new(Some(99));
        let id = Uuid::from_u128(42);
        let day = NaiveDate::from_ymd_opt(2026, 10, 14).unwrap();
        let next = day.succ_opt().unwrap();

        let refreshed = sim.resimulate(id, Channel::TikTok, 0.8, 0.9, day);
        assert_eq!(refreshed, sim.resimulate(id, Channel::TikTok, 0.8, 0.9, day));
        assert_ne!(refreshed, sim.simulate(id, Channel::TikTok, 0.8, 0.9));
        assert_ne!(refreshed, sim.resimulate(id, Channel::TikTok, 0.8, 0.9, next));
        assert_ne!(day_salt(day), day_salt(next));
    }

    #[test]
    fn out_of_range_inputs_are_clamped() {
        let metrics = simulate_with_draws(3.0, -2.0, 1_000, 0.04);
        assert_eq!(metrics.views, 2_000);
        assert_eq!(metrics.engagement_rate, 0.04 * 0.75);
    }
}
