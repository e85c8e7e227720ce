//! Roam waypoint and idle-time bookkeeping.

use rand::Rng;

use super::Decision;
use crate::perception::{ArenaBounds, BrainContext};
use crate::types::Vec3;

/// Inset from the arena walls for random waypoints.
pub const WAYPOINT_MARGIN: f64 = 3.0;
/// Ticks a waypoint is pursued before it is abandoned.
pub const WAYPOINT_TICKS: u32 = 100;
/// Distance at which a waypoint counts as reached.
pub const ARRIVAL_RADIUS: f64 = 2.0;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RoamState {
    waypoint: Option<Vec3>,
    remaining_ticks: u32,
    idle_ticks: u32,
}

impl RoamState {
    pub fn waypoint(&self) -> Option<Vec3> {
        self.waypoint
    }

    pub fn remaining_ticks(&self) -> u32 {
        self.remaining_ticks
    }

    pub fn idle_ticks(&self) -> u32 {
        self.idle_ticks
    }

    /// Applies the final decision of a tick.
    pub fn update<R: Rng>(&mut self, decision: Decision, ctx: &BrainContext<'_>, rng: &mut R) {
        match decision {
            Decision::Roam => match self.waypoint {
                None => {
                    let waypoint = random_waypoint(&ctx.bounds, ctx.me.position.y, rng);
                    tracing::trace!("New roam waypoint {:?}", waypoint);
                    self.waypoint = Some(waypoint);
                    self.remaining_ticks = WAYPOINT_TICKS;
                }
                Some(waypoint) => {
                    self.remaining_ticks = self.remaining_ticks.saturating_sub(1);
                    let arrived = ctx.me.position.horizontal_distance(waypoint) <= ARRIVAL_RADIUS;
                    if arrived || self.remaining_ticks == 0 {
                        self.clear_waypoint();
                        self.idle_ticks = 0;
                    }
                }
            },
            Decision::Idle => {
                self.clear_waypoint();
                self.idle_ticks = self.idle_ticks.saturating_add(1);
            }
            _ => {
                self.clear_waypoint();
                self.idle_ticks = 0;
            }
        }
    }

    fn clear_waypoint(&mut self) {
        self.waypoint = None;
        self.remaining_ticks = 0;
    }
}

/// Uniform point inside the shrunk arena, at the bot's height.
pub fn random_waypoint<R: Rng>(bounds: &ArenaBounds, y: f64, rng: &mut R) -> Vec3 {
    let area = bounds.shrunk(WAYPOINT_MARGIN);
    Vec3::new(
        rng.gen_range(area.min.x..=area.max.x),
        y,
        rng.gen_range(area.min.z..=area.max.z),
    )
}
