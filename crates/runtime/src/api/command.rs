//! Commands emitted to the host after each decision.
//!
//! The decision core only says *what* a bot wants; the host owns movement,
//! pathfinding and animation. [`BotCommand::from_action`] is the single place
//! where abstract decisions become something the host can execute.

use bot_core::{BrainContext, Decision, DecisionSource, EntityId, ScoredAction, Vec3};

#[derive(Clone, Copy, Debug, PartialEq, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum BotCommand {
    /// Stand still.
    Hold,
    /// Walk towards a point.
    MoveTo(Vec3),
    /// Close in on and attack a target.
    Engage { target: EntityId, position: Vec3 },
    /// Raise the guard.
    Block,
    /// Circle sideways around a point.
    Strafe { around: Vec3 },
    /// Walk onto the capture zone and hold it.
    Capture { center: Vec3 },
}

impl BotCommand {
    /// Translates a decision into a command.
    ///
    /// Decisions that lack the data they need (no target, no objective, no
    /// waypoint) degrade to [`BotCommand::Hold`].
    pub fn from_action(
        action: &ScoredAction,
        ctx: &BrainContext<'_>,
        source: &dyn DecisionSource,
    ) -> Self {
        match action.decision {
            Decision::Idle => BotCommand::Hold,
            Decision::Roam => source.waypoint().map_or(BotCommand::Hold, BotCommand::MoveTo),
            Decision::Objective => ctx
                .objective
                .map_or(BotCommand::Hold, |objective| BotCommand::Capture {
                    center: objective.center,
                }),
            Decision::Combat | Decision::DefendZone => {
                action
                    .target
                    .map_or(BotCommand::Hold, |target| BotCommand::Engage {
                        target: target.id,
                        position: target.position,
                    })
            }
            Decision::Block => BotCommand::Block,
            Decision::StrafeEvade => BotCommand::Strafe {
                around: ctx
                    .nearest_enemy
                    .map_or(ctx.me.position, |enemy| enemy.position),
            },
        }
    }
}

/// A landed FSM attack, reported through the damage callback.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Strike {
    pub attacker: EntityId,
    pub target: EntityId,
    pub damage: f64,
}
