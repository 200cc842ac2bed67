//! Total score: the one value the core reads from the surrounding game.
//!
//! Merge resolution (outside this crate) calls [`TotalScore::add`]; the
//! scheduler's auto-pick tiers and the well's angular drive read
//! [`TotalScore::get`].  [`score_change_system`] publishes each new value as a
//! [`ScoreChanged`] message for HUD subscribers.

use crate::lifecycle::ResetRound;
use bevy::prelude::*;

#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TotalScore(u32);

impl TotalScore {
    pub fn get(&self) -> u32 {
        self.0
    }

    pub fn add(&mut self, points: u32) {
        self.0 = self.0.saturating_add(points);
    }

    pub fn reset(&mut self) {
        self.0 = 0;
    }
}

/// Published once per frame in which the score resource was modified.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreChanged(pub u32);

/// `last` starts at the default score, so a change made before the system's
/// first run is still published.
pub fn score_change_system(
    score: Res<TotalScore>,
    mut last: Local<u32>,
    mut changed: MessageWriter<ScoreChanged>,
) {
    if !score.is_changed() || score.get() == *last {
        return;
    }
    *last = score.get();
    changed.write(ScoreChanged(*last));
}

/// Zero the score when a round reset is requested.
pub fn reset_score_system(mut resets: MessageReader<ResetRound>, mut score: ResMut<TotalScore>) {
    if resets.read().count() > 0 {
        score.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_saturates_instead_of_wrapping() {
        let mut score = TotalScore::default();
        score.add(u32::MAX - 1);
        score.add(10);
        assert_eq!(score.get(), u32::MAX);
        score.reset();
        assert_eq!(score.get(), 0);
    }

    #[test]
    fn modification_publishes_score_changed() {
        let mut world = World::new();
        world.insert_resource(TotalScore::default());
        world.init_resource::<Messages<ScoreChanged>>();

        let mut schedule = Schedule::default();
        schedule.add_systems(score_change_system);
        schedule.run(&mut world);
        assert_eq!(
            world
                .resource::<Messages<ScoreChanged>>()
                .iter_current_update_messages()
                .count(),
            0
        );

        world.resource_mut::<TotalScore>().add(40);
        schedule.run(&mut world);
        let published: Vec<_> = world
            .resource::<Messages<ScoreChanged>>()
            .iter_current_update_messages()
            .copied()
            .collect();
        assert_eq!(published, vec![ScoreChanged(40)]);
    }

    #[test]
    fn change_before_first_run_is_published() {
        let mut world = World::new();
        world.insert_resource(TotalScore::default());
        world.init_resource::<Messages<ScoreChanged>>();
        world.resource_mut::<TotalScore>().add(15);

        let mut schedule = Schedule::default();
        schedule.add_systems(score_change_system);
        schedule.run(&mut world);

        let published: Vec<_> = world
            .resource::<Messages<ScoreChanged>>()
            .iter_current_update_messages()
            .copied()
            .collect();
        assert_eq!(published, vec![ScoreChanged(15)]);
    }

    #[test]
    fn unchanged_value_is_not_republished() {
        let mut world = World::new();
        world.insert_resource(TotalScore::default());
        world.init_resource::<Messages<ScoreChanged>>();

        let mut schedule = Schedule::default();
        schedule.add_systems(score_change_system);
        world.resource_mut::<TotalScore>().add(5);
        schedule.run(&mut world);
        world.resource_mut::<TotalScore>().add(0);
        schedule.run(&mut world);

        let count = world
            .resource::<Messages<ScoreChanged>>()
            .iter_current_update_messages()
            .count();
        assert_eq!(count, 1);
    }

    #[test]
    fn round_reset_zeroes_score() {
        let mut world = World::new();
        world.insert_resource(TotalScore(320));
        world.init_resource::<Messages<ResetRound>>();
        world.write_message(ResetRound);

        let mut schedule = Schedule::default();
        schedule.add_systems(reset_score_system);
        schedule.run(&mut world);

        assert_eq!(world.resource::<TotalScore>().get(), 0);
    }
}
