use std::time::Instant;

use rand::rngs::SmallRng;

use crate::catalog::Catalog;
use crate::games::{
    MiniGame, aim, dynamic_vision, flash_memory, focus, grid_reaction, pattern_memory,
    personality, psychology, reaction, reflex, sequence_memory, static_vision, stroop, tracking,
};

pub type Factory = fn(&mut SmallRng, Instant) -> Box<dyn MiniGame>;

const GAMES: &[(&str, Factory)] = &[
    ("psych", psychology::create),
    ("personality", personality::create),
    ("simple_reaction", reaction::create),
    ("choice_reaction", stroop::create),
    ("grid_reaction", grid_reaction::create),
    ("static_vision", static_vision::create),
    ("dynamic_vision", dynamic_vision::create),
    ("flash_memory", flash_memory::create),
    ("focus_track", focus::create),
    ("tracking", tracking::create),
    ("reflex", reflex::create),
    ("seq_memory", sequence_memory::create),
    ("pattern_memory", pattern_memory::create),
    ("fps_aim", aim::create),
];

pub fn factory_for(test_id: &str) -> Option<Factory> {
    GAMES
        .iter()
        .find(|(id, _)| *id == test_id)
        .map(|&(_, factory)| factory)
}

/// Instantiates the game behind `test_id`, or `None` for an unknown id.
pub fn create(test_id: &str, rng: &mut SmallRng, now: Instant) -> Option<Box<dyn MiniGame>> {
    factory_for(test_id).map(|factory| factory(rng, now))
}

/// Test ids in `catalog` that have no game behind them.
pub fn missing_games(catalog: &Catalog) -> Vec<&'static str> {
    catalog
        .test_ids()
        .filter(|id| factory_for(id).is_none())
        .collect()
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn every_builtin_test_has_a_game() {
        assert!(missing_games(&Catalog::builtin()).is_empty());
    }

    #[test]
    fn unknown_id_has_no_game() {
        let mut rng = SmallRng::seed_from_u64(0);
        assert!(create("juggling", &mut rng, Instant::now()).is_none());
    }

    #[test]
    fn games_start_without_an_outcome() {
        let mut rng = SmallRng::seed_from_u64(0);
        let now = Instant::now();
        for (id, _) in GAMES {
            let mut game = create(id, &mut rng, now).unwrap();
            game.on_tick(now);
            assert!(game.poll_outcome(now).is_none(), "{id} finished at once");
            assert!(!game.hints().is_empty());
        }
    }
}
