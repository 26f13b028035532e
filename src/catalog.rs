use std::collections::HashSet;

use thiserror::Error;

// --- Static Definitions ---

pub struct TestSpec {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

pub struct Level {
    pub id: u32,
    pub name: &'static str,
    pub tests: &'static [TestSpec],
}

const FUNDAMENTALS_TESTS: &[TestSpec] = &[
    TestSpec {
        id: "psych",
        name: "Esports Mindset",
        description: "Pressure resilience and attitude",
    },
    TestSpec {
        id: "personality",
        name: "Four-Color Personality",
        description: "Team role style",
    },
];

const REACTION_TESTS: &[TestSpec] = &[
    TestSpec {
        id: "simple_reaction",
        name: "Pure Reaction",
        description: "Press the moment it turns green",
    },
    TestSpec {
        id: "choice_reaction",
        name: "Cognitive Reaction",
        description: "Stroop color interference",
    },
    TestSpec {
        id: "grid_reaction",
        name: "Rapid Clear",
        description: "Clear targets as they light up",
    },
];

const VISION_TESTS: &[TestSpec] = &[
    TestSpec {
        id: "static_vision",
        name: "Static Capture",
        description: "Find the odd-colored tile",
    },
    TestSpec {
        id: "dynamic_vision",
        name: "Motion Timing",
        description: "Stop the marker inside the zone",
    },
    TestSpec {
        id: "flash_memory",
        name: "Flash Capture",
        description: "Recall a flashed detail",
    },
];

const FOCUS_TESTS: &[TestSpec] = &[TestSpec {
    id: "focus_track",
    name: "Distraction Focus",
    description: "Hit the target among decoys",
}];

const HAND_EYE_TESTS: &[TestSpec] = &[
    TestSpec {
        id: "tracking",
        name: "Dynamic Tracking",
        description: "Keep the crosshair on a moving target",
    },
    TestSpec {
        id: "reflex",
        name: "Light Response",
        description: "Put out the light when it turns on",
    },
];

const MEMORY_TESTS: &[TestSpec] = &[
    TestSpec {
        id: "seq_memory",
        name: "Digit Memory",
        description: "Recall a random digit sequence",
    },
    TestSpec {
        id: "pattern_memory",
        name: "Short-Term Memory",
        description: "Repeat a flashed pattern",
    },
];

const FPS_TESTS: &[TestSpec] = &[TestSpec {
    id: "fps_aim",
    name: "Aim Precision",
    description: "Simulated FPS shooting drill",
}];

pub const BUILTIN_LEVELS: &[Level] = &[
    Level {
        id: 1,
        name: "Fundamentals",
        tests: FUNDAMENTALS_TESTS,
    },
    Level {
        id: 2,
        name: "Reaction",
        tests: REACTION_TESTS,
    },
    Level {
        id: 3,
        name: "Dynamic Vision",
        tests: VISION_TESTS,
    },
    Level {
        id: 4,
        name: "Focus Endurance",
        tests: FOCUS_TESTS,
    },
    Level {
        id: 5,
        name: "Hand-Eye Coordination",
        tests: HAND_EYE_TESTS,
    },
    Level {
        id: 6,
        name: "Memory",
        tests: MEMORY_TESTS,
    },
    Level {
        id: 7,
        name: "FPS Specialist",
        tests: FPS_TESTS,
    },
];

// --- Position ---

/// Zero-based (level, test) cursor into a catalog.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Position {
    pub level: usize,
    pub test: usize,
}

impl Position {
    pub const START: Position = Position { level: 0, test: 0 };

    pub fn new(level: usize, test: usize) -> Self {
        Self { level, test }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("catalog has no levels")]
    NoLevels,
    #[error("level {0} has no tests")]
    EmptyLevel(u32),
    #[error("test id '{0}' appears more than once")]
    DuplicateTest(&'static str),
}

// --- Catalog ---

#[derive(Clone, Copy)]
pub struct Catalog {
    levels: &'static [Level],
}

impl Catalog {
    pub const fn new(levels: &'static [Level]) -> Self {
        Self { levels }
    }

    pub const fn builtin() -> Self {
        Self::new(BUILTIN_LEVELS)
    }

    pub fn levels(&self) -> &'static [Level] {
        self.levels
    }

    pub fn level(&self, index: usize) -> Option<&'static Level> {
        self.levels.get(index)
    }

    pub fn test_at(&self, pos: Position) -> Option<(&'static Level, &'static TestSpec)> {
        let level = self.levels.get(pos.level)?;
        let test = level.tests.get(pos.test)?;
        Some((level, test))
    }

    /// Where a run begins, or `None` for a catalog with nothing to play.
    pub fn first_position(&self) -> Option<Position> {
        self.test_at(Position::START).map(|_| Position::START)
    }

    pub fn total_tests(&self) -> usize {
        self.levels.iter().map(|l| l.tests.len()).sum()
    }

    /// Number of tests that precede `pos` in traversal order.
    pub fn flat_index(&self, pos: Position) -> usize {
        let before: usize = self
            .levels
            .iter()
            .take(pos.level)
            .map(|l| l.tests.len())
            .sum();
        before + pos.test
    }

    /// The position after `pos`, or `None` when `pos` is the final test.
    pub fn next_position(&self, pos: Position) -> Option<Position> {
        let level = self.levels.get(pos.level)?;
        if pos.test + 1 < level.tests.len() {
            Some(Position::new(pos.level, pos.test + 1))
        } else if pos.level + 1 < self.levels.len() {
            Some(Position::new(pos.level + 1, 0))
        } else {
            None
        }
    }

    pub fn test_ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.levels
            .iter()
            .flat_map(|l| l.tests.iter().map(|t| t.id))
    }

    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.levels.is_empty() {
            return Err(CatalogError::NoLevels);
        }
        let mut seen = HashSet::new();
        for level in self.levels {
            if level.tests.is_empty() {
                return Err(CatalogError::EmptyLevel(level.id));
            }
            for test in level.tests {
                if !seen.insert(test.id) {
                    return Err(CatalogError::DuplicateTest(test.id));
                }
            }
        }
        Ok(())
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}
