use thiserror::Error;

use crate::types::{Button, Stage};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SequenceError {
    #[error("stage {requested} requested while {expected} is next")]
    OutOfOrder { requested: Stage, expected: Stage },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    StageDone { next: Stage },
    RunComplete,
}

#[derive(Debug, Clone, Default)]
pub struct StageSequencer {
    last_completed: Option<Stage>,
}

impl StageSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_completed(&self) -> Option<Stage> {
        self.last_completed
    }

    pub fn expected(&self) -> Stage {
        match self.last_completed {
            None | Some(Stage::Wash) => Stage::Develop,
            Some(Stage::Develop) => Stage::StopBath,
            Some(Stage::StopBath) => Stage::Fix,
            Some(Stage::Fix) => Stage::Wash,
        }
    }

    pub fn select(&self, button: Button) -> Result<Stage, SequenceError> {
        let requested = Stage::from_button(button);
        let expected = self.expected();
        if requested == expected {
            Ok(requested)
        } else {
            Err(SequenceError::OutOfOrder {
                requested,
                expected,
            })
        }
    }

    pub fn complete(&mut self, stage: Stage) -> Result<Progress, SequenceError> {
        let expected = self.expected();
        if stage != expected {
            return Err(SequenceError::OutOfOrder {
                requested: stage,
                expected,
            });
        }

        if stage == Stage::Wash {
            self.last_completed = None;
            Ok(Progress::RunComplete)
        } else {
            self.last_completed = Some(stage);
            Ok(Progress::StageDone {
                next: self.expected(),
            })
        }
    }
}
