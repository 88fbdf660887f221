use std::ops::RangeInclusive;

use log::{debug, info};
use thiserror::Error;

use crate::memory::{Memory, Word};
use crate::vm::{self, Machine};

pub const NOUN_ADDRESS: Word = 1;
pub const VERB_ADDRESS: Word = 2;
pub const RESULT_ADDRESS: Word = 0;

pub const DEFAULT_RANGE: RangeInclusive<Word> = 1..=99;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("No noun/verb pair produces {target}")]
    NoSolution { target: Word },
    #[error("Program has no room for a noun and verb")]
    ProgramTooShort,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Solution {
    pub noun: Word,
    pub verb: Word,
}

impl Solution {
    pub fn answer(&self) -> Word {
        100 * self.noun + self.verb
    }
}

/// Runs `base` with `noun` and `verb` written to addresses 1 and 2 and
/// returns the value left at address 0.
pub fn evaluate(base: &Memory, noun: Word, verb: Word) -> Result<Word, vm::Error> {
    let mut memory = base.clone();
    memory.write(NOUN_ADDRESS, noun)?;
    memory.write(VERB_ADDRESS, verb)?;

    let mut machine = Machine::new(memory);
    machine.run()?;
    machine.read(RESULT_ADDRESS)
}

/// Tries every pair in `range × range`, noun-major. Pairs whose run faults
/// are skipped.
pub fn find(
    base: &Memory,
    target: Word,
    range: RangeInclusive<Word>,
) -> Result<Solution, SearchError> {
    if base.len() <= VERB_ADDRESS as usize {
        return Err(SearchError::ProgramTooShort);
    }

    for noun in range.clone() {
        for verb in range.clone() {
            match evaluate(base, noun, verb) {
                Ok(result) if result == target => {
                    info!("noun {} verb {} produces {}", noun, verb, target);
                    return Ok(Solution { noun, verb });
                }
                Ok(_) => {}
                Err(err) => debug!("noun {} verb {} faulted: {}", noun, verb, err),
            }
        }
    }

    Err(SearchError::NoSolution { target })
}
