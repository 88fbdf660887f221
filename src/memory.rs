use std::fmt;
use std::str::FromStr;

use crate::vm::Error;

pub type Word = i64;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Memory {
    cells: Vec<Word>,
}

impl Memory {
    /// Parses comma separated decimal integers, e.g. `1,0,0,3,99`.
    pub fn parse(text: &str) -> Result<Memory, Error> {
        let cells = text
            .trim()
            .split(',')
            .enumerate()
            .map(|(index, token)| {
                let token = token.trim();
                token.parse::<Word>().map_err(|_| Error::Parse {
                    index,
                    token: token.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Memory { cells })
    }

    /// Extends the memory with zero cells up to `len`. Never shrinks.
    pub fn padded(mut self, len: usize) -> Memory {
        if self.cells.len() < len {
            self.cells.resize(len, 0);
        }
        self
    }

    fn index(&self, address: Word) -> Result<usize, Error> {
        usize::try_from(address)
            .ok()
            .filter(|&index| index < self.cells.len())
            .ok_or(Error::OutOfBounds {
                address,
                len: self.cells.len(),
            })
    }

    pub fn read(&self, address: Word) -> Result<Word, Error> {
        let index = self.index(address)?;
        Ok(self.cells[index])
    }

    pub fn write(&mut self, address: Word, value: Word) -> Result<(), Error> {
        let index = self.index(address)?;
        self.cells[index] = value;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[Word] {
        &self.cells
    }
}

impl From<Vec<Word>> for Memory {
    fn from(cells: Vec<Word>) -> Self {
        Memory { cells }
    }
}

impl FromStr for Memory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Memory::parse(s)
    }
}

impl fmt::Display for Memory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, cell) in self.cells.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", cell)?;
        }
        Ok(())
    }
}
