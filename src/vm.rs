use log::{debug, trace};
use thiserror::Error;

use crate::memory::{Memory, Word};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Invalid opcode {word} at pc {pc}")]
    InvalidOpcode { word: Word, pc: usize },
    #[error("Invalid addressing mode {digit} in {word} at pc {pc}")]
    InvalidAddressingMode { word: Word, pc: usize, digit: Word },
    #[error("Address {address} out of memory bounds (len {len})")]
    OutOfBounds { address: Word, len: usize },
    #[error("Invalid integer {token:?} at index {index}")]
    Parse { index: usize, token: String },
    #[error("No input available for store at pc {pc}")]
    MissingInput { pc: usize },
    #[error("Program did not halt within {0} steps")]
    StepLimit(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    Add,
    Mul,
    Store,
    Load,
    JumpIfTrue,
    JumpIfFalse,
    LessThan,
    Equal,
    Halt,
}

impl Opcode {
    fn from_code(code: Word) -> Option<Opcode> {
        let opcode = match code {
            ADD => Opcode::Add,
            MUL => Opcode::Mul,
            STORE => Opcode::Store,
            LOAD => Opcode::Load,
            JIT => Opcode::JumpIfTrue,
            JIF => Opcode::JumpIfFalse,
            LT => Opcode::LessThan,
            EQ => Opcode::Equal,
            HALT => Opcode::Halt,
            _ => return None,
        };
        Some(opcode)
    }

    /// Number of cells the instruction occupies, including the instruction word.
    pub const fn length(self) -> usize {
        match self {
            Opcode::Add | Opcode::Mul | Opcode::LessThan | Opcode::Equal => 4,
            Opcode::JumpIfTrue | Opcode::JumpIfFalse => 3,
            Opcode::Store | Opcode::Load => 2,
            Opcode::Halt => 1,
        }
    }

    /// Whether the last parameter is an address written to.
    pub const fn has_destination(self) -> bool {
        matches!(
            self,
            Opcode::Add | Opcode::Mul | Opcode::Store | Opcode::LessThan | Opcode::Equal
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Position,
    Immediate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Command {
    pub word: Word,
    pub opcode: Opcode,
    modes: [Mode; 3],
}

impl Command {
    /// One mode per parameter, parameter 1 first.
    pub fn modes(&self) -> &[Mode] {
        &self.modes[..self.opcode.length() - 1]
    }
}

/// Decodes the instruction word at `pc`: `ABCDE` where `DE` is the opcode
/// and `C`, `B`, `A` are the modes of parameters 1, 2 and 3.
pub fn decode(memory: &Memory, pc: usize) -> Result<Command, Error> {
    let word = memory.read(pc as Word)?;
    let opcode = Opcode::from_code(word % 100).ok_or(Error::InvalidOpcode { word, pc })?;

    let mut modes = [Mode::Position; 3];
    let mut flags = word / 100;
    for mode in modes.iter_mut().take(opcode.length() - 1) {
        *mode = match flags % 10 {
            MODE_POSITION => Mode::Position,
            MODE_IMMEDIATE => Mode::Immediate,
            digit => return Err(Error::InvalidAddressingMode { word, pc, digit }),
        };
        flags /= 10;
    }

    Ok(Command {
        word,
        opcode,
        modes,
    })
}

/// Resolves parameter values. A destination parameter resolves to its raw
/// address whatever its mode digit says.
pub fn resolve(command: &Command, memory: &Memory, pc: usize) -> Result<[Word; 3], Error> {
    let mut operands = [0; 3];
    let params = command.modes().len();

    for (index, mode) in command.modes().iter().enumerate() {
        let raw = memory.read((pc + index + 1) as Word)?;
        let is_destination = command.opcode.has_destination() && index + 1 == params;

        operands[index] = match mode {
            _ if is_destination => raw,
            Mode::Immediate => raw,
            Mode::Position => memory.read(raw)?,
        };
    }

    Ok(operands)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Running,
    Halted,
    Faulted,
}

#[derive(Debug, Clone)]
pub struct Machine {
    memory: Memory,
    pc: usize,
    status: Status,
    input: Option<Word>,
    output: Option<Word>,
}

impl Machine {
    pub fn new(memory: Memory) -> Machine {
        Machine {
            memory,
            pc: 0,
            status: Status::Running,
            input: None,
            output: None,
        }
    }

    pub fn parse(text: &str) -> Result<Machine, Error> {
        Ok(Machine::new(Memory::parse(text)?))
    }

    pub fn with_input(mut self, value: Word) -> Machine {
        self.input = Some(value);
        self
    }

    pub fn set_input(&mut self, value: Word) {
        self.input = Some(value);
    }

    /// Value written by the most recent LOAD.
    pub fn output(&self) -> Option<Word> {
        self.output
    }

    pub fn read(&self, address: Word) -> Result<Word, Error> {
        self.memory.read(address)
    }

    pub fn view(&self) -> String {
        self.memory.to_string()
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn into_memory(self) -> Memory {
        self.memory
    }

    pub fn pc(&self) -> usize {
        self.pc
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_halted(&self) -> bool {
        self.status == Status::Halted
    }

    /// Executes one instruction. Nothing is committed when the step fails.
    pub fn step(&mut self) -> Result<Status, Error> {
        if self.status == Status::Halted {
            return Ok(Status::Halted);
        }

        match self.execute() {
            Ok(status) => {
                self.status = status;
                Ok(status)
            }
            Err(err) => {
                debug!("fault at pc {}: {}", self.pc, err);
                self.status = Status::Faulted;
                Err(err)
            }
        }
    }

    fn execute(&mut self) -> Result<Status, Error> {
        let pc = self.pc;
        let command = decode(&self.memory, pc)?;
        let operands = resolve(&command, &self.memory, pc)?;
        let [a, b, c] = operands;

        trace!(
            "{}: {} {:?} {:?}",
            pc,
            command.word,
            command.opcode,
            &operands[..command.modes().len()]
        );

        let mut next = pc + command.opcode.length();
        match command.opcode {
            Opcode::Add => self.memory.write(c, a.wrapping_add(b))?,
            Opcode::Mul => self.memory.write(c, a.wrapping_mul(b))?,
            Opcode::Store => {
                let value = self.input.ok_or(Error::MissingInput { pc })?;
                self.memory.write(a, value)?;
            }
            Opcode::Load => self.output = Some(a),
            Opcode::JumpIfTrue => {
                if a != 0 {
                    next = self.jump_target(b)?;
                }
            }
            Opcode::JumpIfFalse => {
                if a == 0 {
                    next = self.jump_target(b)?;
                }
            }
            Opcode::LessThan => self.memory.write(c, (a < b) as Word)?,
            Opcode::Equal => self.memory.write(c, (a == b) as Word)?,
            Opcode::Halt => {
                debug!("halt at pc {}", pc);
                return Ok(Status::Halted);
            }
        }

        self.pc = next;
        Ok(Status::Running)
    }

    fn jump_target(&self, target: Word) -> Result<usize, Error> {
        usize::try_from(target).map_err(|_| Error::OutOfBounds {
            address: target,
            len: self.memory.len(),
        })
    }

    pub fn run(&mut self) -> Result<(), Error> {
        while self.step()? == Status::Running {}
        Ok(())
    }

    /// Like [`Machine::run`], but gives up after `max_steps` instructions.
    pub fn run_bounded(&mut self, max_steps: usize) -> Result<(), Error> {
        for _ in 0..max_steps {
            if self.step()? == Status::Halted {
                return Ok(());
            }
        }

        if self.is_halted() {
            Ok(())
        } else {
            Err(Error::StepLimit(max_steps))
        }
    }
}

/// Parses `text` and runs it to completion without input.
pub fn run(text: &str) -> Result<Machine, Error> {
    let mut machine = Machine::parse(text)?;
    machine.run()?;
    Ok(machine)
}

const ADD: Word = 1;
const MUL: Word = 2;
const STORE: Word = 3;
const LOAD: Word = 4;
const JIT: Word = 5; // jump if true
const JIF: Word = 6; // jump if false
const LT: Word = 7;
const EQ: Word = 8;
const HALT: Word = 99;

const MODE_POSITION: Word = 0;
const MODE_IMMEDIATE: Word = 1;
