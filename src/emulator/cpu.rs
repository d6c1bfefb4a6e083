use crate::emulator::errors::EmulatorError;
use crate::emulator::program::{Op, Program};

/// Number of addressable RAM words.
pub const RAM_SIZE: usize = 1 << 15;
/// Default step budget for [`Cpu::run`].
pub const DEFAULT_STEP_LIMIT: u64 = 1_000_000;

/// Target machine state: RAM, the A and D registers and the program counter.
///
/// Executes a [`Program`] from `pc = 0` until the program counter runs past
/// the last instruction.
#[derive(Debug, Clone)]
pub struct Cpu {
    pub ram: Vec<u16>,
    pub a: u16,
    pub d: u16,
    pub pc: usize,
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

impl Cpu {
    pub fn new() -> Self {
        Self {
            ram: vec![0; RAM_SIZE],
            a: 0,
            d: 0,
            pc: 0,
        }
    }

    /// Reads a RAM word.
    pub fn peek(&self, address: u16) -> u16 {
        self.ram.get(address as usize).copied().unwrap_or(0)
    }

    /// Writes a RAM word; addresses past the end are ignored.
    pub fn poke(&mut self, address: u16, value: u16) {
        if let Some(cell) = self.ram.get_mut(address as usize) {
            *cell = value;
        }
    }

    fn memory(&mut self) -> Result<&mut u16, EmulatorError> {
        let (address, pc) = (self.a, self.pc);
        self.ram
            .get_mut(address as usize)
            .ok_or(EmulatorError::MemoryOutOfBounds { address, pc })
    }

    /// Executes one instruction.
    pub fn step(&mut self, program: &Program) -> Result<(), EmulatorError> {
        let Some(op) = program.ops.get(self.pc).copied() else {
            return Ok(());
        };
        match op {
            Op::Load(value) => {
                self.a = value;
                self.pc += 1;
            }
            Op::Compute { dest, comp, jump } => {
                let y = if comp.reads_memory {
                    *self.memory()?
                } else {
                    self.a
                };
                let value = comp.op.eval(self.d, y);
                // M is addressed by A before A is updated
                if dest.m {
                    *self.memory()? = value;
                }
                if dest.d {
                    self.d = value;
                }
                let target = self.a;
                if dest.a {
                    self.a = value;
                }
                self.pc = if jump.taken(value) {
                    // a jump uses the A value from before this instruction
                    target as usize
                } else {
                    self.pc + 1
                };
            }
        }
        Ok(())
    }

    /// Runs until the program counter passes the last instruction.
    ///
    /// Returns the number of executed instructions, or `StepLimitExceeded`
    /// once `limit` instructions have run without halting.
    pub fn run(&mut self, program: &Program, limit: u64) -> Result<u64, EmulatorError> {
        let mut steps = 0;
        while self.pc < program.ops.len() {
            if steps == limit {
                return Err(EmulatorError::StepLimitExceeded { limit });
            }
            self.step(program)?;
            steps += 1;
        }
        Ok(steps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emulator::program::load;

    fn run(source: &str) -> Cpu {
        let program = load(source).unwrap();
        let mut cpu = Cpu::new();
        cpu.run(&program, DEFAULT_STEP_LIMIT).unwrap();
        cpu
    }

    #[test]
    fn arithmetic_into_memory() {
        let cpu = run("@2\nD=A\n@3\nD=D+A\n@0\nM=D\n");
        assert_eq!(cpu.peek(0), 5);
    }

    #[test]
    fn am_write_uses_old_address() {
        // RAM[0] = 256; AM=M+1 stores 257 at RAM[0] and sets A to 257
        let mut cpu = Cpu::new();
        cpu.poke(0, 256);
        let program = load("@0\nAM=M+1\nM=-1\n").unwrap();
        cpu.run(&program, 10).unwrap();
        assert_eq!(cpu.peek(0), 257);
        assert_eq!(cpu.peek(257), 0xFFFF);
        assert_eq!(cpu.a, 257);
    }

    #[test]
    fn conditional_jump() {
        let cpu = run("@5\nD=A\n@SKIP\nD;JGT\n@1\nM=1\n(SKIP)\n@2\nM=1\n");
        assert_eq!(cpu.peek(1), 0);
        assert_eq!(cpu.peek(2), 1);
    }

    #[test]
    fn halts_past_the_end() {
        let program = load("@1\nD=A\n").unwrap();
        let mut cpu = Cpu::new();
        assert_eq!(cpu.run(&program, 10).unwrap(), 2);
        assert_eq!(cpu.pc, 2);
    }

    #[test]
    fn infinite_loop_hits_step_limit() {
        let program = load("(LOOP)\n@LOOP\n0;JMP\n").unwrap();
        let mut cpu = Cpu::new();
        assert!(matches!(
            cpu.run(&program, 100),
            Err(EmulatorError::StepLimitExceeded { limit: 100 })
        ));
    }

    #[test]
    fn memory_out_of_bounds() {
        let program = load("@32767\nD=A\nA=D+1\nM=0\n").unwrap();
        let mut cpu = Cpu::new();
        assert!(matches!(
            cpu.run(&program, 10),
            Err(EmulatorError::MemoryOutOfBounds { address: 32768, .. })
        ));
    }
}
