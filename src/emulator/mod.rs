//! Reference simulator for the target machine.
//!
//! Loads symbolic assembly text (see [`program`]) and executes it on a
//! [`Cpu`] with 16-bit wrapping arithmetic. Used to check the behavior of
//! translated code; no binary encoding is involved.

pub mod cpu;
pub mod errors;
pub mod program;

pub use cpu::{Cpu, DEFAULT_STEP_LIMIT, RAM_SIZE};
pub use errors::EmulatorError;
pub use program::{Program, ROM_SIZE, load};

/// Loads `source` and runs it on `cpu` with the given step budget.
pub fn run_source(cpu: &mut Cpu, source: &str, limit: u64) -> Result<Program, EmulatorError> {
    let program = load(source)?;
    cpu.run(&program, limit)?;
    Ok(program)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_source_returns_the_loaded_program() {
        let mut cpu = Cpu::new();
        let program = run_source(&mut cpu, "@7\nD=A\n@total\nM=D\n", 10).unwrap();
        let total = program.symbol("total").unwrap();
        assert_eq!(cpu.peek(total), 7);
    }

    #[test]
    fn run_source_reports_load_and_run_errors() {
        let mut cpu = Cpu::new();
        assert!(matches!(
            run_source(&mut cpu, "D=Q\n", 10),
            Err(EmulatorError::InvalidComputation { .. })
        ));
        assert!(matches!(
            run_source(&mut cpu, "(L)\n@L\n0;JMP\n", 5),
            Err(EmulatorError::StepLimitExceeded { limit: 5 })
        ));
    }
}
