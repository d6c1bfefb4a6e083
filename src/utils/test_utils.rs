//! Test utilities for running translated code.

#[cfg(test)]
pub mod utils {
    use crate::emulator::{Cpu, DEFAULT_STEP_LIMIT, run_source};
    use crate::translator::{Config, TranslateError, translate_source};

    /// Unit name used by scenario tests.
    pub const TEST_UNIT: &str = "Test";
    /// Stack base used by scenario tests.
    pub const STACK_BASE: u16 = 256;

    /// Translates `source` as unit [`TEST_UNIT`], panicking on failure.
    pub fn translate(source: &str) -> String {
        translate_source(source, &Config::new(TEST_UNIT))
            .expect("translation failed")
            .assembly
    }

    /// Translates `source` and returns the underlying error kind.
    pub fn translate_expect_err(source: &str) -> TranslateError {
        match translate_source(source, &Config::new(TEST_UNIT)) {
            Ok(_) => panic!("expected translation of {source:?} to fail"),
            Err(err) => match err {
                TranslateError::Located { source, .. } => *source,
                other => other,
            },
        }
    }

    /// Translates and runs `source` with SP at [`STACK_BASE`].
    pub fn run_vm(source: &str) -> Cpu {
        run_vm_with(source, |_| {})
    }

    /// Like [`run_vm`], applying `setup` to the machine before execution.
    pub fn run_vm_with(source: &str, setup: impl FnOnce(&mut Cpu)) -> Cpu {
        let assembly = translate(source);
        let mut cpu = Cpu::new();
        cpu.poke(0, STACK_BASE);
        setup(&mut cpu);
        run_source(&mut cpu, &assembly, DEFAULT_STEP_LIMIT)
            .expect("emitted assembly failed to load or run");
        cpu
    }

    /// Value at the top of the stack.
    pub fn stack_top(cpu: &Cpu) -> u16 {
        cpu.peek(cpu.peek(0).wrapping_sub(1))
    }

    /// Current stack pointer.
    pub fn sp(cpu: &Cpu) -> u16 {
        cpu.peek(0)
    }
}
