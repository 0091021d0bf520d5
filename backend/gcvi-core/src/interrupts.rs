//! VI display interrupts

use crate::registers::InterruptRegister;

/// A processor interface interrupt cause, identified by its bit in the PI cause register
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InterruptCause(u32);

impl InterruptCause {
    pub const VI: Self = Self(1 << 8);

    #[inline]
    #[must_use]
    pub fn bit(self) -> u32 {
        self.0
    }
}

/// Whether any display interrupt is both pending and enabled
pub(crate) fn any_asserted(registers: &[InterruptRegister]) -> bool {
    registers.iter().any(|register| register.asserted())
}

/// Latch the pending bit of every display interrupt whose position matches the current half-line.
///
/// The beam position is only tracked at half-line granularity, so HCT only selects which half of
/// the target line the interrupt fires in.
pub(crate) fn check_positions(registers: &mut [InterruptRegister], half_line_count: u32, hlw: u32) {
    let line = 1 + half_line_count / 2;
    let half = half_line_count & 1;

    for (i, register) in registers.iter_mut().enumerate() {
        let target_half = u32::from(register.hct() > hlw);
        if line == register.vct() && half == target_half {
            if !register.pending() {
                log::trace!("Display interrupt {i} triggered at half-line {half_line_count}");
            }
            register.set_pending(true);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(vct: u32, hct: u32, mask: bool) -> InterruptRegister {
        let mut register = InterruptRegister::default();
        register.set_vct(vct);
        register.set_hct(hct);
        register.set_mask(mask);
        register
    }

    #[test]
    fn asserted_requires_pending_and_mask() {
        let mut registers = [register(1, 1, false), register(1, 1, true)];
        assert!(!any_asserted(&registers));

        registers[0].set_pending(true);
        assert!(!any_asserted(&registers));

        registers[1].set_pending(true);
        assert!(any_asserted(&registers));
    }

    #[test]
    fn position_match_selects_half_by_hct() {
        let mut registers = [register(100, 10, true), register(100, 500, true)];

        check_positions(&mut registers, 197, 429);
        assert!(!registers[0].pending());
        assert!(!registers[1].pending());

        check_positions(&mut registers, 198, 429);
        assert!(registers[0].pending());
        assert!(!registers[1].pending());

        check_positions(&mut registers, 199, 429);
        assert!(registers[1].pending());
    }
}
