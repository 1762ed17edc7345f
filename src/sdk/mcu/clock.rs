use core::hint::spin_loop;

use crate::sdk::mcu::gpio::PortGroup;
use crate::sdk::mcu::register::{read_reg_prgpio, set_reg_rcgcgpio, RegisterAccess};

/// How long to wait for PRGPIO after gating a port clock on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PollPolicy {
    /// Spin until the hardware reports ready. A port that never does hangs the caller.
    #[default]
    Unbounded,
    /// Give up after this many PRGPIO reads (at least one read is made).
    Bounded(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockError {
    NotReady(PortGroup),
}

#[inline(always)]
pub fn gpio_port_ready<R: RegisterAccess + ?Sized>(regs: &mut R, port: PortGroup) -> bool {
    read_reg_prgpio(regs) & port.clock_bit().bits() != 0
}

/// Gates the clock of `port` on and waits for the port to become accessible.
pub fn gpio_clock_enable<R: RegisterAccess + ?Sized>(
    regs: &mut R,
    port: PortGroup,
    policy: PollPolicy,
) -> Result<(), ClockError> {
    set_reg_rcgcgpio(regs, port.clock_bit().bits());

    match policy {
        PollPolicy::Unbounded => {
            while !gpio_port_ready(regs, port) {
                spin_loop();
            }
            Ok(())
        }
        PollPolicy::Bounded(max_polls) => {
            for _ in 0..max_polls.max(1) {
                if gpio_port_ready(regs, port) {
                    return Ok(());
                }
                spin_loop();
            }
            Err(ClockError::NotReady(port))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sdk::mcu::register::{
        mock_read_reg32, mock_write_reg32, Mmio, FLD_GPIO_PORT, SYSCTL_PRGPIO, SYSCTL_RCGCGPIO,
    };
    use crate::sdk::mcu::sim::SimRegisters;
    use mry::Any;

    #[test]
    fn test_clock_enable_sets_only_the_port_bit() {
        let mut regs = SimRegisters::new();
        regs.preset(SYSCTL_RCGCGPIO, FLD_GPIO_PORT::A.bits());

        gpio_clock_enable(&mut regs, PortGroup::PortF, PollPolicy::Bounded(4)).unwrap();

        assert_eq!(regs.peek(SYSCTL_RCGCGPIO), 0x21);
        assert!(gpio_port_ready(&mut regs, PortGroup::PortF));
        assert!(gpio_port_ready(&mut regs, PortGroup::PortA));
        assert!(!gpio_port_ready(&mut regs, PortGroup::PortB));
    }

    #[test]
    fn test_clock_enable_gives_up_on_stalled_port() {
        let mut regs = SimRegisters::new();
        regs.stall(PortGroup::PortD);

        assert_eq!(
            gpio_clock_enable(&mut regs, PortGroup::PortD, PollPolicy::Bounded(16)),
            Err(ClockError::NotReady(PortGroup::PortD))
        );
        // The gate itself was still requested
        assert_eq!(regs.peek(SYSCTL_RCGCGPIO), FLD_GPIO_PORT::D.bits());
    }

    #[test]
    fn test_bounded_zero_still_polls_once() {
        let mut regs = SimRegisters::new();
        assert_eq!(gpio_clock_enable(&mut regs, PortGroup::PortA, PollPolicy::Bounded(0)), Ok(()));
    }

    #[test]
    #[mry::lock(read_reg32, write_reg32)]
    fn test_unbounded_poll_on_hardware() {
        mock_read_reg32(SYSCTL_RCGCGPIO).returns(0);
        mock_read_reg32(SYSCTL_PRGPIO).returns(FLD_GPIO_PORT::C.bits());
        mock_write_reg32(Any, Any).returns(());

        let mut mmio = unsafe { Mmio::new() };
        gpio_clock_enable(&mut mmio, PortGroup::PortC, PollPolicy::Unbounded).unwrap();

        mock_write_reg32(SYSCTL_RCGCGPIO, FLD_GPIO_PORT::C.bits()).assert_called(1);
        mock_read_reg32(SYSCTL_PRGPIO).assert_called(1);
    }
}
