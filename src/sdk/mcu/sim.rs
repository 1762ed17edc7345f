//! Host-side stand-in for the TM4C123 register space.
//!
//! Registers read as zero until written. Gating a port clock through
//! RCGCGPIO makes the matching PRGPIO bit read back set on the next read,
//! unless the port was stalled with [`SimRegisters::stall`].

use heapless::FnvIndexMap;

use crate::sdk::mcu::gpio::PortGroup;
use crate::sdk::mcu::register::{RegisterAccess, FLD_GPIO_PORT, SYSCTL_PRGPIO, SYSCTL_RCGCGPIO};

const SIM_REGISTER_SLOTS: usize = 128;

#[derive(Debug, Default)]
pub struct SimRegisters {
    cells: FnvIndexMap<u32, u32, SIM_REGISTER_SLOTS>,
    writes: usize,
    stalled: u32,
}

impl SimRegisters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Never report `port` ready in PRGPIO.
    pub fn stall(&mut self, port: PortGroup) {
        self.stalled |= port.clock_bit().bits();
    }

    /// Seeds a register without counting it as a driver write.
    pub fn preset(&mut self, addr: u32, value: u32) {
        self.store(addr, value);
    }

    /// Current value without counting as an access.
    pub fn peek(&self, addr: u32) -> u32 {
        self.cells.get(&addr).copied().unwrap_or(0)
    }

    /// Value of register `offset` in the block of `port`.
    pub fn port_reg(&self, port: PortGroup, offset: u32) -> u32 {
        self.peek(port.base_addr() + offset)
    }

    pub fn write_count(&self) -> usize {
        self.writes
    }

    fn store(&mut self, addr: u32, value: u32) {
        // Capacity covers every register the port driver touches
        let _ = self.cells.insert(addr, value);
    }
}

impl RegisterAccess for SimRegisters {
    fn read(&mut self, addr: u32) -> u32 {
        if addr == SYSCTL_PRGPIO {
            let gated = FLD_GPIO_PORT::from_bits_truncate(self.peek(SYSCTL_RCGCGPIO));
            return gated.bits() & !self.stalled;
        }
        self.peek(addr)
    }

    fn write(&mut self, addr: u32, value: u32) {
        self.writes += 1;
        self.store(addr, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sdk::mcu::register::GPIO_DIR_OFFSET;

    #[test]
    fn test_unwritten_registers_read_zero() {
        let mut regs = SimRegisters::new();
        assert_eq!(regs.read(0x4002_5400), 0);
        assert_eq!(regs.write_count(), 0);
    }

    #[test]
    fn test_preset_is_not_a_write() {
        let mut regs = SimRegisters::new();
        regs.preset(0x4002_5400, 0xAA);
        assert_eq!(regs.read(0x4002_5400), 0xAA);
        assert_eq!(regs.write_count(), 0);
    }

    #[test]
    fn test_prgpio_follows_rcgcgpio() {
        let mut regs = SimRegisters::new();
        regs.write(SYSCTL_RCGCGPIO, FLD_GPIO_PORT::B.bits() | FLD_GPIO_PORT::E.bits());
        assert_eq!(regs.read(SYSCTL_PRGPIO), 0x12);

        regs.stall(PortGroup::PortE);
        assert_eq!(regs.read(SYSCTL_PRGPIO), 0x02);
    }

    #[test]
    fn test_modify_through_mut_ref_counts_one_write() {
        fn set_pa2_output<R: RegisterAccess>(mut regs: R) {
            regs.set_bits(PortGroup::PortA.base_addr() + GPIO_DIR_OFFSET, 0x04);
        }

        let mut regs = SimRegisters::new();
        set_pa2_output(&mut regs);
        assert_eq!(regs.port_reg(PortGroup::PortA, GPIO_DIR_OFFSET), 0x04);
        assert_eq!(regs.write_count(), 1);
    }
}
