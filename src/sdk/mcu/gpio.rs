use crate::sdk::mcu::register::{
    RegisterAccess, FLD_GPIO_PORT, GPIO_AFSEL_OFFSET, GPIO_AMSEL_OFFSET, GPIO_CR_OFFSET,
    GPIO_DATA_OFFSET, GPIO_DEN_OFFSET, GPIO_DIR_OFFSET, GPIO_LOCK_OFFSET, GPIO_PCTL_OFFSET,
    GPIO_PDR_OFFSET, GPIO_PORTA_BASE_ADDR, GPIO_PORTB_BASE_ADDR, GPIO_PORTC_BASE_ADDR,
    GPIO_PORTD_BASE_ADDR, GPIO_PORTE_BASE_ADDR, GPIO_PORTF_BASE_ADDR, GPIO_PUR_OFFSET,
};
use crate::{BIT, BIT_RNG};

/// TM4C123GH6PM GPIO ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PortGroup {
    PortA = 0,
    PortB = 1,
    PortC = 2,
    PortD = 3,
    PortE = 4,
    PortF = 5,
}

// Indexed by PortGroup
const GPIO_PORT_BASE: [u32; 6] = [
    GPIO_PORTA_BASE_ADDR,
    GPIO_PORTB_BASE_ADDR,
    GPIO_PORTC_BASE_ADDR,
    GPIO_PORTD_BASE_ADDR,
    GPIO_PORTE_BASE_ADDR,
    GPIO_PORTF_BASE_ADDR,
];

impl PortGroup {
    pub const fn base_addr(self) -> u32 {
        GPIO_PORT_BASE[self as usize]
    }

    /// This port's bit in RCGCGPIO / PRGPIO.
    pub const fn clock_bit(self) -> FLD_GPIO_PORT {
        FLD_GPIO_PORT::from_bits_truncate(BIT!(self as u32))
    }
}

/// Pin position inside a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum PinNum {
    Pin0 = 0,
    Pin1 = 1,
    Pin2 = 2,
    Pin3 = 3,
    Pin4 = 4,
    Pin5 = 5,
    Pin6 = 6,
    Pin7 = 7,
}

impl PinNum {
    #[inline(always)]
    pub const fn bit(self) -> u32 {
        BIT!(self as u32)
    }

    /// This pin's 4-bit field in GPIOPCTL.
    #[inline(always)]
    pub const fn pctl_mask(self) -> u32 {
        BIT_RNG!(0, 3) << self.pctl_shift()
    }

    #[inline(always)]
    pub const fn pctl_shift(self) -> u32 {
        self as u32 * 4
    }
}

/// How the driver may treat a physical pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinClass {
    /// Reconfigurable without ceremony.
    Free,
    /// NMI pins (PF0, PD7): GPIOCR must be unlocked before they accept a new configuration.
    Locked,
    /// JTAG/SWD pins (PC0..PC3), always left at their reset configuration.
    Jtag,
}

pub const fn pin_class(port: PortGroup, pin: PinNum) -> PinClass {
    match (port, pin) {
        (PortGroup::PortF, PinNum::Pin0) | (PortGroup::PortD, PinNum::Pin7) => PinClass::Locked,
        (PortGroup::PortC, PinNum::Pin0 | PinNum::Pin1 | PinNum::Pin2 | PinNum::Pin3) => {
            PinClass::Jtag
        }
        _ => PinClass::Free,
    }
}

/// The register block of one GPIO port.
pub struct GpioBlock<'r, R: RegisterAccess + ?Sized> {
    regs: &'r mut R,
    base: u32,
}

impl<'r, R: RegisterAccess + ?Sized> GpioBlock<'r, R> {
    pub fn new(regs: &'r mut R, port: PortGroup) -> Self {
        GpioBlock { regs, base: port.base_addr() }
    }
}

/// `set_x` / `clear_x` (or only the listed one) for a register of the port block.
macro_rules! gpio_regrw {
    ( set $x:ident, $off:expr ) => {
        paste::paste! {
            impl<'r, R: RegisterAccess + ?Sized> GpioBlock<'r, R> {
                pub fn [<set_ $x>](&mut self, mask: u32) {
                    self.regs.set_bits(self.base + $off, mask)
                }
            }
        }
    };
    ( clear $x:ident, $off:expr ) => {
        paste::paste! {
            impl<'r, R: RegisterAccess + ?Sized> GpioBlock<'r, R> {
                pub fn [<clear_ $x>](&mut self, mask: u32) {
                    self.regs.clear_bits(self.base + $off, mask)
                }
            }
        }
    };
    ( write $x:ident, $off:expr ) => {
        paste::paste! {
            impl<'r, R: RegisterAccess + ?Sized> GpioBlock<'r, R> {
                pub fn [<write_ $x>](&mut self, value: u32) {
                    self.regs.write(self.base + $off, value)
                }
            }
        }
    };
    ( $x:ident, $off:expr ) => {
        gpio_regrw!(set $x, $off);
        gpio_regrw!(clear $x, $off);
    };
}

// DATA bits are only raised while applying an initial level
gpio_regrw!(set data, GPIO_DATA_OFFSET);
gpio_regrw!(dir, GPIO_DIR_OFFSET);
gpio_regrw!(afsel, GPIO_AFSEL_OFFSET);
gpio_regrw!(pur, GPIO_PUR_OFFSET);
gpio_regrw!(pdr, GPIO_PDR_OFFSET);
gpio_regrw!(den, GPIO_DEN_OFFSET);
gpio_regrw!(write lock, GPIO_LOCK_OFFSET);
gpio_regrw!(cr, GPIO_CR_OFFSET);
gpio_regrw!(amsel, GPIO_AMSEL_OFFSET);
gpio_regrw!(pctl, GPIO_PCTL_OFFSET);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sdk::mcu::register::{mock_read_reg32, mock_write_reg32, Mmio, GPIO_LOCK_KEY};
    use mry::Any;

    #[test]
    fn test_base_addr_lookup() {
        assert_eq!(PortGroup::PortA.base_addr(), 0x4000_4000);
        assert_eq!(PortGroup::PortD.base_addr(), 0x4000_7000);
        assert_eq!(PortGroup::PortE.base_addr(), 0x4002_4000);
        assert_eq!(PortGroup::PortF.base_addr(), 0x4002_5000);
    }

    #[test]
    fn test_clock_bit() {
        assert_eq!(PortGroup::PortA.clock_bit(), FLD_GPIO_PORT::A);
        assert_eq!(PortGroup::PortF.clock_bit(), FLD_GPIO_PORT::F);
        assert_eq!(PortGroup::PortF.clock_bit().bits(), 0x20);
    }

    #[test]
    fn test_pctl_field() {
        assert_eq!(PinNum::Pin0.pctl_mask(), 0x0000_000F);
        assert_eq!(PinNum::Pin1.pctl_mask(), 0x0000_00F0);
        assert_eq!(PinNum::Pin7.pctl_mask(), 0xF000_0000);
        assert_eq!(PinNum::Pin4.pctl_shift(), 16);
    }

    #[test]
    fn test_pin_class() {
        assert_eq!(pin_class(PortGroup::PortF, PinNum::Pin0), PinClass::Locked);
        assert_eq!(pin_class(PortGroup::PortD, PinNum::Pin7), PinClass::Locked);
        assert_eq!(pin_class(PortGroup::PortC, PinNum::Pin0), PinClass::Jtag);
        assert_eq!(pin_class(PortGroup::PortC, PinNum::Pin3), PinClass::Jtag);
        assert_eq!(pin_class(PortGroup::PortC, PinNum::Pin4), PinClass::Free);
        assert_eq!(pin_class(PortGroup::PortF, PinNum::Pin1), PinClass::Free);
        assert_eq!(pin_class(PortGroup::PortD, PinNum::Pin0), PinClass::Free);
    }

    #[test]
    #[mry::lock(read_reg32, write_reg32)]
    fn test_block_addresses_port_registers() {
        // PF1 direction bit
        mock_read_reg32(0x4002_5400).returns(0x10);
        mock_write_reg32(Any, Any).returns(());

        let mut mmio = unsafe { Mmio::new() };
        let mut block = GpioBlock::new(&mut mmio, PortGroup::PortF);
        block.set_dir(PinNum::Pin1.bit());

        mock_write_reg32(0x4002_5400, 0x12).assert_called(1);
    }

    #[test]
    #[mry::lock(read_reg32, write_reg32)]
    fn test_block_pctl_modify() {
        mock_read_reg32(0x4000_552C).returns(0xFFFF_FFFF);
        mock_write_reg32(Any, Any).returns(());

        let mut mmio = unsafe { Mmio::new() };
        let mut block = GpioBlock::new(&mut mmio, PortGroup::PortB);
        block.clear_pctl(PinNum::Pin2.pctl_mask());

        mock_write_reg32(0x4000_552C, 0xFFFF_F0FF).assert_called(1);
    }

    #[test]
    #[mry::lock(read_reg32, write_reg32)]
    fn test_block_lock_is_a_plain_store() {
        mock_read_reg32(Any).returns(0);
        mock_write_reg32(Any, Any).returns(());

        let mut mmio = unsafe { Mmio::new() };
        let mut block = GpioBlock::new(&mut mmio, PortGroup::PortD);
        block.write_lock(GPIO_LOCK_KEY);
        block.set_data(PinNum::Pin7.bit());

        mock_write_reg32(0x4000_7520, 0x4C4F_434B).assert_called(1);
        mock_write_reg32(0x4000_73FC, 0x80).assert_called(1);
        // The key write needs no read of GPIOLOCK
        mock_read_reg32(0x4000_7520).assert_called(0);
    }
}
