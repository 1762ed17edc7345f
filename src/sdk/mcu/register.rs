//! TM4C123GH6PM register map and register access backends.
//!
//! Everything that touches the memory-mapped register space goes through
//! [`RegisterAccess`], so the drivers above can run against the real
//! peripheral ([`Mmio`]) or a simulated register file.

use bitflags::bitflags;

use crate::{BIT, BM_CLR, BM_SET};

/****************************************************
 system control regs
 *****************************************************/
pub const SYSCTL_BASE_ADDR: u32 = 0x400F_E000;

/// Run mode clock gating control for the GPIO ports
pub const SYSCTL_RCGCGPIO: u32 = SYSCTL_BASE_ADDR + 0x608;
/// GPIO peripheral ready
pub const SYSCTL_PRGPIO: u32 = SYSCTL_BASE_ADDR + 0xA08;

bitflags! {
    /// Per-port bits shared by RCGCGPIO and PRGPIO.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FLD_GPIO_PORT: u32 {
        const A = BIT!(0);
        const B = BIT!(1);
        const C = BIT!(2);
        const D = BIT!(3);
        const E = BIT!(4);
        const F = BIT!(5);
    }
}

/****************************************************
 gpio regs, APB aperture
 *****************************************************/
pub const GPIO_PORTA_BASE_ADDR: u32 = 0x4000_4000;
pub const GPIO_PORTB_BASE_ADDR: u32 = 0x4000_5000;
pub const GPIO_PORTC_BASE_ADDR: u32 = 0x4000_6000;
pub const GPIO_PORTD_BASE_ADDR: u32 = 0x4000_7000;
pub const GPIO_PORTE_BASE_ADDR: u32 = 0x4002_4000;
pub const GPIO_PORTF_BASE_ADDR: u32 = 0x4002_5000;

// DATA is addressed through the all-ones mask window (address bits 9:2)
pub const GPIO_DATA_OFFSET: u32 = 0x3FC;
pub const GPIO_DIR_OFFSET: u32 = 0x400;
pub const GPIO_AFSEL_OFFSET: u32 = 0x420;
pub const GPIO_PUR_OFFSET: u32 = 0x510;
pub const GPIO_PDR_OFFSET: u32 = 0x514;
pub const GPIO_DEN_OFFSET: u32 = 0x51C;
pub const GPIO_LOCK_OFFSET: u32 = 0x520;
pub const GPIO_CR_OFFSET: u32 = 0x524;
pub const GPIO_AMSEL_OFFSET: u32 = 0x528;
pub const GPIO_PCTL_OFFSET: u32 = 0x52C;

/// Writing this to GPIOLOCK opens GPIOCR for writes.
pub const GPIO_LOCK_KEY: u32 = 0x4C4F_434B;

/// 32-bit access to the register space.
pub trait RegisterAccess {
    fn read(&mut self, addr: u32) -> u32;

    fn write(&mut self, addr: u32, value: u32);

    /// Read-modify-write of a single register.
    fn modify<F: FnOnce(u32) -> u32>(&mut self, addr: u32, f: F) {
        let val = self.read(addr);
        self.write(addr, f(val));
    }

    fn set_bits(&mut self, addr: u32, mask: u32) {
        self.modify(addr, |mut val| {
            BM_SET!(val, mask);
            val
        });
    }

    fn clear_bits(&mut self, addr: u32, mask: u32) {
        self.modify(addr, |mut val| {
            BM_CLR!(val, mask);
            val
        });
    }
}

impl<T: RegisterAccess + ?Sized> RegisterAccess for &mut T {
    fn read(&mut self, addr: u32) -> u32 {
        (**self).read(addr)
    }

    fn write(&mut self, addr: u32, value: u32) {
        (**self).write(addr, value)
    }

    fn modify<F: FnOnce(u32) -> u32>(&mut self, addr: u32, f: F) {
        (**self).modify(addr, f)
    }
}

/// Accessors for a register at a fixed address, e.g. `read_reg_prgpio(regs)`.
#[macro_export]
macro_rules! regrw {
    ( read $x:ident, $a:expr ) => {
        paste::paste! {
            pub fn [<read_ $x>]<R: $crate::sdk::mcu::register::RegisterAccess + ?Sized>(regs: &mut R) -> u32 {
                regs.read($a)
            }
        }
    };
    ( set $x:ident, $a:expr ) => {
        paste::paste! {
            pub fn [<set_ $x>]<R: $crate::sdk::mcu::register::RegisterAccess + ?Sized>(regs: &mut R, mask: u32) {
                regs.set_bits($a, mask)
            }
        }
    };
}

// RCGCGPIO is only ever OR-ed into, PRGPIO is read-only
regrw!(set reg_rcgcgpio, SYSCTL_RCGCGPIO);
regrw!(read reg_prgpio, SYSCTL_PRGPIO);

#[cfg_attr(test, mry::mry)]
pub fn read_reg32(addr: u32) -> u32 {
    unsafe { core::ptr::read_volatile(addr as usize as *const u32) }
}

#[cfg_attr(test, mry::mry)]
pub fn write_reg32(addr: u32, value: u32) {
    unsafe { core::ptr::write_volatile(addr as usize as *mut u32, value) }
}

/// The real peripheral.
///
/// Read-modify-write sequences run inside a critical section so a bit update
/// cannot interleave with an interrupt handler touching the same register.
pub struct Mmio {
    _private: (),
}

impl Mmio {
    /// # Safety
    ///
    /// Only sound on a TM4C123 target where the register map above is
    /// mapped, and only one `Mmio` should drive the GPIO block at a time.
    pub const unsafe fn new() -> Self {
        Mmio { _private: () }
    }
}

impl RegisterAccess for Mmio {
    #[inline(always)]
    fn read(&mut self, addr: u32) -> u32 {
        read_reg32(addr)
    }

    #[inline(always)]
    fn write(&mut self, addr: u32, value: u32) {
        write_reg32(addr, value)
    }

    fn modify<F: FnOnce(u32) -> u32>(&mut self, addr: u32, f: F) {
        critical_section::with(|_| {
            let val = read_reg32(addr);
            write_reg32(addr, f(val));
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mry::Any;

    #[test]
    #[mry::lock(read_reg32, write_reg32)]
    fn test_mmio_set_bits_keeps_other_bits() {
        let dir = GPIO_PORTF_BASE_ADDR + GPIO_DIR_OFFSET;
        mock_read_reg32(dir).returns(0x0000_0011);
        mock_write_reg32(Any, Any).returns(());

        let mut regs = unsafe { Mmio::new() };
        regs.set_bits(dir, BIT!(1));

        mock_read_reg32(dir).assert_called(1);
        mock_write_reg32(dir, 0x0000_0013).assert_called(1);
    }

    #[test]
    #[mry::lock(read_reg32, write_reg32)]
    fn test_mmio_clear_bits() {
        let pur = GPIO_PORTA_BASE_ADDR + GPIO_PUR_OFFSET;
        mock_read_reg32(pur).returns(0xFF);
        mock_write_reg32(Any, Any).returns(());

        let mut regs = unsafe { Mmio::new() };
        regs.clear_bits(pur, BIT!(4) | BIT!(0));

        mock_write_reg32(pur, 0xEE).assert_called(1);
    }

    #[test]
    #[mry::lock(write_reg32)]
    fn test_mmio_write_is_a_single_store() {
        let lock = GPIO_PORTD_BASE_ADDR + GPIO_LOCK_OFFSET;
        mock_write_reg32(Any, Any).returns(());

        let mut regs = unsafe { Mmio::new() };
        regs.write(lock, GPIO_LOCK_KEY);

        mock_write_reg32(lock, 0x4C4F_434B).assert_called(1);
        mock_write_reg32(Any, Any).assert_called(1);
    }

    #[test]
    #[mry::lock(read_reg32, write_reg32)]
    fn test_regrw_accessors_hit_sysctl() {
        mock_read_reg32(SYSCTL_RCGCGPIO).returns(FLD_GPIO_PORT::A.bits());
        mock_read_reg32(SYSCTL_PRGPIO).returns(FLD_GPIO_PORT::A.bits());
        mock_write_reg32(Any, Any).returns(());

        let mut regs = unsafe { Mmio::new() };
        set_reg_rcgcgpio(&mut regs, FLD_GPIO_PORT::F.bits());
        let ready = read_reg_prgpio(&mut regs);

        mock_write_reg32(SYSCTL_RCGCGPIO, 0x21).assert_called(1);
        assert_eq!(ready, 0x01);
    }

    #[test]
    fn test_port_bases_are_distinct() {
        let bases = [
            GPIO_PORTA_BASE_ADDR,
            GPIO_PORTB_BASE_ADDR,
            GPIO_PORTC_BASE_ADDR,
            GPIO_PORTD_BASE_ADDR,
            GPIO_PORTE_BASE_ADDR,
            GPIO_PORTF_BASE_ADDR,
        ];
        for (i, a) in bases.iter().enumerate() {
            for b in &bases[i + 1..] {
                assert!(a.abs_diff(*b) >= 0x1000);
            }
        }
    }
}
