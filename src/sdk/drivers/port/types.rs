use const_format::formatcp;
use num_derive::FromPrimitive;

use crate::sdk::mcu::gpio::{pin_class, PinClass, PinNum, PortGroup};

// Id for the company in the AUTOSAR
pub const PORT_VENDOR_ID: u16 = 5000;
pub const PORT_MODULE_ID: u16 = 124;
pub const PORT_INSTANCE_ID: u8 = 0;

// AUTOSAR Version 4.0.3
pub const PORT_AR_RELEASE_MAJOR_VERSION: u8 = 4;
pub const PORT_AR_RELEASE_MINOR_VERSION: u8 = 0;
pub const PORT_AR_RELEASE_PATCH_VERSION: u8 = 3;

// Module Version 1.0.0
pub const PORT_SW_MAJOR_VERSION: u8 = 1;
pub const PORT_SW_MINOR_VERSION: u8 = 0;
pub const PORT_SW_PATCH_VERSION: u8 = 0;

pub const PORT_SW_VERSION: &str = formatcp!(
    "{}.{}.{}",
    PORT_SW_MAJOR_VERSION,
    PORT_SW_MINOR_VERSION,
    PORT_SW_PATCH_VERSION
);

/// Service ids, as reported to the DET.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive)]
#[repr(u8)]
pub enum ServiceId {
    Init = 0x00,
    SetPinDirection = 0x01,
    RefreshPortDirection = 0x02,
    GetVersionInfo = 0x03,
    SetPinMode = 0x04,
}

/// Development error codes, as reported to the DET.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive)]
#[repr(u8)]
pub enum PortError {
    /// Invalid pin id requested
    ParamPin = 0x0A,
    /// Pin not configured as direction changeable
    DirectionUnchangeable = 0x0B,
    /// Init called with no configuration
    ParamConfig = 0x0C,
    ParamInvalidMode = 0x0D,
    ModeUnchangeable = 0x0E,
    /// API used before init
    Uninit = 0x0F,
    ParamPointer = 0x10,
}

/// Symbolic pin id: index into the configured pin table.
pub type PinType = u8;

/// Pin mode. 0 is DIO, 10 is ADC; any other valid value is the
/// alternate function number written into GPIOPCTL.
pub type PinModeType = u8;

pub const PORT_DIO_MODE: PinModeType = 0;
pub const PORT_ADC_MODE: PinModeType = 10;
pub const PORT_MAX_MODE: PinModeType = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PinDirection {
    In = 0,
    Out = 1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum InternalResistor {
    Off = 0,
    PullUp = 1,
    PullDown = 2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PinLevel {
    Low = 0,
    High = 1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeKind {
    Dio,
    Analog,
    Alternate,
}

pub const fn mode_kind(mode: PinModeType) -> ModeKind {
    match mode {
        PORT_DIO_MODE => ModeKind::Dio,
        PORT_ADC_MODE => ModeKind::Analog,
        _ => ModeKind::Alternate,
    }
}

/// 11..=13 and anything above 15 are not modes of this part.
pub const fn is_valid_mode(mode: PinModeType) -> bool {
    !(mode > PORT_ADC_MODE && mode < 14) && mode <= PORT_MAX_MODE
}

/// Static configuration of one pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinConfig {
    pub port_num: PortGroup,
    pub pin_num: PinNum,
    pub direction: PinDirection,
    /// Only applied to inputs.
    pub resistor: InternalResistor,
    pub mode: PinModeType,
    pub mode_changeable: bool,
    pub direction_changeable: bool,
    /// Only applied to outputs.
    pub initial_value: PinLevel,
}

impl PinConfig {
    pub const fn class(&self) -> PinClass {
        pin_class(self.port_num, self.pin_num)
    }
}

/// The pin table handed to `Port::init`.
#[derive(Debug, Clone, Copy)]
pub struct PortConfig<'a> {
    pins: &'a [PinConfig],
}

impl<'a> PortConfig<'a> {
    /// Panics on an invalid mode or a pin listed twice, which turns a bad
    /// static table into a build failure.
    pub const fn new(pins: &'a [PinConfig]) -> Self {
        let mut i = 0;
        while i < pins.len() {
            assert!(is_valid_mode(pins[i].mode), "invalid pin mode in port configuration");

            let mut j = i + 1;
            while j < pins.len() {
                let same_port = pins[i].port_num as u8 == pins[j].port_num as u8;
                let same_pin = pins[i].pin_num as u8 == pins[j].pin_num as u8;
                assert!(!(same_port && same_pin), "pin configured twice in port configuration");
                j += 1;
            }
            i += 1;
        }
        PortConfig { pins }
    }

    pub const fn pins(&self) -> &'a [PinConfig] {
        self.pins
    }

    pub const fn len(&self) -> usize {
        self.pins.len()
    }

    pub const fn is_empty(&self) -> bool {
        self.pins.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortStatus {
    NotInitialized,
    Initialized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VersionInfo {
    pub module_id: u16,
    pub vendor_id: u16,
    pub sw_major_version: u8,
    pub sw_minor_version: u8,
    pub sw_patch_version: u8,
}

pub const PORT_VERSION_INFO: VersionInfo = VersionInfo {
    module_id: PORT_MODULE_ID,
    vendor_id: PORT_VENDOR_ID,
    sw_major_version: PORT_SW_MAJOR_VERSION,
    sw_minor_version: PORT_SW_MINOR_VERSION,
    sw_patch_version: PORT_SW_PATCH_VERSION,
};

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::FromPrimitive;

    const fn dio(port_num: PortGroup, pin_num: PinNum, mode: PinModeType) -> PinConfig {
        PinConfig {
            port_num,
            pin_num,
            direction: PinDirection::In,
            resistor: InternalResistor::Off,
            mode,
            mode_changeable: true,
            direction_changeable: true,
            initial_value: PinLevel::Low,
        }
    }

    #[test]
    fn test_mode_validity() {
        for mode in 0..=10 {
            assert!(is_valid_mode(mode), "mode {} should be valid", mode);
        }
        for mode in 11..=13 {
            assert!(!is_valid_mode(mode), "mode {} should be invalid", mode);
        }
        assert!(is_valid_mode(14));
        assert!(is_valid_mode(15));
        assert!(!is_valid_mode(16));
        assert!(!is_valid_mode(u8::MAX));
    }

    #[test]
    fn test_mode_kind() {
        assert_eq!(mode_kind(PORT_DIO_MODE), ModeKind::Dio);
        assert_eq!(mode_kind(PORT_ADC_MODE), ModeKind::Analog);
        assert_eq!(mode_kind(1), ModeKind::Alternate);
        assert_eq!(mode_kind(9), ModeKind::Alternate);
        assert_eq!(mode_kind(14), ModeKind::Alternate);
    }

    #[test]
    fn test_codes_round_trip_through_from_primitive() {
        assert_eq!(PortError::from_u8(0x0A), Some(PortError::ParamPin));
        assert_eq!(PortError::from_u8(0x10), Some(PortError::ParamPointer));
        assert_eq!(PortError::from_u8(0x11), None);
        assert_eq!(ServiceId::from_u8(0x02), Some(ServiceId::RefreshPortDirection));
        assert_eq!(ServiceId::from_u8(0x05), None);
    }

    #[test]
    fn test_version_string() {
        assert_eq!(PORT_SW_VERSION, "1.0.0");
    }

    #[test]
    fn test_config_accepts_distinct_pins() {
        let pins = [dio(PortGroup::PortA, PinNum::Pin0, 0), dio(PortGroup::PortB, PinNum::Pin0, 14)];
        let config = PortConfig::new(&pins);
        assert_eq!(config.len(), 2);
        assert!(!config.is_empty());
        assert_eq!(config.pins()[1].mode, 14);
    }

    #[test]
    #[should_panic(expected = "invalid pin mode")]
    fn test_config_rejects_invalid_mode() {
        let pins = [dio(PortGroup::PortA, PinNum::Pin0, 12)];
        PortConfig::new(&pins);
    }

    #[test]
    #[should_panic(expected = "pin configured twice")]
    fn test_config_rejects_duplicate_pin() {
        let pins = [dio(PortGroup::PortF, PinNum::Pin4, 0), dio(PortGroup::PortF, PinNum::Pin4, 5)];
        PortConfig::new(&pins);
    }

    #[test]
    fn test_pin_class_from_config() {
        assert_eq!(dio(PortGroup::PortC, PinNum::Pin2, 0).class(), PinClass::Jtag);
        assert_eq!(dio(PortGroup::PortF, PinNum::Pin0, 0).class(), PinClass::Locked);
        assert_eq!(dio(PortGroup::PortF, PinNum::Pin4, 0).class(), PinClass::Free);
    }
}
