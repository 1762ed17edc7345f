use crate::sdk::drivers::port::{
    InternalResistor, PinConfig, PinDirection, PinLevel, PinModeType, PinType, PortConfig,
    PORT_AR_RELEASE_MAJOR_VERSION, PORT_AR_RELEASE_MINOR_VERSION, PORT_AR_RELEASE_PATCH_VERSION,
    PORT_DIO_MODE, PORT_SW_MAJOR_VERSION, PORT_SW_MINOR_VERSION, PORT_SW_PATCH_VERSION,
};
use crate::sdk::mcu::gpio::{PinNum, PortGroup};

// Configuration version, must match the driver it is built with
pub const PORT_CFG_SW_MAJOR_VERSION: u8 = 1;
pub const PORT_CFG_SW_MINOR_VERSION: u8 = 0;
pub const PORT_CFG_SW_PATCH_VERSION: u8 = 0;

pub const PORT_CFG_AR_RELEASE_MAJOR_VERSION: u8 = 4;
pub const PORT_CFG_AR_RELEASE_MINOR_VERSION: u8 = 0;
pub const PORT_CFG_AR_RELEASE_PATCH_VERSION: u8 = 3;

const _: () = assert!(
    PORT_CFG_SW_MAJOR_VERSION == PORT_SW_MAJOR_VERSION
        && PORT_CFG_SW_MINOR_VERSION == PORT_SW_MINOR_VERSION
        && PORT_CFG_SW_PATCH_VERSION == PORT_SW_PATCH_VERSION,
    "the software version of the port configuration does not match the driver"
);

const _: () = assert!(
    PORT_CFG_AR_RELEASE_MAJOR_VERSION == PORT_AR_RELEASE_MAJOR_VERSION
        && PORT_CFG_AR_RELEASE_MINOR_VERSION == PORT_AR_RELEASE_MINOR_VERSION
        && PORT_CFG_AR_RELEASE_PATCH_VERSION == PORT_AR_RELEASE_PATCH_VERSION,
    "the AUTOSAR version of the port configuration does not match the driver"
);

pub const PORT_CONFIGURED_PINS: usize = 2;

// Symbolic pin ids, indices into PORT_PINS
pub const PORT_LED1_ID: PinType = 0;
pub const PORT_SW1_ID: PinType = 1;

// LED1 on the LaunchPad (red)
pub const PORT_LED1_PORT_NUM: PortGroup = PortGroup::PortF;
pub const PORT_LED1_PIN_NUM: PinNum = PinNum::Pin1;

// SW1 on the LaunchPad, active low
pub const PORT_SW1_PORT_NUM: PortGroup = PortGroup::PortF;
pub const PORT_SW1_PIN_NUM: PinNum = PinNum::Pin4;

pub const PORT_LED1_MODE_CHANGEABLE: bool = true;
pub const PORT_LED1_DIRECTION_CHANGEABLE: bool = true;
pub const PORT_SW1_MODE_CHANGEABLE: bool = true;
pub const PORT_SW1_DIRECTION_CHANGEABLE: bool = true;

/// Modes available on PF1.
pub struct PortFPin1;

impl PortFPin1 {
    pub const DIO: PinModeType = PORT_DIO_MODE;
    pub const U1RTS: PinModeType = 1;
    pub const SSI1RX: PinModeType = 2;
    pub const M1PWM5: PinModeType = 5;
    pub const PHB0: PinModeType = 6;
    pub const T0CCP1: PinModeType = 7;
    pub const C1O: PinModeType = 9;
    pub const TRD1: PinModeType = 14;
}

/// Modes available on PF4.
pub struct PortFPin4;

impl PortFPin4 {
    pub const DIO: PinModeType = PORT_DIO_MODE;
    pub const M1FAULT0: PinModeType = 5;
    pub const IDX0: PinModeType = 6;
    pub const T2CCP0: PinModeType = 7;
    pub const USB0EPEN: PinModeType = 8;
}

pub const PORT_PINS: [PinConfig; PORT_CONFIGURED_PINS] = [
    PinConfig {
        port_num: PORT_LED1_PORT_NUM,
        pin_num: PORT_LED1_PIN_NUM,
        direction: PinDirection::Out,
        resistor: InternalResistor::Off,
        mode: PortFPin1::DIO,
        mode_changeable: PORT_LED1_MODE_CHANGEABLE,
        direction_changeable: PORT_LED1_DIRECTION_CHANGEABLE,
        initial_value: PinLevel::Low,
    },
    PinConfig {
        port_num: PORT_SW1_PORT_NUM,
        pin_num: PORT_SW1_PIN_NUM,
        direction: PinDirection::In,
        resistor: InternalResistor::PullUp,
        mode: PortFPin4::DIO,
        mode_changeable: PORT_SW1_MODE_CHANGEABLE,
        direction_changeable: PORT_SW1_DIRECTION_CHANGEABLE,
        initial_value: PinLevel::Low,
    },
];

pub static PORT_CONFIGURATION: PortConfig<'static> = PortConfig::new(&PORT_PINS);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbolic_ids_index_the_table() {
        let led = PORT_CONFIGURATION.pins()[PORT_LED1_ID as usize];
        assert_eq!((led.port_num, led.pin_num), (PortGroup::PortF, PinNum::Pin1));
        assert_eq!(led.direction, PinDirection::Out);

        let sw = PORT_CONFIGURATION.pins()[PORT_SW1_ID as usize];
        assert_eq!((sw.port_num, sw.pin_num), (PortGroup::PortF, PinNum::Pin4));
        assert_eq!(sw.resistor, InternalResistor::PullUp);
    }

    #[test]
    fn test_table_size() {
        assert_eq!(PORT_CONFIGURATION.len(), PORT_CONFIGURED_PINS);
    }
}
