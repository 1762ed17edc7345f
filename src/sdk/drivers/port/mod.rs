//! Port driver: one-time pin setup from a static table plus the runtime
//! direction, mode and version services.
//!
//! API misuse is never returned to the caller. It is reported to the [`Det`]
//! sink the driver was built with, and the offending call does nothing.

mod types;

pub use types::*;

#[cfg(feature = "dev-error-detect")]
use crate::config::PORT_CONFIGURED_PINS;
use crate::sdk::det::Det;
use crate::sdk::mcu::clock::{gpio_clock_enable, ClockError, PollPolicy};
use crate::sdk::mcu::gpio::{GpioBlock, PinClass, PinNum};
use crate::sdk::mcu::register::{RegisterAccess, GPIO_LOCK_KEY};

pub struct Port<'cfg, R: RegisterAccess, D: Det> {
    regs: R,
    det: D,
    poll: PollPolicy,
    status: PortStatus,
    config: Option<&'cfg PortConfig<'cfg>>,
}

impl<'cfg, R: RegisterAccess, D: Det> Port<'cfg, R, D> {
    pub fn new(regs: R, det: D) -> Self {
        Port { regs, det, poll: PollPolicy::default(), status: PortStatus::NotInitialized, config: None }
    }

    pub fn with_poll_policy(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }

    pub fn status(&self) -> PortStatus {
        self.status
    }

    pub fn registers(&self) -> &R {
        &self.regs
    }

    pub fn registers_mut(&mut self) -> &mut R {
        &mut self.regs
    }

    pub fn det(&self) -> &D {
        &self.det
    }

    pub fn det_mut(&mut self) -> &mut D {
        &mut self.det
    }

    /// Applies `config` to the hardware and keeps it for the runtime services.
    ///
    /// Calling it again re-applies the (possibly different) table. A pass
    /// aborted on a port clock leaves the driver uninitialized.
    pub fn init(&mut self, config: Option<&'cfg PortConfig<'cfg>>) {
        let Some(config) = config else {
            #[cfg(feature = "dev-error-detect")]
            self.report(ServiceId::Init, PortError::ParamConfig);
            return;
        };

        for pin in config.pins() {
            if let Err(ClockError::NotReady(port)) =
                gpio_clock_enable(&mut self.regs, pin.port_num, self.poll)
            {
                log::error!("port: {:?} never reported ready, init aborted", port);
                // Part of the table may already be applied, keep nothing from an earlier pass
                self.config = None;
                self.status = PortStatus::NotInitialized;
                return;
            }

            let bit = pin.pin_num.bit();
            let mut block = GpioBlock::new(&mut self.regs, pin.port_num);

            match pin.class() {
                PinClass::Locked => {
                    block.write_lock(GPIO_LOCK_KEY);
                    block.clear_cr(bit);
                    block.set_cr(bit);
                }
                PinClass::Jtag => {
                    log::trace!("port: {:?}.{:?} is a debug pin, skipped", pin.port_num, pin.pin_num);
                    continue;
                }
                PinClass::Free => {}
            }

            program_mode(&mut block, pin.pin_num, pin.mode, pin.mode);

            match pin.direction {
                PinDirection::Out => {
                    block.set_dir(bit);
                    block.set_data((pin.initial_value as u32) << pin.pin_num as u32);
                }
                PinDirection::In => {
                    block.clear_dir(bit);
                    match pin.resistor {
                        InternalResistor::Off => {
                            block.clear_pur(bit);
                            block.clear_pdr(bit);
                        }
                        InternalResistor::PullUp => {
                            block.clear_pdr(bit);
                            block.set_pur(bit);
                        }
                        InternalResistor::PullDown => {
                            block.clear_pur(bit);
                            block.set_pdr(bit);
                        }
                    }
                }
            }

            log::debug!(
                "port: {:?}.{:?} {:?} mode {}",
                pin.port_num,
                pin.pin_num,
                pin.direction,
                pin.mode
            );
        }

        self.config = Some(config);
        self.status = PortStatus::Initialized;
        log::info!("port: driver {} initialized, {} pins", PORT_SW_VERSION, config.len());
    }

    #[cfg(feature = "set-pin-direction-api")]
    pub fn set_pin_direction(&mut self, pin: PinType, direction: PinDirection) {
        #[cfg(feature = "dev-error-detect")]
        {
            let api = ServiceId::SetPinDirection;
            let mut failed = self.det_check(self.uninit(), api, PortError::Uninit);
            failed |= self.det_check(self.out_of_range(pin), api, PortError::ParamPin);
            failed |= self.det_check(
                self.pin(pin).is_some_and(|p| !p.direction_changeable),
                api,
                PortError::DirectionUnchangeable,
            );
            if failed {
                return;
            }
        }

        let Some(cfg) = self.pin(pin) else {
            return;
        };
        if cfg.class() == PinClass::Jtag {
            return;
        }

        let mut block = GpioBlock::new(&mut self.regs, cfg.port_num);
        match direction {
            PinDirection::In => block.clear_dir(cfg.pin_num.bit()),
            PinDirection::Out => block.set_dir(cfg.pin_num.bit()),
        }
        log::debug!("port: pin {} direction {:?}", pin, direction);
    }

    /// Re-applies the configured direction of every pin whose direction is
    /// not changeable at runtime.
    pub fn refresh_port_direction(&mut self) {
        #[cfg(feature = "dev-error-detect")]
        if self.det_check(self.uninit(), ServiceId::RefreshPortDirection, PortError::Uninit) {
            return;
        }

        let Some(config) = self.config else {
            return;
        };

        for pin in config.pins() {
            if pin.direction_changeable || pin.class() == PinClass::Jtag {
                continue;
            }

            let bit = pin.pin_num.bit();
            let mut block = GpioBlock::new(&mut self.regs, pin.port_num);
            match pin.direction {
                PinDirection::Out => {
                    block.clear_dir(bit);
                    block.set_dir(bit);
                }
                PinDirection::In => block.clear_dir(bit),
            }
        }
        log::trace!("port: directions refreshed");
    }

    /// Usable before init.
    #[cfg(feature = "version-info-api")]
    pub fn get_version_info(&mut self, versioninfo: Option<&mut VersionInfo>) {
        let Some(versioninfo) = versioninfo else {
            #[cfg(feature = "dev-error-detect")]
            self.report(ServiceId::GetVersionInfo, PortError::ParamPointer);
            return;
        };
        *versioninfo = PORT_VERSION_INFO;
    }

    /// The register sequence is picked by the pin's configured mode, while
    /// the nibble written to GPIOPCTL for an alternate function is `mode`.
    #[cfg(feature = "set-pin-mode-api")]
    pub fn set_pin_mode(&mut self, pin: PinType, mode: PinModeType) {
        #[cfg(feature = "dev-error-detect")]
        {
            let api = ServiceId::SetPinMode;
            let mut failed = self.det_check(self.uninit(), api, PortError::Uninit);
            failed |= self.det_check(self.out_of_range(pin), api, PortError::ParamPin);
            failed |= self.det_check(
                self.pin(pin).is_some_and(|p| !p.mode_changeable),
                api,
                PortError::ModeUnchangeable,
            );
            failed |= self.det_check(!is_valid_mode(mode), api, PortError::ParamInvalidMode);
            if failed {
                return;
            }
        }

        let Some(cfg) = self.pin(pin) else {
            return;
        };
        if cfg.class() == PinClass::Jtag {
            return;
        }

        let mut block = GpioBlock::new(&mut self.regs, cfg.port_num);
        program_mode(&mut block, cfg.pin_num, cfg.mode, mode);
        log::debug!("port: pin {} mode {}", pin, mode);
    }

    fn pin(&self, pin: PinType) -> Option<&'cfg PinConfig> {
        self.config?.pins().get(usize::from(pin))
    }

    #[cfg(feature = "dev-error-detect")]
    fn uninit(&self) -> bool {
        self.status == PortStatus::NotInitialized
    }

    /// Checked against the board's configured pin count until a table is loaded.
    #[cfg(feature = "dev-error-detect")]
    fn out_of_range(&self, pin: PinType) -> bool {
        usize::from(pin) >= self.config.map_or(PORT_CONFIGURED_PINS, PortConfig::len)
    }

    #[cfg(feature = "dev-error-detect")]
    fn det_check(&mut self, failed: bool, api: ServiceId, error: PortError) -> bool {
        if failed {
            self.report(api, error);
        }
        failed
    }

    #[cfg(feature = "dev-error-detect")]
    fn report(&mut self, api: ServiceId, error: PortError) {
        self.det.report_error(PORT_MODULE_ID, PORT_INSTANCE_ID, api as u8, error as u8);
    }
}

/// Programs DEN, AFSEL, AMSEL and the PCTL nibble of `pin` for the mode
/// class of `selector`. Alternate functions write `mode` into the nibble.
fn program_mode<R: RegisterAccess + ?Sized>(
    block: &mut GpioBlock<'_, R>,
    pin: PinNum,
    selector: PinModeType,
    mode: PinModeType,
) {
    let bit = pin.bit();
    match mode_kind(selector) {
        ModeKind::Dio => {
            block.set_den(bit);
            block.clear_afsel(bit);
            block.clear_amsel(bit);
            block.clear_pctl(pin.pctl_mask());
        }
        ModeKind::Analog => {
            block.clear_den(bit);
            block.clear_afsel(bit);
            block.set_amsel(bit);
            block.clear_pctl(pin.pctl_mask());
        }
        ModeKind::Alternate => {
            block.set_den(bit);
            block.set_afsel(bit);
            block.clear_amsel(bit);
            block.clear_pctl(pin.pctl_mask());
            block.set_pctl(((mode as u32) << pin.pctl_shift()) & pin.pctl_mask());
        }
    }
}

#[cfg(all(
    test,
    feature = "dev-error-detect",
    feature = "set-pin-direction-api",
    feature = "set-pin-mode-api",
    feature = "version-info-api"
))]
mod tests {
    use super::*;
    use crate::config::{PORT_CONFIGURATION, PORT_LED1_ID, PORT_SW1_ID, PortFPin1};
    use crate::sdk::det::{DetReport, RecordingDet};
    use crate::sdk::mcu::gpio::PortGroup;
    use crate::sdk::mcu::register::*;
    use crate::sdk::mcu::sim::SimRegisters;

    type SimPort<'a> = Port<'a, SimRegisters, RecordingDet>;

    fn sim_port<'a>() -> SimPort<'a> {
        Port::new(SimRegisters::new(), RecordingDet::new()).with_poll_policy(PollPolicy::Bounded(8))
    }

    const fn output(port_num: PortGroup, pin_num: PinNum, changeable: bool) -> PinConfig {
        PinConfig {
            port_num,
            pin_num,
            direction: PinDirection::Out,
            resistor: InternalResistor::Off,
            mode: PORT_DIO_MODE,
            mode_changeable: changeable,
            direction_changeable: changeable,
            initial_value: PinLevel::Low,
        }
    }

    const fn input(
        port_num: PortGroup,
        pin_num: PinNum,
        resistor: InternalResistor,
        changeable: bool,
    ) -> PinConfig {
        PinConfig { direction: PinDirection::In, resistor, ..output(port_num, pin_num, changeable) }
    }

    fn reg(port: &SimPort<'_>, group: PortGroup, offset: u32) -> u32 {
        port.registers().port_reg(group, offset)
    }

    fn errors(port: &SimPort<'_>) -> Vec<(ServiceId, PortError)> {
        port.det().reports().iter().filter_map(DetReport::as_port_error).collect()
    }

    #[test]
    fn test_init_without_config() {
        let mut port = sim_port();
        port.init(None);

        assert_eq!(port.status(), PortStatus::NotInitialized);
        assert_eq!(port.registers().write_count(), 0);
        assert_eq!(
            port.det().reports(),
            &[DetReport { module_id: 124, instance_id: 0, api_id: 0x00, error_id: 0x0C }]
        );
    }

    #[test]
    fn test_init_board_configuration() {
        let mut port: SimPort<'static> = sim_port();
        port.init(Some(&PORT_CONFIGURATION));

        assert_eq!(port.status(), PortStatus::Initialized);
        assert_eq!(port.det().count(), 0);
        assert_eq!(port.registers().peek(SYSCTL_RCGCGPIO), FLD_GPIO_PORT::F.bits());

        let f = PortGroup::PortF;
        assert_eq!(reg(&port, f, GPIO_DIR_OFFSET), 0x02);
        assert_eq!(reg(&port, f, GPIO_DATA_OFFSET), 0x00);
        assert_eq!(reg(&port, f, GPIO_PUR_OFFSET), 0x10);
        assert_eq!(reg(&port, f, GPIO_PDR_OFFSET), 0x00);
        assert_eq!(reg(&port, f, GPIO_DEN_OFFSET), 0x12);
        assert_eq!(reg(&port, f, GPIO_AFSEL_OFFSET), 0x00);
        assert_eq!(reg(&port, f, GPIO_AMSEL_OFFSET), 0x00);
        assert_eq!(reg(&port, f, GPIO_PCTL_OFFSET), 0x00);
        // Neither PF1 nor PF4 is behind the commit lock
        assert_eq!(reg(&port, f, GPIO_LOCK_OFFSET), 0);
    }

    #[test]
    fn test_init_output_driven_high() {
        let pins = [PinConfig { initial_value: PinLevel::High, ..output(PortGroup::PortB, PinNum::Pin3, true) }];
        let config = PortConfig::new(&pins);

        let mut port = sim_port();
        port.registers_mut().preset(PortGroup::PortB.base_addr() + GPIO_DATA_OFFSET, 0x01);
        port.init(Some(&config));

        assert_eq!(reg(&port, PortGroup::PortB, GPIO_DATA_OFFSET), 0x09);
        assert_eq!(reg(&port, PortGroup::PortB, GPIO_DIR_OFFSET), 0x08);
    }

    #[test]
    fn test_init_input_resistors() {
        let pins = [
            input(PortGroup::PortA, PinNum::Pin2, InternalResistor::PullDown, true),
            input(PortGroup::PortA, PinNum::Pin3, InternalResistor::Off, true),
        ];
        let config = PortConfig::new(&pins);

        let mut port = sim_port();
        let a = PortGroup::PortA.base_addr();
        port.registers_mut().preset(a + GPIO_PUR_OFFSET, 0x0C);
        port.registers_mut().preset(a + GPIO_PDR_OFFSET, 0x08);
        port.registers_mut().preset(a + GPIO_DIR_OFFSET, 0x0C);
        port.init(Some(&config));

        assert_eq!(reg(&port, PortGroup::PortA, GPIO_PUR_OFFSET), 0x00);
        assert_eq!(reg(&port, PortGroup::PortA, GPIO_PDR_OFFSET), 0x04);
        assert_eq!(reg(&port, PortGroup::PortA, GPIO_DIR_OFFSET), 0x00);
    }

    #[test]
    fn test_init_unlocks_protected_pins() {
        let pins = [
            input(PortGroup::PortF, PinNum::Pin0, InternalResistor::PullUp, true),
            output(PortGroup::PortD, PinNum::Pin7, true),
        ];
        let config = PortConfig::new(&pins);

        let mut port = sim_port();
        port.init(Some(&config));

        assert_eq!(reg(&port, PortGroup::PortF, GPIO_LOCK_OFFSET), GPIO_LOCK_KEY);
        assert_eq!(reg(&port, PortGroup::PortF, GPIO_CR_OFFSET), 0x01);
        assert_eq!(reg(&port, PortGroup::PortF, GPIO_PUR_OFFSET), 0x01);
        assert_eq!(reg(&port, PortGroup::PortD, GPIO_LOCK_OFFSET), GPIO_LOCK_KEY);
        assert_eq!(reg(&port, PortGroup::PortD, GPIO_CR_OFFSET), 0x80);
        assert_eq!(reg(&port, PortGroup::PortD, GPIO_DIR_OFFSET), 0x80);
    }

    #[test]
    fn test_init_skips_jtag_pins() {
        let pins = [output(PortGroup::PortC, PinNum::Pin2, true), output(PortGroup::PortC, PinNum::Pin5, true)];
        let config = PortConfig::new(&pins);

        let mut port = sim_port();
        port.init(Some(&config));

        assert_eq!(port.status(), PortStatus::Initialized);
        assert_eq!(reg(&port, PortGroup::PortC, GPIO_DIR_OFFSET), 0x20);
        assert_eq!(reg(&port, PortGroup::PortC, GPIO_DEN_OFFSET), 0x20);
        assert_eq!(reg(&port, PortGroup::PortC, GPIO_LOCK_OFFSET), 0);
        // The clock is still gated for the skipped pin
        assert_eq!(port.registers().peek(SYSCTL_RCGCGPIO), FLD_GPIO_PORT::C.bits());
    }

    #[test]
    fn test_init_alternate_function() {
        let pins = [PinConfig { mode: PortFPin1::M1PWM5, ..output(PortGroup::PortF, PinNum::Pin1, true) }];
        let config = PortConfig::new(&pins);

        let mut port = sim_port();
        let f = PortGroup::PortF.base_addr();
        port.registers_mut().preset(f + GPIO_PCTL_OFFSET, 0xFFFF_FFFF);
        port.registers_mut().preset(f + GPIO_AMSEL_OFFSET, 0x02);
        port.init(Some(&config));

        assert_eq!(reg(&port, PortGroup::PortF, GPIO_PCTL_OFFSET), 0xFFFF_FF5F);
        assert_eq!(reg(&port, PortGroup::PortF, GPIO_AFSEL_OFFSET), 0x02);
        assert_eq!(reg(&port, PortGroup::PortF, GPIO_DEN_OFFSET), 0x02);
        assert_eq!(reg(&port, PortGroup::PortF, GPIO_AMSEL_OFFSET), 0x00);
    }

    #[test]
    fn test_init_analog_input() {
        let pins = [PinConfig {
            mode: PORT_ADC_MODE,
            ..input(PortGroup::PortE, PinNum::Pin3, InternalResistor::Off, true)
        }];
        let config = PortConfig::new(&pins);

        let mut port = sim_port();
        let e = PortGroup::PortE.base_addr();
        port.registers_mut().preset(e + GPIO_DEN_OFFSET, 0x08);
        port.registers_mut().preset(e + GPIO_PCTL_OFFSET, 0x0000_F000);
        port.init(Some(&config));

        assert_eq!(reg(&port, PortGroup::PortE, GPIO_DEN_OFFSET), 0x00);
        assert_eq!(reg(&port, PortGroup::PortE, GPIO_AMSEL_OFFSET), 0x08);
        assert_eq!(reg(&port, PortGroup::PortE, GPIO_AFSEL_OFFSET), 0x00);
        assert_eq!(reg(&port, PortGroup::PortE, GPIO_PCTL_OFFSET), 0x00);
    }

    #[test]
    fn test_init_aborts_when_clock_never_ready() {
        let pins = [output(PortGroup::PortA, PinNum::Pin1, true), output(PortGroup::PortB, PinNum::Pin1, true)];
        let config = PortConfig::new(&pins);

        let mut port = sim_port();
        port.registers_mut().stall(PortGroup::PortB);
        port.init(Some(&config));

        assert_eq!(port.status(), PortStatus::NotInitialized);
        assert_eq!(port.det().count(), 0);
        assert_eq!(reg(&port, PortGroup::PortA, GPIO_DIR_OFFSET), 0x02);
        assert_eq!(reg(&port, PortGroup::PortB, GPIO_DIR_OFFSET), 0x00);

        port.set_pin_direction(0, PinDirection::In);
        assert_eq!(errors(&port), [(ServiceId::SetPinDirection, PortError::Uninit)]);
    }

    #[test]
    fn test_services_before_init() {
        let mut port = sim_port();

        port.set_pin_direction(0, PinDirection::Out);
        port.refresh_port_direction();
        port.set_pin_mode(0, PORT_DIO_MODE);
        // Range is checked against the board's pin count before a table is loaded
        port.set_pin_direction(200, PinDirection::Out);
        port.set_pin_mode(200, 12);

        assert_eq!(
            errors(&port),
            [
                (ServiceId::SetPinDirection, PortError::Uninit),
                (ServiceId::RefreshPortDirection, PortError::Uninit),
                (ServiceId::SetPinMode, PortError::Uninit),
                (ServiceId::SetPinDirection, PortError::Uninit),
                (ServiceId::SetPinDirection, PortError::ParamPin),
                (ServiceId::SetPinMode, PortError::Uninit),
                (ServiceId::SetPinMode, PortError::ParamPin),
                (ServiceId::SetPinMode, PortError::ParamInvalidMode),
            ]
        );
        assert_eq!(port.registers().write_count(), 0);
    }

    #[test]
    fn test_failed_reinit_drops_previous_table() {
        let first = [output(PortGroup::PortA, PinNum::Pin1, false)];
        let second = [output(PortGroup::PortA, PinNum::Pin2, true), output(PortGroup::PortB, PinNum::Pin1, true)];
        let first = PortConfig::new(&first);
        let second = PortConfig::new(&second);

        let mut port = sim_port();
        port.init(Some(&first));
        assert_eq!(port.status(), PortStatus::Initialized);

        port.registers_mut().stall(PortGroup::PortB);
        port.init(Some(&second));

        assert_eq!(port.status(), PortStatus::NotInitialized);
        // PA2 went through before port B stalled
        assert_eq!(reg(&port, PortGroup::PortA, GPIO_DIR_OFFSET), 0x06);

        let writes = port.registers().write_count();
        port.set_pin_direction(0, PinDirection::In);
        port.refresh_port_direction();

        assert_eq!(
            errors(&port),
            [
                (ServiceId::SetPinDirection, PortError::Uninit),
                (ServiceId::RefreshPortDirection, PortError::Uninit),
            ]
        );
        assert_eq!(port.registers().write_count(), writes);
    }

    #[test]
    fn test_pin_out_of_range() {
        let mut port = sim_port();
        port.init(Some(&PORT_CONFIGURATION));
        let writes = port.registers().write_count();

        port.set_pin_direction(2, PinDirection::Out);
        port.set_pin_mode(7, PORT_DIO_MODE);
        port.set_pin_direction(PinType::MAX, PinDirection::In);

        assert_eq!(
            errors(&port),
            [
                (ServiceId::SetPinDirection, PortError::ParamPin),
                (ServiceId::SetPinMode, PortError::ParamPin),
                (ServiceId::SetPinDirection, PortError::ParamPin),
            ]
        );
        assert_eq!(port.registers().write_count(), writes);
    }

    #[test]
    fn test_set_pin_direction_unchangeable() {
        let pins = [output(PortGroup::PortF, PinNum::Pin2, false)];
        let config = PortConfig::new(&pins);

        let mut port = sim_port();
        port.init(Some(&config));
        let writes = port.registers().write_count();

        port.set_pin_direction(0, PinDirection::In);
        port.set_pin_direction(0, PinDirection::Out);

        assert_eq!(
            errors(&port),
            [
                (ServiceId::SetPinDirection, PortError::DirectionUnchangeable),
                (ServiceId::SetPinDirection, PortError::DirectionUnchangeable),
            ]
        );
        assert_eq!(port.registers().write_count(), writes);
        assert_eq!(reg(&port, PortGroup::PortF, GPIO_DIR_OFFSET), 0x04);
    }

    #[test]
    fn test_set_pin_direction_touches_only_dir() {
        let mut port = sim_port();
        port.init(Some(&PORT_CONFIGURATION));

        let f = PortGroup::PortF;
        let den = reg(&port, f, GPIO_DEN_OFFSET);
        let pur = reg(&port, f, GPIO_PUR_OFFSET);
        let data = reg(&port, f, GPIO_DATA_OFFSET);
        let writes = port.registers().write_count();

        port.set_pin_direction(PORT_LED1_ID, PinDirection::In);
        assert_eq!(reg(&port, f, GPIO_DIR_OFFSET), 0x00);

        port.set_pin_direction(PORT_SW1_ID, PinDirection::Out);
        assert_eq!(reg(&port, f, GPIO_DIR_OFFSET), 0x10);

        assert_eq!(port.registers().write_count(), writes + 2);
        assert_eq!(reg(&port, f, GPIO_DEN_OFFSET), den);
        assert_eq!(reg(&port, f, GPIO_PUR_OFFSET), pur);
        assert_eq!(reg(&port, f, GPIO_DATA_OFFSET), data);
        assert_eq!(port.det().count(), 0);
    }

    #[test]
    fn test_jtag_pin_requests_are_dropped() {
        let pins = [output(PortGroup::PortC, PinNum::Pin1, true)];
        let config = PortConfig::new(&pins);

        let mut port = sim_port();
        port.init(Some(&config));
        let writes = port.registers().write_count();

        port.set_pin_direction(0, PinDirection::In);
        port.set_pin_mode(0, 3);
        port.refresh_port_direction();

        assert_eq!(port.det().count(), 0);
        assert_eq!(port.registers().write_count(), writes);
    }

    #[test]
    fn test_refresh_restores_fixed_directions() {
        let pins = [
            output(PortGroup::PortA, PinNum::Pin4, false),
            input(PortGroup::PortA, PinNum::Pin5, InternalResistor::Off, false),
            output(PortGroup::PortA, PinNum::Pin6, true),
        ];
        let config = PortConfig::new(&pins);

        let mut port = sim_port();
        port.init(Some(&config));
        assert_eq!(reg(&port, PortGroup::PortA, GPIO_DIR_OFFSET), 0x50);

        port.set_pin_direction(2, PinDirection::In);
        // Something outside the driver flips the fixed pins
        port.registers_mut().preset(PortGroup::PortA.base_addr() + GPIO_DIR_OFFSET, 0x20);

        port.refresh_port_direction();
        assert_eq!(reg(&port, PortGroup::PortA, GPIO_DIR_OFFSET), 0x10);

        let writes = port.registers().write_count();
        port.refresh_port_direction();
        assert_eq!(reg(&port, PortGroup::PortA, GPIO_DIR_OFFSET), 0x10);
        assert_eq!(port.registers().write_count(), writes + 3);
        assert_eq!(port.det().count(), 0);
    }

    #[test]
    fn test_refresh_with_all_pins_changeable_writes_nothing() {
        let mut port = sim_port();
        port.init(Some(&PORT_CONFIGURATION));
        let writes = port.registers().write_count();

        port.refresh_port_direction();

        assert_eq!(port.registers().write_count(), writes);
        assert_eq!(port.det().count(), 0);
    }

    #[test]
    fn test_set_pin_mode_rejects_reserved_modes() {
        let mut port = sim_port();
        port.init(Some(&PORT_CONFIGURATION));
        let writes = port.registers().write_count();

        for mode in [11, 12, 13, 16, u8::MAX] {
            port.set_pin_mode(PORT_LED1_ID, mode);
        }

        assert_eq!(port.det().count(), 5);
        assert!(errors(&port).iter().all(|e| *e == (ServiceId::SetPinMode, PortError::ParamInvalidMode)));
        assert_eq!(port.registers().write_count(), writes);

        port.det_mut().clear();
        for mode in (0..=10).chain([14, 15]) {
            port.set_pin_mode(PORT_LED1_ID, mode);
        }
        assert_eq!(port.det().count(), 0);
    }

    #[test]
    fn test_set_pin_mode_unchangeable() {
        let pins = [output(PortGroup::PortF, PinNum::Pin2, false)];
        let config = PortConfig::new(&pins);

        let mut port = sim_port();
        port.init(Some(&config));
        let writes = port.registers().write_count();

        port.set_pin_mode(0, 5);

        assert_eq!(errors(&port), [(ServiceId::SetPinMode, PortError::ModeUnchangeable)]);
        assert_eq!(port.registers().write_count(), writes);
    }

    #[test]
    fn test_set_pin_mode_reports_every_failed_check() {
        let pins = [output(PortGroup::PortF, PinNum::Pin2, false)];
        let config = PortConfig::new(&pins);

        let mut port = sim_port();
        port.init(Some(&config));

        port.set_pin_mode(0, 12);
        port.set_pin_mode(3, 12);

        assert_eq!(
            errors(&port),
            [
                (ServiceId::SetPinMode, PortError::ModeUnchangeable),
                (ServiceId::SetPinMode, PortError::ParamInvalidMode),
                (ServiceId::SetPinMode, PortError::ParamPin),
                (ServiceId::SetPinMode, PortError::ParamInvalidMode),
            ]
        );
    }

    #[test]
    fn test_set_pin_mode_branch_follows_configured_mode() {
        // Configured as DIO: a requested alternate function still takes the DIO path
        let mut port = sim_port();
        port.init(Some(&PORT_CONFIGURATION));

        port.set_pin_mode(PORT_LED1_ID, PortFPin1::M1PWM5);

        let f = PortGroup::PortF;
        assert_eq!(reg(&port, f, GPIO_PCTL_OFFSET), 0x00);
        assert_eq!(reg(&port, f, GPIO_AFSEL_OFFSET), 0x00);
        assert_eq!(reg(&port, f, GPIO_DEN_OFFSET), 0x12);

        // Configured as an alternate function: the requested value lands in the nibble
        let pins = [PinConfig { mode: PortFPin1::M1PWM5, ..output(PortGroup::PortF, PinNum::Pin1, true) }];
        let config = PortConfig::new(&pins);
        let mut port = sim_port();
        port.init(Some(&config));
        assert_eq!(reg(&port, f, GPIO_PCTL_OFFSET), 0x50);

        port.set_pin_mode(0, PortFPin1::U1RTS);
        assert_eq!(reg(&port, f, GPIO_PCTL_OFFSET), 0x10);

        port.set_pin_mode(0, PORT_ADC_MODE);
        assert_eq!(reg(&port, f, GPIO_PCTL_OFFSET), 0xA0);
        assert_eq!(reg(&port, f, GPIO_AFSEL_OFFSET), 0x02);
        assert_eq!(reg(&port, f, GPIO_AMSEL_OFFSET), 0x00);
        assert_eq!(port.det().count(), 0);
    }

    #[test]
    fn test_get_version_info() {
        let expected = VersionInfo {
            module_id: 124,
            vendor_id: 5000,
            sw_major_version: 1,
            sw_minor_version: 0,
            sw_patch_version: 0,
        };

        let mut port = sim_port();
        let mut info = VersionInfo::default();
        port.get_version_info(Some(&mut info));
        assert_eq!(info, expected);

        port.init(Some(&PORT_CONFIGURATION));
        let mut info = VersionInfo::default();
        port.get_version_info(Some(&mut info));
        assert_eq!(info, expected);
        assert_eq!(port.det().count(), 0);
    }

    #[test]
    fn test_get_version_info_without_destination() {
        let mut port = sim_port();
        port.get_version_info(None);

        assert_eq!(errors(&port), [(ServiceId::GetVersionInfo, PortError::ParamPointer)]);
        assert_eq!(port.registers().write_count(), 0);
    }

    #[test]
    fn test_reinit_applies_new_table() {
        let first = [output(PortGroup::PortB, PinNum::Pin0, true)];
        let second = [input(PortGroup::PortB, PinNum::Pin0, InternalResistor::PullUp, true)];
        let first = PortConfig::new(&first);
        let second = PortConfig::new(&second);

        let mut port = sim_port();
        port.init(Some(&first));
        assert_eq!(reg(&port, PortGroup::PortB, GPIO_DIR_OFFSET), 0x01);

        port.init(Some(&second));
        assert_eq!(port.status(), PortStatus::Initialized);
        assert_eq!(reg(&port, PortGroup::PortB, GPIO_DIR_OFFSET), 0x00);
        assert_eq!(reg(&port, PortGroup::PortB, GPIO_PUR_OFFSET), 0x01);
    }

    #[test]
    fn test_borrowed_backends() {
        let mut regs = SimRegisters::new();
        let mut det = RecordingDet::new();
        {
            let mut port = Port::new(&mut regs, &mut det).with_poll_policy(PollPolicy::Bounded(1));
            port.init(Some(&PORT_CONFIGURATION));
            port.set_pin_mode(9, PORT_DIO_MODE);
            assert_eq!(port.status(), PortStatus::Initialized);
        }

        assert_eq!(regs.port_reg(PortGroup::PortF, GPIO_DIR_OFFSET), 0x02);
        assert_eq!(det.reports()[0].as_port_error(), Some((ServiceId::SetPinMode, PortError::ParamPin)));
    }
}

#[cfg(all(
    test,
    not(feature = "dev-error-detect"),
    feature = "set-pin-direction-api",
    feature = "set-pin-mode-api",
    feature = "version-info-api"
))]
mod tests_without_det {
    use super::*;
    use crate::config::{PORT_CONFIGURATION, PORT_LED1_ID};
    use crate::sdk::det::RecordingDet;
    use crate::sdk::mcu::gpio::PortGroup;
    use crate::sdk::mcu::register::GPIO_DIR_OFFSET;
    use crate::sdk::mcu::sim::SimRegisters;

    fn sim_port<'a>() -> Port<'a, SimRegisters, RecordingDet> {
        Port::new(SimRegisters::new(), RecordingDet::new()).with_poll_policy(PollPolicy::Bounded(8))
    }

    #[test]
    fn test_calls_before_init_do_nothing() {
        let mut port = sim_port();

        port.init(None);
        port.set_pin_direction(0, PinDirection::Out);
        port.set_pin_mode(0, 5);
        port.refresh_port_direction();
        port.get_version_info(None);

        assert_eq!(port.status(), PortStatus::NotInitialized);
        assert_eq!(port.det().count(), 0);
        assert_eq!(port.registers().write_count(), 0);
    }

    #[test]
    fn test_out_of_range_pin_does_nothing() {
        let mut port = sim_port();
        port.init(Some(&PORT_CONFIGURATION));
        let writes = port.registers().write_count();

        port.set_pin_direction(2, PinDirection::In);
        port.set_pin_mode(PinType::MAX, 12);

        assert_eq!(port.det().count(), 0);
        assert_eq!(port.registers().write_count(), writes);
    }

    #[test]
    fn test_unchangeable_pin_is_not_guarded() {
        let pins = [PinConfig {
            port_num: PortGroup::PortB,
            pin_num: PinNum::Pin2,
            direction: PinDirection::Out,
            resistor: InternalResistor::Off,
            mode: PORT_DIO_MODE,
            mode_changeable: false,
            direction_changeable: false,
            initial_value: PinLevel::Low,
        }];
        let config = PortConfig::new(&pins);

        let mut port = sim_port();
        port.init(Some(&config));
        port.set_pin_direction(0, PinDirection::In);

        assert_eq!(port.registers().port_reg(PortGroup::PortB, GPIO_DIR_OFFSET), 0x00);
        assert_eq!(port.det().count(), 0);

        let mut port = sim_port();
        port.init(Some(&PORT_CONFIGURATION));
        port.set_pin_direction(PORT_LED1_ID, PinDirection::In);
        assert_eq!(port.registers().port_reg(PortGroup::PortF, GPIO_DIR_OFFSET), 0x00);
    }
}
