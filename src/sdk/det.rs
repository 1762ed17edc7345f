//! Default Error Tracer interface.
//!
//! Drivers report API misuse here instead of returning errors. What the
//! tracer does with a report (log it, count it, halt) is up to the sink.

use crate::sdk::drivers::port::{PortError, ServiceId, PORT_MODULE_ID};
use num_traits::FromPrimitive;

/// One development error report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetReport {
    pub module_id: u16,
    pub instance_id: u8,
    pub api_id: u8,
    pub error_id: u8,
}

impl DetReport {
    /// Decodes a report raised by the port driver.
    pub fn as_port_error(&self) -> Option<(ServiceId, PortError)> {
        if self.module_id != PORT_MODULE_ID {
            return None;
        }
        Some((ServiceId::from_u8(self.api_id)?, PortError::from_u8(self.error_id)?))
    }
}

pub trait Det {
    fn report_error(&mut self, module_id: u16, instance_id: u8, api_id: u8, error_id: u8);
}

impl<T: Det + ?Sized> Det for &mut T {
    fn report_error(&mut self, module_id: u16, instance_id: u8, api_id: u8, error_id: u8) {
        (**self).report_error(module_id, instance_id, api_id, error_id)
    }
}

/// Forwards every report to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogDet;

impl Det for LogDet {
    fn report_error(&mut self, module_id: u16, instance_id: u8, api_id: u8, error_id: u8) {
        let report = DetReport { module_id, instance_id, api_id, error_id };
        match report.as_port_error() {
            Some((api, error)) => {
                log::warn!("det: port[{}] {:?}: {:?}", instance_id, api, error)
            }
            None => log::warn!(
                "det: module {} instance {} api {:#04x} error {:#04x}",
                module_id,
                instance_id,
                api_id,
                error_id
            ),
        }
    }
}

#[cfg(any(test, feature = "sim"))]
pub use recording::RecordingDet;

#[cfg(any(test, feature = "sim"))]
mod recording {
    use super::{Det, DetReport};

    const DET_RECORD_DEPTH: usize = 32;

    /// Keeps the reports for inspection. Reports past the depth are counted but dropped.
    #[derive(Debug, Default)]
    pub struct RecordingDet {
        reports: heapless::Vec<DetReport, DET_RECORD_DEPTH>,
        total: usize,
    }

    impl RecordingDet {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn reports(&self) -> &[DetReport] {
            &self.reports
        }

        pub fn count(&self) -> usize {
            self.total
        }

        pub fn clear(&mut self) {
            self.reports.clear();
            self.total = 0;
        }
    }

    impl Det for RecordingDet {
        fn report_error(&mut self, module_id: u16, instance_id: u8, api_id: u8, error_id: u8) {
            self.total += 1;
            let _ = self.reports.push(DetReport { module_id, instance_id, api_id, error_id });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_port_report() {
        let report = DetReport { module_id: 124, instance_id: 0, api_id: 0x04, error_id: 0x0D };
        assert_eq!(
            report.as_port_error(),
            Some((ServiceId::SetPinMode, PortError::ParamInvalidMode))
        );
    }

    #[test]
    fn test_decode_foreign_report() {
        let report = DetReport { module_id: 120, instance_id: 0, api_id: 0x04, error_id: 0x0D };
        assert_eq!(report.as_port_error(), None);

        let unknown = DetReport { module_id: 124, instance_id: 0, api_id: 0x09, error_id: 0x0D };
        assert_eq!(unknown.as_port_error(), None);
    }

    #[test]
    fn test_recording_det_through_mut_ref() {
        fn raise<D: Det>(mut det: D) {
            det.report_error(124, 0, 0x01, 0x0F);
        }

        let mut det = RecordingDet::new();
        raise(&mut det);
        raise(&mut det);

        assert_eq!(det.count(), 2);
        assert_eq!(det.reports()[1].error_id, 0x0F);

        det.clear();
        assert_eq!(det.count(), 0);
        assert!(det.reports().is_empty());
    }

    #[test]
    fn test_recording_det_overflow_still_counts() {
        let mut det = RecordingDet::new();
        for _ in 0..40 {
            det.report_error(124, 0, 0x02, 0x0F);
        }
        assert_eq!(det.count(), 40);
        assert_eq!(det.reports().len(), 32);
    }

    #[test]
    fn test_log_det_accepts_any_report() {
        let mut det = LogDet;
        det.report_error(124, 0, 0x00, 0x0C);
        det.report_error(7, 1, 0xFF, 0xFF);
    }
}
