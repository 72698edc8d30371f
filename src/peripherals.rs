/*!
 * Peripheral Calls
 * Board-level helpers forwarded to the device as single remote calls
 */

use crate::core::types::{RemoteResult, Word};
use crate::gateway::{ops, ReturnKind, SharedGateway};

/// RoboVero board and PWM helpers
///
/// Each method is one `void` remote call; the device defines what it does.
#[derive(Clone)]
pub struct Peripherals {
    gateway: SharedGateway,
}

impl Peripherals {
    pub fn new(gateway: SharedGateway) -> Self {
        Self { gateway }
    }

    fn void_call(&self, operation: &str, args: &[Word]) -> RemoteResult<()> {
        self.gateway.call(operation, ReturnKind::Void, args)?;
        Ok(())
    }

    /// Configure pin select registers to match the board labels
    pub fn robovero_config(&self) -> RemoteResult<()> {
        self.void_call(ops::ROBOVERO_CONFIG, &[])
    }

    /// Flash the onboard LED
    pub fn heartbeat_on(&self) -> RemoteResult<()> {
        self.void_call(ops::HEARTBEAT_ON, &[])
    }

    /// Hand the onboard LED back to user control
    pub fn heartbeat_off(&self) -> RemoteResult<()> {
        self.void_call(ops::HEARTBEAT_OFF, &[])
    }

    /// Initialize a PWM match condition
    pub fn init_match(&self, channel: u8, count: u32) -> RemoteResult<()> {
        self.void_call(ops::INIT_MATCH, &[Word::from(channel), Word::from(count)])
    }

    /// Drive PWM `channel` (1-6) high for `period_us` of every `base_period_us`
    ///
    /// All channels share PWM0's counter, so they must use the same base period.
    pub fn pwm_set_speed(&self, channel: u8, period_us: u32, base_period_us: u32) -> RemoteResult<()> {
        self.void_call(
            ops::PWM_SET_SPEED,
            &[
                Word::from(channel),
                Word::from(period_us),
                Word::from(base_period_us),
            ],
        )
    }

    /// Enable or disable the counter of a PWM channel
    pub fn pwm_counter_state(&self, channel: u8, enabled: bool) -> RemoteResult<()> {
        self.void_call(
            ops::PWM_COUNTER_STATE,
            &[Word::from(channel), Word::from(enabled)],
        )
    }
}
