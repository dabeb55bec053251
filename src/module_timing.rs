use embassy_time::Duration;

/// First low phase of the `PWR_ON` pulse sequence
pub const fn pwr_on_first_low() -> Duration {
    Duration::from_millis(50)
}

/// High hold between the two low phases of the `PWR_ON` pulse sequence
pub const fn pwr_on_first_high() -> Duration {
    Duration::from_millis(10)
}

/// Second low phase of the `PWR_ON` pulse sequence, the one the module
/// actually latches on
pub const fn pwr_on_second_low() -> Duration {
    Duration::from_millis(150)
}

/// Final high hold before the first probe
pub const fn pwr_on_settle() -> Duration {
    Duration::from_millis(100)
}

/// Response budget of the `AT` probe following a power pulse
pub const fn probe_timeout() -> Duration {
    Duration::from_secs(1)
}

/// Response budget of the bring-up configuration commands
pub const fn bringup_timeout() -> Duration {
    Duration::from_secs(1)
}

/// Time for the UART to settle after a data rate change
pub const fn baud_settle_time() -> Duration {
    Duration::from_millis(100)
}

/// Wait between two PIN status queries while the SIM is still booting
pub const fn sim_retry_delay() -> Duration {
    Duration::from_millis(500)
}
