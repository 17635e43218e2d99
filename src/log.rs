//! Logging shim over `esp-println`.
//!
//! With the `esp32-log` feature disabled every call compiles down to
//! nothing, so log lines can stay in interrupt-adjacent code paths.

#[cfg(feature = "esp32-log")]
macro_rules! log_info {
    ($($arg:tt)*) => {
        esp_println::println!($($arg)*)
    };
}

#[cfg(not(feature = "esp32-log"))]
macro_rules! log_info {
    ($($arg:tt)*) => {
        $crate::log::discard(format_args!($($arg)*))
    };
}

pub(crate) use log_info;

#[cfg(not(feature = "esp32-log"))]
#[inline]
pub(crate) fn discard(_args: core::fmt::Arguments<'_>) {}
