use crate::error::{Result, SessionError};

/// Decimal places kept for attitude and motion quantities.
pub const MOTION_DECIMALS: u32 = 6;

/// Decimal places kept for scalar tuning parameters.
pub const TUNING_DECIMALS: u32 = 3;

/// Outcome of a typed operation: a value that is always present, and the
/// error that caused it to be zero-filled, if any.
#[derive(Debug)]
pub struct Reading<T> {
    value: T,
    error: Option<SessionError>,
}

impl<T: Default> Reading<T> {
    /// Zero-fill the value on failure.
    pub fn from_result(result: Result<T>) -> Self {
        match result {
            Ok(value) => Self { value, error: None },
            Err(err) => Self {
                value: T::default(),
                error: Some(err),
            },
        }
    }
}

impl<T> Reading<T> {
    /// True when the exchange completed and the device accepted it.
    pub fn success(&self) -> bool {
        self.error.is_none()
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn into_value(self) -> T {
        self.value
    }

    pub fn error(&self) -> Option<&SessionError> {
        self.error.as_ref()
    }

    /// `(success, value)`, the shape device scripts usually want.
    pub fn into_parts(self) -> (bool, T) {
        (self.error.is_none(), self.value)
    }

    pub fn into_result(self) -> Result<T> {
        match self.error {
            None => Ok(self.value),
            Some(err) => Err(err),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Reading<U> {
        Reading {
            value: f(self.value),
            error: self.error,
        }
    }
}

/// Round half away from zero to `places` decimals.
pub fn round_to(value: f32, places: u32) -> f32 {
    let scale = 10f64.powi(places as i32);
    ((value as f64 * scale).round() / scale) as f32
}

/// Truncate toward zero and saturate into a byte.
pub fn truncate_id(value: f32) -> u8 {
    // `as` saturates and maps NaN to 0.
    value.trunc() as u8
}

/// An acknowledgement counts only when it rounds to exactly 1.
pub fn is_ack(value: f32) -> bool {
    value.round() == 1.0
}
