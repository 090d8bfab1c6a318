#[macro_export]
macro_rules! invalid_param {
    ($name:expr, $($arg:tt)*) => {
        return Err($crate::errors::DetectionError::InvalidParameter {
            name: $name,
            message: format!($($arg)*),
        }
        .into())
    };
}
