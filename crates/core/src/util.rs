/// A macro to measure the evaluation time of an expression. Wraps an
/// expression, logs how long it took to evaluate, and outputs the value of
/// the expression.
#[macro_export]
macro_rules! timed {
    ($label:expr, $ex:expr) => {
        $crate::timed!($label, log::Level::Debug, $ex)
    };
    ($label:expr, $log_level:expr, $ex:expr) => {{
        let now = std::time::Instant::now();
        let value = $ex;
        let elapsed = now.elapsed();
        log::log!($log_level, "{} took {} ms", $label, elapsed.as_millis());
        value
    }};
}

/// Check that a float parameter is usable as a length or scale: finite and
/// strictly positive.
pub fn is_positive_finite(value: f64) -> bool {
    value.is_finite() && value > 0.0
}
