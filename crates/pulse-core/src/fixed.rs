use fixed::types::I32F32;

/// Q32.32 fixed-point: 32 integer bits, 32 fractional bits.
///
/// All continuous unit state (membrane potential, recovery variable) lives in
/// this type so that integration produces bit-identical results run to run.
pub type Fixed64 = I32F32;

/// Simulated time in microseconds. The atomic unit of the event clock.
pub type Micros = u64;

/// Convert an f64 to Fixed64. Use only for initialization, never in the
/// integration loop.
#[inline]
pub fn f64_to_fixed64(v: f64) -> Fixed64 {
    Fixed64::from_num(v)
}

/// Convert Fixed64 to f64. Use only for display/logging, never in the
/// integration loop.
#[inline]
pub fn fixed64_to_f64(v: Fixed64) -> f64 {
    v.to_num::<f64>()
}

/// Convert a microsecond duration to a Fixed64 millisecond value.
///
/// Membrane equations are written in milliseconds (the conventional unit for
/// Izhikevich-style models) while the event clock runs in microseconds.
#[inline]
pub fn micros_to_millis(us: Micros) -> Fixed64 {
    Fixed64::from_num(us) / Fixed64::from_num(1000)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed64_basic_arithmetic() {
        let a = f64_to_fixed64(1.5);
        let b = f64_to_fixed64(2.0);
        assert_eq!(fixed64_to_f64(a + b), 3.5);
        assert_eq!(fixed64_to_f64(a * b), 3.0);
    }

    #[test]
    fn fixed64_determinism() {
        let a = f64_to_fixed64(1.0 / 3.0);
        let b = f64_to_fixed64(1.0 / 3.0);
        assert_eq!(a, b);
        assert_eq!(a * f64_to_fixed64(3.0), b * f64_to_fixed64(3.0));
    }

    #[test]
    fn micros_to_millis_conversion() {
        assert_eq!(fixed64_to_f64(micros_to_millis(100)), 0.1);
        assert_eq!(fixed64_to_f64(micros_to_millis(1000)), 1.0);
        assert_eq!(fixed64_to_f64(micros_to_millis(0)), 0.0);
    }

    #[test]
    fn micros_type() {
        let t: Micros = 100;
        assert_eq!(t, 100u64);
    }
}
