/// Round to a fixed number of decimals, as ratings are written to solver scripts.
pub fn round_to(v: f64, decimals: u32) -> f64 {
    let scale = 10_f64.powi(decimals as i32);
    (v * scale).round() / scale
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_to_fixed_decimals() {
        assert_eq!(round_to(45.454545, 2), 45.45);
        assert_eq!(round_to(10.0, 2), 10.0);
        assert_eq!(round_to(12.701706, 2), 12.7);
        assert_eq!(round_to(127.0170, 3), 127.017);
    }
}
