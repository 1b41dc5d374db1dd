//! Gray-code encoding of bounded scalar values.

/// Gray code of `n`: consecutive integers differ in exactly one bit.
pub fn gray_code(n: u64) -> u64 {
    n ^ (n >> 1)
}

/// Encode `x` as `num_bits` gray-code bits, most significant bit first.
///
/// `x` is scaled from `[min_value, max_value]` onto the integers
/// `0..=2^num_bits - 1` and clipped to that range.
pub fn binary_encode(x: f64, min_value: f64, max_value: f64, num_bits: u32) -> Vec<f32> {
    let levels = ((1u64 << num_bits) - 1) as f64;
    let fraction = ((x - min_value) / (max_value - min_value)).clamp(0.0, 1.0);
    let fraction = if fraction.is_nan() { 0.0 } else { fraction };
    let code = gray_code((fraction * levels) as u64);
    (0..num_bits)
        .rev()
        .map(|bit| ((code >> bit) & 1) as f32)
        .collect()
}
