//! External light scaling for the gate node.

/// Scale a raw photosynthetic reading by `numerator / denominator`,
/// truncating toward zero.  A zero denominator yields zero.
pub fn scale_light(raw: i32, numerator: i32, denominator: i32) -> i32 {
    if denominator == 0 {
        return 0;
    }
    let scaled = i64::from(raw) * i64::from(numerator) / i64::from(denominator);
    scaled.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}
