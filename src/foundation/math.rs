/// `round(x * y / 255)` for 8-bit channel products.
pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

pub(crate) fn mul_div255_u8(x: u16, y: u16) -> u8 {
    mul_div255_u16(x, y).min(255) as u8
}

/// Rounded unsigned division; `den` must be non-zero.
pub(crate) fn div_round_u32(num: u32, den: u32) -> u32 {
    (num + den / 2) / den
}

/// Straight -> premultiplied channel.
pub(crate) fn premul(c: u8, a: u8) -> u8 {
    mul_div255_u8(u16::from(c), u16::from(a))
}

/// Premultiplied -> straight channel. Transparent pixels map to 0.
pub(crate) fn unpremul(c: u8, a: u8) -> u8 {
    if a == 0 {
        return 0;
    }
    div_round_u32(u32::from(c) * 255, u32::from(a)).min(255) as u8
}

pub(crate) fn clamp_u8(v: f32) -> u8 {
    if v.is_nan() {
        return 0;
    }
    v.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
