//! Quarter-wave sine lookup in fixed-point quarter degrees.
//!
//! Only the first quadrant is stored; the other three are folded onto it.

/// Table entries per quadrant (one per quarter degree over 90°).
pub const QUARTER: u32 = 360;

/// Half a turn in quarter degrees.
pub const HALF_CIRCLE: u32 = QUARTER * 2;

/// A full turn in quarter degrees.
pub const FULL_CIRCLE: u32 = QUARTER * 4;

/// Peak value of the table.
pub const PEAK: i16 = 254;

/// First-quadrant amplitude, 0..=254.
static QUARTER_WAVE: [u8; QUARTER as usize] = [
    0, 1, 2, 3, 4, 5, 6, 7, 8, 10, 11, 12,
    13, 14, 15, 16, 17, 18, 20, 21, 22, 23, 24, 25,
    26, 27, 28, 29, 31, 32, 33, 34, 35, 36, 37, 38,
    39, 40, 42, 43, 44, 45, 46, 47, 48, 49, 50, 51,
    53, 54, 55, 56, 57, 58, 59, 60, 61, 62, 63, 64,
    65, 67, 68, 69, 70, 71, 72, 73, 74, 75, 76, 77,
    78, 79, 80, 81, 83, 84, 85, 86, 87, 88, 89, 90,
    91, 92, 93, 94, 95, 96, 97, 98, 99, 100, 101, 102,
    103, 104, 105, 106, 107, 108, 109, 110, 111, 112, 113, 114,
    115, 116, 117, 118, 119, 120, 121, 122, 123, 124, 125, 126,
    127, 128, 129, 130, 131, 132, 133, 134, 135, 136, 137, 137,
    138, 139, 140, 141, 142, 143, 144, 145, 146, 147, 148, 148,
    149, 150, 151, 152, 153, 154, 155, 156, 156, 157, 158, 159,
    160, 161, 162, 163, 163, 164, 165, 166, 167, 168, 168, 169,
    170, 171, 172, 173, 173, 174, 175, 176, 177, 177, 178, 179,
    180, 181, 181, 182, 183, 184, 184, 185, 186, 187, 188, 188,
    189, 190, 190, 191, 192, 193, 193, 194, 195, 196, 196, 197,
    198, 198, 199, 200, 200, 201, 202, 202, 203, 204, 204, 205,
    206, 206, 207, 208, 208, 209, 210, 210, 211, 212, 212, 213,
    213, 214, 215, 215, 216, 216, 217, 218, 218, 219, 219, 220,
    220, 221, 221, 222, 223, 223, 224, 224, 225, 225, 226, 226,
    227, 227, 228, 228, 229, 229, 230, 230, 231, 231, 232, 232,
    232, 233, 233, 234, 234, 235, 235, 236, 236, 236, 237, 237,
    238, 238, 238, 239, 239, 239, 240, 240, 241, 241, 241, 242,
    242, 242, 243, 243, 243, 244, 244, 244, 245, 245, 245, 246,
    246, 246, 246, 247, 247, 247, 247, 248, 248, 248, 248, 249,
    249, 249, 249, 250, 250, 250, 250, 250, 251, 251, 251, 251,
    251, 252, 252, 252, 252, 252, 252, 252, 253, 253, 253, 253,
    253, 253, 253, 253, 254, 254, 254, 254, 254, 254, 254, 254,
    254, 254, 254, 254, 254, 254, 254, 254, 254, 254, 254, 254,
];

/// Sine of `angle` (quarter degrees), scaled to ±254.
///
/// Any angle is accepted; it is reduced modulo [`FULL_CIRCLE`] first.
pub fn sine(angle: u32) -> i16 {
    let mut angle = angle % FULL_CIRCLE;
    let negative = angle >= HALF_CIRCLE;
    if negative {
        angle = FULL_CIRCLE - angle - 1;
    }
    if angle >= QUARTER {
        angle = HALF_CIRCLE - angle - 1;
    }

    let level = QUARTER_WAVE[angle as usize] as i16;
    if negative {
        -level
    } else {
        level
    }
}
