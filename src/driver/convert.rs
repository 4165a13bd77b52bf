//! 24-bit RGB to native panel encodings

use super::{ColorDepth, DriverError};
use crate::display::BYTES_PER_PIXEL;

/// Convert `src` (RGB888) into `dst` using the encoding for `depth`.
/// Returns the payload length; bytes of `dst` past it are zeroed.
pub fn convert(depth: ColorDepth, src: &[u8], dst: &mut [u8]) -> Result<usize, DriverError> {
    if src.len() % BYTES_PER_PIXEL != 0 {
        return Err(DriverError::InvalidBufferSize {
            expected: src.len() - src.len() % BYTES_PER_PIXEL,
            actual: src.len(),
        });
    }
    let payload = depth.native_len(src.len() / BYTES_PER_PIXEL);
    if dst.len() < payload {
        return Err(DriverError::InvalidBufferSize {
            expected: payload,
            actual: dst.len(),
        });
    }

    match depth {
        ColorDepth::Rgb444 => pack_rgb444(src, &mut dst[..payload]),
        ColorDepth::Rgb666 => pack_rgb666(src, &mut dst[..payload]),
    }
    dst[payload..].fill(0);
    Ok(payload)
}

/// 18-bit: each channel keeps its upper 6 bits, left-aligned in a byte
#[inline]
pub fn pack_rgb666(src: &[u8], dst: &mut [u8]) {
    for (out, &c) in dst.iter_mut().zip(src) {
        *out = c & 0xFC;
    }
}

/// 12-bit: two pixels per three bytes, `R1G1 B1R2 G2B2` nibbles.
/// A trailing odd pixel is padded with a zero half.
#[inline]
pub fn pack_rgb444(src: &[u8], dst: &mut [u8]) {
    const PAIR: usize = BYTES_PER_PIXEL * 2;
    for (pair, out) in src.chunks(PAIR).zip(dst.chunks_exact_mut(3)) {
        let nib = |i: usize| pair.get(i).map_or(0, |c| c >> 4);
        out[0] = nib(0) << 4 | nib(1);
        out[1] = nib(2) << 4 | nib(3);
        out[2] = nib(4) << 4 | nib(5);
    }
}

/// Simulation panels take RGB888 as is
#[inline]
pub fn copy_rgb888(src: &[u8], dst: &mut [u8]) -> Result<(), DriverError> {
    if src.len() != dst.len() {
        return Err(DriverError::InvalidBufferSize {
            expected: src.len(),
            actual: dst.len(),
        });
    }
    dst.copy_from_slice(src);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb666_masks_low_bits() {
        let src = [0xFF, 0x83, 0x01, 0x7E, 0x40, 0x03];
        let mut dst = [0u8; 6];
        let n = convert(ColorDepth::Rgb666, &src, &mut dst).unwrap();
        assert_eq!(n, 6);
        assert_eq!(dst, [0xFC, 0x80, 0x00, 0x7C, 0x40, 0x00]);
    }

    #[test]
    fn test_rgb444_packs_pixel_pairs() {
        // pixel 1: R=0xAx G=0xBx B=0xCx, pixel 2: R=0x1x G=0x2x B=0x3x
        let src = [0xA7, 0xB0, 0xCF, 0x11, 0x2E, 0x35];
        let mut dst = [0u8; 3];
        convert(ColorDepth::Rgb444, &src, &mut dst).unwrap();
        assert_eq!(dst, [0xAB, 0xC1, 0x23]);
    }

    #[test]
    fn test_rgb444_odd_pixel_is_padded() {
        let src = [0xFF, 0x80, 0x40];
        let mut dst = [0xEE; 6];
        let n = convert(ColorDepth::Rgb444, &src, &mut dst).unwrap();
        assert_eq!(n, 3);
        assert_eq!(dst, [0xF8, 0x40, 0x00, 0, 0, 0]);
    }

    #[test]
    fn test_rgb444_full_frame_zeroes_tail() {
        let src = vec![0xFF; 240 * 240 * 3];
        let mut dst = vec![0x55; 240 * 240 * 3];
        let n = convert(ColorDepth::Rgb444, &src, &mut dst).unwrap();
        assert_eq!(n, 86_400);
        assert!(dst[..n].iter().all(|&b| b == 0xFF));
        assert!(dst[n..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_short_destination_is_an_error() {
        let src = [0u8; 12];
        let mut dst = [0u8; 5];
        assert_eq!(
            convert(ColorDepth::Rgb444, &src, &mut dst),
            Err(DriverError::InvalidBufferSize {
                expected: 6,
                actual: 5
            })
        );
        assert!(convert(ColorDepth::Rgb666, &src, &mut dst).is_err());
    }

    #[test]
    fn test_partial_pixel_source_is_an_error() {
        let src = [0u8; 7];
        let mut dst = [0u8; 12];
        assert!(convert(ColorDepth::Rgb666, &src, &mut dst).is_err());
    }

    #[test]
    fn test_copy_rgb888() {
        let src = [1, 2, 3, 4, 5, 6];
        let mut dst = [0u8; 6];
        copy_rgb888(&src, &mut dst).unwrap();
        assert_eq!(dst, src);
        let mut short = [0u8; 3];
        assert!(copy_rgb888(&src, &mut short).is_err());
    }
}
