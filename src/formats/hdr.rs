//! Radiance HDR (.hdr) image format decoder
//!
//! Parses the ASCII header (magic, FORMAT/EXPOSURE/GAMMA variables,
//! resolution line) and decodes flat or new-style RLE pixel rows from a
//! byte buffer into linear RGBA32F with shared-exponent conversion.

use crate::error::{EnvError, EnvResult};

/// Dimension cap; anything larger is treated as a corrupt header.
const MAX_DIMENSION: u32 = 16384;

/// Shared-exponent bias: linear = channel * 2^(E - 136).
const RGBE_BIAS: i32 = 136;

/// Decoded HDR image plus header metadata.
///
/// `data` is linear RGBA, row-major, `width * height * 4` floats. Transient:
/// the loader consumes it whole.
#[derive(Debug, Clone)]
pub struct ParsedHdr {
    pub width: u32,
    pub height: u32,
    pub data: Vec<f32>,
    /// Cumulative product of all EXPOSURE= header lines, default 1.0.
    pub exposure: f32,
    /// GAMMA= header value, default 1.0.
    pub gamma: f32,
}

impl ParsedHdr {
    pub fn pixel_count(&self) -> usize {
        (self.width * self.height) as usize
    }
}

/// The two row encodings the format defines. Selected by a 4-byte peek;
/// there is no third variant and no extensibility here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowEncoding {
    /// `0x02 0x02 hi(width) lo(width)` prefix, channels run-length coded
    /// independently across the row.
    Rle,
    /// Uncompressed 4 bytes per pixel.
    Flat,
}

fn detect_row_encoding(prefix: [u8; 4], width: u32) -> RowEncoding {
    if prefix[0] == 0x02
        && prefix[1] == 0x02
        && prefix[2] == ((width >> 8) & 0xFF) as u8
        && prefix[3] == (width & 0xFF) as u8
    {
        RowEncoding::Rle
    } else {
        RowEncoding::Flat
    }
}

/// Byte cursor that remembers its position so decode errors can name the
/// offending offset.
struct Scanner<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    fn read_u8(&mut self, what: &str) -> EnvResult<u8> {
        match self.bytes.get(self.pos) {
            Some(&b) => {
                self.pos += 1;
                Ok(b)
            }
            None => Err(EnvError::format_at(
                self.pos,
                format!("unexpected end of buffer reading {what}"),
            )),
        }
    }

    fn read_bytes(&mut self, len: usize, what: &str) -> EnvResult<&'a [u8]> {
        if self.remaining() < len {
            return Err(EnvError::format_at(
                self.pos,
                format!("unexpected end of buffer reading {what}"),
            ));
        }
        let slice = &self.bytes[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    fn peek4(&self) -> Option<[u8; 4]> {
        if self.remaining() < 4 {
            return None;
        }
        let mut out = [0u8; 4];
        out.copy_from_slice(&self.bytes[self.pos..self.pos + 4]);
        Some(out)
    }

    /// Read one `\n`-terminated ASCII header line, tolerating a trailing CR.
    fn read_line(&mut self) -> EnvResult<String> {
        let start = self.pos;
        loop {
            match self.bytes.get(self.pos) {
                Some(b'\n') => {
                    let mut end = self.pos;
                    if end > start && self.bytes[end - 1] == b'\r' {
                        end -= 1;
                    }
                    let line = std::str::from_utf8(&self.bytes[start..end]).map_err(|_| {
                        EnvError::format_at(start, "header line is not valid ASCII")
                    })?;
                    self.pos += 1;
                    return Ok(line.to_string());
                }
                Some(_) => self.pos += 1,
                None => {
                    return Err(EnvError::format_at(
                        start,
                        "unexpected end of buffer inside header",
                    ))
                }
            }
        }
    }
}

/// Parse a complete Radiance HDR buffer.
pub fn parse_hdr(bytes: &[u8]) -> EnvResult<ParsedHdr> {
    let mut scanner = Scanner::new(bytes);

    let (exposure, gamma) = parse_header(&mut scanner)?;
    let (width, height) = parse_resolution(&mut scanner)?;

    let data = decode_pixels(&mut scanner, width, height)?;

    Ok(ParsedHdr {
        width,
        height,
        data,
        exposure,
        gamma,
    })
}

/// Consume the magic line and header variables up to the blank separator.
/// Returns (cumulative exposure, gamma).
fn parse_header(scanner: &mut Scanner) -> EnvResult<(f32, f32)> {
    // The magic must be the first non-empty line.
    let magic = loop {
        let offset = scanner.pos;
        let line = scanner.read_line()?;
        if line.trim().is_empty() {
            continue;
        }
        if line != "#?RADIANCE" && line != "#?RGBE" {
            return Err(EnvError::format_at(
                offset,
                format!("bad magic number: expected #?RADIANCE or #?RGBE, found {line:?}"),
            ));
        }
        break line;
    };
    log::debug!("HDR magic accepted: {magic}");

    let mut exposure = 1.0f32;
    let mut gamma = 1.0f32;

    loop {
        let offset = scanner.pos;
        let line = scanner.read_line()?;
        let trimmed = line.trim();

        if trimmed.is_empty() {
            // End of header.
            break;
        }
        if trimmed.starts_with('#') {
            continue;
        }
        if let Some(value) = trimmed.strip_prefix("FORMAT=") {
            if value != "32-bit_rle_rgbe" && value != "32-bit_rle_xyze" {
                return Err(EnvError::format_at(
                    offset,
                    format!("unsupported FORMAT: {value:?}"),
                ));
            }
        } else if let Some(value) = trimmed.strip_prefix("EXPOSURE=") {
            // Successive EXPOSURE lines multiply.
            let factor: f32 = value.trim().parse().map_err(|_| {
                EnvError::format_at(offset, format!("invalid EXPOSURE value: {value:?}"))
            })?;
            exposure *= factor;
        } else if let Some(value) = trimmed.strip_prefix("GAMMA=") {
            gamma = value.trim().parse().map_err(|_| {
                EnvError::format_at(offset, format!("invalid GAMMA value: {value:?}"))
            })?;
        }
        // Other header variables (SOFTWARE=, VIEW=, ...) are ignored.
    }

    Ok((exposure, gamma))
}

/// Parse the `[+-][XY] N [+-][XY] N` resolution line; axis letters decide
/// which number is the width and which is the height.
fn parse_resolution(scanner: &mut Scanner) -> EnvResult<(u32, u32)> {
    let offset = scanner.pos;
    let line = scanner.read_line()?;
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() != 4 {
        return Err(EnvError::format_at(
            offset,
            format!("bad resolution line: {line:?}"),
        ));
    }

    let mut width: Option<u32> = None;
    let mut height: Option<u32> = None;

    for (axis_spec, count) in [(parts[0], parts[1]), (parts[2], parts[3])] {
        let mut chars = axis_spec.chars();
        let sign = chars.next();
        let axis = chars.next();
        if !matches!(sign, Some('+') | Some('-')) || chars.next().is_some() {
            return Err(EnvError::format_at(
                offset,
                format!("bad resolution line: {line:?}"),
            ));
        }
        let value: u32 = count.parse().map_err(|_| {
            EnvError::format_at(offset, format!("bad resolution dimension: {count:?}"))
        })?;
        match axis {
            Some('Y') => height = Some(value),
            Some('X') => width = Some(value),
            _ => {
                return Err(EnvError::format_at(
                    offset,
                    format!("bad resolution axis: {axis_spec:?}"),
                ))
            }
        }
    }

    let (width, height) = match (width, height) {
        (Some(w), Some(h)) => (w, h),
        _ => {
            return Err(EnvError::format_at(
                offset,
                format!("resolution line must name both axes: {line:?}"),
            ))
        }
    };

    if width == 0 || height == 0 {
        return Err(EnvError::format_at(
            offset,
            "image dimensions must be positive",
        ));
    }
    if width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(EnvError::format_at(
            offset,
            format!("image dimensions {width}x{height} exceed the {MAX_DIMENSION}px limit"),
        ));
    }

    Ok((width, height))
}

fn decode_pixels(scanner: &mut Scanner, width: u32, height: u32) -> EnvResult<Vec<f32>> {
    let mut data = Vec::with_capacity((width * height * 4) as usize);
    let mut scanline = vec![[0u8; 4]; width as usize];

    for _ in 0..height {
        let prefix = scanner.peek4().ok_or_else(|| {
            EnvError::format_at(scanner.pos, "truncated pixel data: scanline missing")
        })?;

        match detect_row_encoding(prefix, width) {
            RowEncoding::Rle => {
                scanner.pos += 4;
                decode_rle_scanline(scanner, &mut scanline)?;
            }
            RowEncoding::Flat => decode_flat_scanline(scanner, &mut scanline)?,
        }

        for &[r, g, b, e] in &scanline {
            let (rf, gf, bf) = rgbe_to_linear(r, g, b, e);
            data.extend_from_slice(&[rf, gf, bf, 1.0]);
        }
    }

    Ok(data)
}

fn decode_flat_scanline(scanner: &mut Scanner, scanline: &mut [[u8; 4]]) -> EnvResult<()> {
    let row = scanner.read_bytes(scanline.len() * 4, "flat pixel data")?;
    for (pixel, chunk) in scanline.iter_mut().zip(row.chunks_exact(4)) {
        pixel.copy_from_slice(chunk);
    }
    Ok(())
}

/// Decode one new-style RLE row: each of R, G, B, E independently.
fn decode_rle_scanline(scanner: &mut Scanner, scanline: &mut [[u8; 4]]) -> EnvResult<()> {
    let width = scanline.len();

    for channel in 0..4 {
        let mut pos = 0usize;
        while pos < width {
            let packet_offset = scanner.pos;
            let code = scanner.read_u8("RLE packet code")?;

            if code > 128 {
                // Run: repeat the next byte (code - 128) times.
                let run = (code - 128) as usize;
                if pos + run > width {
                    return Err(EnvError::format_at(
                        packet_offset,
                        format!("RLE run of {run} exceeds remaining row width {}", width - pos),
                    ));
                }
                let value = scanner.read_u8("RLE run value")?;
                for pixel in &mut scanline[pos..pos + run] {
                    pixel[channel] = value;
                }
                pos += run;
            } else {
                // Literal: copy the next `code` bytes.
                let literal = code as usize;
                if literal == 0 {
                    return Err(EnvError::format_at(
                        packet_offset,
                        "zero-length RLE packet cannot advance",
                    ));
                }
                if pos + literal > width {
                    return Err(EnvError::format_at(
                        packet_offset,
                        format!(
                            "RLE literal of {literal} exceeds remaining row width {}",
                            width - pos
                        ),
                    ));
                }
                let values = scanner.read_bytes(literal, "RLE literal data")?;
                for (pixel, &value) in scanline[pos..pos + literal].iter_mut().zip(values) {
                    pixel[channel] = value;
                }
                pos += literal;
            }
        }
    }

    Ok(())
}

/// Convert a shared-exponent pixel to linear radiance.
#[inline]
fn rgbe_to_linear(r: u8, g: u8, b: u8, e: u8) -> (f32, f32, f32) {
    if e == 0 {
        (0.0, 0.0, 0.0)
    } else {
        let scale = ((e as i32 - RGBE_BIAS) as f32).exp2();
        (r as f32 * scale, g as f32 * scale, b as f32 * scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(extra: &str, resolution: &str) -> Vec<u8> {
        if extra.is_empty() {
            format!("#?RADIANCE\n\n{resolution}\n").into_bytes()
        } else {
            format!("#?RADIANCE\n{extra}\n\n{resolution}\n").into_bytes()
        }
    }

    fn flat_image(width: u32, height: u32, pixel: [u8; 4]) -> Vec<u8> {
        let mut bytes = header("FORMAT=32-bit_rle_rgbe", &format!("-Y {height} +X {width}"));
        for _ in 0..width * height {
            bytes.extend_from_slice(&pixel);
        }
        bytes
    }

    #[test]
    fn unit_pixel_decodes_to_one() {
        // 128 * 2^(129 - 136) = 1.0
        let parsed = parse_hdr(&flat_image(2, 2, [128, 128, 128, 129])).unwrap();
        assert_eq!(parsed.width, 2);
        assert_eq!(parsed.height, 2);
        assert_eq!(parsed.data.len(), 16);
        for px in parsed.data.chunks_exact(4) {
            assert_eq!(px, &[1.0, 1.0, 1.0, 1.0]);
        }
    }

    #[test]
    fn zero_exponent_decodes_to_black() {
        let parsed = parse_hdr(&flat_image(1, 1, [200, 17, 3, 0])).unwrap();
        assert_eq!(&parsed.data, &[0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn bright_pixel_uses_shared_exponent() {
        // exponent 140 -> scale 2^4 = 16
        let parsed = parse_hdr(&flat_image(1, 1, [255, 128, 64, 140])).unwrap();
        assert_eq!(&parsed.data, &[255.0 * 16.0, 128.0 * 16.0, 64.0 * 16.0, 1.0]);
    }

    #[test]
    fn exposure_lines_multiply() {
        let mut bytes = header("EXPOSURE=2.0\nEXPOSURE=0.5", "-Y 1 +X 1");
        bytes.extend_from_slice(&[128, 128, 128, 129]);
        let parsed = parse_hdr(&bytes).unwrap();
        assert_eq!(parsed.exposure, 1.0);
        assert_eq!(parsed.gamma, 1.0);
    }

    #[test]
    fn gamma_is_recorded() {
        let mut bytes = header("GAMMA=2.2", "-Y 1 +X 1");
        bytes.extend_from_slice(&[128, 128, 128, 129]);
        let parsed = parse_hdr(&bytes).unwrap();
        assert!((parsed.gamma - 2.2).abs() < 1e-6);
    }

    #[test]
    fn rgbe_magic_is_accepted() {
        let mut bytes = b"#?RGBE\n\n-Y 1 +X 1\n".to_vec();
        bytes.extend_from_slice(&[128, 128, 128, 129]);
        assert!(parse_hdr(&bytes).is_ok());
    }

    #[test]
    fn bad_magic_is_fatal() {
        let err = parse_hdr(b"INVALID\n\n-Y 1 +X 1\n").unwrap_err();
        assert!(err.to_string().contains("magic number"), "{err}");
    }

    #[test]
    fn unsupported_format_is_fatal() {
        let mut bytes = header("FORMAT=32-bit_something_else", "-Y 1 +X 1");
        bytes.extend_from_slice(&[0; 4]);
        let err = parse_hdr(&bytes).unwrap_err();
        assert!(err.to_string().contains("FORMAT"), "{err}");
    }

    #[test]
    fn axis_order_decides_width_and_height() {
        let mut bytes = header("", "+X 3 -Y 2");
        bytes.extend_from_slice(&[128, 128, 128, 129].repeat(6));
        let parsed = parse_hdr(&bytes).unwrap();
        assert_eq!((parsed.width, parsed.height), (3, 2));
    }

    #[test]
    fn resolution_syntax_is_validated() {
        for bad in [
            "-Y 2",
            "-Y 2 +X",
            "Y 2 X 2",
            "-Y 2 -Y 2",
            "-Z 2 +X 2",
            "-Y two +X 2",
        ] {
            let mut bytes = header("", bad);
            bytes.extend_from_slice(&[0; 64]);
            assert!(parse_hdr(&bytes).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn zero_and_oversized_dimensions_are_fatal() {
        let bytes = header("", "-Y 0 +X 4");
        assert!(parse_hdr(&bytes).is_err());
        let bytes = header("", "-Y 2 +X 20000");
        let err = parse_hdr(&bytes).unwrap_err();
        assert!(err.to_string().contains("16384"), "{err}");
    }

    #[test]
    fn truncated_flat_data_is_fatal() {
        let mut bytes = header("", "-Y 2 +X 2");
        bytes.extend_from_slice(&[128, 128, 128, 129]); // 1 of 4 pixels
        let err = parse_hdr(&bytes).unwrap_err();
        assert!(matches!(err, EnvError::Format { .. }), "{err}");
    }

    #[test]
    fn rle_row_round_trips() {
        // Width 8: run of 8 for R, G, B; literal 8 for E.
        let mut bytes = header("FORMAT=32-bit_rle_rgbe", "-Y 1 +X 8");
        bytes.extend_from_slice(&[0x02, 0x02, 0x00, 0x08]);
        bytes.extend_from_slice(&[136, 128]); // R: repeat 128 x8
        bytes.extend_from_slice(&[136, 64]); // G
        bytes.extend_from_slice(&[136, 32]); // B
        bytes.extend_from_slice(&[8, 129, 129, 129, 129, 129, 129, 129, 129]); // E literal
        let parsed = parse_hdr(&bytes).unwrap();
        assert_eq!(parsed.data.len(), 32);
        for px in parsed.data.chunks_exact(4) {
            assert_eq!(px, &[1.0, 0.5, 0.25, 1.0]);
        }
    }

    #[test]
    fn rle_run_overflow_is_fatal() {
        let mut bytes = header("", "-Y 1 +X 8");
        bytes.extend_from_slice(&[0x02, 0x02, 0x00, 0x08]);
        bytes.extend_from_slice(&[137, 128]); // run of 9 into a width-8 row
        let err = parse_hdr(&bytes).unwrap_err();
        assert!(err.to_string().contains("exceeds"), "{err}");
    }

    #[test]
    fn rle_zero_packet_is_fatal() {
        let mut bytes = header("", "-Y 1 +X 8");
        bytes.extend_from_slice(&[0x02, 0x02, 0x00, 0x08]);
        bytes.push(0); // zero-length literal
        let err = parse_hdr(&bytes).unwrap_err();
        assert!(err.to_string().contains("zero-length"), "{err}");
    }

    #[test]
    fn rle_eof_mid_decode_is_fatal() {
        let mut bytes = header("", "-Y 1 +X 8");
        bytes.extend_from_slice(&[0x02, 0x02, 0x00, 0x08]);
        bytes.extend_from_slice(&[4, 1, 2]); // literal of 4, only 2 present
        let err = parse_hdr(&bytes).unwrap_err();
        assert!(err.to_string().contains("end of buffer"), "{err}");
    }

    #[test]
    fn flat_row_starting_with_two_two_but_wrong_width_is_flat() {
        // Prefix [2, 2, 0, 2] only selects RLE when it encodes the actual
        // width; for width 4 it is an ordinary dark pixel.
        let mut bytes = header("", "-Y 1 +X 4");
        bytes.extend_from_slice(&[2, 2, 0, 2]);
        bytes.extend_from_slice(&[128, 128, 128, 129].repeat(3));
        let parsed = parse_hdr(&bytes).unwrap();
        let scale = ((2i32 - RGBE_BIAS) as f32).exp2();
        assert_eq!(&parsed.data[..4], &[2.0 * scale, 2.0 * scale, 0.0, 1.0]);
    }

    #[test]
    fn crlf_header_lines_are_tolerated() {
        let mut bytes = b"#?RADIANCE\r\nEXPOSURE=4.0\r\n\r\n-Y 1 +X 1\r\n".to_vec();
        bytes.extend_from_slice(&[128, 128, 128, 129]);
        let parsed = parse_hdr(&bytes).unwrap();
        assert_eq!(parsed.exposure, 4.0);
    }
}
