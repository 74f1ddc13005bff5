//! Uploaded-image checks: base64 decoding and header-only dimension probing.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Smallest usable edge in pixels; below this the model cannot judge texture.
pub const MIN_DIMENSION: u32 = 512;

/// Decode a base64 image payload, tolerating a `data:image/...;base64,`
/// prefix. Returns `None` when the payload is not valid base64.
pub fn decode_base64_image(input: &str) -> Option<Vec<u8>> {
    let s = input.trim();
    let b64 = if s.starts_with("data:image/") {
        let idx = s.find("base64,")?;
        &s[idx + "base64,".len()..]
    } else {
        s
    };
    STANDARD.decode(b64).ok()
}

/// Read (width, height) from a PNG IHDR or a JPEG SOF0/SOF2 marker without
/// decoding pixel data. Unknown formats return `None`.
pub fn dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    if bytes.len() >= 24 && bytes.starts_with(&[0x89, 0x50, 0x4e, 0x47]) {
        let width = u32::from_be_bytes([bytes[16], bytes[17], bytes[18], bytes[19]]);
        let height = u32::from_be_bytes([bytes[20], bytes[21], bytes[22], bytes[23]]);
        return Some((width, height));
    }

    if bytes.len() >= 4 && bytes[0] == 0xff && bytes[1] == 0xd8 {
        let mut i = 2;
        while i + 9 < bytes.len() {
            if bytes[i] != 0xff {
                i += 1;
                continue;
            }
            let marker = bytes[i + 1];
            let size = ((bytes[i + 2] as usize) << 8) | bytes[i + 3] as usize;
            if marker == 0xc0 || marker == 0xc2 {
                let height = ((bytes[i + 5] as u32) << 8) | bytes[i + 6] as u32;
                let width = ((bytes[i + 7] as u32) << 8) | bytes[i + 8] as u32;
                return Some((width, height));
            }
            i += 2 + size;
        }
    }

    None
}

/// True when the payload decodes to a recognized image at least
/// [`MIN_DIMENSION`] on both edges.
pub fn meets_minimum_size(image: &str) -> bool {
    decode_base64_image(image)
        .as_deref()
        .and_then(dimensions)
        .map(|(w, h)| w >= MIN_DIMENSION && h >= MIN_DIMENSION)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_header(width: u32, height: u32) -> Vec<u8> {
        let mut bytes = vec![0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a];
        // IHDR chunk length + tag
        bytes.extend_from_slice(&[0x00, 0x00, 0x00, 0x0d]);
        bytes.extend_from_slice(b"IHDR");
        bytes.extend_from_slice(&width.to_be_bytes());
        bytes.extend_from_slice(&height.to_be_bytes());
        bytes
    }

    fn jpeg_header(width: u16, height: u16) -> Vec<u8> {
        let mut bytes = vec![0xff, 0xd8];
        // SOF0: marker, size, precision, height, width, components
        bytes.extend_from_slice(&[0xff, 0xc0, 0x00, 0x11, 0x08]);
        bytes.extend_from_slice(&height.to_be_bytes());
        bytes.extend_from_slice(&width.to_be_bytes());
        bytes.push(0x03);
        bytes
    }

    #[test]
    fn reads_png_dimensions() {
        assert_eq!(dimensions(&png_header(800, 600)), Some((800, 600)));
    }

    #[test]
    fn reads_jpeg_sof0_dimensions() {
        assert_eq!(dimensions(&jpeg_header(1024, 768)), Some((1024, 768)));
    }

    #[test]
    fn unknown_formats_have_no_dimensions() {
        assert_eq!(dimensions(b"GIF89a"), None);
        assert_eq!(dimensions(&[]), None);
    }

    #[test]
    fn strips_data_url_prefix() {
        let raw = png_header(512, 512);
        let encoded = format!(
            "data:image/png;base64,{}",
            STANDARD.encode(&raw)
        );
        assert_eq!(decode_base64_image(&encoded), Some(raw));
    }

    #[test]
    fn rejects_invalid_base64() {
        assert_eq!(decode_base64_image("!!not base64!!"), None);
    }

    #[test]
    fn minimum_size_gate() {
        let big = STANDARD.encode(png_header(512, 512));
        let small = STANDARD.encode(png_header(511, 512));
        assert!(meets_minimum_size(&big));
        assert!(!meets_minimum_size(&small));
        assert!(!meets_minimum_size("garbage"));
    }
}
