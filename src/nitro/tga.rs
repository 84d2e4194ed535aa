//! Nitro TGA files.
//!
//! These are ordinary TGA files with the texture already converted to an NDS
//! format and stored in a chain of tagged blocks after the image. The TGA
//! image id field holds a version string and the offset of the first block.
//! Each block is an 8-byte signature (`nns_frmt`, `nns_txel`, ...), a u32
//! length that counts the 12-byte block header, and the payload.

use errors::{ErrorKind, Result};
use std::fs;
use std::path::Path;
use std::str;
use super::texture_format::TextureFormat;
use util::cur::Cur;

pub struct NitroTga {
    pub width: u16,
    pub height: u16,
    pub format: TextureFormat,
    pub texels: Vec<u8>,
    /// Palette indices for the 4x4 blocks of a tex4x4 texture.
    pub palette_idx: Option<Vec<u8>>,
    pub palette_name: Option<String>,
    pub palette: Option<Vec<u8>>,
    pub color0_transparent: bool,
}

pub fn read_tga(path: &Path) -> Result<NitroTga> {
    debug!("Reading Nitro TGA {}...", path.display());
    let resource_err = |msg: String| ErrorKind::Resource(path.display().to_string(), msg);

    let buf = match fs::read(path) {
        Ok(buf) => buf,
        Err(e) => bail!(resource_err(e.to_string())),
    };
    match parse_tga(&buf) {
        Ok(tga) => Ok(tga),
        Err(e) => bail!(resource_err(e.to_string())),
    }
}

pub fn parse_tga(buf: &[u8]) -> Result<NitroTga> {
    let mut cur = Cur::new(buf);
    fields!(cur, TGA_HEADER {
        id_len: u8,
        color_map_type: u8,
        image_type: u8,
        color_map_spec: [u8; 5],
        origin: [u8; 4],
        width: u16,
        height: u16,
        pixel_size: u8,
        descriptor: u8,
    });
    check!(color_map_type == 0)?;
    // Uncompressed or RLE true color.
    if image_type != 2 && image_type != 10 {
        bail!("unsupported TGA image type {}", image_type);
    }

    if id_len < 20 {
        bail!("not a Nitro TGA (image id field is {} bytes)", id_len);
    }
    fields!(cur, NITRO_ID {
        version: [u8; 16],
        data_off: u32,
    });
    if !version.starts_with(b"NNS") {
        bail!("not a Nitro TGA (image id is {:?})", String::from_utf8_lossy(version));
    }

    let mut format = None;
    let mut texels = None;
    let mut palette_idx = None;
    let mut palette_name = None;
    let mut palette = None;
    let mut color0_transparent = false;
    let mut found_end = false;

    cur.jump_to(data_off as usize);
    while cur.bytes_remaining() >= 12 {
        fields!(cur, NITRO_BLOCK {
            sig: [u8; 8],
            block_len: u32,
        });
        if block_len < 12 {
            bail!("block {:?} has bad length {}", String::from_utf8_lossy(sig), block_len);
        }
        let payload = cur.next_n_u8s(block_len as usize - 12)?;

        match sig {
            b"nns_frmt" => {
                let name = ascii(payload)?;
                format = match TextureFormat::from_name(name) {
                    Some(fmt) => Some(fmt),
                    None => bail!("unsupported texture format {:?}", name),
                };
            }
            b"nns_txel" => texels = Some(payload.to_vec()),
            b"nns_pidx" => palette_idx = Some(payload.to_vec()),
            b"nns_pnam" => palette_name = Some(ascii(payload)?.to_string()),
            b"nns_pcol" => palette = Some(payload.to_vec()),
            b"nns_c0xp" => color0_transparent = true,
            b"nns_gnam" | b"nns_gver" | b"nns_imst" => (),
            b"nns_endb" => {
                found_end = true;
                break;
            }
            _ => {
                debug!("skipping unknown block {:?}", String::from_utf8_lossy(sig));
            }
        }
    }

    if !found_end {
        bail!("missing nns_endb block");
    }
    let format = match format {
        Some(fmt) => fmt,
        None => bail!("missing nns_frmt block"),
    };
    let texels = match texels {
        Some(t) => t,
        None => bail!("missing nns_txel block"),
    };
    if format.desc().requires_palette {
        if palette.is_none() {
            bail!("{} texture without nns_pcol block", format.name());
        }
        if palette_name.is_none() {
            bail!("{} texture without nns_pnam block", format.name());
        }
    }
    if format.is_tex4x4() && palette_idx.is_none() {
        bail!("tex4x4 texture without nns_pidx block");
    }
    let expected_len = match format.byte_len((width as u32, height as u32)) {
        Some(n) => n,
        None => bail!("{}x{} {} texture is too large", width, height, format.name()),
    };
    if texels.len() < expected_len {
        bail!("{}x{} {} texture has only {} bytes of texels, expected {}",
            width, height, format.name(), texels.len(), expected_len);
    }
    if texels.len() != expected_len {
        warn!("{}x{} {} texture has {} bytes of texels, expected {}",
            width, height, format.name(), texels.len(), expected_len);
    }

    Ok(NitroTga {
        width,
        height,
        format,
        texels,
        palette_idx,
        palette_name,
        palette,
        color0_transparent,
    })
}

fn ascii(bytes: &[u8]) -> Result<&str> {
    match str::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(_) => bail!("expected text, found {:?}", bytes),
    }
}

/// Formats `bytes` as space-separated little-endian elements of
/// `element_size` bytes, each zero-padded to `2 * element_size` hex digits.
/// A trailing partial element is dropped.
pub fn hex_string(bytes: &[u8], element_size: usize) -> String {
    let mut s = String::with_capacity(bytes.len() / element_size * (2 * element_size + 1));
    for (i, chunk) in bytes.chunks(element_size).enumerate() {
        if chunk.len() != element_size {
            break;
        }
        let x = chunk.iter().rev().fold(0u64, |acc, &b| acc << 8 | b as u64);
        if i != 0 {
            s.push(' ');
        }
        s.push_str(&format!("{:0width$x}", x, width = 2 * element_size));
    }
    s
}

/// Builds a Nitro TGA in memory.
#[cfg(test)]
pub fn build_tga(width: u16, height: u16, blocks: &[(&[u8; 8], &[u8])]) -> Vec<u8> {
    let id_len = 20u8;
    let mut v = vec![id_len, 0, 2, 0, 0, 0, 0, 0, 0, 0, 0, 0];
    v.extend_from_slice(&[width as u8, (width >> 8) as u8, height as u8, (height >> 8) as u8]);
    v.extend_from_slice(&[32, 8]);
    let mut version = [0u8; 16];
    version[..3].copy_from_slice(b"NNS");
    v.extend_from_slice(&version);
    // Image data (empty) follows the id; blocks start right after.
    let data_off = v.len() as u32 + 4;
    v.extend_from_slice(&[data_off as u8, (data_off >> 8) as u8, 0, 0]);
    for &(sig, payload) in blocks {
        v.extend_from_slice(sig);
        let len = payload.len() as u32 + 12;
        v.extend_from_slice(&[len as u8, (len >> 8) as u8, (len >> 16) as u8, (len >> 24) as u8]);
        v.extend_from_slice(payload);
    }
    v
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn reads_palette_texture() {
        let buf = build_tga(4, 2, &[
            (b"nns_frmt", b"palette16"),
            (b"nns_txel", &[0x01, 0x23, 0x45, 0x67]),
            (b"nns_pnam", b"a_very_long_palette_name"),
            (b"nns_pcol", &[0x1f, 0x00, 0xe0, 0x03]),
            (b"nns_c0xp", &[]),
            (b"nns_endb", &[]),
        ]);
        let tga = parse_tga(&buf).unwrap();
        assert_eq!((tga.width, tga.height), (4, 2));
        assert_eq!(tga.format.name(), "palette16");
        assert_eq!(tga.texels, vec![0x01, 0x23, 0x45, 0x67]);
        assert_eq!(tga.palette_name.as_ref().unwrap(), "a_very_long_palette_name");
        assert!(tga.color0_transparent);
        assert!(tga.palette_idx.is_none());
    }

    #[test]
    fn missing_end_block_is_an_error() {
        let buf = build_tga(4, 4, &[(b"nns_frmt", b"direct"), (b"nns_txel", &[0; 32])]);
        assert!(parse_tga(&buf).is_err());
    }

    #[test]
    fn unknown_format_is_an_error() {
        let buf = build_tga(4, 4, &[(b"nns_frmt", b"rgb565"), (b"nns_endb", &[])]);
        assert!(parse_tga(&buf).is_err());
    }

    #[test]
    fn palette_format_needs_palette() {
        let buf = build_tga(4, 4, &[
            (b"nns_frmt", b"palette4"),
            (b"nns_txel", &[0; 4]),
            (b"nns_endb", &[]),
        ]);
        assert!(parse_tga(&buf).is_err());
    }

    #[test]
    fn short_texel_data_is_an_error() {
        let buf = build_tga(65535, 65535, &[
            (b"nns_frmt", b"direct"),
            (b"nns_txel", &[0; 8]),
            (b"nns_endb", &[]),
        ]);
        let err = parse_tga(&buf).err().unwrap();
        assert!(err.to_string().contains("only 8 bytes of texels"));
    }

    #[test]
    fn header_is_checked() {
        let blocks: &[(&[u8; 8], &[u8])] = &[
            (b"nns_frmt", b"direct"),
            (b"nns_txel", &[0; 32]),
            (b"nns_endb", &[]),
        ];
        assert!(parse_tga(&build_tga(4, 4, blocks)).is_ok());

        // Color-mapped image.
        let mut buf = build_tga(4, 4, blocks);
        buf[2] = 1;
        assert!(parse_tga(&buf).is_err());

        // Plain TGA id.
        let mut buf = build_tga(4, 4, blocks);
        buf[18..21].copy_from_slice(b"XYZ");
        assert!(parse_tga(&buf).is_err());
    }

    #[test]
    fn hex_elements() {
        assert_eq!(hex_string(&[0x34, 0x12, 0x00, 0xff], 2), "1234 ff00");
        assert_eq!(hex_string(&[0x78, 0x56, 0x34, 0x12, 0x01], 4), "12345678");
        assert_eq!(hex_string(&[], 2), "");
    }
}
