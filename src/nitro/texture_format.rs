//! NDS texture formats info.

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TextureFormat(pub u8);

impl TextureFormat {
    pub fn desc(self) -> &'static FormatDesc {
        &DESCS[self.0 as usize]
    }

    /// Looks up a format by the name used in `nns_frmt` blocks and `.imd`
    /// files.
    pub fn from_name(name: &str) -> Option<TextureFormat> {
        DESCS.iter()
            .position(|desc| desc.name == name)
            .filter(|&i| i != 0)
            .map(|i| TextureFormat(i as u8))
    }

    pub fn name(self) -> &'static str {
        self.desc().name
    }

    /// How many bytes a texture of the given size takes up in this format.
    /// `None` if that doesn't fit in memory.
    pub fn byte_len(self, (width, height): (u32, u32)) -> Option<usize> {
        let bit_len = (width as u64)
            .checked_mul(height as u64)?
            .checked_mul(self.desc().bpp as u64)?;
        let byte_len = bit_len / 8;
        if byte_len > usize::max_value() as u64 {
            return None;
        }
        Some(byte_len as usize)
    }

    /// Whether color 0 of the palette can be made transparent. These are the
    /// formats that get a `color0_mode`.
    pub fn has_color0_mode(self) -> bool {
        match self.desc().alpha_desc {
            AlphaDesc::TransparentDependingOnParams => true,
            _ => false,
        }
    }

    pub fn is_tex4x4(self) -> bool {
        self.0 == 5
    }

    /// Size of one element of the hex-dumped texel data.
    pub fn texel_element_size(self) -> usize {
        if self.is_tex4x4() { 4 } else { 2 }
    }
}

/// Describes properties of an NDS texture format.
pub struct FormatDesc {
    pub name: &'static str,
    pub requires_palette: bool,
    pub bpp: u8,
    pub alpha_desc: AlphaDesc,
}

pub enum AlphaDesc {
    Opaque,
    Transparent,
    TransparentDependingOnParams,
    Translucent,
}

pub static DESCS: [FormatDesc; 8] = [
    // 0, not really a real texture format
    FormatDesc {
        name: "",
        requires_palette: false,
        bpp: 0,
        alpha_desc: AlphaDesc::Opaque,
    },
    // 1
    FormatDesc {
        name: "a3i5",
        requires_palette: true,
        bpp: 8,
        alpha_desc: AlphaDesc::Translucent,
    },
    // 2
    FormatDesc {
        name: "palette4",
        requires_palette: true,
        bpp: 2,
        alpha_desc: AlphaDesc::TransparentDependingOnParams,
    },
    // 3
    FormatDesc {
        name: "palette16",
        requires_palette: true,
        bpp: 4,
        alpha_desc: AlphaDesc::TransparentDependingOnParams,
    },
    // 4
    FormatDesc {
        name: "palette256",
        requires_palette: true,
        bpp: 8,
        alpha_desc: AlphaDesc::TransparentDependingOnParams,
    },
    // 5
    FormatDesc {
        name: "tex4x4",
        requires_palette: true,
        bpp: 2,
        alpha_desc: AlphaDesc::Transparent,
    },
    // 6
    FormatDesc {
        name: "a5i3",
        requires_palette: true,
        bpp: 8,
        alpha_desc: AlphaDesc::Translucent,
    },
    // 7
    FormatDesc {
        name: "direct",
        requires_palette: false,
        bpp: 16,
        alpha_desc: AlphaDesc::Transparent,
    },
];

#[test]
fn test() {
    let fmt = TextureFormat::from_name("palette16").unwrap();
    assert_eq!(fmt, TextureFormat(3));
    assert!(fmt.has_color0_mode());
    assert_eq!(fmt.byte_len((8, 8)), Some(32));
    let direct = TextureFormat::from_name("direct").unwrap();
    assert_eq!(direct.byte_len((65535, 65535)), Some(65535 * 65535 * 2));
    assert_eq!(direct.byte_len((u32::max_value(), u32::max_value())), None);
    assert!(TextureFormat::from_name("tex4x4").unwrap().is_tex4x4());
    assert!(!TextureFormat::from_name("direct").unwrap().desc().requires_palette);
    assert_eq!(TextureFormat::from_name(""), None);
    assert_eq!(TextureFormat::from_name("rgb565"), None);
}
