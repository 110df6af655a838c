use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::settings::{ColorMode, Settings};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ColorParseError {
    #[error("unrecognized color literal: {0:?}")]
    Unrecognized(String),
}

/// sRGB color with channels in 0..=255, kept as floats until display time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub fn from_u32(value: u32) -> Self {
        Self {
            r: ((value >> 16) & 0xFF) as f32,
            g: ((value >> 8) & 0xFF) as f32,
            b: (value & 0xFF) as f32,
        }
    }

    /// Parses `#rgb` and `#rrggbb` literals.
    pub fn parse(input: &str) -> Result<Self, ColorParseError> {
        let unrecognized = || ColorParseError::Unrecognized(input.to_string());
        let hex = input.trim().strip_prefix('#').ok_or_else(unrecognized)?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(unrecognized());
        }
        match hex.len() {
            3 => {
                let value = u32::from_str_radix(hex, 16).map_err(|_| unrecognized())?;
                let r = (value >> 8) & 0xF;
                let g = (value >> 4) & 0xF;
                let b = value & 0xF;
                Ok(Self::from_u32((r * 17) << 16 | (g * 17) << 8 | b * 17))
            }
            6 => {
                let value = u32::from_str_radix(hex, 16).map_err(|_| unrecognized())?;
                Ok(Self::from_u32(value))
            }
            _ => Err(unrecognized()),
        }
    }

    pub fn to_hex(self) -> String {
        let clamp = |v: f32| v.round().clamp(0.0, 255.0) as u32;
        format!(
            "#{:02x}{:02x}{:02x}",
            clamp(self.r),
            clamp(self.g),
            clamp(self.b)
        )
    }
}

// Cubehelix color space (Green 2011). Two-color gradients interpolate here
// instead of straight RGB so the midpoints keep their saturation.
const CH_A: f32 = -0.14861;
const CH_B: f32 = 1.78277;
const CH_C: f32 = -0.29227;
const CH_D: f32 = -0.90649;
const CH_E: f32 = 1.97294;
const CH_ED: f32 = CH_E * CH_D;
const CH_EB: f32 = CH_E * CH_B;
const CH_BC_DA: f32 = CH_B * CH_C - CH_D * CH_A;

#[derive(Debug, Clone, Copy)]
struct Cubehelix {
    h: f32,
    s: f32,
    l: f32,
}

fn cubehelix_from_rgb(color: Rgb) -> Cubehelix {
    let r = color.r / 255.0;
    let g = color.g / 255.0;
    let b = color.b / 255.0;
    let l = (CH_BC_DA * b + CH_ED * r - CH_EB * g) / (CH_BC_DA + CH_ED - CH_EB);
    let bl = b - l;
    let k = (CH_E * (g - l) - CH_C * bl) / CH_D;
    let denom = CH_E * l * (1.0 - l);
    let s = if denom != 0.0 {
        (k * k + bl * bl).sqrt() / denom
    } else {
        f32::NAN
    };
    let h = if s != 0.0 && !s.is_nan() {
        let mut h = k.atan2(bl).to_degrees() - 120.0;
        if h < 0.0 {
            h += 360.0;
        }
        h
    } else {
        f32::NAN
    };
    Cubehelix { h, s, l }
}

fn cubehelix_to_rgb(color: Cubehelix) -> Rgb {
    let h = if color.h.is_nan() { 0.0 } else { color.h + 120.0 }.to_radians();
    let l = color.l;
    let a = if color.s.is_nan() {
        0.0
    } else {
        color.s * l * (1.0 - l)
    };
    let cos_h = h.cos();
    let sin_h = h.sin();
    Rgb::new(
        255.0 * (l + a * (CH_A * cos_h + CH_B * sin_h)),
        255.0 * (l + a * (CH_C * cos_h + CH_D * sin_h)),
        255.0 * (l + a * (CH_E * cos_h)),
    )
}

fn lerp_channel(a: f32, b: f32, t: f32) -> f32 {
    if a.is_nan() {
        b
    } else if b.is_nan() {
        a
    } else {
        a + (b - a) * t
    }
}

fn lerp_hue(a: f32, b: f32, t: f32, long: bool) -> f32 {
    if a.is_nan() {
        return b;
    }
    if b.is_nan() {
        return a;
    }
    let mut d = b - a;
    if !long && (d > 180.0 || d < -180.0) {
        d -= 360.0 * (d / 360.0).round();
    }
    a + d * t
}

fn interpolate_cubehelix_space(a: Cubehelix, b: Cubehelix, t: f32, long: bool) -> Rgb {
    cubehelix_to_rgb(Cubehelix {
        h: lerp_hue(a.h, b.h, t, long),
        s: lerp_channel(a.s, b.s, t),
        l: lerp_channel(a.l, b.l, t),
    })
}

/// Two-color gradient through cubehelix space with shortest-path hue, the
/// interpolator behind the user start/end color option.
pub fn interpolate_cubehelix(start: Rgb, end: Rgb, t: f32) -> Rgb {
    interpolate_cubehelix_space(cubehelix_from_rgb(start), cubehelix_from_rgb(end), t, false)
}

// Uniform B-spline over the ramp stops; reflected virtual endpoints make the
// curve hit the first and last stop exactly at t = 0 and t = 1. Inputs outside
// [0, 1] clip to the extremes.
fn basis(t1: f32, v0: f32, v1: f32, v2: f32, v3: f32) -> f32 {
    let t2 = t1 * t1;
    let t3 = t2 * t1;
    ((1.0 - 3.0 * t1 + 3.0 * t2 - t3) * v0
        + (4.0 - 6.0 * t2 + 3.0 * t3) * v1
        + (1.0 + 3.0 * t1 + 3.0 * t2 - 3.0 * t3) * v2
        + t3 * v3)
        / 6.0
}

fn rgb_basis(stops: &[u32], t: f32) -> Rgb {
    debug_assert!(stops.len() >= 2);
    let n = stops.len() - 1;
    let (t, i) = if t <= 0.0 {
        (0.0, 0)
    } else if t >= 1.0 {
        (1.0, n - 1)
    } else {
        (t, ((t * n as f32).floor() as usize).min(n - 1))
    };
    let stop = |idx: usize| Rgb::from_u32(stops[idx]);
    let v1 = stop(i);
    let v2 = stop(i + 1);
    let v0 = if i > 0 {
        stop(i - 1)
    } else {
        Rgb::new(2.0 * v1.r - v2.r, 2.0 * v1.g - v2.g, 2.0 * v1.b - v2.b)
    };
    let v3 = if i < n - 1 {
        stop(i + 2)
    } else {
        Rgb::new(2.0 * v2.r - v1.r, 2.0 * v2.g - v1.g, 2.0 * v2.b - v1.b)
    };
    let local = (t - i as f32 / n as f32) * n as f32;
    Rgb::new(
        basis(local, v0.r, v1.r, v2.r, v3.r),
        basis(local, v0.g, v1.g, v2.g, v3.g),
        basis(local, v0.b, v1.b, v2.b, v3.b),
    )
}

fn rainbow(t: f32) -> Rgb {
    let t = if !(0.0..=1.0).contains(&t) {
        t - t.floor()
    } else {
        t
    };
    let ts = (t - 0.5).abs();
    cubehelix_to_rgb(Cubehelix {
        h: 360.0 * t - 100.0,
        s: 1.5 - 1.5 * ts,
        l: 0.8 - 0.9 * ts,
    })
}

const BU_GN: &[u32] = &[
    0xf7fcfd, 0xe5f5f9, 0xccece6, 0x99d8c9, 0x66c2a4, 0x41ae76, 0x238b45, 0x006d2c, 0x00441b,
];
const BU_PU: &[u32] = &[
    0xf7fcfd, 0xe0ecf4, 0xbfd3e6, 0x9ebcda, 0x8c96c6, 0x8c6bb1, 0x88419d, 0x810f7c, 0x4d004b,
];
const GN_BU: &[u32] = &[
    0xf7fcf0, 0xe0f3db, 0xccebc5, 0xa8ddb5, 0x7bccc4, 0x4eb3d3, 0x2b8cbe, 0x0868ac, 0x084081,
];
const OR_RD: &[u32] = &[
    0xfff7ec, 0xfee8c8, 0xfdd49e, 0xfdbb84, 0xfc8d59, 0xef6548, 0xd7301f, 0xb30000, 0x7f0000,
];
const PU_BU_GN: &[u32] = &[
    0xfff7fb, 0xece2f0, 0xd0d1e6, 0xa6bddb, 0x67a9cf, 0x3690c0, 0x02818a, 0x016c59, 0x014636,
];
const PU_BU: &[u32] = &[
    0xfff7fb, 0xece7f2, 0xd0d1e6, 0xa6bddb, 0x74a9cf, 0x3690c0, 0x0570b0, 0x045a8d, 0x023858,
];
const PU_RD: &[u32] = &[
    0xf7f4f9, 0xe7e1ef, 0xd4b9da, 0xc994c7, 0xdf65b0, 0xe7298a, 0xce1256, 0x980043, 0x67001f,
];
const RD_PU: &[u32] = &[
    0xfff7f3, 0xfde0dd, 0xfcc5c0, 0xfa9fb5, 0xf768a1, 0xdd3497, 0xae017e, 0x7a0177, 0x49006a,
];
const YL_GN: &[u32] = &[
    0xffffe5, 0xf7fcb9, 0xd9f0a3, 0xaddd8e, 0x78c679, 0x41ab5d, 0x238443, 0x006837, 0x004529,
];
const YL_GN_BU: &[u32] = &[
    0xffffd9, 0xedf8b1, 0xc7e9b4, 0x7fcdbb, 0x41b6c4, 0x1d91c0, 0x225ea8, 0x253494, 0x081d58,
];
const YL_OR_RD: &[u32] = &[
    0xffffcc, 0xffeda0, 0xfed976, 0xfeb24c, 0xfd8d3c, 0xfc4e2a, 0xe31a1c, 0xbd0026, 0x800026,
];
const YL_OR_BR: &[u32] = &[
    0xffffe5, 0xfff7bc, 0xfee391, 0xfec44f, 0xfe9929, 0xec7014, 0xcc4c02, 0x993404, 0x662506,
];
const BLUES: &[u32] = &[
    0xf7fbff, 0xdeebf7, 0xc6dbef, 0x9ecae1, 0x6baed6, 0x4292c6, 0x2171b5, 0x08519c, 0x08306b,
];
const REDS: &[u32] = &[
    0xfff5f0, 0xfee0d2, 0xfcbba1, 0xfc9272, 0xfb6a4a, 0xef3b2c, 0xcb181d, 0xa50f15, 0x67000d,
];
const GREENS: &[u32] = &[
    0xf7fcf5, 0xe5f5e0, 0xc7e9c0, 0xa1d99b, 0x74c476, 0x41ab5d, 0x238b45, 0x006d2c, 0x00441b,
];
const GREYS: &[u32] = &[
    0xffffff, 0xf0f0f0, 0xd9d9d9, 0xbdbdbd, 0x969696, 0x737373, 0x525252, 0x252525, 0x000000,
];
const PURPLES: &[u32] = &[
    0xfcfbfd, 0xefedf5, 0xdadaeb, 0xbcbddc, 0x9e9ac8, 0x807dba, 0x6a51a3, 0x54278f, 0x3f007d,
];
const ORANGES: &[u32] = &[
    0xfff5eb, 0xfee6ce, 0xfdd0a2, 0xfdae6b, 0xfd8d3c, 0xf16913, 0xd94801, 0xa63603, 0x7f2704,
];
const PI_YG: &[u32] = &[
    0x8e0152, 0xc51b7d, 0xde77ae, 0xf1b6da, 0xfde0ef, 0xf7f7f7, 0xe6f5d0, 0xb8e186, 0x7fbc41,
    0x4d9221, 0x276419,
];
const PU_OR: &[u32] = &[
    0x7f3b08, 0xb35806, 0xe08214, 0xfdb863, 0xfee0b6, 0xf7f7f7, 0xd8daeb, 0xb2abd2, 0x8073ac,
    0x542788, 0x2d004b,
];
const RD_BU: &[u32] = &[
    0x67001f, 0xb2182b, 0xd6604d, 0xf4a582, 0xfddbc7, 0xf7f7f7, 0xd1e5f0, 0x92c5de, 0x4393c3,
    0x2166ac, 0x053061,
];
const RD_YL_BU: &[u32] = &[
    0xa50026, 0xd73027, 0xf46d43, 0xfdae61, 0xfee090, 0xffffbf, 0xe0f3f8, 0xabd9e9, 0x74add1,
    0x4575b4, 0x313695,
];
const RD_YL_GN: &[u32] = &[
    0xa50026, 0xd73027, 0xf46d43, 0xfdae61, 0xfee08b, 0xffffbf, 0xd9ef8b, 0xa6d96a, 0x66bd63,
    0x1a9850, 0x006837,
];
const SPECTRAL: &[u32] = &[
    0x9e0142, 0xd53e4f, 0xf46d43, 0xfdae61, 0xfee08b, 0xffffbf, 0xe6f598, 0xabdda4, 0x66c2a5,
    0x3288bd, 0x5e4fa2,
];
const VIRIDIS: &[u32] = &[
    0x440154, 0x482878, 0x3e4a89, 0x31688e, 0x26828e, 0x1f9e89, 0x35b779, 0x6ece58, 0xb5de2b,
    0xfde725,
];
const MAGMA: &[u32] = &[
    0x000004, 0x180f3e, 0x451077, 0x721f81, 0x9f2f7f, 0xcd4071, 0xf1605d, 0xfd9567, 0xfeca8d,
    0xfcfdbf,
];
const INFERNO: &[u32] = &[
    0x000004, 0x1b0c42, 0x4b0c6b, 0x781c6d, 0xa52c60, 0xcf4446, 0xed6925, 0xfb9a06, 0xf7d03c,
    0xfcffa4,
];
const PLASMA: &[u32] = &[
    0x0d0887, 0x47039f, 0x7301a8, 0x9c179e, 0xbd3786, 0xd8576b, 0xed7953, 0xfa9e3b, 0xfdc926,
    0xf0f921,
];

/// The fixed catalog of named interpolation schemes recognized by the
/// `predefinedInterpolation` option. Unknown names are rejected at settings
/// parse time rather than producing an undefined interpolator at render time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scheme {
    BuGn,
    BuPu,
    GnBu,
    OrRd,
    PiYG,
    PuBuGn,
    PuBu,
    PuOr,
    PuRd,
    RdPu,
    RdYlGn,
    RdBu,
    RdYlBu,
    YlGn,
    YlGnBu,
    YlOrRd,
    YlOrBr,
    Viridis,
    Cool,
    CubehelixDefault,
    Warm,
    Spectral,
    Rainbow,
    Plasma,
    Magma,
    Inferno,
    Blues,
    Reds,
    Greens,
    Greys,
    Purples,
    Oranges,
}

impl Scheme {
    pub const ALL: [Scheme; 32] = [
        Scheme::BuGn,
        Scheme::BuPu,
        Scheme::GnBu,
        Scheme::OrRd,
        Scheme::PiYG,
        Scheme::PuBuGn,
        Scheme::PuBu,
        Scheme::PuOr,
        Scheme::PuRd,
        Scheme::RdPu,
        Scheme::RdYlGn,
        Scheme::RdBu,
        Scheme::RdYlBu,
        Scheme::YlGn,
        Scheme::YlGnBu,
        Scheme::YlOrRd,
        Scheme::YlOrBr,
        Scheme::Viridis,
        Scheme::Cool,
        Scheme::CubehelixDefault,
        Scheme::Warm,
        Scheme::Spectral,
        Scheme::Rainbow,
        Scheme::Plasma,
        Scheme::Magma,
        Scheme::Inferno,
        Scheme::Blues,
        Scheme::Reds,
        Scheme::Greens,
        Scheme::Greys,
        Scheme::Purples,
        Scheme::Oranges,
    ];

    /// Accepts the host's `interpolateXxx` spelling as well as the bare name.
    pub fn from_name(name: &str) -> Option<Self> {
        let bare = name.trim().strip_prefix("interpolate").unwrap_or(name.trim());
        Scheme::ALL
            .iter()
            .copied()
            .find(|scheme| scheme.bare_name().eq_ignore_ascii_case(bare))
    }

    pub fn name(self) -> String {
        format!("interpolate{}", self.bare_name())
    }

    fn bare_name(self) -> &'static str {
        match self {
            Scheme::BuGn => "BuGn",
            Scheme::BuPu => "BuPu",
            Scheme::GnBu => "GnBu",
            Scheme::OrRd => "OrRd",
            Scheme::PiYG => "PiYG",
            Scheme::PuBuGn => "PuBuGn",
            Scheme::PuBu => "PuBu",
            Scheme::PuOr => "PuOr",
            Scheme::PuRd => "PuRd",
            Scheme::RdPu => "RdPu",
            Scheme::RdYlGn => "RdYlGn",
            Scheme::RdBu => "RdBu",
            Scheme::RdYlBu => "RdYlBu",
            Scheme::YlGn => "YlGn",
            Scheme::YlGnBu => "YlGnBu",
            Scheme::YlOrRd => "YlOrRd",
            Scheme::YlOrBr => "YlOrBr",
            Scheme::Viridis => "Viridis",
            Scheme::Cool => "Cool",
            Scheme::CubehelixDefault => "CubehelixDefault",
            Scheme::Warm => "Warm",
            Scheme::Spectral => "Spectral",
            Scheme::Rainbow => "Rainbow",
            Scheme::Plasma => "Plasma",
            Scheme::Magma => "Magma",
            Scheme::Inferno => "Inferno",
            Scheme::Blues => "Blues",
            Scheme::Reds => "Reds",
            Scheme::Greens => "Greens",
            Scheme::Greys => "Greys",
            Scheme::Purples => "Purples",
            Scheme::Oranges => "Oranges",
        }
    }

    /// Continuous color over [0, 1]; out-of-domain inputs clip to the extremes.
    pub fn interpolate(self, t: f32) -> Rgb {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let stops = match self {
            Scheme::BuGn => BU_GN,
            Scheme::BuPu => BU_PU,
            Scheme::GnBu => GN_BU,
            Scheme::OrRd => OR_RD,
            Scheme::PiYG => PI_YG,
            Scheme::PuBuGn => PU_BU_GN,
            Scheme::PuBu => PU_BU,
            Scheme::PuOr => PU_OR,
            Scheme::PuRd => PU_RD,
            Scheme::RdPu => RD_PU,
            Scheme::RdYlGn => RD_YL_GN,
            Scheme::RdBu => RD_BU,
            Scheme::RdYlBu => RD_YL_BU,
            Scheme::YlGn => YL_GN,
            Scheme::YlGnBu => YL_GN_BU,
            Scheme::YlOrRd => YL_OR_RD,
            Scheme::YlOrBr => YL_OR_BR,
            Scheme::Viridis => VIRIDIS,
            Scheme::Spectral => SPECTRAL,
            Scheme::Plasma => PLASMA,
            Scheme::Magma => MAGMA,
            Scheme::Inferno => INFERNO,
            Scheme::Blues => BLUES,
            Scheme::Reds => REDS,
            Scheme::Greens => GREENS,
            Scheme::Greys => GREYS,
            Scheme::Purples => PURPLES,
            Scheme::Oranges => ORANGES,
            Scheme::Cool => {
                return interpolate_cubehelix_space(
                    Cubehelix {
                        h: 260.0,
                        s: 0.75,
                        l: 0.35,
                    },
                    Cubehelix {
                        h: 80.0,
                        s: 1.50,
                        l: 0.8,
                    },
                    t,
                    true,
                );
            }
            Scheme::Warm => {
                return interpolate_cubehelix_space(
                    Cubehelix {
                        h: -100.0,
                        s: 0.75,
                        l: 0.35,
                    },
                    Cubehelix {
                        h: 80.0,
                        s: 1.50,
                        l: 0.8,
                    },
                    t,
                    true,
                );
            }
            Scheme::CubehelixDefault => {
                return interpolate_cubehelix_space(
                    Cubehelix {
                        h: 300.0,
                        s: 0.5,
                        l: 0.0,
                    },
                    Cubehelix {
                        h: -240.0,
                        s: 0.5,
                        l: 1.0,
                    },
                    t,
                    true,
                );
            }
            Scheme::Rainbow => return rainbow(t),
        };
        rgb_basis(stops, t)
    }
}

/// Linear mapping from a raw value domain onto the [0, 1] interpolator input.
#[derive(Debug, Clone, Copy)]
pub struct SequentialScale {
    pub domain: (f32, f32),
}

impl SequentialScale {
    pub fn new(start: f32, end: f32) -> Self {
        Self {
            domain: (start, end),
        }
    }

    pub fn normalize(&self, value: f32) -> f32 {
        let (start, end) = self.domain;
        if end == start {
            return 0.5;
        }
        (value - start) / (end - start)
    }
}

/// Resolves a node's color from its rank within its group.
pub fn node_color(rank: f32, settings: &Settings) -> Rgb {
    match settings.color_mode {
        ColorMode::Ordinal => settings.scheme.interpolate(rank),
        ColorMode::Gradient => {
            let (start, end) = if settings.use_gradient {
                (settings.start_color, settings.end_color)
            } else {
                default_gradient()
            };
            interpolate_cubehelix(start, end, rank.clamp(0.0, 1.0))
        }
    }
}

pub fn default_gradient() -> (Rgb, Rgb) {
    (Rgb::from_u32(0xAC0086), Rgb::from_u32(0xFFA500))
}
