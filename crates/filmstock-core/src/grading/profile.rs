//! Film profiles: the grading recipe for each simulated stock.
//!
//! A [`FilmProfile`] is plain data. The built-in stocks are process-wide
//! immutable statics ([`FilmProfile::warm_stock`], [`FilmProfile::cool_stock`])
//! and can be overridden through [`crate::config::RenderConfig`].

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::color::normalize_hue;
use crate::effects::blur::MAX_SIGMA;
use crate::error::{RenderError, RenderResult};
use crate::grading::tone_curve::ToneCurveKind;

/// Which look to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FilterKind {
    /// Frame only; the photo is left ungraded.
    #[default]
    None,
    /// Warm consumer stock: lifted blacks, warm shadows, heavy grain, halation.
    WarmStock,
    /// Cool professional stock: S-curve contrast, cyan greens, fine grain.
    CoolStock,
}

impl FilterKind {
    /// Every selectable filter.
    pub const ALL: [FilterKind; 3] = [Self::None, Self::WarmStock, Self::CoolStock];

    /// Human-readable label for menus and logs.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::WarmStock => "Warm Stock",
            Self::CoolStock => "Cool Stock",
        }
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for FilterKind {
    type Err = RenderError;

    /// Accepts `none`, `warm`, `warm-stock`, `WARM_STOCK`, `cool`, … (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match key.as_str() {
            "none" | "off" => Ok(Self::None),
            "warm" | "warm_stock" | "warmstock" => Ok(Self::WarmStock),
            "cool" | "cool_stock" | "coolstock" => Ok(Self::CoolStock),
            _ => Err(RenderError::UnsupportedProfile(s.to_string())),
        }
    }
}

/// Global white-balance gains, applied unclamped after the tone curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WarmShift {
    /// Red multiplier.
    pub r_gain: f32,
    /// Blue multiplier.
    pub b_gain: f32,
}

impl WarmShift {
    /// No white-balance change.
    pub const NEUTRAL: Self = Self {
        r_gain: 1.0,
        b_gain: 1.0,
    };
}

/// Luma band a [`LumaTint`] reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TintZone {
    /// Pixels darker than the threshold.
    Shadows,
    /// Pixels brighter than the threshold.
    Highlights,
}

/// Luma-proportional red/green boost confined to shadows or highlights.
///
/// ```text
/// shadows:    w = (threshold − luma) / threshold            if luma < threshold
/// highlights: w = (luma − threshold) / (255 − threshold)    if luma > threshold
/// r += r_boost × w;  g += g_boost × w
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LumaTint {
    /// Which side of the threshold is tinted.
    pub zone: TintZone,
    /// Luma threshold on the 8-bit scale.
    pub luma_threshold: f32,
    /// Red added at full weight.
    pub r_boost: f32,
    /// Green added at full weight.
    pub g_boost: f32,
}

impl LumaTint {
    /// Tint weight for `luma`, or `None` outside the zone.
    pub fn weight(&self, luma: f32) -> Option<f32> {
        match self.zone {
            TintZone::Shadows if luma < self.luma_threshold && self.luma_threshold > 0.0 => {
                Some((self.luma_threshold - luma) / self.luma_threshold)
            }
            TintZone::Highlights if luma > self.luma_threshold && self.luma_threshold < 255.0 => {
                Some((luma - self.luma_threshold) / (255.0 - self.luma_threshold))
            }
            _ => None,
        }
    }

    /// Apply the tint to an 8-bit-scale RGB triple.
    #[inline]
    pub fn apply(&self, rgb: &mut [f32; 3], luma: f32) {
        if let Some(w) = self.weight(luma) {
            rgb[0] += self.r_boost * w;
            rgb[1] += self.g_boost * w;
        }
    }
}

/// Hue interval in degrees. `start > end` wraps through 0°.
///
/// Bounds are inclusive unless `exclusive` is set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HueRange {
    /// First hue in the range.
    pub start: f32,
    /// Last hue in the range.
    pub end: f32,
    /// Leave both bounds out of the range.
    #[serde(default)]
    pub exclusive: bool,
}

impl HueRange {
    /// Range including both bounds.
    pub const fn new(start: f32, end: f32) -> Self {
        Self {
            start,
            end,
            exclusive: false,
        }
    }

    /// Range excluding both bounds.
    pub const fn open(start: f32, end: f32) -> Self {
        Self {
            start,
            end,
            exclusive: true,
        }
    }

    /// Returns `true` if `hue` lies in the range.
    pub fn contains(&self, hue: f32) -> bool {
        let (after_start, before_end) = if self.exclusive {
            (hue > self.start, hue < self.end)
        } else {
            (hue >= self.start, hue <= self.end)
        };
        if self.start <= self.end {
            after_start && before_end
        } else {
            after_start || before_end
        }
    }
}

/// Targeted adjustment for one hue range.
///
/// Scales of exactly 1.0 leave that component alone. A scaled lightness is
/// capped at 100 and a scaled saturation is clamped to `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HueBand {
    /// Hues this band affects.
    pub range: HueRange,
    /// Degrees added to the hue (wrapped into `[0, 360)`).
    #[serde(default)]
    pub hue_shift: f32,
    /// Lightness multiplier.
    #[serde(default = "unit")]
    pub lightness_scale: f32,
    /// Saturation multiplier.
    #[serde(default = "unit")]
    pub saturation_scale: f32,
}

fn unit() -> f32 {
    1.0
}

impl HueBand {
    /// Apply the band to `(hue, saturation, lightness)` if the current hue is in range.
    pub fn apply(&self, hue: &mut f32, saturation: &mut f32, lightness: &mut f32) {
        if !self.range.contains(*hue) {
            return;
        }
        if self.hue_shift != 0.0 {
            *hue = normalize_hue(*hue + self.hue_shift);
        }
        if self.lightness_scale != 1.0 {
            *lightness = (*lightness * self.lightness_scale).min(100.0);
        }
        if self.saturation_scale != 1.0 {
            *saturation = (*saturation * self.saturation_scale).clamp(0.0, 100.0);
        }
    }
}

/// Soft compression of lightness above a knee.
///
/// ```text
/// l > knee → knee + (l − knee) × slope
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HighlightRolloff {
    /// Lightness (percent) where compression begins.
    pub knee: f32,
    /// Slope above the knee.
    pub slope: f32,
}

impl HighlightRolloff {
    /// Compress a lightness value.
    #[inline]
    pub fn apply(&self, lightness: f32) -> f32 {
        if lightness > self.knee {
            self.knee + (lightness - self.knee) * self.slope
        } else {
            lightness
        }
    }
}

/// How highlight pixels are keyed into the halation map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HalationMask {
    /// Every pixel above the threshold at full alpha.
    #[default]
    FullAlpha,
    /// Alpha ramps from 0 at the threshold to 1 at white.
    Proportional,
}

/// Highlight bloom settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Halation {
    /// Pixels with luma strictly above this are keyed.
    pub threshold: f32,
    /// Keying mode.
    #[serde(default)]
    pub mask: HalationMask,
    /// Replaces the keyed colour with a fixed glow colour when set.
    #[serde(default)]
    pub tint: Option<[u8; 3]>,
    /// Gaussian σ in pixels for a 1000 px short side.
    pub blur_sigma: f32,
    /// Screen-blend opacity.
    pub opacity: f32,
}

impl Halation {
    /// Short side at which `blur_sigma` applies unscaled.
    pub const REFERENCE_SIDE: f32 = 1000.0;

    /// Blur σ for a region, scaled to its short side and clamped to `[1, blur_sigma]`.
    pub fn sigma_for(&self, width: u32, height: u32) -> f32 {
        let short = width.min(height) as f32;
        let max = self.blur_sigma.max(1.0);
        (self.blur_sigma * short / Self::REFERENCE_SIDE).clamp(1.0, max)
    }
}

/// The complete grading recipe for one film stock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilmProfile {
    /// Display name.
    pub name: String,
    /// Per-channel contrast curve.
    pub tone_curve: ToneCurveKind,
    /// Global white balance.
    pub warm_shift: WarmShift,
    /// Shadow tint; `None` disables it.
    #[serde(default)]
    pub shadow_tint: Option<LumaTint>,
    /// Highlight tint; `None` disables it.
    #[serde(default)]
    pub highlight_tint: Option<LumaTint>,
    /// Saturation multiplier applied before hue bands.
    pub global_saturation_scale: f32,
    /// Hue bands, evaluated in order against the running hue.
    #[serde(default)]
    pub hue_bands: Vec<HueBand>,
    /// Lightness compression after the hue bands.
    #[serde(default)]
    pub highlight_rolloff: Option<HighlightRolloff>,
    /// Full width of the uniform grain distribution, 8-bit scale.
    pub grain_strength: f32,
    /// Highlight bloom, applied before grading. `None` disables it.
    #[serde(default)]
    pub halation: Option<Halation>,
}

static WARM_STOCK: LazyLock<FilmProfile> = LazyLock::new(|| FilmProfile {
    name: "Warm Stock".to_string(),
    tone_curve: ToneCurveKind::Lift { black_lift: 35.0 },
    warm_shift: WarmShift {
        r_gain: 1.05,
        b_gain: 0.95,
    },
    shadow_tint: Some(LumaTint {
        zone: TintZone::Shadows,
        luma_threshold: 100.0,
        r_boost: 15.0,
        g_boost: 5.0,
    }),
    highlight_tint: None,
    global_saturation_scale: 0.80,
    hue_bands: vec![HueBand {
        // skin tones: reds and oranges either side of 0°
        range: HueRange::open(340.0, 40.0),
        hue_shift: 0.0,
        lightness_scale: 1.10,
        saturation_scale: 0.95,
    }],
    highlight_rolloff: None,
    grain_strength: 40.0,
    halation: Some(Halation {
        threshold: 220.0,
        mask: HalationMask::FullAlpha,
        tint: None,
        blur_sigma: 8.0,
        opacity: 0.6,
    }),
});

static COOL_STOCK: LazyLock<FilmProfile> = LazyLock::new(|| FilmProfile {
    name: "Cool Stock".to_string(),
    tone_curve: ToneCurveKind::Sigmoid {
        steepness: 6.0,
        offset: 10.0,
        gain: 1.1,
    },
    warm_shift: WarmShift {
        r_gain: 0.95,
        b_gain: 1.0,
    },
    shadow_tint: None,
    highlight_tint: Some(LumaTint {
        zone: TintZone::Highlights,
        luma_threshold: 180.0,
        r_boost: 5.0,
        g_boost: 10.0,
    }),
    global_saturation_scale: 1.10,
    hue_bands: vec![
        HueBand {
            // greens rotate toward cyan
            range: HueRange::new(70.0, 170.0),
            hue_shift: 30.0,
            lightness_scale: 1.05,
            saturation_scale: 1.0,
        },
        HueBand {
            range: HueRange::new(170.0, 260.0),
            hue_shift: 0.0,
            lightness_scale: 1.0,
            saturation_scale: 1.20,
        },
    ],
    highlight_rolloff: Some(HighlightRolloff {
        knee: 95.0,
        slope: 0.5,
    }),
    grain_strength: 18.0,
    halation: None,
});

impl FilmProfile {
    /// Built-in warm stock.
    pub fn warm_stock() -> &'static FilmProfile {
        &WARM_STOCK
    }

    /// Built-in cool stock.
    pub fn cool_stock() -> &'static FilmProfile {
        &COOL_STOCK
    }

    /// Built-in profile for `kind`; `None` for [`FilterKind::None`].
    pub fn builtin(kind: FilterKind) -> Option<&'static FilmProfile> {
        match kind {
            FilterKind::None => None,
            FilterKind::WarmStock => Some(Self::warm_stock()),
            FilterKind::CoolStock => Some(Self::cool_stock()),
        }
    }

    /// Reject non-finite or out-of-range parameters.
    pub fn validate(&self) -> RenderResult<()> {
        let invalid = |what: &str| {
            Err(RenderError::InvalidParameter(format!("{}: {what}", self.name)))
        };

        if !self.tone_curve.is_finite() {
            return invalid("tone curve parameters must be finite");
        }
        let scalars = [
            self.warm_shift.r_gain,
            self.warm_shift.b_gain,
            self.global_saturation_scale,
            self.grain_strength,
        ];
        if scalars.iter().any(|v| !v.is_finite()) {
            return invalid("gains, saturation and grain must be finite");
        }
        if self.grain_strength < 0.0 {
            return invalid("grain strength must not be negative");
        }
        for band in &self.hue_bands {
            let r = band.range;
            if !(0.0..=360.0).contains(&r.start) || !(0.0..=360.0).contains(&r.end) {
                return invalid("hue band bounds must lie in [0, 360]");
            }
            if band.lightness_scale < 0.0 || band.saturation_scale < 0.0 {
                return invalid("hue band scales must not be negative");
            }
        }
        if let Some(h) = &self.halation {
            if !(0.0..=1.0).contains(&h.opacity) {
                return invalid("halation opacity must lie in [0, 1]");
            }
            if !(h.blur_sigma > 0.0 && h.blur_sigma <= MAX_SIGMA) {
                return Err(RenderError::InvalidParameter(format!(
                    "halation blur sigma must lie in (0, {MAX_SIGMA}]"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn test_filter_kind_parses_aliases() {
        assert_eq!("none".parse::<FilterKind>().unwrap(), FilterKind::None);
        assert_eq!("Warm".parse::<FilterKind>().unwrap(), FilterKind::WarmStock);
        assert_eq!("warm-stock".parse::<FilterKind>().unwrap(), FilterKind::WarmStock);
        assert_eq!("COOL_STOCK".parse::<FilterKind>().unwrap(), FilterKind::CoolStock);
    }

    #[test]
    fn test_unknown_filter_is_unsupported() {
        let err = "sepia".parse::<FilterKind>().unwrap_err();
        assert!(matches!(err, RenderError::UnsupportedProfile(ref s) if s == "sepia"));
    }

    #[test]
    fn test_filter_kind_serde_names() {
        assert_eq!(serde_json::to_string(&FilterKind::CoolStock).unwrap(), r#""COOL_STOCK""#);
        let k: FilterKind = serde_json::from_str(r#""WARM_STOCK""#).unwrap();
        assert_eq!(k, FilterKind::WarmStock);
    }

    #[test]
    fn test_wrapping_hue_range() {
        let skin = HueRange::new(340.0, 40.0);
        assert!(skin.contains(0.0));
        assert!(skin.contains(350.0));
        assert!(skin.contains(40.0));
        assert!(!skin.contains(120.0));
        assert!(!skin.contains(339.0));
    }

    #[test]
    fn test_open_range_excludes_bounds() {
        let skin = HueRange::open(340.0, 40.0);
        assert!(!skin.contains(340.0));
        assert!(!skin.contains(40.0));
        assert!(skin.contains(340.5));
        assert!(skin.contains(0.0));
        assert!(skin.contains(39.9));

        let green = HueRange::open(70.0, 170.0);
        assert!(!green.contains(70.0));
        assert!(green.contains(120.0));
    }

    #[test]
    fn test_builtin_band_bounds() {
        let skin = FilmProfile::warm_stock().hue_bands[0].range;
        assert!(!skin.contains(40.0) && !skin.contains(340.0));
        let cool = &FilmProfile::cool_stock().hue_bands;
        assert!(cool[0].range.contains(70.0) && cool[0].range.contains(170.0));
        assert!(cool[1].range.contains(260.0));
    }

    #[test]
    fn test_exclusive_flag_defaults_off() {
        let r: HueRange = serde_json::from_str(r#"{"start": 70.0, "end": 170.0}"#).unwrap();
        assert!(!r.exclusive);
        assert!(r.contains(170.0));
    }

    #[test]
    fn test_band_shift_wraps_hue() {
        let band = HueBand {
            range: HueRange::new(300.0, 359.0),
            hue_shift: 90.0,
            lightness_scale: 1.0,
            saturation_scale: 1.0,
        };
        let (mut h, mut s, mut l) = (330.0, 150.0, 50.0);
        band.apply(&mut h, &mut s, &mut l);
        assert!((h - 60.0).abs() < EPSILON);
        // unit scales leave over-range saturation alone
        assert_eq!(s, 150.0);
        assert_eq!(l, 50.0);
    }

    #[test]
    fn test_band_caps_scaled_components() {
        let band = HueBand {
            range: HueRange::new(0.0, 360.0),
            hue_shift: 0.0,
            lightness_scale: 1.5,
            saturation_scale: 2.0,
        };
        let (mut h, mut s, mut l) = (10.0, 80.0, 90.0);
        band.apply(&mut h, &mut s, &mut l);
        assert_eq!(l, 100.0);
        assert_eq!(s, 100.0);
    }

    #[test]
    fn test_shadow_tint_weight() {
        let tint = FilmProfile::warm_stock().shadow_tint.unwrap();
        assert!((tint.weight(0.0).unwrap() - 1.0).abs() < EPSILON);
        assert!((tint.weight(50.0).unwrap() - 0.5).abs() < EPSILON);
        assert!(tint.weight(100.0).is_none());
    }

    #[test]
    fn test_highlight_tint_weight() {
        let tint = FilmProfile::cool_stock().highlight_tint.unwrap();
        assert!(tint.weight(180.0).is_none());
        assert!((tint.weight(255.0).unwrap() - 1.0).abs() < EPSILON);
        let mut rgb = [200.0, 200.0, 200.0];
        tint.apply(&mut rgb, 217.5);
        assert!((rgb[0] - 202.5).abs() < EPSILON);
        assert!((rgb[1] - 205.0).abs() < EPSILON);
        assert_eq!(rgb[2], 200.0);
    }

    #[test]
    fn test_rolloff_only_above_knee() {
        let roll = FilmProfile::cool_stock().highlight_rolloff.unwrap();
        assert_eq!(roll.apply(80.0), 80.0);
        assert!((roll.apply(99.0) - 97.0).abs() < EPSILON);
    }

    #[test]
    fn test_halation_sigma_scales_with_image() {
        let h = FilmProfile::warm_stock().halation.unwrap();
        assert!((h.sigma_for(4000, 3000) - 8.0).abs() < EPSILON);
        assert!((h.sigma_for(800, 500) - 4.0).abs() < EPSILON);
        assert!((h.sigma_for(2, 2) - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_builtins_validate() {
        assert!(FilmProfile::warm_stock().validate().is_ok());
        assert!(FilmProfile::cool_stock().validate().is_ok());
        assert!(FilmProfile::builtin(FilterKind::None).is_none());
        assert!(FilmProfile::warm_stock().halation.is_some());
        assert!(FilmProfile::cool_stock().halation.is_none());
    }

    #[test]
    fn test_validate_rejects_huge_halation_sigma() {
        let mut p = FilmProfile::warm_stock().clone();
        if let Some(h) = p.halation.as_mut() {
            h.blur_sigma = 1e30;
        }
        assert!(matches!(p.validate(), Err(RenderError::InvalidParameter(_))));
    }

    #[test]
    fn test_validate_rejects_nan() {
        let mut p = FilmProfile::cool_stock().clone();
        p.global_saturation_scale = f32::NAN;
        assert!(matches!(p.validate(), Err(RenderError::InvalidParameter(_))));
    }
}
