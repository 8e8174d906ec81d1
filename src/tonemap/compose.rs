use crate::{
    container::image::{ChannelSamples, MultiChannelImage},
    foundation::error::{OdsError, OdsResult},
};

/// Names of the channels that feed the four output bytes of each pixel.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ChannelQuad {
    /// Red source channel.
    pub red: String,
    /// Green source channel.
    pub green: String,
    /// Blue source channel.
    pub blue: String,
    /// Alpha source channel; `None` produces opaque pixels.
    pub alpha: Option<String>,
}

impl ChannelQuad {
    /// `R`, `G`, `B`, `A`.
    pub fn rgba() -> Self {
        Self::prefixed("")
    }

    /// `<prefix>R`, `<prefix>G`, `<prefix>B`, `<prefix>A`, e.g. `Image.left.` for multi-view files.
    pub fn prefixed(prefix: &str) -> Self {
        Self {
            red: format!("{prefix}R"),
            green: format!("{prefix}G"),
            blue: format!("{prefix}B"),
            alpha: Some(format!("{prefix}A")),
        }
    }
}

/// Linear remap of values above `knee` so that `max` lands on 1.0.
///
/// `max` must be finite and greater than `knee`; deserialization rejects anything else.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "HighlightFields")]
pub struct HighlightCompression {
    /// Values at or below the knee pass through unchanged.
    pub knee: f32,
    /// Input value mapped to 1.0.
    pub max: f32,
}

impl Default for HighlightCompression {
    fn default() -> Self {
        Self {
            knee: 0.75,
            max: 12.5,
        }
    }
}

#[derive(serde::Deserialize)]
struct HighlightFields {
    knee: f32,
    max: f32,
}

impl TryFrom<HighlightFields> for HighlightCompression {
    type Error = OdsError;

    fn try_from(f: HighlightFields) -> OdsResult<Self> {
        Self::new(f.knee, f.max)
    }
}

impl HighlightCompression {
    /// Checked constructor.
    pub fn new(knee: f32, max: f32) -> OdsResult<Self> {
        let h = Self { knee, max };
        h.validate()?;
        Ok(h)
    }

    /// Errors unless both bounds are finite and `max > knee`.
    pub fn validate(self) -> OdsResult<()> {
        if !self.knee.is_finite() || !self.max.is_finite() || self.max <= self.knee {
            return Err(OdsError::validation(format!(
                "highlight compression needs finite knee < max, got knee={} max={}",
                self.knee, self.max
            )));
        }
        Ok(())
    }

    fn apply(self, v: f32) -> f32 {
        if v > self.knee {
            (v - self.knee) / (self.max - self.knee) * (1.0 - self.knee) + self.knee
        } else {
            v
        }
    }
}

/// Options for [`compose_rgba`].
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ToneMapOptions {
    /// Apply the display transfer curve to color channels. When `false` bytes are
    /// `round(255·v)` of the clamped linear value.
    pub gamma_correct: bool,
    /// Optional highlight compression ahead of the transfer curve.
    pub highlight: Option<HighlightCompression>,
}

impl Default for ToneMapOptions {
    fn default() -> Self {
        Self {
            gamma_correct: true,
            highlight: None,
        }
    }
}

/// Linear to display transfer: `12.92·v` up to `0.0031308`, `min(1.055·v^(1/2.4), 1)` above.
/// NaN passes through.
pub fn linear_to_display(v: f32) -> f32 {
    if v.is_nan() {
        return v;
    }
    if v <= 0.003_130_8 {
        12.92 * v
    } else {
        (1.055 * v.powf(1.0 / 2.4)).min(1.0)
    }
}

fn to_byte(v: f32) -> u8 {
    if v.is_nan() {
        return 0;
    }
    (255.0 * v.clamp(0.0, 1.0)).round() as u8
}

/// Samples of a channel as normalized `f32` (`u32` channels are divided by `2³² − 1`).
fn normalized(samples: &ChannelSamples) -> Vec<f32> {
    match samples {
        ChannelSamples::U32(v) => v
            .iter()
            .map(|s| (f64::from(*s) / f64::from(u32::MAX)) as f32)
            .collect(),
        ChannelSamples::Half(v) => v
            .iter()
            .map(|s| crate::container::half::f16_bits_to_f32(*s))
            .collect(),
        ChannelSamples::F32(v) => v.clone(),
    }
}

fn lookup<'a>(image: &'a MultiChannelImage, name: &str) -> OdsResult<&'a ChannelSamples> {
    image
        .channel(name)
        .map(|c| &c.samples)
        .ok_or_else(|| OdsError::validation(format!("image has no channel named '{name}'")))
}

/// Convert four named channels into interleaved RGBA8.
///
/// Color channels go through optional highlight compression and the transfer curve. Alpha is
/// treated as linear coverage and only clamped and quantized.
pub fn compose_rgba(
    image: &MultiChannelImage,
    quad: &ChannelQuad,
    opts: &ToneMapOptions,
) -> OdsResult<Vec<u8>> {
    if let Some(h) = opts.highlight {
        h.validate()?;
    }
    let color = [
        normalized(lookup(image, &quad.red)?),
        normalized(lookup(image, &quad.green)?),
        normalized(lookup(image, &quad.blue)?),
    ];
    let alpha = match &quad.alpha {
        Some(name) => Some(normalized(lookup(image, name)?)),
        None => None,
    };

    let n = image.width() as usize * image.height() as usize;
    let mut out = Vec::with_capacity(n * 4);
    for i in 0..n {
        for plane in &color {
            let mut v = plane[i];
            if opts.gamma_correct {
                if let Some(h) = opts.highlight {
                    v = h.apply(v);
                }
                v = linear_to_display(v);
            }
            out.push(to_byte(v));
        }
        out.push(alpha.as_ref().map_or(255, |a| to_byte(a[i])));
    }
    Ok(out)
}

/// Any channel as `f32` samples, for use as a depth map.
pub fn depth_samples(image: &MultiChannelImage, name: &str) -> OdsResult<Vec<f32>> {
    Ok(match lookup(image, name)? {
        ChannelSamples::U32(v) => v.iter().map(|s| *s as f32).collect(),
        other => normalized(other),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/tonemap/compose.rs"]
mod tests;
