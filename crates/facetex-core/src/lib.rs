//! Local texture descriptors over raw 8-bit image buffers.
//!
//! # Overview
//!
//! This crate turns a grayscale (or RGB/RGBA) patch into a numeric feature
//! vector that a classifier can consume. Four encoders are provided:
//!
//! - [`lbp`] – Local Binary Pattern, a 256-bin histogram of 8-bit sign codes.
//! - [`ltp`] – Local Ternary Pattern, a histogram of 8-digit ternary codes
//!   obtained with a brightness threshold band.
//! - [`csltp`] – Center-Symmetric LTP, comparing the 4 opposite neighbor
//!   pairs instead of center vs neighbor.
//! - [`haar`] – a sliding 4×4 box emitting 5 Haar-like comparison bits per
//!   position (variable-length output).
//!
//! All histogram encoders walk the interior pixels with the 8-neighborhood
//! defined in [`neighborhood`]. [`dispatch`] selects an encoder from a
//! [`FeatureKind`] and owns the canonical length table.
//!
//! # Canonical lengths
//!
//! The histogram lengths are fixed API surface: LBP=256, LTP=9841,
//! CS-LTP=121. LTP and CS-LTP codes only reach 6560 and 80 respectively; the
//! extra bins are kept so vectors stay compatible with models trained against
//! these lengths.
//!
//! # Features
//!
//! - `rayon` – [`batch::extract_batch`] encodes images in parallel. Results
//!   are identical to the sequential path.
//! - `tracing` – emits spans for each encoder call and warnings for inputs
//!   that cannot be encoded (unsupported channel count, image too small).

pub mod batch;
pub mod csltp;
pub mod dispatch;
pub mod error;
pub mod haar;
pub mod image;
pub mod lbp;
pub mod ltp;
pub mod neighborhood;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use crate::dispatch::{extract, Features};
pub use crate::error::{ImageError, Result};
pub use crate::image::{GrayPlane, ImageView};

/// Histogram length of the LBP descriptor.
pub const LBP_FEATURE_LENGTH: usize = 256;
/// Histogram length of the LTP descriptor.
pub const LTP_FEATURE_LENGTH: usize = 9841;
/// Histogram length of the CS-LTP descriptor.
pub const CSLTP_FEATURE_LENGTH: usize = 121;
/// Default brightness band used by LTP and CS-LTP.
pub const DEFAULT_THRESHOLD: i32 = 25;

/// Texture descriptor family.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureKind {
    Lbp,
    Ltp,
    CsLtp,
    Haar,
}

impl FeatureKind {
    /// All kinds, in tag order.
    pub const ALL: [FeatureKind; 4] = [
        FeatureKind::Lbp,
        FeatureKind::Ltp,
        FeatureKind::CsLtp,
        FeatureKind::Haar,
    ];

    /// Fixed vector length for the histogram descriptors; `None` for Haar,
    /// whose length depends on the image size.
    #[inline]
    pub const fn canonical_len(self) -> Option<usize> {
        match self {
            FeatureKind::Lbp => Some(LBP_FEATURE_LENGTH),
            FeatureKind::Ltp => Some(LTP_FEATURE_LENGTH),
            FeatureKind::CsLtp => Some(CSLTP_FEATURE_LENGTH),
            FeatureKind::Haar => None,
        }
    }

    /// Vector length produced for an image of `width × height` pixels.
    #[inline]
    pub fn expected_len(self, width: usize, height: usize) -> usize {
        match self.canonical_len() {
            Some(len) => len,
            None => haar::haar_feature_len(width, height),
        }
    }

    /// Infer the descriptor that produced vectors of `var_count` values.
    ///
    /// Exact match against the canonical table; any other count is assumed
    /// to be Haar. This is a best guess used when restoring a trained model
    /// and is not authoritative: a Haar image size can collide with a
    /// canonical length.
    pub fn from_var_count(var_count: usize) -> Self {
        match var_count {
            LBP_FEATURE_LENGTH => FeatureKind::Lbp,
            LTP_FEATURE_LENGTH => FeatureKind::Ltp,
            CSLTP_FEATURE_LENGTH => FeatureKind::CsLtp,
            _ => FeatureKind::Haar,
        }
    }

    /// Stable numeric tag (Lbp=0, Ltp=1, CsLtp=2, Haar=3).
    #[inline]
    pub const fn tag(self) -> u8 {
        match self {
            FeatureKind::Lbp => 0,
            FeatureKind::Ltp => 1,
            FeatureKind::CsLtp => 2,
            FeatureKind::Haar => 3,
        }
    }

    pub fn from_tag(tag: u8) -> Option<Self> {
        Self::ALL.get(tag as usize).copied()
    }

    pub const fn name(self) -> &'static str {
        match self {
            FeatureKind::Lbp => "LBP",
            FeatureKind::Ltp => "LTP",
            FeatureKind::CsLtp => "CSLTP",
            FeatureKind::Haar => "HAAR",
        }
    }
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FeatureKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lbp" => Ok(FeatureKind::Lbp),
            "ltp" => Ok(FeatureKind::Ltp),
            "csltp" | "cs-ltp" => Ok(FeatureKind::CsLtp),
            "haar" => Ok(FeatureKind::Haar),
            other => Err(format!(
                "invalid feature '{other}', expected lbp|ltp|csltp|haar"
            )),
        }
    }
}

/// Encoder selection plus its tunable threshold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureParams {
    pub kind: FeatureKind,
    /// Brightness band for LTP and CS-LTP; ignored by LBP and Haar.
    pub threshold: i32,
}

impl Default for FeatureParams {
    fn default() -> Self {
        Self {
            kind: FeatureKind::Lbp,
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl FeatureParams {
    pub fn new(kind: FeatureKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    pub fn with_threshold(mut self, threshold: i32) -> Self {
        self.threshold = threshold;
        self
    }
}
