//! Encoder selection by [`FeatureKind`].
use crate::csltp::compute_csltp;
use crate::haar::compute_haar;
use crate::image::{GrayPlane, ImageView};
use crate::lbp::compute_lbp;
use crate::ltp::compute_ltp;
use crate::{FeatureKind, FeatureParams};
#[cfg(feature = "tracing")]
use tracing::instrument;

/// Encoded feature vector plus the length the selected descriptor should have.
#[derive(Clone, Debug, PartialEq)]
pub struct Features {
    pub kind: FeatureKind,
    pub values: Vec<f32>,
    /// Canonical length for histogram kinds, `(w-4)*(h-4)` for Haar.
    pub expected_len: usize,
}

impl Features {
    /// `true` when the encoder produced a vector of the expected length.
    ///
    /// An empty or short vector means the input could not be encoded
    /// (unsupported channel count, image too small) and the sample should be
    /// skipped.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.expected_len > 0 && self.values.len() == self.expected_len
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Run the encoder selected by `params.kind` over `img`.
#[cfg_attr(
    feature = "tracing",
    instrument(
        level = "debug",
        skip(img),
        fields(kind = %params.kind, w = img.width(), h = img.height())
    )
)]
pub fn extract(img: &ImageView<'_>, params: &FeatureParams) -> Features {
    let expected_len = params.kind.expected_len(img.width(), img.height());
    let values = match params.kind {
        FeatureKind::Lbp => compute_lbp(img),
        FeatureKind::Ltp => compute_ltp(img, params.threshold),
        FeatureKind::CsLtp => compute_csltp(img, params.threshold),
        FeatureKind::Haar => compute_haar(img).0,
    };
    Features {
        kind: params.kind,
        values,
        expected_len,
    }
}

/// Grayscale conversion that logs instead of failing on unsupported input.
pub(crate) fn gray_or_warn(img: &ImageView<'_>) -> Option<GrayPlane> {
    let gray = img.to_gray();
    if gray.is_none() {
        #[cfg(feature = "tracing")]
        tracing::warn!(
            channels = img.channels(),
            "unsupported channel count, descriptor left empty"
        );
    }
    gray
}
