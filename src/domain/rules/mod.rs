// Domain rules - Business logic and policies

use crate::domain::errors::*;
use crate::domain::model::*;

/// Format selection expressions handed to the downloader
pub struct FormatSelector;

impl FormatSelector {
    /// Best video under the tier's height cap plus best audio, falling back
    /// to the best single file when that combination is unavailable
    pub fn for_tier(tier: QualityTier) -> String {
        match tier.max_height() {
            Some(height) => format!("bestvideo[height<={}]+bestaudio/best", height),
            None => "bestvideo+bestaudio/best".to_string(),
        }
    }
}

/// Range after applying the source duration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedRange {
    pub range: TimeRange,
    pub clamped: bool,
}

/// Bounds checking of a crop against its source
pub struct RangeResolver;

impl RangeResolver {
    /// Fit `range` into a source of `duration` seconds.
    ///
    /// A start at or past the end is always out of bounds. An end past the
    /// end is clamped or rejected depending on `policy`. Without a known
    /// duration the range is passed through untouched.
    pub fn resolve(
        range: TimeRange,
        duration: Option<f64>,
        policy: RangePolicy,
    ) -> Result<ResolvedRange, TrimError> {
        let Some(duration) = duration.filter(|d| d.is_finite() && *d > 0.0) else {
            return Ok(ResolvedRange {
                range,
                clamped: false,
            });
        };

        if range.start().as_seconds() >= duration {
            return Err(TrimError::out_of_bounds(format!(
                "start {} is at or past the end of the video ({})",
                range.start(),
                TimeSpec::from_seconds(duration)
            )));
        }

        if range.end().as_seconds() <= duration {
            return Ok(ResolvedRange {
                range,
                clamped: false,
            });
        }

        match policy {
            RangePolicy::Clamp => {
                let clamped = TimeRange::new(range.start(), TimeSpec::from_seconds(duration))
                    .map_err(|e| TrimError::out_of_bounds(e.reason))?;
                Ok(ResolvedRange {
                    range: clamped,
                    clamped: true,
                })
            }
            RangePolicy::Reject => Err(TrimError::out_of_bounds(format!(
                "end {} is past the end of the video ({})",
                range.end(),
                TimeSpec::from_seconds(duration)
            ))),
        }
    }
}

/// Selection of the downloaded file among the work area's media
pub struct SourceSelector;

impl SourceSelector {
    /// First listed media file; the work area holds one download, so more
    /// than one candidate only happens if the downloader left extra files.
    pub fn pick(candidates: &[MediaFile]) -> Option<&MediaFile> {
        candidates.first()
    }
}

#[cfg(test)]
mod tests;
