// Unit tests for business rules

use super::*;

fn range(start: f64, end: f64) -> TimeRange {
    TimeRange::new(TimeSpec::from_seconds(start), TimeSpec::from_seconds(end)).unwrap()
}

#[test]
fn test_format_selector_caps_height() {
    assert_eq!(
        FormatSelector::for_tier(QualityTier::P720),
        "bestvideo[height<=720]+bestaudio/best"
    );
    assert_eq!(
        FormatSelector::for_tier(QualityTier::P2160),
        "bestvideo[height<=2160]+bestaudio/best"
    );
    assert_eq!(
        FormatSelector::for_tier(QualityTier::P360),
        "bestvideo[height<=360]+bestaudio/best"
    );
}

#[test]
fn test_format_selector_best_has_no_cap() {
    let selector = FormatSelector::for_tier(QualityTier::Best);
    assert_eq!(selector, "bestvideo+bestaudio/best");
    assert!(!selector.contains("height"));
}

#[test]
fn test_resolve_inside_source() {
    let resolved = RangeResolver::resolve(range(0.0, 10.0), Some(60.0), RangePolicy::Clamp).unwrap();
    assert_eq!(resolved.range, range(0.0, 10.0));
    assert!(!resolved.clamped);
}

#[test]
fn test_resolve_end_exactly_at_duration() {
    let resolved = RangeResolver::resolve(range(50.0, 60.0), Some(60.0), RangePolicy::Reject).unwrap();
    assert!(!resolved.clamped);
}

#[test]
fn test_resolve_clamps_end() {
    let resolved = RangeResolver::resolve(range(50.0, 90.0), Some(60.0), RangePolicy::Clamp).unwrap();
    assert_eq!(resolved.range, range(50.0, 60.0));
    assert!(resolved.clamped);
}

#[test]
fn test_resolve_rejects_end_under_reject_policy() {
    let err = RangeResolver::resolve(range(50.0, 90.0), Some(60.0), RangePolicy::Reject).unwrap_err();
    assert_eq!(err.kind, TrimErrorKind::RangeOutOfBounds);
}

#[test]
fn test_resolve_start_past_end_always_fails() {
    for policy in [RangePolicy::Clamp, RangePolicy::Reject] {
        let err = RangeResolver::resolve(range(60.0, 70.0), Some(60.0), policy).unwrap_err();
        assert_eq!(err.kind, TrimErrorKind::RangeOutOfBounds);
    }
}

#[test]
fn test_resolve_unknown_duration_passes_through() {
    let resolved = RangeResolver::resolve(range(100.0, 200.0), None, RangePolicy::Reject).unwrap();
    assert_eq!(resolved.range, range(100.0, 200.0));

    let resolved = RangeResolver::resolve(range(100.0, 200.0), Some(f64::NAN), RangePolicy::Reject).unwrap();
    assert!(!resolved.clamped);
}

#[test]
fn test_source_selector_takes_first() {
    let files = vec![
        MediaFile::from_path("/w/b.webm").unwrap(),
        MediaFile::from_path("/w/a.mp4").unwrap(),
    ];
    assert_eq!(SourceSelector::pick(&files).unwrap().file_name(), "b.webm");
    assert!(SourceSelector::pick(&[]).is_none());
}
