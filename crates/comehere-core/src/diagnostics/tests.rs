use crate::span::Span;

use super::*;

#[test]
fn severity_display() {
    assert_eq!(format!("{}", Severity::Error), "error");
    assert_eq!(format!("{}", Severity::Warning), "warning");
    assert_eq!(format!("{}", Severity::Info), "info");
}

#[test]
fn error_builder() {
    let mut diagnostics = Diagnostics::new();
    diagnostics.error("test error", Span::new(0, 5)).emit();

    assert_eq!(diagnostics.len(), 1);
    assert!(diagnostics.has_errors());
    assert!(!diagnostics.has_warnings());
}

#[test]
fn warning_builder() {
    let mut diagnostics = Diagnostics::new();
    diagnostics.warning("test warning", Span::new(0, 5)).emit();

    assert_eq!(diagnostics.len(), 1);
    assert!(!diagnostics.has_errors());
    assert!(diagnostics.has_warnings());
}

#[test]
fn info_builder_does_not_count_as_error_or_warning() {
    let mut diagnostics = Diagnostics::new();
    diagnostics.info("fyi", Span::new(0, 1)).emit();

    assert_eq!(diagnostics.len(), 1);
    assert!(!diagnostics.has_errors());
    assert!(!diagnostics.has_warnings());
}

#[test]
fn builder_with_related() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .error("primary", Span::new(0, 5))
        .related_to("related info", Span::new(6, 10))
        .emit();

    let result = diagnostics.printer().render();
    assert!(result.contains("primary"));
    assert!(result.contains("related info"));
}

#[test]
fn builder_with_fix() {
    let mut diagnostics = Diagnostics::new();
    diagnostics
        .error("fixable", Span::new(0, 5))
        .fix("apply this fix", "fixed")
        .emit();

    let result = diagnostics.printer().render();
    assert!(result.contains("fixable"));
    assert!(result.contains("apply this fix"));
}

#[test]
fn printer_colored() {
    let mut diagnostics = Diagnostics::new();
    diagnostics.error("test", Span::new(0, 5)).emit();

    let result = diagnostics.printer().colored(true).render();
    assert!(result.contains("test"));
    assert!(result.contains('\x1b'));
}

#[test]
fn printer_empty_diagnostics() {
    let diagnostics = Diagnostics::new();
    assert!(diagnostics.printer().render().is_empty());
}

#[test]
fn printer_multiple_diagnostics() {
    let mut diagnostics = Diagnostics::new();
    diagnostics.error("first error", Span::new(0, 5)).emit();
    diagnostics.error("second error", Span::new(6, 10)).emit();

    let result = diagnostics.printer().render();
    assert!(result.contains("first error"));
    assert!(result.contains("second error"));
    assert_eq!(result.lines().count(), 2);
}

#[test]
fn diagnostics_collection_methods() {
    let mut diagnostics = Diagnostics::new();
    diagnostics.error("error", Span::empty(0)).emit();
    diagnostics.warning("warning", Span::empty(1)).emit();

    assert!(!diagnostics.is_empty());
    assert_eq!(diagnostics.len(), 2);
    assert!(diagnostics.has_errors());
    assert!(diagnostics.has_warnings());
    assert_eq!(diagnostics.error_count(), 1);
    assert_eq!(diagnostics.warning_count(), 1);
}

#[test]
fn extend_merges_messages() {
    let mut a = Diagnostics::new();
    a.error("a", Span::empty(0)).emit();

    let mut b = Diagnostics::new();
    b.warning("b", Span::empty(0)).emit();

    a.extend(b);
    assert_eq!(a.len(), 2);
}
