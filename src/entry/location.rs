//! Call-site resolution for envelopes.

use std::panic::Location;

use crate::transport::envelope::SourceLocation;

/// Resolves the call site of an entry point.
///
/// Entry points are `#[track_caller]`, so the compiler hands over the caller's
/// location; a locator decides what, if anything, to report.
pub trait CallerLocator: Send + Sync {
    fn locate(&self, caller: &'static Location<'static>) -> Option<SourceLocation>;
}

/// Report the caller's file, line and column.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrackCaller;

impl CallerLocator for TrackCaller {
    fn locate(&self, caller: &'static Location<'static>) -> Option<SourceLocation> {
        Some(SourceLocation {
            file: caller.file().to_string(),
            line: caller.line(),
            column: caller.column(),
        })
    }
}

/// Never report a location.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLocation;

impl CallerLocator for NoLocation {
    fn locate(&self, _caller: &'static Location<'static>) -> Option<SourceLocation> {
        None
    }
}
