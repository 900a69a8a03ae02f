//! Rewrite passes, run in fixed order by [`crate::driver`]:
//! normalize → return-capture → extract → drive → captures → preamble.

pub mod capture_vars;
pub mod control_driver;
pub mod extractor;
pub mod normalize;
pub mod preamble;
pub mod return_capture;
