//! Path segment validation for the redirect surface.
//!
//! Link codes are short lowercase hex-ish identifiers minted by the control
//! plane; rejecting anything else up front keeps garbage requests off the
//! cache and store.

use regex::Regex;
use std::sync::OnceLock;

fn link_code_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9]{4,12}$").expect("static regex"))
}

fn business_unit_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]{1,10}$").expect("static regex"))
}

/// Returns true if `code` has the shape of a minted link code.
pub fn is_valid_link_code(code: &str) -> bool {
    link_code_re().is_match(code)
}

/// Returns true if `bu` has the shape of a business unit identifier.
pub fn is_valid_business_unit(bu: &str) -> bool {
    business_unit_re().is_match(bu)
}
