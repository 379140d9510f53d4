//! Built-in exchange calendars.

mod xetr;
mod xlon;

pub use xetr::xetr;
pub use xlon::xlon;
