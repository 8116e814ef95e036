//! Key switching between LWE parameter sets.

pub mod setup;
pub mod switch;

pub use setup::KeySwitchKey;
pub use switch::keyswitch;
