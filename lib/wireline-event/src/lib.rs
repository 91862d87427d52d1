//! Core measurement type for Wireline.
#![deny(warnings)]
#![deny(missing_docs)]

mod measurement;
pub use self::measurement::Measurement;

mod value;
pub use self::value::FieldValue;
