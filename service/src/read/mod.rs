//! Read entities definitions.

pub mod student;

pub use self::student::Roster;
