//! Domain definitions.

pub mod access;
pub mod challenge;
pub mod pricing;
pub mod session;
pub mod student;

pub use self::{
    challenge::Challenge, pricing::Bill, session::Session, student::Student,
};
