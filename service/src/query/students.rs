//! [`Query`] collection related to the multiple [`Student`]s.

use common::operations::By;

use crate::domain::Student;
#[cfg(doc)]
use crate::Query;

use super::AuthorizedQuery;

/// Queries all the [`Student`]s, in the store's key order.
pub type List = AuthorizedQuery<By<Vec<Student>, ()>>;
