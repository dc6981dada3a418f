//! [`Query`] definition.

pub mod students;

use common::operations::{Authorize, By, Select};
use tracerr::Traced;

use crate::{
    domain::session,
    infra::{database, Database},
    Service,
};

/// [`Query`] of the [`Service`].
pub use common::Handler as Query;

/// [`Query`] [`Select`]ing a `T`ype from a [`Database`] on behalf of a
/// [`session::Token`].
#[derive(Clone, Debug)]
#[expect(clippy::module_name_repetitions, reason = "more readable")]
pub struct AuthorizedQuery<T> {
    /// [`session::Token`] authorizing the [`Select`]ion.
    token: session::Token,

    /// Selector of the value.
    by: T,
}

impl<W, B> AuthorizedQuery<By<W, B>> {
    /// Creates a new [`AuthorizedQuery`] selecting a `W` by the provided `B`
    /// on behalf of the provided [`session::Token`].
    #[must_use]
    pub fn by(token: session::Token, by: B) -> Self {
        Self {
            token,
            by: By::new(by),
        }
    }
}

impl<Db, W, B> Query<AuthorizedQuery<By<W, B>>> for Service<Db>
where
    Db: Database<
        Authorize<session::Token>,
        Ok: Database<Select<By<W, B>>, Ok = W, Err = Traced<database::Error>>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = W;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        AuthorizedQuery { token, by }: AuthorizedQuery<By<W, B>>,
    ) -> Result<Self::Ok, Self::Err> {
        self.database()
            .execute(Authorize(token))
            .await
            .map_err(tracerr::wrap!())?
            .execute(Select(by))
            .await
            .map_err(tracerr::wrap!())
    }
}
