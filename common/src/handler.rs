//! [`Handler`] abstractions.
//!
//! A single type may implement [`Handler`] for many argument types: the
//! argument picks the implementation, so `service.execute(CreateStudent {..})`
//! and `service.execute(DeleteStudent {..})` resolve to different handlers of
//! the same service.

use std::future::Future;

/// Asynchronous operation executable with `Args`.
pub trait Handler<Args = ()> {
    /// Type of successful [`Handler`] result.
    type Ok;

    /// Type of this [`Handler`] error.
    type Err;

    /// Executes this [`Handler`] with the provided `Args`.
    fn execute(
        &self,
        args: Args,
    ) -> impl Future<Output = Result<Self::Ok, Self::Err>>;
}

#[cfg(test)]
mod spec {
    use std::{cell::Cell, convert::Infallible};

    use super::Handler;

    #[derive(Debug, Default)]
    struct Counter(Cell<u32>);

    struct Add(u32);

    struct Get;

    impl Handler<Add> for Counter {
        type Ok = ();
        type Err = Infallible;

        async fn execute(&self, Add(n): Add) -> Result<(), Infallible> {
            self.0.set(self.0.get() + n);
            Ok(())
        }
    }

    impl Handler<Get> for Counter {
        type Ok = u32;
        type Err = Infallible;

        async fn execute(&self, _: Get) -> Result<u32, Infallible> {
            Ok(self.0.get())
        }
    }

    #[tokio::test]
    async fn dispatches_by_argument_type() {
        let counter = Counter::default();

        counter.execute(Add(2)).await.unwrap();
        counter.execute(Add(3)).await.unwrap();

        assert_eq!(counter.execute(Get).await, Ok(5));
    }
}
