//! Helpers for joining terminating tasks

use tokio::task::JoinError;

pub(crate) fn propagate_panics(result: Result<(), JoinError>) {
    match result {
        // Finished or aborted
        Ok(()) => (),
        Err(err) if err.is_cancelled() => (),
        Err(err) if err.is_panic() => {
            std::panic::resume_unwind(err.into_panic());
        }
        Err(err) => {
            panic!("Unexpected join error for background task: {err}");
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn cancellation_is_quiet() {
        let handle = tokio::task::spawn(std::future::pending::<()>());
        handle.abort();
        propagate_panics(handle.await);
    }

    #[tokio::test]
    #[should_panic(expected = "worker failed")]
    async fn panics_are_resumed() {
        let handle = tokio::task::spawn(async { panic!("worker failed") });
        propagate_panics(handle.await);
    }
}
