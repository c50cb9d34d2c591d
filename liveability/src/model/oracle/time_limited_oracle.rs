use super::{OdDistance, OracleError, RoutingOracle};
use liveability_core::model::{Destination, OriginPoint};
use std::{sync::mpsc, sync::Arc, thread, time::Duration};
use uom::si::f64::Length;

/// bounds the wall-clock time of each solve. an expired call is reported as
/// [`OracleError::Timeout`] and its result, if it ever arrives, is discarded.
/// the solver thread is detached rather than killed, so an oracle that hangs
/// forever keeps its thread.
pub struct TimeLimitedOracle {
    inner: Arc<dyn RoutingOracle>,
    timeout: Duration,
}

impl TimeLimitedOracle {
    pub fn new(inner: Arc<dyn RoutingOracle>, timeout: Duration) -> TimeLimitedOracle {
        TimeLimitedOracle { inner, timeout }
    }

    /// solves with a destination set the caller already holds behind an
    /// `Arc`, so the solver thread shares it instead of copying it.
    pub fn solve_shared(
        &self,
        origins: &[OriginPoint],
        destinations: Arc<[Destination]>,
        cutoff: Length,
    ) -> Result<Vec<OdDistance>, OracleError> {
        let (tx, rx) = mpsc::channel();
        let inner = self.inner.clone();
        let origins = origins.to_vec();
        thread::Builder::new()
            .name(String::from("oracle-solve"))
            .spawn(move || {
                let result = inner.solve(&origins, &destinations, cutoff);
                // the receiver is gone when the call already timed out
                let _ = tx.send(result);
            })?;
        match rx.recv_timeout(self.timeout) {
            Ok(result) => result,
            Err(mpsc::RecvTimeoutError::Timeout) => {
                Err(OracleError::Timeout(self.inner.name(), self.timeout))
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(OracleError::SolveFailed(
                self.inner.name(),
                String::from("solver thread terminated without a result"),
            )),
        }
    }
}

impl RoutingOracle for TimeLimitedOracle {
    fn name(&self) -> String {
        self.inner.name()
    }

    fn solve(
        &self,
        origins: &[OriginPoint],
        destinations: &[Destination],
        cutoff: Length,
    ) -> Result<Vec<OdDistance>, OracleError> {
        self.solve_shared(origins, Arc::from(destinations), cutoff)
    }
}
