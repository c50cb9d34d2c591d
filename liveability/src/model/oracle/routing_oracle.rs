use super::{OdDistance, OracleError};
use liveability_core::model::{Destination, OriginPoint};
use std::sync::Arc;
use uom::si::f64::Length;

/// a shortest network distance solver. given origin and destination sets and
/// a distance cutoff, returns the distance of each reachable pair.
///
/// an oracle call blocks its caller for the full solve. returning zero pairs
/// is a valid answer (nothing reachable); an `Err` fails the whole call.
pub trait RoutingOracle: Send + Sync {
    /// name used in logs and errors
    fn name(&self) -> String;

    fn solve(
        &self,
        origins: &[OriginPoint],
        destinations: &[Destination],
        cutoff: Length,
    ) -> Result<Vec<OdDistance>, OracleError>;
}

/// creates oracle sessions. the driver asks for one session per worker; a
/// builder over a read-only backend may hand every worker the same one.
pub trait RoutingOracleBuilder: Send + Sync {
    fn build(&self) -> Result<Arc<dyn RoutingOracle>, OracleError>;
}

impl<F> RoutingOracleBuilder for F
where
    F: Fn() -> Result<Arc<dyn RoutingOracle>, OracleError> + Send + Sync,
{
    fn build(&self) -> Result<Arc<dyn RoutingOracle>, OracleError> {
        self()
    }
}
