//! shared fixtures: a file-backed store and a routing oracle whose answer for
//! each origin is scripted.
#![allow(dead_code)]

use liveability::model::{
    oracle::{OdDistance, OracleError, RoutingOracle, RoutingOracleBuilder},
    store::Store,
};
use liveability_core::model::{
    distance, CategoryCode, Destination, DestinationCategory, DestinationId, OriginId,
    OriginPoint, PartitionId,
};
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    thread,
    time::Duration,
};
use uom::si::f64::Length;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Script {
    /// every destination at this many meters
    Distance(f64),
    NoPath,
    Fail,
    /// sleeps this many milliseconds, then finds no path
    Stall(u64),
}

/// answers every destination with the origin's scripted behaviour. a call
/// containing any failing origin fails as a whole. the script can be changed
/// between runs and calls are counted per origin.
#[derive(Clone, Default)]
pub struct ScriptedOracle {
    pub script: Arc<Mutex<HashMap<String, Script>>>,
    pub calls: Arc<Mutex<HashMap<String, usize>>>,
    pub total_calls: Arc<AtomicUsize>,
}

impl ScriptedOracle {
    pub fn new(script: &[(&str, Script)]) -> ScriptedOracle {
        let oracle = ScriptedOracle::default();
        for (origin, s) in script.iter() {
            oracle.set(origin, *s);
        }
        oracle
    }

    pub fn set(&self, origin: &str, script: Script) {
        self.script
            .lock()
            .expect("script lock")
            .insert(origin.to_string(), script);
    }

    pub fn calls_for(&self, origin: &str) -> usize {
        self.calls
            .lock()
            .expect("calls lock")
            .get(origin)
            .copied()
            .unwrap_or(0)
    }

    pub fn builder(&self) -> Arc<dyn RoutingOracleBuilder> {
        let oracle = self.clone();
        Arc::new(move || -> Result<Arc<dyn RoutingOracle>, OracleError> {
            Ok(Arc::new(oracle.clone()))
        })
    }
}

impl RoutingOracle for ScriptedOracle {
    fn name(&self) -> String {
        String::from("scripted")
    }

    fn solve(
        &self,
        origins: &[OriginPoint],
        destinations: &[Destination],
        cutoff: Length,
    ) -> Result<Vec<OdDistance>, OracleError> {
        self.total_calls.fetch_add(1, Ordering::SeqCst);
        {
            let mut calls = self.calls.lock().expect("calls lock");
            for o in origins.iter() {
                *calls.entry(o.id.to_string()).or_insert(0) += 1;
            }
        }
        let script = self.script.lock().expect("script lock").clone();
        let mut pairs = vec![];
        for o in origins.iter() {
            match script.get(o.id.as_str()).copied().unwrap_or(Script::NoPath) {
                Script::Fail => {
                    return Err(OracleError::SolveFailed(
                        self.name(),
                        format!("solver error at origin {}", o.id),
                    ))
                }
                Script::NoPath => {}
                Script::Stall(millis) => thread::sleep(Duration::from_millis(millis)),
                Script::Distance(m) => {
                    if m <= distance::to_meters(&cutoff) {
                        for d in destinations.iter() {
                            pairs.push(OdDistance::new(
                                o.id.clone(),
                                d.id.clone(),
                                distance::from_meters(m),
                            ));
                        }
                    }
                }
            }
        }
        Ok(pairs)
    }
}

pub fn supermarket() -> DestinationCategory {
    DestinationCategory {
        code: CategoryCode::from("supermarket"),
        name: String::from("Supermarket"),
        domain: String::from("food"),
        cutoff_closest: distance::from_meters(1000.0),
        cutoff_count: distance::from_meters(1000.0),
        sources: vec![],
    }
}

/// a store file in `dir` holding `origins` as (id, partition) and one
/// supermarket.
pub fn seed_store(dir: &tempfile::TempDir, origins: &[(&str, &str)]) -> String {
    let database = dir.path().join("liveability.db").to_string_lossy().to_string();
    let store = Store::open(&database).expect("open store");
    store.ensure_schema().expect("schema");
    let points = origins
        .iter()
        .map(|(id, partition)| {
            OriginPoint::new(
                OriginId::from(*id),
                geo::Point::new(144.96, -37.81),
                PartitionId::from(*partition),
            )
        })
        .collect::<Vec<_>>();
    store.upsert_origins(&points).expect("origins");
    store
        .upsert_destinations(&[Destination {
            id: DestinationId::from("s1"),
            source: String::from("supermarket"),
            coordinate: geo::Point::new(144.961, -37.811),
        }])
        .expect("destinations");
    database
}
