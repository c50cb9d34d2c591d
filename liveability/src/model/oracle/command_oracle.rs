use super::{OdDistance, OracleError, RoutingOracle};
use liveability_core::model::{distance, Destination, DestinationId, OriginId, OriginPoint};
use serde::{Deserialize, Serialize};
use geo::Geometry;
use std::{
    io::{self, Read, Write},
    process::{Child, Command, ExitStatus, Stdio},
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};
use uom::si::f64::Length;
use wkt::TryFromWkt;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// delegates each solve to an external routing program. the request is
/// written as JSON to the program's stdin and the reply read as JSON from its
/// stdout:
///
/// ```json
/// {"cutoff_m": 1600.0, "origins": [{"id": "A", "x": 144.96, "y": -37.81}], "destinations": [...]}
/// ```
///
/// replies are an array of `{"origin_id", "destination_id", "distance_m", "geometry"}`
/// where `distance_m` may be null and `geometry` is optional WKT. a non-zero
/// exit status fails the call.
///
/// stdin is fed and stdout/stderr drained on their own threads, so a program
/// may write any amount of output while it is still reading. with a timeout
/// set, a program still running at the deadline is killed.
#[derive(Debug, Clone)]
pub struct CommandOracle {
    pub program: String,
    pub args: Vec<String>,
    pub timeout: Option<Duration>,
}

#[derive(Serialize)]
struct SolveRequest<'a> {
    cutoff_m: f64,
    origins: Vec<RequestPoint<'a>>,
    destinations: Vec<RequestPoint<'a>>,
}

#[derive(Serialize)]
struct RequestPoint<'a> {
    id: &'a str,
    x: f64,
    y: f64,
}

#[derive(Deserialize)]
struct SolveReply {
    origin_id: String,
    destination_id: String,
    distance_m: Option<f64>,
    #[serde(default)]
    geometry: Option<String>,
}

impl CommandOracle {
    pub fn new(program: String, args: Vec<String>) -> CommandOracle {
        CommandOracle {
            program,
            args,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> CommandOracle {
        self.timeout = timeout;
        self
    }

    /// runs the program on `body` and returns its stdout. only a successful
    /// exit yields output.
    fn execute(&self, body: Vec<u8>) -> Result<Vec<u8>, OracleError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;
        let (Some(mut stdin), Some(stdout), Some(stderr)) =
            (child.stdin.take(), child.stdout.take(), child.stderr.take())
        else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(OracleError::SolveFailed(
                self.name(),
                String::from("pipes of routing program unavailable"),
            ));
        };

        let writer = thread::spawn(move || stdin.write_all(&body));
        let stdout = drain(stdout);
        let stderr = drain(stderr);

        let status = self.wait(&mut child)?;
        // a program that exits without reading all of its input closes the pipe
        match join(writer)? {
            Err(e) if e.kind() != io::ErrorKind::BrokenPipe => return Err(e.into()),
            _ => {}
        }
        let stdout = join(stdout)??;
        let stderr = join(stderr)??;
        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr);
            return Err(OracleError::SolveFailed(
                self.name(),
                format!("exited with {}: {}", status, stderr.trim()),
            ));
        }
        Ok(stdout)
    }

    /// waits for the program to exit, killing it once the timeout expires.
    /// the pipe threads of a killed program are left to finish on their own.
    fn wait(&self, child: &mut Child) -> Result<ExitStatus, OracleError> {
        let Some(timeout) = self.timeout else {
            return Ok(child.wait()?);
        };
        let start = Instant::now();
        loop {
            if let Some(status) = child.try_wait()? {
                return Ok(status);
            }
            if start.elapsed() >= timeout {
                log::warn!(
                    "killing {} (pid {}) after {:?}",
                    self.name(),
                    child.id(),
                    timeout
                );
                let _ = child.kill();
                let _ = child.wait();
                return Err(OracleError::Timeout(self.name(), timeout));
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> JoinHandle<io::Result<Vec<u8>>> {
    thread::spawn(move || {
        let mut buf = vec![];
        pipe.read_to_end(&mut buf)?;
        Ok(buf)
    })
}

fn join<T>(handle: JoinHandle<T>) -> Result<T, OracleError> {
    handle.join().map_err(|_| {
        OracleError::SolveFailed(
            String::from("command"),
            String::from("routing program pipe thread panicked"),
        )
    })
}

impl RoutingOracle for CommandOracle {
    fn name(&self) -> String {
        format!("command({})", self.program)
    }

    fn solve(
        &self,
        origins: &[OriginPoint],
        destinations: &[Destination],
        cutoff: Length,
    ) -> Result<Vec<OdDistance>, OracleError> {
        let request = SolveRequest {
            cutoff_m: distance::to_meters(&cutoff),
            origins: origins
                .iter()
                .map(|o| RequestPoint {
                    id: o.id.as_str(),
                    x: o.coordinate.x(),
                    y: o.coordinate.y(),
                })
                .collect(),
            destinations: destinations
                .iter()
                .map(|d| RequestPoint {
                    id: d.id.as_str(),
                    x: d.coordinate.x(),
                    y: d.coordinate.y(),
                })
                .collect(),
        };
        let body = serde_json::to_vec(&request)?;
        let stdout = self.execute(body)?;

        let replies: Vec<SolveReply> = serde_json::from_slice(&stdout)?;
        replies
            .into_iter()
            .map(|r| {
                let geometry = match r.geometry {
                    None => None,
                    Some(text) => Some(Geometry::try_from_wkt_str(&text).map_err(|e| {
                        OracleError::SolveFailed(self.name(), format!("invalid geometry: {e}"))
                    })?),
                };
                Ok(OdDistance {
                    origin_id: OriginId(r.origin_id),
                    destination_id: DestinationId(r.destination_id),
                    distance: r.distance_m.map(distance::from_meters),
                    geometry,
                })
            })
            .collect()
    }
}
