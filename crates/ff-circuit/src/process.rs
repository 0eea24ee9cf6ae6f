//! Session backed by an external solver process speaking a line protocol.
//!
//! Requests, one per line on the solver's stdin:
//! `CMD <text>`, `SOLVE`, `NODES`, `BUSV <bus>`, `CURRENTS <Class.name>`,
//! `POWERS <Class.name>`, `QUIT`.
//!
//! Replies on stdout: `OK`, `ERR <message>`, `VALS <f64...>`; `NODES` answers with
//! `NODE <name> <pu> <km>` lines closed by `END`.

use std::ffi::OsStr;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use tracing::{debug, warn};

use crate::element::{BusRef, ElementRef};
use crate::error::{CircuitError, CircuitResult};
use crate::session::{NodeVoltage, SolverSession};

#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Ok,
    Err(String),
    Vals(Vec<f64>),
    Node(NodeVoltage),
    End,
}

pub fn parse_reply(line: &str) -> CircuitResult<Reply> {
    let line = line.trim_end_matches(['\r', '\n']);
    let (head, rest) = line.split_once(' ').unwrap_or((line, ""));
    match head {
        "OK" => Ok(Reply::Ok),
        "END" => Ok(Reply::End),
        "ERR" => Ok(Reply::Err(rest.trim().to_string())),
        "VALS" => rest
            .split_whitespace()
            .map(|v| {
                v.parse::<f64>()
                    .map_err(|_| CircuitError::protocol(format!("bad value '{v}' in '{line}'")))
            })
            .collect::<CircuitResult<Vec<_>>>()
            .map(Reply::Vals),
        "NODE" => {
            let fields: Vec<&str> = rest.split_whitespace().collect();
            let [node, pu, km] = fields[..] else {
                return Err(CircuitError::protocol(format!("malformed node line '{line}'")));
            };
            let number = |v: &str| {
                v.parse::<f64>()
                    .map_err(|_| CircuitError::protocol(format!("bad value '{v}' in '{line}'")))
            };
            Ok(Reply::Node(NodeVoltage {
                node: node.to_string(),
                pu: number(pu)?,
                distance_km: number(km)?,
            }))
        }
        _ => Err(CircuitError::protocol(format!("unexpected reply '{line}'"))),
    }
}

pub struct ProcessSession {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    closed: bool,
}

impl ProcessSession {
    pub fn spawn<S: AsRef<OsStr>>(program: S, args: &[String]) -> CircuitResult<Self> {
        let program = program.as_ref();
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| CircuitError::Process {
                message: format!("failed to start {}: {e}", program.to_string_lossy()),
            })?;
        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            return Err(CircuitError::Process {
                message: "solver pipes unavailable".to_string(),
            });
        };
        debug!(program = %program.to_string_lossy(), "solver process started");
        Ok(Self {
            child,
            stdin,
            stdout: BufReader::new(stdout),
            closed: false,
        })
    }

    fn request(&mut self, line: &str) -> CircuitResult<Reply> {
        writeln!(self.stdin, "{line}")?;
        self.stdin.flush()?;
        self.reply()
    }

    fn reply(&mut self) -> CircuitResult<Reply> {
        let mut line = String::new();
        if self.stdout.read_line(&mut line)? == 0 {
            return Err(CircuitError::protocol("solver closed its output"));
        }
        parse_reply(&line)
    }

    fn expect_ok(&mut self, request: &str, command: &str) -> CircuitResult<()> {
        match self.request(request)? {
            Reply::Ok => Ok(()),
            Reply::Err(message) => Err(CircuitError::Rejected {
                command: command.to_string(),
                message,
            }),
            other => Err(CircuitError::protocol(format!(
                "expected OK for '{command}', got {other:?}"
            ))),
        }
    }

    fn expect_values(&mut self, request: &str) -> CircuitResult<Vec<f64>> {
        match self.request(request)? {
            Reply::Vals(values) => Ok(values),
            Reply::Err(message) => Err(CircuitError::Rejected {
                command: request.to_string(),
                message,
            }),
            other => Err(CircuitError::protocol(format!(
                "expected VALS for '{request}', got {other:?}"
            ))),
        }
    }
}

impl SolverSession for ProcessSession {
    fn command(&mut self, text: &str) -> CircuitResult<()> {
        self.expect_ok(&format!("CMD {text}"), text)
    }

    fn solve(&mut self) -> CircuitResult<()> {
        self.expect_ok("SOLVE", "solve")
    }

    fn node_voltages(&mut self) -> CircuitResult<Vec<NodeVoltage>> {
        let mut nodes = Vec::new();
        let mut reply = self.request("NODES")?;
        loop {
            match reply {
                Reply::Node(node) => nodes.push(node),
                Reply::End => return Ok(nodes),
                Reply::Err(message) => {
                    return Err(CircuitError::Rejected {
                        command: "NODES".to_string(),
                        message,
                    });
                }
                other => {
                    return Err(CircuitError::protocol(format!(
                        "unexpected {other:?} in node listing"
                    )));
                }
            }
            reply = self.reply()?;
        }
    }

    fn bus_voltages(&mut self, bus: &BusRef) -> CircuitResult<Vec<f64>> {
        self.expect_values(&format!("BUSV {bus}"))
    }

    fn currents(&mut self, element: &ElementRef) -> CircuitResult<Vec<f64>> {
        self.expect_values(&format!("CURRENTS {element}"))
    }

    fn powers(&mut self, element: &ElementRef) -> CircuitResult<Vec<f64>> {
        self.expect_values(&format!("POWERS {element}"))
    }

    fn close(mut self) -> CircuitResult<()> {
        self.expect_ok("QUIT", "quit")?;
        self.closed = true;
        let status = self.child.wait()?;
        if !status.success() {
            return Err(CircuitError::Process {
                message: format!("solver exited with {status}"),
            });
        }
        Ok(())
    }
}

impl Drop for ProcessSession {
    fn drop(&mut self) {
        if !self.closed {
            if let Err(e) = self.child.kill() {
                warn!("failed to stop solver process: {e}");
            }
            let _ = self.child.wait();
        }
    }
}
