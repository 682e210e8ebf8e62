//! Client for the connector script running inside the emulator.
//!
//! The connector listens on a local TCP port. Each exchange is one line of
//! JSON carrying an array of requests, answered by one line of JSON carrying
//! an array of responses in the same order. Binary payloads are base64.

use crate::error::{Error, Result};
use crate::memory::{AddressRef, Guard, Port, Write};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::io::{self, BufRead, BufReader, Write as _};
use std::net::TcpStream;
use std::ops::RangeInclusive;
use std::time::Duration;

/// The ports the connector script may be listening on.
pub const DEFAULT_PORTS: RangeInclusive<u16> = 43055..=43059;

/// The connector script protocol version this client speaks.
pub const SCRIPT_VERSION: u32 = 1;

#[derive(Serialize, Debug)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
enum Request {
    System,
    Read {
        address: u32,
        size: usize,
        domain: &'static str,
    },
    Write {
        address: u32,
        value: String,
        domain: &'static str,
    },
    Guard {
        address: u32,
        expected_data: String,
        domain: &'static str,
    },
}

#[derive(Deserialize, Debug)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
enum Response {
    SystemResponse { value: String },
    ReadResponse { value: String },
    WriteResponse,
    GuardResponse { value: bool },
    Error { err: String },
}

fn unexpected_reason(response: Response) -> String {
    format!("unexpected response from connector: {:?}", response)
}

struct Connection {
    reader: BufReader<TcpStream>,
    writer: TcpStream,
}

/// A `Port` that talks to the emulator's connector script over TCP.
pub struct BridgeConnector {
    host: String,
    ports: RangeInclusive<u16>,
    timeout: Duration,
    connection: Option<Connection>,
}

impl BridgeConnector {
    pub fn new(host: &str) -> Self {
        BridgeConnector {
            host: host.to_string(),
            ports: DEFAULT_PORTS,
            timeout: Duration::from_secs(5),
            connection: None,
        }
    }

    /// Only look for the connector on the given ports.
    pub fn with_ports(mut self, ports: RangeInclusive<u16>) -> Self {
        self.ports = ports;
        self
    }

    #[cfg(test)]
    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    fn open(&self, port: u16) -> io::Result<Connection> {
        let writer = TcpStream::connect((self.host.as_str(), port))?;
        writer.set_read_timeout(Some(self.timeout))?;
        writer.set_nodelay(true)?;

        let reader = BufReader::new(writer.try_clone()?);

        Ok(Connection { reader, writer })
    }

    /// Send one line and wait for one line back.
    ///
    /// Any failure drops the connection; the next `connect` starts over.
    fn exchange_line(&mut self, line: &str) -> Result<String> {
        let connection = self
            .connection
            .as_mut()
            .ok_or_else(|| Error::ConnectionLost("not connected to the emulator".to_string()))?;

        let result = (|| -> io::Result<String> {
            connection.writer.write_all(line.as_bytes())?;
            connection.writer.write_all(b"\n")?;
            connection.writer.flush()?;

            let mut response = String::new();
            if connection.reader.read_line(&mut response)? == 0 {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "connector closed the connection",
                ));
            }

            Ok(response)
        })();

        result.map_err(|e| {
            self.connection = None;
            Error::ConnectionLost(e.to_string())
        })
    }

    /// Forget the connection after a response we cannot trust.
    fn drop_connection(&mut self, reason: String) -> Error {
        self.connection = None;
        Error::ConnectionLost(reason)
    }

    fn script_version(&mut self) -> Result<u32> {
        let line = self.exchange_line("VERSION")?;

        line.trim().parse().map_err(|_| {
            Error::ConnectionLost(format!("connector sent a bad version: {:?}", line.trim()))
        })
    }

    fn send_requests(&mut self, requests: &[Request]) -> Result<Vec<Response>> {
        let line = serde_json::to_string(requests)?;
        let response_line = self.exchange_line(&line)?;
        let responses: Vec<Response> = match serde_json::from_str(&response_line) {
            Ok(responses) => responses,
            Err(e) => {
                return Err(self.drop_connection(format!(
                    "malformed response from connector: {}",
                    e
                )))
            }
        };

        if responses.len() != requests.len() {
            return Err(self.drop_connection(format!(
                "sent {} requests but got {} responses",
                requests.len(),
                responses.len()
            )));
        }

        for response in responses.iter() {
            if let Response::Error { err } = response {
                return Err(self.drop_connection(err.clone()));
            }
        }

        Ok(responses)
    }
}

impl Port for BridgeConnector {
    fn connect(&mut self) -> Result<()> {
        if self.connection.is_some() {
            return Ok(());
        }

        for port in self.ports.clone() {
            match self.open(port) {
                Ok(connection) => {
                    self.connection = Some(connection);

                    match self.script_version() {
                        Ok(SCRIPT_VERSION) => {
                            info!("Connected to emulator on {}:{}", self.host, port);
                            return Ok(());
                        }
                        Ok(version) => {
                            self.connection = None;
                            return Err(Error::ConnectionLost(format!(
                                "connector script version {} is not supported, expected {}",
                                version, SCRIPT_VERSION
                            )));
                        }
                        Err(e) => debug!("Port {} did not answer like a connector: {}", port, e),
                    }
                }
                Err(e) => debug!("No connector on port {}: {}", port, e),
            }
        }

        Err(Error::ConnectionLost(format!(
            "no emulator connector listening on {} ports {}..={}",
            self.host,
            self.ports.start(),
            self.ports.end()
        )))
    }

    fn system(&mut self) -> Result<Option<String>> {
        match self.send_requests(&[Request::System])?.pop() {
            Some(Response::SystemResponse { value }) => Ok(Some(value)),
            Some(other) => Err(self.drop_connection(unexpected_reason(other))),
            None => Ok(None),
        }
    }

    fn read(&mut self, reads: &[AddressRef]) -> Result<Vec<Vec<u8>>> {
        if reads.is_empty() {
            return Ok(Vec::new());
        }

        let requests: Vec<Request> = reads
            .iter()
            .map(|r| Request::Read {
                address: r.offset(),
                size: r.length(),
                domain: r.domain().bridge_name(),
            })
            .collect();

        let responses = self.send_requests(&requests)?;
        let mut out = Vec::with_capacity(responses.len());
        for (range, response) in reads.iter().zip(responses) {
            let data = match response {
                Response::ReadResponse { value } => STANDARD.decode(value).map_err(|e| {
                    self.drop_connection(format!("malformed read response: {}", e))
                })?,
                other => return Err(self.drop_connection(unexpected_reason(other))),
            };

            if data.len() != range.length() {
                return Err(self.drop_connection(format!(
                    "asked for {} bytes at {:#x} but got {}",
                    range.length(),
                    range.offset(),
                    data.len()
                )));
            }

            out.push(data);
        }

        Ok(out)
    }

    fn write(&mut self, writes: &[Write]) -> Result<()> {
        if writes.is_empty() {
            return Ok(());
        }

        let requests: Vec<Request> = writes
            .iter()
            .map(|w| Request::Write {
                address: w.offset(),
                value: STANDARD.encode(w.data()),
                domain: w.domain().bridge_name(),
            })
            .collect();

        for response in self.send_requests(&requests)? {
            match response {
                Response::WriteResponse => {}
                other => return Err(self.drop_connection(unexpected_reason(other))),
            }
        }

        Ok(())
    }

    fn guard(&mut self, guards: &[Guard]) -> Result<bool> {
        if guards.is_empty() {
            return Ok(true);
        }

        let requests: Vec<Request> = guards
            .iter()
            .map(|g| Request::Guard {
                address: g.address().offset(),
                expected_data: STANDARD.encode(g.expected()),
                domain: g.address().domain().bridge_name(),
            })
            .collect();

        let mut all_hold = true;
        for response in self.send_requests(&requests)? {
            match response {
                Response::GuardResponse { value } => all_hold &= value,
                other => return Err(self.drop_connection(unexpected_reason(other))),
            }
        }

        Ok(all_hold)
    }
}
