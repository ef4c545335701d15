// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of Tibberlox.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};

use anyhow::{Context, Result};
use tibberlox_types::Destination;
use tracing::{error, info};

/// Outcome of one round of sends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SendReport {
    pub sent: usize,
    pub failed: usize,
}

impl SendReport {
    pub fn all_failed(&self) -> bool {
        self.sent == 0 && self.failed > 0
    }
}

/// Send `payload` as one datagram to every destination.
///
/// A failing destination is logged and skipped. Only a socket that cannot be
/// opened is an error.
pub fn send_snapshot(destinations: &[Destination], payload: &str) -> Result<SendReport> {
    let socket = UdpSocket::bind("0.0.0.0:0").context("Failed to open UDP socket")?;
    let bytes = payload.as_bytes();
    let mut report = SendReport::default();

    for destination in destinations {
        match send_one(&socket, destination, bytes) {
            Ok(()) => {
                info!("📤 Sent {} bytes to {}", bytes.len(), destination);
                report.sent += 1;
            }
            Err(e) => {
                error!("Failed to send to {}: {:#}", destination, e);
                report.failed += 1;
            }
        }
    }

    Ok(report)
}

fn send_one(socket: &UdpSocket, destination: &Destination, bytes: &[u8]) -> Result<()> {
    let addr = resolve(destination)?;
    let written = socket
        .send_to(bytes, addr)
        .with_context(|| format!("send_to {addr} failed"))?;
    if written != bytes.len() {
        anyhow::bail!("short write: {written} of {} bytes", bytes.len());
    }
    Ok(())
}

fn resolve(destination: &Destination) -> Result<SocketAddr> {
    (destination.ip.as_str(), destination.port)
        .to_socket_addrs()
        .with_context(|| format!("Cannot resolve {destination}"))?
        .find(SocketAddr::is_ipv4)
        .with_context(|| format!("No IPv4 address for {destination}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_send_to_loopback() {
        let receiver = UdpSocket::bind("127.0.0.1:0").unwrap();
        receiver
            .set_read_timeout(Some(Duration::from_secs(2)))
            .unwrap();
        let port = receiver.local_addr().unwrap().port();

        let report = send_snapshot(&[Destination::new("127.0.0.1", port)], "{a:1,b:x}").unwrap();
        assert_eq!(report, SendReport { sent: 1, failed: 0 });

        let mut buf = [0_u8; 64];
        let (len, _) = receiver.recv_from(&mut buf).unwrap();
        assert_eq!(&buf[..len], b"{a:1,b:x}");
    }

    #[test]
    fn test_failed_destination_does_not_stop_others() {
        let receiver = UdpSocket::bind("127.0.0.1:0").unwrap();
        receiver
            .set_read_timeout(Some(Duration::from_secs(2)))
            .unwrap();
        let port = receiver.local_addr().unwrap().port();

        let destinations = [
            Destination::new("127.0.0.1", 0),
            Destination::new("127.0.0.1", port),
        ];
        let report = send_snapshot(&destinations, "{x:1}").unwrap();
        assert_eq!(report.failed, 1);
        assert_eq!(report.sent, 1);
        assert!(!report.all_failed());

        let mut buf = [0_u8; 16];
        let (len, _) = receiver.recv_from(&mut buf).unwrap();
        assert_eq!(&buf[..len], b"{x:1}");
    }
}
