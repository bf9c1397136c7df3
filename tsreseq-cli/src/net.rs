//! Datagram sources

use anyhow::{Context, Result};
use socket2::{Domain, Protocol, SockAddr, Socket, Type};
use std::io;
use std::net::{Ipv4Addr, SocketAddrV4, UdpSocket};
use tracing::{debug, info, warn};

/// Receive buffer requested from the kernel; bursts arrive faster than they are written
pub const RECV_BUFFER_SIZE: usize = 1 << 30;

/// Anything that yields one datagram per call
pub trait DatagramSource {
    /// Receive one datagram into `buf`, returning its length
    fn recv_datagram(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}

impl DatagramSource for UdpSocket {
    fn recv_datagram(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.recv_from(buf).map(|(len, _from)| len)
    }
}

/// Set address reuse and a large receive buffer
///
/// Failures are logged and the socket is used as-is.
pub fn tune_socket(socket: &Socket) {
    if let Err(e) = socket.set_reuse_address(true) {
        warn!("Failed to set SO_REUSEADDR: {}", e);
    }

    match socket.set_recv_buffer_size(RECV_BUFFER_SIZE) {
        Ok(()) => {
            if let Ok(size) = socket.recv_buffer_size() {
                debug!("Receive buffer is {} bytes", size);
            }
        }
        Err(e) => warn!("Failed to set SO_RCVBUF to {} bytes: {}", RECV_BUFFER_SIZE, e),
    }
}

/// Bind to `group:port` and join the group when it is a multicast address
///
/// Binding to the group address keeps unrelated traffic for the same port
/// out. A unicast address is bound as-is.
pub fn open_socket(group: Ipv4Addr, port: u16) -> Result<UdpSocket> {
    let addr = SocketAddrV4::new(group, port);

    let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))
        .context("Failed to create UDP socket")?;
    tune_socket(&socket);
    socket
        .bind(&SockAddr::from(addr))
        .with_context(|| format!("Failed to bind UDP socket to {}", addr))?;

    if group.is_multicast() {
        socket
            .join_multicast_v4(&group, &Ipv4Addr::UNSPECIFIED)
            .with_context(|| format!("Failed to join multicast group {}", group))?;
        info!("Joined multicast group {} on port {}", group, port);
    } else {
        debug!("{} is not a multicast address, listening without joining", group);
        info!("Listening on {}", addr);
    }

    Ok(socket.into())
}

/// Parse a dotted-quad group address
pub fn parse_group(group: &str) -> Result<Ipv4Addr> {
    group
        .parse()
        .with_context(|| format!("Invalid IPv4 address: {}", group))
}
