// Rust Evonode Library
// Written in 2024 by
//     The Evonode Core Developers
//
// To the extent possible under law, the author(s) have dedicated all
// copyright and related and neighboring rights to this software to
// the public domain worldwide. This software is distributed without
// any warranty.
//
// You should have received a copy of the CC0 Public Domain Dedication
// along with this software.
// If not, see <http://creativecommons.org/publicdomain/zero/1.0/>.
//

//! Masternode service addresses.
//!
//! The address a masternode operator advertises for its online service.
//! Only IPv4 is supported; the wire format stores the address in the last
//! four bytes of a 16-byte IPv6-mapped array, followed by the port with its
//! bytes swapped (a network-order holdover).

use std::fmt;
use std::io::{self, Write};
use std::net::Ipv4Addr;

use crate::consensus::{Decodable, Encodable, encode};

/// The IP address and port a masternode is reachable on.
#[derive(Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub struct ServiceAddress {
    /// The IPv4 address.
    pub ip: Ipv4Addr,
    /// The TCP port.
    pub port: u16,
}

impl ServiceAddress {
    /// Creates a new service address.
    pub const fn new(ip: Ipv4Addr, port: u16) -> Self {
        ServiceAddress { ip, port }
    }

    /// The all-zero address, used as the "unset" sentinel. A registration
    /// carrying it starts PoSe-banned until a service update goes through.
    pub const fn null() -> Self {
        ServiceAddress { ip: Ipv4Addr::UNSPECIFIED, port: 0 }
    }

    /// Whether this is the all-zero sentinel.
    pub fn is_null(&self) -> bool {
        self.ip.is_unspecified() && self.port == 0
    }

    /// Whether the address is usable at all (a non-zero IP and port).
    pub fn is_valid(&self) -> bool {
        !self.ip.is_unspecified() && self.port != 0
    }

    /// Whether the address is publicly routable.
    pub fn is_routable(&self) -> bool {
        self.is_valid()
            && !self.ip.is_private()
            && !self.ip.is_loopback()
            && !self.ip.is_link_local()
            && !self.ip.is_broadcast()
            && !self.ip.is_documentation()
    }
}

impl Default for ServiceAddress {
    fn default() -> Self {
        ServiceAddress::null()
    }
}

impl fmt::Display for ServiceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.ip, self.port)
    }
}

impl Encodable for ServiceAddress {
    fn consensus_encode<W: Write + ?Sized>(&self, writer: &mut W) -> Result<usize, io::Error> {
        // IPv4 lives in the last 4 bytes of the 16-byte mapped form.
        let mut ip_address = [0u8; 16];
        ip_address[12..16].copy_from_slice(&self.ip.octets());

        let mut len = 0;
        len += ip_address.consensus_encode(writer)?;
        // The port is stored byte-swapped.
        len += self.port.swap_bytes().consensus_encode(writer)?;
        Ok(len)
    }
}

impl Decodable for ServiceAddress {
    fn consensus_decode<R: io::Read + ?Sized>(reader: &mut R) -> Result<Self, encode::Error> {
        let ip_address: [u8; 16] = Decodable::consensus_decode(reader)?;
        let port: u16 = Decodable::consensus_decode(reader)?;
        let port = port.swap_bytes();
        let ipv4_octets: [u8; 4] = ip_address[12..16]
            .try_into()
            .expect("slice of fixed length 4");
        let ip = Ipv4Addr::from(ipv4_octets);
        Ok(ServiceAddress { ip, port })
    }
}
