//! Session representations.
//!
//! Two storage forms exist for the same five raw fields: the file-backed
//! SQLite artifact written by desktop tooling, and the portable string
//! form that travels inside a metadata record. Conversion between them is
//! a byte-for-byte copy, never a re-derivation.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use rusqlite::{Connection, OpenFlags, OptionalExtension};

use crate::error::SessionError;
use crate::AUTH_KEY_LEN;

/// Datacenter a fresh session gets pointed at when its stored address is
/// absent.
pub const DEFAULT_DC_ID: i32 = 2;
pub const DEFAULT_IPV4: Ipv4Addr = Ipv4Addr::new(149, 154, 167, 51);
pub const DEFAULT_IPV6: Ipv6Addr = Ipv6Addr::new(0x2001, 0x067c, 0x04e8, 0xf002, 0, 0, 0, 0x000a);
pub const DEFAULT_PORT: u16 = 443;

/// Version prefix of the portable string encoding.
pub const SESSION_STRING_VERSION: char = '1';

const FLAG_IPV6: u8 = 0b0000_0001;
const FLAG_TAKEOUT: u8 = 0b0000_0010;

/// 256-byte authorization key.
///
/// `Debug` is redacted: key material must never reach logs or reports.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthKey([u8; AUTH_KEY_LEN]);

impl AuthKey {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SessionError> {
        let key: [u8; AUTH_KEY_LEN] = bytes
            .try_into()
            .map_err(|_| SessionError::MalformedKey { len: bytes.len() })?;
        Ok(Self(key))
    }

    pub fn as_bytes(&self) -> &[u8; AUTH_KEY_LEN] {
        &self.0
    }
}

impl Default for AuthKey {
    fn default() -> Self {
        Self([0; AUTH_KEY_LEN])
    }
}

impl fmt::Debug for AuthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AuthKey(<{AUTH_KEY_LEN} bytes>)")
    }
}

/// The five raw session fields every storage form carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    pub dc_id: i32,
    pub server_address: IpAddr,
    pub port: u16,
    pub auth_key: AuthKey,
    pub takeout_id: Option<i64>,
}

impl Default for SessionInfo {
    fn default() -> Self {
        Self {
            dc_id: DEFAULT_DC_ID,
            server_address: IpAddr::V4(DEFAULT_IPV4),
            port: DEFAULT_PORT,
            auth_key: AuthKey::default(),
            takeout_id: None,
        }
    }
}

/// Read-only view of a file-backed `.session` artifact.
///
/// The artifact is a SQLite database whose `sessions` table holds a single
/// row of connection state. Opening one never touches the network.
pub struct FileSession {
    path: PathBuf,
    info: SessionInfo,
}

impl FileSession {
    /// Read the session row out of `path`.
    ///
    /// A NULL address or port falls back to the default datacenter values,
    /// matching what desktop tooling writes for never-connected sessions.
    /// A missing auth key is an error: such a session cannot authorize
    /// anything and converting it would only propagate the corruption.
    pub fn read(path: impl AsRef<Path>) -> Result<Self, SessionError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(SessionError::NotFound(path.to_path_buf()));
        }

        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
        let row = conn
            .query_row(
                "SELECT dc_id, server_address, port, auth_key, takeout_id FROM sessions",
                [],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, Option<String>>(1)?,
                        row.get::<_, Option<i64>>(2)?,
                        row.get::<_, Option<Vec<u8>>>(3)?,
                        row.get::<_, Option<i64>>(4)?,
                    ))
                },
            )
            .optional()?;

        let (dc_id, address, port, auth_key, takeout_id) = row.ok_or(SessionError::Empty)?;

        let server_address = match address.filter(|a| !a.is_empty()) {
            Some(addr) => addr
                .parse::<IpAddr>()
                .map_err(|_| SessionError::InvalidAddress(addr))?,
            None => {
                tracing::debug!(path = %path.display(), "session has no stored address, using default datacenter");
                IpAddr::V4(DEFAULT_IPV4)
            }
        };

        let auth_key = match auth_key {
            Some(bytes) => AuthKey::from_bytes(&bytes)?,
            None => return Err(SessionError::MissingAuthKey),
        };

        Ok(Self {
            path: path.to_path_buf(),
            info: SessionInfo {
                dc_id: dc_id as i32,
                server_address,
                port: port.map(|p| p as u16).unwrap_or(DEFAULT_PORT),
                auth_key,
                takeout_id,
            },
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn info(&self) -> &SessionInfo {
        &self.info
    }

    pub fn into_info(self) -> SessionInfo {
        self.info
    }
}

/// Portable string form of a session.
///
/// Layout after the version prefix, URL-safe base64 without padding:
/// `dc(1) | flags(1) | port(2 BE) | ip(4|16) | takeout(8 BE, optional) |
/// auth_key(256)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringSession {
    info: SessionInfo,
}

impl StringSession {
    pub fn new(info: SessionInfo) -> Self {
        Self { info }
    }

    pub fn info(&self) -> &SessionInfo {
        &self.info
    }

    pub fn into_info(self) -> SessionInfo {
        self.info
    }

    /// Encode into the portable string form.
    pub fn encode(&self) -> String {
        let info = &self.info;
        let ip: Vec<u8> = match info.server_address {
            IpAddr::V4(v4) => v4.octets().to_vec(),
            IpAddr::V6(v6) => v6.octets().to_vec(),
        };

        let mut flags = 0u8;
        if info.server_address.is_ipv6() {
            flags |= FLAG_IPV6;
        }
        if info.takeout_id.is_some() {
            flags |= FLAG_TAKEOUT;
        }

        let mut buf = Vec::with_capacity(4 + ip.len() + 8 + AUTH_KEY_LEN);
        buf.push(info.dc_id as u8);
        buf.push(flags);
        buf.extend_from_slice(&info.port.to_be_bytes());
        buf.extend_from_slice(&ip);
        if let Some(takeout_id) = info.takeout_id {
            buf.extend_from_slice(&takeout_id.to_be_bytes());
        }
        buf.extend_from_slice(info.auth_key.as_bytes());

        format!("{}{}", SESSION_STRING_VERSION, URL_SAFE_NO_PAD.encode(&buf))
    }

    /// Decode a portable string back into its session fields.
    pub fn decode(text: &str) -> Result<Self, SessionError> {
        let mut chars = text.chars();
        match chars.next() {
            Some(SESSION_STRING_VERSION) => {}
            Some(other) => return Err(SessionError::UnsupportedVersion(other)),
            None => return Err(SessionError::Truncated),
        }

        let buf = URL_SAFE_NO_PAD.decode(chars.as_str())?;
        if buf.len() < 4 {
            return Err(SessionError::Truncated);
        }

        let dc_id = buf[0] as i32;
        let flags = buf[1];
        let port = u16::from_be_bytes([buf[2], buf[3]]);
        let mut offset = 4;

        let server_address = if flags & FLAG_IPV6 != 0 {
            let octets: [u8; 16] = buf
                .get(offset..offset + 16)
                .ok_or(SessionError::Truncated)?
                .try_into()
                .map_err(|_| SessionError::Truncated)?;
            offset += 16;
            IpAddr::V6(Ipv6Addr::from(octets))
        } else {
            let octets: [u8; 4] = buf
                .get(offset..offset + 4)
                .ok_or(SessionError::Truncated)?
                .try_into()
                .map_err(|_| SessionError::Truncated)?;
            offset += 4;
            IpAddr::V4(Ipv4Addr::from(octets))
        };

        let takeout_id = if flags & FLAG_TAKEOUT != 0 {
            let bytes: [u8; 8] = buf
                .get(offset..offset + 8)
                .ok_or(SessionError::Truncated)?
                .try_into()
                .map_err(|_| SessionError::Truncated)?;
            offset += 8;
            Some(i64::from_be_bytes(bytes))
        } else {
            None
        };

        let key_bytes = buf.get(offset..).ok_or(SessionError::Truncated)?;
        if key_bytes.len() != AUTH_KEY_LEN {
            return Err(SessionError::Truncated);
        }
        let auth_key = AuthKey::from_bytes(key_bytes)?;

        Ok(Self {
            info: SessionInfo {
                dc_id,
                server_address,
                port,
                auth_key,
                takeout_id,
            },
        })
    }
}
