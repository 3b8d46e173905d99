//! Fixed-width row serialization for the one schema this table supports:
//! `(id: u32, username: text<=32, email: text<=255)`.

use std::fmt;

pub const ID_SIZE: usize = 4;
pub const USERNAME_SIZE: usize = 33;
pub const EMAIL_SIZE: usize = 256;
pub const ROW_SIZE: usize = ID_SIZE + USERNAME_SIZE + EMAIL_SIZE;

pub const USERNAME_MAX_LEN: usize = USERNAME_SIZE - 1;
pub const EMAIL_MAX_LEN: usize = EMAIL_SIZE - 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub id: u32,
    username: [u8; USERNAME_SIZE],
    email: [u8; EMAIL_SIZE],
}

impl Row {
    /// Caller enforces the length limits up front (see
    /// `statement::prepare_insert`); this constructor only asserts them,
    /// since by the time a `Row` exists the syntax check has already
    /// run.
    pub fn new(id: u32, username: &str, email: &str) -> Self {
        assert!(username.len() <= USERNAME_MAX_LEN);
        assert!(email.len() <= EMAIL_MAX_LEN);

        let mut username_bytes = [0u8; USERNAME_SIZE];
        username_bytes[..username.len()].copy_from_slice(username.as_bytes());

        let mut email_bytes = [0u8; EMAIL_SIZE];
        email_bytes[..email.len()].copy_from_slice(email.as_bytes());

        Self {
            id,
            username: username_bytes,
            email: email_bytes,
        }
    }

    pub fn username(&self) -> String {
        nul_terminated_str(&self.username)
    }

    pub fn email(&self) -> String {
        nul_terminated_str(&self.email)
    }

    pub fn serialize(&self) -> [u8; ROW_SIZE] {
        let mut out = [0u8; ROW_SIZE];
        out[0..ID_SIZE].copy_from_slice(&self.id.to_ne_bytes());
        out[ID_SIZE..ID_SIZE + USERNAME_SIZE].copy_from_slice(&self.username);
        out[ID_SIZE + USERNAME_SIZE..].copy_from_slice(&self.email);
        out
    }

    pub fn deserialize(bytes: &[u8]) -> Self {
        assert_eq!(bytes.len(), ROW_SIZE);

        let id = u32::from_ne_bytes(bytes[0..ID_SIZE].try_into().unwrap());

        let mut username = [0u8; USERNAME_SIZE];
        username.copy_from_slice(&bytes[ID_SIZE..ID_SIZE + USERNAME_SIZE]);

        let mut email = [0u8; EMAIL_SIZE];
        email.copy_from_slice(&bytes[ID_SIZE + USERNAME_SIZE..]);

        Self {
            id,
            username,
            email,
        }
    }
}

fn nul_terminated_str(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {}, {})", self.id, self.username(), self.email())
    }
}
