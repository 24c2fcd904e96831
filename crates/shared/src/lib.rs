//! Types shared between the mail client and the `/emails` REST surface it talks to.

pub mod domain;
pub mod error;
pub mod protocol;
