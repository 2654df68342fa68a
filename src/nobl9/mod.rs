// nobl9/ - downstream collaborators backed by the Nobl9 HTTP API

pub mod client;
pub mod session;

pub use client::{fetch_token, Nobl9Client, Nobl9Error};
pub use session::Nobl9SessionProvider;
