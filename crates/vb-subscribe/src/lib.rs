//! VMess subscription handling: decode, filter, encode, persist.

pub mod decode;
pub mod filter;
#[cfg(feature = "http")]
pub mod http;
pub mod model;
pub mod share;
pub mod store;

pub use decode::{decode, parse_share_link, parse_subscription};
pub use filter::retain_matching;
pub use model::{DecodeError, VmessEndpoint, VMESS_SCHEME};
pub use share::encode_subscription;
