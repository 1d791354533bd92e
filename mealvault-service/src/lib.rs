//! Account and member services.
//!
//! The layer the console sits on: each operation validates its inputs,
//! delegates to the encrypted stores, and records the outcome in the audit
//! log (successes as ordinary entries, failures and rejections as suspicious
//! ones). Bad credentials are a `None` result, not an error; integrity
//! violations and validation failures are typed errors the console can
//! explain to the operator.

mod account;
mod error;
mod member;

pub use account::AccountService;
pub use error::{ServiceError, ServiceResult};
pub use member::MemberService;
