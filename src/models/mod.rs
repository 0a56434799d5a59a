//! Data models for assets, users, assignments and return requests

pub mod asset;
pub mod assignment;
pub mod enums;
pub mod lifecycle;
pub mod return_request;
pub mod user;

// Re-export commonly used types
pub use asset::Asset;
pub use assignment::{Assignment, AssignmentDetails};
pub use enums::{AssetState, AssignmentState, Gender, Location, ReturnRequestState, Role};
pub use lifecycle::Lifecycle;
pub use return_request::{ReturnRequest, ReturnRequestDetails};
pub use user::{User, UserSummary};
