//! Integration flows across lc-01 and lc-02.

pub mod heartbeat_flow;
pub mod login_flow;
