//! Black-box behavioral specs for the broker binaries: invoke the
//! compiled `oddjob-brokerd`/`oddjob-brokerctl` binaries and check
//! stdout/stderr/exit codes, the way a user of the daemon would.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

#[path = "specs/prelude.rs"]
mod prelude;

#[path = "specs/cli/help.rs"]
mod cli_help;

#[path = "specs/daemon/lifecycle.rs"]
mod daemon_lifecycle;

#[path = "specs/daemon/control.rs"]
mod daemon_control;
