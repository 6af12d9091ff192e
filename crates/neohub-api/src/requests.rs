// Fixed request codes the supervisor sends on its own behalf.
//
// Arbitrary command strings from device handlers are forwarded verbatim
// and never pass through this module.

/// Full status query -- returns the state of every device paired with the hub.
pub const CMD_INFO: &str = r#"{"INFO":0}"#;

/// Hub configuration block query -- carries, among other things, the
/// hub-wide temperature unit setting.
pub const CMD_READ_DCB: &str = r#"{"READ_DCB":100}"#;
