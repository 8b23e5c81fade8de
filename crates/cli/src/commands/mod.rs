pub mod authz;
pub mod config;
pub mod doctor;
pub mod report;

pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}
