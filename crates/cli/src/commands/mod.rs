pub mod ask;
pub mod debate;
pub mod init;
pub mod orchestrate;
pub mod pipeline;
pub mod roles;
mod setup;
