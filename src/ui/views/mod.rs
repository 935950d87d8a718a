pub mod copy;
pub mod warnings;
pub mod watch;
