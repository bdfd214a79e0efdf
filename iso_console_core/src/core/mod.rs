pub mod activity_log;
pub mod connection_store;
pub mod console;
pub mod dispatcher;
pub mod poller;
