pub mod protocol;
pub mod rest;
pub mod session;
pub mod state;
pub mod ws_handler;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export the main WebSocket handler to make it easily accessible
// to the binary that will build the web server router.
pub use ws_handler::ws_handler;
