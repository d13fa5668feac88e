//! Wiring of the four services. Each one builds its collaborators from
//! [`Settings`](crate::config::Settings), binds its listener and runs an actix server.

pub mod gateway;
pub mod mailer;
pub mod rate_watcher;
pub mod subscription;

use std::net::TcpListener;

use crate::config::ApplicationSettings;

/// Binds the service address. Port 0 lets the OS pick a free port, which the tests rely on.
fn bind(settings: &ApplicationSettings) -> Result<(TcpListener, u16), std::io::Error> {
    let listener = TcpListener::bind(settings.get_address())?;
    let port = listener.local_addr()?.port();

    Ok((listener, port))
}

fn invalid_config(message: impl Into<String>) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::InvalidInput, message.into())
}
