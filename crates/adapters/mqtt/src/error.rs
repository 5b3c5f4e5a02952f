//! MQTT adapter error types.

/// Errors specific to the MQTT adapter. All of them end the current
/// connection; none is fatal to the loop.
#[derive(Debug, thiserror::Error)]
pub enum MqttError {
    /// DNS lookup of the broker failed.
    #[error("failed to resolve broker {host}:{port}")]
    Resolve {
        host: String,
        port: u16,
        #[source]
        source: std::io::Error,
    },

    /// DNS lookup returned no address.
    #[error("broker {host}:{port} resolved to no address")]
    NoAddress { host: String, port: u16 },

    /// The TCP connection could not be established.
    #[error("failed to connect to broker")]
    Connect(#[source] std::io::Error),

    /// The TCP connection attempt took too long.
    #[error("timed out connecting to broker")]
    ConnectTimeout,

    /// A read or write on the established socket failed.
    #[error("broker socket error")]
    Io(#[source] std::io::Error),

    /// The broker closed the socket.
    #[error("broker closed the connection")]
    Closed,

    /// The broker answered CONNECT with a non-success return code.
    #[error("broker refused the connection: {0}")]
    Refused(String),

    /// The broker sent bytes that do not decode as MQTT.
    #[error("malformed MQTT packet")]
    Protocol(#[source] rumqttc::mqttbytes::Error),
}
