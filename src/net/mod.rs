//! Network layer.
//!
//! # Data Flow
//! ```text
//! ServerConfig (host, port, TLS material)
//!     → tokio TcpListener bind (BindError on failure)
//!     → tls.rs (optional rustls acceptor via axum-server)
//!     → hand off to the axum router
//! ```
//!
//! # Design Decisions
//! - Prebuilt rustls options take precedence over certificate/key paths
//! - TLS is enabled only when both certificate and key are configured

pub mod tls;
