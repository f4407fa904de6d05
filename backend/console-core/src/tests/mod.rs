mod error;
mod scripted_transport;
mod transport;
