// ABOUTME: Modem driver implementations.
// ABOUTME: Each driver implements ModemConnector; hardware drivers register alongside these.

pub mod virtual_modem;
