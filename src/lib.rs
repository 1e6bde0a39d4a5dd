//! Roster
//!
//! Roster is the integration core of an interactive course booking form: it
//! exchanges an application credential for a bearer token, resolves a
//! collaboration site, downloads the course workbook, filters the offerings,
//! and records the user's selection remotely along with a confirmation mail.

pub mod booking;
pub mod config;
pub mod contact;
pub mod graph;
pub mod mail;
pub mod offerings;
pub mod reference;
pub mod selection;
pub mod session;
