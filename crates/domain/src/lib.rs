//! # rainhub-domain
//!
//! Pure domain model for the rainhub rain-detection engine.
//!
//! ## Responsibilities
//! - Foundational types: identifiers, error conventions, timestamps
//! - Define **Devices** as seen through the device bus (binary sensors,
//!   weather feeds, openings, the engine's own virtual device)
//! - Define the **weather tables** the engine interprets (condition groups,
//!   precipitation condition codes, alert categories)
//! - Define the **rain state** (persisted), the evaluator **verdict**, and the
//!   engine **configuration**
//! - Define **Events** and **Notifications** emitted by the engine
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod config;
pub mod device;
pub mod event;
pub mod notification;
pub mod rain;
pub mod verdict;
pub mod weather;
