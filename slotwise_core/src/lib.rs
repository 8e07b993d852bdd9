// Copyright 2026 the Slotwise Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host-agnostic ad slot rotation.
//!
//! `slotwise_core` owns the lifecycle of a single ad slot: request an ad,
//! wait for the network to report whether it filled, retry unfilled slots
//! with an alternate size, and reload filled ones once they have been on
//! screen long enough. It is `no_std` compatible (with `alloc`) and never
//! touches a browser API directly; backends implement
//! [`SlotHost`](backend::SlotHost) and forward host callbacks into the
//! controller.
//!
//! # Architecture
//!
//! ```text
//!   Backend (DOM, simulator)
//!       │  container / fill / slot / timer callbacks
//!       ▼
//!   RotationController ──► AdSlotSession (retry, size, visible time)
//!       │
//!       │  mount_slot, send_request, observe_*, arm_timer, ...
//!       ▼
//!   SlotHost ──────────► Tracer ──► TraceSink
//! ```
//!
//! **[`controller`]** — The state machine. Every host callback is a method
//! on [`RotationController`](controller::RotationController).
//!
//! **[`session`]** — The per-slot data model and its transitions.
//!
//! **[`backend`]** — The [`SlotHost`](backend::SlotHost) contract.
//!
//! **[`fill`]** and **[`visibility`]** — Classification of raw host
//! observations into fill outcomes and visibility changes.
//!
//! **[`config`]** — Compiled-in rotation presets.
//!
//! **[`fault`]** — The recoverable fault taxonomy.
//!
//! **[`trace`]** — [`TraceSink`](trace::TraceSink) trait and event types,
//! with a [`Tracer`](trace::Tracer) wrapper that compiles away when the
//! `trace` feature is off.
//!
//! **[`notify`]** and **[`policy`]** — Page-level helpers: loading-status
//! messages for the parent frame and the referrer allow check.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod backend;
pub mod config;
pub mod controller;
pub mod fault;
pub mod fill;
pub mod notify;
pub mod policy;
pub mod session;
pub mod time;
pub mod trace;
pub mod visibility;
