//! Integration test suite for coinkit.
//!
//! Drives the full select → build → sign → serialize pipeline through the
//! public wallet API and checks the produced transactions with the core
//! decoder and script verifier. Property tests cover value conservation and
//! determinism of coin selection.

pub mod helpers;
