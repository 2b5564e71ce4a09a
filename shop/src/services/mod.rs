// src/services/mod.rs

//! Storage access and outbound integrations used by handlers and pipelines.

pub mod cart_service;
pub mod catalog;
pub mod orders;
pub mod payment;
pub mod sessions;
