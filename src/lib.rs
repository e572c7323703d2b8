//! Inkpost - a minimal blogging backend
//!
//! This library provides the core functionality for the Inkpost backend:
//! user registration/login with JWT session cookies and CRUD over blog
//! posts with uploaded cover images.

pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
