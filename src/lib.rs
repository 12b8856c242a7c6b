//! The `wgsl` command line tool for checking and inspecting WebGPU Shading
//! Language (WGSL) sources.

pub mod commands;
pub mod config;
pub mod diagnostics;
