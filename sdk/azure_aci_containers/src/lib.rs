#![doc = include_str!("../README.md")]

pub mod container_group;
pub mod models;
pub mod resource_group;
