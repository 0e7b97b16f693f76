use std::error::Error;

pub mod api;
pub mod binder;
pub mod config;
pub mod controller;
pub mod csrf;
pub mod error;
pub mod model;
pub mod notifier;
pub mod page;
pub mod service;
pub mod synchronizer;
pub mod view;

pub fn unpack_error(err: &(dyn Error)) -> String {
    let mut parts = Vec::new();
    parts.push(err.to_string());
    let mut current = err.source();
    while let Some(source) = current {
        parts.push(source.to_string());
        current = source.source();
    }
    parts.join(": ")
}
